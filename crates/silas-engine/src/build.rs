//! # Build Pipeline
//!
//! Renders a loaded [`Website`] into an output directory:
//!
//! 1. every published file (every file in preview) is rendered through its
//!    own [`FileContext`], which resolves links on first use;
//! 2. the fragment is wrapped by a [`Layout`] and written to
//!    `<output>/<site path>/index.html`;
//! 3. external files registered while rendering are copied to
//!    `<output>/<path below the website root>`;
//! 4. the website and every published project get an RSS feed listing the
//!    entries of their index page.
//!
//! Page markup beyond the body fragment belongs to the [`Layout`];
//! [`PlainLayout`] is a minimal one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use silas_syntax::tree::preamble::format_date;
use silas_syntax::tree::render::join_url;

use crate::error::{BuildError, Warning};
use crate::feed::{self, FeedInfo};
use crate::io;
use crate::models::{ContainerId, FileId, FileRole, OrgFile};
use crate::resolve::FileContext;
use crate::website::Website;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Render drafts and downgrade release checks to warnings.
    pub preview: bool,
    /// Overrides the website index's `#+URL:`.
    pub base_url: Option<String>,
}

/// Where a page sits in the website.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// The website index.
    Home,
    /// A file directly below the website root.
    Page,
    /// A project index.
    Project,
    /// A member file of a project.
    Post,
}

impl PageKind {
    pub fn of(file: &OrgFile) -> Self {
        match (file.container(), file.role()) {
            (ContainerId::Website, FileRole::Index) => PageKind::Home,
            (ContainerId::Website, FileRole::Page) => PageKind::Page,
            (ContainerId::Project(_), FileRole::Index) => PageKind::Project,
            (ContainerId::Project(_), FileRole::Page) => PageKind::Post,
        }
    }
}

/// A file or project listed on an index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub url: String,
    pub published: Option<NaiveDate>,
    pub summary: Option<String>,
}

/// Everything a layout needs to produce one HTML document.
#[derive(Debug)]
pub struct Page<'a> {
    pub kind: PageKind,
    pub file: &'a OrgFile,
    pub title: String,
    pub url: String,
    pub site_name: String,
    pub base_url: &'a str,
    /// `#+RENDERTYPE:` of the file, for layouts with several page variants.
    pub render_type: Option<&'a str>,
    /// Rendered body of the file.
    pub content: String,
    /// Members and sub-projects, on index pages only.
    pub entries: Vec<Entry>,
}

/// Wraps a rendered body in page markup.
pub trait Layout {
    fn render(&self, page: &Page<'_>) -> String;
}

/// A bare HTML document: title, stylesheet, dates, body and entry list.
/// The render type, if any, becomes the class of `<body>`.
#[derive(Debug, Clone)]
pub struct PlainLayout {
    /// Stylesheet path below the site root.
    pub stylesheet: String,
}

impl Default for PlainLayout {
    fn default() -> Self {
        Self {
            stylesheet: "style.css".to_string(),
        }
    }
}

impl Layout for PlainLayout {
    fn render(&self, page: &Page<'_>) -> String {
        let title = match page.kind {
            PageKind::Home => page.site_name.clone(),
            _ => format!("{} | {}", page.title, page.site_name),
        };
        let preamble = page.file.preamble();
        let dates = [
            preamble.published().map(|d| format!("Published {}", format_date(d))),
            preamble.last_edit().map(|d| format!("Last edited {}", format_date(d))),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

        let mut html = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n<link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body{}>\n\
             <header><a href=\"{}\">{}</a></header>\n<main>\n<h1>{}</h1>\n",
            encode_text(&title),
            encode_double_quoted_attribute(&join_url(page.base_url, &self.stylesheet)),
            page.render_type
                .map(|kind| format!(" class=\"{}\"", encode_double_quoted_attribute(kind)))
                .unwrap_or_default(),
            encode_double_quoted_attribute(&join_url(page.base_url, "")),
            encode_text(&page.site_name),
            encode_text(&page.title),
        );
        if !dates.is_empty() {
            html.push_str(&format!("<p class=\"dates\">{}</p>\n", dates.join(", ")));
        }
        if !page.content.is_empty() {
            html.push_str(&page.content);
            html.push('\n');
        }
        if !page.entries.is_empty() {
            html.push_str("<ul class=\"entries\">\n");
            for entry in &page.entries {
                html.push_str(&format!(
                    "<li><a href=\"{}\">{}</a>",
                    encode_double_quoted_attribute(&entry.url),
                    encode_text(&entry.title)
                ));
                if let Some(summary) = &entry.summary {
                    html.push_str(&format!(" <span class=\"summary\">{}</span>", encode_text(summary)));
                }
                html.push_str("</li>\n");
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

/// What a build wrote and what it noticed on the way.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub assets: Vec<PathBuf>,
    pub feeds: Vec<PathBuf>,
    pub skipped_drafts: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

pub struct Builder<'w, L = PlainLayout> {
    website: &'w Website,
    options: BuildOptions,
    layout: L,
}

impl<'w> Builder<'w, PlainLayout> {
    pub fn new(website: &'w Website, options: BuildOptions) -> Self {
        Self {
            website,
            options,
            layout: PlainLayout::default(),
        }
    }
}

impl<'w, L: Layout> Builder<'w, L> {
    pub fn with_layout<M: Layout>(self, layout: M) -> Builder<'w, M> {
        Builder {
            website: self.website,
            options: self.options,
            layout,
        }
    }

    /// Base URL for links: the option, then `#+URL:`, then the output
    /// directory itself.
    fn base_url(&self, output: &Path) -> String {
        self.options
            .base_url
            .clone()
            .or_else(|| self.website.base_url().map(str::to_string))
            .unwrap_or_else(|| output.display().to_string())
    }

    /// Render the website into `output`.
    pub fn build(&self, output: &Path) -> Result<BuildReport, BuildError> {
        let base_url = self.base_url(output);
        let mut report = BuildReport::default();
        let mut written = HashSet::new();

        for (id, file) in self.website.files() {
            if file.is_draft() && !self.options.preview {
                log::info!("Skipping draft {}", file.path().display());
                report.skipped_drafts.push(file.path().to_path_buf());
                continue;
            }

            let kind = PageKind::of(file);
            self.check_summary(kind, file, &mut report)?;
            report.warnings.extend(
                file.warnings()
                    .iter()
                    .map(|warning| Warning::new(file.path(), warning.to_string())),
            );

            let ctx = FileContext::new(self.website, id, base_url.as_str(), self.options.preview);
            let content = file.render(&ctx).map_err(|source| BuildError::Render {
                path: file.path().to_path_buf(),
                source,
            })?;
            report.warnings.extend(ctx.into_warnings());

            let page = Page {
                kind,
                file,
                title: file.title(),
                url: self.website.file_url(id, Some(&base_url)),
                site_name: self.website.container_name(ContainerId::Website),
                base_url: &base_url,
                render_type: file.preamble().render_type(),
                content,
                entries: self.entries(kind, file, &base_url),
            };

            let target = self.website.file_path(id).to_path(output).join("index.html");
            if !written.insert(target.clone()) {
                return Err(BuildError::DuplicateOutput { path: target });
            }
            log::info!("Rendering {} -> {}", file.path().display(), target.display());
            io::write_file(&target, &self.layout.render(&page))?;
            report.pages.push(target);
        }

        for external in self.website.external_files() {
            let target = external.site_path().to_path(output);
            log::info!("Copying {} -> {}", external.source().display(), target.display());
            io::copy_file(external.source(), &target)?;
            report.assets.push(target);
        }

        self.write_feeds(output, &base_url, &mut report)?;

        Ok(report)
    }

    /// One `rss.xml` per container whose index page was written.
    fn write_feeds(
        &self,
        output: &Path,
        base_url: &str,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let containers = std::iter::once(ContainerId::Website).chain(
            self.website
                .projects()
                .map(|(id, _)| ContainerId::Project(id)),
        );
        for container in containers {
            let index = self.website.container_index(container);
            if index.is_draft() && !self.options.preview {
                continue;
            }
            let info = FeedInfo {
                title: self.website.container_name(container),
                link: self.website.container_url(container, Some(base_url)),
                description: index
                    .preamble()
                    .summary()
                    .map_or_else(|| index.title(), str::to_string),
            };
            let channel = feed::channel(info, &self.container_entries(container, base_url));

            let target = self
                .website
                .container_path(container)
                .to_path(output)
                .join(feed::FEED_FILE);
            log::info!("Writing feed {}", target.display());
            io::write_file(&target, &channel.to_string())?;
            report.feeds.push(target);
        }
        Ok(())
    }

    /// Published posts need a summary for the project listing.
    fn check_summary(
        &self,
        kind: PageKind,
        file: &OrgFile,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        if kind != PageKind::Post || file.is_draft() || file.preamble().summary().is_some() {
            return Ok(());
        }
        if !self.options.preview {
            return Err(BuildError::MissingSummary {
                path: file.path().to_path_buf(),
            });
        }
        log::warn!("{} has no summary", file.path().display());
        report
            .warnings
            .push(Warning::new(file.path(), "published without a summary"));
        Ok(())
    }

    /// Files and sub-projects listed on an index page, newest first.
    fn entries(&self, kind: PageKind, file: &OrgFile, base_url: &str) -> Vec<Entry> {
        if !matches!(kind, PageKind::Home | PageKind::Project) {
            return Vec::new();
        }
        self.container_entries(file.container(), base_url)
    }

    fn container_entries(&self, container: ContainerId, base_url: &str) -> Vec<Entry> {
        let members = self.website.members(container);

        let files = members.files().map(|id| (id, self.website.file(id)));
        let projects = members.projects().map(|project| {
            let index = self.website.members(ContainerId::Project(project)).index();
            (index, self.website.file(index))
        });

        let mut entries = files
            .chain(projects)
            .filter(|(_, member)| self.options.preview || !member.is_draft())
            .map(|(id, member): (FileId, &OrgFile)| Entry {
                title: member.title(),
                url: self.website.file_url(id, Some(base_url)),
                published: member.preamble().published(),
                summary: member.preamble().summary().map(str::to_string),
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.title.cmp(&b.title)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_site_dir};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn options(preview: bool) -> BuildOptions {
        BuildOptions {
            preview,
            base_url: Some("https://example.com".to_string()),
        }
    }

    #[test]
    fn test_build_writes_pages_and_assets() {
        // Given a website with a page, a project and an image
        let site = create_test_site_dir();
        create_test_file(&site, "about.org", "#+TITLE: About\n\n[[file:images/me.png][me]]");
        create_test_file(&site, "images/me.png", "png");
        create_test_file(&site, "blog/index.org", "#+TITLE: Blog\n");
        create_test_file(&site, "blog/first.org", "#+SUMMARY: The first one\n\nHello");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When building
        let report = Builder::new(&website, options(false)).build(out.path()).unwrap();

        // Then every page and the image land in the output
        assert_eq!(report.pages.len(), 4);
        for page in ["index.html", "about/index.html", "blog/index.html", "blog/first/index.html"] {
            assert!(out.path().join(page).is_file(), "missing {page}");
        }
        assert_eq!(report.assets, vec![out.path().join("images/me.png")]);
        assert_eq!(fs::read_to_string(out.path().join("images/me.png")).unwrap(), "png");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_drafts_are_skipped_unless_preview() {
        // Given a draft page
        let site = create_test_site_dir();
        create_test_file(&site, "later.org", "#+DRAFT: true\n\nSoon");
        let website = Website::load(site.path()).unwrap();

        // When building for release and for preview
        let release_out = tempfile::TempDir::new().unwrap();
        let release = Builder::new(&website, options(false)).build(release_out.path()).unwrap();
        let preview_out = tempfile::TempDir::new().unwrap();
        let preview = Builder::new(&website, options(true)).build(preview_out.path()).unwrap();

        // Then only the preview contains it
        assert_eq!(release.skipped_drafts.len(), 1);
        assert!(!release_out.path().join("later/index.html").exists());
        assert!(preview_out.path().join("later/index.html").exists());
        assert!(preview.skipped_drafts.is_empty());
    }

    #[test]
    fn test_post_without_summary() {
        // Given a project member without a summary
        let site = create_test_site_dir();
        create_test_file(&site, "blog/index.org", "Blog");
        create_test_file(&site, "blog/post.org", "No summary here");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When building for release, Then it fails
        let error = Builder::new(&website, options(false)).build(out.path()).unwrap_err();
        assert!(matches!(error, BuildError::MissingSummary { .. }));

        // When previewing, Then it is only a warning
        let report = Builder::new(&website, options(true)).build(out.path()).unwrap();
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_empty_slug_collides_with_home() {
        // Given a page whose name slugifies to nothing
        let site = create_test_site_dir();
        create_test_file(&site, "???.org", "Nameless");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When building
        let error = Builder::new(&website, options(false)).build(out.path()).unwrap_err();

        // Then the second write to the home page is refused
        assert!(matches!(error, BuildError::DuplicateOutput { .. }));
    }

    #[test]
    fn test_project_index_lists_members_newest_first() {
        // Given a project with two dated posts and a draft
        let site = create_test_site_dir();
        create_test_file(&site, "blog/index.org", "#+TITLE: Blog\n");
        create_test_file(
            &site,
            "blog/old.org",
            "#+TITLE: Old\n#+PUBLISHED: <2023-01-01>\n#+SUMMARY: Was\n",
        );
        create_test_file(
            &site,
            "blog/new.org",
            "#+TITLE: New\n#+PUBLISHED: <2024-06-01>\n#+SUMMARY: Is\n",
        );
        create_test_file(&site, "blog/wip.org", "#+DRAFT: yes\n");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When building
        Builder::new(&website, options(false)).build(out.path()).unwrap();

        // Then the project page lists the published posts
        let html = fs::read_to_string(out.path().join("blog/index.html")).unwrap();
        insta::assert_snapshot!(html, @r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
        <meta charset="utf-8">
        <title>Blog | Test Site</title>
        <link rel="stylesheet" href="https://example.com/style.css">
        </head>
        <body>
        <header><a href="https://example.com">Test Site</a></header>
        <main>
        <h1>Blog</h1>
        <ul class="entries">
        <li><a href="https://example.com/blog/new">New</a> <span class="summary">Is</span></li>
        <li><a href="https://example.com/blog/old">Old</a> <span class="summary">Was</span></li>
        </ul>
        </main>
        </body>
        </html>
        "#);
    }

    #[test]
    fn test_feeds_list_published_entries_newest_first() {
        // Given a project with two dated posts and a draft
        let site = create_test_site_dir();
        create_test_file(&site, "blog/index.org", "#+TITLE: Blog\n#+SUMMARY: Notes\n");
        create_test_file(
            &site,
            "blog/old.org",
            "#+TITLE: Old\n#+PUBLISHED: <2023-01-01>\n#+SUMMARY: Was\n",
        );
        create_test_file(
            &site,
            "blog/new.org",
            "#+TITLE: New\n#+PUBLISHED: <2024-06-01>\n#+SUMMARY: Is\n",
        );
        create_test_file(&site, "blog/wip.org", "#+TITLE: Wip\n#+DRAFT: yes\n");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When building for release
        let report = Builder::new(&website, options(false)).build(out.path()).unwrap();

        // Then the website and the project each get a feed
        assert_eq!(
            report.feeds,
            vec![out.path().join("rss.xml"), out.path().join("blog/rss.xml")]
        );
        let xml = fs::read_to_string(out.path().join("blog/rss.xml")).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        assert_eq!(channel.title(), "Blog");
        assert_eq!(channel.link(), "https://example.com/blog");
        assert_eq!(channel.description(), "Notes");
        let titles = channel
            .items()
            .iter()
            .map(|item| item.title().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["New", "Old"]);

        // And the website feed lists the project
        let xml = fs::read_to_string(out.path().join("rss.xml")).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let links = channel
            .items()
            .iter()
            .map(|item| item.link().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(links, vec!["https://example.com/blog"]);
    }

    #[test]
    fn test_preview_feeds_include_drafts() {
        // Given a draft post
        let site = create_test_site_dir();
        create_test_file(&site, "blog/index.org", "#+TITLE: Blog\n");
        create_test_file(&site, "blog/wip.org", "#+TITLE: Wip\n#+DRAFT: yes\n");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When previewing
        Builder::new(&website, options(true)).build(out.path()).unwrap();

        // Then the project feed carries the draft
        let xml = fs::read_to_string(out.path().join("blog/rss.xml")).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        assert_eq!(channel.items().len(), 1);
        assert_eq!(channel.items()[0].title(), Some("Wip"));
    }

    struct BodyOnly;

    impl Layout for BodyOnly {
        fn render(&self, page: &Page<'_>) -> String {
            format!("{:?}|{}|{}", page.kind, page.url, page.content)
        }
    }

    #[test]
    fn test_custom_layout() {
        // Given a loose page
        let site = create_test_site_dir();
        create_test_file(&site, "about.org", "Hi *there*");
        let website = Website::load(site.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();

        // When building with a custom layout
        Builder::new(&website, options(false))
            .with_layout(BodyOnly)
            .build(out.path())
            .unwrap();

        // Then the layout receives the page
        assert_eq!(
            fs::read_to_string(out.path().join("about/index.html")).unwrap(),
            "Page|https://example.com/about|<p>Hi <b>there</b></p>"
        );
    }
}
