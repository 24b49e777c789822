//! # Link Resolution
//!
//! Turns the target of a link found in one file into a [`ResolvedLink`].
//!
//! | Target | Resolves to |
//! |--------|-------------|
//! | `http:`, `https:`, `mailto:` | the URL itself |
//! | `*Title`, `#custom-id` | a section of the same file |
//! | `file:path` | a file, a project or an external file |
//! | `file:path::*Title`, `file:path::#id` | a section of another file |
//!
//! ## Containers supply dependencies
//!
//! A `file:` path is made absolute against the linking file's directory and
//! handed to that file's container. A container passes paths outside its
//! directory up to its parent and paths inside a sub-project down to it.
//! The container that owns the path answers with itself (the directory or
//! its `index.org`), one of its member files, or an [`ExternalFile`] it
//! registers for copying.
//!
//! Leaving the website root or naming a markup file no container knows is
//! fatal. A section that cannot be found only degrades the link to plain
//! text, with a warning.

use std::cell::RefCell;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::Ordering;

use relative_path::{RelativePath, RelativePathBuf};
use silas_syntax::tree::render::RenderContext;
use silas_syntax::tree::visit::{Visitor, walk};
use silas_syntax::tree::{Link, LinkResolution, Node, ResolvedLink, Section};
use silas_syntax::RenderError;

use crate::error::{BuildError, ResolveError, Warning};
use crate::io;
use crate::models::{ContainerId, ExternalFile, FileId};
use crate::website::Website;

const EXTERNAL_SCHEMES: &[&str] = &["http:", "https:", "mailto:"];

/// What a `file:` link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Container(ContainerId),
    File(FileId),
    External(ExternalFile),
}

/// Result of resolving one link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub link: ResolvedLink,
    pub dependency: Option<Dependency>,
    /// Set when the link was degraded to plain text.
    pub warning: Option<String>,
}

impl Resolution {
    fn to(link: ResolvedLink, dependency: Option<Dependency>) -> Self {
        Self {
            link,
            dependency,
            warning: None,
        }
    }

    fn dangling(warning: String) -> Self {
        Self {
            link: ResolvedLink::Dangling,
            dependency: None,
            warning: Some(warning),
        }
    }
}

/// Section reference after `::`, or a whole same-file target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionRef<'a> {
    CustomId(&'a str),
    Title(&'a str),
}

impl<'a> SectionRef<'a> {
    fn parse(reference: &'a str) -> Self {
        match reference.strip_prefix('#') {
            Some(id) => SectionRef::CustomId(id),
            None => SectionRef::Title(reference.strip_prefix('*').unwrap_or(reference).trim()),
        }
    }

    fn matches(self, section: &Section) -> bool {
        match self {
            SectionRef::CustomId(id) => section.id == id,
            SectionRef::Title(title) => section.title == title,
        }
    }
}

/// Finds the first section matching a reference, at any depth.
struct SectionFinder<'r> {
    wanted: SectionRef<'r>,
    found: Option<String>,
}

impl SectionFinder<'_> {
    fn find(nodes: &[Node], wanted: SectionRef<'_>) -> Option<String> {
        let mut finder = SectionFinder {
            wanted,
            found: None,
        };
        walk(nodes, &mut finder);
        finder.found
    }
}

impl Visitor for SectionFinder<'_> {
    fn visit_section(&mut self, section: &Section) {
        if self.found.is_none() && self.wanted.matches(section) {
            self.found = Some(section.id.clone());
        }
    }
}

impl Website {
    /// Resolve `target`, found in file `from`.
    pub fn resolve_link(&self, from: FileId, target: &str) -> Result<Resolution, ResolveError> {
        if EXTERNAL_SCHEMES.iter().any(|scheme| target.starts_with(scheme)) {
            return Ok(Resolution::to(ResolvedLink::External(target.to_string()), None));
        }

        if let Some(rest) = target.strip_prefix("file:") {
            let (path, section) = match rest.split_once("::") {
                Some((path, section)) => (path, Some(section)),
                None => (rest, None),
            };
            return self.resolve_file_link(from, target, path, section);
        }

        if target.starts_with('*') || target.starts_with('#') {
            let file = self.file(from);
            return Ok(match SectionFinder::find(file.nodes(), SectionRef::parse(target)) {
                Some(id) => Resolution::to(ResolvedLink::Anchor(id), None),
                None => Resolution::dangling(format!("no section '{target}' in this file")),
            });
        }

        Ok(Resolution::dangling(format!(
            "unable to deduce link type for '{target}'"
        )))
    }

    fn resolve_file_link(
        &self,
        from: FileId,
        target: &str,
        path: &str,
        section: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let file = self.file(from);

        let absolute = absolutize(file.dir(), path);
        if !absolute.starts_with(self.root()) {
            return Err(ResolveError::OutsideRoot {
                target: target.to_string(),
                path: absolute,
            });
        }
        let canonical = fs::canonicalize(&absolute).map_err(|source| ResolveError::Missing {
            target: target.to_string(),
            path: absolute.clone(),
            source,
        })?;
        if !canonical.starts_with(self.root()) {
            return Err(ResolveError::OutsideRoot {
                target: target.to_string(),
                path: canonical,
            });
        }

        let dependency = self.supply(file.container(), &canonical, target)?;
        log::debug!("'{target}' in {} -> {dependency:?}", file.path().display());

        let (path, page) = match &dependency {
            Dependency::Container(container) => {
                (self.container_path(*container), self.members(*container).index())
            }
            Dependency::File(id) => (self.file_path(*id), *id),
            Dependency::External(external) => {
                let link = ResolvedLink::Asset {
                    path: external.site_path().to_string(),
                };
                let mut resolution = Resolution::to(link, Some(dependency.clone()));
                if let Some(reference) = section {
                    resolution.warning =
                        Some(format!("section '{reference}' ignored on a non-org file"));
                }
                return Ok(resolution);
            }
        };

        let fragment = match section {
            None => None,
            Some(reference) => {
                let target_file = self.file(page);
                match SectionFinder::find(target_file.nodes(), SectionRef::parse(reference)) {
                    Some(id) => Some(id),
                    None => {
                        return Ok(Resolution::dangling(format!(
                            "no section '{reference}' in {}",
                            target_file.path().display()
                        )));
                    }
                }
            }
        };

        let link = ResolvedLink::Page {
            path: path.into_string(),
            fragment,
        };
        Ok(Resolution::to(link, Some(dependency)))
    }

    /// Ask `container` for the dependency at canonical `path`.
    fn supply(
        &self,
        container: ContainerId,
        path: &Path,
        target: &str,
    ) -> Result<Dependency, ResolveError> {
        if !path.starts_with(self.container_dir(container)) {
            return match self.container_parent(container) {
                Some(parent) => self.supply(parent, path, target),
                None => Err(ResolveError::OutsideRoot {
                    target: target.to_string(),
                    path: path.to_path_buf(),
                }),
            };
        }

        let members = self.members(container);
        if let Some(project) = members.project_owning(path) {
            return self.supply(ContainerId::Project(project), path, target);
        }

        if path == self.container_dir(container) || path == self.container_index(container).path()
        {
            return Ok(Dependency::Container(container));
        }
        if path.is_dir() {
            return Err(ResolveError::NotAProject {
                target: target.to_string(),
                path: path.to_path_buf(),
            });
        }
        if io::is_markup(path) {
            return members
                .files
                .get(path)
                .map(|&id| Dependency::File(id))
                .ok_or_else(|| ResolveError::InvalidFile {
                    target: target.to_string(),
                    path: path.to_path_buf(),
                });
        }

        let site_path = self.site_path(path, target)?;
        Ok(Dependency::External(members.externals().register(path, site_path)))
    }

    fn site_path(&self, path: &Path, target: &str) -> Result<RelativePathBuf, ResolveError> {
        path.strip_prefix(self.root())
            .ok()
            .and_then(|relative| RelativePathBuf::from_path(relative).ok())
            .ok_or_else(|| ResolveError::InvalidPath {
                target: target.to_string(),
                path: path.to_path_buf(),
            })
    }
}

/// Join `path` onto `dir`, folding `.` and `..` without touching the
/// filesystem.
fn absolutize(dir: &Path, path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        let mut absolute = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::ParentDir => {
                    absolute.pop();
                }
                Component::CurDir => {}
                other => absolute.push(other),
            }
        }
        absolute
    } else {
        RelativePath::new(path).to_logical_path(dir)
    }
}

/// Render context for the pages of one file.
///
/// Resolves links through the website and collects the warnings raised on
/// the way. Warnings come from the resolution cached on each link, so a
/// file rendered again still reports them.
pub struct FileContext<'w> {
    website: &'w Website,
    file: FileId,
    base_url: String,
    preview: bool,
    warnings: RefCell<Vec<Warning>>,
}

impl<'w> FileContext<'w> {
    pub fn new(website: &'w Website, file: FileId, base_url: impl Into<String>, preview: bool) -> Self {
        Self {
            website,
            file,
            base_url: base_url.into(),
            preview,
            warnings: RefCell::new(Vec::new()),
        }
    }

    fn warn(&self, message: String) {
        let path = self.website.file(self.file).path();
        log::warn!("{}: {message}", path.display());
        self.warnings.borrow_mut().push(Warning::new(path, message));
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings.into_inner()
    }
}

impl RenderContext for FileContext<'_> {
    fn resolve_link(&self, target: &str) -> Result<LinkResolution, RenderError> {
        let resolution = self
            .website
            .resolve_link(self.file, target)
            .map_err(|error| RenderError::link(target, error))?;

        let unpublished = match &resolution.dependency {
            Some(Dependency::File(id)) => self.website.file(*id).is_draft(),
            Some(Dependency::Container(container)) => {
                self.website.container_index(*container).is_draft()
            }
            Some(Dependency::External(_)) | None => false,
        };
        Ok(LinkResolution {
            link: resolution.link,
            warning: resolution.warning,
            unpublished,
        })
    }

    fn report_link(&self, target: &str, resolution: &LinkResolution) {
        if let Some(message) = &resolution.warning {
            self.warn(message.clone());
        }
        if resolution.unpublished && !self.preview {
            self.warn(format!("'{target}' links to a draft, which is not published"));
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn preview(&self) -> bool {
        self.preview
    }
}

/// Resolves every link it visits, stopping at the first fatal error.
struct LinkChecker<'c, 'w> {
    ctx: &'c FileContext<'w>,
    links: usize,
    error: Option<RenderError>,
}

impl Visitor for LinkChecker<'_, '_> {
    fn visit_link(&mut self, link: &Link) {
        if self.error.is_some() {
            return;
        }
        self.links += 1;
        if let Err(error) = link.resolve(self.ctx) {
            self.error = Some(error);
        }
    }
}

/// Outcome of [`Website::check_links`].
#[derive(Debug, Default)]
pub struct LinkReport {
    pub links: usize,
    pub warnings: Vec<Warning>,
}

impl Website {
    /// Resolve every link of every published file (every file in preview)
    /// without rendering anything.
    pub fn check_links(&self, preview: bool) -> Result<LinkReport, BuildError> {
        let mut report = LinkReport::default();
        for (id, file) in self.files() {
            if file.is_draft() && !preview {
                continue;
            }
            report.warnings.extend(
                file.warnings()
                    .iter()
                    .map(|warning| Warning::new(file.path(), warning.to_string())),
            );

            let ctx = FileContext::new(self, id, "", preview);
            let mut checker = LinkChecker {
                ctx: &ctx,
                links: 0,
                error: None,
            };
            walk(file.nodes(), &mut checker);
            report.links += checker.links;
            if let Some(source) = checker.error {
                return Err(BuildError::Render {
                    path: file.path().to_path_buf(),
                    source,
                });
            }
            report.warnings.extend(ctx.into_warnings());
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_site_dir};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn load(site: &TempDir) -> Website {
        Website::load(site.path()).unwrap()
    }

    fn file_id(website: &Website, site: &TempDir, relative: &str) -> FileId {
        website.find_file(&site.path().join(relative)).unwrap()
    }

    fn render(website: &Website, id: FileId) -> (String, Vec<Warning>) {
        let ctx = FileContext::new(website, id, "https://example.com", false);
        let html = website.file(id).render(&ctx).unwrap();
        (html, ctx.into_warnings())
    }

    #[test]
    fn test_sibling_link_renders_file_url() {
        // Given a file linking to a sibling
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[file:other.org][See other]]");
        create_test_file(&site, "other.org", "Other");
        let website = load(&site);

        // When rendering the linking file
        let (html, warnings) = render(&website, file_id(&website, &site, "a.org"));

        // Then the anchor points at the sibling's url
        assert_eq!(html, "<p><a href=\"https://example.com/other\">See other</a></p>");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_target_is_fatal() {
        // Given a link to a file that does not exist
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[file:other.org][See other]]");
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");

        // When resolving it
        let error = website.resolve_link(a, "file:other.org").unwrap_err();

        // Then resolution fails
        assert!(matches!(error, ResolveError::Missing { .. }));
        let ctx = FileContext::new(&website, a, "", false);
        assert!(website.file(a).render(&ctx).is_err());
    }

    #[test]
    fn test_link_outside_root_is_fatal() {
        // Given a link that climbs out of the website
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "Text");
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");

        // When resolving it, Then it is rejected before touching the file
        assert!(matches!(
            website.resolve_link(a, "file:../../etc/passwd"),
            Err(ResolveError::OutsideRoot { .. })
        ));
        assert!(matches!(
            website.resolve_link(a, "file:/etc/passwd"),
            Err(ResolveError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_link_into_project_and_back_up() {
        // Given a project member linking out of its project and into another
        let site = create_test_site_dir();
        create_test_file(&site, "about.org", "About");
        create_test_file(&site, "blog/index.org", "Blog");
        create_test_file(&site, "blog/post.org", "[[file:../about.org]] [[file:../notes/]]");
        create_test_file(&site, "notes/index.org", "Notes");
        let website = load(&site);
        let post = file_id(&website, &site, "blog/post.org");

        // When resolving both links
        let about = website.resolve_link(post, "file:../about.org").unwrap();
        let notes = website.resolve_link(post, "file:../notes/").unwrap();

        // Then the website supplies the page and the other project itself
        assert_eq!(
            about.link,
            ResolvedLink::Page {
                path: "about".to_string(),
                fragment: None
            }
        );
        let notes_project = website.projects().find(|(_, p)| p.id() == "notes").unwrap().0;
        assert_eq!(
            notes.dependency,
            Some(Dependency::Container(ContainerId::Project(notes_project)))
        );
    }

    #[test]
    fn test_index_file_link_resolves_to_container() {
        // Given a link to a project's index file
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "Text");
        create_test_file(&site, "blog/index.org", "Blog");
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");

        // When resolving it
        let resolution = website.resolve_link(a, "file:blog/index.org").unwrap();

        // Then it is the project page
        assert_eq!(
            resolution.link,
            ResolvedLink::Page {
                path: "blog".to_string(),
                fragment: None
            }
        );
    }

    #[rstest]
    #[case("file:other.org::*Second Part", Some("second-part"))]
    #[case("file:other.org::#custom", Some("custom"))]
    #[case("file:other.org::*Nowhere", None)]
    fn test_section_references(#[case] target: &str, #[case] fragment: Option<&str>) {
        // Given a file with two sections, one with a custom id
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "Text");
        create_test_file(
            &site,
            "other.org",
            "* First\n:PROPERTIES:\n:CUSTOM_ID: custom\n:END:\n* Second Part\n",
        );
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");

        // When resolving the reference
        let resolution = website.resolve_link(a, target).unwrap();

        // Then it points at the section, or dangles with a warning
        match fragment {
            Some(id) => {
                assert_eq!(
                    resolution.link,
                    ResolvedLink::Page {
                        path: "other".to_string(),
                        fragment: Some(id.to_string())
                    }
                );
                assert_eq!(resolution.warning, None);
            }
            None => {
                assert_eq!(resolution.link, ResolvedLink::Dangling);
                assert!(resolution.warning.is_some());
            }
        }
    }

    #[test]
    fn test_same_file_section_links() {
        // Given links to sections of the same file
        let site = create_test_site_dir();
        create_test_file(
            &site,
            "a.org",
            "[[*Details][details]] [[#nope]]\n\n* Details\nBody\n",
        );
        let website = load(&site);

        // When rendering
        let (html, warnings) = render(&website, file_id(&website, &site, "a.org"));

        // Then the known section is an anchor and the unknown one plain text
        assert_eq!(
            html,
            "<p><a href=\"#details\">details</a> #nope</p>\n<h2 id=\"details\">Details</h2>\n<p>Body</p>"
        );
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_scheme_degrades_to_text() {
        // Given a link with a scheme the resolver does not know
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[ftp://example.com/x][files]]");
        let website = load(&site);

        // When rendering
        let (html, warnings) = render(&website, file_id(&website, &site, "a.org"));

        // Then only the label remains
        assert_eq!(html, "<p>files</p>");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_external_files_are_registered_once() {
        // Given two pages showing the same image
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[file:images/cat.png][A cat]]");
        create_test_file(&site, "b.org", "[[file:./images/../images/cat.png]]");
        create_test_file(&site, "images/cat.png", "png");
        let website = load(&site);

        // When rendering both
        let (a_html, _) = render(&website, file_id(&website, &site, "a.org"));
        render(&website, file_id(&website, &site, "b.org"));

        // Then the image is registered once and rendered as an img
        assert_eq!(
            a_html,
            "<p><img src=\"https://example.com/images/cat.png\" alt=\"A cat\"></p>"
        );
        let externals = website.external_files();
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].site_path(), RelativePath::new("images/cat.png"));
    }

    #[test]
    fn test_project_assets_register_with_the_project() {
        // Given a project member linking to a file in its own directory
        let site = create_test_site_dir();
        create_test_file(&site, "blog/index.org", "Blog");
        create_test_file(&site, "blog/post.org", "[[file:data.csv][data]]");
        create_test_file(&site, "blog/data.csv", "a,b");
        let website = load(&site);
        let post = file_id(&website, &site, "blog/post.org");

        // When resolving it
        website.resolve_link(post, "file:data.csv").unwrap();

        // Then the project holds the registration
        let blog = website.projects().next().unwrap().1;
        assert_eq!(blog.members().externals().len(), 1);
        assert!(website.members(ContainerId::Website).externals().is_empty());
    }

    #[test]
    fn test_rendering_twice_does_not_resolve_again() {
        // Given a rendered file with a link
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[file:b.org]] and [[https://example.com]]");
        create_test_file(&site, "b.org", "B");
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");
        let (first, _) = render(&website, a);
        assert_eq!(website.resolutions(), 1);

        // When rendering it again, with another base
        let ctx = FileContext::new(&website, a, "https://other.org", false);
        let second = website.file(a).render(&ctx).unwrap();

        // Then the cached resolution is reused
        assert_eq!(website.resolutions(), 1);
        assert_eq!(first.replace("https://example.com/b", "https://other.org/b"), second);
    }

    #[test]
    fn test_release_warns_on_links_to_drafts() {
        // Given a page linking to a draft
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[file:b.org][later]]");
        create_test_file(&site, "b.org", "#+DRAFT: t\n\nNot yet");
        let website = load(&site);

        // When rendering for release
        let (_, warnings) = render(&website, file_id(&website, &site, "a.org"));

        // Then the draft link is reported
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("draft"));
    }

    #[test]
    fn test_warnings_survive_cached_resolutions() {
        // Given a page with a dangling section link and a link to a draft
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "[[file:b.org::*Gone]] [[file:c.org][later]]");
        create_test_file(&site, "b.org", "B");
        create_test_file(&site, "c.org", "#+DRAFT: t

Not yet");
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");

        // When checking links in preview, then rendering for release
        let report = website.check_links(true).unwrap();
        let (_, warnings) = render(&website, a);

        // Then the preview check reports the dangling link only
        assert_eq!(report.warnings.len(), 1);
        // And the release render reports both from the cached resolutions
        assert_eq!(website.resolutions(), 2);
        let messages = warnings.iter().map(|w| w.message.as_str()).collect::<Vec<_>>();
        assert_eq!(messages.len(), 2, "{messages:?}");
        assert!(messages[0].contains("Gone"));
        assert!(messages[1].contains("draft"));
    }

    #[test]
    fn test_directory_that_is_not_a_project() {
        // Given a link to an ignored asset directory
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "Text");
        create_test_file(&site, "images/cat.png", "png");
        let website = load(&site);
        let a = file_id(&website, &site, "a.org");

        // When resolving it, Then it is refused
        assert!(matches!(
            website.resolve_link(a, "file:images"),
            Err(ResolveError::NotAProject { .. })
        ));
    }

    #[test]
    fn test_check_links_collects_warnings() {
        // Given a file with a parse warning and a dangling section link
        let site = create_test_site_dir();
        create_test_file(&site, "a.org", "*unclosed and [[file:b.org::*Gone]]");
        create_test_file(&site, "b.org", "B");
        let website = load(&site);

        // When checking links
        let report = website.check_links(false).unwrap();

        // Then both findings are reported
        assert_eq!(report.links, 1);
        assert_eq!(report.warnings.len(), 2);
    }
}
