//! # HTML Rendering
//!
//! Every node renders to an HTML fragment. Rendering needs outside help for
//! two things, both supplied through a [`RenderContext`]:
//!
//! - turning a link target into a [`ResolvedLink`], which only the site
//!   model can do, and
//! - whether preview-only content such as comment blocks is shown.
//!
//! Text is escaped with `html-escape` everywhere it lands in the output.
//!
//! | Node | HTML |
//! |------|------|
//! | Section | `<h{level+2} id="...">title</h..>` then its children |
//! | Paragraph | `<p>...</p>` |
//! | Comment block | `<div class="comment-block">...</div>`, preview only |
//! | Quote block | `<blockquote><p>...</p><p class="quotee">– ...</p></blockquote>` |
//! | Code block | `<pre class="code"><code class="language-x">...</code></pre>` |
//! | List | `<ol>`/`<ul>` with one `<li>` per entry |
//! | Bold / Italic | `<b>` / `<em>` |
//! | Link | `<a>`, `<img>` for image assets, plain text when dangling |

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::RenderError;
use crate::highlight;
use crate::tree::{
    Block, EntryContent, Inline, Link, LinkResolution, List, ListEntry, ListStyle, Node, Paragraph,
    ResolvedLink, Section,
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Capabilities rendering borrows from its caller.
pub trait RenderContext {
    /// Resolve a link target. Called at most once per link node.
    fn resolve_link(&self, target: &str) -> Result<LinkResolution, RenderError>;

    /// Called on every use of a link with the resolution cached on it,
    /// including the use that resolved it.
    fn report_link(&self, _target: &str, _resolution: &LinkResolution) {}

    /// Base URL that site-relative paths are joined onto.
    fn base_url(&self) -> &str {
        ""
    }

    /// Whether unpublished content is shown.
    fn preview(&self) -> bool {
        false
    }

    /// Highlight `code` as `language`, producing class-annotated HTML.
    fn highlight(&self, language: &str, code: &str) -> Result<String, RenderError> {
        highlight::highlight(language, code)
    }

    /// Join a site-relative path onto [`RenderContext::base_url`].
    fn href(&self, path: &str) -> String {
        join_url(self.base_url(), path)
    }
}

/// Join a site-relative path onto a base URL. An empty base yields
/// root-relative URLs.
///
/// ```
/// use silas_syntax::tree::render::join_url;
/// assert_eq!(join_url("https://example.com/", "blog/first"), "https://example.com/blog/first");
/// assert_eq!(join_url("", ""), "/");
/// ```
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => base.to_string(),
        _ => format!("{base}/{path}"),
    }
}

/// Render a sequence of nodes, one fragment per line.
pub fn render_nodes(nodes: &[Node], ctx: &dyn RenderContext) -> Result<String, RenderError> {
    let parts = nodes
        .iter()
        .map(|node| node.render(ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Render a run of inline elements.
pub fn render_inlines(runs: &[Inline], ctx: &dyn RenderContext) -> Result<String, RenderError> {
    runs.iter().map(|inline| inline.render(ctx)).collect()
}

impl Node {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        match self {
            Node::Section(section) => section.render(ctx),
            Node::Paragraph(paragraph) => paragraph.render(ctx),
            Node::Block(block) => block.render(ctx),
            Node::List(list) => list.render(ctx),
        }
    }
}

impl Section {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        let tag = format!("h{}", (self.level + 2).min(6));
        let heading = format!(
            "<{tag} id=\"{}\">{}</{tag}>",
            encode_double_quoted_attribute(&self.id),
            encode_text(&self.title)
        );
        let children = render_nodes(&self.children, ctx)?;
        if children.is_empty() {
            Ok(heading)
        } else {
            Ok(format!("{heading}\n{children}"))
        }
    }
}

impl Paragraph {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        Ok(format!("<p>{}</p>", render_inlines(&self.content, ctx)?))
    }
}

impl Block {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        match self {
            Block::Comment { .. } if !ctx.preview() => Ok(String::new()),
            Block::Comment { content } => Ok(format!(
                "<div class=\"comment-block\">{}</div>",
                render_inlines(content, ctx)?
            )),
            Block::Quote { content, quotee } => {
                let mut html = format!("<blockquote><p>{}</p>", render_inlines(content, ctx)?);
                if let Some(quotee) = quotee {
                    html.push_str(&format!(
                        "<p class=\"quotee\">– {}</p>",
                        render_inlines(quotee, ctx)?
                    ));
                }
                html.push_str("</blockquote>");
                Ok(html)
            }
            Block::Code { language, lines } => {
                let code: String = lines
                    .iter()
                    .map(|line| format!("{}\n", preserve_indentation(line)))
                    .collect();
                match language {
                    Some(language) => Ok(format!(
                        "<pre class=\"code\"><code class=\"language-{}\">{}</code></pre>",
                        encode_double_quoted_attribute(language),
                        ctx.highlight(language, &code)?
                    )),
                    None => Ok(format!(
                        "<pre class=\"code\"><code>{}</code></pre>",
                        encode_text(&code)
                    )),
                }
            }
        }
    }
}

/// Swap leading spaces for non-breaking ones so indentation survives
/// copy and paste out of the page.
fn preserve_indentation(line: &str) -> String {
    let body = line.trim_start_matches(' ');
    let indent = line.len() - body.len();
    format!("{}{body}", "\u{a0}".repeat(indent))
}

impl List {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        let tag = match self.style {
            ListStyle::Ordered => "ol",
            ListStyle::Unordered(_) => "ul",
        };
        let entries = self
            .entries
            .iter()
            .map(|entry| entry.render(ctx))
            .collect::<Result<String, _>>()?;
        Ok(format!("<{tag}>{entries}</{tag}>"))
    }
}

impl ListEntry {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        let parts = self
            .content
            .iter()
            .map(|part| match part {
                EntryContent::Text(runs) => render_inlines(runs, ctx),
                EntryContent::List(list) => list.render(ctx),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("<li>{}</li>", parts.join("\n")))
    }
}

impl Inline {
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        match self {
            Inline::Text(text) => Ok(encode_text(text).into_owned()),
            Inline::Bold(text) => Ok(format!("<b>{}</b>", encode_text(text))),
            Inline::Italic(text) => Ok(format!("<em>{}</em>", encode_text(text))),
            Inline::Link(link) => link.render(ctx),
        }
    }
}

impl Link {
    /// A link without a description shows where it points; a dangling one
    /// shows its raw target.
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        let style = self
            .style
            .as_ref()
            .map(|style| format!(" style=\"{}\"", encode_double_quoted_attribute(&style.0)))
            .unwrap_or_default();

        let (href, new_tab) = match self.resolve(ctx)? {
            ResolvedLink::Dangling => return Ok(encode_text(self.label()).into_owned()),
            ResolvedLink::External(url) => (url.clone(), true),
            ResolvedLink::Page { path, fragment } => {
                let mut href = ctx.href(path);
                if let Some(fragment) = fragment {
                    href.push('#');
                    href.push_str(fragment);
                }
                (href, false)
            }
            ResolvedLink::Anchor(id) => (format!("#{id}"), false),
            ResolvedLink::Asset { path } if is_image(path) => {
                let alt = self
                    .description
                    .as_deref()
                    .map(|alt| format!(" alt=\"{}\"", encode_double_quoted_attribute(alt)))
                    .unwrap_or_default();
                return Ok(format!(
                    "<img src=\"{}\"{alt}{style}>",
                    encode_double_quoted_attribute(&ctx.href(path))
                ));
            }
            ResolvedLink::Asset { path } => (ctx.href(path), false),
        };

        let label = encode_text(self.description.as_deref().unwrap_or(&href)).into_owned();
        let target = if new_tab { " target=\"_blank\"" } else { "" };
        Ok(format!(
            "<a href=\"{}\"{target}{style}>{label}</a>",
            encode_double_quoted_attribute(&href)
        ))
    }
}

fn is_image(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
