//! Inline runs: plain text, emphasis and links.

use once_cell::sync::OnceCell;

use crate::error::RenderError;
use crate::tree::render::RenderContext;

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Link(Link),
}

impl Inline {
    /// Text as it reads without markup: a link contributes its description
    /// or, lacking one, its target.
    pub fn plain_text(&self) -> &str {
        match self {
            Inline::Text(text) | Inline::Bold(text) | Inline::Italic(text) => text,
            Inline::Link(link) => link.label(),
        }
    }
}

/// `style` value from a preceding `#+ATTR_HTML: :style ...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleAttribute(pub String);

/// What a link target turned out to point at.
///
/// Paths are relative to the site root and carry no base URL, so a cached
/// resolution stays valid for any base the page is rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLink {
    /// Absolute URL outside the site, used verbatim.
    External(String),
    /// A page or container index, optionally pointing at a section.
    Page {
        path: String,
        fragment: Option<String>,
    },
    /// A section of the page being rendered.
    Anchor(String),
    /// A non-markup file copied into the output.
    Asset { path: String },
    /// The target could not be resolved; rendered as plain text.
    Dangling,
}

/// A [`ResolvedLink`] together with what the resolver noticed on the way.
/// It is cached on the link and handed to
/// [`RenderContext::report_link`] on every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolution {
    pub link: ResolvedLink,
    /// Reason the link was degraded or partly ignored.
    pub warning: Option<String>,
    /// The target page exists but is not published.
    pub unpublished: bool,
}

impl From<ResolvedLink> for LinkResolution {
    fn from(link: ResolvedLink) -> Self {
        Self {
            link,
            warning: None,
            unpublished: false,
        }
    }
}

/// `[[target]]` or `[[target][description]]`.
#[derive(Debug, Clone)]
pub struct Link {
    pub target: String,
    pub description: Option<String>,
    pub style: Option<StyleAttribute>,
    resolved: OnceCell<LinkResolution>,
}

impl Link {
    pub fn new(target: impl Into<String>, description: Option<String>) -> Self {
        Self {
            target: target.into(),
            description,
            style: None,
            resolved: OnceCell::new(),
        }
    }

    pub fn with_style(mut self, style: Option<StyleAttribute>) -> Self {
        self.style = style;
        self
    }

    /// Description if given, target otherwise.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.target)
    }

    /// Resolve the target through `ctx`, at most once per link. Every call,
    /// cached or not, reports the resolution back to `ctx`.
    pub fn resolve(&self, ctx: &dyn RenderContext) -> Result<&ResolvedLink, RenderError> {
        let resolution = self
            .resolved
            .get_or_try_init(|| ctx.resolve_link(&self.target))?;
        ctx.report_link(&self.target, resolution);
        Ok(&resolution.link)
    }

    pub fn resolution(&self) -> Option<&LinkResolution> {
        self.resolved.get()
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.description == other.description
            && self.style == other.style
    }
}

/// Append a text run, merging it into a preceding text run.
pub(crate) fn push_text(runs: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = runs.last_mut() {
        last.push_str(text);
    } else {
        runs.push(Inline::Text(text.to_string()));
    }
}

/// Append a run, merging adjacent text.
pub(crate) fn push_inline(runs: &mut Vec<Inline>, inline: Inline) {
    match inline {
        Inline::Text(text) => push_text(runs, &text),
        other => runs.push(other),
    }
}

pub(crate) fn plain_text(runs: &[Inline]) -> String {
    runs.iter().map(Inline::plain_text).collect()
}
