use std::path::{Path, PathBuf};

use silas_syntax::error::RenderError;
use silas_syntax::tree::preamble::Preamble;
use silas_syntax::tree::render::{RenderContext, render_nodes};
use silas_syntax::tree::{Node, slugify, titlecase};
use silas_syntax::{ParsedFile, SyntaxError, parse};

use super::ContainerId;
use crate::error::LoadError;
use crate::io;

/// Whether a file describes its container or is a member of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Index,
    Page,
}

/// A parsed markup file and its place in the website.
#[derive(Debug)]
pub struct OrgFile {
    path: PathBuf,
    id: String,
    role: FileRole,
    container: ContainerId,
    parsed: ParsedFile,
}

impl OrgFile {
    /// Read and parse `path`. Only the website loader creates files, so the
    /// container is filled in once the hierarchy is assembled.
    pub(crate) fn load(path: PathBuf, role: FileRole) -> Result<Self, LoadError> {
        log::info!("Parsing {}", path.display());
        let source = io::read_file(&path)?;
        let parsed = parse(&source).map_err(|source| LoadError::Syntax {
            path: path.clone(),
            source,
        })?;
        for warning in &parsed.warnings {
            log::warn!("{}: {warning}", path.display());
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        Ok(Self {
            id: slugify(&stem),
            path,
            role,
            container: ContainerId::Website,
            parsed,
        })
    }

    pub(crate) fn set_container(&mut self, container: ContainerId) {
        self.container = container;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative links in this file are resolved against.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// Slug of the file name, unique within the container.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        titlecase(&self.id)
    }

    /// The `#+TITLE:` if given, the name otherwise.
    pub fn title(&self) -> String {
        self.preamble()
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| self.name())
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn is_index(&self) -> bool {
        self.role == FileRole::Index
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn preamble(&self) -> &Preamble {
        &self.parsed.preamble
    }

    pub fn nodes(&self) -> &[Node] {
        &self.parsed.nodes
    }

    /// Recovered inline errors found while parsing.
    pub fn warnings(&self) -> &[SyntaxError] {
        &self.parsed.warnings
    }

    pub fn is_draft(&self) -> bool {
        self.parsed.preamble.is_draft()
    }

    /// Render the body to an HTML fragment.
    pub fn render(&self, ctx: &dyn RenderContext) -> Result<String, RenderError> {
        render_nodes(&self.parsed.nodes, ctx)
    }
}
