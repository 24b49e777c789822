use std::fmt;
use std::path::PathBuf;

use silas_syntax::{RenderError, SyntaxError};

use crate::io::IoError;

/// Failures while reading a website into memory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("{}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("{} has no index.org", .dir.display())]
    MissingIndex { dir: PathBuf },

    #[error("duplicate id '{id}': {} and {}", .first.display(), .second.display())]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Fatal failures while resolving a `file:` link.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("'{target}' points to a path outside of the website: {}", .path.display())]
    OutsideRoot { target: String, path: PathBuf },

    #[error("'{target}' points to {}, which cannot be read", .path.display())]
    Missing {
        target: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{target}' points to invalid org file {}", .path.display())]
    InvalidFile { target: String, path: PathBuf },

    #[error("'{target}' points to directory {}, which is not a project", .path.display())]
    NotAProject { target: String, path: PathBuf },

    #[error("'{target}' points to {}, which has no UTF-8 site path", .path.display())]
    InvalidPath { target: String, path: PathBuf },
}

/// Failures while writing a website to its output directory.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("{}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("{} is published without a summary", .path.display())]
    MissingSummary { path: PathBuf },

    #[error("{} would be written twice", .path.display())]
    DuplicateOutput { path: PathBuf },
}

/// A problem that did not stop the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub file: PathBuf,
    pub message: String,
}

impl Warning {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}
