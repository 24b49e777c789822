//! Errors raised while lexing, parsing and rendering a single file.

use thiserror::Error;

use crate::token::{Location, TokenKind};

/// Lexing and parsing failures.
///
/// Most variants abort parsing of the file. The ones produced inside a line
/// of text are recovered from by the inline grammar and end up in
/// [`crate::ParsedFile::warnings`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("{location}: unknown character {ch:?}")]
    UnknownChar { ch: char, location: Location },

    #[error("{location}: expected {expected} but found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        location: Location,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("{location}: block '{name}' is never closed")]
    UnterminatedBlock { name: String, location: Location },

    #[error("{location}: block '{begin}' is closed by '{end}'")]
    MismatchedBlock {
        begin: String,
        end: String,
        location: Location,
    },

    #[error("{location}: list entry numbered {found}, expected {expected}")]
    ListNumbering {
        expected: u64,
        found: String,
        location: Location,
    },

    #[error("{location}: section id '{id}' is used more than once")]
    DuplicateSectionId { id: String, location: Location },

    #[error("{location}: {message}")]
    Malformed { message: String, location: Location },
}

impl SyntaxError {
    pub(crate) fn malformed(location: Location, message: impl Into<String>) -> Self {
        SyntaxError::Malformed {
            message: message.into(),
            location,
        }
    }

    /// Source position the error points at, if it has one.
    pub fn location(&self) -> Option<Location> {
        match self {
            SyntaxError::UnknownChar { location, .. }
            | SyntaxError::UnexpectedToken { location, .. }
            | SyntaxError::UnterminatedBlock { location, .. }
            | SyntaxError::MismatchedBlock { location, .. }
            | SyntaxError::ListNumbering { location, .. }
            | SyntaxError::DuplicateSectionId { location, .. }
            | SyntaxError::Malformed { location, .. } => Some(*location),
            SyntaxError::UnexpectedEof { .. } => None,
        }
    }
}

/// Failures while turning a parsed tree into HTML.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no syntax highlighting available for language '{0}'")]
    UnknownLanguage(String),

    #[error("failed to highlight {language} code: {message}")]
    Highlight { language: String, message: String },

    #[error("failed to resolve link '{target}': {source}")]
    Link {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RenderError {
    /// Wrap a resolver failure for the given link target.
    pub fn link(
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RenderError::Link {
            target: target.into(),
            source: source.into(),
        }
    }
}
