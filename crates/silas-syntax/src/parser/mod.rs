//! # Parser
//!
//! A recursive-descent parser over the token slice produced by the
//! [`lexer`](crate::lexer). Grammar rules are free functions in
//! [`grammar`] that take `&mut Parser` and return the node they built.
//!
//! ## Errors and Recovery
//!
//! Structural problems (an unterminated block, a malformed properties drawer,
//! a misnumbered list) abort the parse with a [`SyntaxError`]. Inside a line
//! of text the parser is lenient instead: each inline element is tried from
//! a checkpoint, and when it fails the cursor rewinds and the opening
//! delimiter is kept as literal text. Those failures are collected as
//! warnings on the [`ParsedFile`].
//!
//! ```
//! use silas_syntax::parse;
//!
//! let parsed = parse("*not closed").unwrap();
//! assert_eq!(parsed.warnings.len(), 1);
//! ```
//!
//! ## Pending Attributes
//!
//! `#+ATTR_HTML: :style ...` applies to the next link. The grammar rules
//! pass the pending style down as `&mut Option<StyleAttribute>` until a link
//! takes it; one still pending at the end of the file produces a warning.

mod grammar;

use std::collections::HashSet;

use crate::cursor::TokenCursor;
use crate::error::SyntaxError;
use crate::lexer::tokenize;
use crate::token::Token;
use crate::tree::{Node, Preamble, StyleAttribute};

/// Result of parsing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub preamble: Preamble,
    pub nodes: Vec<Node>,
    /// Recovered inline errors and other non-fatal findings.
    pub warnings: Vec<SyntaxError>,
}

pub struct Parser<'t, 'a> {
    pub(crate) tokens: TokenCursor<'t, 'a>,
    section_ids: HashSet<String>,
    warnings: Vec<SyntaxError>,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens: TokenCursor::new(tokens),
            section_ids: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<ParsedFile, SyntaxError> {
        let preamble = grammar::preamble(&mut self)?;
        let mut pending = None;
        let nodes = grammar::nodes(&mut self, None, &mut pending)?;

        if let Some(StyleAttribute(style)) = pending {
            let location = self.tokens.location();
            self.warn(SyntaxError::malformed(
                location,
                format!("style '{style}' is not followed by a link"),
            ));
        }

        Ok(ParsedFile {
            preamble,
            nodes,
            warnings: self.warnings,
        })
    }

    pub(crate) fn warn(&mut self, warning: SyntaxError) {
        log::debug!("recovered: {warning}");
        self.warnings.push(warning);
    }

    /// Record a section id, returning `false` if the file already used it.
    pub(crate) fn claim_section_id(&mut self, id: &str) -> bool {
        self.section_ids.insert(id.to_string())
    }
}

/// Tokenize and parse `source`.
pub fn parse(source: &str) -> Result<ParsedFile, SyntaxError> {
    let tokens = tokenize(source)?;
    Parser::new(&tokens).parse()
}
