//! # silas-syntax
//!
//! Parses org outline files into a document tree and renders that tree to
//! HTML.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → ParsedFile → render(ctx) → HTML
//!               (rule table)     (recursive descent)   (RenderContext)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! An ordered table of anchored regular expressions; the first rule that
//! matches at the current position wins. Every byte of the input lands in
//! exactly one token and every token knows its line and column.
//!
//! ### 2. Cursor ([`cursor`] module)
//!
//! A position over the token slice with peek/pop primitives and
//! [`cursor::Checkpoint`]s for speculative parsing.
//!
//! ### 3. Parser ([`parser`] module)
//!
//! Recursive descent over the cursor. Structural errors are fatal;
//! malformed inline markup is recovered from and reported as a warning.
//!
//! ### 4. Tree ([`tree`] module)
//!
//! Sections, paragraphs, blocks and lists holding inline runs. Nodes render
//! through a [`tree::render::RenderContext`] that the caller supplies to
//! resolve links, and can be walked with a [`tree::visit::Visitor`].
//!
//! ## Quick Start
//!
//! ```
//! use silas_syntax::tree::render::{render_nodes, RenderContext};
//! use silas_syntax::tree::{LinkResolution, ResolvedLink};
//! use silas_syntax::{parse, RenderError};
//!
//! struct External;
//!
//! impl RenderContext for External {
//!     fn resolve_link(&self, target: &str) -> Result<LinkResolution, RenderError> {
//!         Ok(ResolvedLink::External(target.to_string()).into())
//!     }
//! }
//!
//! let parsed = parse("#+TITLE: Hello\n* Intro\nSee [[https://example.com][here]].").unwrap();
//! assert_eq!(parsed.preamble.title(), Some("Hello"));
//!
//! let html = render_nodes(&parsed.nodes, &External).unwrap();
//! assert_eq!(
//!     html,
//!     "<h2 id=\"intro\">Intro</h2>\n\
//!      <p>See <a href=\"https://example.com\" target=\"_blank\">here</a>.</p>"
//! );
//! ```

pub mod cursor;
pub mod error;
pub mod highlight;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod tree;

pub use cursor::{Checkpoint, TokenCursor};
pub use error::{RenderError, SyntaxError};
pub use parser::{ParsedFile, Parser, parse};
pub use token::{Location, Token, TokenKind};
