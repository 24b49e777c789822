//! # Token Cursor
//!
//! A read position over a token slice. Grammar rules inspect the tokens
//! ahead with `peek`/`nth` and consume them with the `pop` family.
//!
//! ## Checkpoints
//!
//! Speculative parsing works by taking a [`Checkpoint`] before trying a rule
//! and reverting to it when the rule fails:
//!
//! ```
//! use silas_syntax::lexer::tokenize;
//! use silas_syntax::{TokenCursor, TokenKind};
//!
//! let tokens = tokenize("[not a link").unwrap();
//! let mut cursor = TokenCursor::new(&tokens);
//!
//! let checkpoint = cursor.start_checkpoint();
//! cursor.pop_expected(TokenKind::LeftSquareBrace).unwrap();
//! assert!(cursor.pop_expected(TokenKind::LeftSquareBrace).is_err());
//! assert_eq!(cursor.checkpoint_as_text(checkpoint), "[");
//!
//! cursor.revert_checkpoint(checkpoint);
//! assert_eq!(cursor.peek_kind(), Some(TokenKind::LeftSquareBrace));
//! ```
//!
//! A checkpoint is just a saved position, so checkpoints nest freely and
//! reverting an outer one also discards everything an inner one saw.

use crate::error::SyntaxError;
use crate::token::{Location, Token, TokenKind, tokens_to_string};

/// Saved cursor position. Obtained from [`TokenCursor::start_checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

pub struct TokenCursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> TokenCursor<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn has_tokens(&self) -> bool {
        self.pos < self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.nth_kind(0)
    }

    /// The token `n` positions ahead.
    pub fn nth(&self, n: usize) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    pub fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.nth(n).map(|t| t.kind)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// `-`/`+` followed by a space, or a number followed by `.` and a space.
    pub fn at_list_start(&self) -> bool {
        match self.peek_kind() {
            Some(TokenKind::Minus | TokenKind::Plus) => {
                self.nth_kind(1) == Some(TokenKind::Whitespace)
            }
            Some(TokenKind::Number) => {
                self.nth_kind(1) == Some(TokenKind::Dot)
                    && self.nth_kind(2) == Some(TokenKind::Whitespace)
            }
            _ => false,
        }
    }

    /// Position of the next token, or of the end of the last one.
    pub fn location(&self) -> Location {
        match self.peek().or_else(|| self.tokens.last()) {
            Some(token) => token.location(),
            None => Location::new(1, 1),
        }
    }

    /// Consume the next token.
    pub fn pop(&mut self) -> Result<Token<'a>, SyntaxError> {
        let token = *self.peek().ok_or_else(|| SyntaxError::UnexpectedEof {
            expected: "a token".to_string(),
        })?;
        self.pos += 1;
        Ok(token)
    }

    /// Consume the next token only if it satisfies `pred`.
    pub fn pop_if(&mut self, pred: impl Fn(&Token<'a>) -> bool) -> Option<Token<'a>> {
        let token = *self.peek().filter(|t| pred(t))?;
        self.pos += 1;
        Some(token)
    }

    /// Consume tokens while they satisfy `pred`.
    pub fn pop_while(&mut self, pred: impl Fn(&Token<'a>) -> bool) -> &'t [Token<'a>] {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.tokens[start..self.pos]
    }

    /// Consume tokens up to, not including, the first one satisfying `pred`.
    pub fn pop_until(&mut self, pred: impl Fn(&Token<'a>) -> bool) -> &'t [Token<'a>] {
        self.pop_while(|t| !pred(t))
    }

    /// Consume the next token, failing if it is not of `kind`.
    pub fn pop_expected(&mut self, kind: TokenKind) -> Result<Token<'a>, SyntaxError> {
        match self.peek() {
            Some(token) if token.is(kind) => {
                self.pos += 1;
                Ok(*token)
            }
            Some(token) => Err(SyntaxError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                location: token.location(),
            }),
            None => Err(SyntaxError::UnexpectedEof {
                expected: kind.to_string(),
            }),
        }
    }

    /// Consume one token of each kind in order. Tokens matched before a
    /// mismatch stay consumed.
    pub fn pop_sequence(&mut self, kinds: &[TokenKind]) -> Result<&'t [Token<'a>], SyntaxError> {
        let start = self.pos;
        for kind in kinds {
            self.pop_expected(*kind)?;
        }
        Ok(&self.tokens[start..self.pos])
    }

    #[must_use = "a checkpoint is only useful if it is reverted or inspected"]
    pub fn start_checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn revert_checkpoint(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    /// Tokens consumed since `checkpoint` was taken.
    pub fn consumed_since(&self, checkpoint: Checkpoint) -> &'t [Token<'a>] {
        &self.tokens[checkpoint.0.min(self.pos)..self.pos]
    }

    /// Source text of the tokens consumed since `checkpoint` was taken.
    pub fn checkpoint_as_text(&self, checkpoint: Checkpoint) -> String {
        tokens_to_string(self.consumed_since(checkpoint))
    }
}
