//! # Inline-Level Grammar
//!
//! A line of text is a sequence of inline elements, dispatched on the
//! current token:
//!
//! | Token | Element |
//! |-------|---------|
//! | `[` | link: `[[target]]` or `[[target][description]]` |
//! | `*` | bold: `*text*` |
//! | `/` | italic: `/text/` |
//! | (other) | plain text |
//!
//! ## Recovery
//!
//! Every element is attempted from a checkpoint. If it fails (an unclosed
//! delimiter, empty content, a link missing its second bracket) the cursor
//! goes back to the checkpoint, the opening delimiter alone becomes literal
//! text, and parsing carries on with the token after it. The failure is
//! recorded as a warning; it never aborts the file.
//!
//! Emphasis follows the usual org conventions so prose like `a/b`,
//! `http://x.org/y` or `2 * 3 * 4` stays text: the opening delimiter must
//! start the line or follow a space or one of `-({'"`, the content may not
//! start with a space, and the closing delimiter may not be directly
//! followed by a word. Delimiters in any other position are plain text and
//! never produce a warning.

use crate::error::SyntaxError;
use crate::parser::Parser;
use crate::token::{TokenKind, tokens_to_string};
use crate::tree::inline::{plain_text, push_inline, push_text};
use crate::tree::{Inline, Link, StyleAttribute};

/// Parse inline elements up to the end of the line. A trailing newline is
/// consumed; a section start is left for the caller. The first link on the
/// line takes the `pending` style.
pub(super) fn line(
    p: &mut Parser<'_, '_>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Vec<Inline>, SyntaxError> {
    let mut runs = Vec::new();
    let mut previous = None;

    while p.tokens.peek_kind().is_some_and(TokenKind::is_text) {
        let checkpoint = p.tokens.start_checkpoint();
        match element(p, previous, pending) {
            Ok(inline) => push_inline(&mut runs, inline),
            Err(error) => {
                log::trace!(
                    "{:?} is not markup: {error}",
                    p.tokens.checkpoint_as_text(checkpoint)
                );
                p.tokens.revert_checkpoint(checkpoint);
                p.warn(error);
                let delimiter = p.tokens.pop()?;
                push_text(&mut runs, delimiter.text);
            }
        }
        previous = p.tokens.consumed_since(checkpoint).last().map(|t| t.kind);
    }

    p.tokens.pop_if(|t| t.is(TokenKind::Newline));
    Ok(runs)
}

/// A heading line reduced to plain text. Links in a title never take a
/// pending style.
pub(super) fn title(p: &mut Parser<'_, '_>) -> Result<String, SyntaxError> {
    let runs = line(p, &mut None)?;
    Ok(plain_text(&runs).trim().to_string())
}

/// Tokens after which an emphasis delimiter may open.
fn opens_emphasis(previous: Option<TokenKind>) -> bool {
    matches!(
        previous,
        None | Some(
            TokenKind::Whitespace
                | TokenKind::Tab
                | TokenKind::Minus
                | TokenKind::LeftParenthesis
                | TokenKind::LeftCurlyBrace
                | TokenKind::SingleQuote
                | TokenKind::QuotationMark
        )
    )
}

fn element(
    p: &mut Parser<'_, '_>,
    previous: Option<TokenKind>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Inline, SyntaxError> {
    let may_open = opens_emphasis(previous);

    match p.tokens.peek_kind() {
        Some(TokenKind::LeftSquareBrace) => link(p, pending).map(Inline::Link),
        Some(TokenKind::Asterisk) if may_open => emphasis(p, TokenKind::Asterisk).map(Inline::Bold),
        Some(TokenKind::Slash) if may_open => emphasis(p, TokenKind::Slash).map(Inline::Italic),
        _ => Ok(Inline::Text(p.tokens.pop()?.text.to_string())),
    }
}

fn link(
    p: &mut Parser<'_, '_>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Link, SyntaxError> {
    p.tokens
        .pop_sequence(&[TokenKind::LeftSquareBrace, TokenKind::LeftSquareBrace])?;
    let target = enclosed(p, TokenKind::RightSquareBrace, "link target")?;
    let description = match p.tokens.pop_if(|t| t.is(TokenKind::LeftSquareBrace)) {
        Some(_) => Some(enclosed(p, TokenKind::RightSquareBrace, "link description")?),
        None => None,
    };
    p.tokens.pop_expected(TokenKind::RightSquareBrace)?;

    Ok(Link::new(target, description).with_style(pending.take()))
}

fn emphasis(p: &mut Parser<'_, '_>, delimiter: TokenKind) -> Result<String, SyntaxError> {
    let open = p.tokens.pop_expected(delimiter)?;
    if p.tokens.at(TokenKind::Whitespace) {
        return Err(SyntaxError::malformed(
            open.location(),
            format!("{delimiter} is followed by a space"),
        ));
    }

    let content = enclosed(p, delimiter, "emphasis")?;

    if let Some(next) = p
        .tokens
        .peek()
        .filter(|t| matches!(t.kind, TokenKind::Word | TokenKind::Number))
    {
        return Err(SyntaxError::malformed(
            next.location(),
            format!("closing {delimiter} is followed by a word"),
        ));
    }
    Ok(content)
}

/// Non-empty text up to and including `close`, all on the current line.
fn enclosed(
    p: &mut Parser<'_, '_>,
    close: TokenKind,
    what: &str,
) -> Result<String, SyntaxError> {
    let location = p.tokens.location();
    let content = p
        .tokens
        .pop_while(|t| t.kind.is_text() && !t.is(close));
    p.tokens.pop_expected(close)?;
    if content.is_empty() {
        return Err(SyntaxError::malformed(location, format!("empty {what}")));
    }
    Ok(tokens_to_string(content))
}
