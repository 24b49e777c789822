//! # Lists
//!
//! ```text
//! - first entry            unordered, continuation indent 2
//!   continued text
//!   1. nested ordered      ordered, continuation indent 3
//!   2. second
//! - second entry
//! ```
//!
//! An entry owns every following line indented by at least its
//! continuation width; a line with a list marker at that indentation starts
//! a nested list. After an entry, the list goes on only if the next line
//! holds the same kind of marker at the list's own indentation. Ordered
//! lists must count 1, 2, 3, ... without gaps.

use super::inline;
use crate::error::SyntaxError;
use crate::parser::Parser;
use crate::token::{Token, TokenKind};
use crate::tree::inline::{push_inline, push_text};
use crate::tree::{EntryContent, Inline, List, ListEntry, ListStyle, StyleAttribute};

/// Parse a list whose markers sit at `indentation` columns. The cursor is
/// on the first marker, already past the indentation.
pub(super) fn list(
    p: &mut Parser<'_, '_>,
    indentation: usize,
    pending: &mut Option<StyleAttribute>,
) -> Result<List, SyntaxError> {
    let style = first_marker(p)?;
    let continuation = indentation + style.indentation();

    let mut entries = vec![entry(p, continuation, pending)?];
    while next_marker(p, style, indentation, entries.len() as u64 + 1)? {
        entries.push(entry(p, continuation, pending)?);
    }

    Ok(List { style, entries })
}

fn first_marker(p: &mut Parser<'_, '_>) -> Result<ListStyle, SyntaxError> {
    let marker = p.tokens.pop()?;
    let style = match marker.kind {
        TokenKind::Minus | TokenKind::Plus => {
            ListStyle::Unordered(marker.text.chars().next().unwrap_or('-'))
        }
        TokenKind::Number => {
            check_number(&marker, 1)?;
            p.tokens.pop_expected(TokenKind::Dot)?;
            ListStyle::Ordered
        }
        found => {
            return Err(SyntaxError::UnexpectedToken {
                expected: TokenKind::Minus,
                found,
                location: marker.location(),
            });
        }
    };
    p.tokens.pop_expected(TokenKind::Whitespace)?;
    Ok(style)
}

fn check_number(marker: &Token<'_>, expected: u64) -> Result<(), SyntaxError> {
    if marker.text.parse::<u64>().ok() == Some(expected) {
        Ok(())
    } else {
        Err(SyntaxError::ListNumbering {
            expected,
            found: marker.text.to_string(),
            location: marker.location(),
        })
    }
}

/// Consume the marker of the next entry if the list continues.
fn next_marker(
    p: &mut Parser<'_, '_>,
    style: ListStyle,
    indentation: usize,
    number: u64,
) -> Result<bool, SyntaxError> {
    let checkpoint = p.tokens.start_checkpoint();
    if !indented(p, indentation) || !at_marker(p, style) {
        p.tokens.revert_checkpoint(checkpoint);
        return Ok(false);
    }

    let marker = p.tokens.pop()?;
    if style == ListStyle::Ordered {
        check_number(&marker, number)?;
        p.tokens.pop_expected(TokenKind::Dot)?;
    }
    p.tokens.pop_expected(TokenKind::Whitespace)?;
    Ok(true)
}

fn at_marker(p: &Parser<'_, '_>, style: ListStyle) -> bool {
    if !p.tokens.at_list_start() {
        return false;
    }
    match style {
        ListStyle::Ordered => p.tokens.at(TokenKind::Number),
        ListStyle::Unordered(marker) => p.tokens.peek().is_some_and(|t| t.text.starts_with(marker)),
    }
}

/// Consume exactly `columns` leading spaces, or nothing at all.
fn indented(p: &mut Parser<'_, '_>, columns: usize) -> bool {
    let checkpoint = p.tokens.start_checkpoint();
    for _ in 0..columns {
        if p.tokens.pop_if(|t| t.is(TokenKind::Whitespace)).is_none() {
            p.tokens.revert_checkpoint(checkpoint);
            return false;
        }
    }
    true
}

fn entry(
    p: &mut Parser<'_, '_>,
    continuation: usize,
    pending: &mut Option<StyleAttribute>,
) -> Result<ListEntry, SyntaxError> {
    let mut content = Vec::new();
    let mut text = inline::line(p, pending)?;

    loop {
        let checkpoint = p.tokens.start_checkpoint();
        if !indented(p, continuation) {
            break;
        }
        if p.tokens.at_list_start() {
            flush(&mut content, &mut text);
            content.push(EntryContent::List(list(p, continuation, pending)?));
        } else if p.tokens.peek_kind().is_some_and(TokenKind::is_text) {
            if !text.is_empty() {
                push_text(&mut text, "\n");
            }
            for inline in inline::line(p, pending)? {
                push_inline(&mut text, inline);
            }
        } else {
            // only whitespace on this line
            p.tokens.revert_checkpoint(checkpoint);
            break;
        }
    }

    flush(&mut content, &mut text);
    Ok(ListEntry { content })
}

fn flush(content: &mut Vec<EntryContent>, text: &mut Vec<Inline>) {
    if !text.is_empty() {
        content.push(EntryContent::Text(std::mem::take(text)));
    }
}
