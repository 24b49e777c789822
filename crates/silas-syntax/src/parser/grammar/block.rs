//! # Block-Level Grammar
//!
//! Sections, their properties drawers, `#+ATTR_HTML` lines and the three
//! `#+BEGIN_`/`#+END_` block kinds.
//!
//! ```text
//! * Title                  section, level 0
//! :PROPERTIES:             optional drawer, directly after the heading
//! :CUSTOM_ID: intro
//! :END:
//! #+BEGIN_SRC rust         block with arguments
//! fn main() {}
//! #+END_SRC
//! ```
//!
//! Blocks must be closed by an `#+END_` with the same name (compared without
//! regard to case). Running out of input first is an error.

use super::inline;
use crate::error::SyntaxError;
use crate::parser::Parser;
use crate::token::{Location, Token, TokenKind, tokens_to_string};
use crate::tree::inline::{push_inline, push_text};
use crate::tree::{Block, Inline, Properties, Section, StyleAttribute, slugify};

/// Zero-based level of a section start token: `*` is 0, `**` is 1.
pub(super) fn section_level(token: &Token<'_>) -> usize {
    token.text.matches('*').count().saturating_sub(1)
}

pub(super) fn section(
    p: &mut Parser<'_, '_>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Section, SyntaxError> {
    let start = p.tokens.pop_expected(TokenKind::SectionStart)?;
    let location = start.line_location();
    let level = section_level(&start);

    let title = inline::title(p)?;
    let properties = properties(p)?;
    let id = properties
        .get("CUSTOM_ID")
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&title));

    if !p.claim_section_id(&id) {
        return Err(SyntaxError::DuplicateSectionId { id, location });
    }

    let children = super::nodes(p, Some(level), pending)?;

    Ok(Section {
        level,
        title,
        id,
        properties,
        children,
    })
}

fn at_properties_drawer(p: &Parser<'_, '_>) -> bool {
    p.tokens.at(TokenKind::Colon)
        && p.tokens.nth(1).is_some_and(|t| t.text == "PROPERTIES")
        && p.tokens.nth_kind(2) == Some(TokenKind::Colon)
}

/// `:PROPERTIES:` ... `:END:` directly below a heading. Once the drawer is
/// opened every line must be a `:KEY: value` pair until `:END:`.
fn properties(p: &mut Parser<'_, '_>) -> Result<Properties, SyntaxError> {
    let mut properties = Properties::default();
    if !at_properties_drawer(p) {
        return Ok(properties);
    }

    p.tokens
        .pop_sequence(&[TokenKind::Colon, TokenKind::Word, TokenKind::Colon])?;
    p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
    p.tokens.pop_expected(TokenKind::Newline)?;

    loop {
        p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
        let location = p.tokens.location();
        p.tokens.pop_expected(TokenKind::Colon)?;
        let key = p
            .tokens
            .pop_until(|t| t.is(TokenKind::Colon) || t.kind.is_line_end());
        p.tokens.pop_expected(TokenKind::Colon)?;

        let key = tokens_to_string(key);
        if key == "END" {
            p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
            p.tokens.pop_if(|t| t.is(TokenKind::Newline));
            break;
        }
        if key.is_empty() {
            return Err(SyntaxError::malformed(location, "property without a name"));
        }

        p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
        let value = p.tokens.pop_until(|t| t.kind.is_line_end());
        p.tokens.pop_expected(TokenKind::Newline)?;
        properties.insert(key, tokens_to_string(value).trim_end());
    }

    Ok(properties)
}

/// `#+ATTR_HTML: :style <css>`. Other attribute kinds and keys are rejected.
pub(super) fn attribute(p: &mut Parser<'_, '_>) -> Result<StyleAttribute, SyntaxError> {
    let start = p.tokens.pop_sequence(&[
        TokenKind::AttributeStart,
        TokenKind::Word,
        TokenKind::Colon,
    ])?;
    if !start[1].text.eq_ignore_ascii_case("HTML") {
        return Err(SyntaxError::malformed(
            start[0].location(),
            format!("unsupported attribute '#+ATTR_{}'", start[1].text),
        ));
    }

    p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
    let key = p.tokens.pop_sequence(&[TokenKind::Colon, TokenKind::Word])?;
    if key[1].text != "style" {
        return Err(SyntaxError::malformed(
            key[0].location(),
            format!("unsupported HTML attribute ':{}', only ':style' is allowed", key[1].text),
        ));
    }

    let value = p.tokens.pop_until(|t| t.kind.is_line_end());
    p.tokens.pop_if(|t| t.is(TokenKind::Newline));

    let style = tokens_to_string(value).trim().to_string();
    if style.is_empty() {
        return Err(SyntaxError::malformed(key[0].location(), "empty style attribute"));
    }
    Ok(StyleAttribute(style))
}

/// `#+BEGIN_<NAME> [arguments]` ... `#+END_<NAME>`.
pub(super) fn block(
    p: &mut Parser<'_, '_>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Block, SyntaxError> {
    let begin = p
        .tokens
        .pop_sequence(&[TokenKind::BlockStart, TokenKind::Word])?;
    let location = begin[0].location();
    let name = begin[1].text;
    let arguments = arguments(p);

    // A heading-like first line arrives as a section start instead of a
    // newline; only source blocks accept it.
    let opened_with_newline = p.tokens.pop_if(|t| t.is(TokenKind::Newline)).is_some();
    if !p.tokens.has_tokens() {
        return Err(unterminated(name, location));
    }

    let block = match name.to_uppercase().as_str() {
        "COMMENT" => Block::Comment {
            content: prose(p, name, location, false, pending)?,
        },
        "QUOTE" => quote(p, name, location, pending)?,
        "SRC" => code(p, name, location, arguments.into_iter().next(), opened_with_newline)?,
        _ => {
            return Err(SyntaxError::malformed(
                begin[1].location(),
                format!("unknown block type '{name}'"),
            ));
        }
    };

    let end = p
        .tokens
        .pop_sequence(&[TokenKind::BlockEnd, TokenKind::Word])?;
    if !end[1].text.eq_ignore_ascii_case(name) {
        return Err(SyntaxError::MismatchedBlock {
            begin: name.to_string(),
            end: end[1].text.to_string(),
            location: end[0].location(),
        });
    }

    Ok(block)
}

fn unterminated(name: &str, location: Location) -> SyntaxError {
    SyntaxError::UnterminatedBlock {
        name: name.to_string(),
        location,
    }
}

/// Space separated words after the block name.
fn arguments(p: &mut Parser<'_, '_>) -> Vec<String> {
    let mut arguments = Vec::new();
    loop {
        p.tokens.pop_while(is_separator);
        let argument = p
            .tokens
            .pop_until(|t| is_separator(t) || t.kind.is_line_end());
        if argument.is_empty() {
            break;
        }
        arguments.push(tokens_to_string(argument));
    }
    arguments
}

fn is_separator(token: &Token<'_>) -> bool {
    token.is(TokenKind::Whitespace) || token.is(TokenKind::Tab)
}

/// Text lines up to the block end, or up to a `---` quotee marker at the
/// start of a line when `stop_at_quotee` is set.
fn prose(
    p: &mut Parser<'_, '_>,
    name: &str,
    location: Location,
    stop_at_quotee: bool,
    pending: &mut Option<StyleAttribute>,
) -> Result<Vec<Inline>, SyntaxError> {
    let mut content = Vec::new();
    let mut first = true;

    loop {
        let Some(token) = p.tokens.peek() else {
            return Err(unterminated(name, location));
        };
        match token.kind {
            TokenKind::BlockEnd => break,
            TokenKind::QuoteeStart if stop_at_quotee => break,
            TokenKind::SectionStart => {
                return Err(SyntaxError::malformed(
                    token.line_location(),
                    format!("heading inside '{name}' block"),
                ));
            }
            _ => {
                if !first {
                    push_text(&mut content, "\n");
                }
                first = false;
                for inline in inline::line(p, pending)? {
                    push_inline(&mut content, inline);
                }
            }
        }
    }

    Ok(content)
}

fn quote(
    p: &mut Parser<'_, '_>,
    name: &str,
    location: Location,
    pending: &mut Option<StyleAttribute>,
) -> Result<Block, SyntaxError> {
    let content = prose(p, name, location, true, pending)?;
    let quotee = match p.tokens.pop_if(|t| t.is(TokenKind::QuoteeStart)) {
        Some(_) => {
            p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
            Some(inline::line(p, pending)?)
        }
        None => None,
    };
    if !p.tokens.has_tokens() {
        return Err(unterminated(name, location));
    }
    // The quotee is the last line of the block.
    if let Some(extra) = p
        .tokens
        .peek()
        .filter(|t| quotee.is_some() && !t.is(TokenKind::BlockEnd))
    {
        return Err(SyntaxError::malformed(
            extra.location(),
            format!("text after the quotee of '{name}' block"),
        ));
    }
    Ok(Block::Quote { content, quotee })
}

/// Source lines are kept verbatim; nothing inside is parsed.
fn code(
    p: &mut Parser<'_, '_>,
    name: &str,
    location: Location,
    language: Option<String>,
    opened_with_newline: bool,
) -> Result<Block, SyntaxError> {
    let body = p.tokens.pop_until(|t| t.is(TokenKind::BlockEnd));
    if !p.tokens.has_tokens() {
        return Err(unterminated(name, location));
    }

    let text = tokens_to_string(body);
    let text = if opened_with_newline {
        text.as_str()
    } else {
        text.strip_prefix('\n').unwrap_or(&text)
    };
    let text = text.strip_suffix('\n').unwrap_or(text);
    let lines = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').map(str::to_string).collect()
    };

    Ok(Block::Code { language, lines })
}
