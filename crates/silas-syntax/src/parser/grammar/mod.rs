//! # Grammar Rules
//!
//! Document-level dispatch lives here; the individual constructs are split
//! by kind:
//!
//! - [`block`] - sections, properties drawers, attributes, `#+BEGIN_` blocks
//! - [`list`] - ordered and unordered lists with nesting by indentation
//! - [`inline`] - text lines with emphasis and links
//!
//! ## Dispatch
//!
//! At the start of every line the next token decides what follows:
//!
//! | Token | Construct |
//! |-------|-----------|
//! | section start | [`block::section`] |
//! | `#+BEGIN_` | [`block::block`] |
//! | `#+ATTR_` | [`block::attribute`], held until the next link |
//! | `#+` | keyword outside the preamble, skipped with a warning |
//! | `-`, `+` or `N.` then a space | [`list::list`] |
//! | anything else | paragraph |

mod block;
mod inline;
mod list;

use crate::error::SyntaxError;
use crate::parser::Parser;
use crate::token::{TokenKind, tokens_to_string};
use crate::tree::inline::{push_inline, push_text};
use crate::tree::{Node, Paragraph, Preamble, StyleAttribute};

/// `#+KEY: value` lines at the top of the file. Blank lines between them are
/// allowed.
pub(super) fn preamble(p: &mut Parser<'_, '_>) -> Result<Preamble, SyntaxError> {
    let mut preamble = Preamble::default();

    if p.tokens.at(TokenKind::QuoteeStart) {
        return Err(SyntaxError::malformed(
            p.tokens.location(),
            "front matter delimited by '---' is not supported, use #+KEY: value lines",
        ));
    }

    loop {
        p.tokens.pop_while(|t| t.is(TokenKind::Newline));
        let Some(start) = p.tokens.pop_if(|t| t.is(TokenKind::PreambleStart)) else {
            break;
        };
        let (key, value) = keyword(p)?;
        preamble
            .insert(&key.to_lowercase(), value)
            .map_err(|message| SyntaxError::malformed(start.location(), message))?;
    }

    Ok(preamble)
}

/// The rest of a `#+KEY: value` line after the `#+`.
fn keyword(p: &mut Parser<'_, '_>) -> Result<(String, String), SyntaxError> {
    let location = p.tokens.location();
    let key = p
        .tokens
        .pop_until(|t| t.is(TokenKind::Colon) || t.kind.is_line_end());
    p.tokens.pop_expected(TokenKind::Colon)?;
    if key.is_empty() {
        return Err(SyntaxError::malformed(location, "keyword without a name"));
    }

    p.tokens.pop_while(|t| t.is(TokenKind::Whitespace));
    let value = p.tokens.pop_until(|t| t.kind.is_line_end());
    p.tokens.pop_if(|t| t.is(TokenKind::Newline));

    Ok((
        tokens_to_string(key),
        tokens_to_string(value).trim_end().to_string(),
    ))
}

/// Nodes up to the end of input, or up to a section start at `parent_level`
/// or shallower when parsing the children of a section. `pending` holds a
/// style attribute not yet taken by a link.
pub(super) fn nodes(
    p: &mut Parser<'_, '_>,
    parent_level: Option<usize>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Vec<Node>, SyntaxError> {
    let mut nodes = Vec::new();

    loop {
        p.tokens.pop_while(|t| t.is(TokenKind::Newline));
        let Some(token) = p.tokens.peek() else {
            break;
        };
        if token.is(TokenKind::SectionStart)
            && parent_level.is_some_and(|level| block::section_level(token) <= level)
        {
            break;
        }
        if let Some(node) = node(p, pending)? {
            nodes.push(node);
        }
    }

    Ok(nodes)
}

fn node(
    p: &mut Parser<'_, '_>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Option<Node>, SyntaxError> {
    let Some(token) = p.tokens.peek() else {
        return Ok(None);
    };
    let location = token.location();

    match token.kind {
        TokenKind::SectionStart => block::section(p, pending).map(|s| Some(Node::Section(s))),
        TokenKind::BlockStart => block::block(p, pending).map(|b| Some(Node::Block(b))),
        TokenKind::AttributeStart => {
            let style = block::attribute(p)?;
            if let Some(StyleAttribute(unused)) = pending.replace(style) {
                p.warn(SyntaxError::malformed(
                    location,
                    format!("style '{unused}' is replaced before a link used it"),
                ));
            }
            Ok(None)
        }
        TokenKind::BlockEnd => Err(SyntaxError::malformed(
            location,
            "block end without a matching begin",
        )),
        TokenKind::PreambleStart => {
            p.tokens.pop()?;
            let (key, _) = keyword(p)?;
            p.warn(SyntaxError::malformed(
                location,
                format!("keyword '{key}' outside the preamble is ignored"),
            ));
            Ok(None)
        }
        _ if p.tokens.at_list_start() => list::list(p, 0, pending).map(|l| Some(Node::List(l))),
        _ => paragraph(p, pending).map(|para| Some(Node::Paragraph(para))),
    }
}

/// Consecutive text lines, joined with newlines, up to a paragraph end.
fn paragraph(
    p: &mut Parser<'_, '_>,
    pending: &mut Option<StyleAttribute>,
) -> Result<Paragraph, SyntaxError> {
    let mut content = Vec::new();

    loop {
        for inline in inline::line(p, pending)? {
            push_inline(&mut content, inline);
        }
        if at_paragraph_end(p) {
            break;
        }
        push_text(&mut content, "\n");
    }

    Ok(Paragraph { content })
}

fn at_paragraph_end(p: &Parser<'_, '_>) -> bool {
    match p.tokens.peek_kind() {
        None => true,
        Some(kind) => kind.is_paragraph_end() || p.tokens.at_list_start(),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SyntaxError;
    use crate::parse;
    use crate::token::Location;
    use crate::tree::{Inline, Node, Paragraph};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn preamble_keys_are_lowercased() {
        let parsed = parse("#+TITLE: Home\n#+Published: <2023-01-02>\n\nHello").unwrap();

        assert_eq!(parsed.preamble.title(), Some("Home"));
        assert_eq!(
            parsed.preamble.published(),
            NaiveDate::from_ymd_opt(2023, 1, 2)
        );
        assert_eq!(
            parsed.nodes,
            vec![Node::Paragraph(Paragraph {
                content: vec![text("Hello")]
            })]
        );
    }

    #[test]
    fn preamble_value_with_colons() {
        let parsed = parse("#+URL: https://example.com/\n").unwrap();
        assert_eq!(parsed.preamble.url(), Some("https://example.com/"));
    }

    #[test]
    fn preamble_before_heading() {
        let parsed = parse("#+TITLE: Home\n* Intro").unwrap();
        assert_eq!(parsed.preamble.title(), Some("Home"));
        assert!(matches!(parsed.nodes[0], Node::Section(_)));
    }

    #[test]
    fn invalid_preamble_date_is_fatal() {
        let error = parse("#+TITLE: x\n#+PUBLISHED: someday\n").unwrap_err();
        assert_eq!(
            error,
            SyntaxError::Malformed {
                message: "invalid date 'someday' for 'published'".to_string(),
                location: Location::new(2, 1),
            }
        );
    }

    #[test]
    fn dashed_front_matter_is_rejected() {
        assert!(parse("---\ntitle: x\n---\n").is_err());
    }

    #[test]
    fn paragraph_lines_are_joined() {
        let parsed = parse("one\ntwo\n\nthree").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![
                Node::Paragraph(Paragraph {
                    content: vec![text("one\ntwo")]
                }),
                Node::Paragraph(Paragraph {
                    content: vec![text("three")]
                }),
            ]
        );
    }

    #[test]
    fn paragraph_ends_at_list() {
        let parsed = parse("intro\n- item").unwrap();
        assert_eq!(parsed.nodes.len(), 2);
        assert!(matches!(parsed.nodes[1], Node::List(_)));
    }

    #[test]
    fn keyword_in_body_is_skipped_with_warning() {
        let parsed = parse("Hello\n#+OPTIONS: toc:nil\nWorld").unwrap();
        assert_eq!(parsed.nodes.len(), 2);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(
            parsed.warnings[0].to_string(),
            "l.2:1: keyword 'OPTIONS' outside the preamble is ignored"
        );
    }

    #[test]
    fn stray_block_end_is_fatal() {
        assert!(parse("text\n#+END_QUOTE\n").is_err());
    }

    #[test]
    fn unused_style_warns() {
        let parsed = parse("#+ATTR_HTML: :style color: red\nNo links here").unwrap();
        assert_eq!(parsed.warnings.len(), 1);
    }
}
