//! # Lexer
//!
//! Splits source text into [`Token`]s using an ordered table of anchored
//! regular expressions. At every position the rules are tried top to bottom
//! and the **first** one that matches wins; there is no longest-match
//! arbitration. The order is therefore part of the grammar: `#+BEGIN_` has to
//! be tried before `#+`, which has to be tried before `#`, and a section
//! start (`\n** `) before a plain newline.
//!
//! ```
//! use silas_syntax::lexer::tokenize;
//! use silas_syntax::TokenKind;
//!
//! let tokens = tokenize("* Intro\nHello").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::SectionStart,
//!         TokenKind::Word,
//!         TokenKind::Newline,
//!         TokenKind::Word,
//!     ]
//! );
//! ```
//!
//! ## Positions
//!
//! Lines and columns are one-based and count characters, not bytes. A
//! newline moves to the next line. A section start consumes the newline and
//! the heading markers, so the token that follows it is placed on the new
//! line just after the markers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SyntaxError;
use crate::token::{Location, Token, TokenKind};

static RULES: Lazy<Vec<(Regex, TokenKind)>> = Lazy::new(|| {
    [
        (r"\p{Alphabetic}+", TokenKind::Word),
        (r" ", TokenKind::Whitespace),
        (r"[0-9]+", TokenKind::Number),
        (r":", TokenKind::Colon),
        (r";", TokenKind::Semicolon),
        (r"@", TokenKind::At),
        (r"\+", TokenKind::Plus),
        (r"(?i)#\+BEGIN_", TokenKind::BlockStart),
        (r"(?i)#\+END_", TokenKind::BlockEnd),
        (r"(?i)#\+ATTR_", TokenKind::AttributeStart),
        (r"#\+", TokenKind::PreambleStart),
        (r"#", TokenKind::Hash),
        (r"\n\*+ ", TokenKind::SectionStart),
        (r"\*", TokenKind::Asterisk),
        (r"\n", TokenKind::Newline),
        (r"<[0-9]{4}-[0-9]{2}-[0-9]{2}>", TokenKind::Date),
        (r"---", TokenKind::QuoteeStart),
        (r"-", TokenKind::Minus),
        (r"–", TokenKind::EnDash),
        (r"<", TokenKind::LessThan),
        (r">", TokenKind::GreaterThan),
        (r",", TokenKind::Comma),
        (r"\.", TokenKind::Dot),
        (r"_", TokenKind::Underscore),
        (r"\[", TokenKind::LeftSquareBrace),
        (r"\]", TokenKind::RightSquareBrace),
        (r"\{", TokenKind::LeftCurlyBrace),
        (r"\}", TokenKind::RightCurlyBrace),
        (r"\(", TokenKind::LeftParenthesis),
        (r"\)", TokenKind::RightParenthesis),
        (r#"""#, TokenKind::QuotationMark),
        (r"'", TokenKind::SingleQuote),
        (r"/", TokenKind::Slash),
        (r"\?", TokenKind::QuestionMark),
        (r"!", TokenKind::ExclamationMark),
        (r"\t", TokenKind::Tab),
        (r"[=%&|~$^\\`]", TokenKind::Symbol),
    ]
    .into_iter()
    .map(|(pattern, kind)| {
        let regex = Regex::new(&format!("^(?:{pattern})")).expect("lexer rule must compile");
        (regex, kind)
    })
    .collect()
});

/// Heading markers at the very start of the input, where no newline
/// precedes them.
static LEADING_SECTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*+ ").expect("lexer rule must compile"));

/// Tokenize `input` into a flat list of tokens.
///
/// Fails with [`SyntaxError::UnknownChar`] on the first character no rule
/// accepts.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut line = 1;
    let mut column = 1;

    while offset < input.len() {
        let rest = &input[offset..];
        let (kind, len) = next_rule(rest, offset == 0).ok_or_else(|| SyntaxError::UnknownChar {
            ch: rest.chars().next().unwrap_or_default(),
            location: Location::new(line, column),
        })?;
        let text = &rest[..len];

        tokens.push(Token {
            kind,
            text,
            line,
            column,
        });

        match kind {
            TokenKind::Newline => {
                line += 1;
                column = 1;
            }
            TokenKind::SectionStart if text.starts_with('\n') => {
                line += 1;
                column = text.chars().count();
            }
            _ => column += text.chars().count(),
        }
        offset += len;
    }

    Ok(tokens)
}

fn next_rule(rest: &str, at_input_start: bool) -> Option<(TokenKind, usize)> {
    if at_input_start && let Some(m) = LEADING_SECTION_START.find(rest) {
        return Some((TokenKind::SectionStart, m.end()));
    }
    RULES
        .iter()
        .find_map(|(regex, kind)| regex.find(rest).map(|m| (*kind, m.end())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
    }

    #[test]
    fn lex_heading_then_text() {
        let tokens = tokenize("* Intro\nHello").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token {
                    kind: TokenKind::SectionStart,
                    text: "* ",
                    line: 1,
                    column: 1
                },
                Token {
                    kind: TokenKind::Word,
                    text: "Intro",
                    line: 1,
                    column: 3
                },
                Token {
                    kind: TokenKind::Newline,
                    text: "\n",
                    line: 1,
                    column: 8
                },
                Token {
                    kind: TokenKind::Word,
                    text: "Hello",
                    line: 2,
                    column: 1
                },
            ]
        );
    }

    #[test]
    fn section_start_moves_to_next_line_after_markers() {
        let tokens = tokenize("a\n** Sub").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::SectionStart);
        assert_eq!(tokens[1].text, "\n** ");
        assert_eq!(tokens[2].location(), Location::new(2, 4));
    }

    #[test]
    fn asterisk_without_space_is_not_a_section() {
        assert_eq!(
            kinds("\n*bold*"),
            vec![
                TokenKind::Newline,
                TokenKind::Asterisk,
                TokenKind::Word,
                TokenKind::Asterisk
            ]
        );
    }

    #[test]
    fn leading_heading_only_at_offset_zero() {
        assert_eq!(kinds("* a")[0], TokenKind::SectionStart);
        assert_eq!(
            kinds("x * a"),
            vec![
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Asterisk,
                TokenKind::Whitespace,
                TokenKind::Word
            ]
        );
    }

    #[rstest]
    #[case("#+BEGIN_", TokenKind::BlockStart)]
    #[case("#+begin_", TokenKind::BlockStart)]
    #[case("#+END_", TokenKind::BlockEnd)]
    #[case("#+ATTR_", TokenKind::AttributeStart)]
    #[case("#+", TokenKind::PreambleStart)]
    #[case("#", TokenKind::Hash)]
    #[case("---", TokenKind::QuoteeStart)]
    #[case("-", TokenKind::Minus)]
    #[case("–", TokenKind::EnDash)]
    #[case("<2024-03-01>", TokenKind::Date)]
    #[case("<", TokenKind::LessThan)]
    #[case("\t", TokenKind::Tab)]
    #[case("~", TokenKind::Symbol)]
    #[case("Grüße", TokenKind::Word)]
    #[case("2024", TokenKind::Number)]
    fn first_matching_rule_wins(#[case] input: &str, #[case] expected: TokenKind) {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens.len(), 1, "{input:?} should be a single token");
        assert_eq!(tokens[0].kind, expected);
    }

    #[test]
    fn keyword_splits_into_marker_and_word() {
        assert_eq!(
            kinds("#+TITLE: Home"),
            vec![
                TokenKind::PreambleStart,
                TokenKind::Word,
                TokenKind::Colon,
                TokenKind::Whitespace,
                TokenKind::Word
            ]
        );
    }

    #[test]
    fn columns_count_characters() {
        let tokens = tokenize("ä–b").unwrap();
        assert_eq!(tokens[2].location(), Location::new(1, 3));
    }

    #[test]
    fn text_is_preserved() {
        let input = "#+TITLE: Home\n* Intro\n- [[file:a.org][A]] *b* /i/\n";
        let rebuilt: String = tokenize(input).unwrap().iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn unknown_character_is_reported_with_position() {
        let error = tokenize("ok\nhi ☃").unwrap_err();
        assert_eq!(
            error,
            SyntaxError::UnknownChar {
                ch: '☃',
                location: Location::new(2, 4)
            }
        );
    }
}
