//! # Tokens
//!
//! A [`Token`] is a classified slice of the source plus the line and column
//! it starts at. The lexer never discards input, so concatenating the text of
//! every token reproduces the source exactly.
//!
//! The grammar mostly talks about token *groups* rather than single kinds.
//! Those groups live here as predicates on [`TokenKind`]:
//!
//! | Predicate | Members |
//! |-----------|---------|
//! | [`TokenKind::is_line_end`] | newline, section start |
//! | [`TokenKind::is_paragraph_end`] | line ends, block/attribute/keyword starts, block end |
//! | [`TokenKind::is_list_marker`] | minus, plus, number |
//! | [`TokenKind::is_text`] | everything that may appear inside a line of prose |

use std::fmt;

/// Classification of a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Word,
    Whitespace,
    Number,
    Colon,
    Semicolon,
    At,
    Plus,
    /// `#+BEGIN_`
    BlockStart,
    /// `#+END_`
    BlockEnd,
    /// `#+ATTR_`
    AttributeStart,
    /// `#+` not followed by one of the longer markers
    PreambleStart,
    Hash,
    /// A newline followed by one or more `*` and a space, or the same run of
    /// `*` and a space at the very start of the input.
    SectionStart,
    Asterisk,
    Newline,
    /// `<YYYY-MM-DD>`
    Date,
    /// `---`
    QuoteeStart,
    Minus,
    EnDash,
    LessThan,
    GreaterThan,
    Comma,
    Dot,
    Underscore,
    LeftSquareBrace,
    RightSquareBrace,
    LeftCurlyBrace,
    RightCurlyBrace,
    LeftParenthesis,
    RightParenthesis,
    QuotationMark,
    SingleQuote,
    Slash,
    QuestionMark,
    ExclamationMark,
    Tab,
    /// Any of `` = % & | ~ $ ^ \ ` ``
    Symbol,
}

impl TokenKind {
    /// Tokens that terminate a line of text.
    pub fn is_line_end(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::SectionStart)
    }

    /// Tokens that end a paragraph when they start a line.
    ///
    /// List markers also end a paragraph, but only with the right lookahead;
    /// see [`crate::cursor::TokenCursor::at_list_start`].
    pub fn is_paragraph_end(self) -> bool {
        matches!(
            self,
            TokenKind::Newline
                | TokenKind::SectionStart
                | TokenKind::BlockStart
                | TokenKind::BlockEnd
                | TokenKind::AttributeStart
                | TokenKind::PreambleStart
        )
    }

    pub fn is_list_marker(self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Plus | TokenKind::Number)
    }

    /// Tokens that can be part of a run of prose. Structural markers are
    /// text as well once they appear in the middle of a line, so only the
    /// line ends are excluded.
    pub fn is_text(self) -> bool {
        !self.is_line_end()
    }

    /// Human readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Number => "number",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::At => "'@'",
            TokenKind::Plus => "'+'",
            TokenKind::BlockStart => "'#+BEGIN_'",
            TokenKind::BlockEnd => "'#+END_'",
            TokenKind::AttributeStart => "'#+ATTR_'",
            TokenKind::PreambleStart => "'#+'",
            TokenKind::Hash => "'#'",
            TokenKind::SectionStart => "section start",
            TokenKind::Asterisk => "'*'",
            TokenKind::Newline => "newline",
            TokenKind::Date => "date",
            TokenKind::QuoteeStart => "'---'",
            TokenKind::Minus => "'-'",
            TokenKind::EnDash => "'–'",
            TokenKind::LessThan => "'<'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Underscore => "'_'",
            TokenKind::LeftSquareBrace => "'['",
            TokenKind::RightSquareBrace => "']'",
            TokenKind::LeftCurlyBrace => "'{'",
            TokenKind::RightCurlyBrace => "'}'",
            TokenKind::LeftParenthesis => "'('",
            TokenKind::RightParenthesis => "')'",
            TokenKind::QuotationMark => "'\"'",
            TokenKind::SingleQuote => "'''",
            TokenKind::Slash => "'/'",
            TokenKind::QuestionMark => "'?'",
            TokenKind::ExclamationMark => "'!'",
            TokenKind::Tab => "tab",
            TokenKind::Symbol => "symbol",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One-based position in the source, rendered as `l.<line>:<column>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l.{}:{}", self.line, self.column)
    }
}

/// A token with its source text and start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
}

impl Token<'_> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// Position of the first character on the line a section start
    /// introduces. For every other token this is just [`Token::location`].
    pub fn line_location(&self) -> Location {
        if self.is(TokenKind::SectionStart) && self.text.starts_with('\n') {
            Location::new(self.line + 1, 1)
        } else {
            self.location()
        }
    }
}

/// Concatenate the source text of a run of tokens.
pub fn tokens_to_string(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(TokenKind::Newline, true)]
    #[case(TokenKind::SectionStart, true)]
    #[case(TokenKind::Word, false)]
    #[case(TokenKind::BlockStart, false)]
    fn line_end_membership(#[case] kind: TokenKind, #[case] expected: bool) {
        assert_eq!(kind.is_line_end(), expected);
        assert_eq!(kind.is_text(), !expected);
    }

    #[rstest]
    #[case(TokenKind::Newline)]
    #[case(TokenKind::SectionStart)]
    #[case(TokenKind::BlockStart)]
    #[case(TokenKind::AttributeStart)]
    fn paragraph_end_membership(#[case] kind: TokenKind) {
        assert!(kind.is_paragraph_end());
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new(3, 14).to_string(), "l.3:14");
    }

    #[test]
    fn section_start_line_location_points_at_heading_line() {
        let token = Token {
            kind: TokenKind::SectionStart,
            text: "\n** ",
            line: 4,
            column: 9,
        };
        assert_eq!(token.location(), Location::new(4, 9));
        assert_eq!(token.line_location(), Location::new(5, 1));
    }

    #[test]
    fn concatenate_token_text() {
        let tokens = [
            Token {
                kind: TokenKind::Word,
                text: "Hello",
                line: 1,
                column: 1,
            },
            Token {
                kind: TokenKind::Whitespace,
                text: " ",
                line: 1,
                column: 6,
            },
        ];
        assert_eq!(tokens_to_string(&tokens), "Hello ");
    }
}
