//! Source code highlighting for `#+BEGIN_SRC <language>` blocks.
//!
//! Output is class-annotated (`<span class="keyword">`) rather than inline
//! styled, so the site stylesheet decides on colors.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::RenderError;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Whether `language` names a syntax that [`highlight`] accepts.
pub fn is_known_language(language: &str) -> bool {
    SYNTAXES.find_syntax_by_token(language).is_some()
}

/// Highlight `code` as `language`. The language is matched against syntax
/// names and file extensions, case-insensitively.
pub fn highlight(language: &str, code: &str) -> Result<String, RenderError> {
    let syntax = SYNTAXES
        .find_syntax_by_token(language)
        .ok_or_else(|| RenderError::UnknownLanguage(language.to_string()))?;

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| RenderError::Highlight {
                language: language.to_string(),
                message: e.to_string(),
            })?;
    }
    Ok(generator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages_by_name_and_extension() {
        assert!(is_known_language("rust"));
        assert!(is_known_language("rs"));
        assert!(is_known_language("Python"));
        assert!(!is_known_language("klingon"));
    }

    #[test]
    fn highlighted_output_is_classed_and_escaped() {
        let html = highlight("rust", "fn main() { let a = 1 < 2; }\n").unwrap();
        assert!(html.contains("<span class=\""));
        assert!(html.contains("&lt;"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn unknown_language() {
        assert!(matches!(
            highlight("klingon", "qapla'\n"),
            Err(RenderError::UnknownLanguage(_))
        ));
    }
}
