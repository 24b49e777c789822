//! `#+KEY: value` lines at the top of a file.
//!
//! Keys are stored lowercased. A handful of them are decoded eagerly so a
//! malformed value fails the parse instead of surfacing at render time:
//!
//! | Key | Decoded as |
//! |-----|------------|
//! | `published`, `lastedit` | [`NaiveDate`] from `<YYYY-MM-DD>` (an org weekday suffix is allowed) |
//! | `draft` | flag: `t`, `true`, `yes` or `1` |

use chrono::NaiveDate;

use crate::tree::Properties;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    entries: Properties,
    published: Option<NaiveDate>,
    last_edit: Option<NaiveDate>,
    draft: bool,
}

impl Preamble {
    /// Record a key/value pair. `key` must already be lowercase.
    pub(crate) fn insert(&mut self, key: &str, value: String) -> Result<(), String> {
        match key {
            "published" => self.published = Some(decode_date(key, &value)?),
            "lastedit" => self.last_edit = Some(decode_date(key, &value)?),
            "draft" => self.draft = parse_flag(&value),
            _ => {}
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase())
    }

    pub fn entries(&self) -> &Properties {
        &self.entries
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn summary(&self) -> Option<&str> {
        self.get("summary")
    }

    /// Public base URL, only meaningful in the website's root index file.
    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    /// Name of the layout variant a page asks for.
    pub fn render_type(&self) -> Option<&str> {
        self.get("rendertype")
    }

    pub fn published(&self) -> Option<NaiveDate> {
        self.published
    }

    pub fn last_edit(&self) -> Option<NaiveDate> {
        self.last_edit
    }

    pub fn is_draft(&self) -> bool {
        self.draft
    }
}

fn decode_date(key: &str, value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("invalid date '{value}' for '{key}'"))
}

/// Parse `<2024-03-01>`, `<2024-03-01 Fri>` or a bare `2024-03-01`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let inner = value.trim().trim_start_matches('<').trim_end_matches('>');
    let day = inner.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// `March 1, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "t" | "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<2024-03-01>", Some((2024, 3, 1)))]
    #[case("<2024-03-01 Fri>", Some((2024, 3, 1)))]
    #[case("2024-03-01", Some((2024, 3, 1)))]
    #[case("<2024-02-30>", None)]
    #[case("soon", None)]
    #[case("", None)]
    fn parse_dates(#[case] input: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_date(input), expected);
    }

    #[test]
    fn format_pretty_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(date), "March 1, 2024");
    }

    #[test]
    fn decoded_keys() {
        let mut preamble = Preamble::default();
        preamble.insert("title", "Home".to_string()).unwrap();
        preamble.insert("published", "<2021-05-04>".to_string()).unwrap();
        preamble.insert("draft", "t".to_string()).unwrap();
        preamble.insert("rendertype", "gallery".to_string()).unwrap();

        assert_eq!(preamble.title(), Some("Home"));
        assert_eq!(preamble.get("TITLE"), Some("Home"));
        assert_eq!(preamble.published(), NaiveDate::from_ymd_opt(2021, 5, 4));
        assert!(preamble.is_draft());
        assert_eq!(preamble.last_edit(), None);
        assert_eq!(preamble.render_type(), Some("gallery"));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let mut preamble = Preamble::default();
        let error = preamble.insert("lastedit", "yesterday".to_string()).unwrap_err();
        assert_eq!(error, "invalid date 'yesterday' for 'lastedit'");
    }

    #[rstest]
    #[case("t", true)]
    #[case("YES", true)]
    #[case("nil", false)]
    #[case("", false)]
    fn draft_flag(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(parse_flag(value), expected);
    }
}
