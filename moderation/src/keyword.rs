//! Operator-maintained forbidden keyword list.

use serde::Serialize;
use serde_json::Value;

pub const MAX_KEYWORD_LENGTH: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Lets an explicitly empty input list clear the keywords instead of
    /// falling back.
    pub allow_empty: bool,
}

impl NormalizeOptions {
    pub fn allow_empty() -> Self {
        Self { allow_empty: true }
    }
}

fn normalize_keyword(raw: &str) -> Option<String> {
    let keyword = raw.trim().to_lowercase();
    if keyword.is_empty() || keyword.chars().count() > MAX_KEYWORD_LENGTH {
        return None;
    }
    Some(keyword)
}

fn dedup_normalized<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in values.into_iter().filter_map(normalize_keyword) {
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

/// Normalizes an untrusted settings value into a keyword list.
///
/// Anything that is not a JSON array yields `fallback`. Non-string elements
/// are skipped. An empty result only survives when the input array itself was
/// empty and `options.allow_empty` is set.
pub fn normalize_forbidden_keywords(
    value: &Value,
    fallback: &[String],
    options: NormalizeOptions,
) -> Vec<String> {
    let Value::Array(items) = value else {
        return fallback.to_vec();
    };

    let keywords = dedup_normalized(items.iter().filter_map(Value::as_str));
    if !keywords.is_empty() {
        return keywords;
    }
    if items.is_empty() && options.allow_empty {
        return Vec::new();
    }
    fallback.to_vec()
}

/// Same rules as [`normalize_forbidden_keywords`] for an already-typed list.
pub fn normalize_keyword_strings<I, S>(
    values: I,
    fallback: &[String],
    options: NormalizeOptions,
) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let values: Vec<S> = values.into_iter().collect();
    let keywords = dedup_normalized(values.iter().map(|value| value.as_ref()));
    if !keywords.is_empty() {
        return keywords;
    }
    if values.is_empty() && options.allow_empty {
        return Vec::new();
    }
    fallback.to_vec()
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Keywords from `keywords` that occur in `text`.
///
/// A keyword matches case-insensitively as written, or after all whitespace
/// is removed from both sides, so `"연 락 처"` still hits `"연락처"`.
pub fn find_matched_forbidden_keywords<S: AsRef<str>>(text: &str, keywords: &[S]) -> Vec<String> {
    if keywords.is_empty() || text.trim().is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let compact = strip_whitespace(&lowered);

    let mut matched = Vec::new();
    for keyword in dedup_normalized(keywords.iter().map(|value| value.as_ref())) {
        let compact_keyword = strip_whitespace(&keyword);
        let hit = lowered.contains(&keyword)
            || (!compact_keyword.is_empty() && compact.contains(&compact_keyword));
        if hit {
            matched.push(keyword);
        }
    }
    matched
}

/// A normalized keyword list: lowercase, trimmed, 1 to 40 characters, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordList(Vec<String>);

impl KeywordList {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(normalize_keyword_strings(
            values,
            &[],
            NormalizeOptions::allow_empty(),
        ))
    }

    pub fn from_value(value: &Value, fallback: &[String], options: NormalizeOptions) -> Self {
        Self(normalize_forbidden_keywords(value, fallback, options))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_matches(&self, text: &str) -> Vec<String> {
        find_matched_forbidden_keywords(text, &self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn normalizes_case_whitespace_and_duplicates() {
        let keywords = normalize_forbidden_keywords(
            &json!(["  SPAM ", "spam", "Casino", "카지노", "casino"]),
            &[],
            NormalizeOptions::default(),
        );
        assert_eq!(keywords, strings(&["spam", "casino", "카지노"]));
    }

    #[test]
    fn length_limit_counts_characters_not_bytes() {
        let hangul = "가".repeat(MAX_KEYWORD_LENGTH);
        let keywords =
            normalize_keyword_strings([hangul.as_str()], &[], NormalizeOptions::default());
        assert_eq!(keywords, vec![hangul]);
    }

    #[test]
    fn typed_list_follows_the_same_empty_rules() {
        let fallback = strings(&["default"]);
        let empty: [&str; 0] = [];
        assert_eq!(
            normalize_keyword_strings(empty, &fallback, NormalizeOptions::allow_empty()),
            Vec::<String>::new()
        );
        assert_eq!(
            normalize_keyword_strings(["   "], &fallback, NormalizeOptions::allow_empty()),
            fallback
        );
    }

    #[test]
    fn keyword_list_matches_case_insensitively() {
        let list = KeywordList::new(["Telegram", "telegram", ""]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.find_matches("TELEGRAM 으로 연락"), strings(&["telegram"]));
        assert!(KeywordList::default().find_matches("telegram").is_empty());
    }

    #[test]
    fn blank_text_short_circuits() {
        assert!(find_matched_forbidden_keywords("   \n", &["연락처"]).is_empty());
        let none: [&str; 0] = [];
        assert!(find_matched_forbidden_keywords("연락처", &none).is_empty());
    }
}
