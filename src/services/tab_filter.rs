// Filter/Search Engine
// Filters are predicates over archived tab records; a search keeps the
// records every filter accepts.

use regex::{Regex, RegexBuilder};

use crate::types::tab::TabRecord;

/// Predicate over an archived record.
pub type TabFilter = Box<dyn Fn(&TabRecord) -> bool + Send + Sync>;

/// Matches records whose URL is exactly `url`.
pub fn exact_url(url: &str) -> TabFilter {
    let url = url.to_string();
    Box::new(move |tab: &TabRecord| tab.url.as_deref() == Some(url.as_str()))
}

/// Matches records whose title or URL contains `keyword`, ignoring case.
///
/// The keyword is a regular expression; one that does not compile is matched
/// as literal text instead.
pub fn keyword(keyword: &str) -> TabFilter {
    let matcher = KeywordMatcher::new(keyword);
    Box::new(move |tab: &TabRecord| {
        tab.title.as_deref().is_some_and(|title| matcher.is_match(title))
            || tab.url.as_deref().is_some_and(|url| matcher.is_match(url))
    })
}

enum KeywordMatcher {
    Pattern(Regex),
    /// Lowercased keyword, for input that is not a valid pattern.
    Literal(String),
}

impl KeywordMatcher {
    fn new(keyword: &str) -> Self {
        match RegexBuilder::new(keyword).case_insensitive(true).build() {
            Ok(pattern) => KeywordMatcher::Pattern(pattern),
            Err(_) => KeywordMatcher::Literal(keyword.to_lowercase()),
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            KeywordMatcher::Pattern(pattern) => pattern.is_match(text),
            KeywordMatcher::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Records accepted by every filter, in archive order.
pub fn search<'a>(tabs: &'a [TabRecord], filters: &[TabFilter]) -> Vec<&'a TabRecord> {
    tabs.iter()
        .filter(|tab| filters.iter().all(|filter| filter(tab)))
        .collect()
}
