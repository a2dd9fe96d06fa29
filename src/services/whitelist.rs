// Whitelist Matcher
// A URL is exempt from wrangling when any configured pattern occurs in it.
// Matching is plain, case-sensitive substring containment, not glob or regex.

use crate::services::settings_engine::SettingsStore;
use crate::types::settings::WHITELIST;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Whitelist {
    patterns: Vec<String>,
}

impl Whitelist {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Snapshot of the `whitelist` option.
    pub fn from_settings(settings: &dyn SettingsStore) -> Self {
        Self::new(settings.get_strings(WHITELIST))
    }

    /// First pattern contained in `url`, in configured order.
    pub fn match_for(&self, url: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| url.contains(pattern.as_str()))
            .map(String::as_str)
    }

    pub fn is_whitelisted(&self, url: &str) -> bool {
        self.match_for(url).is_some()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
