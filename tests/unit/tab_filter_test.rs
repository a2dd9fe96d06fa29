//! Unit tests for the closed-tab filters and search.

use rstest::rstest;

use tabwrangler::services::tab_filter::{exact_url, keyword, search, TabFilter};
use tabwrangler::types::tab::TabRecord;

fn archive() -> Vec<TabRecord> {
    vec![
        TabRecord::new(1, Some("https://a.dev"), Some("Foo bar")),
        TabRecord::new(2, Some("https://b.dev"), Some("Baz")),
        TabRecord::new(3, Some("https://foo.dev/x"), Some("Qux")),
    ]
}

fn ids(found: Vec<&TabRecord>) -> Vec<i64> {
    found.into_iter().map(|t| t.id).collect()
}

#[test]
fn test_keyword_matches_title_or_url() {
    let tabs = archive();
    assert_eq!(ids(search(&tabs, &[keyword("foo")])), vec![1, 3]);
}

#[rstest]
#[case("FOO", vec![1, 3])]
#[case("^baz$", vec![2])]
#[case("b\\.dev", vec![2])]
#[case("nothing", vec![])]
#[case("", vec![1, 2, 3])]
fn test_keyword_is_case_insensitive_pattern(#[case] kw: &str, #[case] expected: Vec<i64>) {
    let tabs = archive();
    assert_eq!(ids(search(&tabs, &[keyword(kw)])), expected);
}

#[test]
fn test_keyword_skips_missing_fields() {
    let tabs = vec![TabRecord::new(9, None, None)];
    assert!(search(&tabs, &[keyword("anything")]).is_empty());
}

#[test]
fn test_exact_url_requires_equality() {
    let tabs = archive();
    assert_eq!(ids(search(&tabs, &[exact_url("https://b.dev")])), vec![2]);
    assert!(search(&tabs, &[exact_url("https://b.dev/")]).is_empty());
}

#[test]
fn test_filters_are_conjunctive() {
    let tabs = archive();
    let filters: Vec<TabFilter> = vec![keyword("foo"), exact_url("https://foo.dev/x")];
    assert_eq!(ids(search(&tabs, &filters)), vec![3]);
}

#[test]
fn test_no_filters_returns_everything_in_order() {
    let tabs = archive();
    assert_eq!(ids(search(&tabs, &[])), vec![1, 2, 3]);
}
