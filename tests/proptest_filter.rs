//! Property tests for the filter engine

use bcult_site::{filter, FilterCriteria, ProjectRecord};
use proptest::prelude::*;

const CATEGORIES: &[&str] = &["grooming", "street", "formal", "bridal"];

fn record_strategy() -> impl Strategy<Value = (String, usize, String)> {
    ("[A-Za-z ]{0,12}", 0..CATEGORIES.len(), "[A-Za-z .]{0,24}")
}

fn records_strategy() -> impl Strategy<Value = Vec<ProjectRecord>> {
    prop::collection::vec(record_strategy(), 0..20).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, cat, desc))| ProjectRecord::new(i as u64, &title, CATEGORIES[cat], &desc, &[]))
            .collect()
    })
}

fn selector_strategy() -> impl Strategy<Value = (String, String)> {
    let category = prop_oneof![
        Just("all".to_string()),
        Just(String::new()),
        prop::sample::select(CATEGORIES).prop_map(String::from),
    ];
    ("[A-Za-z ]{0,3}", category)
}

fn criteria_strategy() -> impl Strategy<Value = FilterCriteria> {
    selector_strategy().prop_map(|(term, cat)| FilterCriteria::new(&term, &cat))
}

/// Reference predicate written against the raw control values.
fn expected_ids(records: &[ProjectRecord], term: &str, category: &str) -> Vec<u64> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| {
            let title = r.title.to_lowercase();
            let desc = r.desc.to_lowercase();
            term.is_empty() || title.contains(&needle) || desc.contains(&needle)
        })
        .filter(|r| category == "all" || r.category == category)
        .map(|r| r.id)
        .collect()
}

proptest! {
    #[test]
    fn filter_is_idempotent(records in records_strategy(), criteria in criteria_strategy()) {
        let once = filter(&records, &criteria);
        let twice = filter(&once, &criteria);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filter_keeps_an_ordered_subset(records in records_strategy(), criteria in criteria_strategy()) {
        let out = filter(&records, &criteria);
        let mut rest = records.iter();
        for r in &out {
            prop_assert!(rest.any(|x| x == r), "record {} out of order or invented", r.id);
        }
    }

    #[test]
    fn filter_keeps_exactly_the_matches(records in records_strategy(), (term, cat) in selector_strategy()) {
        let out: Vec<u64> = filter(&records, &FilterCriteria::new(&term, &cat)).iter().map(|r| r.id).collect();
        prop_assert_eq!(out, expected_ids(&records, &term, &cat));
    }

    #[test]
    fn empty_criteria_keep_everything(records in records_strategy()) {
        prop_assert_eq!(filter(&records, &FilterCriteria::default()), records);
    }

    #[test]
    fn search_ignores_case(records in records_strategy(), term in "[a-z]{1,3}") {
        let lower = filter(&records, &FilterCriteria::new(&term, "all"));
        let upper = filter(&records, &FilterCriteria::new(&term.to_uppercase(), "all"));
        prop_assert_eq!(lower, upper);
    }
}
