//! Term and category filtering over the record store.

use crate::record::ProjectRecord;

/// Category part of the criteria. `"all"` is the sentinel for no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Parse a selector value. Only `"all"` means `All`; any other value,
    /// the empty string included, must equal the record's category.
    pub fn parse(value: &str) -> Self {
        match value {
            "all" => CategoryFilter::All,
            other => CategoryFilter::Only(other.to_string()),
        }
    }

    fn admits(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

/// Transient criteria derived from the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub term: String,
    pub category: CategoryFilter,
}

impl FilterCriteria {
    pub fn new(term: &str, category: &str) -> Self {
        Self {
            term: term.to_string(),
            category: CategoryFilter::parse(category),
        }
    }

    /// True when the record passes both the term and the category predicate.
    pub fn matches(&self, record: &ProjectRecord) -> bool {
        self.matches_term(record) && self.category.admits(&record.category)
    }

    fn matches_term(&self, record: &ProjectRecord) -> bool {
        if self.term.is_empty() {
            return true;
        }
        let term = self.term.to_lowercase();
        record.title.to_lowercase().contains(&term) || record.desc.to_lowercase().contains(&term)
    }
}

/// Stable filter: keeps the original order, never re-sorts.
pub fn filter(records: &[ProjectRecord], criteria: &FilterCriteria) -> Vec<ProjectRecord> {
    records.iter().filter(|r| criteria.matches(r)).cloned().collect()
}
