//! Lead filtering and sorting
//!
//! Filters are small predicate types combined by [`LeadQuery`]. Every
//! predicate must pass (AND); inside the search predicate any field may match
//! (OR). Nothing here touches the store: callers pass a snapshot in and get a
//! new vector out.

use std::cmp::Ordering;

use shared::models::{Lead, LeadStatus, Priority};

/// Categorical filter value; `All` admits everything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Choice::Only(v),
            None => Choice::All,
        }
    }
}

/// Trait for lead filters
pub trait LeadFilter: Send + Sync {
    fn matches(&self, lead: &Lead) -> bool;
}

/// Case-insensitive substring match on title, customer name, email or phone
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.trim().to_lowercase(),
        }
    }
}

impl LeadFilter for SearchFilter {
    fn matches(&self, lead: &Lead) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [
            lead.title.as_str(),
            lead.customer_name.as_str(),
            lead.email.as_str(),
            lead.phone.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

impl LeadFilter for Choice<Priority> {
    fn matches(&self, lead: &Lead) -> bool {
        self.admits(&lead.priority)
    }
}

impl LeadFilter for Choice<LeadStatus> {
    fn matches(&self, lead: &Lead) -> bool {
        self.admits(&lead.status)
    }
}

/// Filter by source (the lead's title), ignoring case
pub struct SourceFilter<'a>(&'a Choice<String>);

impl LeadFilter for SourceFilter<'_> {
    fn matches(&self, lead: &Lead) -> bool {
        match self.0 {
            Choice::All => true,
            Choice::Only(source) => lead.title.eq_ignore_ascii_case(source.trim()),
        }
    }
}

/// Sort order for lead listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadSort {
    /// Most recently created first
    Newest,
    Oldest,
    /// Earliest due date first; undated leads last
    DueDate,
    /// High before Medium before Low
    Priority,
}

impl LeadSort {
    fn compare(&self, a: &Lead, b: &Lead) -> Ordering {
        match self {
            LeadSort::Newest => b.created_at.cmp(&a.created_at),
            LeadSort::Oldest => a.created_at.cmp(&b.created_at),
            LeadSort::DueDate => match (a.due_date, b.due_date) {
                (Some(da), Some(db)) => da.cmp(&db),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            LeadSort::Priority => a.priority.rank().cmp(&b.priority.rank()),
        }
    }

    /// Stable sort in place
    pub fn sort(&self, leads: &mut [Lead]) {
        leads.sort_by(|a, b| self.compare(a, b));
    }
}

/// Search text, categorical filters and an optional sort
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    pub search: String,
    pub priority: Choice<Priority>,
    pub status: Choice<LeadStatus>,
    pub source: Choice<String>,
    /// `None` keeps store order
    pub sort: Option<LeadSort>,
}

impl LeadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Choice::Only(priority);
        self
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Choice::Only(status);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Choice::Only(source.into());
        self
    }

    pub fn sort(mut self, sort: LeadSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Whether a single lead passes every filter
    pub fn matches(&self, lead: &Lead) -> bool {
        let search = SearchFilter::new(&self.search);
        let source = SourceFilter(&self.source);
        let filters: [&dyn LeadFilter; 4] = [&self.status, &self.priority, &source, &search];
        filters.iter().all(|f| f.matches(lead))
    }

    /// Filter (and optionally sort) a snapshot
    pub fn apply(&self, leads: &[Lead]) -> Vec<Lead> {
        let search = SearchFilter::new(&self.search);
        let source = SourceFilter(&self.source);
        let filters: [&dyn LeadFilter; 4] = [&self.status, &self.priority, &source, &search];

        let mut result: Vec<Lead> = leads
            .iter()
            .filter(|lead| filters.iter().all(|f| f.matches(lead)))
            .cloned()
            .collect();

        if let Some(sort) = self.sort {
            sort.sort(&mut result);
        }
        result
    }

    /// Distinct sources present in `leads`, in first-seen order (for filter pickers)
    pub fn sources(leads: &[Lead]) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for lead in leads {
            if !sources.iter().any(|s| s.eq_ignore_ascii_case(&lead.title)) {
                sources.push(lead.title.clone());
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::store::tests::lead;
    use chrono::NaiveDate;

    fn ids(leads: &[Lead]) -> Vec<i64> {
        leads.iter().map(|l| l.id).collect()
    }

    fn sample() -> Vec<Lead> {
        let mut a = lead(1, LeadStatus::New);
        a.customer_name = "Asha Rao".into();
        a.priority = Priority::Low;
        let mut b = lead(2, LeadStatus::InProgress);
        b.title = "Referral".into();
        b.priority = Priority::High;
        b.due_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        let mut c = lead(3, LeadStatus::New);
        c.email = "ops@ASHA.io".into();
        c.due_date = NaiveDate::from_ymd_opt(2026, 10, 20);
        vec![a, b, c]
    }

    #[test]
    fn test_status_filter() {
        let leads = vec![lead(1, LeadStatus::New), lead(2, LeadStatus::New)];
        assert!(LeadQuery::new().status(LeadStatus::Closed).apply(&leads).is_empty());
        assert_eq!(ids(&LeadQuery::new().apply(&leads)), vec![1, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive_or_across_fields() {
        let leads = sample();
        // name of #1, email of #3
        assert_eq!(ids(&LeadQuery::new().search("asha").apply(&leads)), vec![1, 3]);
        // phone
        assert_eq!(ids(&LeadQuery::new().search("0002").apply(&leads)), vec![2]);
        assert_eq!(ids(&LeadQuery::new().search("   ").apply(&leads)), vec![1, 2, 3]);
    }

    #[test]
    fn test_filters_are_anded() {
        let leads = sample();
        let query = LeadQuery::new().search("asha").status(LeadStatus::New).priority(Priority::Medium);
        assert_eq!(ids(&query.apply(&leads)), vec![3]);

        let query = LeadQuery::new().source("referral");
        assert_eq!(ids(&query.apply(&leads)), vec![2]);
        assert!(query.matches(&leads[1]));
        assert!(!query.matches(&leads[0]));
    }

    #[test]
    fn test_result_is_ordered_subset() {
        let leads = sample();
        let result = LeadQuery::new().status(LeadStatus::New).apply(&leads);
        let mut cursor = leads.iter();
        for item in &result {
            assert!(cursor.any(|l| l == item));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(LeadQuery::new().search("x").apply(&[]).is_empty());
    }

    #[test]
    fn test_sorts() {
        let leads = sample();
        assert_eq!(ids(&LeadQuery::new().sort(LeadSort::Newest).apply(&leads)), vec![3, 2, 1]);
        assert_eq!(ids(&LeadQuery::new().sort(LeadSort::DueDate).apply(&leads)), vec![3, 2, 1]);
        assert_eq!(ids(&LeadQuery::new().sort(LeadSort::Priority).apply(&leads)), vec![2, 3, 1]);
    }

    #[test]
    fn test_sources_are_distinct() {
        let mut leads = sample();
        leads.push(lead(4, LeadStatus::Closed));
        leads[3].title = "WEBSITE".into();
        assert_eq!(LeadQuery::sources(&leads), vec!["Website", "Referral"]);
    }
}
