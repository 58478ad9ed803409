use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::{DomainError, Resource};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter criteria shared by every collection.
///
/// Each entity decides which of these predicates it understands in
/// [`Resource::matches`]; the rest are ignored for that entity. All predicates
/// that apply are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub state: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    pub fn sort(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(key.into());
        self.sort_order = Some(order);
        self
    }

    /// Query-string form used by the HTTP backend. Unset predicates are omitted.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key.to_string(), value));
            }
        };

        push("search", self.search.clone());
        push("status", self.status.clone());
        push("priority", self.priority.clone());
        push("category", self.category.clone());
        push("type", self.kind.clone());
        push("state", self.state.clone());
        push("role", self.role.clone());
        push("isActive", self.is_active.map(|v| v.to_string()));
        push("rating", self.rating.map(|v| v.to_string()));
        if !self.tags.is_empty() {
            push("tags", Some(self.tags.join(",")));
        }
        push("startDate", self.start_date.map(|d| d.to_string()));
        push("endDate", self.end_date.map(|d| d.to_string()));
        push("page", self.page.map(|v| v.to_string()));
        push("perPage", self.per_page.map(|v| v.to_string()));
        push("sortBy", self.sort_by.clone());
        push("sortOrder", self.sort_order.map(|o| o.as_str().to_string()));

        pairs
    }

    /// True when no search term is set, or any of `fields` contains it (case-insensitive).
    pub fn search_matches(&self, fields: &[&str]) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                fields.iter().any(|f| f.to_lowercase().contains(&term))
            }
        }
    }

    /// Equality predicate; an unset filter value always matches.
    pub fn equals(expected: &Option<String>, actual: &str) -> bool {
        expected
            .as_deref()
            .map_or(true, |e| e.eq_ignore_ascii_case(actual))
    }

    /// Inclusive date-range predicate on the calendar date of `timestamp`.
    pub fn date_in_range(&self, timestamp: &str) -> bool {
        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }
        let Some(date) = parse_timestamp(timestamp).map(|t| t.date()) else {
            return false;
        };
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }

    /// Rejects a sort key `R` cannot order by.
    pub fn check_sort<R: Resource>(&self) -> Result<(), DomainError> {
        match self.sort_by.as_deref() {
            Some(key) if !R::SORT_KEYS.contains(&key) => Err(DomainError::validation(format!(
                "cannot sort {} by {}; expected one of: {}",
                R::NAME,
                key,
                R::SORT_KEYS.join(", ")
            ))),
            _ => Ok(()),
        }
    }

    /// Keeps the matching records and applies the requested sort.
    ///
    /// The sort is stable: records with equal keys keep their relative order,
    /// in both directions. Without a sort key the incoming order is preserved.
    pub fn apply<R: Resource>(&self, mut items: Vec<R>) -> Vec<R> {
        items.retain(|item| item.matches(self));

        if let Some(key) = self.sort_by.as_deref() {
            let descending = self.sort_order == Some(SortOrder::Desc);
            items.sort_by(|a, b| {
                let ordering = compare_keys(a.sort_value(key), b.sort_value(key));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        items
    }
}

/// A typed sort key extracted from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Date(Option<NaiveDateTime>),
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }

    pub fn date(value: &str) -> Self {
        SortValue::Date(parse_timestamp(value))
    }

    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn compare_keys(a: Option<SortValue>, b: Option<SortValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parses the timestamp shapes the backend emits: RFC 3339, `Y-m-d H:M:S`, or a bare date.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    value
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Pagination metadata, recomputed after every successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            total_pages: 0,
        }
    }
}

impl PageMeta {
    pub fn from_len(len: usize, filter: &Filter) -> Self {
        let per_page = filter
            .per_page
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PER_PAGE);
        let total = len as u64;
        Self {
            total,
            page: filter.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            per_page,
            total_pages: total.div_ceil(per_page as u64) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_meta_defaults() {
        let meta = PageMeta::from_len(23, &Filter::new());
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total, 23);
        assert_eq!(meta.total_pages, 3);

        let meta = PageMeta::from_len(0, &Filter::new().page(2, 5));
        assert_eq!(meta.page, 2);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_query_pairs_skip_unset() {
        let filter = Filter::new()
            .search("pizza")
            .active(true)
            .tag("food")
            .tag("store")
            .sort("name", SortOrder::Desc);
        let pairs = filter.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("search".to_string(), "pizza".to_string()),
                ("isActive".to_string(), "true".to_string()),
                ("tags".to_string(), "food,store".to_string()),
                ("sortBy".to_string(), "name".to_string()),
                ("sortOrder".to_string(), "desc".to_string()),
            ]
        );
        assert!(Filter::new().query_pairs().is_empty());
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        assert!(parse_timestamp("2024-03-20T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-20T10:00:00.000000Z").is_some());
        assert!(parse_timestamp("2024-03-20 10:00:00").is_some());
        assert_eq!(
            parse_timestamp("2024-03-20").map(|t| t.date()),
            NaiveDate::from_ymd_opt(2024, 3, 20)
        );
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filter = Filter::new().between(
            NaiveDate::from_ymd_opt(2024, 3, 1),
            NaiveDate::from_ymd_opt(2024, 3, 31),
        );
        assert!(filter.date_in_range("2024-03-01"));
        assert!(filter.date_in_range("2024-03-31T23:59:59Z"));
        assert!(!filter.date_in_range("2024-04-01"));
        assert!(!filter.date_in_range("not a date"));
        assert!(Filter::new().date_in_range("not a date"));
    }

    #[test]
    fn test_text_sort_ignores_case_first() {
        let a = SortValue::text("apple");
        let b = SortValue::text("Banana");
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(SortValue::Number(2.0).compare(&SortValue::Number(10.0)), Ordering::Less);
    }
}
