use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid pagination parameters: page {page} and limit {limit} must both be at least 1")]
pub struct InvalidPagination {
    pub page: i64,
    pub limit: i64,
}

//--------------------------------------      Pagination       ---------------------------------------------------------
/// A one-based page request. Constructing a `Pagination` guarantees that `page` and `limit` are both positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaginationParams")]
pub struct Pagination {
    page: i64,
    limit: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct PaginationParams {
    #[serde(default = "first_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn first_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = InvalidPagination;

    fn try_from(value: PaginationParams) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Result<Self, InvalidPagination> {
        if page < 1 || limit < 1 {
            return Err(InvalidPagination { page, limit });
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// The number of records to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Returns this page of `items`.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total_items: i64) -> Self {
        let limit = pagination.limit();
        let total_pages = (total_items + limit - 1) / limit;
        Self { data, page: pagination.page(), limit, total_items, total_pages }
    }
}

//--------------------------------------    LanguageFilter     ---------------------------------------------------------
/// Which product translations to return. The `all` language selects every translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LanguageFilter {
    #[default]
    All,
    Only(String),
}

impl LanguageFilter {
    pub fn matches(&self, language_id: &str) -> bool {
        match self {
            LanguageFilter::All => true,
            LanguageFilter::Only(lang) => lang == language_id,
        }
    }

    pub fn language_id(&self) -> Option<&str> {
        match self {
            LanguageFilter::All => None,
            LanguageFilter::Only(lang) => Some(lang.as_str()),
        }
    }
}

impl FromStr for LanguageFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(LanguageFilter::All)
        } else {
            Ok(LanguageFilter::Only(s.to_string()))
        }
    }
}

impl Display for LanguageFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageFilter::All => write!(f, "all"),
            LanguageFilter::Only(lang) => write!(f, "{lang}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_bounds() {
        assert!(Pagination::new(0, 10).is_err());
        assert!(Pagination::new(1, 0).is_err());
        let p = Pagination::new(3, 4).unwrap();
        assert_eq!(p.offset(), 8);
        assert_eq!(p.slice((0..10).collect()), vec![8, 9]);
        assert!(serde_json::from_str::<Pagination>(r#"{"page": 0}"#).is_err());
        let p: Pagination = serde_json::from_str(r#"{"page": 2}"#).unwrap();
        assert_eq!((p.page(), p.limit()), (2, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn page_counts() {
        let p = Pagination::new(1, 2).unwrap();
        assert_eq!(Paginated::new(vec![1, 2], p, 3).total_pages, 2);
        assert_eq!(Paginated::new(vec![1, 2], p, 4).total_pages, 2);
        assert_eq!(Paginated::<i32>::new(vec![], p, 0).total_pages, 0);
    }

    #[test]
    fn language_filters() {
        assert_eq!("all".parse::<LanguageFilter>().unwrap(), LanguageFilter::All);
        assert_eq!("ALL".parse::<LanguageFilter>().unwrap(), LanguageFilter::All);
        assert_eq!("".parse::<LanguageFilter>().unwrap(), LanguageFilter::All);
        let vi = "vi".parse::<LanguageFilter>().unwrap();
        assert!(vi.matches("vi"));
        assert!(!vi.matches("en"));
        assert!(LanguageFilter::All.matches("en"));
    }
}
