//! Page/size/sort filtering shared by every list endpoint.
//!
//! The sort token is the one piece of client input that ends up inside SQL
//! text (`ORDER BY` cannot be parameterised), so it is only accepted when it
//! literally appears in the caller's [`SortSafelist`]. The compiled [`Sort`]
//! holds the safelist's own `&'static str`, never the client string.
//!
//! # Usage
//!
//! ```rust
//! use server_core::common::filters::{Filters, ListParams, SortSafelist};
//!
//! const SAFELIST: SortSafelist = SortSafelist::new(&["id", "name", "-id", "-name"], "id");
//!
//! let params = ListParams { sort: Some("-name".into()), ..Default::default() };
//! let filters = Filters::parse(&params, &SAFELIST).unwrap();
//! assert_eq!(filters.sort().order_by_clause(), "ORDER BY name DESC, id ASC");
//! ```

use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Tie-breaker column appended to every ordering so page boundaries are stable.
pub const TIE_BREAKER_COLUMN: &str = "id";

// ============================================================================
// Sort
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A validated ordering: a safelisted column and a direction.
///
/// Only constructed by [`SortSafelist::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    column: &'static str,
    direction: SortDirection,
}

impl Sort {
    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// `ORDER BY <column> <dir>, id ASC`
    pub fn order_by_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, {} ASC",
            self.column,
            self.direction.as_sql(),
            TIE_BREAKER_COLUMN
        )
    }
}

/// The sort tokens a list endpoint accepts, e.g. `["id", "name", "-id", "-name"]`.
#[derive(Debug, Clone, Copy)]
pub struct SortSafelist {
    entries: &'static [&'static str],
    default: &'static str,
}

impl SortSafelist {
    /// `default` is used when the client sends no sort; it must be one of `entries`.
    pub const fn new(entries: &'static [&'static str], default: &'static str) -> Self {
        Self { entries, default }
    }

    pub fn default_token(&self) -> &'static str {
        self.default
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.iter().any(|entry| *entry == token)
    }

    /// Compile `token` if and only if it is safelisted.
    pub fn resolve(&self, token: &str) -> Option<Sort> {
        let entry: &'static str = self.entries.iter().copied().find(|entry| *entry == token)?;
        let sort = match entry.strip_prefix('-') {
            Some(column) => Sort {
                column,
                direction: SortDirection::Desc,
            },
            None => Sort {
                column: entry,
                direction: SortDirection::Asc,
            },
        };
        Some(sort)
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Raw list query-string parameters.
///
/// Kept as strings so a non-numeric `page` becomes a field error rather than a
/// generic decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Validated page/size/sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    page: i64,
    page_size: i64,
    sort: Sort,
}

impl Filters {
    /// Validate raw params against `safelist`.
    ///
    /// Every invalid field is reported; nothing is compiled unless all pass.
    pub fn parse(params: &ListParams, safelist: &SortSafelist) -> Result<Self, ValidationErrors> {
        let mut v = ValidationErrors::new();

        let page = read_int(&mut v, "page", params.page.as_deref(), DEFAULT_PAGE);
        let page_size = read_int(
            &mut v,
            "page_size",
            params.page_size.as_deref(),
            DEFAULT_PAGE_SIZE,
        );
        let sort_token = match params.sort.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => safelist.default_token(),
        };

        v.check(page > 0, "page", "must be greater than zero");
        v.check(page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(page_size > 0, "page_size", "must be greater than zero");
        v.check(page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");

        let sort = safelist.resolve(sort_token);
        v.check(sort.is_some(), "sort", "invalid sort value");

        match sort {
            Some(sort) if v.is_empty() => Ok(Self {
                page,
                page_size,
                sort,
            }),
            _ => Err(v),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

fn read_int(v: &mut ValidationErrors, field: &str, raw: Option<&str>, default: i64) -> i64 {
    match raw {
        None | Some("") => default,
        Some(s) => match s.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add(field, "must be an integer value");
                default
            }
        },
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Pagination metadata returned alongside a page of records.
///
/// All fields are zero when there are no records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }

    pub fn for_filters(total_records: i64, filters: &Filters) -> Self {
        Self::calculate(total_records, filters.page(), filters.page_size())
    }
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub metadata: Metadata,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, total_records: i64, filters: &Filters) -> Self {
        Self {
            records,
            metadata: Metadata::for_filters(total_records, filters),
        }
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            metadata: Metadata::default(),
        }
    }
}
