//! The listing filter state and everything derived from it: URL query-string
//! round-tripping, the submit/reset transitions, page-window arithmetic, and
//! dynamic SQL assembly for the jobs listing.
//!
//! The filter state is a pure function of the request query string; no state
//! is held between requests.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Listings per page. Page links are derived from this and the exact total.
pub const PAGE_SIZE: usize = 9;

/// Upper bound on the `page` parameter. Far beyond any real listing, and
/// small enough that the offset arithmetic stays within range.
pub const MAX_PAGE: usize = 1_000_000;

const JOB_COLUMNS: &str =
    "id, title, company_name, description, location, job_type, user_id, created_at, updated_at";

/// The closed set of employment types a posting can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
}

impl JobType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "Full-Time",
            Self::PartTime => "Part-Time",
            Self::Contract => "Contract",
        }
    }
}

impl FromStr for JobType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-Time" => Ok(Self::FullTime),
            "Part-Time" => Ok(Self::PartTime),
            "Contract" => Ok(Self::Contract),
            other => Err(FilterError::UnknownJobType(other.to_string())),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("unknown job type: {0}")]
    UnknownJobType(String),
}

/// The browse filters plus the current page, as carried in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: None,
            location: None,
            job_type: None,
            page: 1,
        }
    }
}

impl FilterState {
    /// Read the filter state out of the request query parameters. Each
    /// parameter is independent; a missing one means unset.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        let search = params
            .get("q")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let location = params
            .get("location")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let job_type = match params.get("job_type").map(|s| s.trim()) {
            Some("") | None => None,
            Some(raw) => Some(raw.parse::<JobType>()?),
        };
        let page = match params.get("page") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(p) if (1..=MAX_PAGE).contains(&p) => p,
                _ => return Err(FilterError::InvalidPage),
            },
            None => 1,
        };

        Ok(Self {
            search,
            location,
            job_type,
            page,
        })
    }

    /// The submit transition: takes the raw form fields, trims the search
    /// term, drops empties, and always lands on page 1.
    pub fn submit(search: &str, location: &str, job_type: Option<JobType>) -> Self {
        let search = search.trim();
        let location = location.trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_owned()),
            location: (!location.is_empty()).then(|| location.to_owned()),
            job_type,
            page: 1,
        }
    }

    /// The reset transition: back to the fully empty state.
    pub fn reset() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    fn has_filters(&self) -> bool {
        self.search.is_some() || self.location.is_some() || self.job_type.is_some()
    }

    /// Serialize back into a query string. The fully empty state serializes
    /// to the empty string so a reset navigates to the bare listing URL.
    pub fn to_query_string(&self) -> String {
        if !self.has_filters() && self.page == 1 {
            return String::new();
        }

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(q) = &self.search {
            serializer.append_pair("q", q);
        }
        if let Some(location) = &self.location {
            serializer.append_pair("location", location);
        }
        if let Some(job_type) = self.job_type {
            serializer.append_pair("job_type", job_type.as_str());
        }
        serializer.append_pair("page", &self.page.to_string());
        serializer.finish()
    }

    /// Row window for the current page: zero-based offset and inclusive end.
    pub fn page_window(&self) -> (usize, usize) {
        let offset = (self.page - 1) * PAGE_SIZE;
        (offset, offset + PAGE_SIZE - 1)
    }
}

/// Number of page links for a given exact total.
pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// The listing query in executable form: SQL text plus the parameters in bind
/// order. Text filters bind first, then the owner (when the viewer is
/// authenticated), then LIMIT/OFFSET on the select.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub select_sql: String,
    pub count_sql: String,
    pub text_params: Vec<String>,
    pub owner: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Assemble the listing SQL for the given filters and viewer. Search matches
/// case-insensitively against title, description, and company name; location
/// and job type filter by equality. An authenticated viewer sees only their
/// own postings.
pub fn build_listing_query(state: &FilterState, viewer: Option<Uuid>) -> ListingQuery {
    let mut sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE 1=1");
    let mut text_params: Vec<String> = Vec::new();

    if let Some(term) = &state.search {
        sql.push_str(
            " AND (LOWER(title) LIKE ? OR LOWER(description) LIKE ? OR LOWER(company_name) LIKE ?)",
        );
        let pattern = format!("%{}%", term.to_lowercase());
        text_params.push(pattern.clone());
        text_params.push(pattern.clone());
        text_params.push(pattern);
    }

    if let Some(location) = &state.location {
        sql.push_str(" AND location = ?");
        text_params.push(location.clone());
    }

    if let Some(job_type) = state.job_type {
        sql.push_str(" AND job_type = ?");
        text_params.push(job_type.as_str().to_string());
    }

    if viewer.is_some() {
        sql.push_str(" AND user_id = ?");
    }

    let count_sql = sql.replace(
        &format!("SELECT {JOB_COLUMNS}"),
        "SELECT COUNT(*)",
    );

    sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

    let (offset, _) = state.page_window();
    ListingQuery {
        select_sql: sql,
        count_sql,
        text_params,
        owner: viewer,
        limit: PAGE_SIZE as i64,
        offset: offset as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_from(query: &str) -> HashMap<String, String> {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn query_string_round_trip() {
        let state = FilterState {
            search: Some("rust developer".to_string()),
            location: Some("NY".to_string()),
            job_type: Some(JobType::FullTime),
            page: 3,
        };

        let qs = state.to_query_string();
        let parsed = FilterState::from_params(&params_from(&qs)).expect("parse");
        assert_eq!(parsed, state);
    }

    #[test]
    fn submit_trims_and_resets_page() {
        let state = FilterState::submit("  engineer  ", "", None);
        assert_eq!(state.search.as_deref(), Some("engineer"));
        assert_eq!(state.location, None);
        assert_eq!(state.page, 1);
        assert_eq!(state.to_query_string(), "q=engineer&page=1");
    }

    #[test]
    fn submit_forces_page_one_even_when_filters_unchanged() {
        let state = FilterState::submit("rust", "NY", Some(JobType::Contract)).with_page(4);
        assert_eq!(state.page, 4);
        let resubmitted = FilterState::submit("rust", "NY", Some(JobType::Contract));
        assert_eq!(resubmitted.page, 1);
        assert_eq!(resubmitted.search, state.search);
        assert_eq!(resubmitted.location, state.location);
    }

    #[test]
    fn reset_serializes_to_empty_string() {
        assert_eq!(FilterState::reset().to_query_string(), "");
    }

    #[test]
    fn bare_page_two_still_serializes() {
        let state = FilterState::default().with_page(2);
        assert_eq!(state.to_query_string(), "page=2");
    }

    #[test]
    fn missing_params_mean_defaults() {
        let state = FilterState::from_params(&HashMap::new()).expect("parse");
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn whitespace_only_search_is_unset() {
        let state = FilterState::from_params(&params_from("q=+++&page=1")).expect("parse");
        assert_eq!(state.search, None);
    }

    #[test]
    fn invalid_page_is_rejected() {
        assert_eq!(
            FilterState::from_params(&params_from("page=abc")),
            Err(FilterError::InvalidPage)
        );
        assert_eq!(
            FilterState::from_params(&params_from("page=0")),
            Err(FilterError::InvalidPage)
        );
    }

    #[test]
    fn oversized_page_is_rejected_before_window_arithmetic() {
        assert_eq!(
            FilterState::from_params(&params_from(&format!("page={}", usize::MAX))),
            Err(FilterError::InvalidPage)
        );
        assert_eq!(
            FilterState::from_params(&params_from(&format!("page={}", MAX_PAGE + 1))),
            Err(FilterError::InvalidPage)
        );

        // The largest accepted page still yields a usable offset.
        let state =
            FilterState::from_params(&params_from(&format!("page={MAX_PAGE}"))).expect("parse");
        let query = build_listing_query(&state, None);
        assert_eq!(query.offset, ((MAX_PAGE - 1) * PAGE_SIZE) as i64);
    }

    #[test]
    fn unknown_job_type_is_rejected() {
        let err = FilterState::from_params(&params_from("job_type=Freelance")).unwrap_err();
        assert_eq!(err, FilterError::UnknownJobType("Freelance".to_string()));
    }

    #[test]
    fn page_window_arithmetic() {
        let (offset, end) = FilterState::default().with_page(2).page_window();
        assert_eq!(offset, 9);
        assert_eq!(end, 17);

        let (offset, end) = FilterState::default().page_window();
        assert_eq!(offset, 0);
        assert_eq!(end, 8);
    }

    #[test]
    fn page_count_is_ceiling_division() {
        assert_eq!(page_count(20), 3);
        assert_eq!(page_count(9), 1);
        assert_eq!(page_count(10), 2);
        assert_eq!(page_count(0), 0);
    }

    #[test]
    fn owner_filter_applies_only_when_authenticated() {
        let state = FilterState::default();
        let anonymous = build_listing_query(&state, None);
        assert!(!anonymous.select_sql.contains("user_id = ?"));
        assert!(anonymous.owner.is_none());

        let viewer = Uuid::new_v4();
        let authed = build_listing_query(&state, Some(viewer));
        assert!(authed.select_sql.contains("user_id = ?"));
        assert!(authed.count_sql.contains("user_id = ?"));
        assert_eq!(authed.owner, Some(viewer));
    }

    #[test]
    fn search_matches_are_case_insensitive_patterns() {
        let state = FilterState::submit("RuSt", "", None);
        let query = build_listing_query(&state, None);
        assert_eq!(
            query.text_params,
            vec!["%rust%", "%rust%", "%rust%"]
        );
        assert!(query.select_sql.contains("LOWER(title) LIKE ?"));
        assert!(query.count_sql.starts_with("SELECT COUNT(*)"));
        assert!(!query.count_sql.contains("ORDER BY"));
    }

    #[test]
    fn listing_query_paginates() {
        let state = FilterState::default().with_page(3);
        let query = build_listing_query(&state, None);
        assert_eq!(query.limit, 9);
        assert_eq!(query.offset, 18);
        assert!(query
            .select_sql
            .ends_with("ORDER BY created_at DESC LIMIT ? OFFSET ?"));
    }
}
