// src/url_builder.rs
//! Mapping between a [`FilterState`] and a LinkedIn job search URL.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::types::FilterState;

pub const SEARCH_BASE_URL: &str = "https://www.linkedin.com/jobs/search/";

const KEYWORDS_PARAM: &str = "keywords";
const LOCATION_PARAM: &str = "location";
const DISTANCE_PARAM: &str = "distance";
const JOB_TYPES_PARAM: &str = "f_JT";
const EXPERIENCE_PARAM: &str = "f_E";
const TIME_POSTED_PARAM: &str = "f_TPR";
const WORKPLACE_PARAM: &str = "f_WT";
const SORT_PARAM: &str = "sortBy";

/// Filters and free-text query recovered from a search URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSearch {
    pub filters: FilterState,
    pub query: String,
}

/// Build the search URL for `filters` with `query` as the keyword expression.
///
/// Empty fields are omitted, `distance` is only emitted alongside a location,
/// and values are percent-encoded. Codes are passed through unchecked.
pub fn build_search_url(filters: &FilterState, query: &str) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if !filters.location.is_empty() {
        params.push((LOCATION_PARAM, filters.location.clone()));
        if !filters.distance.is_empty() {
            params.push((DISTANCE_PARAM, filters.distance.clone()));
        }
    }

    let query = query.trim();
    if !query.is_empty() {
        params.push((KEYWORDS_PARAM, query.to_string()));
    }

    push_list(&mut params, JOB_TYPES_PARAM, &filters.job_types);
    push_list(&mut params, EXPERIENCE_PARAM, &filters.experience_levels);
    if !filters.time_posted.is_empty() {
        params.push((TIME_POSTED_PARAM, filters.time_posted.clone()));
    }
    push_list(&mut params, WORKPLACE_PARAM, &filters.workplace_types);
    if !filters.sort_by.is_empty() {
        params.push((SORT_PARAM, filters.sort_by.clone()));
    }

    if params.is_empty() {
        return SEARCH_BASE_URL.to_string();
    }

    let query_string = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", SEARCH_BASE_URL, query_string)
}

fn push_list(params: &mut Vec<(&str, String)>, name: &'static str, values: &[String]) {
    if !values.is_empty() {
        params.push((name, values.join(",")));
    }
}

/// Read the known search parameters back out of a URL.
///
/// Unknown parameters are ignored and list values are split on commas.
pub fn parse_search_url(url: &str) -> Result<ParsedSearch> {
    let url = Url::parse(url.trim()).with_context(|| format!("Invalid search URL: {}", url))?;

    let mut parsed = ParsedSearch::default();
    for (name, value) in url.query_pairs() {
        let value = value.into_owned();
        let filters = &mut parsed.filters;
        match name.as_ref() {
            KEYWORDS_PARAM => parsed.query = value,
            LOCATION_PARAM => filters.location = value,
            DISTANCE_PARAM => filters.distance = value,
            JOB_TYPES_PARAM => filters.job_types = split_list(&value),
            EXPERIENCE_PARAM => filters.experience_levels = split_list(&value),
            TIME_POSTED_PARAM => filters.time_posted = value,
            WORKPLACE_PARAM => filters.workplace_types = split_list(&value),
            SORT_PARAM => filters.sort_by = value,
            _ => {}
        }
    }

    Ok(parsed)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
