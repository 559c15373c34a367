// src/types/saved_search.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::filter_state::FilterState;

/// A bookmarked search: the filters, the boolean query and the URL they produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub params: FilterState,
    #[serde(default)]
    pub query: String,
    pub created_at: DateTime<Utc>,
}

impl SavedSearch {
    pub fn new(name: String, url: String, params: FilterState, query: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            url,
            params,
            query,
            created_at: Utc::now(),
        }
    }
}
