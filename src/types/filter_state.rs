// src/types/filter_state.rs
use serde::{Deserialize, Serialize};

use super::vocabulary::{
    Vocabulary, DISTANCES, EXPERIENCE_LEVELS, JOB_TYPES, SORT_OPTIONS, TIME_POSTED,
    WORKPLACE_TYPES,
};

pub const DEFAULT_TIME_POSTED: &str = "r604800";
pub const DEFAULT_SORT_BY: &str = "R";

/// Structured job search criteria.
///
/// Field names serialize in camelCase so the same shape is used by the API,
/// filter files and the model's extraction schema. Missing fields read as
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub keywords: String,
    pub exclude_keywords: String,
    pub location: String,
    pub distance: String,
    pub job_types: Vec<String>,
    pub experience_levels: Vec<String>,
    pub time_posted: String,
    pub workplace_types: Vec<String>,
    pub company_types: Vec<String>,
    pub sort_by: String,
}

/// A code removed from a filter because it is not in the field's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCode {
    pub field: &'static str,
    pub code: String,
}

impl FilterState {
    /// The state a fresh search form starts with: past week, most recent first.
    pub fn initial() -> Self {
        Self {
            time_posted: DEFAULT_TIME_POSTED.to_string(),
            sort_by: DEFAULT_SORT_BY.to_string(),
            ..Self::default()
        }
    }

    /// Drop every enumerated code outside its vocabulary.
    ///
    /// `companyTypes` is a free-form tag list and is left alone.
    pub fn retain_known_codes(&mut self) -> Vec<RejectedCode> {
        let mut rejected = Vec::new();

        retain_scalar(&mut self.distance, &DISTANCES, &mut rejected);
        retain_scalar(&mut self.time_posted, &TIME_POSTED, &mut rejected);
        retain_scalar(&mut self.sort_by, &SORT_OPTIONS, &mut rejected);
        retain_list(&mut self.job_types, &JOB_TYPES, &mut rejected);
        retain_list(&mut self.experience_levels, &EXPERIENCE_LEVELS, &mut rejected);
        retain_list(&mut self.workplace_types, &WORKPLACE_TYPES, &mut rejected);

        rejected
    }
}

fn retain_scalar(value: &mut String, vocabulary: &Vocabulary, rejected: &mut Vec<RejectedCode>) {
    let code = value.trim();
    if code.is_empty() || vocabulary.contains(code) {
        *value = code.to_string();
    } else {
        rejected.push(RejectedCode {
            field: vocabulary.field,
            code: std::mem::take(value),
        });
    }
}

fn retain_list(values: &mut Vec<String>, vocabulary: &Vocabulary, rejected: &mut Vec<RejectedCode>) {
    let mut kept = Vec::with_capacity(values.len());
    for value in values.drain(..) {
        let code = value.trim();
        if !code.is_empty() && vocabulary.contains(code) {
            kept.push(code.to_string());
        } else {
            rejected.push(RejectedCode {
                field: vocabulary.field,
                code: value,
            });
        }
    }
    *values = kept;
}
