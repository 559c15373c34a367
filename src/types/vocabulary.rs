// src/types/vocabulary.rs
//! Option tables for every enumerated filter field.
//!
//! Each table is ordered the way the options are presented to the user, and
//! that order is reused wherever labels are listed (context summaries, API).

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub field: &'static str,
    options: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, Serialize)]
pub struct VocabularyOption {
    pub label: &'static str,
    pub code: &'static str,
}

impl Vocabulary {
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.options.iter().map(|(_, code)| *code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.options.iter().any(|(_, c)| *c == code)
    }

    /// Labels of the selected codes, in table order. Unknown codes are skipped.
    pub fn labels_for(&self, selected: &[String]) -> Vec<&'static str> {
        self.options
            .iter()
            .filter(|(_, code)| selected.iter().any(|s| s == code))
            .map(|(label, _)| *label)
            .collect()
    }

    /// Non-empty codes joined for inclusion in model instructions.
    pub fn code_list(&self) -> String {
        self.codes()
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn options(&self) -> Vec<VocabularyOption> {
        self.options
            .iter()
            .map(|(label, code)| VocabularyOption { label, code })
            .collect()
    }
}

pub const JOB_TYPES: Vocabulary = Vocabulary {
    field: "jobTypes",
    options: &[
        ("Full-time", "F"),
        ("Part-time", "P"),
        ("Contract", "C"),
        ("Temporary", "T"),
        ("Internship", "I"),
        ("Volunteer", "V"),
    ],
};

pub const EXPERIENCE_LEVELS: Vocabulary = Vocabulary {
    field: "experienceLevels",
    options: &[
        ("Internship", "1"),
        ("Entry level", "2"),
        ("Associate", "3"),
        ("Mid-Senior level", "4"),
        ("Director", "5"),
        ("Executive", "6"),
    ],
};

pub const TIME_POSTED: Vocabulary = Vocabulary {
    field: "timePosted",
    options: &[
        ("Past Hour", "r3600"),
        ("Past 6 Hours", "r21600"),
        ("Past 12 Hours", "r43200"),
        ("Past 24 Hours", "r86400"),
        ("Past 3 Days", "r259200"),
        ("Past Week", "r604800"),
        ("Past 2 Weeks", "r1209600"),
        ("Past Month", "r2592000"),
        ("Anytime", ""),
    ],
};

pub const DISTANCES: Vocabulary = Vocabulary {
    field: "distance",
    options: &[
        ("Within 10 miles", "10"),
        ("Within 25 miles", "25"),
        ("Within 50 miles", "50"),
        ("Within 100 miles", "100"),
        ("Any Distance", ""),
    ],
};

pub const WORKPLACE_TYPES: Vocabulary = Vocabulary {
    field: "workplaceTypes",
    options: &[("On-site", "1"), ("Remote", "2"), ("Hybrid", "3")],
};

/// Company types are keyword tags fed into the boolean query, not URL codes.
pub const COMPANY_TYPES: Vocabulary = Vocabulary {
    field: "companyTypes",
    options: &[
        ("Startup", "startup"),
        ("Unicorn (>$1B)", "unicorn"),
        ("Public Company", "public company"),
        ("Non-profit", "non-profit"),
    ],
};

pub const SORT_OPTIONS: Vocabulary = Vocabulary {
    field: "sortBy",
    options: &[("Most Relevant", "DD"), ("Most Recent", "R")],
};

pub const ALL: [Vocabulary; 7] = [
    JOB_TYPES,
    EXPERIENCE_LEVELS,
    TIME_POSTED,
    DISTANCES,
    WORKPLACE_TYPES,
    COMPANY_TYPES,
    SORT_OPTIONS,
];
