// src/gateway/prompts.rs
//! Instructions and schemas sent to the model for each gateway call.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::types::vocabulary::{
    Vocabulary, COMPANY_TYPES, DISTANCES, EXPERIENCE_LEVELS, JOB_TYPES, SORT_OPTIONS,
    TIME_POSTED, WORKPLACE_TYPES,
};
use crate::types::FilterState;

pub const EXTRACTION_INSTRUCTION: &str = r#"You are an expert LinkedIn job search assistant. Convert the user's natural language description of their ideal job into precise LinkedIn search parameters.

Rules:
- Fill in every parameter from the user's description.
- Set 'distance' only when the user gives a search radius (for example "within 25 miles"); otherwise use an empty string.
- 'keywords' and 'excludeKeywords' are plain comma-separated lists of terms. Do not use boolean operators in them.
- Map seniority hints (for example "senior" or "5 years") to the closest 'experienceLevels' codes.
- Map recency hints (for example "posted yesterday") to the matching 'timePosted' code.
- When the user mentions company types such as startups, unicorns, public companies or non-profits, fill 'companyTypes' with the matching tags: "startup", "unicorn", "public company", "non-profit".
- Use 'R' (Most Recent) for 'sortBy' unless the user asks for relevance.

Return ONLY a JSON object matching the provided schema."#;

pub const QUERY_INSTRUCTION: &str = r#"You are an expert LinkedIn job search query writer. Turn a JSON object of search parameters into one accurate boolean search string for the LinkedIn 'keywords' field.

Rules:
1. Build a single string using parentheses, OR, AND and NOT.
2. Split the comma-separated 'keywords' into OR groups of synonyms or related skills. Quote multi-word phrases. Join distinct concepts with AND.
3. Add every term from the comma-separated 'excludeKeywords' prefixed with NOT.
4. Use 'experienceLevels' to steer the wording. For junior or entry-level searches you might add (junior OR "entry level" OR graduate) and NOT (senior OR lead OR principal); for senior searches do the opposite.
5. When 'companyTypes' is not empty, append an AND group of its tags, for example AND (startup OR unicorn).
6. Include closely related terms and technologies so the search is thorough.

Return ONLY the boolean search string, with no other text or explanation."#;

const LIST_SEPARATOR: &str = ", ";
const ANY: &str = "Any";

/// Response schema for the extraction call. Every field is required.
pub fn extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "keywords": {
                "type": "STRING",
                "description": "Comma-separated keywords for the job title and skills. Example: \"Software Engineer, Python, React, Cloud\""
            },
            "excludeKeywords": {
                "type": "STRING",
                "description": "Comma-separated keywords to exclude from the search. Example: \"Senior, Manager, Lead\""
            },
            "location": {
                "type": "STRING",
                "description": "Geographical location for the search, e.g. \"California, United States\""
            },
            "distance": {
                "type": "STRING",
                "description": format!("Search radius in miles from the location. Available options: {}. Empty string for any distance.", DISTANCES.code_list())
            },
            "jobTypes": code_array("Job type codes.", &JOB_TYPES),
            "experienceLevels": code_array("Experience level codes matching the user's seniority.", &EXPERIENCE_LEVELS),
            "timePosted": {
                "type": "STRING",
                "description": format!("A single time posted code. Available options: {}. Empty string for anytime.", TIME_POSTED.code_list())
            },
            "workplaceTypes": code_array("Workplace type codes.", &WORKPLACE_TYPES),
            "companyTypes": code_array("Company type tags matching the user's preference.", &COMPANY_TYPES),
            "sortBy": {
                "type": "STRING",
                "description": format!("A single sort code. Available options: {}. Default to R (Most Recent).", SORT_OPTIONS.code_list())
            }
        },
        "required": [
            "keywords", "excludeKeywords", "location", "distance", "jobTypes",
            "experienceLevels", "timePosted", "workplaceTypes", "companyTypes", "sortBy"
        ]
    })
}

fn code_array(description: &str, vocabulary: &Vocabulary) -> Value {
    json!({
        "type": "ARRAY",
        "description": format!("{} Available options: {}.", description, vocabulary.code_list()),
        "items": {"type": "STRING"}
    })
}

pub fn query_contents(filters: &FilterState) -> Result<String> {
    let params =
        serde_json::to_string_pretty(filters).context("Failed to serialize search parameters")?;
    Ok(format!(
        "Generate a boolean query for the following search parameters: {}",
        params
    ))
}

/// Human-readable summary of the active filters, `Any` where nothing is set.
pub fn context_summary(filters: &FilterState) -> String {
    let distance = if filters.distance.is_empty() {
        ANY.to_string()
    } else {
        format!("Within {} miles", filters.distance)
    };

    let lines = [
        ("Keywords", or_any(filters.keywords.clone())),
        ("Exclude Keywords", or_any(filters.exclude_keywords.clone())),
        ("Location", or_any(filters.location.clone())),
        ("Distance", distance),
        ("Job Types", labels(&JOB_TYPES, &filters.job_types)),
        ("Experience Levels", labels(&EXPERIENCE_LEVELS, &filters.experience_levels)),
        ("Workplace", labels(&WORKPLACE_TYPES, &filters.workplace_types)),
        ("Company Types", labels(&COMPANY_TYPES, &filters.company_types)),
    ];

    let mut summary = String::from("Current search context:\n");
    for (name, value) in lines {
        summary.push_str(&format!("- {}: {}\n", name, value));
    }
    summary
}

fn or_any(value: String) -> String {
    if value.trim().is_empty() {
        ANY.to_string()
    } else {
        value
    }
}

fn labels(vocabulary: &Vocabulary, selected: &[String]) -> String {
    or_any(vocabulary.labels_for(selected).join(LIST_SEPARATOR))
}

pub fn suggestion_instruction(filters: &FilterState) -> String {
    format!(
        r#"You are an expert LinkedIn job search keyword assistant.
The user already has a job search, summarized below. Suggest *additional* relevant keywords for their new request, taking the existing search into account.

{}
- Read the user's new request.
- Produce a concise, comma-separated list of new keywords that complement the existing ones.
- Do not repeat any keyword already listed under "Keywords" above.
- Focus on technologies, related skills, synonyms or alternative job titles.
- Return ONLY the new keywords, with no explanation or formatting.

Example request: "add some cloud technologies"
Example output: AWS, Azure, GCP, Docker, Kubernetes

Example request: "more soft skills for this role"
Example output: Leadership, Communication, Teamwork, Collaboration, Problem-solving"#,
        context_summary(filters)
    )
}

pub fn suggestion_contents(prompt: &str) -> String {
    format!("User's new request: \"{}\"", prompt)
}
