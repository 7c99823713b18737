use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Long-form calendar date, e.g. `October 19, 2026`.
const COMPLETION_DATE_FORMAT: &str = "%B %-d, %Y";

/// Rendered certificate. Only its id is persisted, on the quiz result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    pub issued_to: String,
    pub course_title: String,
    pub score: u32,
    pub completion_date: String,
}

/// Format the quiz timestamp the way certificates display it.
pub fn completion_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(COMPLETION_DATE_FORMAT).to_string()
}
