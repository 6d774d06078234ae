//! Domain model for an expense record.
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single expense record as persisted in the JSON document.
///
/// Field names are camelCase on the wire and on disk; `date` is kept as the
/// string the client submitted (validated to be parseable at creation time),
/// while `created_at` is a proper timestamp set by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl Expense {
    /// Generate a fresh unique expense ID.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Parse an expense date string into a DateTime.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00Z`), offsets without a colon
/// (`2024-01-15T10:30:00-0500`), and date-only (`2024-01-15`, interpreted as
/// midnight UTC). Returns `None` for anything else.
pub fn parse_expense_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }

    if let Ok(naive_date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        let naive_datetime = naive_date.and_hms_opt(0, 0, 0)?;
        let utc_offset = FixedOffset::east_opt(0)?;
        return naive_datetime.and_local_timezone(utc_offset).single();
    }

    None
}
