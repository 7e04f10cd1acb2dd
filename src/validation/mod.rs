//! Pure validators that gate wizard advancement.
//!
//! Validators never mutate wizard state. They return a [`ValidationReport`]
//! holding at most one message per failing field.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod forms;
pub mod price_phase;
pub mod rules;

pub use forms::FormKind;
pub use price_phase::{validate_price_phase, PricePhase, SaleWindow};
pub use rules::{Rule, RuleSet};

/// Fallback used when the configured date format is not a valid strftime string
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single failing field and the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of running a validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a failure. Only the first failure per field is kept.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.message_for(&field).is_none() {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    /// Message for a field, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Fold another report into this one, keeping existing messages
    pub fn merge(&mut self, other: ValidationReport) {
        for error in other.errors {
            self.push(error.field, error.message);
        }
    }

    /// Convert into a `Result`, keeping the report as the error value
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Format a date for user-facing messages.
///
/// Invalid format strings fall back to ISO notation instead of panicking
/// inside chrono's `Display` impl.
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let valid = !StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    let format = if valid { format } else { FALLBACK_DATE_FORMAT };
    date.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_first_message_per_field() {
        let mut report = ValidationReport::new();
        report.push("name", "Name is required");
        report.push("name", "Name is too long");
        report.push("email", "Email is invalid");

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.message_for("name"), Some("Name is required"));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_display_joins_fields() {
        let mut report = ValidationReport::new();
        report.push("a", "bad");
        report.push("b", "worse");
        assert_eq!(report.to_string(), "a: bad; b: worse");
    }

    #[test]
    fn test_format_date_local_notation() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(format_date(date, "%d/%m/%Y"), "09/01/2025");
    }

    #[test]
    fn test_format_date_invalid_format_falls_back() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(format_date(date, "%Q"), "2025-01-09");
    }
}
