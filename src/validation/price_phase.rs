//! Price-phase validation against a ticket sale window

use chrono::{Days, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{format_date, ValidationReport};

/// Inclusive calendar window during which tickets are on sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SaleWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    fn describe(&self, date_format: &str) -> String {
        format!(
            "{} to {}",
            format_date(self.start, date_format),
            format_date(self.end, date_format)
        )
    }
}

/// A sub-period of a ticket's sale window with its own price and slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricePhase {
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_in_days: u32,
    /// Percentage of the ticket's base price charged during this phase
    pub price_percentage: f64,
    pub slots: u32,
}

impl PricePhase {
    /// Last day of the phase (start + duration - 1 day)
    pub fn end_date(&self) -> NaiveDate {
        let span = u64::from(self.duration_in_days.saturating_sub(1));
        self.start_date
            .checked_add_days(Days::new(span))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn overlaps(&self, other: &PricePhase) -> bool {
        self.start_date <= other.end_date() && other.start_date <= self.end_date()
    }
}

/// Check a new phase against the sale window and the ticket's existing phases.
///
/// Dates in messages use `date_format` (strftime notation).
pub fn validate_price_phase(
    window: &SaleWindow,
    existing: &[PricePhase],
    phase: &PricePhase,
    date_format: &str,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let range = window.describe(date_format);

    if phase.name.trim().is_empty() {
        report.push("name", "Phase name is required");
    }

    if phase.duration_in_days == 0 {
        report.push("durationInDays", "Phase must last at least one day");
    }

    if !(0.0..=100.0).contains(&phase.price_percentage) {
        report.push(
            "pricePercentage",
            "Price percentage must be between 0 and 100",
        );
    }

    if phase.slots == 0 {
        report.push("slots", "Phase must offer at least one slot");
    }

    let start = phase.start_date;
    if start < window.start {
        report.push(
            "startDate",
            format!(
                "Phase start date {} is before the ticket sale window opens (allowed range: {})",
                format_date(start, date_format),
                range
            ),
        );
    } else if start > window.end {
        report.push(
            "startDate",
            format!(
                "Phase start date {} is after the ticket sale window closes (allowed range: {})",
                format_date(start, date_format),
                range
            ),
        );
    } else if phase.duration_in_days > 0 && phase.end_date() > window.end {
        report.push(
            "durationInDays",
            format!(
                "Phase end date {} exceeds ticket sale window ({})",
                format_date(phase.end_date(), date_format),
                range
            ),
        );
    }

    if let Some(clash) = existing.iter().find(|other| other.overlaps(phase)) {
        report.push(
            "startDate",
            format!(
                "Phase overlaps existing phase '{}' ({} to {})",
                clash.name,
                format_date(clash.start_date, date_format),
                format_date(clash.end_date(), date_format)
            ),
        );
    }

    report
}
