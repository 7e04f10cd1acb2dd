//! Step layouts and per-step validation tables

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::validation::{Rule, RuleSet, ValidationReport};

/// Which wizard flavour is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ConferenceKind {
    /// Fixed six-step flow
    #[default]
    Technical,
    /// Phase-dependent number of steps
    Research,
}

/// Steps of the technical conference wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechnicalStep {
    BasicInfo = 1,
    Tickets = 2,
    Sessions = 3,
    Policies = 4,
    SponsorsMedia = 5,
    Review = 6,
}

impl TechnicalStep {
    pub fn all() -> &'static [TechnicalStep] {
        &[
            TechnicalStep::BasicInfo,
            TechnicalStep::Tickets,
            TechnicalStep::Sessions,
            TechnicalStep::Policies,
            TechnicalStep::SponsorsMedia,
            TechnicalStep::Review,
        ]
    }

    pub fn from_number(step: u32) -> Option<Self> {
        Self::all().iter().copied().find(|s| *s as u32 == step)
    }

    pub fn title(&self) -> &'static str {
        match self {
            TechnicalStep::BasicInfo => "Basic Info",
            TechnicalStep::Tickets => "Tickets",
            TechnicalStep::Sessions => "Sessions",
            TechnicalStep::Policies => "Policies",
            TechnicalStep::SponsorsMedia => "Sponsors & Media",
            TechnicalStep::Review => "Review",
        }
    }
}

/// Named leading steps of the research wizard; later steps are numbered phases
const RESEARCH_STEP_TITLES: &[&str] = &[
    "Basic Info",
    "Research Materials",
    "Rankings",
    "Research Sessions",
    "Revision Deadlines",
];

/// Display title for a step number
pub fn step_title(kind: ConferenceKind, step: u32) -> String {
    match kind {
        ConferenceKind::Technical => TechnicalStep::from_number(step)
            .map(|s| s.title().to_string())
            .unwrap_or_else(|| format!("Step {step}")),
        ConferenceKind::Research => step
            .checked_sub(1)
            .and_then(|i| RESEARCH_STEP_TITLES.get(i as usize))
            .map(|t| (*t).to_string())
            .unwrap_or_else(|| format!("Phase {step}")),
    }
}

fn basic_info_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "conferenceName",
            vec![
                Rule::required("Conference name is required"),
                Rule::max_length(200, "Conference name must be at most 200 characters"),
            ],
        )
        .field(
            "startDate",
            vec![
                Rule::required("Start date is required"),
                Rule::date("Start date must be a valid date"),
            ],
        )
        .field(
            "endDate",
            vec![
                Rule::required("End date is required"),
                Rule::date("End date must be a valid date"),
            ],
        )
        .field("destinationId", vec![Rule::required("Destination is required")])
        .field(
            "contactEmail",
            vec![Rule::email("Please enter a valid contact email")],
        )
}

fn ticket_window_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "ticketSaleStartDate",
            vec![
                Rule::required("Ticket sale start date is required"),
                Rule::date("Ticket sale start date must be a valid date"),
            ],
        )
        .field(
            "ticketSaleEndDate",
            vec![
                Rule::required("Ticket sale end date is required"),
                Rule::date("Ticket sale end date must be a valid date"),
            ],
        )
}

fn research_basic_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "conferenceName",
            vec![Rule::required("Conference name is required")],
        )
        .field(
            "submissionDeadline",
            vec![
                Rule::required("Submission deadline is required"),
                Rule::date("Submission deadline must be a valid date"),
            ],
        )
}

fn parse_date(values: &Map<String, Value>, field: &str) -> Option<NaiveDate> {
    values
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Report `later` if it falls before `earlier` (both fields must parse)
fn check_order(
    values: &Map<String, Value>,
    earlier: &str,
    later: &str,
    message: &str,
    report: &mut ValidationReport,
) {
    if let (Some(start), Some(end)) = (parse_date(values, earlier), parse_date(values, later)) {
        if end < start {
            report.push(later, message);
        }
    }
}

/// Validate the fields submitted for `step`. Steps without rules always pass.
pub fn validate_step(
    kind: ConferenceKind,
    step: u32,
    fields: &Map<String, Value>,
) -> ValidationReport {
    match (kind, step) {
        (ConferenceKind::Technical, 1) => {
            let mut report = basic_info_rules().validate(fields);
            check_order(
                fields,
                "startDate",
                "endDate",
                "End date must not be before the start date",
                &mut report,
            );
            report
        }
        (ConferenceKind::Technical, 2) => {
            let mut report = ticket_window_rules().validate(fields);
            check_order(
                fields,
                "ticketSaleStartDate",
                "ticketSaleEndDate",
                "Ticket sale end date must not be before its start date",
                &mut report,
            );
            report
        }
        (ConferenceKind::Research, 1) => research_basic_rules().validate(fields),
        _ => ValidationReport::new(),
    }
}
