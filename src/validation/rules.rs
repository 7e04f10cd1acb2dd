//! Field rule tables: field name → ordered list of rules.
//!
//! The first failing rule for a field supplies its message. Fields that have
//! no entry in the table are always valid.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::ValidationReport;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9\s\-()]{6,19}$").expect("valid phone regex"));

/// What a rule checks
#[derive(Debug, Clone)]
pub enum Check {
    /// Present, non-null and not blank
    Required,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Url,
    Phone,
    /// Matches an arbitrary pattern
    Pattern(Regex),
    /// Numeric (or numeric string) within an inclusive range
    Range { min: f64, max: f64 },
    /// Whole number
    Integer,
    /// ISO date (YYYY-MM-DD)
    Date,
    /// One of a fixed set of string values
    OneOf(Vec<String>),
}

/// A check paired with the message reported when it fails
#[derive(Debug, Clone)]
pub struct Rule {
    pub check: Check,
    pub message: String,
}

impl Rule {
    pub fn new(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(Check::Required, message)
    }

    pub fn min_length(len: usize, message: impl Into<String>) -> Self {
        Self::new(Check::MinLength(len), message)
    }

    pub fn max_length(len: usize, message: impl Into<String>) -> Self {
        Self::new(Check::MaxLength(len), message)
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::new(Check::Email, message)
    }

    pub fn url(message: impl Into<String>) -> Self {
        Self::new(Check::Url, message)
    }

    pub fn phone(message: impl Into<String>) -> Self {
        Self::new(Check::Phone, message)
    }

    pub fn range(min: f64, max: f64, message: impl Into<String>) -> Self {
        Self::new(Check::Range { min, max }, message)
    }

    pub fn integer(message: impl Into<String>) -> Self {
        Self::new(Check::Integer, message)
    }

    pub fn date(message: impl Into<String>) -> Self {
        Self::new(Check::Date, message)
    }

    pub fn pattern(re: &Regex, message: impl Into<String>) -> Self {
        Self::new(Check::Pattern(re.clone()), message)
    }

    pub fn one_of(options: &[&str], message: impl Into<String>) -> Self {
        Self::new(
            Check::OneOf(options.iter().map(|o| (*o).to_string()).collect()),
            message,
        )
    }

    /// Whether `value` satisfies this rule.
    ///
    /// Everything except `Required` passes on an empty value so optional
    /// fields only get checked once filled in.
    pub fn passes(&self, value: Option<&Value>) -> bool {
        let present = value.filter(|v| !is_blank(v));

        match (&self.check, present) {
            (Check::Required, present) => present.is_some(),
            (_, None) => true,
            (Check::MinLength(min), Some(v)) => text_len(v) >= *min,
            (Check::MaxLength(max), Some(v)) => text_len(v) <= *max,
            (Check::Email, Some(v)) => as_text(v).is_some_and(|s| EMAIL_RE.is_match(s.trim())),
            (Check::Url, Some(v)) => as_text(v).is_some_and(|s| URL_RE.is_match(s.trim())),
            (Check::Phone, Some(v)) => as_text(v).is_some_and(|s| PHONE_RE.is_match(s.trim())),
            (Check::Pattern(re), Some(v)) => as_text(v).is_some_and(|s| re.is_match(s)),
            (Check::Range { min, max }, Some(v)) => {
                as_number(v).is_some_and(|n| n >= *min && n <= *max)
            }
            (Check::Integer, Some(v)) => as_number(v).is_some_and(|n| n.fract() == 0.0),
            (Check::Date, Some(v)) => as_text(v)
                .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
            (Check::OneOf(options), Some(v)) => {
                as_text(v).is_some_and(|s| options.iter().any(|o| o == s))
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str()
}

fn text_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.trim().chars().count(),
        Value::Array(items) => items.len(),
        other => other.to_string().chars().count(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ordered mapping from field identifier to its rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rules for a field
    pub fn field(mut self, name: &str, rules: Vec<Rule>) -> Self {
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| n == name) {
            entry.1 = rules;
        } else {
            self.fields.push((name.to_string(), rules));
        }
        self
    }

    /// Field names in table order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Check one field. Returns the first failing rule's message.
    pub fn validate_field(&self, name: &str, value: Option<&Value>) -> Option<&str> {
        let (_, rules) = self.fields.iter().find(|(n, _)| n == name)?;
        rules
            .iter()
            .find(|rule| !rule.passes(value))
            .map(|rule| rule.message.as_str())
    }

    /// Check every field in the table against `values`
    pub fn validate(&self, values: &Map<String, Value>) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (name, _) in &self.fields {
            if let Some(message) = self.validate_field(name, values.get(name)) {
                report.push(name.clone(), message);
            }
        }
        report
    }
}
