//! Rule tables for the admin entity forms

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::{Rule, RuleSet};

static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,9}$").expect("valid postal code regex"));

pub const USER_ROLES: &[&str] = &["admin", "organizer", "reviewer", "collaborator", "customer"];

/// Forms that carry a field rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Category,
    Publisher,
    User,
    Room,
    Destination,
}

impl FormKind {
    pub fn all() -> &'static [FormKind] {
        &[
            FormKind::Category,
            FormKind::Publisher,
            FormKind::User,
            FormKind::Room,
            FormKind::Destination,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Category => "category",
            FormKind::Publisher => "publisher",
            FormKind::User => "user",
            FormKind::Room => "room",
            FormKind::Destination => "destination",
        }
    }

    /// The rule table for this form
    pub fn rules(&self) -> RuleSet {
        match self {
            FormKind::Category => category_rules(),
            FormKind::Publisher => publisher_rules(),
            FormKind::User => user_rules(),
            FormKind::Room => room_rules(),
            FormKind::Destination => destination_rules(),
        }
    }
}

impl std::str::FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = FormKind::all().iter().map(FormKind::as_str).collect();
                format!("unknown form '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

fn category_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            vec![
                Rule::required("Category name is required"),
                Rule::max_length(100, "Category name must be at most 100 characters"),
            ],
        )
        .field(
            "description",
            vec![Rule::max_length(
                500,
                "Description must be at most 500 characters",
            )],
        )
}

fn publisher_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            vec![
                Rule::required("Publisher name is required"),
                Rule::min_length(2, "Publisher name must be at least 2 characters"),
            ],
        )
        .field(
            "email",
            vec![
                Rule::required("Email is required"),
                Rule::email("Please enter a valid email address"),
            ],
        )
        .field(
            "website",
            vec![Rule::url("Website must be a valid http(s) URL")],
        )
        .field("phone", vec![Rule::phone("Please enter a valid phone number")])
}

fn user_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "fullName",
            vec![
                Rule::required("Full name is required"),
                Rule::max_length(120, "Full name must be at most 120 characters"),
            ],
        )
        .field(
            "email",
            vec![
                Rule::required("Email is required"),
                Rule::email("Please enter a valid email address"),
            ],
        )
        .field(
            "password",
            vec![
                Rule::required("Password is required"),
                Rule::min_length(8, "Password must be at least 8 characters"),
            ],
        )
        .field(
            "role",
            vec![
                Rule::required("Role is required"),
                Rule::one_of(USER_ROLES, "Please select a valid role"),
            ],
        )
        .field("phone", vec![Rule::phone("Please enter a valid phone number")])
}

fn room_rules() -> RuleSet {
    RuleSet::new()
        .field("name", vec![Rule::required("Room name is required")])
        .field(
            "capacity",
            vec![
                Rule::required("Capacity is required"),
                Rule::integer("Capacity must be a whole number"),
                Rule::range(1.0, 10_000.0, "Capacity must be between 1 and 10000"),
            ],
        )
        .field("destinationId", vec![Rule::required("Destination is required")])
}

fn destination_rules() -> RuleSet {
    RuleSet::new()
        .field("name", vec![Rule::required("Destination name is required")])
        .field("country", vec![Rule::required("Country is required")])
        .field("city", vec![Rule::required("City is required")])
        .field(
            "address",
            vec![Rule::max_length(255, "Address must be at most 255 characters")],
        )
        .field(
            "postalCode",
            vec![Rule::pattern(&POSTAL_CODE_RE, "Please enter a valid postal code")],
        )
}
