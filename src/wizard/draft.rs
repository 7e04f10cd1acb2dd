//! Draft data accumulated across wizard steps.
//!
//! `DraftData` is the partial conference record. `DraftList`s hold the
//! sub-entity form entries (tickets, sessions, sponsors, ...) that the step
//! screens add and remove.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

use super::delete_tracker::{DeleteCategory, DeleteTracker};
use crate::validation::PricePhase;

/// Partial record of conference fields keyed by their wire names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DraftData(Map<String, Value>);

impl DraftData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: fields in `other` overwrite existing ones
    pub fn merge(&mut self, other: Map<String, Value>) {
        for (key, value) in other {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Parse an ISO (YYYY-MM-DD) date field
    pub fn get_date(&self, field: &str) -> Option<chrono::NaiveDate> {
        self.get_str(field)
            .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DraftData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn new_key() -> String {
    Uuid::new_v4().to_string()
}

/// An entry in a draft list
pub trait DraftEntry {
    /// Client-side key, stable for the lifetime of the entry
    fn key(&self) -> &str;
    /// Server id, present once the entry has been saved
    fn persisted_id(&self) -> Option<&str>;

    /// Entries can be addressed by client key or by server id
    fn matches(&self, key: &str) -> bool {
        self.key() == key || self.persisted_id() == Some(key)
    }
}

macro_rules! draft_entry {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DraftEntry for $ty {
                fn key(&self) -> &str {
                    &self.key
                }

                fn persisted_id(&self) -> Option<&str> {
                    self.id.as_deref()
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TicketDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub capacity: u32,
    #[serde(default)]
    pub phases: Vec<PricePhase>,
}

impl TicketDraft {
    pub fn new(name: impl Into<String>, price: f64, capacity: u32) -> Self {
        Self {
            key: new_key(),
            id: None,
            name: name.into(),
            price,
            capacity,
            phases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PolicyDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundPolicyDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Refund applies when cancelling at least this many days before the event
    pub days_before_event: u32,
    pub refund_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SponsorDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MediaDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Research-conference entries (materials, ranking files/references,
/// research sessions, revision deadlines) share one loose shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResearchEntryDraft {
    #[serde(default = "new_key")]
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub fields: Map<String, Value>,
}

draft_entry!(
    TicketDraft,
    SessionDraft,
    PolicyDraft,
    RefundPolicyDraft,
    SponsorDraft,
    MediaDraft,
    ResearchEntryDraft,
);

/// Ordered list of entries of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
pub struct DraftList<T>(Vec<T>);

impl<T> Default for DraftList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: DraftEntry> DraftList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: T) {
        self.0.push(entry);
    }

    /// Remove the entry with `key`. A persisted entry's id goes to `tracker`
    /// under `category`; unsaved entries are simply dropped.
    pub fn remove(
        &mut self,
        key: &str,
        category: DeleteCategory,
        tracker: &mut DeleteTracker,
    ) -> Option<T> {
        let pos = self.0.iter().position(|e| e.matches(key))?;
        let entry = self.0.remove(pos);
        if let Some(id) = entry.persisted_id() {
            tracker.track(category, id);
        }
        Some(entry)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|e| e.matches(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.0.iter_mut().find(|e| e.matches(key))
    }

    pub fn entries(&self) -> &[T] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Every sub-entity list the wizard edits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct DraftLists {
    pub tickets: DraftList<TicketDraft>,
    pub sessions: DraftList<SessionDraft>,
    pub policies: DraftList<PolicyDraft>,
    pub refund_policies: DraftList<RefundPolicyDraft>,
    pub media: DraftList<MediaDraft>,
    pub sponsors: DraftList<SponsorDraft>,
    pub materials: DraftList<ResearchEntryDraft>,
    pub ranking_files: DraftList<ResearchEntryDraft>,
    pub ranking_references: DraftList<ResearchEntryDraft>,
    pub research_sessions: DraftList<ResearchEntryDraft>,
    pub revision_deadlines: DraftList<ResearchEntryDraft>,
}

impl DraftLists {
    /// Remove an entry from the list backing `category`
    pub fn remove(
        &mut self,
        category: DeleteCategory,
        key: &str,
        tracker: &mut DeleteTracker,
    ) -> bool {
        match category {
            DeleteCategory::Ticket => self.tickets.remove(key, category, tracker).is_some(),
            DeleteCategory::Session => self.sessions.remove(key, category, tracker).is_some(),
            DeleteCategory::Policy => self.policies.remove(key, category, tracker).is_some(),
            DeleteCategory::RefundPolicy => {
                self.refund_policies.remove(key, category, tracker).is_some()
            }
            DeleteCategory::Media => self.media.remove(key, category, tracker).is_some(),
            DeleteCategory::Sponsor => self.sponsors.remove(key, category, tracker).is_some(),
            DeleteCategory::Material => self.materials.remove(key, category, tracker).is_some(),
            DeleteCategory::RankingFile => {
                self.ranking_files.remove(key, category, tracker).is_some()
            }
            DeleteCategory::RankingReference => self
                .ranking_references
                .remove(key, category, tracker)
                .is_some(),
            DeleteCategory::ResearchSession => self
                .research_sessions
                .remove(key, category, tracker)
                .is_some(),
            DeleteCategory::RevisionDeadline => self
                .revision_deadlines
                .remove(key, category, tracker)
                .is_some(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
