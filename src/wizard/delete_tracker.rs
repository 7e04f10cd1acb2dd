//! Ids of persisted sub-entities removed during an edit session.
//!
//! Populated when the user removes something the server already knows about,
//! flushed to the API as deletion lists on final submit, and cleared on
//! wizard reset or conference switch.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Kinds of sub-entity that can be deleted from an existing conference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum DeleteCategory {
    Ticket,
    Session,
    Policy,
    RefundPolicy,
    Media,
    Sponsor,
    Material,
    RankingFile,
    RankingReference,
    ResearchSession,
    RevisionDeadline,
}

impl DeleteCategory {
    pub fn all() -> &'static [DeleteCategory] {
        &[
            DeleteCategory::Ticket,
            DeleteCategory::Session,
            DeleteCategory::Policy,
            DeleteCategory::RefundPolicy,
            DeleteCategory::Media,
            DeleteCategory::Sponsor,
            DeleteCategory::Material,
            DeleteCategory::RankingFile,
            DeleteCategory::RankingReference,
            DeleteCategory::ResearchSession,
            DeleteCategory::RevisionDeadline,
        ]
    }

    /// Key used for this category's list in the save-all payload
    pub fn wire_key(&self) -> &'static str {
        match self {
            DeleteCategory::Ticket => "deletedTicketIds",
            DeleteCategory::Session => "deletedSessionIds",
            DeleteCategory::Policy => "deletedPolicyIds",
            DeleteCategory::RefundPolicy => "deletedRefundPolicyIds",
            DeleteCategory::Media => "deletedMediaIds",
            DeleteCategory::Sponsor => "deletedSponsorIds",
            DeleteCategory::Material => "deletedMaterialIds",
            DeleteCategory::RankingFile => "deletedRankingFileIds",
            DeleteCategory::RankingReference => "deletedRankingReferenceIds",
            DeleteCategory::ResearchSession => "deletedResearchSessionIds",
            DeleteCategory::RevisionDeadline => "deletedRevisionDeadlineIds",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteTracker {
    lists: BTreeMap<DeleteCategory, Vec<String>>,
}

impl DeleteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` for deletion. Tracking the same id twice is a no-op.
    ///
    /// Ids are never untracked individually; only `reset` clears them.
    pub fn track(&mut self, category: DeleteCategory, id: impl Into<String>) {
        let id = id.into();
        let ids = self.lists.entry(category).or_default();
        if ids.contains(&id) {
            return;
        }
        tracing::debug!(?category, id = %id, "tracked deletion");
        ids.push(id);
    }

    /// Ids tracked for a category, in the order they were removed
    pub fn ids(&self, category: DeleteCategory) -> &[String] {
        self.lists.get(&category).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.lists.values().all(Vec::is_empty)
    }

    /// Total tracked ids across all categories
    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Categories with at least one tracked id
    pub fn non_empty(&self) -> impl Iterator<Item = (DeleteCategory, &[String])> {
        self.lists
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(category, ids)| (*category, ids.as_slice()))
    }

    /// Deletion lists keyed by their wire names, omitting empty categories
    pub fn to_deletions(&self) -> BTreeMap<String, Vec<String>> {
        self.non_empty()
            .map(|(category, ids)| (category.wire_key().to_string(), ids.to_vec()))
            .collect()
    }

    /// Clear every category at once
    pub fn reset(&mut self) {
        self.lists.clear();
    }
}
