//! The wizard's step/completion state machine.
//!
//! All transitions are synchronous. Rejected moves leave the state untouched.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use super::draft::DraftData;
use super::steps::{step_title, ConferenceKind};

/// Whether the wizard is creating a new conference or editing an existing one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum WizardMode {
    #[default]
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WizardState {
    kind: ConferenceKind,
    current_step: u32,
    max_step: u32,
    completed_steps: BTreeSet<u32>,
    mode: WizardMode,
    conference_id: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    draft_data: DraftData,
    /// `max_step` at construction, restored by `reset`
    #[serde(skip)]
    #[ts(skip)]
    initial_max_step: u32,
}

impl WizardState {
    /// Fresh wizard in Create mode at step 1. `max_step` is clamped to at least 1.
    pub fn new(kind: ConferenceKind, max_step: u32) -> Self {
        let max_step = max_step.max(1);
        Self {
            kind,
            current_step: 1,
            max_step,
            completed_steps: BTreeSet::new(),
            mode: WizardMode::Create,
            conference_id: None,
            draft_data: DraftData::new(),
            initial_max_step: max_step,
        }
    }

    pub fn kind(&self) -> ConferenceKind {
        self.kind
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn max_step(&self) -> u32 {
        self.max_step
    }

    pub fn completed_steps(&self) -> &BTreeSet<u32> {
        &self.completed_steps
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn conference_id(&self) -> Option<&str> {
        self.conference_id.as_deref()
    }

    pub fn draft_data(&self) -> &DraftData {
        &self.draft_data
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == self.max_step
    }

    pub fn step_title(&self) -> String {
        step_title(self.kind, self.current_step)
    }

    /// A step is navigable once completed or when it is at or before the current step
    pub fn is_navigable(&self, step: u32) -> bool {
        (1..=self.max_step).contains(&step)
            && (self.completed_steps.contains(&step) || step <= self.current_step)
    }

    /// Mark the current step completed and move forward. No-op on the last step.
    pub fn advance(&mut self) {
        if self.current_step >= self.max_step {
            return;
        }
        self.completed_steps.insert(self.current_step);
        self.current_step += 1;
        tracing::debug!(step = self.current_step, "wizard advanced");
    }

    /// Move back one step. No-op on step 1.
    pub fn retreat(&mut self) {
        if self.current_step <= 1 {
            return;
        }
        self.current_step -= 1;
        tracing::debug!(step = self.current_step, "wizard retreated");
    }

    /// Jump to `step`. Only allowed in Edit mode and within `[1, max_step]`;
    /// anything else is ignored. Returns whether the jump happened.
    pub fn go_to(&mut self, step: u32) -> bool {
        if self.mode != WizardMode::Edit || !(1..=self.max_step).contains(&step) {
            tracing::debug!(step, mode = ?self.mode, "ignored wizard jump");
            return false;
        }
        self.current_step = step;
        tracing::debug!(step, "wizard jumped");
        true
    }

    pub fn mark_completed(&mut self, step: u32) {
        self.completed_steps.insert(step);
    }

    /// Enter Edit mode for an existing conference
    pub fn load_existing(
        &mut self,
        id: impl Into<String>,
        max_step: Option<u32>,
        basic_data: Option<Map<String, Value>>,
    ) {
        let id = id.into();
        tracing::info!(conference_id = %id, ?max_step, "loading existing conference into wizard");

        self.mode = WizardMode::Edit;
        self.current_step = 1;
        self.completed_steps.clear();
        self.conference_id = Some(id);
        if let Some(max_step) = max_step {
            self.max_step = max_step.max(1);
        }
        if let Some(data) = basic_data {
            self.draft_data.merge(data);
        }
    }

    /// Switch mode. Edit → Create discards the loaded conference.
    pub fn set_mode(&mut self, mode: WizardMode) {
        if self.mode == WizardMode::Edit && mode == WizardMode::Create {
            self.current_step = 1;
            self.conference_id = None;
            self.draft_data.clear();
            self.completed_steps.clear();
        }
        self.mode = mode;
    }

    pub fn set_conference_id(&mut self, id: impl Into<String>) {
        self.conference_id = Some(id.into());
    }

    pub fn merge_draft(&mut self, fields: Map<String, Value>) {
        self.draft_data.merge(fields);
    }

    /// Restore every field to its value at construction
    pub fn reset(&mut self) {
        *self = Self::new(self.kind, self.initial_max_step);
        tracing::debug!("wizard reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn technical() -> WizardState {
        WizardState::new(ConferenceKind::Technical, 6)
    }

    fn at_step(state: &mut WizardState, step: u32) {
        while state.current_step() < step {
            state.advance();
        }
    }

    #[test]
    fn test_new_state() {
        let state = technical();
        assert_eq!(state.current_step(), 1);
        assert_eq!(state.max_step(), 6);
        assert!(state.completed_steps().is_empty());
        assert_eq!(state.mode(), WizardMode::Create);
        assert!(state.conference_id().is_none());
        assert!(state.draft_data().is_empty());
    }

    #[test]
    fn test_zero_max_step_is_clamped() {
        let state = WizardState::new(ConferenceKind::Research, 0);
        assert_eq!(state.max_step(), 1);
        assert!(state.is_last_step());
    }

    #[test]
    fn test_go_to_in_create_mode_is_noop() {
        let mut state = technical();
        state.advance();
        for step in 0..=7 {
            let before = state.clone();
            assert!(!state.go_to(step));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_go_to_in_edit_mode() {
        let mut state = technical();
        state.load_existing("conf-1", None, None);

        assert!(state.go_to(5));
        assert_eq!(state.current_step(), 5);

        let before = state.clone();
        assert!(!state.go_to(0));
        assert!(!state.go_to(7));
        assert_eq!(state, before);
    }

    #[test]
    fn test_advance_at_last_step_is_noop() {
        let mut state = technical();
        at_step(&mut state, 6);
        let before = state.clone();
        state.advance();
        assert_eq!(state, before);
        assert!(!state.completed_steps().contains(&6));
    }

    #[test]
    fn test_retreat_at_first_step_is_noop() {
        let mut state = technical();
        let before = state.clone();
        state.retreat();
        assert_eq!(state, before);
    }

    #[test]
    fn test_advance_marks_previous_step_without_duplicates() {
        let mut state = technical();
        state.advance();
        assert!(state.completed_steps().contains(&1));

        state.retreat();
        state.advance();
        assert_eq!(state.completed_steps().len(), 1);
        assert_eq!(state.current_step(), 2);
    }

    #[test]
    fn test_navigability() {
        let mut state = technical();
        at_step(&mut state, 3);
        state.retreat();
        state.retreat();

        assert!(state.is_navigable(1));
        assert!(state.is_navigable(2));
        assert!(!state.is_navigable(3));
        assert!(!state.is_navigable(0));
        assert!(!state.is_navigable(7));
    }

    #[test]
    fn test_mark_completed_is_idempotent() {
        let mut state = technical();
        state.mark_completed(4);
        state.mark_completed(4);
        assert_eq!(state.completed_steps().iter().copied().collect::<Vec<_>>(), [4]);
    }

    #[test]
    fn test_load_existing() {
        let mut state = technical();
        at_step(&mut state, 3);
        state.load_existing(
            "conf-1",
            Some(6),
            json!({ "conferenceName": "X" }).as_object().cloned(),
        );

        assert_eq!(state.mode(), WizardMode::Edit);
        assert_eq!(state.current_step(), 1);
        assert!(state.completed_steps().is_empty());
        assert_eq!(state.conference_id(), Some("conf-1"));
        assert_eq!(state.max_step(), 6);
        assert_eq!(state.draft_data().get_str("conferenceName"), Some("X"));
    }

    #[test]
    fn test_load_existing_overrides_research_max_step() {
        let mut state = WizardState::new(ConferenceKind::Research, 5);
        state.load_existing("r-1", Some(8), None);
        assert_eq!(state.max_step(), 8);
        assert!(state.go_to(8));
    }

    #[test]
    fn test_switching_edit_to_create_clears_conference() {
        let mut state = technical();
        state.load_existing("conf-1", None, json!({ "a": 1 }).as_object().cloned());
        state.go_to(4);
        state.mark_completed(2);

        state.set_mode(WizardMode::Create);
        assert_eq!(state.mode(), WizardMode::Create);
        assert_eq!(state.current_step(), 1);
        assert!(state.conference_id().is_none());
        assert!(state.draft_data().is_empty());
        assert!(state.completed_steps().is_empty());
    }

    #[test]
    fn test_switching_create_to_edit_keeps_progress() {
        let mut state = technical();
        state.advance();
        state.set_mode(WizardMode::Edit);
        assert_eq!(state.current_step(), 2);
        assert_eq!(state.mode(), WizardMode::Edit);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let initial = WizardState::new(ConferenceKind::Research, 5);
        let mut state = initial.clone();
        state.advance();
        state.load_existing("r-9", Some(9), json!({ "x": true }).as_object().cloned());
        state.go_to(9);
        state.set_conference_id("r-10");

        state.reset();
        assert_eq!(state, initial);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut state = technical();
        state.advance();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["currentStep"], 2);
        assert_eq!(value["completedSteps"], json!([1]));
        assert_eq!(value["mode"], "create");
        assert!(value.get("initialMaxStep").is_none());
    }
}
