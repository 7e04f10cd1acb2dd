//! One wizard controller per creation/edit session.
//!
//! `WizardSession` owns the state machine, the delete tracker and the draft
//! lists, and talks to the API through a [`ConferenceGateway`]. A failed
//! call leaves everything exactly as it was so the user can retry the step.

use serde_json::{Map, Value};

use super::delete_tracker::{DeleteCategory, DeleteTracker};
use super::draft::{DraftData, DraftLists};
use super::gateway::{ConferenceGateway, SaveAllRequest, StepSaveRequest};
use super::state::{WizardMode, WizardState};
use super::steps::{validate_step, ConferenceKind};
use crate::config::Config;
use crate::error::SessionError;
use crate::validation::{validate_price_phase, PricePhase, SaleWindow, ValidationReport};

/// Draft fields holding the ticket sale window
pub const SALE_START_FIELD: &str = "ticketSaleStartDate";
pub const SALE_END_FIELD: &str = "ticketSaleEndDate";

/// Result of a successful step submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved from one step to the next
    Advanced { from: u32, to: u32 },
    /// The last step was saved; the wizard stays on it
    Completed { step: u32 },
}

pub struct WizardSession<G> {
    gateway: G,
    state: WizardState,
    tracker: DeleteTracker,
    lists: DraftLists,
    technical_steps: u32,
    research_steps: u32,
    date_format: String,
    /// Kind and step count the session started with; `reset` returns here
    initial_kind: ConferenceKind,
    initial_max_step: u32,
}

impl<G: ConferenceGateway> WizardSession<G> {
    pub fn new(gateway: G, kind: ConferenceKind, config: &Config) -> Self {
        let technical_steps = config.wizard.technical_steps;
        let research_steps = config.wizard.research_steps;
        let max_step = match kind {
            ConferenceKind::Technical => technical_steps,
            ConferenceKind::Research => research_steps,
        };

        Self {
            gateway,
            state: WizardState::new(kind, max_step),
            tracker: DeleteTracker::new(),
            lists: DraftLists::default(),
            technical_steps,
            research_steps,
            date_format: config.validation.date_format.clone(),
            initial_kind: kind,
            initial_max_step: max_step,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Direct access for navigation (advance/retreat/go_to)
    pub fn state_mut(&mut self) -> &mut WizardState {
        &mut self.state
    }

    pub fn tracker(&self) -> &DeleteTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DeleteTracker {
        &mut self.tracker
    }

    pub fn lists(&self) -> &DraftLists {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut DraftLists {
        &mut self.lists
    }

    /// Run the current step's validators without submitting
    pub fn validate_current_step(&self, fields: &Map<String, Value>) -> ValidationReport {
        validate_step(self.state.kind(), self.state.current_step(), fields)
    }

    /// Validate and save the current step, then advance.
    pub async fn submit_step(
        &mut self,
        fields: Map<String, Value>,
    ) -> Result<StepOutcome, SessionError> {
        let step = self.state.current_step();
        self.validate_current_step(&fields).into_result()?;

        let request = StepSaveRequest {
            conference_id: self.state.conference_id().map(str::to_string),
            step,
            mode: self.state.mode(),
            fields: DraftData::from(fields.clone()),
        };

        let response = self.gateway.save_step(request).await.map_err(|e| {
            tracing::warn!(step, error = %e, "step save failed");
            e
        })?;

        self.state.set_conference_id(response.conference_id);
        self.state.merge_draft(fields);

        if self.state.is_last_step() {
            self.state.mark_completed(step);
            tracing::info!(step, "final step saved");
            Ok(StepOutcome::Completed { step })
        } else {
            self.state.advance();
            Ok(StepOutcome::Advanced {
                from: step,
                to: self.state.current_step(),
            })
        }
    }

    /// Payload for the final submission
    pub fn save_all_request(&self) -> SaveAllRequest {
        SaveAllRequest {
            conference_id: self.state.conference_id().map(str::to_string),
            draft: self.state.draft_data().clone(),
            entities: self.lists.clone(),
            deletions: self.tracker.to_deletions(),
        }
    }

    /// Submit everything. Pending deletions are flushed once the server accepts them.
    pub async fn save_all(&mut self) -> Result<(), SessionError> {
        let request = self.save_all_request();
        let pending = self.tracker.len();

        self.gateway.save_all(request).await.map_err(|e| {
            tracing::warn!(error = %e, "save-all failed");
            e
        })?;

        tracing::info!(
            conference_id = ?self.state.conference_id(),
            deletions = pending,
            "conference saved"
        );
        self.tracker.reset();
        Ok(())
    }

    /// Fetch an existing conference and switch the wizard to editing it
    pub async fn load_conference(&mut self, id: &str) -> Result<(), SessionError> {
        let loaded = self.gateway.load_conference(id).await?;

        self.enter_edit(
            loaded.kind,
            loaded.id,
            loaded.max_step,
            Some(loaded.basic_data.into_map()),
        );
        self.lists = loaded.entities;
        Ok(())
    }

    /// Enter Edit mode for `id`. Deletions and entries from any previous
    /// conference are discarded.
    pub fn load_existing(
        &mut self,
        id: impl Into<String>,
        max_step: Option<u32>,
        basic_data: Option<Map<String, Value>>,
    ) {
        self.enter_edit(self.state.kind(), id.into(), max_step, basic_data);
    }

    fn enter_edit(
        &mut self,
        kind: ConferenceKind,
        id: String,
        max_step: Option<u32>,
        basic_data: Option<Map<String, Value>>,
    ) {
        self.state = WizardState::new(kind, self.steps_for(kind));
        self.tracker.reset();
        self.lists.clear();
        self.state.load_existing(id, max_step, basic_data);
    }

    fn steps_for(&self, kind: ConferenceKind) -> u32 {
        match kind {
            ConferenceKind::Technical => self.technical_steps,
            ConferenceKind::Research => self.research_steps,
        }
    }

    /// Switch mode. Leaving Edit mode also drops pending deletions and entries.
    pub fn set_mode(&mut self, mode: WizardMode) {
        if self.state.mode() == WizardMode::Edit && mode == WizardMode::Create {
            self.tracker.reset();
            self.lists.clear();
        }
        self.state.set_mode(mode);
    }

    /// Remove a sub-entity by key (or server id). Returns whether it existed.
    pub fn remove_entity(&mut self, category: DeleteCategory, key: &str) -> bool {
        self.lists.remove(category, key, &mut self.tracker)
    }

    /// Ticket sale window configured on the draft, if both dates are set
    pub fn sale_window(&self) -> Option<SaleWindow> {
        let draft = self.state.draft_data();
        Some(SaleWindow::new(
            draft.get_date(SALE_START_FIELD)?,
            draft.get_date(SALE_END_FIELD)?,
        ))
    }

    /// Validate a new price phase and attach it to a ticket
    pub fn add_price_phase(
        &mut self,
        ticket_key: &str,
        phase: PricePhase,
    ) -> Result<(), SessionError> {
        let window = self.sale_window().ok_or(SessionError::MissingSaleWindow)?;
        let ticket = self
            .lists
            .tickets
            .get_mut(ticket_key)
            .ok_or_else(|| SessionError::UnknownTicket(ticket_key.to_string()))?;

        validate_price_phase(&window, &ticket.phases, &phase, &self.date_format).into_result()?;
        ticket.phases.push(phase);
        Ok(())
    }

    /// Discard the whole session: state, pending deletions and entries
    pub fn reset(&mut self) {
        self.state = WizardState::new(self.initial_kind, self.initial_max_step);
        self.tracker.reset();
        self.lists.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmissionError;
    use crate::wizard::draft::TicketDraft;
    use crate::wizard::gateway::{LoadedConference, RecordingGateway};
    use chrono::NaiveDate;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn basic_info() -> Map<String, Value> {
        object(json!({
            "conferenceName": "RustConf",
            "startDate": "2025-09-10",
            "endDate": "2025-09-12",
            "destinationId": "d-1",
        }))
    }

    fn session() -> WizardSession<RecordingGateway> {
        WizardSession::new(
            RecordingGateway::new(),
            ConferenceKind::Technical,
            &Config::default(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_submit_step_advances_and_records_id() {
        let mut session = session();
        let outcome = session.submit_step(basic_info()).await.unwrap();

        assert_eq!(outcome, StepOutcome::Advanced { from: 1, to: 2 });
        assert!(session.state().completed_steps().contains(&1));
        assert!(session.state().conference_id().is_some());
        assert_eq!(
            session.state().draft_data().get_str("conferenceName"),
            Some("RustConf")
        );

        let requests = session.gateway().step_requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].conference_id.is_none());
    }

    #[tokio::test]
    async fn test_invalid_step_is_not_submitted() {
        let mut session = session();
        let before = session.state().clone();

        let err = session.submit_step(Map::new()).await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(session.state(), &before);
        assert!(session.gateway().step_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_state_unchanged() {
        let mut session = session();
        session
            .gateway()
            .fail_next(SubmissionError::Server {
                status: 502,
                message: "bad gateway".into(),
            })
            .await;
        let before = session.state().clone();

        let err = session.submit_step(basic_info()).await.unwrap_err();
        assert!(matches!(err, SessionError::Submission(_)));
        assert_eq!(session.state(), &before);

        // Retry of the same step succeeds
        assert!(session.submit_step(basic_info()).await.is_ok());
    }

    #[tokio::test]
    async fn test_last_step_marks_completed() {
        let mut session = session();
        session.submit_step(basic_info()).await.unwrap();
        session
            .submit_step(object(json!({
                "ticketSaleStartDate": "2025-01-10",
                "ticketSaleEndDate": "2025-01-20",
            })))
            .await
            .unwrap();
        for _ in 3..6 {
            session.submit_step(Map::new()).await.unwrap();
        }
        assert_eq!(session.state().current_step(), 6);

        let outcome = session.submit_step(Map::new()).await.unwrap();
        assert_eq!(outcome, StepOutcome::Completed { step: 6 });
        assert_eq!(session.state().completed_steps().len(), 6);
    }

    #[tokio::test]
    async fn test_load_conference_then_save_all_flushes_deletions() {
        let entities: DraftLists = serde_json::from_value(json!({
            "tickets": [{ "id": "t-1", "name": "Standard", "price": 100.0, "capacity": 50 }],
            "sponsors": [{ "id": "sp-1", "name": "Acme" }],
        }))
        .unwrap();
        let gateway = RecordingGateway::new().with_conference(LoadedConference {
            id: "conf-1".to_string(),
            kind: ConferenceKind::Technical,
            max_step: Some(6),
            basic_data: DraftData::from(object(json!({ "conferenceName": "X" }))),
            entities,
        });
        let mut session =
            WizardSession::new(gateway, ConferenceKind::Technical, &Config::default());

        session.load_conference("conf-1").await.unwrap();
        assert_eq!(session.state().mode(), WizardMode::Edit);
        assert_eq!(session.state().conference_id(), Some("conf-1"));
        assert_eq!(session.lists().tickets.len(), 1);

        assert!(session.remove_entity(DeleteCategory::Ticket, "t-1"));
        assert!(session.remove_entity(DeleteCategory::Sponsor, "sp-1"));
        assert!(!session.remove_entity(DeleteCategory::Sponsor, "sp-1"));

        session.save_all().await.unwrap();
        let sent = session.gateway().save_all_requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].conference_id.as_deref(), Some("conf-1"));
        assert_eq!(sent[0].deletions["deletedTicketIds"], vec!["t-1".to_string()]);
        assert_eq!(sent[0].deletions["deletedSponsorIds"], vec!["sp-1".to_string()]);
        assert!(session.tracker().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_all_keeps_deletions() {
        let mut session = session();
        session.tracker_mut().track(DeleteCategory::Media, "m-1");
        session
            .gateway()
            .fail_next(SubmissionError::Network("offline".into()))
            .await;

        assert!(session.save_all().await.is_err());
        assert_eq!(session.tracker().ids(DeleteCategory::Media), ["m-1"]);
    }

    #[tokio::test]
    async fn test_loading_research_conference_switches_kind() {
        let gateway = RecordingGateway::new().with_conference(LoadedConference {
            id: "r-1".to_string(),
            kind: ConferenceKind::Research,
            max_step: None,
            basic_data: DraftData::new(),
            entities: DraftLists::default(),
        });
        let mut session =
            WizardSession::new(gateway, ConferenceKind::Technical, &Config::default());

        session.load_conference("r-1").await.unwrap();
        assert_eq!(session.state().kind(), ConferenceKind::Research);
        assert_eq!(session.state().max_step(), 5);
    }

    #[tokio::test]
    async fn test_reset_after_kind_switch_restores_initial_state() {
        let gateway = RecordingGateway::new().with_conference(LoadedConference {
            id: "r-1".to_string(),
            kind: ConferenceKind::Research,
            max_step: None,
            basic_data: DraftData::new(),
            entities: DraftLists::default(),
        });
        let mut session =
            WizardSession::new(gateway, ConferenceKind::Technical, &Config::default());
        let initial = session.state().clone();

        session.load_conference("r-1").await.unwrap();
        session.state_mut().advance();
        session.reset();

        assert_eq!(session.state(), &initial);
        assert_eq!(session.state().kind(), ConferenceKind::Technical);
        assert_eq!(session.state().max_step(), 6);
    }

    #[tokio::test]
    async fn test_load_existing_drops_previous_conference() {
        let mut session = session();
        session.load_existing("conf-a", Some(6), Some(object(json!({ "conferenceName": "A" }))));
        session.tracker_mut().track(DeleteCategory::Ticket, "t-from-a");
        session.lists_mut().tickets.add(TicketDraft::new("A", 1.0, 1));

        session.load_existing("conf-b", None, None);
        assert_eq!(session.state().conference_id(), Some("conf-b"));
        assert!(session.state().draft_data().is_empty());
        assert!(session.tracker().is_empty());
        assert!(session.lists().tickets.is_empty());

        session.save_all().await.unwrap();
        let sent = session.gateway().save_all_requests().await;
        assert_eq!(sent[0].conference_id.as_deref(), Some("conf-b"));
        assert!(sent[0].deletions.is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_conference_keeps_session() {
        let mut session = session();
        session.tracker_mut().track(DeleteCategory::Policy, "p-1");

        let err = session.load_conference("nope").await.unwrap_err();
        assert_eq!(
            err,
            SessionError::Submission(SubmissionError::NotFound("nope".into()))
        );
        assert_eq!(session.tracker().len(), 1);
    }

    #[tokio::test]
    async fn test_add_price_phase_checks_window() {
        let mut session = session();
        session.submit_step(basic_info()).await.unwrap();
        session
            .submit_step(object(json!({
                "ticketSaleStartDate": "2025-01-10",
                "ticketSaleEndDate": "2025-01-20",
            })))
            .await
            .unwrap();

        let ticket = TicketDraft::new("Standard", 100.0, 100);
        let key = ticket.key.clone();
        session.lists_mut().tickets.add(ticket);

        let phase = |days| PricePhase {
            name: "Early".to_string(),
            start_date: date(2025, 1, 15),
            duration_in_days: days,
            price_percentage: 75.0,
            slots: 10,
        };

        let err = session.add_price_phase(&key, phase(7)).unwrap_err();
        match err {
            SessionError::Validation(report) => assert!(report
                .message_for("durationInDays")
                .unwrap()
                .contains("exceeds ticket sale window")),
            other => panic!("unexpected error: {other:?}"),
        }

        session.add_price_phase(&key, phase(5)).unwrap();
        assert_eq!(session.lists().tickets.get(&key).unwrap().phases.len(), 1);
    }

    #[test]
    fn test_add_price_phase_requires_window_and_ticket() {
        let mut session = session();
        let phase = PricePhase {
            name: "Early".to_string(),
            start_date: date(2025, 1, 15),
            duration_in_days: 1,
            price_percentage: 50.0,
            slots: 1,
        };
        assert_eq!(
            session.add_price_phase("t", phase.clone()),
            Err(SessionError::MissingSaleWindow)
        );

        session.state_mut().merge_draft(object(json!({
            "ticketSaleStartDate": "2025-01-10",
            "ticketSaleEndDate": "2025-01-20",
        })));
        assert_eq!(
            session.add_price_phase("t", phase),
            Err(SessionError::UnknownTicket("t".into()))
        );
    }

    #[test]
    fn test_leaving_edit_mode_clears_tracker_and_lists() {
        let mut session = session();
        session.load_existing("conf-1", None, None);
        session.lists_mut().tickets.add(TicketDraft::new("A", 1.0, 1));
        session.tracker_mut().track(DeleteCategory::Ticket, "t-9");

        session.set_mode(WizardMode::Create);
        assert!(session.tracker().is_empty());
        assert!(session.lists().tickets.is_empty());
        assert!(session.state().conference_id().is_none());
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut session = session();
        let initial = session.state().clone();
        session.state_mut().advance();
        session.tracker_mut().track(DeleteCategory::Session, "s-1");
        session.lists_mut().tickets.add(TicketDraft::new("A", 1.0, 1));

        session.reset();
        assert_eq!(session.state(), &initial);
        assert!(session.tracker().is_empty());
        assert_eq!(session.lists(), &DraftLists::default());
    }
}
