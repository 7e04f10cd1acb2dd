//! Scripted wizard sessions.
//!
//! A script lists user actions (navigate, submit a step, remove an entity,
//! save all, ...) that are replayed against a [`WizardSession`] backed by a
//! [`RecordingGateway`]. The report shows the final state and every request
//! the wizard would have sent.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::validation::PricePhase;
use crate::wizard::{
    ConferenceKind, DeleteCategory, DraftLists, LoadedConference, RecordingGateway,
    SaveAllRequest, StepOutcome, StepSaveRequest, TicketDraft, WizardMode, WizardSession,
    WizardState,
};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardScript {
    #[serde(default)]
    pub kind: ConferenceKind,
    /// Conferences the recording gateway can load
    #[serde(default)]
    pub conferences: Vec<LoadedConference>,
    pub actions: Vec<ScriptAction>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ScriptAction {
    Advance,
    Retreat,
    GoTo {
        step: u32,
    },
    MarkCompleted {
        step: u32,
    },
    LoadExisting {
        id: String,
        #[serde(default, rename = "maxStep")]
        max_step: Option<u32>,
        #[serde(default, rename = "basicData")]
        basic_data: Option<Map<String, Value>>,
    },
    LoadConference {
        id: String,
    },
    SetMode {
        mode: WizardMode,
    },
    SubmitStep {
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddTicket {
        ticket: TicketDraft,
    },
    AddPricePhase {
        /// Ticket key or server id
        ticket: String,
        phase: PricePhase,
    },
    Remove {
        category: DeleteCategory,
        key: String,
    },
    Track {
        category: DeleteCategory,
        id: String,
    },
    SaveAll,
    Reset,
}

impl ScriptAction {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptAction::Advance => "advance",
            ScriptAction::Retreat => "retreat",
            ScriptAction::GoTo { .. } => "goTo",
            ScriptAction::MarkCompleted { .. } => "markCompleted",
            ScriptAction::LoadExisting { .. } => "loadExisting",
            ScriptAction::LoadConference { .. } => "loadConference",
            ScriptAction::SetMode { .. } => "setMode",
            ScriptAction::SubmitStep { .. } => "submitStep",
            ScriptAction::AddTicket { .. } => "addTicket",
            ScriptAction::AddPricePhase { .. } => "addPricePhase",
            ScriptAction::Remove { .. } => "remove",
            ScriptAction::Track { .. } => "track",
            ScriptAction::SaveAll => "saveAll",
            ScriptAction::Reset => "reset",
        }
    }
}

/// What happened for one action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub index: usize,
    pub action: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub actions: Vec<ActionRecord>,
    pub final_state: WizardState,
    pub entities: DraftLists,
    /// Deletions still pending at the end of the script
    pub pending_deletions: BTreeMap<String, Vec<String>>,
    pub step_requests: Vec<StepSaveRequest>,
    pub save_all_requests: Vec<SaveAllRequest>,
}

impl ReplayReport {
    pub fn failures(&self) -> usize {
        self.actions.iter().filter(|a| !a.ok).count()
    }
}

/// Load a script from a `.json` or `.toml` file
pub fn load_script(path: &Path) -> Result<WizardScript> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON script {}", path.display())),
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML script {}", path.display())),
        other => bail!(
            "Unsupported script extension {:?} (expected .json or .toml)",
            other.unwrap_or("")
        ),
    }
}

/// Replay every action. Failing actions are recorded and the script continues.
pub async fn run_script(script: WizardScript, config: &Config) -> ReplayReport {
    let gateway = script
        .conferences
        .into_iter()
        .fold(RecordingGateway::new(), RecordingGateway::with_conference);
    let mut session = WizardSession::new(gateway, script.kind, config);
    let mut records = Vec::with_capacity(script.actions.len());

    for (index, action) in script.actions.into_iter().enumerate() {
        let name = action.name();
        let (ok, detail) = apply(&mut session, action).await;
        if ok {
            tracing::debug!(index, action = name, %detail, "script action applied");
        } else {
            tracing::warn!(index, action = name, %detail, "script action failed");
        }
        records.push(ActionRecord {
            index,
            action: name,
            ok,
            detail,
        });
    }

    ReplayReport {
        actions: records,
        final_state: session.state().clone(),
        entities: session.lists().clone(),
        pending_deletions: session.tracker().to_deletions(),
        step_requests: session.gateway().step_requests().await,
        save_all_requests: session.gateway().save_all_requests().await,
    }
}

async fn apply(
    session: &mut WizardSession<RecordingGateway>,
    action: ScriptAction,
) -> (bool, String) {
    let state_line = |s: &WizardState| format!("step {}/{}", s.current_step(), s.max_step());

    match action {
        ScriptAction::Advance => {
            session.state_mut().advance();
            (true, state_line(session.state()))
        }
        ScriptAction::Retreat => {
            session.state_mut().retreat();
            (true, state_line(session.state()))
        }
        ScriptAction::GoTo { step } => {
            let moved = session.state_mut().go_to(step);
            let detail = if moved {
                state_line(session.state())
            } else {
                format!("jump to step {step} ignored")
            };
            (true, detail)
        }
        ScriptAction::MarkCompleted { step } => {
            session.state_mut().mark_completed(step);
            (true, format!("step {step} completed"))
        }
        ScriptAction::LoadExisting {
            id,
            max_step,
            basic_data,
        } => {
            session.load_existing(id, max_step, basic_data);
            (true, state_line(session.state()))
        }
        ScriptAction::LoadConference { id } => match session.load_conference(&id).await {
            Ok(()) => (true, format!("editing {id}")),
            Err(e) => (false, e.to_string()),
        },
        ScriptAction::SetMode { mode } => {
            session.set_mode(mode);
            (true, format!("mode {mode:?}"))
        }
        ScriptAction::SubmitStep { fields } => match session.submit_step(fields).await {
            Ok(StepOutcome::Advanced { from, to }) => {
                (true, format!("saved step {from}, now on {to}"))
            }
            Ok(StepOutcome::Completed { step }) => (true, format!("saved final step {step}")),
            Err(e) => (false, e.to_string()),
        },
        ScriptAction::AddTicket { ticket } => {
            let key = ticket.key.clone();
            session.lists_mut().tickets.add(ticket);
            (true, format!("ticket {key} added"))
        }
        ScriptAction::AddPricePhase { ticket, phase } => {
            match session.add_price_phase(&ticket, phase) {
                Ok(()) => (true, format!("phase added to {ticket}")),
                Err(e) => (false, e.to_string()),
            }
        }
        ScriptAction::Remove { category, key } => {
            if session.remove_entity(category, &key) {
                (true, format!("{category:?} {key} removed"))
            } else {
                (false, format!("no {category:?} entry '{key}'"))
            }
        }
        ScriptAction::Track { category, id } => {
            session.tracker_mut().track(category, id.as_str());
            (true, format!("{category:?} {id} tracked"))
        }
        ScriptAction::SaveAll => match session.save_all().await {
            Ok(()) => (true, "saved".to_string()),
            Err(e) => (false, e.to_string()),
        },
        ScriptAction::Reset => {
            session.reset();
            (true, "reset".to_string())
        }
    }
}
