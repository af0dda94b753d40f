//! Application State Controller: script inputs plus the generation lifecycle state machine.
//!
//! | State | Exits to |
//! |-------|----------|
//! | idle | merging (generate) |
//! | merging → fact-checking → writing → translating | next stage, or error |
//! | translating | complete |
//! | complete | idle (reset) |
//! | error | idle (reset), merging (retry) |
//!
//! `GenerationState` is replaced wholesale on every transition, never patched.

use crate::blog::BlogData;
use crate::contract::SCRIPT_COUNT;
use crate::credential::{Credential, CREDENTIAL_ENV_VARS};
use crate::error::GenerationError;
use crate::progress::Stage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three raw transcripts. Order matters when assembled (1, 2, 3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInputs {
    #[serde(default)]
    pub script1: String,
    #[serde(default)]
    pub script2: String,
    #[serde(default)]
    pub script3: String,
}

/// One of the three input slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSlot {
    First,
    Second,
    Third,
}

impl ScriptSlot {
    pub const ALL: [ScriptSlot; SCRIPT_COUNT] =
        [ScriptSlot::First, ScriptSlot::Second, ScriptSlot::Third];

    /// 1-based slot number, as labelled in the prompt and the UI.
    pub fn number(self) -> usize {
        match self {
            ScriptSlot::First => 1,
            ScriptSlot::Second => 2,
            ScriptSlot::Third => 3,
        }
    }

    pub fn from_number(n: usize) -> Option<Self> {
        match n {
            1 => Some(ScriptSlot::First),
            2 => Some(ScriptSlot::Second),
            3 => Some(ScriptSlot::Third),
            _ => None,
        }
    }
}

impl ScriptInputs {
    pub fn new(script1: impl Into<String>, script2: impl Into<String>, script3: impl Into<String>) -> Self {
        Self {
            script1: script1.into(),
            script2: script2.into(),
            script3: script3.into(),
        }
    }

    pub fn get(&self, slot: ScriptSlot) -> &str {
        match slot {
            ScriptSlot::First => &self.script1,
            ScriptSlot::Second => &self.script2,
            ScriptSlot::Third => &self.script3,
        }
    }

    pub fn set(&mut self, slot: ScriptSlot, text: impl Into<String>) {
        let text = text.into();
        match slot {
            ScriptSlot::First => self.script1 = text,
            ScriptSlot::Second => self.script2 = text,
            ScriptSlot::Third => self.script3 = text,
        }
    }

    pub fn ordered(&self) -> [&str; SCRIPT_COUNT] {
        [&self.script1, &self.script2, &self.script3]
    }

    /// Dashboard rule: the generate button needs a non-blank first script.
    pub fn is_ready(&self) -> bool {
        !self.script1.trim().is_empty()
    }
}

/// Lifecycle of the current (or last) generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationState {
    pub is_generating: bool,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BlogData>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::idle()
    }
}

impl GenerationState {
    pub fn idle() -> Self {
        Self {
            is_generating: false,
            stage: Stage::Idle,
            error: None,
            data: None,
        }
    }

    pub fn in_flight(stage: Stage) -> Self {
        Self {
            is_generating: true,
            stage,
            error: None,
            data: None,
        }
    }

    pub fn complete(data: BlogData) -> Self {
        Self {
            is_generating: false,
            stage: Stage::Complete,
            error: None,
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "An unexpected error occurred".to_string()
        } else {
            message
        };
        Self {
            is_generating: false,
            stage: Stage::Error,
            error: Some(message),
            data: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("API key is missing; set one of {vars}", vars = CREDENTIAL_ENV_VARS.join(", "))]
    MissingCredential,

    #[error("A generation is already in progress")]
    AlreadyGenerating,

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("Scripts cannot be edited while a generation is in progress")]
    InputsFrozen,
}

impl ControllerError {
    /// Stable machine-readable kind for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerError::MissingCredential => "configuration",
            ControllerError::AlreadyGenerating => "already_generating",
            ControllerError::InvalidTransition { .. } => "invalid_transition",
            ControllerError::InputsFrozen => "inputs_frozen",
        }
    }
}

/// Handle to one run: its epoch and the scripts frozen when it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    epoch: u64,
    scripts: [String; SCRIPT_COUNT],
}

impl RunTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn scripts(&self) -> [&str; SCRIPT_COUNT] {
        [&self.scripts[0], &self.scripts[1], &self.scripts[2]]
    }
}

/// Owns the inputs and the lifecycle state. Single writer; wrap it for sharing.
#[derive(Debug, Default)]
pub struct StateController {
    inputs: ScriptInputs,
    state: GenerationState,
    epoch: u64,
}

impl StateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &ScriptInputs {
        &self.inputs
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn edit(&mut self, slot: ScriptSlot, text: impl Into<String>) -> Result<(), ControllerError> {
        if self.state.is_generating {
            return Err(ControllerError::InputsFrozen);
        }
        self.inputs.set(slot, text);
        Ok(())
    }

    pub fn set_inputs(&mut self, inputs: ScriptInputs) -> Result<(), ControllerError> {
        if self.state.is_generating {
            return Err(ControllerError::InputsFrozen);
        }
        self.inputs = inputs;
        Ok(())
    }

    /// Enter `merging`. Rejected with no transition when the credential is absent, a run is in
    /// flight, or the last run completed (reset first).
    pub fn begin(&mut self, credential: Option<&Credential>) -> Result<RunTicket, ControllerError> {
        if credential.is_none() {
            return Err(ControllerError::MissingCredential);
        }
        if self.state.is_generating {
            return Err(ControllerError::AlreadyGenerating);
        }
        if !matches!(self.state.stage, Stage::Idle | Stage::Error) {
            return Err(ControllerError::InvalidTransition {
                from: self.state.stage,
                to: Stage::Merging,
            });
        }

        self.epoch += 1;
        self.state = GenerationState::in_flight(Stage::Merging);
        let [a, b, c] = self.inputs.ordered();
        Ok(RunTicket {
            epoch: self.epoch,
            scripts: [a.to_string(), b.to_string(), c.to_string()],
        })
    }

    fn is_current(&self, ticket: &RunTicket) -> bool {
        ticket.epoch == self.epoch && self.state.is_generating
    }

    /// Apply a progress stage. Repeating the current stage is a no-op. Returns `Ok(false)` when
    /// the ticket belongs to a discarded run.
    pub fn advance(&mut self, ticket: &RunTicket, stage: Stage) -> Result<bool, ControllerError> {
        if !self.is_current(ticket) {
            return Ok(false);
        }
        let current = self.state.stage;
        if stage == current {
            return Ok(true);
        }
        if current.next_in_pipeline() != Some(stage) {
            return Err(ControllerError::InvalidTransition { from: current, to: stage });
        }
        self.state = GenerationState::in_flight(stage);
        Ok(true)
    }

    /// Settle the run: `complete` with data, or `error` with a user-facing message. Returns
    /// `Ok(false)` when the ticket belongs to a discarded run.
    pub fn finish(
        &mut self,
        ticket: &RunTicket,
        outcome: Result<BlogData, GenerationError>,
    ) -> Result<bool, ControllerError> {
        if !self.is_current(ticket) {
            return Ok(false);
        }
        self.state = match outcome {
            Ok(data) => {
                if self.state.stage != Stage::Translating {
                    let from = self.state.stage;
                    // The run is over either way; never leave it stuck in flight.
                    self.state = GenerationState::failed(
                        "Generation finished out of order. Please try again.",
                    );
                    return Err(ControllerError::InvalidTransition { from, to: Stage::Complete });
                }
                GenerationState::complete(data)
            }
            Err(e) => GenerationState::failed(e.user_message()),
        };
        Ok(true)
    }

    /// Back to `idle`. An in-flight run is not aborted; its outcome is discarded on arrival.
    pub fn reset(&mut self) {
        if self.state.is_generating {
            self.epoch += 1;
        }
        self.state = GenerationState::idle();
    }
}
