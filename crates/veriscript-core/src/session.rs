//! Shared handle around the state controller, for hosts that drive runs from many tasks.

use crate::controller::{ControllerError, GenerationState, RunTicket, ScriptInputs, ScriptSlot, StateController};
use crate::credential::Credential;
use crate::generation::GenerationClient;
use crate::progress::Stage;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Cloneable session: one controller, one published `GenerationState` stream.
#[derive(Clone)]
pub struct GenerationSession {
    controller: Arc<Mutex<StateController>>,
    state_tx: Arc<watch::Sender<GenerationState>>,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(GenerationState::idle());
        Self {
            controller: Arc::new(Mutex::new(StateController::new())),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Receiver that sees every replaced state (latest value wins).
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> GenerationState {
        self.apply(|c| c.state().clone())
    }

    pub fn inputs(&self) -> ScriptInputs {
        self.apply(|c| c.inputs().clone())
    }

    pub fn edit(&self, slot: ScriptSlot, text: impl Into<String>) -> Result<(), ControllerError> {
        self.apply(|c| c.edit(slot, text))
    }

    pub fn set_inputs(&self, inputs: ScriptInputs) -> Result<(), ControllerError> {
        self.apply(|c| c.set_inputs(inputs))
    }

    pub fn reset(&self) {
        let was_generating = self.apply(|c| {
            let busy = c.state().is_generating;
            c.reset();
            busy
        });
        if was_generating {
            tracing::info!(target: "veriscript::session", "Reset during generation; in-flight result will be discarded");
        } else {
            tracing::debug!(target: "veriscript::session", "Session reset to idle");
        }
    }

    /// Enter `merging` with the current inputs frozen into the returned ticket.
    pub fn start(&self, credential: Option<&Credential>) -> Result<RunTicket, ControllerError> {
        let result = self.apply(|c| c.begin(credential));
        if let Err(e) = &result {
            tracing::warn!(target: "veriscript::session", error = %e, "Generation request rejected");
        }
        result
    }

    /// Drive a started run to `complete` or `error` and return the resulting state.
    pub async fn run(&self, ticket: RunTicket, client: &GenerationClient, credential: &Credential) -> GenerationState {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            target: "veriscript::session",
            "generation_run",
            %run_id,
            epoch = ticket.epoch(),
            capability = client.capability_name()
        );

        async {
            let progress = |stage: Stage| {
                tracing::info!(target: "veriscript::session", stage = %stage, "{}", stage.headline());
                match self.apply(|c| c.advance(&ticket, stage)) {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!(target: "veriscript::session", stage = %stage, "Stage from discarded run ignored"),
                    Err(e) => tracing::warn!(target: "veriscript::session", error = %e, "Progress stage rejected"),
                }
            };

            let outcome = client.generate(ticket.scripts(), credential, &progress).await;
            if let Err(e) = &outcome {
                tracing::warn!(target: "veriscript::session", kind = e.kind(), error = %e, "Generation failed");
            }

            match self.apply(|c| c.finish(&ticket, outcome)) {
                Ok(true) => tracing::info!(target: "veriscript::session", stage = %self.state().stage, "Generation settled"),
                Ok(false) => tracing::info!(target: "veriscript::session", "Result of discarded run dropped"),
                Err(e) => tracing::error!(target: "veriscript::session", error = %e, "Could not settle generation"),
            }
            self.state()
        }
        .instrument(span)
        .await
    }

    /// Start and run to completion on the current task.
    pub async fn generate(
        &self,
        client: &GenerationClient,
        credential: Option<&Credential>,
    ) -> Result<GenerationState, ControllerError> {
        let ticket = self.start(credential)?;
        let credential = credential.ok_or(ControllerError::MissingCredential)?;
        Ok(self.run(ticket, client, credential).await)
    }

    /// Start a run and drive it on a background task. The state is already `merging` on return.
    pub fn spawn(
        &self,
        client: GenerationClient,
        credential: Option<Credential>,
    ) -> Result<JoinHandle<GenerationState>, ControllerError> {
        let ticket = self.start(credential.as_ref())?;
        let credential = credential.ok_or(ControllerError::MissingCredential)?;
        let session = self.clone();
        Ok(tokio::spawn(async move { session.run(ticket, &client, &credential).await }))
    }

    /// Lock the controller, apply `f`, and publish the state if it changed.
    fn apply<R>(&self, f: impl FnOnce(&mut StateController) -> R) -> R {
        let mut controller = self.controller.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = controller.state().clone();
        let out = f(&mut controller);
        if controller.state() != &before {
            self.state_tx.send_replace(controller.state().clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCapability, MockReply};
    use std::time::Duration;

    fn key() -> Credential {
        Credential::new("k").unwrap()
    }

    #[tokio::test]
    async fn subscribers_observe_the_final_state() {
        let session = GenerationSession::new();
        let mut rx = session.subscribe();
        let client = GenerationClient::new(Arc::new(MockCapability::default()));
        session.edit(ScriptSlot::First, "A").unwrap();

        let state = session.generate(&client, Some(&key())).await.unwrap();
        assert_eq!(state.stage, Stage::Complete);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().stage, Stage::Complete);
    }

    #[tokio::test]
    async fn missing_credential_publishes_nothing() {
        let session = GenerationSession::new();
        let rx = session.subscribe();
        let client = GenerationClient::new(Arc::new(MockCapability::default()));
        assert_eq!(
            session.generate(&client, None).await.unwrap_err(),
            ControllerError::MissingCredential
        );
        assert!(!rx.has_changed().unwrap());
        assert_eq!(session.state(), GenerationState::idle());
    }

    #[tokio::test]
    async fn reset_during_spawned_run_keeps_idle() {
        let session = GenerationSession::new();
        let mock = MockCapability::new(MockReply::Sample).with_latency(Duration::from_millis(50));
        let client = GenerationClient::new(Arc::new(mock));

        let handle = session.spawn(client, Some(key())).unwrap();
        assert!(session.state().is_generating);
        assert_eq!(session.edit(ScriptSlot::First, "x"), Err(ControllerError::InputsFrozen));
        session.reset();

        let settled = handle.await.unwrap();
        assert_eq!(settled, GenerationState::idle());
        assert!(session.state().data.is_none());
    }

    #[tokio::test]
    async fn second_spawn_while_busy_is_rejected() {
        let session = GenerationSession::new();
        let slow = MockCapability::default().with_latency(Duration::from_millis(50));
        let client = GenerationClient::new(Arc::new(slow));

        let handle = session.spawn(client.clone(), Some(key())).unwrap();
        assert!(matches!(
            session.spawn(client, Some(key())),
            Err(ControllerError::AlreadyGenerating)
        ));
        assert_eq!(handle.await.unwrap().stage, Stage::Complete);
    }
}
