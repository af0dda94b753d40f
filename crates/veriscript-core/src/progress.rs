//! Progress stages and the observer the Generation Client reports through.
//!
//! The four in-flight stages are UI markers around a single external call; they carry no
//! timing guarantee, only ordering: `merging → fact-checking → writing → translating`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of one generation attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    Idle,
    Merging,
    FactChecking,
    Writing,
    Translating,
    Complete,
    Error,
}

impl Stage {
    /// Stages emitted through a [`ProgressSink`], in order.
    pub const PIPELINE: [Stage; 4] = [
        Stage::Merging,
        Stage::FactChecking,
        Stage::Writing,
        Stage::Translating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Merging => "merging",
            Stage::FactChecking => "fact-checking",
            Stage::Writing => "writing",
            Stage::Translating => "translating",
            Stage::Complete => "complete",
            Stage::Error => "error",
        }
    }

    /// True for the four stages a run passes through while the call is outstanding.
    pub fn is_in_flight(self) -> bool {
        Self::PIPELINE.contains(&self)
    }

    /// True for `complete` and `error`; both are left only by user action.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }

    /// Next in-flight stage, if any.
    pub fn next_in_pipeline(self) -> Option<Stage> {
        match self {
            Stage::Merging => Some(Stage::FactChecking),
            Stage::FactChecking => Some(Stage::Writing),
            Stage::Writing => Some(Stage::Translating),
            _ => None,
        }
    }

    /// Progress bar fill for the loading view.
    pub fn progress_percent(self) -> u8 {
        match self {
            Stage::Merging => 25,
            Stage::FactChecking => 50,
            Stage::Writing => 75,
            Stage::Translating => 90,
            Stage::Complete => 100,
            Stage::Idle | Stage::Error => 0,
        }
    }

    /// Loading-screen headline.
    pub fn headline(self) -> &'static str {
        match self {
            Stage::Merging => "Merging Scripts & Identifying Topics...",
            Stage::FactChecking => "Verifying Claims with Global Sources...",
            Stage::Writing => "Drafting Investigative Report...",
            Stage::Translating => "Generating Urdu Edition...",
            Stage::Complete => "Report Ready",
            Stage::Idle => "",
            Stage::Error => "Generation Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives stage transitions from the Generation Client. Called synchronously, in order.
///
/// Implemented for any `Fn(Stage) + Send + Sync` closure, so a channel sender can be adapted
/// with `move |stage| { let _ = tx.send(stage); }`.
pub trait ProgressSink: Send + Sync {
    fn on_stage(&self, stage: Stage);
}

impl<F> ProgressSink for F
where
    F: Fn(Stage) + Send + Sync,
{
    fn on_stage(&self, stage: Stage) {
        self(stage)
    }
}

/// Sink that drops every stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_stage(&self, _stage: Stage) {}
}
