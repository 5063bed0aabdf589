//! Stop-hook protocol types and entry point.
//!
//! The host agent runtime invokes the hook once per termination attempt,
//! piping a JSON envelope to stdin and reading a JSON decision from stdout.
//! Everything in between is one decision cycle of the loop controller.

mod controller;

pub use controller::LoopController;

use serde::{Deserialize, Serialize};

use crate::storage::StateStore;

/// Envelope the host runtime pipes to stdin. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    /// The agent's output for the iteration that just finished
    #[serde(default)]
    pub transcript: String,
}

impl HookInput {
    /// Build an envelope directly from transcript text.
    pub fn from_transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
        }
    }
}

/// Whether the agent may terminate or must continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Let the agent terminate
    Allow,
    /// Force another iteration
    Block,
}

/// The sole observable result of a hook invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Allow termination or block it
    pub decision: Verdict,

    /// Human-readable explanation; on block, the continuation message
    /// re-injected into the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Decision {
    /// Plain pass-through: let the agent terminate.
    pub fn allow() -> Self {
        Self {
            decision: Verdict::Allow,
            reason: None,
        }
    }

    /// Let the agent terminate, explaining why.
    pub fn allow_with_reason(reason: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Allow,
            reason: Some(reason.into()),
        }
    }

    /// Force another iteration with the given continuation message.
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Block,
            reason: Some(reason.into()),
        }
    }

    /// Returns true if the agent may terminate.
    pub fn is_allow(&self) -> bool {
        self.decision == Verdict::Allow
    }
}

/// Run one full decision cycle against the raw stdin payload.
///
/// Fail-open: a malformed envelope, like any other failure, degrades to an
/// `allow` decision carrying the error description. A broken hook must never
/// trap the agent in a forced loop.
pub fn run(store: &dyn StateStore, raw_input: &str) -> Decision {
    let input: HookInput = match serde_json::from_str(raw_input) {
        Ok(input) => input,
        Err(e) => {
            log::warn!("Malformed hook input envelope: {}", e);
            return Decision::allow_with_reason(format!(
                "Task loop released: malformed input envelope ({e})"
            ));
        }
    };

    LoopController::new(store).decide(&input)
}
