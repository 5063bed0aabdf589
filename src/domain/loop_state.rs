//! Loop state record and related types
//!
//! A `LoopState` exists on disk if and only if a task loop is in progress in
//! that working directory. It is created by `taskloop start`, advanced by the
//! stop hook on every forced continuation, and deleted when the loop reaches
//! a terminal decision (completion promise detected or budget exhausted).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker the agent must emit inside `<promise>` tags when none is configured.
pub const DEFAULT_COMPLETION_PROMISE: &str = "TASK_COMPLETE";

/// Iteration budget applied when the record does not carry one.
pub const DEFAULT_MAX_ITERATIONS: u32 = 30;

/// The persisted state of a task loop.
///
/// Serialized as camelCase JSON; missing fields deserialize to their
/// defaults so a hand-edited or older record still resolves to a usable
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoopState {
    /// Whether a loop is currently running; false means pass-through
    pub active: bool,

    /// Literal marker the agent must emit to signal completion
    pub completion_promise: String,

    /// Hard cap on iterations, fixed at loop start
    pub max_iterations: u32,

    /// Number of the iteration about to execute (1-based)
    pub current_iteration: u32,

    /// Task description re-injected into the agent on each continuation
    pub prompt: String,

    /// Append-only audit trail of past iterations
    pub history: Vec<HistoryEntry>,
}

/// One completed iteration in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Iteration number that ran
    pub iteration: u32,

    /// When the continuation decision was made
    pub timestamp: DateTime<Utc>,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            active: false,
            completion_promise: DEFAULT_COMPLETION_PROMISE.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            current_iteration: 1,
            prompt: String::new(),
            history: Vec::new(),
        }
    }
}

impl LoopState {
    /// Create the record for a freshly started loop.
    pub fn new(prompt: &str, max_iterations: u32, completion_promise: &str) -> Self {
        Self {
            active: true,
            completion_promise: completion_promise.to_string(),
            max_iterations,
            prompt: prompt.to_string(),
            ..Self::default()
        }
    }

    /// Effective completion marker; an empty stored value falls back to the default.
    pub fn promise(&self) -> &str {
        if self.completion_promise.is_empty() {
            DEFAULT_COMPLETION_PROMISE
        } else {
            &self.completion_promise
        }
    }

    /// Effective iteration budget; a zero stored value falls back to the default.
    pub fn budget(&self) -> u32 {
        if self.max_iterations == 0 {
            DEFAULT_MAX_ITERATIONS
        } else {
            self.max_iterations
        }
    }

    /// Effective current iteration, never below 1.
    pub fn iteration(&self) -> u32 {
        self.current_iteration.max(1)
    }

    /// Returns true once the iteration about to run would exceed the budget.
    pub fn budget_exhausted(&self) -> bool {
        self.iteration() >= self.budget()
    }

    /// Close out the iteration that just ran: append it to the audit trail
    /// and advance the counter to the next iteration.
    pub fn record_iteration(&mut self, timestamp: DateTime<Utc>) {
        let finished = self.iteration();
        self.history.push(HistoryEntry {
            iteration: finished,
            timestamp,
        });
        self.current_iteration = finished + 1;
    }
}
