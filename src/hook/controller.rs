//! Loop controller - one decision per hook invocation.
//!
//! Evaluation order is fixed: pass-through when no loop is active, then
//! completion promise, then iteration budget, and only then a forced
//! continuation. Terminal decisions delete the record; continuations
//! advance and persist it.

use chrono::Utc;

use super::{Decision, HookInput};
use crate::detection::{contains_promise, promise_tag};
use crate::domain::LoopState;
use crate::error::Result;
use crate::storage::StateStore;

/// Decides whether the agent may terminate or must run another iteration.
pub struct LoopController<'a> {
    store: &'a dyn StateStore,
}

impl<'a> LoopController<'a> {
    /// Create a controller over the given state store.
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    /// Run one decision cycle, folding any failure into the fail-open policy:
    /// an error while reading, deciding, or persisting releases the loop with
    /// an `allow` decision that carries the error description.
    pub fn decide(&self, input: &HookInput) -> Decision {
        match self.try_decide(input) {
            Ok(decision) => decision,
            Err(e) => {
                log::error!("Task loop decision failed, releasing the agent: {}", e);
                Decision::allow_with_reason(format!("Task loop released after an error: {e}"))
            }
        }
    }

    fn try_decide(&self, input: &HookInput) -> Result<Decision> {
        // No record, or an inactive one: no loop in progress, pass through
        // without touching anything.
        let Some(mut state) = self.store.load() else {
            return Ok(Decision::allow());
        };
        if !state.active {
            return Ok(Decision::allow());
        }

        if contains_promise(&input.transcript, state.promise()) {
            self.store.clear()?;
            return Ok(Decision::allow_with_reason(format!(
                "Detected {}; task complete after {} iteration(s).",
                promise_tag(state.promise()),
                state.iteration(),
            )));
        }

        if state.budget_exhausted() {
            self.store.clear()?;
            return Ok(Decision::allow_with_reason(format!(
                "Task loop stopped: reached the maximum of {} iterations without a completion promise.",
                state.budget(),
            )));
        }

        let finished = state.iteration();
        state.record_iteration(Utc::now());
        self.store.save(&state)?;

        Ok(Decision::block(continuation_message(finished, &state)))
    }
}

/// Message re-injected into the agent when a continuation is forced.
fn continuation_message(finished: u32, state: &LoopState) -> String {
    format!(
        "Iteration {finished}/{max} finished without a completion promise. The task loop continues.\n\n\
         Original task:\n{prompt}\n\n\
         Keep working on the task. This is iteration {next}/{max}. \
         When the task is genuinely complete, include {tag} in your reply to end the loop.",
        max = state.budget(),
        prompt = state.prompt,
        next = state.iteration(),
        tag = promise_tag(state.promise()),
    )
}
