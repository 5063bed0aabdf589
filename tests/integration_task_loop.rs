//! Task loop integration tests
//!
//! Drives full hook decision cycles against a filesystem-backed state store,
//! the way the host runtime would invoke the tool between iterations.

use taskloop::domain::LoopState;
use taskloop::error::Result;
use taskloop::hook::{self, Decision};
use taskloop::storage::{FsStateStore, STATE_DIR, StateStore};
use tempfile::TempDir;

fn envelope(transcript: &str) -> String {
    serde_json::json!({ "transcript": transcript }).to_string()
}

/// Integration test: a fresh loop is forced through every iteration until
/// the budget runs out, then released.
#[test]
fn test_loop_runs_to_exhaustion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsStateStore::new(temp_dir.path());
    store.save(&LoopState::new("Polish the error messages", 3, "TASK_COMPLETE"))?;

    // Iterations 1 and 2 block and re-inject the prompt
    for iteration in 1..=2u32 {
        let decision = hook::run(&store, &envelope("still going"));
        assert!(!decision.is_allow());
        let reason = decision.reason.expect("block carries a reason");
        assert!(reason.contains(&format!("{iteration}/3")));
        assert!(reason.contains("Polish the error messages"));
    }

    // Iteration 3 hits the budget: released, record gone
    let decision = hook::run(&store, &envelope("still going"));
    assert!(decision.is_allow());
    assert!(decision.reason.expect("exhaustion carries a reason").contains("3 iterations"));
    assert!(store.load().is_none());
    assert!(!store.path().exists());

    Ok(())
}

/// Integration test: the completion promise ends the loop at any iteration
/// and removes the record.
#[test]
fn test_completion_promise_ends_loop() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsStateStore::new(temp_dir.path());
    store.save(&LoopState::new("Ship it", 30, "TASK_COMPLETE"))?;

    let blocked = hook::run(&store, &envelope(""));
    assert!(!blocked.is_allow());

    let decision = hook::run(
        &store,
        &envelope("all done here <promise>task_complete</promise>"),
    );
    assert!(decision.is_allow());
    assert!(!store.path().exists());

    Ok(())
}

/// Integration test: with no record present the hook passes through and
/// leaves the filesystem untouched.
#[test]
fn test_no_loop_passes_through() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsStateStore::new(temp_dir.path());

    let decision = hook::run(&store, &envelope("any output at all"));

    assert_eq!(decision, Decision::allow());
    assert!(!temp_dir.path().join(STATE_DIR).exists());

    Ok(())
}

/// Integration test: a corrupt record reads as "no loop" and the hook
/// passes through instead of failing.
#[test]
fn test_corrupt_record_passes_through() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsStateStore::new(temp_dir.path());
    std::fs::create_dir_all(temp_dir.path().join(STATE_DIR))?;
    std::fs::write(store.path(), "not a json record")?;

    let decision = hook::run(&store, &envelope("output"));
    assert!(decision.is_allow());

    Ok(())
}

/// Integration test: a malformed envelope releases the agent but leaves the
/// record alone.
#[test]
fn test_malformed_envelope_releases_without_touching_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsStateStore::new(temp_dir.path());
    let state = LoopState::new("Task", 10, "TASK_COMPLETE");
    store.save(&state)?;

    let decision = hook::run(&store, "transcript: definitely-not-json");

    assert!(decision.is_allow());
    assert!(decision.reason.expect("reason explains the release").contains("malformed"));
    assert_eq!(store.load(), Some(state));

    Ok(())
}

/// Integration test: the persisted record accumulates one history entry per
/// forced continuation and survives process boundaries.
#[test]
fn test_history_accumulates_across_invocations() -> Result<()> {
    let temp_dir = TempDir::new()?;

    {
        let store = FsStateStore::new(temp_dir.path());
        store.save(&LoopState::new("Task", 10, "TASK_COMPLETE"))?;
        hook::run(&store, &envelope(""));
        hook::run(&store, &envelope(""));
    }

    // A fresh store instance sees the same record, like a new process would
    let store = FsStateStore::new(temp_dir.path());
    let state = store.load().expect("record persists");
    assert_eq!(state.current_iteration, 3);
    assert_eq!(state.history.len(), 2);
    assert_eq!(state.history[0].iteration, 1);
    assert_eq!(state.history[1].iteration, 2);
    assert!(state.history[0].timestamp <= state.history[1].timestamp);

    Ok(())
}

/// Integration test: an inactive record is left exactly as found.
#[test]
fn test_inactive_record_left_unmodified() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsStateStore::new(temp_dir.path());
    let mut state = LoopState::new("Task", 10, "TASK_COMPLETE");
    state.active = false;
    store.save(&state)?;
    let raw_before = std::fs::read_to_string(store.path())?;

    let decision = hook::run(&store, &envelope("<promise>TASK_COMPLETE</promise>"));

    assert_eq!(decision, Decision::allow());
    assert_eq!(std::fs::read_to_string(store.path())?, raw_before);

    Ok(())
}

/// Integration test: decisions serialize to the exact wire shape the host
/// runtime consumes.
#[test]
fn test_decision_wire_format() {
    let allow = serde_json::to_value(Decision::allow()).unwrap();
    assert_eq!(allow, serde_json::json!({"decision": "allow"}));

    let block = serde_json::to_value(Decision::block("continue")).unwrap();
    assert_eq!(
        block,
        serde_json::json!({"decision": "block", "reason": "continue"})
    );
}
