//! In-memory state store for tests.

use std::sync::Mutex;

use super::traits::StateStore;
use crate::domain::LoopState;
use crate::error::{Result, TaskLoopError};

/// Holds the record in memory instead of on disk.
///
/// Lets tests drive full decision cycles without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    inner: Mutex<Option<LoopState>>,
}

impl MemoryStateStore {
    /// Create an empty store (no loop in progress).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a record.
    pub fn with_state(state: LoopState) -> Self {
        Self {
            inner: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Option<LoopState> {
        self.inner.lock().ok()?.clone()
    }

    fn save(&self, state: &LoopState) -> Result<()> {
        *self
            .inner
            .lock()
            .map_err(|e| TaskLoopError::Storage(e.to_string()))? = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .inner
            .lock()
            .map_err(|e| TaskLoopError::Storage(e.to_string()))? = None;
        Ok(())
    }
}
