//! State store trait definition.

use crate::domain::LoopState;
use crate::error::Result;

/// Persistence seam for the loop-state record.
///
/// `load` is fail-soft by contract: a missing, unreadable, or malformed
/// record reads as `None` (no loop in progress), never as an error. `save`
/// and `clear` report real failures so callers can fold them into the
/// fail-open decision policy.
pub trait StateStore {
    /// Read the persisted record, if a valid one exists.
    fn load(&self) -> Option<LoopState>;

    /// Write the record, creating any missing parent directory.
    fn save(&self, state: &LoopState) -> Result<()>;

    /// Remove the persisted record; no-op when absent.
    fn clear(&self) -> Result<()>;
}
