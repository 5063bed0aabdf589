//! Filesystem-backed state store.

use std::fs;
use std::path::{Path, PathBuf};

use super::traits::StateStore;
use crate::domain::LoopState;
use crate::error::Result;

/// Subdirectory holding the tool's state, relative to the working directory.
pub const STATE_DIR: &str = ".taskloop";

/// Fixed file name of the loop-state record.
pub const STATE_FILE: &str = "state.json";

/// Stores the loop-state record at `<root>/.taskloop/state.json`.
pub struct FsStateStore {
    root: PathBuf,
}

impl FsStateStore {
    /// Create a store rooted at the given working directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Full path of the persisted record.
    pub fn path(&self) -> PathBuf {
        self.root.join(STATE_DIR).join(STATE_FILE)
    }
}

impl StateStore for FsStateStore {
    fn load(&self) -> Option<LoopState> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Unreadable loop state at {}: {}", path.display(), e);
                }
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Malformed loop state at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&self, state: &LoopState) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling temp file and rename so a failure mid-write
        // cannot leave a truncated record behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
