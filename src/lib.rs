//! Taskloop - an external control loop for autonomous coding agents
//!
//! Taskloop intercepts an agent's attempt to stop, checks its output for a
//! completion promise, and either lets it terminate or forces another
//! iteration with the original task prompt re-injected.

pub mod detection;
pub mod domain;
pub mod error;
pub mod hook;
pub mod setup;
pub mod storage;

pub use error::{Result, TaskLoopError};
