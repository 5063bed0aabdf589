//! CLI module for taskloop - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for the stop hook and
//! loop lifecycle management.

pub mod commands;

pub use commands::Cli;
