use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

use taskloop::detection::promise_tag;
use taskloop::domain::LoopState;
use taskloop::hook::{self, Decision};
use taskloop::setup;
use taskloop::storage::{FsStateStore, StateStore};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("taskloop.log");

    // Setup env_logger with file output; stdout belongs to the hook protocol
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Store rooted at the invoking working directory; the state record's
/// location is what keys a loop to its project.
fn working_dir_store() -> FsStateStore {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    FsStateStore::new(cwd)
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        // Default: show the current loop, same as `taskloop status`
        None | Some(Commands::Status) => handle_status_command(),
        Some(Commands::Hook) => handle_hook_command(),
        Some(Commands::Start {
            prompt,
            max_iterations,
            promise,
        }) => handle_start_command(prompt, *max_iterations, promise.as_deref(), config),
        Some(Commands::Cancel) => handle_cancel_command(),
        Some(Commands::Setup {
            global,
            project,
            both,
            source,
        }) => handle_setup_command(*global, *project, *both, source.as_deref()),
    }
}

/// One stop-hook decision cycle: stdin envelope in, decision JSON out,
/// exit 0 no matter what. Every failure inside degrades to `allow` so a
/// broken hook can never trap the agent.
fn handle_hook_command() -> Result<()> {
    let mut raw = String::new();
    // Processing is gated on end-of-input, not on partial data
    let decision = match std::io::stdin().read_to_string(&mut raw) {
        Ok(_) => hook::run(&working_dir_store(), &raw),
        Err(e) => {
            Decision::allow_with_reason(format!("Task loop released: could not read input: {e}"))
        }
    };

    info!("Hook decision: {:?}", decision.decision);
    let payload = serde_json::to_string(&decision)
        .unwrap_or_else(|_| r#"{"decision":"allow"}"#.to_string());
    println!("{payload}");
    Ok(())
}

fn handle_start_command(
    prompt: &str,
    max_iterations: Option<u32>,
    promise: Option<&str>,
    config: &Config,
) -> Result<()> {
    let store = working_dir_store();
    if let Some(existing) = store.load() {
        if existing.active {
            bail!(
                "a task loop is already running (iteration {}/{}); run `taskloop cancel` first",
                existing.iteration(),
                existing.budget()
            );
        }
    }

    let budget = max_iterations.unwrap_or(config.loops.max_iterations);
    let marker = promise.unwrap_or(&config.loops.completion_promise);
    let state = LoopState::new(prompt, budget, marker);
    store.save(&state).context("Failed to write loop state")?;

    info!("Started task loop: budget={} promise={}", budget, marker);
    println!("{} {}", "Started task loop:".green(), prompt);
    println!("  Budget: {} iterations", budget);
    println!("  End with: {}", promise_tag(marker).as_str().cyan());
    Ok(())
}

fn handle_status_command() -> Result<()> {
    let store = working_dir_store();
    match store.load() {
        Some(state) if state.active => {
            println!("{}", "Task loop running".green());
            println!("  Iteration: {}/{}", state.iteration(), state.budget());
            println!("  Task: {}", state.prompt);
            println!("  End with: {}", promise_tag(state.promise()).as_str().cyan());
            if let Some(last) = state.history.last() {
                println!(
                    "  Last continuation: iteration {} at {}",
                    last.iteration,
                    last.timestamp.to_rfc3339()
                );
            }
        }
        _ => println!("{}", "No task loop is running".yellow()),
    }
    Ok(())
}

fn handle_cancel_command() -> Result<()> {
    let store = working_dir_store();
    match store.load() {
        Some(state) => {
            store.clear().context("Failed to remove loop state")?;
            info!("Canceled task loop at iteration {}", state.iteration());
            println!(
                "{} (was at iteration {}/{})",
                "Canceled task loop".red(),
                state.iteration(),
                state.budget()
            );
        }
        None => println!("{}", "No task loop is running".yellow()),
    }
    Ok(())
}

fn handle_setup_command(
    global: bool,
    project: bool,
    both: bool,
    source: Option<&std::path::Path>,
) -> Result<()> {
    if !global && !project && !both {
        bail!("pass --global, --project, or --both");
    }

    let source = match source {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    if global || both {
        let dir = setup::install_global(&source).context("Global setup failed")?;
        println!("{} {}", "Installed global configuration:".green(), dir.display());
    }

    if project || both {
        let project_root = std::env::current_dir().context("Failed to resolve current directory")?;
        let dir = setup::install_project(&source, &project_root).context("Project setup failed")?;
        println!("{} {}", "Installed project configuration:".green(), dir.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = setup_logging() {
        // Never let a logging problem take down the hook; stderr is outside
        // the protocol contract
        eprintln!("warning: logging disabled: {e}");
    }

    match &cli.command {
        // The hook answers from the persisted record alone and must always
        // exit 0 with a decision, so it skips configuration loading entirely
        Some(Commands::Hook) => handle_hook_command(),
        _ => {
            let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
            run_application(&cli, &config)
        }
    }
}
