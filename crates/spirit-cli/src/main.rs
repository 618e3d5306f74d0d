//! Machine Spirit command-line front end.
//!
//! Bootstraps the data directory under the user's home, exposes the flat
//! configuration store to a human operator, and routes chat messages through
//! the orchestrator.  The self-model is loaded from and saved back to
//! `memory/self_model.json` around every `chat` call.
//!
//! # Usage
//!
//! ```text
//! machine-spirit [--home <DIR>] <COMMAND>
//!
//! Commands:
//!   init                 Create the data directories and config file
//!   paths [--json]       Print the root, config file and subdirectories
//!   get <KEY>            Print the value stored for KEY
//!   set <KEY> <VALUE>    Store VALUE under KEY and persist it
//!   list                 Print every entry as key=value
//!   chat [--session <ID>] [--user <ID>] [--mode <MODE>] <TEXT>...
//!                        Send a message and print the JSON response
//!   self [--full]        Print the self-model snapshot as JSON
//! ```
//!
//! `--home` (or `MACHINE_SPIRIT_HOME`) must not be empty.
//!
//! Logs go to stderr; the level is taken from `RUST_LOG` (default `warn`).

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use spirit_core::{home_dir, ConversationMode, Orchestrator, OrchestratorConfig, SpiritContext};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Machine Spirit data directory and configuration tool.
#[derive(Debug, Parser)]
#[command(name = "machine-spirit", version)]
struct Cli {
    /// Home directory to place `.machine_spirit/` in.
    ///
    /// Defaults to `$HOME` (`%USERPROFILE%` on Windows).
    #[arg(
        long,
        global = true,
        env = "MACHINE_SPIRIT_HOME",
        value_parser = NonEmptyStringValueParser::new().map(PathBuf::from)
    )]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the data directories and config file if missing.
    Init,
    /// Print the data layout.
    Paths {
        /// Emit a JSON object instead of plain lines.
        #[arg(long)]
        json: bool,
    },
    /// Print the value stored for KEY.
    Get { key: String },
    /// Store VALUE under KEY and persist it.
    Set { key: String, value: String },
    /// Print every entry as `key=value`.
    List,
    /// Send a message to Machine Spirit and print the JSON response.
    Chat {
        #[arg(long, default_value = "cli")]
        session: String,
        #[arg(long, default_value = "local")]
        user: String,
        /// default, DEV, OPS, STORY or ANALYST (case-insensitive).
        #[arg(long)]
        mode: Option<ConversationMode>,
        /// Message text; multiple words are joined with spaces.
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the persisted self-model.
    #[command(name = "self")]
    SelfState {
        /// Full snapshot including goals, voice and recent narrative.
        #[arg(long)]
        full: bool,
    },
}

/// JSON shape of `paths --json`.
#[derive(Debug, Serialize)]
struct PathsReport {
    root: PathBuf,
    config_file: PathBuf,
    subdirs: Vec<SubdirEntry>,
}

#[derive(Debug, Serialize)]
struct SubdirEntry {
    name: &'static str,
    path: PathBuf,
}

impl PathsReport {
    fn from_context(ctx: &SpiritContext) -> Self {
        let layout = ctx.layout();
        Self {
            root: layout.root().to_path_buf(),
            config_file: layout.config_file(),
            subdirs: layout
                .subdirs()
                .map(|(dir, path)| SubdirEntry {
                    name: dir.name(),
                    path,
                })
                .collect(),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    debug!("parsed arguments: {cli:?}");

    let home = match cli.home {
        Some(home) => home,
        None => home_dir().context("cannot locate the Machine Spirit data directory")?,
    };
    let mut ctx = SpiritContext::bootstrap_in(&home)
        .with_context(|| format!("failed to initialize data directory under {}", home.display()))?;

    run(cli.command, &mut ctx)
}

fn run(command: Command, ctx: &mut SpiritContext) -> anyhow::Result<()> {
    match command {
        Command::Init => {
            println!("{}", ctx.layout().root().display());
        }
        Command::Paths { json: true } => {
            let report = PathsReport::from_context(ctx);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Paths { json: false } => {
            let layout = ctx.layout();
            println!("root\t{}", layout.root().display());
            println!("config.ini\t{}", layout.config_file().display());
            for (dir, path) in layout.subdirs() {
                println!("{dir}\t{}", path.display());
            }
        }
        Command::Get { key } => match ctx.config().get(&key) {
            Some(value) => println!("{value}"),
            None => bail!("config key {key:?} is not set"),
        },
        Command::Set { key, value } => {
            ctx.config_mut()
                .set(key.as_str(), value)
                .with_context(|| format!("failed to store config key {key:?}"))?;
        }
        Command::List => {
            for (key, value) in ctx.config().entries() {
                println!("{key}={value}");
            }
        }
        Command::Chat {
            session,
            user,
            mode,
            text,
        } => {
            let store = ctx.self_state_store();
            let model = store.load().context("failed to load self-model")?;
            let mut orchestrator =
                Orchestrator::new(model, OrchestratorConfig::from_store(ctx.config()));
            let response =
                orchestrator.handle_message(&session, &user, &text.join(" "), mode, None);
            store
                .save(orchestrator.self_model())
                .context("failed to save self-model")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::SelfState { full } => {
            let model = ctx
                .self_state_store()
                .load()
                .context("failed to load self-model")?;
            let json = if full {
                serde_json::to_string_pretty(&model.snapshot())?
            } else {
                serde_json::to_string_pretty(&model.lightweight_snapshot())?
            };
            println!("{json}");
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
