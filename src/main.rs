//! # bo - Restaurant Build-Out Tracker
//!
//! A file-backed command-line tracker for a restaurant construction project:
//! tasks, pending decisions, contractor contacts and a progress summary.
//!
//! ## Key Features
//!
//! - **Markdown plan import**: the build-out plan's pipe-delimited action-item
//!   table is parsed into normalized tasks on every read (read-only seed data)
//! - **Flat-file store**: user-added tasks and decisions persist in one
//!   pretty-printed JSON document
//! - **Project summary**: status counts, completion percentage and an
//!   urgent-task slice with a configurable due-date window
//! - **Contact directory**: one injected name-to-phone mapping instead of
//!   per-module literals
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task
//! bo add "Install sink" --owner Vishal --due 2025-10-30 --priority high
//!
//! # Merge plan and store into one listing
//! bo --plan plan.md list
//!
//! # Dashboard-style summary
//! bo --plan plan.md summary --window 7
//!
//! # Record a pending decision
//! bo decision add "Pick bar counter stone" --assigned-to Ayesha --due "in 5d"
//! ```
//!
//! Data lives in `./buildout.json` by default; pass `--store` to point
//! elsewhere. Concurrent invocations race on the store file (last writer
//! wins), which is acceptable for a single-user tracker.

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod fields;
pub mod parser;
pub mod store;
pub mod summary;
pub mod task;

use cli::Cli;
use cmd::*;
use config::ContactDirectory;
use store::Store;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that never touch the store run first so they don't create
    // an empty store file as a side effect.
    match &cli.command {
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            return;
        }
        Commands::Plan => {
            cmd_plan(cli.plan.as_deref());
            return;
        }
        Commands::Contacts => {
            let contacts = match cli.contacts.as_deref() {
                Some(path) => ContactDirectory::load(path, true),
                None => ContactDirectory::default(),
            };
            cmd_contacts(&contacts);
            return;
        }
        _ => {}
    }

    let store = Store::new(&cli.store);
    if let Err(e) = store.initialize() {
        eprintln!("Failed to initialize store {}: {e}", cli.store.display());
        std::process::exit(1);
    }
    let plan = cli.plan.as_deref();
    let contacts = match cli.contacts.as_deref() {
        Some(path) => ContactDirectory::load(path, true),
        None => ContactDirectory::default(),
    };

    match cli.command {
        Commands::Add {
            title,
            owner,
            due,
            priority,
            status,
            category,
            notes,
        } => cmd_add(&store, title, owner, due, priority, status, category, notes),

        Commands::List {
            status,
            priority,
            category,
            urgent,
            window,
            source,
            sort,
            limit,
        } => cmd_list(
            &store, plan, status, priority, category, urgent, window, source, sort, limit,
        ),

        Commands::View { id } => cmd_view(&store, plan, &contacts, id),

        Commands::Update {
            id,
            title,
            owner,
            due,
            priority,
            status,
            category,
            progress,
            notes,
        } => cmd_update(
            &store, id, title, owner, due, priority, status, category, progress, notes,
        ),

        Commands::Complete { id } => cmd_complete(&store, id),

        Commands::Delete { id } => cmd_delete(&store, id),

        Commands::Decision { action } => cmd_decision(&store, action),

        Commands::Summary {
            window,
            cap,
            target_opening,
        } => cmd_summary(&store, plan, window, cap, target_opening),

        Commands::Plan | Commands::Contacts | Commands::Completions { .. } => {
            unreachable!("handled above")
        }
    }
}
