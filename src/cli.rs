use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed restaurant build-out tracker.
/// Tasks live in a JSON store (./buildout.json by default) merged with a
/// read-only markdown plan passed via --plan.
#[derive(Parser)]
#[command(name = "bo", version, about = "Restaurant build-out tracking CLI")]
pub struct Cli {
    /// Path to the JSON store file.
    #[arg(long, global = true, default_value = "buildout.json")]
    pub store: PathBuf,

    /// Path to the markdown build-out plan (optional seed data).
    #[arg(long, global = true)]
    pub plan: Option<PathBuf>,

    /// Path to the contacts JSON file.
    #[arg(long, global = true)]
    pub contacts: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
