//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mediaudit CLI - AI-assisted auditing of digital media campaigns.
#[derive(Debug, Parser)]
#[command(name = "mediaudit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.mediaudit/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// State file path (default: ~/.mediaudit/state.json)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a full campaign record from the uploaded documents
    Extract(ExtractArgs),

    /// Extract an email thread update and append it to the record
    Emails(EmailsArgs),

    /// Extract a performance report against the campaign briefing
    Report(ReportArgs),

    /// Refine free text into audit register
    Refine(RefineArgs),

    /// Print the current campaign record
    Show,

    /// Discard the current campaign record
    Reset,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Insertion order (PI) document
    #[arg(long)]
    pub pi: Option<PathBuf>,

    /// Commercial proposal document
    #[arg(long)]
    pub proposal: Option<PathBuf>,

    /// Email thread export
    #[arg(long)]
    pub emails: Option<PathBuf>,

    /// Technical plan (OPEC) document
    #[arg(long)]
    pub opec: Option<PathBuf>,

    /// Proposal identifier to keep on the record
    #[arg(long)]
    pub proposal_name: Option<String>,
}

/// Arguments for the emails command.
#[derive(Debug, Parser)]
pub struct EmailsArgs {
    /// Email thread export to append
    pub file: PathBuf,
}

/// Arguments for the report command.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Delivery report (PDF or XLSX)
    pub file: PathBuf,
}

/// Arguments for the refine command.
#[derive(Debug, Parser)]
pub struct RefineArgs {
    /// Text to refine
    pub text: String,

    /// Field the text belongs to (shown to the model as context)
    #[arg(long, default_value = "observations")]
    pub context: String,
}
