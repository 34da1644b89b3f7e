//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ailamb")]
#[command(author, version, about = "AI-assisted SAST report generator")]
pub struct Args {
    /// Input SAST findings file (default: data/sast.md)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output HTML report file (default: ai-lamb-report.html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// API key for the completion service (or set OPENAI_API_KEY)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model to use for narrative generation
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL for OpenAI-compatible gateways
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
