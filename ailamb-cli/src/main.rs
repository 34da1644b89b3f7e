use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ailamb_core::config::ReportConfig;
use ailamb_core::providers::OpenAiClient;
use ailamb_core::report;

mod args;

use args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&args)?;

    let api_key = config
        .resolve_api_key()
        .context("API key is required: pass --api-key or set OPENAI_API_KEY")?;

    let document = std::fs::read_to_string(&config.input.findings_path).with_context(|| {
        format!(
            "Failed to read findings document {}",
            config.input.findings_path.display()
        )
    })?;

    let client = OpenAiClient::from_config(&config.provider, api_key)?;

    tracing::info!(
        input = %config.input.findings_path.display(),
        model = %config.provider.model,
        "generating report"
    );
    let generated = report::generate(&document, &client, config.provider.max_tokens).await?;

    // A run where every narrative section fell back is still a success;
    // resilience to completion-service outages is the point.
    let html = report::to_html(&generated);
    report::write_html(&html, &config.output.report_path)?;

    println!("Report written to {}", config.output.report_path.display());
    Ok(())
}

/// Merge CLI flags over the config file cascade. Flags win; explicit
/// `--api-key` beats both the config file and the environment.
fn load_config(args: &Args) -> Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::load_default(),
    };
    config.expand_env_vars();

    if let Some(ref input) = args.input {
        config.input.findings_path = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output.report_path = output.clone();
    }
    if let Some(ref api_key) = args.api_key {
        config.provider.api_key = Some(api_key.clone());
    }
    if let Some(ref model) = args.model {
        config.provider.model = model.clone();
    }
    if let Some(ref base_url) = args.base_url {
        config.provider.base_url = Some(base_url.clone());
    }
    if let Some(timeout) = args.timeout {
        config.provider.timeout_secs = timeout;
    }

    Ok(config)
}
