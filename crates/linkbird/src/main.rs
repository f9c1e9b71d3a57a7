//! The `linkbird` binary.
//!
//! ```bash
//! linkbird --config /etc/linkbird/linkbird.toml
//! LINKBIRD_PROFILE=production linkbird
//! linkbird --check-config
//! ```
//!
//! Exits non-zero when the event stream ends, so a supervisor can restart it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use linkbird::runtime::LinkbirdRuntime;

#[derive(Parser)]
#[command(name = "linkbird", version, about = "Answers chat URLs with titles and summaries")]
struct Cli {
    /// Configuration file; otherwise `linkbird.toml` is searched for.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long, value_name = "NAME")]
    profile: Option<String>,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = LinkbirdRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }

    if cli.check_config {
        let config = builder.load().context("configuration is invalid")?;
        println!(
            "Configuration OK: core {}, {} ignored backend(s)",
            config.core.url,
            config.filter.ignored_backends.len()
        );
        return Ok(());
    }

    let runtime = builder.build().context("failed to load configuration")?;
    runtime.run().await?;

    info!("linkbird stopped");
    Ok(())
}
