mod app;

use anyhow::Result;
use clap::Parser;

use app::{Cli, build_sequence, client_config, submit};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = client_config(&cli)?;
    let sequence = build_sequence(&cli, &config)?;

    if cli.print_query {
        println!("{}", sequence);
        return Ok(());
    }

    submit(&sequence, &config, &cli.output)
}
