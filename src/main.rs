// Ponder - inference-time compute strategies
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ponder::cli::{render_approaches, render_json, render_text, Cli, Commands, RunArgs};
use ponder::config::load_config;
use ponder::providers::create_service;
use ponder::strategies::run_approach;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs to stderr so stdout carries only results
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ponder=info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Approaches => {
            println!("{}", render_approaches(cli.json)?);
            Ok(())
        }
        Commands::Run(args) => run(&cli, args).await,
    }
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let query = args.read_query()?;
    let service = create_service(&config)?;

    let output = run_approach(
        args.approach,
        service,
        &config,
        args.system_prompt(&config),
        &query,
    )
    .await?;

    if cli.json {
        println!("{}", render_json(&output)?);
    } else {
        println!("{}", render_text(&output));
        eprintln!("{}", output.usage());
    }

    Ok(())
}
