use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use symptom_dx::cli::{Cli, Commands};
use symptom_dx::commands::catalog::cmd_build_catalog;
use symptom_dx::commands::check::cmd_check;
use symptom_dx::commands::diagnose::cmd_diagnose;
use symptom_dx::commands::handle::cmd_handle;
use symptom_dx::commands::model::cmd_fetch_model;
use symptom_dx::config::Config;
use symptom_dx::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the reply
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    cli.apply_overrides(&mut config)?;

    match &cli.command {
        Commands::Diagnose { symptoms, explain } => {
            cmd_diagnose(&config, symptoms, *explain, cli.fetch)
        }
        Commands::Handle { file } => cmd_handle(&config, file.as_deref(), cli.fetch),
        Commands::Check => cmd_check(&config, cli.fetch),
        Commands::FetchModel { force } => cmd_fetch_model(&config, *force),
        Commands::BuildCatalog { names, out } => cmd_build_catalog(&config, names, out, cli.fetch),
    }
}
