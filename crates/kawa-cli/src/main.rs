//! Kawa CLI - build, serve and install modules.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Build(args) => commands::build::execute(args, &*formatter),
        cli::Commands::Serve(args) => commands::serve::execute(args, &*formatter),
        cli::Commands::List => commands::list::execute(&cli, &*formatter),
        cli::Commands::Info(args) => commands::info::execute(&cli, args, &*formatter),
        cli::Commands::Install(args) => commands::install::execute(&cli, args, &*formatter),
        cli::Commands::Remove(args) => commands::remove::execute(&cli, args, &*formatter),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error::diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the flag-derived level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
