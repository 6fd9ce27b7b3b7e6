use clap::Parser;
use deskclean::cli::{Cli, run_cli};
use deskclean::output::OutputFormatter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("deskclean={level}"))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
