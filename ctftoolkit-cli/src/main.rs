//! # cst
//!
//! Command-line front-end for the CTF Toolkit. Each subcommand runs one
//! external tool script and prints its JSON result.
//!
//! ## Usage
//!
//! ```bash
//! cst crypto caesar "Hello World" 3
//! cst network pcap capture.pcap --filter http
//! ```

use clap::Parser;
use ctftoolkit_cli::{
    cli::{Cli, Command},
    commands::execute,
    output::{write_banner, write_version},
};
use ctftoolkit_shared::tools::ScriptDispatcher;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing (stderr, quiet by default)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctftoolkit_cli=warn,ctftoolkit_shared=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    let command = match &cli.command {
        None => {
            write_banner(&mut stdout, VERSION)?;
            writeln!(stdout, "Quick start: cst --help\n")?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Command::Version) => {
            write_version(&mut stdout, VERSION)?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(command) => command,
    };

    let runner = ScriptDispatcher::new(&cli.python, &cli.scripts_dir).with_timeout(cli.timeout());

    match execute(command, &runner, &cli.upload_dir, &mut stdout).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            stdout.flush()?;
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
