//! # CTF Toolkit CLI Library
//!
//! Command tree and execution for `cst`, the command-line front-end to the
//! CTF tool scripts. It runs the same invocations as the HTTP API through
//! the shared dispatcher and prints results as text.
//!
//! ## Modules
//!
//! - `cli`: clap command definitions
//! - `commands`: command execution against a tool runner
//! - `output`: banner and result printing
//!
//! ## Example
//!
//! ```no_run
//! use ctftoolkit_cli::{cli::{Command, CryptoCommand}, commands::execute};
//! use ctftoolkit_shared::tools::ScriptDispatcher;
//!
//! # async fn example() -> Result<(), ctftoolkit_cli::commands::CliError> {
//! let runner = ScriptDispatcher::new("python3", "scripts");
//! let command = Command::Crypto(CryptoCommand::Caesar {
//!     text: "Hello".to_string(),
//!     key: 3,
//!     decrypt: false,
//! });
//! execute(&command, &runner, "uploads".as_ref(), &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod output;
