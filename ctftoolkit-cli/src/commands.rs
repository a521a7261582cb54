/// Execution of `cst` tool commands
///
/// Each command is turned into a [`ToolInvocation`], run through a
/// [`ToolRunner`], and its JSON result printed. Local checks (input files
/// must exist) happen before anything is spawned.

use chrono::Local;
use ctftoolkit_shared::{
    tools::{CipherMode, DispatchError, Tool, ToolInvocation, ToolRunner},
    uploads,
};
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli::{
    Command, CryptoCommand, FileCommand, MiscCommand, NetworkCommand, OsintCommand, StegoCommand,
    WebCommand,
};
use crate::output::write_result;

/// Error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Input file missing
    #[error("File '{}' does not exist", .0.display())]
    MissingFile(PathBuf),

    /// Tool could not be run or produced unusable output
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Writing output or preparing directories failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A command ready to run
#[derive(Debug)]
struct Prepared {
    invocation: ToolInvocation,
    /// Line printed before the tool runs
    preamble: Option<String>,
    /// Generated file to report alongside the result
    output_file: Option<PathBuf>,
    /// Print raw stdout when it is not JSON
    raw_fallback: bool,
}

impl Prepared {
    fn new(invocation: ToolInvocation) -> Self {
        Self {
            invocation,
            preamble: None,
            output_file: None,
            raw_fallback: false,
        }
    }
}

fn require_file(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::MissingFile(path.to_path_buf()))
    }
}

fn prepare(command: &Command, upload_dir: &Path) -> Result<Option<Prepared>, CliError> {
    let prepared = match command {
        Command::Version => return Ok(None),

        Command::Crypto(CryptoCommand::Caesar { text, key, decrypt }) => {
            let mode = if *decrypt {
                CipherMode::Decrypt
            } else {
                CipherMode::Encrypt
            };
            Prepared::new(ToolInvocation::caesar(text, *key, mode))
        }

        Command::Misc(MiscCommand::Qr { text, output }) => {
            std::fs::create_dir_all(upload_dir)?;

            let file_name = output
                .clone()
                .unwrap_or_else(|| format!("qr_{}.png", uploads::timestamp(Local::now())));
            let path = upload_dir.join(file_name);

            Prepared {
                output_file: Some(path.clone()),
                ..Prepared::new(ToolInvocation::qr_code(text, &path))
            }
        }

        Command::File(FileCommand::Strings { file, min_length }) => {
            require_file(file)?;
            Prepared::new(ToolInvocation::strings(file, Some(*min_length)))
        }

        Command::Stego(StegoCommand::Exif { image, verbose }) => {
            require_file(image)?;
            let invocation = ToolInvocation::exif(image);
            let preamble = verbose.then(|| {
                format!("Running {} {}", invocation.tool().script(), invocation.summary())
            });
            Prepared {
                preamble,
                ..Prepared::new(invocation)
            }
        }

        Command::Web(WebCommand::Http { url, method, data }) => Prepared::new(
            ToolInvocation::http_simulator(url, method, data.as_deref()),
        ),

        Command::Network(NetworkCommand::Pcap { file, filter }) => {
            require_file(file)?;
            Prepared::new(ToolInvocation::pcap(file, filter.as_deref()))
        }

        Command::Osint(OsintCommand::Sherlock { username, timeout }) => Prepared {
            preamble: Some(format!(
                "Searching for username '{}' across social media platforms...",
                username
            )),
            raw_fallback: true,
            ..Prepared::new(ToolInvocation::sherlock(username, *timeout))
        },
    };

    Ok(Some(prepared))
}

/// Runs a tool command and prints its result to `out`
///
/// `Command::Version` is not a tool command and prints nothing here.
pub async fn execute<W: Write>(
    command: &Command,
    runner: &dyn ToolRunner,
    upload_dir: &Path,
    out: &mut W,
) -> Result<(), CliError> {
    let Some(prepared) = prepare(command, upload_dir)? else {
        return Ok(());
    };

    if let Some(preamble) = &prepared.preamble {
        writeln!(out, "{}", preamble)?;
    }

    let tool: Tool = prepared.invocation.tool();
    let output = runner.run(&prepared.invocation).await?;

    let mut result = match output.json() {
        Ok(result) => result,
        Err(_) if prepared.raw_fallback => {
            writeln!(out, "{}", output.stdout_lossy())?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = &prepared.output_file {
        result.insert(
            "file_path".to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
    }

    write_result(out, tool.title(), &result)?;
    Ok(())
}
