/// Command-line definition for `cst`
///
/// Global options select where the tool scripts live and how they are run;
/// each leaf command maps to one tool script.

use clap::{Parser, Subcommand};
use ctftoolkit_shared::tools::{DEFAULT_SHERLOCK_TIMEOUT, DEFAULT_TOOL_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "cst",
    version,
    about = "CTF Starter Toolkit - complete CTF toolkit in the terminal",
    after_help = "Examples:\n  cst crypto caesar \"Hello World\" 3\n  cst misc qr \"Hello World\"\n  cst file strings binary.exe\n  cst stego exif image.jpg"
)]
pub struct Cli {
    /// Directory holding the tool scripts
    #[arg(long, env = "SCRIPTS_DIR", default_value = "scripts", global = true)]
    pub scripts_dir: PathBuf,

    /// Interpreter used to run the scripts
    #[arg(long, env = "PYTHON_BIN", default_value = "python3", global = true)]
    pub python: String,

    /// Directory for generated files
    #[arg(long, env = "UPLOAD_PATH", default_value = "uploads", global = true)]
    pub upload_dir: PathBuf,

    /// Seconds before a tool is killed (0 disables the limit)
    #[arg(long, env = "TOOL_TIMEOUT_SECS", default_value_t = DEFAULT_TOOL_TIMEOUT.as_secs(), global = true)]
    pub tool_timeout: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn timeout(&self) -> Option<Duration> {
        (self.tool_timeout > 0).then(|| Duration::from_secs(self.tool_timeout))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show version and banner
    Version,

    /// Cryptography tools
    #[command(subcommand)]
    Crypto(CryptoCommand),

    /// Miscellaneous tools
    #[command(subcommand)]
    Misc(MiscCommand),

    /// File analysis tools
    #[command(subcommand)]
    File(FileCommand),

    /// Steganography and metadata tools
    #[command(subcommand)]
    Stego(StegoCommand),

    /// Web exploitation tools
    #[command(subcommand)]
    Web(WebCommand),

    /// Network forensics tools
    #[command(subcommand)]
    Network(NetworkCommand),

    /// Open source intelligence tools
    #[command(subcommand)]
    Osint(OsintCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CryptoCommand {
    /// Caesar cipher encryption/decryption
    Caesar {
        text: String,

        /// Shift key
        #[arg(allow_negative_numbers = true)]
        key: i64,

        /// Decrypt instead of encrypt
        #[arg(long)]
        decrypt: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MiscCommand {
    /// Generate a QR code PNG
    Qr {
        text: String,

        /// Output file name inside the upload directory (default: qr_<timestamp>.png)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FileCommand {
    /// Extract printable strings from a binary
    Strings {
        file: PathBuf,

        /// Minimum string length to extract
        #[arg(long, default_value_t = 4)]
        min_length: u32,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StegoCommand {
    /// Extract EXIF metadata from an image
    Exif {
        image: PathBuf,

        /// Print the tool command line before running it
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WebCommand {
    /// Send an HTTP request and summarize the response
    Http {
        url: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum NetworkCommand {
    /// Analyze a packet capture
    Pcap {
        file: PathBuf,

        /// Packet filter, e.g. 'http' or 'tcp'
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum OsintCommand {
    /// Search a username across social media
    Sherlock {
        username: String,

        /// Per-site request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_SHERLOCK_TIMEOUT)]
        timeout: u32,
    },
}
