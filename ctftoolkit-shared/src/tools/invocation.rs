/// External tool catalogue and argument contract
///
/// Each tool is a standalone script under the scripts directory. The
/// positional argument order and the optional flags forwarded to each
/// script are fixed here so the HTTP handlers and the CLI build identical
/// command lines.
///
/// | Tool | Script | Arguments |
/// |---|---|---|
/// | Caesar | `crypto/caesar.py` | `<text> <key> <encrypt\|decrypt>` |
/// | QR code | `misc/qr_generator.py` | `<text> <output-path>` |
/// | Strings | `binary/strings_extractor.py` | `<file> [--min-length N]` |
/// | EXIF | `stego/exif_extractor.py` | `<image>` |
/// | HTTP simulator | `web/http_simulator.py` | `<url> <method> [data]` |
/// | PCAP | `network/pcap_analyzer.py` | `<file> [--filter F]` |
/// | Sherlock | `osint/sherlock_search.py` | `<username> [--timeout N]` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Timeout (seconds) the username search script assumes when none is passed
pub const DEFAULT_SHERLOCK_TIMEOUT: u32 = 5;

/// Method used by the HTTP simulator when none is given
pub const DEFAULT_HTTP_METHOD: &str = "GET";

/// External tools the toolkit can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Caesar,
    QrCode,
    Strings,
    Exif,
    HttpSimulator,
    Pcap,
    Sherlock,
}

impl Tool {
    /// Script path relative to the scripts directory
    pub fn script(&self) -> &'static str {
        match self {
            Tool::Caesar => "crypto/caesar.py",
            Tool::QrCode => "misc/qr_generator.py",
            Tool::Strings => "binary/strings_extractor.py",
            Tool::Exif => "stego/exif_extractor.py",
            Tool::HttpSimulator => "web/http_simulator.py",
            Tool::Pcap => "network/pcap_analyzer.py",
            Tool::Sherlock => "osint/sherlock_search.py",
        }
    }

    /// Stable identifier, used in logs and stored tool log records
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Caesar => "caesar",
            Tool::QrCode => "qr_code",
            Tool::Strings => "strings",
            Tool::Exif => "exif",
            Tool::HttpSimulator => "http_simulator",
            Tool::Pcap => "pcap",
            Tool::Sherlock => "sherlock",
        }
    }

    /// Human-readable title for CLI output
    pub fn title(&self) -> &'static str {
        match self {
            Tool::Caesar => "Caesar Cipher",
            Tool::QrCode => "QR Code Generator",
            Tool::Strings => "Strings Extraction",
            Tool::Exif => "EXIF Data Extraction",
            Tool::HttpSimulator => "HTTP Request",
            Tool::Pcap => "PCAP Analysis",
            Tool::Sherlock => "Sherlock Search",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caesar cipher direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    #[default]
    Encrypt,
    Decrypt,
}

impl CipherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMode::Encrypt => "encrypt",
            CipherMode::Decrypt => "decrypt",
        }
    }
}

impl FromStr for CipherMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encrypt" => Ok(CipherMode::Encrypt),
            "decrypt" => Ok(CipherMode::Decrypt),
            other => Err(format!("Unknown cipher mode '{}', expected encrypt or decrypt", other)),
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built command line for one external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    tool: Tool,
    args: Vec<String>,
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl ToolInvocation {
    /// `<text> <key> <mode>`
    pub fn caesar(text: &str, key: i64, mode: CipherMode) -> Self {
        Self {
            tool: Tool::Caesar,
            args: vec![text.to_string(), key.to_string(), mode.as_str().to_string()],
        }
    }

    /// `<text> <output-path>`
    pub fn qr_code(text: &str, output: &Path) -> Self {
        Self {
            tool: Tool::QrCode,
            args: vec![text.to_string(), path_arg(output)],
        }
    }

    /// `<file> [--min-length N]`, the flag only when N > 0
    pub fn strings(file: &Path, min_length: Option<u32>) -> Self {
        let mut args = vec![path_arg(file)];
        if let Some(min_length) = min_length.filter(|n| *n > 0) {
            args.push("--min-length".to_string());
            args.push(min_length.to_string());
        }

        Self {
            tool: Tool::Strings,
            args,
        }
    }

    /// `<image>`
    pub fn exif(image: &Path) -> Self {
        Self {
            tool: Tool::Exif,
            args: vec![path_arg(image)],
        }
    }

    /// `<url> <method> [data]`
    ///
    /// An empty method becomes `GET`; data is appended only when non-empty.
    pub fn http_simulator(url: &str, method: &str, data: Option<&str>) -> Self {
        let method = if method.trim().is_empty() {
            DEFAULT_HTTP_METHOD
        } else {
            method
        };

        let mut args = vec![url.to_string(), method.to_string()];
        if let Some(data) = data.filter(|d| !d.is_empty()) {
            args.push(data.to_string());
        }

        Self {
            tool: Tool::HttpSimulator,
            args,
        }
    }

    /// `<file> [--filter F]`, the flag only when F is non-empty
    pub fn pcap(file: &Path, filter: Option<&str>) -> Self {
        let mut args = vec![path_arg(file)];
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            args.push("--filter".to_string());
            args.push(filter.to_string());
        }

        Self {
            tool: Tool::Pcap,
            args,
        }
    }

    /// `<username> [--timeout N]`, the flag only when N differs from the default
    pub fn sherlock(username: &str, timeout_secs: u32) -> Self {
        let mut args = vec![username.to_string()];
        if timeout_secs != DEFAULT_SHERLOCK_TIMEOUT {
            args.push("--timeout".to_string());
            args.push(timeout_secs.to_string());
        }

        Self {
            tool: Tool::Sherlock,
            args,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Positional arguments passed after the script path
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Arguments joined with spaces, for logging
    pub fn summary(&self) -> String {
        self.args.join(" ")
    }
}
