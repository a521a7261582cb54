/// Terminal output for `cst`

use ctftoolkit_shared::tools::ToolResult;
use serde_json::Value;
use std::io::{self, Write};

const BANNER: &str = r#"
   ____ _____ _____   _____           _ _    _ _
  / ___|_   _|  ___| |_   _|__   ___ | | | _(_) |_
 | |     | | | |_      | |/ _ \ / _ \| | |/ / | __|
 | |___  | | |  _|     | | (_) | (_) | |   <| | |_
  \____| |_| |_|       |_|\___/ \___/|_|_|\_\_|\__|
"#;

/// Writes the banner with the version line
pub fn write_banner<W: Write>(out: &mut W, version: &str) -> io::Result<()> {
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "  CTF Starter Toolkit v{}", version)?;
    writeln!(out, "  crypto | stego | file | web | network | osint | misc")?;
    writeln!(out)
}

/// Banner plus build details, for `cst version`
pub fn write_version<W: Write>(out: &mut W, version: &str) -> io::Result<()> {
    write_banner(out, version)?;
    writeln!(out, "Build Info:")?;
    writeln!(out, "  Version: v{}", version)?;
    writeln!(out, "  Built with: Rust + Python tool scripts")?;
    writeln!(out, "  License: MIT")?;
    writeln!(out)
}

/// Prints a tool result under a `=== title ===` header
///
/// A result reporting `success: false` with an `error` string prints only
/// that error.
pub fn write_result<W: Write>(out: &mut W, title: &str, result: &ToolResult) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== {} ===", title)?;

    if let (Some(Value::Bool(false)), Some(Value::String(error))) =
        (result.get("success"), result.get("error"))
    {
        return writeln!(out, "Error: {}", error);
    }

    match serde_json::to_string_pretty(result) {
        Ok(pretty) => writeln!(out, "{}", pretty)?,
        Err(_) => writeln!(out, "Result: {:?}", result)?,
    }
    writeln!(out)
}
