/// Subprocess dispatcher
///
/// Spawns `<interpreter> <scripts_dir>/<script> <args...>`, waits for it to
/// exit and hands back the captured output. Tool scripts print a single JSON
/// object on stdout; [`ToolOutput::json`] decodes it without imposing a
/// schema.
///
/// # Failure Modes
///
/// - **Spawn**: interpreter missing or not executable
/// - **Non-zero exit**: stderr is captured and logged, never surfaced to
///   HTTP callers
/// - **Timeout**: only when a timeout is configured; the child is killed
/// - **Invalid output**: stdout is not a JSON object
///
/// Stdout is buffered in full; there is no output size cap.
///
/// # Example
///
/// ```no_run
/// use ctftoolkit_shared::tools::{ScriptDispatcher, ToolInvocation, ToolRunner, CipherMode};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = ScriptDispatcher::new("python3", "scripts");
/// let result = dispatcher
///     .run_json(&ToolInvocation::caesar("Hello", 3, CipherMode::Encrypt))
///     .await?;
/// println!("{:?}", result.get("result"));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::invocation::{Tool, ToolInvocation};

/// Timeout applied by the CLI when none is given (30 seconds)
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Untyped JSON object produced by a tool script
pub type ToolResult = Map<String, Value>;

/// Error type for tool dispatch
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Interpreter could not be started
    #[error("Failed to start {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool exited unsuccessfully
    #[error("{tool} exited with status {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    NonZeroExit {
        tool: Tool,
        code: Option<i32>,
        stderr: String,
    },

    /// Tool did not finish within the configured timeout
    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    Timeout { tool: Tool, timeout: Duration },

    /// Stdout was not a JSON object
    #[error("Failed to parse {tool} output: {source}")]
    InvalidOutput {
        tool: Tool,
        #[source]
        source: serde_json::Error,
    },
}

/// Dispatch result type alias
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Captured output of a finished tool process
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub tool: Tool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Decodes stdout as a single JSON object
    pub fn json(&self) -> DispatchResult<ToolResult> {
        serde_json::from_slice::<ToolResult>(&self.stdout).map_err(|source| {
            tracing::warn!(tool = %self.tool, error = %source, "Tool produced unparsable output");
            DispatchError::InvalidOutput {
                tool: self.tool,
                source,
            }
        })
    }

    /// Stdout as text, replacing invalid UTF-8
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs tool invocations
///
/// Handlers depend on this trait; the process-backed implementation is
/// [`ScriptDispatcher`].
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs the tool and returns its captured output
    async fn run(&self, invocation: &ToolInvocation) -> DispatchResult<ToolOutput>;

    /// Runs the tool and decodes stdout as a JSON object
    async fn run_json(&self, invocation: &ToolInvocation) -> DispatchResult<ToolResult> {
        self.run(invocation).await?.json()
    }
}

/// Runs tool scripts as child processes
#[derive(Debug, Clone)]
pub struct ScriptDispatcher {
    interpreter: String,
    scripts_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptDispatcher {
    /// Creates a dispatcher without a timeout
    pub fn new(interpreter: impl Into<String>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            scripts_dir: scripts_dir.into(),
            timeout: None,
        }
    }

    /// Sets (or clears) the per-invocation timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute or relative path of the script for `tool`
    pub fn script_path(&self, tool: Tool) -> PathBuf {
        self.scripts_dir.join(tool.script())
    }

    fn command(&self, invocation: &ToolInvocation) -> Command {
        let mut command = Command::new(&self.interpreter);
        command
            .arg(self.script_path(invocation.tool()))
            .args(invocation.args())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ToolRunner for ScriptDispatcher {
    async fn run(&self, invocation: &ToolInvocation) -> DispatchResult<ToolOutput> {
        let tool = invocation.tool();
        let mut command = self.command(invocation);
        let started = Instant::now();

        tracing::debug!(
            tool = %tool,
            interpreter = %self.interpreter,
            args = ?invocation.args(),
            "Dispatching external tool"
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    tracing::warn!(tool = %tool, timeout_secs = limit.as_secs(), "External tool timed out");
                    DispatchError::Timeout {
                        tool,
                        timeout: limit,
                    }
                })?,
            None => command.output().await,
        }
        .map_err(|source| {
            tracing::error!(tool = %tool, interpreter = %self.interpreter, error = %source, "Failed to spawn external tool");
            DispatchError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            }
        })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(
                tool = %tool,
                exit_code = ?output.status.code(),
                elapsed_ms,
                stderr = %stderr.trim(),
                "External tool failed"
            );
            return Err(DispatchError::NonZeroExit {
                tool,
                code: output.status.code(),
                stderr,
            });
        }

        tracing::debug!(tool = %tool, elapsed_ms, stdout_bytes = output.stdout.len(), "External tool finished");

        Ok(ToolOutput {
            tool,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::invocation::CipherMode;
    use std::fs;
    use tempfile::TempDir;

    /// Writes `body` as the shell script standing in for `tool`
    fn install(dir: &TempDir, tool: Tool, body: &str) {
        let path = dir.path().join(tool.script());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn dispatcher(dir: &TempDir) -> ScriptDispatcher {
        ScriptDispatcher::new("sh", dir.path())
    }

    #[tokio::test]
    async fn test_run_json_passes_positional_args() {
        let dir = TempDir::new().unwrap();
        install(
            &dir,
            Tool::Caesar,
            r#"printf '{"success": true, "argc": %d, "text": "%s", "key": "%s", "mode": "%s"}' "$#" "$1" "$2" "$3""#,
        );

        let result = dispatcher(&dir)
            .run_json(&ToolInvocation::caesar("Hello World", 3, CipherMode::Decrypt))
            .await
            .expect("Tool should succeed");

        assert_eq!(result["success"], true);
        assert_eq!(result["argc"], 3);
        assert_eq!(result["text"], "Hello World");
        assert_eq!(result["key"], "3");
        assert_eq!(result["mode"], "decrypt");
    }

    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let dir = TempDir::new().unwrap();
        install(&dir, Tool::Exif, "echo 'boom' >&2\nexit 3\n");

        let err = dispatcher(&dir)
            .run(&ToolInvocation::exif(Path::new("image.jpg")))
            .await
            .unwrap_err();

        match err {
            DispatchError::NonZeroExit { tool, code, stderr } => {
                assert_eq!(tool, Tool::Exif);
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("Expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_output() {
        let dir = TempDir::new().unwrap();
        install(&dir, Tool::Sherlock, "echo 'not json at all'\n");

        let runner = dispatcher(&dir);
        let invocation = ToolInvocation::sherlock("john", 5);

        let output = runner.run(&invocation).await.expect("Process should succeed");
        assert_eq!(output.stdout_lossy().trim(), "not json at all");

        let err = runner.run_json(&invocation).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOutput { tool: Tool::Sherlock, .. }));
    }

    #[tokio::test]
    async fn test_json_array_is_not_an_object() {
        let dir = TempDir::new().unwrap();
        install(&dir, Tool::Strings, "echo '[1, 2, 3]'\n");

        let err = dispatcher(&dir)
            .run_json(&ToolInvocation::strings(Path::new("a.bin"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOutput { .. }));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptDispatcher::new("definitely-not-an-interpreter-4242", dir.path());

        let err = runner
            .run(&ToolInvocation::exif(Path::new("image.jpg")))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_slow_tool() {
        let dir = TempDir::new().unwrap();
        install(&dir, Tool::Pcap, "sleep 5\necho '{}'\n");

        let runner = dispatcher(&dir).with_timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let err = runner
            .run(&ToolInvocation::pcap(Path::new("cap.pcap"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Timeout { tool: Tool::Pcap, .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_script_path() {
        let runner = ScriptDispatcher::new("python3", "scripts");
        assert_eq!(
            runner.script_path(Tool::Caesar),
            PathBuf::from("scripts/crypto/caesar.py")
        );
        assert_eq!(runner.timeout(), None);
        assert_eq!(
            runner.with_timeout(Some(DEFAULT_TOOL_TIMEOUT)).timeout(),
            Some(Duration::from_secs(30))
        );
    }
}
