/// External tool dispatch
///
/// - [`invocation`]: tool catalogue and the positional argument contract of
///   each script
/// - [`dispatcher`]: the [`ToolRunner`] trait and its child-process
///   implementation
///
/// Tool scripts own their output shape. The dispatcher only guarantees that
/// a successful result is a JSON object.

pub mod dispatcher;
pub mod invocation;

pub use dispatcher::{
    DispatchError, DispatchResult, ScriptDispatcher, ToolOutput, ToolResult, ToolRunner,
    DEFAULT_TOOL_TIMEOUT,
};
pub use invocation::{CipherMode, Tool, ToolInvocation, DEFAULT_SHERLOCK_TIMEOUT};
