/// Stored data models
///
/// - `user`: user accounts
/// - `tool_log`: tool invocation records
///
/// Persistence lives behind the [`crate::db::Store`] trait; these are plain
/// data types.

pub mod tool_log;
pub mod user;
