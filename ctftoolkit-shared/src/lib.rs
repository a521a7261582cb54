//! # CTF Toolkit Shared Library
//!
//! Types and logic shared by the HTTP API server and the `cst` command-line
//! client.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT issuance and bearer authentication
//! - `db`: Persistence trait with MongoDB and in-memory implementations
//! - `models`: Stored data models
//! - `tools`: Tool invocations and the external script dispatcher
//! - `uploads`: Scratch files for uploaded artifacts

pub mod auth;
pub mod db;
pub mod models;
pub mod tools;
pub mod uploads;

/// Current version of the CTF Toolkit shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
