//! # CTF Toolkit API Server Library
//!
//! This library provides the core functionality for the CTF Toolkit API
//! server: authentication against the user store and HTTP front-ends for the
//! external tool scripts.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `envelope`: Uniform JSON response wrapper
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod envelope;
pub mod error;
pub mod routes;
