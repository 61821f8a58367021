//! # Heron Diagnostics
//!
//! Typed, structured diagnostics facade for the Heron stream-processing
//! and alerting engine.
//!
//! ## Features
//!
//! - **Typed handlers**: one handler per subsystem with strongly-typed
//!   event methods, no format strings at call sites
//! - **Immutable context**: handlers derive narrower scopes (task, node,
//!   edge, request) by appending bound fields, never by mutation
//! - **Structured backend**: JSON or compact `key=value` line output, with
//!   an in-memory capture backend for tests
//! - **Configurable**: log level, format, and destination via TOML and
//!   environment variables
//!
//! ## Quick Start
//!
//! ```rust
//! use heron_diagnostic::Service;
//!
//! let diag = Service::new();
//! let engine = diag.new_engine_handler();
//!
//! engine.started_task("cpu_alert");
//! engine.with_task_context("cpu_alert").task_master_opened();
//! ```

pub mod config;
pub mod dispatch;
pub mod field;
pub mod handlers;
pub mod logger;
pub mod service;
pub mod sink;


pub use config::{DiagnosticConfig, LogFormat, LogOutput};
pub use dispatch::{ErrorDiagnostic, WithContext};
pub use field::{Field, KeyValue, Severity, Value};
pub use logger::Logger;
pub use service::Service;
pub use sink::{CaptureSink, Record, Sink, WriterSink};

/// Result type for diagnostics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Diagnostics-specific errors.
///
/// Event emission has no failure path; these arise only from loading
/// configuration and constructing the configured backend.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
