//! Decoy core — shared types, errors, call context, and configuration.
//!
//! - [`types`] — prompt messages, backend completions, generated response
//! - [`request`] — captured HTTP request and its wire dump
//! - [`error`] — `LlmError` / `BackendError` taxonomy
//! - [`context`] — per-call deadline and cancellation
//! - [`config`] — JSON config schema, loader, env overrides

pub mod config;
pub mod context;
pub mod error;
pub mod request;
pub mod types;
pub mod utils;

pub use context::{CallContext, CancelHandle};
pub use error::{BackendError, EmptyResponseKind, LlmError};
pub use request::HttpRequest;
pub use types::{Choice, Completion, GenerateOptions, GeneratedResponse, Message, Role};
