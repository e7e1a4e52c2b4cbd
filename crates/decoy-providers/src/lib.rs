//! LLM backend layer for Decoy.
//!
//! # Architecture
//!
//! - [`traits::ModelClient`] — trait every backend adapter implements
//! - [`registry`] — static specs for the six supported backends
//! - [`http_provider::HttpBackend`] — shared reqwest plumbing and error mapping
//! - [`factory::initialize`] — build a client from a `ProviderConfig`
//! - one adapter module per wire format: [`openai`], [`anthropic`],
//!   [`google`] (Google AI and Vertex), [`cohere`], [`ollama`]

pub mod anthropic;
pub mod cohere;
pub mod factory;
pub mod google;
pub mod http_provider;
pub mod ollama;
pub mod openai;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use factory::{initialize, with_env_credentials};
pub use registry::{find_by_name, supports_system_prompt, ProviderKind, ProviderSpec, PROVIDERS};
pub use traits::ModelClient;
