//! Decoy responder — from captured HTTP request to generated response.
//!
//! - **prompt**: dump the request and fill the prompt templates
//! - **response**: invoke the model, strip fences, validate the JSON
//! - **responder**: both steps behind one `respond` call

pub mod prompt;
pub mod responder;
pub mod response;

#[cfg(test)]
mod testing;

pub use prompt::PromptBuilder;
pub use responder::Responder;
pub use response::{clean_response, validate_json, FieldKind, FieldRule, ResponseProcessor, RESPONSE_RULES};
