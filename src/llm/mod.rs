//! LLM integration for tournament extraction.
//!
//! Defines the `TournamentExtractor` trait and provides an
//! OpenAI-compatible chat-completions implementation covering the Groq
//! and OpenAI endpoints.

pub mod openai;

use async_trait::async_trait;

use crate::error::ExtractionError;

/// Summary text used when the model cannot produce one.
pub const SUMMARY_FALLBACK: &str = "Tournament summary not available.";

/// Abstraction over the remote extraction endpoint.
///
/// Implementors send prompts to a text-generation service and return the
/// raw reply text; locating and validating the JSON inside the reply is
/// the caller's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TournamentExtractor: Send + Sync {
    /// Send an extraction prompt and return the model's raw reply.
    async fn extract(&self, prompt: &str) -> Result<String, ExtractionError>;

    /// Condense tournament details into a short summary.
    async fn summarize(&self, tournament_text: &str) -> Result<String, ExtractionError>;

    /// Send a trivial probe and check the endpoint acknowledges it.
    /// Used at startup to fail fast on a bad key or endpoint.
    async fn test_connection(&self) -> bool;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
