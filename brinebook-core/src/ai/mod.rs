//! AI client module for recipe generation through an OpenAI-compatible
//! chat-completion API.
//!
//! This module provides:
//! - `AiClient` trait for abstracting AI providers
//! - `OpenAiClient`, the HTTP implementation
//! - `FakeAiClient` for tests
//! - Prompt templates and the generate/revise operations
//!
//! # Configuration
//!
//! - `OPENAI_API_KEY` (required): API key
//! - `OPENAI_MODEL` (optional): model name
//! - `OPENAI_BASE_URL` (optional): API base URL
//! - `OPENAI_TIMEOUT_SECS` (optional): HTTP timeout

mod client;
mod config;
mod fake;
mod generate;
pub mod prompts;
mod types;

pub use client::{AiClient, AiError, OpenAiClient};
pub use config::{AiConfig, ConfigError};
pub use fake::FakeAiClient;
pub use generate::{
    generate_recipe, parse_generated_recipe, revise_recipe, GenerationRequest, RevisionSource,
};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};
