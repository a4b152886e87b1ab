//! Core of the LLM random-walk experiment: the trajectory document, the chat-model client,
//! and the walk driver that ties them together.
//!
//! The driver binary and the path animator both build on this crate so the on-disk document
//! format lives in exactly one place.

pub mod config;
pub mod config_loader;
pub mod document;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod walk;

pub use document::{ModelRun, Position, TemperatureBucket, TrialRecord, WalkDocument};
pub use error::{DocumentError, LlmError, WalkError};
pub use walk::{Decision, Direction, WalkParams};
