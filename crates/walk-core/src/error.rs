use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the chat-model endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("llm returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("llm response decode failed: {0}")]
    Decode(String),

    #[error("llm client setup failed: {0}")]
    Setup(String),
}

/// Failures loading, saving, or looking up entries in a walk document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid walk document json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model not found in document: {0}")]
    ModelNotFound(String),

    #[error("temperature {label} not found for model {model}")]
    TemperatureNotFound { model: String, label: String },

    #[error("trial R_{index} not found under {label}")]
    TrialNotFound { label: String, index: usize },
}

/// Failures of the walk driver.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("malformed model id {0:?}: expected <namespace>:<name>")]
    MalformedModelId(String),

    #[error("model call failed at temperature {temperature} trial {trial} step {step}: {source}")]
    Llm {
        temperature: f64,
        trial: usize,
        step: usize,
        #[source]
        source: LlmError,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}
