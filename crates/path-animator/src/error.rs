use std::path::PathBuf;

use thiserror::Error;
use walk_core::{DocumentError, WalkError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("drawing failed: {0}")]
    Draw(String),
}

#[derive(Debug, Error)]
pub enum AnimateError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    ModelId(#[from] WalkError),

    #[error("invalid temperature {0:?}")]
    InvalidTemperature(String),

    #[error("no trials to animate")]
    NoTrials,

    #[error("trial {0} has no positions")]
    EmptyPath(usize),

    #[error(transparent)]
    Render(#[from] RenderError),
}
