//! Error types shared by the editor engine.

use crate::layout::BlockId;
use thiserror::Error;

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
    #[error("Invalid key binding: {0:?}")]
    InvalidKeyBinding(String),
    #[error("Missing argument for command: {0}")]
    MissingArgument(&'static str),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
