// src/error.rs
use thiserror::Error;

/// Failure reported by a scene archive backend.
///
/// Archive failures are transient from the engine's point of view; the engine
/// surfaces them unchanged and leaves retry policy to the caller.
#[derive(Debug, Error)]
#[error("archive access failed: {0}")]
pub struct ArchiveError(pub String);

/// Errors returned by the compositing engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no region supplied")]
    MissingRegion,

    #[error("unsupported index: {0}")]
    UnsupportedIndex(String),

    #[error("invalid scene {scene}: {reason}")]
    InvalidScene { scene: String, reason: String },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("grid mismatch: expected {expected:?}, found {found:?}")]
    GridMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("request cancelled")]
    Cancelled,
}

impl EngineError {
    pub(crate) fn invalid_scene(scene: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidScene {
            scene: scene.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
