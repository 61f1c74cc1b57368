//! Error types for the editor core.
//!
//! Format errors are detected before the scene is touched. State errors
//! describe requests that the session turns into no-ops.

use thiserror::Error;

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Problems with an interchange payload or a skeleton about to be serialized.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid pose JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("canvas width or height is invalid")]
    InvalidCanvas,
    #[error("document contains no pose frames")]
    Empty,
    #[error("person {person}: {len} values is not a whole number of (x, y, confidence) triples")]
    RaggedValues { person: usize, len: usize },
    #[error("person {person}: {count} keypoints is not a multiple of 18")]
    KeypointCount { person: usize, count: usize },
    #[error("skeleton {group_id} has {count} keypoints, expected 18")]
    SkeletonSize { group_id: String, count: usize },
}

/// Requests against an absent or invalid selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("nothing is selected")]
    NothingSelected,
    #[error("keypoint {index} of group {group_id} does not exist")]
    UnknownKeypoint { group_id: String, index: usize },
    #[error("active selection is not a group")]
    NotAGroup,
    #[error("pose keypoints not available from the connected source")]
    NoPoseSource,
}

/// Main error type for the editor core.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
