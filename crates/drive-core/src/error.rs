//! Error types for scene construction and configuration loading.

use std::fmt;

use crate::graph::NodeId;

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur while assembling a scene.
///
/// Nothing in the per-frame path returns these; numerical edge cases are
/// handled in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A node was added with a parent that is not in the arena yet.
    UnknownParent {
        /// The parent handle that was supplied.
        parent: NodeId,
        /// Number of nodes in the arena at the time.
        len: usize,
    },
    /// The asset collaborator could not supply a mesh.
    Asset {
        /// Asset path that was requested.
        path: String,
        /// The error message.
        message: String,
    },
    /// A well-known node was not registered when the world was assembled.
    MissingNode {
        /// Which node was missing.
        role: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParent { parent, len } => {
                write!(
                    f,
                    "parent {parent} is not in the scene (only {len} nodes exist)"
                )
            }
            Self::Asset { path, message } => {
                write!(f, "failed to load asset {path}: {message}")
            }
            Self::MissingNode { role } => write!(f, "scene has no {role} node"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Errors that can occur while loading a tuning file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The file contents were not valid tuning JSON.
    Parse {
        /// Path that was parsed.
        path: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {path}: {source}"),
            Self::Parse { path, source } => write!(f, "failed to parse {path}: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}
