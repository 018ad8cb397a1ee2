//! Error types for the reparent pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::constants;
use crate::stage::StageError;

/// Why a stage could not be given a default prim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRootCause {
    /// The stage has no pseudo-root to enumerate.
    NoPseudoRoot,
    /// Every child of the pseudo-root is blacklisted, or there are none.
    NoValidChildren,
    /// The default prim was assigned and saved but does not resolve.
    NotPersisted,
}

impl fmt::Display for MissingRootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPseudoRoot => f.write_str("has no root prim"),
            Self::NoValidChildren => f.write_str("has no valid child prims"),
            Self::NotPersisted => f.write_str("still has no default prim after saving"),
        }
    }
}

/// Every checked failure of the tool. Each maps to exit code 1.
#[derive(Debug, Error)]
pub enum ReparentError {
    #[error("{}", constants::USAGE)]
    Usage,

    #[error("Error opening USD stage from file {}: {source}", .path.display())]
    StageOpen {
        path: PathBuf,
        #[source]
        source: StageError,
    },

    #[error("USD stage from file {} {cause}", .path.display())]
    MissingDefaultRoot {
        path: PathBuf,
        cause: MissingRootCause,
    },

    #[error("Invalid selection {selection}; expected a number between 0 and {}", .count.saturating_sub(1))]
    Selection { selection: usize, count: usize },

    #[error("standard input closed while waiting for {0}")]
    InputClosed(&'static str),

    #[error("Failed to save USD stage {}: {source}", .path.display())]
    StageWrite {
        path: PathBuf,
        #[source]
        source: StageError,
    },

    #[error("Failed to create new USD stage: {source}")]
    StageCreate {
        path: PathBuf,
        #[source]
        source: StageError,
    },

    #[error("Failed to create Scope prim {path}: {reason}")]
    EntityDefine { path: String, reason: String },

    #[error("{} already exists; refusing to overwrite it", .path.display())]
    OutputExists { path: PathBuf },

    #[error("output {} would replace the input layer; choose another scope name", .path.display())]
    OutputIsInput { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_messages_name_the_file() {
        let err = ReparentError::MissingDefaultRoot {
            path: PathBuf::from("/tmp/scene.usda"),
            cause: MissingRootCause::NoValidChildren,
        };
        assert_eq!(
            err.to_string(),
            "USD stage from file /tmp/scene.usda has no valid child prims"
        );

        let err = ReparentError::MissingDefaultRoot {
            path: PathBuf::from("/tmp/scene.usda"),
            cause: MissingRootCause::NoPseudoRoot,
        };
        assert!(err.to_string().ends_with("has no root prim"));
    }

    #[test]
    fn test_stage_open_names_the_file_once() {
        let err = ReparentError::StageOpen {
            path: PathBuf::from("/tmp/scene.usda"),
            source: StageError::Parse {
                reason: "unexpected token".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Error opening USD stage from file /tmp/scene.usda: unexpected token"
        );
    }

    #[test]
    fn test_usage_message() {
        assert_eq!(
            ReparentError::Usage.to_string(),
            "Usage: scope_reparent <usdFilePath> [scopeName]"
        );
    }

    #[test]
    fn test_selection_message() {
        let err = ReparentError::Selection {
            selection: 7,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid selection 7; expected a number between 0 and 2"
        );
    }
}
