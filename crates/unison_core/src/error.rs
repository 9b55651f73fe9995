//! Error types for unison

use thiserror::Error;

use crate::anchor::AnchorStatus;

/// Errors reported by anchors and motion controllers
///
/// Every error is raised before a transition produces any observable side
/// effect; none of them is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// An argument is out of range or malformed
    #[error("Invalid argument: {0}")]
    ArgumentInvalid(String),

    /// A name or id does not refer to a registered anchor
    #[error("Anchor '{0}' is not registered")]
    UnknownAnchor(String),

    /// The anchor's target could not be resolved, or is not displayed
    #[error("Target of anchor '{anchor}' {reason}")]
    TargetNotFound { anchor: String, reason: String },

    /// An anchor is not in the status required by the requested direction
    #[error("Anchor '{anchor}' is in status '{actual}', expected '{expected}'")]
    PreconditionViolation {
        anchor: String,
        actual: AnchorStatus,
        expected: AnchorStatus,
    },

    /// A discrete transition was requested while another is still running
    #[error("Motion '{motion}' is already running a transition")]
    TransitionInFlight { motion: String },
}

impl MotionError {
    pub fn not_found(anchor: impl Into<String>) -> Self {
        MotionError::TargetNotFound {
            anchor: anchor.into(),
            reason: "was not found".to_string(),
        }
    }

    pub fn not_visible(anchor: impl Into<String>) -> Self {
        MotionError::TargetNotFound {
            anchor: anchor.into(),
            reason: "is not visible".to_string(),
        }
    }
}

/// Result type for unison operations
pub type Result<T> = std::result::Result<T, MotionError>;
