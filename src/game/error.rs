use thiserror::Error;

use super::progression::Phase;

/// Rejections raised by session-control operations. An `Err` means the call
/// was refused before any state changed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown track id '{0}'")]
    UnknownTrack(String),

    #[error("cannot {op} while {phase:?}")]
    InvalidPhase { op: &'static str, phase: Phase },

    #[error("invalid track '{id}': {reason}")]
    InvalidTrack { id: String, reason: String },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("config json: {0}")]
    Json(String),
}
