//! Error types for the record stream.

use std::fmt;

use heist_core::ActorId;

/// Errors from the action record stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// An actor tried to emit more records than its cap allows. Treated as
    /// a runaway loop and fatal to the run.
    CapExceeded {
        /// The offending actor.
        actor: ActorId,
        /// The configured cap.
        cap: u64,
    },
    /// The recorder thread could not be spawned.
    ThreadSpawnFailed {
        /// Description from the OS.
        reason: String,
    },
    /// The recorder thread panicked before it could be joined.
    RecorderPanicked,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapExceeded { actor, cap } => {
                write!(f, "actor {actor} exceeded the record cap of {cap}")
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "recorder thread spawn failed: {reason}")
            }
            Self::RecorderPanicked => write!(f, "recorder thread panicked"),
        }
    }
}

impl std::error::Error for RecordError {}
