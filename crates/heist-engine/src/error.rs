//! Registration and run errors.

use std::error::Error;
use std::fmt;

use heist_building::LayoutError;
use heist_core::ActorId;
use heist_record::RecordError;

use crate::config::ConfigError;

/// Why a guard could not be registered. The run continues without it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// A guard with this id is already registered.
    DuplicateId {
        /// The rejected id.
        id: ActorId,
    },
    /// The start room has no free occupant slot.
    StartRoomFull {
        /// Capacity of the start room.
        capacity: usize,
    },
    /// The id collides with the intruder's.
    IntruderId {
        /// The rejected id.
        id: ActorId,
    },
    /// The record stream refused the guard's INIT record.
    Record(RecordError),
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "guard id {id} is already registered"),
            Self::StartRoomFull { capacity } => {
                write!(f, "start room is full ({capacity} guards)")
            }
            Self::IntruderId { id } => write!(f, "id {id} is reserved for the intruder"),
            Self::Record(e) => write!(f, "record: {e}"),
        }
    }
}

impl Error for RegisterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Record(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for RegisterError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

/// Fatal errors from constructing or running a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The building description was invalid.
    Layout(LayoutError),
    /// The building has no room besides the start room to hide the intruder in.
    NoIntruderRoom,
    /// The record stream failed fatally (an actor hit its record cap, or
    /// the recorder thread died).
    Record(RecordError),
    /// An actor thread could not be spawned.
    ThreadSpawnFailed {
        /// Description from the OS.
        reason: String,
    },
    /// An actor thread panicked.
    ActorPanicked {
        /// Name of the panicked thread.
        thread: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Layout(e) => write!(f, "layout: {e}"),
            Self::NoIntruderRoom => write!(f, "no non-start room to place the intruder in"),
            Self::Record(e) => write!(f, "record: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::ActorPanicked { thread } => write!(f, "actor thread {thread} panicked"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::Record(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LayoutError> for SimError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<RecordError> for SimError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}
