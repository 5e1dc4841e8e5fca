//! Error types for building construction.

use std::fmt;

/// Errors detected while assembling a building from a layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// More rooms than [`MAX_ROOMS`](crate::MAX_ROOMS) were added.
    TooManyRooms {
        /// The configured maximum.
        max: usize,
    },
    /// A room name is empty or whitespace.
    EmptyName,
    /// Two rooms share a name.
    DuplicateRoom {
        /// The repeated name.
        name: String,
    },
    /// A connection referenced a room that does not exist.
    UnknownRoom {
        /// The unresolved name or index.
        name: String,
    },
    /// A room was connected to itself.
    SelfConnection {
        /// The offending room.
        name: String,
    },
    /// No room is flagged as the start room.
    NoStartRoom,
    /// More than one room is flagged as the start room.
    MultipleStartRooms {
        /// The first start room seen.
        first: String,
        /// The second start room seen.
        second: String,
    },
    /// Room capacity is zero, so no guard could ever enter.
    ZeroCapacity,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyRooms { max } => write!(f, "building exceeds {max} rooms"),
            Self::EmptyName => write!(f, "room name must not be empty"),
            Self::DuplicateRoom { name } => write!(f, "duplicate room '{name}'"),
            Self::UnknownRoom { name } => write!(f, "unknown room '{name}'"),
            Self::SelfConnection { name } => write!(f, "room '{name}' cannot connect to itself"),
            Self::NoStartRoom => write!(f, "no start room designated"),
            Self::MultipleStartRooms { first, second } => {
                write!(f, "multiple start rooms: '{first}' and '{second}'")
            }
            Self::ZeroCapacity => write!(f, "room capacity must be at least 1"),
        }
    }
}

impl std::error::Error for LayoutError {}
