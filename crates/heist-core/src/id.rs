//! Strongly-typed identifiers for rooms and actors.

use std::fmt;

/// Identifies a room within a building.
///
/// Rooms are assigned sequential IDs in the order they are added.
/// `RoomId(n)` is the index of the n-th room, and the ordering of room IDs
/// is the global lock order for rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub u16);

impl RoomId {
    /// The room's index into the building's room table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for RoomId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Identifies an actor (guard or intruder).
///
/// Guard IDs are supplied at registration; the intruder uses
/// [`DEFAULT_INTRUDER_ID`] unless configured otherwise. Each actor's
/// action records are keyed by this ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ActorId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Actor ID used for the intruder when none is configured.
pub const DEFAULT_INTRUDER_ID: ActorId = ActorId(68057);
