//! Per-guard breadcrumb trail back to base.

use heist_core::RoomId;

/// LIFO of rooms a guard has walked out of.
///
/// Every forward move pushes the room being left; every retreat hop pops
/// one. Reaching base clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathStack {
    rooms: Vec<RoomId>,
}

impl PathStack {
    /// An empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `room` as the most recent step.
    pub fn push(&mut self, room: RoomId) {
        self.rooms.push(room);
    }

    /// Take the most recent step, if any.
    pub fn pop(&mut self) -> Option<RoomId> {
        self.rooms.pop()
    }

    /// Most recent step without removing it.
    pub fn peek(&self) -> Option<RoomId> {
        self.rooms.last().copied()
    }

    /// Forget the whole trail.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    /// Number of steps recorded.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
