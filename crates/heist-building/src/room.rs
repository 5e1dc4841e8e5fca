//! A single lockable room and its mutable occupancy state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use heist_core::{ActorId, Evidence, EvidenceMask, RoomId};
use smallvec::SmallVec;

use crate::{DEFAULT_ROOM_CAPACITY, MAX_CONNECTIONS};

/// Adjacency list of a room. Fixed once the building is built.
pub type Neighbours = SmallVec<[RoomId; MAX_CONNECTIONS]>;

/// A node in the building graph.
///
/// Identity, name, start flag and adjacency are immutable and can be read
/// without locking. Everything actors change lives in [`RoomState`] behind
/// the room's own mutex.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    is_start: bool,
    neighbours: Neighbours,
    state: Mutex<RoomState>,
}

// Compile-time assertion: Room must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Room>();
};

impl Room {
    pub(crate) fn new(
        id: RoomId,
        name: String,
        is_start: bool,
        neighbours: Neighbours,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            name,
            is_start,
            neighbours,
            state: Mutex::new(RoomState::new(capacity)),
        }
    }

    /// This room's identifier (also its lock rank).
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the designated start (base) room.
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    /// Rooms reachable in one hop.
    pub fn neighbours(&self) -> &[RoomId] {
        &self.neighbours
    }

    /// Acquire this room's lock.
    ///
    /// A poisoned lock is recovered: room state is only ever mutated through
    /// the small, non-panicking methods on [`RoomState`], so the data behind
    /// a poisoned lock is still consistent.
    pub fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state, taken under the lock.
    pub fn snapshot(&self) -> RoomState {
        self.lock().clone()
    }
}

/// The mutable part of a room: who is inside and what evidence lies there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomState {
    guards: SmallVec<[ActorId; DEFAULT_ROOM_CAPACITY]>,
    intruder: Option<ActorId>,
    evidence: EvidenceMask,
    capacity: usize,
}

impl RoomState {
    fn new(capacity: usize) -> Self {
        Self {
            guards: SmallVec::new(),
            intruder: None,
            evidence: EvidenceMask::EMPTY,
            capacity,
        }
    }

    /// Guards currently in the room, in arrival order.
    pub fn guards(&self) -> &[ActorId] {
        &self.guards
    }

    /// Number of guards in the room.
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Whether at least one guard is present.
    pub fn has_guards(&self) -> bool {
        !self.guards.is_empty()
    }

    /// Maximum number of guards the room holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether another guard would exceed capacity.
    pub fn is_full(&self) -> bool {
        self.guards.len() >= self.capacity
    }

    /// Whether `guard` is in the room.
    pub fn contains_guard(&self, guard: ActorId) -> bool {
        self.guards.contains(&guard)
    }

    /// Add a guard. Refused (returns `false`) when the room is full.
    pub fn add_guard(&mut self, guard: ActorId) -> bool {
        if self.is_full() {
            return false;
        }
        self.guards.push(guard);
        true
    }

    /// Remove a guard, preserving the order of the others.
    /// Returns `false` if the guard was not present.
    pub fn remove_guard(&mut self, guard: ActorId) -> bool {
        match self.guards.iter().position(|&g| g == guard) {
            Some(idx) => {
                self.guards.remove(idx);
                true
            }
            None => false,
        }
    }

    /// The intruder in this room, if any.
    pub fn intruder(&self) -> Option<ActorId> {
        self.intruder
    }

    /// Place or clear the intruder reference.
    pub fn set_intruder(&mut self, intruder: Option<ActorId>) {
        self.intruder = intruder;
    }

    /// Evidence physically present in the room.
    pub fn evidence(&self) -> EvidenceMask {
        self.evidence
    }

    /// Leave a piece of evidence in the room.
    pub fn drop_evidence(&mut self, kind: Evidence) {
        self.evidence.insert(kind);
    }

    /// Pick up a piece of evidence. Returns `true` if it was present.
    pub fn take_evidence(&mut self, kind: Evidence) -> bool {
        self.evidence.remove(kind)
    }
}
