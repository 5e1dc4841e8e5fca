//! Lockable rooms and the static building graph.
//!
//! A [`Building`] owns every [`Room`] for the lifetime of a run. Topology
//! (names, adjacency, the start room) is fixed at construction by
//! [`BuildingBuilder`]; only a room's [`RoomState`] (occupants, intruder,
//! evidence) changes while actors run, and only under that room's lock.
//!
//! # Lock order
//!
//! Any operation that needs two rooms at once goes through
//! [`Building::lock_pair`], which acquires the locks in ascending
//! [`RoomId`](heist_core::RoomId) order regardless of which room is the
//! source and which is the destination. Two actors crossing the same
//! doorway in opposite directions therefore contend on the same first lock
//! instead of each holding one and waiting for the other.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod building;
pub mod error;
pub mod layout;
pub mod room;

pub use building::{Building, BuildingBuilder, RoomPair};
pub use error::LayoutError;
pub use layout::{Layout, RoomSpec};
pub use room::{Room, RoomState};

/// Maximum number of rooms in a building.
pub const MAX_ROOMS: usize = 24;

/// Maximum number of adjacency slots per room.
pub const MAX_CONNECTIONS: usize = 8;

/// Default number of guards a single room can hold.
pub const DEFAULT_ROOM_CAPACITY: usize = 8;
