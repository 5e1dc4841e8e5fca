//! Test fixtures for heist development.
//!
//! Small hand-built buildings with known topology, so tests can reason
//! about exactly which rooms a guard or intruder can reach.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use heist_building::{Building, Layout, DEFAULT_ROOM_CAPACITY};
use heist_core::RoomId;

/// Name of the start room in every fixture below.
pub const BASE: &str = "Base";

/// `Base` (start) <-> `Vault`.
pub fn two_room_building() -> Building {
    two_room_building_with_capacity(DEFAULT_ROOM_CAPACITY)
}

/// `Base` (start) <-> `Vault`, each holding at most `capacity` guards.
pub fn two_room_building_with_capacity(capacity: usize) -> Building {
    let mut b = Building::builder().room_capacity(capacity);
    let base = b.add_room(BASE, true).expect("add base");
    let vault = b.add_room("Vault", false).expect("add vault");
    b.connect(base, vault).expect("connect");
    b.build().expect("two-room building")
}

/// A corridor `Base` - `Room 1` - ... - `Room n-1`. Only the ends have a
/// single neighbour.
///
/// # Panics
///
/// Panics if `n < 2`.
pub fn line_building(n: usize) -> Building {
    assert!(n >= 2, "a line needs at least two rooms");
    let mut b = Building::builder();
    let mut prev = b.add_room(BASE, true).expect("add base");
    for i in 1..n {
        let next = b.add_room(&format!("Room {i}"), false).expect("add room");
        b.connect(prev, next).expect("connect");
        prev = next;
    }
    b.build().expect("line building")
}

/// `Base` connected to `spokes` leaf rooms. Every move from a leaf leads
/// back to `Base`.
pub fn star_building(spokes: usize) -> Building {
    let mut b = Building::builder();
    let base = b.add_room(BASE, true).expect("add base");
    for i in 0..spokes {
        let leaf = b.add_room(&format!("Spoke {i}"), false).expect("add spoke");
        b.connect(base, leaf).expect("connect");
    }
    b.build().expect("star building")
}

/// The full 13-room museum.
pub fn museum() -> Building {
    Layout::museum().build().expect("museum layout")
}

/// Id of the room called `name`.
///
/// # Panics
///
/// Panics if there is no such room.
pub fn room_id(building: &Building, name: &str) -> RoomId {
    building
        .room_by_name(name)
        .unwrap_or_else(|| panic!("no room named {name}"))
        .id()
}
