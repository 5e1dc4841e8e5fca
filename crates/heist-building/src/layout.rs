//! Declarative building descriptions and the built-in museum floor plan.

use crate::building::{Building, BuildingBuilder};
use crate::error::LayoutError;
use crate::DEFAULT_ROOM_CAPACITY;

/// One room in a [`Layout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomSpec {
    /// Unique room name.
    pub name: String,
    /// Whether guards start here and return here.
    pub is_start: bool,
}

/// A static, externally supplied description of a building.
///
/// Rooms are numbered in list order. Connections are undirected pairs of
/// room names; a pair whose rooms have no free adjacency slot is skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Rooms, in id order.
    pub rooms: Vec<RoomSpec>,
    /// Undirected connections by room name.
    pub connections: Vec<(String, String)>,
    /// Guard capacity applied to every room.
    pub room_capacity: usize,
}

impl Layout {
    /// The 13-room museum. The Security Office is the start room.
    pub fn museum() -> Self {
        const ROOMS: [&str; 13] = [
            "Security Office",
            "Main Corridor",
            "Renaissance Gallery",
            "Modern Art Gallery",
            "Restroom",
            "Archives",
            "Service Corridor",
            "Storage A",
            "Storage B",
            "Cafe",
            "Grand Hall",
            "Loading Dock",
            "Control Closet",
        ];
        const LINKS: [(&str, &str); 12] = [
            ("Security Office", "Main Corridor"),
            ("Main Corridor", "Renaissance Gallery"),
            ("Main Corridor", "Modern Art Gallery"),
            ("Main Corridor", "Restroom"),
            ("Main Corridor", "Cafe"),
            ("Main Corridor", "Archives"),
            ("Archives", "Service Corridor"),
            ("Service Corridor", "Storage A"),
            ("Service Corridor", "Storage B"),
            ("Cafe", "Grand Hall"),
            ("Cafe", "Loading Dock"),
            ("Loading Dock", "Control Closet"),
        ];

        Self {
            rooms: ROOMS
                .iter()
                .enumerate()
                .map(|(i, name)| RoomSpec {
                    name: (*name).to_string(),
                    is_start: i == 0,
                })
                .collect(),
            connections: LINKS
                .iter()
                .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
                .collect(),
            room_capacity: DEFAULT_ROOM_CAPACITY,
        }
    }

    /// Validate the description and construct the building.
    pub fn build(&self) -> Result<Building, LayoutError> {
        let mut builder = BuildingBuilder::new().room_capacity(self.room_capacity);
        for room in &self.rooms {
            builder.add_room(&room.name, room.is_start)?;
        }
        for (a, b) in &self.connections {
            builder.connect_names(a, b)?;
        }
        builder.build()
    }
}
