//! The building graph, its builder, and paired room locking.

use std::sync::MutexGuard;

use heist_core::RoomId;
use indexmap::IndexMap;

use crate::error::LayoutError;
use crate::room::{Neighbours, Room, RoomState};
use crate::{DEFAULT_ROOM_CAPACITY, MAX_CONNECTIONS, MAX_ROOMS};

/// The static room graph shared by every actor.
///
/// Built once by [`BuildingBuilder`]; the room table, names and adjacency
/// never change afterward.
#[derive(Debug)]
pub struct Building {
    rooms: Vec<Room>,
    names: IndexMap<String, RoomId>,
    start: RoomId,
    room_capacity: usize,
}

// Compile-time assertion: Building must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Building>();
};

impl Building {
    /// Start building a new graph.
    pub fn builder() -> BuildingBuilder {
        BuildingBuilder::new()
    }

    /// The room with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this building.
    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.index()]
    }

    /// Look up a room by id, returning `None` if out of range.
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    /// Look up a room by name.
    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.names.get(name).map(|&id| self.room(id))
    }

    /// The designated start (base) room.
    pub fn start(&self) -> &Room {
        self.room(self.start)
    }

    /// Id of the start room.
    pub fn start_id(&self) -> RoomId {
        self.start
    }

    /// All rooms, in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Every room except the start room, in id order.
    pub fn non_start_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| !r.is_start())
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if the building has no rooms. Never true for a built
    /// building, which always has a start room.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Guard capacity shared by every room.
    pub fn room_capacity(&self) -> usize {
        self.room_capacity
    }

    /// Lock two distinct rooms in ascending id order.
    ///
    /// The returned [`RoomPair`] exposes the states by role (`from`, `to`)
    /// and releases both locks when dropped.
    ///
    /// # Panics
    ///
    /// Panics if `from == to`. Builders reject self-connections, so a move
    /// always spans two rooms.
    pub fn lock_pair(&self, from: RoomId, to: RoomId) -> RoomPair<'_> {
        assert_ne!(from, to, "lock_pair requires two distinct rooms");
        let (from_room, to_room) = (self.room(from), self.room(to));
        if from < to {
            let from = from_room.lock();
            let to = to_room.lock();
            RoomPair { from, to }
        } else {
            let to = to_room.lock();
            let from = from_room.lock();
            RoomPair { from, to }
        }
    }
}

/// Two room locks held together for a move.
///
/// Both guards drop at the end of the pair's scope.
pub struct RoomPair<'a> {
    /// State of the room being left.
    pub from: MutexGuard<'a, RoomState>,
    /// State of the room being entered.
    pub to: MutexGuard<'a, RoomState>,
}

struct PendingRoom {
    name: String,
    is_start: bool,
    neighbours: Neighbours,
}

/// Incremental constructor for a [`Building`].
///
/// # Examples
///
/// ```
/// use heist_building::Building;
///
/// let mut b = Building::builder();
/// let office = b.add_room("Office", true).unwrap();
/// let hall = b.add_room("Hall", false).unwrap();
/// assert!(b.connect(office, hall).unwrap());
/// let building = b.build().unwrap();
///
/// assert_eq!(building.start().name(), "Office");
/// assert_eq!(building.room(hall).neighbours(), &[office]);
/// ```
pub struct BuildingBuilder {
    rooms: Vec<PendingRoom>,
    names: IndexMap<String, RoomId>,
    room_capacity: usize,
}

impl Default for BuildingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildingBuilder {
    /// An empty builder with [`DEFAULT_ROOM_CAPACITY`].
    pub fn new() -> Self {
        Self {
            rooms: Vec::new(),
            names: IndexMap::new(),
            room_capacity: DEFAULT_ROOM_CAPACITY,
        }
    }

    /// Set the per-room guard capacity.
    pub fn room_capacity(mut self, capacity: usize) -> Self {
        self.room_capacity = capacity;
        self
    }

    /// Add a room. Ids are assigned sequentially from 0.
    pub fn add_room(&mut self, name: &str, is_start: bool) -> Result<RoomId, LayoutError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LayoutError::EmptyName);
        }
        if self.rooms.len() >= MAX_ROOMS {
            return Err(LayoutError::TooManyRooms { max: MAX_ROOMS });
        }
        if self.names.contains_key(name) {
            return Err(LayoutError::DuplicateRoom {
                name: name.to_string(),
            });
        }
        let id = RoomId(self.rooms.len() as u16);
        self.names.insert(name.to_string(), id);
        self.rooms.push(PendingRoom {
            name: name.to_string(),
            is_start,
            neighbours: Neighbours::new(),
        });
        Ok(id)
    }

    /// Link two rooms in both directions.
    ///
    /// Returns `Ok(false)` and changes nothing if either room already has
    /// [`MAX_CONNECTIONS`] neighbours.
    pub fn connect(&mut self, a: RoomId, b: RoomId) -> Result<bool, LayoutError> {
        let len = self.rooms.len();
        for id in [a, b] {
            if id.index() >= len {
                return Err(LayoutError::UnknownRoom {
                    name: format!("#{id}"),
                });
            }
        }
        if a == b {
            return Err(LayoutError::SelfConnection {
                name: self.rooms[a.index()].name.clone(),
            });
        }
        if self.rooms[a.index()].neighbours.len() >= MAX_CONNECTIONS
            || self.rooms[b.index()].neighbours.len() >= MAX_CONNECTIONS
        {
            return Ok(false);
        }
        self.rooms[a.index()].neighbours.push(b);
        self.rooms[b.index()].neighbours.push(a);
        Ok(true)
    }

    /// [`connect`](Self::connect) by room name.
    pub fn connect_names(&mut self, a: &str, b: &str) -> Result<bool, LayoutError> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        self.connect(a, b)
    }

    fn resolve(&self, name: &str) -> Result<RoomId, LayoutError> {
        self.names
            .get(name.trim())
            .copied()
            .ok_or_else(|| LayoutError::UnknownRoom {
                name: name.to_string(),
            })
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> Result<Building, LayoutError> {
        if self.room_capacity == 0 {
            return Err(LayoutError::ZeroCapacity);
        }

        let mut start: Option<RoomId> = None;
        for (idx, room) in self.rooms.iter().enumerate() {
            if !room.is_start {
                continue;
            }
            if let Some(first) = start {
                return Err(LayoutError::MultipleStartRooms {
                    first: self.rooms[first.index()].name.clone(),
                    second: room.name.clone(),
                });
            }
            start = Some(RoomId(idx as u16));
        }
        let start = start.ok_or(LayoutError::NoStartRoom)?;

        let capacity = self.room_capacity;
        let rooms = self
            .rooms
            .into_iter()
            .enumerate()
            .map(|(idx, pending)| {
                Room::new(
                    RoomId(idx as u16),
                    pending.name,
                    pending.is_start,
                    pending.neighbours,
                    capacity,
                )
            })
            .collect();

        Ok(Building {
            rooms,
            names: self.names,
            start,
            room_capacity: capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heist_core::ActorId;
    use proptest::prelude::*;

    fn line(n: usize) -> Building {
        let mut b = Building::builder();
        let ids: Vec<_> = (0..n)
            .map(|i| b.add_room(&format!("R{i}"), i == 0).unwrap())
            .collect();
        for pair in ids.windows(2) {
            b.connect(pair[0], pair[1]).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn connect_is_bidirectional() {
        let building = line(3);
        assert_eq!(building.room(RoomId(1)).neighbours(), &[RoomId(0), RoomId(2)]);
        assert_eq!(building.room(RoomId(2)).neighbours(), &[RoomId(1)]);
    }

    #[test]
    fn connect_ignores_saturated_rooms() {
        let mut b = Building::builder();
        let hub = b.add_room("Hub", true).unwrap();
        let spokes: Vec<_> = (0..=MAX_CONNECTIONS)
            .map(|i| b.add_room(&format!("S{i}"), false).unwrap())
            .collect();
        for (i, &spoke) in spokes.iter().enumerate() {
            let linked = b.connect(hub, spoke).unwrap();
            assert_eq!(linked, i < MAX_CONNECTIONS);
        }
        let building = b.build().unwrap();
        assert_eq!(building.room(hub).neighbours().len(), MAX_CONNECTIONS);
        // The refused spoke got no half-link either.
        assert!(building.room(spokes[MAX_CONNECTIONS]).neighbours().is_empty());
    }

    #[test]
    fn rejects_self_connection_and_unknown_room() {
        let mut b = Building::builder();
        let a = b.add_room("A", true).unwrap();
        assert!(matches!(
            b.connect(a, a),
            Err(LayoutError::SelfConnection { .. })
        ));
        assert!(matches!(
            b.connect_names("A", "Nowhere"),
            Err(LayoutError::UnknownRoom { .. })
        ));
    }

    #[test]
    fn rejects_bad_start_configuration() {
        let mut none = Building::builder();
        none.add_room("A", false).unwrap();
        assert_eq!(none.build().unwrap_err(), LayoutError::NoStartRoom);

        let mut two = Building::builder();
        two.add_room("A", true).unwrap();
        two.add_room("B", true).unwrap();
        assert!(matches!(
            two.build(),
            Err(LayoutError::MultipleStartRooms { .. })
        ));
    }

    #[test]
    fn rejects_duplicates_and_overflow() {
        let mut b = Building::builder();
        b.add_room("A", true).unwrap();
        assert!(matches!(
            b.add_room(" A ", false),
            Err(LayoutError::DuplicateRoom { .. })
        ));
        for i in 1..MAX_ROOMS {
            b.add_room(&format!("R{i}"), false).unwrap();
        }
        assert_eq!(
            b.add_room("one too many", false),
            Err(LayoutError::TooManyRooms { max: MAX_ROOMS })
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut b = Building::builder().room_capacity(0);
        b.add_room("A", true).unwrap();
        assert_eq!(b.build().unwrap_err(), LayoutError::ZeroCapacity);
    }

    #[test]
    fn lock_pair_exposes_rooms_by_role() {
        let building = line(2);
        {
            let mut pair = building.lock_pair(RoomId(1), RoomId(0));
            pair.from.add_guard(ActorId(7));
            pair.to.set_intruder(Some(ActorId(8)));
        }
        assert!(building.room(RoomId(1)).snapshot().contains_guard(ActorId(7)));
        assert_eq!(building.room(RoomId(0)).snapshot().intruder(), Some(ActorId(8)));
    }

    #[test]
    #[should_panic(expected = "two distinct rooms")]
    fn lock_pair_rejects_same_room() {
        let building = line(1);
        let _pair = building.lock_pair(RoomId(0), RoomId(0));
    }

    #[test]
    fn lookup_by_name_and_non_start_rooms() {
        let building = line(3);
        assert_eq!(building.room_by_name("R2").map(|r| r.id()), Some(RoomId(2)));
        assert!(building.room_by_name("R9").is_none());
        let others: Vec<_> = building.non_start_rooms().map(|r| r.id()).collect();
        assert_eq!(others, vec![RoomId(1), RoomId(2)]);
    }

    proptest! {
        #[test]
        fn lock_pair_roles_follow_arguments_not_lock_order(
            a in 0u16..MAX_ROOMS as u16,
            b in 0u16..MAX_ROOMS as u16,
        ) {
            prop_assume!(a != b);
            let building = line(MAX_ROOMS);
            for room in building.rooms() {
                room.lock().add_guard(ActorId(u32::from(room.id().0)));
            }
            let pair = building.lock_pair(RoomId(a), RoomId(b));
            prop_assert!(pair.from.contains_guard(ActorId(u32::from(a))));
            prop_assert!(pair.to.contains_guard(ActorId(u32::from(b))));
        }
    }
}
