//! Guard state machine.
//!
//! A [`Guard`] is the shared, lock-protected record of one patrol actor.
//! A [`GuardActor`] is the thread-owned driver that advances it one turn at
//! a time. Each turn:
//!
//! 1. In base: clear the trail and read the case file. Solved → exit with
//!    [`ExitReason::FoundClues`]. Otherwise a guard that was returning
//!    completes the return and swaps devices.
//! 2. Under the room lock: presence update (intruder here → stress up,
//!    boredom reset; else boredom up), then the exit check.
//! 3. Returning guards retrace one hop and end the turn.
//! 4. Otherwise search for the device's evidence (a find starts a return
//!    unless already in base), or roll for a bad feeling.
//! 5. Guards that are not returning move to a random neighbour.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heist_core::{ActorId, Evidence, EvidenceMask, RoomId};
use heist_record::{Action, ActorLog, Draft, RecordError};
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use tracing::info;

use crate::actor::{Actor, TurnOutcome};
use crate::config::SimConfig;
use crate::error::RegisterError;
use crate::path::PathStack;
use crate::world::World;

// ── ExitReason / GuardPhase ────────────────────────────────────────

/// Why a guard left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// Stood in base while the case was solved.
    FoundClues,
    /// Boredom reached its maximum.
    Bored,
    /// Stress reached its maximum.
    Overwhelmed,
}

impl ExitReason {
    /// Label written to records and the report.
    pub const fn as_str(self) -> &'static str {
        match self {
            ExitReason::FoundClues => "clues",
            ExitReason::Bored => "bored",
            ExitReason::Overwhelmed => "overwhelmed",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse state of a guard, derived from its flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardPhase {
    /// Wandering the building outside base.
    Patrolling,
    /// Retracing its trail toward base.
    ReturningToBase,
    /// Standing in the start room.
    InBase,
    /// Gone for good.
    Exited(ExitReason),
}

// ── GuardState ─────────────────────────────────────────────────────

/// Mutable fields of a guard, guarded by [`Guard`]'s lock.
///
/// `room` and `in_base` must agree with the occupant sets of the building.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GuardState {
    /// Room the guard stands in.
    pub room: RoomId,
    /// Rooms walked out of since leaving base.
    pub path: PathStack,
    /// Evidence type the guard can currently detect.
    pub device: Evidence,
    /// Turns spent sharing a room with the intruder, clamped to the maximum.
    pub stress: u32,
    /// Consecutive turns without seeing the intruder, clamped to the maximum.
    pub boredom: u32,
    /// Cleared on exit.
    pub active: bool,
    /// Whether `room` is the start room.
    pub in_base: bool,
    /// Retracing `path` toward base.
    pub returning: bool,
    /// Set on exit.
    pub exit_reason: Option<ExitReason>,
}

impl GuardState {
    fn draft(&self, action: Action, room: &str) -> Draft {
        Draft::new(action, room, self.boredom, self.stress).label(self.device.as_str())
    }
}

/// Copy of a guard's state taken under its lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardSnapshot {
    /// Room the guard stands in.
    pub room: RoomId,
    /// Equipped device.
    pub device: Evidence,
    /// Stress counter.
    pub stress: u32,
    /// Boredom counter.
    pub boredom: u32,
    /// Length of the trail back to base.
    pub path_len: usize,
    /// Still taking turns.
    pub active: bool,
    /// Standing in the start room.
    pub in_base: bool,
    /// Retracing toward base.
    pub returning: bool,
    /// Why the guard left, once it has.
    pub exit_reason: Option<ExitReason>,
}

impl GuardSnapshot {
    /// The phase these flags describe.
    pub fn phase(&self) -> GuardPhase {
        match self.exit_reason {
            Some(reason) => GuardPhase::Exited(reason),
            None if self.returning => GuardPhase::ReturningToBase,
            None if self.in_base => GuardPhase::InBase,
            None => GuardPhase::Patrolling,
        }
    }
}

// ── Guard ──────────────────────────────────────────────────────────

/// One patrol actor's identity and lock-protected state.
#[derive(Debug)]
pub struct Guard {
    name: String,
    id: ActorId,
    state: Mutex<GuardState>,
}

impl Guard {
    /// Create a guard carrying `device` and add it to the start room.
    ///
    /// Fails with [`RegisterError::StartRoomFull`] if the start room has no
    /// free slot. Id uniqueness is the caller's concern.
    pub fn enter(
        world: &World,
        name: impl Into<String>,
        id: ActorId,
        device: Evidence,
    ) -> Result<Arc<Self>, RegisterError> {
        let start = world.building().start();
        {
            let mut room = start.lock();
            if !room.add_guard(id) {
                return Err(RegisterError::StartRoomFull {
                    capacity: room.capacity(),
                });
            }
        }
        Ok(Arc::new(Self {
            name: name.into(),
            id,
            state: Mutex::new(GuardState {
                room: start.id(),
                path: PathStack::new(),
                device,
                stress: 0,
                boredom: 0,
                active: true,
                in_base: true,
                returning: false,
                exit_reason: None,
            }),
        }))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Consistent copy of the mutable fields.
    pub fn snapshot(&self) -> GuardSnapshot {
        let s = self.lock();
        GuardSnapshot {
            room: s.room,
            device: s.device,
            stress: s.stress,
            boredom: s.boredom,
            path_len: s.path.len(),
            active: s.active,
            in_base: s.in_base,
            returning: s.returning,
            exit_reason: s.exit_reason,
        }
    }

    /// Send an active guard outside base back along its trail, as a bad
    /// feeling would. Returns whether the guard is now returning.
    pub fn force_return(&self) -> bool {
        let mut g = self.lock();
        if g.active && !g.in_base {
            g.returning = true;
        }
        g.returning
    }

    /// Run `f` on the mutable fields under the guard's lock.
    ///
    /// Lock order: a caller may hold room locks but never the case-file
    /// lock when calling this.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut GuardState) -> R) -> R {
        f(&mut self.lock())
    }

    pub(crate) fn init_draft(&self, room: &str) -> Draft {
        self.lock().draft(Action::Init, room).extra(self.name.as_str())
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Guard>();
};

// ── GuardActor ─────────────────────────────────────────────────────

/// Thread-owned driver for one [`Guard`].
pub struct GuardActor {
    guard: Arc<Guard>,
    world: Arc<World>,
    rng: ChaCha8Rng,
    log: ActorLog,
}

impl GuardActor {
    /// Bind a guard to the world, its private RNG, and its record log.
    pub fn new(guard: Arc<Guard>, world: Arc<World>, rng: ChaCha8Rng, log: ActorLog) -> Self {
        Self {
            guard,
            world,
            rng,
            log,
        }
    }

    /// The guard this actor drives.
    pub fn guard(&self) -> &Arc<Guard> {
        &self.guard
    }
}

impl Actor for GuardActor {
    fn world(&self) -> &World {
        &self.world
    }

    fn take_turn(&mut self) -> Result<TurnOutcome, RecordError> {
        let snap = self.guard.snapshot();
        if !snap.active {
            return Ok(TurnOutcome::Exited);
        }
        if snap.in_base && self.base_check()? == TurnOutcome::Exited {
            return Ok(TurnOutcome::Exited);
        }

        let bad_feeling = match self.world.config().bad_feeling_odds {
            Some(n) => self.rng.random_ratio(1, n),
            None => false,
        };

        let world = Arc::clone(&self.world);
        let config = world.config();
        let room = world.building().room(snap.room);
        let mut drafts: SmallVec<[Draft; 2]> = SmallVec::new();
        let retreat;
        {
            let mut here = room.lock();
            let mut g = self.guard.lock();
            if here.intruder().is_some() {
                g.stress = (g.stress + 1).min(config.stress_max);
                g.boredom = 0;
            } else {
                g.boredom = (g.boredom + 1).min(config.boredom_max);
            }

            if let Some(reason) = exit_check(&g, config) {
                here.remove_guard(self.guard.id);
                g.active = false;
                g.exit_reason = Some(reason);
                let draft = g.draft(Action::Exit, room.name()).extra(reason.as_str());
                drop(g);
                drop(here);
                self.log.emit(draft)?;
                info!(guard = %self.guard.id, name = %self.guard.name, reason = %reason, "guard exited");
                return Ok(TurnOutcome::Exited);
            }

            retreat = g.returning;
            if !retreat {
                let device = g.device;
                if here.take_evidence(device) {
                    world.case_file().record(device);
                    drafts.push(g.draft(Action::Evidence, room.name()));
                    if !g.in_base {
                        g.returning = true;
                        drafts.push(g.draft(Action::ReturnStart, room.name()).extra("evidence"));
                    }
                } else if bad_feeling && !g.in_base {
                    g.returning = true;
                    drafts.push(g.draft(Action::ReturnStart, room.name()).extra("bad_feeling"));
                }
            }
        }

        let started_return = drafts
            .iter()
            .any(|d| d.action == Action::ReturnStart);
        for draft in drafts {
            self.log.emit(draft)?;
        }

        if retreat {
            self.retreat()?;
        } else if !started_return {
            self.patrol()?;
        }
        Ok(TurnOutcome::Continue)
    }
}

impl GuardActor {
    /// Base-room handling at the top of a turn.
    fn base_check(&mut self) -> Result<TurnOutcome, RecordError> {
        let world = Arc::clone(&self.world);
        let base = world.building().start();

        if world.case_file().is_solved() {
            let drafts = {
                let mut here = base.lock();
                here.remove_guard(self.guard.id);
                self.guard.update(|g| {
                    g.path.clear();
                    let complete = g
                        .returning
                        .then(|| g.draft(Action::ReturnComplete, base.name()));
                    g.returning = false;
                    g.active = false;
                    g.exit_reason = Some(ExitReason::FoundClues);
                    let exit = g
                        .draft(Action::Exit, base.name())
                        .extra(ExitReason::FoundClues.as_str());
                    (complete, exit)
                })
            };
            if let Some(complete) = drafts.0 {
                self.log.emit(complete)?;
            }
            self.log.emit(drafts.1)?;
            info!(guard = %self.guard.id, name = %self.guard.name, reason = "clues", "guard exited");
            return Ok(TurnOutcome::Exited);
        }

        let complete = self.guard.update(|g| {
            g.path.clear();
            let draft = g
                .returning
                .then(|| g.draft(Action::ReturnComplete, base.name()));
            g.returning = false;
            draft
        });
        if let Some(draft) = complete {
            self.log.emit(draft)?;
            self.swap_device()?;
        }
        Ok(TurnOutcome::Continue)
    }

    /// Issue a device the case file has not collected yet.
    fn swap_device(&mut self) -> Result<(), RecordError> {
        let collected = self.world.case_file().collected();
        let current = self.guard.snapshot().device;
        let Some(next) = pick_device(&mut self.rng, Some(current), collected) else {
            return Ok(());
        };
        let draft = self.guard.update(|g| {
            g.device = next;
            g.draft(Action::Swap, "")
                .extra(format!("{}->{}", current.as_str(), next.as_str()))
        });
        self.log.emit(draft)
    }

    /// One hop back along the trail. A full destination defers the hop.
    fn retreat(&mut self) -> Result<(), RecordError> {
        let world = Arc::clone(&self.world);
        let building = world.building();
        let (from, popped) = self.guard.update(|g| (g.room, g.path.pop()));
        let Some(to) = popped else {
            self.guard.update(|g| g.returning = false);
            return Ok(());
        };

        let mut pair = building.lock_pair(from, to);
        if pair.to.is_full() {
            self.guard.update(|g| g.path.push(to));
            return Ok(());
        }
        pair.from.remove_guard(self.guard.id);
        pair.to.add_guard(self.guard.id);
        let draft = self.guard.update(|g| {
            g.room = to;
            g.in_base = to == building.start_id();
            g.draft(Action::Move, building.room(from).name())
                .extra(building.room(to).name())
        });
        drop(pair);
        self.log.emit(draft)
    }

    /// Step to a uniformly chosen neighbour unless it is full.
    fn patrol(&mut self) -> Result<(), RecordError> {
        let world = Arc::clone(&self.world);
        let building = world.building();
        let from = self.guard.snapshot().room;
        let Some(&to) = building.room(from).neighbours().choose(&mut self.rng) else {
            return Ok(());
        };

        let mut pair = building.lock_pair(from, to);
        if pair.to.is_full() {
            return Ok(());
        }
        pair.from.remove_guard(self.guard.id);
        pair.to.add_guard(self.guard.id);
        let draft = self.guard.update(|g| {
            g.path.push(from);
            g.room = to;
            g.in_base = to == building.start_id();
            if g.in_base {
                g.returning = false;
            }
            g.draft(Action::Move, building.room(from).name())
                .extra(building.room(to).name())
        });
        drop(pair);
        self.log.emit(draft)
    }
}

/// Stress wins over boredom when both are saturated.
fn exit_check(state: &GuardState, config: &SimConfig) -> Option<ExitReason> {
    if state.stress >= config.stress_max {
        Some(ExitReason::Overwhelmed)
    } else if state.boredom >= config.boredom_max {
        Some(ExitReason::Bored)
    } else {
        None
    }
}

/// Uniform choice among evidence types that are neither `current` nor
/// already collected. `None` when nothing qualifies.
pub(crate) fn pick_device<R: Rng + ?Sized>(
    rng: &mut R,
    current: Option<Evidence>,
    collected: EvidenceMask,
) -> Option<Evidence> {
    let candidates: SmallVec<[Evidence; 7]> = Evidence::ALL
        .into_iter()
        .filter(|&kind| Some(kind) != current && !collected.contains(kind))
        .collect();
    candidates.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use heist_core::Profile;
    use heist_test_utils::{line_building, room_id, two_room_building};
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn quiet_world(building: heist_building::Building) -> Arc<World> {
        let config = SimConfig {
            bad_feeling_odds: None,
            ..SimConfig::default()
        };
        Arc::new(World::new(building, config).unwrap())
    }

    fn actor(world: &Arc<World>, id: u32, device: Evidence) -> GuardActor {
        let guard = Guard::enter(world, format!("g{id}"), ActorId(id), device).unwrap();
        let log = ActorLog::disconnected(heist_record::ActorKind::Guard, ActorId(id), 10_000);
        GuardActor::new(guard, Arc::clone(world), ChaCha8Rng::seed_from_u64(id as u64), log)
    }

    #[test]
    fn enter_places_guard_in_base() {
        let world = quiet_world(two_room_building());
        let a = actor(&world, 1, Evidence::ToolMarks);
        let snap = a.guard().snapshot();
        assert_eq!(snap.phase(), GuardPhase::InBase);
        assert_eq!(snap.room, world.building().start_id());
        assert!(world.building().start().snapshot().contains_guard(ActorId(1)));
    }

    #[test]
    fn force_return_is_refused_in_base() {
        let world = quiet_world(two_room_building());
        let mut a = actor(&world, 1, Evidence::ToolMarks);
        assert!(!a.guard().force_return());
        assert_eq!(a.guard().snapshot().phase(), GuardPhase::InBase);

        a.take_turn().unwrap(); // base -> vault
        assert!(a.guard().force_return());
        assert_eq!(a.guard().snapshot().phase(), GuardPhase::ReturningToBase);
    }

    #[test]
    fn patrol_pushes_the_room_left() {
        let world = quiet_world(line_building(4));
        let mut a = actor(&world, 1, Evidence::ToolMarks);
        a.take_turn().unwrap();
        let snap = a.guard().snapshot();
        assert_eq!(snap.room, room_id(world.building(), "Room 1"));
        assert_eq!(snap.path_len, 1);
        assert_eq!(snap.phase(), GuardPhase::Patrolling);
        assert!(!world.building().start().snapshot().contains_guard(ActorId(1)));
    }

    #[test]
    fn evidence_in_base_does_not_start_a_return() {
        let world = quiet_world(two_room_building());
        world
            .building()
            .start()
            .lock()
            .drop_evidence(Evidence::LaserTrip);
        let mut a = actor(&world, 1, Evidence::LaserTrip);
        a.take_turn().unwrap();
        assert!(world.case_file().collected().contains(Evidence::LaserTrip));
        let snap = a.guard().snapshot();
        assert!(!snap.returning);
        // Still moved this turn.
        assert_eq!(snap.room, room_id(world.building(), "Vault"));
    }

    #[test]
    fn return_completes_with_device_swap() {
        let world = quiet_world(two_room_building());
        let vault = room_id(world.building(), "Vault");
        world.building().room(vault).lock().drop_evidence(Evidence::GlassVibration);
        let mut a = actor(&world, 1, Evidence::GlassVibration);

        a.take_turn().unwrap(); // base -> vault
        a.take_turn().unwrap(); // find, start return
        assert_eq!(a.guard().snapshot().phase(), GuardPhase::ReturningToBase);
        a.take_turn().unwrap(); // hop to base
        let snap = a.guard().snapshot();
        assert!(snap.in_base);
        assert_eq!(snap.path_len, 0);
        assert!(snap.returning);

        a.take_turn().unwrap(); // arrival handled, then patrol again
        let snap = a.guard().snapshot();
        assert!(!snap.returning);
        assert_ne!(snap.device, Evidence::GlassVibration);
        assert_eq!(snap.room, vault);
    }

    #[test]
    fn retreat_into_full_room_is_deferred() {
        let world = quiet_world(heist_test_utils::two_room_building_with_capacity(1));
        let base = world.building().start_id();
        let vault = room_id(world.building(), "Vault");
        let mut a = actor(&world, 1, Evidence::ToolMarks);
        a.take_turn().unwrap(); // base -> vault
        assert!(a.guard().force_return());
        // Base frees up after guard 1 left, so a second guard can enter.
        let _blocker = actor(&world, 2, Evidence::ToolMarks);

        a.take_turn().unwrap();
        let snap = a.guard().snapshot();
        assert_eq!(snap.room, vault);
        assert_eq!(snap.path_len, 1);
        assert!(world.building().room(vault).snapshot().contains_guard(ActorId(1)));
        assert!(!world.building().room(base).snapshot().contains_guard(ActorId(1)));
    }

    #[test]
    fn solved_case_in_base_exits_with_clues() {
        let world = quiet_world(two_room_building());
        for kind in Profile::Cutter.signature() {
            world.case_file().record(kind);
        }
        let mut a = actor(&world, 1, Evidence::ToolMarks);
        assert_eq!(a.take_turn().unwrap(), TurnOutcome::Exited);
        let snap = a.guard().snapshot();
        assert_eq!(snap.phase(), GuardPhase::Exited(ExitReason::FoundClues));
        assert!(!world.building().start().snapshot().contains_guard(ActorId(1)));
        assert_eq!(a.take_turn().unwrap(), TurnOutcome::Exited);
    }

    #[test]
    fn stress_beats_boredom() {
        let config = SimConfig {
            stress_max: 2,
            boredom_max: 2,
            ..SimConfig::default()
        };
        let mut state = GuardState {
            room: RoomId(0),
            path: PathStack::new(),
            device: Evidence::ToolMarks,
            stress: 2,
            boredom: 2,
            active: true,
            in_base: true,
            returning: false,
            exit_reason: None,
        };
        assert_eq!(exit_check(&state, &config), Some(ExitReason::Overwhelmed));
        state.stress = 1;
        assert_eq!(exit_check(&state, &config), Some(ExitReason::Bored));
        state.boredom = 1;
        assert_eq!(exit_check(&state, &config), None);
    }

    #[test]
    fn no_device_left_keeps_current() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let all_but_one = EvidenceMask::from_bits(0x7f & !Evidence::ToolMarks.bit());
        assert_eq!(
            pick_device(&mut rng, Some(Evidence::ToolMarks), all_but_one),
            None
        );
    }

    proptest! {
        #[test]
        fn picked_device_is_fresh(bits in 0u8..0x80, current in 0usize..7, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let collected = EvidenceMask::from_bits(bits);
            let current = Evidence::ALL[current];
            match pick_device(&mut rng, Some(current), collected) {
                Some(kind) => {
                    prop_assert_ne!(kind, current);
                    prop_assert!(!collected.contains(kind));
                }
                None => {
                    let remaining = Evidence::ALL
                        .into_iter()
                        .filter(|&k| k != current && !collected.contains(k))
                        .count();
                    prop_assert_eq!(remaining, 0);
                }
            }
        }
    }
}
