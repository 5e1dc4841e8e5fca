//! Intruder state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heist_core::{ActorId, Evidence, Profile, RoomId};
use heist_record::{Action, ActorLog, Draft, RecordError};
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use tracing::info;

use crate::actor::{Actor, TurnOutcome};
use crate::world::World;

#[derive(Debug)]
struct IntruderState {
    room: RoomId,
    boredom: u32,
    active: bool,
}

/// Copy of the intruder's state taken under its lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntruderSnapshot {
    /// Room the intruder is hiding in.
    pub room: RoomId,
    /// Consecutive turns without company.
    pub boredom: u32,
    /// Cleared when boredom saturates.
    pub active: bool,
}

/// The adversarial actor: fixed profile, lock-protected position and boredom.
#[derive(Debug)]
pub struct Intruder {
    id: ActorId,
    profile: Profile,
    state: Mutex<IntruderState>,
}

impl Intruder {
    /// Create the intruder and mark it present in `room`.
    pub fn enter(world: &World, id: ActorId, profile: Profile, room: RoomId) -> Arc<Self> {
        world.building().room(room).lock().set_intruder(Some(id));
        Arc::new(Self {
            id,
            profile,
            state: Mutex::new(IntruderState {
                room,
                boredom: 0,
                active: true,
            }),
        })
    }

    /// Numeric id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The evidence signature this intruder leaves behind.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Consistent copy of the mutable fields.
    pub fn snapshot(&self) -> IntruderSnapshot {
        let s = self.lock();
        IntruderSnapshot {
            room: s.room,
            boredom: s.boredom,
            active: s.active,
        }
    }

    pub(crate) fn init_draft(&self, room: &str) -> Draft {
        Draft::new(Action::Init, room, 0, 0).extra(self.profile.as_str())
    }

    fn lock(&self) -> MutexGuard<'_, IntruderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Thread-owned driver for the [`Intruder`].
pub struct IntruderActor {
    intruder: Arc<Intruder>,
    world: Arc<World>,
    rng: ChaCha8Rng,
    log: ActorLog,
}

impl IntruderActor {
    /// Bind the intruder to the world, its private RNG, and its record log.
    pub fn new(intruder: Arc<Intruder>, world: Arc<World>, rng: ChaCha8Rng, log: ActorLog) -> Self {
        Self {
            intruder,
            world,
            rng,
            log,
        }
    }

    /// The intruder this actor drives.
    pub fn intruder(&self) -> &Arc<Intruder> {
        &self.intruder
    }

    fn idle(&mut self, room: &str, boredom: u32) -> Result<(), RecordError> {
        self.log.emit(Draft::new(Action::Idle, room, boredom, 0))
    }

    /// OR one bit of the profile into the current room.
    fn drop_evidence(&mut self, room: RoomId, boredom: u32) -> Result<(), RecordError> {
        let kinds: SmallVec<[Evidence; 3]> = self.intruder.profile.signature().iter().collect();
        let Some(&kind) = kinds.choose(&mut self.rng) else {
            return Ok(());
        };
        let world = Arc::clone(&self.world);
        let room = world.building().room(room);
        room.lock().drop_evidence(kind);
        self.log.emit(
            Draft::new(Action::Evidence, room.name(), boredom, 0).label(kind.as_str()),
        )
    }

    /// Relocate to a random neighbour if neither room holds a guard.
    fn relocate(&mut self, from: RoomId) -> Result<(), RecordError> {
        let world = Arc::clone(&self.world);
        let building = world.building();
        let Some(&to) = building.room(from).neighbours().choose(&mut self.rng) else {
            return Ok(());
        };

        let mut pair = building.lock_pair(from, to);
        if pair.from.has_guards() || pair.to.has_guards() {
            return Ok(());
        }
        if pair.from.intruder() == Some(self.intruder.id) {
            pair.from.set_intruder(None);
        }
        pair.to.set_intruder(Some(self.intruder.id));
        let boredom = {
            let mut s = self.intruder.lock();
            s.room = to;
            s.boredom
        };
        drop(pair);
        self.log.emit(
            Draft::new(Action::Move, building.room(from).name(), boredom, 0)
                .extra(building.room(to).name()),
        )
    }
}

impl Actor for IntruderActor {
    fn world(&self) -> &World {
        &self.world
    }

    fn take_turn(&mut self) -> Result<TurnOutcome, RecordError> {
        let snap = self.intruder.snapshot();
        if !snap.active {
            return Ok(TurnOutcome::Exited);
        }

        let world = Arc::clone(&self.world);
        let max = world.config().boredom_max;
        let room = world.building().room(snap.room);
        let (guards_here, boredom) = {
            let mut here = room.lock();
            let guards_here = here.has_guards();
            let mut s = self.intruder.lock();
            if guards_here {
                s.boredom = 0;
            } else {
                s.boredom = (s.boredom + 1).min(max);
            }
            if s.boredom >= max {
                s.active = false;
                if here.intruder() == Some(self.intruder.id) {
                    here.set_intruder(None);
                }
                let boredom = s.boredom;
                drop(s);
                drop(here);
                self.log
                    .emit(Draft::new(Action::Exit, room.name(), boredom, 0).extra("bored"))?;
                info!(intruder = %self.intruder.id, room = room.name(), "intruder left");
                return Ok(TurnOutcome::Exited);
            }
            (guards_here, s.boredom)
        };

        let choice = if guards_here {
            self.rng.random_range(0..2)
        } else {
            self.rng.random_range(0..3)
        };
        match choice {
            0 => self.idle(room.name(), boredom)?,
            1 => self.drop_evidence(snap.room, boredom)?,
            _ => self.relocate(snap.room)?,
        }
        Ok(TurnOutcome::Continue)
    }
}
