//! The simulation driver: registration, thread spawning, joining.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use heist_building::Building;
use heist_core::{ActorId, Evidence, Profile, RoomId};
use heist_record::{ActorKind, RecordError, RecordWriter, Recorder};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::actor::Actor;
use crate::config::SimConfig;
use crate::error::{RegisterError, SimError};
use crate::guard::{Guard, GuardActor};
use crate::intruder::{Intruder, IntruderActor};
use crate::report::{GuardSummary, RunReport};
use crate::world::World;

/// Spreads per-actor seeds apart so neighbouring spawn indices do not
/// produce correlated streams.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

type ActorHandle = (String, JoinHandle<Result<(), RecordError>>);

/// One run of the heist: register guards, then [`run`](Self::run).
///
/// The intruder is placed when the run starts, after every guard has been
/// registered.
pub struct Simulation {
    world: Arc<World>,
    // Each actor's log holds a sender into the recorder, so the actors must
    // drop before `recorder` joins its thread.
    guards: Vec<GuardActor>,
    recorder: Recorder,
    seed: u64,
    rng: ChaCha8Rng,
    spawned: u64,
    profile: Option<Profile>,
    intruder_room: Option<RoomId>,
}

impl Simulation {
    /// Validate `config`, share `building`, and start the recorder thread
    /// writing into `writer`.
    pub fn new(
        building: Building,
        config: SimConfig,
        writer: Box<dyn RecordWriter>,
    ) -> Result<Self, SimError> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let channel_capacity = config.record_channel_capacity;
        let world = Arc::new(World::new(building, config)?);
        let recorder = Recorder::spawn(writer, channel_capacity)?;
        info!(seed, rooms = world.building().len(), "simulation created");
        Ok(Self {
            world,
            guards: Vec::new(),
            recorder,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            spawned: 0,
            profile: None,
            intruder_room: None,
        })
    }

    /// Fix the intruder's profile instead of drawing one.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Fix the intruder's starting room instead of drawing one. The room
    /// must exist and must not be the start room, or [`run`](Self::run)
    /// fails with [`SimError::NoIntruderRoom`].
    pub fn with_intruder_room(mut self, room: RoomId) -> Self {
        self.intruder_room = Some(room);
        self
    }

    /// Shared state, for observers sampling rooms during a run.
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// The seed this run derives every RNG from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Guards registered so far.
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Add a guard to the start room with a random device and record its
    /// INIT.
    ///
    /// On error the guard is not added and the simulation is otherwise
    /// unchanged.
    pub fn register_guard(&mut self, name: &str, id: u32) -> Result<(), RegisterError> {
        let id = ActorId(id);
        match self.try_register(name, id) {
            Ok(()) => {
                info!(guard = %id, name, "guard registered");
                Ok(())
            }
            Err(e) => {
                warn!(guard = %id, name, error = %e, "guard registration refused");
                Err(e)
            }
        }
    }

    fn try_register(&mut self, name: &str, id: ActorId) -> Result<(), RegisterError> {
        if id == self.world.config().intruder_id {
            return Err(RegisterError::IntruderId { id });
        }
        if self.guards.iter().any(|a| a.guard().id() == id) {
            return Err(RegisterError::DuplicateId { id });
        }
        let device = Evidence::ALL[self.rng.random_range(0..Evidence::ALL.len())];
        let guard = Guard::enter(&self.world, name, id, device)?;
        let mut log = self
            .recorder
            .log(ActorKind::Guard, id, self.world.config().record_cap);
        let start = self.world.building().start();
        if let Err(e) = log.emit(guard.init_draft(start.name())) {
            start.lock().remove_guard(id);
            return Err(e.into());
        }
        let rng = self.actor_rng();
        self.guards
            .push(GuardActor::new(guard, Arc::clone(&self.world), rng, log));
        Ok(())
    }

    /// Place the intruder, run every actor on its own thread until all have
    /// exited, and summarise.
    ///
    /// If any actor hits its record cap the run is aborted: every other
    /// actor stops at its next turn and the cap error is returned once all
    /// threads have been joined.
    pub fn run(mut self) -> Result<RunReport, SimError> {
        let world = Arc::clone(&self.world);
        let config = world.config();
        let building = world.building();
        let actors = std::mem::take(&mut self.guards);

        let profile = match self.profile {
            Some(p) => p,
            None => Profile::ALL[self.rng.random_range(0..Profile::ALL.len())],
        };
        let room = match self.intruder_room {
            Some(r) => building
                .get(r)
                .filter(|room| !room.is_start())
                .map(|room| room.id())
                .ok_or(SimError::NoIntruderRoom)?,
            None => {
                let candidates: Vec<RoomId> = building.non_start_rooms().map(|r| r.id()).collect();
                *candidates
                    .choose(&mut self.rng)
                    .ok_or(SimError::NoIntruderRoom)?
            }
        };

        let intruder = Intruder::enter(&world, config.intruder_id, profile, room);
        let mut log = self
            .recorder
            .log(ActorKind::Intruder, config.intruder_id, config.record_cap);
        log.emit(intruder.init_draft(building.room(room).name()))?;
        let intruder_actor =
            IntruderActor::new(Arc::clone(&intruder), Arc::clone(&world), self.actor_rng(), log);

        info!(
            guards = actors.len(),
            intruder_room = building.room(room).name(),
            profile = %profile,
            "run starting"
        );

        let guards: Vec<Arc<Guard>> = actors.iter().map(|a| Arc::clone(a.guard())).collect();
        let mut failure: Option<SimError> = None;
        let mut handles: Vec<ActorHandle> = Vec::with_capacity(guards.len() + 1);

        match spawn_actor("heist-intruder".to_string(), intruder_actor) {
            Ok(h) => handles.push(h),
            Err(e) => {
                world.request_abort();
                failure = Some(e);
            }
        }
        for actor in actors {
            if failure.is_some() {
                break;
            }
            let name = format!("heist-guard-{}", actor.guard().id());
            match spawn_actor(name, actor) {
                Ok(h) => handles.push(h),
                Err(e) => {
                    world.request_abort();
                    failure = Some(e);
                }
            }
        }

        for (name, handle) in handles {
            let err = match handle.join() {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => SimError::Record(e),
                Err(_) => {
                    world.request_abort();
                    SimError::ActorPanicked { thread: name }
                }
            };
            failure.get_or_insert(err);
        }

        let records = self.recorder.finish();
        if let Some(e) = failure {
            warn!(error = %e, "run aborted");
            return Err(e);
        }
        let records = records?;

        let summaries = guards
            .iter()
            .map(|g| {
                let s = g.snapshot();
                GuardSummary {
                    name: g.name().to_string(),
                    id: g.id(),
                    exit_reason: s.exit_reason,
                    boredom: s.boredom,
                    stress: s.stress,
                }
            })
            .collect();
        let report = RunReport::new(summaries, world.case_file().snapshot(), profile, records);
        info!(
            outcome = %report.outcome,
            collected = %report.collected,
            written = report.records.written,
            "run finished"
        );
        Ok(report)
    }

    /// A private RNG for the next actor, derived from the run seed and the
    /// actor's spawn index.
    fn actor_rng(&mut self) -> ChaCha8Rng {
        self.spawned += 1;
        ChaCha8Rng::seed_from_u64(self.seed ^ self.spawned.wrapping_mul(SEED_STRIDE))
    }
}

fn spawn_actor<A: Actor + 'static>(name: String, actor: A) -> Result<ActorHandle, SimError> {
    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || actor.run())
        .map_err(|e| SimError::ThreadSpawnFailed {
            reason: format!("{name}: {e}"),
        })?;
    Ok((name, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::ExitReason;
    use crate::report::Outcome;
    use heist_record::MemoryWriter;
    use heist_test_utils::{museum, two_room_building, two_room_building_with_capacity};

    fn config(seed: u64) -> SimConfig {
        SimConfig {
            seed: Some(seed),
            ..SimConfig::default()
        }
    }

    #[test]
    fn duplicate_id_is_refused() {
        let mut sim =
            Simulation::new(two_room_building(), config(1), Box::new(MemoryWriter::new())).unwrap();
        sim.register_guard("Ada", 1).unwrap();
        assert_eq!(
            sim.register_guard("Eve", 1),
            Err(RegisterError::DuplicateId { id: ActorId(1) })
        );
        assert_eq!(sim.guard_count(), 1);
    }

    #[test]
    fn full_start_room_is_refused() {
        let mut sim = Simulation::new(
            two_room_building_with_capacity(2),
            config(1),
            Box::new(MemoryWriter::new()),
        )
        .unwrap();
        sim.register_guard("a", 1).unwrap();
        sim.register_guard("b", 2).unwrap();
        assert_eq!(
            sim.register_guard("c", 3),
            Err(RegisterError::StartRoomFull { capacity: 2 })
        );
        assert_eq!(sim.guard_count(), 2);
    }

    #[test]
    fn intruder_id_is_reserved() {
        let mut sim =
            Simulation::new(two_room_building(), config(1), Box::new(MemoryWriter::new())).unwrap();
        assert_eq!(
            sim.register_guard("Mallory", 68057),
            Err(RegisterError::IntruderId { id: ActorId(68057) })
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = SimConfig {
            stress_max: 0,
            ..SimConfig::default()
        };
        let err = Simulation::new(two_room_building(), bad, Box::new(MemoryWriter::new()))
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn intruder_only_run_finishes() {
        let sink = MemoryWriter::new();
        let sim = Simulation::new(museum(), config(9), Box::new(sink.clone())).unwrap();
        let report = sim.run().unwrap();
        assert!(report.guards.is_empty());
        assert_eq!(report.outcome, Outcome::IntruderWins);
        let intruder = sink.for_actor(ActorId(68057));
        assert_eq!(intruder.first().unwrap().action, heist_record::Action::Init);
        assert_eq!(intruder.last().unwrap().action, heist_record::Action::Exit);
    }

    #[test]
    fn start_room_cannot_hide_the_intruder() {
        let building = two_room_building();
        let start = building.start_id();
        let sim = Simulation::new(building, config(1), Box::new(MemoryWriter::new()))
            .unwrap()
            .with_intruder_room(start);
        assert_eq!(sim.run().err(), Some(SimError::NoIntruderRoom));
    }

    /// Run `f` on a helper thread; `None` if it has not returned in time.
    fn within<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> Option<T> {
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(f());
        });
        rx.recv_timeout(std::time::Duration::from_secs(10)).ok()
    }

    #[test]
    fn failed_run_with_guards_returns_promptly() {
        let result = within(|| {
            let building = two_room_building();
            let start = building.start_id();
            let mut sim = Simulation::new(building, config(1), Box::new(MemoryWriter::new()))
                .unwrap()
                .with_intruder_room(start);
            sim.register_guard("Ada", 1).unwrap();
            sim.run().err()
        });
        assert_eq!(result, Some(Some(SimError::NoIntruderRoom)), "run() hung");
    }

    #[test]
    fn dropping_an_unrun_simulation_releases_the_recorder() {
        let sink = MemoryWriter::new();
        let writer = sink.clone();
        let finished = within(move || {
            let mut sim =
                Simulation::new(two_room_building(), config(1), Box::new(writer)).unwrap();
            sim.register_guard("Ada", 1).unwrap();
            sim.register_guard("Bo", 2).unwrap();
            drop(sim);
        });
        assert!(finished.is_some(), "drop hung");
        // INIT records reached the writer before the recorder shut down.
        assert_eq!(sink.records().len(), 2);
    }

    #[test]
    fn record_cap_aborts_the_run() {
        let cfg = SimConfig {
            record_cap: 3,
            ..config(5)
        };
        let mut sim = Simulation::new(museum(), cfg, Box::new(MemoryWriter::new())).unwrap();
        sim.register_guard("Ada", 1).unwrap();
        let err = sim.run().unwrap_err();
        assert!(matches!(
            err,
            SimError::Record(RecordError::CapExceeded { cap: 3, .. })
        ));
    }

    #[test]
    fn every_guard_exits_with_a_reason() {
        let mut sim = Simulation::new(museum(), config(2024), Box::new(MemoryWriter::new())).unwrap();
        for id in 1..=4 {
            sim.register_guard(&format!("guard-{id}"), id).unwrap();
        }
        let report = sim.run().unwrap();
        assert_eq!(report.guards.len(), 4);
        for g in &report.guards {
            let reason = g.exit_reason.expect("guard still active after run");
            if reason == ExitReason::FoundClues {
                assert!(report.solved);
            }
        }
        assert_eq!(
            report.outcome == Outcome::GuardsWin,
            report.winners() > 0
        );
    }
}
