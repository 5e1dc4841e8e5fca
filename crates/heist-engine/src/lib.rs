//! Guard and intruder state machines and the threaded simulation driver.
//!
//! A [`Simulation`] owns a shared [`World`] (building, [`CaseFile`],
//! [`SimConfig`]) and spawns one OS thread per actor. Every actor thread
//! loops on its own `take_turn` until it exits; the driver joins them all
//! and assembles a [`RunReport`].
//!
//! # Lock order
//!
//! Room locks (ascending id, via
//! [`Building::lock_pair`](heist_building::Building::lock_pair)) → actor
//! state lock → case-file lock. Random draws and record emission happen
//! with no lock held.
//!
//! # Example
//!
//! ```no_run
//! use heist_building::Layout;
//! use heist_engine::{SimConfig, Simulation};
//! use heist_record::MemoryWriter;
//!
//! let building = Layout::museum().build().unwrap();
//! let config = SimConfig { seed: Some(7), ..SimConfig::default() };
//! let mut sim = Simulation::new(building, config, Box::new(MemoryWriter::new())).unwrap();
//! sim.register_guard("Ada", 1).unwrap();
//! sim.register_guard("Bo", 2).unwrap();
//! let report = sim.run().unwrap();
//! println!("{report}");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actor;
pub mod case_file;
pub mod config;
pub mod error;
pub mod guard;
pub mod intruder;
pub mod path;
pub mod report;
pub mod sim;
pub mod world;

pub use actor::{Actor, TurnOutcome};
pub use case_file::{CaseFile, CaseSnapshot};
pub use config::{ConfigError, SimConfig};
pub use error::{RegisterError, SimError};
pub use guard::{ExitReason, Guard, GuardActor, GuardPhase, GuardSnapshot};
pub use intruder::{Intruder, IntruderActor, IntruderSnapshot};
pub use path::PathStack;
pub use report::{GuardSummary, Outcome, RunReport};
pub use sim::Simulation;
pub use world::World;
