//! Heist: a concurrent museum heist simulation.
//!
//! Guards and a single intruder each run on their own thread inside a shared
//! building. The intruder wanders and leaves evidence; guards patrol, pick up
//! the evidence their current device detects, carry it back to the security
//! office and pool it in a shared case file until the intruder's profile is
//! identified or they give up.
//!
//! This is the top-level facade crate that re-exports the public API from the
//! heist sub-crates and ships the `heist` command-line binary.
//!
//! # Quick start
//!
//! ```rust
//! use heist::prelude::*;
//!
//! let config = SimConfig {
//!     seed: Some(7),
//!     ..SimConfig::default()
//! };
//! let building = Layout::museum().build().unwrap();
//! let sink = MemoryWriter::new();
//! let mut sim = Simulation::new(building, config, Box::new(sink.clone())).unwrap();
//! sim.register_guard("Ada", 1).unwrap();
//! sim.register_guard("Bo", 2).unwrap();
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.guards.len(), 2);
//! assert!(!sink.for_actor(ActorId(1)).is_empty());
//! println!("{report}");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `heist-core` | IDs, evidence kinds and masks, intruder profiles |
//! | [`building`] | `heist-building` | Rooms, layouts, pair locking |
//! | [`record`] | `heist-record` | Action records, per-actor logs, writers |
//! | [`engine`] | `heist-engine` | Actors, case file, threaded simulation, report |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`heist-core`).
///
/// [`types::Evidence`] and [`types::EvidenceMask`] describe clues;
/// [`types::Profile`] names the intruder archetypes and their signatures.
pub use heist_core as types;

/// Rooms and layouts (`heist-building`).
///
/// Build a [`building::Building`] from a [`building::Layout`], or start from
/// the stock [`building::Layout::museum`].
pub use heist_building as building;

/// Action records and their sinks (`heist-record`).
pub use heist_record as record;

/// Actors and the threaded simulation (`heist-engine`).
///
/// [`engine::Simulation`] registers guards, runs every actor to completion
/// and returns an [`engine::RunReport`].
pub use heist_engine as engine;

/// Common imports for typical heist usage.
///
/// ```rust
/// use heist::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use heist_core::{ActorId, Evidence, EvidenceMask, Profile, RoomId};

    // Building
    pub use heist_building::{Building, Layout, LayoutError, Room};

    // Records
    pub use heist_record::{
        Action, ActionRecord, ActorKind, CsvDirWriter, MemoryWriter, RecordError, RecordWriter,
    };

    // Engine
    pub use heist_engine::{
        ConfigError, ExitReason, Outcome, RegisterError, RunReport, SimConfig, SimError,
        Simulation, World,
    };
}
