//! Per-actor action record stream for the heist simulation.
//!
//! Every state-changing actor turn produces one [`ActionRecord`]. Actors
//! build the record contents ([`Draft`]) while holding the lock that makes
//! the snapshot consistent, then hand them to their [`ActorLog`] after the
//! lock is released. The log stamps the record and forwards it over a
//! bounded channel to the [`Recorder`] thread, which owns the
//! [`RecordWriter`] and does all I/O.
//!
//! # Architecture
//!
//! ```text
//! Actor threads (N)              Recorder thread
//!     |                               |
//!     | ActorLog::emit(draft)         |
//!     |   cap check (per actor)       |
//!     |   stamp + tracing::debug!     |
//!     |--[record_tx: bounded(cap)]--->| rx.recv()
//!     |                               | writer.write_record()
//!     |                               |   (failures counted, not fatal)
//!     |                               | writer.flush() on disconnect
//! ```
//!
//! Output failures are swallowed; the only fatal condition is an actor
//! exceeding its record cap ([`RecordError::CapExceeded`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod log;
pub mod record;
pub mod recorder;
pub mod writer;

pub use error::RecordError;
pub use log::ActorLog;
pub use record::{Action, ActionRecord, ActorKind, Draft};
pub use recorder::{Recorder, RecorderStats};
pub use writer::{CsvDirWriter, MemoryWriter, RecordWriter};

/// Default per-actor record cap.
pub const DEFAULT_RECORD_CAP: u64 = 100_000;
