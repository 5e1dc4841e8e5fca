//! Core types for the heist simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: evidence kinds
//! and their byte-sized mask, the fixed intruder profiles, and the strongly
//! typed identifiers for rooms and actors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod evidence;
pub mod id;
pub mod profile;

pub use evidence::{Evidence, EvidenceMask, EvidenceMaskIter};
pub use id::{ActorId, RoomId, DEFAULT_INTRUDER_ID};
pub use profile::Profile;
