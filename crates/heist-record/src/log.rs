//! Per-actor record handle.

use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::Sender;
use heist_core::ActorId;
use tracing::debug;

use crate::error::RecordError;
use crate::record::{ActionRecord, ActorKind, Draft};

/// One actor's handle on the record stream.
///
/// Owned by the actor's thread. Counts emitted records and refuses to go
/// past the cap, which is how a runaway actor loop is detected.
pub struct ActorLog {
    kind: ActorKind,
    actor: ActorId,
    tx: Option<Sender<ActionRecord>>,
    emitted: u64,
    cap: u64,
}

impl ActorLog {
    /// A log that forwards to `tx`.
    pub fn new(kind: ActorKind, actor: ActorId, tx: Sender<ActionRecord>, cap: u64) -> Self {
        Self {
            kind,
            actor,
            tx: Some(tx),
            emitted: 0,
            cap,
        }
    }

    /// A log with nowhere to send. Still enforces the cap and traces.
    pub fn disconnected(kind: ActorKind, actor: ActorId, cap: u64) -> Self {
        Self {
            kind,
            actor,
            tx: None,
            emitted: 0,
            cap,
        }
    }

    /// Actor this log belongs to.
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Records emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Stamp `draft` and forward it to the recorder.
    ///
    /// Must not be called while holding a room, actor, or case-file lock:
    /// a full channel blocks.
    pub fn emit(&mut self, draft: Draft) -> Result<(), RecordError> {
        if self.emitted >= self.cap {
            return Err(RecordError::CapExceeded {
                actor: self.actor,
                cap: self.cap,
            });
        }
        let record = ActionRecord {
            timestamp_ms: now_ms(),
            kind: self.kind,
            actor: self.actor,
            room: draft.room,
            label: draft.label,
            boredom: draft.boredom,
            stress: draft.stress,
            action: draft.action,
            extra: draft.extra,
        };
        debug!(
            kind = %record.kind,
            actor = %record.actor,
            action = %record.action,
            room = %record.room,
            extra = %record.extra,
            "record"
        );
        if let Some(tx) = &self.tx {
            // Recorder gone means output is lost, which is not fatal.
            if tx.send(record).is_err() {
                self.tx = None;
            }
        }
        self.emitted += 1;
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
