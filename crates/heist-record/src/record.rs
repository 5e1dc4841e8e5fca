//! Record types and the CSV line encoding.

use std::fmt;

use heist_core::ActorId;

/// Which kind of actor produced a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// A patrol actor.
    Guard,
    /// The adversarial actor.
    Intruder,
}

impl ActorKind {
    /// Lowercase label written to the `type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            ActorKind::Guard => "guard",
            ActorKind::Intruder => "intruder",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened on the turn a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Actor placed in its first room.
    Init,
    /// Actor moved to another room (`extra` = destination).
    Move,
    /// Guard collected, or intruder dropped, a piece of evidence.
    Evidence,
    /// Guard swapped devices (`extra` = `old->new`).
    Swap,
    /// Actor left the simulation (`extra` = reason, guards only).
    Exit,
    /// Guard began retracing its path to base.
    ReturnStart,
    /// Guard arrived back at base.
    ReturnComplete,
    /// Intruder did nothing this turn.
    Idle,
}

impl Action {
    /// Uppercase label written to the `action` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Init => "INIT",
            Action::Move => "MOVE",
            Action::Evidence => "EVIDENCE",
            Action::Swap => "SWAP",
            Action::Exit => "EXIT",
            Action::ReturnStart => "RETURN_START",
            Action::ReturnComplete => "RETURN_COMPLETE",
            Action::Idle => "IDLE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The actor-supplied part of a record, captured under lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draft {
    /// What happened.
    pub action: Action,
    /// Room the actor was in (empty for room-less events such as a swap).
    pub room: String,
    /// Device (guard) or evidence (intruder) label; may be empty.
    pub label: String,
    /// Boredom at the time of the snapshot.
    pub boredom: u32,
    /// Stress at the time of the snapshot (always 0 for the intruder).
    pub stress: u32,
    /// Action-specific detail.
    pub extra: String,
}

impl Draft {
    /// A draft with empty label and extra.
    pub fn new(action: Action, room: impl Into<String>, boredom: u32, stress: u32) -> Self {
        Self {
            action,
            room: room.into(),
            label: String::new(),
            boredom,
            stress,
            extra: String::new(),
        }
    }

    /// Set the device/evidence label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the action detail.
    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// One line of an actor's record stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Guard or intruder.
    pub kind: ActorKind,
    /// Actor that produced the record.
    pub actor: ActorId,
    /// Room column.
    pub room: String,
    /// Device/evidence column.
    pub label: String,
    /// Boredom column.
    pub boredom: u32,
    /// Stress column.
    pub stress: u32,
    /// Action column.
    pub action: Action,
    /// Extra column.
    pub extra: String,
}

impl ActionRecord {
    /// Encode as one CSV line (with trailing newline) in column order
    /// `timestamp,type,id,room,device,boredom,stress,action,extra`.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}\n",
            self.timestamp_ms,
            self.kind,
            self.actor,
            csv_field(&self.room),
            csv_field(&self.label),
            self.boredom,
            self.stress,
            self.action,
            csv_field(&self.extra),
        )
    }
}

/// Quote a field if it contains a separator, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
