//! The per-thread actor loop.

use std::thread;

use heist_record::RecordError;

use crate::world::World;

/// Result of one actor turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The actor is still active.
    Continue,
    /// The actor has left the simulation; its loop should stop.
    Exited,
}

/// A self-driving participant that owns its thread.
///
/// Implementors only provide a single turn; [`run`](Actor::run) supplies
/// the loop, the pacing pause, and cooperative cancellation.
pub trait Actor: Send {
    /// The shared world this actor lives in.
    fn world(&self) -> &World;

    /// Advance by one turn.
    ///
    /// Acquires and releases every lock it needs within the call; returns
    /// [`TurnOutcome::Exited`] once the actor has left.
    fn take_turn(&mut self) -> Result<TurnOutcome, RecordError>;

    /// Take turns until the actor exits or the world is aborted.
    ///
    /// A record error raises the world's abort flag before it is returned,
    /// so every other actor stops at the top of its next turn.
    fn run(mut self) -> Result<(), RecordError>
    where
        Self: Sized,
    {
        let pause = self.world().config().turn_pause;
        while !self.world().is_aborted() {
            match self.take_turn() {
                Ok(TurnOutcome::Continue) => {}
                Ok(TurnOutcome::Exited) => return Ok(()),
                Err(e) => {
                    self.world().request_abort();
                    return Err(e);
                }
            }
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        Ok(())
    }
}
