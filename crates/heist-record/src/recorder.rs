//! The recorder thread: drains the record channel into a [`RecordWriter`].

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use heist_core::ActorId;
use tracing::warn;

use crate::error::RecordError;
use crate::log::ActorLog;
use crate::record::{ActionRecord, ActorKind};
use crate::writer::RecordWriter;

/// Counters returned when the recorder shuts down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Records persisted successfully.
    pub written: u64,
    /// Records the writer failed to persist (swallowed).
    pub failed: u64,
}

/// Owns the recorder thread and the sending half of the record channel.
///
/// Hand out per-actor [`ActorLog`]s with [`log`](Self::log). Call
/// [`finish`](Self::finish) after every log has been dropped to flush the
/// writer and collect [`RecorderStats`].
pub struct Recorder {
    tx: Option<Sender<ActionRecord>>,
    thread: Option<JoinHandle<RecorderStats>>,
}

impl Recorder {
    /// Spawn the recorder thread.
    ///
    /// `channel_capacity` bounds the number of in-flight records; a full
    /// channel applies back-pressure to the emitting actor, which never
    /// holds a room or state lock while emitting.
    pub fn spawn(
        writer: Box<dyn RecordWriter>,
        channel_capacity: usize,
    ) -> Result<Self, RecordError> {
        let (tx, rx) = crossbeam_channel::bounded(channel_capacity.max(1));
        let thread = thread::Builder::new()
            .name("heist-recorder".into())
            .spawn(move || drain(rx, writer))
            .map_err(|e| RecordError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    /// A record handle for one actor.
    pub fn log(&self, kind: ActorKind, actor: ActorId, cap: u64) -> ActorLog {
        match &self.tx {
            Some(tx) => ActorLog::new(kind, actor, tx.clone(), cap),
            None => ActorLog::disconnected(kind, actor, cap),
        }
    }

    /// Close the channel, wait for the recorder to drain it, and return its
    /// counters.
    ///
    /// Records still held by live [`ActorLog`]s keep the channel open, so
    /// drop every log first.
    pub fn finish(mut self) -> Result<RecorderStats, RecordError> {
        self.tx.take();
        match self.thread.take() {
            Some(handle) => handle.join().map_err(|_| RecordError::RecorderPanicked),
            None => Ok(RecorderStats::default()),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn drain(rx: Receiver<ActionRecord>, mut writer: Box<dyn RecordWriter>) -> RecorderStats {
    let mut stats = RecorderStats::default();
    while let Ok(record) = rx.recv() {
        match writer.write_record(&record) {
            Ok(()) => stats.written += 1,
            Err(e) => {
                stats.failed += 1;
                warn!(actor = %record.actor, action = %record.action, error = %e, "record write failed");
            }
        }
    }
    if let Err(e) = writer.flush() {
        warn!(error = %e, "record flush failed");
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Action, Draft};
    use crate::writer::MemoryWriter;
    use std::io;

    struct FailingWriter;

    impl RecordWriter for FailingWriter {
        fn write_record(&mut self, _record: &ActionRecord) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn records_reach_writer_in_emit_order() {
        let sink = MemoryWriter::new();
        let recorder = Recorder::spawn(Box::new(sink.clone()), 4).unwrap();
        let mut log = recorder.log(ActorKind::Guard, ActorId(3), 100);
        for boredom in 0..10 {
            log.emit(Draft::new(Action::Move, "Cafe", boredom, 0)).unwrap();
        }
        drop(log);
        let stats = recorder.finish().unwrap();

        assert_eq!(stats, RecorderStats { written: 10, failed: 0 });
        let boredoms: Vec<_> = sink.records().iter().map(|r| r.boredom).collect();
        assert_eq!(boredoms, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn write_failures_are_counted_not_fatal() {
        let recorder = Recorder::spawn(Box::new(FailingWriter), 4).unwrap();
        let mut log = recorder.log(ActorKind::Intruder, ActorId(1), 100);
        log.emit(Draft::new(Action::Idle, "Cafe", 1, 0)).unwrap();
        log.emit(Draft::new(Action::Idle, "Cafe", 2, 0)).unwrap();
        drop(log);
        let stats = recorder.finish().unwrap();
        assert_eq!(stats, RecorderStats { written: 0, failed: 2 });
    }
}
