//! Record sinks owned by the recorder thread.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use heist_core::ActorId;

use crate::record::ActionRecord;

/// Destination for action records.
///
/// Implementations only ever run on the recorder thread, so they need to be
/// `Send` but not `Sync`.
pub trait RecordWriter: Send {
    /// Persist one record.
    fn write_record(&mut self, record: &ActionRecord) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()>;
}

/// Writes each actor's records to `log_<id>.csv` under a directory.
///
/// Files are opened lazily in append mode on an actor's first record, so
/// repeated runs into the same directory extend the existing logs.
pub struct CsvDirWriter {
    dir: PathBuf,
    files: HashMap<ActorId, BufWriter<File>>,
}

impl CsvDirWriter {
    /// Create the directory if needed and return a writer into it.
    pub fn create(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            files: HashMap::new(),
        })
    }

    /// Path of the log file for `actor`.
    pub fn path_for(&self, actor: ActorId) -> PathBuf {
        self.dir.join(format!("log_{actor}.csv"))
    }

    fn file_for(&mut self, actor: ActorId) -> io::Result<&mut BufWriter<File>> {
        if !self.files.contains_key(&actor) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(actor))?;
            self.files.insert(actor, BufWriter::new(file));
        }
        self.files
            .get_mut(&actor)
            .ok_or_else(|| io::Error::other("log file vanished"))
    }
}

impl RecordWriter for CsvDirWriter {
    fn write_record(&mut self, record: &ActionRecord) -> io::Result<()> {
        let line = record.to_csv_line();
        self.file_for(record.actor)?.write_all(line.as_bytes())
    }

    /// Flushes every file even if some fail; the first error is returned.
    fn flush(&mut self) -> io::Result<()> {
        flush_all(self.files.values_mut())
    }
}

fn flush_all<'a, W: Write + 'a>(writers: impl IntoIterator<Item = &'a mut W>) -> io::Result<()> {
    let mut first = None;
    for w in writers {
        if let Err(e) = w.flush() {
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}

/// Keeps records in memory. Clones share the same buffer, so a test can
/// keep one handle and give the other to the recorder.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    records: Arc<Mutex<Vec<ActionRecord>>>,
}

impl MemoryWriter {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record written so far, in arrival order.
    pub fn records(&self) -> Vec<ActionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records for one actor, in arrival order.
    pub fn for_actor(&self, actor: ActorId) -> Vec<ActionRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.actor == actor)
            .collect()
    }
}

impl RecordWriter for MemoryWriter {
    fn write_record(&mut self, record: &ActionRecord) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
