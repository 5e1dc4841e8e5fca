//! State shared by every actor thread.

use std::sync::atomic::{AtomicBool, Ordering};

use heist_building::Building;

use crate::case_file::CaseFile;
use crate::config::{ConfigError, SimConfig};

/// Building, case file, and configuration, shared via `Arc` by every actor.
#[derive(Debug)]
pub struct World {
    building: Building,
    case_file: CaseFile,
    config: SimConfig,
    abort: AtomicBool,
}

impl World {
    /// Validate `config` and wrap `building` for sharing.
    pub fn new(building: Building, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            building,
            case_file: CaseFile::new(),
            config,
            abort: AtomicBool::new(false),
        })
    }

    /// The static room graph.
    pub fn building(&self) -> &Building {
        &self.building
    }

    /// The shared evidence ledger.
    pub fn case_file(&self) -> &CaseFile {
        &self.case_file
    }

    /// Run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ask every actor to stop at the top of its next turn.
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    /// Whether an abort has been requested.
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }
}

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<World>();
};
