//! Simulation configuration and validation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use heist_core::{ActorId, DEFAULT_INTRUDER_ID};
use heist_record::DEFAULT_RECORD_CAP;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `boredom_max` is zero.
    ZeroBoredomMax,
    /// `stress_max` is zero.
    ZeroStressMax,
    /// `bad_feeling_odds` is `Some(0)`.
    ZeroBadFeelingOdds,
    /// `record_cap` is zero; not even an INIT record would fit.
    ZeroRecordCap,
    /// `record_channel_capacity` is zero.
    ZeroChannelCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBoredomMax => write!(f, "boredom_max must be at least 1"),
            Self::ZeroStressMax => write!(f, "stress_max must be at least 1"),
            Self::ZeroBadFeelingOdds => {
                write!(f, "bad_feeling_odds must be at least 1 (use None to disable)")
            }
            Self::ZeroRecordCap => write!(f, "record_cap must be at least 1"),
            Self::ZeroChannelCapacity => {
                write!(f, "record_channel_capacity must be at least 1")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SimConfig ──────────────────────────────────────────────────────

/// Tunables for one simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Boredom at which an actor gives up. Default: 15.
    pub boredom_max: u32,
    /// Stress at which a guard is overwhelmed. Default: 15.
    pub stress_max: u32,
    /// A guard outside base starts a return on a 1-in-`n` roll each turn it
    /// finds nothing. `None` disables the roll. Default: `Some(25)`.
    pub bad_feeling_odds: Option<u32>,
    /// Run seed. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Sleep between an actor's turns. Default: zero.
    pub turn_pause: Duration,
    /// Records a single actor may emit before the run is aborted.
    /// Default: 100 000.
    pub record_cap: u64,
    /// Identifier of the intruder. Default: 68057.
    pub intruder_id: ActorId,
    /// Bound on in-flight records between actors and the recorder.
    /// Default: 1024.
    pub record_channel_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            boredom_max: 15,
            stress_max: 15,
            bad_feeling_odds: Some(25),
            seed: None,
            turn_pause: Duration::ZERO,
            record_cap: DEFAULT_RECORD_CAP,
            intruder_id: DEFAULT_INTRUDER_ID,
            record_channel_capacity: 1024,
        }
    }
}

impl SimConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boredom_max == 0 {
            return Err(ConfigError::ZeroBoredomMax);
        }
        if self.stress_max == 0 {
            return Err(ConfigError::ZeroStressMax);
        }
        if self.bad_feeling_odds == Some(0) {
            return Err(ConfigError::ZeroBadFeelingOdds);
        }
        if self.record_cap == 0 {
            return Err(ConfigError::ZeroRecordCap);
        }
        if self.record_channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        Ok(())
    }
}
