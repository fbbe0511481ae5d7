use std::path::PathBuf;

use crate::constants::{BATCH_FREQUENCY, CYCLE_FREQUENCY, STATE_FILE};

/// Tunables for a `Machine`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Instructions executed per second.
    pub cycle_frequency: u32,
    /// Times per second the instruction clock compares itself against wall time.
    pub batch_frequency: u32,
    /// File used by `save_state` and `load_state`.
    pub state_path: PathBuf,
}

impl Config {
    pub fn with_cycle_frequency(mut self, hz: u32) -> Self {
        self.cycle_frequency = hz.max(1);
        self
    }

    pub fn with_batch_frequency(mut self, hz: u32) -> Self {
        self.batch_frequency = hz.max(1);
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle_frequency: CYCLE_FREQUENCY,
            batch_frequency: BATCH_FREQUENCY,
            state_path: PathBuf::from(STATE_FILE),
        }
    }
}

/// Instructions per pacing batch; never zero so a batch always makes progress.
pub fn cycles_per_batch(cycle_frequency: u32, batch_frequency: u32) -> u32 {
    (cycle_frequency / batch_frequency.max(1)).max(1)
}
