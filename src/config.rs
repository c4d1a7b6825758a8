// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{path::Path, time::Duration};

use crate::{sounds::SoundPool, tempo::Bpm};

use self::error::ConfigError;

pub mod error;
mod sequencer;
mod track;

pub use sequencer::Sequencer;
pub use track::Track;

/// Loads the sequencer configuration from a YAML file. The configuration is not
/// validated until the sequencer starts.
pub fn load(path: &Path) -> Result<Sequencer, ConfigError> {
    Sequencer::deserialize(path)
}

/// How many cycles the sequencer plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play the given number of cycles.
    Count(u32),
    /// Play until stopped.
    Infinite,
}

impl Repeat {
    /// Returns true if another cycle should start after `completed` cycles have played.
    pub fn should_continue(&self, completed: u64) -> bool {
        match self {
            Repeat::Count(count) => completed < u64::from(*count),
            Repeat::Infinite => true,
        }
    }
}

/// Validated sequencer settings. One sound pool per track, in channel order.
#[derive(Clone, Debug)]
pub struct Settings {
    output: String,
    pools: Vec<SoundPool>,
    line_length: usize,
    bpm: Bpm,
    repeat: Repeat,
    seed: Option<u64>,
}

impl Settings {
    /// Gets the output device.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Gets the sound pools, one per track.
    pub fn pools(&self) -> &[SoundPool] {
        &self.pools
    }

    /// Gets the number of tracks.
    pub fn track_count(&self) -> usize {
        self.pools.len()
    }

    /// Gets the number of notes per track per cycle.
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    /// Gets the shared tempo.
    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    /// Gets the repeat behavior.
    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Gets the generation seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Gets the length of one cycle. Every note, including the last, is followed by
    /// one beat interval.
    pub fn cycle_duration(&self) -> Duration {
        self.bpm
            .beat_interval()
            .saturating_mul(u32::try_from(self.line_length).unwrap_or(u32::MAX))
    }

    /// Gets the length of the whole run, or None if it repeats forever.
    pub fn total_duration(&self) -> Option<Duration> {
        match self.repeat {
            Repeat::Count(count) => Some(self.cycle_duration().saturating_mul(count)),
            Repeat::Infinite => None,
        }
    }
}
