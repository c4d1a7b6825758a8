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
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::tempo::Bpm;

use super::{error::ConfigError, track::Track, Repeat, Settings};

const DEFAULT_OUTPUT: &str = "mock";
const DEFAULT_LINE_LENGTH: usize = 4;
const DEFAULT_BPM: f64 = 120.0;
const DEFAULT_REPEAT_COUNT: u32 = 5;

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_line_length() -> usize {
    DEFAULT_LINE_LENGTH
}

fn default_bpm() -> f64 {
    DEFAULT_BPM
}

fn default_repeat_count() -> u32 {
    DEFAULT_REPEAT_COUNT
}

/// A YAML representation of the sequencer configuration. This is the unvalidated
/// form; [Sequencer::validate] turns it into [Settings].
#[derive(Deserialize, Clone, Debug)]
pub struct Sequencer {
    /// The output device to play through.
    #[serde(default = "default_output")]
    output: String,
    /// The expected number of tracks. Must match the configured tracks when set.
    track_count: Option<usize>,
    /// The number of notes each track plays per cycle.
    #[serde(default = "default_line_length")]
    line_length: usize,
    /// The tempo shared by every track.
    #[serde(default = "default_bpm")]
    bpm: f64,
    /// The number of cycles to play when not repeating forever.
    #[serde(default = "default_repeat_count")]
    repeat_count: u32,
    /// Repeat cycles until stopped. Overrides the repeat count.
    #[serde(default)]
    infinite_repeat: bool,
    /// Seeds note generation for reproducible loops.
    seed: Option<u64>,
    /// The tracks to play, in channel order.
    #[serde(default)]
    tracks: Vec<Track>,
}

impl Sequencer {
    /// Creates a new sequencer configuration using the default output.
    pub fn new(
        tracks: Vec<Track>,
        line_length: usize,
        bpm: f64,
        repeat_count: u32,
        infinite_repeat: bool,
    ) -> Sequencer {
        Sequencer {
            output: default_output(),
            track_count: None,
            line_length,
            bpm,
            repeat_count,
            infinite_repeat,
            seed: None,
            tracks,
        }
    }

    /// Deserializes a file from the path into a sequencer configuration struct.
    pub fn deserialize(path: &Path) -> Result<Sequencer, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Sequencer>()?)
    }

    /// Sets the output device.
    pub fn with_output(mut self, output: &str) -> Sequencer {
        self.output = output.to_string();
        self
    }

    /// Sets the expected track count.
    pub fn with_track_count(mut self, track_count: usize) -> Sequencer {
        self.track_count = Some(track_count);
        self
    }

    /// Sets the generation seed.
    pub fn with_seed(mut self, seed: u64) -> Sequencer {
        self.seed = Some(seed);
        self
    }

    /// Gets the output device.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Gets the configured tracks.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        if self.tracks.is_empty() {
            return Err(ConfigError::NoTracks);
        }
        if let Some(expected) = self.track_count {
            if expected != self.tracks.len() {
                return Err(ConfigError::TrackCountMismatch {
                    expected,
                    actual: self.tracks.len(),
                });
            }
        }

        let pools = self
            .tracks
            .iter()
            .map(|track| track.to_sound_pool())
            .collect::<Result<Vec<_>, ConfigError>>()?;

        if self.line_length == 0 {
            return Err(ConfigError::ZeroLineLength);
        }

        let bpm = Bpm::new(self.bpm)?;

        let repeat = if self.infinite_repeat {
            Repeat::Infinite
        } else if self.repeat_count == 0 {
            return Err(ConfigError::ZeroRepeatCount);
        } else {
            Repeat::Count(self.repeat_count)
        };

        Ok(Settings {
            output: self.output.clone(),
            pools,
            line_length: self.line_length,
            bpm,
            repeat,
            seed: self.seed,
        })
    }
}
