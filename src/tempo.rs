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
use std::{fmt, time::Duration};

use crate::config::error::ConfigError;

/// A validated tempo in beats per minute. One beat is one note slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bpm {
    /// The beats per minute.
    value: f64,
    /// The duration of one beat at this tempo.
    interval: Duration,
}

impl Bpm {
    /// Creates a new tempo. The tempo must be positive and finite and must produce
    /// a representable, non-zero beat interval.
    pub fn new(value: f64) -> Result<Bpm, ConfigError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidBpm(value));
        }

        let interval = Duration::try_from_secs_f64(60.0 / value)
            .map_err(|_| ConfigError::InvalidBpm(value))?;
        if interval.is_zero() {
            return Err(ConfigError::InvalidBpm(value));
        }

        Ok(Bpm { value, interval })
    }

    /// Gets the beats per minute.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Gets the time between two consecutive notes.
    pub fn beat_interval(&self) -> Duration {
        self.interval
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm", self.value)
    }
}
