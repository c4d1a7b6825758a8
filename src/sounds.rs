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
use std::{fmt, sync::Arc};

use rand::Rng;

use crate::config::error::ConfigError;

/// A handle to a single sound clip. The clip itself is owned by the output; the
/// sequencer only passes the handle around, so cloning is cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sound {
    name: Arc<str>,
}

impl Sound {
    /// Creates a new sound handle.
    pub fn new(name: &str) -> Sound {
        Sound {
            name: Arc::from(name),
        }
    }

    /// Gets the name of the sound.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The interchangeable sounds a single track picks from. A pool is never empty.
#[derive(Clone, Debug)]
pub struct SoundPool {
    /// The name of the track this pool belongs to.
    name: String,
    /// The sounds in configuration order.
    sounds: Arc<[Sound]>,
}

impl SoundPool {
    /// Creates a new sound pool. Fails if no sounds are given.
    pub fn new(name: &str, sounds: Vec<Sound>) -> Result<SoundPool, ConfigError> {
        if sounds.is_empty() {
            return Err(ConfigError::EmptyPool(name.to_string()));
        }

        Ok(SoundPool {
            name: name.to_string(),
            sounds: sounds.into(),
        })
    }

    /// Gets the name of the pool.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the sounds in the pool.
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// Returns true if the sound belongs to this pool.
    pub fn contains(&self, sound: &Sound) -> bool {
        self.sounds.contains(sound)
    }

    /// Picks one sound uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Sound {
        &self.sounds[rng.gen_range(0..self.sounds.len())]
    }
}

impl fmt::Display for SoundPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} sounds)", self.name, self.sounds.len())
    }
}
