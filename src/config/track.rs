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
use serde::Deserialize;

use crate::sounds::{Sound, SoundPool};

use super::error::ConfigError;

/// A YAML representation of a track.
#[derive(Deserialize, Clone, Debug)]
pub struct Track {
    /// The name of the track.
    name: String,
    /// The sounds the track picks from.
    #[serde(default)]
    sounds: Vec<String>,
}

impl Track {
    /// Creates a new track configuration.
    pub fn new(name: &str, sounds: &[&str]) -> Track {
        Track {
            name: name.to_string(),
            sounds: sounds.iter().map(|sound| sound.to_string()).collect(),
        }
    }

    /// Gets the name of the track.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the sounds configured for the track.
    pub fn sounds(&self) -> &[String] {
        &self.sounds
    }

    /// Converts the track into a sound pool.
    pub fn to_sound_pool(&self) -> Result<SoundPool, ConfigError> {
        SoundPool::new(
            &self.name,
            self.sounds.iter().map(|sound| Sound::new(sound)).collect(),
        )
    }
}
