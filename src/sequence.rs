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

//! Randomized note line generation.
//!
//! Each cycle, every track gets a fresh line of notes whose sounds are sampled
//! uniformly, with replacement, from that track's pool.

use std::{fmt, time::Duration};

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    sounds::{Sound, SoundPool},
    tempo::Bpm,
};

/// A single scheduled trigger of one sound.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    sound: Sound,
}

impl Note {
    /// Creates a new note.
    pub fn new(sound: Sound) -> Note {
        Note { sound }
    }

    /// Gets the sound this note triggers.
    pub fn sound(&self) -> &Sound {
        &self.sound
    }
}

/// An ordered, fixed-length line of notes for one track, along with the tempo
/// it was generated for.
#[derive(Clone, Debug)]
pub struct SequenceLine {
    notes: Vec<Note>,
    bpm: Bpm,
}

impl SequenceLine {
    /// Gets the notes in play order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Gets the tempo the line was generated for.
    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    /// Gets the spacing between consecutive triggers.
    pub fn beat_interval(&self) -> Duration {
        self.bpm.beat_interval()
    }

    /// Gets the number of notes in the line.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns true if the line has no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl fmt::Display for SequenceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sounds: Vec<&str> = self.notes.iter().map(|note| note.sound.name()).collect();
        write!(f, "[{}] @ {}", sounds.join(", "), self.bpm)
    }
}

/// Generates sequence lines. The generator owns its random source, so lines are
/// reproducible when it is seeded.
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    /// Creates a new generator. Without a seed, the generator is seeded from entropy.
    pub fn new(seed: Option<u64>) -> Generator {
        Generator {
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    /// Generates a line of exactly `line_length` notes drawn from the pool.
    pub fn generate(&mut self, line_length: usize, bpm: Bpm, pool: &SoundPool) -> SequenceLine {
        let notes = (0..line_length)
            .map(|_| Note::new(pool.choose(&mut self.rng).clone()))
            .collect();

        SequenceLine { notes, bpm }
    }
}
