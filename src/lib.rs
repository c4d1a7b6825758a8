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

//! A randomized multi-track drum loop sequencer.
//!
//! Every cycle, each track gets a freshly generated line of notes sampled from its
//! sound pool, and all tracks play their lines together on a shared tempo grid.

pub mod clock;
pub mod config;
pub mod output;
pub mod playsync;
pub mod scheduler;
pub mod sequence;
pub mod sounds;
pub mod tempo;
pub mod util;
