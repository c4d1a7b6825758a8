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

/// Typed error for config load/parse and validation failures so callers can
/// distinguish e.g. a missing file from an empty sound pool without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("sound pool for track '{0}' is empty")]
    EmptyPool(String),

    #[error("at least one track must be configured")]
    NoTracks,

    #[error("track count is {expected} but {actual} tracks are configured")]
    TrackCountMismatch { expected: usize, actual: usize },

    #[error("line length must be positive")]
    ZeroLineLength,

    #[error("bpm must be a positive number, got {0}")]
    InvalidBpm(f64),

    #[error("repeat count must be positive unless infinite repeat is enabled")]
    ZeroRepeatCount,
}
