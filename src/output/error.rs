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
/// Errors reported by an output or one of its channels.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("unknown output device '{0}'")]
    UnknownDevice(String),

    #[error("channel {0} has no sound to play")]
    NoSound(usize),

    #[error("channel {channel} rejected the request: {reason}")]
    Rejected { channel: usize, reason: String },
}
