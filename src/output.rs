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

use tracing::debug;

use crate::sounds::Sound;

mod error;
pub mod mock;

pub use error::OutputError;

/// Playback settings applied when a channel is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSettings {
    /// The track index the channel is bound to.
    pub index: usize,
    /// The stereo position, -1.0 (left) to 1.0 (right).
    pub pan: f32,
    /// Whether the channel starts playing as soon as it is created.
    pub auto_play: bool,
}

/// A persistent playback handle for one track.
pub trait Channel: Send {
    /// Sets the sound the next trigger will play.
    fn set_sound(&mut self, sound: &Sound) -> Result<(), OutputError>;

    /// Plays the current sound immediately.
    fn trigger(&mut self) -> Result<(), OutputError>;

    /// Sets the stereo position, -1.0 (left) to 1.0 (right).
    fn set_pan(&mut self, pan: f32) -> Result<(), OutputError>;
}

/// An output that plays sounds through channels.
pub trait Output: fmt::Display + Send + Sync {
    /// Creates a new channel.
    fn create_channel(&self, settings: ChannelSettings) -> Result<Box<dyn Channel>, OutputError>;
}

/// Gets the stereo position of the channel at the given index. Channels alternate
/// between hard left and hard right, starting on the left.
pub fn pan_for(index: usize) -> f32 {
    if index % 2 == 0 {
        -1.0
    } else {
        1.0
    }
}

/// Creates one channel per track with auto play disabled and alternating pan.
pub fn setup_channels(
    output: &dyn Output,
    track_count: usize,
) -> Result<Vec<Box<dyn Channel>>, OutputError> {
    (0..track_count)
        .map(|index| {
            let settings = ChannelSettings {
                index,
                pan: pan_for(index),
                auto_play: false,
            };
            debug!(output = %output, index, pan = settings.pan, "Creating channel.");
            output.create_channel(settings)
        })
        .collect()
}

/// Gets an output with the given name.
pub fn get_output(name: &str) -> Result<Arc<dyn Output>, OutputError> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Output::get(name)));
    }

    Err(OutputError::UnknownDevice(name.to_string()))
}
