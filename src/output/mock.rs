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
use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::sounds::Sound;

use super::{ChannelSettings, OutputError};

/// Something a mock channel was asked to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The channel was created.
    Created(ChannelSettings),
    /// The channel played the given sound.
    Trigger(Sound),
    /// The channel was panned.
    Pan(f32),
}

/// A recorded mock event.
#[derive(Clone, Debug)]
pub struct Record {
    /// The channel index.
    pub channel: usize,
    /// When the event happened.
    pub at: Instant,
    /// The event.
    pub event: Event,
}

/// The most events a mock output keeps. Older events are dropped first.
pub const RECORD_LIMIT: usize = 4096;

type Records = Arc<Mutex<VecDeque<Record>>>;

fn push(records: &Records, record: Record) {
    let mut records = records.lock();
    if records.len() >= RECORD_LIMIT {
        records.pop_front();
    }
    records.push_back(record);
}

/// A mock output. Doesn't actually play anything, it logs and records the most
/// recent requests made to its channels.
#[derive(Clone)]
pub struct Output {
    name: String,
    records: Records,
    /// Channels that reject triggers once they have played the given number of notes.
    failures: Arc<Mutex<HashMap<usize, usize>>>,
    /// Channels that reject every pan request.
    failing_pans: Arc<Mutex<HashSet<usize>>>,
}

impl Output {
    /// Gets the given mock output.
    pub fn get(name: &str) -> Output {
        Output {
            name: name.to_string(),
            records: Arc::new(Mutex::new(VecDeque::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            failing_pans: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Makes the channel at the index reject every trigger after the given number
    /// of successful ones. Must be called before the channel is created.
    #[cfg(test)]
    pub fn fail_channel_after(&self, channel: usize, triggers: usize) {
        self.failures.lock().insert(channel, triggers);
    }

    /// Makes the channel at the index reject every pan request. Must be called
    /// before the channel is created.
    #[cfg(test)]
    pub fn fail_pan(&self, channel: usize) {
        self.failing_pans.lock().insert(channel);
    }

    /// Gets every recorded event.
    #[cfg(test)]
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().iter().cloned().collect()
    }

    /// Gets the settings of every created channel, in creation order.
    #[cfg(test)]
    pub fn created(&self) -> Vec<ChannelSettings> {
        self.records
            .lock()
            .iter()
            .filter_map(|record| match record.event {
                Event::Created(settings) => Some(settings),
                _ => None,
            })
            .collect()
    }

    /// Gets every recorded trigger.
    #[cfg(test)]
    pub fn triggers(&self) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|record| matches!(record.event, Event::Trigger(_)))
            .cloned()
            .collect()
    }

    /// Gets the recorded triggers for one channel.
    #[cfg(test)]
    pub fn channel_triggers(&self, channel: usize) -> Vec<Record> {
        self.triggers()
            .into_iter()
            .filter(|record| record.channel == channel)
            .collect()
    }
}

impl super::Output for Output {
    fn create_channel(
        &self,
        settings: ChannelSettings,
    ) -> Result<Box<dyn super::Channel>, OutputError> {
        push(
            &self.records,
            Record {
                channel: settings.index,
                at: Instant::now(),
                event: Event::Created(settings),
            },
        );

        Ok(Box::new(Channel {
            output: self.name.clone(),
            index: settings.index,
            sound: None,
            triggers: 0,
            fail_after: self.failures.lock().get(&settings.index).copied(),
            fail_pan: self.failing_pans.lock().contains(&settings.index),
            records: self.records.clone(),
        }))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

/// A channel on the mock output.
struct Channel {
    output: String,
    index: usize,
    sound: Option<Sound>,
    triggers: usize,
    fail_after: Option<usize>,
    fail_pan: bool,
    records: Records,
}

impl Channel {
    fn record(&self, event: Event) {
        push(
            &self.records,
            Record {
                channel: self.index,
                at: Instant::now(),
                event,
            },
        );
    }
}

impl super::Channel for Channel {
    fn set_sound(&mut self, sound: &Sound) -> Result<(), OutputError> {
        self.sound = Some(sound.clone());
        Ok(())
    }

    fn trigger(&mut self) -> Result<(), OutputError> {
        if self.fail_after.is_some_and(|limit| self.triggers >= limit) {
            return Err(OutputError::Rejected {
                channel: self.index,
                reason: "mock failure".to_string(),
            });
        }

        let sound = self.sound.clone().ok_or(OutputError::NoSound(self.index))?;
        info!(
            output = self.output,
            channel = self.index,
            sound = sound.name(),
            "Trigger."
        );
        self.triggers += 1;
        self.record(Event::Trigger(sound));
        Ok(())
    }

    fn set_pan(&mut self, pan: f32) -> Result<(), OutputError> {
        if self.fail_pan {
            return Err(OutputError::Rejected {
                channel: self.index,
                reason: "mock pan failure".to_string(),
            });
        }

        debug!(output = self.output, channel = self.index, pan, "Pan.");
        self.record(Event::Pan(pan));
        Ok(())
    }
}
