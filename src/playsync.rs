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
use std::sync::Arc;

use tokio::sync::watch;

/// Represents the current cancel state.
#[derive(Clone, Copy, Debug, PartialEq)]
enum CancelState {
    Untouched,
    Cancelled,
}

/// A cancel handle is shared by the sequencer and everything that may need to stop it.
/// Every suspension in the sequencer races against it, so cancelling unwinds all tracks
/// without playing their pending notes.
#[derive(Clone)]
pub struct CancelHandle {
    /// The cancel state. Receivers are subscribed on demand.
    cancelled: Arc<watch::Sender<CancelState>>,
}

impl CancelHandle {
    /// Creates a new cancel handle.
    pub fn new() -> CancelHandle {
        let (cancelled, _) = watch::channel(CancelState::Untouched);
        CancelHandle {
            cancelled: Arc::new(cancelled),
        }
    }

    /// Returns true if the sequencer has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow() == CancelState::Cancelled
    }

    /// Waits until the handle is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.cancelled.subscribe();
        // The sender lives as long as self, so this only returns once cancelled.
        let _ = receiver
            .wait_for(|state| *state == CancelState::Cancelled)
            .await;
    }

    /// Cancel the sequencer.
    pub fn cancel(&self) {
        self.cancelled.send_if_modified(|state| {
            if *state == CancelState::Untouched {
                *state = CancelState::Cancelled;
                true
            } else {
                false
            }
        });
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        CancelHandle::new()
    }
}
