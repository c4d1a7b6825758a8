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
use std::{future::Future, time::Duration};

/// Errors raised while suspended. The sequencer treats any of these as a shutdown.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("clock suspension interrupted: {0}")]
    Interrupted(String),
}

/// Paces note playback by suspending the current task.
pub trait Clock: Send + Sync {
    /// Suspends the current task for the given duration.
    fn wait(&self, duration: Duration) -> impl Future<Output = Result<(), ClockError>> + Send;
}

/// A clock backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn wait(&self, duration: Duration) -> impl Future<Output = Result<(), ClockError>> + Send {
        async move {
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }
}
