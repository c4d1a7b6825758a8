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
use tracing::debug;

use crate::{
    clock::{Clock, ClockError},
    output::{Channel, OutputError},
    playsync::CancelHandle,
    sequence::SequenceLine,
};

/// How a track's playback of one line ended.
#[derive(Debug)]
pub(super) enum Outcome {
    /// Every note was played.
    Finished,
    /// The run was cancelled mid-line.
    Cancelled,
    /// The channel rejected a request. The remaining notes were skipped.
    OutputFailed(OutputError),
    /// The clock failed. The run has been cancelled.
    ClockFailed(ClockError),
}

/// Plays one line on its channel. Each note is triggered and then followed by one
/// beat interval, including the last.
pub(super) async fn play_line<C: Clock>(
    index: usize,
    channel: &mut dyn Channel,
    line: &SequenceLine,
    clock: &C,
    cancel_handle: &CancelHandle,
) -> Outcome {
    let interval = line.beat_interval();

    for (position, note) in line.notes().iter().enumerate() {
        if cancel_handle.is_cancelled() {
            return Outcome::Cancelled;
        }

        if let Err(e) = channel
            .set_sound(note.sound())
            .and_then(|_| channel.trigger())
        {
            return Outcome::OutputFailed(e);
        }
        debug!(track = index, position, sound = note.sound().name(), "Played note.");

        tokio::select! {
            result = clock.wait(interval) => {
                if let Err(e) = result {
                    cancel_handle.cancel();
                    return Outcome::ClockFailed(e);
                }
            }
            _ = cancel_handle.cancelled() => return Outcome::Cancelled,
        }
    }

    Outcome::Finished
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::{
        clock::TokioClock,
        output::{mock, ChannelSettings, Output as _},
        sequence::Generator,
        sounds::{Sound, SoundPool},
        tempo::Bpm,
    };

    fn line(length: usize, bpm: f64) -> SequenceLine {
        let pool = SoundPool::new("bass", vec![Sound::new("bass-1.wav")]).expect("expected pool");
        Generator::new(Some(3)).generate(length, Bpm::new(bpm).expect("expected bpm"), &pool)
    }

    fn channel(output: &mock::Output) -> Box<dyn Channel> {
        output
            .create_channel(ChannelSettings {
                index: 0,
                pan: -1.0,
                auto_play: false,
            })
            .expect("expected channel")
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_line() {
        let output = mock::Output::get("mock-output");
        let mut channel = channel(&output);
        let cancel_handle = CancelHandle::new();

        let start = Instant::now();
        let outcome = play_line(
            0,
            channel.as_mut(),
            &line(3, 120.0),
            &TokioClock,
            &cancel_handle,
        )
        .await;
        assert!(matches!(outcome, Outcome::Finished));

        // The trailing beat after the final note is part of the line.
        assert_eq!(start.elapsed(), Duration::from_millis(1500));

        let triggers = output.triggers();
        assert_eq!(triggers.len(), 3);
        assert_eq!(triggers[0].at, start);
        assert_eq!(triggers[1].at - triggers[0].at, Duration::from_millis(500));
        assert_eq!(triggers[2].at - triggers[1].at, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_line_output_failure() {
        let output = mock::Output::get("mock-output");
        output.fail_channel_after(0, 1);
        let mut channel = channel(&output);
        let cancel_handle = CancelHandle::new();

        let start = Instant::now();
        let outcome = play_line(
            0,
            channel.as_mut(),
            &line(4, 120.0),
            &TokioClock,
            &cancel_handle,
        )
        .await;
        assert!(matches!(outcome, Outcome::OutputFailed(_)));

        // The remaining notes are skipped rather than retried.
        assert_eq!(output.triggers().len(), 1);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert!(!cancel_handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_line_cancelled() {
        let output = mock::Output::get("mock-output");
        let mut channel = channel(&output);
        let cancel_handle = CancelHandle::new();

        let canceller = {
            let cancel_handle = cancel_handle.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(750)).await;
                cancel_handle.cancel();
            })
        };

        let outcome = play_line(
            0,
            channel.as_mut(),
            &line(8, 120.0),
            &TokioClock,
            &cancel_handle,
        )
        .await;
        assert!(matches!(outcome, Outcome::Cancelled));
        assert_eq!(output.triggers().len(), 2);
        assert!(canceller.await.is_ok());
    }
}
