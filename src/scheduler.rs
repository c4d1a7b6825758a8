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

//! The cycle scheduler.
//!
//! Every cycle, one line is generated per track and all tracks play their lines
//! concurrently. The cycle ends once every track has finished (join-all), and the
//! repeat settings decide whether another one starts.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use futures_util::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, span, warn, Instrument, Level, Span};

use crate::{
    clock::Clock,
    config::{error::ConfigError, Sequencer},
    output::{self, pan_for, Output, OutputError},
    playsync::CancelHandle,
    sequence::{Generator, SequenceLine},
};

mod track;

use self::track::Outcome;

/// The scheduler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// The scheduler hasn't been started.
    Idle,
    /// The given cycle is playing. Cycles are numbered from zero.
    Running { cycle: u64 },
    /// Every cycle has played.
    Done,
    /// The configuration was invalid, so nothing played.
    ConfigError,
    /// The run was cancelled or its clock failed.
    Stopped,
}

impl State {
    /// Returns true if the scheduler can't leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Done | State::ConfigError | State::Stopped)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Idle => write!(f, "idle"),
            State::Running { cycle } => write!(f, "running (cycle {})", cycle),
            State::Done => write!(f, "done"),
            State::ConfigError => write!(f, "configuration error"),
            State::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to set up channels: {0}")]
    Output(#[from] OutputError),

    #[error("sequencer has already been started (state: {0})")]
    AlreadyStarted(State),
}

/// Plays randomized lines on every track, cycle after cycle.
pub struct Scheduler<C: Clock> {
    /// The unvalidated configuration. Validation happens when the run starts.
    config: Sequencer,
    /// The output the track channels are created on.
    output: Arc<dyn Output>,
    /// Paces the notes.
    clock: C,
    /// The current state.
    state: watch::Sender<State>,
    /// Set by the first call to run. A scheduler only runs once.
    started: AtomicBool,
    /// Cancels the run.
    cancel_handle: CancelHandle,
    /// The logging span.
    span: Span,
}

impl<C: Clock> Scheduler<C> {
    /// Creates a new scheduler.
    pub fn new(config: Sequencer, output: Arc<dyn Output>, clock: C) -> Scheduler<C> {
        let (state, _) = watch::channel(State::Idle);
        Scheduler {
            config,
            output,
            clock,
            state,
            started: AtomicBool::new(false),
            cancel_handle: CancelHandle::new(),
            span: span!(Level::INFO, "sequencer"),
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Gets a handle that stops the run when cancelled.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel_handle.clone()
    }

    /// Validates the configuration, sets up the channels and plays cycles until the
    /// repeat settings are exhausted or the run is cancelled. Returns the terminal state.
    /// Dropping the returned future stops playback immediately.
    pub async fn run(&self) -> Result<State, SchedulerError> {
        self.run_cycles().instrument(self.span.clone()).await
    }

    async fn run_cycles(&self) -> Result<State, SchedulerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted(self.state()));
        }

        let settings = match self.config.validate() {
            Ok(settings) => settings,
            Err(e) => {
                error!(err = %e, "Invalid sequencer configuration, not starting.");
                self.transition(State::ConfigError);
                return Err(e.into());
            }
        };

        let mut channels =
            match output::setup_channels(self.output.as_ref(), settings.track_count()) {
                Ok(channels) => channels,
                Err(e) => {
                    error!(err = %e, "Unable to set up channels, not starting.");
                    self.transition(State::Stopped);
                    return Err(e.into());
                }
            };

        info!(
            output = %self.output,
            tracks = settings.track_count(),
            line_length = settings.line_length(),
            bpm = settings.bpm().value(),
            repeat = ?settings.repeat(),
            "Starting sequencer."
        );

        let mut generator = Generator::new(settings.seed());
        let mut muted = vec![false; settings.track_count()];
        let mut cycle: u64 = 0;

        loop {
            if self.cancel_handle.is_cancelled() {
                return Ok(self.stop(cycle));
            }
            self.transition(State::Running { cycle });

            let lines: Vec<SequenceLine> = settings
                .pools()
                .iter()
                .map(|pool| generator.generate(settings.line_length(), settings.bpm(), pool))
                .collect();

            for (index, channel) in channels.iter_mut().enumerate() {
                if muted[index] {
                    continue;
                }
                if let Err(e) = channel.set_pan(pan_for(index)) {
                    warn!(
                        track = settings.pools()[index].name(),
                        cycle,
                        err = %e,
                        "Unable to pan track, muting it for the rest of the run."
                    );
                    muted[index] = true;
                }
            }

            let plays = channels
                .iter_mut()
                .zip(lines.iter())
                .enumerate()
                .filter(|(index, _)| !muted[*index])
                .map(|(index, (channel, line))| {
                    let clock = &self.clock;
                    let cancel_handle = &self.cancel_handle;
                    async move {
                        let outcome =
                            track::play_line(index, &mut **channel, line, clock, cancel_handle)
                                .await;
                        (index, outcome)
                    }
                });
            let outcomes = join_all(plays).await;

            let mut stopping = false;
            for (index, outcome) in outcomes {
                let track = settings.pools()[index].name();
                match outcome {
                    Outcome::Finished => {}
                    Outcome::Cancelled => stopping = true,
                    Outcome::OutputFailed(e) => {
                        warn!(
                            track,
                            cycle,
                            err = %e,
                            "Track playback failed, muting it for the rest of the run."
                        );
                        muted[index] = true;
                    }
                    Outcome::ClockFailed(e) => {
                        error!(track, cycle, err = %e, "Clock failed, stopping sequencer.");
                        stopping = true;
                    }
                }
            }

            if stopping || self.cancel_handle.is_cancelled() {
                return Ok(self.stop(cycle));
            }
            if muted.iter().all(|muted| *muted) {
                warn!(cycle, "Every track has failed, stopping sequencer.");
                return Ok(self.stop(cycle));
            }

            cycle += 1;
            if !settings.repeat().should_continue(cycle) {
                info!(cycles = cycle, "Sequencer finished.");
                self.transition(State::Done);
                return Ok(State::Done);
            }
        }
    }

    fn stop(&self, cycle: u64) -> State {
        info!(cycle, "Sequencer stopped.");
        self.transition(State::Stopped);
        State::Stopped
    }

    fn transition(&self, state: State) {
        let previous = self.state.send_replace(state);
        debug!(from = %previous, to = %state, "State transition.");
    }
}

#[cfg(test)]
mod test {
    use std::{
        error::Error,
        sync::{atomic::AtomicUsize, Arc},
        time::Duration,
    };

    use tokio::time::Instant;

    use super::*;
    use crate::{
        clock::{ClockError, TokioClock},
        config::Track,
        output::mock::{self, Event},
        sounds::Sound,
    };

    fn tracks(count: usize) -> Vec<Track> {
        let pools = [
            Track::new("bass", &["bass-1.wav", "bass-2.wav", "bass-3.wav"]),
            Track::new("hi-hat", &["hat-1.wav", "hat-2.wav"]),
            Track::new("snare", &["snare-1.wav", "snare-2.wav"]),
        ];
        (0..count).map(|i| pools[i % pools.len()].clone()).collect()
    }

    fn scheduler(config: Sequencer, output: &mock::Output) -> Scheduler<TokioClock> {
        Scheduler::new(config, Arc::new(output.clone()), TokioClock)
    }

    fn pans(output: &mock::Output, channel: usize) -> Vec<f32> {
        output
            .records()
            .into_iter()
            .filter(|record| record.channel == channel)
            .filter_map(|record| match record.event {
                Event::Pan(pan) => Some(pan),
                _ => None,
            })
            .collect()
    }

    fn sound(event: &Event) -> Option<&Sound> {
        match event {
            Event::Trigger(sound) => Some(sound),
            _ => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let config = Sequencer::new(tracks(3), 4, 120.0, 1, false).with_track_count(3);
        let settings = config.validate()?;
        let scheduler = scheduler(config, &output);

        let start = Instant::now();
        assert_eq!(scheduler.state(), State::Idle);
        assert_eq!(scheduler.run().await?, State::Done);
        assert_eq!(scheduler.state(), State::Done);

        // Four notes, each followed by a beat, including the last.
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert_eq!(output.triggers().len(), 12);

        let first_trigger = output.channel_triggers(0)[0].at;
        for channel in 0..3 {
            let triggers = output.channel_triggers(channel);
            assert_eq!(triggers.len(), 4);
            assert_eq!(triggers[0].at, first_trigger);
            for pair in triggers.windows(2) {
                assert_eq!(pair[1].at - pair[0].at, Duration::from_millis(500));
            }

            let pool = &settings.pools()[channel];
            for trigger in triggers.iter() {
                let sound = sound(&trigger.event).expect("expected trigger");
                assert!(pool.contains(sound), "{} not in {}", sound, pool);
            }
        }

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_count() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let scheduler = scheduler(Sequencer::new(tracks(3), 2, 120.0, 5, false), &output);

        let start = Instant::now();
        assert_eq!(scheduler.run().await?, State::Done);
        assert_eq!(start.elapsed(), Duration::from_secs(5));

        // One pan assignment per channel per cycle.
        assert_eq!(pans(&output, 0), vec![-1.0; 5]);
        assert_eq!(pans(&output, 1), vec![1.0; 5]);
        assert_eq!(pans(&output, 2), vec![-1.0; 5]);
        assert_eq!(output.triggers().len(), 3 * 2 * 5);

        // Channels are only created once.
        assert_eq!(output.created().len(), 3);
        assert!(output.created().iter().all(|settings| !settings.auto_play));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_infinite_repeat() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let scheduler = Arc::new(scheduler(
            Sequencer::new(tracks(2), 1, 6000.0, 1, true),
            &output,
        ));
        let mut state = scheduler.subscribe();

        let runner = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run().await })
        };

        let reached = *state
            .wait_for(|state| matches!(state, State::Running { cycle } if *cycle >= 100))
            .await?;
        assert!(matches!(reached, State::Running { .. }));
        assert_ne!(scheduler.state(), State::Done);

        scheduler.cancel_handle().cancel();
        assert_eq!(runner.await??, State::Stopped);
        assert_eq!(scheduler.state(), State::Stopped);
        assert!(output.channel_triggers(0).len() >= 100);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pool_never_runs() {
        let output = mock::Output::get("mock-output");
        let config = Sequencer::new(
            vec![
                Track::new("bass", &["bass-1.wav"]),
                Track::new("hi-hat", &[]),
                Track::new("snare", &["snare-1.wav"]),
            ],
            4,
            120.0,
            5,
            false,
        );
        let scheduler = scheduler(config, &output);

        let result = scheduler.run().await;
        assert!(matches!(
            result,
            Err(SchedulerError::Config(ConfigError::EmptyPool(name))) if name == "hi-hat"
        ));
        assert_eq!(scheduler.state(), State::ConfigError);
        assert!(scheduler.state().is_terminal());
        assert!(output.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_twice() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let scheduler = scheduler(Sequencer::new(tracks(1), 1, 120.0, 1, false), &output);

        assert_eq!(scheduler.run().await?, State::Done);
        assert!(matches!(
            scheduler.run().await,
            Err(SchedulerError::AlreadyStarted(State::Done))
        ));
        assert_eq!(output.triggers().len(), 1);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_runs() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let scheduler = scheduler(Sequencer::new(tracks(2), 2, 120.0, 1, false), &output);

        let (first, second) = tokio::join!(scheduler.run(), scheduler.run());
        let (done, rejected) = if first.is_ok() {
            (first, second)
        } else {
            (second, first)
        };
        assert_eq!(done?, State::Done);
        assert!(matches!(rejected, Err(SchedulerError::AlreadyStarted(_))));

        // Only one set of channels was created and each note played once.
        assert_eq!(output.created().len(), 2);
        assert_eq!(output.triggers().len(), 4);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_pan_is_muted() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        output.fail_pan(1);
        let scheduler = scheduler(Sequencer::new(tracks(3), 4, 120.0, 2, false), &output);

        assert_eq!(scheduler.run().await?, State::Done);

        assert_eq!(output.channel_triggers(0).len(), 8);
        assert!(output.channel_triggers(1).is_empty());
        assert_eq!(output.channel_triggers(2).len(), 8);
        assert_eq!(pans(&output, 0), vec![-1.0; 2]);
        assert!(pans(&output, 1).is_empty());
        assert_eq!(pans(&output, 2), vec![-1.0; 2]);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_track_is_muted() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        output.fail_channel_after(1, 2);
        let scheduler = scheduler(Sequencer::new(tracks(3), 4, 120.0, 2, false), &output);

        assert_eq!(scheduler.run().await?, State::Done);

        assert_eq!(output.channel_triggers(0).len(), 8);
        assert_eq!(output.channel_triggers(1).len(), 2);
        assert_eq!(output.channel_triggers(2).len(), 8);

        // The failed track isn't panned or played after the cycle it failed in.
        assert_eq!(pans(&output, 0).len(), 2);
        assert_eq!(pans(&output, 1).len(), 1);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_track_failing_stops() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        output.fail_channel_after(0, 0);
        let scheduler = scheduler(Sequencer::new(tracks(1), 4, 120.0, 1, true), &output);

        assert_eq!(scheduler.run().await?, State::Stopped);
        assert!(output.triggers().is_empty());

        Ok(())
    }

    /// A clock that fails once it has been asked to wait a number of times.
    struct FailingClock {
        waits: AtomicUsize,
        fail_after: usize,
    }

    impl Clock for FailingClock {
        async fn wait(&self, duration: Duration) -> Result<(), ClockError> {
            if self.waits.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
                return Err(ClockError::Interrupted("host clock stalled".to_string()));
            }
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_failure_stops() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let clock = FailingClock {
            waits: AtomicUsize::new(0),
            fail_after: 2,
        };
        let scheduler = Scheduler::new(
            Sequencer::new(tracks(2), 4, 120.0, 3, false),
            Arc::new(output.clone()),
            clock,
        );

        assert_eq!(scheduler.run().await?, State::Stopped);
        assert!(scheduler.cancel_handle().is_cancelled());

        // Both tracks played their first note, then one of them hit the failing wait
        // on its second note and the other unwound without playing its second.
        assert_eq!(output.triggers().len(), 3);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let scheduler = Arc::new(scheduler(
            Sequencer::new(tracks(3), 4, 120.0, 1, true),
            &output,
        ));

        let runner = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run().await })
        };

        tokio::time::sleep(Duration::from_millis(1250)).await;
        scheduler.cancel_handle().cancel();
        assert_eq!(runner.await??, State::Stopped);

        // Notes at 0ms, 500ms and 1000ms played, nothing after the cancel.
        assert_eq!(output.triggers().len(), 9);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(output.triggers().len(), 9);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_run() -> Result<(), Box<dyn Error>> {
        let output = mock::Output::get("mock-output");
        let scheduler = scheduler(Sequencer::new(tracks(3), 4, 120.0, 1, true), &output);

        scheduler.cancel_handle().cancel();
        assert_eq!(scheduler.run().await?, State::Stopped);
        assert!(output.triggers().is_empty());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_playback() {
        let output = mock::Output::get("mock-output");
        let scheduler = scheduler(Sequencer::new(tracks(3), 4, 120.0, 1, true), &output);

        let result = tokio::time::timeout(Duration::from_millis(750), scheduler.run()).await;
        assert!(result.is_err());
        assert_eq!(output.triggers().len(), 6);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(output.triggers().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_runs_match() -> Result<(), Box<dyn Error>> {
        let first = mock::Output::get("mock-first");
        let second = mock::Output::get("mock-second");

        let config = Sequencer::new(tracks(3), 8, 240.0, 3, false).with_seed(99);
        scheduler(config.clone(), &first).run().await?;
        scheduler(config, &second).run().await?;

        let sounds = |output: &mock::Output| -> Vec<(usize, Event)> {
            output
                .triggers()
                .into_iter()
                .map(|record| (record.channel, record.event))
                .collect()
        };
        assert_eq!(sounds(&first), sounds(&second));

        Ok(())
    }
}
