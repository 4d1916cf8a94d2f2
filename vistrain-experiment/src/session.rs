use crate::config::TrainingConfig;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};
use vistrain_core::{
    generate_tilted_orientation, Answer, AnswerSet, ContrastStaircase, Quadrant, SessionPhase,
    SessionResult, StimulusParameters, StimulusPreset, TiltAdapter, TrainingMode, Trial,
    TrialStimulus,
};
use vistrain_input::{ResponseAdapter, ResponseContext, ResponseSender};
use vistrain_timing::{Countdown, Stopwatch, Timer};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TrialStarted { index: usize },
    StimulusRevealed,
    Answered(Trial),
    Paused,
    Resumed,
    Completed(SessionResult),
}

/// Trial on screen but not yet scored.
#[derive(Debug, Clone)]
struct ActiveTrial {
    stimulus: TrialStimulus,
    correct_answer: Answer,
    valid: AnswerSet,
    reveal: Option<Countdown>,
    response_clock: Option<Stopwatch>,
}

/// Drives one training session: generates trials, opens the response
/// window, scores the first accepted answer, adapts difficulty and reports
/// a summary after the last trial.
///
/// Time only moves inside [`update`](Self::update), which should be called
/// once per frame.
pub struct TrainingSession<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    mode: TrainingMode,
    config: TrainingConfig,
    timer: T,
    rng: R,
    phase: SessionPhase,
    trials: Vec<Trial>,
    current: Option<ActiveTrial>,
    feedback: Option<Countdown>,
    last_outcome: Option<bool>,
    staircase: ContrastStaircase,
    tilt: TiltAdapter,
    adapter: ResponseAdapter,
    clock: Option<Stopwatch>,
    result: Option<SessionResult>,
}

impl<T, R> TrainingSession<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(mode: TrainingMode, config: TrainingConfig, timer: T, rng: R) -> Self {
        Self {
            mode,
            staircase: ContrastStaircase::new(config.staircase),
            tilt: TiltAdapter::new(config.tilt),
            config,
            timer,
            rng,
            phase: SessionPhase::Idle,
            trials: Vec::new(),
            current: None,
            feedback: None,
            last_outcome: None,
            adapter: ResponseAdapter::new(),
            clock: None,
            result: None,
        }
    }

    /// Handle for pointer, keyboard and voice producers.
    pub fn responder(&self) -> ResponseSender {
        self.adapter.sender()
    }

    pub fn context(&self) -> ResponseContext {
        match self.mode {
            TrainingMode::Orientation | TrainingMode::Contrast => ResponseContext::Tilt,
            TrainingMode::Crowding => ResponseContext::Crowding,
            TrainingMode::Peripheral => ResponseContext::Peripheral,
        }
    }

    /// Begin a fresh session. Ignored while one is running or paused.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        if self.phase.is_running() || self.phase.is_paused() {
            return Vec::new();
        }
        self.reset();
        self.clock = Some(Stopwatch::started(self.timer.now()));
        info!(mode = %self.mode, trials = self.config.total_trials, "training session started");
        vec![self.start_trial()]
    }

    pub fn update(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let now = self.timer.now();

        match self.phase {
            SessionPhase::Fixation => {
                let due = self
                    .current
                    .as_ref()
                    .and_then(|t| t.reveal.as_ref())
                    .map_or(true, |c| c.is_expired(now));
                if due {
                    self.reveal(now);
                    events.push(SessionEvent::StimulusRevealed);
                }
            }
            SessionPhase::Response => {
                if let Some(candidate) = self.adapter.poll() {
                    debug!(source = ?candidate.source, answer = ?candidate.answer, "answer accepted");
                    if let Some(trial) = self.score(candidate.answer, now) {
                        events.push(SessionEvent::Answered(trial));
                    }
                }
            }
            SessionPhase::Feedback => {
                if self.feedback.as_ref().map_or(true, |c| c.is_expired(now)) {
                    self.feedback = None;
                    if self.trials.len() >= self.config.total_trials {
                        events.push(SessionEvent::Completed(self.finish(now)));
                    } else {
                        events.push(self.start_trial());
                    }
                }
            }
            _ => {
                // Discard anything typed while idle, paused or complete.
                self.adapter.poll();
            }
        }

        events
    }

    pub fn pause(&mut self) -> Option<SessionEvent> {
        let paused = self.phase.paused()?;
        let now = self.timer.now();
        self.adapter.disarm();
        if let Some(trial) = &mut self.current {
            if let Some(reveal) = &mut trial.reveal {
                reveal.pause(now);
            }
            if let Some(clock) = &mut trial.response_clock {
                clock.pause(now);
            }
        }
        if let Some(feedback) = &mut self.feedback {
            feedback.pause(now);
        }
        if let Some(clock) = &mut self.clock {
            clock.pause(now);
        }
        self.phase = paused;
        info!(trial = self.trials.len() + 1, "session paused");
        Some(SessionEvent::Paused)
    }

    pub fn resume(&mut self) -> Option<SessionEvent> {
        let resumed = self.phase.resumed()?;
        let now = self.timer.now();
        if let Some(trial) = &mut self.current {
            if let Some(reveal) = &mut trial.reveal {
                reveal.resume(now);
            }
            if let Some(clock) = &mut trial.response_clock {
                clock.resume(now);
            }
            if resumed == SessionPhase::Response {
                self.adapter.arm(trial.valid.clone());
            }
        }
        if let Some(feedback) = &mut self.feedback {
            feedback.resume(now);
        }
        if let Some(clock) = &mut self.clock {
            clock.resume(now);
        }
        self.phase = resumed;
        info!("session resumed");
        Some(SessionEvent::Resumed)
    }

    /// Back to idle with adaptive state at its initial values.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.trials.clear();
        self.current = None;
        self.feedback = None;
        self.last_outcome = None;
        self.staircase.reset();
        self.tilt.reset();
        self.adapter.reset();
        self.clock = None;
        self.result = None;
    }

    fn start_trial(&mut self) -> SessionEvent {
        let index = self.trials.len();
        let now = self.timer.now();
        let (stimulus, correct_answer, valid, reveal) = self.generate_trial(now);
        debug!(index, mode = %self.mode, ?correct_answer, "trial generated");

        self.current = Some(ActiveTrial {
            stimulus,
            correct_answer,
            valid,
            reveal,
            response_clock: None,
        });
        self.last_outcome = None;
        self.phase = SessionPhase::Fixation;
        if self.mode != TrainingMode::Peripheral {
            self.reveal(now);
        }
        SessionEvent::TrialStarted { index }
    }

    fn generate_trial(&mut self, now: u64) -> (TrialStimulus, Answer, AnswerSet, Option<Countdown>) {
        let base = StimulusParameters::new(self.config.patch_size)
            .with_frequency(self.config.spatial_frequency);

        match self.mode {
            TrainingMode::Orientation => {
                let (orientation, side) = generate_tilted_orientation(&mut self.rng, self.tilt.tilt());
                let patch = base.with_orientation(orientation);
                (
                    TrialStimulus::Single(patch),
                    side.as_direction().into(),
                    AnswerSet::tilt(),
                    None,
                )
            }
            TrainingMode::Contrast => {
                let (orientation, side) =
                    generate_tilted_orientation(&mut self.rng, self.config.contrast_tilt_deg);
                let patch = base
                    .with_orientation(orientation)
                    .with_contrast(self.staircase.current());
                (
                    TrialStimulus::Single(patch),
                    side.as_direction().into(),
                    AnswerSet::tilt(),
                    None,
                )
            }
            TrainingMode::Crowding => {
                let reference = self.rng.random_range(-90.0..=90.0);
                let target = self.rng.random_range(0..4u8);
                let mut patches = [base.with_orientation(reference); 4];
                patches[target as usize] = base.with_orientation(reference + 90.0);
                (
                    TrialStimulus::Crowding { patches, target },
                    Answer::Position(target),
                    AnswerSet::positions(4),
                    None,
                )
            }
            TrainingMode::Peripheral => {
                let quadrant = Quadrant::ALL[self.rng.random_range(0..Quadrant::ALL.len())];
                let patch = StimulusPreset::LowFrequency
                    .parameters(self.config.patch_size)
                    .with_orientation(self.rng.random_range(-90.0..=90.0));
                let (min, max) = self.config.peripheral_delay_ms;
                let delay = self.rng.random_range(min..=max);
                (
                    TrialStimulus::Peripheral { patch, quadrant },
                    quadrant.into(),
                    AnswerSet::quadrants(),
                    Some(Countdown::start(now, Duration::from_millis(delay))),
                )
            }
        }
    }

    fn reveal(&mut self, now: u64) {
        if let Some(trial) = &mut self.current {
            trial.reveal = None;
            trial.response_clock = Some(Stopwatch::started(now));
            self.adapter.arm(trial.valid.clone());
            self.phase = SessionPhase::Response;
        }
    }

    fn score(&mut self, answer: Answer, now: u64) -> Option<Trial> {
        let active = self.current.take()?;
        let correct = answer == active.correct_answer;
        let reaction_time_ms = active
            .response_clock
            .map_or(0.0, |c| c.elapsed(now).as_secs_f64() * 1000.0);

        match self.mode {
            TrainingMode::Contrast => {
                self.staircase.update(correct);
            }
            TrainingMode::Orientation | TrainingMode::Crowding => {
                self.tilt.update(correct);
            }
            TrainingMode::Peripheral => {}
        }

        let trial = Trial {
            mode: self.mode,
            stimulus: active.stimulus,
            correct_answer: active.correct_answer,
            user_answer: answer,
            correct,
            reaction_time_ms,
        };
        debug!(
            index = self.trials.len(),
            correct,
            rt_ms = reaction_time_ms,
            tilt = self.tilt.tilt(),
            contrast = self.staircase.current(),
            "trial scored"
        );
        self.trials.push(trial.clone());
        self.last_outcome = Some(correct);
        self.feedback = Some(Countdown::start(
            now,
            Duration::from_millis(self.config.feedback_ms),
        ));
        self.phase = SessionPhase::Feedback;
        Some(trial)
    }

    fn finish(&mut self, now: u64) -> SessionResult {
        let duration = self.clock.as_ref().map_or(0.0, |c| c.elapsed(now).as_secs_f64());
        let threshold = (self.mode == TrainingMode::Contrast).then(|| {
            self.staircase
                .threshold_estimate()
                .unwrap_or_else(|| self.staircase.current())
        });
        let result = SessionResult::from_trials(
            self.mode,
            self.config.total_trials,
            &self.trials,
            threshold,
            duration,
        );
        info!(
            mode = %result.mode,
            correct = result.correct_trials,
            accuracy = result.accuracy,
            threshold = ?result.contrast_threshold,
            seconds = result.duration_seconds,
            "training session complete"
        );
        self.phase = SessionPhase::Complete;
        self.adapter.disarm();
        self.result = Some(result.clone());
        result
    }

    pub fn mode(&self) -> TrainingMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Stimulus to draw, once revealed.
    pub fn visible_stimulus(&self) -> Option<&TrialStimulus> {
        let trial = self.current.as_ref()?;
        trial.reveal.is_none().then_some(&trial.stimulus)
    }

    pub fn expected_answer(&self) -> Option<Answer> {
        self.current.as_ref().map(|t| t.correct_answer)
    }

    pub fn feedback(&self) -> Option<bool> {
        match self.phase {
            SessionPhase::Feedback | SessionPhase::Paused(_) => self.last_outcome,
            _ => None,
        }
    }

    /// 1-based trial number and total.
    pub fn progress(&self) -> (usize, usize) {
        let shown = (self.trials.len() + usize::from(self.current.is_some()))
            .min(self.config.total_trials);
        (shown, self.config.total_trials)
    }

    pub fn staircase(&self) -> &ContrastStaircase {
        &self.staircase
    }

    pub fn tilt(&self) -> &TiltAdapter {
        &self.tilt
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
