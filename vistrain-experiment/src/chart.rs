//! Dichoptic optotype chart.
//!
//! The same seven lines are drawn once per eye; [`BinocularMode`] decides the
//! ink and which positions each eye can see. Progress is one optotype at a
//! time: a hit moves on, a run of misses throws the chart away and deals a
//! new one, and clearing the last line asks whether to step back.

use crate::config::ChartConfig;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use vistrain_core::{Answer, AnswerSet, Direction, DistanceDecision, Letter};
use vistrain_input::{ResponseAdapter, ResponseContext, ResponseSender};
use vistrain_timing::{Countdown, Timer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpec {
    pub level: u8,
    /// Glyph size relative to the base size.
    pub scale: f32,
    pub count: usize,
}

pub const CHART_LINES: [LineSpec; 7] = [
    LineSpec { level: 1, scale: 2.0, count: 3 },
    LineSpec { level: 2, scale: 1.6, count: 4 },
    LineSpec { level: 3, scale: 1.3, count: 5 },
    LineSpec { level: 4, scale: 1.0, count: 5 },
    LineSpec { level: 5, scale: 0.8, count: 6 },
    LineSpec { level: 6, scale: 0.6, count: 7 },
    LineSpec { level: 7, scale: 0.45, count: 8 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartVocabulary {
    Letters,
    /// Tumbling E.
    #[default]
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optotype {
    Letter(Letter),
    Direction(Direction),
}

impl Optotype {
    pub fn answer(self) -> Answer {
        match self {
            Optotype::Letter(l) => l.into(),
            Optotype::Direction(d) => d.into(),
        }
    }

    fn random<R: Rng>(rng: &mut R, vocabulary: ChartVocabulary) -> Self {
        match vocabulary {
            ChartVocabulary::Letters => {
                Optotype::Letter(Letter::ALL[rng.random_range(0..Letter::ALL.len())])
            }
            ChartVocabulary::Directional => {
                Optotype::Direction(Direction::ALL[rng.random_range(0..Direction::ALL.len())])
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub level: u8,
    pub scale: f32,
    pub optotypes: Vec<Optotype>,
}

impl ChartLine {
    fn generate<R: Rng>(rng: &mut R, spec: &LineSpec, vocabulary: ChartVocabulary) -> Self {
        Self {
            level: spec.level,
            scale: spec.scale,
            optotypes: (0..spec.count)
                .map(|_| Optotype::random(rng, vocabulary))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.optotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.optotypes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStyle {
    None,
    Square,
    /// Square cells plus diagonals.
    Slanted,
}

/// How the two eyes are dissociated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinocularMode {
    Duplicate,
    #[default]
    RedGreen,
    GridSquare,
    GridSlanted,
    Alternating,
}

impl BinocularMode {
    pub const ALL: [BinocularMode; 5] = [
        BinocularMode::Duplicate,
        BinocularMode::RedGreen,
        BinocularMode::GridSquare,
        BinocularMode::GridSlanted,
        BinocularMode::Alternating,
    ];

    /// RGBA ink for one eye's panel.
    pub fn ink(self, eye: Eye) -> [u8; 4] {
        match (self, eye) {
            (BinocularMode::Duplicate, _) => [0x00, 0x00, 0x00, 0xFF],
            (_, Eye::Left) => [0xEE, 0x00, 0x00, 0xFF],
            (_, Eye::Right) => [0x00, 0xBB, 0x00, 0xFF],
        }
    }

    pub fn grid(self) -> GridStyle {
        match self {
            BinocularMode::GridSquare | BinocularMode::Alternating => GridStyle::Square,
            BinocularMode::GridSlanted => GridStyle::Slanted,
            BinocularMode::Duplicate | BinocularMode::RedGreen => GridStyle::None,
        }
    }

    pub fn is_visible(self, eye: Eye, position: usize) -> bool {
        match self {
            BinocularMode::Alternating => match eye {
                Eye::Left => position % 2 == 0,
                Eye::Right => position % 2 == 1,
            },
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptotypeProgress {
    Past,
    Current,
    Upcoming,
}

/// Outcome of scoring one answer against the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTransition {
    NextOptotype,
    NextLine,
    /// Last optotype of the last line cleared.
    Completed,
    Missed { failures: u8 },
    Regenerated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    lines: Vec<ChartLine>,
    line_index: usize,
    optotype_index: usize,
    consecutive_failures: u8,
    complete: bool,
}

impl ChartState {
    pub fn generate<R: Rng>(rng: &mut R, vocabulary: ChartVocabulary) -> Self {
        Self {
            lines: CHART_LINES
                .iter()
                .map(|spec| ChartLine::generate(rng, spec, vocabulary))
                .collect(),
            line_index: 0,
            optotype_index: 0,
            consecutive_failures: 0,
            complete: false,
        }
    }

    pub fn lines(&self) -> &[ChartLine] {
        &self.lines
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn optotype_index(&self) -> usize {
        self.optotype_index
    }

    pub fn consecutive_failures(&self) -> u8 {
        self.consecutive_failures
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Optotype awaiting an answer; `None` once the chart is cleared.
    pub fn current(&self) -> Option<Optotype> {
        if self.complete {
            return None;
        }
        self.lines
            .get(self.line_index)?
            .optotypes
            .get(self.optotype_index)
            .copied()
    }

    pub fn progress_of(&self, line: usize, position: usize) -> OptotypeProgress {
        if self.complete || line < self.line_index {
            return OptotypeProgress::Past;
        }
        if line > self.line_index {
            return OptotypeProgress::Upcoming;
        }
        match position.cmp(&self.optotype_index) {
            std::cmp::Ordering::Less => OptotypeProgress::Past,
            std::cmp::Ordering::Equal => OptotypeProgress::Current,
            std::cmp::Ordering::Greater => OptotypeProgress::Upcoming,
        }
    }

    /// Score one answer. Returns `None` for a cleared chart.
    pub fn apply<R: Rng>(
        &mut self,
        correct: bool,
        failure_limit: u8,
        rng: &mut R,
        vocabulary: ChartVocabulary,
    ) -> Option<ChartTransition> {
        if self.complete {
            return None;
        }
        if !correct {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.consecutive_failures >= failure_limit {
                *self = Self::generate(rng, vocabulary);
                return Some(ChartTransition::Regenerated);
            }
            return Some(ChartTransition::Missed {
                failures: self.consecutive_failures,
            });
        }

        self.consecutive_failures = 0;
        let line_len = self.lines.get(self.line_index).map_or(0, ChartLine::len);
        if self.optotype_index + 1 < line_len {
            self.optotype_index += 1;
            Some(ChartTransition::NextOptotype)
        } else if self.line_index + 1 < self.lines.len() {
            self.line_index += 1;
            self.optotype_index = 0;
            Some(ChartTransition::NextLine)
        } else {
            self.complete = true;
            Some(ChartTransition::Completed)
        }
    }
}

/// The correct letter plus three distinct distractors, shuffled.
pub fn letter_choices<R: Rng>(rng: &mut R, correct: Letter) -> [Letter; 4] {
    let pool: Vec<Letter> = Letter::all().filter(|&l| l != correct).collect();
    let mut choices = [correct; 4];
    for (slot, &letter) in choices[1..].iter_mut().zip(pool.choose_multiple(rng, 3)) {
        *slot = letter;
    }
    choices.shuffle(rng);
    choices
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartStats {
    pub attempts: u32,
    pub correct: u32,
    pub charts_completed: u32,
    pub regenerations: u32,
}

impl ChartStats {
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempts as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStatus {
    InProgress,
    /// New chart dealt after a run of misses; input locked.
    Regenerating,
    DistancePrompt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    Answered {
        correct: bool,
        transition: ChartTransition,
    },
    ChartComplete,
    DistanceDecided(DistanceDecision),
}

pub struct ChartEngine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    config: ChartConfig,
    vocabulary: ChartVocabulary,
    mode: BinocularMode,
    timer: T,
    rng: R,
    state: ChartState,
    status: ChartStatus,
    lockout: Option<Countdown>,
    feedback: Option<(bool, Countdown)>,
    choices: Option<[Letter; 4]>,
    ipd_gap: f32,
    stats: ChartStats,
    adapter: ResponseAdapter,
}

impl<T, R> ChartEngine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: ChartConfig, timer: T, mut rng: R) -> Self {
        let vocabulary = config.vocabulary;
        let state = ChartState::generate(&mut rng, vocabulary);
        let (min, max) = config.ipd_gap_range;
        let mut engine = Self {
            vocabulary,
            mode: config.binocular_mode,
            ipd_gap: config.ipd_gap_px.clamp(min, max),
            config,
            timer,
            rng,
            state,
            status: ChartStatus::InProgress,
            lockout: None,
            feedback: None,
            choices: None,
            stats: ChartStats::default(),
            adapter: ResponseAdapter::new(),
        };
        engine.arm_current();
        engine
    }

    pub fn responder(&self) -> ResponseSender {
        self.adapter.sender()
    }

    pub fn context(&self) -> ResponseContext {
        match (self.status, self.vocabulary) {
            (ChartStatus::DistancePrompt, _) => ResponseContext::DistancePrompt,
            (_, ChartVocabulary::Letters) => ResponseContext::ChartLetters,
            (_, ChartVocabulary::Directional) => ResponseContext::ChartDirections,
        }
    }

    pub fn update(&mut self) -> Vec<ChartEvent> {
        let mut events = Vec::new();
        let now = self.timer.now();

        if self.feedback.as_ref().is_some_and(|(_, c)| c.is_expired(now)) {
            self.feedback = None;
        }
        if self.lockout.as_ref().is_some_and(|c| c.is_expired(now)) {
            self.lockout = None;
            if self.status == ChartStatus::Regenerating {
                self.status = ChartStatus::InProgress;
            }
            self.arm_current();
        }

        if let Some(candidate) = self.adapter.poll() {
            debug!(source = ?candidate.source, answer = ?candidate.answer, "chart answer accepted");
            self.handle_answer(candidate.answer, now, &mut events);
        }
        events
    }

    fn handle_answer(&mut self, answer: Answer, now: u64, events: &mut Vec<ChartEvent>) {
        match self.status {
            ChartStatus::DistancePrompt => {
                if let Answer::Distance(decision) = answer {
                    info!(?decision, "distance decided");
                    self.deal();
                    events.push(ChartEvent::DistanceDecided(decision));
                }
            }
            ChartStatus::InProgress => {
                let Some(expected) = self.state.current() else {
                    return;
                };
                let correct = answer == expected.answer();
                let Some(transition) = self.state.apply(
                    correct,
                    self.config.failure_limit,
                    &mut self.rng,
                    self.vocabulary,
                ) else {
                    return;
                };

                self.stats.attempts += 1;
                self.stats.correct += u32::from(correct);
                self.feedback = Some((
                    correct,
                    Countdown::start(now, Duration::from_millis(self.config.feedback_ms)),
                ));

                let lock_ms = match transition {
                    ChartTransition::Regenerated => {
                        self.stats.regenerations += 1;
                        self.status = ChartStatus::Regenerating;
                        self.choices = None;
                        info!(limit = self.config.failure_limit, "chart regenerated after misses");
                        self.config.regenerate_delay_ms
                    }
                    ChartTransition::Missed { failures } => {
                        debug!(failures, "optotype missed");
                        self.config.feedback_ms
                    }
                    ChartTransition::Completed => {
                        self.stats.charts_completed += 1;
                        self.status = ChartStatus::DistancePrompt;
                        self.choices = None;
                        self.config.advance_delay_ms
                    }
                    ChartTransition::NextOptotype | ChartTransition::NextLine => {
                        self.choices = None;
                        self.config.advance_delay_ms
                    }
                };
                self.lockout = Some(Countdown::start(now, Duration::from_millis(lock_ms)));

                events.push(ChartEvent::Answered { correct, transition });
                if transition == ChartTransition::Completed {
                    info!(
                        charts = self.stats.charts_completed,
                        accuracy = self.stats.accuracy(),
                        "chart complete"
                    );
                    events.push(ChartEvent::ChartComplete);
                }
            }
            ChartStatus::Regenerating => {}
        }
    }

    fn arm_current(&mut self) {
        if self.lockout.is_some() {
            self.adapter.disarm();
            return;
        }
        if self.status == ChartStatus::DistancePrompt {
            self.adapter.arm(AnswerSet::distance());
            return;
        }
        match self.state.current() {
            Some(Optotype::Letter(letter)) => {
                let choices = match self.choices {
                    Some(c) => c,
                    None => letter_choices(&mut self.rng, letter),
                };
                self.choices = Some(choices);
                self.adapter.arm(AnswerSet::letters(&choices));
            }
            Some(Optotype::Direction(_)) => self.adapter.arm(AnswerSet::directions()),
            None => self.adapter.disarm(),
        }
    }

    /// Fresh chart at the current settings, ready for input.
    fn deal(&mut self) {
        self.state = ChartState::generate(&mut self.rng, self.vocabulary);
        self.status = ChartStatus::InProgress;
        self.lockout = None;
        self.feedback = None;
        self.choices = None;
        self.arm_current();
    }

    /// Start over with a new chart and cleared statistics.
    pub fn reset(&mut self) {
        self.stats = ChartStats::default();
        self.adapter.reset();
        self.deal();
    }

    pub fn set_vocabulary(&mut self, vocabulary: ChartVocabulary) {
        if vocabulary != self.vocabulary {
            self.vocabulary = vocabulary;
            self.deal();
        }
    }

    pub fn set_mode(&mut self, mode: BinocularMode) {
        self.mode = mode;
    }

    /// Returns the applied gap after clamping.
    pub fn set_ipd_gap(&mut self, px: f32) -> f32 {
        let (min, max) = self.config.ipd_gap_range;
        self.ipd_gap = if px.is_finite() { px.clamp(min, max) } else { self.ipd_gap };
        self.ipd_gap
    }

    pub fn adjust_ipd_gap(&mut self, delta: f32) -> f32 {
        self.set_ipd_gap(self.ipd_gap + delta)
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn status(&self) -> ChartStatus {
        self.status
    }

    pub fn vocabulary(&self) -> ChartVocabulary {
        self.vocabulary
    }

    pub fn mode(&self) -> BinocularMode {
        self.mode
    }

    pub fn ipd_gap(&self) -> f32 {
        self.ipd_gap
    }

    pub fn stats(&self) -> &ChartStats {
        &self.stats
    }

    /// Letter buttons for the current optotype (letters vocabulary only).
    pub fn choices(&self) -> Option<&[Letter; 4]> {
        self.choices.as_ref()
    }

    pub fn feedback(&self) -> Option<bool> {
        self.feedback.as_ref().map(|(correct, _)| *correct)
    }

    /// One more miss would deal a new chart.
    pub fn failure_warning(&self) -> bool {
        self.status == ChartStatus::InProgress
            && self.state.consecutive_failures() + 1 == self.config.failure_limit
    }

    pub fn is_locked(&self) -> bool {
        self.lockout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn clear_line(state: &mut ChartState, rng: &mut StdRng) -> ChartTransition {
        let mut last = None;
        let line = state.line_index();
        while state.line_index() == line && !state.is_complete() {
            last = state.apply(true, 3, rng, ChartVocabulary::Directional);
        }
        last.unwrap()
    }

    #[test]
    fn lines_follow_the_level_table() {
        let state = ChartState::generate(&mut rng(), ChartVocabulary::Letters);
        let counts: Vec<usize> = state.lines().iter().map(ChartLine::len).collect();
        assert_eq!(counts, vec![3, 4, 5, 5, 6, 7, 8]);
        assert!(state
            .lines()
            .windows(2)
            .all(|w| w[0].scale > w[1].scale && w[0].level < w[1].level));
        assert!(state.lines()[0]
            .optotypes
            .iter()
            .all(|o| matches!(o, Optotype::Letter(_))));
    }

    #[test]
    fn hits_advance_through_lines_to_completion() {
        let mut r = rng();
        let mut state = ChartState::generate(&mut r, ChartVocabulary::Directional);
        assert_eq!(
            state.apply(true, 3, &mut r, ChartVocabulary::Directional),
            Some(ChartTransition::NextOptotype)
        );
        assert_eq!(clear_line(&mut state, &mut r), ChartTransition::NextLine);
        assert_eq!((state.line_index(), state.optotype_index()), (1, 0));

        for _ in 1..6 {
            clear_line(&mut state, &mut r);
        }
        assert_eq!(state.line_index(), 6);
        assert_eq!(clear_line(&mut state, &mut r), ChartTransition::Completed);
        assert!(state.is_complete());
        assert_eq!(state.line_index(), 6);
        assert_eq!(state.current(), None);
        assert_eq!(state.apply(true, 3, &mut r, ChartVocabulary::Directional), None);
    }

    #[test]
    fn third_consecutive_miss_regenerates() {
        let mut r = rng();
        let mut state = ChartState::generate(&mut r, ChartVocabulary::Directional);
        clear_line(&mut state, &mut r);
        state.apply(true, 3, &mut r, ChartVocabulary::Directional);
        let before = state.clone();

        assert_eq!(
            state.apply(false, 3, &mut r, ChartVocabulary::Directional),
            Some(ChartTransition::Missed { failures: 1 })
        );
        assert_eq!(state.optotype_index(), before.optotype_index());
        state.apply(false, 3, &mut r, ChartVocabulary::Directional);
        assert_eq!(
            state.apply(false, 3, &mut r, ChartVocabulary::Directional),
            Some(ChartTransition::Regenerated)
        );
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!((state.line_index(), state.optotype_index()), (0, 0));
        assert_ne!(state.lines(), before.lines());
    }

    #[test]
    fn a_hit_clears_the_failure_run() {
        let mut r = rng();
        let mut state = ChartState::generate(&mut r, ChartVocabulary::Directional);
        state.apply(false, 3, &mut r, ChartVocabulary::Directional);
        state.apply(false, 3, &mut r, ChartVocabulary::Directional);
        state.apply(true, 3, &mut r, ChartVocabulary::Directional);
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(
            state.apply(false, 3, &mut r, ChartVocabulary::Directional),
            Some(ChartTransition::Missed { failures: 1 })
        );
    }

    #[test]
    fn alternating_splits_positions_between_eyes() {
        let mode = BinocularMode::Alternating;
        assert!(mode.is_visible(Eye::Left, 0));
        assert!(!mode.is_visible(Eye::Right, 0));
        assert!(mode.is_visible(Eye::Right, 3));
        assert!(!mode.is_visible(Eye::Left, 3));
        for position in 0..8 {
            assert!(BinocularMode::GridSlanted.is_visible(Eye::Left, position));
            assert!(BinocularMode::GridSlanted.is_visible(Eye::Right, position));
        }
    }

    #[test]
    fn ink_and_grid_per_mode() {
        assert_eq!(
            BinocularMode::Duplicate.ink(Eye::Left),
            BinocularMode::Duplicate.ink(Eye::Right)
        );
        assert_eq!(BinocularMode::RedGreen.ink(Eye::Left), [0xEE, 0, 0, 0xFF]);
        assert_eq!(BinocularMode::GridSquare.ink(Eye::Right), [0, 0xBB, 0, 0xFF]);
        assert_eq!(BinocularMode::RedGreen.grid(), GridStyle::None);
        assert_eq!(BinocularMode::Alternating.grid(), GridStyle::Square);
        assert_eq!(BinocularMode::GridSlanted.grid(), GridStyle::Slanted);
    }

    #[test]
    fn progress_marks_past_current_upcoming() {
        let mut r = rng();
        let mut state = ChartState::generate(&mut r, ChartVocabulary::Directional);
        clear_line(&mut state, &mut r);
        state.apply(true, 3, &mut r, ChartVocabulary::Directional);
        assert_eq!(state.progress_of(0, 2), OptotypeProgress::Past);
        assert_eq!(state.progress_of(1, 0), OptotypeProgress::Past);
        assert_eq!(state.progress_of(1, 1), OptotypeProgress::Current);
        assert_eq!(state.progress_of(1, 2), OptotypeProgress::Upcoming);
        assert_eq!(state.progress_of(4, 0), OptotypeProgress::Upcoming);
    }

    #[test]
    fn letter_choices_include_the_answer_once() {
        let mut r = rng();
        for letter in Letter::all() {
            let choices = letter_choices(&mut r, letter);
            assert_eq!(choices.iter().filter(|&&c| c == letter).count(), 1);
            let mut sorted = choices.to_vec();
            sorted.sort_by_key(|l| l.as_char());
            sorted.dedup();
            assert_eq!(sorted.len(), 4);
        }
    }

    #[test]
    fn accuracy_of_no_attempts_is_zero() {
        assert_eq!(ChartStats::default().accuracy(), 0.0);
        let stats = ChartStats {
            attempts: 4,
            correct: 3,
            ..Default::default()
        };
        assert_eq!(stats.accuracy(), 75.0);
    }
}
