use rand::rngs::StdRng;
use rand::SeedableRng;
use vistrain_core::{Answer, Direction, Quadrant, SessionPhase, SessionResult, TrainingMode};
use vistrain_experiment::{SessionEvent, TrainingConfig, TrainingSession};
use vistrain_input::InputSource;
use vistrain_timing::ManualTimer;

type Session = TrainingSession<ManualTimer, StdRng>;

fn session(mode: TrainingMode, seed: u64) -> (Session, ManualTimer) {
    let timer = ManualTimer::new();
    let s = TrainingSession::new(
        mode,
        TrainingConfig::default(),
        timer.clone(),
        StdRng::seed_from_u64(seed),
    );
    (s, timer)
}

fn flip(answer: Answer) -> Answer {
    match answer {
        Answer::Direction(Direction::Left) => Direction::Right.into(),
        Answer::Direction(Direction::Right) => Direction::Left.into(),
        Answer::Position(p) => Answer::Position((p + 1) % 4),
        Answer::Quadrant(q) => Quadrant::from_index((q.index() + 1) % 4)
            .map(Answer::from)
            .unwrap_or(answer),
        other => other,
    }
}

/// Answer every trial with `choose(expected, index)` until the session ends.
fn drive(
    s: &mut Session,
    timer: &ManualTimer,
    mut choose: impl FnMut(Answer, usize) -> Answer,
) -> SessionResult {
    s.start();
    for index in 0.. {
        if s.phase() == SessionPhase::Fixation {
            timer.advance_ms(1500);
            assert_eq!(s.update(), vec![SessionEvent::StimulusRevealed]);
        }
        let expected = s.expected_answer().expect("trial on screen");
        s.responder()
            .submit(InputSource::Keyboard, choose(expected, index));
        timer.advance_ms(250);
        assert!(matches!(s.update().as_slice(), [SessionEvent::Answered(_)]));

        timer.advance_ms(500);
        for event in s.update() {
            if let SessionEvent::Completed(result) = event {
                return result;
            }
        }
    }
    unreachable!()
}

#[test]
fn twenty_correct_orientation_trials() {
    let (mut s, timer) = session(TrainingMode::Orientation, 1);
    let result = drive(&mut s, &timer, |expected, _| expected);

    assert_eq!(result.total_trials, 20);
    assert_eq!(result.correct_trials, 20);
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(result.contrast_threshold, None);
    assert!((result.duration_seconds - 20.0 * 0.75).abs() < 1e-9);
    assert_eq!(s.phase(), SessionPhase::Complete);
    assert_eq!(s.tilt().tilt(), 3.0);
    assert!(s.trials().iter().all(|t| (t.reaction_time_ms - 250.0).abs() < 1e-9));
}

#[test]
fn contrast_threshold_is_mean_of_last_reversals() {
    let (mut s, timer) = session(TrainingMode::Contrast, 2);
    let result = drive(&mut s, &timer, |expected, i| {
        if i % 2 == 0 {
            expected
        } else {
            flip(expected)
        }
    });

    let reversals = s.staircase().reversals();
    assert!(reversals.len() >= 6);
    let tail = &reversals[reversals.len() - 6..];
    let mean = tail.iter().sum::<f64>() / 6.0;
    let threshold = result.contrast_threshold.expect("contrast mode reports a threshold");
    assert!((threshold - mean).abs() < 1e-12);
    assert_eq!(result.correct_trials, 10);
    assert_eq!(result.accuracy, 50.0);
}

#[test]
fn contrast_threshold_falls_back_to_current_value() {
    let (mut s, timer) = session(TrainingMode::Contrast, 3);
    let result = drive(&mut s, &timer, |expected, _| expected);
    assert!(s.staircase().reversals().is_empty());
    assert_eq!(result.contrast_threshold, Some(s.staircase().current()));
}

#[test]
fn contrast_patch_follows_the_staircase() {
    let (mut s, timer) = session(TrainingMode::Contrast, 4);
    s.start();
    let expected = s.expected_answer().unwrap();
    s.responder().submit(InputSource::Pointer, expected);
    s.update();
    timer.advance_ms(500);
    s.update();

    let Some(vistrain_core::TrialStimulus::Single(patch)) = s.visible_stimulus() else {
        panic!("contrast trials show a single patch");
    };
    assert!((patch.contrast - s.staircase().current()).abs() < 1e-12);
    assert_eq!(patch.orientation_deg.abs(), 15.0);
}

#[test]
fn crowding_and_peripheral_sessions_complete() {
    for (mode, seed) in [(TrainingMode::Crowding, 5), (TrainingMode::Peripheral, 6)] {
        let (mut s, timer) = session(mode, seed);
        let result = drive(&mut s, &timer, |expected, i| {
            if i < 5 {
                flip(expected)
            } else {
                expected
            }
        });
        assert_eq!(result.mode, mode);
        assert_eq!(result.total_trials, 20);
        assert_eq!(result.correct_trials, 15);
        assert_eq!(result.accuracy, 75.0);
    }
}

#[test]
fn pause_blocks_answers_and_freezes_the_clock() {
    let (mut s, timer) = session(TrainingMode::Orientation, 7);
    s.start();
    timer.advance_ms(200);
    assert_eq!(s.pause(), Some(SessionEvent::Paused));

    let expected = s.expected_answer().unwrap();
    s.responder().submit(InputSource::Voice, expected);
    timer.advance_ms(5_000);
    assert!(s.update().is_empty());
    assert!(s.trials().is_empty());

    s.resume();
    assert!(s.update().is_empty(), "answer given while paused is discarded");

    timer.advance_ms(100);
    s.responder().submit(InputSource::Keyboard, expected);
    let events = s.update();
    let [SessionEvent::Answered(trial)] = events.as_slice() else {
        panic!("expected one answer, got {events:?}");
    };
    assert!((trial.reaction_time_ms - 300.0).abs() < 1e-9);
}

/// Milliseconds until the first stimulus appears, to a 10 ms step.
fn reveal_after_ms(mode: TrainingMode, seed: u64) -> u64 {
    let (mut s, timer) = session(mode, seed);
    s.start();
    let mut elapsed = 0;
    while s.update().is_empty() {
        timer.advance_ms(10);
        elapsed += 10;
        assert!(elapsed <= 2_000, "stimulus never revealed");
    }
    elapsed
}

#[test]
fn pause_during_fixation_keeps_the_remaining_reveal_delay() {
    let reveal_at = reveal_after_ms(TrainingMode::Peripheral, 11);
    assert!(reveal_at > 400);

    let (mut s, timer) = session(TrainingMode::Peripheral, 11);
    s.start();
    assert_eq!(s.phase(), SessionPhase::Fixation);
    timer.advance_ms(400);
    assert!(s.update().is_empty());

    assert_eq!(s.pause(), Some(SessionEvent::Paused));
    timer.advance_ms(10_000);
    assert!(s.update().is_empty());
    assert!(s.visible_stimulus().is_none());

    assert_eq!(s.resume(), Some(SessionEvent::Resumed));
    assert!(s.update().is_empty(), "pause time does not count towards the delay");
    assert_eq!(s.phase(), SessionPhase::Fixation);

    timer.advance_ms(reveal_at - 400 - 10);
    assert!(s.update().is_empty());
    assert!(s.visible_stimulus().is_none());

    timer.advance_ms(10);
    assert_eq!(s.update(), vec![SessionEvent::StimulusRevealed]);
    assert!(s.visible_stimulus().is_some());
}

#[test]
fn reset_discards_history_and_adaptive_state() {
    let (mut s, timer) = session(TrainingMode::Orientation, 8);
    s.start();
    for _ in 0..3 {
        let wrong = flip(s.expected_answer().unwrap());
        s.responder().submit(InputSource::Keyboard, wrong);
        s.update();
        timer.advance_ms(500);
        s.update();
    }
    assert_eq!(s.trials().len(), 3);
    assert!(s.tilt().tilt() > 15.0);

    s.reset();
    assert_eq!(s.phase(), SessionPhase::Idle);
    assert!(s.trials().is_empty());
    assert_eq!(s.tilt().tilt(), 15.0);
    assert_eq!(s.staircase().current(), 0.5);
    assert!(s.visible_stimulus().is_none());
}

#[test]
fn first_input_channel_wins() {
    let (mut s, _) = session(TrainingMode::Orientation, 9);
    s.start();
    let expected = s.expected_answer().unwrap();
    s.responder().submit(InputSource::Pointer, flip(expected));
    s.responder().submit(InputSource::Voice, expected);
    let events = s.update();
    let [SessionEvent::Answered(trial)] = events.as_slice() else {
        panic!("expected one answer, got {events:?}");
    };
    assert!(!trial.correct);
    assert_eq!(s.trials().len(), 1);
}
