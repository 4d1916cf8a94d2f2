use crate::answer::{Answer, Quadrant};
use crate::stimulus::StimulusParameters;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    /// Is the patch tilted left or right?
    #[default]
    Orientation,
    /// Left/right at a fixed tilt with staircase-driven contrast.
    Contrast,
    /// Find the odd patch out of four.
    Crowding,
    /// Report the quadrant of a patch seen while fixating centre.
    Peripheral,
}

impl TrainingMode {
    pub const ALL: [TrainingMode; 4] = [
        TrainingMode::Orientation,
        TrainingMode::Contrast,
        TrainingMode::Crowding,
        TrainingMode::Peripheral,
    ];
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainingMode::Orientation => "orientation",
            TrainingMode::Contrast => "contrast",
            TrainingMode::Crowding => "crowding",
            TrainingMode::Peripheral => "peripheral",
        };
        f.write_str(s)
    }
}

/// What was put on screen for one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum TrialStimulus {
    Single(StimulusParameters),
    Crowding {
        patches: [StimulusParameters; 4],
        target: u8,
    },
    Peripheral {
        patch: StimulusParameters,
        quadrant: Quadrant,
    },
}

impl TrialStimulus {
    /// Every patch with its centre as fractions of the viewport.
    pub fn placements(&self) -> Vec<(StimulusParameters, (f32, f32))> {
        match self {
            TrialStimulus::Single(p) => vec![(*p, (0.5, 0.5))],
            TrialStimulus::Crowding { patches, .. } => patches
                .iter()
                .enumerate()
                .map(|(i, p)| (*p, crowding_anchor(i)))
                .collect(),
            TrialStimulus::Peripheral { patch, quadrant } => vec![(*patch, quadrant.anchor())],
        }
    }
}

/// Row-major 2x2 arrangement around the centre.
pub fn crowding_anchor(index: usize) -> (f32, f32) {
    let col = (index % 2) as f32;
    let row = (index / 2) as f32;
    (0.4 + col * 0.2, 0.35 + row * 0.3)
}

/// Immutable record of one scored trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub mode: TrainingMode,
    pub stimulus: TrialStimulus,
    pub correct_answer: Answer,
    pub user_answer: Answer,
    pub correct: bool,
    pub reaction_time_ms: f64,
}

/// Summary handed to external storage when a session completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub mode: TrainingMode,
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_threshold: Option<f64>,
    pub duration_seconds: f64,
}

impl SessionResult {
    pub fn from_trials(
        mode: TrainingMode,
        total_trials: usize,
        trials: &[Trial],
        contrast_threshold: Option<f64>,
        duration_seconds: f64,
    ) -> Self {
        let correct_trials = trials.iter().filter(|t| t.correct).count();
        let accuracy = if total_trials == 0 {
            0.0
        } else {
            correct_trials as f64 / total_trials as f64 * 100.0
        };
        Self {
            mode,
            total_trials,
            correct_trials,
            accuracy,
            contrast_threshold,
            duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Direction;

    fn trial(correct: bool) -> Trial {
        Trial {
            mode: TrainingMode::Orientation,
            stimulus: TrialStimulus::Single(StimulusParameters::new(8)),
            correct_answer: Direction::Left.into(),
            user_answer: if correct {
                Direction::Left.into()
            } else {
                Direction::Right.into()
            },
            correct,
            reaction_time_ms: 420.0,
        }
    }

    #[test]
    fn accuracy_is_relative_to_total() {
        let trials = vec![trial(true), trial(false), trial(true), trial(true)];
        let r = SessionResult::from_trials(TrainingMode::Orientation, 4, &trials, None, 12.0);
        assert_eq!(r.correct_trials, 3);
        assert_eq!(r.accuracy, 75.0);
    }

    #[test]
    fn result_serialises_camel_case() {
        let r = SessionResult::from_trials(TrainingMode::Contrast, 2, &[trial(true)], Some(0.1), 3.0);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"contrastThreshold\":0.1"));
        assert!(json.contains("\"mode\":\"contrast\""));
        assert!(json.contains("\"totalTrials\":2"));
    }

    #[test]
    fn threshold_omitted_outside_contrast_mode() {
        let r = SessionResult::from_trials(TrainingMode::Crowding, 1, &[trial(true)], None, 1.0);
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("contrastThreshold"));
    }

    #[test]
    fn crowding_anchors_are_distinct() {
        let anchors: Vec<_> = (0..4).map(crowding_anchor).collect();
        for (i, a) in anchors.iter().enumerate() {
            for b in &anchors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
