pub mod answer;
pub mod error;
pub mod phase;
pub mod staircase;
pub mod stimulus;
pub mod tilt;
pub mod trial;

pub use answer::{Answer, AnswerSet, Direction, DistanceDecision, Letter, Quadrant, TiltSide};
pub use error::ConfigError;
pub use phase::{PausedFrom, SessionPhase};
pub use staircase::{ContrastStaircase, StaircaseConfig, StepDirection};
pub use stimulus::{
    generate, generate_tilted_orientation, GaborField, PhaseAnimator, StimulusParameters,
    MID_GRAY,
    StimulusPreset,
};
pub use tilt::{TiltAdapter, TiltConfig};
pub use trial::{crowding_anchor, SessionResult, TrainingMode, Trial, TrialStimulus};
