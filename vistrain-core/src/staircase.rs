use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaircaseConfig {
    pub initial_value: f64,
    pub initial_step: f64,
    pub min_step: f64,
    /// Lowest contrast the staircase will present.
    pub floor: f64,
    /// Step multiplier applied at each reversal.
    pub decay: f64,
    /// Reversals averaged for the threshold estimate.
    pub threshold_reversals: usize,
}

impl Default for StaircaseConfig {
    fn default() -> Self {
        Self {
            initial_value: 0.5,
            initial_step: 0.1,
            min_step: 0.02,
            floor: 0.01,
            decay: 0.8,
            threshold_reversals: 6,
        }
    }
}

impl StaircaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_within("staircase.floor", self.floor, 0.0, 1.0)?;
        ConfigError::check_within("staircase.initial_value", self.initial_value, self.floor, 1.0)?;
        ConfigError::check_positive("staircase.min_step", self.min_step)?;
        ConfigError::check_range("staircase.step", self.min_step, self.initial_step)?;
        ConfigError::check_within("staircase.decay", self.decay, f64::EPSILON, 1.0)?;
        ConfigError::check_positive("staircase.threshold_reversals", self.threshold_reversals as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    /// Contrast lowered after a correct answer.
    Down,
    /// Contrast raised after a miss.
    Up,
}

/// One-up/one-down contrast staircase with step decay on reversals.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastStaircase {
    config: StaircaseConfig,
    current: f64,
    step: f64,
    last_direction: Option<StepDirection>,
    reversals: Vec<f64>,
}

impl ContrastStaircase {
    pub fn new(config: StaircaseConfig) -> Self {
        Self {
            current: config.initial_value.clamp(config.floor, 1.0),
            step: config.initial_step,
            last_direction: None,
            reversals: Vec::new(),
            config,
        }
    }

    /// Apply one response and return the contrast for the next trial.
    pub fn update(&mut self, correct: bool) -> f64 {
        let direction = if correct {
            StepDirection::Down
        } else {
            StepDirection::Up
        };

        if self.last_direction.is_some_and(|last| last != direction) {
            self.reversals.push(self.current);
            self.step = (self.step * self.config.decay).max(self.config.min_step);
        }
        self.last_direction = Some(direction);

        self.current = match direction {
            StepDirection::Down => (self.current - self.step).max(self.config.floor),
            StepDirection::Up => (self.current + self.step).min(1.0),
        };
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn last_direction(&self) -> Option<StepDirection> {
        self.last_direction
    }

    pub fn reversals(&self) -> &[f64] {
        &self.reversals
    }

    pub fn reversal_count(&self) -> usize {
        self.reversals.len()
    }

    /// Mean of the last `n` reversal values, `None` until `n` exist.
    pub fn threshold_estimate_over(&self, n: usize) -> Option<f64> {
        if n == 0 || self.reversals.len() < n {
            return None;
        }
        let tail = &self.reversals[self.reversals.len() - n..];
        Some(tail.iter().sum::<f64>() / n as f64)
    }

    pub fn threshold_estimate(&self) -> Option<f64> {
        self.threshold_estimate_over(self.config.threshold_reversals)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Default for ContrastStaircase {
    fn default() -> Self {
        Self::new(StaircaseConfig::default())
    }
}
