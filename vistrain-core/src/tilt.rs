use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub initial: f64,
    pub min: f64,
    pub max: f64,
    pub decrease: f64,
    pub increase: f64,
    /// Consecutive correct answers needed before the margin shrinks.
    pub streak: u32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            initial: 15.0,
            min: 3.0,
            max: 30.0,
            decrease: 1.0,
            increase: 2.0,
            streak: 2,
        }
    }
}

impl TiltConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("tilt.min", self.min)?;
        ConfigError::check_range("tilt", self.min, self.max)?;
        ConfigError::check_within("tilt.initial", self.initial, self.min, self.max)?;
        ConfigError::check_positive("tilt.decrease", self.decrease)?;
        ConfigError::check_positive("tilt.increase", self.increase)?;
        ConfigError::check_positive("tilt.streak", self.streak as f64)
    }
}

/// Orientation margin that narrows on correct streaks and widens on misses.
///
/// Growth is larger than shrinkage so a lucky run cannot push the task far
/// past the subject's threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltAdapter {
    config: TiltConfig,
    tilt: f64,
    streak: u32,
}

impl TiltAdapter {
    pub fn new(config: TiltConfig) -> Self {
        Self {
            tilt: config.initial.clamp(config.min, config.max),
            streak: 0,
            config,
        }
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Apply one response and return the margin for the next trial.
    pub fn update(&mut self, correct: bool) -> f64 {
        if correct {
            self.streak = self.streak.saturating_add(1);
            if self.streak >= self.config.streak {
                self.tilt = (self.tilt - self.config.decrease).max(self.config.min);
            }
        } else {
            self.streak = 0;
            self.tilt = (self.tilt + self.config.increase).min(self.config.max);
        }
        self.tilt
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Default for TiltAdapter {
    fn default() -> Self {
        Self::new(TiltConfig::default())
    }
}
