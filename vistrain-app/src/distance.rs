use tracing::info;
use vistrain_core::DistanceDecision;

const START_CM: u32 = 25;
const STEP_CM: u32 = 1;
const MAX_CM: u32 = 100;

/// Viewing distance the user has been asked to keep, moved only by chart
/// distance decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDistance {
    cm: u32,
}

impl SimulatedDistance {
    pub fn new() -> Self {
        Self { cm: START_CM }
    }

    pub fn cm(&self) -> u32 {
        self.cm
    }

    pub fn apply(&mut self, decision: DistanceDecision) -> u32 {
        if decision == DistanceDecision::MoveFurther {
            self.cm = (self.cm + STEP_CM).min(MAX_CM);
        }
        info!(?decision, distance_cm = self.cm, "viewing distance");
        self.cm
    }
}

impl Default for SimulatedDistance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stay_keeps_distance() {
        let mut d = SimulatedDistance::new();
        assert_eq!(d.apply(DistanceDecision::Stay), 25);
    }

    #[test]
    fn further_steps_up_to_the_cap() {
        let mut d = SimulatedDistance::new();
        assert_eq!(d.apply(DistanceDecision::MoveFurther), 26);
        for _ in 0..200 {
            d.apply(DistanceDecision::MoveFurther);
        }
        assert_eq!(d.cm(), 100);
    }
}
