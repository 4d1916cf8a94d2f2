use vistrain_core::{Answer, DistanceDecision};

/// Screen rectangle that answers when tapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitZone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub answer: Answer,
}

impl HitZone {
    pub fn new(x: f32, y: f32, width: f32, height: f32, answer: Answer) -> Self {
        Self {
            x,
            y,
            width,
            height,
            answer,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Topmost zone under the pointer; later zones are drawn over earlier ones.
pub fn hit_test(zones: &[HitZone], x: f32, y: f32) -> Option<Answer> {
    zones.iter().rev().find(|z| z.contains(x, y)).map(|z| z.answer)
}

/// Side touch zones of the distance prompt: left half stays, right half moves further.
pub fn distance_zones(width: f32, height: f32) -> [HitZone; 2] {
    let half = width / 2.0;
    [
        HitZone::new(0.0, 0.0, half, height, DistanceDecision::Stay.into()),
        HitZone::new(half, 0.0, width - half, height, DistanceDecision::MoveFurther.into()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_zones_split_the_screen() {
        let zones = distance_zones(800.0, 600.0);
        assert_eq!(hit_test(&zones, 10.0, 300.0), Some(DistanceDecision::Stay.into()));
        assert_eq!(
            hit_test(&zones, 799.0, 10.0),
            Some(DistanceDecision::MoveFurther.into())
        );
        assert_eq!(hit_test(&zones, 900.0, 10.0), None);
    }

    #[test]
    fn later_zones_take_precedence() {
        let zones = [
            HitZone::new(0.0, 0.0, 100.0, 100.0, Answer::Position(0)),
            HitZone::new(50.0, 50.0, 10.0, 10.0, Answer::Position(1)),
        ];
        assert_eq!(hit_test(&zones, 55.0, 55.0), Some(Answer::Position(1)));
        assert_eq!(hit_test(&zones, 5.0, 5.0), Some(Answer::Position(0)));
    }
}
