//! Screen geometry shared by drawing and pointer hit-testing.

use vistrain_core::{crowding_anchor, Answer, Quadrant, TrainingMode};
use vistrain_experiment::CHART_LINES;
use vistrain_input::HitZone;

/// Fraction of the window height reserved for answer buttons under the chart.
pub const BUTTON_STRIP: f32 = 0.18;

const ROW_SPACING: f32 = 1.5;
const CELL_SPACING: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Left and right eye panels, square where space allows, separated by `gap`
/// around the vertical centre line.
pub fn chart_panels(width: f32, height: f32, gap: f32) -> [Bounds; 2] {
    let usable = height * (1.0 - BUTTON_STRIP);
    let side = ((width - gap) / 2.0).min(usable).max(1.0);
    let mid = width / 2.0;
    let y = (usable - side) / 2.0;
    [
        Bounds::new(mid - gap / 2.0 - side, y, side, side),
        Bounds::new(mid + gap / 2.0, y, side, side),
    ]
}

/// Centre y and glyph size of every chart line inside a panel.
pub fn line_rows(panel: &Bounds) -> Vec<(f32, f32)> {
    let units: f32 = CHART_LINES.iter().map(|l| l.scale * ROW_SPACING).sum();
    let base = panel.height * 0.9 / units;
    let mut y = panel.y + panel.height * 0.05;
    CHART_LINES
        .iter()
        .map(|line| {
            let row = base * line.scale * ROW_SPACING;
            let fit = panel.width / (line.count as f32 * CELL_SPACING);
            let glyph = (base * line.scale).min(fit);
            let centre = y + row / 2.0;
            y += row;
            (centre, glyph)
        })
        .collect()
}

pub fn optotype_center(panel: &Bounds, row_y: f32, glyph: f32, position: usize, count: usize) -> (f32, f32) {
    let offset = position as f32 - (count as f32 - 1.0) / 2.0;
    (panel.center().0 + offset * glyph * CELL_SPACING, row_y)
}

/// Evenly spaced buttons across the bottom strip, in answer order.
pub fn answer_buttons(width: f32, height: f32, answers: &[Answer]) -> Vec<HitZone> {
    if answers.is_empty() {
        return Vec::new();
    }
    let strip_top = height * (1.0 - BUTTON_STRIP);
    let strip_h = height * BUTTON_STRIP;
    let slot = width / answers.len() as f32;
    let pad = (slot * 0.1).min(strip_h * 0.15);
    answers
        .iter()
        .enumerate()
        .map(|(i, &answer)| {
            HitZone::new(
                i as f32 * slot + pad,
                strip_top + pad,
                slot - 2.0 * pad,
                strip_h - 2.0 * pad,
                answer,
            )
        })
        .collect()
}

/// Tap targets for a training trial.
pub fn training_zones(mode: TrainingMode, width: f32, height: f32, patch_px: f32) -> Vec<HitZone> {
    use vistrain_core::Direction;
    match mode {
        TrainingMode::Orientation | TrainingMode::Contrast => {
            let half = width / 2.0;
            vec![
                HitZone::new(0.0, 0.0, half, height, Direction::Left.into()),
                HitZone::new(half, 0.0, width - half, height, Direction::Right.into()),
            ]
        }
        TrainingMode::Crowding => (0..4)
            .map(|i| {
                let (fx, fy) = crowding_anchor(i);
                HitZone::new(
                    fx * width - patch_px / 2.0,
                    fy * height - patch_px / 2.0,
                    patch_px,
                    patch_px,
                    Answer::Position(i as u8),
                )
            })
            .collect(),
        TrainingMode::Peripheral => {
            let (hw, hh) = (width / 2.0, height / 2.0);
            Quadrant::ALL
                .iter()
                .map(|&q| {
                    let (fx, fy) = q.anchor();
                    let x = if fx > 0.5 { hw } else { 0.0 };
                    let y = if fy > 0.5 { hh } else { 0.0 };
                    HitZone::new(x, y, hw, hh, q.into())
                })
                .collect()
        }
    }
}
