use crate::layout::{answer_buttons, chart_panels, line_rows, optotype_center, Bounds};
use crate::letters::letter_pixmap;
use crate::text::TextCache;
use rand::Rng;
use std::sync::Arc;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform};
use vistrain_core::{Answer, Direction, Letter};
use vistrain_experiment::{
    BinocularMode, ChartEngine, ChartState, ChartStatus, ChartVocabulary, Eye, GridStyle, Optotype,
    OptotypeProgress,
};
use vistrain_input::{distance_zones, HitZone};
use vistrain_timing::Timer;

/// Stroke rectangles of a right-facing E in a 50 unit box.
const E_STROKES: [(f32, f32, f32, f32); 4] = [
    (5.0, 5.0, 8.0, 40.0),
    (5.0, 5.0, 40.0, 8.0),
    (5.0, 21.0, 35.0, 8.0),
    (5.0, 37.0, 40.0, 8.0),
];
const E_BOX: f32 = 50.0;

const BACKDROP: [u8; 4] = [0x22, 0x22, 0x22, 0xFF];
const GRID_INK: [u8; 4] = [0x99, 0x99, 0x99, 0xFF];
const BUTTON_FILL: [u8; 4] = [0x44, 0x44, 0x44, 0xFF];
const LABEL_INK: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Everything needed to draw one chart frame.
#[derive(Debug, Clone, Copy)]
pub struct ChartView<'a> {
    pub state: &'a ChartState,
    pub mode: BinocularMode,
    pub vocabulary: ChartVocabulary,
    pub status: ChartStatus,
    pub ipd_gap: f32,
    pub choices: Option<&'a [Letter; 4]>,
    pub feedback: Option<bool>,
    pub warning: bool,
}

impl<'a> ChartView<'a> {
    pub fn of<T, R>(engine: &'a ChartEngine<T, R>) -> Self
    where
        T: Timer<Timestamp = u64>,
        R: Rng,
    {
        Self {
            state: engine.state(),
            mode: engine.mode(),
            vocabulary: engine.vocabulary(),
            status: engine.status(),
            ipd_gap: engine.ipd_gap(),
            choices: engine.choices(),
            feedback: engine.feedback(),
            warning: engine.failure_warning(),
        }
    }

    fn button_answers(&self) -> Vec<Answer> {
        match (self.vocabulary, self.choices) {
            (ChartVocabulary::Letters, Some(choices)) => choices.iter().map(|&l| l.into()).collect(),
            (ChartVocabulary::Letters, None) => Vec::new(),
            (ChartVocabulary::Directional, _) => Direction::ALL.iter().map(|&d| d.into()).collect(),
        }
    }

    /// Tap targets for this frame, in drawing order.
    pub fn zones(&self, width: f32, height: f32) -> Vec<HitZone> {
        match self.status {
            ChartStatus::DistancePrompt => distance_zones(width, height).to_vec(),
            ChartStatus::Regenerating => Vec::new(),
            ChartStatus::InProgress => answer_buttons(width, height, &self.button_answers()),
        }
    }
}

fn paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    p.anti_alias = true;
    p
}

fn with_alpha(rgba: [u8; 4], opacity: f32) -> [u8; 4] {
    [rgba[0], rgba[1], rgba[2], (rgba[3] as f32 * opacity).round() as u8]
}

fn opacity(progress: OptotypeProgress) -> f32 {
    match progress {
        OptotypeProgress::Past => 0.2,
        OptotypeProgress::Current => 1.0,
        OptotypeProgress::Upcoming => 0.4,
    }
}

fn fill_bounds(canvas: &mut Pixmap, b: &Bounds, rgba: [u8; 4]) {
    if let Some(r) = Rect::from_xywh(b.x, b.y, b.width, b.height) {
        canvas.fill_rect(r, &paint(rgba), Transform::identity(), None);
    }
}

/// Tumbling E of `size` pixels, opening towards `direction`.
pub fn tumbling_e_pixmap(direction: Direction, size: f32, rgba: [u8; 4]) -> Option<Pixmap> {
    let side = size.ceil().max(1.0) as u32;
    let mut pm = Pixmap::new(side, side)?;
    let k = side as f32 / E_BOX;
    let transform = Transform::from_rotate_at(
        direction.rotation_degrees(),
        side as f32 / 2.0,
        side as f32 / 2.0,
    )
    .pre_scale(k, k);
    let ink = paint(rgba);
    for (x, y, w, h) in E_STROKES {
        if let Some(r) = Rect::from_xywh(x, y, w, h) {
            pm.fill_rect(r, &ink, transform, None);
        }
    }
    Some(pm)
}

fn draw_centered(canvas: &mut Pixmap, pm: &Pixmap, center: (f32, f32)) {
    let x = (center.0 - pm.width() as f32 / 2.0).round() as i32;
    let y = (center.1 - pm.height() as f32 / 2.0).round() as i32;
    canvas.draw_pixmap(x, y, pm.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
}

fn draw_grid_cell(canvas: &mut Pixmap, center: (f32, f32), side: f32, style: GridStyle) {
    if style == GridStyle::None {
        return;
    }
    let half = side / 2.0;
    let Some(rect) = Rect::from_xywh(center.0 - half, center.1 - half, side, side) else {
        return;
    };
    let stroke = Stroke {
        width: (side / 40.0).max(1.0),
        ..Stroke::default()
    };
    let ink = paint(GRID_INK);
    let cell = PathBuilder::from_rect(rect);
    canvas.stroke_path(&cell, &ink, &stroke, Transform::identity(), None);

    if style == GridStyle::Slanted {
        let mut pb = PathBuilder::new();
        pb.move_to(rect.left(), rect.top());
        pb.line_to(rect.right(), rect.bottom());
        pb.move_to(rect.right(), rect.top());
        pb.line_to(rect.left(), rect.bottom());
        if let Some(diagonals) = pb.finish() {
            canvas.stroke_path(&diagonals, &ink, &stroke, Transform::identity(), None);
        }
    }
}

fn draw_optotype(
    canvas: &mut Pixmap,
    optotype: Optotype,
    center: (f32, f32),
    size: f32,
    rgba: [u8; 4],
    text: Option<&mut TextCache>,
) {
    let pm = match optotype {
        Optotype::Direction(d) => tumbling_e_pixmap(d, size, rgba).map(Arc::new),
        Optotype::Letter(l) => letter_glyph(l, size, rgba, text),
    };
    if let Some(pm) = pm {
        draw_centered(canvas, &pm, center);
    }
}

/// Font glyph when a font is loaded, stroked outline otherwise.
fn letter_glyph(
    letter: Letter,
    size: f32,
    rgba: [u8; 4],
    text: Option<&mut TextCache>,
) -> Option<Arc<Pixmap>> {
    text.and_then(|t| t.get_or_render(&letter.to_string(), size, rgba))
        .or_else(|| letter_pixmap(letter, size * 0.8, rgba).map(Arc::new))
}

fn draw_panel(
    canvas: &mut Pixmap,
    view: &ChartView<'_>,
    eye: Eye,
    panel: &Bounds,
    mut text: Option<&mut TextCache>,
) {
    fill_bounds(canvas, panel, [0xFF, 0xFF, 0xFF, 0xFF]);
    let ink = view.mode.ink(eye);
    let grid = view.mode.grid();

    for (line_idx, (line, (row_y, glyph))) in view
        .state
        .lines()
        .iter()
        .zip(line_rows(panel))
        .enumerate()
    {
        for (pos, &optotype) in line.optotypes.iter().enumerate() {
            let center = optotype_center(panel, row_y, glyph, pos, line.len());
            draw_grid_cell(canvas, center, glyph * 1.3, grid);
            if !view.mode.is_visible(eye, pos) {
                continue;
            }
            let progress = view.state.progress_of(line_idx, pos);
            let rgba = with_alpha(ink, opacity(progress));
            draw_optotype(canvas, optotype, center, glyph, rgba, text.as_deref_mut());

            if progress == OptotypeProgress::Current {
                let bar = Bounds::new(
                    center.0 - glyph / 2.0,
                    center.1 + glyph * 0.6,
                    glyph,
                    (glyph * 0.08).max(1.0),
                );
                fill_bounds(canvas, &bar, ink);
            }
        }
    }
}

fn draw_label(canvas: &mut Pixmap, text: Option<&mut TextCache>, label: &str, center: (f32, f32), size: f32) {
    if let Some(pm) = text.and_then(|t| t.get_or_render(label, size, LABEL_INK)) {
        draw_centered(canvas, &pm, center);
    }
}

fn draw_buttons(
    canvas: &mut Pixmap,
    zones: &[HitZone],
    mut text: Option<&mut TextCache>,
) {
    for zone in zones {
        let b = Bounds::new(zone.x, zone.y, zone.width, zone.height);
        fill_bounds(canvas, &b, BUTTON_FILL);
        let glyph = b.height.min(b.width) * 0.6;
        match zone.answer {
            Answer::Direction(d) => {
                if let Some(pm) = tumbling_e_pixmap(d, glyph, LABEL_INK) {
                    draw_centered(canvas, &pm, b.center());
                }
            }
            Answer::Letter(l) => {
                if let Some(pm) = letter_glyph(l, glyph, LABEL_INK, text.as_deref_mut()) {
                    draw_centered(canvas, &pm, b.center());
                }
            }
            _ => {}
        }
    }
}

/// Draw both eye panels, the answer strip and any overlay for the current
/// status onto `canvas`.
pub fn draw_chart(canvas: &mut Pixmap, view: &ChartView<'_>, mut text: Option<&mut TextCache>) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    canvas.fill(Color::from_rgba8(BACKDROP[0], BACKDROP[1], BACKDROP[2], BACKDROP[3]));

    let panels = chart_panels(w, h, view.ipd_gap);
    for (eye, panel) in [(Eye::Left, &panels[0]), (Eye::Right, &panels[1])] {
        draw_panel(canvas, view, eye, panel, text.as_deref_mut());
    }

    match view.status {
        ChartStatus::InProgress => draw_buttons(canvas, &view.zones(w, h), text.as_deref_mut()),
        ChartStatus::Regenerating => {
            fill_bounds(canvas, &Bounds::new(0.0, 0.0, w, h), [0x00, 0x00, 0x00, 0x99]);
            draw_label(canvas, text.as_deref_mut(), "New chart", (w / 2.0, h / 2.0), h / 12.0);
        }
        ChartStatus::DistancePrompt => {
            let zones = distance_zones(w, h);
            let tints = [[0x33, 0x66, 0xCC, 0xAA], [0x33, 0xAA, 0x55, 0xAA]];
            for ((zone, tint), label) in zones.iter().zip(tints).zip(["Stay", "Move further"]) {
                let b = Bounds::new(zone.x, zone.y, zone.width, zone.height);
                fill_bounds(canvas, &b, tint);
                draw_label(canvas, text.as_deref_mut(), label, b.center(), h / 14.0);
            }
        }
    }

    if view.warning {
        fill_bounds(canvas, &Bounds::new(0.0, 0.0, w, (h * 0.01).max(3.0)), [0xFF, 0xA5, 0x00, 0xFF]);
    }
    if let Some(correct) = view.feedback {
        let ring = if correct {
            [0x22, 0xCC, 0x44, 0xFF]
        } else {
            [0xDD, 0x22, 0x22, 0xFF]
        };
        if let Some(r) = Rect::from_xywh(2.0, 2.0, w - 4.0, h - 4.0) {
            let stroke = Stroke {
                width: 4.0,
                ..Stroke::default()
            };
            canvas.stroke_path(&PathBuilder::from_rect(r), &paint(ring), &stroke, Transform::identity(), None);
        }
    }
}
