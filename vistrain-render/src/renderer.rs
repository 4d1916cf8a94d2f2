use crate::blit::blit_centered;
use crate::chart::{draw_chart, ChartView};
use crate::gabor::GaborCache;
use crate::text::TextCache;
use ab_glyph::FontArc;
use anyhow::{anyhow, bail, Result};
use rand::Rng;
use std::time::Duration;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::debug;
use vistrain_core::{SessionPhase, TrainingMode, TrialStimulus, MID_GRAY};
use vistrain_experiment::TrainingSession;
use vistrain_timing::{HighPrecisionTimer, Timer};

const FIXATION_SIZE: u32 = 24;
const LABEL_PX: f32 = 28.0;
const LABEL_INK: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Snapshot of a training session for drawing.
#[derive(Debug, Clone, Copy)]
pub struct TrainingView<'a> {
    pub mode: TrainingMode,
    pub phase: SessionPhase,
    pub stimulus: Option<&'a TrialStimulus>,
    pub feedback: Option<bool>,
    pub progress: (usize, usize),
    /// Carrier drift added to every patch, in degrees.
    pub phase_offset_deg: f64,
}

impl<'a> TrainingView<'a> {
    pub fn of<T, R>(session: &'a TrainingSession<T, R>, phase_offset_deg: f64) -> Self
    where
        T: Timer<Timestamp = u64>,
        R: Rng,
    {
        Self {
            mode: session.mode(),
            phase: session.phase(),
            stimulus: session.visible_stimulus(),
            feedback: session.feedback(),
            progress: session.progress(),
            phase_offset_deg,
        }
    }
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    canvas: Pixmap,
    fixation: Pixmap,
    gabor: GaborCache,
    text: Option<TextCache>,
}

fn fixation_cross() -> Result<Pixmap> {
    let size = FIXATION_SIZE;
    let mut pm = Pixmap::new(size, size).ok_or_else(|| anyhow!("fixation pixmap"))?;
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::BLACK);
    let bar = 2.0;
    let s = size as f32;
    for r in [
        Rect::from_xywh(0.0, (s - bar) * 0.5, s, bar),
        Rect::from_xywh((s - bar) * 0.5, 0.0, bar, s),
    ]
    .into_iter()
    .flatten()
    {
        pm.fill_rect(r, &paint, Transform::identity(), None);
    }
    Ok(pm)
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: Option<FontArc>) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            canvas,
            fixation: fixation_cross()?,
            gabor: GaborCache::default(),
            text: font.map(TextCache::new),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;
        self.width = width;
        self.height = height;
        self.center = (width as f32 / 2.0, height as f32 / 2.0);
        debug!(width, height, "canvas resized");
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    pub fn render_training(
        &mut self,
        view: &TrainingView<'_>,
        frame_buffer: &mut [u8],
        timer: &mut HighPrecisionTimer,
    ) -> Result<FrameStats> {
        let t = timer.now();
        self.draw_training(view)?;
        let draw = timer.elapsed(t);
        self.finish_frame(draw, frame_buffer, timer)
    }

    pub fn render_chart(
        &mut self,
        view: &ChartView<'_>,
        frame_buffer: &mut [u8],
        timer: &mut HighPrecisionTimer,
    ) -> Result<FrameStats> {
        let t = timer.now();
        draw_chart(&mut self.canvas, view, self.text.as_mut());
        let draw = timer.elapsed(t);
        self.finish_frame(draw, frame_buffer, timer)
    }

    fn finish_frame(
        &mut self,
        draw: Duration,
        frame_buffer: &mut [u8],
        timer: &mut HighPrecisionTimer,
    ) -> Result<FrameStats> {
        let t = timer.now();
        self.present(frame_buffer)?;
        let copy = timer.elapsed(t);
        let total = draw + copy;

        timer.record_frame(total);
        Ok(FrameStats { draw, copy, total })
    }

    /// Copy the canvas into an RGBA frame of the same size.
    pub fn present(&self, frame_buffer: &mut [u8]) -> Result<()> {
        let src = self.canvas.data();
        if frame_buffer.len() != src.len() {
            bail!(
                "frame buffer is {} bytes, canvas is {}",
                frame_buffer.len(),
                src.len()
            );
        }
        frame_buffer.copy_from_slice(src);
        Ok(())
    }

    fn draw_training(&mut self, view: &TrainingView<'_>) -> Result<()> {
        let (w, h) = (self.width as f32, self.height as f32);
        self.canvas
            .fill(Color::from_rgba8(MID_GRAY, MID_GRAY, MID_GRAY, 255));

        if let Some(stimulus) = view.stimulus {
            for (params, (fx, fy)) in stimulus.placements() {
                let drifted = params.with_phase(params.phase_deg + view.phase_offset_deg);
                let pm = self.gabor.get_or_render(&drifted)?;
                blit_centered(&mut self.canvas, &pm, (fx * w, fy * h));
            }
        }
        if view.phase.is_running() || view.phase.is_paused() {
            blit_centered(&mut self.canvas, &self.fixation, self.center);
        }

        if let Some(correct) = view.feedback {
            let ring = if correct {
                Color::from_rgba8(0x22, 0xCC, 0x44, 0xFF)
            } else {
                Color::from_rgba8(0xDD, 0x22, 0x22, 0xFF)
            };
            self.stroke_border(ring);
        }

        let (shown, total) = view.progress;
        match view.phase {
            SessionPhase::Idle => self.label(&format!("{} - press Space", view.mode), self.center),
            SessionPhase::Complete => self.label("Session complete", self.center),
            SessionPhase::Paused(_) => {
                let mut dim = Paint::default();
                dim.set_color_rgba8(0, 0, 0, 0x99);
                if let Some(r) = Rect::from_xywh(0.0, 0.0, w, h) {
                    self.canvas.fill_rect(r, &dim, Transform::identity(), None);
                }
                self.label("Paused", self.center);
            }
            _ => self.label(&format!("{shown}/{total}"), (60.0, 30.0)),
        }
        Ok(())
    }

    fn stroke_border(&mut self, color: Color) {
        let (w, h) = (self.width as f32, self.height as f32);
        let Some(r) = Rect::from_xywh(3.0, 3.0, w - 6.0, h - 6.0) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        let stroke = Stroke {
            width: 6.0,
            ..Stroke::default()
        };
        self.canvas.stroke_path(
            &PathBuilder::from_rect(r),
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn label(&mut self, text: &str, pos: (f32, f32)) {
        let Some(cache) = self.text.as_mut() else {
            return;
        };
        if let Some(pm) = cache.get_or_render(text, LABEL_PX, LABEL_INK) {
            blit_centered(&mut self.canvas, &pm, pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistrain_core::StimulusParameters;

    fn view(stimulus: Option<&TrialStimulus>, phase: SessionPhase) -> TrainingView<'_> {
        TrainingView {
            mode: TrainingMode::Orientation,
            phase,
            stimulus,
            feedback: None,
            progress: (1, 20),
            phase_offset_deg: 0.0,
        }
    }

    #[test]
    fn training_frame_shows_patch_and_fixation() {
        let mut r = SkiaRenderer::new(320, 240, None).unwrap();
        let stim = TrialStimulus::Single(StimulusParameters::new(100).with_orientation(15.0));
        let mut frame = vec![0u8; 320 * 240 * 4];
        let mut timer = HighPrecisionTimer::new();
        r.render_training(&view(Some(&stim), SessionPhase::Response), &mut frame, &mut timer)
            .unwrap();

        let centre = r.canvas().pixel(160, 120).unwrap();
        assert_eq!((centre.red(), centre.alpha()), (0, 255), "fixation cross");
        let corner = r.canvas().pixel(2, 2).unwrap();
        assert_eq!(corner.red(), MID_GRAY);
        let patch_drawn = (120..200)
            .flat_map(|x| (80..110).map(move |y| (x, y)))
            .any(|(x, y)| r.canvas().pixel(x, y).unwrap().red().abs_diff(MID_GRAY) > 40);
        assert!(patch_drawn, "patch drawn around centre");
        assert_eq!(&frame[..4], r.canvas().data().get(..4).unwrap());
        assert!(timer.frame_statistics().max_frame_time_ns > 0.0);
    }

    #[test]
    fn frame_size_mismatch_is_an_error() {
        let r = SkiaRenderer::new(10, 10, None).unwrap();
        let mut frame = vec![0u8; 10];
        assert!(r.present(&mut frame).is_err());
    }

    #[test]
    fn paused_frames_are_dimmed() {
        let mut r = SkiaRenderer::new(64, 64, None).unwrap();
        let mut frame = vec![0u8; 64 * 64 * 4];
        let mut timer = HighPrecisionTimer::new();
        r.render_training(
            &view(None, SessionPhase::Paused(vistrain_core::PausedFrom::Response)),
            &mut frame,
            &mut timer,
        )
        .unwrap();
        assert!(r.canvas().pixel(1, 1).unwrap().red() < MID_GRAY);
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(SkiaRenderer::new(0, 10, None).is_err());
        let mut r = SkiaRenderer::new(4, 4, None).unwrap();
        assert!(r.resize(8, 0).is_err());
        assert_eq!(r.size(), (4, 4));
    }
}
