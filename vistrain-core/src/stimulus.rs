use crate::answer::TiltSide;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Neutral background luminance on the 0..=255 scale.
pub const MID_GRAY: u8 = 128;
const AMPLITUDE: f64 = 127.0;

/// Parameters of a single Gabor patch.
///
/// Orientation 0 gives vertical stripes; positive values rotate clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusParameters {
    pub size: u32,
    pub orientation_deg: f64,
    /// Cycles per patch width.
    pub spatial_frequency: f64,
    pub contrast: f64,
    pub sigma: f64,
    pub phase_deg: f64,
}

impl StimulusParameters {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            orientation_deg: 0.0,
            spatial_frequency: 4.0,
            contrast: 1.0,
            sigma: size as f64 / 4.0,
            phase_deg: 0.0,
        }
    }

    pub fn with_orientation(mut self, degrees: f64) -> Self {
        self.orientation_deg = degrees;
        self
    }

    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_phase(mut self, degrees: f64) -> Self {
        self.phase_deg = degrees;
        self
    }

    pub fn with_frequency(mut self, cycles: f64) -> Self {
        self.spatial_frequency = cycles;
        self
    }

    /// Contrast clamped to [0, 1]; orientation and phase wrapped into [0, 360).
    pub fn normalized(self) -> Self {
        let contrast = if self.contrast.is_finite() {
            self.contrast.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            orientation_deg: self.orientation_deg.rem_euclid(360.0),
            phase_deg: self.phase_deg.rem_euclid(360.0),
            contrast,
            sigma: self.sigma.max(f64::EPSILON),
            ..self
        }
    }
}

/// Named parameter sets used by the exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusPreset {
    Standard,
    LowContrast,
    HighFrequency,
    LowFrequency,
    TiltedLeft,
    TiltedRight,
}

impl StimulusPreset {
    pub fn parameters(self, size: u32) -> StimulusParameters {
        let base = StimulusParameters::new(size);
        match self {
            StimulusPreset::Standard => base,
            StimulusPreset::LowContrast => base.with_contrast(0.3),
            StimulusPreset::HighFrequency => base.with_frequency(8.0),
            StimulusPreset::LowFrequency => base.with_frequency(2.0),
            StimulusPreset::TiltedLeft => base.with_orientation(-15.0),
            StimulusPreset::TiltedRight => base.with_orientation(15.0),
        }
    }
}

/// Square grayscale luminance field, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaborField {
    size: u32,
    data: Vec<u8>,
}

impl GaborField {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.data.get((y * self.size + x) as usize).copied()
    }

    /// Luminance in [0, 1]; 0 is black, 1 is white.
    pub fn luminance(&self, x: u32, y: u32) -> Option<f32> {
        self.get(x, y).map(|v| v as f32 / 255.0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Evaluate a Gabor patch: Gaussian envelope times a cosine carrier along the
/// rotated x axis, scaled by contrast and centred on mid-gray.
pub fn generate(params: &StimulusParameters) -> GaborField {
    let p = params.normalized();
    let size = p.size;
    let center = size as f64 / 2.0;
    let theta = p.orientation_deg.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    let phase = p.phase_deg.to_radians();
    let two_sigma_sq = 2.0 * p.sigma * p.sigma;
    let freq = if size == 0 {
        0.0
    } else {
        2.0 * PI * p.spatial_frequency / size as f64
    };

    let mut data = Vec::with_capacity((size as usize) * (size as usize));
    for y in 0..size {
        let yc = y as f64 - center;
        for x in 0..size {
            let xc = x as f64 - center;
            let xr = xc * cos_t + yc * sin_t;
            let yr = -xc * sin_t + yc * cos_t;
            let envelope = (-(xr * xr + yr * yr) / two_sigma_sq).exp();
            let carrier = (freq * xr + phase).cos();
            let value = envelope * carrier * p.contrast;
            let px = (MID_GRAY as f64 + value * AMPLITUDE).round().clamp(0.0, 255.0);
            data.push(px as u8);
        }
    }

    GaborField { size, data }
}

/// Pick a fair left/right lean and return the signed orientation.
pub fn generate_tilted_orientation<R: Rng>(rng: &mut R, tilt: f64) -> (f64, TiltSide) {
    let side = if rng.random_bool(0.5) {
        TiltSide::Left
    } else {
        TiltSide::Right
    };
    (side.signed(tilt), side)
}

/// Drifts the carrier phase at a fixed rate of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseAnimator {
    pub cycles_per_second: f64,
    phase_deg: f64,
}

impl PhaseAnimator {
    pub fn new(cycles_per_second: f64) -> Self {
        Self {
            cycles_per_second,
            phase_deg: 0.0,
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase_deg
    }

    pub fn advance(&mut self, elapsed: Duration) -> f64 {
        let delta = self.cycles_per_second * 360.0 * elapsed.as_secs_f64();
        self.phase_deg = (self.phase_deg + delta).rem_euclid(360.0);
        self.phase_deg
    }
}

impl Default for PhaseAnimator {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_contrast_is_flat_gray() {
        let field = generate(&StimulusParameters::new(32).with_contrast(0.0));
        assert!(field.as_slice().iter().all(|&v| v == MID_GRAY));
    }

    #[test]
    fn centre_pixel_is_brightest_at_zero_phase() {
        let field = generate(&StimulusParameters::new(64));
        let centre = field.get(32, 32).unwrap();
        assert_eq!(centre, 255);
        assert!(field.as_slice().iter().all(|&v| v <= centre));
    }

    #[test]
    fn out_of_range_contrast_is_clamped() {
        let over = generate(&StimulusParameters::new(16).with_contrast(3.0));
        let full = generate(&StimulusParameters::new(16).with_contrast(1.0));
        assert_eq!(over, full);
    }

    #[test]
    fn orientation_wraps_modulo_360() {
        let a = generate(&StimulusParameters::new(24).with_orientation(-15.0));
        let b = generate(&StimulusParameters::new(24).with_orientation(345.0));
        assert_eq!(a, b);
    }

    #[test]
    fn animator_wraps_phase() {
        let mut anim = PhaseAnimator::new(1.0);
        anim.advance(Duration::from_millis(750));
        assert!((anim.phase() - 270.0).abs() < 1e-9);
        anim.advance(Duration::from_millis(500));
        assert!((anim.phase() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_patch_has_no_pixels() {
        let field = generate(&StimulusParameters::new(0));
        assert!(field.as_slice().is_empty());
        assert_eq!(field.get(0, 0), None);
    }
}
