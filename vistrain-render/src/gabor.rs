use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::Pixmap;
use tracing::debug;
use vistrain_core::{generate, GaborField, StimulusParameters};

/// Opaque grayscale pixmap of a luminance field.
pub fn gabor_pixmap(field: &GaborField) -> Result<Pixmap> {
    let size = field.size();
    let mut pm = Pixmap::new(size, size).ok_or_else(|| anyhow!("empty Gabor field"))?;
    for (px, &v) in pm.data_mut().chunks_exact_mut(4).zip(field.as_slice()) {
        px.copy_from_slice(&[v, v, v, 255]);
    }
    Ok(pm)
}

/// Parameters rounded to what is visible on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GaborKey {
    size: u32,
    orientation_cdeg: i64,
    frequency_milli: i64,
    contrast_milli: i64,
    sigma_milli: i64,
    phase_deg: i64,
}

impl GaborKey {
    fn of(p: &StimulusParameters) -> Self {
        let p = p.normalized();
        Self {
            size: p.size,
            orientation_cdeg: (p.orientation_deg * 100.0).round() as i64,
            frequency_milli: (p.spatial_frequency * 1000.0).round() as i64,
            contrast_milli: (p.contrast * 1000.0).round() as i64,
            sigma_milli: (p.sigma * 1000.0).round() as i64,
            phase_deg: p.phase_deg.round() as i64,
        }
    }
}

/// Rasterised patches reused across frames. Drifting phase produces a new
/// key every degree, so the cache is dropped wholesale once it grows past
/// `capacity`.
pub struct GaborCache {
    map: HashMap<GaborKey, Arc<Pixmap>>,
    capacity: usize,
    misses: u64,
}

impl GaborCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            capacity: capacity.max(1),
            misses: 0,
        }
    }

    pub fn get_or_render(&mut self, params: &StimulusParameters) -> Result<Arc<Pixmap>> {
        let key = GaborKey::of(params);
        if let Some(p) = self.map.get(&key) {
            return Ok(Arc::clone(p));
        }
        if self.map.len() >= self.capacity {
            debug!(entries = self.map.len(), "gabor cache flushed");
            self.map.clear();
        }
        self.misses += 1;
        let pm = Arc::new(gabor_pixmap(&generate(params))?);
        self.map.insert(key, Arc::clone(&pm));
        Ok(pm)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for GaborCache {
    fn default() -> Self {
        Self::new(360)
    }
}
