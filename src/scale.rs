//! Maps a metric window onto a fixed-width bar and a row of intensity glyphs.
//!
//! Everything here is a pure function of the current window; nothing is
//! carried between ticks.

/// Width of the current-value bar in cells.
pub const BAR_WIDTH: usize = 50;

/// Highest glyph intensity.
pub const MAX_INTENSITY: u8 = 5;

/// Glyphs by intensity, lowest first. Intensity 0 still draws a baseline
/// mark so a flat window remains visible.
pub const GLYPHS: [char; 6] = ['_', '.', '-', '*', '#', '@'];

/// Reference maximum for CPU% and memory%.
pub const PERCENT_MAX: f64 = 100.0;

/// Below `floor`, the observed maximum is not representative and `default`
/// is used instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ceiling {
    pub floor: f64,
    pub default: f64,
}

pub const MEMORY_MB_CEILING: Ceiling = Ceiling {
    floor: 10.0,
    default: 100.0,
};

pub const THREADS_CEILING: Ceiling = Ceiling {
    floor: 5.0,
    default: 10.0,
};

impl Ceiling {
    pub fn reference_max(&self, observed_max: f64) -> f64 {
        if observed_max < self.floor {
            self.default
        } else {
            observed_max
        }
    }
}

/// Number of filled cells for `current` against `max`, within `0..=width`.
pub fn bar_fill(current: f64, max: f64, width: usize) -> usize {
    let fill = ((current / max) * width as f64).floor();
    if fill.is_nan() || fill <= 0.0 {
        0
    } else {
        (fill as usize).min(width)
    }
}

/// Quantise each sample to `0..=MAX_INTENSITY` relative to the window
/// minimum and `max`.
pub fn glyph_intensities(values: &[f64], max: f64) -> Vec<u8> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    values
        .iter()
        .map(|v| {
            let height = (((v - min) / range) * f64::from(MAX_INTENSITY)).floor();
            if height.is_nan() || height <= 0.0 {
                0
            } else {
                height.min(f64::from(MAX_INTENSITY)) as u8
            }
        })
        .collect()
}

pub fn glyph(intensity: u8) -> char {
    GLYPHS[usize::from(intensity.min(MAX_INTENSITY))]
}

pub fn glyph_line(values: &[f64], max: f64) -> String {
    glyph_intensities(values, max).into_iter().map(glyph).collect()
}

/// Min, mean and max of a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );
        Self {
            min,
            avg: sum / values.len() as f64,
            max,
        }
    }
}
