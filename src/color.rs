use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use tune_stats::dashboard::payload::ColorScale;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

const DIVERGING: [(u8, u8, u8); 3] = [(33, 102, 172), (247, 247, 247), (178, 24, 43)];
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

fn stops(scale: ColorScale) -> &'static [(u8, u8, u8)] {
    match scale {
        ColorScale::Diverging => &DIVERGING,
        ColorScale::Viridis => &VIRIDIS,
    }
}

fn linear(stop: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(stop.0, stop.1, stop.2).into_format::<f32>().into_linear()
}

/// Colour at position `t` in [0, 1] along `scale`, mixed in linear RGB.
pub fn scale_color(scale: ColorScale, t: f64) -> Color32 {
    let stops = stops(scale);
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let pos = t * (stops.len() - 1) as f64;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let mixed = linear(stops[i]).mix(linear(stops[i + 1]), (pos - i as f64) as f32);
    to_color32(Srgb::from_linear(mixed))
}

/// Map `value` from `[lo, hi]` onto `scale`.
pub fn scale_value(scale: ColorScale, value: f64, lo: f64, hi: f64) -> Color32 {
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
    scale_color(scale, t)
}

// ---------------------------------------------------------------------------
// Color mapping: series name → Color32
// ---------------------------------------------------------------------------

/// Fixed colours for the named series of one figure.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Distinct colours in the order the names are given.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        let mapping = names
            .iter()
            .zip(generate_palette(names.len()))
            .map(|(name, color)| (name.to_string(), color))
            .collect();
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping.get(name).copied().unwrap_or(self.default_color)
    }
}
