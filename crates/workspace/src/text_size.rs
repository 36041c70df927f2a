//! Terminal text size.

use settings::constants::text_size::{MAX, MIN, PRESETS};

pub fn clamp(size: u16) -> u16 {
    size.clamp(MIN, MAX)
}

/// Apply a pinch-style scale factor to `current`.
pub fn scale(current: u16, factor: f32) -> u16 {
    if !factor.is_finite() || factor <= 0.0 {
        return clamp(current);
    }
    let scaled = (f32::from(current) * factor).round();
    // Saturating cast; clamp brings it back into range
    clamp(scaled.min(f32::from(u16::MAX)) as u16)
}

/// Preset name for `size`, if it is one of the picker choices.
pub fn preset_name(size: u16) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|&&(_, preset)| preset == size)
        .map(|&(name, _)| name)
}
