//! Cylindrical RGB transforms: HSL and HSB (a.k.a. HSV).
//!
//! Hue is normalized to [0, 1) for [0°, 360°). Saturation and
//! lightness/brightness are in [0, 1].

use crate::pixel::unit_to_u8;

/// Wrap a hue into [0, 1).
#[inline]
pub fn normalize_hue(h: f64) -> f64 {
    let h = h.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if h >= 1.0 { 0.0 } else { h }
}

/// Hue in [0, 1) of an RGB triple with known max/min/delta; 0 for grays.
#[inline]
fn hue(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    if delta <= 0.0 {
        return 0.0;
    }
    let sector = if max == r {
        (g - b) / delta
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    normalize_hue(sector / 6.0)
}

#[inline]
fn unit_rgb(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
}

/// Chroma/sector decomposition shared by both inverses: returns the RGB
/// triple with chroma `c`, secondary component `x` and zero placed by sector.
#[inline]
fn sector_rgb(h: f64, c: f64) -> (f64, f64, f64) {
    let h6 = normalize_hue(h) * 6.0;
    let x = c * (1.0 - ((h6 % 2.0) - 1.0).abs());
    match h6 as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    }
}

/// sRGB bytes → (hue, saturation, lightness).
///
/// Saturation is `delta / (1 - |2L - 1|)`, defined as 0 when the
/// denominator is not positive.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> [f64; 3] {
    let (r, g, b) = unit_rgb(r, g, b);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    let denom = 1.0 - (2.0 * l - 1.0).abs();
    let s = if delta > 0.0 && denom > 0.0 {
        delta / denom
    } else {
        0.0
    };

    [hue(r, g, b, max, delta), s.clamp(0.0, 1.0), l.clamp(0.0, 1.0)]
}

pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let m = l - c / 2.0;
    let (r, g, b) = sector_rgb(h, c);
    (unit_to_u8(r + m), unit_to_u8(g + m), unit_to_u8(b + m))
}

/// sRGB bytes → (hue, saturation, brightness).
pub fn rgb_to_hsb(r: u8, g: u8, b: u8) -> [f64; 3] {
    let (r, g, b) = unit_rgb(r, g, b);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };
    [hue(r, g, b, max, delta), s, max]
}

pub fn hsb_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let c = v * s;
    let m = v - c;
    let (r, g, b) = sector_rgb(h, c);
    (unit_to_u8(r + m), unit_to_u8(g + m), unit_to_u8(b + m))
}
