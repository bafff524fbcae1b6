/// OKLab color representation.
///
/// Bjorn Ottosson's perceptually uniform color space.
/// L: lightness [0, 1], a: green-red, b: blue-yellow.
///
/// Values are carried unnormalized: `a` and `b` stay roughly within
/// [-0.4, 0.4] and are never remapped into [0, 1]. The forward and inverse
/// transforms below agree on that convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OKLab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl OKLab {
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }
}

/// Maximum number of chroma reductions tried by the inverse transform.
pub const GAMUT_MAX_STEPS: u32 = 20;

/// Fraction of the original chroma removed per reduction.
const GAMUT_STEP: f64 = 0.05;

/// Slack allowed on the [0, 1] linear gamut test. Channels are stored as
/// f32, so saturated primaries come back a hair outside the cube; 1e-4 linear
/// is well under half an 8-bit step.
const GAMUT_EPSILON: f64 = 1e-4;

// --- sRGB transfer function (linear-srgb) ---

/// sRGB gamma → linear (single channel, 0..255 → 0.0..1.0), widened for the
/// f64 matrix math below.
#[inline(always)]
fn srgb_to_linear(c: u8) -> f64 {
    linear_srgb::default::srgb_u8_to_linear(c) as f64
}

/// Linear → sRGB gamma (single channel, 0.0..1.0 → 0..255). Out-of-range
/// input is clamped first.
#[inline(always)]
fn linear_to_srgb(c: f64) -> u8 {
    linear_srgb::default::linear_to_srgb_u8(c.clamp(0.0, 1.0) as f32)
}

// --- OKLab conversion (Bjorn Ottosson) ---
// Matrix constants are from the OKLab reference implementation.

/// Convert sRGB (0..255 per channel) to OKLab.
#[allow(clippy::excessive_precision)]
pub fn srgb_to_oklab(r: u8, g: u8, b: u8) -> OKLab {
    let r = srgb_to_linear(r);
    let g = srgb_to_linear(g);
    let b = srgb_to_linear(b);

    // Linear sRGB → LMS (using Ottosson's M1 matrix)
    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    let l_ = l.cbrt();
    let m_ = m.cbrt();
    let s_ = s.cbrt();

    // LMS → OKLab (Ottosson's M2 matrix)
    OKLab {
        l: (0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_) as f32,
        a: (1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_) as f32,
        b: (0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_) as f32,
    }
}

/// OKLab → linear sRGB with the `a`/`b` contribution scaled by `chroma`.
#[allow(clippy::excessive_precision)]
fn oklab_to_linear_scaled(lab: OKLab, chroma: f64) -> [f64; 3] {
    let (l, a, b) = (lab.l as f64, lab.a as f64, lab.b as f64);

    // OKLab → LMS (inverse of M2)
    let l_ = l + chroma * (0.3963377774 * a + 0.2158037573 * b);
    let m_ = l - chroma * (0.1055613458 * a + 0.0638541728 * b);
    let s_ = l - chroma * (0.0894841775 * a + 1.2914855480 * b);

    let l = l_ * l_ * l_;
    let m = m_ * m_ * m_;
    let s = s_ * s_ * s_;

    // LMS → linear sRGB (inverse of M1)
    [
        4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
        -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
        -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
    ]
}

#[inline]
fn in_gamut(rgb: &[f64; 3]) -> bool {
    rgb.iter()
        .all(|&c| (-GAMUT_EPSILON..=1.0 + GAMUT_EPSILON).contains(&c))
}

/// Gamut-mapped inverse in linear sRGB.
///
/// Tries the direct inverse first, then shrinks chroma by 5% of the original
/// per step until every channel lands in [0, 1]. The last step reaches zero
/// chroma. Returns the linear color and the number of reductions applied;
/// if no step fits (lightness itself out of range) the zero-chroma result is
/// returned and clamped later.
pub fn oklab_to_linear_gamut_mapped(lab: OKLab) -> ([f64; 3], u32) {
    for step in 0..GAMUT_MAX_STEPS {
        let chroma = 1.0 - step as f64 * GAMUT_STEP;
        let rgb = oklab_to_linear_scaled(lab, chroma);
        if in_gamut(&rgb) {
            return (rgb, step);
        }
    }
    (oklab_to_linear_scaled(lab, 0.0), GAMUT_MAX_STEPS)
}

/// Convert OKLab to sRGB (0..255 per channel), with iterative gamut mapping.
pub fn oklab_to_srgb(lab: OKLab) -> (u8, u8, u8) {
    let ([r, g, b], _) = oklab_to_linear_gamut_mapped(lab);
    (linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
}
