use core::hash::{Hash, Hasher};

/// A unique color in some normalized 3-channel space, with the number of
/// source pixels it stands for.
///
/// Identity is defined by the channel values alone: two pixels with the same
/// channels compare equal regardless of `count`. Channels are compared by bit
/// pattern, so `-0.0` and `0.0` are distinct keys, matching how the extractor
/// deduplicates.
#[derive(Debug, Clone, Copy)]
pub struct Pixel {
    values: [f32; 3],
    /// Occurrence count (≥ 1 for extracted pixels).
    pub count: u32,
}

impl Pixel {
    pub const fn new(a: f32, b: f32, c: f32) -> Self {
        Self {
            values: [a, b, c],
            count: 1,
        }
    }

    pub const fn from_values(values: [f32; 3]) -> Self {
        Self { values, count: 1 }
    }

    pub const fn with_count(values: [f32; 3], count: u32) -> Self {
        Self { values, count }
    }

    #[inline]
    pub fn values(&self) -> [f32; 3] {
        self.values
    }

    #[inline]
    pub fn channel(&self, index: usize) -> f32 {
        self.values[index]
    }

    /// Unweighted sum of the three channels. Grayscale ordering uses this as
    /// intensity.
    #[inline]
    pub fn intensity(&self) -> f32 {
        self.values[0] + self.values[1] + self.values[2]
    }

    /// Bit-exact key used for deduplication.
    #[inline]
    pub(crate) fn key(&self) -> [u32; 3] {
        [
            self.values[0].to_bits(),
            self.values[1].to_bits(),
            self.values[2].to_bits(),
        ]
    }
}

impl PartialEq for Pixel {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pixel {}

impl Hash for Pixel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

// --- packed 0xAARRGGBB helpers ---

#[inline(always)]
pub fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

#[inline(always)]
pub fn red(argb: u32) -> u8 {
    (argb >> 16) as u8
}

#[inline(always)]
pub fn green(argb: u32) -> u8 {
    (argb >> 8) as u8
}

#[inline(always)]
pub fn blue(argb: u32) -> u8 {
    argb as u8
}

/// Pack opaque RGB into `0xFFRRGGBB`.
#[inline(always)]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

#[inline(always)]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Convert a unit-range channel to a byte, rounding half away from zero.
#[inline(always)]
pub(crate) fn unit_to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
