use std::f64::consts::TAU;
use std::sync::{Arc, OnceLock};

use crate::cylindrical::normalize_hue;
use crate::pixel::Pixel;

/// How a bucket treats its first channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// All three channels are ordinary linear values.
    Linear,
    /// Channel 0 is a hue on the unit circle; channels 1 and 2 are linear.
    Circular,
}

/// A contiguous index range `[start, end)` over an immutable, already-sorted
/// pixel sequence.
///
/// Buckets never mutate the sequence they view. A circular split builds a new
/// rotated sequence for its halves instead of reordering the parent's.
/// Variation is computed on first access and cached.
#[derive(Debug, Clone)]
pub struct Bucket {
    pixels: Arc<[Pixel]>,
    start: usize,
    end: usize,
    geometry: Geometry,
    variation: OnceLock<f64>,
}

impl Bucket {
    /// Root bucket spanning all of `pixels`.
    pub fn new(pixels: Vec<Pixel>, geometry: Geometry) -> Self {
        let end = pixels.len();
        Self::over(pixels.into(), 0, end, geometry)
    }

    fn over(pixels: Arc<[Pixel]>, start: usize, end: usize, geometry: Geometry) -> Self {
        debug_assert!(start <= end && end <= pixels.len());
        Self {
            pixels,
            start,
            end,
            geometry,
            variation: OnceLock::new(),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The pixels this bucket covers, in order.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels[self.start..self.end]
    }

    /// Variance-like spread used to pick the next bucket to split.
    pub fn variation(&self) -> f64 {
        *self.variation.get_or_init(|| match self.geometry {
            Geometry::Linear => self.linear_variation(),
            Geometry::Circular => self.circular_variation(),
        })
    }

    /// Split into two halves at the midpoint, or `None` if fewer than two
    /// pixels remain.
    ///
    /// Linear buckets bisect their range of the shared order as is. Circular
    /// buckets first order their pixels by hue and rotate that ring so the
    /// widest hue gap becomes the sequence boundary, then bisect.
    pub fn split(&self) -> Option<(Bucket, Bucket)> {
        if self.len() < 2 {
            return None;
        }
        Some(match self.geometry {
            Geometry::Linear => {
                let mid = self.start + self.len() / 2;
                (
                    Self::over(self.pixels.clone(), self.start, mid, self.geometry),
                    Self::over(self.pixels.clone(), mid, self.end, self.geometry),
                )
            }
            Geometry::Circular => {
                let ring: Arc<[Pixel]> = rotate_to_widest_gap(self.pixels().to_vec()).into();
                let n = ring.len();
                (
                    Self::over(ring.clone(), 0, n / 2, self.geometry),
                    Self::over(ring, n / 2, n, self.geometry),
                )
            }
        })
    }

    /// Weighted average color. The result's count is the bucket's total
    /// occurrence count.
    pub fn average(&self) -> Pixel {
        let total_count: u32 = self.pixels().iter().map(|p| p.count).sum();
        let values = match self.geometry {
            Geometry::Linear => {
                let (mean, _) = linear_mean(self.pixels(), 0..3, false);
                mean
            }
            Geometry::Circular => {
                if self.is_empty() {
                    [0.0; 3]
                } else {
                    let uniform = all_weightless(self.pixels());
                    let hue = circular_stats(self.pixels(), uniform);
                    let (mean, _) = linear_mean(self.pixels(), 1..3, uniform);
                    [hue.mean, mean[1], mean[2]]
                }
            }
        };
        Pixel::with_count(values.map(|v| v as f32), total_count)
    }

    /// Sum over channels of the weighted squared deviation from the weighted
    /// mean, divided by total weight (taken as 1 if zero).
    fn linear_variation(&self) -> f64 {
        let (mean, total) = linear_mean(self.pixels(), 0..3, false);
        spread(self.pixels(), 0..3, &mean, total, false)
    }

    /// Circular variance `1 - R` of the hue plus the linear variances of the
    /// two remaining channels. Weights fall back to 1 per pixel when every
    /// count is zero.
    fn circular_variation(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let uniform = all_weightless(self.pixels());
        let hue = circular_stats(self.pixels(), uniform);
        let (mean, total) = linear_mean(self.pixels(), 1..3, uniform);
        (1.0 - hue.resultant) + spread(self.pixels(), 1..3, &mean, total, uniform)
    }
}

#[inline]
fn weight(p: &Pixel, uniform: bool) -> f64 {
    if uniform { 1.0 } else { p.count as f64 }
}

fn all_weightless(pixels: &[Pixel]) -> bool {
    pixels.iter().all(|p| p.count == 0)
}

/// Weighted per-channel means over `channels` (others left 0) and the total
/// weight used as divisor (never 0).
fn linear_mean(
    pixels: &[Pixel],
    channels: core::ops::Range<usize>,
    uniform: bool,
) -> ([f64; 3], f64) {
    let mut sums = [0.0f64; 3];
    let mut total = 0.0f64;
    for p in pixels {
        let w = weight(p, uniform);
        for c in channels.clone() {
            sums[c] += p.channel(c) as f64 * w;
        }
        total += w;
    }
    if total == 0.0 {
        total = 1.0;
    }
    for c in channels {
        sums[c] /= total;
    }
    (sums, total)
}

fn spread(
    pixels: &[Pixel],
    channels: core::ops::Range<usize>,
    mean: &[f64; 3],
    total: f64,
    uniform: bool,
) -> f64 {
    let mut acc = 0.0f64;
    for p in pixels {
        let w = weight(p, uniform);
        for c in channels.clone() {
            let d = p.channel(c) as f64 - mean[c];
            acc += w * d * d;
        }
    }
    acc / total
}

struct HueStats {
    /// Mean direction in [0, 1).
    mean: f64,
    /// Resultant length normalized by total weight, in [0, 1].
    resultant: f64,
}

/// Weighted mean direction of channel 0 on the unit circle.
fn circular_stats(pixels: &[Pixel], uniform: bool) -> HueStats {
    let mut sum_cos = 0.0f64;
    let mut sum_sin = 0.0f64;
    let mut total = 0.0f64;
    for p in pixels {
        let w = weight(p, uniform);
        let theta = normalize_hue(p.channel(0) as f64) * TAU;
        sum_cos += w * theta.cos();
        sum_sin += w * theta.sin();
        total += w;
    }
    let resultant = if total > 0.0 {
        (sum_cos * sum_cos + sum_sin * sum_sin).sqrt() / total
    } else {
        0.0
    };
    HueStats {
        mean: normalize_hue(sum_sin.atan2(sum_cos) / TAU),
        resultant,
    }
}

/// Sort by hue and rotate so the widest gap between neighbours on the
/// circle (including the wraparound gap) sits between the last and first
/// element.
pub(crate) fn rotate_to_widest_gap(mut ring: Vec<Pixel>) -> Vec<Pixel> {
    let hue = |p: &Pixel| normalize_hue(p.channel(0) as f64);
    ring.sort_by(|a, b| hue(a).total_cmp(&hue(b)));

    let n = ring.len();
    if n < 2 {
        return ring;
    }

    let mut widest = (n - 1, hue(&ring[0]) + 1.0 - hue(&ring[n - 1]));
    for i in 0..n - 1 {
        let gap = hue(&ring[i + 1]) - hue(&ring[i]);
        if gap > widest.1 {
            widest = (i, gap);
        }
    }

    if widest.0 != n - 1 {
        ring.rotate_left(widest.0 + 1);
    }
    ring
}
