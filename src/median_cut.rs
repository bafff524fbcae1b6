use core::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::bucket::{Bucket, Geometry};
use crate::error::QuantizeError;
use crate::pixel::Pixel;

/// Heap entry ordering buckets by variation, highest first.
struct ByVariation(Bucket);

impl PartialEq for ByVariation {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByVariation {}

impl PartialOrd for ByVariation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByVariation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.variation().total_cmp(&other.0.variation())
    }
}

/// Split buckets of the already-sorted unique `pixels` until `bucket_count`
/// buckets exist, always splitting the bucket with the highest variation.
///
/// Stops early when the highest-variation bucket holds a single pixel, so the
/// result may have fewer entries than requested (never more than the number
/// of unique pixels). Returns one averaged pixel per final bucket, in no
/// particular order.
pub fn median_cut(
    pixels: Vec<Pixel>,
    bucket_count: usize,
    geometry: Geometry,
) -> Result<Vec<Pixel>, QuantizeError> {
    if pixels.is_empty() {
        return Err(QuantizeError::EmptyInput);
    }
    if bucket_count == 0 {
        return Err(QuantizeError::InvalidBucketCount(0));
    }

    let mut queue = BinaryHeap::with_capacity(bucket_count.min(pixels.len()) + 1);
    queue.push(ByVariation(Bucket::new(pixels, geometry)));

    while queue.len() < bucket_count {
        let Some(ByVariation(bucket)) = queue.pop() else {
            break;
        };
        let Some((first, second)) = bucket.split() else {
            // Highest spread is a lone pixel; nothing left worth splitting.
            queue.push(ByVariation(bucket));
            break;
        };
        for half in [first, second] {
            if !half.is_empty() {
                queue.push(ByVariation(half));
            }
        }
    }

    log::trace!("median cut settled on {} buckets", queue.len());

    Ok(queue.into_iter().map(|ByVariation(b)| b.average()).collect())
}
