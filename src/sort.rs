use core::cmp::Ordering;

use crate::colorspace::{Channel, ColorSpace};
use crate::pixel::Pixel;

/// Active channel indices of a priority list, in order, `None` entries
/// skipped. Duplicates are kept; a repeated channel just never breaks a tie.
pub fn active_channels(priority: &[Channel]) -> Vec<usize> {
    priority.iter().filter_map(|c| c.index()).collect()
}

/// Reorder unique pixels once, establishing the order every bucket split
/// bisects.
///
/// Grayscale ignores `priority` and sorts by summed intensity. Otherwise the
/// sort is lexicographic over the active channels of `priority`; with no
/// active channel the list is left untouched. The sort is stable.
pub fn sort_pixels(pixels: &mut [Pixel], space: ColorSpace, priority: &[Channel]) {
    if space == ColorSpace::Grayscale {
        pixels.sort_by(|a, b| a.intensity().total_cmp(&b.intensity()));
        return;
    }

    let channels = active_channels(priority);
    if channels.is_empty() {
        return;
    }

    pixels.sort_by(|a, b| {
        channels
            .iter()
            .map(|&c| a.channel(c).total_cmp(&b.channel(c)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
