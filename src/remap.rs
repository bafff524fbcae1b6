use imgref::{Img, ImgRef, ImgVec};
use rayon::prelude::*;

use crate::kdtree::KdTree;

/// Replace the RGB of one packed pixel with its nearest palette color,
/// keeping the source alpha.
#[inline]
pub fn remap_pixel(argb: u32, tree: &KdTree) -> u32 {
    (argb & 0xFF00_0000) | (tree.nearest_color(argb) & 0x00FF_FFFF)
}

/// Rows per stripe when `height` rows are shared across `workers` tasks.
fn stripe_rows(height: usize, workers: usize) -> usize {
    height.div_ceil(workers.max(1)).max(1)
}

/// Remap every pixel of `image` to its nearest palette color.
pub fn remap_image(image: ImgRef<'_, u32>, tree: &KdTree) -> ImgVec<u32> {
    map_stripes(image, |argb| remap_pixel(argb, tree))
}

/// Apply `f` to every pixel of `image` into a new image.
///
/// The output is cut into contiguous horizontal stripes, one per rayon
/// worker; each task writes only its own stripe and reads the source. Returns
/// after every stripe is written. A panic in any task is resumed on the
/// calling thread by rayon, so a partially written image never escapes.
fn map_stripes<F>(image: ImgRef<'_, u32>, f: F) -> ImgVec<u32>
where
    F: Fn(u32) -> u32 + Sync,
{
    let (width, height) = (image.width(), image.height());
    let mut out = vec![0u32; width * height];
    if out.is_empty() {
        return Img::new(out, width, height);
    }

    let rows_per_stripe = stripe_rows(height, rayon::current_num_threads());

    out.par_chunks_mut(rows_per_stripe * width)
        .enumerate()
        .for_each(|(stripe, dst)| {
            let y0 = stripe * rows_per_stripe;
            let rows = dst.len() / width;
            let src = image.sub_image(0, y0, width, rows);
            for (dst_row, src_row) in dst.chunks_exact_mut(width).zip(src.rows()) {
                for (d, &s) in dst_row.iter_mut().zip(src_row) {
                    *d = f(s);
                }
            }
        });

    Img::new(out, width, height)
}
