use std::collections::BTreeMap;

use imgref::ImgRef;
use rayon::prelude::*;

use crate::colorspace::{ColorSpace, Converter, ConverterRegistry};
use crate::error::QuantizeError;
use crate::pixel::Pixel;

type UniqueMap = BTreeMap<[u32; 3], Pixel>;

/// Fold one row into a worker-local map. Identical channel values merge by
/// incrementing the stored count.
fn accumulate_row(mut map: UniqueMap, row: &[u32], converter: Converter) -> UniqueMap {
    for &argb in row {
        let pixel = Pixel::from_values(converter.to_normalized(argb));
        map.entry(pixel.key())
            .and_modify(|e| e.count += 1)
            .or_insert(pixel);
    }
    map
}

/// Merge two worker maps, summing counts of shared keys.
fn merge_maps(a: UniqueMap, b: UniqueMap) -> UniqueMap {
    let (mut into, from) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (key, pixel) in from {
        into.entry(key)
            .and_modify(|e| e.count += pixel.count)
            .or_insert(pixel);
    }
    into
}

/// Deduplicate an image into unique pixels in the given converter's space.
///
/// Rows are converted in parallel; each rayon worker folds into its own map
/// and the maps are merged pairwise, so no update is lost when two workers
/// see the same color. Returns once every row has been merged. The output is
/// ordered by channel bit pattern, which carries no meaning but keeps results
/// reproducible.
pub fn extract(image: ImgRef<'_, u32>, converter: Converter) -> Vec<Pixel> {
    let rows: Vec<&[u32]> = image.rows().collect();

    rows.par_iter()
        .fold(UniqueMap::new, |map, row| {
            accumulate_row(map, row, converter)
        })
        .reduce(UniqueMap::new, merge_maps)
        .into_values()
        .collect()
}

/// Deduplicate an image into unique pixels of `space`, looking the converter
/// up in `registry`.
pub fn build_histogram(
    image: ImgRef<'_, u32>,
    registry: &ConverterRegistry,
    space: ColorSpace,
) -> Result<Vec<Pixel>, QuantizeError> {
    let converter = registry.get(space)?;
    Ok(extract(image, converter))
}

/// Number of distinct colors the image has in `space`.
pub fn unique_color_count(
    image: ImgRef<'_, u32>,
    registry: &ConverterRegistry,
    space: ColorSpace,
) -> Result<usize, QuantizeError> {
    build_histogram(image, registry, space).map(|pixels| pixels.len())
}
