use std::collections::BTreeSet;

use imgref::{Img, ImgVec};
use mediancut::bucket::{Bucket, Geometry};
use mediancut::oklab::{GAMUT_MAX_STEPS, OKLab, oklab_to_linear_gamut_mapped};
use mediancut::pixel::pack_argb;
use mediancut::{
    Channel, ColorSpace, Converter, ConverterRegistry, KdTree, Pixel, QuantizeConfig, histogram,
};

/// Knuth's multiplicative hash, for reproducible noise.
fn hash(i: u32) -> u32 {
    i.wrapping_mul(2654435761)
}

/// Noise image with varying alpha and a limited number of base colors so the
/// unique count stays well defined.
fn noisy_image(width: usize, height: usize, levels: u32) -> ImgVec<u32> {
    let buf = (0..(width * height) as u32)
        .map(|i| {
            let h = hash(i);
            let pick = |shift: u32| ((h >> shift) % levels * (255 / (levels - 1).max(1))) as u8;
            pack_argb((h >> 24) as u8, pick(0), pick(8), pick(16))
        })
        .collect();
    Img::new(buf, width, height)
}

fn distinct_rgb(pixels: impl Iterator<Item = u32>) -> BTreeSet<u32> {
    pixels.map(|p| p & 0x00FF_FFFF).collect()
}

fn priorities(space: ColorSpace) -> Vec<Vec<Channel>> {
    match space {
        ColorSpace::Grayscale => vec![vec![]],
        _ => vec![
            vec![Channel::First],
            vec![Channel::Third, Channel::None, Channel::First],
            vec![Channel::Second, Channel::Second, Channel::Third],
        ],
    }
}

#[test]
fn dimensions_and_alpha_preserved() {
    let img = noisy_image(41, 17, 6);
    for space in ColorSpace::ALL {
        for priority in priorities(space) {
            let config = QuantizeConfig::new()
                .color_space(space)
                .channel_priority(priority)
                .bucket_count(12);
            let result = mediancut::quantize(img.as_ref(), &config).unwrap();
            let out = result.image();
            assert_eq!((out.width(), out.height()), (41, 17), "{space}");
            for (src, dst) in img.pixels().zip(out.pixels()) {
                assert_eq!(src >> 24, dst >> 24, "{space}");
            }
        }
    }
}

#[test]
fn color_count_is_bounded() {
    for (levels, buckets) in [(2, 3), (3, 8), (6, 32), (6, 500), (16, 64)] {
        let img = noisy_image(33, 29, levels);
        let source_colors = distinct_rgb(img.pixels()).len();
        for space in ColorSpace::ALL {
            for priority in priorities(space) {
                let config = QuantizeConfig::new()
                    .color_space(space)
                    .channel_priority(priority)
                    .bucket_count(buckets);
                let result = mediancut::quantize(img.as_ref(), &config).unwrap();
                let out_colors = distinct_rgb(result.image().pixels()).len();
                assert!(out_colors <= buckets as usize, "{space}: {out_colors}");
                assert!(out_colors <= source_colors, "{space}: {out_colors}");
                assert!(result.palette().len() <= source_colors);
            }
        }
    }
}

#[test]
fn every_pixel_maps_to_its_nearest_entry() {
    let img = noisy_image(24, 24, 8);
    let config = QuantizeConfig::new()
        .color_space(ColorSpace::Oklab)
        .channel_priority([Channel::OKLAB_L, Channel::OKLAB_A])
        .bucket_count(10);
    let result = mediancut::quantize(img.as_ref(), &config).unwrap();
    let palette = result.palette().packed_rgb();

    let dist = |a: u32, b: u32| -> i32 {
        [16, 8, 0]
            .iter()
            .map(|&s| (((a >> s) & 0xFF) as i32 - ((b >> s) & 0xFF) as i32).pow(2))
            .sum()
    };
    for (src, dst) in img.pixels().zip(result.image().pixels()) {
        let best = palette.iter().map(|&c| dist(src, c)).min().unwrap();
        assert_eq!(dist(src, dst), best);
    }
}

#[test]
fn converters_round_trip() {
    for conv in [Converter::Rgb, Converter::Hsl, Converter::Hsb, Converter::Oklab] {
        for i in 0..4096u32 {
            let c = hash(i) | 0xFF00_0000;
            let back = conv.to_packed_rgb(conv.to_normalized(c));
            for shift in [16, 8, 0] {
                let a = ((c >> shift) & 0xFF) as i32;
                let b = ((back >> shift) & 0xFF) as i32;
                assert!(
                    (a - b).abs() <= 1,
                    "{conv:?}: {c:08x} came back as {back:08x}"
                );
            }
        }
    }
}

#[test]
fn oklab_gamut_mapping_converges() {
    for i in 0..2000u32 {
        let h = hash(i + 17);
        let l = (h & 0xFF) as f32 / 255.0;
        let a = ((h >> 8) & 0xFF) as f32 / 255.0 - 0.5;
        let b = ((h >> 16) & 0xFF) as f32 / 255.0 - 0.5;
        let (rgb, steps) = oklab_to_linear_gamut_mapped(OKLab::new(l, a, b));
        assert!(steps <= GAMUT_MAX_STEPS);
        for c in rgb {
            assert!((-1e-3..=1.0 + 1e-3).contains(&c), "L={l} a={a} b={b}: {rgb:?}");
        }
    }
}

#[test]
fn identical_pixels_deduplicate() {
    let registry = ConverterRegistry::builtin();
    for k in [1usize, 2, 9, 1000] {
        let buf = vec![pack_argb(0x7F, 33, 66, 99); k];
        let img = Img::new(&buf[..], k, 1);
        for space in ColorSpace::ALL {
            let converter = registry.get(space).unwrap();
            let unique = histogram::extract(img, converter);
            assert_eq!(unique.len(), 1);
            assert_eq!(unique[0].count as usize, k);
        }
    }
}

#[test]
fn circular_halves_are_contiguous_arcs() {
    for n in [2u32, 3, 7, 20, 64] {
        for offset in [0u32, 13, 50, 97] {
            // Distinct hues, some straddling the 0/1 seam.
            let pixels: Vec<Pixel> = (0..n)
                .map(|i| {
                    let hue = ((i * 37 + offset) % 100) as f32 / 100.0;
                    Pixel::new(hue, 0.5, 0.5)
                })
                .collect();
            let bucket = Bucket::new(pixels, Geometry::Circular);
            let (first, second) = bucket.split().unwrap();
            assert_eq!(first.len() + second.len(), n as usize);

            let mut labelled: Vec<(f32, bool)> = first
                .pixels()
                .iter()
                .map(|p| (p.channel(0), true))
                .chain(second.pixels().iter().map(|p| (p.channel(0), false)))
                .collect();
            labelled.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Walking the circle once, the half changes at most twice.
            let changes = (0..labelled.len())
                .filter(|&i| labelled[i].1 != labelled[(i + 1) % labelled.len()].1)
                .count();
            assert!(changes <= 2, "n={n} offset={offset}: {labelled:?}");
        }
    }
}

#[test]
fn kdtree_matches_brute_force() {
    for size in 1..=12u32 {
        let palette: Vec<u32> = (0..size).map(|i| hash(i * 31 + size) | 0xFF00_0000).collect();
        let tree = KdTree::new(palette.clone()).unwrap();
        for q in 0..300u32 {
            let c = hash(q ^ 0xABCD);
            let (r, g, b) = ((c >> 16) as u8, (c >> 8) as u8, c as u8);
            let d = |p: u32| {
                let dr = r as i32 - ((p >> 16) & 0xFF) as i32;
                let dg = g as i32 - ((p >> 8) & 0xFF) as i32;
                let db = b as i32 - (p & 0xFF) as i32;
                dr * dr + dg * dg + db * db
            };
            let best = palette.iter().map(|&p| d(p)).min().unwrap();
            assert_eq!(d(palette[tree.nearest(r, g, b)]), best, "size {size}");
        }
    }
}

#[test]
fn unique_count_bounds_palette() {
    let img = noisy_image(20, 20, 3);
    let registry = ConverterRegistry::builtin();
    let unique =
        histogram::unique_color_count(img.as_ref(), &registry, ColorSpace::Rgb).unwrap();
    assert_eq!(unique, distinct_rgb(img.pixels()).len());

    let config = QuantizeConfig::new().bucket_count(unique as u32 + 10);
    let result = mediancut::quantize(img.as_ref(), &config).unwrap();
    assert_eq!(result.palette().len(), unique);
}
