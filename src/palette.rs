use imgref::{Img, ImgVec};
use rgb::RGBA8;

use crate::colorspace::Converter;
use crate::error::QuantizeError;
use crate::kdtree::KdTree;
use crate::pixel::{Pixel, blue, green, red};

/// A quantized palette: the averaged bucket colors in their working color
/// space alongside their opaque sRGB form.
#[derive(Debug, Clone)]
pub struct Palette {
    /// Averaged entries in the working color space. `count` is the number of
    /// source pixels the entry's bucket covered.
    entries: Vec<Pixel>,
    /// Opaque packed `0xFFRRGGBB` per entry (same order as `entries`).
    packed: Vec<u32>,
}

impl Palette {
    /// Convert averaged entries back to sRGB with `converter`.
    pub fn from_entries(entries: Vec<Pixel>, converter: Converter) -> Self {
        let packed = entries
            .iter()
            .map(|p| converter.to_packed_rgb(p.values()))
            .collect();
        Self { entries, packed }
    }

    /// Averaged entries in the working color space.
    pub fn entries(&self) -> &[Pixel] {
        &self.entries
    }

    /// Opaque packed `0xFFRRGGBB` entries.
    pub fn packed_rgb(&self) -> &[u32] {
        &self.packed
    }

    pub fn len(&self) -> usize {
        self.packed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Entries as opaque RGBA.
    pub fn entries_rgba(&self) -> Vec<RGBA8> {
        self.packed.iter().map(|&c| to_rgba(c)).collect()
    }

    /// Each entry repeated `count` times, in entry order. The length equals
    /// the number of source pixels the palette represents, not the palette
    /// size; use [`entries_rgba`](Self::entries_rgba) for one value per entry.
    pub fn expand_rgba(&self) -> Vec<RGBA8> {
        self.entries
            .iter()
            .zip(&self.packed)
            .flat_map(|(p, &c)| core::iter::repeat_n(to_rgba(c), p.count as usize))
            .collect()
    }

    /// Build the nearest-color index over this palette.
    pub fn index(&self) -> Result<KdTree, QuantizeError> {
        KdTree::new(self.packed.clone())
    }

    /// Render the palette as a square grid of `cell_size`×`cell_size` swatches,
    /// `ceil(sqrt(len))` cells per side, filled row by row. Cells past the end
    /// of the palette are transparent black.
    pub fn swatch_image(&self, cell_size: usize) -> Result<ImgVec<u32>, QuantizeError> {
        if self.is_empty() {
            return Err(QuantizeError::EmptyPalette);
        }
        if cell_size == 0 {
            return Err(QuantizeError::InvalidCellSize);
        }

        let cells = (self.len() as f64).sqrt().ceil() as usize;
        let side = cells * cell_size;
        let mut buf = vec![0u32; side * side];

        for (i, &color) in self.packed.iter().enumerate() {
            let (cx, cy) = (i % cells, i / cells);
            for y in cy * cell_size..(cy + 1) * cell_size {
                let row = y * side;
                buf[row + cx * cell_size..row + (cx + 1) * cell_size].fill(color);
            }
        }

        Ok(Img::new(buf, side, side))
    }
}

#[inline]
fn to_rgba(c: u32) -> RGBA8 {
    RGBA8::new(red(c), green(c), blue(c), 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::pack_rgb;

    fn rgb_palette(colors: &[(f32, f32, f32, u32)]) -> Palette {
        let entries = colors
            .iter()
            .map(|&(r, g, b, n)| Pixel::with_count([r, g, b], n))
            .collect();
        Palette::from_entries(entries, Converter::Rgb)
    }

    #[test]
    fn converts_entries_to_packed_rgb() {
        let p = rgb_palette(&[(1.0, 0.0, 0.0, 1), (0.0, 0.0, 1.0, 1)]);
        assert_eq!(p.packed_rgb(), &[pack_rgb(255, 0, 0), pack_rgb(0, 0, 255)]);
        assert_eq!(p.entries_rgba()[1], RGBA8::new(0, 0, 255, 255));
    }

    #[test]
    fn expand_repeats_by_count() {
        let p = rgb_palette(&[(1.0, 0.0, 0.0, 2), (0.0, 1.0, 0.0, 3)]);
        let expanded = p.expand_rgba();
        assert_eq!(expanded.len(), 5);
        assert_eq!(p.entries_rgba().len(), 2);
        assert_eq!(expanded[1], RGBA8::new(255, 0, 0, 255));
        assert_eq!(expanded[2], RGBA8::new(0, 255, 0, 255));
    }

    #[test]
    fn swatch_is_square() {
        let p = rgb_palette(&[
            (1.0, 0.0, 0.0, 1),
            (0.0, 1.0, 0.0, 1),
            (0.0, 0.0, 1.0, 1),
        ]);
        let img = p.swatch_image(4).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
        let buf = img.buf();
        assert_eq!(buf[0], pack_rgb(255, 0, 0));
        assert_eq!(buf[3 * 8 + 7], pack_rgb(0, 255, 0));
        assert_eq!(buf[4 * 8], pack_rgb(0, 0, 255));
        // fourth cell is unused
        assert_eq!(buf[7 * 8 + 7], 0);
    }

    #[test]
    fn swatch_rejects_bad_input() {
        let empty = Palette::from_entries(Vec::new(), Converter::Rgb);
        assert!(matches!(
            empty.swatch_image(1),
            Err(QuantizeError::EmptyPalette)
        ));
        let p = rgb_palette(&[(0.5, 0.5, 0.5, 1)]);
        assert!(matches!(p.swatch_image(0), Err(QuantizeError::InvalidCellSize)));
    }

    #[test]
    fn index_over_empty_palette_fails() {
        let empty = Palette::from_entries(Vec::new(), Converter::Oklab);
        assert!(matches!(empty.index(), Err(QuantizeError::EmptyPalette)));
    }
}
