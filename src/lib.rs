#![forbid(unsafe_code)]

pub mod bucket;
pub mod colorspace;
pub mod cylindrical;
pub mod error;
pub mod histogram;
pub mod kdtree;
pub mod median_cut;
pub mod oklab;
pub mod palette;
pub mod pixel;
pub mod remap;
pub mod sort;

pub use colorspace::{Channel, ColorSpace, Converter, ConverterRegistry};
pub use error::QuantizeError;
pub use kdtree::KdTree;
pub use palette::Palette;
pub use pixel::Pixel;

use std::time::Instant;

use imgref::{Img, ImgRef, ImgVec};

use bucket::Geometry;

/// Channel priority lists hold at most this many entries.
pub const MAX_PRIORITIES: usize = 3;

/// Configuration for median-cut quantization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizeConfig {
    /// Space in which colors are deduplicated, sorted and split.
    pub color_space: ColorSpace,
    /// Sort order of the unique colors, most significant first. Ignored for
    /// [`ColorSpace::Grayscale`].
    pub channel_priority: Vec<Channel>,
    /// Requested palette size. The result can be smaller when the image has
    /// fewer unique colors.
    pub bucket_count: u32,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Rgb,
            channel_priority: vec![Channel::RED],
            bucket_count: 16,
        }
    }
}

impl QuantizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_space(mut self, space: ColorSpace) -> Self {
        self.color_space = space;
        self
    }

    pub fn channel_priority(mut self, priority: impl Into<Vec<Channel>>) -> Self {
        self.channel_priority = priority.into();
        self
    }

    pub fn bucket_count(mut self, n: u32) -> Self {
        self.bucket_count = n;
        self
    }

    /// Check the configuration before any pixel is touched.
    pub fn validate(&self) -> Result<(), QuantizeError> {
        if self.bucket_count == 0 {
            return Err(QuantizeError::InvalidBucketCount(self.bucket_count));
        }
        if self.channel_priority.len() > MAX_PRIORITIES {
            return Err(QuantizeError::TooManyPriorities(
                self.channel_priority.len(),
            ));
        }
        if self.color_space != ColorSpace::Grayscale
            && sort::active_channels(&self.channel_priority).is_empty()
        {
            return Err(QuantizeError::NoActiveChannel(self.color_space));
        }
        Ok(())
    }
}

/// Result of quantization: the recolored image and the palette it uses.
#[derive(Debug, Clone)]
pub struct QuantizeResult {
    image: ImgVec<u32>,
    palette: Palette,
}

impl QuantizeResult {
    /// Recolored packed `0xAARRGGBB` image, same dimensions and alpha as the
    /// source.
    pub fn image(&self) -> ImgRef<'_, u32> {
        self.image.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn into_parts(self) -> (ImgVec<u32>, Palette) {
        (self.image, self.palette)
    }
}

/// Run `f` as the named pipeline stage, logging how long it took.
fn timed<T>(stage: &str, f: impl FnOnce() -> T) -> T {
    log::trace!("{stage} started");
    let t = Instant::now();
    let out = f();
    log::debug!(
        "{stage} took {:.2}ms",
        t.elapsed().as_secs_f64() * 1000.0
    );
    out
}

/// Quantize a packed `0xAARRGGBB` image with the built-in converters.
pub fn quantize(
    image: ImgRef<'_, u32>,
    config: &QuantizeConfig,
) -> Result<QuantizeResult, QuantizeError> {
    quantize_with(image, &ConverterRegistry::builtin(), config)
}

/// Quantize a packed `0xAARRGGBB` image, looking converters up in `registry`.
///
/// Stages run in order: extract unique colors, sort them, split buckets,
/// convert the averaged buckets back to sRGB, index the palette, remap every
/// pixel. Any failure aborts the run before an image is produced.
pub fn quantize_with(
    image: ImgRef<'_, u32>,
    registry: &ConverterRegistry,
    config: &QuantizeConfig,
) -> Result<QuantizeResult, QuantizeError> {
    config.validate()?;
    let space = config.color_space;
    let converter = registry.get(space)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(QuantizeError::EmptyInput);
    }

    let mut unique = timed("extract", || histogram::extract(image, converter));
    log::debug!(
        "{}x{} image has {} unique colors in {space}",
        image.width(),
        image.height(),
        unique.len()
    );

    timed("sort", || {
        sort::sort_pixels(&mut unique, space, &config.channel_priority)
    });

    let geometry = if space.is_circular() {
        Geometry::Circular
    } else {
        Geometry::Linear
    };
    let averaged = timed("median cut", || {
        median_cut::median_cut(unique, config.bucket_count as usize, geometry)
    })?;

    let palette = timed("palette conversion", || {
        Palette::from_entries(averaged, converter)
    });
    log::debug!(
        "palette has {} of {} requested colors",
        palette.len(),
        config.bucket_count
    );

    let tree = timed("index build", || palette.index())?;
    let image = timed("remap", || remap::remap_image(image, &tree));

    Ok(QuantizeResult { image, palette })
}

/// Quantize a contiguous row-major buffer of packed `0xAARRGGBB` pixels.
pub fn quantize_argb(
    pixels: &[u32],
    width: usize,
    height: usize,
    config: &QuantizeConfig,
) -> Result<QuantizeResult, QuantizeError> {
    validate_inputs(pixels.len(), width, height)?;
    quantize(Img::new(pixels, width, height), config)
}

fn validate_inputs(pixel_count: usize, width: usize, height: usize) -> Result<(), QuantizeError> {
    if width == 0 || height == 0 {
        return Err(QuantizeError::ZeroDimension);
    }
    if Some(pixel_count) != width.checked_mul(height) {
        return Err(QuantizeError::DimensionMismatch {
            len: pixel_count,
            width,
            height,
        });
    }
    Ok(())
}
