use thiserror::Error;

use crate::colorspace::ColorSpace;

#[derive(Debug, Error)]
pub enum QuantizeError {
    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("bucket_count must be greater than zero, got {0}")]
    InvalidBucketCount(u32),

    #[error("channel priority accepts at most 3 entries, got {0}")]
    TooManyPriorities(usize),

    #[error("channel priority for {0} must name at least one channel")]
    NoActiveChannel(ColorSpace),

    #[error("unknown color space identifier {0:?}")]
    UnknownColorSpace(String),

    #[error("no converter registered for color space {0}")]
    NoConverter(ColorSpace),

    #[error("cannot build a nearest-color index from an empty palette")]
    EmptyPalette,

    #[error("no pixels to quantize")]
    EmptyInput,

    #[error("swatch cell size must be at least 1")]
    InvalidCellSize,
}
