//! Color space tags, channel selectors and the packed-ARGB converters.

use core::fmt;
use core::str::FromStr;

use crate::cylindrical::{hsb_to_rgb, hsl_to_rgb, rgb_to_hsb, rgb_to_hsl};
use crate::error::QuantizeError;
use crate::oklab::{OKLab, oklab_to_srgb, srgb_to_oklab};
use crate::pixel::{blue, green, pack_rgb, red, unit_to_u8};

/// Color space in which colors are partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Rgb,
    Hsl,
    Hsb,
    Oklab,
    /// RGB channels, ordered by summed intensity instead of channel priority.
    Grayscale,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 5] = [
        Self::Rgb,
        Self::Hsl,
        Self::Hsb,
        Self::Oklab,
        Self::Grayscale,
    ];

    /// Identifier as accepted by [`FromStr`].
    pub fn id(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Hsl => "HSL",
            Self::Hsb => "HSB",
            Self::Oklab => "OKLAB",
            Self::Grayscale => "GRAYSCALE",
        }
    }

    /// Whether the first channel is a periodic hue in [0, 1).
    pub fn is_circular(self) -> bool {
        matches!(self, Self::Hsl | Self::Hsb)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ColorSpace {
    type Err = QuantizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|space| space.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| QuantizeError::UnknownColorSpace(s.to_owned()))
    }
}

/// One entry of a channel priority list.
///
/// Channels are positional; the associated constants give them their name in
/// each color space (`Channel::HUE == Channel::First`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    #[default]
    None,
    First,
    Second,
    Third,
}

impl Channel {
    pub const RED: Channel = Channel::First;
    pub const GREEN: Channel = Channel::Second;
    pub const BLUE: Channel = Channel::Third;

    pub const HUE: Channel = Channel::First;
    pub const SATURATION: Channel = Channel::Second;
    pub const LIGHTNESS: Channel = Channel::Third;
    pub const BRIGHTNESS: Channel = Channel::Third;

    pub const OKLAB_L: Channel = Channel::First;
    pub const OKLAB_A: Channel = Channel::Second;
    pub const OKLAB_B: Channel = Channel::Third;

    /// Channel index, or `None` for [`Channel::None`].
    pub fn index(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::First => Some(0),
            Self::Second => Some(1),
            Self::Third => Some(2),
        }
    }
}

/// Bidirectional packed-ARGB ↔ normalized 3-channel converter.
///
/// Alpha is ignored on the way in; the way out always yields an opaque color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Linear 0..255 → [0, 1] scaling.
    Rgb,
    /// (hue, saturation, lightness), hue in [0, 1).
    Hsl,
    /// (hue, saturation, brightness), hue in [0, 1).
    Hsb,
    /// (L, a, b), unnormalized; inverse is gamut mapped.
    Oklab,
}

impl Converter {
    pub fn to_normalized(self, argb: u32) -> [f32; 3] {
        let (r, g, b) = (red(argb), green(argb), blue(argb));
        match self {
            Self::Rgb => [
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
            ],
            Self::Hsl => rgb_to_hsl(r, g, b).map(|v| v as f32),
            Self::Hsb => rgb_to_hsb(r, g, b).map(|v| v as f32),
            Self::Oklab => {
                let lab = srgb_to_oklab(r, g, b);
                [lab.l, lab.a, lab.b]
            }
        }
    }

    /// Inverse of [`to_normalized`](Self::to_normalized), as opaque `0xFFRRGGBB`.
    pub fn to_packed_rgb(self, values: [f32; 3]) -> u32 {
        let [x, y, z] = values.map(|v| v as f64);
        let (r, g, b) = match self {
            Self::Rgb => (unit_to_u8(x), unit_to_u8(y), unit_to_u8(z)),
            Self::Hsl => hsl_to_rgb(x, y, z),
            Self::Hsb => hsb_to_rgb(x, y, z),
            Self::Oklab => oklab_to_srgb(OKLab::new(values[0], values[1], values[2])),
        };
        pack_rgb(r, g, b)
    }
}

/// Explicit color-space → converter mapping, built once and passed to the
/// extractor and palette conversion.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    entries: Vec<(ColorSpace, Converter)>,
}

impl ConverterRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in converters. Grayscale reuses the RGB converter.
    pub fn builtin() -> Self {
        Self::empty()
            .register(ColorSpace::Rgb, Converter::Rgb)
            .register(ColorSpace::Hsl, Converter::Hsl)
            .register(ColorSpace::Hsb, Converter::Hsb)
            .register(ColorSpace::Oklab, Converter::Oklab)
            .register(ColorSpace::Grayscale, Converter::Rgb)
    }

    /// Register (or replace) the converter for `space`.
    pub fn register(mut self, space: ColorSpace, converter: Converter) -> Self {
        match self.entries.iter_mut().find(|(s, _)| *s == space) {
            Some(entry) => entry.1 = converter,
            None => self.entries.push((space, converter)),
        }
        self
    }

    pub fn get(&self, space: ColorSpace) -> Result<Converter, QuantizeError> {
        self.entries
            .iter()
            .find(|(s, _)| *s == space)
            .map(|&(_, c)| c)
            .ok_or(QuantizeError::NoConverter(space))
    }
}
