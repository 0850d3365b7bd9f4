#![forbid(unsafe_code)]

//! Packed RGBA color used by overlay configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 32-bit RGBA color (`0xRRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Rgba(pub u32);

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba(0);

    /// Create an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create a color with alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Alpha as a `0.0..=1.0` opacity.
    #[inline]
    pub fn opacity(self) -> f64 {
        f64::from(self.a()) / 255.0
    }

    /// Same color with a new alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::Rgba;

    #[test]
    fn channels_round_trip() {
        let c = Rgba::rgba(10, 20, 30, 40);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (10, 20, 30, 40));
        assert_eq!(c.with_alpha(255), Rgba::rgb(10, 20, 30));
    }

    #[test]
    fn opacity_scale() {
        assert_eq!(Rgba::TRANSPARENT.opacity(), 0.0);
        assert_eq!(Rgba::rgb(0, 0, 0).opacity(), 1.0);
    }
}
