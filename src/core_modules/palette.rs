// THEORY:
// The `Palette` owns the per-region fill colours. Colours are purely visual,
// so this module is the only place that decides what a region looks like:
//
// - Each region starts with a random light colour (every RGB channel drawn from
//   `[100, 255]`, alpha 200) so labels stay readable on top of it.
// - The hovered region is painted from the hover phase instead, mapped around
//   the HSV hue wheel. When the hover moves on, the region keeps the last
//   colour it was shown in.
// - A press-and-hold tick re-rolls the base colour of the region under the pointer.
//
// All randomness comes from a seedable `ChaCha8Rng` so a scene can be replayed.

use crate::core_modules::geometry::RegionIndex;
use crate::core_modules::hover_tracker::FULL_TURN;
use ::palette::{FromColor, Hsv, Srgb};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type Channel = u8;

const MIN_CHANNEL: Channel = 100;
const REGION_ALPHA: Channel = 200;
const HOVER_SATURATION: f64 = 0.45;
const HOVER_VALUE: f64 = 1.0;

/// A "dumb" RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
    pub alpha: Channel,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const HIGHLIGHT: Color = Color::new(255, 255, 0, 255);
    pub const BACKGROUND: Color = Color::new(240, 240, 240, 255);

    pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// A random light colour for a region fill.
    pub fn random_light<R: Rng>(rng: &mut R) -> Self {
        Self::new(
            rng.random_range(MIN_CHANNEL..=Channel::MAX),
            rng.random_range(MIN_CHANNEL..=Channel::MAX),
            rng.random_range(MIN_CHANNEL..=Channel::MAX),
            REGION_ALPHA,
        )
    }

    /// HSV to RGB. `hue` is in degrees and wraps; saturation and value are clamped to `[0, 1]`.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64, alpha: Channel) -> Self {
        let hsv: Hsv = Hsv::new(
            hue.rem_euclid(FULL_TURN) as f32,
            saturation.clamp(0.0, 1.0) as f32,
            value.clamp(0.0, 1.0) as f32,
        );
        let rgb: Srgb<u8> = Srgb::from_color(hsv).into_format();
        Self::new(rgb.red, rgb.green, rgb.blue, alpha)
    }

    /// The colour of the hovered region at animation phase `phase` (degrees).
    pub fn from_phase(phase: f64) -> Self {
        Self::from_hsv(phase, HOVER_SATURATION, HOVER_VALUE, REGION_ALPHA)
    }

    /// Source-over blend of `self` on top of an opaque `base`.
    pub fn over(&self, base: Color) -> Color {
        let a = self.alpha as u16;
        let blend = |top: Channel, bottom: Channel| -> Channel {
            ((top as u16 * a + bottom as u16 * (255 - a) + 127) / 255) as Channel
        };
        Color::new(
            blend(self.red, base.red),
            blend(self.green, base.green),
            blend(self.blue, base.blue),
            255,
        )
    }
}

/// Base fill colours for every region.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
    rng: ChaCha8Rng,
}

impl Palette {
    pub fn new(region_count: usize, mut rng: ChaCha8Rng) -> Self {
        let colors = (0..region_count).map(|_| Color::random_light(&mut rng)).collect();
        Self { colors, rng }
    }

    pub fn seeded(region_count: usize, seed: u64) -> Self {
        Self::new(region_count, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn color(&self, region: RegionIndex) -> Option<Color> {
        self.colors.get(region).copied()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Replaces the base colour of `region`. Unknown regions are ignored.
    pub fn set(&mut self, region: RegionIndex, color: Color) -> bool {
        match self.colors.get_mut(region) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Draws a new base colour for `region`. Unknown regions are ignored.
    pub fn reroll(&mut self, region: RegionIndex) -> Option<Color> {
        let color = Color::random_light(&mut self.rng);
        let slot = self.colors.get_mut(region)?;
        *slot = color;
        Some(color)
    }
}
