//! Floating-point RGBA pixel and packed 8-bit channel orders.
//!
//! # Types
//!
//! - [`Pixel`] - four `f32` components (R, G, B, A), premultiplied alpha
//! - [`ChannelOrder`] - bit shift table describing how a codec packs four
//!   8-bit channels into one `u32`
//!
//! # Premultiplied Alpha
//!
//! RGB components already carry the alpha weighting. Arithmetic operators act
//! on all four components, alpha included, so that averaging or scaling a
//! premultiplied pixel stays premultiplied.
//!
//! # Packed Conversion
//!
//! Float to 8-bit clamps to [0, 1], scales by 255 and rounds to nearest.
//! 8-bit to float divides by 255. The round trip is lossy: it is exact only
//! for values on the 1/255 grid and otherwise within 1/255 per channel.
//!
//! ```
//! use pdiff_core::{ChannelOrder, Pixel};
//!
//! let p = Pixel::new(1.0, 0.0, 128.0 / 255.0, 1.0);
//! let word = p.to_packed(ChannelOrder::BGRA);
//! assert_eq!(Pixel::from_packed(word, ChannelOrder::BGRA), p);
//! ```
//!
//! # Memory Layout
//!
//! `#[repr(C)]` over a `[f32; 4]`: indexed access and the named accessors
//! address the same storage.

use crate::{Error, Result};
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign,
};

/// Index of the red component.
pub const RED: usize = 0;
/// Index of the green component.
pub const GREEN: usize = 1;
/// Index of the blue component.
pub const BLUE: usize = 2;
/// Index of the alpha component.
pub const ALPHA: usize = 3;

/// Converts a float component to 8 bits: clamp to [0, 1], scale, round.
#[inline]
pub fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Converts an 8-bit component to float in [0, 1].
#[inline]
pub fn dequantize(v: u8) -> f32 {
    v as f32 / 255.0
}

/// Bit positions of the four 8-bit channels inside a packed `u32`.
///
/// Codecs disagree on the packed layout; the order is always passed in
/// rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelOrder {
    shifts: [u32; 4],
}

impl ChannelOrder {
    /// Red in the low byte, alpha in the high byte (bytes R, G, B, A in
    /// little-endian memory).
    pub const RGBA: Self = Self {
        shifts: [0, 8, 16, 24],
    };

    /// Blue in the low byte, red at bit 16, alpha in the high byte (bytes
    /// B, G, R, A in little-endian memory, as DIB-style backends store them).
    pub const BGRA: Self = Self {
        shifts: [16, 8, 0, 24],
    };

    /// Alpha in the low byte, red in the high byte (bytes A, B, G, R in
    /// little-endian memory).
    pub const ABGR: Self = Self {
        shifts: [24, 16, 8, 0],
    };

    /// Creates a channel order from explicit shifts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannelOrder`] unless the four shifts are a
    /// permutation of `0, 8, 16, 24`.
    pub fn new(red: u32, green: u32, blue: u32, alpha: u32) -> Result<Self> {
        let shifts = [red, green, blue, alpha];
        let reject = |reason: &str| Error::InvalidChannelOrder {
            red,
            green,
            blue,
            alpha,
            reason: reason.to_string(),
        };

        if shifts.iter().any(|s| s % 8 != 0 || *s > 24) {
            return Err(reject("shifts must be one of 0, 8, 16, 24"));
        }
        let mut lanes = 0u8;
        for s in shifts {
            lanes |= 1 << (s / 8);
        }
        if lanes != 0b1111 {
            return Err(reject("two channels share a byte"));
        }
        Ok(Self { shifts })
    }

    /// Returns the bit shift for component `i` (0 = red .. 3 = alpha).
    #[inline]
    pub fn shift(&self, i: usize) -> u32 {
        self.shifts[i]
    }

    /// Packs four 8-bit channels (R, G, B, A) into one word.
    #[inline]
    pub fn pack(&self, rgba: [u8; 4]) -> u32 {
        rgba.iter()
            .zip(self.shifts)
            .fold(0u32, |word, (&c, s)| word | ((c as u32) << s))
    }

    /// Unpacks one word into four 8-bit channels (R, G, B, A).
    #[inline]
    pub fn unpack(&self, word: u32) -> [u8; 4] {
        self.shifts.map(|s| ((word >> s) & 0xFF) as u8)
    }
}

impl Default for ChannelOrder {
    fn default() -> Self {
        Self::RGBA
    }
}

/// Premultiplied RGBA pixel with `f32` components.
///
/// Components are nominally in [0, 1] but nothing enforces it; HDR sources
/// may carry values outside that range.
///
/// Equality is exact component comparison with no epsilon.
#[repr(C)]
#[derive(Copy, Clone, Default, PartialEq)]
pub struct Pixel {
    c: [f32; 4],
}

impl Pixel {
    /// Creates a pixel from four components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { c: [r, g, b, a] }
    }

    /// Creates an opaque pixel (alpha = 1.0).
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Broadcasts one value to all four components, alpha included.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Creates a pixel from an `[R, G, B, A]` array.
    #[inline]
    pub const fn from_array(c: [f32; 4]) -> Self {
        Self { c }
    }

    /// Creates an opaque pixel from an `[R, G, B]` array.
    #[inline]
    pub const fn from_rgb_array(rgb: [f32; 3]) -> Self {
        Self::rgb(rgb[0], rgb[1], rgb[2])
    }

    /// Creates a pixel from 8-bit components.
    #[inline]
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(dequantize(r), dequantize(g), dequantize(b), dequantize(a))
    }

    /// Unpacks a packed word laid out according to `order`.
    #[inline]
    pub fn from_packed(word: u32, order: ChannelOrder) -> Self {
        let [r, g, b, a] = order.unpack(word);
        Self::from_bytes(r, g, b, a)
    }

    /// Packs this pixel into a word laid out according to `order`.
    ///
    /// Each component is clamped to [0, 1] before scaling, so this is where
    /// out-of-range values are lost.
    #[inline]
    pub fn to_packed(&self, order: ChannelOrder) -> u32 {
        order.pack(self.to_bytes())
    }

    /// Quantizes all four components to 8 bits.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 4] {
        self.c.map(quantize)
    }

    /// Red component.
    #[inline]
    pub fn r(&self) -> f32 {
        self.c[RED]
    }

    /// Green component.
    #[inline]
    pub fn g(&self) -> f32 {
        self.c[GREEN]
    }

    /// Blue component.
    #[inline]
    pub fn b(&self) -> f32 {
        self.c[BLUE]
    }

    /// Alpha component.
    #[inline]
    pub fn a(&self) -> f32 {
        self.c[ALPHA]
    }

    /// Sets the red component.
    #[inline]
    pub fn set_r(&mut self, v: f32) {
        self.c[RED] = v;
    }

    /// Sets the green component.
    #[inline]
    pub fn set_g(&mut self, v: f32) {
        self.c[GREEN] = v;
    }

    /// Sets the blue component.
    #[inline]
    pub fn set_b(&mut self, v: f32) {
        self.c[BLUE] = v;
    }

    /// Sets the alpha component.
    #[inline]
    pub fn set_a(&mut self, v: f32) {
        self.c[ALPHA] = v;
    }

    /// Returns component `i` (0 = red, 1 = green, 2 = blue, 3 = alpha).
    ///
    /// # Panics
    ///
    /// Panics if `i > 3`.
    #[inline]
    pub fn component(&self, i: usize) -> f32 {
        self.c[i]
    }

    /// Sets component `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i > 3`.
    #[inline]
    pub fn set_component(&mut self, i: usize, v: f32) {
        self.c[i] = v;
    }

    /// Mutable reference to component `i`.
    #[inline]
    pub fn component_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.c[i]
    }

    /// Borrows the components as an `[R, G, B, A]` array.
    #[inline]
    pub fn as_array(&self) -> &[f32; 4] {
        &self.c
    }

    /// Returns the components as an `[R, G, B, A]` array.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        self.c
    }

    /// Returns `[R, G, B]`, dropping alpha.
    #[inline]
    pub fn rgb_triplet(&self) -> [f32; 3] {
        [self.c[RED], self.c[GREEN], self.c[BLUE]]
    }

    /// Returns `[R, G, B, A]`.
    #[inline]
    pub fn rgba_quad(&self) -> [f32; 4] {
        self.c
    }

    /// Applies a function to all four components.
    #[inline]
    pub fn map<F: Fn(f32) -> f32>(self, f: F) -> Self {
        Self { c: self.c.map(f) }
    }

    /// Applies a function to RGB, carrying alpha through.
    #[inline]
    pub fn map_rgb<F: Fn(f32) -> f32>(self, f: F) -> Self {
        Self::new(f(self.c[RED]), f(self.c[GREEN]), f(self.c[BLUE]), self.c[ALPHA])
    }

    /// Raises every component, alpha included, to `e`.
    #[inline]
    pub fn powf(self, e: f32) -> Self {
        self.map(|v| v.powf(e))
    }

    #[inline]
    fn zip_with<F: Fn(f32, f32) -> f32>(self, rhs: Self, f: F) -> Self {
        Self::new(
            f(self.c[0], rhs.c[0]),
            f(self.c[1], rhs.c[1]),
            f(self.c[2], rhs.c[2]),
            f(self.c[3], rhs.c[3]),
        )
    }
}

impl From<[f32; 4]> for Pixel {
    fn from(c: [f32; 4]) -> Self {
        Self::from_array(c)
    }
}

impl From<Pixel> for [f32; 4] {
    fn from(p: Pixel) -> Self {
        p.c
    }
}

impl Index<usize> for Pixel {
    type Output = f32;

    #[inline]
    fn index(&self, i: usize) -> &f32 {
        &self.c[i]
    }
}

impl IndexMut<usize> for Pixel {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.c[i]
    }
}

impl fmt::Debug for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixel")
            .field("r", &self.c[RED])
            .field("g", &self.c[GREEN])
            .field("b", &self.c[BLUE])
            .field("a", &self.c[ALPHA])
            .finish()
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBA({}, {}, {}, {})",
            self.c[RED], self.c[GREEN], self.c[BLUE], self.c[ALPHA]
        )
    }
}

// ============================================================================
// Arithmetic Operations
// ============================================================================

impl Add for Pixel {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for Pixel {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul for Pixel {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a * b)
    }
}

impl Mul<f32> for Pixel {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.map(|v| v * rhs)
    }
}

impl Div for Pixel {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a / b)
    }
}

impl Div<f32> for Pixel {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f32) -> Self {
        self.map(|v| v / rhs)
    }
}

impl AddAssign for Pixel {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.c.iter_mut().zip(rhs.c) {
            *a += b;
        }
    }
}

impl SubAssign for Pixel {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.c.iter_mut().zip(rhs.c) {
            *a -= b;
        }
    }
}

impl MulAssign<f32> for Pixel {
    #[inline]
    fn mul_assign(&mut self, rhs: f32) {
        for a in self.c.iter_mut() {
            *a *= rhs;
        }
    }
}

impl DivAssign<f32> for Pixel {
    #[inline]
    fn div_assign(&mut self, rhs: f32) {
        for a in self.c.iter_mut() {
            *a /= rhs;
        }
    }
}
