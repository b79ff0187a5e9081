//! Canonical RGBA float image.
//!
//! [`RgbaImage`] is the single in-memory representation every codec loads
//! into and saves from.
//!
//! # Memory Layout
//!
//! Pixels are stored **row-major**, top-to-bottom, origin at the top-left:
//!
//! ```text
//! index = x + y * width
//! [P(0,0) P(1,0) ... P(w-1,0)]  <- Row 0 (top)
//! [P(0,1) P(1,1) ... P(w-1,1)]  <- Row 1
//! ...
//! ```
//!
//! # Ownership
//!
//! The image exclusively owns its buffer. It is neither `Copy` nor `Clone`;
//! a deep copy must be requested with [`RgbaImage::duplicate`]. Dimensions
//! are fixed at construction.
//!
//! ```rust
//! use pdiff_core::{Pixel, RgbaImage};
//!
//! let mut img = RgbaImage::new(4, 2, Some("out.png")).unwrap();
//! img.set(3, 1, Pixel::rgb(1.0, 0.0, 0.0));
//! assert_eq!(img.get_index(7), Pixel::rgb(1.0, 0.0, 0.0));
//! ```

use crate::error::try_alloc;
use crate::{ChannelOrder, Error, Pixel, Result};

/// Owned RGBA float image with premultiplied alpha.
#[derive(Debug)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    name: Option<String>,
    data: Vec<Pixel>,
}

/// Validates dimensions and returns the pixel count.
fn checked_pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "zero-sized image"));
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|n| n.checked_mul(std::mem::size_of::<Pixel>()).is_some())
        .ok_or_else(|| Error::invalid_dimensions(width, height, "pixel buffer size overflows"))
}

impl RgbaImage {
    /// Creates an image of transparent black pixels.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if either dimension is zero or the
    ///   buffer size overflows
    /// - [`Error::AllocationFailed`] if the buffer cannot be allocated
    pub fn new(width: u32, height: u32, name: Option<&str>) -> Result<Self> {
        let count = checked_pixel_count(width, height)?;
        let data = try_alloc(count, Pixel::default())?;
        Ok(Self {
            width,
            height,
            name: name.map(str::to_owned),
            data,
        })
    }

    /// Creates an image from an existing pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the dimensions are degenerate
    /// or `pixels.len() != width * height`.
    pub fn from_pixels(
        width: u32,
        height: u32,
        name: Option<&str>,
        pixels: Vec<Pixel>,
    ) -> Result<Self> {
        let count = checked_pixel_count(width, height)?;
        if pixels.len() != count {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} pixels, got {}", count, pixels.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            name: name.map(str::to_owned),
            data: pixels,
        })
    }

    /// Makes an explicit deep copy, including the name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the copy cannot be allocated.
    pub fn duplicate(&self) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len()).map_err(|e| {
            Error::allocation_failed(self.data.len() * std::mem::size_of::<Pixel>(), e.to_string())
        })?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            width: self.width,
            height: self.height,
            name: self.name.clone(),
            data,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Display name, usually the path the image was loaded from.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replaces the display name.
    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_owned);
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.data
    }

    /// All pixels, row-major, mutable.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.data
    }

    /// Row `y` (0 = top).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.index_of(0, y);
        &self.data[start..start + self.width as usize]
    }

    /// Row `y` (0 = top), mutable.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
        let start = self.index_of(0, y);
        let width = self.width as usize;
        &mut self.data[start..start + width]
    }

    #[inline]
    fn index_of(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        x as usize + y as usize * self.width as usize
    }

    /// Pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.data[self.index_of(x, y)]
    }

    /// Pixel at (x, y), or `None` when out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.get(x, y))
        } else {
            None
        }
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        let i = self.index_of(x, y);
        self.data[i] = pixel;
    }

    /// Sets the pixel at (x, y), returning an error when out of bounds.
    pub fn try_set(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        self.set(x, y, pixel);
        Ok(())
    }

    /// Pixel at linear index `i`.
    #[inline]
    pub fn get_index(&self, i: usize) -> Pixel {
        self.data[i]
    }

    /// Sets the pixel at linear index `i`.
    #[inline]
    pub fn set_index(&mut self, i: usize, pixel: Pixel) {
        self.data[i] = pixel;
    }

    /// Sets an opaque pixel from `[R, G, B]`.
    #[inline]
    pub fn set_rgb(&mut self, i: usize, rgb: [f32; 3]) {
        self.data[i] = Pixel::from_rgb_array(rgb);
    }

    /// Sets a pixel from `[R, G, B, A]`.
    #[inline]
    pub fn set_rgba(&mut self, i: usize, rgba: [f32; 4]) {
        self.data[i] = Pixel::from_array(rgba);
    }

    /// Sets a pixel from 8-bit components.
    #[inline]
    pub fn set_bytes(&mut self, i: usize, r: u8, g: u8, b: u8, a: u8) {
        self.data[i] = Pixel::from_bytes(r, g, b, a);
    }

    /// Sets a pixel from a packed word.
    #[inline]
    pub fn set_packed(&mut self, i: usize, word: u32, order: ChannelOrder) {
        self.data[i] = Pixel::from_packed(word, order);
    }

    /// Packs pixel `i` into a word.
    #[inline]
    pub fn packed(&self, i: usize, order: ChannelOrder) -> u32 {
        self.data[i].to_packed(order)
    }

    /// `[R, G, B]` of pixel `i`.
    #[inline]
    pub fn rgb_triplet(&self, i: usize) -> [f32; 3] {
        self.data[i].rgb_triplet()
    }

    /// `[R, G, B, A]` of pixel `i`.
    #[inline]
    pub fn rgba_quad(&self, i: usize) -> [f32; 4] {
        self.data[i].rgba_quad()
    }

    /// Red component of pixel `i`.
    #[inline]
    pub fn red(&self, i: usize) -> f32 {
        self.data[i].r()
    }

    /// Green component of pixel `i`.
    #[inline]
    pub fn green(&self, i: usize) -> f32 {
        self.data[i].g()
    }

    /// Blue component of pixel `i`.
    #[inline]
    pub fn blue(&self, i: usize) -> f32 {
        self.data[i].b()
    }

    /// Alpha component of pixel `i`.
    #[inline]
    pub fn alpha(&self, i: usize) -> f32 {
        self.data[i].a()
    }
}
