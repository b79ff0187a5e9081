//! Backend-native bitmaps.
//!
//! A [`Bitmap`] is what a backend decodes into and encodes from: samples in
//! the file's own type and channel layout, one of four storage vectors.
//!
//! # Row order
//!
//! Scanlines are stored bottom-to-top: scanline 0 is the bottom row of the
//! picture. Backends whose files are top-down flip on the way in and out
//! (see [`Bitmap::from_top_down`] and [`Bitmap::top_down_data`]).

use crate::{IoError, IoResult};
use pdiff_core::error::try_alloc;
use pdiff_core::ChannelOrder;

/// Sample type and channel layout of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    /// 8-bit gray.
    Gray8,
    /// 8-bit gray with alpha.
    GrayAlpha8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGBA.
    Rgba8,
    /// 16-bit gray.
    Gray16,
    /// 16-bit gray with alpha.
    GrayAlpha16,
    /// 16-bit RGB.
    Rgb16,
    /// 16-bit RGBA.
    Rgba16,
    /// One 32-bit word per pixel, 8 bits per channel, laid out by the order.
    Packed32(ChannelOrder),
    /// 32-bit float gray.
    GrayF32,
    /// 32-bit float RGB.
    RgbF32,
    /// 32-bit float RGBA.
    RgbaF32,
}

impl PixelType {
    /// Number of color channels, alpha included.
    pub fn channels(&self) -> usize {
        match self {
            PixelType::Gray8 | PixelType::Gray16 | PixelType::GrayF32 => 1,
            PixelType::GrayAlpha8 | PixelType::GrayAlpha16 => 2,
            PixelType::Rgb8 | PixelType::Rgb16 | PixelType::RgbF32 => 3,
            PixelType::Rgba8 | PixelType::Rgba16 | PixelType::RgbaF32 | PixelType::Packed32(_) => 4,
        }
    }

    /// Number of stored samples per pixel.
    pub fn samples_per_pixel(&self) -> usize {
        match self {
            PixelType::Packed32(_) => 1,
            other => other.channels(),
        }
    }

    /// True for 8-bit, 16-bit and packed types.
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// True for the 32-bit float types.
    pub fn is_float(&self) -> bool {
        matches!(self, PixelType::GrayF32 | PixelType::RgbF32 | PixelType::RgbaF32)
    }

    /// True when the layout carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelType::GrayAlpha8
                | PixelType::Rgba8
                | PixelType::GrayAlpha16
                | PixelType::Rgba16
                | PixelType::Packed32(_)
                | PixelType::RgbaF32
        )
    }

    fn empty_data(&self) -> BitmapData {
        match self {
            PixelType::Gray8 | PixelType::GrayAlpha8 | PixelType::Rgb8 | PixelType::Rgba8 => {
                BitmapData::U8(Vec::new())
            }
            PixelType::Gray16 | PixelType::GrayAlpha16 | PixelType::Rgb16 | PixelType::Rgba16 => {
                BitmapData::U16(Vec::new())
            }
            PixelType::Packed32(_) => BitmapData::U32(Vec::new()),
            PixelType::GrayF32 | PixelType::RgbF32 | PixelType::RgbaF32 => {
                BitmapData::F32(Vec::new())
            }
        }
    }
}

/// Sample storage of a bitmap.
#[derive(Debug, Clone, PartialEq)]
pub enum BitmapData {
    /// 8-bit samples.
    U8(Vec<u8>),
    /// 16-bit samples.
    U16(Vec<u16>),
    /// Packed 32-bit words.
    U32(Vec<u32>),
    /// Float samples.
    F32(Vec<f32>),
}

impl BitmapData {
    /// Number of stored samples.
    pub fn len(&self) -> usize {
        match self {
            BitmapData::U8(v) => v.len(),
            BitmapData::U16(v) => v.len(),
            BitmapData::U32(v) => v.len(),
            BitmapData::F32(v) => v.len(),
        }
    }

    /// True when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn same_storage(&self, other: &BitmapData) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn flipped(&self, row_len: usize) -> IoResult<BitmapData> {
        Ok(match self {
            BitmapData::U8(v) => BitmapData::U8(flip_rows(v, row_len)?),
            BitmapData::U16(v) => BitmapData::U16(flip_rows(v, row_len)?),
            BitmapData::U32(v) => BitmapData::U32(flip_rows(v, row_len)?),
            BitmapData::F32(v) => BitmapData::F32(flip_rows(v, row_len)?),
        })
    }
}

/// A decoded or to-be-encoded picture in backend-native form.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixel_type: PixelType,
    data: BitmapData,
    transparent: bool,
}

impl Bitmap {
    /// Allocates a zero-filled bitmap.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidFile`] for a zero dimension,
    /// [`IoError::AllocationFailed`] when the buffer cannot be reserved.
    pub fn allocate(width: u32, height: u32, pixel_type: PixelType) -> IoResult<Self> {
        let len = sample_count(width, height, pixel_type)?;
        let data = match pixel_type.empty_data() {
            BitmapData::U8(_) => BitmapData::U8(try_alloc(len, 0u8)?),
            BitmapData::U16(_) => BitmapData::U16(try_alloc(len, 0u16)?),
            BitmapData::U32(_) => BitmapData::U32(try_alloc(len, 0u32)?),
            BitmapData::F32(_) => BitmapData::F32(try_alloc(len, 0.0f32)?),
        };
        Ok(Self {
            width,
            height,
            pixel_type,
            data,
            transparent: false,
        })
    }

    /// Wraps samples that are already bottom-to-top.
    ///
    /// The transparent flag starts as [`PixelType::has_alpha`].
    pub fn from_parts(
        width: u32,
        height: u32,
        pixel_type: PixelType,
        data: BitmapData,
    ) -> IoResult<Self> {
        let len = sample_count(width, height, pixel_type)?;
        if !data.same_storage(&pixel_type.empty_data()) {
            return Err(IoError::InvalidFile(format!(
                "sample storage does not match pixel type {:?}",
                pixel_type
            )));
        }
        if data.len() != len {
            return Err(IoError::InvalidFile(format!(
                "expected {} samples for {}x{} {:?}, got {}",
                len,
                width,
                height,
                pixel_type,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixel_type,
            data,
            transparent: pixel_type.has_alpha(),
        })
    }

    /// Wraps samples whose first row is the top of the picture.
    pub fn from_top_down(
        width: u32,
        height: u32,
        pixel_type: PixelType,
        data: BitmapData,
    ) -> IoResult<Self> {
        let mut bitmap = Self::from_parts(width, height, pixel_type, data)?;
        bitmap.data = bitmap.data.flipped(bitmap.row_len())?;
        Ok(bitmap)
    }

    /// Returns a copy of the samples with the top row first.
    pub fn top_down_data(&self) -> IoResult<BitmapData> {
        self.data.flipped(self.row_len())
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample type and layout.
    #[inline]
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Bottom-to-top sample storage.
    #[inline]
    pub fn data(&self) -> &BitmapData {
        &self.data
    }

    /// Whether alpha is meaningful for this bitmap.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Sets whether alpha is meaningful for this bitmap.
    #[inline]
    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    /// Samples per scanline.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.pixel_type.samples_per_pixel()
    }

    /// Scanline `row` (0 = bottom) of an 8-bit bitmap.
    pub fn scanline_u8(&self, row: u32) -> Option<&[u8]> {
        match &self.data {
            BitmapData::U8(v) => scanline(v, self.row_len(), row, self.height),
            _ => None,
        }
    }

    /// Mutable scanline `row` (0 = bottom) of an 8-bit bitmap.
    pub fn scanline_u8_mut(&mut self, row: u32) -> Option<&mut [u8]> {
        let row_len = self.row_len();
        match &mut self.data {
            BitmapData::U8(v) => scanline_mut(v, row_len, row, self.height),
            _ => None,
        }
    }

    /// Scanline `row` (0 = bottom) of a 16-bit bitmap.
    pub fn scanline_u16(&self, row: u32) -> Option<&[u16]> {
        match &self.data {
            BitmapData::U16(v) => scanline(v, self.row_len(), row, self.height),
            _ => None,
        }
    }

    /// Mutable scanline `row` (0 = bottom) of a 16-bit bitmap.
    pub fn scanline_u16_mut(&mut self, row: u32) -> Option<&mut [u16]> {
        let row_len = self.row_len();
        match &mut self.data {
            BitmapData::U16(v) => scanline_mut(v, row_len, row, self.height),
            _ => None,
        }
    }

    /// Scanline `row` (0 = bottom) of a packed bitmap.
    pub fn scanline_u32(&self, row: u32) -> Option<&[u32]> {
        match &self.data {
            BitmapData::U32(v) => scanline(v, self.row_len(), row, self.height),
            _ => None,
        }
    }

    /// Mutable scanline `row` (0 = bottom) of a packed bitmap.
    pub fn scanline_u32_mut(&mut self, row: u32) -> Option<&mut [u32]> {
        let row_len = self.row_len();
        match &mut self.data {
            BitmapData::U32(v) => scanline_mut(v, row_len, row, self.height),
            _ => None,
        }
    }

    /// Scanline `row` (0 = bottom) of a float bitmap.
    pub fn scanline_f32(&self, row: u32) -> Option<&[f32]> {
        match &self.data {
            BitmapData::F32(v) => scanline(v, self.row_len(), row, self.height),
            _ => None,
        }
    }

    /// Mutable scanline `row` (0 = bottom) of a float bitmap.
    pub fn scanline_f32_mut(&mut self, row: u32) -> Option<&mut [f32]> {
        let row_len = self.row_len();
        match &mut self.data {
            BitmapData::F32(v) => scanline_mut(v, row_len, row, self.height),
            _ => None,
        }
    }

    /// Converts any integer bitmap to [`PixelType::Packed32`] with `order`.
    ///
    /// 16-bit samples keep their high byte, gray is replicated into R, G
    /// and B, and a missing alpha becomes 255. Row order and the transparent
    /// flag are kept.
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedPixelType`] for float bitmaps.
    pub fn to_packed32(&self, order: ChannelOrder) -> IoResult<Bitmap> {
        let words = match (self.pixel_type, &self.data) {
            (PixelType::Gray8, BitmapData::U8(v)) => {
                pack_all(v, 1, order, |s| [s[0], s[0], s[0], 255])?
            }
            (PixelType::GrayAlpha8, BitmapData::U8(v)) => {
                pack_all(v, 2, order, |s| [s[0], s[0], s[0], s[1]])?
            }
            (PixelType::Rgb8, BitmapData::U8(v)) => {
                pack_all(v, 3, order, |s| [s[0], s[1], s[2], 255])?
            }
            (PixelType::Rgba8, BitmapData::U8(v)) => {
                pack_all(v, 4, order, |s| [s[0], s[1], s[2], s[3]])?
            }
            (PixelType::Gray16, BitmapData::U16(v)) => pack_all(v, 1, order, |s| {
                let g = high_byte(s[0]);
                [g, g, g, 255]
            })?,
            (PixelType::GrayAlpha16, BitmapData::U16(v)) => pack_all(v, 2, order, |s| {
                let g = high_byte(s[0]);
                [g, g, g, high_byte(s[1])]
            })?,
            (PixelType::Rgb16, BitmapData::U16(v)) => pack_all(v, 3, order, |s| {
                [high_byte(s[0]), high_byte(s[1]), high_byte(s[2]), 255]
            })?,
            (PixelType::Rgba16, BitmapData::U16(v)) => pack_all(v, 4, order, |s| {
                [high_byte(s[0]), high_byte(s[1]), high_byte(s[2]), high_byte(s[3])]
            })?,
            (PixelType::Packed32(src), BitmapData::U32(v)) => {
                pack_all(v, 1, order, |s| src.unpack(s[0]))?
            }
            (other, _) => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "{:?} cannot be packed to 8 bits per channel",
                    other
                )));
            }
        };
        Ok(Bitmap {
            width: self.width,
            height: self.height,
            pixel_type: PixelType::Packed32(order),
            data: BitmapData::U32(words),
            transparent: self.transparent,
        })
    }

    /// Drops alpha from a packed bitmap, giving [`PixelType::Rgb8`].
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedPixelType`] unless the bitmap is packed.
    pub fn to_rgb8(&self) -> IoResult<Bitmap> {
        let (order, words) = match (self.pixel_type, &self.data) {
            (PixelType::Packed32(order), BitmapData::U32(v)) => (order, v),
            (other, _) => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "{:?} is not a packed bitmap",
                    other
                )));
            }
        };
        let mut out = Vec::new();
        out.try_reserve_exact(words.len() * 3)
            .map_err(|_| IoError::AllocationFailed { requested: words.len() * 3 })?;
        for &w in words {
            let [r, g, b, _] = order.unpack(w);
            out.extend_from_slice(&[r, g, b]);
        }
        Ok(Bitmap {
            width: self.width,
            height: self.height,
            pixel_type: PixelType::Rgb8,
            data: BitmapData::U8(out),
            transparent: false,
        })
    }
}

fn sample_count(width: u32, height: u32, pixel_type: PixelType) -> IoResult<usize> {
    if width == 0 || height == 0 {
        return Err(IoError::InvalidFile(format!(
            "bitmap dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(pixel_type.samples_per_pixel()))
        .ok_or(IoError::AllocationFailed { requested: usize::MAX })
}

#[inline]
fn high_byte(v: u16) -> u8 {
    (v >> 8) as u8
}

fn pack_all<T>(
    samples: &[T],
    spp: usize,
    order: ChannelOrder,
    f: impl Fn(&[T]) -> [u8; 4],
) -> IoResult<Vec<u32>> {
    let n = samples.len() / spp;
    let mut out = Vec::new();
    out.try_reserve_exact(n)
        .map_err(|_| IoError::AllocationFailed { requested: n })?;
    out.extend(samples.chunks_exact(spp).map(|s| order.pack(f(s))));
    Ok(out)
}

fn flip_rows<T: Copy>(samples: &[T], row_len: usize) -> IoResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(samples.len())
        .map_err(|_| IoError::AllocationFailed { requested: samples.len() })?;
    if row_len == 0 {
        return Ok(out);
    }
    for row in samples.chunks_exact(row_len).rev() {
        out.extend_from_slice(row);
    }
    Ok(out)
}

fn scanline<T>(v: &[T], row_len: usize, row: u32, height: u32) -> Option<&[T]> {
    if row >= height {
        return None;
    }
    let start = row as usize * row_len;
    v.get(start..start + row_len)
}

fn scanline_mut<T>(v: &mut [T], row_len: usize, row: u32, height: u32) -> Option<&mut [T]> {
    if row >= height {
        return None;
    }
    let start = row as usize * row_len;
    v.get_mut(start..start + row_len)
}
