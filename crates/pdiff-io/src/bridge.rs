//! Conversion between backend bitmaps and [`RgbaImage`].
//!
//! # Loading
//!
//! Integer bitmaps of any depth are packed to 8 bits per channel and
//! dequantized, so 16-bit sources keep only their high byte. Float RGB gets
//! alpha 1.0, float RGBA is copied as is. Float gray is rejected.
//!
//! # Saving
//!
//! The format comes from the extension. Backends that take float RGB get
//! it (alpha dropped); otherwise pixels are quantized to 8-bit RGB.
//!
//! Bitmap scanlines run bottom-to-top and image rows top-to-bottom, so
//! scanline `r` and image row `height - 1 - r` are the same picture row.

use crate::backend::{backend_for, Backend, ExportType};
use crate::{Bitmap, Format, IoError, IoResult, PixelType};
use pdiff_core::{ChannelOrder, Pixel, RgbaImage};
use std::path::Path;
use tracing::{debug, warn};

/// Loads and saves [`RgbaImage`]s through the compiled-in backends.
///
/// # Example
///
/// ```rust,no_run
/// use pdiff_core::ChannelOrder;
/// use pdiff_io::CodecBridge;
///
/// let bridge = CodecBridge::new().with_channel_order(ChannelOrder::BGRA);
/// let image = bridge.load("reference.png")?;
/// bridge.save("copy.tif", &image)?;
/// # Ok::<(), pdiff_io::IoError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecBridge {
    order: Option<ChannelOrder>,
}

impl CodecBridge {
    /// Creates a bridge that packs with each backend's native order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs integer pixels with `order` for every backend.
    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Explicit channel order, if one was set.
    pub fn channel_order(&self) -> Option<ChannelOrder> {
        self.order
    }

    fn order_for(&self, backend: &dyn Backend) -> ChannelOrder {
        self.order.unwrap_or_else(|| backend.native_order())
    }

    /// Reads, detects and decodes an image file.
    ///
    /// The image is named after `path`.
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedFormat`] when the format is unknown or not
    /// compiled in, [`IoError::UnsupportedPixelType`] for float gray and other
    /// layouts no backend converts, and any I/O, decode or allocation error.
    /// Failures are logged with the path.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> IoResult<RgbaImage> {
        let path = path.as_ref();
        self.load_path(path)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "image load failed"))
    }

    fn load_path(&self, path: &Path) -> IoResult<RgbaImage> {
        let bytes = std::fs::read(path)?;
        let format = Format::detect(path, &bytes);
        let backend = backend_for(format)
            .ok_or_else(|| IoError::UnsupportedFormat(format!("{}: {}", path.display(), format)))?;

        let bitmap = backend.decode(&bytes)?;
        debug!(
            path = %path.display(),
            %format,
            width = bitmap.width(),
            height = bitmap.height(),
            pixel_type = ?bitmap.pixel_type(),
            "decoded"
        );
        import(&bitmap, self.order_for(backend), Some(&*path.to_string_lossy()))
    }

    /// Converts a decoded bitmap to an image.
    pub fn import(&self, bitmap: &Bitmap, name: Option<&str>) -> IoResult<RgbaImage> {
        import(bitmap, self.order.unwrap_or_default(), name)
    }

    /// Encodes an image and writes it to `path` in one call.
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedFormat`] when the extension is unknown or the
    /// backend takes neither float RGB nor 8-bit RGB, and any allocation,
    /// encode or I/O error. Nothing is written when encoding fails. Failures
    /// are logged with the path.
    pub fn save<P: AsRef<Path>>(&self, path: P, image: &RgbaImage) -> IoResult<()> {
        let path = path.as_ref();
        self.save_path(path, image)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "image save failed"))
    }

    fn save_path(&self, path: &Path, image: &RgbaImage) -> IoResult<()> {
        let format = Format::from_extension(path);
        let backend = backend_for(format)
            .ok_or_else(|| IoError::UnsupportedFormat(format!("{}: {}", path.display(), format)))?;
        let export = [ExportType::RgbF32, ExportType::Int8]
            .into_iter()
            .find(|&e| backend.supports_export(e))
            .ok_or_else(|| {
                IoError::UnsupportedFormat(format!("{} backend has no usable export type", format))
            })?;

        let bitmap = export_as(image, export, self.order_for(backend))?;
        let bytes = backend.encode(&bitmap)?;
        std::fs::write(path, &bytes)?;
        debug!(
            path = %path.display(),
            %format,
            ?export,
            bytes = bytes.len(),
            "saved"
        );
        Ok(())
    }

    /// Saves to the path stored as the image's name.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidFile`] when the image has no name, otherwise as
    /// [`CodecBridge::save`].
    pub fn save_named(&self, image: &RgbaImage) -> IoResult<()> {
        match image.name() {
            Some(name) => self.save(name, image),
            None => Err(IoError::InvalidFile("image has no name to save under".into())),
        }
    }

    /// Converts an image to a bitmap of the given export type.
    pub fn export(&self, image: &RgbaImage, export: ExportType) -> IoResult<Bitmap> {
        export_as(image, export, self.order.unwrap_or_default())
    }
}

fn import(bitmap: &Bitmap, order: ChannelOrder, name: Option<&str>) -> IoResult<RgbaImage> {
    let pixel_type = bitmap.pixel_type();
    let float_channels = match pixel_type {
        t if t.is_integer() => None,
        PixelType::RgbF32 => Some(3),
        PixelType::RgbaF32 => Some(4),
        other => {
            return Err(IoError::UnsupportedPixelType(format!(
                "{:?} cannot be loaded as RGBA",
                other
            )));
        }
    };

    let (width, height) = (bitmap.width(), bitmap.height());
    let mut image = RgbaImage::new(width, height, name)?;

    match float_channels {
        None => {
            let packed = bitmap.to_packed32(order)?;
            for r in 0..height {
                let src = packed.scanline_u32(r).ok_or_else(|| missing_scanline(r))?;
                for (dst, &word) in image.row_mut(height - 1 - r).iter_mut().zip(src) {
                    *dst = Pixel::from_packed(word, order);
                }
            }
        }
        Some(channels) => {
            for r in 0..height {
                let src = bitmap.scanline_f32(r).ok_or_else(|| missing_scanline(r))?;
                let dst = image.row_mut(height - 1 - r);
                for (px, s) in dst.iter_mut().zip(src.chunks_exact(channels)) {
                    let alpha = if channels == 4 { s[3] } else { 1.0 };
                    *px = Pixel::new(s[0], s[1], s[2], alpha);
                }
            }
        }
    }
    Ok(image)
}

fn export_as(image: &RgbaImage, export: ExportType, order: ChannelOrder) -> IoResult<Bitmap> {
    let (width, height) = image.dimensions();
    match export {
        ExportType::Int8 => {
            let mut bitmap = Bitmap::allocate(width, height, PixelType::Packed32(order))?;
            for y in 0..height {
                let dst = bitmap
                    .scanline_u32_mut(height - 1 - y)
                    .ok_or_else(|| missing_scanline(height - 1 - y))?;
                for (word, px) in dst.iter_mut().zip(image.row(y)) {
                    *word = px.to_packed(order);
                }
            }
            bitmap.set_transparent(false);
            bitmap.to_rgb8()
        }
        ExportType::RgbF32 | ExportType::RgbaF32 => {
            let (pixel_type, channels) = if export == ExportType::RgbF32 {
                (PixelType::RgbF32, 3)
            } else {
                (PixelType::RgbaF32, 4)
            };
            let mut bitmap = Bitmap::allocate(width, height, pixel_type)?;
            for y in 0..height {
                let dst = bitmap
                    .scanline_f32_mut(height - 1 - y)
                    .ok_or_else(|| missing_scanline(height - 1 - y))?;
                for (out, px) in dst.chunks_exact_mut(channels).zip(image.row(y)) {
                    out.copy_from_slice(&px.as_array()[..channels]);
                }
            }
            Ok(bitmap)
        }
    }
}

fn missing_scanline(row: u32) -> IoError {
    IoError::InvalidFile(format!("bitmap has no scanline {}", row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BitmapData;

    #[test]
    fn test_import_flips_rows() {
        // scanline 0 (bottom) is white, scanline 1 (top) is black
        let bmp = Bitmap::from_parts(1, 2, PixelType::Gray8, BitmapData::U8(vec![255, 0])).unwrap();
        let img = CodecBridge::new().import(&bmp, Some("t")).unwrap();
        assert_eq!(img.get(0, 0), Pixel::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(img.get(0, 1), Pixel::splat(1.0));
        assert_eq!(img.name(), Some("t"));
    }

    #[test]
    fn test_import_float() {
        let rgb = Bitmap::from_parts(1, 1, PixelType::RgbF32, BitmapData::F32(vec![2.0, -1.0, 0.5]))
            .unwrap();
        let img = CodecBridge::new().import(&rgb, None).unwrap();
        assert_eq!(img.get(0, 0), Pixel::new(2.0, -1.0, 0.5, 1.0));

        let rgba = Bitmap::from_parts(
            1,
            1,
            PixelType::RgbaF32,
            BitmapData::F32(vec![0.1, 0.2, 0.3, 0.4]),
        )
        .unwrap();
        let img = CodecBridge::new().import(&rgba, None).unwrap();
        assert_eq!(img.get(0, 0), Pixel::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_import_gray_float_rejected() {
        let gray =
            Bitmap::from_parts(1, 1, PixelType::GrayF32, BitmapData::F32(vec![0.5])).unwrap();
        assert!(matches!(
            CodecBridge::new().import(&gray, None),
            Err(IoError::UnsupportedPixelType(_))
        ));
    }

    #[test]
    fn test_export_int8() {
        let mut img = RgbaImage::new(1, 2, None).unwrap();
        img.set(0, 0, Pixel::new(1.0, 0.5, 0.0, 0.25));
        img.set(0, 1, Pixel::new(2.0, -1.0, 0.2, 1.0));
        let bmp = CodecBridge::new().export(&img, ExportType::Int8).unwrap();
        assert_eq!(bmp.pixel_type(), PixelType::Rgb8);
        assert!(!bmp.is_transparent());
        assert_eq!(bmp.scanline_u8(1), Some(&[255u8, 128, 0][..]));
        assert_eq!(bmp.scanline_u8(0), Some(&[255u8, 0, 51][..]));
    }

    #[test]
    fn test_export_float() {
        let mut img = RgbaImage::new(2, 1, None).unwrap();
        img.set(1, 0, Pixel::new(0.1, 0.2, 0.3, 0.4));
        let rgb = CodecBridge::new().export(&img, ExportType::RgbF32).unwrap();
        assert_eq!(rgb.scanline_f32(0), Some(&[0.0f32, 0.0, 0.0, 0.1, 0.2, 0.3][..]));
        let rgba = CodecBridge::new().export(&img, ExportType::RgbaF32).unwrap();
        assert_eq!(rgba.scanline_f32(0).map(|s| s.len()), Some(8));
        assert_eq!(rgba.scanline_f32(0).map(|s| s[7]), Some(0.4));
    }

    #[test]
    fn test_channel_order_does_not_change_pixels() {
        let bmp = Bitmap::from_parts(1, 1, PixelType::Rgba8, BitmapData::U8(vec![10, 20, 30, 40]))
            .unwrap();
        let a = CodecBridge::new().import(&bmp, None).unwrap();
        let b = CodecBridge::new()
            .with_channel_order(ChannelOrder::BGRA)
            .import(&bmp, None)
            .unwrap();
        assert_eq!(a.get(0, 0), b.get(0, 0));
        assert_eq!(a.get(0, 0).to_bytes(), [10, 20, 30, 40]);
    }
}
