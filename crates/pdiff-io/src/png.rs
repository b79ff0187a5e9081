//! PNG backend.
//!
//! Decodes 8-bit and 16-bit gray, gray+alpha, RGB and RGBA. Palette and
//! sub-byte gray images are expanded to 8 bits by the decoder. Saving writes
//! 8-bit RGB only.

use crate::backend::{Backend, ExportType};
use crate::{Bitmap, BitmapData, Format, IoError, IoResult, PixelType};
use byteorder::{BigEndian, ByteOrder};
use pdiff_core::error::try_alloc;
use std::io::Cursor;
use tracing::trace;

/// PNG codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngBackend;

impl Backend for PngBackend {
    fn format(&self) -> Format {
        Format::Png
    }

    fn supports_export(&self, export: ExportType) -> bool {
        export == ExportType::Int8
    }

    fn decode(&self, bytes: &[u8]) -> IoResult<Bitmap> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder
            .read_info()
            .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

        let buf_size = reader
            .output_buffer_size()
            .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
        let mut buf = try_alloc(buf_size, 0u8)?;
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
        buf.truncate(info.buffer_size());

        trace!(
            width = info.width,
            height = info.height,
            color = ?info.color_type,
            depth = ?info.bit_depth,
            "png decode"
        );

        let pixel_type = match (info.color_type, info.bit_depth) {
            (png::ColorType::Grayscale, png::BitDepth::Eight) => PixelType::Gray8,
            (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => PixelType::GrayAlpha8,
            (png::ColorType::Rgb, png::BitDepth::Eight) => PixelType::Rgb8,
            (png::ColorType::Rgba, png::BitDepth::Eight) => PixelType::Rgba8,
            (png::ColorType::Grayscale, png::BitDepth::Sixteen) => PixelType::Gray16,
            (png::ColorType::GrayscaleAlpha, png::BitDepth::Sixteen) => PixelType::GrayAlpha16,
            (png::ColorType::Rgb, png::BitDepth::Sixteen) => PixelType::Rgb16,
            (png::ColorType::Rgba, png::BitDepth::Sixteen) => PixelType::Rgba16,
            (color_type, bit_depth) => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "unsupported PNG layout {:?} {:?}",
                    color_type, bit_depth
                )));
            }
        };
        let data = match info.bit_depth {
            png::BitDepth::Sixteen => be_u16(&buf)?,
            _ => BitmapData::U8(buf),
        };

        Bitmap::from_top_down(info.width, info.height, pixel_type, data)
    }

    fn encode(&self, bitmap: &Bitmap) -> IoResult<Vec<u8>> {
        let color_type = match bitmap.pixel_type() {
            PixelType::Gray8 => png::ColorType::Grayscale,
            PixelType::GrayAlpha8 => png::ColorType::GrayscaleAlpha,
            PixelType::Rgb8 => png::ColorType::Rgb,
            PixelType::Rgba8 => png::ColorType::Rgba,
            other => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "PNG backend cannot encode {:?}",
                    other
                )));
            }
        };
        let samples = match bitmap.top_down_data()? {
            BitmapData::U8(v) => v,
            _ => return Err(IoError::EncodeError("8-bit samples expected".into())),
        };

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, bitmap.width(), bitmap.height());
            encoder.set_color(color_type);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(png::Compression::default());

            let mut writer = encoder
                .write_header()
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
            writer
                .write_image_data(&samples)
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
        }
        Ok(out)
    }
}

/// Big-endian byte pairs to 16-bit samples.
fn be_u16(bytes: &[u8]) -> IoResult<BitmapData> {
    let mut samples = try_alloc(bytes.len() / 2, 0u16)?;
    BigEndian::read_u16_into(&bytes[..samples.len() * 2], &mut samples);
    Ok(BitmapData::U16(samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_raw(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        data: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
            writer.finish().unwrap();
        }
        out
    }

    #[test]
    fn test_roundtrip_rgb8() {
        // top row red, bottom row blue
        let top_down = vec![255, 0, 0, 0, 0, 255];
        let bmp = Bitmap::from_top_down(1, 2, PixelType::Rgb8, BitmapData::U8(top_down.clone()))
            .unwrap();
        let bytes = PngBackend.encode(&bmp).unwrap();
        assert_eq!(Format::from_bytes(&bytes), Format::Png);

        let back = PngBackend.decode(&bytes).unwrap();
        assert_eq!(back.pixel_type(), PixelType::Rgb8);
        assert_eq!(back.scanline_u8(0), Some(&[0u8, 0, 255][..]));
        assert_eq!(back.top_down_data().unwrap(), BitmapData::U8(top_down));
    }

    #[test]
    fn test_decode_16bit() {
        let data = [0x12, 0x34, 0xAB, 0xCD];
        let bytes = encode_raw(2, 1, png::ColorType::Grayscale, png::BitDepth::Sixteen, &data);
        let bmp = PngBackend.decode(&bytes).unwrap();
        assert_eq!(bmp.pixel_type(), PixelType::Gray16);
        assert_eq!(bmp.scanline_u16(0), Some(&[0x1234u16, 0xABCD][..]));
    }

    #[test]
    fn test_decode_rgba_is_transparent() {
        let bytes = encode_raw(1, 1, png::ColorType::Rgba, png::BitDepth::Eight, &[1, 2, 3, 4]);
        let bmp = PngBackend.decode(&bytes).unwrap();
        assert_eq!(bmp.pixel_type(), PixelType::Rgba8);
        assert!(bmp.is_transparent());
    }

    #[test]
    fn test_reject_float_encode() {
        let bmp = Bitmap::allocate(1, 1, PixelType::RgbF32).unwrap();
        assert!(matches!(PngBackend.encode(&bmp), Err(IoError::UnsupportedPixelType(_))));
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(PngBackend.decode(b"not a png"), Err(IoError::DecodeError(_))));
    }
}
