//! TIFF backend.
//!
//! Decodes 8, 16 and 32-bit integer gray, gray+alpha, RGB and RGBA,
//! 1, 2 and 4-bit gray, and 32-bit float gray, RGB and RGBA. Saves 8-bit RGB
//! and 32-bit float RGB/RGBA, uncompressed. Palette images are rejected.

use crate::backend::{Backend, ExportType};
use crate::{Bitmap, BitmapData, Format, IoError, IoResult, PixelType};
use pdiff_core::error::try_alloc;
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;
use tracing::trace;

/// TIFF codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffBackend;

impl Backend for TiffBackend {
    fn format(&self) -> Format {
        Format::Tiff
    }

    fn supports_export(&self, _export: ExportType) -> bool {
        true
    }

    fn decode(&self, bytes: &[u8]) -> IoResult<Bitmap> {
        let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(decode_error)?;

        let (width, height) = decoder.dimensions().map_err(decode_error)?;
        let color_type = decoder.colortype().map_err(decode_error)?;
        trace!(width, height, color = ?color_type, "tiff decode");

        let result = decoder.read_image().map_err(decode_error)?;

        let (pixel_type, data) = match (color_type, result) {
            (ColorType::Gray(8), DecodingResult::U8(buf)) => {
                (PixelType::Gray8, BitmapData::U8(buf))
            }
            (ColorType::GrayA(8), DecodingResult::U8(buf)) => {
                (PixelType::GrayAlpha8, BitmapData::U8(buf))
            }
            (ColorType::RGB(8), DecodingResult::U8(buf)) => (PixelType::Rgb8, BitmapData::U8(buf)),
            (ColorType::RGBA(8), DecodingResult::U8(buf)) => {
                (PixelType::Rgba8, BitmapData::U8(buf))
            }
            (ColorType::Gray(bits @ (1 | 2 | 4)), DecodingResult::U8(buf)) => (
                PixelType::Gray8,
                BitmapData::U8(unpack_gray(&buf, width, height, bits)?),
            ),
            (ColorType::Gray(16), DecodingResult::U16(buf)) => {
                (PixelType::Gray16, BitmapData::U16(buf))
            }
            (ColorType::GrayA(16), DecodingResult::U16(buf)) => {
                (PixelType::GrayAlpha16, BitmapData::U16(buf))
            }
            (ColorType::RGB(16), DecodingResult::U16(buf)) => {
                (PixelType::Rgb16, BitmapData::U16(buf))
            }
            (ColorType::RGBA(16), DecodingResult::U16(buf)) => {
                (PixelType::Rgba16, BitmapData::U16(buf))
            }
            // 32-bit integers keep their top 16 bits; the bridge then keeps the top byte
            (ColorType::Gray(32), DecodingResult::U32(buf)) => {
                (PixelType::Gray16, BitmapData::U16(narrow_u32(&buf)?))
            }
            (ColorType::GrayA(32), DecodingResult::U32(buf)) => {
                (PixelType::GrayAlpha16, BitmapData::U16(narrow_u32(&buf)?))
            }
            (ColorType::RGB(32), DecodingResult::U32(buf)) => {
                (PixelType::Rgb16, BitmapData::U16(narrow_u32(&buf)?))
            }
            (ColorType::RGBA(32), DecodingResult::U32(buf)) => {
                (PixelType::Rgba16, BitmapData::U16(narrow_u32(&buf)?))
            }
            (ColorType::Gray(32), DecodingResult::F32(buf)) => {
                (PixelType::GrayF32, BitmapData::F32(buf))
            }
            (ColorType::RGB(32), DecodingResult::F32(buf)) => {
                (PixelType::RgbF32, BitmapData::F32(buf))
            }
            (ColorType::RGBA(32), DecodingResult::F32(buf)) => {
                (PixelType::RgbaF32, BitmapData::F32(buf))
            }
            (ct, _) => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "unsupported TIFF color type: {:?}",
                    ct
                )));
            }
        };

        Bitmap::from_top_down(width, height, pixel_type, data)
    }

    fn encode(&self, bitmap: &Bitmap) -> IoResult<Vec<u8>> {
        let (width, height) = (bitmap.width(), bitmap.height());
        let samples = bitmap.top_down_data()?;

        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut out)
                .map_err(|e: tiff::TiffError| IoError::EncodeError(e.to_string()))?;

            let written = match (bitmap.pixel_type(), &samples) {
                (PixelType::Gray8, BitmapData::U8(v)) => {
                    encoder.write_image::<colortype::Gray8>(width, height, v)
                }
                (PixelType::Rgb8, BitmapData::U8(v)) => {
                    encoder.write_image::<colortype::RGB8>(width, height, v)
                }
                (PixelType::Rgba8, BitmapData::U8(v)) => {
                    encoder.write_image::<colortype::RGBA8>(width, height, v)
                }
                (PixelType::RgbF32, BitmapData::F32(v)) => {
                    encoder.write_image::<colortype::RGB32Float>(width, height, v)
                }
                (PixelType::RgbaF32, BitmapData::F32(v)) => {
                    encoder.write_image::<colortype::RGBA32Float>(width, height, v)
                }
                (other, _) => {
                    return Err(IoError::UnsupportedPixelType(format!(
                        "TIFF backend cannot encode {:?}",
                        other
                    )));
                }
            };
            written.map_err(|e: tiff::TiffError| IoError::EncodeError(e.to_string()))?;
        }
        Ok(out.into_inner())
    }
}

/// Pixel layouts the decoder refuses (palette, odd bit depths) map to
/// `UnsupportedPixelType`; everything else is a decode error.
fn decode_error(e: tiff::TiffError) -> IoError {
    use tiff::TiffUnsupportedError as U;
    match e {
        tiff::TiffError::UnsupportedError(
            u @ (U::InterpretationWithBits(..)
            | U::UnsupportedInterpretation(_)
            | U::InconsistentBitsPerSample(_)
            | U::UnsupportedBitsPerChannel(_)
            | U::UnsupportedSampleDepth(_)
            | U::UnsupportedSampleFormat(_)
            | U::UnsupportedColorType(_)),
        ) => IoError::UnsupportedPixelType(u.to_string()),
        other => IoError::DecodeError(other.to_string()),
    }
}

fn narrow_u32(samples: &[u32]) -> IoResult<Vec<u16>> {
    let mut out = try_alloc(samples.len(), 0u16)?;
    for (dst, &src) in out.iter_mut().zip(samples) {
        *dst = (src >> 16) as u16;
    }
    Ok(out)
}

/// Expands MSB-first gray samples of `bits` width to 8 bits.
///
/// Each packed row starts on a byte boundary.
fn unpack_gray(packed: &[u8], width: u32, height: u32, bits: u8) -> IoResult<Vec<u8>> {
    let (w, h, bits) = (width as usize, height as usize, bits as usize);
    if w == 0 || h == 0 {
        return Ok(Vec::new());
    }
    let row_bytes = (w * bits).div_ceil(8);
    if packed.len() < row_bytes * h {
        return Err(IoError::DecodeError(format!(
            "TIFF gray{} data too short: {} < {}",
            bits,
            packed.len(),
            row_bytes * h
        )));
    }

    let max = (1u32 << bits) - 1;
    let mask = max as u8;
    let mut out = try_alloc(w * h, 0u8)?;
    for (row, dst) in packed.chunks(row_bytes).zip(out.chunks_mut(w)) {
        for (x, value) in dst.iter_mut().enumerate() {
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            let v = (row[bit / 8] >> shift) & mask;
            *value = ((v as u32 * 255 + max / 2) / max) as u8;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_rgb8() {
        let top_down = vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
        let bmp = Bitmap::from_top_down(2, 2, PixelType::Rgb8, BitmapData::U8(top_down.clone()))
            .unwrap();
        let bytes = TiffBackend.encode(&bmp).unwrap();
        assert_eq!(Format::from_bytes(&bytes), Format::Tiff);

        let back = TiffBackend.decode(&bytes).unwrap();
        assert_eq!(back.pixel_type(), PixelType::Rgb8);
        assert_eq!(back.scanline_u8(0), Some(&[70u8, 80, 90, 100, 110, 120][..]));
        assert_eq!(back.top_down_data().unwrap(), BitmapData::U8(top_down));
    }

    #[test]
    fn test_roundtrip_rgba_f32() {
        let samples = vec![0.25, -1.0, 2.5, 0.5];
        let bmp = Bitmap::from_parts(1, 1, PixelType::RgbaF32, BitmapData::F32(samples.clone()))
            .unwrap();
        let back = TiffBackend.decode(&TiffBackend.encode(&bmp).unwrap()).unwrap();
        assert_eq!(back.pixel_type(), PixelType::RgbaF32);
        assert_eq!(back.data(), &BitmapData::F32(samples));
    }

    #[test]
    fn test_reject_packed_encode() {
        let bmp =
            Bitmap::allocate(1, 1, PixelType::Packed32(pdiff_core::ChannelOrder::RGBA)).unwrap();
        assert!(matches!(
            TiffBackend.encode(&bmp),
            Err(IoError::UnsupportedPixelType(_))
        ));
    }

    fn encode_with<C: colortype::ColorType>(width: u32, height: u32, data: &[C::Inner]) -> Vec<u8>
    where
        [C::Inner]: tiff::encoder::TiffValue,
    {
        let mut out = Cursor::new(Vec::new());
        TiffEncoder::new(&mut out)
            .unwrap()
            .write_image::<C>(width, height, data)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_rgb32_keeps_high_bits() {
        let bytes = encode_with::<colortype::RGB32>(1, 1, &[0xFFFF_FFFF, 0x8001_2345, 0x0000_FFFF]);
        let bmp = TiffBackend.decode(&bytes).unwrap();
        assert_eq!(bmp.pixel_type(), PixelType::Rgb16);
        assert_eq!(bmp.data(), &BitmapData::U16(vec![0xFFFF, 0x8001, 0x0000]));
    }

    #[test]
    fn test_decode_gray64_float_unsupported() {
        let bytes = encode_with::<colortype::Gray64Float>(1, 1, &[0.5]);
        assert!(matches!(
            TiffBackend.decode(&bytes),
            Err(IoError::UnsupportedPixelType(_))
        ));
    }

    #[test]
    fn test_unpack_gray_one_bit() {
        // 10 pixels wide: each row spills into a second, padded byte
        let packed = [0b1010_0000, 0b0100_0000, 0b1111_1111, 0b1100_0000];
        let out = unpack_gray(&packed, 10, 2, 1).unwrap();
        assert_eq!(
            out,
            vec![
                255, 0, 255, 0, 0, 0, 0, 0, 0, 255, //
                255, 255, 255, 255, 255, 255, 255, 255, 255, 255,
            ]
        );
    }

    #[test]
    fn test_unpack_gray_two_and_four_bit() {
        assert_eq!(
            unpack_gray(&[0b00_01_10_11], 4, 1, 2).unwrap(),
            vec![0, 85, 170, 255]
        );
        assert_eq!(unpack_gray(&[0x0F, 0x80], 3, 1, 4).unwrap(), vec![0, 255, 136]);
    }

    #[test]
    fn test_unpack_gray_short_data() {
        assert!(matches!(
            unpack_gray(&[0xFF], 9, 1, 1),
            Err(IoError::DecodeError(_))
        ));
    }
}
