//! Binary PPM (`P6`) and PGM (`P5`) backend.
//!
//! A `maxval` up to 255 gives one byte per sample, up to 65535 two
//! big-endian bytes. Samples are rescaled to the full 8-bit or 16-bit range
//! when `maxval` is smaller. Saving writes `P6` with `maxval` 255, or
//! 65535 for 16-bit bitmaps.

use crate::backend::{Backend, ExportType};
use crate::pnm::{payload_len, HeaderReader};
use crate::{Bitmap, BitmapData, Format, IoError, IoResult, PixelType};
use byteorder::{BigEndian, ByteOrder};
use pdiff_core::error::try_alloc;
use std::io::Write;
use tracing::trace;

/// PPM/PGM codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PpmBackend;

impl Backend for PpmBackend {
    fn format(&self) -> Format {
        Format::Ppm
    }

    fn supports_export(&self, export: ExportType) -> bool {
        export == ExportType::Int8
    }

    fn decode(&self, bytes: &[u8]) -> IoResult<Bitmap> {
        let mut header = HeaderReader::new(bytes);
        let channels = match header.token()? {
            "P5" => 1,
            "P6" => 3,
            magic => return Err(IoError::DecodeError(format!("unsupported PNM magic {:?}", magic))),
        };
        let width: u32 = header.parse("width")?;
        let height: u32 = header.parse("height")?;
        let maxval: u32 = header.parse("maxval")?;
        if maxval == 0 || maxval > 65535 {
            return Err(IoError::InvalidFile(format!("maxval {} out of range", maxval)));
        }
        let payload = header.payload()?;
        trace!(width, height, channels, maxval, "ppm decode");

        if maxval <= 255 {
            let len = payload_len(payload, width, height, channels, 1)?;
            let mut samples = try_alloc(len, 0u8)?;
            samples.copy_from_slice(&payload[..len]);
            if maxval != 255 {
                for s in &mut samples {
                    *s = rescale(*s as u32, maxval, 255) as u8;
                }
            }
            let pixel_type = if channels == 1 { PixelType::Gray8 } else { PixelType::Rgb8 };
            Bitmap::from_top_down(width, height, pixel_type, BitmapData::U8(samples))
        } else {
            let len = payload_len(payload, width, height, channels, 2)?;
            let mut samples = try_alloc(len / 2, 0u16)?;
            BigEndian::read_u16_into(&payload[..len], &mut samples);
            if maxval != 65535 {
                for s in &mut samples {
                    *s = rescale(*s as u32, maxval, 65535) as u16;
                }
            }
            let pixel_type = if channels == 1 { PixelType::Gray16 } else { PixelType::Rgb16 };
            Bitmap::from_top_down(width, height, pixel_type, BitmapData::U16(samples))
        }
    }

    fn encode(&self, bitmap: &Bitmap) -> IoResult<Vec<u8>> {
        let (magic, maxval) = match bitmap.pixel_type() {
            PixelType::Gray8 => ("P5", 255),
            PixelType::Rgb8 => ("P6", 255),
            PixelType::Gray16 => ("P5", 65535),
            PixelType::Rgb16 => ("P6", 65535),
            other => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "PPM backend cannot encode {:?}",
                    other
                )));
            }
        };

        let mut out = Vec::new();
        write!(out, "{}\n{} {}\n{}\n", magic, bitmap.width(), bitmap.height(), maxval)?;
        match bitmap.top_down_data()? {
            BitmapData::U8(v) => out.extend_from_slice(&v),
            BitmapData::U16(v) => {
                let start = out.len();
                out.resize(start + v.len() * 2, 0);
                BigEndian::write_u16_into(&v, &mut out[start..]);
            }
            _ => return Err(IoError::EncodeError("integer samples expected".into())),
        }
        Ok(out)
    }
}

/// Maps `v` in `0..=from` onto `0..=to`, rounding to nearest.
#[inline]
fn rescale(v: u32, from: u32, to: u32) -> u32 {
    (v.min(from) * to + from / 2) / from
}
