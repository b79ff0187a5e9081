//! Portable Float Map backend.
//!
//! `PF` holds RGB, `Pf` gray, as 32-bit floats. A negative scale in the
//! header means little-endian samples, a positive one big-endian. Rows are
//! stored bottom-to-top, the same as [`Bitmap`] scanlines, so no flip is
//! needed. Saving writes little-endian `PF`.

use crate::backend::{Backend, ExportType};
use crate::pnm::{payload_len, HeaderReader};
use crate::{Bitmap, BitmapData, Format, IoError, IoResult, PixelType};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use pdiff_core::error::try_alloc;
use std::io::Write;
use tracing::trace;

/// PFM codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PfmBackend;

impl Backend for PfmBackend {
    fn format(&self) -> Format {
        Format::Pfm
    }

    fn supports_export(&self, export: ExportType) -> bool {
        export == ExportType::RgbF32
    }

    fn decode(&self, bytes: &[u8]) -> IoResult<Bitmap> {
        let mut header = HeaderReader::new(bytes);
        let (pixel_type, channels) = match header.token()? {
            "PF" => (PixelType::RgbF32, 3),
            "Pf" => (PixelType::GrayF32, 1),
            magic => return Err(IoError::DecodeError(format!("unsupported PFM magic {:?}", magic))),
        };
        let width: u32 = header.parse("width")?;
        let height: u32 = header.parse("height")?;
        let scale: f32 = header.parse("scale")?;
        if scale == 0.0 || !scale.is_finite() {
            return Err(IoError::InvalidFile(format!("invalid PFM scale {}", scale)));
        }
        let payload = header.payload()?;
        trace!(width, height, channels, little_endian = scale < 0.0, "pfm decode");

        let len = payload_len(payload, width, height, channels, 4)?;
        let mut samples = try_alloc(len / 4, 0.0f32)?;
        if scale < 0.0 {
            LittleEndian::read_f32_into(&payload[..len], &mut samples);
        } else {
            BigEndian::read_f32_into(&payload[..len], &mut samples);
        }
        Bitmap::from_parts(width, height, pixel_type, BitmapData::F32(samples))
    }

    fn encode(&self, bitmap: &Bitmap) -> IoResult<Vec<u8>> {
        let magic = match bitmap.pixel_type() {
            PixelType::RgbF32 => "PF",
            PixelType::GrayF32 => "Pf",
            other => {
                return Err(IoError::UnsupportedPixelType(format!(
                    "PFM backend cannot encode {:?}",
                    other
                )));
            }
        };
        let samples = match bitmap.data() {
            BitmapData::F32(v) => v,
            _ => return Err(IoError::EncodeError("float samples expected".into())),
        };

        let mut out = Vec::new();
        write!(out, "{}\n{} {}\n-1.0\n", magic, bitmap.width(), bitmap.height())?;
        let start = out.len();
        out.resize(start + samples.len() * 4, 0);
        LittleEndian::write_f32_into(samples, &mut out[start..]);
        Ok(out)
    }
}
