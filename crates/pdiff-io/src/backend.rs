//! Codec backends and the backend registry.
//!
//! A backend turns file bytes into a [`Bitmap`] and back. It works purely in
//! memory; the bridge owns all file access, so a failed encode never leaves
//! a partial file behind.

use crate::{Bitmap, Format, IoResult};
use pdiff_core::ChannelOrder;

/// Bitmap types the bridge can hand to a backend for saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportType {
    /// 8-bit RGB.
    Int8,
    /// 32-bit float RGB.
    RgbF32,
    /// 32-bit float RGBA.
    RgbaF32,
}

/// A codec for one file format.
///
/// # Example
///
/// ```rust
/// use pdiff_io::backend::{backend_for, ExportType};
/// use pdiff_io::Format;
///
/// let png = backend_for(Format::Png).unwrap();
/// assert!(png.supports_export(ExportType::Int8));
/// assert!(!png.supports_export(ExportType::RgbF32));
/// ```
pub trait Backend: Send + Sync {
    /// Format handled by this backend.
    fn format(&self) -> Format;

    /// Byte layout used when this backend's pixels are packed into words.
    fn native_order(&self) -> ChannelOrder {
        ChannelOrder::RGBA
    }

    /// Whether `encode` accepts bitmaps of the given export type.
    fn supports_export(&self, export: ExportType) -> bool;

    /// Decodes a whole file into a bottom-to-top bitmap.
    fn decode(&self, bytes: &[u8]) -> IoResult<Bitmap>;

    /// Encodes a bottom-to-top bitmap into file bytes.
    fn encode(&self, bitmap: &Bitmap) -> IoResult<Vec<u8>>;
}

/// Returns the compiled-in backend for `format`.
pub fn backend_for(format: Format) -> Option<&'static dyn Backend> {
    match format {
        #[cfg(feature = "png")]
        Format::Png => Some(&crate::png::PngBackend),
        #[cfg(feature = "tiff")]
        Format::Tiff => Some(&crate::tiff::TiffBackend),
        #[cfg(feature = "pnm")]
        Format::Ppm => Some(&crate::ppm::PpmBackend),
        #[cfg(feature = "pnm")]
        Format::Pfm => Some(&crate::pfm::PfmBackend),
        _ => None,
    }
}

/// Formats with a compiled-in backend.
pub fn supported_formats() -> Vec<Format> {
    [Format::Png, Format::Tiff, Format::Ppm, Format::Pfm]
        .into_iter()
        .filter(|&f| backend_for(f).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        assert!(backend_for(Format::Unknown).is_none());
        for f in supported_formats() {
            assert_eq!(backend_for(f).map(|b| b.format()), Some(f));
        }
    }

    #[cfg(all(feature = "png", feature = "tiff", feature = "pnm"))]
    #[test]
    fn test_export_capabilities() {
        let tiff = backend_for(Format::Tiff).unwrap();
        assert!(tiff.supports_export(ExportType::RgbF32));
        assert!(tiff.supports_export(ExportType::Int8));
        let pfm = backend_for(Format::Pfm).unwrap();
        assert!(pfm.supports_export(ExportType::RgbF32));
        assert!(!pfm.supports_export(ExportType::Int8));
        let ppm = backend_for(Format::Ppm).unwrap();
        assert!(!ppm.supports_export(ExportType::RgbF32));
        assert_eq!(supported_formats().len(), 4);
    }
}
