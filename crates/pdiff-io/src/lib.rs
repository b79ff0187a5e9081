//! # pdiff-io
//!
//! Codec bridge for perceptual image comparison.
//!
//! Turns image files into [`RgbaImage`]s and back:
//!
//! - **PNG** - 8/16-bit gray, gray+alpha, RGB, RGBA
//! - **TIFF** - 1/2/4-bit gray, 8/16/32-bit integer and 32-bit float
//! - **PPM/PGM** - binary `P6`/`P5`, 8 or 16 bits per sample
//! - **PFM** - Portable Float Map, RGB and gray
//!
//! # Architecture
//!
//! - [`Backend`] - one codec per format, working on in-memory [`Bitmap`]s
//! - [`CodecBridge`] - normalizes bitmaps to and from [`RgbaImage`]
//! - [`load`] / [`save`] - the default bridge with format auto-detection
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let image = pdiff_io::load("before.png")?;
//! pdiff_io::save("before.pfm", &image)?;
//! # Ok::<(), pdiff_io::IoError>(())
//! ```
//!
//! # Supported Formats
//!
//! | Format | Read | Write |
//! |--------|------|-------|
//! | PNG | 8, 16 | 8-bit RGB |
//! | TIFF | 1, 2, 4, 8, 16, 32, 32f | 32f RGB |
//! | PPM | 8, 16 | 8-bit RGB |
//! | PFM | 32f | 32f RGB |
//!
//! Float gray (TIFF or `Pf`) decodes but cannot be loaded as an image.
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `tiff` - TIFF support (default)
//! - `pnm` - PPM/PGM and PFM support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backend;
pub mod bitmap;
pub mod bridge;
pub mod error;
pub mod format;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "tiff")]
pub mod tiff;

#[cfg(feature = "pnm")]
mod pnm;
#[cfg(feature = "pnm")]
pub mod pfm;
#[cfg(feature = "pnm")]
pub mod ppm;

pub use backend::{backend_for, supported_formats, Backend, ExportType};
pub use bitmap::{Bitmap, BitmapData, PixelType};
pub use bridge::CodecBridge;
pub use error::{IoError, IoResult};
pub use format::Format;

use pdiff_core::RgbaImage;
use std::path::Path;

/// Loads an image with format auto-detection.
///
/// Uses [`CodecBridge::default`].
pub fn load<P: AsRef<Path>>(path: P) -> IoResult<RgbaImage> {
    CodecBridge::default().load(path)
}

/// Saves an image in the format named by the file extension.
///
/// Uses [`CodecBridge::default`].
pub fn save<P: AsRef<Path>>(path: P, image: &RgbaImage) -> IoResult<()> {
    CodecBridge::default().save(path, image)
}
