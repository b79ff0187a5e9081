//! # pdiff-core
//!
//! Core pixel types for perceptual image comparison.
//!
//! - [`Pixel`] - premultiplied RGBA with `f32` components
//! - [`ChannelOrder`] - packed 8-bit channel layout, supplied by each codec
//! - [`RgbaImage`] - owned, row-major, top-to-bottom canonical image
//! - [`RgbaImage::downsample`] - 2x2 box filter for building pyramids
//!
//! ## Crate Structure
//!
//! ```text
//! pdiff-core (this crate)
//!    ^
//!    |
//!    +-- pdiff-color (gamma, XYZ, L*a*b*, Delta-E)
//!    +-- pdiff-io    (codec bridge: load/save)
//! ```
//!
//! All operations are synchronous and run on the caller's thread, except
//! that downsampling splits independent output rows across the rayon pool.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod downsample;
pub mod error;
pub mod image;
pub mod pixel;

pub use error::{Error, Result};
pub use image::RgbaImage;
pub use pixel::{dequantize, quantize, ChannelOrder, Pixel, ALPHA, BLUE, GREEN, RED};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::RgbaImage;
    pub use crate::pixel::{ChannelOrder, Pixel};
}
