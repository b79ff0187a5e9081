//! # pdiff-color
//!
//! Color science for perceptual image comparison.
//!
//! The pipeline for one pixel is:
//!
//! ```text
//! encoded RGB --gamma_decode--> linear RGB --SRGB_TO_XYZ--> XYZ --x100--> L*a*b*
//! ```
//!
//! and two pixels are compared by the Euclidean distance of their L\*a\*b\*
//! values (CIE76 Delta-E).
//!
//! - [`transfer`] - power-law gamma decoding
//! - [`xyz`] - linear sRGB to CIE XYZ
//! - [`lab`] - CIE XYZ to L\*a\*b\* against a D65 white
//! - [`delta_e`] - pixel and whole-image Delta-E
//!
//! # Example
//!
//! ```rust
//! use pdiff_color::prelude::*;
//! use pdiff_core::Pixel;
//!
//! let a = Pixel::rgb(0.5, 0.5, 0.5);
//! let b = Pixel::rgb(0.52, 0.5, 0.5);
//! let d = delta_e(&a, &b, DEFAULT_GAMMA);
//! assert!(d > 0.0 && d < 5.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod delta_e;
pub mod lab;
pub mod transfer;
pub mod xyz;

pub use delta_e::{delta_e, delta_e_lab, delta_e_map, DeltaEStats};
pub use lab::{pixel_to_lab, xyz_to_lab, Lab, ToLab};
pub use transfer::{gamma_decode, linearize, DEFAULT_GAMMA};
pub use xyz::linear_rgb_to_xyz;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::delta_e::{delta_e, delta_e_map, DeltaEStats};
    pub use crate::lab::{Lab, ToLab};
    pub use crate::transfer::DEFAULT_GAMMA;
}
