//! CIE XYZ to CIE L\*a\*b\*.
//!
//! XYZ is normalized by a fixed D65 reference white given on the 0..100
//! scale, then passed through the piecewise function
//!
//! ```text
//! f(t) = cbrt(t)                 if t > EPSILON
//!      = (KAPPA * t + 16) / 116  otherwise
//!
//! L* = 116 * f(Y/Yn) - 16
//! a* = 500 * (f(X/Xn) - f(Y/Yn))
//! b* = 200 * (f(Y/Yn) - f(Z/Zn))
//! ```
//!
//! The linear segment keeps the derivative finite near black; both branches
//! are required for correct near-black results.

use crate::transfer::gamma_decode;
use crate::xyz::linear_rgb_to_xyz;
use pdiff_core::Pixel;

/// Threshold between the linear and cube-root segments.
pub const EPSILON: f32 = 0.008856;

/// Slope of the linear segment.
pub const KAPPA: f32 = 903.3;

/// D65 reference white `[Xn, Yn, Zn]` on the 0..100 scale.
pub const D65_WHITE: [f32; 3] = [95.05, 100.0, 108.90];

/// Factor taking unit-scale XYZ (white `Y = 1`) to the scale of [`D65_WHITE`].
pub const XYZ_SCALE: f32 = 100.0;

/// A color in CIE L\*a\*b\*. Transient, never stored in an image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    /// Lightness L\*, 0 for black and 100 for the reference white.
    pub l: f32,
    /// Green-red axis a\*.
    pub a: f32,
    /// Blue-yellow axis b\*.
    pub b: f32,
}

impl Lab {
    /// Creates a Lab value.
    #[inline]
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Returns `[L*, a*, b*]`.
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.l, self.a, self.b]
    }
}

/// The piecewise Lab companding function.
#[inline]
pub fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// Converts XYZ (on the 0..100 scale of [`D65_WHITE`]) to L\*a\*b\*.
///
/// ```rust
/// use pdiff_color::lab::{xyz_to_lab, D65_WHITE};
///
/// let white = xyz_to_lab(D65_WHITE);
/// assert!((white.l - 100.0).abs() < 1e-4);
/// ```
pub fn xyz_to_lab(xyz: [f32; 3]) -> Lab {
    let fx = lab_f(xyz[0] / D65_WHITE[0]);
    let fy = lab_f(xyz[1] / D65_WHITE[1]);
    let fz = lab_f(xyz[2] / D65_WHITE[2]);
    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Gamma-decodes a pixel's RGB, converts to XYZ and then to L\*a\*b\*.
///
/// Alpha is ignored; premultiplied RGB is used as stored.
pub fn pixel_to_lab(pixel: &Pixel, gamma: f32) -> Lab {
    let linear = pixel.rgb_triplet().map(|v| gamma_decode(v, gamma));
    let xyz = linear_rgb_to_xyz(linear).map(|v| v * XYZ_SCALE);
    xyz_to_lab(xyz)
}

/// Conversion of pixel-like values to L\*a\*b\*.
pub trait ToLab {
    /// Converts to L\*a\*b\* using the given decoding gamma.
    fn to_lab(&self, gamma: f32) -> Lab;
}

impl ToLab for Pixel {
    #[inline]
    fn to_lab(&self, gamma: f32) -> Lab {
        pixel_to_lab(self, gamma)
    }
}

impl ToLab for [f32; 3] {
    #[inline]
    fn to_lab(&self, gamma: f32) -> Lab {
        pixel_to_lab(&Pixel::from_rgb_array(*self), gamma)
    }
}
