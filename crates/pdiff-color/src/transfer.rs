//! Gamma decoding.
//!
//! A plain power law `linear = encoded^gamma`. Inputs are assumed to be
//! roughly sRGB-encoded; the piecewise sRGB EOTF is deliberately not used.
//!
//! Values outside [0, 1] are not clamped. A negative input with a
//! non-integer gamma yields NaN, exactly as `f32::powf` does.

use pdiff_core::Pixel;

/// Gamma commonly used for display-referred 8-bit images.
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Decodes one component: `v^gamma`.
///
/// ```rust
/// use pdiff_color::transfer::gamma_decode;
///
/// let linear = gamma_decode(0.5, 2.2);
/// assert!((linear - 0.2176).abs() < 1e-4);
/// ```
#[inline]
pub fn gamma_decode(v: f32, gamma: f32) -> f32 {
    v.powf(gamma)
}

/// Decodes the RGB components of `rgb`.
#[inline]
pub fn linearize_rgb(rgb: [f32; 3], gamma: f32) -> [f32; 3] {
    rgb.map(|v| gamma_decode(v, gamma))
}

/// Decodes a pixel's RGB, carrying alpha through unchanged.
#[inline]
pub fn linearize(pixel: Pixel, gamma: f32) -> Pixel {
    pixel.map_rgb(|v| gamma_decode(v, gamma))
}
