//! Linear RGB to CIE XYZ.
//!
//! Fixed sRGB primaries with a D65 white. The output is on the unit scale:
//! linear white `(1, 1, 1)` maps to `Y = 1.0`.

/// Linear sRGB (D65) to XYZ, row-major.
pub const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// Applies a row-major 3x3 matrix to a vector.
#[inline]
pub fn mat3_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Converts linear RGB to CIE XYZ (unit scale).
///
/// ```rust
/// use pdiff_color::xyz::linear_rgb_to_xyz;
///
/// let xyz = linear_rgb_to_xyz([1.0, 1.0, 1.0]);
/// assert!((xyz[1] - 1.0).abs() < 1e-5);
/// ```
#[inline]
pub fn linear_rgb_to_xyz(rgb: [f32; 3]) -> [f32; 3] {
    mat3_mul(&SRGB_TO_XYZ, rgb)
}
