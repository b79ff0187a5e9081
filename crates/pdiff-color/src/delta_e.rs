//! CIE76 color difference.
//!
//! Delta-E is the Euclidean distance between two colors in L\*a\*b\*. A value
//! around 1 is at the threshold of a just-noticeable difference.

use crate::lab::{pixel_to_lab, Lab};
use pdiff_core::{Error, Pixel, Result, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

/// Euclidean distance between two Lab colors.
#[inline]
pub fn delta_e_lab(a: &Lab, b: &Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Delta-E between two pixels after gamma decoding with `gamma`.
///
/// ```rust
/// use pdiff_color::delta_e::delta_e;
/// use pdiff_core::Pixel;
///
/// let p = Pixel::rgb(0.2, 0.4, 0.6);
/// assert_eq!(delta_e(&p, &p, 2.2), 0.0);
/// ```
pub fn delta_e(p1: &Pixel, p2: &Pixel, gamma: f32) -> f32 {
    delta_e_lab(&pixel_to_lab(p1, gamma), &pixel_to_lab(p2, gamma))
}

/// Per-pixel Delta-E of two images of equal size, in row-major order.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] when the images differ in size, and
/// [`Error::AllocationFailed`] when the output buffer cannot be reserved.
pub fn delta_e_map(a: &RgbaImage, b: &RgbaImage, gamma: f32) -> Result<Vec<f32>> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::dimension_mismatch(a.dimensions(), b.dimensions()));
    }
    let (width, height) = a.dimensions();
    debug!(width, height, gamma, "delta_e_map");

    let mut out = pdiff_core::error::try_alloc(a.pixel_count(), 0.0f32)?;
    out.par_iter_mut()
        .zip(a.pixels().par_iter().zip(b.pixels().par_iter()))
        .for_each(|(d, (p1, p2))| *d = delta_e(p1, p2, gamma));
    Ok(out)
}

/// Summary of a Delta-E map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeltaEStats {
    /// Largest difference.
    pub max: f32,
    /// Mean difference.
    pub mean: f32,
    /// Number of samples summarized.
    pub count: usize,
}

impl DeltaEStats {
    /// Summarizes `map`. An empty map gives all zeros.
    pub fn from_map(map: &[f32]) -> Self {
        if map.is_empty() {
            return Self::default();
        }
        let mut max = 0.0f32;
        let mut sum = 0.0f64;
        for &d in map {
            max = max.max(d);
            sum += d as f64;
        }
        Self {
            max,
            mean: (sum / map.len() as f64) as f32,
            count: map.len(),
        }
    }

    /// Number of entries in `map` strictly greater than `threshold`.
    pub fn count_above(map: &[f32], threshold: f32) -> usize {
        map.iter().filter(|&&d| d > threshold).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lab_distance() {
        let a = Lab::new(50.0, 0.0, 0.0);
        let b = Lab::new(53.0, 4.0, 0.0);
        assert_abs_diff_eq!(delta_e_lab(&a, &b), 5.0, epsilon = 1e-6);
        assert_eq!(delta_e_lab(&a, &a), 0.0);
    }

    #[test]
    fn test_black_white_is_large() {
        let d = delta_e(&Pixel::rgb(0.0, 0.0, 0.0), &Pixel::rgb(1.0, 1.0, 1.0), 2.2);
        assert_abs_diff_eq!(d, 100.0, epsilon = 0.1);
    }

    #[test]
    fn test_map_dimension_mismatch() {
        let a = RgbaImage::new(2, 2, None).unwrap();
        let b = RgbaImage::new(2, 3, None).unwrap();
        let err = delta_e_map(&a, &b, 2.2).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_stats() {
        let map = [0.0, 1.0, 2.0, 5.0];
        let s = DeltaEStats::from_map(&map);
        assert_eq!(s.max, 5.0);
        assert_abs_diff_eq!(s.mean, 2.0);
        assert_eq!(s.count, 4);
        assert_eq!(DeltaEStats::count_above(&map, 1.0), 2);
        assert_eq!(DeltaEStats::from_map(&[]), DeltaEStats::default());
    }
}
