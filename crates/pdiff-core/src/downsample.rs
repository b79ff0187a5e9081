//! 2x2 box-filter downsampling and reduced-resolution pyramids.
//!
//! Each output pixel is the component-wise mean (alpha included) of the
//! source block at `(2x, 2y)`, `(2x+1, 2y)`, `(2x, 2y+1)`, `(2x+1, 2y+1)`.
//! Output dimensions are truncated (`W/2`, `H/2`), so every sampled block is
//! fully inside the source and an odd trailing row or column is dropped.
//!
//! Rows of the output are independent and are filled in parallel.

use crate::{Pixel, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

impl RgbaImage {
    /// Returns a half-resolution copy, or `None` when either dimension is
    /// 1 or less.
    ///
    /// The result keeps this image's name.
    ///
    /// ```rust
    /// use pdiff_core::{Pixel, RgbaImage};
    ///
    /// let img = RgbaImage::new(5, 4, None).unwrap();
    /// let half = img.downsample().unwrap();
    /// assert_eq!(half.dimensions(), (2, 2));
    ///
    /// let line = RgbaImage::new(8, 1, None).unwrap();
    /// assert!(line.downsample().is_none());
    /// ```
    pub fn downsample(&self) -> Option<RgbaImage> {
        let (width, height) = self.dimensions();
        if width <= 1 || height <= 1 {
            trace!(width, height, "downsample: nothing to halve");
            return None;
        }

        let nw = width / 2;
        let nh = height / 2;
        let mut out = match RgbaImage::new(nw, nh, self.name()) {
            Ok(img) => img,
            Err(e) => {
                warn!(width = nw, height = nh, "downsample allocation failed: {}", e);
                return None;
            }
        };

        debug!(width, height, nw, nh, "downsample");
        out.pixels_mut()
            .par_chunks_mut(nw as usize)
            .enumerate()
            .for_each(|(y, dst)| {
                let top = self.row(2 * y as u32);
                let bottom = self.row(2 * y as u32 + 1);
                for (x, px) in dst.iter_mut().enumerate() {
                    *px = box_average([
                        top[2 * x],
                        top[2 * x + 1],
                        bottom[2 * x],
                        bottom[2 * x + 1],
                    ]);
                }
            });

        Some(out)
    }

    /// Builds successive half-resolution levels, finest first.
    ///
    /// Level 0 of the result is `self.downsample()`. Stops after `max_levels`
    /// levels or when a level can no longer be halved.
    pub fn pyramid(&self, max_levels: usize) -> Vec<RgbaImage> {
        let mut levels: Vec<RgbaImage> = Vec::new();
        while levels.len() < max_levels {
            let next = match levels.last() {
                Some(prev) => prev.downsample(),
                None => self.downsample(),
            };
            match next {
                Some(level) => levels.push(level),
                None => break,
            }
        }
        levels
    }
}

#[inline]
fn box_average(block: [Pixel; 4]) -> Pixel {
    let mut avg = Pixel::splat(0.0);
    for i in 0..4 {
        let sum = block[0][i] + block[1][i] + block[2][i] + block[3][i];
        avg[i] = sum / 4.0;
    }
    avg
}
