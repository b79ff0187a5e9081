//! Delta-E properties over the full gamma -> XYZ -> Lab pipeline.

use approx::assert_abs_diff_eq;
use pdiff_color::lab::{lab_f, EPSILON, KAPPA};
use pdiff_color::prelude::*;
use pdiff_core::{Pixel, RgbaImage};

fn samples() -> Vec<Pixel> {
    let mut out = Vec::new();
    for r in [0.0, 0.01, 0.3, 0.75, 1.0] {
        for g in [0.0, 0.05, 0.5, 1.0] {
            for b in [0.0, 0.2, 0.9] {
                out.push(Pixel::rgb(r, g, b));
            }
        }
    }
    out
}

const GAMMAS: [f32; 6] = [0.5, 1.0, 1.8, DEFAULT_GAMMA, 2.4, 3.0];

#[test]
fn identity_is_zero() {
    for gamma in GAMMAS {
        for p in samples() {
            assert_eq!(delta_e(&p, &p, gamma), 0.0, "{:?} at {}", p, gamma);
        }
    }
}

#[test]
fn symmetric() {
    let px = samples();
    for gamma in GAMMAS {
        for a in &px {
            for b in &px {
                let ab = delta_e(a, b, gamma);
                let ba = delta_e(b, a, gamma);
                assert_abs_diff_eq!(ab, ba, epsilon = 1e-5);
                assert!(ab >= 0.0, "{:?} {:?} at {}", a, b, gamma);
            }
        }
    }
}

#[test]
fn lab_f_continuous_across_threshold() {
    let delta = 1e-5;
    let lo = lab_f(EPSILON - delta);
    let hi = lab_f(EPSILON + delta);
    assert_abs_diff_eq!(lo, hi, epsilon = 1e-3);
    assert_abs_diff_eq!(lab_f(EPSILON), (KAPPA * EPSILON + 16.0) / 116.0);
}

#[test]
fn near_black_differences_are_small_but_nonzero() {
    let a = Pixel::rgb(0.0, 0.0, 0.0);
    let b = Pixel::rgb(0.02, 0.02, 0.02);
    let d = delta_e(&a, &b, DEFAULT_GAMMA);
    assert!(d > 0.0 && d < 1.0, "d = {}", d);
}

#[test]
fn map_matches_pointwise() {
    let mut a = RgbaImage::new(3, 2, Some("a")).unwrap();
    let mut b = RgbaImage::new(3, 2, Some("b")).unwrap();
    for i in 0..6 {
        let v = i as f32 / 6.0;
        a.set_rgb(i, [v, 0.5, 1.0 - v]);
        b.set_rgb(i, [v, 0.5, v]);
    }

    let map = delta_e_map(&a, &b, DEFAULT_GAMMA).unwrap();
    assert_eq!(map.len(), 6);
    for (i, d) in map.iter().enumerate() {
        let expected = delta_e(&a.get_index(i), &b.get_index(i), DEFAULT_GAMMA);
        assert_eq!(*d, expected);
    }

    let stats = DeltaEStats::from_map(&map);
    assert_eq!(stats.count, 6);
    assert!(stats.max >= stats.mean);
}
