//! Polygon moments and the seven Hu invariants.

use serde::{Deserialize, Serialize};

/// Raw spatial moments of a closed polygon up to third order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

impl SpatialMoments {
    /// Integrate over the polygon bounded by `points` using Green's theorem.
    ///
    /// The result does not depend on the winding direction. Polygons with
    /// (near) zero enclosed area produce all-zero moments.
    pub fn from_polygon(points: &[[i32; 2]]) -> Self {
        let Some(&[lx, ly]) = points.last() else {
            return Self::default();
        };

        let (mut a00, mut a10, mut a01) = (0.0f64, 0.0, 0.0);
        let (mut a20, mut a11, mut a02) = (0.0, 0.0, 0.0);
        let (mut a30, mut a21, mut a12, mut a03) = (0.0, 0.0, 0.0, 0.0);

        let (mut xp, mut yp) = (lx as f64, ly as f64);
        let (mut xp2, mut yp2) = (xp * xp, yp * yp);

        for &[x, y] in points {
            let (x, y) = (x as f64, y as f64);
            let (x2, y2) = (x * x, y * y);
            let cross = xp * y - x * yp;
            let xs = xp + x;
            let ys = yp + y;

            a00 += cross;
            a10 += cross * xs;
            a01 += cross * ys;
            a20 += cross * (xp * xs + x2);
            a11 += cross * (xp * (ys + yp) + x * (ys + y));
            a02 += cross * (yp * ys + y2);
            a30 += cross * xs * (xp2 + x2);
            a03 += cross * ys * (yp2 + y2);
            a21 += cross * (xp2 * (3.0 * yp + y) + 2.0 * x * xp * ys + x2 * (yp + 3.0 * y));
            a12 += cross * (yp2 * (3.0 * xp + x) + 2.0 * y * yp * xs + y2 * (xp + 3.0 * x));

            (xp, yp, xp2, yp2) = (x, y, x2, y2);
        }

        if a00.abs() <= f64::from(f32::EPSILON) {
            return Self::default();
        }

        // clockwise input integrates to negative area
        let s = a00.signum();
        Self {
            m00: s * a00 / 2.0,
            m10: s * a10 / 6.0,
            m01: s * a01 / 6.0,
            m20: s * a20 / 12.0,
            m11: s * a11 / 24.0,
            m02: s * a02 / 12.0,
            m30: s * a30 / 20.0,
            m21: s * a21 / 60.0,
            m12: s * a12 / 60.0,
            m03: s * a03 / 20.0,
        }
    }

    pub fn centroid(&self) -> Option<[f64; 2]> {
        (self.m00 != 0.0).then(|| [self.m10 / self.m00, self.m01 / self.m00])
    }

    /// Scale-normalized central moments.
    pub fn normalized_central(&self) -> NormalizedMoments {
        let Some([cx, cy]) = self.centroid() else {
            return NormalizedMoments::default();
        };

        let mu20 = self.m20 - cx * self.m10;
        let mu11 = self.m11 - cx * self.m01;
        let mu02 = self.m02 - cy * self.m01;
        let mu30 = self.m30 - cx * (3.0 * mu20 + cx * self.m10);
        let mu21 = self.m21 - cx * (2.0 * mu11 + cx * self.m01) - cy * mu20;
        let mu12 = self.m12 - cy * (2.0 * mu11 + cy * self.m10) - cx * mu02;
        let mu03 = self.m03 - cy * (3.0 * mu02 + cy * self.m01);

        let s2 = 1.0 / (self.m00 * self.m00);
        let s3 = s2 / self.m00.sqrt();

        NormalizedMoments {
            nu20: mu20 * s2,
            nu11: mu11 * s2,
            nu02: mu02 * s2,
            nu30: mu30 * s3,
            nu21: mu21 * s3,
            nu12: mu12 * s3,
            nu03: mu03 * s3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMoments {
    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
    pub nu30: f64,
    pub nu21: f64,
    pub nu12: f64,
    pub nu03: f64,
}

impl NormalizedMoments {
    /// The seven Hu invariants.
    pub fn hu(&self) -> [f64; 7] {
        let n = self;
        let t0 = n.nu30 + n.nu12;
        let t1 = n.nu21 + n.nu03;
        let q0 = n.nu30 - 3.0 * n.nu12;
        let q1 = 3.0 * n.nu21 - n.nu03;
        let d = n.nu20 - n.nu02;

        let t0s = t0 * t0;
        let t1s = t1 * t1;

        [
            n.nu20 + n.nu02,
            d * d + 4.0 * n.nu11 * n.nu11,
            q0 * q0 + q1 * q1,
            t0s + t1s,
            q0 * t0 * (t0s - 3.0 * t1s) + q1 * t1 * (3.0 * t0s - t1s),
            d * (t0s - t1s) + 4.0 * n.nu11 * t0 * t1,
            q1 * t0 * (t0s - 3.0 * t1s) - q0 * t1 * (3.0 * t0s - t1s),
        ]
    }
}

/// `sign(h) * log10(|h|)`, with 0.0 standing in for zero or non-finite input.
pub fn log_scale(h: f64) -> f64 {
    if h == 0.0 || !h.is_finite() {
        return 0.0;
    }
    h.signum() * h.abs().log10()
}

/// Hu moments of a contour polygon, log scaled.
pub fn log_hu_moments(contour: &[[i32; 2]]) -> [f64; 7] {
    SpatialMoments::from_polygon(contour)
        .normalized_central()
        .hu()
        .map(log_scale)
}
