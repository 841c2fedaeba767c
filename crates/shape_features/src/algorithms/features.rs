use tracing::debug;

use crate::{
    algorithms::{
        moments::log_hu_moments,
        rect::{contour_points, min_area_rect},
    },
    types::{FeatureVector, NoDetection, RotatedRect},
};

/// Feature vector together with the rectangle it was measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub features: FeatureVector,
    pub rect: RotatedRect,
}

/// Percentage of the rectangle covered by `area` pixels, in (0, 100].
///
/// The rectangle joins pixel centers, so the pixels of a region can outnumber
/// its area; the result is clamped to 100. A one-pixel-thick region has a
/// flat rectangle and counts as completely filled. Zero `area` yields 0.0.
pub fn percent_fill(area: u32, rect: &RotatedRect) -> f64 {
    if area == 0 {
        return 0.0;
    }
    let rect_area = rect.area();
    if rect_area <= 0.0 || !rect_area.is_finite() {
        return 100.0;
    }
    (100.0 * area as f64 / rect_area).min(100.0)
}

/// `width / height` as measured, without reordering. Zero height yields 0.0.
pub fn aspect_ratio(rect: &RotatedRect) -> f64 {
    if rect.height <= 0.0 {
        return 0.0;
    }
    rect.width / rect.height
}

/// Shape descriptor of one region from its outer contour and pixel area.
pub fn compute_features(contour: &[[i32; 2]], area: u32) -> Result<Measurement, NoDetection> {
    if contour.is_empty() {
        return Err(NoDetection::EmptyContour);
    }
    if area == 0 {
        return Err(NoDetection::ZeroArea);
    }

    let hu = log_hu_moments(contour);
    let rect = min_area_rect(&contour_points(contour)).ok_or(NoDetection::EmptyContour)?;

    let fill = percent_fill(area, &rect);
    let ratio = aspect_ratio(&rect);
    debug!(?hu, fill, ratio, width = rect.width, height = rect.height, "features computed");

    Ok(Measurement {
        features: FeatureVector::new(hu, fill, ratio),
        rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::extraction::ImageprocContourExtractor;
    use crate::traits::ContourExtractor;
    use image::{GrayImage, Luma};

    fn rasterize_rotated_rect(w: f64, h: f64, angle: f64) -> GrayImage {
        let mut mask = GrayImage::new(200, 200);
        let (s, c) = angle.sin_cos();
        for y in 0..200u32 {
            for x in 0..200u32 {
                let dx = x as f64 - 100.0;
                let dy = y as f64 - 100.0;
                let u = c * dx + s * dy;
                let v = -s * dx + c * dy;
                if u.abs() <= w / 2.0 && v.abs() <= h / 2.0 {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        mask
    }

    fn measure(mask: &GrayImage) -> Measurement {
        let contour = ImageprocContourExtractor.extract_contour(mask).expect("contour");
        let area = mask.pixels().filter(|p| p[0] != 0).count() as u32;
        compute_features(&contour, area).expect("features")
    }

    #[test]
    fn empty_contour_is_not_detected() {
        assert_eq!(compute_features(&[], 10), Err(NoDetection::EmptyContour));
    }

    #[test]
    fn zero_area_is_not_detected() {
        assert_eq!(compute_features(&[[1, 1], [2, 1]], 0), Err(NoDetection::ZeroArea));
    }

    #[test]
    fn solid_square_fills_its_rectangle() {
        let mut mask = GrayImage::new(60, 60);
        for y in 15..45 {
            for x in 15..45 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let m = measure(&mask);
        assert!((m.features.percent_fill() - 100.0).abs() < 1e-9);
        assert!((m.features.aspect_ratio() - 1.0).abs() < 1e-9);
        assert!(m.features.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rotated_rectangle_keeps_its_ratio() {
        let upright = measure(&rasterize_rotated_rect(90.0, 30.0, 0.0));
        let rotated = measure(&rasterize_rotated_rect(90.0, 30.0, 30f64.to_radians()));

        let normalized = |r: f64| if r < 1.0 { 1.0 / r } else { r };
        let up = normalized(upright.features.aspect_ratio());
        let rot = normalized(rotated.features.aspect_ratio());
        assert!((up - 3.0).abs() < 0.15, "upright ratio {up}");
        assert!((rot - 3.0).abs() < 0.25, "rotated ratio {rot}");

        for m in [upright, rotated] {
            let fill = m.features.percent_fill();
            assert!(fill > 0.0 && fill <= 100.0, "fill {fill}");
            assert!(fill > 85.0, "fill {fill}");
        }
        assert!((upright.features.hu_moments()[0] - rotated.features.hu_moments()[0]).abs() < 0.02);
    }

    #[test]
    fn irregular_shape_fill_stays_in_range() {
        // L shape
        let mut mask = GrayImage::new(50, 50);
        for y in 5..45 {
            for x in 5..15 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        for y in 35..45 {
            for x in 15..45 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let fill = measure(&mask).features.percent_fill();
        assert!(fill > 0.0 && fill < 60.0, "fill {fill}");
    }

    #[test]
    fn degenerate_rect_gives_sentinels() {
        let flat = RotatedRect { center: [0.0, 0.0], width: 5.0, height: 0.0, angle: 0.0 };
        assert_eq!(percent_fill(6, &flat), 100.0);
        assert_eq!(percent_fill(0, &flat), 0.0);
        assert_eq!(aspect_ratio(&flat), 0.0);
    }

    #[test]
    fn rectangle_is_fitted_to_the_contour() {
        let mut mask = GrayImage::new(60, 60);
        for y in 10..20 {
            for x in 10..40 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let m = measure(&mask);
        let (long, short) = (m.rect.width.max(m.rect.height), m.rect.width.min(m.rect.height));
        assert!((long - 29.0).abs() < 1e-9, "long side {long}");
        assert!((short - 9.0).abs() < 1e-9, "short side {short}");
    }

    #[test]
    fn thin_line_counts_as_full() {
        let mut mask = GrayImage::new(30, 10);
        for x in 5..25 {
            mask.put_pixel(x, 4, Luma([255]));
        }
        let fill = measure(&mask).features.percent_fill();
        assert!(fill > 0.0 && fill <= 100.0, "fill {fill}");
    }
}
