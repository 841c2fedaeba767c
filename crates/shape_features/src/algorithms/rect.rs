use geo::{BoundingRect, MinimumRotatedRect};
use geo_types::{Coord, MultiPoint, Point};

use crate::types::RotatedRect;

/// Contour pixel centers as floating-point points.
pub fn contour_points(contour: &[[i32; 2]]) -> Vec<[f64; 2]> {
    contour.iter().map(|&[x, y]| [x as f64, y as f64]).collect()
}

/// Smallest-area rectangle at any orientation that encloses `points`.
///
/// Width runs along the first edge of the rectangle `geo` reports, height
/// along the second. Collinear or coincident points give a zero-height
/// rectangle over their axis-aligned bounds. `None` for an empty point set.
pub fn min_area_rect(points: &[[f64; 2]]) -> Option<RotatedRect> {
    if points.is_empty() {
        return None;
    }
    let multi: MultiPoint<f64> = points.iter().map(|&[x, y]| Point::new(x, y)).collect();

    let corners: Vec<Coord<f64>> = multi
        .minimum_rotated_rect()
        .map(|rect| rect.exterior().coords().take(4).copied().collect())
        .unwrap_or_default();
    if corners.len() < 4 {
        return multi.bounding_rect().map(|bounds| RotatedRect {
            center: [bounds.center().x, bounds.center().y],
            width: bounds.width(),
            height: bounds.height(),
            angle: 0.0,
        });
    }

    let side = |a: Coord<f64>, b: Coord<f64>| (b.x - a.x).hypot(b.y - a.y);
    let center = corners
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| acc + *c / 4.0);
    Some(RotatedRect {
        center: [center.x, center.y],
        width: side(corners[0], corners[1]),
        height: side(corners[1], corners[2]),
        angle: (corners[1].y - corners[0].y).atan2(corners[1].x - corners[0].x),
    })
}
