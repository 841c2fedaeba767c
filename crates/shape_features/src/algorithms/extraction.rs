use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use crate::{error::Result, traits::ContourExtractor, types::Contour};

/// Imageproc-based contour extractor
///
/// Returns the first outer border with no parent, i.e. the outermost boundary
/// in raster order.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor;

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contour(&self, mask: &GrayImage) -> Result<Contour> {
        let contours = find_contours::<i32>(mask);

        let outer = contours
            .into_iter()
            .find(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none());

        Ok(outer
            .map(|contour| contour.points.iter().map(|p| [p.x, p.y]).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn square_contour_walks_the_border() {
        let mut mask = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let contour = ImageprocContourExtractor.extract_contour(&mask).expect("contour");
        // one point per border pixel of a 10x10 square
        assert_eq!(contour.len(), 36);
        assert!(contour.iter().all(|&[x, y]| (5..15).contains(&x) && (5..15).contains(&y)));
        assert!(contour.contains(&[5, 5]) && contour.contains(&[14, 14]));
    }

    #[test]
    fn ring_returns_outer_boundary_only() {
        let mut mask = GrayImage::new(30, 30);
        for y in 5..25 {
            for x in 5..25 {
                if !(10..20).contains(&x) || !(10..20).contains(&y) {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        let contour = ImageprocContourExtractor.extract_contour(&mask).expect("contour");
        assert!(contour.contains(&[5, 5]));
        assert!(contour
            .iter()
            .all(|&[x, y]| x == 5 || x == 24 || y == 5 || y == 24));
    }

    #[test]
    fn empty_mask_has_empty_contour() {
        let contour = ImageprocContourExtractor
            .extract_contour(&GrayImage::new(10, 10))
            .expect("contour");
        assert!(contour.is_empty());
    }
}
