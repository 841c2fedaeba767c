//! Presentation helpers that consume a [`RegionSelection`] or an [`ObjectShape`].

use std::collections::BTreeMap;

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_line_segment_mut};

use crate::{
    algorithms::{
        preprocessing::{BACKGROUND, FOREGROUND},
        selection::RegionSelection,
    },
    error::{Result, ShapeError},
    types::{ObjectShape, BACKGROUND_LABEL},
};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Ordered list of colors handed out to kept regions by rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPalette(Vec<Rgb<u8>>);

impl RegionPalette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Self {
        Self(colors)
    }

    /// `n` fully saturated colors with evenly spaced hues, starting at red.
    pub fn spectrum(n: usize) -> Self {
        let colors = (0..n)
            .map(|i| hue_to_rgb(i as f64 * 360.0 / n.max(1) as f64))
            .collect();
        Self(colors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.0
    }
}

fn hue_to_rgb(hue: f64) -> Rgb<u8> {
    let h = (hue % 360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let scale = |c: f64| (c * 255.0).round() as u8;
    Rgb([scale(r), scale(g), scale(b)])
}

/// Color assigned to each kept region for one rendering.
///
/// The background label is always black; the region ranked `i` gets `palette[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionColorMap {
    colors: BTreeMap<u32, Rgb<u8>>,
}

impl RegionColorMap {
    pub fn from_selection(selection: &RegionSelection, palette: &RegionPalette) -> Result<Self> {
        let kept = selection.kept_ids();
        if palette.len() < kept.len() {
            return Err(ShapeError::PaletteTooShort {
                needed: kept.len(),
                provided: palette.len(),
            });
        }

        let colors = kept
            .iter()
            .zip(palette.colors())
            .map(|(&id, &color)| (id, if id == BACKGROUND_LABEL { BLACK } else { color }))
            .collect();
        Ok(Self { colors })
    }

    /// Color for `label`, black when the label was not kept.
    pub fn color(&self, label: u32) -> Rgb<u8> {
        self.colors.get(&label).copied().unwrap_or(BLACK)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Paint every kept region in its palette color, everything else black.
pub fn colorize_regions(selection: &RegionSelection, palette: &RegionPalette) -> Result<RgbImage> {
    let map = RegionColorMap::from_selection(selection, palette)?;
    let labels = selection.labels();
    let mut out = RgbImage::new(labels.width(), labels.height());
    for (dst, label) in out.pixels_mut().zip(labels.pixels()) {
        *dst = map.color(label[0]);
    }
    Ok(out)
}

/// Single-channel mask of just the region of interest.
///
/// Entirely black when nothing was selected.
pub fn isolate_region(selection: &RegionSelection) -> GrayImage {
    let labels = selection.labels();
    let roi = selection.region_of_interest().map(|r| r.id);
    let mut out = GrayImage::new(labels.width(), labels.height());
    for (dst, label) in out.pixels_mut().zip(labels.pixels()) {
        *dst = Luma([if Some(label[0]) == roi { FOREGROUND } else { BACKGROUND }]);
    }
    out
}

/// Copy of `source` with the oriented rectangle and the region centroid drawn on it.
pub fn annotate(source: &RgbImage, shape: &ObjectShape, color: Rgb<u8>) -> RgbImage {
    let mut canvas = source.clone();
    let corners = shape.rect.corners();
    for i in 0..4 {
        let [x0, y0] = corners[i];
        let [x1, y1] = corners[(i + 1) % 4];
        draw_line_segment_mut(&mut canvas, (x0 as f32, y0 as f32), (x1 as f32, y1 as f32), color);
    }
    let [cx, cy] = shape.region.centroid;
    draw_cross_mut(&mut canvas, color, cx.round() as i32, cy.round() as i32);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{labeling::ImageprocLabeler, selection::RegionSelector};

    fn two_squares() -> GrayImage {
        let mut mask = GrayImage::new(40, 40);
        for y in 15..25 {
            for x in 15..25 {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
        for y in 0..4 {
            for x in 0..4 {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
        mask
    }

    fn select(mask: &GrayImage, k: usize) -> RegionSelection {
        RegionSelector::new(k)
            .expect("valid")
            .select(mask, &ImageprocLabeler::default())
            .expect("select")
    }

    #[test]
    fn spectrum_starts_at_red_and_is_distinct() {
        let palette = RegionPalette::spectrum(6);
        assert_eq!(palette.colors()[0], Rgb([255, 0, 0]));
        assert_eq!(palette.colors()[2], Rgb([0, 255, 0]));
        assert_eq!(palette.colors()[4], Rgb([0, 0, 255]));
        let mut sorted = palette.colors().to_vec();
        sorted.sort_by_key(|c| c.0);
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }

    #[test]
    fn background_is_black_and_kept_regions_colored() {
        let mask = two_squares();
        let selection = select(&mask, 6);
        let palette = RegionPalette::spectrum(6);
        let colored = colorize_regions(&selection, &palette).expect("colorize");

        assert_eq!(colored.dimensions(), mask.dimensions());
        assert_eq!(*colored.get_pixel(35, 35), BLACK);
        assert_ne!(*colored.get_pixel(20, 20), BLACK);
        assert_ne!(*colored.get_pixel(1, 1), BLACK);
        assert_ne!(colored.get_pixel(20, 20), colored.get_pixel(1, 1));
    }

    #[test]
    fn regions_outside_top_k_are_black() {
        let selection = select(&two_squares(), 2);
        let colored = colorize_regions(&selection, &RegionPalette::spectrum(2)).expect("colorize");
        assert_ne!(*colored.get_pixel(20, 20), BLACK);
        assert_eq!(*colored.get_pixel(1, 1), BLACK);
    }

    #[test]
    fn short_palette_is_rejected() {
        let selection = select(&two_squares(), 6);
        let result = colorize_regions(&selection, &RegionPalette::spectrum(2));
        assert!(matches!(
            result,
            Err(ShapeError::PaletteTooShort { needed: 3, provided: 2 })
        ));
    }

    #[test]
    fn isolate_keeps_only_region_of_interest() {
        let selection = select(&two_squares(), 6);
        let isolated = isolate_region(&selection);
        assert_eq!(isolated.get_pixel(20, 20)[0], FOREGROUND);
        assert_eq!(isolated.get_pixel(1, 1)[0], BACKGROUND);
        assert_eq!(isolated.pixels().filter(|p| p[0] == FOREGROUND).count(), 100);
    }

    #[test]
    fn isolate_empty_selection_is_black() {
        let selection = select(&GrayImage::new(10, 10), 6);
        assert!(isolate_region(&selection).pixels().all(|p| p[0] == BACKGROUND));
    }
}
