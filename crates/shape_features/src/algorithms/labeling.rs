//! Connected-component labeling backed by `imageproc`, with per-label statistics.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::trace;

use crate::{
    algorithms::preprocessing::BACKGROUND,
    config::Adjacency,
    error::{ensure_same_dimensions, Result},
    traits::RegionLabeler,
    types::{BoundingBox, RegionStats},
};

/// Label image plus statistics, `stats[label]` for every label including background.
#[derive(Debug, Clone)]
pub struct LabeledRegions {
    labels: Image<Luma<u32>>,
    stats: Vec<RegionStats>,
}

impl LabeledRegions {
    /// Accumulate area, bounding box and centroid for every label in `labels`.
    pub fn from_label_image(labels: Image<Luma<u32>>) -> Self {
        #[derive(Clone, Copy)]
        struct Acc {
            area: u64,
            sum_x: u64,
            sum_y: u64,
            min: (u32, u32),
            max: (u32, u32),
        }

        let mut acc: Vec<Option<Acc>> = vec![None];
        for (x, y, label) in labels.enumerate_pixels() {
            let id = label[0] as usize;
            if acc.len() <= id {
                acc.resize(id + 1, None);
            }
            let entry = acc[id].get_or_insert(Acc {
                area: 0,
                sum_x: 0,
                sum_y: 0,
                min: (x, y),
                max: (x, y),
            });
            entry.area += 1;
            entry.sum_x += x as u64;
            entry.sum_y += y as u64;
            entry.min = (entry.min.0.min(x), entry.min.1.min(y));
            entry.max = (entry.max.0.max(x), entry.max.1.max(y));
        }

        let stats = acc
            .into_iter()
            .enumerate()
            .map(|(label, acc)| match acc {
                Some(a) => RegionStats {
                    label: label as u32,
                    area: a.area as u32,
                    bbox: BoundingBox {
                        x: a.min.0,
                        y: a.min.1,
                        width: a.max.0 - a.min.0 + 1,
                        height: a.max.1 - a.min.1 + 1,
                    },
                    centroid: [a.sum_x as f64 / a.area as f64, a.sum_y as f64 / a.area as f64],
                },
                // An all-foreground mask still gets a background row
                None => RegionStats {
                    label: label as u32,
                    area: 0,
                    bbox: BoundingBox::default(),
                    centroid: [0.0, 0.0],
                },
            })
            .collect();

        Self { labels, stats }
    }

    pub fn labels(&self) -> &Image<Luma<u32>> {
        &self.labels
    }

    pub fn stats(&self) -> &[RegionStats] {
        &self.stats
    }

    pub fn get(&self, label: u32) -> Option<&RegionStats> {
        self.stats.get(label as usize)
    }

    /// Number of labels, background included
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Areas indexed by label
    pub fn areas(&self) -> Vec<u32> {
        self.stats.iter().map(|s| s.area).collect()
    }

    pub fn into_parts(self) -> (Image<Luma<u32>>, Vec<RegionStats>) {
        (self.labels, self.stats)
    }
}

/// Labeler using `imageproc::region_labelling::connected_components`.
///
/// Labels are assigned in raster order of each component's first pixel.
#[derive(Debug, Clone, Default)]
pub struct ImageprocLabeler {
    pub adjacency: Adjacency,
}

impl RegionLabeler for ImageprocLabeler {
    fn label(&self, mask: &GrayImage) -> Result<LabeledRegions> {
        let conn = match self.adjacency {
            Adjacency::Four => Connectivity::Four,
            Adjacency::Eight => Connectivity::Eight,
        };
        let labels = connected_components(mask, conn, Luma([BACKGROUND]));
        ensure_same_dimensions("labeling", mask.dimensions(), labels.dimensions())?;

        let regions = LabeledRegions::from_label_image(labels);
        for s in regions.stats() {
            trace!(label = s.label, area = s.area, cx = s.centroid[0], cy = s.centroid[1], "region");
        }
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::preprocessing::FOREGROUND;

    fn fill(mask: &mut GrayImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) {
        for y in ys {
            for x in xs.clone() {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
    }

    #[test]
    fn stats_cover_background_and_regions() {
        let mut mask = GrayImage::new(20, 10);
        fill(&mut mask, 2..5, 2..4); // 3x2
        fill(&mut mask, 10..18, 5..9); // 8x4

        let regions = ImageprocLabeler::default().label(&mask).expect("label");
        assert_eq!(regions.len(), 3);
        assert_eq!(regions.areas(), vec![200 - 6 - 32, 6, 32]);

        let first = regions.get(1).expect("label 1");
        assert_eq!(first.bbox, BoundingBox { x: 2, y: 2, width: 3, height: 2 });
        assert_eq!(first.centroid, [3.0, 2.5]);

        let second = regions.get(2).expect("label 2");
        assert_eq!(second.bbox, BoundingBox { x: 10, y: 5, width: 8, height: 4 });
        assert_eq!(second.centroid, [13.5, 6.5]);
    }

    #[test]
    fn diagonal_pixels_join_only_with_eight_adjacency() {
        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(1, 1, Luma([FOREGROUND]));
        mask.put_pixel(2, 2, Luma([FOREGROUND]));

        let eight = ImageprocLabeler { adjacency: Adjacency::Eight }.label(&mask).expect("label");
        assert_eq!(eight.len(), 2);

        let four = ImageprocLabeler { adjacency: Adjacency::Four }.label(&mask).expect("label");
        assert_eq!(four.len(), 3);
    }

    #[test]
    fn empty_mask_has_only_background() {
        let regions = ImageprocLabeler::default().label(&GrayImage::new(8, 8)).expect("label");
        assert_eq!(regions.len(), 1);
        assert_eq!(regions.stats()[0].area, 64);
        assert!(regions.stats()[0].is_background());
    }

    #[test]
    fn full_mask_keeps_empty_background_row() {
        let mask = GrayImage::from_pixel(5, 5, Luma([FOREGROUND]));
        let regions = ImageprocLabeler::default().label(&mask).expect("label");
        assert_eq!(regions.areas(), vec![0, 25]);
    }
}
