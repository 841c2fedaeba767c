use std::cmp::Ordering;

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use tracing::{debug, warn};

use crate::{
    algorithms::labeling::LabeledRegions,
    config::SelectionConfig,
    error::{ensure_same_dimensions, Result, ShapeError},
    traits::RegionLabeler,
    types::{RegionOfInterest, RegionStats, BACKGROUND_LABEL},
};

/// Indices of the `k` largest values, largest first. Equal values keep index order.
pub fn top_k_by_area(areas: &[u32], k: usize) -> Vec<u32> {
    let mut order: Vec<u32> = (0..areas.len() as u32).collect();
    // stable sort, so ties stay in ascending index order
    order.sort_by(|&a, &b| areas[b as usize].cmp(&areas[a as usize]));
    order.truncate(k);
    order
}

/// Integer center `(width / 2, height / 2)` of an image.
pub fn image_center(width: u32, height: u32) -> [f64; 2] {
    [(width / 2) as f64, (height / 2) as f64]
}

/// Kept, non-background region whose centroid is nearest `center`.
///
/// Distances tie toward the lower label.
pub fn closest_to_center<'a>(
    kept_ids: &[u32],
    stats: &'a [RegionStats],
    center: [f64; 2],
) -> Option<&'a RegionStats> {
    kept_ids
        .iter()
        .filter(|&&id| id != BACKGROUND_LABEL)
        .filter_map(|&id| stats.get(id as usize))
        .map(|s| {
            let dx = s.centroid[0] - center[0];
            let dy = s.centroid[1] - center[1];
            (dx * dx + dy * dy, s)
        })
        .min_by(|(da, a), (db, b)| match da.total_cmp(db) {
            Ordering::Equal => a.label.cmp(&b.label),
            other => other,
        })
        .map(|(_, s)| s)
}

/// Labeled mask with the kept regions and the chosen region of interest.
#[derive(Debug, Clone)]
pub struct RegionSelection {
    labels: Image<Luma<u32>>,
    stats: Vec<RegionStats>,
    kept_ids: Vec<u32>,
    region_of_interest: Option<RegionOfInterest>,
}

impl RegionSelection {
    pub fn labels(&self) -> &Image<Luma<u32>> {
        &self.labels
    }

    pub fn stats(&self) -> &[RegionStats] {
        &self.stats
    }

    /// Largest regions in area order, background included if it ranked
    pub fn kept_ids(&self) -> &[u32] {
        &self.kept_ids
    }

    /// Kept ids without the background label
    pub fn foreground_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.kept_ids.iter().copied().filter(|&id| id != BACKGROUND_LABEL)
    }

    pub fn is_kept(&self, label: u32) -> bool {
        self.kept_ids.contains(&label)
    }

    pub fn region_of_interest(&self) -> Option<&RegionOfInterest> {
        self.region_of_interest.as_ref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.labels.dimensions()
    }
}

/// Keeps the `max_regions` largest regions and picks the most central one.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    max_regions: usize,
}

impl RegionSelector {
    pub fn new(max_regions: usize) -> Result<Self> {
        if max_regions == 0 {
            return Err(ShapeError::invalid("max_regions", "must be at least 1"));
        }
        Ok(Self { max_regions })
    }

    pub fn from_config(config: &SelectionConfig) -> Result<Self> {
        Self::new(config.max_regions)
    }

    pub fn max_regions(&self) -> usize {
        self.max_regions
    }

    /// Label `mask` and select regions from the result.
    pub fn select(&self, mask: &GrayImage, labeler: &dyn RegionLabeler) -> Result<RegionSelection> {
        let regions = labeler.label(mask)?;
        ensure_same_dimensions("region selection", mask.dimensions(), regions.labels().dimensions())?;
        Ok(self.select_labeled(regions))
    }

    /// Select from regions that are already labeled.
    pub fn select_labeled(&self, regions: LabeledRegions) -> RegionSelection {
        let kept_ids = top_k_by_area(&regions.areas(), self.max_regions);
        let (labels, stats) = regions.into_parts();

        let center = image_center(labels.width(), labels.height());
        let region_of_interest = closest_to_center(&kept_ids, &stats, center).map(RegionOfInterest::from);

        match &region_of_interest {
            Some(roi) => debug!(
                kept = ?kept_ids,
                roi = roi.id,
                area = roi.area,
                "region of interest selected"
            ),
            None => warn!(kept = ?kept_ids, "no foreground region to select"),
        }

        RegionSelection {
            labels,
            stats,
            kept_ids,
            region_of_interest,
        }
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self { max_regions: 6 }
    }
}
