pub mod builder;

use image::{GrayImage, RgbImage};
use tracing::{debug, warn};

use crate::{
    algorithms::{
        compute_features, selection::RegionSelection, RegionSelector,
    },
    config::PipelineConfig,
    error::{ensure_same_dimensions, Result},
    traits::{Binarizer, ContourExtractor, MaskCleaner, RegionLabeler},
    types::{Detection, NoDetection, ObjectShape},
    visualize::isolate_region,
};

/// The full object-to-descriptor pipeline.
///
/// Stages run strictly forward and every stage allocates its own output, so a
/// single pipeline can serve several threads at once.
pub struct Pipeline {
    binarizer: Box<dyn Binarizer>,
    cleaner: Box<dyn MaskCleaner>,
    labeler: Box<dyn RegionLabeler>,
    selector: RegionSelector,
    contour_extractor: Box<dyn ContourExtractor>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        binarizer: Box<dyn Binarizer>,
        cleaner: Box<dyn MaskCleaner>,
        labeler: Box<dyn RegionLabeler>,
        selector: RegionSelector,
        contour_extractor: Box<dyn ContourExtractor>,
    ) -> Self {
        Self {
            binarizer,
            cleaner,
            labeler,
            selector,
            contour_extractor,
        }
    }

    /// Build every stage from one configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        builder::PipelineBuilder::from_config(config)?.build()
    }

    /// Step 1: color image to binary mask
    pub fn binarize(&self, image: &RgbImage) -> Result<GrayImage> {
        let mask = self.binarizer.binarize(image)?;
        ensure_same_dimensions("binarization", image.dimensions(), mask.dimensions())?;
        Ok(mask)
    }

    /// Steps 1-2: binary mask after morphological cleanup
    pub fn clean(&self, image: &RgbImage) -> Result<GrayImage> {
        let mask = self.binarize(image)?;
        let cleaned = self.cleaner.clean(&mask)?;
        ensure_same_dimensions("cleanup", mask.dimensions(), cleaned.dimensions())?;
        Ok(cleaned)
    }

    /// Steps 1-4: labeled regions with the kept set and region of interest
    pub fn segment(&self, image: &RgbImage) -> Result<RegionSelection> {
        let cleaned = self.clean(image)?;
        self.selector.select(&cleaned, self.labeler.as_ref())
    }

    /// Measure the region of interest of an existing selection.
    pub fn measure(&self, selection: &RegionSelection) -> Result<Detection> {
        let Some(roi) = selection.region_of_interest().copied() else {
            warn!("no object detected");
            return Ok(Detection::NotDetected(NoDetection::NoForegroundRegion));
        };

        let isolated = isolate_region(selection);
        let contour = self.contour_extractor.extract_contour(&isolated)?;
        debug!(points = contour.len(), "contour extracted");

        match compute_features(&contour, roi.area) {
            Ok(measurement) => Ok(Detection::Detected(ObjectShape {
                region: roi,
                contour,
                rect: measurement.rect,
                features: measurement.features,
            })),
            Err(reason) => {
                warn!(%reason, "no object detected");
                Ok(Detection::NotDetected(reason))
            }
        }
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &RgbImage) -> Result<Detection> {
        let selection = self.segment(image)?;
        self.measure(&selection)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!("Pipeline: keeps up to {} regions", self.selector.max_regions())
    }
}
