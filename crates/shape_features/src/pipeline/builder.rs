use crate::{
    algorithms::{
        binarizer_from_config, ImageprocContourExtractor, ImageprocLabeler, IntensityBinarizer,
        MorphologicalCleaner, RegionSelector, SaturationBinarizer,
    },
    config::PipelineConfig,
    error::Result,
    pipeline::Pipeline,
    traits::{Binarizer, ContourExtractor, MaskCleaner, RegionLabeler},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    binarizer: Option<Box<dyn Binarizer>>,
    cleaner: Option<Box<dyn MaskCleaner>>,
    labeler: Option<Box<dyn RegionLabeler>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    max_regions: usize,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            binarizer: None,
            cleaner: None,
            labeler: None,
            contour_extractor: None,
            max_regions: 6,
        }
    }

    /// Builder preloaded with every stage described by `config`
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            binarizer: Some(binarizer_from_config(&config.binarize)),
            cleaner: Some(Box::new(MorphologicalCleaner::from_config(&config.morphology)?)),
            labeler: Some(Box::new(ImageprocLabeler {
                adjacency: config.selection.adjacency,
            })),
            contour_extractor: None,
            max_regions: config.selection.max_regions,
        })
    }

    /// Set the binarizer (replaces any existing one)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: Binarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    /// Set the mask cleaner (replaces any existing one)
    pub fn set_cleaner<C>(mut self, cleaner: C) -> Self
    where
        C: MaskCleaner + 'static,
    {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    /// Set the region labeler (replaces any existing one)
    pub fn set_labeler<L>(mut self, labeler: L) -> Self
    where
        L: RegionLabeler + 'static,
    {
        self.labeler = Some(Box::new(labeler));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Threshold on channel saturation instead of intensity
    pub fn with_saturation_threshold(self, threshold: u8) -> Self {
        self.set_binarizer(SaturationBinarizer {
            threshold,
            ..SaturationBinarizer::default()
        })
    }

    /// Threshold on channel average
    pub fn with_intensity_threshold(self, threshold: u8) -> Self {
        self.set_binarizer(IntensityBinarizer {
            threshold,
            ..IntensityBinarizer::default()
        })
    }

    /// Number of largest regions considered, background included
    pub fn with_max_regions(mut self, max_regions: usize) -> Self {
        self.max_regions = max_regions;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Result<Pipeline> {
        let selector = RegionSelector::new(self.max_regions)?;

        let binarizer = self
            .binarizer
            .unwrap_or_else(|| Box::new(IntensityBinarizer::default()));
        let cleaner = self
            .cleaner
            .unwrap_or_else(|| Box::new(MorphologicalCleaner::default()));
        let labeler = self
            .labeler
            .unwrap_or_else(|| Box::new(ImageprocLabeler::default()));
        let contour_extractor = self
            .contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor));

        Ok(Pipeline::new(binarizer, cleaner, labeler, selector, contour_extractor))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeError;

    #[test]
    fn zero_regions_fails_at_build() {
        let result = PipelineBuilder::new().with_max_regions(0).build();
        assert!(matches!(result, Err(ShapeError::InvalidParameter { .. })));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.morphology.kernel_height = 2;
        assert!(PipelineBuilder::from_config(&config).is_err());
    }

    #[test]
    fn config_sets_region_limit() {
        let mut config = PipelineConfig::default();
        config.selection.max_regions = 3;
        let pipeline = Pipeline::from_config(&config).expect("valid config");
        assert_eq!(pipeline.info(), "Pipeline: keeps up to 3 regions");
    }
}
