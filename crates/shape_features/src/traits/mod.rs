use image::{GrayImage, RgbImage};
use crate::{
    algorithms::LabeledRegions,
    error::Result,
    types::Contour,
};

/// Trait for turning a color image into a foreground/background mask
pub trait Binarizer: Send + Sync {
    /// Produce a mask of the same size: 255 for foreground, 0 for background
    fn binarize(&self, image: &RgbImage) -> Result<GrayImage>;
}

/// Trait for mask cleanup algorithms
pub trait MaskCleaner: Send + Sync {
    /// Return a cleaned mask of the same size
    fn clean(&self, mask: &GrayImage) -> Result<GrayImage>;
}

/// Trait for connected-component labeling with per-label statistics
pub trait RegionLabeler: Send + Sync {
    /// Label every foreground pixel; statistics are indexed by label, background first
    fn label(&self, mask: &GrayImage) -> Result<LabeledRegions>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract the outermost boundary of the foreground in a single-region mask
    fn extract_contour(&self, mask: &GrayImage) -> Result<Contour>;
}
