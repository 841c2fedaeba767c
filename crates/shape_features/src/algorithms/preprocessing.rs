use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::separable_filter_equal;
use tracing::debug;

use crate::{
    config::{BinarizeConfig, BinarizePolicy, Smoothing},
    error::Result,
    traits::Binarizer,
};

/// Mask value of object pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value of background pixels.
pub const BACKGROUND: u8 = 0;

/// Smooth a color image with a separable 3x3 kernel, replicating edges.
pub fn smooth(image: &RgbImage, smoothing: Smoothing) -> RgbImage {
    separable_filter_equal(image, &smoothing.kernel())
}

/// HSV saturation scaled to 0..=255, rounded down. Zero for black pixels.
pub fn saturation(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b) as u32;
    let min = r.min(g).min(b) as u32;
    if max == 0 {
        return 0;
    }
    (255 * (max - min) / max) as u8
}

/// Integer mean of the three channels.
pub fn intensity(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((r as u32 + g as u32 + b as u32) / 3) as u8
}

fn threshold_map<F>(image: &RgbImage, is_foreground: F) -> GrayImage
where
    F: Fn(&Rgb<u8>) -> bool,
{
    let mut mask = GrayImage::new(image.width(), image.height());
    for (dst, src) in mask.pixels_mut().zip(image.pixels()) {
        *dst = Luma([if is_foreground(src) { FOREGROUND } else { BACKGROUND }]);
    }
    mask
}

/// Background is whatever is nearly unsaturated (white, gray, shadows of them)
#[derive(Debug, Clone)]
pub struct SaturationBinarizer {
    pub threshold: u8,
    pub smoothing: Smoothing,
}

impl Default for SaturationBinarizer {
    fn default() -> Self {
        Self { threshold: 35, smoothing: Smoothing::Gaussian }
    }
}

impl Binarizer for SaturationBinarizer {
    fn binarize(&self, image: &RgbImage) -> Result<GrayImage> {
        let blurred = smooth(image, self.smoothing);
        let mask = threshold_map(&blurred, |p| saturation(p) >= self.threshold);
        debug!(threshold = self.threshold, "saturation binarization done");
        Ok(mask)
    }
}

/// Dark object on a light background
#[derive(Debug, Clone)]
pub struct IntensityBinarizer {
    pub threshold: u8,
    pub smoothing: Smoothing,
}

impl Default for IntensityBinarizer {
    fn default() -> Self {
        Self { threshold: 110, smoothing: Smoothing::Gaussian }
    }
}

impl Binarizer for IntensityBinarizer {
    fn binarize(&self, image: &RgbImage) -> Result<GrayImage> {
        let blurred = smooth(image, self.smoothing);
        let mask = threshold_map(&blurred, |p| intensity(p) < self.threshold);
        debug!(threshold = self.threshold, "intensity binarization done");
        Ok(mask)
    }
}

/// Build the binarizer selected by the configuration
pub fn binarizer_from_config(config: &BinarizeConfig) -> Box<dyn Binarizer> {
    match config.policy {
        BinarizePolicy::Saturation => Box::new(SaturationBinarizer {
            threshold: config.saturation_threshold,
            smoothing: config.smoothing,
        }),
        BinarizePolicy::Intensity => Box::new(IntensityBinarizer {
            threshold: config.intensity_threshold,
            smoothing: config.smoothing,
        }),
    }
}
