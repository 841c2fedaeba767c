use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    config::PipelineConfig,
    error::{Result, ShapeError},
    pipeline::Pipeline,
    types::Detection,
    visualize::{colorize_regions, isolate_region, RegionPalette},
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq,
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum AnalysisCommand {
    /// Binary mask straight out of the binarizer
    #[serde(rename = "threshold")]
    Threshold,

    /// Binary mask after morphological cleanup
    #[serde(rename = "clean")]
    Clean,

    /// Single-channel mask of the region of interest
    #[serde(rename = "segment")]
    Segment,

    /// Kept regions painted in palette colors
    #[serde(rename = "segment_color")]
    SegmentColor,

    /// Full feature vector of the region of interest
    #[serde(rename = "features")]
    Features,
}

impl AnalysisCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::Threshold => "Binarize the image with the configured policy",
            Self::Clean => "Binarize, then close and open the mask",
            Self::Segment => "Keep only the region of interest as a white mask",
            Self::SegmentColor => "Color each of the largest regions, background black",
            Self::Features => "Compute Hu moments, percent fill and aspect ratio",
        }
    }
}

/// Result of one command: an image to show or a detection to report.
#[derive(Debug, Clone)]
pub enum StageOutput {
    Image(DynamicImage),
    Detection(Detection),
}

/// Holds one image and runs single stages of the pipeline on it.
#[derive(Clone)]
pub struct ShapeAnalyzer {
    image: Option<RgbImage>,
    pipeline: Arc<Pipeline>,
    palette: RegionPalette,
}

impl ShapeAnalyzer {
    pub fn new() -> Result<Self> {
        Self::from_config(&PipelineConfig::default())
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::with_pipeline(
            Pipeline::from_config(config)?,
            RegionPalette::spectrum(config.selection.max_regions),
        ))
    }

    /// Create a new analyzer with a custom pipeline
    pub fn with_pipeline(pipeline: Pipeline, palette: RegionPalette) -> Self {
        Self {
            image: None,
            pipeline: Arc::new(pipeline),
            palette,
        }
    }

    /// Load an image from file
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let img = image::open(path)?;
        self.image = Some(img.to_rgb8());
        Ok(())
    }

    /// Load an image from memory
    pub fn load_image_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let img = image::load_from_memory(bytes)?;
        self.image = Some(img.to_rgb8());
        Ok(())
    }

    /// Set the image directly
    pub fn set_image(&mut self, image: RgbImage) {
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn execute(&self, command: AnalysisCommand) -> Result<StageOutput> {
        let image = self.image.as_ref().ok_or(ShapeError::NoImageLoaded)?;

        let output = match command {
            AnalysisCommand::Threshold => {
                StageOutput::Image(DynamicImage::ImageLuma8(self.pipeline.binarize(image)?))
            }
            AnalysisCommand::Clean => {
                StageOutput::Image(DynamicImage::ImageLuma8(self.pipeline.clean(image)?))
            }
            AnalysisCommand::Segment => {
                let selection = self.pipeline.segment(image)?;
                StageOutput::Image(DynamicImage::ImageLuma8(isolate_region(&selection)))
            }
            AnalysisCommand::SegmentColor => {
                let selection = self.pipeline.segment(image)?;
                let colored = colorize_regions(&selection, &self.palette)?;
                StageOutput::Image(DynamicImage::ImageRgb8(colored))
            }
            AnalysisCommand::Features => StageOutput::Detection(self.pipeline.process(image)?),
        };
        Ok(output)
    }
}
