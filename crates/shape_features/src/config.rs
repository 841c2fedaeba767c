use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::error::{Result, ShapeError};

/// Which rule turns a color pixel into foreground.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BinarizePolicy {
    /// Low-saturation pixels are background (colored object on white/gray)
    Saturation,
    /// Bright pixels are background (dark object on light background)
    #[default]
    Intensity,
}

/// Separable 3x3 smoothing kernel applied before thresholding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Smoothing {
    /// [1, 2, 1] / 4 in each direction
    #[default]
    Gaussian,
    /// [1, 1, 1] / 3 in each direction
    Box,
}

impl Smoothing {
    pub fn kernel(&self) -> [f32; 3] {
        match self {
            Self::Gaussian => [0.25, 0.5, 0.25],
            Self::Box => [1.0 / 3.0; 3],
        }
    }
}

/// Pixel adjacency used when labeling regions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Adjacency {
    Four,
    #[default]
    Eight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BinarizeConfig {
    pub policy: BinarizePolicy,
    /// Saturation below this is background
    #[schemars(range(min = 0, max = 255))]
    pub saturation_threshold: u8,
    /// Channel average below this is foreground
    #[schemars(range(min = 0, max = 255))]
    pub intensity_threshold: u8,
    pub smoothing: Smoothing,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            policy: BinarizePolicy::Intensity,
            saturation_threshold: 35,
            intensity_threshold: 110,
            smoothing: Smoothing::Gaussian,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MorphologyConfig {
    /// Elliptical structuring element width, odd
    pub kernel_width: u32,
    /// Elliptical structuring element height, odd
    pub kernel_height: u32,
    pub close_iterations: u32,
    pub open_iterations: u32,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            kernel_width: 3,
            kernel_height: 3,
            close_iterations: 20,
            open_iterations: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of largest regions kept (background included in the ranking)
    #[schemars(range(min = 1))]
    pub max_regions: usize,
    pub adjacency: Adjacency,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_regions: 6,
            adjacency: Adjacency::Eight,
        }
    }
}

/// Every tunable of the pipeline in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    pub binarize: BinarizeConfig,
    pub morphology: MorphologyConfig,
    pub selection: SelectionConfig,
}

impl PipelineConfig {
    /// Get the JSON schema of the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PipelineConfig)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        let m = &self.morphology;
        for (name, size) in [("kernel_width", m.kernel_width), ("kernel_height", m.kernel_height)] {
            if size == 0 || size % 2 == 0 {
                return Err(ShapeError::invalid(name, format!("must be odd and positive, got {size}")));
            }
        }
        for (name, count) in [("close_iterations", m.close_iterations), ("open_iterations", m.open_iterations)] {
            if count > u8::MAX as u32 {
                return Err(ShapeError::invalid(name, format!("at most 255, got {count}")));
            }
        }
        if self.selection.max_regions == 0 {
            return Err(ShapeError::invalid("max_regions", "must be at least 1"));
        }
        Ok(())
    }
}
