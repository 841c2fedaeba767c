use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed boundary polyline, one `[x, y]` pixel coordinate per vertex.
pub type Contour = Vec<[i32; 2]>;

/// Label reserved for pixels that belong to no region.
pub const BACKGROUND_LABEL: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Per-label statistics produced by a labeling pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub label: u32,
    /// Number of pixels carrying this label
    pub area: u32,
    pub bbox: BoundingBox,
    /// Mean pixel position `[x, y]`
    pub centroid: [f64; 2],
}

impl RegionStats {
    pub fn is_background(&self) -> bool {
        self.label == BACKGROUND_LABEL
    }
}

/// The single region picked as the object of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub id: u32,
    pub area: u32,
    pub centroid: [f64; 2],
    pub bbox: BoundingBox,
}

impl From<&RegionStats> for RegionOfInterest {
    fn from(stats: &RegionStats) -> Self {
        Self {
            id: stats.label,
            area: stats.area,
            centroid: stats.centroid,
            bbox: stats.bbox,
        }
    }
}

/// Minimum-area rectangle at an arbitrary orientation.
///
/// `width` is measured along the direction given by `angle` (radians, image
/// coordinates), `height` perpendicular to it. The two are not reordered, so a
/// shape and its quarter-turned twin may report reciprocal ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl RotatedRect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Corner points in drawing order.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let (sin, cos) = self.angle.sin_cos();
        let u = [cos * self.width / 2.0, sin * self.width / 2.0];
        let v = [-sin * self.height / 2.0, cos * self.height / 2.0];
        let [cx, cy] = self.center;
        [
            [cx - u[0] - v[0], cy - u[1] - v[1]],
            [cx + u[0] - v[0], cy + u[1] - v[1]],
            [cx + u[0] + v[0], cy + u[1] + v[1]],
            [cx - u[0] + v[0], cy - u[1] + v[1]],
        ]
    }
}

/// Nine-element shape descriptor.
///
/// Indices 0..7 hold the signed log10 Hu moments, index 7 the percent fill of
/// the oriented bounding rectangle and index 8 its width/height ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FeatureVector::LEN]);

impl FeatureVector {
    pub const LEN: usize = 9;
    pub const HU_COUNT: usize = 7;

    pub fn new(hu: [f64; 7], percent_fill: f64, aspect_ratio: f64) -> Self {
        let mut values = [0.0; Self::LEN];
        values[..Self::HU_COUNT].copy_from_slice(&hu);
        values[7] = percent_fill;
        values[8] = aspect_ratio;
        Self(values)
    }

    pub fn from_array(values: [f64; Self::LEN]) -> Self {
        Self(values)
    }

    pub fn hu_moments(&self) -> &[f64] {
        &self.0[..Self::HU_COUNT]
    }

    pub fn percent_fill(&self) -> f64 {
        self.0[7]
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.0[8]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> [f64; Self::LEN] {
        self.0
    }
}

/// Everything measured about the detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectShape {
    pub region: RegionOfInterest,
    pub contour: Contour,
    pub rect: RotatedRect,
    pub features: FeatureVector,
}

/// Why no object could be measured.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoDetection {
    #[error("mask contains no foreground region")]
    NoForegroundRegion,

    #[error("region of interest has an empty contour")]
    EmptyContour,

    #[error("region of interest has zero area")]
    ZeroArea,
}

/// Outcome of running the full pipeline over one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Detection {
    Detected(ObjectShape),
    NotDetected(NoDetection),
}

impl Detection {
    pub fn features(&self) -> Option<&FeatureVector> {
        match self {
            Self::Detected(shape) => Some(&shape.features),
            Self::NotDetected(_) => None,
        }
    }

    pub fn shape(&self) -> Option<&ObjectShape> {
        match self {
            Self::Detected(shape) => Some(shape),
            Self::NotDetected(_) => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }
}
