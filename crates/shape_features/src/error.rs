use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Dimension mismatch in {stage}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        stage: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Palette has {provided} colors but {needed} kept regions need one")]
    PaletteTooShort { needed: usize, provided: usize },

    #[error("Malformed feature record: {0}")]
    MalformedRecord(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShapeError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Fails with [`ShapeError::DimensionMismatch`] unless both sizes agree.
pub fn ensure_same_dimensions(
    stage: &'static str,
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<()> {
    if expected != actual {
        return Err(ShapeError::DimensionMismatch {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

pub type Result<T> = std::result::Result<T, ShapeError>;
