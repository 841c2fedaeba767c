use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{self, Mask};
use tracing::debug;

use crate::{
    algorithms::preprocessing::{BACKGROUND, FOREGROUND},
    config::MorphologyConfig,
    error::{Result, ShapeError},
    traits::MaskCleaner,
};

/// Largest element side whose anchor still fits the `u8` mask offsets.
pub const MAX_ELEMENT_SIZE: u32 = 511;

/// Binary structuring element, stored as offsets from its anchor (the center).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    /// Raster ellipse inscribed in a `width` x `height` box.
    ///
    /// Each row spans `round(c * sqrt(1 - dy^2 / r^2))` columns either side of
    /// the center, which turns a 3x3 box into a cross.
    pub fn ellipse(width: u32, height: u32) -> Result<Self> {
        check_size("kernel_width", width)?;
        check_size("kernel_height", height)?;

        let r = (height / 2) as i32;
        let c = (width / 2) as i32;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut offsets = Vec::new();
        for dy in -r..=r {
            let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
            for x in -dx..=dx {
                offsets.push((x, dy));
            }
        }

        Ok(Self { width, height, offsets })
    }

    /// Full rectangle.
    pub fn rect(width: u32, height: u32) -> Result<Self> {
        check_size("kernel_width", width)?;
        check_size("kernel_height", height)?;
        let (c, r) = ((width / 2) as i32, (height / 2) as i32);
        let offsets = (-r..=r).flat_map(|y| (-c..=c).map(move |x| (x, y))).collect();
        Ok(Self { width, height, offsets })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        self.offsets.contains(&(dx, dy))
    }

    /// Norm whose unit ball is exactly this element.
    ///
    /// A 3x3 cross repeated `k` times is the L1 ball of radius `k`, a full 3x3
    /// box the LInf ball, so those run on the distance-transform operators.
    pub fn norm(&self) -> Option<Norm> {
        if (self.width, self.height) != (3, 3) {
            return None;
        }
        match self.offsets.len() {
            5 => Some(Norm::L1),
            9 => Some(Norm::LInf),
            _ => None,
        }
    }

    /// Arbitrary-shape mask for the grayscale operators, anchored at the center.
    pub fn to_mask(&self) -> Mask {
        let (cx, cy) = ((self.width / 2) as i32, (self.height / 2) as i32);
        let mut image = GrayImage::new(self.width, self.height);
        for &(dx, dy) in &self.offsets {
            image.put_pixel((cx + dx) as u32, (cy + dy) as u32, Luma([FOREGROUND]));
        }
        Mask::from_image(&image, cx as u8, cy as u8)
    }
}

fn check_size(name: &'static str, size: u32) -> Result<()> {
    if size == 0 || size % 2 == 0 || size > MAX_ELEMENT_SIZE {
        return Err(ShapeError::invalid(
            name,
            format!("must be odd and in 1..={MAX_ELEMENT_SIZE}, got {size}"),
        ));
    }
    Ok(())
}

fn steps(iterations: u32) -> Result<u8> {
    u8::try_from(iterations)
        .map_err(|_| ShapeError::invalid("iterations", format!("at most 255, got {iterations}")))
}

fn repeat(mask: &GrayImage, iterations: u32, op: impl Fn(&GrayImage) -> GrayImage) -> GrayImage {
    (0..iterations).fold(mask.clone(), |acc, _| op(&acc))
}

/// Dilate `iterations` times, then erode as many times.
pub fn close(mask: &GrayImage, element: &StructuringElement, iterations: u32) -> Result<GrayImage> {
    match element.norm() {
        Some(norm) => Ok(morphology::close(mask, norm, steps(iterations)?)),
        None => {
            let m = element.to_mask();
            let dilated = repeat(mask, iterations, |img| morphology::grayscale_dilate(img, &m));
            Ok(repeat(&dilated, iterations, |img| morphology::grayscale_erode(img, &m)))
        }
    }
}

/// Erode `iterations` times, then dilate as many times.
pub fn open(mask: &GrayImage, element: &StructuringElement, iterations: u32) -> Result<GrayImage> {
    match element.norm() {
        Some(norm) => Ok(morphology::open(mask, norm, steps(iterations)?)),
        None => {
            let m = element.to_mask();
            let eroded = repeat(mask, iterations, |img| morphology::grayscale_erode(img, &m));
            Ok(repeat(&eroded, iterations, |img| morphology::grayscale_dilate(img, &m)))
        }
    }
}

/// Closing followed by opening.
///
/// Closing runs many more iterations than opening so a fragmented object is
/// reconnected before residue is trimmed.
#[derive(Debug, Clone)]
pub struct MorphologicalCleaner {
    pub element: StructuringElement,
    pub close_iterations: u32,
    pub open_iterations: u32,
}

impl MorphologicalCleaner {
    pub fn from_config(config: &MorphologyConfig) -> Result<Self> {
        Ok(Self {
            element: StructuringElement::ellipse(config.kernel_width, config.kernel_height)?,
            close_iterations: config.close_iterations,
            open_iterations: config.open_iterations,
        })
    }
}

impl Default for MorphologicalCleaner {
    fn default() -> Self {
        Self {
            element: StructuringElement {
                width: 3,
                height: 3,
                offsets: vec![(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1)],
            },
            close_iterations: 20,
            open_iterations: 6,
        }
    }
}

impl MaskCleaner for MorphologicalCleaner {
    fn clean(&self, mask: &GrayImage) -> Result<GrayImage> {
        let closed = close(mask, &self.element, self.close_iterations)?;
        let cleaned = open(&closed, &self.element, self.open_iterations)?;
        debug!(
            close = self.close_iterations,
            open = self.open_iterations,
            foreground = cleaned.pixels().filter(|p| p[0] != BACKGROUND).count(),
            "mask cleaned"
        );
        Ok(cleaned)
    }
}
