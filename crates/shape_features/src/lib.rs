//! # Object Shape Descriptor Library
//!
//! Picks the single object of interest out of a color photo of an object on a
//! contrasting background and describes its silhouette with nine numbers that
//! do not change when the object is moved, rotated or scaled.
//!
//! ## Stages
//!
//! - **Binarize**: saturation or intensity threshold after 3x3 smoothing
//! - **Clean**: morphological closing, then opening, with an elliptical element
//! - **Label**: connected components with area, bounding box and centroid
//! - **Select**: largest regions first, then the one closest to the image center
//! - **Contour**: outer boundary of the selected region
//! - **Features**: seven log-scaled Hu moments, percent fill and aspect ratio of
//!   the minimum-area oriented rectangle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shape_features::{Detection, Pipeline};
//!
//! let pipeline = Pipeline::builder().build()?;
//!
//! let image = image::open("object.png")?.to_rgb8();
//! match pipeline.process(&image)? {
//!     Detection::Detected(shape) => println!("{:?}", shape.features.as_slice()),
//!     Detection::NotDetected(reason) => println!("nothing found: {reason}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use shape_features::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .with_saturation_threshold(35)
//!     .set_cleaner(MorphologicalCleaner {
//!         element: StructuringElement::ellipse(5, 5)?,
//!         close_iterations: 10,
//!         open_iterations: 3,
//!     })
//!     .with_max_regions(4)
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod config;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod visualize;
pub mod io;
pub mod manager;

// Re-exports for convenience
pub use error::{ShapeError, Result};
pub use config::PipelineConfig;
pub use types::{Detection, FeatureVector, NoDetection, ObjectShape, RegionOfInterest, RotatedRect};
pub use traits::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use visualize::{annotate, colorize_regions, isolate_region, RegionColorMap, RegionPalette};
pub use io::{append_csv, read_csv, FeatureRecord};
pub use manager::{AnalysisCommand, ShapeAnalyzer, StageOutput};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{ImageprocLabeler, RegionSelector};
    use crate::config::BinarizePolicy;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn create_test_image() -> RgbImage {
        let mut img = RgbImage::from_pixel(100, 100, WHITE);
        for y in 35..65 {
            for x in 35..65 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        img
    }

    fn create_rotated_bar(angle_deg: f64) -> RgbImage {
        let mut img = RgbImage::from_pixel(200, 200, WHITE);
        let (s, c) = angle_deg.to_radians().sin_cos();
        for y in 0..200u32 {
            for x in 0..200u32 {
                let (dx, dy) = (x as f64 - 100.0, y as f64 - 100.0);
                let u = c * dx + s * dy;
                let v = -s * dx + c * dy;
                if u.abs() <= 50.0 && v.abs() <= 12.5 {
                    img.put_pixel(x, y, Rgb([20, 20, 20]));
                }
            }
        }
        img
    }

    #[test]
    fn test_pipeline_basic() {
        let pipeline = Pipeline::builder().build().expect("build");
        let detection = pipeline.process(&create_test_image()).expect("process");

        // opening with the cross element trims a 21 pixel triangle off each corner,
        // the contour still spans 29x29 between pixel centers
        let shape = detection.shape().expect("square should be detected");
        assert_eq!(shape.region.area, 816);
        assert!((shape.rect.area() - 841.0).abs() < 1e-6);
        assert!((shape.features.percent_fill() - 81600.0 / 841.0).abs() < 1e-6);
        assert!((shape.features.aspect_ratio() - 1.0).abs() < 1e-6);
        assert_eq!(shape.features.as_slice().len(), FeatureVector::LEN);
    }

    #[test]
    fn test_square_nearly_fills_its_rectangle() {
        let pipeline = Pipeline::builder().with_max_regions(6).build().expect("build");
        let detection = pipeline.process(&create_test_image()).expect("process");
        let fill = detection.features().expect("detected").percent_fill();
        assert!(fill > 95.0 && fill <= 100.0, "fill {fill}");
    }

    #[test]
    fn test_square_keeps_one_region_besides_background() {
        let pipeline = Pipeline::builder().with_max_regions(6).build().expect("build");
        let selection = pipeline.segment(&create_test_image()).expect("segment");
        assert_eq!(selection.kept_ids().len(), 2);
        assert_eq!(selection.foreground_ids().count(), 1);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let pipeline = Pipeline::builder().build().expect("build");
        let image = create_rotated_bar(17.0);

        assert_eq!(pipeline.clean(&image).expect("clean"), pipeline.clean(&image).expect("clean"));

        let a = pipeline.segment(&image).expect("segment");
        let b = pipeline.segment(&image).expect("segment");
        assert_eq!(a.kept_ids(), b.kept_ids());
        assert_eq!(a.region_of_interest(), b.region_of_interest());

        let first = pipeline.process(&image).expect("process");
        let second = pipeline.process(&image).expect("process");
        let (f1, f2) = (first.features().expect("detected"), second.features().expect("detected"));
        assert_eq!(
            f1.as_slice().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            f2.as_slice().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_rotation_keeps_aspect_ratio() {
        let pipeline = Pipeline::builder().build().expect("build");
        let normalized = |r: f64| if r < 1.0 { 1.0 / r } else { r };

        let upright = pipeline.process(&create_rotated_bar(0.0)).expect("process");
        let rotated = pipeline.process(&create_rotated_bar(30.0)).expect("process");
        let up = normalized(upright.features().expect("detected").aspect_ratio());
        let rot = normalized(rotated.features().expect("detected").aspect_ratio());

        assert!((up - 4.0).abs() < 0.3, "upright ratio {up}");
        assert!((rot - up).abs() < 0.5, "rotated ratio {rot} vs {up}");
    }

    #[test]
    fn test_all_white_not_detected_for_both_policies() {
        let image = RgbImage::from_pixel(64, 64, WHITE);
        for policy in [BinarizePolicy::Saturation, BinarizePolicy::Intensity] {
            let mut config = PipelineConfig::default();
            config.binarize.policy = policy;
            let pipeline = Pipeline::from_config(&config).expect("valid config");

            let selection = pipeline.segment(&image).expect("segment");
            assert!(selection.foreground_ids().next().is_none());
            assert!(selection.region_of_interest().is_none());

            let detection = pipeline.process(&image).expect("process");
            assert_eq!(detection, Detection::NotDetected(NoDetection::NoForegroundRegion));
        }
    }

    #[test]
    fn test_saturation_policy_finds_colored_object() {
        let mut image = RgbImage::from_pixel(120, 90, Rgb([240, 240, 236]));
        for y in 30..60 {
            for x in 40..80 {
                image.put_pixel(x, y, Rgb([40, 160, 220]));
            }
        }
        let pipeline = Pipeline::builder().with_saturation_threshold(35).build().expect("build");
        let shape = pipeline.process(&image).expect("process");
        let shape = shape.shape().expect("detected");
        assert!((1150..=1350).contains(&shape.region.area), "area {}", shape.region.area);
        assert!(shape.features.percent_fill() > 85.0);
        let ratio = shape.features.aspect_ratio();
        assert!((ratio.max(ratio.recip()) - 42.0 / 32.0).abs() < 0.1, "ratio {ratio}");
    }

    #[test]
    fn test_region_of_interest_always_kept() {
        let mut mask = GrayImage::new(90, 90);
        let blocks = [(2, 2, 10), (60, 5, 20), (40, 40, 8), (5, 70, 15), (70, 70, 12)];
        for (x0, y0, size) in blocks {
            for y in y0..y0 + size {
                for x in x0..x0 + size {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        for k in 1..8 {
            let selection = RegionSelector::new(k)
                .expect("valid")
                .select(&mask, &ImageprocLabeler::default())
                .expect("select");
            assert!(selection.kept_ids().len() <= k);
            if let Some(roi) = selection.region_of_interest() {
                assert!(selection.kept_ids().contains(&roi.id));
                assert_ne!(roi.id, 0);
            }
        }
    }

    #[test]
    fn test_pipeline_shared_across_threads() {
        let pipeline = Pipeline::builder().build().expect("build");
        let images = [create_test_image(), create_rotated_bar(45.0)];
        let sequential: Vec<_> = images.iter().map(|i| pipeline.process(i).expect("process")).collect();

        let shared = &pipeline;
        let parallel: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = images
                .iter()
                .map(|image| scope.spawn(move || shared.process(image).expect("process")))
                .collect();
            handles.into_iter().map(|h| h.join().expect("thread")).collect()
        });
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_annotate_draws_on_copy() {
        let pipeline = Pipeline::builder().build().expect("build");
        let image = create_test_image();
        let detection = pipeline.process(&image).expect("process");
        let shape = detection.shape().expect("detected");

        let green = Rgb([0, 255, 0]);
        let annotated = annotate(&image, shape, green);
        assert_eq!(annotated.dimensions(), image.dimensions());
        assert!(annotated.pixels().any(|p| *p == green));
        assert!(image.pixels().all(|p| *p != green));
    }

    #[test]
    fn test_detection_serializes() {
        let pipeline = Pipeline::builder().build().expect("build");
        let detection = pipeline.process(&create_test_image()).expect("process");
        let json = serde_json::to_value(&detection).expect("serialize");
        assert_eq!(json["status"], "detected");
        assert_eq!(json["value"]["features"].as_array().map(|a| a.len()), Some(9));
    }
}
