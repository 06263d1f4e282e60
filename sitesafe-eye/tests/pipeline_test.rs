//! End-to-end inspection tests with a scripted detector

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sitesafe_core::{BoundingBox, ClassCatalog, Detection, SafetyVerdict, Severity};
use sitesafe_eye::processing::{class_color, tag_text_color};
use sitesafe_eye::{Detector, InspectionPipeline, VisionError};
use std::io::Cursor;

/// Detector that reports whatever it was scripted with, and records the
/// size of every image it is shown
struct ScriptedDetector {
    catalog: ClassCatalog,
    script: Vec<Detection>,
    seen: Vec<(u32, u32)>,
}

impl ScriptedDetector {
    fn ppe(labels: &[&str]) -> Self {
        let catalog =
            ClassCatalog::new(["helmet", "no-helmet", "no-vest", "person", "vest"]).unwrap();
        let script = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let id = catalog.index_of(label).expect("label in catalog");
                let x = 4.0 + (i as f32) * 10.0;
                Detection::new(id, *label, 0.9, BoundingBox::new(x, 16.0, 8.0, 20.0))
            })
            .collect();
        Self {
            catalog,
            script,
            seen: Vec::new(),
        }
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>, VisionError> {
        self.seen.push(image.dimensions());
        Ok(self.script.clone())
    }

    fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn encoded(format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_pixel(64, 48, Rgb([200, 200, 200]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

#[test]
fn test_scene_with_violations() {
    let detector = ScriptedDetector::ppe(&["person", "person", "no-helmet", "vest"]);
    let mut pipeline = InspectionPipeline::new(Box::new(detector));

    let report = pipeline.inspect_bytes(&encoded(ImageFormat::Png)).unwrap();

    assert_eq!((report.width, report.height), (64, 48));
    assert_eq!(report.detections.len(), 4);
    let rows: Vec<(&str, usize)> = report.counts.iter().collect();
    assert_eq!(
        rows,
        vec![
            ("helmet", 0),
            ("no-helmet", 1),
            ("no-vest", 0),
            ("person", 2),
            ("vest", 1)
        ]
    );
    assert!(report.verdict.is_violation());
    assert_eq!(report.verdict.severity(), Severity::Error);
}

#[test]
fn test_scene_all_safe() {
    let detector = ScriptedDetector::ppe(&["person", "helmet", "vest"]);
    let mut pipeline = InspectionPipeline::new(Box::new(detector));

    let report = pipeline.inspect_bytes(&encoded(ImageFormat::Jpeg)).unwrap();

    match report.verdict {
        SafetyVerdict::AllSafe(counts) => {
            assert_eq!(counts.person, 1);
            assert_eq!(counts.no_helmet, 0);
            assert_eq!(counts.no_vest, 0);
        }
        other => panic!("expected all safe, got {:?}", other),
    }
}

#[test]
fn test_empty_scene() {
    let mut pipeline = InspectionPipeline::new(Box::new(ScriptedDetector::ppe(&[])));
    let report = pipeline.inspect_bytes(&encoded(ImageFormat::Png)).unwrap();

    assert_eq!(report.counts.total(), 0);
    assert_eq!(report.counts.len(), 5);
    assert_eq!(report.verdict, SafetyVerdict::NoWorkersDetected);
    assert_eq!(report.verdict.severity(), Severity::Warning);
}

#[test]
fn test_annotation_draws_class_colors() {
    let detector = ScriptedDetector::ppe(&["no-vest"]);
    let no_vest_id = detector.catalog.index_of("no-vest").unwrap();
    let mut pipeline = InspectionPipeline::new(Box::new(detector)).with_annotation(true, 1);

    let report = pipeline.inspect_bytes(&encoded(ImageFormat::Png)).unwrap();
    let annotated = report.annotated.as_ref().unwrap();

    assert_eq!(annotated.dimensions(), (64, 48));
    assert_eq!(*annotated.get_pixel(4, 16), class_color(no_vest_id));
    assert_eq!(*annotated.get_pixel(8, 26), Rgb([200, 200, 200]));

    // "no-vest 0.90" tag fills rows 5..16, shifted to the left edge
    assert_eq!(*annotated.get_pixel(0, 5), class_color(no_vest_id));
    let ink = tag_text_color(class_color(no_vest_id));
    assert!((7..14).any(|y| (2..60).any(|x| *annotated.get_pixel(x, y) == ink)));

    let png = report.annotated_png().unwrap().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(&decoded, annotated);
}

#[test]
fn test_corrupt_upload_is_bad_input() {
    let mut pipeline = InspectionPipeline::new(Box::new(ScriptedDetector::ppe(&["person"])));
    let mut bytes = encoded(ImageFormat::Png);
    bytes.truncate(20);

    let err = pipeline.inspect_bytes(&bytes).unwrap_err();
    assert!(err.is_bad_input());
}

#[test]
fn test_pipeline_exposes_detector_catalog() {
    let pipeline = InspectionPipeline::new(Box::new(ScriptedDetector::ppe(&[])));
    assert_eq!(pipeline.detector_name(), "scripted");
    assert_eq!(pipeline.catalog().len(), 5);
    assert!(pipeline.catalog().contains("no-helmet"));
}
