//! Model loading failures that don't need a real export

use sitesafe_eye::{VisionConfig, VisionError, YoloModel};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_missing_model_file() {
    let dir = TempDir::new().unwrap();
    let mut config = VisionConfig::default();
    config.model_path = dir.path().join("best.onnx");

    match YoloModel::load(&config) {
        Err(VisionError::Model(msg)) => assert!(msg.contains("best.onnx")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("loading a missing file succeeded"),
    }
}

#[test]
fn test_corrupt_model_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"definitely not protobuf").unwrap();

    let mut config = VisionConfig::default();
    config.model_path = file.path().to_path_buf();

    assert!(matches!(YoloModel::load(&config), Err(VisionError::Ort(_))));
}

#[test]
fn test_invalid_fallback_names_rejected_before_loading() {
    let dir = TempDir::new().unwrap();
    let mut config = VisionConfig::default();
    config.model_path = dir.path().join("best.onnx");
    config.class_names = Some(vec!["person".to_string(), "person".to_string()]);

    assert!(matches!(
        YoloModel::load(&config),
        Err(VisionError::Core(sitesafe_core::Error::InvalidCatalog(_)))
    ));
}
