//! Detection models

pub mod metadata;
pub mod yolo;

pub use yolo::YoloModel;
