//! Image processing around the model: letterboxing, head decoding, overlays

pub mod annotate;
pub mod postprocess;
pub mod preprocess;

pub use annotate::{class_color, class_color_hex, draw_detections, tag_text_color};
pub use postprocess::{decode_yolo, non_max_suppression, DecodeParams};
pub use preprocess::{letterbox, Letterbox};
