//! Bounding-box overlay for inspected images

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use sitesafe_core::Detection;

/// Ultralytics default palette, indexed by class id
const PALETTE: [[u8; 3]; 20] = [
    [0xFF, 0x38, 0x38], [0xFF, 0x9D, 0x97], [0xFF, 0x70, 0x1F], [0xFF, 0xB2, 0x1D],
    [0xCF, 0xD2, 0x31], [0x48, 0xF9, 0x0A], [0x92, 0xCC, 0x17], [0x3D, 0xDB, 0x86],
    [0x1A, 0x93, 0x34], [0x00, 0xD4, 0xBB], [0x2C, 0x99, 0xA8], [0x00, 0xC2, 0xFF],
    [0x34, 0x45, 0x93], [0x64, 0x73, 0xFF], [0x00, 0x18, 0xEC], [0x84, 0x38, 0xFF],
    [0x52, 0x00, 0x85], [0xCB, 0x38, 0xFF], [0xFF, 0x95, 0xC8], [0xFF, 0x37, 0xC7],
];

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Glyph width plus one column of spacing
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
/// Tag padding around the text, in glyph pixels
const TAG_PADDING: u32 = 2;

/// Stable color for a class id
pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

/// Hex form of [`class_color`], for legends rendered outside the image
pub fn class_color_hex(class_id: usize) -> String {
    let Rgb([r, g, b]) = class_color(class_id);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Black or white, whichever reads better on `background`
pub fn tag_text_color(background: Rgb<u8>) -> Rgb<u8> {
    let Rgb([r, g, b]) = background;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 150.0 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

/// Tag text for a detection, e.g. `no-helmet 0.87`
pub fn tag_text(detection: &Detection) -> String {
    format!("{} {:.2}", detection.class_label, detection.confidence)
}

/// 5x7 bitmap for `ch`, one byte per row, high bit on the left
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ' ' => [0x00; 7],
        // Hollow box for anything outside the font
        _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
    }
}

/// Glyph scale for an image; tags grow with the picture like box lines do
fn tag_scale(image: &RgbImage) -> u32 {
    (image.width().max(image.height()) / 640).max(1)
}

/// Tag size in pixels for `text` at `scale`
pub fn tag_size(text: &str, scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    let text_width = (chars * GLYPH_ADVANCE).saturating_sub(1);
    (
        (text_width + 2 * TAG_PADDING) * scale,
        (GLYPH_HEIGHT + 2 * TAG_PADDING) * scale,
    )
}

/// Filled tag with `text`, its top-left corner at (x, y); clipped to the image
fn draw_tag(image: &mut RgbImage, text: &str, x: i32, y: i32, background: Rgb<u8>, scale: u32) {
    let (width, height) = tag_size(text, scale);
    draw_filled_rect_mut(image, Rect::at(x, y).of_size(width, height), background);

    let ink = tag_text_color(background);
    let origin_x = x + (TAG_PADDING * scale) as i32;
    let origin_y = y + (TAG_PADDING * scale) as i32;
    for (i, ch) in text.chars().enumerate() {
        let glyph_x = origin_x + (i as u32 * GLYPH_ADVANCE * scale) as i32;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let px = glyph_x + (col * scale) as i32;
                let py = origin_y + (row as u32 * scale) as i32;
                draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), ink);
            }
        }
    }
}

/// Draw a box outline `thickness` pixels wide, growing outward
fn draw_thick_rect(image: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: u32) {
    for offset in 0..thickness as i32 {
        let expanded = Rect::at(rect.left() - offset, rect.top() - offset).of_size(
            rect.width() + (offset as u32) * 2,
            rect.height() + (offset as u32) * 2,
        );
        draw_hollow_rect_mut(image, expanded, color);
    }
}

/// Copy of `image` with one outline and one `label confidence` tag per
/// detection.
///
/// The tag sits on top of the box's outer edge, or just inside the box when
/// there is no room above it, and is shifted left to stay within the image.
pub fn draw_detections(image: &RgbImage, detections: &[Detection], thickness: u32) -> RgbImage {
    let mut canvas = image.clone();
    let thickness = thickness.max(1);
    let scale = tag_scale(image);

    for detection in detections {
        let bbox = &detection.bbox;
        let width = bbox.width.round();
        let height = bbox.height.round();
        if !(width >= 1.0 && height >= 1.0) {
            continue;
        }

        let color = class_color(detection.class_id);
        let rect = Rect::at(bbox.x.round() as i32, bbox.y.round() as i32)
            .of_size(width as u32, height as u32);
        draw_thick_rect(&mut canvas, rect, color, thickness);

        let text = tag_text(detection);
        let (tag_width, tag_height) = tag_size(&text, scale);
        let outer_left = rect.left() - (thickness as i32 - 1);
        let outer_top = rect.top() - (thickness as i32 - 1);
        let tag_y = if outer_top >= tag_height as i32 {
            outer_top - tag_height as i32
        } else {
            outer_top.max(0)
        };
        let tag_x = outer_left
            .min(canvas.width() as i32 - tag_width as i32)
            .max(0);
        draw_tag(&mut canvas, &text, tag_x, tag_y, color, scale);
    }

    canvas
}
