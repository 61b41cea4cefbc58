//! Upgrade panel segmentation and text extraction

use super::config::PanelConfig;
use super::error::VisionResult;
use super::geometry::{BoundingBox, close_polygon, polygon_area};
use super::ocr::{PageLayout, TextRecognizer};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::dilate;
use imageproc::rect::Rect;

/// Raw text read from one upgrade box: the name column and the value column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelText {
    pub name: String,
    pub value: String,
}

/// Locate upgrade boxes: large quadrilaterals with a landscape aspect ratio.
///
/// Order follows contour discovery, not the on-screen layout.
pub fn find_panel_boxes(frame: &RgbImage, config: &PanelConfig) -> Vec<BoundingBox> {
    let gray = imageops::grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let closed = dilate(&edges, Norm::LInf, 1);

    let mut boxes = Vec::new();
    for contour in find_contours::<i32>(&closed) {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        if contour.points.len() < 4 {
            continue;
        }
        let perimeter = arc_length(&contour.points, true);
        let epsilon = config.approx_epsilon * perimeter;
        if epsilon <= 0.0 {
            continue;
        }
        let approx = close_polygon(approximate_polygon_dp(&contour.points, epsilon, true), epsilon);
        if approx.len() != 4 || polygon_area(&approx) <= config.min_area {
            continue;
        }
        let Some(bounds) = BoundingBox::of(&approx) else {
            continue;
        };
        let aspect = bounds.aspect();
        if aspect > config.min_aspect && aspect < config.max_aspect {
            boxes.push(bounds);
        }
    }
    boxes
}

/// Binarize a box for OCR: grayscale, upscale, Otsu threshold with dark text on a
/// white background, and a white border to hide the box outline.
pub fn prepare_panel_region(region: &RgbImage, config: &PanelConfig) -> GrayImage {
    let gray = imageops::grayscale(region);
    let scaled = imageops::resize(
        &gray,
        gray.width() * config.upscale,
        gray.height() * config.upscale,
        FilterType::CatmullRom,
    );

    let level = otsu_level(&scaled);
    let mut binary = GrayImage::from_fn(scaled.width(), scaled.height(), |x, y| {
        if scaled.get_pixel(x, y)[0] > level {
            Luma([0])
        } else {
            Luma([255])
        }
    });

    let (w, h) = binary.dimensions();
    let t = config.border_thickness.min(w).min(h);
    if t > 0 {
        let white = Luma([255u8]);
        let edges = [
            Rect::at(0, 0).of_size(w, t),
            Rect::at(0, (h - t) as i32).of_size(w, t),
            Rect::at(0, 0).of_size(t, h),
            Rect::at((w - t) as i32, 0).of_size(t, h),
        ];
        for edge in edges {
            draw_filled_rect_mut(&mut binary, edge, white);
        }
    }
    binary
}

/// Split a prepared box into its left (name) and right (values) halves.
pub fn split_columns(region: &GrayImage) -> (GrayImage, GrayImage) {
    let (w, h) = region.dimensions();
    let mid = w / 2;
    let left = imageops::crop_imm(region, 0, 0, mid, h).to_image();
    let right = imageops::crop_imm(region, mid, 0, w - mid, h).to_image();
    (left, right)
}

/// Segment upgrade boxes and read the name and value columns of each one.
pub fn detect_upgrades(
    frame: &RgbImage,
    recognizer: &dyn TextRecognizer,
    config: &PanelConfig,
) -> VisionResult<Vec<PanelText>> {
    let boxes = find_panel_boxes(frame, config);
    log::debug!("Found {} upgrade boxes", boxes.len());

    let mut output = Vec::with_capacity(boxes.len());
    for bounds in boxes {
        let region = imageops::crop_imm(frame, bounds.x, bounds.y, bounds.width, bounds.height).to_image();
        let prepared = prepare_panel_region(&region, config);
        if prepared.width() < 2 {
            continue;
        }
        let (left, right) = split_columns(&prepared);

        let name = recognizer.recognize(&left, PageLayout::SingleColumn)?;
        let value = recognizer.recognize(&right, PageLayout::SingleBlock)?;
        output.push(PanelText { name, value });
    }
    Ok(output)
}
