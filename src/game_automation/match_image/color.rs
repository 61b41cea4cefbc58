//! Color-based search for a target orbiting a fixed reference point

use super::config::{ColorSearchConfig, HsvRange};
use super::geometry::{BoundingBox, polygon_area};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours};

/// RGB to HSV on the OpenCV 8-bit scale: H in 0..=180, S and V in 0..=255.
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [(h / 2.0).round() as u8, s.round() as u8, max as u8]
}

/// Binary mask (255 = inside band) of the pixels whose HSV value lies in `range`.
pub fn hsv_mask(image: &RgbImage, range: &HsvRange) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if range.contains(rgb_to_hsv(*image.get_pixel(x, y))) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Find the colored blob that best sits on the ring of `orbit_radius` around `origin`.
///
/// The search window is the square of side `2 * orbit_radius` centered on `origin`,
/// clipped to the frame. Candidates outside the configured area band are dropped;
/// the rest are scored with `area / (1 + |distance - orbit_radius|)`. The winner's
/// center is returned in frame coordinates.
pub fn detect_by_color(
    frame: &RgbImage,
    origin: (u32, u32),
    orbit_radius: u32,
    config: &ColorSearchConfig,
) -> Option<(u32, u32)> {
    let left = origin.0.saturating_sub(orbit_radius);
    let top = origin.1.saturating_sub(orbit_radius);
    let right = origin.0.saturating_add(orbit_radius).min(frame.width());
    let bottom = origin.1.saturating_add(orbit_radius).min(frame.height());
    if right <= left || bottom <= top {
        return None;
    }

    let cropped = image::imageops::crop_imm(frame, left, top, right - left, bottom - top).to_image();
    let mask = hsv_mask(&cropped, &config.hsv);

    let local_origin = (
        f64::from(origin.0) - f64::from(left),
        f64::from(origin.1) - f64::from(top),
    );
    let radius = f64::from(orbit_radius);

    let mut best: Option<(f64, (u32, u32))> = None;
    for contour in find_contours::<i32>(&mask) {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        let area = polygon_area(&contour.points);
        if area < config.min_area || area > config.max_area {
            continue;
        }

        let Some(bounds) = BoundingBox::of(&contour.points) else {
            continue;
        };
        let (cx, cy) = bounds.center();
        let distance = (f64::from(cx) - local_origin.0).hypot(f64::from(cy) - local_origin.1);
        let score = area / (1.0 + (distance - radius).abs());

        log::trace!("gem candidate at ({cx},{cy}) area={area:.0} dist={distance:.1} score={score:.2}");
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, (left + cx, top + cy)));
        }
    }

    best.map(|(_, point)| point)
}
