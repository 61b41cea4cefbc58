//! Tunables for the vision engine

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Confidence threshold for template matching (-1.0 to 1.0, zero-mean NCC)
    pub confidence_threshold: f32,
    /// Return the template center instead of its top-left corner
    pub center: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            center: true,
        }
    }
}

/// Hue/saturation/value band on the OpenCV 8-bit scale (H in 0..=180).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// Radial color search around a fixed reference object.
#[derive(Debug, Clone)]
pub struct ColorSearchConfig {
    pub hsv: HsvRange,
    /// Accepted contour area band, tuned to the target's on-screen size
    pub min_area: f64,
    pub max_area: f64,
}

impl Default for ColorSearchConfig {
    fn default() -> Self {
        create_gem_config()
    }
}

/// Purple gem orbiting the tower
pub fn create_gem_config() -> ColorSearchConfig {
    ColorSearchConfig {
        hsv: HsvRange {
            lower: [120, 60, 100],
            upper: [160, 255, 255],
        },
        min_area: 2000.0,
        max_area: 3000.0,
    }
}

/// Upgrade panel segmentation and OCR preparation
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Gaussian sigma equivalent to a 3x3 kernel
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub min_area: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Douglas-Peucker epsilon as a fraction of the contour perimeter
    pub approx_epsilon: f64,
    pub upscale: u32,
    pub border_thickness: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 0.8,
            canny_low: 60.0,
            canny_high: 150.0,
            min_area: 60_000.0,
            min_aspect: 1.5,
            max_aspect: 3.5,
            approx_epsilon: 0.02,
            upscale: 2,
            border_thickness: 16,
        }
    }
}
