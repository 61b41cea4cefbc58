//! Template assets and correlation-based template search

use super::error::{VisionError, VisionResult};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template_parallel};
use std::fmt;
use std::path::PathBuf;

/// Every on-screen element the automation knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    MainMenuClaimGems,
    BattleStart,
    BattleClaimGems,
    SuperOff,
    EcoOff,
    DefenseOff,
    AttackOn,
    AttackUpgrade,
    DefenseUpgrade,
    UtilityUpgrade,
    Tower,
    Retry,
}

impl Template {
    pub const ALL: [Template; 12] = [
        Template::MainMenuClaimGems,
        Template::BattleStart,
        Template::BattleClaimGems,
        Template::SuperOff,
        Template::EcoOff,
        Template::DefenseOff,
        Template::AttackOn,
        Template::AttackUpgrade,
        Template::DefenseUpgrade,
        Template::UtilityUpgrade,
        Template::Tower,
        Template::Retry,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            Template::MainMenuClaimGems => "claim_gems_main.png",
            Template::BattleStart => "battle_start.png",
            Template::BattleClaimGems => "claim_gems_battle.png",
            Template::SuperOff => "battle_super_off.png",
            Template::EcoOff => "battle_eco_off.png",
            Template::DefenseOff => "battle_defense_off.png",
            Template::AttackOn => "battle_attack_on.png",
            Template::AttackUpgrade => "attack_upgrade.png",
            Template::DefenseUpgrade => "defense_upgrade.png",
            Template::UtilityUpgrade => "utility_upgrade.png",
            Template::Tower => "tower.png",
            Template::Retry => "defeat_retry.png",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Resolves templates against the asset directory. Images are read from disk on
/// every query so assets can be swapped while the bot runs.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    root: PathBuf,
}

impl TemplateLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, template: Template) -> PathBuf {
        self.root.join(template.file_name())
    }

    /// Paths of all templates that are not present on disk.
    pub fn missing(&self) -> Vec<PathBuf> {
        Template::ALL
            .iter()
            .map(|t| self.path(*t))
            .filter(|p| !p.is_file())
            .collect()
    }

    pub fn load(&self, template: Template) -> VisionResult<GrayImage> {
        let path = self.path(template);
        let image = image::open(&path).map_err(|source| VisionError::TemplateLoad { path, source })?;
        Ok(image.to_luma8())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    pub x: u32,
    pub y: u32,
    pub confidence: f32,
}

/// Correlation work (placements times template pixels) a single pass may cost;
/// larger searches start on a downscaled copy.
const SEARCH_BUDGET: u64 = 1 << 27;
/// Shortest template side allowed on the coarse level.
const MIN_COARSE_SIDE: u32 = 8;
/// Coarse peaks re-scored at full resolution.
const COARSE_CANDIDATES: usize = 16;

fn fits(image: &GrayImage, template: &GrayImage) -> bool {
    let (tw, th) = template.dimensions();
    tw > 0 && th > 0 && tw <= image.width() && th <= image.height()
}

/// Zero-mean normalized cross-correlation of `template` over every placement in `image`.
///
/// Scores lie in [-1, 1]; placements where either window has no variance score 0.
/// Returns `None` when the template does not fit inside the image.
pub fn correlation_map(image: &GrayImage, template: &GrayImage) -> Option<Image<Luma<f32>>> {
    if !fits(image, template) {
        return None;
    }
    let (tw, th) = template.dimensions();

    let n = f64::from(tw) * f64::from(th);
    let t_sum: f64 = template.pixels().map(|p| f64::from(p[0])).sum();
    let t_sq: f64 = template.pixels().map(|p| f64::from(p[0]).powi(2)).sum();
    let t_var = t_sq - t_sum * t_sum / n;

    let cross = match_template_parallel(image, template, MatchTemplateMethod::CrossCorrelation);
    let sums: Image<Luma<u64>> = integral_image(image);
    let squares: Image<Luma<u64>> = integral_squared_image(image);

    Some(ImageBuffer::from_fn(cross.width(), cross.height(), |x, y| {
        if t_var <= f64::EPSILON {
            return Luma([0.0]);
        }
        let i_sum = window_sum(&sums, x, y, tw, th) as f64;
        let i_var = window_sum(&squares, x, y, tw, th) as f64 - i_sum * i_sum / n;
        if i_var <= f64::EPSILON {
            return Luma([0.0]);
        }
        let numerator = f64::from(cross.get_pixel(x, y)[0]) - i_sum * t_sum / n;
        let score = numerator / (i_var * t_var).sqrt();
        Luma([score.clamp(-1.0, 1.0) as f32])
    }))
}

// Integral images carry a zero row and column, so a w x h window at (x, y)
// spans corners (x, y) to (x + w, y + h).
fn window_sum(integral: &Image<Luma<u64>>, x: u32, y: u32, w: u32, h: u32) -> u64 {
    let a = integral.get_pixel(x, y)[0];
    let b = integral.get_pixel(x + w, y)[0];
    let c = integral.get_pixel(x, y + h)[0];
    let d = integral.get_pixel(x + w, y + h)[0];
    (a + d) - (b + c)
}

fn search_work(image: (u32, u32), template: (u32, u32)) -> u64 {
    let placements = u64::from(image.0 - template.0 + 1) * u64::from(image.1 - template.1 + 1);
    placements * u64::from(template.0) * u64::from(template.1)
}

/// Downscale factor for the first search pass; 1 means a single full-resolution pass.
/// Picks the smallest factor that fits the budget, or the largest one the template allows.
/// Caller guarantees the template fits.
pub(crate) fn pyramid_factor(image: &GrayImage, template: &GrayImage) -> u32 {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    if search_work((iw, ih), (tw, th)) <= SEARCH_BUDGET {
        return 1;
    }
    let mut chosen = 1;
    for factor in [2, 4, 8] {
        if tw.min(th) / factor < MIN_COARSE_SIDE {
            break;
        }
        chosen = factor;
        let coarse = ((iw / factor).max(1), (ih / factor).max(1));
        if search_work(coarse, (tw / factor, th / factor)) <= SEARCH_BUDGET {
            break;
        }
    }
    chosen
}

fn downscale(image: &GrayImage, factor: u32) -> GrayImage {
    imageops::resize(
        image,
        (image.width() / factor).max(1),
        (image.height() / factor).max(1),
        FilterType::Triangle,
    )
}

/// Highest-scoring placement as `(x, y, score)`.
fn peak(image: &GrayImage, template: &GrayImage) -> Option<(u32, u32, f32)> {
    let scores = correlation_map(image, template)?;
    let extremes = find_extremes(&scores);
    let (x, y) = extremes.max_value_location;
    Some((x, y, extremes.max_value))
}

/// Search a downscaled copy first, then re-score the strongest coarse peaks on
/// small full-resolution windows around them.
fn coarse_to_fine(image: &GrayImage, template: &GrayImage, factor: u32) -> Option<(u32, u32, f32)> {
    let coarse_template = downscale(template, factor);
    let mut scores = correlation_map(&downscale(image, factor), &coarse_template)?;
    let (radius_x, radius_y) = (coarse_template.width() / 2, coarse_template.height() / 2);
    let (tw, th) = template.dimensions();
    let margin = 2 * factor;

    let mut best: Option<(u32, u32, f32)> = None;
    for _ in 0..COARSE_CANDIDATES {
        let extremes = find_extremes(&scores);
        if extremes.max_value <= 0.0 {
            break;
        }
        let (cx, cy) = extremes.max_value_location;

        // Suppress the neighbourhood so the next pass finds a different peak
        for y in cy.saturating_sub(radius_y)..=(cy + radius_y).min(scores.height() - 1) {
            for x in cx.saturating_sub(radius_x)..=(cx + radius_x).min(scores.width() - 1) {
                scores.put_pixel(x, y, Luma([-2.0]));
            }
        }

        let x0 = (cx * factor).saturating_sub(margin);
        let y0 = (cy * factor).saturating_sub(margin);
        let x1 = (cx * factor + tw + margin).min(image.width());
        let y1 = (cy * factor + th + margin).min(image.height());
        let window = imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image();
        if let Some((x, y, score)) = peak(&window, template)
            && best.is_none_or(|(_, _, top)| score > top)
        {
            best = Some((x0 + x, y0 + y, score));
        }
    }
    best
}

/// Global best placement of `template` in `image`, if it clears `threshold`.
///
/// Large searches run coarse-to-fine; the reported score is always the
/// full-resolution one.
pub fn best_match(
    image: &GrayImage,
    template: &GrayImage,
    threshold: f32,
    center: bool,
) -> Option<TemplateMatch> {
    if !fits(image, template) {
        return None;
    }
    let (mut x, mut y, confidence) = match pyramid_factor(image, template) {
        1 => peak(image, template)?,
        factor => coarse_to_fine(image, template, factor)?,
    };
    if confidence < threshold {
        return None;
    }

    if center {
        x += template.width() / 2;
        y += template.height() / 2;
    }
    Some(TemplateMatch { x, y, confidence })
}
