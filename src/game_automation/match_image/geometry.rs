//! Small helpers over contour point lists

use imageproc::point::Point;

/// Area enclosed by a closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    twice.unsigned_abs() as f64 / 2.0
}

/// Drop trailing vertices that duplicate the start of a closed approximation.
pub fn close_polygon(mut points: Vec<Point<i32>>, epsilon: f64) -> Vec<Point<i32>> {
    while points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        let gap = f64::from(first.x - last.x).hypot(f64::from(first.y - last.y));
        if gap > epsilon {
            break;
        }
        points.pop();
    }
    points
}

/// Axis-aligned bounds with inclusive pixel extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn of(points: &[Point<i32>]) -> Option<Self> {
        let min_x = points.iter().map(|p| p.x).min()?;
        let max_x = points.iter().map(|p| p.x).max()?;
        let min_y = points.iter().map(|p| p.y).min()?;
        let max_y = points.iter().map(|p| p.y).max()?;
        Some(Self {
            x: u32::try_from(min_x).ok()?,
            y: u32::try_from(min_y).ok()?,
            width: u32::try_from(max_x - min_x + 1).ok()?,
            height: u32::try_from(max_y - min_y + 1).ok()?,
        })
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}
