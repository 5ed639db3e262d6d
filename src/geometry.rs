//! Rectangles in percent and pixel space.
//!
//! Layouts are described with [`RectPercent`]s relative to a monitor's work
//! area.  At dispatch time they are turned into pixel [`Rect`]s and compared
//! against the active window's frame with [`Rect::distance`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangle whose fields are percentages (`0.0..=100.0`) of a work area.
///
/// No clamping is applied: `x + width` may exceed 100 and the resulting
/// pixel rectangle then extends past the work area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct RectPercent {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectPercent {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Convert to pixels inside `work_area`.
    ///
    /// Each field is scaled by the matching work-area dimension and
    /// truncated towards zero; offsets are then shifted by the work-area
    /// origin.
    pub fn to_absolute(&self, work_area: &Rect) -> Rect {
        let scale = |pct: f64, extent: i32| (pct * extent as f64 / 100.0) as i32;
        Rect {
            x: work_area.x + scale(self.x, work_area.width),
            y: work_area.y + scale(self.y, work_area.height),
            width: scale(self.width, work_area.width),
            height: scale(self.height, work_area.height),
        }
    }
}

impl From<[f64; 4]> for RectPercent {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<RectPercent> for [f64; 4] {
    fn from(r: RectPercent) -> Self {
        [r.x, r.y, r.width, r.height]
    }
}

/// A rectangle in pixels, in root-window coordinates.
///
/// Used both for target placements and for a window's current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Manhattan distance over `(x, y, width, height)`.
    ///
    /// Zero iff all four fields are equal.
    pub fn distance(&self, other: &Rect) -> u32 {
        self.x.abs_diff(other.x)
            + self.y.abs_diff(other.y)
            + self.width.abs_diff(other.width)
            + self.height.abs_diff(other.height)
    }

    /// Intersection of two rectangles, or `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Area of the overlap with `other`, `0` when disjoint.
    pub fn overlap_area(&self, other: &Rect) -> i64 {
        self.intersect(other)
            .map(|r| r.width as i64 * r.height as i64)
            .unwrap_or(0)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: Rect = Rect::new(0, 0, 1920, 1080);

    /// `inner` lies entirely within `outer`, edges may touch.
    fn contains(outer: &Rect, inner: &Rect) -> bool {
        inner.x >= outer.x
            && inner.y >= outer.y
            && inner.x + inner.width <= outer.x + outer.width
            && inner.y + inner.height <= outer.y + outer.height
    }

    #[test]
    fn third_of_full_hd_truncates() {
        let r = RectPercent::new(0.0, 0.0, 33.33, 50.0).to_absolute(&FULL_HD);
        assert_eq!(r, Rect::new(0, 0, 639, 540));
    }

    #[test]
    fn work_area_origin_is_added_to_offsets_only() {
        let wa = Rect::new(100, 30, 1000, 500);
        let r = RectPercent::new(50.0, 50.0, 50.0, 50.0).to_absolute(&wa);
        assert_eq!(r, Rect::new(600, 280, 500, 250));
    }

    #[test]
    fn in_range_percentages_stay_inside_work_area() {
        let areas = [
            FULL_HD,
            Rect::new(0, 27, 2560, 1413),
            Rect::new(1920, 0, 1366, 768),
            Rect::new(-1280, 100, 1279, 1023),
        ];
        let steps = [0.0, 12.5, 25.0, 33.33, 50.0, 66.66, 99.9, 100.0];
        for wa in &areas {
            for &x in &steps {
                for &w in &steps {
                    if x + w > 100.0 {
                        continue;
                    }
                    let r = RectPercent::new(x, x, w, w).to_absolute(wa);
                    assert!(contains(wa, &r), "{} not inside {}", r, wa);
                }
            }
        }
    }

    #[test]
    fn overflowing_percentages_are_not_clamped() {
        let r = RectPercent::new(80.0, 0.0, 50.0, 100.0).to_absolute(&FULL_HD);
        assert_eq!(r, Rect::new(1536, 0, 960, 1080));
        assert!(!contains(&FULL_HD, &r));
    }

    #[test]
    fn distance_is_zero_only_for_equal_rects() {
        let a = Rect::new(10, 20, 300, 400);
        assert_eq!(a.distance(&a), 0);
        assert_eq!(a.distance(&Rect::new(11, 20, 300, 400)), 1);
        assert_eq!(a.distance(&Rect::new(10, 20, 300, 399)), 1);
    }

    #[test]
    fn distance_sums_all_fields_and_is_symmetric() {
        let a = Rect::new(0, 0, 639, 540);
        let b = Rect::new(-5, 10, 960, 500);
        assert_eq!(a.distance(&b), 5 + 10 + 321 + 40);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = Rect::new(0, 0, 100, 100);
        assert_eq!(a.intersect(&Rect::new(100, 0, 50, 50)), None);
        assert_eq!(a.overlap_area(&Rect::new(200, 200, 50, 50)), 0);
    }

    #[test]
    fn intersect_partial_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 25, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 25, 50, 75)));
        assert_eq!(a.overlap_area(&b), 50 * 75);
    }

    #[test]
    fn percent_rect_deserializes_from_array() {
        let r: RectPercent = serde_json::from_str("[0, 50, 33.33, 50]").unwrap();
        assert_eq!(r, RectPercent::new(0.0, 50.0, 33.33, 50.0));
    }
}
