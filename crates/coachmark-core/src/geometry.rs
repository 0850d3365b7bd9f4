#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All values are logical points (`f64`) in a single coordinate space with the
//! origin at the top-left corner. Conversion between the coordinate spaces of
//! nested views is the caller's job; everything here assumes the inputs are
//! already expressed relative to the same container.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// The empty size.
    pub const ZERO: Size = Size::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero (or negative).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// An axis-aligned rectangle for cutouts, container bounds and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Create the rectangle spanned by two opposite corners.
    ///
    /// The corners may be given in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal midpoint.
    #[inline]
    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical midpoint.
    #[inline]
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Grow the rectangle by `amount` on every side.
    ///
    /// Negative amounts shrink it; the size never drops below zero.
    pub fn outset(&self, amount: f64) -> Rect {
        let width = (self.width + amount * 2.0).max(0.0);
        let height = (self.height + amount * 2.0).max(0.0);
        Rect::new(
            self.mid_x() - width / 2.0,
            self.mid_y() - height / 2.0,
            width,
            height,
        )
    }

    /// Create a new rectangle inside the current one with the given insets.
    pub fn inner(&self, insets: Insets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.horizontal_sum()).max(0.0),
            (self.height - insets.vertical_sum()).max(0.0),
        )
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Insets for safe areas and margins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    /// Create new insets with equal values.
    pub const fn all(val: f64) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new insets with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }

    /// Inset on the leading side for the given direction.
    #[inline]
    pub fn leading(&self, direction: LayoutDirection) -> f64 {
        match direction {
            LayoutDirection::LeftToRight => self.left,
            LayoutDirection::RightToLeft => self.right,
        }
    }

    /// Inset on the trailing side for the given direction.
    #[inline]
    pub fn trailing(&self, direction: LayoutDirection) -> f64 {
        match direction {
            LayoutDirection::LeftToRight => self.right,
            LayoutDirection::RightToLeft => self.left,
        }
    }
}

/// Horizontal writing direction of the host interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LayoutDirection {
    /// Leading edge is on the left.
    #[default]
    LeftToRight,
    /// Leading edge is on the right.
    RightToLeft,
}

impl LayoutDirection {
    /// Returns `true` for right-to-left layouts.
    #[inline]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::RightToLeft)
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A closed shape cut out of the dimming overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Region {
    /// Plain rectangle.
    Rect(Rect),
    /// Rectangle with circular corners of `radius`.
    RoundedRect { rect: Rect, radius: f64 },
    /// Arbitrary simple polygon (at least three vertices).
    Polygon(Vec<Point>),
}

impl Region {
    /// A rectangular region.
    pub const fn rect(rect: Rect) -> Self {
        Self::Rect(rect)
    }

    /// A rounded rectangle. The radius is clamped to `[0, min(w, h) / 2]`.
    pub fn rounded(rect: Rect, radius: f64) -> Self {
        let limit = (rect.width.min(rect.height) / 2.0).max(0.0);
        Self::RoundedRect {
            rect,
            radius: radius.clamp(0.0, limit),
        }
    }

    /// A polygonal region.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegeneratePolygon`] with fewer than three
    /// vertices and [`GeometryError::NonFinite`] if any coordinate is NaN or
    /// infinite.
    pub fn polygon(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon {
                vertices: points.len(),
            });
        }
        if !points.iter().all(Point::is_finite) {
            return Err(GeometryError::NonFinite("polygon vertex"));
        }
        Ok(Self::Polygon(points))
    }

    /// Axis-aligned bounding rectangle.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) | Self::RoundedRect { rect, .. } => *rect,
            Self::Polygon(points) => {
                let mut min = Point::new(f64::INFINITY, f64::INFINITY);
                let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for p in points {
                    min.x = min.x.min(p.x);
                    min.y = min.y.min(p.y);
                    max.x = max.x.max(p.x);
                    max.y = max.y.max(p.y);
                }
                if points.is_empty() {
                    Rect::default()
                } else {
                    Rect::from_corners(min, max)
                }
            }
        }
    }

    /// Center of the bounding rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Check if a point lies inside the region.
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(point),
            Self::RoundedRect { rect, radius } => rounded_contains(rect, *radius, point),
            Self::Polygon(points) => polygon_contains(points, point),
        }
    }

    /// Translate the region by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Region {
        let shift = |r: &Rect| Rect::new(r.x + dx, r.y + dy, r.width, r.height);
        match self {
            Self::Rect(rect) => Self::Rect(shift(rect)),
            Self::RoundedRect { rect, radius } => Self::RoundedRect {
                rect: shift(rect),
                radius: *radius,
            },
            Self::Polygon(points) => Self::Polygon(
                points
                    .iter()
                    .map(|p| Point::new(p.x + dx, p.y + dy))
                    .collect(),
            ),
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::Rect(rect)
    }
}

fn rounded_contains(rect: &Rect, radius: f64, point: Point) -> bool {
    if !rect.contains(point) {
        return false;
    }
    if radius <= 0.0 {
        return true;
    }
    // Only the four corner squares need the circle test.
    let cx = if point.x < rect.x + radius {
        rect.x + radius
    } else if point.x > rect.right() - radius {
        rect.right() - radius
    } else {
        return true;
    };
    let cy = if point.y < rect.y + radius {
        rect.y + radius
    } else if point.y > rect.bottom() - radius {
        rect.bottom() - radius
    } else {
        return true;
    };
    let dx = point.x - cx;
    let dy = point.y - cy;
    dx * dx + dy * dy <= radius * radius
}

/// Even-odd ray casting.
fn polygon_contains(points: &[Point], point: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid geometry handed to a constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A polygon needs at least three vertices.
    DegeneratePolygon { vertices: usize },
    /// A coordinate was NaN or infinite.
    NonFinite(&'static str),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegeneratePolygon { vertices } => {
                write!(f, "polygon needs at least 3 vertices, got {vertices}")
            }
            Self::NonFinite(what) => write!(f, "non-finite coordinate in {what}"),
        }
    }
}

impl std::error::Error for GeometryError {}
