//! Geometric primitives for timeline layout.
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Coordinates follow SVG conventions: the origin is the top-left corner, X
//! grows to the right (this is the time axis) and Y grows downward (this is
//! the lane axis).
//!
//! ```text
//!   (0,0) ────────► +X (time)
//!     │
//!     ▼
//!    +Y (lanes)
//! ```

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use timeflow_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(30.0, 40.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 20.0);
/// assert_eq!(mid.y(), 30.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Converts a point and size into a bounds rectangle centered on the point.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// A rectangular bounding box with minimum and maximum coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Merges two bounds into the smallest bounds containing both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use timeflow_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let b = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = a.merge(&b);
    /// assert_eq!(combined.width(), 130.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows the bounds by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Finds where the segment from the center of these bounds towards
    /// `external` crosses the rectangle border.
    ///
    /// Returns the center itself when `external` coincides with it.
    pub fn border_point_towards(&self, external: Point) -> Point {
        let center = self.center();
        let dx = external.x - center.x;
        let dy = external.y - center.y;

        if dx == 0.0 && dy == 0.0 {
            return center;
        }

        let half_width = self.width() / 2.0;
        let half_height = self.height() / 2.0;

        let scale_x = if dx != 0.0 {
            half_width / dx.abs()
        } else {
            f32::INFINITY
        };
        let scale_y = if dy != 0.0 {
            half_height / dy.abs()
        } else {
            f32::INFINITY
        };
        let scale = scale_x.min(scale_y);

        Point::new(center.x + dx * scale, center.y + dy * scale)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_bounds_from_center() {
        let bounds = Point::new(50.0, 50.0).to_bounds(Size::new(20.0, 10.0));

        assert_approx_eq!(f32, bounds.min_x(), 40.0);
        assert_approx_eq!(f32, bounds.min_y(), 45.0);
        assert_approx_eq!(f32, bounds.max_x(), 60.0);
        assert_approx_eq!(f32, bounds.max_y(), 55.0);
    }

    #[test]
    fn test_bounds_expand() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(10.0, 10.0));
        let expanded = bounds.expand(5.0);

        assert_approx_eq!(f32, expanded.min_x(), 5.0);
        assert_approx_eq!(f32, expanded.width(), 20.0);
        assert_approx_eq!(f32, expanded.height(), 20.0);
    }

    #[test]
    fn test_border_point_horizontal() {
        let bounds = Point::new(0.0, 0.0).to_bounds(Size::new(100.0, 40.0));
        let border = bounds.border_point_towards(Point::new(200.0, 0.0));

        assert_approx_eq!(f32, border.x(), 50.0);
        assert_approx_eq!(f32, border.y(), 0.0);
    }

    #[test]
    fn test_border_point_vertical() {
        let bounds = Point::new(0.0, 0.0).to_bounds(Size::new(100.0, 40.0));
        let border = bounds.border_point_towards(Point::new(0.0, -300.0));

        assert_approx_eq!(f32, border.x(), 0.0);
        assert_approx_eq!(f32, border.y(), -20.0);
    }

    #[test]
    fn test_border_point_same_center() {
        let bounds = Point::new(5.0, 5.0).to_bounds(Size::new(10.0, 10.0));
        let border = bounds.border_point_towards(Point::new(5.0, 5.0));

        assert_eq!(border, Point::new(5.0, 5.0));
    }
}
