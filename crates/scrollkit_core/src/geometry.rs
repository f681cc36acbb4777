//! Geometry primitives in document coordinates
//!
//! Scroll offsets run document-scale, so everything here is f64.

/// 2D point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along the scroll axis: `y` for vertical, `x` for horizontal.
    pub fn axis(&self, vertical: bool) -> f64 {
        if vertical {
            self.y
        } else {
            self.x
        }
    }
}

/// 2D size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along the scroll axis: height for vertical, width otherwise.
    pub fn axis(&self, vertical: bool) -> f64 {
        if vertical {
            self.height
        } else {
            self.width
        }
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_selection() {
        let p = Point::new(3.0, 7.0);
        assert_eq!(p.axis(true), 7.0);
        assert_eq!(p.axis(false), 3.0);

        let s = Size::new(100.0, 400.0);
        assert_eq!(s.axis(true), 400.0);
        assert_eq!(s.axis(false), 100.0);
    }
}
