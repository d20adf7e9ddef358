//! 2D vector operations and rotated-rectangle bounds.
//!
//! All values are `f64` in frame pixels (or normalized units where noted).
//! The rotated bounds use a law-of-sines decomposition: each edge of the
//! rectangle is projected onto the rotated axes, and the bounding box is
//! measured between the projected corner points.

use serde::{Deserialize, Serialize};

/// Right angle in radians, the fixed angle of the edge triangle.
const RIGHT_ANGLE: f64 = std::f64::consts::FRAC_PI_2;

/// A 2D point or direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(self, scalar: f64) -> Vector {
        Vector::new(self.x * scalar, self.y * scalar)
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_squared(self, other: Vector) -> f64 {
        let d = self.subtract(other);
        d.dot(d)
    }

    pub fn distance(self, other: Vector) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Vector {
        let length = self.length();
        if length == 0.0 {
            return Vector::default();
        }
        Vector::new(self.x / length, self.y / length)
    }

    /// Rotate this point by `radians` around `origin`.
    pub fn rotate(self, radians: f64, origin: Vector) -> Vector {
        let (sin, cos) = radians.sin_cos();
        let t = self.subtract(origin);
        Vector::new(
            origin.x + cos * t.x - sin * t.y,
            origin.y + sin * t.x + cos * t.y,
        )
    }
}

/// Width and height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        self.height / self.width
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Size::new(width as f64, height as f64)
    }
}

/// Axis-aligned rectangle with top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Project an edge of `length` onto axes rotated by `rotation`.
///
/// Solves the right triangle whose hypotenuse is the edge: the returned
/// vector holds the horizontal and vertical offsets of the edge's far end.
fn offset_point_on_edge(length: f64, rotation: f64) -> Vector {
    let a = length;
    let angle_b = rotation;
    let angle_c = RIGHT_ANGLE - rotation;

    let ratio = a / RIGHT_ANGLE.sin();
    let b = ratio * angle_b.sin();
    let c = ratio * angle_c.sin();
    let cos_c = angle_c.cos();

    Vector::new(cos_c * b, cos_c * c)
}

/// Axis-aligned bounding box of `rect` rotated by `rotation` radians about
/// its own reference frame.
///
/// Rotation 0 returns the rectangle's own size.
pub fn rotated_rect_bounds(rect: &Rect, rotation: f64) -> Size {
    let horizontal = offset_point_on_edge(rect.width, rotation);
    let vertical = offset_point_on_edge(rect.height, rotation);

    let top_left = Vector::new(rect.x + horizontal.x.abs(), rect.y - horizontal.y.abs());
    let top_right = Vector::new(
        rect.x + rect.width + vertical.y.abs(),
        rect.y + vertical.x.abs(),
    );
    let bottom_left = Vector::new(
        rect.x - vertical.y.abs(),
        rect.y + rect.height - vertical.x.abs(),
    );

    Size::new(
        top_left.distance(top_right),
        top_left.distance(bottom_left),
    )
}
