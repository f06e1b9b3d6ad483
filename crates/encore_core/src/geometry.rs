//! Rectangle math for viewport-intersection checks
//!
//! Element bounds are expressed in document coordinates; the viewport is the
//! currently visible document rectangle. The observation trigger fires on the
//! covered fraction of the element with the viewport's bottom edge pulled up,
//! so triggers sitting just below the fold fire slightly before the element is
//! fully in frame.

/// Axis-aligned rectangle in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Computed width
    pub width: f32,
    /// Computed height
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check if a point is inside the bounds
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Check if bounds overlap another bounds
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// The overlapping rectangle, if any
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 > x0 && y1 > y0 {
            Some(Bounds::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    /// Shrink the bottom edge by a fraction of this rectangle's height.
    ///
    /// `fraction` is clamped to `[0, 1]`; `0.1` removes the bottom 10%.
    pub fn with_bottom_inset(&self, fraction: f32) -> Bounds {
        let fraction = fraction.clamp(0.0, 1.0);
        Bounds::new(self.x, self.y, self.width, self.height * (1.0 - fraction))
    }
}

/// Fraction of `element`'s area covered by `viewport`, in `[0, 1]`.
///
/// Degenerate (zero-area) elements report 1.0 when their origin lies inside
/// the viewport and 0.0 otherwise, so a collapsed trigger still fires.
pub fn intersection_ratio(element: &Bounds, viewport: &Bounds) -> f32 {
    let element_area = element.area();
    if element_area <= f32::EPSILON {
        return if viewport.contains(element.x, element.y) {
            1.0
        } else {
            0.0
        };
    }
    match element.intersection(viewport) {
        Some(overlap) => (overlap.area() / element_area).clamp(0.0, 1.0),
        None => 0.0,
    }
}
