//! Hit tests between landmark points and sprite shapes
//!
//! Every theme reduces to points against circles or axis-aligned boxes, plus
//! one ball-against-paddle overlap for Christmas Pong.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point_in_rect(point, self)
    }
}

/// Strictly inside a circle (`dist < radius`)
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) < radius * radius
}

/// Inside a rectangle, edges included
#[inline]
pub fn point_in_rect(point: Vec2, rect: &Rect) -> bool {
    point.x >= rect.x && point.x <= rect.right() && point.y >= rect.y && point.y <= rect.bottom()
}

/// Circle's bounding box overlaps the rectangle (open intervals)
#[inline]
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.x + radius > rect.x
        && center.x - radius < rect.right()
        && center.y + radius > rect.y
        && center.y - radius < rect.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_in_circle_is_strict() {
        let c = Vec2::new(10.0, 10.0);
        assert!(point_in_circle(Vec2::new(15.0, 10.0), c, 6.0));
        assert!(!point_in_circle(Vec2::new(16.0, 10.0), c, 6.0));
    }

    #[test]
    fn test_point_in_rect_includes_edges() {
        let r = Rect::new(0.0, 0.0, 50.0, 20.0);
        assert!(point_in_rect(Vec2::new(0.0, 0.0), &r));
        assert!(point_in_rect(Vec2::new(50.0, 20.0), &r));
        assert!(!point_in_rect(Vec2::new(50.1, 10.0), &r));
        assert!(!point_in_rect(Vec2::new(25.0, -0.1), &r));
    }

    #[test]
    fn test_circle_overlaps_rect() {
        let paddle = Rect::new(100.0, 400.0, 100.0, 20.0);
        // Ball resting just above the paddle, touching
        assert!(circle_overlaps_rect(Vec2::new(150.0, 390.0), 15.0, &paddle));
        // Exactly tangent does not count
        assert!(!circle_overlaps_rect(Vec2::new(150.0, 385.0), 15.0, &paddle));
        // Off to the side
        assert!(!circle_overlaps_rect(Vec2::new(20.0, 410.0), 15.0, &paddle));
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::new(10.0, 20.0, 60.0, 80.0);
        assert_eq!(r.center(), Vec2::new(40.0, 60.0));
    }

    proptest! {
        #[test]
        fn prop_center_is_always_contained(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 0.0f32..500.0,
            h in 0.0f32..500.0,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert!(r.contains(r.center()));
        }
    }
}
