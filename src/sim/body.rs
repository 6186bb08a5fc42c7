//! Minimal arcade physics bodies
//!
//! Axis-aligned boxes with velocity, gravity and a flat ground line. Enough
//! for a side-view platformer; screen space, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Touching edges do not count as overlap
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Play area: the visible viewport plus the ground line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    /// y coordinate of the ground surface
    pub ground_y: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32, ground_height: f32) -> Self {
        Self {
            width,
            height,
            ground_y: height - ground_height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True if `pos` lies more than `margin` outside the viewport on any side
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        self.is_outside_by(pos, Vec2::splat(margin))
    }

    /// Like `is_outside` with separate horizontal/vertical margins
    pub fn is_outside_by(&self, pos: Vec2, margin: Vec2) -> bool {
        pos.x < -margin.x
            || pos.x > self.width + margin.x
            || pos.y < -margin.y
            || pos.y > self.height + margin.y
    }
}

/// A physics body: position is the box center
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collider size (full width/height)
    pub size: Vec2,
    /// Downward acceleration applied each step (pixels/s²)
    pub gravity: f32,
    /// Set by `step` when resting on the ground
    pub touching_ground: bool,
    /// Disabled bodies never overlap anything
    pub collision_enabled: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            gravity: 0.0,
            touching_ground: false,
            collision_enabled: true,
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.collision_enabled && other.collision_enabled && self.aabb().intersects(&other.aabb())
    }

    /// Integrate one step. With a ground line the body lands on it and
    /// `touching_ground` reflects whether it is resting there afterwards.
    pub fn step(&mut self, dt: f32, ground_y: Option<f32>) {
        self.vel.y += self.gravity * dt;
        self.pos += self.vel * dt;

        self.touching_ground = false;
        if let Some(ground) = ground_y {
            let bottom = self.pos.y + self.size.y * 0.5;
            if bottom >= ground && self.vel.y >= 0.0 {
                self.pos.y = ground - self.size.y * 0.5;
                self.vel.y = 0.0;
                self.touching_ground = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(9.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_disabled_body_never_overlaps() {
        let a = Body::new(Vec2::ZERO, Vec2::splat(10.0));
        let mut b = Body::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        b.collision_enabled = false;
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_falls_and_lands_on_ground() {
        let mut body = Body::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0)).with_gravity(900.0);
        for _ in 0..120 {
            body.step(1.0 / 60.0, Some(100.0));
        }
        assert!(body.touching_ground);
        assert!((body.pos.y - 90.0).abs() < 1e-4);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_upward_motion_leaves_ground() {
        let mut body = Body::new(Vec2::new(0.0, 90.0), Vec2::new(10.0, 20.0)).with_gravity(900.0);
        body.step(1.0 / 60.0, Some(100.0));
        assert!(body.touching_ground);

        body.vel.y = -350.0;
        body.step(1.0 / 60.0, Some(100.0));
        assert!(!body.touching_ground);
        assert!(body.pos.y < 90.0);
    }

    #[test]
    fn test_arena_outside() {
        let arena = Arena::new(800.0, 600.0, 150.0);
        assert_eq!(arena.ground_y, 450.0);
        assert!(!arena.is_outside(Vec2::new(-150.0, 300.0), 200.0));
        assert!(arena.is_outside(Vec2::new(-201.0, 300.0), 200.0));
        assert!(arena.is_outside(Vec2::new(400.0, 801.0), 200.0));
    }
}
