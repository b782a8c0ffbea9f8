use std::collections::VecDeque;

use serde::Deserialize;
use ultraviolet::DVec2;

use crate::geometry;

/// Number of frames a body keeps its border-contact marker after bouncing.
pub const BORDER_CONTACT_FRAMES: u8 = 3;

/// Display colour of a body. Ignored by the physics.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A rigid circular mass moving inside the arena.
#[derive(Clone, Debug)]
pub struct Body {
    /// Position of the center.
    pub pos: DVec2,
    /// Velocity vector.
    pub vel: DVec2,
    pub radius: f64,
    pub mass: f64,
    pub color: Rgb,
    /// Overlap counter maintained by the collision resolver.
    /// While non-zero the body ignores gravitational acceleration.
    pub colliding: u32,
    /// Frames left on the border-contact marker (debug display only).
    pub border_contact: u8,
    trail: VecDeque<DVec2>,
    trail_capacity: usize,
}

impl Body {
    /// Default number of past positions kept for the trail.
    pub const DEFAULT_TRAIL: usize = 256;

    /// Creates a body at rest, clamping the center against the arena.
    ///
    /// The clamp only guards `x < radius`, `y < radius`, `x > width` and
    /// `y > height`, so a body can still poke past the far walls.
    pub fn new(pos: DVec2, radius: f64, mass: f64, color: Rgb, width: f64, height: f64) -> Self {
        let mut x = pos.x;
        let mut y = pos.y;

        if x < radius {
            x = radius;
        }
        if y < radius {
            y = radius;
        }
        if x > width {
            x = width;
        }
        if y > height {
            y = height;
        }

        Self {
            pos: DVec2::new(x, y),
            vel: DVec2::zero(),
            radius,
            mass,
            color,
            colliding: 0,
            border_contact: 0,
            trail: VecDeque::new(),
            trail_capacity: Self::DEFAULT_TRAIL,
        }
    }

    /// Builder-style velocity setter.
    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    /// Builder-style trail capacity setter. Zero disables the trail.
    pub fn with_trail_capacity(mut self, capacity: usize) -> Self {
        self.trail_capacity = capacity;
        while self.trail.len() > capacity {
            self.trail.pop_front();
        }
        self
    }

    /// Adds `dv` to the velocity unless the body is currently colliding.
    pub fn accel(&mut self, dv: DVec2) {
        if !self.is_colliding() {
            self.vel += dv;
        }
    }

    pub fn is_colliding(&self) -> bool {
        self.colliding > 0
    }

    /// Records the current position at the end of the trail.
    pub fn record_trail(&mut self) {
        if self.trail_capacity == 0 {
            return;
        }
        if self.trail.len() == self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back(self.pos);
    }

    pub fn trail(&self) -> impl ExactSizeIterator<Item = &DVec2> {
        self.trail.iter()
    }

    pub fn clear_trail(&mut self) {
        log::trace!("clearing trail of body at ({:.1}, {:.1})", self.pos.x, self.pos.y);
        self.trail.clear();
    }

    pub fn mark_border_contact(&mut self) {
        self.border_contact = BORDER_CONTACT_FRAMES;
    }

    /// Counts the border-contact marker down by one frame.
    pub fn decay_border_contact(&mut self) {
        self.border_contact = self.border_contact.saturating_sub(1);
    }

    pub fn contains_point(&self, point: DVec2) -> bool {
        geometry::contains_point(self.pos, self.radius, point)
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.mag_sq()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f64, y: f64, radius: f64) -> Body {
        Body::new(DVec2::new(x, y), radius, 1.0, Rgb::WHITE, 100.0, 50.0)
    }

    #[test]
    fn construction_clamps_near_walls() {
        let b = body_at(2.0, -4.0, 5.0);
        assert_eq!(b.pos, DVec2::new(5.0, 5.0));
    }

    #[test]
    fn construction_clamps_far_walls_to_the_edge_only() {
        let b = body_at(250.0, 80.0, 5.0);
        // Center lands on the wall, half the circle is outside.
        assert_eq!(b.pos, DVec2::new(100.0, 50.0));
    }

    #[test]
    fn oversized_radius_is_clamped_to_far_wall() {
        let b = body_at(10.0, 10.0, 120.0);
        assert_eq!(b.pos, DVec2::new(100.0, 50.0));
    }

    #[test]
    fn accel_is_ignored_while_colliding() {
        let mut b = body_at(50.0, 25.0, 5.0);
        b.accel(DVec2::new(1.0, 2.0));
        assert_eq!(b.vel, DVec2::new(1.0, 2.0));

        b.colliding = 1;
        b.accel(DVec2::new(1.0, 2.0));
        assert_eq!(b.vel, DVec2::new(1.0, 2.0));
    }

    #[test]
    fn trail_is_bounded() {
        let mut b = body_at(50.0, 25.0, 5.0).with_trail_capacity(3);
        for i in 0..5 {
            b.pos.x = 10.0 + i as f64;
            b.record_trail();
        }
        let xs: Vec<f64> = b.trail().map(|p| p.x).collect();
        assert_eq!(xs, vec![12.0, 13.0, 14.0]);

        b.clear_trail();
        assert_eq!(b.trail().len(), 0);
    }

    #[test]
    fn each_body_owns_its_trail() {
        let mut a = body_at(50.0, 25.0, 5.0);
        let b = a.clone();
        a.record_trail();
        assert_eq!(a.trail().len(), 1);
        assert_eq!(b.trail().len(), 0);
    }

    #[test]
    fn border_marker_decays_to_zero() {
        let mut b = body_at(50.0, 25.0, 5.0);
        b.mark_border_contact();
        for _ in 0..5 {
            b.decay_border_contact();
        }
        assert_eq!(b.border_contact, 0);
    }
}
