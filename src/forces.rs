use rayon::prelude::*;
use ultraviolet::DVec2;

use crate::body::Body;

/// Newtonian gravitational constant in N·m²/kg².
pub const G: f64 = 6.6743e-11;

/// Below this separation two bodies exert no pull on each other.
pub const MIN_DISTANCE: f64 = 1e-10;

/// Acceleration of a body at `from` towards a mass `mass_to` at `to`.
/// Returns zero when the two points (nearly) coincide.
#[inline]
pub fn pairwise_acceleration(from: DVec2, to: DVec2, mass_to: f64, g: f64) -> DVec2 {
    let d = to - from;
    let dist = d.mag();
    if dist < MIN_DISTANCE {
        return DVec2::zero();
    }
    let a = g * mass_to / (dist * dist);
    d * (a / dist)
}

/// Net gravitational acceleration on body `i` from every other body.
pub fn acceleration_on(bodies: &[Body], i: usize, g: f64) -> DVec2 {
    let pos = bodies[i].pos;
    bodies
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != i)
        .fold(DVec2::zero(), |acc, (_, other)| {
            acc + pairwise_acceleration(pos, other.pos, other.mass, g)
        })
}

/// Computes the net acceleration of every body. Positions are only read, so
/// the result does not depend on the order pairs are visited in.
pub fn accelerations(bodies: &[Body], g: f64, parallel: bool) -> Vec<DVec2> {
    if parallel {
        (0..bodies.len())
            .into_par_iter()
            .map(|i| acceleration_on(bodies, i, g))
            .collect()
    } else {
        (0..bodies.len())
            .map(|i| acceleration_on(bodies, i, g))
            .collect()
    }
}

/// Applies one step of mutual gravity to the velocities.
/// Bodies that are still in contact with another body receive nothing.
pub fn apply_gravity(bodies: &mut [Body], g: f64, dt: f64, parallel: bool) {
    let acc = accelerations(bodies, g, parallel);
    for (body, a) in bodies.iter_mut().zip(acc) {
        body.accel(a * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Rgb;
    use approx::assert_relative_eq;

    fn body(x: f64, y: f64, mass: f64) -> Body {
        Body::new(DVec2::new(x, y), 1.0, mass, Rgb::WHITE, 1e6, 1e6)
    }

    #[test]
    fn coincident_bodies_exert_no_pull() {
        let a = pairwise_acceleration(DVec2::new(5.0, 5.0), DVec2::new(5.0, 5.0), 1e20, G);
        assert_eq!(a, DVec2::zero());

        let bodies = vec![body(10.0, 10.0, 1e16), body(10.0, 10.0 + 1e-11, 1e16)];
        let acc = accelerations(&bodies, G, false);
        assert_eq!(acc[0], DVec2::zero());
        assert_eq!(acc[1], DVec2::zero());
    }

    #[test]
    fn pull_points_towards_other_body() {
        let a = pairwise_acceleration(DVec2::new(0.0, 0.0), DVec2::new(3.0, 4.0), 25.0, 1.0);
        // |a| = 1 * 25 / 25 = 1, along (0.6, 0.8)
        assert_relative_eq!(a.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(a.y, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn parallel_matches_sequential() {
        let bodies: Vec<Body> = (0..16)
            .map(|i| {
                let x = 100.0 + 37.0 * i as f64;
                let y = 200.0 + 11.0 * (i * i) as f64;
                body(x, y, 1e15 * (1 + i) as f64)
            })
            .collect();
        let seq = accelerations(&bodies, G, false);
        let par = accelerations(&bodies, G, true);
        for (s, p) in seq.iter().zip(&par) {
            assert_relative_eq!(s.x, p.x, max_relative = 1e-12);
            assert_relative_eq!(s.y, p.y, max_relative = 1e-12);
        }
    }

    #[test]
    fn colliding_body_is_not_accelerated() {
        let mut bodies = vec![body(100.0, 100.0, 1e16), body(200.0, 100.0, 1e16)];
        bodies[0].colliding = 1;
        apply_gravity(&mut bodies, G, 0.1, false);
        assert_eq!(bodies[0].vel, DVec2::zero());
        assert!(bodies[1].vel.x < 0.0);
        assert_eq!(bodies[1].vel.y, 0.0);
    }
}
