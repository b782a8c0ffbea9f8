use serde::Deserialize;
use ultraviolet::DVec2;

use crate::{
    body::{Body, Rgb},
    error::GenerateError,
    geometry,
    integrator::Arena,
};

/// Parameters for scattering random bodies over the arena.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub count: usize,
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_mass: f64,
    pub max_mass: f64,
    /// Lowest value of each colour channel; the highest is 255.
    pub color_floor: u8,
    /// Placement attempts per body before giving up.
    pub max_attempts: usize,
    /// Fixed seed for reproducible scenes. Random when unset.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 2,
            min_radius: 15,
            max_radius: 30,
            min_mass: 1e15,
            max_mass: 1e16,
            color_floor: 64,
            max_attempts: 10_000,
            seed: None,
        }
    }
}

/// Places `config.count` resting bodies at random, never overlapping one
/// another. Larger bodies are heavier: mass grows linearly with radius.
///
/// Centers are drawn from `[r, width] x [r, height]`, so a body may start
/// partly past the far walls.
pub fn scatter(
    config: &GeneratorConfig,
    arena: &Arena,
    trail_capacity: usize,
) -> Result<Vec<Body>, GenerateError> {
    let mut rng = match config.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let (lo, hi) = (
        config.min_radius.min(config.max_radius),
        config.min_radius.max(config.max_radius),
    );
    let max_radius = hi.max(1);
    let (width, height) = (arena.width as u32, arena.height as u32);
    let mut bodies: Vec<Body> = Vec::with_capacity(config.count);

    while bodies.len() < config.count {
        let color = Rgb([
            rng.u8(config.color_floor..=255),
            rng.u8(config.color_floor..=255),
            rng.u8(config.color_floor..=255),
        ]);

        let mut placed = None;
        for _ in 0..config.max_attempts {
            let r = rng.u32(lo..=hi);
            if r > width || r > height {
                continue;
            }
            let radius = r as f64;
            let pos = DVec2::new(rng.u32(r..=width) as f64, rng.u32(r..=height) as f64);

            let free = bodies
                .iter()
                .all(|other| !geometry::overlaps(other.pos, other.radius, pos, radius));
            if free {
                placed = Some((pos, radius));
                break;
            }
        }

        let Some((pos, radius)) = placed else {
            return Err(GenerateError::NoRoom {
                placed: bodies.len(),
                requested: config.count,
                attempts: config.max_attempts,
            });
        };

        let mass =
            config.min_mass + (config.max_mass - config.min_mass) * radius / max_radius as f64;
        let body = Body::new(pos, radius, mass, color, arena.width, arena.height)
            .with_trail_capacity(trail_capacity);
        log::debug!(
            "body #{}: r = {radius}, m = {mass:.2e} at ({}, {})",
            bodies.len(),
            pos.x,
            pos.y
        );
        bodies.push(body);
    }

    Ok(bodies)
}
