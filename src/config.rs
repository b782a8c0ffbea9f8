//! Scenario configuration loaded from YAML.
//!
//! Every field is optional and falls back to the defaults below. A minimal
//! scenario with two explicit bodies:
//!
//! ```yaml
//! arena: { width: 800, height: 600 }
//! timestep: 0.0064
//! gravity_enabled: true
//! collision_model: kinetic_exchange   # or momentum_average
//! bodies:
//!   - { x: 200, y: 300, vx: 40, vy: 0, mass: 5.0e15, radius: 20 }
//!   - { x: 600, y: 300, vx: -40, vy: 0, mass: 5.0e15, radius: 20, color: [255, 96, 96] }
//! ```
//!
//! When `bodies` is empty they are scattered at random per `generator`.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use ultraviolet::DVec2;

use crate::{
    body::{Body, Rgb},
    collision::CollisionModel,
    drag::DragConfig,
    error::GenerateError,
    forces,
    generator::{self, GeneratorConfig},
    integrator::Arena,
};

/// Initial state of one hand-placed body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BodyConfig {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    pub mass: f64,
    pub radius: f64,
    #[serde(default)]
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: Arena,
    /// Simulated seconds per step.
    pub timestep: f64,
    pub gravitational_constant: f64,
    pub gravity_enabled: bool,
    pub boundary_reflection: bool,
    pub collision_model: CollisionModel,
    /// Accumulate gravity on the rayon pool instead of the step thread.
    pub parallel_forces: bool,
    /// Past positions kept per body for drawing its trail.
    pub trail_length: usize,
    /// Steps per wall-clock second.
    pub frame_rate: u32,
    pub start_paused: bool,
    pub generator: GeneratorConfig,
    pub drag: DragConfig,
    pub bodies: Vec<BodyConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            timestep: 0.0064,
            gravitational_constant: forces::G,
            gravity_enabled: true,
            boundary_reflection: true,
            collision_model: CollisionModel::default(),
            parallel_forces: false,
            trail_length: Body::DEFAULT_TRAIL,
            frame_rate: 60,
            start_paused: false,
            generator: GeneratorConfig::default(),
            drag: DragConfig::default(),
            bodies: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml).context("malformed scenario")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("cannot read scenario {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("in scenario {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.arena.width > 0.0 && self.arena.height > 0.0,
            "arena must have a positive size, got {}x{}",
            self.arena.width,
            self.arena.height
        );
        ensure!(self.timestep > 0.0, "timestep must be positive, got {}", self.timestep);
        ensure!(self.frame_rate > 0, "frame_rate must be positive");

        let g = &self.generator;
        ensure!(g.min_radius > 0, "generator.min_radius must be positive");
        ensure!(
            g.min_radius <= g.max_radius,
            "generator radius range {}..{} is inverted",
            g.min_radius,
            g.max_radius
        );
        ensure!(
            g.min_mass > 0.0 && g.min_mass <= g.max_mass,
            "generator mass range {:e}..{:e} is invalid",
            g.min_mass,
            g.max_mass
        );
        ensure!(self.drag.smoothing_window > 0, "drag.smoothing_window must be positive");

        for (i, b) in self.bodies.iter().enumerate() {
            ensure!(b.radius > 0.0, "body #{i}: radius must be positive, got {}", b.radius);
            ensure!(b.mass > 0.0, "body #{i}: mass must be positive, got {}", b.mass);
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    /// The explicit bodies of the scenario, or a random scene when none are listed.
    pub fn build_bodies(&self) -> Result<Vec<Body>, GenerateError> {
        if self.bodies.is_empty() {
            return generator::scatter(&self.generator, &self.arena, self.trail_length);
        }

        Ok(self
            .bodies
            .iter()
            .map(|b| {
                Body::new(
                    DVec2::new(b.x, b.y),
                    b.radius,
                    b.mass,
                    b.color,
                    self.arena.width,
                    self.arena.height,
                )
                .with_velocity(DVec2::new(b.vx, b.vy))
                .with_trail_capacity(self.trail_length)
            })
            .collect())
    }
}
