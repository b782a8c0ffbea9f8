use crate::{
    body::Body,
    collision::{CollisionReport, CollisionResolver},
    config::SimConfig,
    error::{GenerateError, SimError},
    forces, integrator,
    integrator::Arena,
    shared::SharedBodies,
};

/// Per-step physics settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParams {
    pub dt: f64,
    pub g: f64,
    pub arena: Arena,
    pub gravity: bool,
    pub reflect: bool,
    pub parallel: bool,
}

impl From<&SimConfig> for StepParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            dt: config.timestep,
            g: config.gravitational_constant,
            arena: config.arena,
            gravity: config.gravity_enabled,
            reflect: config.boundary_reflection,
            parallel: config.parallel_forces,
        }
    }
}

/// Drives the bodies forward one fixed timestep at a time.
#[derive(Debug)]
pub struct Simulation {
    pub params: StepParams,
    /// Number of steps taken so far.
    pub frame: usize,
    bodies: SharedBodies,
    resolver: CollisionResolver,
}

impl Simulation {
    pub fn new(bodies: SharedBodies, config: &SimConfig) -> Self {
        Self::with_resolver(
            bodies,
            StepParams::from(config),
            CollisionResolver::new(config.collision_model),
        )
    }

    /// Starts from an existing resolver, keeping the contacts it remembers.
    pub fn with_resolver(
        bodies: SharedBodies,
        params: StepParams,
        resolver: CollisionResolver,
    ) -> Self {
        log::debug!(
            "collision model {:?}, {} remembered contact(s)",
            resolver.model(),
            resolver.contacts().len()
        );
        Self {
            params,
            frame: 0,
            bodies,
            resolver,
        }
    }

    /// Builds the bodies described by `config` and wraps them in a fresh
    /// shared collection.
    pub fn from_config(config: &SimConfig) -> Result<Self, GenerateError> {
        let bodies = config.build_bodies()?;
        log::info!("simulation initialised with {} bodies", bodies.len());
        Ok(Self::new(bodies.into(), config))
    }

    /// Handle to the bodies, for the collaborators that read or edit them.
    pub fn bodies(&self) -> &SharedBodies {
        &self.bodies
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    /// Advances the simulation by one step under a single lock:
    /// gravity, then integration, then collision resolution.
    pub fn step(&mut self) -> Result<CollisionReport, SimError> {
        let params = self.params;
        let resolver = &mut self.resolver;
        let report = self
            .bodies
            .with_all(|bodies| advance(bodies, resolver, &params))?;

        self.frame += 1;
        if report.new_contacts > 0 {
            log::debug!("frame {}: {} new contact(s)", self.frame, report.new_contacts);
        }
        Ok(report)
    }

    /// Forgets every remembered contact, e.g. after bodies were replaced.
    pub fn reset_contacts(&mut self) {
        self.resolver.reset();
    }
}

/// One timestep over a plain slice of bodies.
pub fn advance(
    bodies: &mut [Body],
    resolver: &mut CollisionResolver,
    params: &StepParams,
) -> Result<CollisionReport, SimError> {
    if params.gravity {
        forces::apply_gravity(bodies, params.g, params.dt, params.parallel);
    }
    for body in bodies.iter_mut() {
        integrator::integrate(body, params.dt, &params.arena, params.reflect);
    }
    resolver.resolve(bodies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body::Rgb, collision::CollisionModel};
    use approx::assert_relative_eq;
    use ultraviolet::DVec2;

    fn quiet_config() -> SimConfig {
        SimConfig {
            gravity_enabled: false,
            timestep: 0.5,
            ..SimConfig::default()
        }
    }

    #[test]
    fn free_body_moves_at_constant_velocity() {
        let body = Body::new(DVec2::new(100.0, 100.0), 5.0, 1.0, Rgb::WHITE, 1600.0, 900.0)
            .with_velocity(DVec2::new(3.0, -2.0));
        let mut sim = Simulation::new(SharedBodies::new(vec![body]), &quiet_config());

        for _ in 0..40 {
            sim.step().unwrap();
        }
        let body = sim.bodies().get(0).unwrap();
        assert_relative_eq!(body.pos.x, 100.0 + 3.0 * 0.5 * 40.0, epsilon = 1e-9);
        assert_relative_eq!(body.pos.y, 100.0 - 2.0 * 0.5 * 40.0, epsilon = 1e-9);
        assert_eq!(sim.frame, 40);
    }

    #[test]
    fn step_counts_frames_and_reports_contacts() {
        let bodies = vec![
            Body::new(DVec2::new(100.0, 100.0), 10.0, 1.0, Rgb::WHITE, 1600.0, 900.0)
                .with_velocity(DVec2::new(10.0, 0.0)),
            Body::new(DVec2::new(125.0, 100.0), 10.0, 1.0, Rgb::WHITE, 1600.0, 900.0),
        ];
        let mut sim = Simulation::new(SharedBodies::new(bodies), &quiet_config());

        assert_eq!(sim.step().unwrap().new_contacts, 0);
        assert_eq!(sim.step().unwrap().new_contacts, 1);
        assert_eq!(sim.resolver().contacts().len(), 1);

        sim.reset_contacts();
        assert!(sim.resolver().contacts().is_empty());
    }

    #[test]
    fn from_config_carries_the_collision_model() {
        let config = SimConfig {
            collision_model: CollisionModel::MomentumAverage,
            bodies: vec![crate::config::BodyConfig {
                x: 50.0,
                y: 60.0,
                vx: 0.0,
                vy: 0.0,
                mass: 1.0,
                radius: 5.0,
                color: Rgb::WHITE,
            }],
            ..quiet_config()
        };
        let sim = Simulation::from_config(&config).unwrap();
        assert_eq!(sim.resolver().model(), CollisionModel::MomentumAverage);
        assert_eq!(sim.bodies().len(), 1);
    }
}
