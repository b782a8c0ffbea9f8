use serde::Deserialize;

use crate::body::Body;

/// Fixed rectangular bounds of the simulation, `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub const DEFAULT_WIDTH: f64 = 1600.0;
    pub const DEFAULT_HEIGHT: f64 = 900.0;

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// Folds `pos` back inside `[radius, extent - radius]` by mirroring it about
/// the wall it crossed. Returns true when a wall was hit.
fn reflect_axis(pos: &mut f64, vel: &mut f64, radius: f64, extent: f64) -> bool {
    let mut hit = false;
    let far = extent - radius;

    if *pos > far {
        *pos = far - (*pos - far);
        *vel = -*vel;
        hit = true;
    }
    if *pos < radius {
        *pos = radius + (*pos - radius).abs();
        *vel = -*vel;
        hit = true;
    }

    hit
}

/// Advances the body by one explicit Euler step of its velocity, then
/// bounces it off the arena walls when `reflect` is set.
///
/// The pre-move position is appended to the body's trail.
pub fn integrate(body: &mut Body, dt: f64, arena: &Arena, reflect: bool) {
    body.record_trail();
    body.pos += body.vel * dt;

    if !reflect {
        return;
    }

    let radius = body.radius;
    let hit_x = reflect_axis(&mut body.pos.x, &mut body.vel.x, radius, arena.width);
    let hit_y = reflect_axis(&mut body.pos.y, &mut body.vel.y, radius, arena.height);

    if hit_x || hit_y {
        body.mark_border_contact();
    }
}
