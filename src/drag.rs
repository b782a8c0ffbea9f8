use serde::Deserialize;
use ultraviolet::DVec2;

use crate::{control::ControlHandle, shared::SharedBodies};

/// Number of most recent smoothed samples used to estimate the throw.
pub const RECENT_SAMPLES: usize = 5;

/// One cursor position with the time (in seconds) it was observed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseSample {
    pub pos: DVec2,
    pub timestamp: f64,
}

impl MouseSample {
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            timestamp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Moving-average window applied to the cursor history.
    pub smoothing_window: usize,
    /// Acceleration produced by a unit-length drag lasting one second.
    pub max_acceleration: f64,
    /// Extra factor applied to the throw on release.
    pub release_gain: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 4,
            max_acceleration: 3000.0,
            release_gain: 1.5,
        }
    }
}

/// Trailing moving average over `window` samples. Histories shorter than
/// the window are returned as they are.
pub fn smooth(samples: &[MouseSample], window: usize) -> Vec<MouseSample> {
    if window == 0 || samples.len() < window {
        return samples.to_vec();
    }

    (0..samples.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &samples[start..=i];
            let sum = slice.iter().fold(DVec2::zero(), |acc, s| acc + s.pos);
            MouseSample {
                pos: sum / slice.len() as f64,
                timestamp: samples[i].timestamp,
            }
        })
        .collect()
}

/// Estimates the acceleration to give a body thrown with the cursor.
///
/// The direction is the mean movement over the last few smoothed samples;
/// the magnitude is `max_acceleration` divided by how long those samples
/// took. Too little history, or no elapsed time, yields zero.
pub fn drag_acceleration(samples: &[MouseSample], window: usize, max_acceleration: f64) -> DVec2 {
    if samples.len() < window.max(2) {
        log::debug!("not enough drag samples ({})", samples.len());
        return DVec2::zero();
    }

    let smoothed = smooth(samples, window);
    let recent = &smoothed[smoothed.len().saturating_sub(RECENT_SAMPLES)..];

    let elapsed = (recent[0].timestamp - recent[recent.len() - 1].timestamp).abs();
    if elapsed <= 0.0 {
        log::debug!("drag samples span no time");
        return DVec2::zero();
    }

    let total = recent
        .windows(2)
        .fold(DVec2::zero(), |acc, w| acc + (w[1].pos - w[0].pos));
    let mut mean = total / (recent.len() - 1) as f64;

    let norm = mean.mag();
    if norm > 0.0 {
        mean = mean / norm;
    }

    mean * (max_acceleration / elapsed)
}

/// Lets the user grab a body with the cursor, move it, and throw it.
///
/// Pressing pauses the simulation and releasing resumes it.
#[derive(Debug)]
pub struct DragController {
    bodies: SharedBodies,
    control: ControlHandle,
    config: DragConfig,
    dt: f64,
    held: Option<usize>,
    samples: Vec<MouseSample>,
}

impl DragController {
    pub fn new(bodies: SharedBodies, control: ControlHandle, config: DragConfig, dt: f64) -> Self {
        Self {
            bodies,
            control,
            config,
            dt,
            held: None,
            samples: Vec::new(),
        }
    }

    pub fn held(&self) -> Option<usize> {
        self.held
    }

    /// Picks the body under the cursor, if any.
    pub fn press(&mut self, cursor: DVec2) -> Option<usize> {
        self.control.pause();
        self.samples.clear();
        self.held = self.bodies.pick(cursor);
        if let Some(index) = self.held {
            log::debug!("grabbed body #{index} at ({:.0}, {:.0})", cursor.x, cursor.y);
        }
        self.held
    }

    /// Moves the held body onto the cursor.
    pub fn motion(&mut self, cursor: DVec2, timestamp: f64) {
        let Some(index) = self.held else {
            return;
        };
        self.samples.push(MouseSample {
            pos: cursor,
            timestamp,
        });
        self.bodies.update(index, |body| body.pos = cursor);
    }

    /// Drops the held body: its velocity is reset and replaced by the throw
    /// estimated from the cursor history. Returns the applied acceleration.
    pub fn release(&mut self, cursor: DVec2, timestamp: f64) -> Option<DVec2> {
        let thrown = self.held.take().map(|index| {
            self.samples.push(MouseSample {
                pos: cursor,
                timestamp,
            });
            let acc = drag_acceleration(
                &self.samples,
                self.config.smoothing_window,
                self.config.max_acceleration,
            ) * self.config.release_gain;
            let dt = self.dt;

            self.bodies.update(index, |body| {
                body.vel = DVec2::zero();
                body.accel(acc * dt);
                body.clear_trail();
            });
            log::debug!("released body #{index} with acceleration ({:.1}, {:.1})", acc.x, acc.y);
            acc
        });

        self.samples.clear();
        self.control.resume();
        thrown
    }
}
