use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{
    control::{ControlReceiver, RunState, ShutdownFlag},
    error::SimError,
    shared::BodyView,
    simulation::Simulation,
};

/// How the step loop paces itself and when it stops on its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOptions {
    /// Wall-clock time per loop iteration. Zero runs flat out.
    pub frame_interval: Duration,
    /// Stop after this many loop iterations (paused ones included).
    pub max_frames: Option<usize>,
}

/// Totals for a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub steps: usize,
    pub contacts: usize,
}

/// Consumer of the per-frame body views, typically a renderer.
pub trait FrameSink {
    fn frame(&mut self, frame: usize, bodies: &[BodyView]);
}

impl<F: FnMut(usize, &[BodyView])> FrameSink for F {
    fn frame(&mut self, frame: usize, bodies: &[BodyView]) {
        self(frame, bodies)
    }
}

/// Runs the fixed-cadence step loop until `shutdown` is requested or the
/// frame budget is spent.
///
/// Each iteration hands a frame to `sink`, applies pending pause/resume
/// signals, and steps once when running. A step is never interrupted; the
/// shutdown flag is checked before the next one starts.
pub fn run(
    sim: &mut Simulation,
    control: &mut ControlReceiver,
    shutdown: &ShutdownFlag,
    options: RunOptions,
    sink: &mut impl FrameSink,
) -> Result<RunSummary, SimError> {
    let mut summary = RunSummary::default();
    log::info!("step loop started, dt = {}", sim.params.dt);

    while !shutdown.is_requested() {
        if options.max_frames.is_some_and(|max| summary.frames >= max) {
            break;
        }
        let started = Instant::now();

        sink.frame(sim.frame, &sim.bodies().frame());

        if control.poll() == RunState::Running {
            match sim.step() {
                Ok(report) => {
                    summary.steps += 1;
                    summary.contacts += report.new_contacts;
                }
                Err(err) => {
                    log::error!("stopping at frame {}: {err}", sim.frame);
                    shutdown.request();
                    return Err(err);
                }
            }
        }
        summary.frames += 1;

        if let Some(rest) = options.frame_interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    log::info!(
        "step loop finished after {} frames ({} steps, {} contacts)",
        summary.frames,
        summary.steps,
        summary.contacts
    );
    Ok(summary)
}
