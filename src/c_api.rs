//! C ABI for a host application that renders the bodies and feeds mouse input.

use std::{
    ffi::{CStr, c_char},
    ptr, slice,
};

use ultraviolet::DVec2;

use crate::{
    body::Rgb,
    config::SimConfig,
    control::{self, ControlHandle, ControlReceiver, RunState},
    drag::DragController,
    simulation::Simulation,
};

/// Flat per-body record copied out to the host every frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyRecord {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub mass: f64,
    pub color: Rgb,
    pub border_contact: u8,
}

/// Simulation plus the pause channel and drag state the host drives.
#[derive(Debug)]
pub struct SimulationHandle {
    sim: Simulation,
    control: ControlReceiver,
    signals: ControlHandle,
    drag: DragController,
}

impl SimulationHandle {
    pub fn new(config: &SimConfig) -> Option<Self> {
        let sim = match Simulation::from_config(config) {
            Ok(sim) => sim,
            Err(err) => {
                log::error!("cannot create simulation: {err}");
                return None;
            }
        };
        let initial = if config.start_paused {
            RunState::Paused
        } else {
            RunState::Running
        };
        let (signals, control) = control::channel(initial);
        let drag = DragController::new(
            sim.bodies().clone(),
            signals.clone(),
            config.drag,
            config.timestep,
        );
        Some(Self {
            sim,
            control,
            signals,
            drag,
        })
    }
}

fn into_raw(handle: Option<SimulationHandle>) -> *mut SimulationHandle {
    handle.map_or(ptr::null_mut(), |h| Box::into_raw(Box::new(h)))
}

#[unsafe(no_mangle)]
pub extern "C" fn Simulation_Create() -> *mut SimulationHandle {
    into_raw(SimulationHandle::new(&SimConfig::default()))
}

/// Loads a YAML scenario. Returns null when it cannot be read or is invalid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_CreateFromYaml(path: *const c_char) -> *mut SimulationHandle {
    if path.is_null() {
        return ptr::null_mut();
    }
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy();
    match SimConfig::load(&*path) {
        Ok(config) => into_raw(SimulationHandle::new(&config)),
        Err(err) => {
            log::error!("{err:#}");
            ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut SimulationHandle) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// Steps once unless paused. Returns 1 after a step, 0 while paused and
/// -1 on a fatal error, after which the handle must only be destroyed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Step(handle: *mut SimulationHandle) -> i32 {
    let Some(h) = (unsafe { handle.as_mut() }) else {
        return -1;
    };
    if h.control.poll() == RunState::Paused {
        return 0;
    }
    match h.sim.step() {
        Ok(_) => 1,
        Err(err) => {
            log::error!("simulation halted: {err}");
            -1
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const SimulationHandle) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |h| h.sim.bodies().len())
}

/// Copies up to `capacity` bodies into `out` and returns how many were
/// written. Counts down the border-contact markers like a drawn frame.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_CopyBodies(
    handle: *const SimulationHandle,
    out: *mut BodyRecord,
    capacity: usize,
) -> usize {
    let Some(h) = (unsafe { handle.as_ref() }) else {
        return 0;
    };
    if out.is_null() {
        return 0;
    }
    let out = unsafe { slice::from_raw_parts_mut(out, capacity) };

    let frame = h.sim.bodies().frame();
    let n = frame.len().min(capacity);
    for (slot, view) in out.iter_mut().zip(&frame) {
        *slot = BodyRecord {
            x: view.pos.x,
            y: view.pos.y,
            vx: view.vel.x,
            vy: view.vel.y,
            radius: view.radius,
            mass: view.mass,
            color: view.color,
            border_contact: view.border_contact,
        };
    }
    n
}

/// Copies up to `capacity` trail points of body `index` into `out` as
/// interleaved `x, y` pairs (so `out` holds `2 * capacity` doubles).
/// Returns the number of points written.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_CopyTrail(
    handle: *const SimulationHandle,
    index: usize,
    out: *mut f64,
    capacity: usize,
) -> usize {
    let Some(h) = (unsafe { handle.as_ref() }) else {
        return 0;
    };
    if out.is_null() {
        return 0;
    }
    let out = unsafe { slice::from_raw_parts_mut(out, capacity * 2) };

    h.sim
        .bodies()
        .update(index, |body| {
            let mut written = 0;
            for (pair, point) in out.chunks_exact_mut(2).zip(body.trail()) {
                pair[0] = point.x;
                pair[1] = point.y;
                written += 1;
            }
            written
        })
        .unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Pause(handle: *mut SimulationHandle) {
    if let Some(h) = unsafe { handle.as_mut() } {
        h.signals.pause();
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Resume(handle: *mut SimulationHandle) {
    if let Some(h) = unsafe { handle.as_mut() } {
        h.signals.resume();
    }
}

/// Returns 1 while paused as of the last step call, 0 while running and -1
/// for a null handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_IsPaused(handle: *const SimulationHandle) -> i32 {
    match unsafe { handle.as_ref() } {
        Some(h) => i32::from(h.control.state() == RunState::Paused),
        None => -1,
    }
}

/// Starts a drag at the cursor. Returns the grabbed body index or -1.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_DragPress(
    handle: *mut SimulationHandle,
    x: f64,
    y: f64,
) -> i64 {
    let Some(h) = (unsafe { handle.as_mut() }) else {
        return -1;
    };
    h.drag.press(DVec2::new(x, y)).map_or(-1, |i| i as i64)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_DragMove(
    handle: *mut SimulationHandle,
    x: f64,
    y: f64,
    timestamp: f64,
) {
    if let Some(h) = unsafe { handle.as_mut() } {
        h.drag.motion(DVec2::new(x, y), timestamp);
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_DragRelease(
    handle: *mut SimulationHandle,
    x: f64,
    y: f64,
    timestamp: f64,
) {
    if let Some(h) = unsafe { handle.as_mut() } {
        h.drag.release(DVec2::new(x, y), timestamp);
    }
}
