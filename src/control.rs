use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
    },
};

use crate::{error::EditError, shared::SharedBodies};

/// Whether the step loop advances the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// Creates a pause/resume channel. The receiver starts in `initial`.
pub fn channel(initial: RunState) -> (ControlHandle, ControlReceiver) {
    let (tx, rx) = mpsc::channel();
    (ControlHandle { tx }, ControlReceiver { rx, state: initial })
}

/// Sending side, held by the control surface and input handlers.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    tx: Sender<RunState>,
}

impl ControlHandle {
    pub fn pause(&self) {
        self.send(RunState::Paused);
    }

    pub fn resume(&self) {
        self.send(RunState::Running);
    }

    pub fn send(&self, state: RunState) {
        if self.tx.send(state).is_err() {
            log::debug!("step loop has exited, dropping {state:?}");
        }
    }
}

/// Receiving side, owned by the step loop and polled at step boundaries.
#[derive(Debug)]
pub struct ControlReceiver {
    rx: Receiver<RunState>,
    state: RunState,
}

impl ControlReceiver {
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Applies every signal queued since the last poll; the latest one wins.
    pub fn poll(&mut self) -> RunState {
        for next in self.rx.try_iter() {
            if next != self.state {
                match next {
                    RunState::Paused => log::info!("pausing"),
                    RunState::Running => log::info!("resuming"),
                }
            }
            self.state = next;
        }
        self.state
    }
}

/// Process-wide stop request shared by every thread of a run.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Body value that the control surface may overwrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyField {
    X,
    Y,
    Vx,
    Vy,
    Mass,
    Radius,
}

impl BodyField {
    pub const ALL: [BodyField; 6] = [
        BodyField::X,
        BodyField::Y,
        BodyField::Vx,
        BodyField::Vy,
        BodyField::Mass,
        BodyField::Radius,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BodyField::X => "x",
            BodyField::Y => "y",
            BodyField::Vx => "vx",
            BodyField::Vy => "vy",
            BodyField::Mass => "mass",
            BodyField::Radius => "radius",
        }
    }
}

impl fmt::Display for BodyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyField {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(BodyField::X),
            "y" => Ok(BodyField::Y),
            "vx" => Ok(BodyField::Vx),
            "vy" => Ok(BodyField::Vy),
            "m" | "mass" => Ok(BodyField::Mass),
            "r" | "rad" | "radius" => Ok(BodyField::Radius),
            _ => Err(EditError::UnknownField(s.to_string())),
        }
    }
}

/// Parses `raw` and writes it into one field of body `index`.
///
/// Nothing is written unless the value is a finite number, and mass and
/// radius must also be positive. Moving a body clears its trail.
pub fn apply_edit(
    bodies: &SharedBodies,
    index: usize,
    field: BodyField,
    raw: &str,
) -> Result<(), EditError> {
    let value: f64 = raw.trim().parse().map_err(|_| EditError::NotANumber {
        field,
        raw: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(EditError::NonFinite { field, value });
    }
    if matches!(field, BodyField::Mass | BodyField::Radius) && value <= 0.0 {
        return Err(EditError::NonPositive { field, value });
    }

    bodies
        .update(index, |body| match field {
            BodyField::X => {
                body.pos.x = value;
                body.clear_trail();
            }
            BodyField::Y => {
                body.pos.y = value;
                body.clear_trail();
            }
            BodyField::Vx => body.vel.x = value,
            BodyField::Vy => body.vel.y = value,
            BodyField::Mass => body.mass = value,
            BodyField::Radius => body.radius = value,
        })
        .ok_or_else(|| EditError::NoSuchBody {
            index,
            bodies: bodies.len(),
        })?;

    log::debug!("body #{index}: {field} = {value}");
    Ok(())
}
