pub mod body;
pub mod c_api;
pub mod collision;
pub mod config;
pub mod console;
pub mod control;
pub mod drag;
pub mod error;
pub mod forces;
pub mod generator;
pub mod geometry;
pub mod integrator;
pub mod runner;
pub mod shared;
pub mod simulation;

pub use body::{Body, Rgb};
pub use collision::{CollisionModel, CollisionReport, CollisionResolver, PairKey, PairState};
pub use config::SimConfig;
pub use control::{BodyField, ControlHandle, ControlReceiver, RunState, ShutdownFlag};
pub use drag::{DragController, MouseSample};
pub use error::{EditError, GenerateError, SimError};
pub use integrator::Arena;
pub use shared::{BodyView, SharedBodies};
pub use simulation::{Simulation, StepParams};
