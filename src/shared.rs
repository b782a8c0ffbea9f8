use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ultraviolet::DVec2;

use crate::body::{Body, Rgb};

/// What a renderer needs to draw one body for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyView {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub mass: f64,
    pub color: Rgb,
    pub border_contact: u8,
    pub trail: Vec<DVec2>,
}

impl From<&Body> for BodyView {
    fn from(body: &Body) -> Self {
        Self {
            pos: body.pos,
            vel: body.vel,
            radius: body.radius,
            mass: body.mass,
            color: body.color,
            border_contact: body.border_contact,
            trail: body.trail().copied().collect(),
        }
    }
}

/// Body collection shared between the simulation thread and its
/// collaborators (control surface, drag input, renderer).
///
/// Every accessor takes the lock for that single access only. Two separate
/// calls may observe the collection in between simulation steps or edits.
#[derive(Clone, Debug, Default)]
pub struct SharedBodies {
    inner: Arc<Mutex<Vec<Body>>>,
}

impl SharedBodies {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bodies)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Body>> {
        // A panicking holder aborts the process, so a poisoned lock still
        // guards a complete value.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn push(&self, body: Body) {
        self.lock().push(body);
    }

    /// Copy of the body at `index`.
    pub fn get(&self, index: usize) -> Option<Body> {
        self.lock().get(index).cloned()
    }

    /// Runs `f` on the body at `index` under the lock.
    pub fn update<R>(&self, index: usize, f: impl FnOnce(&mut Body) -> R) -> Option<R> {
        self.lock().get_mut(index).map(f)
    }

    /// Runs `f` on the whole collection under a single lock.
    pub fn with_all<R>(&self, f: impl FnOnce(&mut [Body]) -> R) -> R {
        let mut bodies = self.lock();
        f(bodies.as_mut_slice())
    }

    /// Index of the last body whose disc contains `point`.
    pub fn pick(&self, point: DVec2) -> Option<usize> {
        self.lock().iter().rposition(|body| body.contains_point(point))
    }

    /// Copies of every body without side effects.
    pub fn snapshot(&self) -> Vec<Body> {
        self.lock().clone()
    }

    /// Builds the per-frame render views and counts down every
    /// border-contact marker by one frame.
    pub fn frame(&self) -> Vec<BodyView> {
        let mut bodies = self.lock();
        bodies
            .iter_mut()
            .map(|body| {
                let view = BodyView::from(&*body);
                body.decay_border_contact();
                view
            })
            .collect()
    }
}

impl From<Vec<Body>> for SharedBodies {
    fn from(bodies: Vec<Body>) -> Self {
        Self::new(bodies)
    }
}
