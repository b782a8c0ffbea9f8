use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use ultraviolet::DVec2;

use crate::{body::Body, error::SimError, geometry};

/// Velocity update applied when two bodies first make contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionModel {
    /// Each body leaves with the kinetic energy the other one brought in,
    /// travelling along the other body's incoming direction.
    /// Does not conserve momentum in general.
    #[default]
    KineticExchange,
    /// Both bodies leave with the mass-weighted mean velocity.
    MomentumAverage,
}

/// Velocity a body of `mass` gets when handed `energy`, pointed along `along`.
/// A zero `along` has no direction, so the speed is split over both axes.
fn redirect(energy: f64, mass: f64, along: DVec2) -> DVec2 {
    let ideal = (2.0 * energy / mass).sqrt();
    let speed = along.mag();
    if speed == 0.0 {
        return DVec2::new(ideal / 2.0, ideal / 2.0);
    }
    along * (ideal / speed)
}

/// Computes post-contact velocities `(v1', v2')` for the pair `(a, b)`.
pub fn exchange_velocities(model: CollisionModel, a: &Body, b: &Body) -> (DVec2, DVec2) {
    match model {
        CollisionModel::KineticExchange => (
            redirect(b.kinetic_energy(), a.mass, b.vel),
            redirect(a.kinetic_energy(), b.mass, a.vel),
        ),
        CollisionModel::MomentumAverage => {
            let v = (a.vel * a.mass + b.vel * b.mass) / (a.mass + b.mass);
            (v, v)
        }
    }
}

/// Unordered pair of body indices, stored smallest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(usize, usize);

impl PairKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn first(&self) -> usize {
        self.0
    }

    pub fn second(&self) -> usize {
        self.1
    }
}

/// Pairs whose velocities were already exchanged, with the center distance
/// recorded at that moment.
#[derive(Clone, Debug, Default)]
pub struct PairState {
    contacts: HashMap<PairKey, f64>,
}

impl PairState {
    pub fn distance(&self, key: PairKey) -> Option<f64> {
        self.contacts.get(&key).copied()
    }

    pub fn contains(&self, key: PairKey) -> bool {
        self.contacts.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.contacts.keys().copied()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    fn record(&mut self, key: PairKey, distance: f64) {
        self.contacts.insert(key, distance);
    }

    /// Drops every pair not in `keep`, returning how many were dropped.
    fn retain(&mut self, keep: &HashSet<PairKey>) -> usize {
        let before = self.contacts.len();
        self.contacts.retain(|key, _| keep.contains(key));
        before - self.contacts.len()
    }
}

/// Counters from one resolver pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Pairs detected for the first time; velocities were exchanged.
    pub new_contacts: usize,
    /// Pairs still in contact from an earlier step; only re-separated.
    pub continuing: usize,
    /// Pairs forgotten because they no longer overlap.
    pub released: usize,
}

fn pair_mut(bodies: &mut [Body], i: usize, k: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < k);
    let (head, tail) = bodies.split_at_mut(k);
    (&mut head[i], &mut tail[0])
}

/// Detects overlapping bodies, pushes them apart and exchanges velocities
/// once per contact. A pair that stays in contact over several steps is
/// only re-separated until it comes apart.
#[derive(Clone, Debug, Default)]
pub struct CollisionResolver {
    model: CollisionModel,
    contacts: PairState,
}

impl CollisionResolver {
    pub fn new(model: CollisionModel) -> Self {
        Self {
            model,
            contacts: PairState::default(),
        }
    }

    pub fn model(&self) -> CollisionModel {
        self.model
    }

    pub fn contacts(&self) -> &PairState {
        &self.contacts
    }

    /// Forgets every remembered contact.
    pub fn reset(&mut self) {
        self.contacts.clear();
    }

    /// Runs one resolver pass over all unordered pairs.
    ///
    /// Fails when a remembered pair points at a body that no longer exists;
    /// the pair table is then out of step with the bodies and cannot be trusted.
    pub fn resolve(&mut self, bodies: &mut [Body]) -> Result<CollisionReport, SimError> {
        let n = bodies.len();
        if let Some(stale) = self.contacts.keys().find(|key| key.second() >= n) {
            return Err(SimError::StalePair {
                first: stale.first(),
                second: stale.second(),
                bodies: n,
            });
        }

        let mut report = CollisionReport::default();
        let mut touched = vec![false; n];
        let mut still_in_contact = HashSet::new();

        for i in 0..n {
            for k in (i + 1)..n {
                let (a, b) = pair_mut(bodies, i, k);
                if !geometry::overlaps(a.pos, a.radius, b.pos, b.radius) {
                    continue;
                }

                touched[i] = true;
                touched[k] = true;
                a.colliding += 1;
                b.colliding += 1;

                let (p1, p2) = geometry::separate(a.pos, a.radius, b.pos, b.radius);
                a.pos = p1;
                b.pos = p2;
                let distance = geometry::distance(p1, p2);

                let key = PairKey::new(i, k);
                match self.contacts.distance(key) {
                    Some(previous) => {
                        if distance < previous {
                            log::trace!(
                                "pair ({i}, {k}) closing in: {previous:.3} -> {distance:.3}"
                            );
                        } else {
                            log::trace!(
                                "pair ({i}, {k}) moving apart: {previous:.3} -> {distance:.3}"
                            );
                        }
                        report.continuing += 1;
                    }
                    None => {
                        let (v1, v2) = exchange_velocities(self.model, a, b);
                        log::debug!(
                            "contact ({i}, {k}): v1 {:?} -> {:?}, v2 {:?} -> {:?}",
                            a.vel,
                            v1,
                            b.vel,
                            v2
                        );
                        a.vel = v1;
                        b.vel = v2;
                        self.contacts.record(key, distance);
                        report.new_contacts += 1;
                    }
                }
                still_in_contact.insert(key);
            }
        }

        for (body, touched) in bodies.iter_mut().zip(touched) {
            if !touched {
                body.colliding = 0;
            }
        }

        self.verify_tracked(&still_in_contact)?;
        report.released = self.contacts.retain(&still_in_contact);
        Ok(report)
    }

    /// Every pair in contact this step must have a remembered distance.
    fn verify_tracked(&self, in_contact: &HashSet<PairKey>) -> Result<(), SimError> {
        match in_contact.iter().find(|key| !self.contacts.contains(**key)) {
            Some(key) => Err(SimError::UntrackedContact {
                first: key.first(),
                second: key.second(),
            }),
            None => Ok(()),
        }
    }
}
