use std::fmt;

use crate::control::BodyField;

/// Fatal fault in the simulation step. The step loop stops on these.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// A remembered contact refers to a body index past the end of the collection.
    StalePair {
        first: usize,
        second: usize,
        bodies: usize,
    },
    /// A pair seen in contact this step has no entry in the contact table.
    UntrackedContact { first: usize, second: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::StalePair { first, second, bodies } => write!(
                f,
                "contact table holds pair ({first}, {second}) but only {bodies} bodies exist"
            ),
            SimError::UntrackedContact { first, second } => {
                write!(
                    f,
                    "pair ({first}, {second}) is in contact but missing from the contact table"
                )
            }
        }
    }
}

impl std::error::Error for SimError {}

/// An edit from the control surface that was rejected. The body is untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum EditError {
    NotANumber { field: BodyField, raw: String },
    NonFinite { field: BodyField, value: f64 },
    NonPositive { field: BodyField, value: f64 },
    NoSuchBody { index: usize, bodies: usize },
    UnknownField(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::NotANumber { field, raw } => write!(f, "{field}: '{raw}' is not a number"),
            EditError::NonFinite { field, value } => write!(f, "{field}: {value} is not finite"),
            EditError::NonPositive { field, value } => {
                write!(f, "{field}: {value} must be positive")
            }
            EditError::NoSuchBody { index, bodies } => {
                write!(f, "no body #{index} (there are {bodies})")
            }
            EditError::UnknownField(name) => write!(f, "unknown field '{name}'"),
        }
    }
}

impl std::error::Error for EditError {}

/// Body generation gave up before placing every body.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerateError {
    NoRoom { placed: usize, requested: usize, attempts: usize },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::NoRoom { placed, requested, attempts } => write!(
                f,
                "placed {placed} of {requested} bodies, \
                 no free spot found after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for GenerateError {}
