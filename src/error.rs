//! Error types shared by the orbit engine, the Lambert solver and the
//! transfer searches.
//!
//! Two kinds of failure are kept apart:
//! - [Unsolvable] is an expected outcome of a single Lambert trial. It is a
//!   small `Copy` value, so search loops can pass it around freely.
//! - [Error::NonConvergence] means an iteration cap fired. Retrying the same
//!   inputs will fail the same way.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The top-level error for everything in this crate that isn't configuration
/// or catalog loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    NonConvergence(#[from] NonConvergence),
    #[error("no transfer conic: {0}")]
    Unsolvable(#[from] Unsolvable),
    #[error("no transfer found within a delta-v budget of {max_delta_v} m/s")]
    InfeasibleBudget { max_delta_v: f64 },
    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("transfer endpoints orbit different primaries")]
    PrimaryMismatch,
    #[error("transfer searches need closed orbits, but got eccentricity {ecc}")]
    OpenOrbit { ecc: f64 },
}

/// An iterative routine gave up after hitting its iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{routine} did not converge within {iterations} iterations")]
pub struct NonConvergence {
    pub routine: Routine,
    pub iterations: usize,
}

/// The iterative routines that can fail to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    EllipticKepler,
    HyperbolicKepler,
    SlopeSearch,
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Routine::EllipticKepler => "elliptic Kepler solver",
            Routine::HyperbolicKepler => "hyperbolic Kepler solver",
            Routine::SlopeSearch => "bisection-slope search",
        };
        f.write_str(name)
    }
}

/// Why a Lambert problem has no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unsolvable {
    #[error("endpoint geometry is degenerate")]
    DegenerateGeometry,
    #[error("time of flight and gravitational parameter must be positive")]
    InvalidInput,
    #[error("time of flight not matched within {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// Errors that can occur while loading solver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors that can occur while building a body catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no body named {0:?}")]
    UnknownBody(String),
    #[error("body {body:?} orbits {parent:?}, which is not listed before it")]
    MissingParent { body: String, parent: String },
    #[error("{first:?} and {second:?} don't orbit the same body")]
    NotSiblings { first: String, second: String },
    #[error("body {body:?}: {source}")]
    InvalidBody {
        body: String,
        #[source]
        source: Error,
    },
}
