//! A module for computing simple Keplerian orbits.
//!
//! The important pieces of this module are:
//! - [Orbit], six [OrbitalElements] bound to a primary. The primary is a type
//!   parameter; usually it's a borrowed [Body], but anything implementing
//!   [Primary] works.
//! - [CartesianState], which represents a position and velocity
//! - [NullOrbit], the fixed sentinel at the root of every body hierarchy

use nalgebra::Vector3;

pub mod body;
pub mod elements;
pub mod orbit;
pub mod state;

pub use crate::consts::NEWTON_G;
pub use body::{Body, Trajectory};
pub use elements::OrbitalElements;
pub use orbit::{Orbit, OrbitSummary};
pub use state::CartesianState;

/// Something massive that other things can orbit.
///
/// Positions and velocities are absolute, i.e., relative to the root of the
/// hierarchy, not to this body's own primary.
pub trait Primary {
    /// The mass of this object
    fn mass(&self) -> f64;

    /// The standard gravitational parameter of this object
    fn mu(&self) -> f64 {
        NEWTON_G * self.mass()
    }

    fn position(&self) -> Vector3<f64>;

    fn velocity(&self) -> Vector3<f64>;
}

impl<T> Primary for &T
where
    T: Primary + ?Sized,
{
    fn mass(&self) -> f64 {
        (*self).mass()
    }

    fn mu(&self) -> f64 {
        (*self).mu()
    }

    fn position(&self) -> Vector3<f64> {
        (*self).position()
    }

    fn velocity(&self) -> Vector3<f64> {
        (*self).velocity()
    }
}

/// The degenerate "orbit" of whatever sits at the origin.
///
/// It reports a mass of one kilogram, so that anything that accidentally
/// orbits it still gets a positive gravitational parameter, and its position
/// and velocity are always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NullOrbit;

impl NullOrbit {
    pub const MASS: f64 = 1.0;
}

impl Primary for NullOrbit {
    fn mass(&self) -> f64 {
        Self::MASS
    }

    fn position(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn velocity(&self) -> Vector3<f64> {
        Vector3::zeros()
    }
}

/// A point mass fixed at the origin with no other physical properties.
///
/// Useful for satisfying a [Primary] trait bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass(f64);

impl PointMass {
    pub fn with_mass(mass: f64) -> Self {
        Self(mass)
    }

    pub fn with_mu(mu: f64) -> Self {
        Self(mu / NEWTON_G)
    }
}

impl Primary for PointMass {
    fn mass(&self) -> f64 {
        self.0
    }

    fn position(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn velocity(&self) -> Vector3<f64> {
        Vector3::zeros()
    }
}

/// Whether two primaries are (as far as we can tell) the same body at the
/// same instant.
#[allow(clippy::float_cmp)]
pub fn same_primary(a: &impl Primary, b: &impl Primary) -> bool {
    a.mu() == b.mu() && a.position() == b.position() && a.velocity() == b.velocity()
}
