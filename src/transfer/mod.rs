//! Two-impulse transfers between orbits around the same primary.

use nalgebra::Vector3;

use crate::astro::{same_primary, CartesianState, Orbit, Primary};
use crate::config::LambertSettings;
use crate::error::{Error, Result};

pub mod lambert;
pub mod optimizer;
pub mod search;

pub use lambert::{LambertSolution, TransferDirection};
pub use optimizer::{SearchPhase, TransferOptimizer};

/// A ballistic transfer: burn, coast along a Lambert conic, burn again.
///
/// Velocities are relative to the shared primary.
#[derive(Debug, Clone)]
pub struct Transfer<P> {
    departure: Orbit<P>,
    arrival: Orbit<P>,
    wait_time: f64,
    duration: f64,
    solution: LambertSolution,
    origin_velocity: Vector3<f64>,
    target_velocity: Vector3<f64>,
    departure_thrust: Vector3<f64>,
    arrival_thrust: Vector3<f64>,
    delta_v: f64,
}

/// Transfer that leaves right away and takes `duration` seconds.
pub fn build_transfer<P: Primary + Clone>(
    origin: &Orbit<P>,
    target: &Orbit<P>,
    duration: f64,
) -> Result<Transfer<P>> {
    build_transfer_after(origin, target, 0.0, duration, &LambertSettings::default())
}

/// Transfer that leaves after `wait_time` seconds and takes `duration`
/// seconds. The transfer goes around the primary the same way the origin
/// does.
pub fn build_transfer_after<P: Primary + Clone>(
    origin: &Orbit<P>,
    target: &Orbit<P>,
    wait_time: f64,
    duration: f64,
    settings: &LambertSettings,
) -> Result<Transfer<P>> {
    if !same_primary(origin.primary(), target.primary()) {
        return Err(Error::PrimaryMismatch);
    }

    let departure = origin.propagated(wait_time)?;
    let arrival = target.propagated(wait_time + duration)?;

    let r1 = departure.relative_position();
    let r2 = arrival.relative_position();
    let direction = TransferDirection::Prograde(departure.normal_vector().into_inner());
    let solution =
        lambert::solve_with_direction(&r1, &r2, duration, departure.mu(), direction, settings)?;

    let origin_velocity = departure.relative_velocity();
    let target_velocity = arrival.relative_velocity();
    let departure_thrust = solution.departure_velocity - origin_velocity;
    let arrival_thrust = solution.arrival_velocity - target_velocity;

    Ok(Transfer {
        departure,
        arrival,
        wait_time,
        duration,
        solution,
        origin_velocity,
        target_velocity,
        departure_thrust,
        arrival_thrust,
        delta_v: departure_thrust.norm() + arrival_thrust.norm(),
    })
}

impl<P> Transfer<P> {
    /// The origin orbit at the moment of departure.
    pub fn departure_orbit(&self) -> &Orbit<P> {
        &self.departure
    }

    /// The target orbit at the moment of arrival.
    pub fn arrival_orbit(&self) -> &Orbit<P> {
        &self.arrival
    }

    pub fn wait_time(&self) -> f64 {
        self.wait_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn total_time(&self) -> f64 {
        self.wait_time + self.duration
    }

    pub fn solution(&self) -> &LambertSolution {
        &self.solution
    }

    pub fn departure_velocity(&self) -> Vector3<f64> {
        self.solution.departure_velocity
    }

    pub fn arrival_velocity(&self) -> Vector3<f64> {
        self.solution.arrival_velocity
    }

    pub fn origin_velocity(&self) -> Vector3<f64> {
        self.origin_velocity
    }

    pub fn target_velocity(&self) -> Vector3<f64> {
        self.target_velocity
    }

    pub fn departure_thrust(&self) -> Vector3<f64> {
        self.departure_thrust
    }

    pub fn arrival_thrust(&self) -> Vector3<f64> {
        self.arrival_thrust
    }

    pub fn delta_v(&self) -> f64 {
        self.delta_v
    }
}

impl<P: Primary + Clone> Transfer<P> {
    /// The conic the spacecraft coasts along, positioned at departure.
    pub fn transfer_orbit(&self) -> Result<Orbit<P>> {
        let state = CartesianState::new(
            self.departure.relative_position(),
            self.solution.departure_velocity,
        );
        Orbit::from_state(
            self.departure.primary().clone(),
            &state,
            *self.departure.settings(),
        )
    }
}
