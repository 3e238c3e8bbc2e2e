use nalgebra::Vector3;

use super::{Derived, Orbit};
use crate::astro::{CartesianState, OrbitalElements, Primary};
use crate::config::KeplerSettings;
use crate::error::{Error, Result};
use crate::math::anomaly::{self, Regime};
use crate::math::geometry::{
    always_find_rotation, angles_from_rotation, normalize_angle, rotation_from_angles,
};

// Eccentricities this close to one are treated as exactly parabolic
const PARABOLIC_TOLERANCE: f64 = 1e-12;

impl<P> Orbit<P> {
    /// Position in the orbital plane, with periapsis along x.
    fn perifocal_position(&self) -> Vector3<f64> {
        let nu = self.derived.true_anomaly;
        let radius = self.derived.slr / (1.0 + self.elements.eccentricity * nu.cos());
        radius * Vector3::new(nu.cos(), nu.sin(), 0.0)
    }

    fn perifocal_velocity(&self) -> Vector3<f64> {
        let nu = self.derived.true_anomaly;
        let ecc = self.elements.eccentricity;
        (self.mu / self.derived.slr).sqrt() * Vector3::new(-nu.sin(), ecc + nu.cos(), 0.0)
    }

    /// Position relative to the primary.
    pub fn relative_position(&self) -> Vector3<f64> {
        self.rotation() * self.perifocal_position()
    }

    /// Velocity relative to the primary.
    pub fn relative_velocity(&self) -> Vector3<f64> {
        self.rotation() * self.perifocal_velocity()
    }

    pub fn relative_state(&self) -> CartesianState {
        CartesianState::new(self.relative_position(), self.relative_velocity())
    }
}

impl<P: Primary> Orbit<P> {
    /// Absolute position, i.e., including the position of the primary (and its
    /// primary, and so on).
    pub fn position(&self) -> Vector3<f64> {
        self.relative_position() + self.primary.position()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.relative_velocity() + self.primary.velocity()
    }

    /// Builds the orbit that passes through the given state, which is taken
    /// relative to the primary.
    pub fn from_state(primary: P, state: &CartesianState, settings: KeplerSettings) -> Result<Self> {
        let elements = elements_from_state(primary.mu(), state)?;
        Self::with_settings(primary, elements, settings)
    }

    /// Instantaneously changes velocity by `delta_v`, and re-derives all six
    /// elements from the new state. If that fails, the orbit is left as it
    /// was.
    pub fn apply_velocity_impulse(&mut self, delta_v: &Vector3<f64>) -> Result<()> {
        let state = self.relative_state().with_velocity_change(delta_v);
        let mut elements = elements_from_state(self.mu, &state)?;
        if elements.regime().is_closed() {
            elements.mean_anomaly = normalize_angle(elements.mean_anomaly);
        }
        let derived = Derived::compute(&elements, self.mu, &self.settings)?;

        self.elements = elements;
        self.derived = derived;
        Ok(())
    }
}

/// Classical elements from a primary-relative state vector, via the angular
/// momentum and eccentricity (Laplace-Runge-Lenz) vectors.
fn elements_from_state(mu: f64, state: &CartesianState) -> Result<OrbitalElements> {
    let position = state.position();
    let velocity = state.velocity();
    let r = position.norm();
    if !(r.is_finite() && r > 0.0 && velocity.norm().is_finite()) {
        return Err(Error::InvalidElements(format!(
            "can't derive an orbit from position {:?} and velocity {:?}",
            position, velocity
        )));
    }

    let ang_mom = position.cross(&velocity);
    let slr = ang_mom.norm_squared() / mu;
    if slr <= 0.0 {
        return Err(Error::InvalidElements(
            "radial trajectories have no orbital plane".to_owned(),
        ));
    }

    // LRL vector = v x h / mu - r/|r|
    let lrl = velocity.cross(&ang_mom) / mu - position / r;
    let mut ecc = lrl.norm();
    let semimajor_axis = if (ecc - 1.0).abs() < PARABOLIC_TOLERANCE {
        ecc = 1.0;
        slr / 2.0
    } else {
        slr / (1.0 - ecc * ecc)
    };

    // Pin the orientation down, then express it as angles. Rebuilding the
    // rotation from those angles gives the frame the orbit will actually use,
    // which matters when the node line is ill-defined.
    let rotation = always_find_rotation(&ang_mom, &lrl, 1e-20);
    let (inclination, arg_periapsis, long_asc_node) = angles_from_rotation(&rotation);
    let frame = rotation_from_angles(inclination, arg_periapsis, long_asc_node);

    let in_plane = frame.inverse_transform_vector(&position);
    let true_anomaly = in_plane.y.atan2(in_plane.x);

    let regime = Regime::from_eccentricity(ecc);
    let true_anomaly = if regime.is_closed() {
        normalize_angle(true_anomaly)
    } else {
        true_anomaly
    };
    let mean_anomaly = anomaly::anomaly_to_mean(anomaly::true_to_anomaly(true_anomaly, ecc), ecc);

    Ok(OrbitalElements {
        semimajor_axis,
        eccentricity: ecc,
        mean_anomaly,
        inclination,
        arg_periapsis,
        long_asc_node,
    })
}
