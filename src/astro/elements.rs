use crate::error::{Error, Result};
use crate::math::anomaly::Regime;

/// The six classical orbital elements. Angles are in radians.
///
/// By convention, `semimajor_axis` holds the periapsis distance for parabolic
/// orbits, and is negative for hyperbolic ones.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitalElements {
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    pub mean_anomaly: f64,
    pub inclination: f64,
    pub arg_periapsis: f64,
    pub long_asc_node: f64,
}

impl OrbitalElements {
    pub fn new(
        semimajor_axis: f64,
        eccentricity: f64,
        mean_anomaly: f64,
        inclination: f64,
        arg_periapsis: f64,
        long_asc_node: f64,
    ) -> Self {
        Self {
            semimajor_axis,
            eccentricity,
            mean_anomaly,
            inclination,
            arg_periapsis,
            long_asc_node,
        }
    }

    /// Convenience constructor for data tables, which usually list angles in
    /// degrees.
    pub fn from_degrees(
        semimajor_axis: f64,
        eccentricity: f64,
        mean_anomaly: f64,
        inclination: f64,
        arg_periapsis: f64,
        long_asc_node: f64,
    ) -> Self {
        Self::new(
            semimajor_axis,
            eccentricity,
            mean_anomaly.to_radians(),
            inclination.to_radians(),
            arg_periapsis.to_radians(),
            long_asc_node.to_radians(),
        )
    }

    pub fn regime(&self) -> Regime {
        Regime::from_eccentricity(self.eccentricity)
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            ("semi-major axis", self.semimajor_axis),
            ("eccentricity", self.eccentricity),
            ("mean anomaly", self.mean_anomaly),
            ("inclination", self.inclination),
            ("argument of periapsis", self.arg_periapsis),
            ("longitude of ascending node", self.long_asc_node),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(Error::InvalidElements(format!("{} is {}", name, value)));
            }
        }

        if self.eccentricity < 0.0 {
            return Err(Error::InvalidElements(format!(
                "negative eccentricity {}",
                self.eccentricity
            )));
        }

        let a = self.semimajor_axis;
        let sign_ok = match self.regime() {
            Regime::Hyperbolic => a < 0.0,
            _ => a > 0.0,
        };
        if !sign_ok {
            return Err(Error::InvalidElements(format!(
                "semi-major axis {} doesn't match eccentricity {}",
                a, self.eccentricity
            )));
        }

        Ok(())
    }
}
