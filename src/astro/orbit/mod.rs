use std::f64::consts::TAU;
use std::fmt;

use nalgebra::{Rotation3, Unit, Vector3};

use super::{OrbitalElements, Primary};
use crate::config::KeplerSettings;
use crate::error::{Error, Result};
use crate::math::anomaly::{self, Regime};
use crate::math::geometry::{normalize_angle, rotation_from_angles};

mod state_methods;

/// A Keplerian orbit around some primary.
///
/// The six elements are the only authoritative state. Everything else
/// (periapsis, period, anomalies, ...) is recomputed from them whenever they
/// change, so the getters are all cheap.
#[derive(Debug, Clone, Copy)]
pub struct Orbit<P> {
    primary: P,
    elements: OrbitalElements,
    mu: f64,
    settings: KeplerSettings,
    derived: Derived,
}

#[derive(Debug, Clone, Copy)]
struct Derived {
    regime: Regime,
    /// Encodes the orientation of the orbit: it moves the xy plane to the
    /// orbital plane, and x to point towards periapsis.
    rotation: Rotation3<f64>,
    /// Semi-latus rectum
    slr: f64,
    periapsis: f64,
    apoapsis: Option<f64>,
    period: Option<f64>,
    mean_motion: f64,
    /// E, D or F, depending on the regime
    anomaly: f64,
    true_anomaly: f64,
    time_since_periapsis: f64,
}

impl Derived {
    fn compute(elements: &OrbitalElements, mu: f64, settings: &KeplerSettings) -> Result<Self> {
        let a = elements.semimajor_axis;
        let ecc = elements.eccentricity;
        let regime = elements.regime();

        let (slr, periapsis, apoapsis, mean_motion) = match regime {
            Regime::Circular | Regime::Elliptic => (
                a * (1.0 - ecc * ecc),
                a * (1.0 - ecc),
                Some(a * (1.0 + ecc)),
                (mu / a.powi(3)).sqrt(),
            ),
            // Here a is the periapsis distance
            Regime::Parabolic => (2.0 * a, a, None, (mu / (2.0 * a.powi(3))).sqrt()),
            Regime::Hyperbolic => (
                a * (1.0 - ecc * ecc),
                a * (1.0 - ecc),
                None,
                (mu / (-a).powi(3)).sqrt(),
            ),
        };
        let period = if regime.is_closed() {
            Some(TAU / mean_motion)
        } else {
            None
        };

        let anomaly = anomaly::derive_anomaly(elements.mean_anomaly, ecc, settings)?;
        let true_anomaly = anomaly::anomaly_to_true(anomaly, ecc);

        Ok(Self {
            regime,
            rotation: rotation_from_angles(
                elements.inclination,
                elements.arg_periapsis,
                elements.long_asc_node,
            ),
            slr,
            periapsis,
            apoapsis,
            period,
            mean_motion,
            anomaly,
            true_anomaly,
            time_since_periapsis: elements.mean_anomaly / mean_motion,
        })
    }
}

/// Everything there is to know about an orbit at a glance, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSummary {
    pub elements: OrbitalElements,
    pub mu: f64,
    pub regime: Regime,
    pub periapsis: f64,
    pub apoapsis: Option<f64>,
    pub period: Option<f64>,
    pub mean_motion: f64,
    pub anomaly: f64,
    pub true_anomaly: f64,
    pub time_since_periapsis: f64,
}

impl<P: Primary> Orbit<P> {
    /// Builds an orbit from its elements, with angles in radians.
    pub fn new(
        primary: P,
        semimajor_axis: f64,
        eccentricity: f64,
        mean_anomaly: f64,
        inclination: f64,
        arg_periapsis: f64,
        long_asc_node: f64,
    ) -> Result<Self> {
        let elements = OrbitalElements::new(
            semimajor_axis,
            eccentricity,
            mean_anomaly,
            inclination,
            arg_periapsis,
            long_asc_node,
        );
        Self::from_elements(primary, elements)
    }

    pub fn from_elements(primary: P, elements: OrbitalElements) -> Result<Self> {
        Self::with_settings(primary, elements, KeplerSettings::default())
    }

    pub fn with_settings(
        primary: P,
        mut elements: OrbitalElements,
        settings: KeplerSettings,
    ) -> Result<Self> {
        let mu = primary.mu();
        if !(mu.is_finite() && mu > 0.0) {
            return Err(Error::InvalidElements(format!(
                "primary has gravitational parameter {}",
                mu
            )));
        }
        elements.validate()?;
        if elements.regime().is_closed() {
            elements.mean_anomaly = normalize_angle(elements.mean_anomaly);
        }

        let derived = Derived::compute(&elements, mu, &settings)?;
        Ok(Self {
            primary,
            elements,
            mu,
            settings,
            derived,
        })
    }

    /// Replaces the elements wholesale. On failure, the orbit is unchanged.
    fn replace_elements(&mut self, elements: OrbitalElements) -> Result<()> {
        let derived = Derived::compute(&elements, self.mu, &self.settings)?;
        self.elements = elements;
        self.derived = derived;
        Ok(())
    }

    // -- Time evolution --

    /// Advances the orbit by `delta_t` seconds (which may be negative).
    pub fn add_time(&mut self, delta_t: f64) -> Result<()> {
        let advance = delta_t * self.derived.mean_motion;
        let mean_anomaly = if self.is_closed() {
            normalize_angle(self.elements.mean_anomaly + advance % TAU)
        } else {
            self.elements.mean_anomaly + advance
        };

        self.replace_elements(OrbitalElements {
            mean_anomaly,
            ..self.elements
        })
    }

    pub fn sub_time(&mut self, delta_t: f64) -> Result<()> {
        self.add_time(-delta_t)
    }

    /// Returns a copy of this orbit, `delta_t` seconds later.
    pub fn propagated(&self, delta_t: f64) -> Result<Self>
    where
        P: Clone,
    {
        let mut orbit = self.clone();
        orbit.add_time(delta_t)?;
        Ok(orbit)
    }

    pub fn summary(&self) -> OrbitSummary {
        OrbitSummary {
            elements: self.elements,
            mu: self.mu,
            regime: self.derived.regime,
            periapsis: self.derived.periapsis,
            apoapsis: self.derived.apoapsis,
            period: self.derived.period,
            mean_motion: self.derived.mean_motion,
            anomaly: self.derived.anomaly,
            true_anomaly: self.derived.true_anomaly,
            time_since_periapsis: self.derived.time_since_periapsis,
        }
    }
}

impl<P> Orbit<P> {
    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn settings(&self) -> &KeplerSettings {
        &self.settings
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn regime(&self) -> Regime {
        self.derived.regime
    }

    pub fn is_closed(&self) -> bool {
        self.derived.regime.is_closed()
    }

    // -- Axes and vectors --

    pub fn rotation(&self) -> Rotation3<f64> {
        self.derived.rotation
    }

    pub fn periapse_vector(&self) -> Unit<Vector3<f64>> {
        self.rotation() * Vector3::x_axis()
    }

    pub fn normal_vector(&self) -> Unit<Vector3<f64>> {
        self.rotation() * Vector3::z_axis()
    }

    // -- Orbital elements --

    pub fn semimajor_axis(&self) -> f64 {
        self.elements.semimajor_axis
    }

    pub fn eccentricity(&self) -> f64 {
        self.elements.eccentricity
    }

    pub fn mean_anomaly(&self) -> f64 {
        self.elements.mean_anomaly
    }

    pub fn inclination(&self) -> f64 {
        self.elements.inclination
    }

    pub fn arg_periapsis(&self) -> f64 {
        self.elements.arg_periapsis
    }

    pub fn long_asc_node(&self) -> f64 {
        self.elements.long_asc_node
    }

    // -- Derived quantities --

    pub fn semilatus_rectum(&self) -> f64 {
        self.derived.slr
    }

    pub fn periapsis(&self) -> f64 {
        self.derived.periapsis
    }

    pub fn apoapsis(&self) -> Option<f64> {
        self.derived.apoapsis
    }

    pub fn period(&self) -> Option<f64> {
        self.derived.period
    }

    pub fn mean_motion(&self) -> f64 {
        self.derived.mean_motion
    }

    /// The eccentric anomaly, or its parabolic (D) or hyperbolic (F) analog.
    pub fn anomaly(&self) -> f64 {
        self.derived.anomaly
    }

    pub fn true_anomaly(&self) -> f64 {
        self.derived.true_anomaly
    }

    pub fn time_since_periapsis(&self) -> f64 {
        self.derived.time_since_periapsis
    }

    pub fn energy(&self) -> f64 {
        match self.derived.regime {
            Regime::Parabolic => 0.0,
            _ => -self.mu / (2.0 * self.elements.semimajor_axis),
        }
    }

    pub fn angular_momentum(&self) -> f64 {
        // l = h^2/mu
        (self.derived.slr * self.mu).sqrt()
    }

    pub fn periapsis_velocity(&self) -> f64 {
        // Since h = r cross v, which are perpendicular at apses
        self.angular_momentum() / self.periapsis()
    }

    pub fn apoapsis_velocity(&self) -> Option<f64> {
        self.apoapsis().map(|r_a| self.angular_momentum() / r_a)
    }
}

impl fmt::Display for OrbitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.elements;
        writeln!(f, "- Regime: {:?}", self.regime)?;
        writeln!(f, "- Semi-major axis: {}", e.semimajor_axis)?;
        writeln!(f, "- Orbital eccentricity: {}", e.eccentricity)?;
        writeln!(f, "- Mean anomaly: {}", e.mean_anomaly.to_degrees())?;
        writeln!(f, "- Orbital inclination: {}", e.inclination.to_degrees())?;
        writeln!(f, "- Argument of periapsis: {}", e.arg_periapsis.to_degrees())?;
        writeln!(f, "- LAN: {}", e.long_asc_node.to_degrees())?;
        writeln!(f, "- Gravitational parameter: {}", self.mu)?;
        writeln!(f, "- Periapsis: {}", self.periapsis)?;
        writeln!(f, "- Apoapsis: {:?}", self.apoapsis)?;
        writeln!(f, "- Sidereal orbital period: {:?}", self.period)?;
        writeln!(f, "- Mean motion: {}", self.mean_motion)?;
        writeln!(f, "- Anomaly (E/D/F): {}", self.anomaly)?;
        writeln!(f, "- True anomaly: {}", self.true_anomaly.to_degrees())?;
        write!(f, "- Time since periapsis: {}", self.time_since_periapsis)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::astro::PointMass;
    use crate::consts::{AU, EARTH_MASS, SOL_MASS, SOL_MU};

    fn sun() -> PointMass {
        PointMass::with_mass(SOL_MASS)
    }

    #[test]
    fn test_orbit_shape() {
        // Circular orbit
        let orbit = Orbit::new(sun(), 10.0 * AU, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert!(orbit.is_closed());
        assert_eq!(orbit.regime(), Regime::Circular);
        assert_relative_eq!(orbit.semilatus_rectum(), 10.0 * AU);
        assert_relative_eq!(orbit.periapsis(), 10.0 * AU);
        assert_relative_eq!(orbit.apoapsis().unwrap(), 10.0 * AU);

        // Elliptic orbit, e = 3/5
        let orbit = Orbit::new(sun(), 10.0 * AU, 0.6, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(orbit.semilatus_rectum(), 6.4 * AU);
        assert_relative_eq!(orbit.periapsis(), 4.0 * AU);
        assert_relative_eq!(orbit.apoapsis().unwrap(), 16.0 * AU);

        // Parabolic orbit, a holds the periapsis
        let orbit = Orbit::new(sun(), 5.0 * AU, 1.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert!(!orbit.is_closed());
        assert_relative_eq!(orbit.semilatus_rectum(), 10.0 * AU);
        assert_relative_eq!(orbit.periapsis(), 5.0 * AU);
        assert_eq!(orbit.apoapsis(), None);
        assert_eq!(orbit.period(), None);
        assert_eq!(orbit.energy(), 0.0);

        // Hyperbolic orbit, e = 5/3
        let orbit = Orbit::new(sun(), -9.0 * AU, 5.0 / 3.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(orbit.semilatus_rectum(), 16.0 * AU);
        assert_relative_eq!(orbit.periapsis(), 6.0 * AU);
        assert_eq!(orbit.apoapsis(), None);
        assert!(orbit.energy() > 0.0);
    }

    #[test]
    fn test_physical_quantities() {
        let orbit = Orbit::new(sun(), AU, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(orbit.mu(), SOL_MU);
        // Energy in a circular orbit is: -mu/2r
        assert_relative_eq!(orbit.energy(), -SOL_MU / 2.0 / AU);
        // Angular momentum in a circular orbit is: sqrt(mu * r)
        assert_relative_eq!(orbit.angular_momentum(), (SOL_MU * AU).sqrt());
        assert_relative_eq!(
            orbit.period().unwrap(),
            crate::consts::get_period(AU, SOL_MU),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            orbit.periapsis_velocity(),
            orbit.apoapsis_velocity().unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_invalid_elements() {
        let bad = Orbit::new(sun(), -AU, 0.5, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(bad, Err(Error::InvalidElements(_))));

        let massless = Orbit::new(PointMass::with_mass(0.0), AU, 0.5, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(massless, Err(Error::InvalidElements(_))));

        let nan = Orbit::new(sun(), AU, f64::NAN, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(nan, Err(Error::InvalidElements(_))));
    }

    #[test]
    fn test_mean_anomaly_normalized() {
        let orbit = Orbit::new(sun(), AU, 0.1, -PI / 2.0, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(orbit.mean_anomaly(), 1.5 * PI);

        let orbit = Orbit::new(sun(), AU, 0.1, 5.0 * PI, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(orbit.mean_anomaly(), PI, max_relative = 1e-12);

        // Open orbits keep their sign: negative means "before periapsis"
        let orbit = Orbit::new(sun(), -AU, 1.5, -2.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(orbit.mean_anomaly(), -2.0);
        assert!(orbit.true_anomaly() < 0.0);
    }

    #[test]
    fn test_earth_at_periapsis() {
        // Earth's mass doesn't enter into it; it's the sun we're orbiting
        assert!(EARTH_MASS > 0.0);
        let earth = Orbit::new(sun(), 1.0007 * AU, 0.01704, 0.0, 0.0, 0.0, 0.0).unwrap();
        let expected = (1.0 - 0.01704) * 1.0007 * AU;
        assert_relative_eq!(earth.position().norm(), expected, max_relative = 1e-3);
        assert_relative_eq!(earth.time_since_periapsis(), 0.0);
    }

    #[test]
    fn test_circular_antipodes() {
        let radius = 2.5 * AU;
        let make_orbit = |mean_anomaly| {
            Orbit::new(sun(), radius, 0.0, mean_anomaly, 0.4, 1.1, 2.3).unwrap()
        };

        let here = make_orbit(0.0).position();
        let there = make_orbit(PI).position();
        assert_relative_eq!(here.norm(), radius, max_relative = 1e-12);
        assert_relative_eq!(there.norm(), radius, max_relative = 1e-12);
        assert_relative_eq!(here, -there, epsilon = 1e-12 * radius);
    }

    #[test]
    fn test_time_reversal() {
        let orbit = Orbit::new(sun(), 1.3 * AU, 0.2, 1.0, 0.1, 0.2, 0.3).unwrap();
        let period = orbit.period().unwrap();

        for t in [1.0, 60.0, 86_400.0, period / 3.0, period - 1.0, period] {
            let mut moved = orbit;
            moved.add_time(t).unwrap();
            moved.sub_time(t).unwrap();
            assert_relative_eq!(moved.mean_anomaly(), orbit.mean_anomaly(), epsilon = 1e-9);
            assert_relative_eq!(moved.position(), orbit.position(), max_relative = 1e-8);
        }

        // Zero is a no-op
        let mut still = orbit;
        still.add_time(0.0).unwrap();
        still.add_time(0.0).unwrap();
        assert_eq!(still.mean_anomaly(), orbit.mean_anomaly());
    }

    #[test]
    fn test_full_period_returns_home() {
        let orbit = Orbit::new(sun(), AU, 0.5, 0.3, 0.2, 0.1, 0.0).unwrap();
        let later = orbit.propagated(orbit.period().unwrap()).unwrap();
        assert_relative_eq!(later.position(), orbit.position(), max_relative = 1e-9);
        assert_relative_eq!(later.velocity(), orbit.velocity(), max_relative = 1e-9);

        let half = orbit.propagated(orbit.period().unwrap() / 2.0).unwrap();
        assert_relative_eq!(half.mean_anomaly(), 0.3 + PI, max_relative = 1e-12);
    }

    #[test]
    fn test_open_orbits_propagate() {
        for (a, ecc) in [(2.0 * AU, 1.0), (-2.0 * AU, 1.2)] {
            let orbit = Orbit::new(sun(), a, ecc, -1.0, 0.0, 0.0, 0.0).unwrap();
            let later = orbit.propagated(1.0 / orbit.mean_motion()).unwrap();
            assert_relative_eq!(later.mean_anomaly(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(later.position().norm(), later.periapsis(), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_vis_viva() {
        // v^2 = mu (2/r - 1/a), or 2 mu / r for parabolas
        let cases = [(AU, 0.0), (AU, 0.3), (AU, 0.999), (AU, 1.0), (-AU, 1.7)];
        for (a, ecc) in cases {
            for mean_anomaly in [0.0, 0.4, 2.0, 4.0] {
                let orbit = Orbit::new(sun(), a, ecc, mean_anomaly, 0.5, 0.6, 0.7).unwrap();
                let r = orbit.position().norm();
                let v2 = orbit.velocity().norm_squared();
                let expected = if orbit.regime() == Regime::Parabolic {
                    2.0 * SOL_MU / r
                } else {
                    SOL_MU * (2.0 / r - 1.0 / a)
                };
                assert_relative_eq!(v2, expected, max_relative = 1e-9);

                // The orbit should be moving in the direction of its normal
                let h = orbit.position().cross(&orbit.velocity());
                assert_relative_eq!(h.normalize(), orbit.normal_vector().into_inner(), epsilon = 1e-9);
                assert_relative_eq!(h.norm(), orbit.angular_momentum(), max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_summary() {
        let orbit = Orbit::new(sun(), AU, 0.2, 1.0, 0.1, 0.2, 0.3).unwrap();
        let summary = orbit.summary();
        assert_eq!(summary.elements, *orbit.elements());
        assert_eq!(summary.period, orbit.period());
        assert_eq!(summary.regime, Regime::Elliptic);
        let text = summary.to_string();
        assert!(text.contains("- Semi-major axis: "));
        assert!(text.contains("- Sidereal orbital period: Some("));
    }
}
