//! Invariants of the orbit engine and the Lambert solver, over randomly
//! generated orbits.

use nalgebra::Vector3;
use proptest::prelude::*;

use rust_kepler::astro::PointMass;
use rust_kepler::config::KeplerSettings;
use rust_kepler::consts::{AU, DAY, SOL_MU};
use rust_kepler::math::anomaly::{eccentric_to_mean, mean_to_eccentric};
use rust_kepler::transfer::lambert;
use rust_kepler::{CartesianState, Orbit};

fn sun() -> PointMass {
    PointMass::with_mu(SOL_MU)
}

fn close(a: &Vector3<f64>, b: &Vector3<f64>, relative: f64) -> bool {
    (a - b).norm() <= relative * a.norm().max(b.norm())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Solving Kepler's equation and plugging the answer back in gives the
    /// same mean anomaly.
    #[test]
    fn prop_kepler_equation(
        mean_anomaly in 0.0f64..std::f64::consts::TAU,
        ecc in 0.001f64..0.99,
    ) {
        let settings = KeplerSettings::default();
        let eccentric = mean_to_eccentric(mean_anomaly, ecc, &settings).unwrap();
        prop_assert!((eccentric_to_mean(eccentric, ecc) - mean_anomaly).abs() < 1e-9);
    }

    /// Elements -> state -> elements leaves position and velocity alone.
    #[test]
    fn prop_state_round_trip(
        a_au in 0.3f64..5.0,
        ecc in 0.0f64..0.95,
        mean_anomaly in -3.0f64..3.0,
        incl in 0.01f64..3.1,
        argp in 0.0f64..6.2,
        lan in 0.0f64..6.2,
    ) {
        let orbit = Orbit::new(sun(), a_au * AU, ecc, mean_anomaly, incl, argp, lan).unwrap();
        let state = orbit.relative_state();
        let rebuilt = Orbit::from_state(sun(), &state, KeplerSettings::default()).unwrap();

        prop_assert!(close(&rebuilt.position(), &orbit.position(), 1e-7));
        prop_assert!(close(&rebuilt.velocity(), &orbit.velocity(), 1e-7));
        prop_assert!((rebuilt.semimajor_axis() / orbit.semimajor_axis() - 1.0).abs() < 1e-7);
    }

    /// Hyperbolic orbits survive the same round trip.
    #[test]
    fn prop_hyperbolic_round_trip(
        a_au in 0.3f64..5.0,
        ecc in 1.05f64..4.0,
        mean_anomaly in -5.0f64..5.0,
        incl in 0.01f64..3.1,
    ) {
        let orbit = Orbit::new(sun(), -a_au * AU, ecc, mean_anomaly, incl, 0.4, 1.1).unwrap();
        let rebuilt =
            Orbit::from_state(sun(), &orbit.relative_state(), KeplerSettings::default()).unwrap();
        prop_assert!(close(&rebuilt.position(), &orbit.position(), 1e-7));
        prop_assert!(close(&rebuilt.velocity(), &orbit.velocity(), 1e-7));
    }

    /// Propagating in two steps is the same as propagating in one.
    #[test]
    fn prop_propagation_composes(
        ecc in 0.0f64..0.9,
        first in -400.0f64..400.0,
        second in -400.0f64..400.0,
    ) {
        let orbit = Orbit::new(sun(), AU, ecc, 0.3, 0.2, 0.1, 0.5).unwrap();
        let stepped = orbit
            .propagated(first * DAY)
            .and_then(|o| o.propagated(second * DAY))
            .unwrap();
        let direct = orbit.propagated((first + second) * DAY).unwrap();
        prop_assert!(close(&stepped.position(), &direct.position(), 1e-8));
    }

    /// Energy and angular momentum don't change along an orbit.
    #[test]
    fn prop_conserved_quantities(ecc in 0.0f64..0.9, elapsed in 0.0f64..1000.0) {
        let orbit = Orbit::new(sun(), 2.0 * AU, ecc, 1.0, 0.5, 0.5, 0.5).unwrap();
        let later = orbit.propagated(elapsed * DAY).unwrap();
        let (before, after) = (orbit.relative_state(), later.relative_state());

        let energy = before.energy(SOL_MU);
        prop_assert!((after.energy(SOL_MU) - energy).abs() <= 1e-8 * energy.abs());
        prop_assert!(close(&before.angular_momentum(), &after.angular_momentum(), 1e-8));
    }

    /// Flying a Lambert solution lands on the target position.
    #[test]
    fn prop_lambert_reaches_target(
        r1_au in 0.7f64..1.6,
        r2_au in 0.7f64..1.6,
        angle in 0.35f64..2.8,
        tilt in -0.1f64..0.1,
        tof_days in 60.0f64..300.0,
    ) {
        let r1 = Vector3::new(r1_au * AU, 0.0, 0.0);
        let r2 = r2_au * AU * Vector3::new(angle.cos(), angle.sin(), tilt).normalize();
        let tof = tof_days * DAY;

        let solution = lambert::solve(&r1, &r2, tof, SOL_MU).unwrap();
        let state = CartesianState::new(r1, solution.departure_velocity);
        let conic = Orbit::from_state(sun(), &state, KeplerSettings::default()).unwrap();
        let arrived = conic.propagated(tof).unwrap();

        prop_assert!(close(&arrived.position(), &r2, 1e-5));
        prop_assert!(close(&arrived.velocity(), &solution.arrival_velocity, 1e-4));
    }
}
