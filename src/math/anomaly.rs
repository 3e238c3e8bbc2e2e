//! Conversions between mean, eccentric (or parabolic/hyperbolic) and true
//! anomaly.
//!
//! Which "eccentric-like" anomaly we use depends on the regime:
//! - circular and elliptic orbits use the eccentric anomaly E,
//!   with M = E - e sin E
//! - parabolic orbits use D = tan(nu/2), with M = D + D^3 / 3 (Barker)
//! - hyperbolic orbits use the hyperbolic anomaly F, with M = e sinh F - F

use crate::config::KeplerSettings;
use crate::error::{NonConvergence, Routine};
use crate::math::intervals::Interval;
use crate::math::root_finding::newton_plus_bisection;

/// The four kinds of conic, as determined by eccentricity alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Circular,
    Elliptic,
    Parabolic,
    Hyperbolic,
}

impl Regime {
    #[allow(clippy::float_cmp)]
    pub fn from_eccentricity(ecc: f64) -> Self {
        if ecc == 0.0 {
            Regime::Circular
        } else if ecc < 1.0 {
            Regime::Elliptic
        } else if ecc == 1.0 {
            Regime::Parabolic
        } else {
            Regime::Hyperbolic
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Regime::Circular | Regime::Elliptic)
    }
}

/// Solves the regime-appropriate Kepler equation for the eccentric-like
/// anomaly (E, D or F).
pub fn derive_anomaly(
    mean_anomaly: f64,
    ecc: f64,
    settings: &KeplerSettings,
) -> Result<f64, NonConvergence> {
    match Regime::from_eccentricity(ecc) {
        Regime::Circular => Ok(mean_anomaly),
        Regime::Elliptic => mean_to_eccentric(mean_anomaly, ecc, settings),
        Regime::Parabolic => Ok(mean_to_parabolic(mean_anomaly)),
        Regime::Hyperbolic => mean_to_hyperbolic(mean_anomaly, ecc, settings),
    }
}

/// Inverse of [derive_anomaly]; this direction always has a closed form.
pub fn anomaly_to_mean(anomaly: f64, ecc: f64) -> f64 {
    match Regime::from_eccentricity(ecc) {
        Regime::Circular => anomaly,
        Regime::Elliptic => eccentric_to_mean(anomaly, ecc),
        Regime::Parabolic => parabolic_to_mean(anomaly),
        Regime::Hyperbolic => hyperbolic_to_mean(anomaly, ecc),
    }
}

pub fn anomaly_to_true(anomaly: f64, ecc: f64) -> f64 {
    match Regime::from_eccentricity(ecc) {
        Regime::Circular => anomaly,
        Regime::Elliptic => eccentric_to_true(anomaly, ecc),
        Regime::Parabolic => parabolic_to_true(anomaly),
        Regime::Hyperbolic => hyperbolic_to_true(anomaly, ecc),
    }
}

pub fn true_to_anomaly(true_anomaly: f64, ecc: f64) -> f64 {
    match Regime::from_eccentricity(ecc) {
        Regime::Circular => true_anomaly,
        Regime::Elliptic => true_to_eccentric(true_anomaly, ecc),
        Regime::Parabolic => true_to_parabolic(true_anomaly),
        Regime::Hyperbolic => true_to_hyperbolic(true_anomaly, ecc),
    }
}

// -- Elliptic --

pub fn mean_to_eccentric(
    mean_anomaly: f64,
    e: f64,
    settings: &KeplerSettings,
) -> Result<f64, NonConvergence> {
    debug_assert!((0.0..1.0).contains(&e));

    let kepler = |x: f64| -> f64 { x - e * x.sin() - mean_anomaly };
    let kepler_der = |x: f64| -> f64 { 1.0 - e * x.cos() };

    // Since |E - M| = |e sin E| <= e, the root is always within e of M.
    let bracket = Interval::new(mean_anomaly - e, mean_anomaly + e);
    newton_plus_bisection(
        |x| (kepler(x), kepler_der(x)),
        bracket,
        mean_anomaly,
        settings.tolerance,
        settings.max_iterations,
    )
    .ok_or(NonConvergence {
        routine: Routine::EllipticKepler,
        iterations: settings.max_iterations,
    })
}

pub fn eccentric_to_mean(eccentric_anomaly: f64, e: f64) -> f64 {
    eccentric_anomaly - e * eccentric_anomaly.sin()
}

pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    // tan(nu/2) = sqrt((1+e)/(1-e)) tan(E/2), but atan2 keeps us on the
    // right branch when E wraps past pi.
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos())
}

pub fn true_to_eccentric(true_anomaly: f64, e: f64) -> f64 {
    let half = true_anomaly / 2.0;
    2.0 * ((1.0 - e).sqrt() * half.sin()).atan2((1.0 + e).sqrt() * half.cos())
}

// -- Parabolic --

/// Barker's equation has a closed-form solution.
pub fn mean_to_parabolic(mean_anomaly: f64) -> f64 {
    // D is odd in M; solving for |M| avoids cancellation in A + sqrt(A^2 + 1)
    let a = 1.5 * mean_anomaly.abs();
    let b = (a + (a * a + 1.0).sqrt()).cbrt();
    (b - 1.0 / b).copysign(mean_anomaly)
}

pub fn parabolic_to_mean(parabolic_anomaly: f64) -> f64 {
    let d = parabolic_anomaly;
    d + d * d * d / 3.0
}

pub fn parabolic_to_true(parabolic_anomaly: f64) -> f64 {
    // We have that D = tan (theta/2)
    2.0 * parabolic_anomaly.atan()
}

pub fn true_to_parabolic(true_anomaly: f64) -> f64 {
    (true_anomaly / 2.0).tan()
}

// -- Hyperbolic --

#[allow(clippy::float_cmp)]
pub fn mean_to_hyperbolic(
    mean_anomaly: f64,
    e: f64,
    settings: &KeplerSettings,
) -> Result<f64, NonConvergence> {
    debug_assert!(e > 1.0);

    if mean_anomaly == 0.0 {
        return Ok(0.0);
    }

    let kepler = |x: f64| -> f64 { e * x.sinh() - x - mean_anomaly };
    let kepler_der = |x: f64| -> f64 { e * x.cosh() - 1.0 };

    // For F >= 0, e sinh F - F >= (e - 1) sinh F, so the root lies between
    // zero and asinh(M / (e - 1)). Negative M is symmetric.
    let far_end = (mean_anomaly.abs() / (e - 1.0)).asinh().copysign(mean_anomaly);
    let bracket = Interval::new(0.0, far_end);
    newton_plus_bisection(
        |x| (kepler(x), kepler_der(x)),
        bracket,
        mean_anomaly,
        settings.tolerance,
        settings.max_iterations,
    )
    .ok_or(NonConvergence {
        routine: Routine::HyperbolicKepler,
        iterations: settings.max_iterations,
    })
}

pub fn hyperbolic_to_mean(hyperbolic_anomaly: f64, e: f64) -> f64 {
    e * hyperbolic_anomaly.sinh() - hyperbolic_anomaly
}

#[inline]
fn hyperbolic_factor(e: f64) -> f64 {
    ((e - 1.0) / (e + 1.0)).sqrt()
}

pub fn hyperbolic_to_true(hyperbolic_anomaly: f64, e: f64) -> f64 {
    // We have that tanh(H/2) = sqrt((e-1)/(e+1)) tan(theta/2)
    let tanh_half_hyp = (hyperbolic_anomaly / 2.0).tanh();
    let tan_half_theta = tanh_half_hyp / hyperbolic_factor(e);
    2.0 * tan_half_theta.atan()
}

pub fn true_to_hyperbolic(true_anomaly: f64, e: f64) -> f64 {
    let tan_half_theta = (true_anomaly / 2.0).tan();
    let tanh_half_hyp = tan_half_theta * hyperbolic_factor(e);
    2.0 * tanh_half_hyp.atanh()
}
