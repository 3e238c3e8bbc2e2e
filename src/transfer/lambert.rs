//! Lambert's problem: find the conic that connects two positions in a given
//! time of flight.
//!
//! This uses the universal-variable formulation (Bate, Mueller & White,
//! ch. 5), bisecting on z = x^2 / a. Time of flight increases monotonically
//! with z, so bisection is slow but can't go wrong.

use log::trace;
use nalgebra::Vector3;

use crate::config::LambertSettings;
use crate::error::Unsolvable;
use crate::math::intervals::Interval;
use crate::math::stumpff::stumpff_cs;

/// Which way around the primary the transfer goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferDirection {
    /// Sweep less than 180 degrees.
    ShortWay,
    /// Sweep more than 180 degrees.
    LongWay,
    /// Whichever of the two moves counterclockwise about the given normal.
    Prograde(Vector3<f64>),
}

impl TransferDirection {
    /// Resolves `Prograde` into one of the other two.
    pub fn resolve(self, r1: &Vector3<f64>, r2: &Vector3<f64>) -> Self {
        match self {
            TransferDirection::Prograde(normal) => {
                if r1.cross(r2).dot(&normal) >= 0.0 {
                    TransferDirection::ShortWay
                } else {
                    TransferDirection::LongWay
                }
            }
            other => other,
        }
    }
}

/// Velocities at both ends of the transfer conic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertSolution {
    pub departure_velocity: Vector3<f64>,
    pub arrival_velocity: Vector3<f64>,
    /// The universal variable the solver settled on; positive for elliptic
    /// transfers, negative for hyperbolic ones.
    pub z: f64,
    pub iterations: usize,
}

/// Short-way transfer with the default settings.
pub fn solve(
    r1: &Vector3<f64>,
    r2: &Vector3<f64>,
    tof: f64,
    mu: f64,
) -> Result<LambertSolution, Unsolvable> {
    solve_with_direction(
        r1,
        r2,
        tof,
        mu,
        TransferDirection::ShortWay,
        &LambertSettings::default(),
    )
}

#[allow(clippy::float_cmp)]
pub fn solve_with_direction(
    r1: &Vector3<f64>,
    r2: &Vector3<f64>,
    tof: f64,
    mu: f64,
    direction: TransferDirection,
    settings: &LambertSettings,
) -> Result<LambertSolution, Unsolvable> {
    if !(tof > 0.0 && mu > 0.0 && tof.is_finite() && mu.is_finite()) {
        return Err(Unsolvable::InvalidInput);
    }

    let r1_len = r1.norm();
    let r2_len = r2.norm();

    // A = DM sqrt(r1 r2 (1 + cos dnu))
    let a_short = (r1_len * r2_len + r1.dot(r2)).max(0.0).sqrt();
    let big_a = match direction.resolve(r1, r2) {
        TransferDirection::LongWay => -a_short,
        _ => a_short,
    };
    if big_a == 0.0 || !big_a.is_finite() {
        return Err(Unsolvable::DegenerateGeometry);
    }

    let y_of = |z: f64, c: f64, s: f64| -> f64 {
        let y = r1_len + r2_len + big_a * (z * s - 1.0) / c.sqrt();
        // Negative y has no physical meaning; zero pushes z upwards
        y.max(0.0)
    };
    let time_of = |y: f64, c: f64, s: f64| -> f64 {
        let x = (y / c).sqrt();
        (x.powi(3) * s + big_a * y.sqrt()) / mu.sqrt()
    };

    let mut bracket = Interval::new(settings.z_lower, settings.z_upper);
    // z = 0 is a parabola, which is as good a first guess as any
    let mut z = if bracket.contains(0.0) {
        0.0
    } else {
        bracket.midpoint()
    };
    let mut iterations = 0;
    let y = loop {
        let (c, s) = stumpff_cs(z);
        let y = y_of(z, c, s);
        let t = time_of(y, c, s);
        if (t - tof).abs() <= settings.tolerance {
            break y;
        }

        if iterations >= settings.max_iterations {
            return Err(Unsolvable::NoConvergence { iterations });
        }
        iterations += 1;

        bracket = if t <= tof {
            bracket.split_right(z)
        } else {
            bracket.split_left(z)
        };
        z = bracket.midpoint();
    };

    let f = 1.0 - y / r1_len;
    let g = big_a * (y / mu).sqrt();
    let g_dot = 1.0 - y / r2_len;
    if g == 0.0 {
        return Err(Unsolvable::DegenerateGeometry);
    }

    trace!("lambert converged: z = {}, {} iterations", z, iterations);
    Ok(LambertSolution {
        departure_velocity: (r2 - f * r1) / g,
        arrival_velocity: (g_dot * r2 - r1) / g,
        z,
        iterations,
    })
}
