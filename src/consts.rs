use std::f64::consts::PI;

// Newton's gravitational constant, in N m^2 / kg^2
pub const NEWTON_G: f64 = 6.6743015e-11;

// Unit conversions; everything else in this crate is SI
pub const KM: f64 = 1000.0;
pub const AU: f64 = 1.496e11;
pub const DAY: f64 = 86_400.0;
pub const YEAR: f64 = 3.154e7;

pub const SOL_MASS: f64 = 1.9891e30;
pub const EARTH_MASS: f64 = 5.97219e24;

pub const SOL_MU: f64 = NEWTON_G * SOL_MASS;

pub fn get_circular_velocity(radius: f64, mu: f64) -> f64 {
    (mu / radius).sqrt()
}

pub fn get_period(a: f64, mu: f64) -> f64 {
    (4.0 * PI * PI * a.powi(3) / mu).sqrt()
}
