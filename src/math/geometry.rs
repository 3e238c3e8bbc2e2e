use nalgebra::{Rotation3, Vector3};

use std::f64::consts::{PI, TAU};

// How close to the poles sin(inclination) may get before we treat the
// node line as undefined.
const GIMBAL_TOLERANCE: f64 = 1e-12;

/// Wraps an angle into [0, 2pi).
pub fn normalize_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly 2pi for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

pub fn reject(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    // Computes the vector rejection of u from v. v must be non-zero.
    let u_proj_v = u.dot(v) * v / v.norm_squared();
    u - u_proj_v
}

/// Returns a rotation R that sends the z- and x- axes to point in the specified directions.
/// The orthogonality of new_z and new_x is not checked.
/// If new_z or new_x is sufficiently close to zero, then some semi-canonical choices will
/// be made:
/// - if new_z is small, R(z) points as much along the z-axis as possible while
///   staying perpendicular to new_x (or along y, if new_x ~= z)
/// - if new_x is small, R(x) points as much along the x-axis as possible while
///   staying perpendicular to new_z (or along -y, if new_z ~= x)
/// - if both are small, this is the identity
pub fn always_find_rotation(
    new_z: &Vector3<f64>,
    new_x: &Vector3<f64>,
    tolerance: f64,
) -> Rotation3<f64> {
    let z_large_enough = new_z.norm() >= tolerance;
    let x_large_enough = new_x.norm() >= tolerance;

    let (new_z, new_x) = match (z_large_enough, x_large_enough) {
        (true, true) => (*new_z, *new_x),
        (false, true) => {
            let mut best_new_z = reject(&Vector3::z(), new_x);
            if best_new_z.norm() < tolerance {
                best_new_z = Vector3::y();
            };
            (best_new_z, *new_x)
        }
        (true, false) => {
            let mut best_new_x = reject(&Vector3::x(), new_z);
            if best_new_x.norm() < tolerance {
                best_new_x = -Vector3::y();
            };
            (*new_z, best_new_x)
        }
        (false, false) => return Rotation3::identity(),
    };

    // Rotation::face_towards takes new-z and new-y as arguments, so we
    // prepend a 90-degree rotation around z (e.g., one taking x to y).
    let mut rotation = Rotation3::face_towards(&new_z, &new_x);
    rotation *= Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    rotation.renormalize();
    rotation
}

/// The rotation taking the perifocal frame (periapsis along x, angular
/// momentum along z) to the reference frame.
///
/// The in-plane vector is turned about z by `-arg_periapsis`, then about x by
/// `-inclination`, then about z by `-long_asc_node`.
pub fn rotation_from_angles(inclination: f64, arg_periapsis: f64, long_asc_node: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -long_asc_node)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), -inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), -arg_periapsis)
}

/// Inverse of [rotation_from_angles]. Returns `(inclination, arg_periapsis,
/// long_asc_node)`, with the inclination in [0, pi] and the other two in
/// [0, 2pi).
///
/// For equatorial orbits the node line is undefined; the ascending node is
/// then reported as zero and the whole turn goes into the argument of
/// periapsis.
pub fn angles_from_rotation(rotation: &Rotation3<f64>) -> (f64, f64, f64) {
    // Decompose as Rz(a) Rx(b) Rz(c) with b in [0, pi].
    let m = rotation.matrix();
    let sin_b = m[(0, 2)].hypot(m[(1, 2)]);

    if sin_b < GIMBAL_TOLERANCE {
        // Equatorial: the whole thing is a single turn about z, possibly
        // flipped over by Rx(pi).
        return if m[(2, 2)] > 0.0 {
            let turn = m[(1, 0)].atan2(m[(0, 0)]);
            (0.0, normalize_angle(-turn), 0.0)
        } else {
            let turn = (-m[(1, 0)]).atan2(m[(0, 0)]);
            (PI, normalize_angle(-turn), 0.0)
        };
    }

    let b = sin_b.atan2(m[(2, 2)]);
    let a = m[(0, 2)].atan2(-m[(1, 2)]);
    let c = m[(2, 0)].atan2(m[(2, 1)]);

    // Conjugating Rx(b) by Rz(pi) flips its sign, so
    // Rz(a) Rx(b) Rz(c) = Rz(a + pi) Rx(-b) Rz(c + pi).
    let inclination = b;
    let long_asc_node = normalize_angle(-(a + PI));
    let arg_periapsis = normalize_angle(-(c + PI));
    (inclination, arg_periapsis, long_asc_node)
}
