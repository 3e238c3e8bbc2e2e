use nalgebra::Vector3;

/// A position and velocity, usually relative to some primary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianState {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

impl CartesianState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        CartesianState { position, velocity }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    /// The same state after an instantaneous change in velocity.
    pub fn with_velocity_change(&self, delta_v: &Vector3<f64>) -> Self {
        CartesianState::new(self.position, self.velocity + delta_v)
    }

    /// Specific orbital energy, v^2/2 - mu/r.
    pub fn energy(&self, mu: f64) -> f64 {
        self.velocity.norm_squared() / 2.0 - mu / self.position.norm()
    }

    /// Specific angular momentum vector, r x v.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_invariants() {
        let state = CartesianState::new(Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(state.angular_momentum(), Vector3::new(0.0, 0.0, 6.0));
        // 9/2 - 8/2
        assert_relative_eq!(state.energy(8.0), 0.5);
    }

    #[test]
    fn test_velocity_change() {
        let state = CartesianState::new(Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 1.0));
        let kicked = state.with_velocity_change(&Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(kicked.position(), state.position());
        assert_eq!(kicked.velocity(), Vector3::z());
    }
}
