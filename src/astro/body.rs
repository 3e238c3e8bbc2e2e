use nalgebra::Vector3;

use super::{NullOrbit, Orbit, Primary};

/// A named, massive body. Either it sits still at the origin, or it orbits
/// another body, which it borrows.
#[derive(Debug, Clone)]
pub struct Body<'a> {
    pub name: String,
    pub mass: f64,
    pub trajectory: Trajectory<'a>,
}

#[derive(Debug, Clone)]
pub enum Trajectory<'a> {
    Fixed(NullOrbit),
    Orbiting(Orbit<&'a Body<'a>>),
}

impl<'a> Body<'a> {
    pub fn fixed(name: impl Into<String>, mass: f64) -> Self {
        Body {
            name: name.into(),
            mass,
            trajectory: Trajectory::Fixed(NullOrbit),
        }
    }

    pub fn orbiting(name: impl Into<String>, mass: f64, orbit: Orbit<&'a Body<'a>>) -> Self {
        Body {
            name: name.into(),
            mass,
            trajectory: Trajectory::Orbiting(orbit),
        }
    }

    pub fn orbit(&self) -> Option<&Orbit<&'a Body<'a>>> {
        match &self.trajectory {
            Trajectory::Fixed(_) => None,
            Trajectory::Orbiting(orbit) => Some(orbit),
        }
    }

    pub fn parent(&self) -> Option<&'a Body<'a>> {
        self.orbit().map(|orbit| *orbit.primary())
    }
}

impl Primary for Body<'_> {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn position(&self) -> Vector3<f64> {
        match &self.trajectory {
            Trajectory::Fixed(null) => null.position(),
            Trajectory::Orbiting(orbit) => orbit.position(),
        }
    }

    fn velocity(&self) -> Vector3<f64> {
        match &self.trajectory {
            Trajectory::Fixed(null) => null.velocity(),
            Trajectory::Orbiting(orbit) => orbit.velocity(),
        }
    }
}
