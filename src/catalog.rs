//! Tables of named bodies, and how to turn them into [Body] hierarchies.
//!
//! A catalog is a list of records, each naming the body it orbits. Since a
//! [Body] borrows its primary, bodies are built on the stack, from the root
//! down, and handed to a closure.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::astro::{Body, Orbit, OrbitalElements};
use crate::config::KeplerSettings;
use crate::error::CatalogError;

const SOLAR_SYSTEM: &str = include_str!("../data/solar-system.toml");

/// One body, as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub name: String,
    /// In kilograms
    pub mass: f64,
    /// Absent for bodies fixed at the origin.
    pub orbit: Option<OrbitRecord>,
}

/// Orbital elements as written in a catalog file: meters and degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitRecord {
    pub parent: String,
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    pub mean_anomaly: f64,
    pub inclination: f64,
    pub arg_periapsis: f64,
    pub long_asc_node: f64,
}

impl OrbitRecord {
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements::from_degrees(
            self.semimajor_axis,
            self.eccentricity,
            self.mean_anomaly,
            self.inclination,
            self.arg_periapsis,
            self.long_asc_node,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(rename = "body", default)]
    bodies: Vec<BodyRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    records: Vec<BodyRecord>,
    settings: KeplerSettings,
}

/// Reads a catalog from a TOML file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path)?;
    Catalog::from_toml_str(&text)
}

impl Catalog {
    /// Checks that every parent is listed before its children.
    pub fn from_records(records: Vec<BodyRecord>) -> Result<Self, CatalogError> {
        for (index, record) in records.iter().enumerate() {
            if let Some(orbit) = &record.orbit {
                if !records[..index].iter().any(|r| r.name == orbit.parent) {
                    return Err(CatalogError::MissingParent {
                        body: record.name.clone(),
                        parent: orbit.parent.clone(),
                    });
                }
            }
        }
        Ok(Catalog {
            records,
            settings: KeplerSettings::default(),
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::from_records(file.bodies)
    }

    /// Sol and the inner planets, with the Moon and the moons of Mars.
    pub fn solar_system() -> Result<Self, CatalogError> {
        Self::from_toml_str(SOLAR_SYSTEM)
    }

    pub fn with_settings(mut self, settings: KeplerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        let file = CatalogFile {
            bodies: self.records.clone(),
        };
        toml::to_string(&file)
    }

    pub fn records(&self) -> &[BodyRecord] {
        &self.records
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Case-insensitive lookup.
    pub fn record(&self, name: &str) -> Result<&BodyRecord, CatalogError> {
        self.records
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::UnknownBody(name.to_owned()))
    }

    /// The records from the root of the hierarchy down to `name`.
    fn lineage(&self, name: &str) -> Result<Vec<&BodyRecord>, CatalogError> {
        let mut chain = vec![self.record(name)?];
        while let Some(orbit) = &chain[chain.len() - 1].orbit {
            let parent = self.record(&orbit.parent)?;
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    fn materialize<'a>(
        &self,
        record: &BodyRecord,
        parent: Option<&'a Body<'a>>,
    ) -> Result<Body<'a>, CatalogError> {
        match (&record.orbit, parent) {
            (Some(orbit), Some(parent)) => {
                let orbit = Orbit::with_settings(parent, orbit.elements(), self.settings)
                    .map_err(|source| CatalogError::InvalidBody {
                        body: record.name.clone(),
                        source,
                    })?;
                Ok(Body::orbiting(record.name.clone(), record.mass, orbit))
            }
            _ => Ok(Body::fixed(record.name.clone(), record.mass)),
        }
    }

    /// Builds each body in `chain` around the one before it, and calls
    /// `visitor` on the last.
    fn visit_chain(
        &self,
        chain: &[&BodyRecord],
        parent: Option<&Body<'_>>,
        visitor: &mut dyn FnMut(&Body<'_>),
    ) -> Result<(), CatalogError> {
        let Some((record, rest)) = chain.split_first() else {
            return Ok(());
        };
        let body = self.materialize(record, parent)?;
        if rest.is_empty() {
            visitor(&body);
            Ok(())
        } else {
            self.visit_chain(rest, Some(&body), visitor)
        }
    }

    /// Builds the named body (and everything it orbits), and passes it to
    /// `f`.
    pub fn with_body<R>(
        &self,
        name: &str,
        f: impl FnOnce(&Body<'_>) -> R,
    ) -> Result<R, CatalogError> {
        let chain = self.lineage(name)?;
        let mut f = Some(f);
        let mut result = None;
        self.visit_chain(&chain, None, &mut |body: &Body<'_>| {
            result = f.take().map(|f| f(body));
        })?;
        result.ok_or_else(|| CatalogError::UnknownBody(name.to_owned()))
    }

    /// Builds two bodies orbiting the same primary, sharing that primary.
    pub fn with_siblings<R>(
        &self,
        first: &str,
        second: &str,
        f: impl FnOnce(&Body<'_>, &Body<'_>) -> R,
    ) -> Result<R, CatalogError> {
        let not_siblings = || CatalogError::NotSiblings {
            first: first.to_owned(),
            second: second.to_owned(),
        };
        let (a, b) = (self.record(first)?, self.record(second)?);
        let parent = match (&a.orbit, &b.orbit) {
            (Some(x), Some(y)) if x.parent.eq_ignore_ascii_case(&y.parent) => x.parent.clone(),
            _ => return Err(not_siblings()),
        };

        let mut f = Some(f);
        let mut result = None;
        let mut failure = None;
        self.with_body(&parent, |primary: &Body<'_>| {
            let bodies = self
                .materialize(a, Some(primary))
                .and_then(|x| Ok((x, self.materialize(b, Some(primary))?)));
            match bodies {
                Ok((x, y)) => result = f.take().map(|f| f(&x, &y)),
                Err(err) => failure = Some(err),
            }
        })?;

        if let Some(err) = failure {
            return Err(err);
        }
        result.ok_or_else(not_siblings)
    }
}
