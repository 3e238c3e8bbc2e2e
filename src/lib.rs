pub mod astro;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod error;
pub mod math;
pub mod transfer;

pub use astro::{Body, CartesianState, Orbit, OrbitalElements, Primary};
pub use catalog::Catalog;
pub use config::SolverConfig;
pub use error::{Error, Result};
pub use transfer::{build_transfer, build_transfer_after, Transfer, TransferOptimizer};
