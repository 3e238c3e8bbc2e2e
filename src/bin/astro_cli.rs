use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use rust_kepler::catalog::{self, Catalog};
use rust_kepler::consts::DAY;
use rust_kepler::transfer::{build_transfer_after, Transfer};
use rust_kepler::{Primary, SolverConfig, TransferOptimizer};

#[derive(Debug, Parser)]
#[command(about = "Orbital elements and transfer planning for a catalog of bodies")]
struct Args {
    /// Catalog of bodies (defaults to the built-in solar system)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Solver settings, as TOML
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the bodies in the catalog
    Bodies,
    /// Print the orbital characteristics of a body
    Elements { name: String },
    /// Plan a transfer between two bodies orbiting the same primary
    Transfer {
        from: String,
        to: String,

        /// Find the fastest transfer within this budget (m/s), instead of
        /// the cheapest
        #[arg(long)]
        max_delta_v: Option<f64>,

        /// Launch after this many days instead of searching for a window
        #[arg(long)]
        wait: Option<f64>,

        /// Fly for exactly this many days (requires --wait)
        #[arg(long, requires = "wait")]
        duration: Option<f64>,

        /// Search launch chunks in parallel
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => catalog::read_file(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::solar_system()?,
    };
    let config = match &args.config {
        Some(path) => SolverConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SolverConfig::default(),
    };
    let catalog = catalog.with_settings(config.kepler);

    match args.command {
        Command::Bodies => {
            for name in catalog.names() {
                println!("{}", name);
            }
        }
        Command::Elements { name } => {
            let text = catalog.with_body(&name, |body| match body.orbit() {
                None => format!("{} is fixed at the origin (mass {} kg)", body.name, body.mass),
                Some(orbit) => format!(
                    "Orbital characteristics for {}\n{}\n- Position: {}\n- Velocity: {}",
                    body.name,
                    orbit.summary(),
                    body.position().transpose(),
                    body.velocity().transpose(),
                ),
            })?;
            println!("{}", text);
        }
        Command::Transfer {
            from,
            to,
            max_delta_v,
            wait,
            duration,
            parallel,
        } => {
            let mut config = config;
            config.search.parallel |= parallel;
            let optimizer = TransferOptimizer::new(&config);
            info!("planning {} -> {}", from, to);

            let report = catalog.with_siblings(
                &from,
                &to,
                |origin, target| -> anyhow::Result<String> {
                    let (origin, target) = match (origin.orbit(), target.orbit()) {
                        (Some(o), Some(t)) => (o, t),
                        _ => anyhow::bail!("both bodies need orbits"),
                    };
                    let wait_s = wait.map(|days| (days * DAY).round() as i64);
                    let transfer = match (wait_s, duration, max_delta_v) {
                        (Some(wait), Some(days), _) => build_transfer_after(
                            origin,
                            target,
                            wait as f64,
                            days * DAY,
                            &config.lambert,
                        )?,
                        (Some(wait), None, Some(budget)) => {
                            optimizer.min_time_launch_specified(origin, target, budget, wait)?
                        }
                        (Some(wait), None, None) => {
                            optimizer.min_delta_v_launch_specified(origin, target, wait)?
                        }
                        (None, _, Some(budget)) => optimizer.min_time(origin, target, budget)?,
                        (None, _, None) => optimizer.min_delta_v(origin, target)?,
                    };
                    Ok(describe(&transfer))
                },
            )??;
            println!("{}", report);
        }
    }

    Ok(())
}

fn describe<P>(transfer: &Transfer<P>) -> String {
    format!(
        "Transfer\n\
         - Launch after: {:.3} days\n\
         - Flight time: {:.3} days\n\
         - Arrival after: {:.3} days\n\
         - Departure burn: {:.3} m/s\n\
         - Arrival burn: {:.3} m/s\n\
         - Total delta-v: {:.3} m/s",
        transfer.wait_time() / DAY,
        transfer.duration() / DAY,
        transfer.total_time() / DAY,
        transfer.departure_thrust().norm(),
        transfer.arrival_thrust().norm(),
        transfer.delta_v(),
    )
}
