use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use plotters::prelude::*;
use rayon::prelude::*;

use rust_kepler::catalog::Catalog;
use rust_kepler::config::LambertSettings;
use rust_kepler::consts::DAY;
use rust_kepler::transfer::build_transfer_after;
use rust_kepler::{Orbit, Primary};

/// Plots total delta-v over a grid of launch delays and flight durations.
#[derive(Debug, Parser)]
struct Args {
    from: String,
    to: String,

    /// Latest launch delay, in days
    #[arg(long, default_value_t = 800.0)]
    max_wait: f64,

    /// Longest flight, in days
    #[arg(long, default_value_t = 400.0)]
    max_duration: f64,

    /// Grid cells along each axis
    #[arg(long, default_value_t = 100)]
    resolution: usize,

    /// Cells costing more than this (m/s) are left blank
    #[arg(long, default_value_t = 30_000.0)]
    ceiling: f64,

    #[arg(long, default_value = "plots/porkchop.png")]
    output: PathBuf,
}

struct Grid {
    wait_step: f64,
    duration_step: f64,
    cells: Vec<(f64, f64, f64)>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let catalog = Catalog::solar_system()?;
    let grid = catalog.with_siblings(&args.from, &args.to, |origin, target| {
        match (origin.orbit(), target.orbit()) {
            (Some(o), Some(t)) => Some(sweep(o, t, &args)),
            _ => None,
        }
    })?;
    let grid = grid.context("both bodies need orbits")?;

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let name = args
        .output
        .to_str()
        .context("output path isn't valid UTF-8")?;
    draw_plot(name, &grid, &args).map_err(|err| anyhow::anyhow!("{}", err))?;
    info!("wrote {}", name);
    Ok(())
}

/// Evaluates every cell of the grid. Cells without a transfer are dropped.
fn sweep<P>(origin: &Orbit<P>, target: &Orbit<P>, args: &Args) -> Grid
where
    P: Primary + Clone + Sync,
{
    let n = args.resolution.max(1);
    let wait_step = args.max_wait / n as f64;
    let duration_step = args.max_duration / n as f64;
    let settings = LambertSettings::default();

    let cells: Vec<_> = (0..n * n)
        .into_par_iter()
        .filter_map(|index| {
            let wait = (index / n) as f64 * wait_step;
            let duration = (index % n + 1) as f64 * duration_step;
            match build_transfer_after(origin, target, wait * DAY, duration * DAY, &settings) {
                Ok(transfer) => Some((wait, duration, transfer.delta_v())),
                Err(err) => {
                    debug!("no transfer at ({}, {}): {}", wait, duration, err);
                    None
                }
            }
        })
        .collect();

    Grid {
        wait_step,
        duration_step,
        cells,
    }
}

fn draw_plot(name: &str, grid: &Grid, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(name, (800, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} to {}", args.from, args.to), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..args.max_wait, 0.0..args.max_duration)?;

    chart
        .configure_mesh()
        .x_desc("launch delay (days)")
        .y_desc("flight time (days)")
        .draw()?;

    let floor = grid
        .cells
        .iter()
        .map(|&(_, _, dv)| dv)
        .fold(f64::INFINITY, f64::min);
    let span = (args.ceiling - floor).max(1.0);

    chart.draw_series(
        grid.cells
            .iter()
            .filter(|&&(_, _, dv)| dv <= args.ceiling)
            .map(|&(wait, duration, dv)| {
                // Blue is cheap, red is expensive
                let hue = 0.66 * (1.0 - (dv - floor) / span);
                Rectangle::new(
                    [
                        (wait, duration - grid.duration_step),
                        (wait + grid.wait_step, duration),
                    ],
                    HSLColor(hue, 0.9, 0.5).filled(),
                )
            }),
    )?;

    root.present()?;
    Ok(())
}
