//! Searches for good transfer windows.
//!
//! Both searches split the possible launch delays into chunks, run a
//! bisection-slope search over the delay in each chunk, and for each delay run
//! a nested search over the flight duration. Chunks are independent, so they
//! can be searched in parallel.

use std::cmp::Ordering;

use log::{debug, trace};
use rayon::prelude::*;

use super::search::{bisection_slope_search, downhill, Probe};
use super::{build_transfer_after, Transfer};
use crate::astro::{same_primary, Orbit, Primary};
use crate::config::{LambertSettings, SearchSettings, SolverConfig};
use crate::error::{Error, Result, Unsolvable};

/// Where a chunked search is at. Logged as the search progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    SearchingChunk,
    ConvergedLocalMin,
    AllChunksDone,
    BestSelected,
}

/// The outcome of a single trial. Lambert failures aren't errors here, they
/// just make the trial infinitely expensive.
#[derive(Debug, Clone)]
struct Candidate<P> {
    wait: i64,
    duration: i64,
    outcome: std::result::Result<Transfer<P>, Unsolvable>,
}

impl<P> Candidate<P> {
    fn delta_v(&self) -> f64 {
        match &self.outcome {
            Ok(transfer) => transfer.delta_v(),
            Err(_) => f64::INFINITY,
        }
    }

    fn total_time(&self) -> f64 {
        (self.wait + self.duration) as f64
    }

    fn within(&self, max_delta_v: f64) -> bool {
        self.delta_v() <= max_delta_v
    }

    fn cheaper(self, other: Self) -> Self {
        if other.delta_v() < self.delta_v() {
            other
        } else {
            self
        }
    }

    /// Prefers whichever meets the budget sooner; failing that, whichever is
    /// closer to meeting it.
    fn faster_within(self, other: Self, max_delta_v: f64) -> Self {
        match (self.within(max_delta_v), other.within(max_delta_v)) {
            (true, true) if other.total_time() < self.total_time() => other,
            (true, _) => self,
            (false, true) => other,
            (false, false) => self.cheaper(other),
        }
    }

    fn into_transfer(self) -> Result<Transfer<P>> {
        self.outcome.map_err(Error::from)
    }
}

/// The launch-window chunks for a pair of orbits.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Chunks {
    size: f64,
    count: usize,
}

impl Chunks {
    fn bounds(&self, index: usize) -> (i64, i64) {
        let begin = (index as f64 * self.size).ceil() as i64;
        let end = ((index + 1) as f64 * self.size).floor() as i64;
        (begin, end.max(begin))
    }
}

/// Finds minimum-delta-v and minimum-time transfers between two closed
/// orbits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransferOptimizer {
    search: SearchSettings,
    lambert: LambertSettings,
}

impl TransferOptimizer {
    pub fn new(config: &SolverConfig) -> Self {
        Self::with_settings(config.search, config.lambert)
    }

    pub fn with_settings(search: SearchSettings, lambert: LambertSettings) -> Self {
        Self { search, lambert }
    }

    pub fn search_settings(&self) -> &SearchSettings {
        &self.search
    }

    /// The cheapest transfer, allowing any launch delay up to one period of
    /// the slower orbit.
    pub fn min_delta_v<P>(&self, origin: &Orbit<P>, target: &Orbit<P>) -> Result<Transfer<P>>
    where
        P: Primary + Clone + Send + Sync,
    {
        let (chunks, max_duration) = self.prepare(origin, target)?;
        let search_chunk = |index: usize| -> Result<Candidate<P>> {
            let (begin, end) = chunks.bounds(index);
            debug!(
                "{:?}: chunk {}/{}, launch in [{}, {}] s",
                SearchPhase::SearchingChunk,
                index + 1,
                chunks.count,
                begin,
                end
            );
            let test = |wait| self.cheapest_duration(origin, target, wait, max_duration);
            let wait = bisection_slope_search(
                begin,
                end,
                test,
                toward_cheaper,
                self.search.max_iterations,
            )?;
            let best = test(wait)?.cheaper(test(wait + 1)?);
            debug!(
                "{:?}: chunk {}, delta-v {} m/s",
                SearchPhase::ConvergedLocalMin,
                index + 1,
                best.delta_v()
            );
            Ok(best)
        };

        let candidates: Vec<_> = if self.search.parallel {
            (0..chunks.count)
                .into_par_iter()
                .map(search_chunk)
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..chunks.count)
                .map(search_chunk)
                .collect::<Result<Vec<_>>>()?
        };
        debug!("{:?}", SearchPhase::AllChunksDone);

        let best = candidates
            .into_iter()
            .reduce(Candidate::cheaper)
            .ok_or(Error::Unsolvable(Unsolvable::DegenerateGeometry))?;
        debug!(
            "{:?}: wait {} s, duration {} s, delta-v {} m/s",
            SearchPhase::BestSelected,
            best.wait,
            best.duration,
            best.delta_v()
        );
        best.into_transfer()
    }

    /// The cheapest transfer that leaves after exactly `wait` seconds.
    pub fn min_delta_v_launch_specified<P>(
        &self,
        origin: &Orbit<P>,
        target: &Orbit<P>,
        wait: i64,
    ) -> Result<Transfer<P>>
    where
        P: Primary + Clone,
    {
        let (_, max_duration) = self.prepare(origin, target)?;
        self.cheapest_duration(origin, target, wait, max_duration)?
            .into_transfer()
    }

    /// The transfer that arrives soonest (counting the launch delay) without
    /// spending more than `max_delta_v`.
    pub fn min_time<P>(
        &self,
        origin: &Orbit<P>,
        target: &Orbit<P>,
        max_delta_v: f64,
    ) -> Result<Transfer<P>>
    where
        P: Primary + Clone + Send + Sync,
    {
        let (chunks, max_duration) = self.prepare(origin, target)?;
        let search_chunk = |index: usize| -> Result<Candidate<P>> {
            let (begin, end) = chunks.bounds(index);
            debug!(
                "{:?}: chunk {}/{}, launch in [{}, {}] s",
                SearchPhase::SearchingChunk,
                index + 1,
                chunks.count,
                begin,
                end
            );
            let test =
                |wait| self.fastest_duration(origin, target, wait, max_delta_v, max_duration);
            let wait = bisection_slope_search(
                begin,
                end,
                test,
                |probe: &Probe<'_, Candidate<P>>| {
                    let (at, next) = (&probe.at, &probe.next);
                    if (next.delta_v() - at.delta_v()).is_nan() {
                        return Ok(Ordering::Greater);
                    }
                    match (at.within(max_delta_v), next.within(max_delta_v)) {
                        (true, true) => return Ok(downhill(at.total_time(), next.total_time())),
                        (true, false) => return Ok(Ordering::Less),
                        (false, true) => return Ok(Ordering::Greater),
                        (false, false) => {}
                    }
                    if probe.lower()?.within(max_delta_v) {
                        return Ok(Ordering::Less);
                    }
                    if probe.upper()?.within(max_delta_v) {
                        return Ok(Ordering::Greater);
                    }
                    Ok(downhill(at.delta_v(), next.delta_v()))
                },
                self.search.max_iterations,
            )?;
            let best = test(wait)?.faster_within(test(wait + 1)?, max_delta_v);
            debug!(
                "{:?}: chunk {}, total time {} s, delta-v {} m/s",
                SearchPhase::ConvergedLocalMin,
                index + 1,
                best.total_time(),
                best.delta_v()
            );
            Ok(best)
        };

        let feasible: Vec<Candidate<P>> = if self.search.parallel {
            (0..chunks.count)
                .into_par_iter()
                .map(search_chunk)
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .filter(|candidate| candidate.within(max_delta_v))
                .collect()
        } else {
            let mut feasible: Vec<Candidate<P>> = Vec::new();
            for index in 0..chunks.count {
                // Nothing that launches after the best arrival can beat it
                let (begin, _) = chunks.bounds(index);
                let best_time = feasible
                    .iter()
                    .map(Candidate::total_time)
                    .fold(f64::INFINITY, f64::min);
                if begin as f64 >= best_time {
                    debug!(
                        "skipping chunks {}.. after arrival at {} s",
                        index + 1,
                        best_time
                    );
                    break;
                }

                let candidate = search_chunk(index)?;
                if candidate.within(max_delta_v) {
                    feasible.push(candidate);
                }
            }
            feasible
        };
        debug!("{:?}", SearchPhase::AllChunksDone);

        let best = feasible
            .into_iter()
            .reduce(|a, b| if b.total_time() < a.total_time() { b } else { a })
            .ok_or(Error::InfeasibleBudget { max_delta_v })?;
        debug!(
            "{:?}: wait {} s, duration {} s, delta-v {} m/s",
            SearchPhase::BestSelected,
            best.wait,
            best.duration,
            best.delta_v()
        );
        best.into_transfer()
    }

    /// The quickest transfer that leaves after exactly `wait` seconds and
    /// stays within `max_delta_v`.
    pub fn min_time_launch_specified<P>(
        &self,
        origin: &Orbit<P>,
        target: &Orbit<P>,
        max_delta_v: f64,
        wait: i64,
    ) -> Result<Transfer<P>>
    where
        P: Primary + Clone,
    {
        let (_, max_duration) = self.prepare(origin, target)?;
        let candidate = self.fastest_duration(origin, target, wait, max_delta_v, max_duration)?;
        if !candidate.within(max_delta_v) {
            return Err(Error::InfeasibleBudget { max_delta_v });
        }
        candidate.into_transfer()
    }

    /// Checks the orbits can be searched, and lays out the launch chunks and
    /// the longest flight duration worth considering.
    fn prepare<P: Primary>(&self, origin: &Orbit<P>, target: &Orbit<P>) -> Result<(Chunks, i64)> {
        if !same_primary(origin.primary(), target.primary()) {
            return Err(Error::PrimaryMismatch);
        }
        let period_of = |orbit: &Orbit<P>| {
            orbit.period().ok_or(Error::OpenOrbit {
                ecc: orbit.eccentricity(),
            })
        };
        let (p1, p2) = (period_of(origin)?, period_of(target)?);
        let (period_small, period_large) = (p1.min(p2), p1.max(p2));

        let size = period_small * self.search.chunk_fraction;
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::InvalidElements(format!(
                "can't split a period of {} s into chunks of {} s",
                period_small, size
            )));
        }
        let count = (period_large / size).ceil() as usize;
        let max_duration = (period_large.floor() as i64).max(self.search.min_duration);
        Ok((Chunks { size, count }, max_duration))
    }

    fn trial<P: Primary + Clone>(
        &self,
        origin: &Orbit<P>,
        target: &Orbit<P>,
        wait: i64,
        duration: i64,
    ) -> Result<Candidate<P>> {
        let settings = LambertSettings {
            tolerance: self.lambert.tolerance.min(self.search.trial_tolerance),
            ..self.lambert
        };
        let outcome = match build_transfer_after(
            origin,
            target,
            wait as f64,
            duration as f64,
            &settings,
        ) {
            Ok(transfer) => Ok(transfer),
            Err(Error::Unsolvable(reason)) => {
                trace!("no transfer for wait {} s, duration {} s: {}", wait, duration, reason);
                Err(reason)
            }
            Err(err) => return Err(err),
        };
        Ok(Candidate {
            wait,
            duration,
            outcome,
        })
    }

    fn cheapest_duration<P: Primary + Clone>(
        &self,
        origin: &Orbit<P>,
        target: &Orbit<P>,
        wait: i64,
        max_duration: i64,
    ) -> Result<Candidate<P>> {
        let test = |duration| self.trial(origin, target, wait, duration);
        let duration = bisection_slope_search(
            self.search.min_duration,
            max_duration,
            test,
            toward_cheaper,
            self.search.max_iterations,
        )?;
        Ok(test(duration)?.cheaper(test(duration + 1)?))
    }

    fn fastest_duration<P: Primary + Clone>(
        &self,
        origin: &Orbit<P>,
        target: &Orbit<P>,
        wait: i64,
        max_delta_v: f64,
        max_duration: i64,
    ) -> Result<Candidate<P>> {
        let test = |duration| self.trial(origin, target, wait, duration);
        let duration = bisection_slope_search(
            self.search.min_duration,
            max_duration,
            test,
            |probe: &Probe<'_, Candidate<P>>| {
                let (at, next) = (&probe.at, &probe.next);
                if (next.delta_v() - at.delta_v()).is_nan() {
                    return Ok(Ordering::Greater);
                }
                // Affordable at x, so the bracket top stays affordable
                if at.within(max_delta_v) {
                    return Ok(Ordering::Less);
                }
                if next.within(max_delta_v) {
                    return Ok(Ordering::Equal);
                }
                if probe.upper()?.within(max_delta_v) {
                    return Ok(Ordering::Greater);
                }
                Ok(downhill(at.delta_v(), next.delta_v()))
            },
            self.search.max_iterations,
        )?;
        Ok(test(duration)?.faster_within(test(duration + 1)?, max_delta_v))
    }
}

/// Minimization comparator on delta-v.
fn toward_cheaper<P>(probe: &Probe<'_, Candidate<P>>) -> Result<Ordering> {
    Ok(downhill(probe.at.delta_v(), probe.next.delta_v()))
}
