//! Integer bisection on the sign of a discrete slope.
//!
//! Each step probes `mid` and `mid + 1` and asks a comparator which side of
//! `mid` the extremum lies on. This finds local extrema of unimodal-ish
//! functions using only function values, which is all the transfer searches
//! have.

use std::cmp::Ordering;

use log::{trace, warn};

use crate::error::{NonConvergence, Result, Routine};

/// What the comparator gets to look at on each step.
///
/// `at` and `next` are the test values at `x` and `x + 1`. The values at the
/// ends of the current bracket are only computed if asked for.
pub struct Probe<'a, T> {
    pub x: i64,
    pub at: T,
    pub next: T,
    min_x: i64,
    max_x: i64,
    test: &'a dyn Fn(i64) -> Result<T>,
}

impl<T> Probe<'_, T> {
    pub fn bounds(&self) -> (i64, i64) {
        (self.min_x, self.max_x)
    }

    /// The test value at the bottom of the current bracket.
    pub fn lower(&self) -> Result<T> {
        (self.test)(self.min_x)
    }

    /// The test value at the top of the current bracket.
    pub fn upper(&self) -> Result<T> {
        (self.test)(self.max_x)
    }
}

/// Searches `[min_x, max_x]` for an extremum.
///
/// The comparator returns `Greater` if the extremum is above `x`, `Less` if
/// it is below, and `Equal` if `x` is it. The returned value is the bottom of
/// the final bracket, so the extremum is at either it or the value above.
pub fn bisection_slope_search<T, F, C>(
    min_x: i64,
    max_x: i64,
    test: F,
    mut comparator: C,
    max_iterations: usize,
) -> Result<i64>
where
    F: Fn(i64) -> Result<T>,
    C: FnMut(&Probe<'_, T>) -> Result<Ordering>,
{
    let (mut min_x, mut max_x) = (min_x.min(max_x), min_x.max(max_x));
    let mut iterations = 0;

    while max_x - min_x > 1 {
        if iterations >= max_iterations {
            warn!(
                "slope search gave up after {} iterations in [{}, {}]",
                iterations, min_x, max_x
            );
            return Err(NonConvergence {
                routine: Routine::SlopeSearch,
                iterations,
            }
            .into());
        }
        iterations += 1;

        // ceil((min + max) / 2)
        let x = (min_x + max_x + 1).div_euclid(2);
        let probe = Probe {
            x,
            at: test(x)?,
            next: test(x + 1)?,
            min_x,
            max_x,
            test: &test,
        };

        match comparator(&probe)? {
            Ordering::Greater => min_x = x,
            Ordering::Less => max_x = x,
            Ordering::Equal => {
                min_x = x;
                max_x = x + 1;
            }
        }
        trace!("slope search step {}: [{}, {}]", iterations, min_x, max_x);
    }

    Ok(min_x)
}

/// Comparator for minimization: points towards whichever of `at` and `next`
/// is smaller. When the slope is undefined (e.g. both values are infinite),
/// it says to keep going up.
pub fn downhill(at: f64, next: f64) -> Ordering {
    let slope = next - at;
    if slope.is_nan() || slope < 0.0 {
        Ordering::Greater
    } else if slope > 0.0 {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::Error;

    fn minimize(min_x: i64, max_x: i64, f: impl Fn(i64) -> f64) -> i64 {
        bisection_slope_search(
            min_x,
            max_x,
            |x| Ok(f(x)),
            |probe| Ok(downhill(probe.at, probe.next)),
            100,
        )
        .unwrap()
    }

    #[test]
    fn test_finds_minimum() {
        let x = minimize(0, 1000, |x| ((x - 345) * (x - 345)) as f64);
        assert!(x == 345 || x == 344, "got {}", x);

        // At the edges of the range
        let x = minimize(0, 1000, |x| x as f64);
        assert!(x <= 1);
        let x = minimize(0, 1000, |x| -x as f64);
        assert!(x >= 999);

        // Flat functions stop at the first probe
        assert_eq!(minimize(0, 10, |_| 1.0), 5);
    }

    #[test]
    fn test_finds_maximum() {
        let x = bisection_slope_search(
            -500,
            500,
            |x| Ok(-((x + 77) as f64).powi(2)),
            |probe| Ok(probe.next.partial_cmp(&probe.at).unwrap_or(Ordering::Equal)),
            100,
        )
        .unwrap();
        assert!(x == -77 || x == -78, "got {}", x);
    }

    #[test]
    fn test_tiny_ranges() {
        assert_eq!(minimize(3, 3, |x| x as f64), 3);
        assert_eq!(minimize(3, 4, |x| x as f64), 3);
        // Reversed bounds are fine too
        let x = minimize(1000, 0, |x| ((x - 10) * (x - 10)) as f64);
        assert!(x == 10 || x == 9);
    }

    #[test]
    fn test_infinite_values_go_up() {
        // Infinite below 600, then a minimum at 800
        let x = minimize(0, 1000, |x| {
            if x < 600 {
                f64::INFINITY
            } else {
                ((x - 800) * (x - 800)) as f64
            }
        });
        assert!(x == 800 || x == 799, "got {}", x);
    }

    #[test]
    fn test_lazy_bounds() {
        let calls = Cell::new(0);
        let x = bisection_slope_search(
            0,
            64,
            |x| {
                calls.set(calls.get() + 1);
                Ok(x)
            },
            |probe| {
                let (lo, hi) = probe.bounds();
                assert_eq!(probe.lower()?, lo);
                assert_eq!(probe.upper()?, hi);
                Ok(Ordering::Less)
            },
            100,
        )
        .unwrap();
        assert_eq!(x, 0);
        // Six steps (64 -> 1), each with two probes and two bound lookups
        assert_eq!(calls.get(), 24);
    }

    #[test]
    fn test_iteration_cap() {
        let result = bisection_slope_search(
            0,
            1 << 40,
            |x| Ok(x as f64),
            |probe| Ok(downhill(probe.at, probe.next)),
            10,
        );
        assert_eq!(
            result,
            Err(Error::NonConvergence(NonConvergence {
                routine: Routine::SlopeSearch,
                iterations: 10
            }))
        );
    }

    #[test]
    fn test_errors_propagate() {
        let result = bisection_slope_search(
            0,
            100,
            |x| {
                if x > 50 {
                    Err(Error::PrimaryMismatch)
                } else {
                    Ok(x)
                }
            },
            |_| Ok(Ordering::Greater),
            100,
        );
        assert_eq!(result, Err(Error::PrimaryMismatch));
    }
}
