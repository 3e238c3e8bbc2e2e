use super::intervals::Interval;

/// Newton's method, falling back to bisection whenever a Newton step would
/// leave the bracket.
///
/// The bracket must contain a sign change of `f`. Iteration starts from
/// `initial_guess` if it lies strictly inside the bracket, and from the
/// midpoint otherwise. Succeeds once `|f| <= tolerance` (or once the bracket
/// can't be narrowed any further); returns `None` if that doesn't happen
/// within `num_iterations` steps.
// Adapted from `rtsafe` in http://www.grad.hr/nastava/gs/prg/NumericalRecipesinC.pdf
#[allow(clippy::float_cmp)]
pub fn newton_plus_bisection(
    f_and_f_prime: impl Fn(f64) -> (f64, f64),
    mut interval: Interval,
    initial_guess: f64,
    tolerance: f64,
    num_iterations: usize,
) -> Option<f64> {
    // The endpoints could already be roots, in which case we can't tell which
    // way f is oriented.
    let f_lo = f_and_f_prime(interval.lo()).0;
    if f_lo.abs() <= tolerance {
        return Some(interval.lo());
    }
    let f_hi = f_and_f_prime(interval.hi()).0;
    if f_hi.abs() <= tolerance {
        return Some(interval.hi());
    }
    let lo_is_neg = f_lo < 0.0;

    let mut guess = if interval.contains(initial_guess)
        && initial_guess != interval.lo()
        && initial_guess != interval.hi()
    {
        initial_guess
    } else {
        interval.midpoint()
    };

    for _ in 0..num_iterations {
        let (f, f_prime) = f_and_f_prime(guess);
        if f.abs() <= tolerance {
            return Some(guess);
        }

        // Update the bracket
        interval = match (lo_is_neg, f < 0.0) {
            (true, true) => interval.split_right(guess),   // - - +
            (true, false) => interval.split_left(guess),   // - + +
            (false, true) => interval.split_left(guess),   // + - -
            (false, false) => interval.split_right(guess), // + + -
        };

        if interval.is_exhausted() {
            return Some(guess);
        }

        // What's our next guess? Let's try one from Newton's method
        let newton_guess = guess - f / f_prime;

        // If it's outside the interval (or on the edge); discard it. It won't help
        // us shrink our search space.
        guess = if interval.contains(newton_guess)
            && newton_guess != interval.lo()
            && newton_guess != interval.hi()
        {
            newton_guess
        } else {
            interval.midpoint()
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_cubics() {
        // Find the root of x^3 - a for several a
        for a in [2.0, 50.0, -1.0, 0.1, 0.0] {
            let root = newton_plus_bisection(
                |x| (x * x * x - a, 3.0 * x * x),
                Interval::new(-100.0, 100.0),
                1.0,
                1e-12,
                200,
            )
            .unwrap();
            assert_relative_eq!(root, a.cbrt(), epsilon = 1e-3);
        }

        // There are three roots to x^3 - 4x^2 - 7x + 10: -2, 1, 5
        let f = |x: f64| 10.0 + x * (-7.0 + x * (-4.0 + x));
        let f_ = |x: f64| -7.0 + x * (-8.0 + x * 3.0);
        for (lo, hi, expected) in [(-3.0, 0.0, -2.0), (0.0, 4.0, 1.0), (4.0, 10.0, 5.0)] {
            let root =
                newton_plus_bisection(|x| (f(x), f_(x)), Interval::new(lo, hi), lo, 1e-12, 100)
                    .unwrap();
            assert_relative_eq!(root, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_trig() {
        // There's a unique fixed point cos(x) = x
        let root = newton_plus_bisection(
            |x| (x.cos() - x, -x.sin() - 1.0),
            Interval::new(-1.0, 1.0),
            0.0,
            1e-15,
            100,
        )
        .unwrap();
        assert_relative_eq!(root, 0.73908513321516064, epsilon = 1e-14);
    }

    #[test]
    fn test_root_at_endpoint() {
        let root = newton_plus_bisection(|x| (x - 2.0, 1.0), Interval::new(2.0, 5.0), 3.0, 0.0, 10);
        assert_eq!(root, Some(2.0));
    }

    #[test]
    fn test_iteration_cap() {
        // Bisection alone needs far more than 3 steps to get this close
        let root = newton_plus_bisection(
            |x| (x.cos() - x, 0.0),
            Interval::new(-1.0, 1.0),
            0.0,
            1e-15,
            3,
        );
        assert_eq!(root, None);
    }
}
