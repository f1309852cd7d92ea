use crate::complex::Complex;
use crate::fractal::{EscapeResult, EscapeTime, ESCAPE_RADIUS_SQ};

/// The Mandelbrot map `z_{n+1} = z_n² + c`, starting from `z₀ = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mandelbrot {
    step_budget: u32,
}

impl Mandelbrot {
    pub fn new(step_budget: u32) -> Self {
        Self { step_budget }
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

/// Run the escape-time loop for one point.
///
/// Iterates while `|z| < 2` and the budget lasts. The point counts as
/// escaped only if `|z| > 2` when the loop stops, so an orbit landing exactly
/// on the circle stays bounded. A zero budget returns without touching `c`.
pub fn evaluate(c: Complex, step_budget: u32) -> EscapeResult {
    if step_budget == 0 {
        return EscapeResult::bounded(0);
    }

    // Both regions are proven to never escape, so the loop would run to the
    // budget anyway.
    if in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im) {
        return EscapeResult::bounded(step_budget);
    }

    let mut z = Complex::ZERO;
    let mut step = 0;
    while step < step_budget && z.norm_sq() < ESCAPE_RADIUS_SQ {
        z = z * z + c;
        step += 1;
    }

    EscapeResult {
        iterations: step,
        escaped: z.norm_sq() > ESCAPE_RADIUS_SQ,
    }
}

impl EscapeTime for Mandelbrot {
    #[inline]
    fn evaluate(&self, c: Complex) -> EscapeResult {
        evaluate(c, self.step_budget)
    }

    fn step_budget(&self) -> u32 {
        self.step_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain loop without the interior shortcuts, used as a reference.
    fn evaluate_naive(c: Complex, step_budget: u32) -> EscapeResult {
        let mut z = Complex::ZERO;
        let mut step = 0;
        while step < step_budget && z.norm_sq() < ESCAPE_RADIUS_SQ {
            z = z * z + c;
            step += 1;
        }
        EscapeResult {
            iterations: step,
            escaped: z.norm_sq() > ESCAPE_RADIUS_SQ,
        }
    }

    #[test]
    fn origin_is_bounded() {
        assert_eq!(evaluate(Complex::ZERO, 1024), EscapeResult::bounded(1024));
    }

    #[test]
    fn minus_one_is_bounded() {
        // c = -1 gives the orbit 0 → -1 → 0 → -1 … (period 2)
        assert_eq!(
            evaluate(Complex::new(-1.0, 0.0), 500),
            EscapeResult::bounded(500)
        );
    }

    #[test]
    fn zero_budget_is_degenerate() {
        for c in [Complex::ZERO, Complex::new(10.0, 10.0), Complex::new(-1.0, 0.0)] {
            assert_eq!(
                evaluate(c, 0),
                EscapeResult {
                    iterations: 0,
                    escaped: false
                }
            );
        }
    }

    #[test]
    fn far_point_escapes_on_first_step() {
        let r = evaluate(Complex::new(10.0, 0.0), 256);
        assert!(r.escaped);
        assert_eq!(r.iterations, 1);
    }

    #[test]
    fn known_escape_count() {
        // c = 0.5: z₄ ≈ 1.63 is still inside, z₅ ≈ 3.15 is not.
        let r = evaluate(Complex::new(0.5, 0.0), 256);
        assert!(r.escaped);
        assert_eq!(r.iterations, 5);
    }

    #[test]
    fn escape_on_last_step_counts() {
        let r = evaluate(Complex::new(0.5, 0.0), 5);
        assert!(r.escaped);
        assert_eq!(r.iterations, 5);

        let r = evaluate(Complex::new(0.5, 0.0), 4);
        assert!(!r.escaped);
        assert_eq!(r.iterations, 4);
    }

    #[test]
    fn landing_on_the_circle_is_not_an_escape() {
        // c = -2: z₁ = -2, |z₁| == 2 stops the loop without escaping.
        assert_eq!(
            evaluate(Complex::new(-2.0, 0.0), 1024),
            EscapeResult {
                iterations: 1,
                escaped: false
            }
        );
        // c = 1: z₂ = 2.
        assert_eq!(
            evaluate(Complex::new(1.0, 0.0), 256),
            EscapeResult {
                iterations: 2,
                escaped: false
            }
        );
    }

    #[test]
    fn outside_radius_always_escapes_within_budget() {
        let points = [
            Complex::new(2.1, 0.0),
            Complex::new(-2.0, -1.13),
            Complex::new(0.0, 3.0),
            Complex::new(-1.6, 1.6),
        ];
        for c in points {
            for budget in [1, 2, 64, 1024] {
                let r = evaluate(c, budget);
                assert!(r.escaped, "{c} should escape with budget {budget}");
                assert!(r.iterations <= budget);
            }
        }
    }

    #[test]
    fn shortcuts_match_plain_iteration() {
        for i in 0..40 {
            for j in 0..30 {
                let c = Complex::new(-2.2 + i as f64 * 0.07, -1.2 + j as f64 * 0.08);
                assert_eq!(evaluate(c, 300), evaluate_naive(c, 300), "mismatch at {c}");
            }
        }
    }

    #[test]
    fn trait_uses_stored_budget() {
        let m = Mandelbrot::new(77);
        assert_eq!(m.step_budget(), 77);
        assert_eq!(m.evaluate(Complex::ZERO), EscapeResult::bounded(77));
    }
}
