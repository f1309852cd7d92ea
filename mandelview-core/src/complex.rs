use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// A point on the complex plane.
///
/// Immutable and `Copy`; every operation returns a fresh value. The escape
/// loop runs on this type directly, so the operators are all `#[inline]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// The modulus `|z|`.
    ///
    /// Uses `hypot` so that very large components do not overflow before the
    /// root is taken.
    #[inline]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }
}

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.im >= 0.0 {
            write!(f, "{} + {}i", self.re, self.im)
        } else {
            write!(f, "{} - {}i", self.re, -self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn zero_constant() {
        assert_eq!(Complex::ZERO, Complex::new(0.0, 0.0));
    }

    #[test]
    fn addition() {
        let c = Complex::new(1.0, 2.0) + Complex::new(3.0, 4.0);
        assert!(approx_eq(c.re, 4.0));
        assert!(approx_eq(c.im, 6.0));
    }

    #[test]
    fn multiplication() {
        // (1 + 2i)(3 + 4i) = 3 + 4i + 6i + 8i² = -5 + 10i
        let c = Complex::new(1.0, 2.0) * Complex::new(3.0, 4.0);
        assert!(approx_eq(c.re, -5.0));
        assert!(approx_eq(c.im, 10.0));
    }

    #[test]
    fn squaring() {
        // (1 + i)² = 2i
        let z = Complex::new(1.0, 1.0);
        let z2 = z * z;
        assert!(approx_eq(z2.re, 0.0));
        assert!(approx_eq(z2.im, 2.0));
    }

    #[test]
    fn modulus() {
        let a = Complex::new(3.0, 4.0);
        assert!(approx_eq(a.norm_sq(), 25.0));
        assert!(approx_eq(a.norm(), 5.0));
    }

    #[test]
    fn modulus_does_not_overflow() {
        let a = Complex::new(1e200, 1e200);
        assert!(a.norm().is_finite());
        assert!(a.norm() > 2.0);
    }

    #[test]
    fn operations_do_not_mutate_operands() {
        let a = Complex::new(0.5, -0.25);
        let b = Complex::new(2.0, 1.0);
        let _ = a + b;
        let _ = a * b;
        assert_eq!(a, Complex::new(0.5, -0.25));
        assert_eq!(b, Complex::new(2.0, 1.0));
    }

    #[test]
    fn display_sign() {
        assert_eq!(Complex::new(1.0, -2.0).to_string(), "1 - 2i");
        assert_eq!(Complex::new(-0.5, 0.5).to_string(), "-0.5 + 0.5i");
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&Complex::new(-2.0, -1.13)).unwrap();
        assert_eq!(json, r#"{"re":-2.0,"im":-1.13}"#);
    }
}
