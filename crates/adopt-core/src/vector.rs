//! Fixed-dimension real vector
//!
//! Value semantics throughout: arithmetic produces new vectors and never
//! aliases. All binary operations require equal dimension and panic
//! otherwise; the engine entry points validate dimensions up front so user
//! input surfaces as [`crate::Error::InvalidConfiguration`] instead.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

/// Ordered fixed-length sequence of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector(Vec<f64>);

impl Vector {
    /// Vector of `n` zeros.
    pub fn zeros(n: usize) -> Self {
        Vector(vec![0.0; n])
    }

    /// Vector filled with `value`.
    pub fn filled(n: usize, value: f64) -> Self {
        Vector(vec![value; n])
    }

    /// Build from components.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Vector(data)
    }

    /// Build from a slice.
    pub fn from_slice(data: &[f64]) -> Self {
        Vector(data.to_vec())
    }

    /// Dimension.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// True when the dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterate over components.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Consume into the underlying components.
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Dot product. Panics on dimension mismatch.
    pub fn dot(&self, other: &Vector) -> f64 {
        assert_eq!(
            self.dim(),
            other.dim(),
            "dot product dimension mismatch: {} vs {}",
            self.dim(),
            other.dim()
        );
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector(data)
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

fn zip_check(a: &Vector, b: &Vector, op: &str) {
    assert_eq!(a.dim(), b.dim(), "{op} dimension mismatch: {} vs {}", a.dim(), b.dim());
}

impl Add<&Vector> for &Vector {
    type Output = Vector;

    fn add(self, rhs: &Vector) -> Vector {
        zip_check(self, rhs, "add");
        Vector(self.0.iter().zip(rhs.0.iter()).map(|(a, b)| a + b).collect())
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        &self + &rhs
    }
}

impl Sub<&Vector> for &Vector {
    type Output = Vector;

    fn sub(self, rhs: &Vector) -> Vector {
        zip_check(self, rhs, "sub");
        Vector(self.0.iter().zip(rhs.0.iter()).map(|(a, b)| a - b).collect())
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        &self - &rhs
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, scalar: f64) -> Vector {
        Vector(self.0.iter().map(|a| a * scalar).collect())
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, scalar: f64) -> Vector {
        &self * scalar
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self * -1.0
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        &self * -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arithmetic() {
        let a = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let b = Vector::from_slice(&[4.0, 5.0, 6.0]);

        assert_eq!((&a + &b).as_slice(), &[5.0, 7.0, 9.0]);
        assert_eq!((&b - &a).as_slice(), &[3.0, 3.0, 3.0]);
        assert_eq!((&a * 2.0).as_slice(), &[2.0, 4.0, 6.0]);
        assert_eq!((-&a).as_slice(), &[-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_dot_and_norm() {
        let a = Vector::from_slice(&[3.0, 4.0]);
        let b = Vector::from_slice(&[1.0, 2.0]);

        assert_relative_eq!(a.dot(&b), 11.0);
        assert_relative_eq!(a.norm(), 5.0);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn test_mismatched_add_panics() {
        let a = Vector::zeros(2);
        let b = Vector::zeros(3);
        let _ = &a + &b;
    }

    #[test]
    fn test_value_semantics() {
        let a = Vector::from_slice(&[1.0, 2.0]);
        let mut b = a.clone();
        b[0] = 99.0;
        assert_eq!(a[0], 1.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Vector::from_slice(&[1.0, 2.0]).is_finite());
        assert!(!Vector::from_slice(&[1.0, f64::NAN]).is_finite());
        assert!(!Vector::from_slice(&[f64::INFINITY]).is_finite());
    }

    #[test]
    fn test_serde_roundtrip() {
        let a = Vector::from_slice(&[1.5, -2.5]);
        let json = serde_json::to_string(&a).unwrap();
        let back: Vector = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
