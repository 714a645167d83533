use core::ops::Index;

use crate::buffer::NumericBuffer;
use crate::error::MathError;
use crate::matrix::Matrix;

/// Spatial vector of arbitrary dimension.
///
/// Binary operations require both operands to have the same length and fail
/// with [`MathError::InvalidShape`] otherwise, leaving `self` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vector {
    buf: NumericBuffer,
}

impl Vector {
    pub fn new(values: impl Into<NumericBuffer>) -> Self {
        Self { buf: values.into() }
    }

    #[inline]
    pub fn zeros(len: usize) -> Self {
        Self { buf: NumericBuffer::from_rule(len, |_| 0.0) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.buf.as_slice()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<f32> {
        self.buf.get(i)
    }

    /// Replaces the components (and with them the dimension).
    pub fn set_data(&mut self, values: impl IntoIterator<Item = f32>) -> &mut Self {
        self.buf.set_data(values);
        self
    }

    /// Combines `other` into `self` component-wise: `self[i] = op(self[i], other[i])`.
    pub fn operate<F>(&mut self, other: &Vector, op: F) -> Result<&mut Self, MathError>
    where
        F: Fn(f32, f32) -> f32,
    {
        self.check_len(other.len())?;
        Ok(self.operate_unchecked(other.as_slice(), op))
    }

    pub(crate) fn operate_unchecked<F>(&mut self, other: &[f32], op: F) -> &mut Self
    where
        F: Fn(f32, f32) -> f32,
    {
        let next: Vec<f32> = self.buf.iter().zip(other).map(|(a, &b)| op(a, b)).collect();
        self.buf.set_data(next);
        self
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f32 {
        self.buf.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Scales `self` to unit length.
    ///
    /// A zero vector is divided by zero and comes out as NaN components;
    /// callers that can produce one should check [`magnitude`](Self::magnitude) first.
    pub fn normalize(&mut self) -> &mut Self {
        let m = self.magnitude();
        let next: Vec<f32> = self.buf.iter().map(|v| v / m).collect();
        self.buf.set_data(next);
        self
    }

    /// Rolling cross product.
    ///
    /// Component `i` is `a[i'] * b[j] - a[j] * b[i']` with `i' = (i + 1) % len`
    /// and `j = (i' + 1) % len`. For 3-vectors this is the usual cross product;
    /// other lengths produce a value with no standard geometric meaning.
    pub fn cross(&self, other: &Vector) -> Result<Vector, MathError> {
        self.check_len(other.len())?;
        Ok(self.cross_unchecked(other.as_slice()))
    }

    pub(crate) fn cross_unchecked(&self, other: &[f32]) -> Vector {
        let a = self.as_slice();
        let len = a.len();
        let buf = NumericBuffer::from_rule(len, |i| {
            let i = (i + 1) % len;
            let j = (i + 1) % len;
            a[i] * other[j] - a[j] * other[i]
        });
        Vector { buf }
    }

    /// Replaces `self` with `self * matrix`, treating `self` as a row vector.
    pub fn transform(&mut self, matrix: &Matrix) -> Result<&mut Self, MathError> {
        self.check_len(matrix.dim())?;
        let next = matrix.apply_to_row(self.as_slice());
        self.buf.set_data(next);
        Ok(self)
    }

    fn check_len(&self, found: usize) -> Result<(), MathError> {
        if found == self.len() {
            Ok(())
        } else {
            Err(MathError::InvalidShape { expected: self.len(), found })
        }
    }
}

impl Index<usize> for Vector {
    type Output = f32;

    #[inline]
    fn index(&self, i: usize) -> &f32 {
        &self.buf[i]
    }
}

impl<const N: usize> From<[f32; N]> for Vector {
    fn from(values: [f32; N]) -> Self {
        Self::new(values)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── operate ───────────────────────────────────────────────────────────

    #[test]
    fn operate_adds_componentwise() {
        let mut v = Vector::from([1.0, 2.0, 3.0]);
        v.operate(&Vector::from([10.0, 20.0, 30.0]), |a, b| a + b).unwrap();
        assert_eq!(v.as_slice(), &[11.0, 22.0, 33.0]);
    }

    #[test]
    fn operate_with_custom_op() {
        let mut v = Vector::from([5.0, 5.0]);
        v.operate(&Vector::from([2.0, 7.0]), |a, b| a - b).unwrap();
        assert_eq!(v.as_slice(), &[3.0, -2.0]);
    }

    #[test]
    fn operate_rejects_length_mismatch() {
        let mut v = Vector::from([1.0, 2.0, 3.0]);
        let err = v.operate(&Vector::from([1.0, 2.0]), |a, b| a + b).unwrap_err();
        assert_eq!(err, MathError::InvalidShape { expected: 3, found: 2 });
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);
    }

    // ── magnitude / normalize ─────────────────────────────────────────────

    #[test]
    fn magnitude_of_3_4_is_5() {
        assert!(close(Vector::from([3.0, 4.0]).magnitude(), 5.0));
    }

    #[test]
    fn normalize_yields_unit_length() {
        let mut v = Vector::from([2.0, -3.0, 6.0, 1.5]);
        v.normalize();
        assert!(close(v.magnitude(), 1.0));
    }

    #[test]
    fn normalize_zero_vector_is_non_finite() {
        let mut v = Vector::zeros(3);
        v.normalize();
        assert!(v.as_slice().iter().all(|c| !c.is_finite()));
    }

    // ── cross ─────────────────────────────────────────────────────────────

    #[test]
    fn cross_of_axes_follows_right_hand_rule() {
        let x = Vector::from([1.0, 0.0, 0.0]);
        let y = Vector::from([0.0, 1.0, 0.0]);
        assert_eq!(x.cross(&y).unwrap().as_slice(), &[0.0, 0.0, 1.0]);
        assert_eq!(y.cross(&x).unwrap().as_slice(), &[0.0, 0.0, -1.0]);
    }

    #[test]
    fn cross_of_orthogonal_unit_vectors_is_unit() {
        let s = 0.5f32.sqrt();
        let a = Vector::from([s, s, 0.0]);
        let b = Vector::from([0.0, 0.0, 1.0]);
        assert!(close(a.cross(&b).unwrap().magnitude(), 1.0));
    }

    #[test]
    fn cross_matches_textbook_formula() {
        let a = Vector::from([2.0, 3.0, 4.0]);
        let b = Vector::from([5.0, 6.0, 7.0]);
        // (3*7 - 4*6, 4*5 - 2*7, 2*6 - 3*5)
        assert_eq!(a.cross(&b).unwrap().as_slice(), &[-3.0, 6.0, -3.0]);
    }

    #[test]
    fn cross_rejects_length_mismatch() {
        let a = Vector::from([1.0, 0.0, 0.0]);
        assert!(a.cross(&Vector::from([1.0, 0.0])).is_err());
    }

    // ── transform ─────────────────────────────────────────────────────────

    #[test]
    fn transform_by_translation_moves_point() {
        let mut m = Matrix::identity(4);
        m.translate(1.0, 2.0, 3.0).unwrap();
        let mut p = Vector::from([0.0, 0.0, 0.0, 1.0]);
        p.transform(&m).unwrap();
        assert_eq!(p.as_slice(), &[1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn transform_rejects_dimension_mismatch() {
        let mut p = Vector::from([1.0, 2.0, 3.0]);
        assert!(p.transform(&Matrix::identity(4)).is_err());
        assert_eq!(p.len(), 3);
    }
}
