use crate::buffer::{square_dim, NumericBuffer};
use crate::error::MathError;
use crate::degrees_to_radians;

/// Square matrix stored row-major: index `y * dim + x` holds row `y`, column `x`.
///
/// Vectors are rows multiplied on the left. Composing a transform `T` into a
/// matrix `M` (via [`multiply`](Self::multiply), [`translate`](Self::translate),
/// the rotations, [`scale`](Self::scale)) yields a matrix that applies `T`
/// to a vector first and the previously accumulated transform after it. In
/// the column-major view used for GPU upload this is `M = M * T`.
///
/// The 3D helpers only make sense on 4×4 homogeneous matrices and return
/// [`MathError::InvalidShape`] for any other dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    buf: NumericBuffer,
    dim: usize,
}

impl Default for Matrix {
    /// The 4×4 identity.
    fn default() -> Self {
        Self::identity(4)
    }
}

impl Matrix {
    pub fn identity(dim: usize) -> Self {
        Self::from_rule(dim, |x, y| if x == y { 1.0 } else { 0.0 })
    }

    /// Builds a `dim`×`dim` matrix where the entry at column `x`, row `y` is `rule(x, y)`.
    pub fn from_rule(dim: usize, mut rule: impl FnMut(usize, usize) -> f32) -> Self {
        let buf = NumericBuffer::from_rule(dim * dim, |i| rule(i % dim, i / dim));
        Self { buf, dim }
    }

    /// Wraps row-major values, which must form a square.
    pub fn from_values(values: impl Into<NumericBuffer>) -> Result<Self, MathError> {
        let buf = values.into();
        match buf.square_dim() {
            Some(dim) => Ok(Self { buf, dim }),
            None => Err(MathError::NotSquare { len: buf.len() }),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored values; always `dim * dim`.
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
    pub fn buffer(&self) -> &NumericBuffer {
        &self.buf
    }

    /// Entry at column `x`, row `y`.
    #[inline]
    pub fn point(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.dim && y < self.dim {
            self.buf.point(x, y, self.dim)
        } else {
            None
        }
    }

    /// Sets the entry at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if `x` or `y` is not below `dim`.
    pub fn set_point(&mut self, x: usize, y: usize, value: f32) -> &mut Self {
        assert!(x < self.dim && y < self.dim, "point ({x}, {y}) outside {0}x{0} matrix", self.dim);
        self.buf.set_point(x, y, value, self.dim);
        self
    }

    /// Row `y` as a slice, or `None` past the last row.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        if y >= self.dim {
            return None;
        }
        self.as_slice().get(y * self.dim..(y + 1) * self.dim)
    }

    /// Composes `other` into `self`. Both matrices must have the same dimension.
    pub fn multiply(&mut self, other: &Matrix) -> Result<&mut Self, MathError> {
        if other.dim != self.dim {
            return Err(MathError::InvalidShape { expected: self.len(), found: other.len() });
        }
        Ok(self.compose(other.as_slice()))
    }

    /// `self = t · self` in row-major terms. `t` must hold `dim * dim` values.
    pub(crate) fn compose(&mut self, t: &[f32]) -> &mut Self {
        let n = self.dim;
        let m = self.as_slice();
        let next: Vec<f32> = (0..n * n)
            .map(|i| {
                let (r, c) = (i / n, i % n);
                (0..n).map(|k| t[r * n + k] * m[k * n + c]).sum()
            })
            .collect();
        self.buf.set_data(next);
        self
    }

    /// Row vector times `self`: `out[i] = Σ_k row[k] · self[k][i]`.
    pub(crate) fn apply_to_row(&self, row: &[f32]) -> Vec<f32> {
        let n = self.dim;
        let m = self.as_slice();
        (0..n).map(|i| (0..n).map(|k| row[k] * m[k * n + i]).sum()).collect()
    }

    fn compose4(&mut self, t: [f32; 16]) -> Result<&mut Self, MathError> {
        if self.dim != 4 {
            return Err(MathError::InvalidShape { expected: self.len(), found: 16 });
        }
        Ok(self.compose(&t))
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, MathError> {
        self.compose4(translation(x, y, z))
    }

    /// Rotates `degrees` about the x axis.
    pub fn pitch(&mut self, degrees: f32) -> Result<&mut Self, MathError> {
        let (s, c) = degrees_to_radians(degrees).sin_cos();
        self.compose4([
            1.0, 0.0, 0.0, 0.0,
            0.0, c, s, 0.0,
            0.0, -s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotates `degrees` about the y axis.
    pub fn yaw(&mut self, degrees: f32) -> Result<&mut Self, MathError> {
        let (s, c) = degrees_to_radians(degrees).sin_cos();
        self.compose4([
            c, 0.0, -s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotates `degrees` about the z axis.
    pub fn roll(&mut self, degrees: f32) -> Result<&mut Self, MathError> {
        let (s, c) = degrees_to_radians(degrees).sin_cos();
        self.compose4([
            c, s, 0.0, 0.0,
            -s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// `pitch(x)`, then `yaw(y)`, then `roll(z)`.
    pub fn rotate(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, MathError> {
        self.pitch(x)?.yaw(y)?.roll(z)
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, MathError> {
        self.compose4([
            x, 0.0, 0.0, 0.0,
            0.0, y, 0.0, 0.0,
            0.0, 0.0, z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Replaces `self` with its inverse.
    ///
    /// On [`MathError::Singular`] the matrix is left exactly as it was.
    pub fn invert(&mut self) -> Result<&mut Self, MathError> {
        let inverse = gauss_jordan(self.as_slice(), self.dim)?;
        self.buf.set_data(inverse);
        Ok(self)
    }

    /// Copies a 4×4 matrix out for GPU upload; `None` for other dimensions.
    pub fn to_array4(&self) -> Option<[f32; 16]> {
        self.as_slice().try_into().ok()
    }
}

impl From<Matrix> for NumericBuffer {
    fn from(m: Matrix) -> Self {
        m.buf
    }
}

/// Inverts a raw row-major buffer in place.
///
/// Fails with [`MathError::NotSquare`] when the length is not a perfect square
/// and [`MathError::Singular`] when no inverse exists. The buffer is untouched
/// on failure.
pub fn invert_buffer(buf: &mut NumericBuffer) -> Result<(), MathError> {
    let dim = square_dim(buf.len()).ok_or(MathError::NotSquare { len: buf.len() })?;
    let inverse = gauss_jordan(buf.as_slice(), dim)?;
    buf.as_mut_slice().copy_from_slice(&inverse);
    Ok(())
}

fn translation(x: f32, y: f32, z: f32) -> [f32; 16] {
    [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        x, y, z, 1.0,
    ]
}

/// Gauss-Jordan elimination on a working copy, mirrored onto an identity.
///
/// A zero on the diagonal is replaced by swapping in the first lower row with a
/// nonzero entry in that column. Zero tests are exact; no epsilon is applied.
fn gauss_jordan(values: &[f32], dim: usize) -> Result<Vec<f32>, MathError> {
    let mut work = values.to_vec();
    let mut inv = Matrix::identity(dim).buf.as_slice().to_vec();

    for i in 0..dim {
        if work[i * dim + i] == 0.0 {
            let Some(swap) = (i + 1..dim).find(|&r| work[r * dim + i] != 0.0) else {
                return Err(MathError::Singular);
            };
            swap_rows(&mut work, dim, i, swap);
            swap_rows(&mut inv, dim, i, swap);
        }

        let diagonal = work[i * dim + i];
        for j in 0..dim {
            work[i * dim + j] /= diagonal;
            inv[i * dim + j] /= diagonal;
        }

        for r in (0..dim).filter(|&r| r != i) {
            let factor = work[r * dim + i];
            for j in 0..dim {
                work[r * dim + j] -= factor * work[i * dim + j];
                inv[r * dim + j] -= factor * inv[i * dim + j];
            }
        }
    }

    Ok(inv)
}

fn swap_rows(values: &mut [f32], dim: usize, a: usize, b: usize) {
    for j in 0..dim {
        values.swap(a * dim + j, b * dim + j);
    }
}
