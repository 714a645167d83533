use std::fmt;

/// Failure reported by a math operation.
///
/// Every operation that returns this error leaves its receiver unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Operand length does not match what the receiver requires.
    InvalidShape { expected: usize, found: usize },
    /// A buffer of this length cannot be read as a square matrix.
    NotSquare { len: usize },
    /// Gauss-Jordan elimination found no usable pivot; the matrix has no inverse.
    Singular,
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::InvalidShape { expected, found } => {
                write!(f, "invalid operand shape: expected {expected} values, found {found}")
            }
            MathError::NotSquare { len } => {
                write!(f, "buffer of length {len} is not a square matrix")
            }
            MathError::Singular => write!(f, "matrix is not invertible"),
        }
    }
}

impl std::error::Error for MathError {}
