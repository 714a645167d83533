use core::ops::Index;

/// Ordered sequence of `f32` values shared by [`Vector`](crate::Vector) and
/// [`Matrix`](crate::Matrix).
///
/// The length only changes through [`set_data`](Self::set_data), which swaps
/// the whole contents in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericBuffer {
    values: Vec<f32>,
}

impl NumericBuffer {
    #[inline]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Builds a buffer of `len` values where value `i` is `rule(i)`.
    pub fn from_rule(len: usize, rule: impl FnMut(usize) -> f32) -> Self {
        Self { values: (0..len).map(rule).collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<f32> {
        self.values.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// Replaces the contents with `values`.
    ///
    /// The replacement is collected first and swapped in afterwards, so the
    /// buffer is never observed half-written. No padding is applied: the new
    /// length is exactly the number of supplied values.
    pub fn set_data(&mut self, values: impl IntoIterator<Item = f32>) -> &mut Self {
        let next: Vec<f32> = values.into_iter().collect();
        self.values = next;
        self
    }

    /// Row-major read: the value at column `x`, row `y` of a `width`-wide grid.
    #[inline]
    pub fn point(&self, x: usize, y: usize, width: usize) -> Option<f32> {
        self.get(y * width + x)
    }

    /// Row-major write: sets column `x`, row `y` of a `width`-wide grid.
    ///
    /// # Panics
    /// Panics if `y * width + x` is out of bounds.
    #[inline]
    pub fn set_point(&mut self, x: usize, y: usize, value: f32, width: usize) -> &mut Self {
        self.values[y * width + x] = value;
        self
    }

    /// Returns `dim` when the length is exactly `dim * dim`.
    pub fn square_dim(&self) -> Option<usize> {
        square_dim(self.values.len())
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.values
    }
}

pub(crate) fn square_dim(len: usize) -> Option<usize> {
    let dim = (len as f64).sqrt().round() as usize;
    (dim * dim == len).then_some(dim)
}

impl Index<usize> for NumericBuffer {
    type Output = f32;

    #[inline]
    fn index(&self, i: usize) -> &f32 {
        &self.values[i]
    }
}

impl From<Vec<f32>> for NumericBuffer {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

impl<const N: usize> From<[f32; N]> for NumericBuffer {
    fn from(values: [f32; N]) -> Self {
        Self { values: values.to_vec() }
    }
}

impl From<&[f32]> for NumericBuffer {
    fn from(values: &[f32]) -> Self {
        Self { values: values.to_vec() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── set_data ──────────────────────────────────────────────────────────

    #[test]
    fn set_data_replaces_length_exactly() {
        let mut b = NumericBuffer::from([1.0, 2.0, 3.0, 4.0]);
        b.set_data([9.0, 8.0]);
        assert_eq!(b.as_slice(), &[9.0, 8.0]);

        b.set_data([1.0, 2.0, 3.0]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn set_data_can_read_old_contents() {
        // The replacement is built from the old values before the swap.
        let mut b = NumericBuffer::from([1.0, 2.0, 3.0]);
        let doubled: Vec<f32> = b.iter().map(|v| v * 2.0).collect();
        b.set_data(doubled);
        assert_eq!(b.as_slice(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn clone_does_not_share_storage() {
        let a = NumericBuffer::from([1.0, 2.0]);
        let mut b = a.clone();
        b.set_point(0, 0, 5.0, 2);
        assert_eq!(a[0], 1.0);
        assert_eq!(b[0], 5.0);
    }

    // ── addressing ────────────────────────────────────────────────────────

    #[test]
    fn point_is_row_major() {
        let b = NumericBuffer::from_rule(6, |i| i as f32);
        // 3 wide, 2 tall: row 1, column 2 -> index 5
        assert_eq!(b.point(2, 1, 3), Some(5.0));
        assert_eq!(b.point(0, 1, 3), Some(3.0));
        assert_eq!(b.point(0, 2, 3), None);
    }

    #[test]
    fn square_dim_detects_squares() {
        assert_eq!(NumericBuffer::from_rule(16, |_| 0.0).square_dim(), Some(4));
        assert_eq!(NumericBuffer::from_rule(9, |_| 0.0).square_dim(), Some(3));
        assert_eq!(NumericBuffer::from_rule(6, |_| 0.0).square_dim(), None);
        assert_eq!(NumericBuffer::new().square_dim(), Some(0));
    }
}
