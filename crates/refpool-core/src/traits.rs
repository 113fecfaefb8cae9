//! Coordinate access traits.

use crate::id::Coord;

/// Read access to a point in real N-dimensional space.
///
/// Implemented by plain coordinate containers (`[f64; N]`, `Vec<f64>`,
/// [`Coord`]) and by pool-backed point views, so the k-d tree and the
/// nearest-neighbor search accept either.
pub trait RealLocalizable {
    /// Number of dimensions of this point.
    fn num_dimensions(&self) -> usize;

    /// Coordinate along dimension `d`.
    fn position(&self, d: usize) -> f64;

    /// Copy all coordinates into `out`.
    ///
    /// `out` must have at least [`num_dimensions`](Self::num_dimensions)
    /// elements.
    fn localize(&self, out: &mut [f64]) {
        for (d, slot) in out.iter_mut().take(self.num_dimensions()).enumerate() {
            *slot = self.position(d);
        }
    }
}

impl RealLocalizable for [f64] {
    fn num_dimensions(&self) -> usize {
        self.len()
    }

    fn position(&self, d: usize) -> f64 {
        self[d]
    }

    fn localize(&self, out: &mut [f64]) {
        out[..self.len()].copy_from_slice(self);
    }
}

impl<const N: usize> RealLocalizable for [f64; N] {
    fn num_dimensions(&self) -> usize {
        N
    }

    fn position(&self, d: usize) -> f64 {
        self[d]
    }
}

impl RealLocalizable for Vec<f64> {
    fn num_dimensions(&self) -> usize {
        self.len()
    }

    fn position(&self, d: usize) -> f64 {
        self[d]
    }
}

impl RealLocalizable for Coord {
    fn num_dimensions(&self) -> usize {
        self.len()
    }

    fn position(&self, d: usize) -> f64 {
        self[d]
    }
}

impl<T: RealLocalizable + ?Sized> RealLocalizable for &T {
    fn num_dimensions(&self) -> usize {
        (**self).num_dimensions()
    }

    fn position(&self, d: usize) -> f64 {
        (**self).position(d)
    }

    fn localize(&self, out: &mut [f64]) {
        (**self).localize(out)
    }
}
