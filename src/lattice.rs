//! Lattice topology and N-dimensional addressing for Kohonen layers.

use crate::error::NetworkError;
use serde::{Deserialize, Serialize};

/// Arrangement of position neurons in a Kohonen layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatticeTopology {
    /// Each neuron has four immediate neighbors.
    Rectangular,
    /// Each neuron has six immediate neighbors. Odd rows are offset by half a
    /// cell horizontally and rows are packed at 0.75 vertical spacing.
    Hexagonal,
}

impl Default for LatticeTopology {
    fn default() -> Self {
        Self::Rectangular
    }
}

/// Bijection between linear neuron indices and N-dimensional lattice
/// coordinates.
///
/// For sizes `s0..s_{k-1}`, index `i` maps to coordinate
/// `(i mod s0, (i / s0) mod s1, ...)`. The coordinate table is built once at
/// layer construction; the inverse is O(1) through the stride table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressBook {
    size: Vec<usize>,
    strides: Vec<usize>,
    coords: Vec<Vec<usize>>,
}

impl AddressBook {
    /// Build the address book for the given lattice size vector.
    ///
    /// Fails if the size vector is empty or any dimension is zero.
    pub fn new(size: &[usize]) -> Result<Self, NetworkError> {
        if size.is_empty() {
            return Err(NetworkError::Construction(
                "lattice size vector is empty".to_string(),
            ));
        }
        if let Some(d) = size.iter().position(|&s| s == 0) {
            return Err(NetworkError::Construction(format!(
                "lattice dimension {} has zero size",
                d
            )));
        }

        let mut strides = Vec::with_capacity(size.len());
        let mut acc = 1usize;
        for &s in size {
            strides.push(acc);
            acc *= s;
        }
        let neuron_count = acc;

        // First coordinate varies fastest (row-major reversed enumeration).
        let mut coords = Vec::with_capacity(neuron_count);
        for i in 0..neuron_count {
            let mut c = Vec::with_capacity(size.len());
            for d in 0..size.len() {
                c.push((i / strides[d]) % size[d]);
            }
            coords.push(c);
        }

        Ok(Self {
            size: size.to_vec(),
            strides,
            coords,
        })
    }

    /// Number of neurons in the lattice.
    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.coords.len()
    }

    /// Lattice size vector.
    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    /// Coordinate vector of the neuron at a linear index.
    #[inline]
    pub fn coordinate_of(&self, index: usize) -> &[usize] {
        &self.coords[index]
    }

    /// Linear index of the neuron at a coordinate. O(1) via the stride table.
    #[inline]
    pub fn index_of(&self, coordinate: &[usize]) -> usize {
        debug_assert_eq!(coordinate.len(), self.size.len());
        coordinate
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c * s)
            .sum()
    }

    /// Sum of squared per-axis differences between two neurons, without
    /// wraparound or lattice distortion.
    #[inline]
    pub fn distance_squared(&self, a: usize, b: usize) -> f64 {
        self.coords[a]
            .iter()
            .zip(&self.coords[b])
            .map(|(&x, &y)| {
                let d = x.abs_diff(y) as f64;
                d * d
            })
            .sum()
    }
}

/// Per-axis lattice distance with optional toroidal wraparound.
#[inline]
pub(crate) fn axis_distance(a: usize, b: usize, size: usize, circular: bool) -> usize {
    let d = a.abs_diff(b);
    if circular {
        d.min(size - d)
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_book_round_trip() {
        let book = AddressBook::new(&[4, 3, 2]).unwrap();
        assert_eq!(book.neuron_count(), 24);

        for i in 0..book.neuron_count() {
            let coord = book.coordinate_of(i).to_vec();
            assert_eq!(book.index_of(&coord), i);
        }
    }

    #[test]
    fn test_first_coordinate_varies_fastest() {
        let book = AddressBook::new(&[3, 2]).unwrap();
        assert_eq!(book.coordinate_of(0), &[0, 0]);
        assert_eq!(book.coordinate_of(1), &[1, 0]);
        assert_eq!(book.coordinate_of(2), &[2, 0]);
        assert_eq!(book.coordinate_of(3), &[0, 1]);
        assert_eq!(book.coordinate_of(5), &[2, 1]);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(AddressBook::new(&[]).is_err());
        assert!(AddressBook::new(&[4, 0, 2]).is_err());
    }

    #[test]
    fn test_axis_distance_wraparound() {
        // Non-circular: plain absolute difference
        assert_eq!(axis_distance(0, 3, 4, false), 3);
        // Circular: shorter way around the torus
        assert_eq!(axis_distance(0, 3, 4, true), 1);
        assert_eq!(axis_distance(1, 2, 4, true), 1);
    }

    #[test]
    fn test_distance_squared_nd() {
        let book = AddressBook::new(&[5, 5, 5]).unwrap();
        let a = book.index_of(&[0, 0, 0]);
        let b = book.index_of(&[1, 2, 2]);
        assert_eq!(book.distance_squared(a, b), 9.0);
    }
}
