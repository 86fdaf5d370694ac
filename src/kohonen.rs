//! Self-organizing (Kohonen) layers of position neurons.
//!
//! The 2-D layer supports toroidal wraparound along rows/columns and the
//! hexagonal lattice distortion. The N-dimensional layer generalizes the
//! distance to a sum of squared per-axis differences but, deliberately, does
//! not apply wraparound or hexagonal distortion: the circularity flags and
//! topology are stored for format stability only. The asymmetry is kept
//! intentionally rather than silently unified.

use crate::error::NetworkError;
use crate::lattice::{axis_distance, AddressBook, LatticeTopology};
use crate::neighborhood::NeighborhoodFunction;
use crate::rate::{check_schedule, LearningRateSchedule};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pick the index of the minimum distance value.
///
/// The parallel path is a lock-free min-reduction with an index tie-break,
/// never an unguarded shared write.
pub(crate) fn select_winner(values: &[f64], parallel: bool) -> usize {
    let better = |a: (usize, f64), b: (usize, f64)| {
        if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
            b
        } else {
            a
        }
    };
    if parallel {
        values
            .par_iter()
            .copied()
            .enumerate()
            .reduce(|| (usize::MAX, f64::INFINITY), better)
            .0
    } else {
        let mut best = (usize::MAX, f64::INFINITY);
        for pair in values.iter().copied().enumerate() {
            best = better(best, pair);
        }
        best.0
    }
}

/// Two-dimensional Kohonen lattice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KohonenLayer {
    width: usize,
    height: usize,
    topology: LatticeTopology,
    row_circular: bool,
    column_circular: bool,
    values: Vec<f64>,
    neighborhood: Vec<f64>,
    winner: Option<usize>,
    neighborhood_fn: NeighborhoodFunction,
    schedule: LearningRateSchedule,
    parallel: bool,
}

impl KohonenLayer {
    /// Create a `width` x `height` lattice with the given neighborhood
    /// function and topology. Fails if either dimension is zero.
    pub fn new(
        width: usize,
        height: usize,
        neighborhood_fn: NeighborhoodFunction,
        topology: LatticeTopology,
    ) -> Result<Self, NetworkError> {
        if width == 0 || height == 0 {
            return Err(NetworkError::Construction(format!(
                "kohonen layer size {}x{} must be positive",
                width, height
            )));
        }
        let count = width * height;
        Ok(Self {
            width,
            height,
            topology,
            row_circular: false,
            column_circular: false,
            values: vec![0.0; count],
            neighborhood: vec![0.0; count],
            winner: None,
            neighborhood_fn,
            schedule: LearningRateSchedule::default(),
            parallel: false,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn topology(&self) -> LatticeTopology {
        self.topology
    }

    /// Enable toroidal wraparound along rows (the x axis).
    pub fn set_row_circular(&mut self, circular: bool) {
        self.row_circular = circular;
    }

    /// Enable toroidal wraparound along columns (the y axis).
    pub fn set_column_circular(&mut self, circular: bool) {
        self.column_circular = circular;
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    #[inline]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_schedule(&mut self, schedule: LearningRateSchedule) {
        self.schedule = schedule;
    }

    pub fn set_learning_rate(&mut self, rate: f64) {
        self.schedule = LearningRateSchedule::constant(rate);
    }

    #[inline]
    pub fn schedule(&self) -> LearningRateSchedule {
        self.schedule
    }

    /// Distance values from the most recent run.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Neighborhood values from the most recent learn step.
    #[inline]
    pub fn neighborhood_values(&self) -> &[f64] {
        &self.neighborhood
    }

    /// Linear index of the winner, if the layer has been run.
    #[inline]
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// `(x, y)` coordinate of the winner, if the layer has been run.
    pub fn winner_coordinate(&self) -> Option<(usize, usize)> {
        self.winner.map(|i| self.coordinate_of(i))
    }

    #[inline]
    pub fn coordinate_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Distance value of the neuron at `(x, y)` from the most recent run.
    pub fn value_at(&self, x: usize, y: usize) -> f64 {
        self.values[self.index_of(x, y)]
    }

    /// Squared lattice distance split into per-axis parts, honoring
    /// wraparound and hexagonal distortion. `b` is treated as the winner.
    fn distance_parts(&self, a: (usize, usize), b: (usize, usize)) -> (f64, f64) {
        let (x, y) = a;
        let (wx, wy) = b;
        let dx = axis_distance(x, wx, self.width, self.row_circular);
        let dy = axis_distance(y, wy, self.height, self.column_circular);

        let dxf = dx as f64;
        let dyf = dy as f64;
        let mut dx_sq = dxf * dxf;
        let mut dy_sq = dyf * dyf;
        if self.topology == LatticeTopology::Hexagonal {
            // Odd rows sit half a cell to the side; rows pack at 0.75 pitch
            if dy % 2 == 1 {
                let signed = if (x > wx) == (wy % 2 == 0) { dxf } else { -dxf };
                dx_sq += 0.25 + signed;
            }
            dy_sq *= 0.75;
        }
        (dx_sq, dy_sq)
    }

    /// Euclidean lattice distance between two positions, honoring circularity
    /// and hexagonal distortion.
    pub fn lattice_distance(&self, a: (usize, usize), b: (usize, usize)) -> f64 {
        let (dx_sq, dy_sq) = self.distance_parts(a, b);
        (dx_sq + dy_sq).sqrt()
    }

    /// Store the distance values and winner produced by a forward run.
    pub(crate) fn commit_run(&mut self, values: Vec<f64>, winner: usize) {
        self.values = values;
        self.winner = Some(winner);
    }

    /// Assign every neuron its neighborhood value relative to the winner.
    pub(crate) fn evaluate_neighborhood(
        &mut self,
        iteration: usize,
        epochs: usize,
    ) -> Result<(), NetworkError> {
        check_schedule(iteration, epochs)?;
        let winner = self.winner.ok_or_else(|| {
            NetworkError::Construction("kohonen layer has not been run".to_string())
        })?;
        let wc = self.coordinate_of(winner);
        let nf = self.neighborhood_fn;

        let mut neighborhood = std::mem::take(&mut self.neighborhood);
        if self.parallel {
            neighborhood
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, v)| {
                    let (dx_sq, dy_sq) = self.distance_parts(self.coordinate_of(i), wc);
                    *v = nf.factor(dx_sq + dy_sq, iteration, epochs);
                });
        } else {
            for (i, v) in neighborhood.iter_mut().enumerate() {
                let (dx_sq, dy_sq) = self.distance_parts(self.coordinate_of(i), wc);
                *v = nf.factor(dx_sq + dy_sq, iteration, epochs);
            }
        }
        self.neighborhood = neighborhood;
        Ok(())
    }
}

/// N-dimensional Kohonen lattice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KohonenLayerNd {
    book: AddressBook,
    topology: LatticeTopology,
    circular: Vec<bool>,
    values: Vec<f64>,
    neighborhood: Vec<f64>,
    winner: Option<usize>,
    neighborhood_fn: NeighborhoodFunction,
    schedule: LearningRateSchedule,
    parallel: bool,
}

impl KohonenLayerNd {
    /// Create a lattice with the given size vector. Fails if the size vector
    /// is empty or any dimension is zero.
    pub fn new(
        size: &[usize],
        neighborhood_fn: NeighborhoodFunction,
        topology: LatticeTopology,
    ) -> Result<Self, NetworkError> {
        let book = AddressBook::new(size)?;
        let count = book.neuron_count();
        Ok(Self {
            book,
            topology,
            circular: vec![false; size.len()],
            values: vec![0.0; count],
            neighborhood: vec![0.0; count],
            winner: None,
            neighborhood_fn,
            schedule: LearningRateSchedule::default(),
            parallel: false,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Lattice size vector.
    #[inline]
    pub fn size(&self) -> &[usize] {
        self.book.size()
    }

    #[inline]
    pub fn topology(&self) -> LatticeTopology {
        self.topology
    }

    /// Per-dimension circularity flags. Stored for format stability; the
    /// N-dimensional distance does not apply wraparound.
    pub fn set_circular(&mut self, circular: Vec<bool>) -> Result<(), NetworkError> {
        if circular.len() != self.book.size().len() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.book.size().len(),
                found: circular.len(),
            });
        }
        self.circular = circular;
        Ok(())
    }

    #[inline]
    pub fn circular(&self) -> &[bool] {
        &self.circular
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    #[inline]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_schedule(&mut self, schedule: LearningRateSchedule) {
        self.schedule = schedule;
    }

    pub fn set_learning_rate(&mut self, rate: f64) {
        self.schedule = LearningRateSchedule::constant(rate);
    }

    #[inline]
    pub fn schedule(&self) -> LearningRateSchedule {
        self.schedule
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn neighborhood_values(&self) -> &[f64] {
        &self.neighborhood
    }

    #[inline]
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Coordinate vector of the winner, if the layer has been run.
    pub fn winner_coordinate(&self) -> Option<&[usize]> {
        self.winner.map(|i| self.book.coordinate_of(i))
    }

    /// The layer's address book.
    #[inline]
    pub fn address_book(&self) -> &AddressBook {
        &self.book
    }

    /// Distance value of the neuron at a coordinate from the most recent run.
    pub fn value_at(&self, coordinate: &[usize]) -> f64 {
        self.values[self.book.index_of(coordinate)]
    }

    pub(crate) fn commit_run(&mut self, values: Vec<f64>, winner: usize) {
        self.values = values;
        self.winner = Some(winner);
    }

    pub(crate) fn evaluate_neighborhood(
        &mut self,
        iteration: usize,
        epochs: usize,
    ) -> Result<(), NetworkError> {
        check_schedule(iteration, epochs)?;
        let winner = self.winner.ok_or_else(|| {
            NetworkError::Construction("kohonen layer has not been run".to_string())
        })?;
        let nf = self.neighborhood_fn;

        let mut neighborhood = std::mem::take(&mut self.neighborhood);
        if self.parallel {
            neighborhood
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, v)| {
                    *v = nf.factor(self.book.distance_squared(i, winner), iteration, epochs);
                });
        } else {
            for (i, v) in neighborhood.iter_mut().enumerate() {
                *v = nf.factor(self.book.distance_squared(i, winner), iteration, epochs);
            }
        }
        self.neighborhood = neighborhood;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_layer(width: usize, height: usize) -> KohonenLayer {
        KohonenLayer::new(
            width,
            height,
            NeighborhoodFunction::gaussian(3.0),
            LatticeTopology::Rectangular,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_size_rejected() {
        let nf = NeighborhoodFunction::gaussian(3.0);
        assert!(KohonenLayer::new(0, 4, nf, LatticeTopology::Rectangular).is_err());
        assert!(KohonenLayerNd::new(&[3, 0], nf, LatticeTopology::Rectangular).is_err());
    }

    #[test]
    fn test_rectangular_distance() {
        let layer = rect_layer(4, 4);
        assert_relative_eq!(layer.lattice_distance((0, 0), (3, 0)), 3.0);
        assert_relative_eq!(layer.lattice_distance((0, 0), (3, 4 - 1)), (9.0f64 + 9.0).sqrt());
    }

    #[test]
    fn test_row_circular_distance() {
        let mut layer = rect_layer(4, 4);
        layer.set_row_circular(true);
        // The torus brings (0,0) and (3,0) one step apart
        assert_relative_eq!(layer.lattice_distance((0, 0), (3, 0)), 1.0);
    }

    #[test]
    fn test_hexagonal_vertical_scale() {
        let layer = KohonenLayer::new(
            4,
            4,
            NeighborhoodFunction::gaussian(3.0),
            LatticeTopology::Hexagonal,
        )
        .unwrap();
        // Two rows straight up: dy even, no horizontal offset, 0.75 scaling
        assert_relative_eq!(layer.lattice_distance((1, 2), (1, 0)), (4.0f64 * 0.75).sqrt());
    }

    #[test]
    fn test_hexagonal_odd_row_offset() {
        let layer = KohonenLayer::new(
            4,
            4,
            NeighborhoodFunction::gaussian(3.0),
            LatticeTopology::Hexagonal,
        )
        .unwrap();
        // Winner at (1,0), neuron at (1,1): dy odd, dx zero
        // dx_sq = 0 + 0.25 - 0 = 0.25, dy_sq = 0.75
        assert_relative_eq!(layer.lattice_distance((1, 1), (1, 0)), 1.0);
    }

    #[test]
    fn test_winner_selection_sequential_and_parallel() {
        let values = vec![3.0, 0.5, 2.0, 0.5, 9.0];
        // Ties resolve to the lowest index in both paths
        assert_eq!(select_winner(&values, false), 1);
        assert_eq!(select_winner(&values, true), 1);
    }

    #[test]
    fn test_neighborhood_requires_run() {
        let mut layer = rect_layer(3, 3);
        assert!(layer.evaluate_neighborhood(0, 10).is_err());
    }

    #[test]
    fn test_neighborhood_peak_at_winner() {
        let mut layer = rect_layer(5, 5);
        let mut values = vec![1.0; 25];
        values[12] = 0.0; // center of the lattice
        let winner = select_winner(&values, false);
        layer.commit_run(values, winner);
        layer.evaluate_neighborhood(0, 100).unwrap();

        let nb = layer.neighborhood_values();
        assert_relative_eq!(nb[12], 1.0);
        assert!(nb.iter().enumerate().all(|(i, &v)| i == 12 || v < 1.0));
    }

    #[test]
    fn test_parallel_neighborhood_matches_sequential() {
        let mut seq = rect_layer(6, 6);
        let mut par = rect_layer(6, 6);
        par.set_parallel(true);

        let mut values = vec![2.0; 36];
        values[7] = 0.1;
        seq.commit_run(values.clone(), 7);
        par.commit_run(values, 7);

        seq.evaluate_neighborhood(3, 50).unwrap();
        par.evaluate_neighborhood(3, 50).unwrap();

        for (a, b) in seq.neighborhood_values().iter().zip(par.neighborhood_values()) {
            assert_relative_eq!(a, b);
        }
    }

    #[test]
    fn test_nd_layer_winner_coordinate() {
        let mut layer = KohonenLayerNd::new(
            &[3, 3, 3],
            NeighborhoodFunction::gaussian(2.0),
            LatticeTopology::Rectangular,
        )
        .unwrap();
        let mut values = vec![5.0; 27];
        let target = layer.address_book().index_of(&[2, 1, 0]);
        values[target] = 0.0;
        let winner = select_winner(&values, false);
        layer.commit_run(values, winner);

        assert_eq!(layer.winner_coordinate(), Some(&[2, 1, 0][..]));
    }

    #[test]
    fn test_nd_circular_flags_stored_not_applied() {
        let mut layer = KohonenLayerNd::new(
            &[4, 4],
            NeighborhoodFunction::gaussian(2.0),
            LatticeTopology::Rectangular,
        )
        .unwrap();
        layer.set_circular(vec![true, true]).unwrap();
        // Distance still spans the full lattice: no wraparound in N-D
        let a = layer.address_book().index_of(&[0, 0]);
        let b = layer.address_book().index_of(&[3, 0]);
        assert_relative_eq!(layer.address_book().distance_squared(a, b), 9.0);
    }

    #[test]
    fn test_nd_circular_flag_length_checked() {
        let mut layer = KohonenLayerNd::new(
            &[4, 4],
            NeighborhoodFunction::gaussian(2.0),
            LatticeTopology::Rectangular,
        )
        .unwrap();
        assert!(layer.set_circular(vec![true]).is_err());
    }
}
