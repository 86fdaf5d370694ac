//! Training samples, sets and progress observation.

use crate::error::NetworkError;
use serde::{Deserialize, Serialize};

/// One training sample: an input vector and, for supervised training, the
/// expected output vector. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl TrainingSample {
    /// Supervised sample with input and expected output.
    pub fn supervised(inputs: Vec<f64>, outputs: Vec<f64>) -> Self {
        Self { inputs, outputs }
    }

    /// Unsupervised sample: input only.
    pub fn unsupervised(inputs: Vec<f64>) -> Self {
        Self { inputs, outputs: Vec::new() }
    }

    #[inline]
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }
}

/// Ordered collection of training samples sharing input/output dimensions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingSet {
    input_dimension: usize,
    output_dimension: usize,
    samples: Vec<TrainingSample>,
}

impl TrainingSet {
    /// Create an empty set with fixed dimensions. An output dimension of
    /// zero means unsupervised samples.
    pub fn new(input_dimension: usize, output_dimension: usize) -> Self {
        Self {
            input_dimension,
            output_dimension,
            samples: Vec::new(),
        }
    }

    /// Create an empty unsupervised set (no expected outputs).
    pub fn unsupervised(input_dimension: usize) -> Self {
        Self::new(input_dimension, 0)
    }

    #[inline]
    pub fn input_dimension(&self) -> usize {
        self.input_dimension
    }

    #[inline]
    pub fn output_dimension(&self) -> usize {
        self.output_dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    #[inline]
    pub fn sample(&self, index: usize) -> &TrainingSample {
        &self.samples[index]
    }

    /// Add a sample, enforcing the set's dimension invariants.
    pub fn add(&mut self, sample: TrainingSample) -> Result<(), NetworkError> {
        if sample.inputs.len() != self.input_dimension {
            return Err(NetworkError::DimensionMismatch {
                expected: self.input_dimension,
                found: sample.inputs.len(),
            });
        }
        if sample.outputs.len() != self.output_dimension {
            return Err(NetworkError::DimensionMismatch {
                expected: self.output_dimension,
                found: sample.outputs.len(),
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Remove all samples, keeping the dimensions for reuse.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Observation hooks into a training run. Both callbacks default to no-ops;
/// these are the only two windows into training progress.
pub trait TrainingObserver {
    /// Called at the start of each epoch.
    fn on_epoch_start(&mut self, _epoch: usize, _training_set: &TrainingSet) {}

    /// Called after each sample has been learned.
    fn on_sample_end(&mut self, _epoch: usize, _sample: &TrainingSample) {}
}

/// Observer that ignores every event.
pub struct NullObserver;

impl TrainingObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_invariants() {
        let mut set = TrainingSet::new(2, 1);
        assert!(set
            .add(TrainingSample::supervised(vec![0.0, 1.0], vec![1.0]))
            .is_ok());
        assert!(set
            .add(TrainingSample::supervised(vec![0.0], vec![1.0]))
            .is_err());
        assert!(set
            .add(TrainingSample::supervised(vec![0.0, 1.0], vec![1.0, 0.0]))
            .is_err());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unsupervised_set() {
        let mut set = TrainingSet::new(3, 0);
        assert!(set.add(TrainingSample::unsupervised(vec![0.1, 0.2, 0.3])).is_ok());
        // A supervised sample does not fit an unsupervised set
        assert!(set
            .add(TrainingSample::supervised(vec![0.1, 0.2, 0.3], vec![1.0]))
            .is_err());
    }

    #[test]
    fn test_clear_keeps_dimensions() {
        let mut set = TrainingSet::new(2, 0);
        set.add(TrainingSample::unsupervised(vec![0.0, 0.0])).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.input_dimension(), 2);
    }
}
