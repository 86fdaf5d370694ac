//! Connectors: the synapse set bridging two layers.
//!
//! Synapses live in a single arena owned by their connector and reference
//! their endpoint neurons by index, so the whole synapse set springs into
//! existence at connector construction. Synapses are laid out target-major:
//! every target neuron's incoming synapses form one contiguous slice, which
//! is what makes per-neuron weight updates trivially parallel.

use crate::error::NetworkError;
use crate::initializer::Initializer;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// How a connector wires its two layers together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Every source neuron connects to every target neuron.
    Complete,
    /// Neuron `i` connects to neuron `i`; layer sizes must match.
    OneOne,
}

/// A weighted directed edge between two neurons.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Synapse {
    /// Index of the source neuron in the source layer.
    pub source: usize,
    /// Index of the target neuron in the target layer.
    pub target: usize,
    /// Synapse weight.
    pub weight: f64,
}

impl Synapse {
    /// Backpropagation contribution: `source_output * weight`.
    #[inline]
    pub fn weighted_contribution(&self, source_output: f64) -> f64 {
        source_output * self.weight
    }

    /// Kohonen contribution: squared difference between the source output
    /// and the weight.
    #[inline]
    pub fn distance_contribution(&self, source_output: f64) -> f64 {
        let similarity = source_output - self.weight;
        similarity * similarity
    }

    /// Nudge the weight toward the current source output.
    #[inline]
    pub fn optimize_weight(&mut self, learning_factor: f64, source_output: f64) {
        self.weight += learning_factor * (source_output - self.weight);
    }

    /// Add uniform random noise in `[-limit, limit]` so the network can
    /// deviate from a local optimum.
    #[inline]
    pub fn jitter(&mut self, limit: f64, rng: &mut ChaCha8Rng) {
        self.weight += rng.gen_range(-limit..=limit);
    }
}

/// The synapse set between a source layer and a target layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connector {
    source_layer: usize,
    target_layer: usize,
    source_len: usize,
    target_len: usize,
    mode: ConnectionMode,
    synapses: Vec<Synapse>,
    initializer: Initializer,
}

impl Connector {
    /// Build the complete synapse set between two layers.
    ///
    /// For `Complete` mode this creates `source_len * target_len` synapses;
    /// for `OneOne` the layer sizes must match and one synapse is created per
    /// neuron pair. All synapses start with weight `1.0` until an initializer
    /// runs.
    pub fn new(
        source_layer: usize,
        target_layer: usize,
        source_len: usize,
        target_len: usize,
        mode: ConnectionMode,
        initializer: Initializer,
    ) -> Result<Self, NetworkError> {
        if source_len == 0 || target_len == 0 {
            return Err(NetworkError::Construction(
                "cannot connect an empty layer".to_string(),
            ));
        }
        if mode == ConnectionMode::OneOne && source_len != target_len {
            return Err(NetworkError::Construction(format!(
                "one-one connector requires equal layer sizes, got {} and {}",
                source_len, target_len
            )));
        }

        let mut synapses = Vec::with_capacity(match mode {
            ConnectionMode::Complete => source_len * target_len,
            ConnectionMode::OneOne => target_len,
        });
        match mode {
            ConnectionMode::Complete => {
                for target in 0..target_len {
                    for source in 0..source_len {
                        synapses.push(Synapse { source, target, weight: 1.0 });
                    }
                }
            }
            ConnectionMode::OneOne => {
                for i in 0..target_len {
                    synapses.push(Synapse { source: i, target: i, weight: 1.0 });
                }
            }
        }

        Ok(Self {
            source_layer,
            target_layer,
            source_len,
            target_len,
            mode,
            synapses,
            initializer,
        })
    }

    /// Index of the source layer in the network.
    #[inline]
    pub fn source_layer(&self) -> usize {
        self.source_layer
    }

    /// Index of the target layer in the network.
    #[inline]
    pub fn target_layer(&self) -> usize {
        self.target_layer
    }

    #[inline]
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Total number of synapses.
    #[inline]
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Number of incoming synapses per target neuron.
    #[inline]
    pub fn per_target(&self) -> usize {
        match self.mode {
            ConnectionMode::Complete => self.source_len,
            ConnectionMode::OneOne => 1,
        }
    }

    /// Incoming synapses of one target neuron, as a contiguous slice.
    #[inline]
    pub fn incoming(&self, target: usize) -> &[Synapse] {
        let n = self.per_target();
        &self.synapses[target * n..(target + 1) * n]
    }

    #[inline]
    pub(crate) fn incoming_mut(&mut self, target: usize) -> &mut [Synapse] {
        let n = self.per_target();
        &mut self.synapses[target * n..(target + 1) * n]
    }

    /// All synapses in target-major order.
    #[inline]
    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    #[inline]
    pub(crate) fn synapses_mut(&mut self) -> &mut [Synapse] {
        &mut self.synapses
    }

    /// Flattened weight vector in target-major order.
    pub fn weights(&self) -> Vec<f64> {
        self.synapses.iter().map(|s| s.weight).collect()
    }

    /// Overwrite all weights from a flattened vector in target-major order.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<(), NetworkError> {
        if weights.len() != self.synapses.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.synapses.len(),
                found: weights.len(),
            });
        }
        for (syn, &w) in self.synapses.iter_mut().zip(weights) {
            syn.weight = w;
        }
        Ok(())
    }

    /// Replace the weight initializer.
    pub fn set_initializer(&mut self, initializer: Initializer) {
        self.initializer = initializer;
    }

    #[inline]
    pub fn initializer(&self) -> &Initializer {
        &self.initializer
    }

    /// Reset all weights through the initializer. May be invoked repeatedly;
    /// every call draws fresh values.
    pub fn initialize(&mut self, rng: &mut ChaCha8Rng) -> Result<(), NetworkError> {
        let mut weights = self.weights();
        self.initializer.initialize_weights(&mut weights, rng)?;
        for (syn, &w) in self.synapses.iter_mut().zip(&weights) {
            syn.weight = w;
        }
        Ok(())
    }

    /// Perturb every weight by uniform noise in `[-limit, limit]`.
    pub fn jitter(&mut self, limit: f64, rng: &mut ChaCha8Rng) {
        for syn in &mut self.synapses {
            syn.jitter(limit, rng);
        }
    }

    /// Structural consistency check used after deserialization: every synapse
    /// must reference valid neurons, and each target's incoming slice must
    /// point at that target.
    pub(crate) fn validate(&self) -> Result<(), NetworkError> {
        let expected = match self.mode {
            ConnectionMode::Complete => self.source_len * self.target_len,
            ConnectionMode::OneOne => self.target_len,
        };
        if self.synapses.len() != expected {
            return Err(NetworkError::Construction(format!(
                "connector has {} synapses, expected {}",
                self.synapses.len(),
                expected
            )));
        }
        for t in 0..self.target_len {
            for syn in self.incoming(t) {
                if syn.target != t || syn.source >= self.source_len {
                    return Err(NetworkError::Construction(
                        "synapse arena layout is inconsistent".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
