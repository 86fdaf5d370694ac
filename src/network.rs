//! Network assembly, forward propagation and training orchestration.

use crate::connector::{ConnectionMode, Connector, Synapse};
use crate::error::NetworkError;
use crate::initializer::Initializer;
use crate::kohonen::select_winner;
use crate::layer::Layer;
use crate::rate::check_schedule;
use crate::training::{NullObserver, TrainingObserver, TrainingSample, TrainingSet};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Learning paradigm of a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingMethod {
    /// Error backpropagation against expected outputs.
    Supervised,
    /// Self-organizing competitive learning.
    Unsupervised,
}

fn default_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0)
}

/// The full ordered pipeline of layers and connectors plus training state.
///
/// Layers and connectors live in arenas and reference each other by index;
/// the first layer added is the input layer, the last one the output layer.
/// Connectors must point forward (source index < target index), which keeps
/// a single in-order sweep a complete forward pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<Layer>,
    connectors: Vec<Connector>,
    method: TrainingMethod,
    randomize_order: bool,
    mean_squared_error: f64,
    seed: u64,
    #[serde(skip, default = "default_rng")]
    rng: ChaCha8Rng,
}

impl Network {
    /// Create an empty network with a random seed.
    pub fn new(method: TrainingMethod) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(method, seed)
    }

    /// Create an empty network with a specific seed for reproducibility.
    /// The seed drives initialization, jitter and sample-order shuffling.
    pub fn new_with_seed(method: TrainingMethod, seed: u64) -> Self {
        Self {
            layers: Vec::new(),
            connectors: Vec::new(),
            method,
            randomize_order: true,
            mean_squared_error: 0.0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Append a layer and return its index.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> usize {
        self.layers.push(layer.into());
        self.layers.len() - 1
    }

    /// Wire two layers with a connector and apply its initializer.
    /// Returns the connector index.
    pub fn connect(
        &mut self,
        source_layer: usize,
        target_layer: usize,
        mode: ConnectionMode,
        initializer: Initializer,
    ) -> Result<usize, NetworkError> {
        if source_layer >= self.layers.len() || target_layer >= self.layers.len() {
            return Err(NetworkError::Construction(format!(
                "connector endpoints {}..{} out of range",
                source_layer, target_layer
            )));
        }
        if target_layer <= source_layer {
            return Err(NetworkError::Construction(
                "connectors must point forward through the layer sequence".to_string(),
            ));
        }
        let mut connector = Connector::new(
            source_layer,
            target_layer,
            self.layers[source_layer].len(),
            self.layers[target_layer].len(),
            mode,
            initializer,
        )?;
        connector.initialize(&mut self.rng)?;
        self.connectors.push(connector);
        Ok(self.connectors.len() - 1)
    }

    #[inline]
    pub fn method(&self) -> TrainingMethod {
        self.method
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Visit samples in a fresh random permutation each epoch (default), or
    /// in insertion order.
    pub fn set_randomize_order(&mut self, randomize: bool) {
        self.randomize_order = randomize;
    }

    /// Mean squared error accumulated over the most recent epoch. For
    /// unsupervised networks this is the mean squared quantization error
    /// (squared winner distance).
    #[inline]
    pub fn mean_squared_error(&self) -> f64 {
        self.mean_squared_error
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    #[inline]
    pub fn layer_mut(&mut self, index: usize) -> &mut Layer {
        &mut self.layers[index]
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    #[inline]
    pub fn connector(&self, index: usize) -> &Connector {
        &self.connectors[index]
    }

    #[inline]
    pub fn connector_mut(&mut self, index: usize) -> &mut Connector {
        &mut self.connectors[index]
    }

    #[inline]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Size of the input layer.
    pub fn input_dimension(&self) -> usize {
        self.layers.first().map_or(0, Layer::len)
    }

    /// Size of the output layer.
    pub fn output_dimension(&self) -> usize {
        self.layers.last().map_or(0, Layer::len)
    }

    /// Reset all biases and weights through their initializers, making the
    /// network ready for fresh training. Every call draws fresh values.
    pub fn initialize(&mut self) -> Result<(), NetworkError> {
        for layer in &mut self.layers {
            layer.initialize(&mut self.rng);
        }
        for connector in &mut self.connectors {
            connector.initialize(&mut self.rng)?;
        }
        self.mean_squared_error = 0.0;
        Ok(())
    }

    /// Add uniform random noise in `[-limit, limit]` to every synapse weight
    /// so the network can escape a local optimum.
    pub fn jitter(&mut self, limit: f64) {
        for connector in &mut self.connectors {
            connector.jitter(limit, &mut self.rng);
        }
    }

    /// Winner coordinate of the output lattice, if the output layer is a
    /// Kohonen layer and has been run at least once.
    pub fn winner(&self) -> Option<Vec<usize>> {
        match self.layers.last()? {
            Layer::Kohonen(l) => l.winner_coordinate().map(|(x, y)| vec![x, y]),
            Layer::KohonenNd(l) => l.winner_coordinate().map(<[usize]>::to_vec),
            Layer::Activation(_) => None,
        }
    }

    /// Forward propagation only: set the input vector, sweep the layers in
    /// order and return a copy of the output layer's values. Never mutates
    /// weights.
    pub fn run(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.set_input(inputs)?;
        self.forward_pass();
        Ok(self.layers.last().map_or_else(Vec::new, |l| l.outputs().to_vec()))
    }

    /// Train on the given set for a number of epochs.
    pub fn learn(&mut self, training_set: &TrainingSet, epochs: usize) -> Result<(), NetworkError> {
        self.learn_observed(training_set, epochs, &mut NullObserver)
    }

    /// Train with progress observation: the observer's epoch-start and
    /// sample-end hooks are the only windows into the run.
    pub fn learn_observed(
        &mut self,
        training_set: &TrainingSet,
        epochs: usize,
        observer: &mut dyn TrainingObserver,
    ) -> Result<(), NetworkError> {
        check_schedule(0, epochs)?;
        self.validate_training_set(training_set)?;

        log::info!(
            "training: {} samples, {} epochs, {:?}",
            training_set.len(),
            epochs,
            self.method
        );

        for epoch in 0..epochs {
            self.run_epoch(training_set, epoch, epochs, observer)?;
        }

        log::info!("training finished: mse = {:.6}", self.mean_squared_error);
        Ok(())
    }

    /// Run one epoch of a longer schedule: `epoch` must be below `epochs`,
    /// and the pair drives the learning-rate and neighborhood decay. Lets a
    /// caller interleave epochs with its own bookkeeping or cancellation.
    pub fn learn_epoch(
        &mut self,
        training_set: &TrainingSet,
        epoch: usize,
        epochs: usize,
    ) -> Result<(), NetworkError> {
        check_schedule(epoch, epochs)?;
        self.validate_training_set(training_set)?;
        self.run_epoch(training_set, epoch, epochs, &mut NullObserver)
    }

    fn run_epoch(
        &mut self,
        training_set: &TrainingSet,
        epoch: usize,
        epochs: usize,
        observer: &mut dyn TrainingObserver,
    ) -> Result<(), NetworkError> {
        observer.on_epoch_start(epoch, training_set);

        let mut order: Vec<usize> = (0..training_set.len()).collect();
        if self.randomize_order {
            order.shuffle(&mut self.rng);
        }

        let mut sum_squared = 0.0;
        for &index in &order {
            let sample = training_set.sample(index);
            sum_squared += self.learn_sample(sample, epoch, epochs)?;
            observer.on_sample_end(epoch, sample);
        }
        self.mean_squared_error = sum_squared / training_set.len() as f64;
        log::debug!("epoch {}: mse = {:.6}", epoch, self.mean_squared_error);
        Ok(())
    }

    /// Train a single sample. Returns the sample's squared-error
    /// contribution to the epoch MSE.
    fn learn_sample(
        &mut self,
        sample: &TrainingSample,
        iteration: usize,
        epochs: usize,
    ) -> Result<f64, NetworkError> {
        match self.method {
            TrainingMethod::Supervised => {
                self.set_input(sample.inputs())?;
                self.forward_pass();
                let output = self
                    .layers
                    .last_mut()
                    .and_then(Layer::as_activation_mut)
                    .ok_or_else(|| {
                        NetworkError::Construction(
                            "supervised networks need an activation output layer".to_string(),
                        )
                    })?;
                let sum_squared = output.compute_output_errors(sample.outputs());
                self.backward_pass();
                self.update_weights(iteration, epochs)?;
                Ok(sum_squared)
            }
            TrainingMethod::Unsupervised => {
                self.set_input(sample.inputs())?;
                let mut quantization = 0.0;
                for index in 0..self.layers.len() {
                    self.run_layer(index);
                    let q = self.learn_layer_unsupervised(index, iteration, epochs)?;
                    if !matches!(self.layers[index], Layer::Activation(_)) {
                        quantization = q;
                    }
                }
                Ok(quantization * quantization)
            }
        }
    }

    fn validate_training_set(&self, training_set: &TrainingSet) -> Result<(), NetworkError> {
        if training_set.is_empty() {
            return Err(NetworkError::Construction("training set is empty".to_string()));
        }
        if training_set.input_dimension() != self.input_dimension() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.input_dimension(),
                found: training_set.input_dimension(),
            });
        }
        if self.method == TrainingMethod::Supervised
            && training_set.output_dimension() != self.output_dimension()
        {
            return Err(NetworkError::DimensionMismatch {
                expected: self.output_dimension(),
                found: training_set.output_dimension(),
            });
        }
        Ok(())
    }

    /// Copy an input vector into the input layer.
    fn set_input(&mut self, inputs: &[f64]) -> Result<(), NetworkError> {
        if inputs.len() != self.input_dimension() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.input_dimension(),
                found: inputs.len(),
            });
        }
        let input = self
            .layers
            .first_mut()
            .and_then(Layer::as_activation_mut)
            .ok_or_else(|| {
                NetworkError::Construction("input layer must be an activation layer".to_string())
            })?;
        input.set_outputs(inputs);
        Ok(())
    }

    /// Run every layer in order. Layers with no incoming synapses pass
    /// their set values through unchanged.
    fn forward_pass(&mut self) {
        for index in 0..self.layers.len() {
            self.run_layer(index);
        }
    }

    /// Propagate all incoming connectors of one layer and activate it.
    fn run_layer(&mut self, index: usize) {
        let incoming: Vec<usize> = self
            .connectors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.target_layer() == index)
            .map(|(i, _)| i)
            .collect();
        if incoming.is_empty() {
            return;
        }

        // Source outputs are copied out so the target layer can be mutated
        // freely (and in parallel) while reading them.
        let gathered: Vec<(usize, Vec<f64>)> = incoming
            .iter()
            .map(|&ci| {
                let src = self.connectors[ci].source_layer();
                (ci, self.layers[src].outputs().to_vec())
            })
            .collect();

        let Self { layers, connectors, .. } = self;
        let parallel = layers[index].parallel();

        match &mut layers[index] {
            Layer::Activation(layer) => {
                layer.load_biases();
                let accumulate = |target: usize, input: &mut f64| {
                    for (ci, source_outputs) in &gathered {
                        for syn in connectors[*ci].incoming(target) {
                            *input += syn.weighted_contribution(source_outputs[syn.source]);
                        }
                    }
                };
                let inputs = layer.inputs_mut();
                if parallel {
                    inputs
                        .par_iter_mut()
                        .enumerate()
                        .for_each(|(t, v)| accumulate(t, v));
                } else {
                    for (t, v) in inputs.iter_mut().enumerate() {
                        accumulate(t, v);
                    }
                }
                layer.activate_all();
            }
            Layer::Kohonen(_) | Layer::KohonenNd(_) => {
                let count = layers[index].len();
                let distance = |target: usize| -> f64 {
                    let mut acc = 0.0;
                    for (ci, source_outputs) in &gathered {
                        for syn in connectors[*ci].incoming(target) {
                            acc += syn.distance_contribution(source_outputs[syn.source]);
                        }
                    }
                    acc.sqrt()
                };
                let values: Vec<f64> = if parallel {
                    (0..count).into_par_iter().map(distance).collect()
                } else {
                    (0..count).map(distance).collect()
                };
                let winner = select_winner(&values, parallel);
                match &mut layers[index] {
                    Layer::Kohonen(l) => l.commit_run(values, winner),
                    Layer::KohonenNd(l) => l.commit_run(values, winner),
                    Layer::Activation(_) => unreachable!(),
                }
            }
        }
    }

    /// Push errors back from the output layer toward the input: each hidden
    /// neuron's error is the weighted sum of its downstream errors times the
    /// local derivative.
    fn backward_pass(&mut self) {
        for index in (0..self.layers.len().saturating_sub(1)).rev() {
            if self.layers[index].as_activation().is_none() {
                continue;
            }
            let mut accumulated = vec![0.0; self.layers[index].len()];
            for connector in &self.connectors {
                if connector.source_layer() != index {
                    continue;
                }
                if let Some(target) = self.layers[connector.target_layer()].as_activation() {
                    let target_errors = target.errors();
                    for syn in connector.synapses() {
                        accumulated[syn.source] += syn.weight * target_errors[syn.target];
                    }
                }
            }
            if let Some(layer) = self.layers[index].as_activation_mut() {
                layer.errors_mut().copy_from_slice(&accumulated);
                layer.scale_errors_by_derivative();
            }
        }
    }

    /// Gradient step: synapse weights move by `rate * error * source output`,
    /// biases by `rate * error` (virtual input of 1).
    fn update_weights(&mut self, iteration: usize, epochs: usize) -> Result<(), NetworkError> {
        for ci in 0..self.connectors.len() {
            let target_index = self.connectors[ci].target_layer();
            let source_index = self.connectors[ci].source_layer();
            let Some(target) = self.layers[target_index].as_activation() else {
                continue;
            };
            let rate = target.schedule().rate(iteration, epochs)?;
            let target_errors = target.errors().to_vec();
            let source_outputs = self.layers[source_index].outputs().to_vec();
            for syn in self.connectors[ci].synapses_mut() {
                syn.weight += rate * target_errors[syn.target] * source_outputs[syn.source];
            }
        }
        for layer in &mut self.layers {
            if let Some(layer) = layer.as_activation_mut() {
                let rate = layer.schedule().rate(iteration, epochs)?;
                layer.learn_biases(rate);
            }
        }
        Ok(())
    }

    /// Competitive learning step for one layer: evaluate the neighborhood
    /// around the winner, then pull every incoming weight toward the input
    /// scaled by `rate * neighborhood`. Returns the winner's distance value
    /// (quantization error) for the MSE metric.
    fn learn_layer_unsupervised(
        &mut self,
        index: usize,
        iteration: usize,
        epochs: usize,
    ) -> Result<f64, NetworkError> {
        let (rate, parallel, quantization) = match &mut self.layers[index] {
            Layer::Kohonen(l) => {
                if l.winner().is_none() {
                    return Ok(0.0); // no incoming synapses, nothing to learn
                }
                l.evaluate_neighborhood(iteration, epochs)?;
                (
                    l.schedule().rate(iteration, epochs)?,
                    l.parallel(),
                    l.winner().map_or(0.0, |w| l.values()[w]),
                )
            }
            Layer::KohonenNd(l) => {
                if l.winner().is_none() {
                    return Ok(0.0);
                }
                l.evaluate_neighborhood(iteration, epochs)?;
                (
                    l.schedule().rate(iteration, epochs)?,
                    l.parallel(),
                    l.winner().map_or(0.0, |w| l.values()[w]),
                )
            }
            // Activation layers take no part in unsupervised learning
            Layer::Activation(_) => return Ok(0.0),
        };

        let Self { layers, connectors, .. } = self;
        let neighborhood: &[f64] = match &layers[index] {
            Layer::Kohonen(l) => l.neighborhood_values(),
            Layer::KohonenNd(l) => l.neighborhood_values(),
            Layer::Activation(_) => unreachable!(),
        };

        for connector in connectors.iter_mut() {
            if connector.target_layer() != index {
                continue;
            }
            let source_outputs = layers[connector.source_layer()].outputs().to_vec();
            let per_target = connector.per_target();
            let update = |target: usize, chunk: &mut [Synapse]| {
                let factor = rate * neighborhood[target];
                for syn in chunk {
                    syn.optimize_weight(factor, source_outputs[syn.source]);
                }
            };
            if parallel {
                connector
                    .synapses_mut()
                    .par_chunks_mut(per_target)
                    .enumerate()
                    .for_each(|(t, chunk)| update(t, chunk));
            } else {
                for (t, chunk) in connector.synapses_mut().chunks_mut(per_target).enumerate() {
                    update(t, chunk);
                }
            }
        }
        Ok(quantization)
    }

    /// Rebuild the skip-serialized RNG from the stored seed after
    /// deserialization.
    pub(crate) fn rebuild_rng(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Structural consistency check used after deserialization.
    pub(crate) fn validate(&self) -> Result<(), NetworkError> {
        for connector in &self.connectors {
            let (src, dst) = (connector.source_layer(), connector.target_layer());
            if src >= self.layers.len() || dst >= self.layers.len() || dst <= src {
                return Err(NetworkError::Construction(
                    "connector endpoints are inconsistent".to_string(),
                ));
            }
            connector.validate()?;
            let expected = match connector.mode() {
                ConnectionMode::Complete => self.layers[src].len() * self.layers[dst].len(),
                ConnectionMode::OneOne => self.layers[dst].len(),
            };
            if connector.synapse_count() != expected {
                return Err(NetworkError::Construction(format!(
                    "connector has {} synapses but layers imply {}",
                    connector.synapse_count(),
                    expected
                )));
            }
        }
        Ok(())
    }
}
