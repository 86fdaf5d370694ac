//! Activation layers and the layer sum type.

use crate::activation::Activation;
use crate::error::NetworkError;
use crate::initializer::Initializer;
use crate::kohonen::{KohonenLayer, KohonenLayerNd};
use crate::rate::LearningRateSchedule;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Ordered, fixed-size collection of activation neurons.
///
/// Neuron state is stored as parallel vectors: pre-activation inputs,
/// outputs, biases and backpropagated errors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivationLayer {
    activation: Activation,
    inputs: Vec<f64>,
    outputs: Vec<f64>,
    biases: Vec<f64>,
    errors: Vec<f64>,
    bias_initializer: Initializer,
    schedule: LearningRateSchedule,
    parallel: bool,
}

impl ActivationLayer {
    /// Create a layer of `neuron_count` neurons with the given activation.
    ///
    /// Fails if `neuron_count` is zero. Linear layers get a fixed zero bias;
    /// all others default to a small uniform random bias.
    pub fn new(activation: Activation, neuron_count: usize) -> Result<Self, NetworkError> {
        if neuron_count == 0 {
            return Err(NetworkError::Construction(
                "activation layer needs at least one neuron".to_string(),
            ));
        }
        let bias_initializer = if activation.has_trainable_bias() {
            Initializer::Random { min: -0.5, max: 0.5 }
        } else {
            Initializer::Zero
        };
        Ok(Self {
            activation,
            inputs: vec![0.0; neuron_count],
            outputs: vec![0.0; neuron_count],
            biases: vec![0.0; neuron_count],
            errors: vec![0.0; neuron_count],
            bias_initializer,
            schedule: LearningRateSchedule::default(),
            parallel: false,
        })
    }

    /// Number of neurons.
    #[inline]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Activation function of the layer.
    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Neuron outputs after the most recent forward pass.
    #[inline]
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// Neuron biases.
    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Backpropagated error per neuron, valid after a backward pass.
    #[inline]
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    pub(crate) fn errors_mut(&mut self) -> &mut [f64] {
        &mut self.errors
    }

    /// Pin a constant learning rate for this layer.
    pub fn set_learning_rate(&mut self, rate: f64) {
        self.schedule = LearningRateSchedule::constant(rate);
    }

    /// Replace the layer's learning-rate schedule.
    pub fn set_schedule(&mut self, schedule: LearningRateSchedule) {
        self.schedule = schedule;
    }

    #[inline]
    pub fn schedule(&self) -> LearningRateSchedule {
        self.schedule
    }

    /// Enable or disable the per-neuron parallel path.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    #[inline]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Replace the bias initializer.
    pub fn set_initializer(&mut self, initializer: Initializer) {
        self.bias_initializer = initializer;
    }

    /// Reset biases through the initializer, making the layer ready for
    /// fresh training. Linear layers keep their fixed zero bias.
    pub fn initialize(&mut self, rng: &mut ChaCha8Rng) {
        if self.activation.has_trainable_bias() {
            self.bias_initializer.initialize_biases(&mut self.biases, rng);
        } else {
            self.biases.fill(0.0);
        }
    }

    /// Set outputs directly. Used for layers without incoming synapses
    /// (the input layer), whose values pass through unchanged.
    pub(crate) fn set_outputs(&mut self, values: &[f64]) {
        self.inputs.copy_from_slice(values);
        self.outputs.copy_from_slice(values);
    }

    /// Start a forward accumulation: each neuron's input begins at its bias.
    pub(crate) fn load_biases(&mut self) {
        self.inputs.copy_from_slice(&self.biases);
    }

    #[inline]
    pub(crate) fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
    }

    /// Apply the activation function to every accumulated input.
    pub(crate) fn activate_all(&mut self) {
        for (out, &inp) in self.outputs.iter_mut().zip(&self.inputs) {
            *out = self.activation.activate(inp);
        }
    }

    /// Compute output-layer errors against a target vector and return the
    /// sum of squared differences for the MSE accumulator.
    pub(crate) fn compute_output_errors(&mut self, target: &[f64]) -> f64 {
        let mut sum_sq = 0.0;
        for i in 0..self.outputs.len() {
            let diff = target[i] - self.outputs[i];
            sum_sq += diff * diff;
            self.errors[i] = diff * self.activation.derivative(self.inputs[i], self.outputs[i]);
        }
        sum_sq
    }

    /// Multiply each accumulated weighted error sum by the local derivative.
    /// Used for hidden layers after errors were pushed back through synapses.
    pub(crate) fn scale_errors_by_derivative(&mut self) {
        for i in 0..self.errors.len() {
            self.errors[i] *= self.activation.derivative(self.inputs[i], self.outputs[i]);
        }
    }

    /// Bias update step: `bias += rate * error` (virtual input of 1).
    /// Linear layers keep their fixed bias.
    pub(crate) fn learn_biases(&mut self, rate: f64) {
        if self.activation.has_trainable_bias() {
            for (b, &e) in self.biases.iter_mut().zip(&self.errors) {
                *b += rate * e;
            }
        }
    }
}

/// A layer of the network. A closed set of kinds, dispatched by `match`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Layer {
    /// Backpropagation layer with an activation function.
    Activation(ActivationLayer),
    /// 2-D self-organizing lattice of position neurons.
    Kohonen(KohonenLayer),
    /// N-dimensional self-organizing lattice.
    KohonenNd(KohonenLayerNd),
}

impl Layer {
    /// Number of neurons in the layer.
    pub fn len(&self) -> usize {
        match self {
            Self::Activation(l) => l.len(),
            Self::Kohonen(l) => l.len(),
            Self::KohonenNd(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neuron outputs: activation outputs, or distance values for Kohonen
    /// layers.
    pub fn outputs(&self) -> &[f64] {
        match self {
            Self::Activation(l) => l.outputs(),
            Self::Kohonen(l) => l.values(),
            Self::KohonenNd(l) => l.values(),
        }
    }

    /// Whether the per-neuron parallel path is enabled.
    pub fn parallel(&self) -> bool {
        match self {
            Self::Activation(l) => l.parallel(),
            Self::Kohonen(l) => l.parallel(),
            Self::KohonenNd(l) => l.parallel(),
        }
    }

    pub(crate) fn initialize(&mut self, rng: &mut ChaCha8Rng) {
        match self {
            Self::Activation(l) => l.initialize(rng),
            // Position neurons hold no initializable parameters
            Self::Kohonen(_) | Self::KohonenNd(_) => {}
        }
    }

    pub(crate) fn as_activation(&self) -> Option<&ActivationLayer> {
        match self {
            Self::Activation(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn as_activation_mut(&mut self) -> Option<&mut ActivationLayer> {
        match self {
            Self::Activation(l) => Some(l),
            _ => None,
        }
    }
}

impl From<ActivationLayer> for Layer {
    fn from(l: ActivationLayer) -> Self {
        Self::Activation(l)
    }
}

impl From<KohonenLayer> for Layer {
    fn from(l: KohonenLayer) -> Self {
        Self::Kohonen(l)
    }
}

impl From<KohonenLayerNd> for Layer {
    fn from(l: KohonenLayerNd) -> Self {
        Self::KohonenNd(l)
    }
}
