//! Activation functions for backpropagation layers.

use serde::{Deserialize, Serialize};

/// Activation function of an [`ActivationLayer`](crate::layer::ActivationLayer).
///
/// Each variant is a pure `(input) -> output` / `(input, output) -> derivative`
/// pair. The derivative takes both the pre-activation input and the already
/// computed output so that cheap forms like `output * (1 - output)` can be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Identity. Layers using it keep a fixed, non-trainable zero bias.
    Linear,
    /// Logistic sigmoid, output in (0, 1).
    Sigmoid,
    /// `ln(1 + x)` for positive inputs, `-ln(1 - x)` otherwise.
    Logarithm,
    /// Sine of the input.
    Sine,
    /// Hyperbolic tangent, output in (-1, 1).
    Tanh,
}

impl Activation {
    /// Evaluate the activation function.
    #[inline]
    pub fn activate(self, input: f64) -> f64 {
        match self {
            Self::Linear => input,
            Self::Sigmoid => 1.0 / (1.0 + (-input).exp()),
            Self::Logarithm => {
                if input > 0.0 {
                    (1.0 + input).ln()
                } else {
                    -(1.0 - input).ln()
                }
            }
            Self::Sine => input.sin(),
            Self::Tanh => input.tanh(),
        }
    }

    /// Evaluate the derivative at `input`, given the output already computed
    /// by [`activate`](Self::activate).
    #[inline]
    pub fn derivative(self, input: f64, output: f64) -> f64 {
        match self {
            Self::Linear => 1.0,
            Self::Sigmoid => output * (1.0 - output),
            Self::Logarithm => 1.0 / (1.0 + input.abs()),
            Self::Sine => (1.0 - output * output).sqrt(),
            Self::Tanh => 1.0 - output * output,
        }
    }

    /// Whether layers with this activation train their biases.
    /// Linear layers keep a fixed zero bias.
    #[inline]
    pub fn has_trainable_bias(self) -> bool {
        !matches!(self, Self::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_identity() {
        assert_eq!(Activation::Linear.activate(3.25), 3.25);
        assert_eq!(Activation::Linear.derivative(3.25, 3.25), 1.0);
        assert!(!Activation::Linear.has_trainable_bias());
    }

    #[test]
    fn test_sigmoid_derivative_identity() {
        // D(x) == s(x) * (1 - s(x)) for all finite x
        for &x in &[-6.0, -1.0, 0.0, 0.5, 4.0] {
            let s = Activation::Sigmoid.activate(x);
            assert_relative_eq!(
                Activation::Sigmoid.derivative(x, s),
                s * (1.0 - s),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_sigmoid_range() {
        assert_relative_eq!(Activation::Sigmoid.activate(0.0), 0.5);
        assert!(Activation::Sigmoid.activate(20.0) > 0.999);
        assert!(Activation::Sigmoid.activate(-20.0) < 0.001);
    }

    #[test]
    fn test_tanh_is_odd() {
        for &x in &[0.1, 0.7, 2.3, 5.0] {
            assert_relative_eq!(
                Activation::Tanh.activate(-x),
                -Activation::Tanh.activate(x),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_logarithm_branches() {
        assert_relative_eq!(Activation::Logarithm.activate(1.0), 2.0f64.ln());
        assert_relative_eq!(Activation::Logarithm.activate(-1.0), -(2.0f64.ln()));
        // Derivative is symmetric in |input|
        assert_relative_eq!(
            Activation::Logarithm.derivative(2.0, 0.0),
            Activation::Logarithm.derivative(-2.0, 0.0)
        );
    }

    #[test]
    fn test_sine_derivative_from_output() {
        let x = 0.4f64;
        let out = Activation::Sine.activate(x);
        assert_relative_eq!(
            Activation::Sine.derivative(x, out),
            x.cos(),
            epsilon = 1e-12
        );
    }
}
