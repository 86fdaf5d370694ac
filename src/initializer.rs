//! Weight and bias initialization strategies.
//!
//! An initializer populates connector weights and (where trainable) layer
//! biases when a network is built, and again whenever `initialize()` is
//! invoked to reset training. Every call draws fresh values.

use crate::error::NetworkError;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Strategy used to populate synapse weights and neuron biases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// Uniform random draw in `[min, max)` per weight/bias.
    Random { min: f64, max: f64 },
    /// Fixed value for every weight/bias.
    Constant(f64),
    /// All zeros. Shorthand for `Constant(0.0)`.
    Zero,
    /// Pre-seed connector weights directly from a supplied flattened vector,
    /// used to resume or clone a specific starting configuration. Does
    /// nothing when applied to a layer's biases.
    GivenInput(Vec<f64>),
}

impl Initializer {
    /// Uniform random initializer over `[0, 1)`, the default for Kohonen
    /// connectors.
    pub fn random_unit() -> Self {
        Self::Random { min: 0.0, max: 1.0 }
    }

    /// Populate a bias slice. `GivenInput` is a no-op on layers.
    pub fn initialize_biases(&self, biases: &mut [f64], rng: &mut ChaCha8Rng) {
        match self {
            Self::Random { min, max } => {
                for b in biases.iter_mut() {
                    *b = rng.gen_range(*min..*max);
                }
            }
            Self::Constant(v) => biases.fill(*v),
            Self::Zero => biases.fill(0.0),
            Self::GivenInput(_) => {}
        }
    }

    /// Populate a weight slice.
    ///
    /// Fails with a dimension mismatch if a `GivenInput` vector does not
    /// cover the synapse count exactly.
    pub fn initialize_weights(
        &self,
        weights: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> Result<(), NetworkError> {
        match self {
            Self::Random { min, max } => {
                for w in weights.iter_mut() {
                    *w = rng.gen_range(*min..*max);
                }
            }
            Self::Constant(v) => weights.fill(*v),
            Self::Zero => weights.fill(0.0),
            Self::GivenInput(values) => {
                if values.len() != weights.len() {
                    return Err(NetworkError::DimensionMismatch {
                        expected: weights.len(),
                        found: values.len(),
                    });
                }
                weights.copy_from_slice(values);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_within_limits() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let init = Initializer::Random { min: -0.25, max: 0.25 };
        let mut weights = vec![0.0; 64];
        init.initialize_weights(&mut weights, &mut rng).unwrap();

        assert!(weights.iter().all(|&w| (-0.25..0.25).contains(&w)));
        assert!(weights.iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_reinitialize_draws_fresh_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let init = Initializer::random_unit();
        let mut first = vec![0.0; 16];
        let mut second = vec![0.0; 16];

        init.initialize_weights(&mut first, &mut rng).unwrap();
        init.initialize_weights(&mut second, &mut rng).unwrap();

        assert_ne!(first, second, "each initialize() call must reseed");
    }

    #[test]
    fn test_zero_and_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut weights = vec![9.0; 4];
        Initializer::Zero.initialize_weights(&mut weights, &mut rng).unwrap();
        assert_eq!(weights, vec![0.0; 4]);

        Initializer::Constant(1.5).initialize_weights(&mut weights, &mut rng).unwrap();
        assert_eq!(weights, vec![1.5; 4]);
    }

    #[test]
    fn test_given_input_seeds_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let init = Initializer::GivenInput(vec![0.1, 0.2, 0.3]);
        let mut weights = vec![0.0; 3];
        init.initialize_weights(&mut weights, &mut rng).unwrap();
        assert_eq!(weights, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_given_input_length_mismatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let init = Initializer::GivenInput(vec![0.1, 0.2]);
        let mut weights = vec![0.0; 3];
        assert!(matches!(
            init.initialize_weights(&mut weights, &mut rng),
            Err(NetworkError::DimensionMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_given_input_noop_on_biases() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let init = Initializer::GivenInput(vec![0.1, 0.2, 0.3]);
        let mut biases = vec![0.5; 3];
        init.initialize_biases(&mut biases, &mut rng);
        assert_eq!(biases, vec![0.5; 3]);
    }
}
