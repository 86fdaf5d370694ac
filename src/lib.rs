//! # Sombrero
//!
//! Neural network engine with backpropagation and self-organizing maps.
//!
//! ## Features
//!
//! - **Supervised**: multilayer networks trained by error backpropagation
//! - **Unsupervised**: Kohonen self-organizing maps on 2D and N-dimensional lattices
//! - **Parallel**: per-layer data parallelism via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust
//! use sombrero::{
//!     Activation, ActivationLayer, ConnectionMode, Initializer, Network, TrainingMethod,
//!     TrainingSample, TrainingSet,
//! };
//!
//! // Build a 2-3-1 sigmoid network
//! let mut network = Network::new_with_seed(TrainingMethod::Supervised, 42);
//! let input = network.add_layer(ActivationLayer::new(Activation::Linear, 2).unwrap());
//! let hidden = network.add_layer(ActivationLayer::new(Activation::Sigmoid, 3).unwrap());
//! let output = network.add_layer(ActivationLayer::new(Activation::Sigmoid, 1).unwrap());
//! network
//!     .connect(input, hidden, ConnectionMode::Complete, Initializer::random_unit())
//!     .unwrap();
//! network
//!     .connect(hidden, output, ConnectionMode::Complete, Initializer::random_unit())
//!     .unwrap();
//!
//! // Train
//! let mut set = TrainingSet::new(2, 1);
//! set.add(TrainingSample::supervised(vec![0.0, 1.0], vec![1.0])).unwrap();
//! set.add(TrainingSample::supervised(vec![1.0, 1.0], vec![0.0])).unwrap();
//! network.learn(&set, 100).unwrap();
//!
//! // Query
//! let prediction = network.run(&[0.0, 1.0]).unwrap();
//! assert_eq!(prediction.len(), 1);
//! ```
//!
//! ## Self-organizing maps
//!
//! ```rust
//! use sombrero::{
//!     Activation, ActivationLayer, ConnectionMode, Initializer, KohonenLayer, LatticeTopology,
//!     Layer, NeighborhoodFunction, Network, TrainingMethod, TrainingSample, TrainingSet,
//! };
//!
//! let mut network = Network::new_with_seed(TrainingMethod::Unsupervised, 7);
//! let input = network.add_layer(ActivationLayer::new(Activation::Linear, 3).unwrap());
//! let lattice = KohonenLayer::new(
//!     8,
//!     8,
//!     NeighborhoodFunction::gaussian(5.0),
//!     LatticeTopology::Rectangular,
//! )
//! .unwrap();
//! let map = network.add_layer(Layer::Kohonen(lattice));
//! network
//!     .connect(input, map, ConnectionMode::Complete, Initializer::random_unit())
//!     .unwrap();
//!
//! let mut colors = TrainingSet::unsupervised(3);
//! colors.add(TrainingSample::unsupervised(vec![1.0, 0.0, 0.0])).unwrap();
//! colors.add(TrainingSample::unsupervised(vec![0.0, 0.0, 1.0])).unwrap();
//! network.learn(&colors, 200).unwrap();
//!
//! network.run(&[0.9, 0.1, 0.1]).unwrap();
//! let winner = network.winner().unwrap();
//! assert!(winner[0] < 8 && winner[1] < 8);
//! ```
//!
//! ## Persistence
//!
//! ```rust,no_run
//! use sombrero::{persist, Network, TrainingMethod};
//!
//! let network = Network::new_with_seed(TrainingMethod::Supervised, 1);
//! persist::save(&network, "model.somb").unwrap();
//! let restored = persist::load("model.somb").unwrap();
//! ```

pub mod activation;
pub mod config;
pub mod connector;
pub mod error;
pub mod initializer;
pub mod kohonen;
pub mod lattice;
pub mod layer;
pub mod neighborhood;
pub mod network;
pub mod persist;
pub mod rate;
pub mod trainer;
pub mod training;

// Re-export main types
pub use activation::Activation;
pub use config::TrainingConfig;
pub use connector::{ConnectionMode, Connector, Synapse};
pub use error::NetworkError;
pub use initializer::Initializer;
pub use kohonen::{KohonenLayer, KohonenLayerNd};
pub use lattice::{AddressBook, LatticeTopology};
pub use layer::{ActivationLayer, Layer};
pub use neighborhood::NeighborhoodFunction;
pub use network::{Network, TrainingMethod};
pub use persist::PersistError;
pub use rate::LearningRateSchedule;
pub use trainer::{TrainerHandle, TrainingSnapshot};
pub use training::{TrainingObserver, TrainingSample, TrainingSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
