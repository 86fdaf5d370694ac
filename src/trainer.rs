//! Background training thread, controlled over channels.
//!
//! Training runs on its own OS thread inside a dedicated rayon pool. The
//! owner polls progress snapshots without blocking and can request a stop,
//! which takes effect at the next epoch boundary so no epoch is ever torn.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::config::TrainingConfig;
use crate::error::NetworkError;
use crate::network::Network;
use crate::training::TrainingSet;

/// Commands accepted by the training thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerCommand {
    /// Finish the current epoch, then end the run.
    Stop,
}

/// Progress report emitted between epochs.
#[derive(Debug, Clone)]
pub struct TrainingSnapshot {
    /// Epoch that just finished (zero-based)
    pub epoch: usize,
    /// Total epochs in the schedule
    pub epochs: usize,
    /// Mean squared error over the finished epoch
    pub mean_squared_error: f64,
    /// Output lattice winner coordinate, if the output layer is a Kohonen layer
    pub winner: Option<Vec<usize>>,
    /// Copy of the output connector's weights, so a poller can redraw a
    /// lattice without touching the live network
    pub output_weights: Vec<f64>,
}

/// Handle for controlling the training thread
pub struct TrainerHandle {
    /// Thread handle
    thread: Option<JoinHandle<()>>,
    /// Channel to send commands to the trainer
    command_tx: Sender<TrainerCommand>,
    /// Channel to receive snapshots from the trainer
    snapshot_rx: Receiver<TrainingSnapshot>,
    /// Channel delivering the trained network when the run ends
    result_rx: Receiver<Result<Network, NetworkError>>,
}

impl TrainerHandle {
    /// Spawn a training thread that takes ownership of the network, trains
    /// it on the given set, and hands it back through [`TrainerHandle::join`].
    pub fn spawn(network: Network, training_set: TrainingSet, config: TrainingConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            run_training(network, training_set, config, command_rx, snapshot_tx, result_tx);
        });

        Self {
            thread: Some(thread),
            command_tx,
            snapshot_rx,
            result_rx,
        }
    }

    /// Request a stop at the next epoch boundary.
    pub fn stop(&self) {
        let _ = self.command_tx.send(TrainerCommand::Stop);
    }

    /// Try to receive the latest snapshot (non-blocking)
    pub fn try_recv_snapshot(&self) -> Option<TrainingSnapshot> {
        let mut latest = None;
        // Drain all available snapshots, keep only the latest
        loop {
            match self.snapshot_rx.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    /// Receive every snapshot queued so far, oldest first (non-blocking).
    pub fn drain_snapshots(&self) -> Vec<TrainingSnapshot> {
        let mut snapshots = Vec::new();
        loop {
            match self.snapshot_rx.try_recv() {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        snapshots
    }

    /// Block until the run ends and take the trained network back.
    pub fn join(mut self) -> Result<Network, NetworkError> {
        let result = self.result_rx.recv().unwrap_or_else(|_| {
            Err(NetworkError::Construction(
                "training thread ended without delivering a result".to_string(),
            ))
        });
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        result
    }
}

impl Drop for TrainerHandle {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Main training loop running in a separate thread
fn run_training(
    network: Network,
    training_set: TrainingSet,
    config: TrainingConfig,
    command_rx: Receiver<TrainerCommand>,
    snapshot_tx: Sender<TrainingSnapshot>,
    result_tx: Sender<Result<Network, NetworkError>>,
) {
    let outcome = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_worker_threads())
        .build()
    {
        Ok(pool) => pool.install(move || {
            train_loop(network, &training_set, &config, command_rx, snapshot_tx)
        }),
        Err(e) => Err(NetworkError::Construction(format!(
            "failed to build worker pool: {}",
            e
        ))),
    };
    let _ = result_tx.send(outcome);
}

fn train_loop(
    mut network: Network,
    training_set: &TrainingSet,
    config: &TrainingConfig,
    command_rx: Receiver<TrainerCommand>,
    snapshot_tx: Sender<TrainingSnapshot>,
) -> Result<Network, NetworkError> {
    network.set_randomize_order(config.shuffle);
    if config.jitter_limit > 0.0 {
        network.jitter(config.jitter_limit);
    }

    log::info!(
        "trainer started: {} epochs, {} samples, {} workers",
        config.epochs,
        training_set.len(),
        config.effective_worker_threads()
    );

    for epoch in 0..config.epochs {
        // Process commands (non-blocking)
        match command_rx.try_recv() {
            Ok(TrainerCommand::Stop) => {
                log::info!("stop requested, ending before epoch {}", epoch);
                break;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::warn!("trainer handle dropped, ending before epoch {}", epoch);
                break;
            }
        }

        network.learn_epoch(training_set, epoch, config.epochs)?;

        // Send snapshot periodically
        if config.snapshot_interval > 0 && (epoch + 1) % config.snapshot_interval == 0 {
            let _ = snapshot_tx.send(TrainingSnapshot {
                epoch,
                epochs: config.epochs,
                mean_squared_error: network.mean_squared_error(),
                winner: network.winner(),
                output_weights: network
                    .connectors()
                    .last()
                    .map(|c| c.weights())
                    .unwrap_or_default(),
            });
        }
    }

    log::info!("trainer finished: mse = {:.6}", network.mean_squared_error());
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::connector::ConnectionMode;
    use crate::initializer::Initializer;
    use crate::layer::ActivationLayer;
    use crate::network::TrainingMethod;
    use crate::training::TrainingSample;

    fn simple_network() -> Network {
        let mut net = Network::new_with_seed(TrainingMethod::Supervised, 5);
        let a = net.add_layer(ActivationLayer::new(Activation::Linear, 1).unwrap());
        let b = net.add_layer(ActivationLayer::new(Activation::Linear, 1).unwrap());
        net.connect(a, b, ConnectionMode::Complete, Initializer::Zero).unwrap();
        net
    }

    fn simple_set() -> TrainingSet {
        let mut set = TrainingSet::new(1, 1);
        set.add(TrainingSample::supervised(vec![1.0], vec![0.5])).unwrap();
        set
    }

    #[test]
    fn test_trainer_runs_to_completion() {
        let config = TrainingConfig {
            epochs: 20,
            snapshot_interval: 5,
            worker_threads: 2,
            ..TrainingConfig::default()
        };
        let handle = TrainerHandle::spawn(simple_network(), simple_set(), config);
        let trained = handle.join().unwrap();
        assert!(trained.mean_squared_error() < 0.25, "training must reduce the error");
    }

    #[test]
    fn test_snapshots_arrive_in_epoch_order() {
        let config = TrainingConfig {
            epochs: 30,
            snapshot_interval: 10,
            worker_threads: 2,
            ..TrainingConfig::default()
        };
        let handle = TrainerHandle::spawn(simple_network(), simple_set(), config);
        // Wait for completion so every snapshot is queued
        let result_peek = handle.result_rx.recv();
        assert!(result_peek.is_ok());

        let snapshots = handle.drain_snapshots();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(
            snapshots.iter().map(|s| s.epoch).collect::<Vec<_>>(),
            vec![9, 19, 29]
        );
        for snapshot in &snapshots {
            assert_eq!(snapshot.epochs, 30);
        }
    }

    #[test]
    fn test_stop_before_first_epoch() {
        let config = TrainingConfig {
            epochs: 1_000_000,
            snapshot_interval: 0,
            worker_threads: 1,
            ..TrainingConfig::default()
        };
        let mut net = simple_network();
        net.set_randomize_order(false);

        let handle = TrainerHandle::spawn(net, simple_set(), config);
        handle.stop();
        let trained = handle.join().unwrap();
        // The run ends at an epoch boundary, not mid-sample
        assert!(trained.mean_squared_error().is_finite());
    }
}
