//! Color-mapping self-organizing map, trained on a background thread.
//!
//! An 12x12 lattice learns to arrange eight RGB colors; similar colors end
//! up on nearby lattice cells. Snapshots are polled while training runs.

use std::thread;
use std::time::Duration;

use sombrero::{
    Activation, ActivationLayer, ConnectionMode, Initializer, KohonenLayer, LatticeTopology,
    Layer, NeighborhoodFunction, Network, TrainerHandle, TrainingConfig, TrainingMethod,
    TrainingSample, TrainingSet,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let colors: [(&str, [f64; 3]); 8] = [
        ("red", [1.0, 0.0, 0.0]),
        ("green", [0.0, 1.0, 0.0]),
        ("blue", [0.0, 0.0, 1.0]),
        ("yellow", [1.0, 1.0, 0.0]),
        ("cyan", [0.0, 1.0, 1.0]),
        ("magenta", [1.0, 0.0, 1.0]),
        ("white", [1.0, 1.0, 1.0]),
        ("grey", [0.3, 0.3, 0.3]),
    ];

    let mut network = Network::new_with_seed(TrainingMethod::Unsupervised, 99);
    let input = network.add_layer(ActivationLayer::new(Activation::Linear, 3).unwrap());
    let mut lattice = KohonenLayer::new(
        12,
        12,
        NeighborhoodFunction::gaussian(8.0),
        LatticeTopology::Rectangular,
    )
    .unwrap();
    lattice.set_parallel(true);
    let map = network.add_layer(Layer::Kohonen(lattice));
    network
        .connect(input, map, ConnectionMode::Complete, Initializer::random_unit())
        .unwrap();

    let mut set = TrainingSet::unsupervised(3);
    for (_, rgb) in &colors {
        set.add(TrainingSample::unsupervised(rgb.to_vec())).unwrap();
    }

    let config = TrainingConfig {
        epochs: 2000,
        snapshot_interval: 200,
        ..TrainingConfig::default()
    };

    let handle = TrainerHandle::spawn(network, set, config);
    loop {
        thread::sleep(Duration::from_millis(50));
        if let Some(snapshot) = handle.try_recv_snapshot() {
            println!(
                "epoch {:>4}/{}: quantization mse = {:.6}",
                snapshot.epoch + 1,
                snapshot.epochs,
                snapshot.mean_squared_error
            );
            if snapshot.epoch + 1 == snapshot.epochs {
                break;
            }
        }
    }
    let mut network = handle.join().expect("training failed");

    println!("\ncolor -> lattice cell");
    for (name, rgb) in &colors {
        network.run(rgb).expect("run failed");
        let winner = network.winner().expect("no winner");
        println!("{:>8} -> ({}, {})", name, winner[0], winner[1]);
    }
}
