//! Performance benchmarks for forward passes and training epochs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sombrero::{
    Activation, ActivationLayer, ConnectionMode, Initializer, KohonenLayer, LatticeTopology,
    Layer, NeighborhoodFunction, Network, TrainingMethod, TrainingSample, TrainingSet,
};

fn feedforward_network(hidden: usize) -> Network {
    let mut network = Network::new_with_seed(TrainingMethod::Supervised, 42);
    let input = network.add_layer(ActivationLayer::new(Activation::Linear, 64).unwrap());
    let mid = network.add_layer(ActivationLayer::new(Activation::Sigmoid, hidden).unwrap());
    let output = network.add_layer(ActivationLayer::new(Activation::Sigmoid, 16).unwrap());
    network
        .connect(input, mid, ConnectionMode::Complete, Initializer::random_unit())
        .unwrap();
    network
        .connect(mid, output, ConnectionMode::Complete, Initializer::random_unit())
        .unwrap();
    network
}

fn som_network(side: usize, parallel: bool) -> Network {
    let mut network = Network::new_with_seed(TrainingMethod::Unsupervised, 42);
    let input = network.add_layer(ActivationLayer::new(Activation::Linear, 16).unwrap());
    let mut lattice = KohonenLayer::new(
        side,
        side,
        NeighborhoodFunction::gaussian(side as f64 / 2.0),
        LatticeTopology::Rectangular,
    )
    .unwrap();
    lattice.set_parallel(parallel);
    let map = network.add_layer(Layer::Kohonen(lattice));
    network
        .connect(input, map, ConnectionMode::Complete, Initializer::random_unit())
        .unwrap();
    network
}

fn benchmark_forward_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_pass");
    let inputs = [0.5f64; 64];

    for hidden in [32, 128, 512].iter() {
        let mut network = feedforward_network(*hidden);
        group.bench_with_input(BenchmarkId::new("hidden", hidden), hidden, |b, _| {
            b.iter(|| network.run(black_box(&inputs)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_backprop_epoch(c: &mut Criterion) {
    let mut network = feedforward_network(128);
    network.set_randomize_order(false);

    let mut set = TrainingSet::new(64, 16);
    for i in 0..32 {
        let inputs: Vec<f64> = (0..64).map(|j| ((i * j) % 7) as f64 / 7.0).collect();
        let outputs: Vec<f64> = (0..16).map(|j| ((i + j) % 2) as f64).collect();
        set.add(TrainingSample::supervised(inputs, outputs)).unwrap();
    }

    c.bench_function("backprop_epoch_32_samples", |b| {
        let mut epoch = 0;
        b.iter(|| {
            network.learn_epoch(&set, epoch % 10_000, 10_000).unwrap();
            epoch += 1;
        });
    });
}

fn benchmark_som_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("som_epoch");

    let mut set = TrainingSet::unsupervised(16);
    for i in 0..16 {
        let inputs: Vec<f64> = (0..16).map(|j| ((i * 3 + j) % 11) as f64 / 11.0).collect();
        set.add(TrainingSample::unsupervised(inputs)).unwrap();
    }

    for side in [16, 48].iter() {
        for parallel in [false, true] {
            let mut network = som_network(*side, parallel);
            network.set_randomize_order(false);
            let label = format!("{}x{}_{}", side, side, if parallel { "par" } else { "seq" });
            group.bench_with_input(BenchmarkId::new("lattice", label), side, |b, _| {
                let mut epoch = 0;
                b.iter(|| {
                    network.learn_epoch(&set, epoch % 10_000, 10_000).unwrap();
                    epoch += 1;
                });
            });
        }
    }

    group.finish();
}

fn benchmark_persistence(c: &mut Criterion) {
    let network = feedforward_network(128);

    c.bench_function("network_serialize", |b| {
        b.iter(|| bincode::serialize(black_box(&network)).unwrap());
    });

    let serialized = bincode::serialize(&network).unwrap();

    c.bench_function("network_deserialize", |b| {
        b.iter(|| {
            let _: Network = bincode::deserialize(black_box(&serialized)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_forward_pass,
    benchmark_backprop_epoch,
    benchmark_som_epoch,
    benchmark_persistence,
);

criterion_main!(benches);
