//! Classic XOR: a 2-4-1 sigmoid network trained by backpropagation.

use sombrero::{
    Activation, ActivationLayer, ConnectionMode, Initializer, Layer, Network, TrainingMethod,
    TrainingSample, TrainingSet,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut network = Network::new_with_seed(TrainingMethod::Supervised, 29);
    let input = network.add_layer(ActivationLayer::new(Activation::Linear, 2).unwrap());
    let hidden = network.add_layer(ActivationLayer::new(Activation::Sigmoid, 4).unwrap());
    let output = network.add_layer(ActivationLayer::new(Activation::Sigmoid, 1).unwrap());
    let init = Initializer::Random { min: -1.0, max: 1.0 };
    network
        .connect(input, hidden, ConnectionMode::Complete, init.clone())
        .unwrap();
    network
        .connect(hidden, output, ConnectionMode::Complete, init)
        .unwrap();
    for index in [hidden, output] {
        if let Layer::Activation(l) = network.layer_mut(index) {
            l.set_learning_rate(0.5);
        }
    }

    let mut set = TrainingSet::new(2, 1);
    set.add(TrainingSample::supervised(vec![0.0, 0.0], vec![0.0])).unwrap();
    set.add(TrainingSample::supervised(vec![0.0, 1.0], vec![1.0])).unwrap();
    set.add(TrainingSample::supervised(vec![1.0, 0.0], vec![1.0])).unwrap();
    set.add(TrainingSample::supervised(vec![1.0, 1.0], vec![0.0])).unwrap();

    network.learn(&set, 8000).expect("training failed");
    println!("mse after training: {:.6}", network.mean_squared_error());

    for sample in set.samples() {
        let prediction = network.run(sample.inputs()).expect("run failed");
        println!(
            "{:?} -> {:.4} (expected {})",
            sample.inputs(),
            prediction[0],
            sample.outputs()[0]
        );
    }
}
