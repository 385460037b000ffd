//! Fixed-topology feed-forward network shared across all agents
//!
//! One "global brain" scores every action for every agent; individual
//! agents only differ in the features they feed it. Trained offline by
//! mutation against reported episode fitness.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Random init range for weights
const WEIGHT_INIT: f32 = 0.5;

/// Random init range for biases
const BIAS_INIT: f32 = 0.1;

/// Feed-forward network with tanh hidden layers and sigmoid output
///
/// Shapes derive strictly from `layers`: `weights[l][n][p]` connects neuron
/// `n` of layer `l` to neuron `p` of layer `l-1`. The input layer carries no
/// weights or biases, so `weights[0]` and `biases[0]` are empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNet {
    layers: Vec<usize>,
    weights: Vec<Vec<Vec<f32>>>,
    biases: Vec<Vec<f32>>,
}

impl NeuralNet {
    /// Construct with random weights in [-0.5, 0.5], biases in [-0.1, 0.1]
    pub fn random(layers: Vec<usize>, rng: &mut impl Rng) -> Self {
        assert!(layers.len() >= 2, "network needs input and output layers");

        let mut weights = vec![Vec::new()];
        let mut biases = vec![Vec::new()];

        for l in 1..layers.len() {
            let mut layer_weights = Vec::with_capacity(layers[l]);
            let mut layer_biases = Vec::with_capacity(layers[l]);
            for _ in 0..layers[l] {
                layer_weights.push(
                    (0..layers[l - 1])
                        .map(|_| rng.gen_range(-WEIGHT_INIT..=WEIGHT_INIT))
                        .collect(),
                );
                layer_biases.push(rng.gen_range(-BIAS_INIT..=BIAS_INIT));
            }
            weights.push(layer_weights);
            biases.push(layer_biases);
        }

        Self {
            layers,
            weights,
            biases,
        }
    }

    pub fn input_size(&self) -> usize {
        self.layers[0]
    }

    pub fn output_size(&self) -> usize {
        *self.layers.last().expect("layers is never empty")
    }

    /// Forward pass. Hidden layers use tanh, the output layer sigmoid, so
    /// every output lands in (0, 1) like the rule scores.
    pub fn feed_forward(&self, inputs: &[f32]) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), self.input_size());

        let last = self.layers.len() - 1;
        let mut activations = inputs.to_vec();

        for l in 1..self.layers.len() {
            let mut next = Vec::with_capacity(self.layers[l]);
            for n in 0..self.layers[l] {
                let sum: f32 = self.weights[l][n]
                    .iter()
                    .zip(activations.iter())
                    .map(|(w, a)| w * a)
                    .sum::<f32>()
                    + self.biases[l][n];

                next.push(if l == last {
                    sigmoid(sum)
                } else {
                    sum.tanh()
                });
            }
            activations = next;
        }

        activations
    }

    /// Perturb each weight and bias with probability `rate` by a uniform
    /// offset in [-strength, strength]
    pub fn mutate(&mut self, rate: f32, strength: f32, rng: &mut impl Rng) {
        for layer in &mut self.weights {
            for neuron in layer {
                for weight in neuron {
                    if rng.gen::<f32>() < rate {
                        *weight += rng.gen_range(-strength..=strength);
                    }
                }
            }
        }
        for layer in &mut self.biases {
            for bias in layer {
                if rng.gen::<f32>() < rate {
                    *bias += rng.gen_range(-strength..=strength);
                }
            }
        }
    }

    /// Validate a deserialized net against the expected interface shape
    pub fn shape_matches(&self, inputs: usize, outputs: usize) -> bool {
        self.input_size() == inputs && self.output_size() == outputs
    }
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

/// The shared brain plus its save ratchet
#[derive(Debug, Clone)]
pub struct GlobalBrain {
    pub net: NeuralNet,
    /// Best fitness reported this session; the brain only persists when a
    /// new report beats both this and the save threshold
    best_fitness: f32,
    save_threshold: f32,
}

/// Episode results folded into a fitness scalar
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeReport {
    pub survival_seconds: f32,
    pub kills: u32,
    pub damage_dealt: f32,
}

impl EpisodeReport {
    /// fitness = survival + kills * 50 + damage * 0.1
    pub fn fitness(&self) -> f32 {
        self.survival_seconds + self.kills as f32 * 50.0 + self.damage_dealt * 0.1
    }
}

impl GlobalBrain {
    pub fn new(net: NeuralNet, save_threshold: f32) -> Self {
        Self {
            net,
            best_fitness: f32::MIN,
            save_threshold,
        }
    }

    /// Load a persisted net if its shape still matches the action set,
    /// otherwise reinitialize randomly
    pub fn from_snapshot(
        snapshot: Option<NeuralNet>,
        layers: Vec<usize>,
        save_threshold: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let inputs = layers[0];
        let outputs = *layers.last().expect("layers is never empty");

        let net = match snapshot {
            Some(net) if net.shape_matches(inputs, outputs) => {
                info!("loaded persisted brain");
                net
            }
            Some(net) => {
                warn!(
                    persisted_inputs = net.input_size(),
                    persisted_outputs = net.output_size(),
                    expected_inputs = inputs,
                    expected_outputs = outputs,
                    "persisted brain shape mismatch, reinitializing"
                );
                NeuralNet::random(layers, rng)
            }
            None => NeuralNet::random(layers, rng),
        };

        Self::new(net, save_threshold)
    }

    /// Report an episode. Returns true when the brain should be persisted:
    /// the fitness beats the save bar and every earlier report this session.
    pub fn report_fitness(&mut self, report: EpisodeReport) -> bool {
        let fitness = report.fitness();
        if fitness > self.save_threshold && fitness > self.best_fitness {
            self.best_fitness = fitness;
            info!(fitness, "brain fitness ratchet advanced, persisting");
            return true;
        }
        false
    }
}
