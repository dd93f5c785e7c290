//! Feed-forward evaluation network with symmetry-tied weights.
//!
//! Each [`Layer`] maps one [`GoShape`] onto another. Output neuron `n` owns a row
//! of `input.size() + 1` weights, the last being the bias. Rows are never written
//! one at a time: [`Layer::set_neuron`] assigns a representative's row and copies
//! it, remapped, to every neuron in the representative's orbit. As a result the
//! layer commutes with every board symmetry:
//!
//! ```text
//! compute(transform(input)) == transform(compute(input))
//! ```
//!
//! The whole network is also treated as a vector (add, scale, norm) by the trainer.

use rayon::prelude::*;

use crate::constants::{INITIAL_WEIGHT, LAYER_LENGTHS};
use crate::shape::{GoShape, Position, Shape, Symmetry};

/// `sign(x) * sqrt(|x|)`.
#[inline]
fn activation(x: f32) -> f32 {
    if x > 0.0 { x.sqrt() } else { -(-x).sqrt() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    input: GoShape,
    output: GoShape,
    /// `[output.size()][input.size() + 1]`, bias last.
    matrix: Vec<Vec<f32>>,
}

impl Layer {
    /// A layer with every weight set to [`INITIAL_WEIGHT`].
    pub fn new(input: GoShape, output: GoShape) -> Self {
        let mut layer = Self::zeroed(input, output);
        layer.reset_constant(INITIAL_WEIGHT);
        layer
    }

    pub(crate) fn zeroed(input: GoShape, output: GoShape) -> Self {
        let matrix = vec![vec![0.0; input.size() + 1]; output.size()];
        Self {
            input,
            output,
            matrix,
        }
    }

    #[inline]
    pub fn input(&self) -> &GoShape {
        &self.input
    }

    #[inline]
    pub fn output(&self) -> &GoShape {
        &self.output
    }

    #[inline]
    pub fn matrix(&self) -> &[Vec<f32>] {
        &self.matrix
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.matrix
    }

    /// Weights per neuron, bias included.
    #[inline]
    pub fn width(&self) -> usize {
        self.input.size() + 1
    }

    /// Forward pass. Neurons are evaluated in parallel; each one sums its inputs
    /// in index order, so results do not depend on scheduling.
    pub fn compute(&self, data: &[f32]) -> Vec<f32> {
        debug_assert_eq!(data.len(), self.input.size());
        let bias = self.input.size();
        self.matrix
            .par_iter()
            .map(|row| {
                let mut sum = row[bias];
                for (w, x) in row[..bias].iter().zip(data) {
                    sum += w * x;
                }
                activation(sum)
            })
            .collect()
    }

    /// Output neurons that carry independently trainable weights.
    pub fn representative_neurons(&self) -> Vec<Position> {
        self.output
            .representatives()
            .iter()
            .filter_map(|&r| self.output.at(r))
            .collect()
    }

    /// Index of input weight `w` after `symmetry`. The bias never moves.
    fn map_input(&self, symmetry: Symmetry, w: usize) -> usize {
        match self.input.at(w) {
            Some(pos) => self.input.transform(symmetry, pos).index(),
            None => w,
        }
    }

    /// Transforms that map `neuron` onto itself.
    fn stabilizer(&self, neuron: Position) -> Vec<Symmetry> {
        self.output
            .symmetries()
            .iter()
            .copied()
            .filter(|&s| self.output.transform(s, neuron) == neuron)
            .collect()
    }

    /// Columns of `neuron`'s row that must hold the same weight as column `w`.
    ///
    /// Sorted, and always containing `w` itself.
    pub fn tied_inputs(&self, neuron: Position, w: usize) -> Vec<usize> {
        let mut columns: Vec<usize> = self
            .stabilizer(neuron)
            .into_iter()
            .map(|s| self.map_input(s, w))
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    /// Assign `weights` to `neuron` and to every image of it under the symmetry group.
    ///
    /// For each transform `t`, row `t(neuron)` receives the weights with input `w`
    /// moved to `t(w)`. When transforms fix `neuron`, the row must itself be fixed by
    /// them, so the weights are first averaged over that stabilizer. A row that is
    /// already constant on every [`Layer::tied_inputs`] group is stored unchanged.
    pub fn set_neuron(&mut self, neuron: Position, weights: &[f32]) {
        assert_eq!(weights.len(), self.width(), "weight row has the wrong length");
        let symmetries = self.output.symmetries().to_vec();

        let stabilizer = self.stabilizer(neuron);
        let tied: Vec<f32> = (0..weights.len())
            .map(|w| {
                let images: Vec<f32> = stabilizer.iter().map(|&s| weights[self.map_input(s, w)]).collect();
                if images.iter().all(|&v| v == weights[w]) {
                    weights[w]
                } else {
                    images.iter().sum::<f32>() / images.len() as f32
                }
            })
            .collect();

        for &symmetry in &symmetries {
            let row = self.output.transform(symmetry, neuron).index();
            for (w, &value) in tied.iter().enumerate() {
                let column = self.map_input(symmetry, w);
                self.matrix[row][column] = value;
            }
        }
    }

    /// Zero every weight.
    pub fn reset(&mut self) {
        for row in &mut self.matrix {
            row.fill(0.0);
        }
    }

    /// Give every weight of every neuron the same value.
    pub fn reset_constant(&mut self, value: f32) {
        let weights = vec![value; self.width()];
        for neuron in self.representative_neurons() {
            self.set_neuron(neuron, &weights);
        }
    }

    /// Draw each representative's weights uniformly from `[-magnitude, magnitude]`.
    pub fn reset_uniform(&mut self, magnitude: f32, rng: &mut fastrand::Rng) {
        for neuron in self.representative_neurons() {
            let weights: Vec<f32> = (0..self.width())
                .map(|_| (rng.f32() * 2.0 - 1.0) * magnitude)
                .collect();
            self.set_neuron(neuron, &weights);
        }
    }

    pub fn copy_from(&mut self, other: &Layer) {
        debug_assert!(self.same_topology(other));
        for (dst, src) in self.matrix.iter_mut().zip(&other.matrix) {
            dst.copy_from_slice(src);
        }
    }

    pub fn add(&mut self, summand: &Layer) {
        debug_assert!(self.same_topology(summand));
        for (dst, src) in self.matrix.iter_mut().zip(&summand.matrix) {
            for (a, b) in dst.iter_mut().zip(src) {
                *a += b;
            }
        }
    }

    pub fn mult(&mut self, factor: f32) {
        for row in &mut self.matrix {
            for w in row.iter_mut() {
                *w *= factor;
            }
        }
    }

    /// Sum of squared weights.
    pub fn square_size(&self) -> f64 {
        self.matrix
            .iter()
            .flatten()
            .map(|&w| f64::from(w) * f64::from(w))
            .sum()
    }

    pub fn same_topology(&self, other: &Layer) -> bool {
        self.input.length() == other.input.length() && self.output.length() == other.output.length()
    }
}

/// An ordered stack of layers reducing a board to a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Build a network whose layer `k` outputs a square of `lengths[k]`.
    ///
    /// The first layer reads `board`; the last length should be 1.
    pub fn new(board: &GoShape, lengths: &[usize]) -> Self {
        let mut layers = Vec::with_capacity(lengths.len());
        let mut input = board.clone();
        for &length in lengths {
            let output = GoShape::new(length);
            layers.push(Layer::new(input, output.clone()));
            input = output;
        }
        Self { layers }
    }

    /// The default topology for `board`, see [`LAYER_LENGTHS`].
    pub fn standard(board: &GoShape) -> Self {
        Self::new(board, LAYER_LENGTHS)
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn compute(&self, input: &[f32]) -> Vec<f32> {
        self.layers
            .iter()
            .fold(input.to_vec(), |data, layer| layer.compute(&data))
    }

    /// Scalar evaluation: the first output of the last layer.
    pub fn evaluate(&self, input: &[f32]) -> f32 {
        self.compute(input).first().copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.layers.par_iter_mut().for_each(Layer::reset);
    }

    pub fn reset_constant(&mut self, value: f32) {
        self.layers
            .par_iter_mut()
            .for_each(|layer| layer.reset_constant(value));
    }

    /// Uniform random weights. Each layer gets its own generator seeded from `rng`.
    pub fn reset_uniform(&mut self, magnitude: f32, rng: &mut fastrand::Rng) {
        let seeds: Vec<u64> = self.layers.iter().map(|_| rng.u64(..)).collect();
        self.layers
            .par_iter_mut()
            .zip(seeds)
            .for_each(|(layer, seed)| layer.reset_uniform(magnitude, &mut fastrand::Rng::with_seed(seed)));
    }

    pub fn copy_from(&mut self, other: &Network) {
        for (dst, src) in self.layers.iter_mut().zip(&other.layers) {
            dst.copy_from(src);
        }
    }

    pub fn add(&mut self, summand: &Network) {
        for (dst, src) in self.layers.iter_mut().zip(&summand.layers) {
            dst.add(src);
        }
    }

    pub fn mult(&mut self, factor: f32) {
        for layer in &mut self.layers {
            layer.mult(factor);
        }
    }

    /// Euclidean norm over every weight of every layer.
    pub fn magnitude(&self) -> f32 {
        self.layers
            .iter()
            .map(Layer::square_size)
            .sum::<f64>()
            .sqrt() as f32
    }

    /// Rescale all weights so the norm becomes `target`. A zero network stays zero.
    pub fn set_magnitude(&mut self, target: f32) {
        let current = self.magnitude();
        if current > 0.0 {
            self.mult(target / current);
        }
    }

    pub fn same_topology(&self, other: &Network) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.same_topology(b))
    }
}
