//! Feed-forward dense network classifier.
//!
//! The model artifact is a JSON list of layers. Each layer computes
//! `activation(x · W + b)` where `W` is stored input-major (one row per
//! input, one column per output), the same layout as a Keras dense kernel:
//!
//! ```json
//! {
//!   "labels": ["Abia", "Abuja", "..."],
//!   "layers": [
//!     { "weights": [[0.1, -0.3], [0.7, 0.2]], "bias": [0.0, 0.1], "activation": "relu" },
//!     { "weights": [[...], [...]], "bias": [...] }
//!   ]
//! }
//! ```

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::{ArtifactError, ArtifactKind, InferenceError, predictor::softmax};

/// Maps a feature vector to one raw score per label index.
pub trait Classifier: Send + Sync {
    /// Number of features [`Classifier::scores`] expects.
    fn input_len(&self) -> usize;

    /// Number of scores [`Classifier::scores`] returns.
    fn output_len(&self) -> usize;

    /// Scores one feature vector.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if the input has the wrong shape or
    /// scoring fails.
    fn scores(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Element-wise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity.
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(self, z: Array1<f64>) -> Result<Array1<f64>, InferenceError> {
        Ok(match self {
            Self::Linear => z,
            Self::Relu => z.mapv_into(|v| v.max(0.0)),
            Self::Sigmoid => z.mapv_into(|v| 1.0 / (1.0 + (-v).exp())),
            Self::Tanh => z.mapv_into(f64::tanh),
            Self::Softmax => Array1::from(softmax(&z.to_vec())?),
        })
    }
}

/// On-disk layer description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Kernel, one row per input.
    pub weights: Vec<Vec<f64>>,
    /// One bias per output.
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

/// On-disk model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Label manifest: the label each output index was trained on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub layers: Vec<LayerSpec>,
}

/// A validated dense layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl DenseLayer {
    /// Builds a layer from an input-major kernel and a bias vector.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if the kernel is empty, the bias
    /// length differs from the kernel's column count, or any parameter is
    /// non-finite.
    pub fn new(
        weights: Array2<f64>,
        bias: Array1<f64>,
        activation: Activation,
    ) -> Result<Self, ArtifactError> {
        if weights.is_empty() {
            return Err(invalid("layer has an empty kernel"));
        }
        if weights.ncols() != bias.len() {
            return Err(invalid(format!(
                "kernel has {} outputs but bias has {}",
                weights.ncols(),
                bias.len()
            )));
        }
        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(invalid("layer has non-finite parameters"));
        }

        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    fn from_spec(index: usize, spec: LayerSpec) -> Result<Self, ArtifactError> {
        let rows = spec.weights.len();
        let cols = spec.weights.first().map_or(0, Vec::len);

        if let Some(r) = spec.weights.iter().position(|row| row.len() != cols) {
            return Err(invalid(format!(
                "layer {index} kernel row {r} has {} weights, expected {cols}",
                spec.weights[r].len()
            )));
        }

        let flat: Vec<f64> = spec.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| invalid(format!("layer {index} kernel: {e}")))?;

        Self::new(weights, Array1::from(spec.bias), spec.activation).map_err(|e| match e {
            ArtifactError::Invalid { kind, message } => ArtifactError::Invalid {
                kind,
                message: format!("layer {index}: {message}"),
            },
            other => other,
        })
    }

    #[must_use]
    pub fn input_len(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        self.weights.ncols()
    }

    fn forward(&self, input: &Array1<f64>) -> Result<Array1<f64>, InferenceError> {
        let z = input.dot(&self.weights) + &self.bias;
        self.activation.apply(z)
    }
}

/// A stack of dense layers whose widths chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Chains layers into a network.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if there are no layers or a layer's
    /// input width differs from the previous layer's output width.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ArtifactError> {
        if layers.is_empty() {
            return Err(invalid("model has no layers"));
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[1].input_len() != pair[0].output_len() {
                return Err(invalid(format!(
                    "layer {} expects {} inputs but layer {i} emits {}",
                    i + 1,
                    pair[1].input_len(),
                    pair[0].output_len()
                )));
            }
        }

        Ok(Self { layers })
    }

    /// Builds a network from its on-disk layer descriptions. The label
    /// manifest is not inspected here.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if any layer is malformed or the
    /// layers do not chain.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        let layers = artifact
            .layers
            .into_iter()
            .enumerate()
            .map(|(i, spec)| DenseLayer::from_spec(i, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(layers)
    }

    #[must_use]
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl Classifier for DenseNetwork {
    fn input_len(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_len)
    }

    fn output_len(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_len)
    }

    fn scores(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let expected = self.input_len();
        if features.len() != expected {
            return Err(InferenceError::FeatureCount {
                expected,
                found: features.len(),
            });
        }

        let mut activations = Array1::from(features.to_vec());
        for layer in &self.layers {
            activations = layer.forward(&activations)?;
        }

        Ok(activations.to_vec())
    }
}

fn invalid(message: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid {
        kind: ArtifactKind::Model,
        message: message.into(),
    }
}
