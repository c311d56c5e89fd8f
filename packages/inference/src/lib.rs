#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate-to-state inference pipeline.
//!
//! Two artifacts drive the pipeline: a fitted [`Scaler`] and a trained
//! [`DenseNetwork`]. [`ArtifactLoader`] reads them once through an
//! [`ArtifactStore`] and hands out a shared [`Artifacts`] handle, which a
//! [`Predictor`] uses to turn a validated coordinate into a
//! [`RankedPrediction`]:
//!
//! scale → score → softmax → pair with labels → stable sort → top 3.

pub mod artifacts;
pub mod network;
pub mod predictor;
pub mod scaler;

pub use artifacts::{
    ArtifactKind, ArtifactLoader, ArtifactStore, Artifacts, DEFAULT_MODEL_PATH,
    DEFAULT_SCALER_PATH, FsArtifactStore, MODEL_PATH_ENV, SCALER_PATH_ENV, verify_labels,
};
pub use geo_state_inference_models::{RankedPrediction, StatePrediction};
pub use network::{Activation, Classifier, DenseLayer, DenseNetwork, LayerSpec, ModelArtifact};
pub use predictor::{Predictor, softmax};
pub use scaler::Scaler;

/// Number of raw features a coordinate contributes (latitude, longitude).
pub const COORDINATE_FEATURES: usize = 2;

/// Errors that make an artifact unusable. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The backing storage could not be read.
    #[error("Failed to read {kind} artifact from {location}: {source}")]
    Read {
        /// Which artifact.
        kind: ArtifactKind,
        /// Where it was read from.
        location: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON for its format.
    #[error("Failed to parse {kind} artifact from {location}: {source}")]
    Parse {
        /// Which artifact.
        kind: ArtifactKind,
        /// Where it was read from.
        location: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The artifact parsed but its parameters are unusable.
    #[error("Invalid {kind} artifact: {message}")]
    Invalid {
        /// Which artifact.
        kind: ArtifactKind,
        /// Description of what went wrong.
        message: String,
    },

    /// The model's label manifest disagrees with the built-in label order.
    #[error("Model label at index {index} is {found:?}, expected {expected:?}")]
    LabelMismatch {
        /// First index that differs.
        index: usize,
        /// Built-in label at that index.
        expected: String,
        /// Label recorded in the model artifact (empty if missing).
        found: String,
    },
}

/// Errors raised while scoring a single coordinate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    /// Input vector has the wrong number of features.
    #[error("expected {expected} features, got {found}")]
    FeatureCount {
        /// Features the stage expects.
        expected: usize,
        /// Features it was given.
        found: usize,
    },

    /// Classifier returned the wrong number of scores.
    #[error("classifier returned {found} scores, expected {expected}")]
    ScoreCount {
        /// One score per label.
        expected: usize,
        /// Scores actually returned.
        found: usize,
    },

    /// A score was NaN or infinite.
    #[error("non-finite score at index {index}")]
    NonFiniteScore {
        /// Offending position in the score vector.
        index: usize,
    },

    /// Softmax was asked to normalize nothing.
    #[error("cannot normalize an empty score vector")]
    EmptyScores,
}
