//! Fitted feature scalers.
//!
//! Parameters are produced by whatever fitted the model and stored as JSON,
//! tagged by `type`:
//!
//! ```json
//! { "type": "standard", "mean": [8.49, 7.43], "scale": [2.50, 2.43] }
//! ```

use serde::{Deserialize, Serialize};

use crate::{ArtifactError, ArtifactKind, InferenceError};

/// A fitted per-feature transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scaler {
    /// Standardization: `(x - mean) / scale`.
    Standard {
        /// Per-feature mean.
        mean: Vec<f64>,
        /// Per-feature standard deviation.
        scale: Vec<f64>,
    },
    /// Min-max scaling: `x * scale + min`.
    MinMax {
        /// Per-feature offset applied after scaling.
        min: Vec<f64>,
        /// Per-feature multiplier.
        scale: Vec<f64>,
    },
}

impl Scaler {
    /// Number of features this scaler was fitted on.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
        }
    }

    /// Checks that the fitted parameters can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if the parameter vectors are
    /// empty, differ in length, hold non-finite values, or (for
    /// standardization) hold a zero scale.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let (offsets, scale) = match self {
            Self::Standard { mean, scale } => (mean, scale),
            Self::MinMax { min, scale } => (min, scale),
        };

        if offsets.is_empty() {
            return Err(invalid("no fitted features"));
        }
        if offsets.len() != scale.len() {
            return Err(invalid(format!(
                "{} offsets but {} scale factors",
                offsets.len(),
                scale.len()
            )));
        }
        if let Some(i) = offsets
            .iter()
            .chain(scale)
            .position(|v| !v.is_finite())
        {
            return Err(invalid(format!("non-finite parameter at position {i}")));
        }
        if matches!(self, Self::Standard { .. })
            && let Some(i) = scale.iter().position(|s| s.abs() < f64::EPSILON)
        {
            return Err(invalid(format!("zero scale for feature {i}")));
        }

        Ok(())
    }

    /// Applies the transform to one raw feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::FeatureCount`] if `raw` does not match the
    /// fitted feature count.
    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let expected = self.feature_count();
        if raw.len() != expected {
            return Err(InferenceError::FeatureCount {
                expected,
                found: raw.len(),
            });
        }

        let scaled = match self {
            Self::Standard { mean, scale } => raw
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            Self::MinMax { min, scale } => raw
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x.mul_add(*s, *m))
                .collect(),
        };

        Ok(scaled)
    }
}

fn invalid(message: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid {
        kind: ArtifactKind::Scaler,
        message: message.into(),
    }
}
