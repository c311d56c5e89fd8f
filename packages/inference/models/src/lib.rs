#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Prediction result types shared by the inference pipeline and its
//! front ends.

use geo_state_geography_models::NigerianState;
use serde::{Deserialize, Serialize};

/// Number of entries kept in a [`RankedPrediction`].
pub const TOP_N: usize = 3;

/// Medal icons shown next to the first [`TOP_N`] ranks.
pub const RANK_ICONS: [&str; TOP_N] = ["🥇", "🥈", "🥉"];

/// One label paired with the model's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePrediction {
    /// Predicted state.
    pub state: NigerianState,
    /// Confidence as a percentage (0-100).
    pub confidence: f64,
}

impl StatePrediction {
    /// Integer percentage for progress indicators, truncated and clamped to
    /// 0-100.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u8 {
        self.confidence.clamp(0.0, 100.0) as u8
    }
}

/// The most likely states for one coordinate, highest confidence first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    predictions: Vec<StatePrediction>,
}

impl RankedPrediction {
    /// Ranks a full distribution and keeps the top [`TOP_N`] entries.
    ///
    /// The sort is stable, so equal confidences keep their input order
    /// (label index order when the input comes straight from a classifier).
    #[must_use]
    pub fn rank(mut distribution: Vec<StatePrediction>) -> Self {
        distribution.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        distribution.truncate(TOP_N);
        Self {
            predictions: distribution,
        }
    }

    /// The highest-confidence prediction, if any.
    #[must_use]
    pub fn top(&self) -> Option<&StatePrediction> {
        self.predictions.first()
    }

    #[must_use]
    pub fn predictions(&self) -> &[StatePrediction] {
        &self.predictions
    }

    /// Iterates `(rank icon, prediction)` pairs in rank order.
    pub fn with_icons(&self) -> impl Iterator<Item = (&'static str, &StatePrediction)> {
        RANK_ICONS.into_iter().zip(&self.predictions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
