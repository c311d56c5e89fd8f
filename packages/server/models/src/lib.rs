#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the state predictor server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the inference types to allow independent evolution of the API
//! contract.

use geo_state_geography_models::{Coordinate, NigerianState};
use geo_state_inference_models::RankedPrediction;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` once the server is accepting requests.
    pub healthy: bool,
    /// Server crate version.
    pub version: String,
}

/// A state label and the classifier output index it decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiState {
    /// Classifier output index.
    pub index: usize,
    /// Label name.
    pub name: String,
}

impl From<NigerianState> for ApiState {
    fn from(state: NigerianState) -> Self {
        Self {
            index: state.index(),
            name: state.to_string(),
        }
    }
}

/// Query parameters for the JSON predict endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictQueryParams {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Fields submitted by the HTML form. Kept as strings so unparseable input
/// can be reported back on the page instead of rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictForm {
    /// Latitude as typed.
    #[serde(default)]
    pub latitude: String,
    /// Longitude as typed.
    #[serde(default)]
    pub longitude: String,
}

/// One ranked entry in a prediction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    /// 1-based rank.
    pub rank: usize,
    /// Medal icon for the rank.
    pub icon: String,
    /// Predicted state.
    pub state: NigerianState,
    /// Confidence percentage.
    pub confidence: f64,
    /// Integer percentage for progress bars (0-100).
    pub progress: u8,
}

/// Response of the JSON predict endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredictionResponse {
    /// Latitude the prediction was made for.
    pub latitude: f64,
    /// Longitude the prediction was made for.
    pub longitude: f64,
    /// Top-ranked state.
    pub predicted_state: NigerianState,
    /// Confidence in the top-ranked state, as a percentage.
    pub confidence: f64,
    /// Top predictions, highest confidence first.
    pub predictions: Vec<ApiPrediction>,
}

impl ApiPredictionResponse {
    /// Builds a response from a ranking. Returns `None` for an empty ranking.
    #[must_use]
    pub fn new(coordinate: Coordinate, ranked: &RankedPrediction) -> Option<Self> {
        let top = ranked.top()?;

        let predictions = ranked
            .with_icons()
            .enumerate()
            .map(|(i, (icon, p))| ApiPrediction {
                rank: i + 1,
                icon: icon.to_string(),
                state: p.state,
                confidence: p.confidence,
                progress: p.progress_percent(),
            })
            .collect();

        Some(Self {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            predicted_state: top.state,
            confidence: top.confidence,
            predictions,
        })
    }
}

/// Error body returned by the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
