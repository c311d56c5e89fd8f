#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geographic input types for the state predictor.
//!
//! A [`Coordinate`] can only be built through [`Coordinate::new`], which
//! checks it against [`NIGERIA_BOUNDS`]. Everything downstream of the input
//! boundary can therefore assume the point is inside the box.

pub mod states;

pub use states::{NigerianState, STATE_COUNT};

use serde::{Deserialize, Serialize};

/// Default latitude offered by input forms (Abuja).
pub const DEFAULT_LATITUDE: f64 = 9.0820;

/// Default longitude offered by input forms (Abuja).
pub const DEFAULT_LONGITUDE: f64 = 7.4913;

/// Decimal places coordinates are displayed with.
pub const COORDINATE_PRECISION: usize = 6;

/// Approximate bounding box of Nigeria.
pub const NIGERIA_BOUNDS: BoundingBox = BoundingBox::new(2.0, 4.0, 15.0, 14.0);

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the point lies inside the box. Edges are inside.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude)
            && (self.west..=self.east).contains(&longitude)
    }
}

/// Error returned when a latitude/longitude pair cannot become a
/// [`Coordinate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    /// Latitude or longitude is NaN or infinite.
    NotFinite,
    /// The point lies outside [`NIGERIA_BOUNDS`].
    OutOfBounds {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite => f.write_str("Coordinates must be finite numbers"),
            Self::OutOfBounds { .. } => f.write_str("Coordinates outside Nigeria's bounds"),
        }
    }
}

impl std::error::Error for CoordinateError {}

/// A validated latitude/longitude pair inside [`NIGERIA_BOUNDS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validates a latitude/longitude pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::NotFinite`] for NaN or infinite input and
    /// [`CoordinateError::OutOfBounds`] when the point is outside
    /// [`NIGERIA_BOUNDS`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !NIGERIA_BOUNDS.contains(latitude, longitude) {
            return Err(CoordinateError::OutOfBounds {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// The Abuja default offered by input forms.
    #[must_use]
    pub const fn abuja() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
        }
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns `[latitude, longitude]`, the raw feature order scalers expect.
    #[must_use]
    pub const fn to_features(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.prec$}, {:.prec$})",
            self.latitude,
            self.longitude,
            prec = COORDINATE_PRECISION
        )
    }
}
