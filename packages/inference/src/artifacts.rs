//! Loading and caching of the scaler and model artifacts.
//!
//! [`ArtifactLoader`] is the process-wide cache: the first successful
//! [`ArtifactLoader::load`] reads both artifacts through its
//! [`ArtifactStore`], later calls return the same [`Arc`] without touching
//! storage. The composition root owns one loader and calls it eagerly at
//! startup so a broken artifact stops the process before it serves anything.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use geo_state_geography_models::{NigerianState, STATE_COUNT};

use crate::network::{Classifier, DenseNetwork, ModelArtifact};
use crate::{ArtifactError, COORDINATE_FEATURES, Scaler};

/// Scaler artifact location used when nothing else is configured, relative
/// to the working directory.
pub const DEFAULT_SCALER_PATH: &str = "scaler.json";

/// Model artifact location used when nothing else is configured, relative
/// to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "main_model.json";

/// Environment variable overriding [`DEFAULT_SCALER_PATH`].
pub const SCALER_PATH_ENV: &str = "GEO_STATE_SCALER_PATH";

/// Environment variable overriding [`DEFAULT_MODEL_PATH`].
pub const MODEL_PATH_ENV: &str = "GEO_STATE_MODEL_PATH";

/// The two artifacts the pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Scaler,
    Model,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Scaler => "scaler",
            Self::Model => "model",
        })
    }
}

/// Backing storage for artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Reads the raw bytes of one artifact.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if the artifact cannot be read.
    fn read(&self, kind: ArtifactKind) -> std::io::Result<Vec<u8>>;

    /// Human-readable location of an artifact, for error messages.
    fn describe(&self, kind: ArtifactKind) -> String;
}

/// Reads artifacts from two files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsArtifactStore {
    scaler_path: PathBuf,
    model_path: PathBuf,
}

impl FsArtifactStore {
    #[must_use]
    pub fn new(scaler_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            scaler_path: scaler_path.into(),
            model_path: model_path.into(),
        }
    }

    /// Uses `GEO_STATE_SCALER_PATH` / `GEO_STATE_MODEL_PATH` when set,
    /// otherwise the default file names in the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(SCALER_PATH_ENV).unwrap_or_else(|_| DEFAULT_SCALER_PATH.to_string()),
            std::env::var(MODEL_PATH_ENV).unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
        )
    }

    #[must_use]
    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Scaler => &self.scaler_path,
            ArtifactKind::Model => &self.model_path,
        }
    }
}

impl Default for FsArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_SCALER_PATH, DEFAULT_MODEL_PATH)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn read(&self, kind: ArtifactKind) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.path(kind))
    }

    fn describe(&self, kind: ArtifactKind) -> String {
        self.path(kind).display().to_string()
    }
}

/// A scaler and classifier known to fit together.
pub struct Artifacts {
    scaler: Scaler,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("scaler", &self.scaler)
            .field("classifier_inputs", &self.classifier.input_len())
            .field("classifier_outputs", &self.classifier.output_len())
            .finish()
    }
}

impl Artifacts {
    /// Pairs a scaler with a classifier.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if the scaler's parameters are
    /// unusable, it is not fitted on exactly latitude and longitude, the
    /// classifier's input width differs from the scaler's, or the classifier
    /// does not emit one score per state label.
    pub fn new(scaler: Scaler, classifier: Box<dyn Classifier>) -> Result<Self, ArtifactError> {
        scaler.validate()?;

        if scaler.feature_count() != COORDINATE_FEATURES {
            return Err(ArtifactError::Invalid {
                kind: ArtifactKind::Scaler,
                message: format!(
                    "fitted on {} features, expected {COORDINATE_FEATURES} (latitude, longitude)",
                    scaler.feature_count()
                ),
            });
        }
        if classifier.input_len() != scaler.feature_count() {
            return Err(ArtifactError::Invalid {
                kind: ArtifactKind::Model,
                message: format!(
                    "expects {} features but the scaler produces {}",
                    classifier.input_len(),
                    scaler.feature_count()
                ),
            });
        }
        if classifier.output_len() != STATE_COUNT {
            return Err(ArtifactError::Invalid {
                kind: ArtifactKind::Model,
                message: format!(
                    "emits {} scores, expected one per state ({STATE_COUNT})",
                    classifier.output_len()
                ),
            });
        }

        Ok(Self { scaler, classifier })
    }

    /// Reads, parses, and validates both artifacts from `store`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] if either artifact cannot be read or
    /// parsed, the model's label manifest disagrees with the built-in label
    /// order, or the pair fails [`Artifacts::new`].
    pub fn from_store(store: &impl ArtifactStore) -> Result<Self, ArtifactError> {
        let scaler: Scaler = read_json(store, ArtifactKind::Scaler)?;
        let model: ModelArtifact = read_json(store, ArtifactKind::Model)?;

        if let Some(labels) = &model.labels {
            verify_labels(labels)?;
        } else {
            log::warn!(
                "Model artifact at {} has no label manifest; assuming built-in label order",
                store.describe(ArtifactKind::Model)
            );
        }

        let network = DenseNetwork::from_artifact(model)?;
        log::info!(
            "Loaded model with {} layers ({} inputs, {} outputs)",
            network.layers().len(),
            network.input_len(),
            network.output_len()
        );

        Self::new(scaler, Box::new(network))
    }

    #[must_use]
    pub const fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    store: &impl ArtifactStore,
    kind: ArtifactKind,
) -> Result<T, ArtifactError> {
    let location = store.describe(kind);
    log::info!("Loading {kind} artifact from {location}...");

    let bytes = match store.read(kind) {
        Ok(bytes) => bytes,
        Err(source) => {
            return Err(ArtifactError::Read {
                kind,
                location,
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        kind,
        location,
        source,
    })
}

/// Checks a model's label manifest against the built-in label order.
///
/// # Errors
///
/// Returns [`ArtifactError::LabelMismatch`] at the first index where the
/// manifest and the built-in order disagree, including a missing or extra
/// trailing label.
pub fn verify_labels(labels: &[String]) -> Result<(), ArtifactError> {
    for index in 0..labels.len().max(STATE_COUNT) {
        let expected = NigerianState::from_index(index).map(NigerianState::name);
        let found = labels.get(index).map(String::as_str);

        if expected != found {
            return Err(ArtifactError::LabelMismatch {
                index,
                expected: expected.unwrap_or_default().to_string(),
                found: found.unwrap_or_default().to_string(),
            });
        }
    }

    Ok(())
}

/// Memoizes [`Artifacts::from_store`].
///
/// The cache is behind a mutex, so concurrent first callers block while one
/// of them reads storage and then all observe the same handle. A failed load
/// leaves the cache empty.
pub struct ArtifactLoader<S> {
    store: S,
    cached: Mutex<Option<Arc<Artifacts>>>,
}

impl<S: ArtifactStore> ArtifactLoader<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached artifacts, reading them on first use.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] if the first read fails. Callers should
    /// treat this as fatal.
    pub fn load(&self) -> Result<Arc<Artifacts>, ArtifactError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(artifacts) = cached.as_ref() {
            log::debug!("Using cached artifacts");
            return Ok(Arc::clone(artifacts));
        }

        let artifacts = Arc::new(Artifacts::from_store(&self.store)?);
        *cached = Some(Arc::clone(&artifacts));
        Ok(artifacts)
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
