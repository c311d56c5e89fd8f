#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the Nigerian state predictor.
//!
//! Serves a server-rendered HTML form at `/` that posts to `/predict`, and
//! a small JSON API under `/api`. The scaler and model artifacts are loaded
//! once, before the server binds; if either fails to load the server never
//! starts.

mod handlers;
pub mod interactive;
pub mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use geo_state_inference::{
    ArtifactError, ArtifactKind, ArtifactLoader, FsArtifactStore, Predictor,
};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Predictor over the artifacts loaded at startup.
    pub predictor: Predictor,
    /// Model artifact name shown in the page footer.
    pub model_name: String,
}

impl AppState {
    #[must_use]
    pub fn new(predictor: Predictor, model_name: impl Into<String>) -> Self {
        Self {
            predictor,
            model_name: model_name.into(),
        }
    }

    /// Loads both artifacts from `store` and wraps them in a predictor.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] if either artifact fails to load.
    pub fn load(store: FsArtifactStore) -> Result<Self, ArtifactError> {
        let model_name = file_name(store.path(ArtifactKind::Model));
        let loader = ArtifactLoader::new(store);
        let artifacts = loader.load()?;

        Ok(Self::new(Predictor::new(artifacts), model_name))
    }
}

/// Server settings, read from the environment by [`ServerConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Scaler artifact (`GEO_STATE_SCALER_PATH`).
    pub scaler_path: PathBuf,
    /// Model artifact (`GEO_STATE_MODEL_PATH`).
    pub model_path: PathBuf,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, and the artifact path variables, falling
    /// back to defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let store = FsArtifactStore::from_env();

        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            scaler_path: store.path(ArtifactKind::Scaler).to_path_buf(),
            model_path: store.path(ArtifactKind::Model).to_path_buf(),
        }
    }

    #[must_use]
    pub fn artifact_store(&self) -> FsArtifactStore {
        FsArtifactStore::new(&self.scaler_path, &self.model_path)
    }
}

/// Registers every route. Shared by [`run_server`] and the handler tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/predict", web::post().to(handlers::predict_form))
        .service(
            web::scope("/api")
                .wrap(Cors::permissive())
                .route("/health", web::get().to(handlers::health))
                .route("/states", web::get().to(handlers::states))
                .route("/predict", web::get().to(handlers::predict)),
        );
}

/// Starts the state predictor server.
///
/// Loads the artifacts eagerly and then starts the Actix-Web HTTP server.
/// This is a regular async function; the caller provides the async runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if either artifact fails to load, or
/// if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading artifacts...");
    let state = match AppState::load(config.artifact_store()) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Model loading failed: {e}");
            return Err(std::io::Error::other(format!("Model loading failed: {e}")));
        }
    };

    let ServerConfig {
        bind_addr, port, ..
    } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
