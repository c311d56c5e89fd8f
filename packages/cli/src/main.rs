#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the Nigerian state predictor.
//!
//! With a subcommand it runs one action and exits. Without one it shows
//! an interactive menu that can predict repeatedly against a single
//! loaded model, list the label table, or start the web server.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use geo_state_geography_models::{
    Coordinate, CoordinateError, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
};
use geo_state_inference::{
    ArtifactError, ArtifactKind, ArtifactLoader, FsArtifactStore, InferenceError, Predictor,
};
use geo_state_server::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "geo_state", about = "Predict the Nigerian state for a coordinate")]
struct Cli {
    /// Scaler artifact (overrides `GEO_STATE_SCALER_PATH`)
    #[arg(long, global = true)]
    scaler: Option<PathBuf>,

    /// Model artifact (overrides `GEO_STATE_MODEL_PATH`)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict the top three states for one coordinate
    Predict {
        /// Latitude in decimal degrees
        #[arg(long, default_value_t = DEFAULT_LATITUDE, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, default_value_t = DEFAULT_LONGITUDE, allow_negative_numbers = true)]
        lon: f64,
    },
    /// List the state labels in classifier output order
    States,
    /// Start the web server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,

        /// Port to bind (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Model loading failed: {0}")]
    Artifacts(#[from] ArtifactError),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
    #[error("Prediction error: {0}")]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
}

/// Top-level actions offered by the interactive menu.
enum Tool {
    Predict,
    States,
    Server,
    Quit,
}

impl Tool {
    const ALL: &[Self] = &[Self::Predict, Self::States, Self::Server, Self::Quit];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Predict => "Predict a coordinate",
            Self::States => "List states",
            Self::Server => "Start server",
            Self::Quit => "Quit",
        }
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let store = artifact_store(cli.scaler, cli.model);

    match cli.command {
        Some(Commands::Predict { lat, lon }) => {
            let coordinate = Coordinate::new(lat, lon)?;
            let predictor = Predictor::new(ArtifactLoader::new(store).load()?);
            let ranked = predictor.predict(coordinate)?;
            print!("{}", report::ranked(coordinate, &ranked));
        }
        Some(Commands::States) => print!("{}", report::states()),
        Some(Commands::Serve { bind, port }) => {
            let config = server_config(&store, bind, port);
            actix_web::rt::System::new().block_on(geo_state_server::run_server(config))?;
        }
        None => interactive(store)?,
    }

    Ok(())
}

fn interactive(store: FsArtifactStore) -> Result<(), CliError> {
    println!("Geo-State Predictor");
    println!();

    let loader = ArtifactLoader::new(store);
    let predictor = Predictor::new(loader.load()?);
    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Tool::ALL[idx] {
            Tool::Predict => {
                if let Err(e) = prompt_prediction(&predictor) {
                    recoverable(e)?;
                }
            }
            Tool::States => print!("{}", report::states()),
            Tool::Server => {
                let defaults = server_config(loader.store(), None, None);
                actix_web::rt::System::new()
                    .block_on(geo_state_server::interactive::run(defaults))?;
                return Ok(());
            }
            Tool::Quit => return Ok(()),
        }

        println!();
    }
}

/// Reports a failed menu prediction and keeps the session alive, or hands
/// back errors that end it.
fn recoverable(e: CliError) -> Result<(), CliError> {
    match e {
        CliError::Coordinate(e) => {
            log::warn!("Rejected coordinate: {e}");
            println!("{e}");
            Ok(())
        }
        CliError::Inference(e) => {
            log::error!("Prediction failed: {e}");
            println!("Prediction error: {e}");
            Ok(())
        }
        e => Err(e),
    }
}

fn prompt_prediction(predictor: &Predictor) -> Result<(), CliError> {
    let lat: f64 = Input::new()
        .with_prompt("Latitude")
        .default(DEFAULT_LATITUDE)
        .interact_text()?;
    let lon: f64 = Input::new()
        .with_prompt("Longitude")
        .default(DEFAULT_LONGITUDE)
        .interact_text()?;

    let coordinate = Coordinate::new(lat, lon)?;
    let ranked = predictor.predict(coordinate)?;

    println!();
    print!("{}", report::ranked(coordinate, &ranked));
    Ok(())
}

fn artifact_store(scaler: Option<PathBuf>, model: Option<PathBuf>) -> FsArtifactStore {
    let defaults = FsArtifactStore::from_env();
    FsArtifactStore::new(
        scaler.unwrap_or_else(|| defaults.path(ArtifactKind::Scaler).to_path_buf()),
        model.unwrap_or_else(|| defaults.path(ArtifactKind::Model).to_path_buf()),
    )
}

fn server_config(store: &FsArtifactStore, bind: Option<String>, port: Option<u16>) -> ServerConfig {
    let defaults = ServerConfig::from_env();
    ServerConfig {
        bind_addr: bind.unwrap_or(defaults.bind_addr),
        port: port.unwrap_or(defaults.port),
        scaler_path: store.path(ArtifactKind::Scaler).to_path_buf(),
        model_path: store.path(ArtifactKind::Model).to_path_buf(),
    }
}
