//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port, and artifact locations before
//! starting the server.

use std::path::Path;

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Prompts are pre-filled from `defaults`, and the answers are passed
/// straight to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the artifacts fail to load or the
/// underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(defaults: ServerConfig) -> std::io::Result<()> {
    println!("Geo-State Predictor Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|e| {
            log::warn!("Bind address prompt failed ({e}), using {}", defaults.bind_addr);
            defaults.bind_addr.clone()
        });

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or_else(|e| {
            log::warn!("Port prompt failed ({e}), using {}", defaults.port);
            defaults.port
        });

    let scaler_path: String = Input::new()
        .with_prompt("Scaler artifact")
        .default(defaults.scaler_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|e| fallback("Scaler artifact", &e, &defaults.scaler_path));

    let model_path: String = Input::new()
        .with_prompt("Model artifact")
        .default(defaults.model_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|e| fallback("Model artifact", &e, &defaults.model_path));

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or_else(|e| {
            log::warn!("Confirmation prompt failed ({e}), starting anyway");
            true
        })
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(ServerConfig {
        bind_addr,
        port,
        scaler_path: scaler_path.into(),
        model_path: model_path.into(),
    })
    .await
}

/// Logs a failed path prompt and returns the default it falls back to.
fn fallback(prompt: &str, error: &dialoguer::Error, default: &Path) -> String {
    let default = default.display().to_string();
    log::warn!("{prompt} prompt failed ({error}), using {default}");
    default
}
