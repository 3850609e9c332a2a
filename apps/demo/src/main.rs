// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragview Demo - headless walkthrough of the viewer lifecycle.
//!
//! Drives the runtime against a simulated converter: initialize a
//! resource on a surface, load a model, export the converted fragment,
//! reset the whole viewer, and load again against the fresh resource.

use anyhow::Context;

mod config;
mod sim;

use config::Config;
use fragview_runtime::{SettingsStore, Surface, ViewerCoordinator, ViewerSettingsPatch};
use sim::{SimComponents, SimFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,fragview_runtime=debug".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        settle_delay_ms = config.settle_delay.as_millis() as u64,
        model_name = %config.model_name,
        fragment_path = %config.fragment_path,
        "Starting Fragview demo"
    );

    let mut settings = SettingsStore::new();
    if let Ok(background_color) = std::env::var("BACKGROUND_COLOR") {
        settings.update_viewer(ViewerSettingsPatch {
            background_color: Some(background_color),
            ..Default::default()
        });
    }
    println!("settings: {}", serde_json::to_string(&settings)?);

    let factory = SimFactory::new(config.setup_latency, config.frames_per_load);
    let mut coordinator =
        ViewerCoordinator::with_settle_delay(Box::new(factory), config.settle_delay);

    // Ship lifecycle diagnostics as JSON lines, the way an external
    // collector would consume them.
    let _diagnostics = coordinator.diagnostics().subscribe(|event| {
        if let Ok(line) = serde_json::to_string(event) {
            println!("diagnostic: {line}");
        }
    });

    coordinator
        .initialize(Surface::new("converter-container".to_string()))
        .await
        .context("initializing viewer")?;

    let model_data = format!("ISO-10303-21; demo model {}", config.model_name).into_bytes();
    coordinator
        .load_model(&config.model_name, model_data.clone())
        .await
        .context("loading model")?;

    let registry = coordinator.registry();
    println!(
        "models: {}",
        serde_json::to_string_pretty(&registry.snapshot())?
    );

    let fragment = coordinator
        .export_fragment()
        .context("exporting fragment")?;
    std::fs::write(&config.fragment_path, &fragment)
        .with_context(|| format!("writing {}", config.fragment_path))?;
    tracing::info!(
        bytes = fragment.len(),
        path = %config.fragment_path,
        "fragment exported"
    );

    // Full teardown and reinitialize against the same surface.
    coordinator.reset().await.context("resetting viewer")?;
    let instance = coordinator
        .components()
        .get()
        .and_then(|handle| handle.downcast_ref::<SimComponents>().map(|c| c.instance));
    tracing::info!(?instance, tracked_models = registry.len(), "viewer reset");

    // The fresh resource accepts loads again.
    coordinator
        .load_model(&config.model_name, model_data)
        .await
        .context("loading model after reset")?;
    println!(
        "models after reset: {}",
        serde_json::to_string_pretty(&registry.snapshot())?
    );

    coordinator.dispose();
    Ok(())
}
