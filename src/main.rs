mod api;
mod app;
mod bridge;
mod config;
mod dispatch;
mod event;
mod theme;
mod view;

use api::{ApiClient, Identity};
use app::MinibridgeApp;
use bridge::{HandoffBridge, HostBridge};
use config::Config;
use dispatch::Dispatcher;
use eframe::egui;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minibridge=info")),
        )
        .init();

    let config = Config::load_or_default();
    info!("starting against {}", config.api_base);

    let bridge: Arc<dyn HostBridge> = Arc::new(HandoffBridge::from_env());
    let identity = Identity::from_bridge(bridge.as_ref());
    let api = Arc::new(ApiClient::new(
        config.api_base.clone(),
        config.timeout(),
        identity,
    ));

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("minibridge-runtime")
        .build()?;

    let dispatcher = runtime.block_on(async { Dispatcher::new(api, tx.clone()) })?;
    let app = MinibridgeApp::new(rx, tx, dispatcher, bridge);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Minibridge",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
