//! Browser entry points for Glint
//!
//! ```js
//! import init, { start } from "./glint_web.js";
//! await init();
//! start();
//! ```

pub mod console;
pub mod dom_page;
pub mod listeners;
pub mod runtime;

use std::cell::RefCell;

use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use glint_core::GlintConfig;

pub use dom_page::DomPage;
use runtime::{Runtime, Shared};

thread_local! {
    static ACTIVE: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

/// Route `tracing` to the console; later calls keep the first subscriber
fn init_logging(config: &GlintConfig) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(&config.general.log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_writer(console::MakeConsoleWriter),
        )
        .try_init();
}

fn mount(config: GlintConfig) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if ACTIVE.with(|active| active.borrow().is_some()) {
        warn!("Glint is already running");
        return;
    }
    match Runtime::start(window, config) {
        Ok(shared) => ACTIVE.with(|active| *active.borrow_mut() = Some(shared)),
        Err(e) => error!(error = %e, "Glint failed to start"),
    }
}

fn start_when_ready(config: GlintConfig) -> Result<(), JsValue> {
    init_logging(&config);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() != "loading" {
        mount(config);
        return Ok(());
    }

    let callback = Closure::once_into_js(move || mount(config));
    document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
}

/// Start with the default configuration
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    start_when_ready(GlintConfig::default())
}

/// Start with a TOML configuration
#[wasm_bindgen(js_name = startWithConfig)]
pub fn start_with_config(toml: &str) -> Result<(), JsValue> {
    let config = GlintConfig::from_toml_str(toml).map_err(|e| JsValue::from_str(&e.to_string()))?;
    start_when_ready(config)
}

/// Cancel pending work and silence all listeners
///
/// Returns the number of cancelled jobs.
#[wasm_bindgen]
pub fn teardown() -> usize {
    ACTIVE.with(|active| {
        active
            .borrow_mut()
            .take()
            .and_then(|shared| shared.try_borrow_mut().ok().map(|mut rt| rt.teardown()))
            .unwrap_or(0)
    })
}

/// Engine counters as JSON
#[wasm_bindgen(js_name = statsJson)]
pub fn stats_json() -> String {
    ACTIVE.with(|active| {
        active
            .borrow()
            .as_ref()
            .and_then(|shared| shared.try_borrow().ok().map(|rt| rt.stats()))
            .and_then(|stats| serde_json::to_string(&stats).ok())
            .unwrap_or_else(|| "null".to_string())
    })
}
