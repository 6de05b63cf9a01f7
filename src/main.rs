mod api;
mod components;
mod config;
mod dom;
mod error;
mod state;
mod widget;

use std::sync::Arc;

use wasm_bindgen::prelude::*;

/// Attach a widget inserted after page load. Errors are reported as strings.
#[wasm_bindgen]
pub fn attach(id: String) -> Result<(), String> {
    let config = Arc::new(config::load_or_default());
    widget::attach(&id, config).map_err(String::from)
}

fn main() {
    console_error_panic_hook::set_once();

    let loaded = config::from_window();
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => config::WidgetConfig::default(),
    };

    let mut tracing_config = tracing_wasm::WASMLayerConfigBuilder::new();
    tracing_config.set_max_level(config.max_level());
    tracing_wasm::set_as_global_default_with_config(tracing_config.build());

    if let Err(e) = loaded {
        tracing::warn!("Using default config: {}", e);
    }

    let attached = widget::attach_all(Arc::new(config));
    tracing::info!("{} problem widget(s) attached", attached);
}
