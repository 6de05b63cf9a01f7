use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::WidgetError;

/// Name of the optional global the host page can set before the module loads.
pub const CONFIG_GLOBAL: &str = "problemWidgetConfig";

/// How markup returned by the reset endpoint is written into the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    /// Parsed as HTML. The endpoint is same-origin and first-party.
    #[default]
    Trusted,
    /// Inserted as plain text.
    Escaped,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub endpoint_base: String,
    pub check_label: String,
    pub reset_label: String,
    pub correct_class: String,
    pub incorrect_class: String,
    pub reset_markup: MarkupMode,
    pub log_level: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint_base: "/modx/problem".to_string(),
            check_label: "Check".to_string(),
            reset_label: "Reset".to_string(),
            correct_class: "ui-icon ui-icon-check".to_string(),
            incorrect_class: "ui-icon ui-icon-close".to_string(),
            reset_markup: MarkupMode::Trusted,
            log_level: "info".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Maximum tracing level, falling back to INFO for unknown names.
    pub fn max_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// Read `window.problemWidgetConfig`. `Ok(None)` when the page sets nothing.
pub fn from_window() -> Result<Option<WidgetConfig>, WidgetError> {
    let Some(window) = web_sys::window() else {
        return Ok(None);
    };
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
        .map_err(|e| WidgetError::Config(format!("{:?}", e)))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| WidgetError::Config(e.to_string()))
}

/// Like [`from_window`], but any failure yields the defaults.
pub fn load_or_default() -> WidgetConfig {
    match from_window() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", CONFIG_GLOBAL, e);
            WidgetConfig::default()
        }
    }
}
