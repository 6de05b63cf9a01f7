use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {code} {text}")]
    Status { code: u16, text: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Missing element: #{0}")]
    MissingElement(String),

    #[error("#{0} is not a widget button")]
    NotAWidget(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl WidgetError {
    pub fn dom(err: JsValue) -> Self {
        WidgetError::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    }
}

impl From<gloo_net::Error> for WidgetError {
    fn from(err: gloo_net::Error) -> Self {
        WidgetError::Network(err.to_string())
    }
}

impl From<WidgetError> for String {
    fn from(err: WidgetError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = WidgetError::Status {
            code: 404,
            text: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Server returned 404 Not Found");
    }

    #[test]
    fn test_into_string_uses_display() {
        let msg: String = WidgetError::MissingElement("check_42".to_string()).into();
        assert_eq!(msg, "Missing element: #check_42");
    }
}
