use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, BootError>;

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration defines no themes")]
    NoThemes,
    #[error("DOM unavailable: {0}")]
    Dom(String),
    #[error("javascript error: {0:?}")]
    Js(JsValue),
}

impl From<JsValue> for BootError {
    fn from(value: JsValue) -> Self {
        BootError::Js(value)
    }
}

impl From<BootError> for JsValue {
    fn from(err: BootError) -> Self {
        match err {
            BootError::Js(value) => value,
            other => JsValue::from_str(&other.to_string()),
        }
    }
}
