//! Errors crossing the JavaScript boundary

use thiserror::Error;
use wasm_bindgen::prelude::*;
use warden_core::WardenError;

/// Unified error type for the browser bindings
#[derive(Error, Debug)]
pub enum WebError {
    /// Configuration object could not be read
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A ban operation failed
    #[error(transparent)]
    Warden(#[from] WardenError),

    /// Result could not be handed back to JavaScript
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_wasm_bindgen::Error> for WebError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WebError::Serialization(err.to_string())
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Result type for the browser bindings
pub type WebResult<T> = Result<T, WebError>;
