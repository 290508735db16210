// ============================================================================
// ERRORES - Taxonomía de errores del escáner
// ============================================================================
// - Configuración: fallan la operación de inmediato (uso incorrecto)
// - Detección: se recuperan dentro del adaptador (nunca llegan al caller)
// - Capacidad (cámara, detector): la app muestra la tarjeta "no soportado"
// ============================================================================

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScannerError {
    #[error("Stream already provided. Stop the capture first.")]
    StreamAlreadyBound,

    #[error("Unable to create canvas context")]
    CanvasContext,

    #[error("Video has width or height of 0")]
    ZeroVideoDimensions,

    #[error("Unable to capture frame")]
    CaptureUnavailable,

    #[error("Invalid config value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Barcode detection unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Failed to load script {0}")]
    FallbackLoad(String),

    #[error("Camera unavailable: {0}")]
    Camera(String),

    #[error("DOM error: {0}")]
    Dom(String),
}

/// Texto legible de un JsValue (Error de JS, string o cualquier otro valor)
pub fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{:?}", value)
}

impl From<JsValue> for ScannerError {
    fn from(value: JsValue) -> Self {
        ScannerError::Dom(describe_js(&value))
    }
}

impl From<ScannerError> for JsValue {
    fn from(error: ScannerError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

pub type ScannerResult<T> = Result<T, ScannerError>;
