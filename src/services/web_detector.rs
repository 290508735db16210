// ============================================================================
// WEB DETECTOR - Backend de detección sobre window.BarcodeDetector
// ============================================================================

use futures::future::{FutureExt, LocalBoxFuture};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use crate::dom::inject_script;
use crate::error::{describe_js, ScannerError, ScannerResult};
use crate::models::DetectedBarcode;
use crate::services::barcode_detector::{BarcodeEngine, DetectorBackend, DetectorPath};
use crate::utils::barcode_ffi::{self, BarcodeDetectorHandle};

pub struct WebDetectorBackend {
    polyfill_url: String,
    // Se mide al arrancar: tras cargar el polyfill el global existe igualmente
    native: bool,
}

impl WebDetectorBackend {
    pub fn new(polyfill_url: impl Into<String>) -> Self {
        let native = barcode_ffi::detector_constructor().is_some();
        log::info!("🔍 [DETECTOR] BarcodeDetector nativo: {}", native);
        Self {
            polyfill_url: polyfill_url.into(),
            native,
        }
    }
}

impl DetectorBackend for WebDetectorBackend {
    type Image = JsValue;
    type Engine = WebBarcodeEngine;

    fn has_native(&self) -> bool {
        self.native
    }

    fn load_fallback(&self) -> LocalBoxFuture<'static, ScannerResult<()>> {
        let url = self.polyfill_url.clone();
        async move {
            inject_script(&url).await.map_err(|e| {
                log::error!("❌ [DETECTOR] No se pudo cargar {}: {}", url, describe_js(&e));
                ScannerError::FallbackLoad(url)
            })
        }
        .boxed_local()
    }

    fn create(&self, path: DetectorPath) -> ScannerResult<WebBarcodeEngine> {
        let constructor = barcode_ffi::detector_constructor().ok_or_else(|| {
            ScannerError::DetectorUnavailable("BarcodeDetector is not defined".into())
        })?;
        let detector = barcode_ffi::construct_detector(&constructor)
            .map_err(|e| ScannerError::DetectorUnavailable(describe_js(&e)))?;
        Ok(WebBarcodeEngine { detector, path })
    }
}

pub struct WebBarcodeEngine {
    detector: BarcodeDetectorHandle,
    path: DetectorPath,
}

impl WebBarcodeEngine {
    pub fn path(&self) -> DetectorPath {
        self.path
    }
}

impl BarcodeEngine for WebBarcodeEngine {
    type Image = JsValue;

    fn ready(&self) -> LocalBoxFuture<'static, ScannerResult<()>> {
        match barcode_ffi::ready_promise(&self.detector) {
            Some(promise) => async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| ScannerError::Detection(describe_js(&e)))
            }
            .boxed_local(),
            None => futures::future::ready(Ok(())).boxed_local(),
        }
    }

    fn detect(&self, image: &JsValue) -> LocalBoxFuture<'static, ScannerResult<Vec<DetectedBarcode>>> {
        let promise = match self.detector.detect(image) {
            Ok(promise) => promise,
            Err(e) => {
                return futures::future::ready(Err(ScannerError::Detection(describe_js(&e))))
                    .boxed_local()
            }
        };
        async move {
            let value = JsFuture::from(promise)
                .await
                .map_err(|e| ScannerError::Detection(describe_js(&e)))?;
            serde_wasm_bindgen::from_value::<Vec<DetectedBarcode>>(value)
                .map_err(|e| ScannerError::Detection(e.to_string()))
        }
        .boxed_local()
    }
}
