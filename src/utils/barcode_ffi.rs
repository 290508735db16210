// ============================================================================
// BARCODE DETECTOR FFI - Foreign Function Interface para BarcodeDetector
// ============================================================================
// Wrappers sobre la Shape Detection API (nativa o polyfill) - Sin estado
// ============================================================================

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const DETECTOR_GLOBAL: &str = "BarcodeDetector";

#[wasm_bindgen]
extern "C" {
    /// Instancia de `BarcodeDetector`
    #[derive(Debug, Clone)]
    pub type BarcodeDetectorHandle;

    #[wasm_bindgen(method, catch)]
    pub fn detect(this: &BarcodeDetectorHandle, image: &JsValue) -> Result<Promise, JsValue>;
}

/// Constructor global `BarcodeDetector`, si existe
pub fn detector_constructor() -> Option<Function> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(DETECTOR_GLOBAL))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

/// `new BarcodeDetector()`
pub fn construct_detector(constructor: &Function) -> Result<BarcodeDetectorHandle, JsValue> {
    Reflect::construct(constructor, &Array::new()).map(|object| object.unchecked_into())
}

/// Promesa `isReady` del polyfill (los nativos no la tienen)
pub fn ready_promise(detector: &BarcodeDetectorHandle) -> Option<Promise> {
    Reflect::get(detector, &JsValue::from_str("isReady"))
        .ok()
        .and_then(|value| value.dyn_into::<Promise>().ok())
}
