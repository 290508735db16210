// ============================================================================
// SCRIPT LOADER - Inyección de <script> externos (polyfills)
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use futures::channel::oneshot;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlScriptElement};
use crate::dom::{create_typed, head};

/// Inyecta `<script src>` en el <head> y espera a que cargue
pub async fn inject_script(src: &str) -> Result<(), JsValue> {
    let script: HtmlScriptElement = create_typed("script")?;
    script.set_src(src);

    let (tx, rx) = oneshot::channel::<Result<(), JsValue>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let on_load = {
        let tx = tx.clone();
        Closure::once_into_js(move |_e: Event| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        })
    };
    let on_error = {
        let src = src.to_string();
        Closure::once_into_js(move |_e: Event| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(JsValue::from_str(&format!("Failed to load {}", src))));
            }
        })
    };
    script.set_onload(Some(on_load.unchecked_ref()));
    script.set_onerror(Some(on_error.unchecked_ref()));

    head()?.append_child(&script)?;
    log::debug!("📜 [SCRIPT] Cargando {}", src);

    rx.await
        .unwrap_or_else(|_| Err(JsValue::from_str("Script load cancelled")))
}
