// ============================================================================
// BARCODE SCANNER PWA - FRONTEND MVVM (RUST PURO)
// ============================================================================
// - Views: Funciones que renderizan DOM (sin lógica)
// - ViewModels: Onboarding + pipeline de detección
// - Services: Cámara, captura de frames, detector de códigos
// - State: Estado puro (carrusel, códigos vistos) + eventos
// - Models: Estructuras que vienen de las APIs del navegador
// ============================================================================

pub mod app;
pub mod config;
pub mod dom;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;
pub mod views;

use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_logger::Config;
use crate::app::App;
use crate::config::CONFIG;

pub use error::{ScannerError, ScannerResult};

// Instancia global: mantiene vivo el sampler mientras la página esté abierta
thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Inicializar panic hook para mejor debugging
    console_error_panic_hook::set_once();

    if CONFIG.is_logging_enabled() {
        wasm_logger::init(Config::new(CONFIG.log_level()));
    }
    log::info!("🚀 Barcode Scanner - Rust Puro + MVVM");

    let app = App::new(&CONFIG);
    APP.with(|cell| {
        *cell.borrow_mut() = Some(app.clone());
    });
    wasm_bindgen_futures::spawn_local(app.run());

    Ok(())
}

/// Detener la cámara desde JS (p.ej. al ocultar la página)
#[wasm_bindgen(js_name = stopCapture)]
pub fn stop_capture() {
    APP.with(|cell| {
        if let Some(app) = cell.borrow().as_ref() {
            app.stop();
        }
    });
}
