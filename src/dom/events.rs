// ============================================================================
// EVENT HANDLING - Listeners de click y de un solo uso
// ============================================================================
// GESTIÓN DE MEMORY LEAKS:
// - Listeners en elementos del DOM: se hace closure.forget(). Cuando el elemento
//   se elimina, el navegador libera los listeners asociados.
// - Listeners de un solo uso: Closure::once_into_js, se liberan al dispararse.
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventTarget, MouseEvent};
use futures::channel::oneshot;

/// Helper para crear click handler simple
pub fn on_click<F>(target: &EventTarget, handler: F) -> Result<(), JsValue>
where
    F: FnMut(MouseEvent) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(MouseEvent)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Resuelve la primera vez que `event_type` se dispara sobre `target`
pub fn next_event(target: &EventTarget, event_type: &str) -> Result<oneshot::Receiver<Event>, JsValue> {
    let (tx, rx) = oneshot::channel::<Event>();
    let callback = Closure::once_into_js(move |event: Event| {
        let _ = tx.send(event);
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event_type,
        callback.unchecked_ref(),
        &options,
    )?;
    Ok(rx)
}
