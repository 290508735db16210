// ============================================================================
// DATA CARD - Tarjeta con el valor detectado y botón de cerrar
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use crate::dom::{append_child, on_click, ElementBuilder};
use crate::services::scheduler::SharedScheduler;
use crate::utils::animation::{fade, FadeOptions};
use crate::utils::DATA_CARD_CLASS;

/// Renderizar tarjeta. Al cerrar hace fade de `fade_ms` y se elimina.
pub fn render_card(
    value: &str,
    fade_ms: u32,
    scheduler: SharedScheduler,
) -> Result<HtmlElement, JsValue> {
    let card = ElementBuilder::new("div")?
        .class(DATA_CARD_CLASS)
        .build()
        .dyn_into::<HtmlElement>()?;

    let content = ElementBuilder::new("div")?
        .class("data-card__content")
        .text(value)
        .build();

    let close_btn = ElementBuilder::new("button")?
        .class("data-card__close")
        .attr("aria-label", "Close")?
        .text("✕")
        .build();

    {
        let card = card.clone();
        on_click(&close_btn, move |_e| {
            let card = card.clone();
            let scheduler = scheduler.clone();
            wasm_bindgen_futures::spawn_local(async move {
                close_card(&card, fade_ms, &scheduler).await;
            });
        })?;
    }

    append_child(&card, &content)?;
    append_child(&card, &close_btn)?;
    Ok(card)
}

/// Cerrar tarjeta: 0 ms la quita al momento
pub async fn close_card(card: &HtmlElement, fade_ms: u32, scheduler: &SharedScheduler) {
    if fade_ms > 0 {
        fade(card, FadeOptions::default().with_duration(fade_ms as f64), &**scheduler).await;
    }
    card.remove();
}
