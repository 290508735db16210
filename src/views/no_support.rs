// ============================================================================
// NO SUPPORT - Aviso de navegador sin las capacidades necesarias
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;
use crate::dom::{append_child, body, ElementBuilder};
use crate::views::dot_loader::remove_dot_loader;
use crate::utils::{NO_SUPPORT_CLASS, NO_SUPPORT_MESSAGE};

pub fn render_no_support(message: Option<&str>) -> Result<Element, JsValue> {
    let card = ElementBuilder::new("div")?
        .class(NO_SUPPORT_CLASS)
        .attr("role", "alert")?
        .build();
    let text = ElementBuilder::new("p")?
        .text(message.unwrap_or(NO_SUPPORT_MESSAGE))
        .build();
    append_child(&card, &text)?;
    Ok(card)
}

/// Añade el aviso al body
pub fn show_no_support(message: Option<&str>) -> Result<(), JsValue> {
    let card = render_no_support(message)?;
    let body = body()?;
    append_child(&body, &card)
}

/// Arranque fallido: fuera el loader y aviso en su lugar
pub fn show_setup_failure() -> Result<(), JsValue> {
    remove_dot_loader();
    show_no_support(None)
}
