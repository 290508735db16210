// ============================================================================
// DOT LOADER - Tres puntos animados (CSS) mientras llega el primer frame
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;
use crate::dom::{append_child, query_selector, ElementBuilder};
use crate::utils::DOT_LOADER_CLASS;

pub fn render_dot_loader() -> Result<Element, JsValue> {
    let loader = ElementBuilder::new("div")?
        .class(DOT_LOADER_CLASS)
        .attr("role", "progressbar")?
        .build();
    for _ in 0..3 {
        let dot = ElementBuilder::new("span")?.class("dot-loader__dot").build();
        append_child(&loader, &dot)?;
    }
    Ok(loader)
}

/// Quita el loader si sigue en la página
pub fn remove_dot_loader() {
    if let Ok(Some(loader)) = query_selector(&format!(".{}", DOT_LOADER_CLASS)) {
        loader.remove();
    }
}
