// ============================================================================
// RESULTS VIEW - Contenedor #container con las tarjetas detectadas
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;
use crate::config::ResultsConfig;
use crate::dom::{append_child, body, get_element_by_id, ElementBuilder};
use crate::services::camera;
use crate::services::scheduler::SharedScheduler;
use crate::utils::RESULTS_CONTAINER_ID;
use crate::viewmodels::ResultView;
use crate::views::card::render_card;
use crate::views::dot_loader::remove_dot_loader;

pub struct DomResultView {
    container: Element,
    config: ResultsConfig,
    scheduler: SharedScheduler,
}

impl DomResultView {
    pub fn new(config: ResultsConfig, scheduler: SharedScheduler) -> Result<Self, JsValue> {
        Ok(Self {
            container: results_container()?,
            config,
            scheduler,
        })
    }
}

/// #container existente o uno nuevo al final del body
pub fn results_container() -> Result<Element, JsValue> {
    if let Some(container) = get_element_by_id(RESULTS_CONTAINER_ID) {
        return Ok(container);
    }
    let container = ElementBuilder::new("div")?.id(RESULTS_CONTAINER_ID).build();
    let body = body()?;
    append_child(&body, &container)?;
    Ok(container)
}

impl ResultView for DomResultView {
    fn show_card(&self, value: &str) {
        let result = render_card(value, self.config.card_fade_ms, self.scheduler.clone())
            .and_then(|card| append_child(&self.container, &card));
        if let Err(e) = result {
            log::error!("❌ [RESULTS] No se pudo crear la tarjeta: {:?}", e);
        }
    }

    fn vibrate(&self) {
        camera::vibrate(self.config.vibrate_ms);
    }

    fn hide_loader(&self) {
        remove_dot_loader();
    }
}
