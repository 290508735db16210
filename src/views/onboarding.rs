// ============================================================================
// ONBOARDING VIEW - Carrusel de bienvenida sobre el DOM
// ============================================================================
// Estructura creada sobre el #onboarding existente:
//   #onboarding (tabindex=0, aria-label)
//     .onboarding__steps    <- hijos originales (un paso por hijo, scroll-snap)
//     .onboarding__buttons  <- un botón 1..N por paso
// ============================================================================

use std::rc::Rc;
use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MutationObserver, MutationObserverInit, Node, ScrollBehavior, ScrollIntoViewOptions,
};
use crate::config::OnboardingConfig;
use crate::dom::{append_child, element_children, inject_script, on_click, toggle_class, ElementBuilder};
use crate::error::describe_js;
use crate::services::scheduler::SharedScheduler;
use crate::state::CarouselState;
use crate::utils::animation::{self, FadeOptions};
use crate::utils::{ACTIVE_CLASS, INTERSECTION_OBSERVER_POLYFILL};
use crate::viewmodels::{CarouselView, OnboardingController};

pub struct DomCarouselView {
    host: HtmlElement,
    steps: HtmlElement,
    buttons: Element,
    scheduler: SharedScheduler,
}

impl DomCarouselView {
    /// Reorganiza los hijos de `host` en pasos + botones
    pub fn new(host: HtmlElement, scheduler: SharedScheduler) -> Result<Self, JsValue> {
        let steps = ElementBuilder::new("div")?
            .class("onboarding__steps")
            .build()
            .dyn_into::<HtmlElement>()?;
        for child in element_children(&host) {
            append_child(&steps, &child)?;
        }
        let buttons = ElementBuilder::new("div")?.class("onboarding__buttons").build();

        append_child(&host, &steps)?;
        append_child(&host, &buttons)?;
        host.set_tab_index(0);

        Ok(Self {
            host,
            steps,
            buttons,
            scheduler,
        })
    }

    pub fn host(&self) -> &HtmlElement {
        &self.host
    }

    fn step(&self, idx: usize) -> Option<HtmlElement> {
        element_children(&self.steps).into_iter().nth(idx)
    }

    fn index_of(&self, target: &Element) -> Option<usize> {
        let target: &Node = target;
        element_children(&self.steps)
            .iter()
            .position(|step| step.is_same_node(Some(target)))
    }

    fn apply_size(&self, config: &OnboardingConfig) -> Result<(), JsValue> {
        let style = self.host.style();
        if config.width.is_set() {
            style.set_property("width", &config.width.px())?;
        }
        if config.height.is_set() {
            style.set_property("height", &config.height.px())?;
        }
        Ok(())
    }
}

impl CarouselView for DomCarouselView {
    fn step_count(&self) -> usize {
        self.steps.children().length() as usize
    }

    fn step_alt(&self, idx: usize) -> Option<String> {
        self.step(idx)?.get_attribute("alt")
    }

    fn set_label(&self, label: &str) {
        let _ = self.host.set_attribute("aria-label", label);
    }

    fn scroll_to(&self, idx: usize, smooth: bool) {
        let Some(step) = self.step(idx) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        });
        step.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn fade(&self, idx: usize, options: FadeOptions) -> LocalBoxFuture<'static, ()> {
        let step = self.step(idx);
        let scheduler = self.scheduler.clone();
        async move {
            if let Some(step) = step {
                animation::fade(&step, options, &*scheduler).await;
            }
        }
        .boxed_local()
    }

    fn restore_opacity(&self, idx: usize) {
        if let Some(step) = self.step(idx) {
            let _ = animation::restore_opacity(&step);
        }
    }

    fn mark_active(&self, idx: usize) {
        for (i, button) in element_children(&self.buttons).iter().enumerate() {
            let _ = toggle_class(button, ACTIVE_CLASS, i == idx);
        }
    }
}

/// Monta el carrusel sobre `host` y conecta observers y clicks
pub async fn mount_onboarding(
    host: HtmlElement,
    config: &OnboardingConfig,
    scheduler: SharedScheduler,
) -> Result<OnboardingController<DomCarouselView>, JsValue> {
    let view = Rc::new(DomCarouselView::new(host, scheduler)?);
    view.apply_size(config)?;
    let controller = OnboardingController::new(view.clone(), config.mode);

    // Click en el contenido = siguiente paso
    {
        let controller = controller.clone();
        on_click(&view.steps, move |_e| {
            let controller = controller.clone();
            wasm_bindgen_futures::spawn_local(async move { controller.next().await });
        })?;
    }

    let observer = create_visibility_observer(&controller).await;
    rebuild(&controller, observer.as_ref())?;

    // Rehacer botones y observación cuando cambian los pasos
    {
        let controller = controller.clone();
        let callback = Closure::wrap(Box::new(move |_records: Array, _observer: MutationObserver| {
            if let Err(e) = rebuild(&controller, observer.as_ref()) {
                log::error!("❌ [ONBOARDING] Error reconstruyendo: {}", describe_js(&e));
            }
        }) as Box<dyn FnMut(Array, MutationObserver)>);
        let mutations = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        mutations.observe_with_options(&view.steps, &init)?;
        callback.forget();
    }

    log::info!("🎠 [ONBOARDING] Montado con {} pasos", controller.count());
    Ok(controller)
}

fn rebuild(
    controller: &OnboardingController<DomCarouselView>,
    observer: Option<&IntersectionObserver>,
) -> Result<(), JsValue> {
    let view = controller.view();
    controller.refresh_count();

    view.buttons.set_inner_html("");
    for idx in 0..controller.count() {
        let button = ElementBuilder::new("button")?
            .text(&(idx + 1).to_string())
            .build();
        let controller = controller.clone();
        on_click(&button, move |e| {
            e.stop_propagation();
            let controller = controller.clone();
            wasm_bindgen_futures::spawn_local(async move { controller.select(idx).await });
        })?;
        append_child(&view.buttons, &button)?;
    }
    if controller.count() > 0 {
        view.mark_active(controller.item());
        let alt = view.step_alt(controller.item());
        view.set_label(&CarouselState::label_for(alt.as_deref()));
    }

    if let Some(observer) = observer {
        observer.disconnect();
        for step in element_children(&view.steps) {
            observer.observe(&step);
        }
    }
    Ok(())
}

/// IntersectionObserver sobre los pasos; carga el polyfill si hace falta.
/// Sin observer el carrusel sigue funcionando con botones y clicks.
async fn create_visibility_observer(
    controller: &OnboardingController<DomCarouselView>,
) -> Option<IntersectionObserver> {
    let has_native = Reflect::has(&js_sys::global(), &JsValue::from_str("IntersectionObserver"))
        .unwrap_or(false);
    if !has_native {
        log::warn!("⚠️ [ONBOARDING] Sin IntersectionObserver, cargando polyfill");
        if let Err(e) = inject_script(INTERSECTION_OBSERVER_POLYFILL).await {
            log::error!("❌ [ONBOARDING] Polyfill no disponible: {}", describe_js(&e));
            return None;
        }
    }

    let callback = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
            let view = controller.view();
            let changes: Vec<(usize, bool)> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    view.index_of(&entry.target())
                        .map(|idx| (idx, entry.is_intersecting()))
                })
                .collect();
            controller.on_visibility(&changes);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>)
    };

    let result = observer_init(&controller.view().steps).and_then(|init| {
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
    });
    match result {
        Ok(observer) => {
            callback.forget();
            Some(observer)
        }
        Err(e) => {
            log::error!("❌ [ONBOARDING] No se pudo crear el observer: {}", describe_js(&e));
            None
        }
    }
}

fn observer_init(root: &HtmlElement) -> Result<IntersectionObserverInit, JsValue> {
    let init = Object::new();
    Reflect::set(&init, &JsValue::from_str("root"), root)?;
    Reflect::set(&init, &JsValue::from_str("rootMargin"), &JsValue::from_str("-5px"))?;
    Reflect::set(&init, &JsValue::from_str("threshold"), &JsValue::from_f64(0.0))?;
    Ok(init.unchecked_into())
}
