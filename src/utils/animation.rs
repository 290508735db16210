// ============================================================================
// ANIMATION - Clamp, easing y fade de opacidad por frames
// ============================================================================

use std::cell::Cell;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;
use crate::services::scheduler::FrameScheduler;

const FADE_TOKEN_ATTR: &str = "data-fade-token";

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Cúbica de salida
pub fn ease_out(value: f64) -> f64 {
    1.0 - (1.0 - value).powi(3)
}

#[derive(Debug, Clone, Copy)]
pub struct FadeOptions {
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
    pub ease: fn(f64) -> f64,
}

impl Default for FadeOptions {
    fn default() -> Self {
        Self {
            from: 1.0,
            to: 0.0,
            duration_ms: 250.0,
            ease: ease_out,
        }
    }
}

impl FadeOptions {
    pub fn fade_in() -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Opacidad tras `elapsed` ms y si la animación terminó
    pub fn sample(&self, elapsed: f64) -> (f64, bool) {
        if self.duration_ms <= 0.0 {
            return (self.to, true);
        }
        let time = clamp(elapsed / self.duration_ms, 0.0, 1.0);
        if time >= 1.0 {
            return (self.to, true);
        }
        (self.from + (self.to - self.from) * (self.ease)(time), false)
    }
}

/// Algo cuya opacidad se puede animar
pub trait FadeTarget {
    fn set_opacity(&self, value: f64);

    /// Reclama el target para una animación nueva; cancela la anterior
    fn claim_fade(&self) -> u64;

    /// ¿Sigue siendo `token` la animación activa?
    fn owns_fade(&self, token: u64) -> bool;
}

/// Anima la opacidad de `target`. Si otra animación reclama el mismo
/// target, esta termina en el siguiente frame sin tocar la opacidad.
pub async fn fade<T>(target: &T, options: FadeOptions, scheduler: &dyn FrameScheduler)
where
    T: FadeTarget + ?Sized,
{
    let token = target.claim_fade();
    target.set_opacity(options.from);
    let start = scheduler.now();

    loop {
        let now = scheduler.next_frame().await;
        if !target.owns_fade(token) {
            return;
        }
        let (value, done) = options.sample(now - start);
        target.set_opacity(value);
        if done {
            return;
        }
    }
}

thread_local! {
    static NEXT_FADE_TOKEN: Cell<u64> = Cell::new(1);
}

// En el DOM el token vive en un atributo del propio elemento
impl FadeTarget for HtmlElement {
    fn set_opacity(&self, value: f64) {
        if let Err(e) = self.style().set_property("opacity", &value.to_string()) {
            log::warn!("⚠️ [FADE] No se pudo aplicar opacidad: {:?}", e);
        }
    }

    fn claim_fade(&self) -> u64 {
        let token = NEXT_FADE_TOKEN.with(|next| {
            let token = next.get();
            next.set(token + 1);
            token
        });
        let _ = self.set_attribute(FADE_TOKEN_ATTR, &token.to_string());
        token
    }

    fn owns_fade(&self, token: u64) -> bool {
        self.get_attribute(FADE_TOKEN_ATTR)
            .and_then(|value| value.parse::<u64>().ok())
            == Some(token)
    }
}

/// Restablece opacidad 1 (tras un fade-out que debe seguir siendo scrolleable)
pub fn restore_opacity(element: &HtmlElement) -> Result<(), JsValue> {
    element.style().set_property("opacity", "1")
}
