// ============================================================================
// CONSTANTES - Selectores, rutas y textos compartidos
// ============================================================================

/// Carrusel de bienvenida (presente en index.html)
pub const ONBOARDING_ID: &str = "onboarding";

/// Contenedor de tarjetas de resultados
pub const RESULTS_CONTAINER_ID: &str = "container";

pub const DOT_LOADER_CLASS: &str = "dot-loader";
pub const DATA_CARD_CLASS: &str = "data-card";
pub const NO_SUPPORT_CLASS: &str = "no-support-card";
pub const ACTIVE_CLASS: &str = "active";

pub const INTERSECTION_OBSERVER_POLYFILL: &str =
    "/third_party/intersection-observer/intersection-observer-polyfill.js";

pub const NO_SUPPORT_MESSAGE: &str = "Sorry, this browser does not support the required features";
