// ============================================================================
// STATE MODULE - Estado puro (sin DOM) + canal de eventos
// ============================================================================

pub mod reactivity;
pub mod carousel_state;
pub mod barcode_registry;

pub use reactivity::*;
pub use carousel_state::*;
pub use barcode_registry::*;
