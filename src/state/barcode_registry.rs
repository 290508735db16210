// ============================================================================
// BARCODE REGISTRY - Códigos ya detectados (solo en memoria)
// ============================================================================

use std::collections::HashSet;

/// Conjunto append-only de valores ya mostrados
#[derive(Debug, Default, Clone)]
pub struct BarcodeRegistry {
    seen: HashSet<String>,
}

impl BarcodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra el valor. Devuelve `true` solo la primera vez.
    pub fn record(&mut self, raw_value: &str) -> bool {
        if self.seen.contains(raw_value) {
            return false;
        }
        self.seen.insert(raw_value.to_string())
    }

    pub fn contains(&self, raw_value: &str) -> bool {
        self.seen.contains(raw_value)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
