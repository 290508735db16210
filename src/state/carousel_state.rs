// ============================================================================
// CAROUSEL STATE - Máquina de estados del onboarding (sin DOM)
// ============================================================================
// Invariante: item < count, o count == 0 e item == 0
// ============================================================================

use std::collections::BTreeSet;
use crate::config::CarouselMode;

pub const DEFAULT_STEP_LABEL: &str = "No description provided";

/// Transición validada entre dos pasos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<usize>,
    pub to: usize,
    pub mode: CarouselMode,
}

/// Resultado de `next()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Ya estábamos en el último paso
    Finished(usize),
    Goto(Transition),
}

#[derive(Debug, Clone, Default)]
pub struct CarouselState {
    item: usize,
    count: usize,
    mode: CarouselMode,
    visible: BTreeSet<usize>,
    // Último paso reportado como único visible (para no repetir ItemChanged)
    singleton: Option<usize>,
}

impl CarouselState {
    pub fn new(count: usize, mode: CarouselMode) -> Self {
        Self {
            count,
            mode,
            ..Self::default()
        }
    }

    pub fn item(&self) -> usize {
        self.item
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible.iter().copied()
    }

    /// Recalcular tras un cambio estructural (hijos añadidos/eliminados)
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.item = if count == 0 { 0 } else { self.item.min(count - 1) };
        self.visible.retain(|&idx| idx < count);
        if self.singleton.map_or(false, |idx| idx >= count) {
            self.singleton = None;
        }
    }

    /// Avanzar un paso; en el último paso se reporta Finished sin moverse
    pub fn next(&mut self) -> NextStep {
        if self.count == 0 {
            return NextStep::Finished(self.item);
        }
        let from = self.item;
        let target = (from + 1).min(self.count - 1);
        if target == from {
            return NextStep::Finished(from);
        }
        self.item = target;
        NextStep::Goto(Transition {
            from: Some(from),
            to: target,
            mode: self.mode,
        })
    }

    /// Validar una transición. `None` = no-op.
    pub fn transition(&self, from: Option<usize>, to: usize) -> Option<Transition> {
        if to >= self.count {
            return None;
        }
        if let Some(from) = from {
            if from >= self.count || from == to {
                return None;
            }
        }
        Some(Transition {
            from,
            to,
            mode: self.mode,
        })
    }

    /// Navegación directa (botón indicador)
    pub fn select(&mut self, index: usize) -> Option<Transition> {
        if index >= self.count {
            return None;
        }
        let from = self.item;
        self.item = index;
        self.transition(Some(from), index)
    }

    /// Aplicar entradas de visibilidad `(índice, visible)`.
    /// Devuelve los índices para los que hay que emitir ItemChanged.
    pub fn observe(&mut self, entries: &[(usize, bool)]) -> Vec<usize> {
        let mut changed = Vec::new();
        for &(idx, is_visible) in entries {
            if idx >= self.count {
                continue;
            }
            if is_visible {
                self.visible.insert(idx);
            } else {
                self.visible.remove(&idx);
            }

            if self.visible.len() != 1 {
                self.singleton = None;
                continue;
            }
            let only = *self.visible.iter().next().unwrap_or(&idx);
            if self.singleton != Some(only) {
                self.singleton = Some(only);
                self.item = only;
                changed.push(only);
            }
        }
        changed
    }

    /// En modo fade el destino se marca visible antes de aparecer
    pub fn mark_visible(&mut self, idx: usize) {
        if idx < self.count {
            self.visible.insert(idx);
        }
    }

    /// Etiqueta de accesibilidad a partir del `alt` del paso
    pub fn label_for(alt: Option<&str>) -> String {
        match alt {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => DEFAULT_STEP_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_monotonic_and_bounded() {
        let mut state = CarouselState::new(3, CarouselMode::Scroll);
        let mut last = state.item();
        for _ in 0..10 {
            state.next();
            assert!(state.item() >= last);
            assert!(state.item() <= 2);
            last = state.item();
        }
        assert_eq!(state.item(), 2);
    }

    #[test]
    fn test_next_at_last_finishes_without_moving() {
        let mut state = CarouselState::new(2, CarouselMode::Fade);
        assert_eq!(
            state.next(),
            NextStep::Goto(Transition {
                from: Some(0),
                to: 1,
                mode: CarouselMode::Fade
            })
        );
        assert_eq!(state.next(), NextStep::Finished(1));
        assert_eq!(state.next(), NextStep::Finished(1));
        assert_eq!(state.item(), 1);
    }

    #[test]
    fn test_next_on_empty_finishes() {
        let mut state = CarouselState::new(0, CarouselMode::Scroll);
        assert_eq!(state.next(), NextStep::Finished(0));
        assert_eq!(state.item(), 0);
    }

    #[test]
    fn test_transition_noops() {
        let state = CarouselState::new(3, CarouselMode::Scroll);
        assert!(state.transition(None, 3).is_none());
        assert!(state.transition(Some(5), 1).is_none());
        assert!(state.transition(Some(1), 1).is_none());
        assert!(state.transition(None, 2).is_some());
        assert!(state.transition(Some(0), 2).is_some());
    }

    #[test]
    fn test_select() {
        let mut state = CarouselState::new(4, CarouselMode::Scroll);
        let t = state.select(2).unwrap();
        assert_eq!((t.from, t.to), (Some(0), 2));
        assert_eq!(state.item(), 2);
        assert!(state.select(9).is_none());
        assert_eq!(state.item(), 2);
        assert!(state.select(2).is_none());
    }

    #[test]
    fn test_observe_singleton_fires_once() {
        let mut state = CarouselState::new(3, CarouselMode::Scroll);
        assert_eq!(state.observe(&[(0, true)]), vec![0]);
        // Mismo singleton en otra tanda: no se repite
        assert_eq!(state.observe(&[(0, true)]), Vec::<usize>::new());
        // Durante el scroll dos pasos visibles, luego solo el segundo
        assert_eq!(state.observe(&[(1, true)]), Vec::<usize>::new());
        assert_eq!(state.observe(&[(0, false)]), vec![1]);
        assert_eq!(state.item(), 1);
    }

    #[test]
    fn test_observe_batch_reports_transition_once() {
        let mut state = CarouselState::new(3, CarouselMode::Scroll);
        state.observe(&[(0, true)]);
        let changed = state.observe(&[(0, false), (1, true), (9, true)]);
        assert_eq!(changed, vec![1]);
        assert_eq!(state.item(), 1);
    }

    #[test]
    fn test_set_count_keeps_index_valid() {
        let mut state = CarouselState::new(5, CarouselMode::Scroll);
        state.select(4);
        state.observe(&[(4, true)]);
        state.set_count(2);
        assert_eq!(state.item(), 1);
        assert_eq!(state.visible().count(), 0);
        state.set_count(0);
        assert_eq!(state.item(), 0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_label_for() {
        assert_eq!(CarouselState::label_for(Some("Paso 1")), "Paso 1");
        assert_eq!(CarouselState::label_for(Some("")), DEFAULT_STEP_LABEL);
        assert_eq!(CarouselState::label_for(None), DEFAULT_STEP_LABEL);
    }
}
