// ============================================================================
// REACTIVITY - Canal de eventos con subscribers explícitos
// ============================================================================
// Reemplaza los CustomEvent que burbujean por el DOM: cada componente expone
// un Emitter y los interesados se suscriben con un callback.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback<E> = Rc<dyn Fn(&E)>;

/// Identificador de suscripción (para unsubscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Emisor de eventos con sistema de subscribers
pub struct Emitter<E> {
    subscribers: Rc<RefCell<Vec<(SubscriptionId, Callback<E>)>>>,
    next_id: Rc<Cell<u64>>,
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    /// Suscribirse a eventos
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Cancelar suscripción
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Notificar a todos los subscribers
    pub fn emit(&self, event: &E) {
        // Copia de los callbacks: un subscriber puede (des)suscribirse mientras emitimos
        let callbacks: Vec<Callback<E>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

// Los clones comparten subscribers (mismo canal)
impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let emitter: Emitter<u32> = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..2u32 {
            let seen = seen.clone();
            emitter.subscribe(move |value: &u32| seen.borrow_mut().push((tag, *value)));
        }
        emitter.emit(&7);
        assert_eq!(*seen.borrow(), vec![(0, 7), (1, 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let emitter: Emitter<()> = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let id = {
            let count = count.clone();
            emitter.subscribe(move |_| count.set(count.get() + 1))
        };
        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_clone_shares_channel() {
        let emitter: Emitter<()> = Emitter::new();
        let clone = emitter.clone();
        let hit = Rc::new(Cell::new(false));
        {
            let hit = hit.clone();
            clone.subscribe(move |_| hit.set(true));
        }
        emitter.emit(&());
        assert!(hit.get());
    }

    #[test]
    fn test_subscribe_during_emit_is_safe() {
        let emitter: Emitter<()> = Emitter::new();
        let hits = Rc::new(Cell::new(0));
        {
            let (inner, hits) = (emitter.clone(), hits.clone());
            emitter.subscribe(move |_| {
                let hits = hits.clone();
                inner.subscribe(move |_| hits.set(hits.get() + 1));
            });
        }
        emitter.emit(&());
        assert_eq!(hits.get(), 0);
        emitter.emit(&());
        assert_eq!(hits.get(), 1);
    }
}
