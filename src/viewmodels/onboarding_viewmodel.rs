// ============================================================================
// ONBOARDING VIEWMODEL - Navegación del carrusel de bienvenida
// ============================================================================
// La lógica (índice, visibilidad, no-ops) vive en CarouselState; aquí se
// orquestan las animaciones sobre la vista y se emiten los eventos.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use futures::future::LocalBoxFuture;
use crate::config::CarouselMode;
use crate::state::{CarouselState, Emitter, NextStep, Transition};
use crate::utils::animation::FadeOptions;

/// Lo que el controlador necesita de la vista del carrusel
pub trait CarouselView {
    fn step_count(&self) -> usize;

    /// Atributo `alt` del paso
    fn step_alt(&self, idx: usize) -> Option<String>;

    fn set_label(&self, label: &str);

    fn scroll_to(&self, idx: usize, smooth: bool);

    fn fade(&self, idx: usize, options: FadeOptions) -> LocalBoxFuture<'static, ()>;

    fn restore_opacity(&self, idx: usize);

    /// Marca el botón indicador `idx` como activo (y el resto inactivos)
    fn mark_active(&self, idx: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingEvent {
    ItemChanged { item: usize },
    Finished { item: usize },
}

pub struct OnboardingController<V: CarouselView> {
    view: Rc<V>,
    state: Rc<RefCell<CarouselState>>,
    events: Emitter<OnboardingEvent>,
}

impl<V: CarouselView> Clone for OnboardingController<V> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            state: self.state.clone(),
            events: self.events.clone(),
        }
    }
}

impl<V: CarouselView> OnboardingController<V> {
    pub fn new(view: Rc<V>, mode: CarouselMode) -> Self {
        let state = CarouselState::new(view.step_count(), mode);
        Self {
            view,
            state: Rc::new(RefCell::new(state)),
            events: Emitter::new(),
        }
    }

    pub fn events(&self) -> &Emitter<OnboardingEvent> {
        &self.events
    }

    pub fn view(&self) -> &Rc<V> {
        &self.view
    }

    pub fn item(&self) -> usize {
        self.state.borrow().item()
    }

    pub fn count(&self) -> usize {
        self.state.borrow().count()
    }

    /// Los pasos cambiaron en el DOM
    pub fn refresh_count(&self) {
        let count = self.view.step_count();
        let item = {
            let mut state = self.state.borrow_mut();
            state.set_count(count);
            state.item()
        };
        log::debug!("🎠 [ONBOARDING] {} pasos", count);
        if count > 0 {
            self.view.mark_active(item);
        }
    }

    /// Siguiente paso; en el último se emite Finished
    pub async fn next(&self) {
        let step = self.state.borrow_mut().next();
        match step {
            NextStep::Finished(item) => {
                log::info!("🏁 [ONBOARDING] Terminado en el paso {}", item);
                self.events.emit(&OnboardingEvent::Finished { item });
            }
            NextStep::Goto(transition) => self.run(transition).await,
        }
    }

    /// Transición explícita; no-op si los índices no son válidos
    pub async fn goto(&self, from: Option<usize>, to: usize) {
        let transition = self.state.borrow().transition(from, to);
        if let Some(transition) = transition {
            self.run(transition).await;
        }
    }

    /// Click en un botón indicador
    pub async fn select(&self, idx: usize) {
        let transition = self.state.borrow_mut().select(idx);
        if self.state.borrow().count() > idx {
            self.view.mark_active(idx);
        }
        if let Some(transition) = transition {
            self.run(transition).await;
        }
    }

    /// Entradas del IntersectionObserver `(índice, visible)`
    pub fn on_visibility(&self, entries: &[(usize, bool)]) {
        let changed = self.state.borrow_mut().observe(entries);
        for item in changed {
            self.view.mark_active(item);
            self.events.emit(&OnboardingEvent::ItemChanged { item });
        }
    }

    async fn run(&self, transition: Transition) {
        let Transition { from, to, mode } = transition;
        match mode {
            CarouselMode::Fade => {
                if let Some(from) = from {
                    self.view.fade(from, FadeOptions::default()).await;
                    // Opacidad 1 para que siga visible al hacer scroll manual
                    self.view.restore_opacity(from);
                }
                self.view.scroll_to(to, false);
                self.state.borrow_mut().mark_visible(to);
                self.view.fade(to, FadeOptions::fade_in()).await;
            }
            CarouselMode::Scroll => self.view.scroll_to(to, true),
        }
        let label = CarouselState::label_for(self.view.step_alt(to).as_deref());
        self.view.set_label(&label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::FutureExt;

    #[derive(Default)]
    struct FakeView {
        alts: Vec<Option<String>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeView {
        fn with_steps(alts: &[Option<&str>]) -> Rc<Self> {
            Rc::new(Self {
                alts: alts.iter().map(|a| a.map(str::to_string)).collect(),
                calls: RefCell::new(Vec::new()),
            })
        }

        fn take_calls(&self) -> Vec<String> {
            self.calls.borrow_mut().drain(..).collect()
        }
    }

    impl CarouselView for FakeView {
        fn step_count(&self) -> usize {
            self.alts.len()
        }
        fn step_alt(&self, idx: usize) -> Option<String> {
            self.alts.get(idx).cloned().flatten()
        }
        fn set_label(&self, label: &str) {
            self.calls.borrow_mut().push(format!("label:{}", label));
        }
        fn scroll_to(&self, idx: usize, smooth: bool) {
            self.calls.borrow_mut().push(format!("scroll:{}:{}", idx, smooth));
        }
        fn fade(&self, idx: usize, options: FadeOptions) -> LocalBoxFuture<'static, ()> {
            self.calls
                .borrow_mut()
                .push(format!("fade:{}:{}->{}", idx, options.from, options.to));
            futures::future::ready(()).boxed_local()
        }
        fn restore_opacity(&self, idx: usize) {
            self.calls.borrow_mut().push(format!("restore:{}", idx));
        }
        fn mark_active(&self, idx: usize) {
            self.calls.borrow_mut().push(format!("active:{}", idx));
        }
    }

    fn record(controller: &OnboardingController<FakeView>) -> Rc<RefCell<Vec<OnboardingEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        controller.events().subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    #[test]
    fn test_next_at_last_step_finishes_without_moving() {
        let view = FakeView::with_steps(&[None, None, None]);
        let controller = OnboardingController::new(view.clone(), CarouselMode::Scroll);
        let events = record(&controller);

        block_on(controller.next());
        block_on(controller.next());
        assert_eq!(controller.item(), 2);
        assert!(events.borrow().is_empty());

        view.take_calls();
        block_on(controller.next());
        assert_eq!(controller.item(), 2);
        assert_eq!(*events.borrow(), vec![OnboardingEvent::Finished { item: 2 }]);
        assert!(view.take_calls().is_empty());
    }

    #[test]
    fn test_next_without_steps_finishes_at_zero() {
        let view = FakeView::with_steps(&[]);
        let controller = OnboardingController::new(view, CarouselMode::Scroll);
        let events = record(&controller);
        block_on(controller.next());
        assert_eq!(*events.borrow(), vec![OnboardingEvent::Finished { item: 0 }]);
    }

    #[test]
    fn test_scroll_transition_sets_label() {
        let view = FakeView::with_steps(&[Some("Welcome"), Some("Point at a barcode")]);
        let controller = OnboardingController::new(view.clone(), CarouselMode::Scroll);
        block_on(controller.next());
        assert_eq!(
            view.take_calls(),
            vec!["scroll:1:true", "label:Point at a barcode"]
        );
    }

    #[test]
    fn test_fade_transition_order() {
        let view = FakeView::with_steps(&[Some("a"), None]);
        let controller = OnboardingController::new(view.clone(), CarouselMode::Fade);
        block_on(controller.goto(Some(0), 1));
        assert_eq!(
            view.take_calls(),
            vec![
                "fade:0:1->0",
                "restore:0",
                "scroll:1:false",
                "fade:1:0->1",
                "label:No description provided",
            ]
        );
    }

    #[test]
    fn test_invalid_goto_is_a_no_op() {
        let view = FakeView::with_steps(&[None, None, None]);
        let controller = OnboardingController::new(view.clone(), CarouselMode::Fade);
        let events = record(&controller);

        block_on(controller.goto(None, 3));
        block_on(controller.goto(Some(5), 1));
        block_on(controller.goto(Some(1), 1));

        assert!(view.take_calls().is_empty());
        assert!(events.borrow().is_empty());
        assert_eq!(controller.item(), 0);
    }

    #[test]
    fn test_visibility_emits_one_item_changed_per_new_singleton() {
        let view = FakeView::with_steps(&[None, None, None]);
        let controller = OnboardingController::new(view, CarouselMode::Scroll);
        let events = record(&controller);

        controller.on_visibility(&[(0, true)]);
        controller.on_visibility(&[(1, true)]);
        controller.on_visibility(&[(0, false)]);
        controller.on_visibility(&[(0, false)]);

        assert_eq!(
            *events.borrow(),
            vec![
                OnboardingEvent::ItemChanged { item: 0 },
                OnboardingEvent::ItemChanged { item: 1 },
            ]
        );
        assert_eq!(controller.item(), 1);
    }

    #[test]
    fn test_select_ignores_out_of_range() {
        let view = FakeView::with_steps(&[None, None, None]);
        let controller = OnboardingController::new(view.clone(), CarouselMode::Scroll);

        block_on(controller.select(7));
        assert_eq!(controller.item(), 0);
        assert!(view.take_calls().is_empty());

        block_on(controller.select(2));
        assert_eq!(controller.item(), 2);
        assert_eq!(
            view.take_calls(),
            vec!["active:2", "scroll:2:true", "label:No description provided"]
        );
    }

    #[test]
    fn test_refresh_count_clamps_item() {
        let view = FakeView::with_steps(&[None, None, None]);
        let controller = OnboardingController::new(view, CarouselMode::Scroll);
        block_on(controller.select(2));

        let smaller = FakeView::with_steps(&[None]);
        let controller = OnboardingController {
            view: smaller,
            ..controller
        };
        controller.refresh_count();
        assert_eq!(controller.count(), 1);
        assert_eq!(controller.item(), 0);
    }
}
