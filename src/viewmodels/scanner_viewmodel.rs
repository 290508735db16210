// ============================================================================
// SCANNER VIEWMODEL - Frame capturado -> detección -> tarjetas
// ============================================================================
// Backpressure: si hay una detección en curso, el frame nuevo se descarta.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use crate::error::ScannerError;
use crate::services::barcode_detector::{BarcodeDetectorAdapter, DetectorBackend};
use crate::state::BarcodeRegistry;

/// Salida visual de los resultados
pub trait ResultView {
    fn show_card(&self, value: &str);

    fn vibrate(&self);

    /// Quita el indicador de carga (si sigue ahí)
    fn hide_loader(&self);
}

/// Deduplica valores y pinta uno nuevo por tarjeta
#[derive(Debug, Default)]
pub struct ResultPresenter {
    registry: BarcodeRegistry,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &BarcodeRegistry {
        &self.registry
    }

    /// Devuelve cuántos valores eran nuevos
    pub fn present<'a, V, I>(&mut self, values: I, view: &V) -> usize
    where
        V: ResultView + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let mut new = 0;
        for value in values {
            if !self.registry.record(value) {
                continue;
            }
            log::info!("✅ [SCANNER] Código detectado: {}", value);
            view.vibrate();
            view.show_card(value);
            new += 1;
        }
        new
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Había una detección en curso
    Skipped,
    Processed { new: usize },
    Failed(ScannerError),
}

// Libera el flag aunque la future se descarte a medias
struct InFlight(Rc<Cell<bool>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct ScannerViewModel<B: DetectorBackend, V: ResultView> {
    detector: Rc<BarcodeDetectorAdapter<B>>,
    view: Rc<V>,
    presenter: Rc<RefCell<ResultPresenter>>,
    busy: Rc<Cell<bool>>,
}

impl<B: DetectorBackend, V: ResultView> Clone for ScannerViewModel<B, V> {
    fn clone(&self) -> Self {
        Self {
            detector: self.detector.clone(),
            view: self.view.clone(),
            presenter: self.presenter.clone(),
            busy: self.busy.clone(),
        }
    }
}

impl<B: DetectorBackend, V: ResultView> ScannerViewModel<B, V> {
    pub fn new(detector: Rc<BarcodeDetectorAdapter<B>>, view: Rc<V>) -> Self {
        Self {
            detector,
            view,
            presenter: Rc::new(RefCell::new(ResultPresenter::new())),
            busy: Rc::new(Cell::new(false)),
        }
    }

    pub fn seen_count(&self) -> usize {
        self.presenter.borrow().registry().len()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub async fn process_frame(&self, image: &B::Image) -> FrameOutcome {
        if self.busy.get() {
            log::debug!("⏭️ [SCANNER] Detección en curso, frame descartado");
            return FrameOutcome::Skipped;
        }
        self.busy.set(true);
        let guard = InFlight(self.busy.clone());
        let result = self.detector.detect(image).await;
        drop(guard);

        let outcome = match result {
            Ok(found) => {
                let new = self
                    .presenter
                    .borrow_mut()
                    .present(found.iter().map(|b| b.raw_value.as_str()), &*self.view);
                FrameOutcome::Processed { new }
            }
            Err(e) => {
                log::error!("❌ [SCANNER] {}", e);
                FrameOutcome::Failed(e)
            }
        };
        self.view.hide_loader();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScannerResult;
    use crate::models::DetectedBarcode;
    use crate::services::barcode_detector::{BarcodeEngine, DetectorPath};
    use crate::services::scheduler::{FrameScheduler, ManualScheduler};
    use futures::executor::{block_on, LocalPool};
    use futures::future::{FutureExt, LocalBoxFuture};
    use futures::task::LocalSpawnExt;

    #[derive(Default)]
    struct FakeResults {
        calls: RefCell<Vec<String>>,
    }

    impl ResultView for FakeResults {
        fn show_card(&self, value: &str) {
            self.calls.borrow_mut().push(format!("card:{}", value));
        }
        fn vibrate(&self) {
            self.calls.borrow_mut().push("vibrate".into());
        }
        fn hide_loader(&self) {
            self.calls.borrow_mut().push("loader".into());
        }
    }

    struct SplitEngine {
        gate: Option<ManualScheduler>,
    }

    impl BarcodeEngine for SplitEngine {
        type Image = str;

        fn ready(&self) -> LocalBoxFuture<'static, ScannerResult<()>> {
            futures::future::ready(Ok(())).boxed_local()
        }

        fn detect(&self, image: &str) -> LocalBoxFuture<'static, ScannerResult<Vec<DetectedBarcode>>> {
            let found: Vec<_> = image
                .split(',')
                .filter(|v| !v.is_empty())
                .map(DetectedBarcode::new)
                .collect();
            match &self.gate {
                Some(gate) => gate.next_frame().map(move |_| Ok(found)).boxed_local(),
                None => futures::future::ready(Ok(found)).boxed_local(),
            }
        }
    }

    struct NativeOnly {
        gate: Option<ManualScheduler>,
    }

    impl DetectorBackend for NativeOnly {
        type Image = str;
        type Engine = SplitEngine;

        fn has_native(&self) -> bool {
            true
        }
        fn load_fallback(&self) -> LocalBoxFuture<'static, ScannerResult<()>> {
            futures::future::ready(Ok(())).boxed_local()
        }
        fn create(&self, _path: DetectorPath) -> ScannerResult<SplitEngine> {
            Ok(SplitEngine {
                gate: self.gate.clone(),
            })
        }
    }

    fn view_model(gate: Option<ManualScheduler>) -> (ScannerViewModel<NativeOnly, FakeResults>, Rc<FakeResults>) {
        let view = Rc::new(FakeResults::default());
        let detector = Rc::new(BarcodeDetectorAdapter::new(NativeOnly { gate }));
        (ScannerViewModel::new(detector, view.clone()), view)
    }

    #[test]
    fn test_duplicate_values_produce_one_card() {
        let (vm, view) = view_model(None);
        let outcome = block_on(vm.process_frame("ABC123,ABC123"));
        assert_eq!(outcome, FrameOutcome::Processed { new: 1 });
        assert_eq!(
            *view.calls.borrow(),
            vec!["vibrate", "card:ABC123", "loader"]
        );

        let outcome = block_on(vm.process_frame("ABC123"));
        assert_eq!(outcome, FrameOutcome::Processed { new: 0 });
        assert_eq!(vm.seen_count(), 1);
    }

    #[test]
    fn test_new_values_across_frames() {
        let (vm, view) = view_model(None);
        block_on(vm.process_frame("A"));
        block_on(vm.process_frame("B,A"));
        let cards: Vec<_> = view
            .calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("card:"))
            .cloned()
            .collect();
        assert_eq!(cards, vec!["card:A", "card:B"]);
    }

    #[test]
    fn test_frame_during_detection_is_dropped() {
        let mut pool = LocalPool::new();
        let gate = ManualScheduler::new();
        let (vm, view) = view_model(Some(gate.clone()));
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        for frame in ["FIRST", "SECOND"] {
            let (vm, outcomes) = (vm.clone(), outcomes.clone());
            pool.spawner()
                .spawn_local(async move {
                    let outcome = vm.process_frame(frame).await;
                    outcomes.borrow_mut().push(outcome);
                })
                .unwrap();
            pool.run_until_stalled();
        }
        assert!(vm.is_busy());
        assert_eq!(*outcomes.borrow(), vec![FrameOutcome::Skipped]);

        gate.tick(16.0);
        pool.run_until_stalled();
        assert!(!vm.is_busy());
        assert_eq!(
            *outcomes.borrow(),
            vec![FrameOutcome::Skipped, FrameOutcome::Processed { new: 1 }]
        );
        assert!(view.calls.borrow().contains(&"card:FIRST".to_string()));
        assert!(!view.calls.borrow().contains(&"card:SECOND".to_string()));
    }

    #[test]
    fn test_presenter_dedup() {
        let view = FakeResults::default();
        let mut presenter = ResultPresenter::new();
        assert_eq!(presenter.present(["X", "Y", "X"], &view), 2);
        assert_eq!(presenter.present(["Y"], &view), 0);
        assert_eq!(presenter.registry().len(), 2);
    }
}
