// ============================================================================
// APP - Composición: onboarding -> cámara -> captura -> detección -> tarjetas
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use futures::task::LocalSpawnExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, ImageData};
use crate::config::AppConfig;
use crate::dom::{append_child, body, get_element_by_id};
use crate::error::ScannerResult;
use crate::models::has_environment_camera;
use crate::services::barcode_detector::BarcodeDetectorAdapter;
use crate::services::camera;
use crate::services::scheduler::{AnimationFrameScheduler, SharedScheduler, SharedSpawner, WasmSpawner};
use crate::services::stream_capture::{CaptureEvent, CaptureSettings, FrameSampler};
use crate::services::video_surface::VideoCanvasSurface;
use crate::services::web_detector::WebDetectorBackend;
use crate::utils::ONBOARDING_ID;
use crate::viewmodels::{OnboardingController, OnboardingEvent, ScannerViewModel};
use crate::views::{mount_onboarding, render_dot_loader, results_container, show_setup_failure, DomCarouselView, DomResultView};

type Detector = BarcodeDetectorAdapter<WebDetectorBackend>;
type Probe = Shared<LocalBoxFuture<'static, ScannerResult<()>>>;

/// Aplicación principal
#[derive(Clone)]
pub struct App {
    config: &'static AppConfig,
    scheduler: SharedScheduler,
    spawner: SharedSpawner,
    detector: Rc<Detector>,
    sampler: Rc<RefCell<Option<FrameSampler<VideoCanvasSurface>>>>,
}

impl App {
    pub fn new(config: &'static AppConfig) -> Self {
        let backend = WebDetectorBackend::new(config.barcode_polyfill_url());
        Self {
            config,
            scheduler: Rc::new(AnimationFrameScheduler),
            spawner: Rc::new(WasmSpawner),
            detector: Rc::new(BarcodeDetectorAdapter::new(backend)),
            sampler: Rc::new(RefCell::new(None)),
        }
    }

    /// Flujo completo de la app
    pub async fn run(self) {
        // La detección de prueba corre mientras se ve el onboarding
        let probe = self.start_probe();

        if let Some(host) = get_element_by_id(ONBOARDING_ID).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
            match mount_onboarding(host.clone(), &self.config.onboarding, self.scheduler.clone()).await {
                Ok(controller) => wait_for_finish(&controller).await,
                Err(e) => log::error!("❌ [APP] Error montando onboarding: {:?}", e),
            }
            host.remove();
        }

        if let Err(e) = self.initialize(probe).await {
            log::error!("❌ [APP] {}", e);
            if let Err(e) = show_setup_failure() {
                log::error!("❌ [APP] No se pudo mostrar el aviso: {:?}", e);
            }
        }
    }

    /// Detiene la captura (si hay)
    pub fn stop(&self) {
        if let Some(sampler) = self.sampler.borrow().as_ref() {
            sampler.stop();
        }
    }

    fn start_probe(&self) -> Probe {
        let detector = self.detector.clone();
        let probe = async move {
            let image: JsValue = ImageData::new_with_sw(1, 1)?.into();
            detector.detect(&image).await.map(|_| ())
        }
        .boxed_local()
        .shared();

        if let Err(e) = self.spawner.spawn_local(probe.clone().map(|_| ())) {
            log::warn!("⚠️ [APP] No se pudo lanzar la detección de prueba: {}", e);
        }
        probe
    }

    async fn initialize(&self, probe: Probe) -> ScannerResult<()> {
        probe.await?;
        log::info!("✅ [APP] Detección de códigos disponible");

        let loader = render_dot_loader()?;
        append_child(&results_container()?, &loader)?;

        let stream = camera::acquire_stream().await?;
        let devices = camera::enumerate_cameras().await.unwrap_or_else(|e| {
            log::warn!("⚠️ [APP] No se pudieron listar las cámaras: {}", e);
            Vec::new()
        });

        let mut settings = CaptureSettings::from(&self.config.capture);
        settings.flipped = !has_environment_camera(&devices);

        let surface = VideoCanvasSurface::new()?;
        let body = body()?;
        append_child(&body, surface.host())?;
        let sampler = FrameSampler::new(surface, settings, self.scheduler.clone(), self.spawner.clone());

        let results = Rc::new(DomResultView::new(self.config.results.clone(), self.scheduler.clone())?);
        let scanner = ScannerViewModel::new(self.detector.clone(), results);
        let spawner = self.spawner.clone();
        sampler.events().subscribe(move |event| match event {
            CaptureEvent::FrameCaptured(frame) => {
                let (scanner, frame) = (scanner.clone(), frame.clone());
                let task = async move {
                    scanner.process_frame(frame.as_js()).await;
                };
                if let Err(e) = spawner.spawn_local(task) {
                    log::error!("❌ [APP] No se pudo procesar el frame: {}", e);
                }
            }
            CaptureEvent::Started => log::info!("📷 [APP] Captura iniciada"),
            CaptureEvent::Stopped => log::info!("⏹️ [APP] Captura detenida"),
            CaptureEvent::Failed(e) => log::error!("❌ [APP] Captura fallida: {}", e),
        });

        sampler.start(stream)?;
        *self.sampler.borrow_mut() = Some(sampler);
        Ok(())
    }
}

/// Espera al primer Finished del carrusel
async fn wait_for_finish(controller: &OnboardingController<DomCarouselView>) {
    let (tx, rx) = oneshot::channel::<()>();
    let tx = RefCell::new(Some(tx));
    let id = controller.events().subscribe(move |event| {
        if let OnboardingEvent::Finished { .. } = event {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        }
    });
    let _ = rx.await;
    controller.events().unsubscribe(id);
}
