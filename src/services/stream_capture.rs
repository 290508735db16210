// ============================================================================
// STREAM CAPTURE - Muestreo de frames de un stream de cámara
// ============================================================================
// - Un solo stream por sampler: start() con stream activo es error
// - Cada frame de animación dibuja el video en el canvas (escalado)
// - El gate de intervalo decide si ese frame también se captura y emite
// - capture_frame() captura bajo demanda, sin pasar por el gate
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use crate::config::{CaptureConfig, CaptureRate, CaptureScale, FrameEncoding};
use crate::error::{ScannerError, ScannerResult};
use crate::services::scheduler::{SharedScheduler, SharedSpawner};
use crate::state::Emitter;

/// Frames a esperar por dimensiones de video no nulas tras `playing`
pub const DIMENSION_PROBE_FRAMES: u32 = 5;

/// Superficie de captura: el sink de video + canvas donde se dibuja
pub trait CaptureSurface {
    type Stream: 'static;
    type Frame: Clone + 'static;

    /// Enlaza el stream al video e inicia la reproducción
    fn attach(&mut self, stream: &Self::Stream) -> ScannerResult<()>;

    /// Resuelve cuando el video empieza a reproducirse
    fn playing(&mut self) -> LocalBoxFuture<'static, ()>;

    /// Dimensiones reales del video (0 mientras no se conocen)
    fn video_size(&self) -> (u32, u32);

    /// Dimensiona el canvas (y lo espeja si `flipped`)
    fn configure(&mut self, width: u32, height: u32, flipped: bool);

    /// Dibuja el frame actual del video a la escala dada
    fn draw(&mut self, scale: f64);

    /// Lee el contenido actual del canvas
    fn read_frame(&self, encoding: FrameEncoding) -> LocalBoxFuture<'static, ScannerResult<Self::Frame>>;

    /// Detiene las pistas del stream y limpia el canvas
    fn release(&mut self, stream: Self::Stream);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSettings {
    pub rate: CaptureRate,
    pub scale: CaptureScale,
    pub encoding: FrameEncoding,
    /// Espejar horizontalmente (cámara frontal)
    pub flipped: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            rate: CaptureRate::MANUAL,
            scale: CaptureScale::default(),
            encoding: FrameEncoding::Pixels,
            flipped: false,
        }
    }
}

impl From<&CaptureConfig> for CaptureSettings {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            rate: config.rate,
            scale: config.scale,
            encoding: config.encoding,
            flipped: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CaptureEvent<F> {
    Started,
    FrameCaptured(F),
    Stopped,
    Failed(ScannerError),
}

/// Gate por intervalo de reloj
#[derive(Debug, Clone, Copy)]
pub struct CaptureGate {
    rate: CaptureRate,
    last_capture: f64,
}

impl CaptureGate {
    pub fn new(rate: CaptureRate) -> Self {
        Self {
            rate,
            last_capture: -1.0,
        }
    }

    /// ¿Capturar el frame de `now`? Registra la captura si es así.
    pub fn should_capture(&mut self, now: f64) -> bool {
        if self.rate.is_manual() {
            return false;
        }
        if now - self.last_capture > self.rate.millis() as f64 {
            self.last_capture = now;
            return true;
        }
        false
    }
}

struct CaptureSession<St> {
    stream: St,
    generation: u64,
    settings: CaptureSettings,
    gate: CaptureGate,
}

/// Sampler de frames sobre una CaptureSurface
pub struct FrameSampler<S: CaptureSurface> {
    surface: Rc<RefCell<S>>,
    session: Rc<RefCell<Option<CaptureSession<S::Stream>>>>,
    settings: CaptureSettings,
    generation: Rc<Cell<u64>>,
    scheduler: SharedScheduler,
    spawner: SharedSpawner,
    events: Emitter<CaptureEvent<S::Frame>>,
}

impl<S: CaptureSurface> Clone for FrameSampler<S> {
    fn clone(&self) -> Self {
        Self {
            surface: self.surface.clone(),
            session: self.session.clone(),
            settings: self.settings,
            generation: self.generation.clone(),
            scheduler: self.scheduler.clone(),
            spawner: self.spawner.clone(),
            events: self.events.clone(),
        }
    }
}

impl<S: CaptureSurface + 'static> FrameSampler<S> {
    pub fn new(
        surface: S,
        settings: CaptureSettings,
        scheduler: SharedScheduler,
        spawner: SharedSpawner,
    ) -> Self {
        Self {
            surface: Rc::new(RefCell::new(surface)),
            session: Rc::new(RefCell::new(None)),
            settings,
            generation: Rc::new(Cell::new(0)),
            scheduler,
            spawner,
            events: Emitter::new(),
        }
    }

    pub fn events(&self) -> &Emitter<CaptureEvent<S::Frame>> {
        &self.events
    }

    pub fn is_active(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Enlaza un stream e inicia el bucle de dibujado
    pub fn start(&self, stream: S::Stream) -> ScannerResult<()> {
        if self.session.borrow().is_some() {
            return Err(ScannerError::StreamAlreadyBound);
        }
        self.surface.borrow_mut().attach(&stream)?;

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let settings = self.settings;
        *self.session.borrow_mut() = Some(CaptureSession {
            stream,
            generation,
            settings,
            gate: CaptureGate::new(settings.rate),
        });
        log::info!(
            "📷 [CAPTURE] Sesión {} iniciada (rate={}ms, scale={})",
            generation,
            settings.rate.millis(),
            settings.scale.value()
        );

        let sampler = self.clone();
        if let Err(e) = self.spawner.spawn_local(async move { sampler.run(generation).await }) {
            log::error!("❌ [CAPTURE] No se pudo lanzar el bucle de captura: {}", e);
            self.stop();
            return Err(ScannerError::Dom(e.to_string()));
        }
        Ok(())
    }

    /// Captura bajo demanda. Emite FrameCaptured salvo en modo manual.
    pub async fn capture_frame(&self) -> ScannerResult<S::Frame> {
        let settings = self.session.borrow().as_ref().map(|s| s.settings);
        let settings = settings.ok_or(ScannerError::CaptureUnavailable)?;

        let read = self.surface.borrow().read_frame(settings.encoding);
        let frame = read.await?;
        if !settings.rate.is_manual() {
            self.events.emit(&CaptureEvent::FrameCaptured(frame.clone()));
        }
        Ok(frame)
    }

    /// Detiene las pistas y limpia el canvas. No-op si no hay sesión.
    pub fn stop(&self) {
        let session = self.session.borrow_mut().take();
        let Some(session) = session else {
            return;
        };
        self.surface.borrow_mut().release(session.stream);
        log::info!("⏹️ [CAPTURE] Sesión {} detenida", session.generation);
        self.events.emit(&CaptureEvent::Stopped);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.session
            .borrow()
            .as_ref()
            .map_or(false, |s| s.generation == generation)
    }

    fn gate_allows(&self, generation: u64, now: f64) -> bool {
        match self.session.borrow_mut().as_mut() {
            Some(session) if session.generation == generation => session.gate.should_capture(now),
            _ => false,
        }
    }

    /// Espera (acotada) a que el video reporte dimensiones. `None` si la sesión terminó.
    async fn wait_for_dimensions(&self, generation: u64) -> Option<(u32, u32)> {
        let mut remaining = DIMENSION_PROBE_FRAMES;
        loop {
            remaining = remaining.saturating_sub(1);
            self.scheduler.next_frame().await;
            if !self.is_current(generation) {
                return None;
            }
            let (width, height) = self.surface.borrow().video_size();
            if remaining == 0 || (width > 0 && height > 0) {
                return Some((width, height));
            }
        }
    }

    async fn run(self, generation: u64) {
        let playing = self.surface.borrow_mut().playing();
        playing.await;
        if !self.is_current(generation) {
            return;
        }

        let Some((width, height)) = self.wait_for_dimensions(generation).await else {
            return;
        };
        if width == 0 || height == 0 {
            log::error!("❌ [CAPTURE] {}", ScannerError::ZeroVideoDimensions);
            self.events.emit(&CaptureEvent::Failed(ScannerError::ZeroVideoDimensions));
            self.stop();
            return;
        }

        let settings = match self.session.borrow().as_ref() {
            Some(session) => session.settings,
            None => return,
        };
        let scale = settings.scale;
        self.surface
            .borrow_mut()
            .configure(scale.apply(width), scale.apply(height), settings.flipped);
        log::debug!(
            "📐 [CAPTURE] Video {}x{} → canvas {}x{}",
            width,
            height,
            scale.apply(width),
            scale.apply(height)
        );

        let mut now = self.scheduler.next_frame().await;
        let mut started = false;
        while self.is_current(generation) {
            self.surface.borrow_mut().draw(scale.value());

            if self.gate_allows(generation, now) {
                let sampler = self.clone();
                let spawned = self.spawner.spawn_local(async move {
                    if let Err(e) = sampler.capture_frame().await {
                        log::warn!("⚠️ [CAPTURE] Captura fallida: {}", e);
                    }
                });
                if let Err(e) = spawned {
                    log::warn!("⚠️ [CAPTURE] No se pudo lanzar la captura: {}", e);
                }
            }

            if !started {
                started = true;
                self.events.emit(&CaptureEvent::Started);
            }
            now = self.scheduler.next_frame().await;
        }
    }
}
