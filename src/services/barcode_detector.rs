// ============================================================================
// BARCODE DETECTOR - Adaptador sobre la capacidad de detección
// ============================================================================
// Orden de resolución:
// 1. Detector nativo si existe y no se fuerza el fallback
// 2. Si no, se carga el fallback (polyfill) UNA sola vez y se usa ese
// Si el camino primario falla, se reintenta una vez con el fallback.
// Si el fallback también falla, el resultado es vacío (nunca error).
// Solo es Err cuando no hay forma de montar un detector (script, constructor).
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use crate::error::ScannerResult;
use crate::models::DetectedBarcode;

/// Instancia de detector (nativa o polyfill)
pub trait BarcodeEngine {
    type Image: ?Sized;

    /// Señal de disponibilidad opcional (el polyfill carga WASM propio)
    fn ready(&self) -> LocalBoxFuture<'static, ScannerResult<()>>;

    fn detect(&self, image: &Self::Image) -> LocalBoxFuture<'static, ScannerResult<Vec<DetectedBarcode>>>;
}

/// Proveedor de detectores
pub trait DetectorBackend {
    type Image: ?Sized;
    type Engine: BarcodeEngine<Image = Self::Image>;

    /// ¿Existe capacidad nativa?
    fn has_native(&self) -> bool;

    /// Carga el fallback (p.ej. inyectar el script del polyfill)
    fn load_fallback(&self) -> LocalBoxFuture<'static, ScannerResult<()>>;

    fn create(&self, path: DetectorPath) -> ScannerResult<Self::Engine>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorPath {
    Native,
    Fallback,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DetectOptions {
    /// Descartar el detector cacheado y crear uno nuevo
    pub force_new_detector: bool,
    /// Ignorar el detector nativo
    pub force_fallback: bool,
}

type SharedLoad = Shared<LocalBoxFuture<'static, ScannerResult<()>>>;

enum FallbackState {
    NotLoaded,
    Loading(SharedLoad),
    Loaded,
}

pub struct BarcodeDetectorAdapter<B: DetectorBackend> {
    backend: B,
    // Un detector por camino: el fallback sobrevive a los fallos del nativo
    cached: RefCell<HashMap<DetectorPath, Rc<B::Engine>>>,
    fallback: RefCell<FallbackState>,
}

impl<B: DetectorBackend> BarcodeDetectorAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cached: RefCell::new(HashMap::new()),
            fallback: RefCell::new(FallbackState::NotLoaded),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_fallback_loaded(&self) -> bool {
        matches!(*self.fallback.borrow(), FallbackState::Loaded)
    }

    /// Olvida los detectores cacheados (el fallback cargado se mantiene)
    pub fn reset(&self) {
        self.cached.borrow_mut().clear();
    }

    pub async fn detect(&self, image: &B::Image) -> ScannerResult<Vec<DetectedBarcode>> {
        self.detect_with(image, DetectOptions::default()).await
    }

    pub async fn detect_with(
        &self,
        image: &B::Image,
        options: DetectOptions,
    ) -> ScannerResult<Vec<DetectedBarcode>> {
        let primary = if options.force_fallback || !self.backend.has_native() {
            DetectorPath::Fallback
        } else {
            DetectorPath::Native
        };

        let error = match self.run_path(primary, image, options.force_new_detector).await? {
            Ok(found) => return Ok(found),
            Err(e) => e,
        };

        // El fallback ya cargado tampoco sirve: nos rendimos
        if primary == DetectorPath::Fallback {
            log::warn!("⚠️ [DETECTOR] Detección fallida con el fallback: {}", error);
            return Ok(Vec::new());
        }

        log::warn!("⚠️ [DETECTOR] {} - reintentando con el fallback", error);
        match self.run_path(DetectorPath::Fallback, image, options.force_new_detector).await? {
            Ok(found) => Ok(found),
            Err(e) => {
                log::warn!("⚠️ [DETECTOR] Detección fallida con el fallback: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Err externo = sin capacidad de detección; Err interno = la detección falló
    async fn run_path(
        &self,
        path: DetectorPath,
        image: &B::Image,
        force_new: bool,
    ) -> ScannerResult<ScannerResult<Vec<DetectedBarcode>>> {
        if path == DetectorPath::Fallback {
            self.ensure_fallback().await?;
        }
        let engine = self.engine(path, force_new)?;
        if let Err(e) = engine.ready().await {
            return Ok(Err(e));
        }
        Ok(engine.detect(image).await)
    }

    fn engine(&self, path: DetectorPath, force_new: bool) -> ScannerResult<Rc<B::Engine>> {
        let mut cached = self.cached.borrow_mut();
        if !force_new {
            if let Some(engine) = cached.get(&path) {
                return Ok(engine.clone());
            }
        }
        let engine = Rc::new(self.backend.create(path)?);
        log::debug!("🔍 [DETECTOR] Nuevo detector ({:?})", path);
        cached.insert(path, engine.clone());
        Ok(engine)
    }

    /// Carga el fallback una sola vez; las llamadas concurrentes comparten la carga
    async fn ensure_fallback(&self) -> ScannerResult<()> {
        let load = {
            let mut state = self.fallback.borrow_mut();
            match &*state {
                FallbackState::Loaded => return Ok(()),
                FallbackState::Loading(load) => load.clone(),
                FallbackState::NotLoaded => {
                    log::info!("📦 [DETECTOR] Usando el polyfill de detección de códigos");
                    let load = self.backend.load_fallback().shared();
                    *state = FallbackState::Loading(load.clone());
                    load
                }
            }
        };

        let result = load.await;
        let mut state = self.fallback.borrow_mut();
        if let FallbackState::Loading(_) = &*state {
            *state = match result {
                Ok(()) => FallbackState::Loaded,
                // Permite reintentar la carga más adelante
                Err(_) => FallbackState::NotLoaded,
            };
        }
        result
    }
}
