use serde::{Deserialize, Serialize};
use crate::error::ScannerError;

// ============================================================================
// VALORES VALIDADOS
// ============================================================================

/// Escala de captura respecto al tamaño del video (siempre >= 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureScale(f64);

impl CaptureScale {
    /// Valores negativos se recortan a 0; NaN o infinito son error
    pub fn new(value: f64) -> Result<Self, ScannerError> {
        if !value.is_finite() {
            return Err(ScannerError::InvalidConfig {
                key: "CAPTURE_SCALE",
                value: value.to_string(),
            });
        }
        Ok(Self(value.max(0.0)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Tamaño escalado, truncado como hace el canvas con valores fraccionarios
    pub fn apply(&self, size: u32) -> u32 {
        (size as f64 * self.0) as u32
    }
}

impl Default for CaptureScale {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Intervalo de captura en milisegundos. 0 = solo captura manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureRate(u32);

impl CaptureRate {
    pub const MANUAL: CaptureRate = CaptureRate(0);

    pub fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub fn millis(&self) -> u32 {
        self.0
    }

    pub fn is_manual(&self) -> bool {
        self.0 == 0
    }
}

/// Formato del frame capturado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameEncoding {
    /// Buffer RGBA crudo (ImageData)
    #[default]
    Pixels,
    /// Imagen PNG codificada
    Png,
}

/// Modo de navegación del carrusel de onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CarouselMode {
    #[default]
    Scroll,
    Fade,
}

impl CarouselMode {
    /// Cualquier valor distinto de "fade" es scroll
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("fade") {
            CarouselMode::Fade
        } else {
            CarouselMode::Scroll
        }
    }
}

/// Dimensión en píxeles (NaN o negativa → 0)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension(f64);

impl Dimension {
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    pub fn parse(value: &str) -> Self {
        Self::new(value.trim().parse().unwrap_or(0.0))
    }

    pub fn px(&self) -> String {
        format!("{}px", self.0)
    }

    pub fn is_set(&self) -> bool {
        self.0 > 0.0
    }
}

// ============================================================================
// CONFIGURACIÓN DE LA APP
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub enable_logging: bool,
    pub log_level: String,
    pub capture: CaptureConfig,
    pub onboarding: OnboardingConfig,
    pub results: ResultsConfig,
    pub polyfill_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub rate: CaptureRate,
    pub scale: CaptureScale,
    pub encoding: FrameEncoding,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            rate: CaptureRate::from_millis(600),
            scale: CaptureScale(0.8),
            encoding: FrameEncoding::Pixels,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub mode: CarouselMode,
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    pub card_fade_ms: u32,
    pub vibrate_ms: u32,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            card_fade_ms: 200,
            vibrate_ms: 200,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            log_level: "info".to_string(),
            capture: CaptureConfig::default(),
            onboarding: OnboardingConfig::default(),
            results: ResultsConfig::default(),
            polyfill_prefix: String::new(),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match key {
            "ENABLE_LOGGING" => option_env!("ENABLE_LOGGING"),
            "LOG_LEVEL" => option_env!("LOG_LEVEL"),
            "CAPTURE_RATE_MS" => option_env!("CAPTURE_RATE_MS"),
            "CAPTURE_SCALE" => option_env!("CAPTURE_SCALE"),
            "CAPTURE_PNG" => option_env!("CAPTURE_PNG"),
            "CAROUSEL_MODE" => option_env!("CAROUSEL_MODE"),
            "CAROUSEL_WIDTH" => option_env!("CAROUSEL_WIDTH"),
            "CAROUSEL_HEIGHT" => option_env!("CAROUSEL_HEIGHT"),
            "CARD_FADE_MS" => option_env!("CARD_FADE_MS"),
            "VIBRATE_MS" => option_env!("VIBRATE_MS"),
            "POLYFILL_PREFIX" => option_env!("POLYFILL_PREFIX"),
            _ => None,
        })
    }

    /// Construye la config a partir de una función de búsqueda (valores inválidos → default)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'static str>,
    {
        let defaults = Self::default();
        Self {
            enable_logging: lookup("ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            log_level: lookup("LOG_LEVEL")
                .map(|v| v.to_string())
                .unwrap_or(defaults.log_level),
            capture: CaptureConfig {
                rate: lookup("CAPTURE_RATE_MS")
                    .and_then(|v| v.parse().ok())
                    .map(CaptureRate::from_millis)
                    .unwrap_or(defaults.capture.rate),
                scale: lookup("CAPTURE_SCALE")
                    .and_then(|v| v.parse().ok())
                    .and_then(|v| CaptureScale::new(v).ok())
                    .unwrap_or(defaults.capture.scale),
                encoding: match lookup("CAPTURE_PNG").and_then(|v| v.parse().ok()) {
                    Some(true) => FrameEncoding::Png,
                    _ => defaults.capture.encoding,
                },
            },
            onboarding: OnboardingConfig {
                mode: lookup("CAROUSEL_MODE")
                    .map(CarouselMode::parse)
                    .unwrap_or(defaults.onboarding.mode),
                width: lookup("CAROUSEL_WIDTH")
                    .map(Dimension::parse)
                    .unwrap_or(defaults.onboarding.width),
                height: lookup("CAROUSEL_HEIGHT")
                    .map(Dimension::parse)
                    .unwrap_or(defaults.onboarding.height),
            },
            results: ResultsConfig {
                card_fade_ms: lookup("CARD_FADE_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.results.card_fade_ms),
                vibrate_ms: lookup("VIBRATE_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.results.vibrate_ms),
            },
            polyfill_prefix: lookup("POLYFILL_PREFIX")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.polyfill_prefix),
        }
    }

    /// Nivel de log efectivo
    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" | "warning" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }

    /// Verifica si el modo de logging está habilitado
    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    /// URL del polyfill de BarcodeDetector
    pub fn barcode_polyfill_url(&self) -> String {
        format!("{}/lib/polyfills/barcode-detector.js", self.polyfill_prefix)
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_scale_clamps_negative() {
        assert_eq!(CaptureScale::new(-2.0).unwrap().value(), 0.0);
        assert_eq!(CaptureScale::new(0.8).unwrap().value(), 0.8);
        assert!(CaptureScale::new(f64::NAN).is_err());
        assert!(CaptureScale::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_capture_scale_apply_truncates() {
        let scale = CaptureScale::new(0.8).unwrap();
        assert_eq!(scale.apply(640), 512);
        assert_eq!(scale.apply(3), 2);
    }

    #[test]
    fn test_carousel_mode_parse() {
        assert_eq!(CarouselMode::parse("fade"), CarouselMode::Fade);
        assert_eq!(CarouselMode::parse(" FADE "), CarouselMode::Fade);
        assert_eq!(CarouselMode::parse("scroll"), CarouselMode::Scroll);
        assert_eq!(CarouselMode::parse("zoom"), CarouselMode::Scroll);
    }

    #[test]
    fn test_dimension_coercion() {
        assert!(!Dimension::parse("abc").is_set());
        assert!(!Dimension::new(-10.0).is_set());
        assert_eq!(Dimension::parse("320").px(), "320px");
    }

    #[test]
    fn test_from_lookup_defaults_and_overrides() {
        let config = AppConfig::from_lookup(|key| match key {
            "CAPTURE_RATE_MS" => Some("0"),
            "CAPTURE_SCALE" => Some("nope"),
            "CAPTURE_PNG" => Some("true"),
            "CAROUSEL_MODE" => Some("fade"),
            "POLYFILL_PREFIX" => Some("/static/"),
            _ => None,
        });
        assert!(config.capture.rate.is_manual());
        assert_eq!(config.capture.scale.value(), 0.8);
        assert_eq!(config.capture.encoding, FrameEncoding::Png);
        assert_eq!(config.onboarding.mode, CarouselMode::Fade);
        assert_eq!(config.results.card_fade_ms, 200);
        assert_eq!(
            config.barcode_polyfill_url(),
            "/static/lib/polyfills/barcode-detector.js"
        );
    }

    #[test]
    fn test_log_level() {
        let mut config = AppConfig::default();
        assert_eq!(config.log_level(), log::Level::Info);
        config.log_level = "WARN".into();
        assert_eq!(config.log_level(), log::Level::Warn);
    }
}
