// ============================================================================
// CAMERA SERVICE - getUserMedia, enumerateDevices y vibración
// ============================================================================

use js_sys::{Array, Function, Reflect};
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaStream, MediaStreamConstraints};
use crate::dom::window;
use crate::error::{describe_js, ScannerError, ScannerResult};
use crate::models::{CameraDevice, ENVIRONMENT_FACING, VIDEO_INPUT_KIND};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoConstraints<'a> {
    facing_mode: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Capabilities {
    #[serde(default)]
    facing_mode: Option<Vec<String>>,
}

fn media_devices() -> ScannerResult<MediaDevices> {
    window()
        .ok_or_else(|| ScannerError::Camera("No window".into()))?
        .navigator()
        .media_devices()
        .map_err(|e| ScannerError::Camera(describe_js(&e)))
}

/// Pide la cámara trasera (sin audio)
pub async fn acquire_stream() -> ScannerResult<MediaStream> {
    let video = serde_wasm_bindgen::to_value(&VideoConstraints {
        facing_mode: ENVIRONMENT_FACING,
    })
    .map_err(|e| ScannerError::Camera(e.to_string()))?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::FALSE);
    constraints.set_video(&video);

    let promise = media_devices()?
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| ScannerError::Camera(describe_js(&e)))?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|e| ScannerError::Camera(describe_js(&e)))?;

    log::info!("📷 [CAMERA] Stream de cámara obtenido");
    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| ScannerError::Camera("getUserMedia did not return a MediaStream".into()))
}

/// Lista de dispositivos con sus facing modes (si el navegador los expone)
pub async fn enumerate_cameras() -> ScannerResult<Vec<CameraDevice>> {
    let promise = media_devices()?
        .enumerate_devices()
        .map_err(|e| ScannerError::Camera(describe_js(&e)))?;
    let devices = JsFuture::from(promise)
        .await
        .map_err(|e| ScannerError::Camera(describe_js(&e)))?;

    let devices: Vec<CameraDevice> = Array::from(&devices)
        .iter()
        .filter_map(|value| value.dyn_into::<MediaDeviceInfo>().ok())
        .map(|info| CameraDevice {
            kind: kind_name(info.kind()).to_string(),
            label: info.label(),
            facing_modes: facing_modes(&info),
        })
        .collect();

    log::debug!("📷 [CAMERA] {} dispositivos encontrados", devices.len());
    Ok(devices)
}

fn kind_name(kind: MediaDeviceKind) -> &'static str {
    match kind {
        MediaDeviceKind::Videoinput => VIDEO_INPUT_KIND,
        MediaDeviceKind::Audioinput => "audioinput",
        MediaDeviceKind::Audiooutput => "audiooutput",
        _ => "unknown",
    }
}

// getCapabilities() solo existe en InputDeviceInfo y no en todos los navegadores
fn facing_modes(info: &MediaDeviceInfo) -> Option<Vec<String>> {
    let get_capabilities = Reflect::get(info, &JsValue::from_str("getCapabilities"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    let capabilities = get_capabilities.call0(info).ok()?;
    serde_wasm_bindgen::from_value::<Capabilities>(capabilities)
        .ok()?
        .facing_mode
}

/// Vibra si la plataforma lo soporta
pub fn vibrate(duration_ms: u32) -> bool {
    let Some(window) = window() else {
        return false;
    };
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("vibrate")).unwrap_or(false) {
        return false;
    }
    navigator.vibrate_with_duration(duration_ms)
}
