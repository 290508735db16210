use serde::{Deserialize, Serialize};

pub const VIDEO_INPUT_KIND: &str = "videoinput";
pub const ENVIRONMENT_FACING: &str = "environment";

/// Dispositivo de medios (subset de MediaDeviceInfo + getCapabilities)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraDevice {
    pub kind: String,
    pub label: String,
    /// `None` si el navegador no soporta getCapabilities()
    pub facing_modes: Option<Vec<String>>,
}

impl CameraDevice {
    pub fn is_video_input(&self) -> bool {
        self.kind == VIDEO_INPUT_KIND
    }

    pub fn faces_environment(&self) -> bool {
        self.facing_modes
            .as_ref()
            .map_or(false, |modes| modes.iter().any(|m| m == ENVIRONMENT_FACING))
    }
}

/// ¿Hay alguna cámara trasera? Si no, la captura se espeja.
pub fn has_environment_camera(devices: &[CameraDevice]) -> bool {
    devices
        .iter()
        .filter(|d| d.is_video_input())
        .any(CameraDevice::faces_environment)
}
