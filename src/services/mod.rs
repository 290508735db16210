// ============================================================================
// SERVICES - Captura, detección y cámara
// ============================================================================

pub mod scheduler;
pub mod stream_capture;
pub mod video_surface;
pub mod barcode_detector;
pub mod web_detector;
pub mod camera;

pub use scheduler::*;
pub use stream_capture::*;
pub use video_surface::*;
pub use barcode_detector::*;
pub use web_detector::*;
