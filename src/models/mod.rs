pub mod barcode;
pub mod camera;

pub use barcode::{BoundingBox, DetectedBarcode, Point};
pub use camera::{has_environment_camera, CameraDevice, ENVIRONMENT_FACING, VIDEO_INPUT_KIND};
