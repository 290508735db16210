// Utils compartidos

pub mod constants;
pub mod animation;
pub mod barcode_ffi;

pub use constants::*;
