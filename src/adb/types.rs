// Core device bridge types and traits
use super::error::AdbResult;
use image::RgbImage;
use std::future::Future;

#[derive(Debug, PartialEq, Clone)]
pub struct Device {
    pub serial: String,
}

// Capabilities the automation needs from a connected device.
// Futures are `Send` so supervisors holding a controller can be spawned on the runtime.
pub trait DeviceController: Send + Sync + 'static {
    fn serial(&self) -> &str;

    /// Capture the current screen and decode it into an RGB frame.
    fn capture_frame(&self) -> impl Future<Output = AdbResult<RgbImage>> + Send;

    fn tap(&self, x: u32, y: u32) -> impl Future<Output = AdbResult<()>> + Send;
}
