use super::error::{AdbError, AdbResult};
use super::types::{Device, DeviceController};
use image::RgbImage;
use std::time::Duration;
use tokio::process::Command;

/// Device bridge driving the external `adb` binary.
pub struct AdbShell {
    pub device: Device,
}

impl AdbShell {
    pub fn new(serial: &str) -> Self {
        Self {
            device: Device {
                serial: serial.to_string(),
            },
        }
    }

    async fn run(args: &[&str]) -> AdbResult<Vec<u8>> {
        let command = format!("adb {}", args.join(" "));
        let output = Command::new("adb")
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AdbError::from_spawn(&command, e))?;
        if !output.status.success() {
            return Err(AdbError::NonZeroExit {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Parse `adb devices` output; only attached devices in the `device` state are kept.
    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .filter(|line| !line.starts_with("List of devices"))
            .filter_map(|line| {
                let mut parts = line.split('\t');
                let serial = parts.next()?.trim();
                let state = parts.next()?.trim();
                (state == "device" && !serial.is_empty()).then(|| Device {
                    serial: serial.to_string(),
                })
            })
            .collect()
    }

    pub async fn list_devices() -> AdbResult<Vec<Device>> {
        let stdout = Self::run(&["devices"]).await?;
        Ok(Self::parse_devices(&String::from_utf8_lossy(&stdout)))
    }

    /// Restart the adb server; used when no devices show up to recover a stuck transport.
    pub async fn reset_connection() -> AdbResult<()> {
        Self::run(&["kill-server"]).await.map(|_| ())
    }

    /// Connect to `serial` if given, otherwise to the first attached device.
    ///
    /// An empty device list triggers a server reset and another attempt after `delay`,
    /// up to `attempts` times in total.
    pub async fn connect(serial: Option<&str>, attempts: u32, delay: Duration) -> AdbResult<Self> {
        if let Some(serial) = serial {
            return Ok(Self::new(serial));
        }

        let attempts = attempts.max(1);
        for attempt in 1..=attempts {
            match Self::list_devices().await {
                Ok(devices) if !devices.is_empty() => {
                    log::info!("📱 Found device: {}", devices[0].serial);
                    return Ok(Self::new(&devices[0].serial));
                }
                Ok(_) => {
                    log::warn!("🔌 No device connected ({attempt}/{attempts}), resetting adb server");
                    if let Err(e) = Self::reset_connection().await {
                        log::warn!("adb kill-server failed: {e}");
                    }
                }
                Err(AdbError::AdbNotFound) => return Err(AdbError::AdbNotFound),
                Err(e) => log::warn!("❌ Listing devices failed ({attempt}/{attempts}): {e}"),
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }
        Err(AdbError::NoDevices { attempts })
    }

    pub async fn capture_png(&self) -> AdbResult<Vec<u8>> {
        Self::run(&["-s", &self.device.serial, "exec-out", "screencap", "-p"]).await
    }
}

impl DeviceController for AdbShell {
    fn serial(&self) -> &str {
        &self.device.serial
    }

    async fn capture_frame(&self) -> AdbResult<RgbImage> {
        let bytes = self.capture_png().await?;
        let image = image::load_from_memory(&bytes).map_err(|source| AdbError::FrameDecodeFailed {
            bytes: bytes.len(),
            source,
        })?;
        Ok(image.to_rgb8())
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        let (x, y) = (x.to_string(), y.to_string());
        Self::run(&["-s", &self.device.serial, "shell", "input", "tap", &x, &y])
            .await
            .map(|_| ())
    }
}
