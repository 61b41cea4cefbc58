// Controller configuration
use std::path::PathBuf;
use std::time::Duration;

/// Rectangle of the screen holding the upgrade panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Delay between two captures of the main loop
    pub poll_interval: Duration,
    pub templates_dir: PathBuf,
    pub threshold: f32,
    /// Expected distance between the tower and the orbiting gem, in pixels
    pub orbit_radius: u32,
    pub upgrade_zone: Zone,
    pub device_retries: u32,
    pub retry_delay: Duration,
    /// Run the upgrade tracker alongside the in-battle gem collectors
    pub track_upgrades: bool,
    pub upgrade_refresh: Duration,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            templates_dir: PathBuf::from("templates"),
            threshold: 0.8,
            orbit_radius: 270,
            upgrade_zone: Zone {
                x: 0,
                y: 1045,
                width: 900,
                height: 465,
            },
            device_retries: 5,
            retry_delay: Duration::from_secs(5),
            track_upgrades: false,
            upgrade_refresh: Duration::from_secs(60),
        }
    }
}
