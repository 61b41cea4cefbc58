use crate::game_automation::AutomationConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub struct Args {
    /// Serial to use instead of the first connected device
    pub device: Option<String>,
    pub templates_dir: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub threshold: Option<f32>,
    pub track_upgrades: bool,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    /// Parse flags (program name already stripped). `None` means exit: help,
    /// version, or an invalid argument that has been reported.
    pub fn parse_from(args: &[String]) -> Option<Self> {
        let mut parsed = Args {
            device: None,
            templates_dir: None,
            interval_ms: None,
            threshold: None,
            track_upgrades: false,
            debug_mode: false,
        };

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Tower Farmer v{}", env!("CARGO_PKG_VERSION"));
                return None;
            } else if arg == "--debug" {
                parsed.debug_mode = true;
            } else if arg == "--upgrades" {
                parsed.track_upgrades = true;
            } else if let Some(val) = arg.strip_prefix("--device=") {
                if val.is_empty() {
                    eprintln!("❌ Empty device serial");
                    return None;
                }
                parsed.device = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--templates=") {
                parsed.templates_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--interval=") {
                match val.parse::<u64>() {
                    Ok(ms) if ms > 0 => parsed.interval_ms = Some(ms),
                    _ => {
                        eprintln!("❌ Invalid interval value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) if (0.0..=1.0).contains(&t) => parsed.threshold = Some(t),
                    _ => {
                        eprintln!("❌ Invalid threshold value: {} (expected 0.0 to 1.0)", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(parsed)
    }

    /// Apply the flags on top of the default configuration.
    pub fn config(&self) -> AutomationConfig {
        let mut config = AutomationConfig::default();
        if let Some(dir) = &self.templates_dir {
            config.templates_dir = dir.clone();
        }
        if let Some(ms) = self.interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        config.track_upgrades = self.track_upgrades;
        config
    }
}

fn print_help() {
    println!("🤖 Tower Farmer - automation for The Tower over ADB");
    println!();
    println!("USAGE:");
    println!("    tower-farmer [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --device=<serial>   Use this device instead of the first one found");
    println!("    --templates=<dir>   Template image directory (default: templates)");
    println!("    --interval=<ms>     Delay between screen captures (default: 200)");
    println!("    --threshold=<f>     Template match threshold (default: 0.8)");
    println!("    --upgrades          Read upgrade panels during battles");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    tower-farmer");
    println!("    tower-farmer --device=emulator-5554 --upgrades");
    println!("    RUST_LOG=tower_farmer=debug tower-farmer --interval=500");
}
