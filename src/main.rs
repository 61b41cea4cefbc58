use std::process::ExitCode;
use std::sync::Arc;
use tower_farmer::adb::{AdbShell, DeviceController};
use tower_farmer::args::Args;
use tower_farmer::game_automation::match_image::{MatchConfig, TemplateLibrary, TesseractCli};
use tower_farmer::game_automation::{AutomationError, GameAutomation, GameStateDetector, Vision};
use tokio_util::sync::CancellationToken;

fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("❌ Failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), AutomationError> {
    let config = args.config();

    // A missing asset is a configuration error, not something to retry
    let templates = TemplateLibrary::new(&config.templates_dir);
    if let Some(path) = templates.missing().into_iter().next() {
        return Err(AutomationError::MissingTemplate { path });
    }

    let device = Arc::new(AdbShell::connect(args.device.as_deref(), config.device_retries, config.retry_delay).await?);
    log::info!("🤖 Using device {}", device.serial());

    let ocr = TesseractCli::new();
    if config.track_upgrades && !ocr.is_available() {
        log::warn!("⚠️ tesseract not found in PATH, upgrade panels will not be read");
    }

    let vision = Arc::new(
        Vision::new(templates, Arc::new(ocr)).with_match_config(MatchConfig {
            confidence_threshold: config.threshold,
            ..MatchConfig::default()
        }),
    );
    let detector = Arc::new(GameStateDetector::new(Arc::clone(&vision)));
    let mut automation = GameAutomation::new(device, vision, detector, config);

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("🛑 Ctrl-C received, shutting down"),
            Err(e) => log::error!("❌ Failed to listen for Ctrl-C: {e}"),
        }
        on_signal.cancel();
    });

    automation.run(shutdown).await;
    Ok(())
}
