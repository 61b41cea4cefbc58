// Upgrade tracker: walks the upgrade windows, reads panels and keeps the latest values
use super::catalog::{Upgrade, UpgradeOption, UpgradeWindow};
use crate::adb::DeviceController;
use crate::game_automation::context::AutomationContext;
use crate::game_automation::error::{AutomationError, AutomationResult};
use crate::game_automation::match_image::PanelText;
use image::imageops;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// What happened to one panel reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOutcome {
    Stored(Upgrade),
    Maxed(Upgrade),
    /// Name did not match any catalog entry
    Unmapped,
    /// Amount or cost did not parse; the previous value is kept
    ParseFailed(Upgrade),
}

#[derive(Debug, Default)]
pub struct UpgradeTracker {
    catalog: Mutex<BTreeMap<Upgrade, UpgradeOption>>,
}

/// Keep digits and periods only: "$1,200" -> "1200", "150.5%" -> "150.5".
fn parse_number(line: &str) -> Option<f64> {
    let digits: String = line.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse().ok()
}

impl UpgradeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Upgrade, UpgradeOption>> {
        self.catalog.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, upgrade: Upgrade) -> Option<UpgradeOption> {
        self.lock().get(&upgrade).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<Upgrade, UpgradeOption> {
        self.lock().clone()
    }

    /// Fold one `(name, value)` pair into the catalog.
    ///
    /// The value column normally reads level, amount and cost on three lines;
    /// any other line count means the upgrade is maxed out.
    pub fn apply_reading(&self, reading: &PanelText) -> ReadingOutcome {
        let Some(upgrade) = Upgrade::from_panel_name(&reading.name) else {
            log::warn!("⚠️ Unknown upgrade: {:?}", reading.name);
            return ReadingOutcome::Unmapped;
        };

        let lines: Vec<&str> = reading.value.lines().collect();
        if lines.len() != 3 {
            self.lock().insert(upgrade, UpgradeOption::MAXED);
            return ReadingOutcome::Maxed(upgrade);
        }

        match (parse_number(lines[1]), parse_number(lines[2])) {
            (Some(amount), Some(cost)) => {
                self.lock().insert(upgrade, UpgradeOption::new(amount, cost));
                ReadingOutcome::Stored(upgrade)
            }
            _ => {
                log::warn!(
                    "⚠️ Could not parse {upgrade} values {:?}, keeping previous reading",
                    reading.value
                );
                ReadingOutcome::ParseFailed(upgrade)
            }
        }
    }

    /// Fixed-width table of every known upgrade, or `None` before the first reading.
    pub fn render_table(&self) -> Option<String> {
        let catalog = self.snapshot();
        if catalog.is_empty() {
            return None;
        }

        let rows: Vec<(&str, String, String)> = catalog
            .iter()
            .map(|(upgrade, option)| {
                if option.is_max {
                    (upgrade.name(), "MAX".to_string(), "-".to_string())
                } else {
                    (upgrade.name(), option.amount.to_string(), option.cost.to_string())
                }
            })
            .collect();

        let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(7);
        let amount_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(6);
        let cost_width = rows.iter().map(|r| r.2.len()).max().unwrap_or(0).max(4);

        let header = format!(
            "| {:<name_width$} | {:<amount_width$} | {:<cost_width$} |",
            "Upgrade", "Amount", "Cost"
        );
        let rule = "-".repeat(header.len());

        let mut table = String::new();
        let _ = writeln!(table, "{rule}");
        let _ = writeln!(table, "{header}");
        let _ = writeln!(table, "{rule}");
        for (name, amount, cost) in &rows {
            let _ = writeln!(
                table,
                "| {name:<name_width$} | {amount:<amount_width$} | {cost:<cost_width$} |"
            );
        }
        let _ = writeln!(table, "{rule}");
        Some(table)
    }

    /// Which upgrade window the next frame shows.
    pub async fn detect_window<D: DeviceController>(
        &self,
        ctx: &AutomationContext<D>,
        token: &CancellationToken,
    ) -> AutomationResult<UpgradeWindow> {
        let frame = ctx.next_frame(token).await?;
        for window in UpgradeWindow::TRACKED {
            if let Some(indicator) = window.indicator()
                && ctx.locate(&frame, indicator, token).await?.is_some()
            {
                return Ok(window);
            }
        }
        Ok(UpgradeWindow::None)
    }

    /// Tap the button that opens `window`, if it is visible in the next frame.
    pub async fn change_window<D: DeviceController>(
        &self,
        ctx: &AutomationContext<D>,
        window: UpgradeWindow,
        token: &CancellationToken,
    ) -> AutomationResult<()> {
        let Some(toggle) = window.toggle() else {
            return Ok(());
        };
        let frame = ctx.next_frame(token).await?;
        ctx.find_and_tap(&frame, toggle, token, None).await?;
        Ok(())
    }

    /// Switch to `window` and read every panel inside the upgrade zone.
    /// Returns the number of readings stored.
    pub async fn refresh_window<D: DeviceController>(
        &self,
        ctx: &AutomationContext<D>,
        window: UpgradeWindow,
        token: &CancellationToken,
    ) -> AutomationResult<usize> {
        // No iteration cap: the loop ends once the screen shows the window or on cancel
        while self.detect_window(ctx, token).await? != window {
            self.change_window(ctx, window, token).await?;
        }

        let frame = ctx.next_frame(token).await?;
        let zone = ctx.config.upgrade_zone;
        let region = imageops::crop_imm(&*frame, zone.x, zone.y, zone.width, zone.height).to_image();
        if region.width() == 0 || region.height() == 0 {
            log::warn!("⚠️ Upgrade zone {zone:?} lies outside the {}x{} frame", frame.width(), frame.height());
            return Ok(0);
        }

        let readings = ctx
            .run_blocking(token, move |vision| vision.detect_upgrades(&region))
            .await??;
        log::debug!("📋 {window} window: {} panels", readings.len());

        let stored = readings
            .iter()
            .map(|reading| self.apply_reading(reading))
            .filter(|outcome| matches!(outcome, ReadingOutcome::Stored(_) | ReadingOutcome::Maxed(_)))
            .count();
        Ok(stored)
    }

    /// Refresh every window, log the table, then wait and repeat until cancelled.
    pub async fn run<D: DeviceController>(
        &self,
        ctx: &AutomationContext<D>,
        token: &CancellationToken,
    ) -> AutomationResult<()> {
        loop {
            for window in UpgradeWindow::TRACKED {
                self.refresh_window(ctx, window, token).await?;
            }
            match self.render_table() {
                Some(table) => log::info!("📊 [{}] Upgrades\n{table}", ctx.device.serial()),
                None => log::info!("📊 [{}] No upgrades read yet", ctx.device.serial()),
            }

            tokio::select! {
                _ = token.cancelled() => return Err(AutomationError::Cancelled),
                _ = sleep(ctx.config.upgrade_refresh) => {}
            }
        }
    }
}
