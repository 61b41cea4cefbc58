use super::*;
use crate::game_automation::broadcast::Broadcast;
use crate::game_automation::config::{AutomationConfig, Zone};
use crate::game_automation::context::AutomationContext;
use crate::game_automation::match_image::{PanelConfig, PanelText, Template, Vision};
use crate::game_automation::types::Frame;
use crate::test_support::{MockDevice, ScriptedRecognizer, TEMPLATE_SIZE, TempTemplates, paste, template_image};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn reading(name: &str, value: &str) -> PanelText {
    PanelText {
        name: name.to_string(),
        value: value.to_string(),
    }
}

// ============================================================
// CATALOG
// ============================================================

#[test]
fn test_catalog_size_and_windows() {
    assert_eq!(Upgrade::ALL.len(), 33);
    assert_eq!(Upgrade::Damage.window(), UpgradeWindow::Attack);
    assert_eq!(Upgrade::BounceShotRange.window(), UpgradeWindow::Attack);
    assert_eq!(Upgrade::Health.window(), UpgradeWindow::Defense);
    assert_eq!(Upgrade::ShockwaveFrequency.window(), UpgradeWindow::Defense);
    assert_eq!(Upgrade::CashBonus.window(), UpgradeWindow::Utility);
    assert_eq!(Upgrade::InterestWave.window(), UpgradeWindow::Utility);
    assert!(Upgrade::ALL.iter().all(|u| u.window() != UpgradeWindow::None));
}

#[test]
fn test_from_panel_name() {
    assert_eq!(Upgrade::from_panel_name("Damage"), Some(Upgrade::Damage));
    assert_eq!(Upgrade::from_panel_name("DAMAGE"), Some(Upgrade::Damage));
    assert_eq!(Upgrade::from_panel_name("Attack\nSpeed"), Some(Upgrade::AttackSpeed));
    assert_eq!(Upgrade::from_panel_name("Coins / Kill Bonus"), Some(Upgrade::CoinsKillBonus));
    assert_eq!(Upgrade::from_panel_name("Critical Chance %"), Some(Upgrade::CriticalChance));
    assert_eq!(Upgrade::from_panel_name("Frobnicate"), None);
    assert_eq!(Upgrade::from_panel_name(" \n/%"), None);
}

#[test]
fn test_every_catalog_name_round_trips() {
    for upgrade in Upgrade::ALL {
        assert_eq!(Upgrade::from_panel_name(upgrade.name()), Some(upgrade));
    }
}

#[test]
fn test_window_templates() {
    assert_eq!(UpgradeWindow::Attack.toggle(), Some(Template::AttackOn));
    assert_eq!(UpgradeWindow::Defense.toggle(), Some(Template::DefenseOff));
    assert_eq!(UpgradeWindow::Utility.toggle(), Some(Template::EcoOff));
    assert_eq!(UpgradeWindow::None.toggle(), None);
    assert_eq!(UpgradeWindow::Utility.indicator(), Some(Template::UtilityUpgrade));
    assert_eq!(UpgradeWindow::None.indicator(), None);
}

// ============================================================
// READINGS
// ============================================================

#[test]
fn test_apply_reading_stores_amount_and_cost() {
    let tracker = UpgradeTracker::new();
    let outcome = tracker.apply_reading(&reading("Damage", "Lv 12\n150.5%\n$1,200"));

    assert_eq!(outcome, ReadingOutcome::Stored(Upgrade::Damage));
    assert_eq!(
        tracker.get(Upgrade::Damage),
        Some(UpgradeOption {
            amount: 150.5,
            cost: 1200.0,
            is_max: false
        })
    );
}

#[test]
fn test_apply_reading_maxed_out() {
    let tracker = UpgradeTracker::new();
    let outcome = tracker.apply_reading(&reading("Health", "MAXED OUT"));

    assert_eq!(outcome, ReadingOutcome::Maxed(Upgrade::Health));
    let option = tracker.get(Upgrade::Health).unwrap();
    assert!(option.is_max);
    assert_eq!((option.amount, option.cost), (-1.0, -1.0));
}

#[test]
fn test_apply_reading_two_lines_is_maxed() {
    let tracker = UpgradeTracker::new();
    assert_eq!(
        tracker.apply_reading(&reading("Range", "Lv 40\nMAX")),
        ReadingOutcome::Maxed(Upgrade::Range)
    );
}

#[test]
fn test_apply_reading_unknown_name_skipped() {
    let tracker = UpgradeTracker::new();
    let outcome = tracker.apply_reading(&reading("Frobnicate", "Lv 1\n2\n3"));

    assert_eq!(outcome, ReadingOutcome::Unmapped);
    assert!(tracker.snapshot().is_empty());
}

#[test]
fn test_apply_reading_parse_failure_keeps_previous() {
    let tracker = UpgradeTracker::new();
    tracker.apply_reading(&reading("Orbs", "Lv 2\n3\n$450"));

    let outcome = tracker.apply_reading(&reading("Orbs", "Lv 3\n???\n$9.9.9"));
    assert_eq!(outcome, ReadingOutcome::ParseFailed(Upgrade::Orbs));
    assert_eq!(tracker.get(Upgrade::Orbs), Some(UpgradeOption::new(3.0, 450.0)));
}

#[test]
fn test_apply_reading_parse_failure_without_previous() {
    let tracker = UpgradeTracker::new();
    tracker.apply_reading(&reading("Lifesteal", "Lv 1\n\n$10"));
    assert_eq!(tracker.get(Upgrade::Lifesteal), None);
}

#[test]
fn test_later_reading_replaces_earlier() {
    let tracker = UpgradeTracker::new();
    tracker.apply_reading(&reading("Health", "MAXED OUT"));
    tracker.apply_reading(&reading("Health", "Lv 9\n1,500\n$2.5"));
    assert_eq!(tracker.get(Upgrade::Health), Some(UpgradeOption::new(1500.0, 2.5)));
}

// ============================================================
// TABLE
// ============================================================

#[test]
fn test_render_table_empty() {
    assert_eq!(UpgradeTracker::new().render_table(), None);
}

#[test]
fn test_render_table_minimum_widths() {
    let tracker = UpgradeTracker::new();
    tracker.apply_reading(&reading("Health", "MAXED OUT"));
    tracker.apply_reading(&reading("Damage", "Lv 12\n150.5%\n$1,200"));

    let expected = "\
---------------------------
| Upgrade | Amount | Cost |
---------------------------
| Damage  | 150.5  | 1200 |
| Health  | MAX    | -    |
---------------------------
";
    assert_eq!(tracker.render_table().unwrap(), expected);
}

#[test]
fn test_render_table_grows_with_content() {
    let tracker = UpgradeTracker::new();
    tracker.apply_reading(&reading("Free Utility Upgrade", "Lv 3\n12.75\n$1,234,567"));

    let table = tracker.render_table().unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[1], "| Upgrade            | Amount | Cost    |");
    assert_eq!(lines[3], "| FreeUtilityUpgrade | 12.75  | 1234567 |");
    assert!(lines.iter().all(|l| l.len() == lines[0].len()));
}

// ============================================================
// WINDOW NAVIGATION
// ============================================================

const BACKGROUND: Rgb<u8> = Rgb([25, 25, 25]);
const FRAME_SIZE: (u32, u32) = (300, 200);

fn blank_frame() -> RgbImage {
    RgbImage::from_pixel(FRAME_SIZE.0, FRAME_SIZE.1, BACKGROUND)
}

/// Keep publishing `frame` until the returned token is cancelled.
fn feed_frames(frames: &Broadcast<Frame>, frame: RgbImage) -> CancellationToken {
    let stop = CancellationToken::new();
    let frames = frames.clone();
    let frame: Frame = Arc::new(frame);
    let done = stop.clone();
    tokio::spawn(async move {
        while !done.is_cancelled() {
            if frames.publish(Arc::clone(&frame)).is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });
    stop
}

/// Context over a small frame; panel detection is scaled down to match.
fn context(
    templates: &TempTemplates,
    recognizer: ScriptedRecognizer,
    frame: &RgbImage,
) -> (Arc<MockDevice>, AutomationContext<MockDevice>) {
    let panels = PanelConfig {
        min_area: 6_000.0,
        ..PanelConfig::default()
    };
    let vision = Arc::new(Vision::new(templates.library(), Arc::new(recognizer)).with_panel_config(panels));
    let device = Arc::new(MockDevice::new(frame.clone()));
    let config = AutomationConfig {
        upgrade_zone: Zone {
            x: 0,
            y: 50,
            width: 300,
            height: 150,
        },
        ..AutomationConfig::default()
    };
    (Arc::clone(&device), AutomationContext::new(device, vision, config))
}

/// Attack window header above one upgrade box inside the zone.
fn attack_window_frame() -> RgbImage {
    let mut frame = blank_frame();
    paste(&mut frame, &template_image(Template::AttackUpgrade), 200, 10);
    let outline = Rgb([230, 230, 230]);
    draw_filled_rect_mut(&mut frame, Rect::at(40, 80).of_size(140, 60), outline);
    draw_filled_rect_mut(&mut frame, Rect::at(44, 84).of_size(132, 52), BACKGROUND);
    frame
}

fn cancel_after(token: &CancellationToken, delay: Duration) {
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        cancel.cancel();
    });
}

#[tokio::test]
async fn test_detect_window_none_on_blank_screen() {
    let templates = TempTemplates::all("window_none");
    let frame = blank_frame();
    let (_, ctx) = context(&templates, ScriptedRecognizer::new("", ""), &frame);

    let feeder = feed_frames(&ctx.frames, frame);
    let token = CancellationToken::new();
    let window = tokio::time::timeout(Duration::from_secs(10), ctx.upgrades.detect_window(&ctx, &token))
        .await
        .expect("window detection timed out")
        .unwrap();
    feeder.cancel();

    assert_eq!(window, UpgradeWindow::None);
}

#[tokio::test]
async fn test_change_window_taps_toggle() {
    let templates = TempTemplates::all("window_toggle");
    let mut frame = blank_frame();
    paste(&mut frame, &template_image(Template::DefenseOff), 120, 20);
    let (device, ctx) = context(&templates, ScriptedRecognizer::new("", ""), &frame);

    let feeder = feed_frames(&ctx.frames, frame);
    let token = CancellationToken::new();
    tokio::time::timeout(
        Duration::from_secs(10),
        ctx.upgrades.change_window(&ctx, UpgradeWindow::Defense, &token),
    )
    .await
    .expect("window change timed out")
    .unwrap();
    feeder.cancel();

    assert_eq!(
        device.taps(),
        vec![(120 + TEMPLATE_SIZE.0 / 2, 20 + TEMPLATE_SIZE.1 / 2)]
    );
}

#[tokio::test]
async fn test_refresh_window_reads_panels_in_zone() {
    let templates = TempTemplates::all("window_refresh");
    let frame = attack_window_frame();
    let recognizer = ScriptedRecognizer::new("Damage", "Lv 12\n150.5%\n$1,200");
    let (device, ctx) = context(&templates, recognizer, &frame);

    let feeder = feed_frames(&ctx.frames, frame);
    let token = CancellationToken::new();
    let stored = tokio::time::timeout(
        Duration::from_secs(10),
        ctx.upgrades.refresh_window(&ctx, UpgradeWindow::Attack, &token),
    )
    .await
    .expect("refresh timed out")
    .unwrap();
    feeder.cancel();

    assert_eq!(stored, 1);
    assert_eq!(ctx.upgrades.get(Upgrade::Damage), Some(UpgradeOption::new(150.5, 1200.0)));
    // Already on the attack window, nothing to toggle
    assert!(device.taps().is_empty());
}

#[tokio::test]
async fn test_refresh_window_cancelled_during_slow_ocr() {
    let templates = TempTemplates::all("window_slow_ocr");
    let frame = attack_window_frame();
    let recognizer = ScriptedRecognizer::new("Damage", "Lv 12\n150.5%\n$1,200")
        .with_delay(Duration::from_millis(1500));
    let (_, ctx) = context(&templates, recognizer, &frame);

    let feeder = feed_frames(&ctx.frames, frame);
    let token = CancellationToken::new();
    // Late enough that the window check is done and OCR is blocking
    cancel_after(&token, Duration::from_millis(300));

    let started = std::time::Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(1),
        ctx.upgrades.refresh_window(&ctx, UpgradeWindow::Attack, &token),
    )
    .await
    .expect("refresh ignored cancellation while OCR was running");
    feeder.cancel();

    assert!(result.unwrap_err().is_cancellation());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(ctx.upgrades.get(Upgrade::Damage), None);
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let templates = TempTemplates::all("tracker_cancel");
    let frame = blank_frame();
    let (_, ctx) = context(&templates, ScriptedRecognizer::new("", ""), &frame);

    // No window indicator and no toggle on screen: refresh never finishes
    let feeder = feed_frames(&ctx.frames, frame);
    let token = CancellationToken::new();
    cancel_after(&token, Duration::from_millis(50));

    let result = tokio::time::timeout(Duration::from_secs(5), ctx.upgrades.run(&ctx, &token))
        .await
        .expect("tracker ignored cancellation");
    feeder.cancel();

    assert!(result.unwrap_err().is_cancellation());
}
