// Per-state supervisors. Each runs until its token is cancelled.
use super::context::AutomationContext;
use super::error::AutomationResult;
use super::match_image::Template;
use super::types::{Frame, GameState};
use crate::adb::DeviceController;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) async fn supervise<D: DeviceController>(
    state: GameState,
    ctx: Arc<AutomationContext<D>>,
    token: CancellationToken,
) {
    let result = match state {
        GameState::Unknown => Ok(()),
        GameState::MainMenu => main_menu(&ctx, &token).await,
        GameState::Defeat => defeat(&ctx, &token).await,
        GameState::InBattle => {
            in_battle(&ctx, &token).await;
            Ok(())
        }
    };
    report(ctx.device.serial(), &format!("{state} supervisor"), result);
}

fn report(serial: &str, routine: &str, result: AutomationResult<()>) {
    match result {
        Ok(()) => log::debug!("[{serial}] {routine} finished"),
        Err(e) if e.is_cancellation() => log::debug!("[{serial}] {routine} stopped: {e}"),
        Err(e) => log::error!("❌ [{serial}] Error in {routine}: {e}"),
    }
}

async fn main_menu<D: DeviceController>(
    ctx: &AutomationContext<D>,
    token: &CancellationToken,
) -> AutomationResult<()> {
    while !token.is_cancelled() {
        let frame = ctx.next_frame(token).await?;
        ctx.find_and_tap(&frame, Template::MainMenuClaimGems, token, Some("Claimed main menu gems"))
            .await?;
        ctx.find_and_tap(&frame, Template::BattleStart, token, None).await?;
    }
    Ok(())
}

async fn defeat<D: DeviceController>(
    ctx: &AutomationContext<D>,
    token: &CancellationToken,
) -> AutomationResult<()> {
    while !token.is_cancelled() {
        let frame = ctx.next_frame(token).await?;
        ctx.find_and_tap(&frame, Template::Retry, token, None).await?;
    }
    Ok(())
}

/// Sub-routines fail independently: an error ends only the routine that raised it.
async fn in_battle<D: DeviceController>(ctx: &AutomationContext<D>, token: &CancellationToken) {
    let serial = ctx.device.serial();
    let upgrades = async {
        if ctx.config.track_upgrades {
            report(serial, "UpgradeTracker", ctx.upgrades.run(ctx, token).await);
        }
    };
    tokio::join!(
        async { report(serial, "GatherGems", gather_gems(ctx, token).await) },
        async { report(serial, "GatherMovingGems", gather_moving_gems(ctx, token).await) },
        upgrades,
    );
}

async fn gather_gems<D: DeviceController>(
    ctx: &AutomationContext<D>,
    token: &CancellationToken,
) -> AutomationResult<()> {
    while !token.is_cancelled() {
        let frame = ctx.next_frame(token).await?;
        ctx.find_and_tap(&frame, Template::BattleClaimGems, token, Some("Claimed ad gem"))
            .await?;
    }
    Ok(())
}

async fn gather_moving_gems<D: DeviceController>(
    ctx: &AutomationContext<D>,
    token: &CancellationToken,
) -> AutomationResult<()> {
    while !token.is_cancelled() {
        let frame = ctx.next_frame(token).await?;
        if let Some((x, y)) = locate_moving_gem(ctx, &frame, token).await? {
            log::info!("💎 [{}] Claimed moving gem", ctx.device.serial());
            ctx.tap(x, y, token).await?;
        }
    }
    Ok(())
}

/// Find the tower, then search the ring around it for the orbiting gem.
async fn locate_moving_gem<D: DeviceController>(
    ctx: &AutomationContext<D>,
    frame: &Frame,
    token: &CancellationToken,
) -> AutomationResult<Option<(u32, u32)>> {
    let Some(tower) = ctx.locate(frame, Template::Tower, token).await? else {
        return Ok(None);
    };
    let frame = Arc::clone(frame);
    let radius = ctx.config.orbit_radius;
    ctx.run_blocking(token, move |vision| {
        vision.detect_by_color(&frame, (tower.x, tower.y), radius)
    })
    .await
}
