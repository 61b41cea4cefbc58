// Finite state machine driving the game: capture, classify, swap supervisors, publish
use super::config::AutomationConfig;
use super::context::AutomationContext;
use super::error::{AutomationError, AutomationResult};
use super::handlers::supervise;
use super::match_image::{StateClassifier, Vision};
use super::types::{Frame, GameState};
use crate::adb::DeviceController;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// The running handler for one state, scoped to its own token.
struct Supervisor {
    state: GameState,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Supervisor {
    /// Cancel and wait for the task to exit completely.
    async fn stop(self, serial: &str) {
        self.token.cancel();
        match self.handle.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => log::error!("❌ [{serial}] {} supervisor panicked: {e}", self.state),
        }
    }
}

pub struct GameAutomation<D, C> {
    ctx: Arc<AutomationContext<D>>,
    classifier: Arc<C>,
    state: GameState,
    supervisor: Option<Supervisor>,
}

impl<D: DeviceController, C: StateClassifier> GameAutomation<D, C> {
    pub fn new(device: Arc<D>, vision: Arc<Vision>, classifier: Arc<C>, config: AutomationConfig) -> Self {
        Self {
            ctx: Arc::new(AutomationContext::new(device, vision, config)),
            classifier,
            state: GameState::Unknown,
            supervisor: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn context(&self) -> &Arc<AutomationContext<D>> {
        &self.ctx
    }

    /// State of the supervisor currently running, if any.
    pub fn active_supervisor(&self) -> Option<GameState> {
        self.supervisor.as_ref().map(|s| s.state)
    }

    /// One iteration of the main loop. The frame is published after any
    /// transition, so a fresh supervisor can receive the frame that started it.
    pub async fn tick(&mut self) -> AutomationResult<GameState> {
        let frame: Frame = Arc::new(self.ctx.device.capture_frame().await?);

        let classifier = Arc::clone(&self.classifier);
        let classify_frame = Arc::clone(&frame);
        let detected = tokio::task::spawn_blocking(move || classifier.classify(&classify_frame)).await??;

        if detected != self.state {
            self.transition(detected).await;
        }

        self.ctx.frames.publish(frame)?;
        Ok(detected)
    }

    async fn transition(&mut self, next: GameState) {
        let serial = self.ctx.device.serial();
        log::info!("🎮 [{serial}] State changed: {} -> {next}", self.state);

        // Never two supervisors at once: the old one is joined before the next spawns
        if let Some(old) = self.supervisor.take() {
            old.stop(serial).await;
        }

        self.state = next;
        if next != GameState::Unknown {
            let token = CancellationToken::new();
            let handle = tokio::spawn(supervise(next, Arc::clone(&self.ctx), token.clone()));
            self.supervisor = Some(Supervisor {
                state: next,
                token,
                handle,
            });
        }
    }

    /// Poll until `shutdown` fires, then stop the supervisor and complete the frame stream.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let serial = self.ctx.device.serial().to_string();
        log::info!(
            "🚀 [{serial}] Starting automation controller (interval: {}ms)",
            self.ctx.config.poll_interval.as_millis()
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }
            match self.tick().await {
                Ok(_) => {}
                Err(e) if e.is_cancellation() => log::debug!("[{serial}] Tick interrupted: {e}"),
                Err(AutomationError::Device(e)) if e.is_transport() => {
                    log::warn!("⚠️ [{serial}] Device unreachable, retrying next tick: {e}")
                }
                Err(e) => log::error!("❌ [{serial}] Error in automation loop: {e}"),
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(self.ctx.config.poll_interval) => {}
            }
        }

        self.shutdown().await;
    }

    /// Stop the active supervisor and complete the frame stream. Idempotent.
    pub async fn shutdown(&mut self) {
        let serial = self.ctx.device.serial();
        if let Some(supervisor) = self.supervisor.take() {
            supervisor.stop(serial).await;
        }
        self.ctx.frames.complete();
        log::info!("🛑 [{serial}] Automation controller stopped");
    }
}
