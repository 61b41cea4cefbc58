// Shared handles for supervisors: device, vision engine, frame stream, upgrade catalog
use super::broadcast::Broadcast;
use super::config::AutomationConfig;
use super::error::{AutomationError, AutomationResult};
use super::match_image::{Template, TemplateMatch, Vision};
use super::types::Frame;
use super::upgrades::UpgradeTracker;
use crate::adb::DeviceController;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AutomationContext<D> {
    pub device: Arc<D>,
    pub vision: Arc<Vision>,
    pub frames: Broadcast<Frame>,
    pub upgrades: Arc<UpgradeTracker>,
    pub config: AutomationConfig,
}

impl<D: DeviceController> AutomationContext<D> {
    pub fn new(device: Arc<D>, vision: Arc<Vision>, config: AutomationConfig) -> Self {
        Self {
            device,
            vision,
            frames: Broadcast::new(),
            upgrades: Arc::new(UpgradeTracker::new()),
            config,
        }
    }

    /// Wait for the next published frame.
    pub async fn next_frame(&self, token: &CancellationToken) -> AutomationResult<Frame> {
        Ok(self.frames.wait(token).await?)
    }

    /// Run CPU-bound vision work on the blocking pool.
    ///
    /// Returns `Cancelled` as soon as `token` fires; the detached job finishes in
    /// the background and its result is dropped.
    pub async fn run_blocking<T, F>(&self, token: &CancellationToken, job: F) -> AutomationResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Vision) -> T + Send + 'static,
    {
        let vision = Arc::clone(&self.vision);
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(AutomationError::Cancelled),
            joined = tokio::task::spawn_blocking(move || job(vision.as_ref())) => Ok(joined?),
        }
    }

    /// Template search on the blocking pool with the vision engine's match config.
    pub async fn locate(
        &self,
        frame: &Frame,
        template: Template,
        token: &CancellationToken,
    ) -> AutomationResult<Option<TemplateMatch>> {
        let frame = Arc::clone(frame);
        let found = self
            .run_blocking(token, move |vision| vision.locate(&frame, template))
            .await??;
        Ok(found)
    }

    /// Tap unless cancelled first; a cancelled tap is never sent.
    pub async fn tap(&self, x: u32, y: u32, token: &CancellationToken) -> AutomationResult<()> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(AutomationError::Cancelled),
            result = self.device.tap(x, y) => {
                log::debug!("👆 [{}] Tap ({x}, {y})", self.device.serial());
                Ok(result?)
            }
        }
    }

    /// Tap the center of `template` if it is visible in `frame`.
    pub async fn find_and_tap(
        &self,
        frame: &Frame,
        template: Template,
        token: &CancellationToken,
        success_message: Option<&str>,
    ) -> AutomationResult<bool> {
        let Some(found) = self.locate(frame, template, token).await? else {
            return Ok(false);
        };
        self.tap(found.x, found.y, token).await?;
        if let Some(message) = success_message {
            log::info!("💎 [{}] {message}", self.device.serial());
        }
        Ok(true)
    }
}
