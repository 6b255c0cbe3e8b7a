//! Presentation controller.
//!
//! One task owns the overlay, auto-play and notice machines plus the current
//! collection view, so every state change happens on this loop and handlers
//! run to completion. Timing lives inside the machines as deadline fields;
//! the loop sleeps until the earliest one and feeds wakeups back in. Nothing
//! here spawns timers, which is what makes teardown safe: cancel the token
//! and every pending deadline dies with the task.

pub mod autoplay;
pub mod notice;
pub mod overlay;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{Instant as TokioInstant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Configuration;
use crate::content::{CollectionInfo, ContentError, ContentHandle, ItemData};
use crate::events::{Direction, InputEvent, UiEvent};
use crate::keymap::{self, Action};

use autoplay::AutoPlay;
use notice::NoticeBoard;
use overlay::{OverlayChange, OverlaySM};

/// Fallback wakeup period when no machine holds a deadline.
const QUIET_WAKE: Duration = Duration::from_secs(60);

pub async fn run(
    cfg: Configuration,
    collection: PathBuf,
    content: ContentHandle,
    mut input: mpsc::Receiver<InputEvent>,
    ui: mpsc::Sender<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut controller = Controller {
        overlay: OverlaySM::new(cfg.overlay.clone()),
        autoplay: AutoPlay::new(cfg.autoplay.clone()),
        notices: NoticeBoard::new(cfg.notice.duration),
        cfg,
        content,
        ui,
        collection: None,
        loop_enabled: false,
    };
    controller.start(&collection, Instant::now()).await;

    loop {
        let wake = controller.next_deadline();
        let wake_at =
            TokioInstant::from_std(wake.unwrap_or_else(|| Instant::now() + QUIET_WAKE));
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = input.recv() => {
                let Some(event) = event else { break };
                controller.handle_input(event, Instant::now()).await;
            }
            _ = sleep_until(wake_at), if wake.is_some() => {
                controller.fire_deadlines(Instant::now()).await;
            }
        }
    }
    info!("presentation controller stopped");
    Ok(())
}

struct Controller {
    cfg: Configuration,
    content: ContentHandle,
    ui: mpsc::Sender<UiEvent>,
    overlay: OverlaySM,
    autoplay: AutoPlay,
    notices: NoticeBoard,
    collection: Option<CollectionInfo>,
    loop_enabled: bool,
}

impl Controller {
    /// Loads the collection directory and presents its first item. Failures
    /// here are the only ones the user sees as an error surface; afterwards
    /// the controller keeps serving input either way.
    async fn start(&mut self, collection: &Path, now: Instant) {
        let _ = self.ui.send(UiEvent::LoadStarted).await;
        match self.initial_load(collection, now).await {
            Ok(count) => {
                self.post_notice(format!("Loaded {count} collections"), now)
                    .await;
            }
            Err(err) => {
                error!(path = %collection.display(), error = %err, "initial load failed");
                let _ = self.ui.send(UiEvent::LoadFailed(err.to_string())).await;
            }
        }
    }

    async fn initial_load(
        &mut self,
        collection: &Path,
        now: Instant,
    ) -> Result<usize, ContentError> {
        let count = self.content.load_collection(collection.to_path_buf()).await?;
        info!(collections = count, path = %collection.display(), "collection directory loaded");
        if let Ok(flag) = self.content.loop_flag().await {
            self.loop_enabled = flag;
        }
        let info = self.content.collection_info().await?;
        let _ = self.ui.send(UiEvent::CollectionChanged(info.clone())).await;
        // Seed the identity so the first real change is detected as one.
        let _ = self.overlay.on_content_changed(info.index, now);
        let item = self.content.item(None, info.current_item).await?;
        let _ = self.ui.send(UiEvent::ItemShown(item)).await;
        self.collection = Some(info);
        Ok(count)
    }

    fn next_deadline(&self) -> Option<Instant> {
        [
            self.overlay.next_deadline(),
            self.autoplay.next_tick(),
            self.notices.expiry(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    async fn fire_deadlines(&mut self, now: Instant) {
        if let Some(change) = self.overlay.on_deadline(now) {
            self.overlay_changed(change).await;
        }
        if self.autoplay.next_tick().is_some_and(|due| due <= now) {
            match self.autoplay.on_tick(now) {
                Some(direction) => {
                    debug!(?direction, "auto-play tick");
                    self.navigate(direction, now).await;
                }
                None => debug!("auto-play tick suppressed by pause window"),
            }
        }
        if let Some(text) = self.notices.on_deadline(now) {
            debug!(notice = %text, "notice expired");
            let _ = self.ui.send(UiEvent::NoticeExpired).await;
        }
    }

    async fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::PointerMoved => {
                if let Some(change) = self.overlay.on_pointer_move(now) {
                    self.overlay_changed(change).await;
                }
            }
            InputEvent::PointerPressed => {
                if let Some(change) = self.overlay.on_pointer_down(now) {
                    self.overlay_changed(change).await;
                }
            }
            InputEvent::Key(key) => match keymap::lookup(&key) {
                Some(Action::Advance) => self.manual_navigate(Direction::Forward, now).await,
                Some(Action::Retreat) => self.manual_navigate(Direction::Backward, now).await,
                Some(Action::ToggleAutoPlay) => self.toggle_autoplay(now).await,
                None => debug!(key = %key, "ignored key"),
            },
            InputEvent::SetSpeed(multiplier) => self.set_speed(multiplier, now).await,
            InputEvent::ToggleDirection => {
                let direction = self.autoplay.toggle_direction();
                info!(?direction, "auto-play direction changed");
                self.autoplay_changed().await;
                let text = match direction {
                    Direction::Forward => "Playing forward",
                    Direction::Backward => "Playing backward",
                };
                self.post_notice(text.to_string(), now).await;
            }
            InputEvent::ToggleLoop => self.toggle_loop(now).await,
            InputEvent::AdvanceCollection => {
                self.jump_collection(Direction::Forward, now).await;
            }
            InputEvent::RetreatCollection => {
                self.jump_collection(Direction::Backward, now).await;
            }
        }
    }

    /// Key-driven navigation. While auto-play runs, a manual step opens a
    /// suppression window so the scheduler does not immediately advance past
    /// what the user just picked.
    async fn manual_navigate(&mut self, direction: Direction, now: Instant) {
        if self.autoplay.is_active() {
            self.autoplay.pause(self.cfg.autoplay.manual_pause, now);
            debug!(window = ?self.cfg.autoplay.manual_pause, "auto-play paused for manual navigation");
        }
        self.navigate(direction, now).await;
    }

    /// Steps to the neighboring item. Navigation failures are logged and
    /// otherwise swallowed; the current item stays on screen.
    async fn navigate(&mut self, direction: Direction, now: Instant) {
        let result = match direction {
            Direction::Forward => self.content.advance_item().await,
            Direction::Backward => self.content.retreat_item().await,
        };
        match result {
            Ok(item) => self.show_item(item, now).await,
            Err(err) => warn!(?direction, error = %err, "item navigation failed"),
        }
    }

    async fn jump_collection(&mut self, direction: Direction, now: Instant) {
        if self.autoplay.is_active() {
            self.autoplay.pause(self.cfg.autoplay.manual_pause, now);
        }
        let result = match direction {
            Direction::Forward => self.content.advance_collection().await,
            Direction::Backward => self.content.retreat_collection().await,
        };
        let info = match result {
            Ok(info) => info,
            Err(err) => {
                warn!(?direction, error = %err, "collection jump failed");
                return;
            }
        };
        info!(collection = %info.name, index = info.index, "collection changed");
        let _ = self.ui.send(UiEvent::CollectionChanged(info.clone())).await;
        if let Some(change) = self.overlay.on_content_changed(info.index, now) {
            self.overlay_changed(change).await;
        }
        self.collection = Some(info.clone());
        match self.content.item(Some(info.index), info.current_item).await {
            Ok(item) => self.show_item(item, now).await,
            Err(err) => warn!(error = %err, "item fetch after collection jump failed"),
        }
    }

    async fn show_item(&mut self, item: ItemData, now: Instant) {
        let known_index = self.collection.as_ref().map(|info| info.index);
        if known_index != Some(item.collection_index) {
            match self.content.collection_info().await {
                Ok(info) => {
                    info!(collection = %info.name, index = info.index, "collection changed");
                    let _ = self.ui.send(UiEvent::CollectionChanged(info.clone())).await;
                    self.collection = Some(info);
                }
                Err(err) => warn!(error = %err, "collection info refresh failed"),
            }
            if let Some(change) = self.overlay.on_content_changed(item.collection_index, now) {
                self.overlay_changed(change).await;
            }
        } else if let Some(info) = self.collection.as_mut() {
            info.current_item = item.item_index;
        }
        debug!(
            item = item.item_index,
            collection = item.collection_index,
            path = %item.asset_path.display(),
            "item shown"
        );
        let _ = self.ui.send(UiEvent::ItemShown(item)).await;
    }

    async fn toggle_autoplay(&mut self, now: Instant) {
        let active = self.autoplay.toggle(now);
        info!(active, speed = %self.autoplay.speed(), "auto-play toggled");
        self.autoplay_changed().await;
        let text = if active { "Auto-play on" } else { "Auto-play off" };
        self.post_notice(text.to_string(), now).await;
    }

    async fn set_speed(&mut self, multiplier: f32, now: Instant) {
        let clamped = multiplier.clamp(self.cfg.autoplay.min_speed, self.cfg.autoplay.max_speed);
        if clamped != multiplier {
            debug!(requested = %multiplier, applied = %clamped, "speed clamped to configured range");
        }
        self.autoplay.set_speed(clamped, now);
        info!(speed = %clamped, "auto-play speed changed");
        self.autoplay_changed().await;
        self.post_notice(format!("Speed x{clamped:.2}"), now).await;
    }

    async fn toggle_loop(&mut self, now: Instant) {
        let target = !self.loop_enabled;
        match self.content.set_loop_flag(target).await {
            Ok(()) => {
                self.loop_enabled = target;
                info!(enabled = target, "item loop changed");
                let text = if target { "Loop on" } else { "Loop off" };
                self.post_notice(text.to_string(), now).await;
            }
            Err(err) => warn!(error = %err, "loop flag change failed"),
        }
    }

    async fn overlay_changed(&self, change: OverlayChange) {
        debug!(from = ?change.from, to = ?change.to, "overlay level changed");
        let _ = self
            .ui
            .send(UiEvent::OverlayChanged {
                from: change.from,
                to: change.to,
            })
            .await;
    }

    async fn autoplay_changed(&self) {
        let _ = self
            .ui
            .send(UiEvent::AutoPlayChanged {
                active: self.autoplay.is_active(),
                speed: self.autoplay.speed(),
                direction: self.autoplay.direction(),
            })
            .await;
    }

    async fn post_notice(&mut self, text: String, now: Instant) {
        self.notices.post(text.clone(), now);
        let _ = self.ui.send(UiEvent::NoticePosted(text)).await;
    }
}
