use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use humantime::format_duration;
use serde::Deserialize;

/// Overlay reveal timing. The on-screen chrome walks hidden -> title ->
/// status -> controls; these delays drive the walk and the idle reset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OverlayOptions {
    /// Delay from the start of a reveal to the status tier.
    #[serde(with = "humantime_serde")]
    pub status_delay: Duration,
    /// Delay from the start of a reveal to the controls tier.
    #[serde(with = "humantime_serde")]
    pub controls_delay: Duration,
    /// Inactivity window after which the chrome hides again.
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
    /// How long a pointer press stays relevant when deciding whether a
    /// content change should collapse the chrome to the title tier.
    #[serde(with = "humantime_serde")]
    pub pointer_grace: Duration,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            status_delay: Duration::from_millis(200),
            controls_delay: Duration::from_millis(500),
            idle_timeout: Duration::from_secs(3),
            pointer_grace: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AutoPlayOptions {
    /// Interval between automatic advances at speed 1.0.
    #[serde(with = "humantime_serde")]
    pub base_interval: Duration,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Suppression window applied when the user navigates manually while
    /// auto-play is running.
    #[serde(with = "humantime_serde")]
    pub manual_pause: Duration,
}

impl Default for AutoPlayOptions {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(2400),
            min_speed: 0.5,
            max_speed: 3.0,
            manual_pause: Duration::from_millis(2400),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NoticeOptions {
    /// How long a transient message stays on screen.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Default for NoticeOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Collection directory to present. Optional here because the CLI can
    /// override it; resolution happens at startup.
    pub collection_path: Option<PathBuf>,
    pub overlay: OverlayOptions,
    pub autoplay: AutoPlayOptions,
    pub notice: NoticeOptions,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            collection_path: None,
            overlay: OverlayOptions::default(),
            autoplay: AutoPlayOptions::default(),
            notice: NoticeOptions::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validated(self) -> Result<Self> {
        let overlay = &self.overlay;
        ensure!(
            !overlay.status_delay.is_zero(),
            "overlay status-delay must be non-zero"
        );
        ensure!(
            overlay.status_delay < overlay.controls_delay,
            "overlay status-delay ({}) must be shorter than controls-delay ({})",
            format_duration(overlay.status_delay),
            format_duration(overlay.controls_delay)
        );
        ensure!(
            overlay.idle_timeout > overlay.controls_delay,
            "overlay idle-timeout ({}) must be longer than controls-delay ({})",
            format_duration(overlay.idle_timeout),
            format_duration(overlay.controls_delay)
        );
        ensure!(
            !overlay.pointer_grace.is_zero(),
            "overlay pointer-grace must be non-zero"
        );

        let autoplay = &self.autoplay;
        ensure!(
            !autoplay.base_interval.is_zero(),
            "autoplay base-interval must be non-zero"
        );
        ensure!(
            autoplay.min_speed > 0.0,
            "autoplay min-speed must be positive, got {}",
            autoplay.min_speed
        );
        ensure!(
            autoplay.min_speed <= autoplay.max_speed,
            "autoplay min-speed ({}) must not exceed max-speed ({})",
            autoplay.min_speed,
            autoplay.max_speed
        );
        ensure!(
            !autoplay.manual_pause.is_zero(),
            "autoplay manual-pause must be non-zero"
        );

        ensure!(
            !self.notice.duration.is_zero(),
            "notice duration must be non-zero"
        );

        Ok(self)
    }
}
