#![forbid(unsafe_code)]

//! Tutorial configuration.
//!
//! Style values (overlay color, blur, fade timing, skip control) live in a
//! [`TutorialConfig`] handed to [`TutorialStateMachine::start`] instead of in
//! process-wide tables. With the `config` feature the whole struct can be
//! loaded from TOML or JSON:
//!
//! ```toml
//! layout_direction = "right_to_left"
//! pause_duration_ms = 200
//!
//! [overlay]
//! color = 0x00000080
//! fade_duration_ms = 250
//! allow_tap = true
//!
//! [skip_control]
//! title = "Skip"
//! ```
//!
//! Every field has a default, so a partial file is fine.
//!
//! [`TutorialStateMachine::start`]: crate::TutorialStateMachine::start

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use coachmark_core::{LayoutDirection, Rgba, Size};
use web_time::Duration;

/// Default overlay color: black at roughly 50% opacity.
pub const DEFAULT_OVERLAY_COLOR: Rgba = Rgba::rgba(0, 0, 0, 128);
/// Default overlay fade duration in milliseconds.
pub const DEFAULT_FADE_DURATION_MS: u64 = 300;

/// How the dimming layer looks and reacts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct OverlayConfig {
    /// Fill color of the translucent overlay, or the tint over a blur.
    pub color: Rgba,
    /// Blur radius; `Some` selects the blurred style.
    pub blur_radius: Option<f64>,
    /// Overlay fade in/out duration.
    pub fade_duration_ms: u64,
    /// Taps on the overlay advance to the next step.
    pub allow_tap: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_OVERLAY_COLOR,
            blur_radius: None,
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            allow_tap: false,
        }
    }
}

impl OverlayConfig {
    /// Fade duration as a [`Duration`].
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

/// The "skip" button shown while the tutorial runs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SkipControlConfig {
    pub title: String,
    pub size: Size,
}

impl Default for SkipControlConfig {
    fn default() -> Self {
        Self {
            title: "Skip".to_owned(),
            size: Size::new(72.0, 32.0),
        }
    }
}

/// Configuration for one tutorial run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TutorialConfig {
    pub overlay: OverlayConfig,
    pub layout_direction: LayoutDirection,
    /// `None` hides the skip control.
    pub skip_control: Option<SkipControlConfig>,
    /// Duration of the fade used when pausing hides something.
    pub pause_duration_ms: u64,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            layout_direction: LayoutDirection::LeftToRight,
            skip_control: None,
            pause_duration_ms: DEFAULT_FADE_DURATION_MS,
        }
    }
}

impl TutorialConfig {
    /// Set the layout direction.
    #[must_use]
    pub fn layout_direction(mut self, direction: LayoutDirection) -> Self {
        self.layout_direction = direction;
        self
    }

    /// Show a skip control.
    #[must_use]
    pub fn skip_control(mut self, skip: SkipControlConfig) -> Self {
        self.skip_control = Some(skip);
        self
    }

    /// Replace the overlay configuration.
    #[must_use]
    pub fn overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = overlay;
        self
    }

    /// Pause fade as a [`Duration`].
    pub fn pause_duration(&self) -> Duration {
        Duration::from_millis(self.pause_duration_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check value ranges. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(radius) = self.overlay.blur_radius {
            if !(radius.is_finite() && radius >= 0.0) {
                errors.push(format!(
                    "overlay.blur_radius must be finite and >= 0, got {radius}"
                ));
            }
        }
        if let Some(skip) = &self.skip_control {
            if skip.title.trim().is_empty() {
                errors.push("skip_control.title must not be empty".into());
            }
            if skip.size.is_empty() {
                errors.push(format!(
                    "skip_control.size must be positive, got {}x{}",
                    skip.size.width, skip.size.height
                ));
            }
        }
        errors
    }

    #[cfg(feature = "config")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`TutorialConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Values out of range.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TutorialConfig::default();
        assert_eq!(config.overlay.color, DEFAULT_OVERLAY_COLOR);
        assert_eq!(config.overlay.fade_duration(), Duration::from_millis(300));
        assert!(!config.overlay.allow_tap);
        assert!(config.skip_control.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validation_reports_every_problem() {
        let config = TutorialConfig::default()
            .overlay(OverlayConfig {
                blur_radius: Some(-1.0),
                ..OverlayConfig::default()
            })
            .skip_control(SkipControlConfig {
                title: "  ".into(),
                size: Size::new(0.0, 10.0),
            });
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("blur_radius"));
    }

    #[test]
    fn validation_error_display() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation errors: a; b");
    }
}
