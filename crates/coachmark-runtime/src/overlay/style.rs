#![forbid(unsafe_code)]

//! Overlay looks.
//!
//! The manager owns timing and state; a style only answers questions about
//! appearance: what the backdrop is, whether the cutout animates, and whether
//! the overlay must disappear while the container is being reconfigured (a
//! blurred snapshot of the old layout would be wrong after a rotation).

use std::fmt;

use coachmark_core::Rgba;
use web_time::Duration;

use crate::config::OverlayConfig;

/// What the host should paint behind the cutout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backdrop {
    /// Flat translucent fill.
    Color(Rgba),
    /// Blurred snapshot of the content, tinted.
    Blur { radius: f64, tint: Rgba },
}

/// Appearance strategy for [`OverlayManager`](super::OverlayManager).
pub trait OverlayStyle: fmt::Debug {
    /// Stable name for logs.
    fn name(&self) -> &'static str;

    /// Backdrop for the given configuration.
    fn backdrop(&self, config: &OverlayConfig) -> Backdrop;

    /// Duration actually used when revealing or closing the cutout.
    fn cutout_duration(&self, requested: Duration) -> Duration {
        requested
    }

    /// Hide the overlay between `will_transition` and `did_transition`.
    fn hides_during_transition(&self) -> bool {
        false
    }
}

/// Flat translucent color; the cutout fades with the step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslucentStyle;

impl OverlayStyle for TranslucentStyle {
    fn name(&self) -> &'static str {
        "translucent"
    }

    fn backdrop(&self, config: &OverlayConfig) -> Backdrop {
        Backdrop::Color(config.color)
    }
}

/// Blurred backdrop. The cutout cannot be cross-faded through a blur, so it
/// snaps, and the snapshot is dropped across configuration changes.
#[derive(Debug, Clone, Copy)]
pub struct BlurStyle {
    pub radius: f64,
}

impl BlurStyle {
    pub const DEFAULT_RADIUS: f64 = 12.0;
}

impl Default for BlurStyle {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

impl OverlayStyle for BlurStyle {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn backdrop(&self, config: &OverlayConfig) -> Backdrop {
        Backdrop::Blur {
            radius: config.blur_radius.unwrap_or(self.radius),
            tint: config.color,
        }
    }

    fn cutout_duration(&self, _requested: Duration) -> Duration {
        Duration::ZERO
    }

    fn hides_during_transition(&self) -> bool {
        true
    }
}

/// Style selected by a configuration: blurred when a radius is set.
pub fn style_for(config: &OverlayConfig) -> Box<dyn OverlayStyle> {
    match config.blur_radius {
        Some(radius) => Box::new(BlurStyle { radius }),
        None => Box::new(TranslucentStyle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_uses_config_color() {
        let config = OverlayConfig::default();
        assert_eq!(
            TranslucentStyle.backdrop(&config),
            Backdrop::Color(config.color)
        );
        let d = Duration::from_millis(250);
        assert_eq!(TranslucentStyle.cutout_duration(d), d);
        assert!(!TranslucentStyle.hides_during_transition());
    }

    #[test]
    fn blur_snaps_cutout() {
        let style = BlurStyle::default();
        assert_eq!(
            style.cutout_duration(Duration::from_millis(250)),
            Duration::ZERO
        );
        assert!(style.hides_during_transition());
    }

    #[test]
    fn style_for_picks_blur_when_radius_set() {
        let config = OverlayConfig {
            blur_radius: Some(4.0),
            ..OverlayConfig::default()
        };
        let style = style_for(&config);
        assert_eq!(style.name(), "blur");
        assert_eq!(
            style.backdrop(&config),
            Backdrop::Blur {
                radius: 4.0,
                tint: config.color
            }
        );
        assert_eq!(style_for(&OverlayConfig::default()).name(), "translucent");
    }
}
