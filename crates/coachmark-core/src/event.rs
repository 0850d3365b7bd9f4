#![forbid(unsafe_code)]

//! Environment and interaction events.
//!
//! These are pushed into the sequencer by the host: configuration changes by
//! the window/platform layer, interactions by whatever owns input routing.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A change to the container that requires the current step to be laid out
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConfigurationChange {
    /// The container size (or size class) changed, e.g. after a rotation.
    Size,
    /// The status bar height changed.
    StatusBar,
}

impl ConfigurationChange {
    /// Stable label for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::StatusBar => "status_bar",
        }
    }
}

impl fmt::Display for ConfigurationChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user interaction routed to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interaction {
    /// Tap on the dimming overlay at the given container point.
    OverlayTap(Point),
    /// Tap on the callout body.
    CoachMarkTap,
    /// Tap on the skip control.
    SkipTap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_change_labels() {
        assert_eq!(ConfigurationChange::Size.to_string(), "size");
        assert_eq!(ConfigurationChange::StatusBar.as_str(), "status_bar");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn events_serialize_with_labels() {
        let json = serde_json::to_string(&ConfigurationChange::StatusBar).unwrap();
        assert_eq!(json, "\"status_bar\"");
        let tap = Interaction::OverlayTap(Point::new(1.0, 2.0));
        let json = serde_json::to_string(&tap).unwrap();
        assert!(json.contains("overlay_tap"));
        let back: Interaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tap);
        let skip: Interaction = serde_json::from_str("\"skip_tap\"").unwrap();
        assert_eq!(skip, Interaction::SkipTap);
    }
}
