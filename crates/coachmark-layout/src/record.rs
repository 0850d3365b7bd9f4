#![forbid(unsafe_code)]

//! The per-step coach mark record.
//!
//! A [`CoachMark`] is plain data: the data source builds one per step, the
//! resolver fills in the derived fields, the delegate may adjust it right
//! before it is shown, and the state machine drops it when the step is
//! dismissed.
//!
//! # Invariants
//!
//! 1. `resolved_vertical_position` is never `Automatic`; the type cannot hold it.
//! 2. Derived values (`resolved_vertical_position` and a derived
//!    `point_of_interest`) are only written when absent, so resolution is
//!    idempotent.
//! 3. [`CoachMark::invalidate_metadata`] clears derived values only; a point
//!    of interest supplied by the caller survives.

use std::time::Duration;

use coachmark_core::{Point, Rect, Region};
use serde::{Deserialize, Serialize};

/// Default horizontal margin between a callout and the container edges.
pub const DEFAULT_HORIZONTAL_MARGIN: f64 = 20.0;
/// Default upper bound on the callout width.
pub const DEFAULT_MAX_WIDTH: f64 = 350.0;
/// Default gap between the callout body and its pointer.
pub const DEFAULT_POINTER_OFFSET: f64 = 2.0;
/// Default gap between the callout (pointer included) and the cutout.
pub const DEFAULT_GAP_TO_CUTOUT: f64 = 2.0;
/// Default duration of show/hide transitions.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);
/// Padding added around an anchor frame by [`CoachMark::anchored_to`].
pub const DEFAULT_CUTOUT_PADDING: f64 = 4.0;
/// Corner radius used by [`CoachMark::anchored_to`].
pub const DEFAULT_CUTOUT_RADIUS: f64 = 4.0;

/// Requested placement of the callout relative to the cutout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalPosition {
    /// Above the cutout.
    Above,
    /// Below the cutout.
    Below,
    /// On top of the cutout.
    Over,
    /// Whichever of above/below has more room.
    #[default]
    Automatic,
}

impl VerticalPosition {
    /// The explicit position, or `None` for `Automatic`.
    pub const fn explicit(self) -> Option<ResolvedVerticalPosition> {
        match self {
            Self::Above => Some(ResolvedVerticalPosition::Above),
            Self::Below => Some(ResolvedVerticalPosition::Below),
            Self::Over => Some(ResolvedVerticalPosition::Over),
            Self::Automatic => None,
        }
    }
}

/// Resolved placement of the callout. Never automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedVerticalPosition {
    Above,
    #[default]
    Below,
    Over,
}

/// One tutorial step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachMark {
    /// Region left uncovered by the overlay. `None` shows the callout at a
    /// default location with no pointer.
    pub cutout_region: Option<Region>,
    /// Exact point the pointer targets. Derived from the cutout when unset.
    pub point_of_interest: Option<Point>,
    /// Requested vertical placement.
    pub vertical_position: VerticalPosition,
    /// Output of resolution.
    pub resolved_vertical_position: Option<ResolvedVerticalPosition>,
    /// Distance kept between the callout and the container edges.
    pub horizontal_margin: f64,
    /// Upper bound on the callout width.
    pub max_width: f64,
    /// Gap between callout body and pointer; negative values overlap them.
    pub pointer_offset: f64,
    /// Gap between the callout and the cutout.
    pub gap_to_cutout: f64,
    /// Let touches inside the cutout reach the application.
    pub allow_touch_inside_cutout: bool,
    /// Ignore overlay taps while this step is shown.
    pub disable_overlay_tap: bool,
    /// Never show a pointer for this step.
    pub disable_pointer: bool,
    /// Duration of this step's show/hide transitions.
    pub animation_duration: Duration,
    /// Value written by the resolver, kept to tell derived points from
    /// caller-supplied ones.
    #[serde(skip)]
    derived_point_of_interest: Option<Point>,
}

impl Default for CoachMark {
    fn default() -> Self {
        Self {
            cutout_region: None,
            point_of_interest: None,
            vertical_position: VerticalPosition::Automatic,
            resolved_vertical_position: None,
            horizontal_margin: DEFAULT_HORIZONTAL_MARGIN,
            max_width: DEFAULT_MAX_WIDTH,
            pointer_offset: DEFAULT_POINTER_OFFSET,
            gap_to_cutout: DEFAULT_GAP_TO_CUTOUT,
            allow_touch_inside_cutout: false,
            disable_overlay_tap: false,
            disable_pointer: false,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            derived_point_of_interest: None,
        }
    }
}

impl CoachMark {
    /// A record with no anchor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A record whose cutout is a rounded rectangle padded around `frame`.
    ///
    /// `frame` must already be in container coordinates.
    #[must_use]
    pub fn anchored_to(frame: Rect) -> Self {
        Self::new().cutout(Region::rounded(
            frame.outset(DEFAULT_CUTOUT_PADDING),
            DEFAULT_CUTOUT_RADIUS,
        ))
    }

    /// Set the cutout region.
    #[must_use]
    pub fn cutout(mut self, region: impl Into<Region>) -> Self {
        self.cutout_region = Some(region.into());
        self
    }

    /// Set an explicit point of interest.
    #[must_use]
    pub fn point_of_interest(mut self, point: Point) -> Self {
        self.point_of_interest = Some(point);
        self.derived_point_of_interest = None;
        self
    }

    /// Set the requested vertical position.
    #[must_use]
    pub fn vertical_position(mut self, position: VerticalPosition) -> Self {
        self.vertical_position = position;
        self
    }

    /// Set the horizontal margin.
    #[must_use]
    pub fn horizontal_margin(mut self, margin: f64) -> Self {
        self.horizontal_margin = margin;
        self
    }

    /// Set the maximum width.
    #[must_use]
    pub fn max_width(mut self, width: f64) -> Self {
        self.max_width = width;
        self
    }

    /// Set the pointer nudge.
    #[must_use]
    pub fn pointer_offset(mut self, offset: f64) -> Self {
        self.pointer_offset = offset;
        self
    }

    /// Set the gap to the cutout.
    #[must_use]
    pub fn gap_to_cutout(mut self, gap: f64) -> Self {
        self.gap_to_cutout = gap;
        self
    }

    /// Allow touches inside the cutout.
    #[must_use]
    pub fn allow_touch_inside_cutout(mut self, allow: bool) -> Self {
        self.allow_touch_inside_cutout = allow;
        self
    }

    /// Ignore overlay taps for this step.
    #[must_use]
    pub fn disable_overlay_tap(mut self, disable: bool) -> Self {
        self.disable_overlay_tap = disable;
        self
    }

    /// Hide the pointer for this step.
    #[must_use]
    pub fn disable_pointer(mut self, disable: bool) -> Self {
        self.disable_pointer = disable;
        self
    }

    /// Set the transition duration.
    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Both derived values are present.
    pub fn is_resolved(&self) -> bool {
        self.resolved_vertical_position.is_some()
            && (self.cutout_region.is_none() || self.point_of_interest.is_some())
    }

    /// Whether the current point of interest was derived by the resolver.
    pub fn has_derived_point_of_interest(&self) -> bool {
        self.point_of_interest.is_some() && self.point_of_interest == self.derived_point_of_interest
    }

    /// Forget derived values so the next resolution recomputes them.
    pub fn invalidate_metadata(&mut self) {
        self.resolved_vertical_position = None;
        if self.has_derived_point_of_interest() {
            self.point_of_interest = None;
        }
        self.derived_point_of_interest = None;
    }

    /// The same record with no anchor: no cutout, no point of interest.
    #[must_use]
    pub fn without_anchor(mut self) -> Self {
        self.cutout_region = None;
        self.point_of_interest = None;
        self.derived_point_of_interest = None;
        self
    }

    pub(crate) fn set_derived_point_of_interest(&mut self, point: Point) {
        self.point_of_interest = Some(point);
        self.derived_point_of_interest = Some(point);
    }
}
