#![forbid(unsafe_code)]

//! Display coordination: putting the callout on screen.
//!
//! [`DisplayCoordinator`] is what the state machine talks to when a step is
//! presented or dismissed. It also answers the one geometric question the
//! machine cannot: where the container is. `None` means the overlay surface
//! is not attached anywhere yet, and the step gets the degenerate layout.
//!
//! [`CoachMarkDisplay`] is the in-crate implementation. It measures the
//! content, resolves the placement constraints into frames, faces the
//! pointer and fades the callout in and out.

use coachmark_core::{Insets, LayoutDirection, Rect, Size};
use coachmark_layout::{
    CoachMark, CoachMarkLayout, ConstraintSet, HorizontalAlignment, PointerOrientation,
    ResolvedVerticalPosition,
};
use web_time::Duration;

use crate::source::SkipControl;
use crate::transition::{Completion, Fade, Progress};
use crate::views::CoachMarkViews;

/// Where the overlay surface is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationContext {
    /// A dedicated window above the presenting controller.
    #[default]
    NewWindowOverController,
    /// The window that already hosts the presenting controller.
    CurrentWindowOfController,
    /// Inside the presenting controller's own view.
    EmbeddedInViewController,
}

impl PresentationContext {
    /// Whether the surface spans a whole window (and so sits under system
    /// bars and notches).
    pub const fn is_window(self) -> bool {
        !matches!(self, Self::EmbeddedInViewController)
    }
}

/// One step handed to the display.
#[derive(Debug)]
pub struct PresentRequest {
    pub index: usize,
    pub record: CoachMark,
    pub layout: CoachMarkLayout,
    pub views: CoachMarkViews,
}

/// Presentation contract driven by the state machine.
pub trait DisplayCoordinator {
    /// Container all geometry is expressed in, if attached.
    fn container_region(&self) -> Option<Rect>;

    /// Extra horizontal inset the resolver adds to edge pins.
    fn safe_area_compensation(&self) -> f64 {
        0.0
    }

    /// Show a step.
    fn present(
        &mut self,
        request: PresentRequest,
        duration: Duration,
        completion: Completion,
    ) -> Progress;

    /// Dismiss the current step. Finishes at once when nothing is shown.
    fn hide(&mut self, duration: Duration, completion: Completion) -> Progress;

    /// Show the skip control placed by `constraints`.
    fn show_skip_control(&mut self, skip: &SkipControl, constraints: &ConstraintSet);

    fn hide_skip_control(&mut self);

    /// Jump every running animation to its end and return the completions.
    fn finish_animations(&mut self) -> Vec<Completion>;

    /// Drop all state at the end of a run.
    fn teardown(&mut self);

    /// Advance animations; returns completions that finished.
    fn tick(&mut self, elapsed: Duration) -> Vec<Completion>;
}

/// Frames for a callout and its pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalloutFrames {
    pub body: Rect,
    pub pointer: Option<Rect>,
}

/// Place a callout of `body` size (and optional `pointer` size) for `layout`.
///
/// The body is placed horizontally by the layout's constraints. Vertically it
/// goes below the cutout (`cutout.bottom + gap`), above it
/// (`cutout.top - gap - height`), centered on it for `Over`, or centered in
/// the container when there is no cutout. The pointer sits between body and
/// cutout, `layout.pointer_offset` away from the pinned edge (or from the
/// container center when centered), but never past the body's edges.
pub fn place_callout(
    layout: &CoachMarkLayout,
    record: &CoachMark,
    container: Rect,
    body: Size,
    pointer: Option<Size>,
) -> CalloutFrames {
    let pointer = layout.pointer_orientation.and(pointer);
    let (pointer_h, pointer_gap) = match pointer {
        Some(size) => (size.height, record.pointer_offset),
        None => (0.0, 0.0),
    };
    let reach = record.gap_to_cutout + pointer_h + pointer_gap;

    let (x, width) = layout.constraints.solve_horizontal(container, body.width);
    let height = body.height.max(0.0);
    let y = match (layout.cutout, layout.vertical_position) {
        (None, _) => container.y + (container.height - height) / 2.0,
        (Some(cutout), ResolvedVerticalPosition::Below) => cutout.bottom() + reach,
        (Some(cutout), ResolvedVerticalPosition::Above) => cutout.top() - reach - height,
        (Some(cutout), ResolvedVerticalPosition::Over) => cutout.mid_y() - height / 2.0,
    };
    let body = Rect::new(x, y, width, height);

    let pointer = match (pointer, layout.pointer_orientation, layout.point_of_interest) {
        (Some(size), Some(orientation), Some(_)) => {
            let target = pointer_target_x(layout, body, container);
            let max_x = (body.right() - size.width).max(body.x);
            let px = (target - size.width / 2.0).max(body.x).min(max_x);
            let py = match orientation {
                PointerOrientation::Top => body.y - pointer_gap - size.height,
                PointerOrientation::Bottom => body.bottom() + pointer_gap,
            };
            Some(Rect::new(px, py, size.width, size.height))
        }
        _ => None,
    };

    CalloutFrames { body, pointer }
}

/// Horizontal position the pointer aims at, measured from the edge the
/// layout pinned.
fn pointer_target_x(layout: &CoachMarkLayout, body: Rect, container: Rect) -> f64 {
    let offset = layout.pointer_offset;
    let rtl = layout.direction == LayoutDirection::RightToLeft;
    match (layout.alignment, rtl) {
        (HorizontalAlignment::Centered, false) => container.mid_x() - offset,
        (HorizontalAlignment::Centered, true) => container.mid_x() + offset,
        (HorizontalAlignment::Leading, false) | (HorizontalAlignment::Trailing, true) => {
            body.x + offset
        }
        (HorizontalAlignment::Leading, true) | (HorizontalAlignment::Trailing, false) => {
            body.right() - offset
        }
    }
}

/// A step currently on screen.
#[derive(Debug)]
pub struct PresentedCoachMark {
    pub index: usize,
    pub frames: CalloutFrames,
    pub layout: CoachMarkLayout,
    pub views: CoachMarkViews,
}

/// The skip control currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedSkipControl {
    pub title: String,
    pub frame: Rect,
}

/// In-crate display coordinator.
#[derive(Debug)]
pub struct CoachMarkDisplay {
    context: PresentationContext,
    container: Option<Rect>,
    safe_area: Insets,
    presented: Option<PresentedCoachMark>,
    fade: Fade,
    skip_control: Option<PresentedSkipControl>,
    superseded: Vec<Completion>,
}

impl CoachMarkDisplay {
    /// Display attached to `container` in `context`.
    pub fn new(context: PresentationContext, container: Option<Rect>) -> Self {
        Self {
            context,
            container,
            safe_area: Insets::default(),
            presented: None,
            fade: Fade::resting(0.0),
            skip_control: None,
            superseded: Vec::new(),
        }
    }

    /// Set the window safe-area insets.
    #[must_use]
    pub fn with_safe_area(mut self, insets: Insets) -> Self {
        self.safe_area = insets;
        self
    }

    pub fn context(&self) -> PresentationContext {
        self.context
    }

    /// Update the container, e.g. after a rotation.
    pub fn set_container(&mut self, container: Option<Rect>) {
        self.container = container;
    }

    /// Update the safe-area insets.
    pub fn set_safe_area(&mut self, insets: Insets) {
        self.safe_area = insets;
    }

    /// The step on screen, if any.
    pub fn presented(&self) -> Option<&PresentedCoachMark> {
        self.presented.as_ref()
    }

    /// The skip control on screen, if any.
    pub fn skip_control(&self) -> Option<&PresentedSkipControl> {
        self.skip_control.as_ref()
    }

    /// Callout opacity.
    pub fn opacity(&self) -> f64 {
        self.fade.opacity()
    }

    fn forget_hidden(&mut self) {
        if !self.fade.is_visible() {
            self.presented = None;
        }
    }
}

impl DisplayCoordinator for CoachMarkDisplay {
    fn container_region(&self) -> Option<Rect> {
        self.container
    }

    fn safe_area_compensation(&self) -> f64 {
        if self.context.is_window() {
            self.safe_area.left.max(self.safe_area.right)
        } else {
            0.0
        }
    }

    fn present(
        &mut self,
        request: PresentRequest,
        duration: Duration,
        completion: Completion,
    ) -> Progress {
        let PresentRequest {
            index,
            record,
            layout,
            mut views,
        } = request;
        let container = self.container.unwrap_or_default();
        let budget = layout.max_width.max(0.0);
        let measured = views.content.measure(budget);
        let body = Size::new(measured.width.min(budget), measured.height);
        let pointer_size = match views.pointer.as_mut() {
            Some(pointer) => {
                pointer.set_orientation(layout.pointer_orientation);
                Some(pointer.size())
            }
            None => None,
        };
        let frames = place_callout(&layout, &record, container, body, pointer_size);
        tracing::debug!(
            index,
            x = frames.body.x,
            y = frames.body.y,
            width = frames.body.width,
            height = frames.body.height,
            "coach mark presented"
        );
        self.presented = Some(PresentedCoachMark {
            index,
            frames,
            layout,
            views,
        });
        // Always fade from transparent, even if the previous step never
        // finished hiding.
        self.superseded.extend(self.fade.snap(0.0));
        self.fade
            .animate_to(1.0, duration, completion, &mut self.superseded)
    }

    fn hide(&mut self, duration: Duration, completion: Completion) -> Progress {
        let progress = self
            .fade
            .animate_to(0.0, duration, completion, &mut self.superseded);
        self.forget_hidden();
        progress
    }

    fn show_skip_control(&mut self, skip: &SkipControl, constraints: &ConstraintSet) {
        let container = self.container.unwrap_or_default();
        self.skip_control = Some(PresentedSkipControl {
            title: skip.title.clone(),
            frame: constraints.solve(container, skip.size),
        });
    }

    fn hide_skip_control(&mut self) {
        self.skip_control = None;
    }

    fn finish_animations(&mut self) -> Vec<Completion> {
        let mut done = std::mem::take(&mut self.superseded);
        done.extend(self.fade.finish());
        self.forget_hidden();
        done
    }

    fn teardown(&mut self) {
        self.superseded.clear();
        let _ = self.fade.snap(0.0);
        self.presented = None;
        self.skip_control = None;
    }

    fn tick(&mut self, elapsed: Duration) -> Vec<Completion> {
        let mut done = std::mem::take(&mut self.superseded);
        done.extend(self.fade.tick(elapsed));
        self.forget_hidden();
        done
    }
}
