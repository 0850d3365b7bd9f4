#![forbid(unsafe_code)]

//! Overlay coordination: the dimming layer and the cutout in it.
//!
//! [`OverlayCoordinator`] is the contract the state machine drives. It only
//! shows and hides things; it never decides geometry. [`OverlayManager`] is
//! the in-crate implementation: it tracks overlay and cutout opacity with
//! tick-driven [`Fade`]s and delegates appearance to an [`OverlayStyle`].
//!
//! # Hit testing
//!
//! [`OverlayManager::hit_test`] classifies a container point:
//! - [`HitTest::PassThrough`]: the overlay is not up, or the point is inside
//!   a revealed cutout whose step allows touches there.
//! - [`HitTest::Cutout`]: inside the revealed cutout, touches blocked.
//! - [`HitTest::Overlay`]: on the dimmed area; a candidate overlay tap.

pub mod style;

use coachmark_core::{Point, Region};
use web_time::Duration;

use crate::config::OverlayConfig;
use crate::transition::{Completion, Fade, Progress};

pub use style::{Backdrop, BlurStyle, OverlayStyle, TranslucentStyle, style_for};

/// Where a point on the overlay lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTest {
    Overlay,
    Cutout,
    PassThrough,
}

/// Show/hide contract for the overlay and cutout.
///
/// Transition methods take a [`Completion`] and return [`Progress`]: either
/// the completion straight back, or `Pending` with the completion returned
/// from a later [`tick`](Self::tick) or [`finish_animations`](Self::finish_animations).
pub trait OverlayCoordinator {
    /// Apply a run's overlay configuration before it is first shown.
    fn prepare(&mut self, config: &OverlayConfig);

    /// Fade the dimming layer in or out.
    fn show_overlay(&mut self, visible: bool, duration: Duration, completion: Completion)
    -> Progress;

    /// Replace the cutout shape. Does not change its visibility.
    fn set_cutout(&mut self, cutout: Option<Region>, allow_touch_inside: bool);

    /// Reveal or close the cutout.
    fn show_cutout(&mut self, visible: bool, duration: Duration, completion: Completion)
    -> Progress;

    /// The container is about to be reconfigured.
    fn will_transition(&mut self) {}

    /// Reconfiguration is over.
    fn did_transition(&mut self) {}

    /// Classify a container point.
    fn hit_test(&self, point: Point) -> HitTest;

    /// Whether the dimming layer is up or coming up.
    fn is_overlay_visible(&self) -> bool;

    /// Jump every running animation to its end and return the completions.
    fn finish_animations(&mut self) -> Vec<Completion>;

    /// Drop all state at the end of a run.
    fn teardown(&mut self);

    /// Advance animations; returns completions that finished.
    fn tick(&mut self, elapsed: Duration) -> Vec<Completion>;
}

/// What the host should draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    pub backdrop: Backdrop,
    pub opacity: f64,
    pub cutout: Option<Region>,
    /// 1.0 when the cutout is fully open.
    pub cutout_opacity: f64,
}

/// Overlay coordinator over a pluggable [`OverlayStyle`].
#[derive(Debug)]
pub struct OverlayManager {
    style: Box<dyn OverlayStyle>,
    config: OverlayConfig,
    overlay: Fade,
    cutout: Fade,
    region: Option<Region>,
    allow_touch_inside: bool,
    hidden_for_transition: bool,
    superseded: Vec<Completion>,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new(Box::new(TranslucentStyle))
    }
}

impl OverlayManager {
    /// Manager with an explicit style.
    pub fn new(style: Box<dyn OverlayStyle>) -> Self {
        Self {
            style,
            config: OverlayConfig::default(),
            overlay: Fade::resting(0.0),
            cutout: Fade::resting(0.0),
            region: None,
            allow_touch_inside: false,
            hidden_for_transition: false,
            superseded: Vec::new(),
        }
    }

    /// Manager whose style follows `config` (blurred when a radius is set).
    pub fn from_config(config: &OverlayConfig) -> Self {
        let mut manager = Self::new(style_for(config));
        manager.config = config.clone();
        manager
    }

    /// Active style.
    pub fn style(&self) -> &dyn OverlayStyle {
        self.style.as_ref()
    }

    /// Current overlay configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Current overlay opacity.
    pub fn overlay_opacity(&self) -> f64 {
        self.overlay.opacity()
    }

    /// Current cutout opacity (1.0 = fully open).
    pub fn cutout_opacity(&self) -> f64 {
        self.cutout.opacity()
    }

    /// Current cutout shape.
    pub fn cutout(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// The overlay was hidden for a configuration change and not yet restored.
    pub fn is_hidden_for_transition(&self) -> bool {
        self.hidden_for_transition
    }

    /// Everything needed to draw the overlay.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            backdrop: self.style.backdrop(&self.config),
            opacity: self.overlay.opacity(),
            cutout: self.region.clone(),
            cutout_opacity: self.cutout.opacity(),
        }
    }
}

impl OverlayCoordinator for OverlayManager {
    fn prepare(&mut self, config: &OverlayConfig) {
        if config.blur_radius != self.config.blur_radius {
            self.style = style_for(config);
        }
        self.config = config.clone();
        tracing::debug!(style = self.style.name(), "overlay prepared");
    }

    fn show_overlay(
        &mut self,
        visible: bool,
        duration: Duration,
        completion: Completion,
    ) -> Progress {
        let target = if visible { 1.0 } else { 0.0 };
        self.overlay
            .animate_to(target, duration, completion, &mut self.superseded)
    }

    fn set_cutout(&mut self, cutout: Option<Region>, allow_touch_inside: bool) {
        self.region = cutout;
        self.allow_touch_inside = allow_touch_inside;
    }

    fn show_cutout(
        &mut self,
        visible: bool,
        duration: Duration,
        completion: Completion,
    ) -> Progress {
        let target = if visible { 1.0 } else { 0.0 };
        let duration = self.style.cutout_duration(duration);
        self.cutout
            .animate_to(target, duration, completion, &mut self.superseded)
    }

    fn will_transition(&mut self) {
        if self.style.hides_during_transition() && self.overlay.is_visible() {
            // A fade cut short still completes; the sequence keeps moving.
            self.superseded.extend(self.overlay.snap(0.0));
            self.hidden_for_transition = true;
            tracing::debug!(style = self.style.name(), "overlay hidden for transition");
        }
    }

    fn did_transition(&mut self) {
        if self.hidden_for_transition {
            self.hidden_for_transition = false;
            self.superseded.extend(self.overlay.snap(1.0));
            tracing::debug!(style = self.style.name(), "overlay restored after transition");
        }
    }

    fn hit_test(&self, point: Point) -> HitTest {
        if self.overlay.opacity() <= 0.0 {
            return HitTest::PassThrough;
        }
        let in_cutout = self.cutout.opacity() > 0.0
            && self
                .region
                .as_ref()
                .is_some_and(|region| region.contains(point));
        match (in_cutout, self.allow_touch_inside) {
            (true, true) => HitTest::PassThrough,
            (true, false) => HitTest::Cutout,
            (false, _) => HitTest::Overlay,
        }
    }

    fn is_overlay_visible(&self) -> bool {
        self.overlay.is_visible() || self.hidden_for_transition
    }

    fn finish_animations(&mut self) -> Vec<Completion> {
        let mut done = std::mem::take(&mut self.superseded);
        done.extend(self.overlay.finish());
        done.extend(self.cutout.finish());
        done
    }

    fn teardown(&mut self) {
        self.overlay.snap(0.0);
        self.cutout.snap(0.0);
        self.region = None;
        self.allow_touch_inside = false;
        self.hidden_for_transition = false;
        self.superseded.clear();
    }

    fn tick(&mut self, elapsed: Duration) -> Vec<Completion> {
        let mut done = std::mem::take(&mut self.superseded);
        done.extend(self.overlay.tick(elapsed));
        done.extend(self.cutout.tick(elapsed));
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachmark_core::Rect;

    fn shown(manager: &mut OverlayManager) {
        let _ = manager.show_overlay(true, Duration::ZERO, Completion::detached());
        let _ = manager.show_cutout(true, Duration::ZERO, Completion::detached());
    }

    #[test]
    fn overlay_fades_in_over_ticks() {
        let mut manager = OverlayManager::default();
        let progress = manager.show_overlay(true, Duration::from_millis(100), Completion::detached());
        assert!(!progress.is_finished());
        assert!(manager.is_overlay_visible());
        assert!(manager.tick(Duration::from_millis(50)).is_empty());
        assert!((manager.overlay_opacity() - 0.5).abs() < 1e-9);
        assert_eq!(manager.tick(Duration::from_millis(50)).len(), 1);
        assert_eq!(manager.overlay_opacity(), 1.0);
    }

    #[test]
    fn hit_test_classifies_points() {
        let mut manager = OverlayManager::default();
        assert_eq!(manager.hit_test(Point::new(5.0, 5.0)), HitTest::PassThrough);

        manager.set_cutout(Some(Region::rect(Rect::new(10.0, 10.0, 20.0, 20.0))), false);
        shown(&mut manager);
        assert_eq!(manager.hit_test(Point::new(15.0, 15.0)), HitTest::Cutout);
        assert_eq!(manager.hit_test(Point::new(50.0, 50.0)), HitTest::Overlay);

        manager.set_cutout(Some(Region::rect(Rect::new(10.0, 10.0, 20.0, 20.0))), true);
        assert_eq!(manager.hit_test(Point::new(15.0, 15.0)), HitTest::PassThrough);
    }

    #[test]
    fn closed_cutout_is_overlay() {
        let mut manager = OverlayManager::default();
        manager.set_cutout(Some(Region::rect(Rect::new(10.0, 10.0, 20.0, 20.0))), true);
        let _ = manager.show_overlay(true, Duration::ZERO, Completion::detached());
        assert_eq!(manager.hit_test(Point::new(15.0, 15.0)), HitTest::Overlay);
    }

    #[test]
    fn blur_hides_across_transition() {
        let mut manager = OverlayManager::new(Box::new(BlurStyle::default()));
        shown(&mut manager);
        manager.will_transition();
        assert_eq!(manager.overlay_opacity(), 0.0);
        assert!(manager.is_hidden_for_transition());
        assert!(manager.is_overlay_visible());
        manager.did_transition();
        assert_eq!(manager.overlay_opacity(), 1.0);
        assert!(!manager.is_hidden_for_transition());
    }

    #[test]
    fn translucent_stays_up_across_transition() {
        let mut manager = OverlayManager::default();
        shown(&mut manager);
        manager.will_transition();
        assert_eq!(manager.overlay_opacity(), 1.0);
        manager.did_transition();
        assert_eq!(manager.overlay_opacity(), 1.0);
    }

    #[test]
    fn blur_cutout_snaps() {
        let mut manager = OverlayManager::new(Box::new(BlurStyle::default()));
        let progress = manager.show_cutout(true, Duration::from_millis(300), Completion::detached());
        assert!(progress.is_finished());
        assert_eq!(manager.cutout_opacity(), 1.0);
    }

    #[test]
    fn finish_returns_running_and_superseded() {
        let mut manager = OverlayManager::default();
        let _ = manager.show_overlay(true, Duration::from_millis(100), Completion::detached());
        let _ = manager.show_overlay(false, Duration::from_millis(100), Completion::detached());
        let _ = manager.show_cutout(true, Duration::from_millis(100), Completion::detached());
        // One superseded overlay fade, one running overlay fade, one cutout.
        assert_eq!(manager.finish_animations().len(), 3);
        assert_eq!(manager.overlay_opacity(), 0.0);
    }

    #[test]
    fn prepare_switches_style() {
        let mut manager = OverlayManager::default();
        manager.prepare(&OverlayConfig {
            blur_radius: Some(8.0),
            ..OverlayConfig::default()
        });
        assert_eq!(manager.style().name(), "blur");
        assert_eq!(
            manager.snapshot().backdrop,
            Backdrop::Blur {
                radius: 8.0,
                tint: OverlayConfig::default().color
            }
        );
    }

    #[test]
    fn teardown_resets() {
        let mut manager = OverlayManager::default();
        manager.set_cutout(Some(Region::rect(Rect::new(0.0, 0.0, 1.0, 1.0))), true);
        shown(&mut manager);
        manager.teardown();
        assert!(!manager.is_overlay_visible());
        assert!(manager.cutout().is_none());
    }
}
