#![forbid(unsafe_code)]

//! Asynchronous transition plumbing.
//!
//! Every visual transition (overlay fade, cutout reveal, callout show/hide)
//! finishes some time after it starts. The state machine hands the
//! collaborator a [`Completion`] with the transition; the collaborator gives
//! it back, either at once ([`Progress::Finished`]) or later from `tick`, and
//! the machine continues from where it left off.
//!
//! A completion is an opaque token: it carries the run generation it was
//! issued in plus exactly the data needed to continue (step index, resolved
//! record, layout, configuration change). Tokens from an earlier run are
//! discarded on arrival, so a stopped run can never be resumed by a late
//! animation callback.
//!
//! [`Fade`] is the tick-driven opacity animation shared by the in-crate
//! coordinators.

use std::fmt;

use coachmark_core::ConfigurationChange;
use coachmark_layout::{CoachMark, CoachMarkLayout};
use web_time::Duration;

use crate::machine::Layers;
use crate::views::CoachMarkViews;

/// Outcome of starting a transition.
#[must_use = "a finished completion must be handed back to the state machine"]
#[derive(Debug)]
pub enum Progress {
    /// Done already; continue with this completion.
    Finished(Completion),
    /// Running; the completion will come back from a later `tick`.
    Pending,
}

impl Progress {
    /// Whether the transition finished synchronously.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Opaque continuation token for one transition.
pub struct Completion {
    pub(crate) generation: u64,
    pub(crate) continuation: Continuation,
}

impl Completion {
    pub(crate) fn new(generation: u64, continuation: Continuation) -> Self {
        Self {
            generation,
            continuation,
        }
    }

    /// Run generation this completion belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Label of the transition, for logs.
    pub fn label(&self) -> &'static str {
        self.continuation.label()
    }

    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self::new(0, Continuation::OverlayShown)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("generation", &self.generation)
            .field("continuation", &self.continuation.label())
            .finish()
    }
}

/// A step on its way to the screen, or on it.
#[derive(Debug)]
pub(crate) struct StagedStep {
    pub(crate) index: usize,
    pub(crate) record: CoachMark,
    pub(crate) layout: CoachMarkLayout,
    pub(crate) change: Option<ConfigurationChange>,
    pub(crate) animated: bool,
}

/// What to do once the current step is off screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AfterHide {
    /// Move to the next index.
    Advance,
    /// Re-stage the same index and return to presenting (resume).
    Replay,
    /// Re-stage the same index and stay paused.
    Refresh,
    /// End the run.
    Stop { skipped: bool },
}

#[derive(Debug)]
pub(crate) enum Continuation {
    OverlayShown,
    StepHidden { next: AfterHide },
    CutoutHidden { next: AfterHide },
    CutoutShown { step: StagedStep, views: CoachMarkViews },
    StepShown { step: StagedStep },
    PauseLayerHidden { layer: Layers, remaining: Layers },
    ResumeOverlayShown,
    ConfigurationTornDown,
    OverlayHidden { skipped: bool },
}

impl Continuation {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::OverlayShown => "overlay_shown",
            Self::StepHidden { .. } => "step_hidden",
            Self::CutoutHidden { .. } => "cutout_hidden",
            Self::CutoutShown { .. } => "cutout_shown",
            Self::StepShown { .. } => "step_shown",
            Self::PauseLayerHidden { .. } => "pause_layer_hidden",
            Self::ResumeOverlayShown => "resume_overlay_shown",
            Self::ConfigurationTornDown => "configuration_torn_down",
            Self::OverlayHidden { .. } => "overlay_hidden",
        }
    }
}

/// Linear, tick-driven opacity animation holding at most one completion.
///
/// # Invariants
///
/// - `opacity()` is always within `[0.0, 1.0]`.
/// - A zero duration (or a fade to the current value) finishes synchronously.
/// - Starting a new fade while one runs supersedes it; the old completion is
///   handed back to the caller rather than dropped.
#[derive(Debug, Default)]
pub struct Fade {
    opacity: f64,
    from: f64,
    target: f64,
    elapsed: Duration,
    duration: Duration,
    waiting: Option<Completion>,
}

impl Fade {
    /// A fade resting at `opacity`.
    pub fn resting(opacity: f64) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self {
            opacity,
            from: opacity,
            target: opacity,
            ..Self::default()
        }
    }

    /// Current opacity.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Opacity this fade is heading to (or resting at).
    pub fn target(&self) -> f64 {
        self.target
    }

    /// A fade is running.
    pub fn is_animating(&self) -> bool {
        self.waiting.is_some()
    }

    /// Visible now or becoming visible.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 || self.target > 0.0
    }

    /// Fade to `target` over `duration`.
    ///
    /// A superseded completion is pushed onto `superseded`.
    pub fn animate_to(
        &mut self,
        target: f64,
        duration: Duration,
        completion: Completion,
        superseded: &mut Vec<Completion>,
    ) -> Progress {
        let target = target.clamp(0.0, 1.0);
        superseded.extend(self.waiting.take());
        self.target = target;
        if duration.is_zero() || self.opacity == target {
            self.opacity = target;
            self.from = target;
            return Progress::Finished(completion);
        }
        self.from = self.opacity;
        self.elapsed = Duration::ZERO;
        self.duration = duration;
        self.waiting = Some(completion);
        Progress::Pending
    }

    /// Advance by `delta`; returns the completion when the fade ends.
    pub fn tick(&mut self, delta: Duration) -> Option<Completion> {
        self.waiting.as_ref()?;
        self.elapsed = self.elapsed.saturating_add(delta);
        let progress = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.opacity = self.from + (self.target - self.from) * progress;
        if progress >= 1.0 { self.finish() } else { None }
    }

    /// Jump to the end of a running fade.
    pub fn finish(&mut self) -> Option<Completion> {
        self.opacity = self.target;
        self.from = self.target;
        self.waiting.take()
    }

    /// Jump to `opacity`, cancelling any running fade.
    pub fn snap(&mut self, opacity: f64) -> Option<Completion> {
        let opacity = opacity.clamp(0.0, 1.0);
        self.opacity = opacity;
        self.from = opacity;
        self.target = opacity;
        self.waiting.take()
    }
}
