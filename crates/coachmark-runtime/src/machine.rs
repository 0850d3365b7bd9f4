#![forbid(unsafe_code)]

//! The tutorial sequencing state machine.
//!
//! # State machine
//!
//! ```text
//!            start                 step shown
//!   Idle ───────────▶ IdleBetweenSteps ─────────▶ Presenting
//!    ▲                    ▲      │                  │   │
//!    │                    │      │ pause            │   │ show_next / tap
//!    │                    │      ▼                  │   ▼
//!    │           resume   │    Paused ◀──── pause ──┘ IdleBetweenSteps
//!    │                    └──────┘
//!    │
//!    │  end_run        stop / skip / exhausted
//!    └────────── Stopping ◀──────────────────── (any active phase)
//!
//!   (any active phase) ── will change ──▶ TransitioningConfiguration
//!                      ◀─ relayout done ─┘   (previous phase restored)
//! ```
//!
//! # Invariants
//!
//! 1. At most one step is visible; the outgoing step's hide completes before
//!    the next step is staged.
//! 2. The overlay reveal completes before the first step is staged.
//! 3. At most one transition is in flight. `show_next` during a transition is
//!    dropped; `pause`/`resume` are deferred until it settles.
//! 4. `did_end` fires exactly once per run.
//! 5. Completions carry the run generation; anything from another generation
//!    is discarded, so nothing fires after a run has stopped.
//! 6. A configuration change tears down before it re-lays out, and overrides
//!    any deferred pause/resume. Notifications arriving while one is being
//!    handled are coalesced into it.
//!
//! # Dispatch
//!
//! Collaborators hand completions back either synchronously (inside
//! [`Progress::Finished`]) or later through [`TutorialStateMachine::complete`]
//! / [`TutorialStateMachine::advance_animations`]. Both paths go through one
//! queue drained in a loop, so a chain of instant transitions never recurses.

use std::collections::VecDeque;
use std::fmt;

use bitflags::bitflags;
use coachmark_core::{ConfigurationChange, Interaction, Point};
use coachmark_layout::{CoachMark, CoachMarkLayout, GeometryResolver};
use web_time::Duration;

use crate::config::TutorialConfig;
use crate::display::{DisplayCoordinator, PresentRequest};
use crate::error::SequenceError;
use crate::overlay::{HitTest, OverlayCoordinator};
use crate::source::{CoachMarksDataSource, CoachMarksDelegate, NoopDelegate, SkipControl};
use crate::transition::{AfterHide, Completion, Continuation, Progress, StagedStep};
use crate::views::CoachMarkViews;

/// Sequencer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No run.
    #[default]
    Idle,
    /// A step is on screen and settled.
    Presenting,
    /// Between two steps (or before the first one).
    IdleBetweenSteps,
    /// Paused by the caller.
    Paused,
    /// Re-laying out after a container change.
    TransitioningConfiguration,
    /// Tearing the run down.
    Stopping,
}

impl Phase {
    /// Stable label for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::IdleBetweenSteps => "idle_between_steps",
            Self::Paused => "paused",
            Self::TransitioningConfiguration => "transitioning_configuration",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Visual layers a pause can hide.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Layers: u8 {
        /// The dimming overlay (and its cutout).
        const OVERLAY = 0b01;
        /// The callout.
        const CONTENT = 0b10;
    }
}

/// What pausing does visually. Chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PauseAction {
    HideOverlayAndContent,
    HideOverlayOnly,
    #[default]
    DoNothing,
}

impl PauseAction {
    /// Layers this action hides.
    pub const fn hidden_layers(self) -> Layers {
        match self {
            Self::HideOverlayAndContent => Layers::OVERLAY.union(Layers::CONTENT),
            Self::HideOverlayOnly => Layers::OVERLAY,
            Self::DoNothing => Layers::empty(),
        }
    }
}

/// Snapshot of the sequencing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceState {
    /// Current step; `None` before the first one.
    pub index: Option<usize>,
    /// Step count, fixed at `start`.
    pub count: usize,
    pub phase: Phase,
    pub pause_action: PauseAction,
}

#[derive(Debug, Clone, Copy)]
struct ConfigCycle {
    resume_to: Phase,
    change: Option<ConfigurationChange>,
    torn_down: bool,
    relaying: bool,
}

/// Sequences coach marks over an application's screen.
///
/// Built from its collaborators: a geometry resolver, an overlay coordinator
/// and a display coordinator. The data source and delegate are installed
/// separately and may be swapped between runs.
pub struct TutorialStateMachine<O, D> {
    resolver: GeometryResolver,
    overlay: O,
    display: D,
    data_source: Option<Box<dyn CoachMarksDataSource>>,
    delegate: Box<dyn CoachMarksDelegate>,
    config: TutorialConfig,
    state: SequenceState,
    generation: u64,
    in_flight: bool,
    /// Shown and settled.
    current: Option<StagedStep>,
    /// `will_hide` sent, `did_hide` pending.
    leaving: Option<StagedStep>,
    /// The display has (or is getting) a callout that was not hidden yet.
    view_visible: bool,
    hidden_layers: Layers,
    config_cycle: Option<ConfigCycle>,
    pending_pause: bool,
    pending_resume: bool,
    stop_skipped: bool,
    ready: VecDeque<Completion>,
    draining: bool,
}

impl<O, D> fmt::Debug for TutorialStateMachine<O, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TutorialStateMachine")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .field("has_data_source", &self.data_source.is_some())
            .finish_non_exhaustive()
    }
}

impl<O: OverlayCoordinator, D: DisplayCoordinator> TutorialStateMachine<O, D> {
    /// Create an idle machine.
    pub fn new(resolver: GeometryResolver, overlay: O, display: D) -> Self {
        Self {
            resolver,
            overlay,
            display,
            data_source: None,
            delegate: Box::new(NoopDelegate),
            config: TutorialConfig::default(),
            state: SequenceState::default(),
            generation: 0,
            in_flight: false,
            current: None,
            leaving: None,
            view_visible: false,
            hidden_layers: Layers::empty(),
            config_cycle: None,
            pending_pause: false,
            pending_resume: false,
            stop_skipped: false,
            ready: VecDeque::new(),
            draining: false,
        }
    }

    /// Install the data source. The step count is read again at the next
    /// `start` only.
    pub fn set_data_source(&mut self, source: Box<dyn CoachMarksDataSource>) {
        self.data_source = Some(source);
    }

    /// Install the delegate.
    pub fn set_delegate(&mut self, delegate: Box<dyn CoachMarksDelegate>) {
        self.delegate = delegate;
    }

    /// Builder form of [`set_data_source`](Self::set_data_source).
    #[must_use]
    pub fn with_data_source(mut self, source: Box<dyn CoachMarksDataSource>) -> Self {
        self.set_data_source(source);
        self
    }

    /// Builder form of [`set_delegate`](Self::set_delegate).
    #[must_use]
    pub fn with_delegate(mut self, delegate: Box<dyn CoachMarksDelegate>) -> Self {
        self.set_delegate(delegate);
        self
    }

    // --- queries ------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Current step index; `None` before the first step or when idle.
    pub fn index(&self) -> Option<usize> {
        self.state.index
    }

    /// Step count of the current run (0 when idle).
    pub fn count(&self) -> usize {
        self.state.count
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// A run is active.
    pub fn is_started(&self) -> bool {
        self.state.phase != Phase::Idle
    }

    /// Paused, or paused underneath a configuration change.
    pub fn is_paused(&self) -> bool {
        self.effective_phase() == Phase::Paused
    }

    /// A transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.in_flight
    }

    /// Run generation; bumps at every start and stop.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record of the step on screen.
    pub fn current_coach_mark(&self) -> Option<&CoachMark> {
        self.current.as_ref().map(|step| &step.record)
    }

    /// Layout of the step on screen.
    pub fn current_layout(&self) -> Option<&CoachMarkLayout> {
        self.current.as_ref().map(|step| &step.layout)
    }

    /// Configuration of the current (or last) run.
    pub fn config(&self) -> &TutorialConfig {
        &self.config
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    // --- commands -----------------------------------------------------------

    /// Start a run. Logs and does nothing if the machine is not idle, no data
    /// source is set, or the data source has no steps.
    pub fn start(&mut self, config: TutorialConfig) {
        let _ = self.try_start(config);
    }

    /// [`start`](Self::start), reporting why nothing happened.
    ///
    /// # Errors
    ///
    /// [`SequenceError::AlreadyRunning`] when not idle,
    /// [`SequenceError::NoDataSource`] and [`SequenceError::EmptySequence`]
    /// for misconfiguration. The machine stays as it was in every case.
    pub fn try_start(&mut self, config: TutorialConfig) -> Result<(), SequenceError> {
        if self.state.phase != Phase::Idle {
            tracing::debug!(phase = %self.state.phase, "start ignored; run already active");
            return Err(SequenceError::AlreadyRunning {
                phase: self.state.phase,
            });
        }
        let Some(source) = self.data_source.as_ref() else {
            tracing::warn!("cannot start tutorial: no data source set");
            return Err(SequenceError::NoDataSource);
        };
        let count = source.number_of_steps();
        if count == 0 {
            tracing::warn!("cannot start tutorial: data source reported no steps");
            return Err(SequenceError::EmptySequence);
        }

        self.generation += 1;
        let span = tracing::info_span!("coachmark.run", generation = self.generation, count);
        let _guard = span.enter();

        self.config = config;
        self.state = SequenceState {
            index: None,
            count,
            phase: Phase::IdleBetweenSteps,
            pause_action: PauseAction::default(),
        };
        self.in_flight = true;
        self.overlay.prepare(&self.config.overlay);
        self.show_skip_control();
        tracing::info!(count, direction = ?self.config.layout_direction, "tutorial started");

        let completion = self.issue(Continuation::OverlayShown);
        let progress =
            self.overlay
                .show_overlay(true, self.config.overlay.fade_duration(), completion);
        self.drive(progress);
        Ok(())
    }

    /// Dismiss the current step and show the next one.
    pub fn show_next(&mut self) {
        if self.in_flight {
            tracing::debug!(phase = %self.state.phase, "show_next dropped; transition in flight");
            return;
        }
        if self.state.phase != Phase::Presenting {
            tracing::warn!(phase = %self.state.phase, "show_next ignored; not presenting");
            return;
        }
        let Some(step) = self.current.take() else {
            return;
        };
        self.delegate.will_hide(&step.record, step.index);
        let duration = step.record.animation_duration;
        self.leaving = Some(step);
        self.state.phase = Phase::IdleBetweenSteps;
        self.in_flight = true;
        let completion = self.issue(Continuation::StepHidden {
            next: AfterHide::Advance,
        });
        let progress = self.display.hide(duration, completion);
        self.drive(progress);
    }

    /// Pause, applying `action` visually. The index is kept.
    pub fn pause(&mut self, action: PauseAction) {
        let _ = self.try_pause(action);
    }

    /// [`pause`](Self::pause), reporting a call in the wrong phase.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidPhase`] unless presenting or between steps.
    pub fn try_pause(&mut self, action: PauseAction) -> Result<(), SequenceError> {
        let phase = self.effective_phase();
        if !matches!(phase, Phase::Presenting | Phase::IdleBetweenSteps) {
            tracing::warn!(phase = %phase, "pause ignored; nothing to pause");
            return Err(SequenceError::InvalidPhase {
                operation: "pause",
                phase,
            });
        }
        self.state.pause_action = action;
        self.pending_resume = false;
        self.set_effective_phase(Phase::Paused);
        if self.in_flight || self.config_cycle.is_some() {
            tracing::debug!(?action, "pause visuals deferred until the transition settles");
            self.pending_pause = true;
            return Ok(());
        }
        self.apply_pause();
        Ok(())
    }

    /// Resume a paused run, re-presenting the current step with geometry
    /// recomputed against the current container.
    pub fn resume(&mut self) {
        let _ = self.try_resume();
    }

    /// [`resume`](Self::resume), reporting a call in the wrong phase.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidPhase`] unless paused.
    pub fn try_resume(&mut self) -> Result<(), SequenceError> {
        let phase = self.effective_phase();
        if phase != Phase::Paused {
            tracing::warn!(phase = %phase, "resume ignored; not paused");
            return Err(SequenceError::InvalidPhase {
                operation: "resume",
                phase,
            });
        }
        // Pause visuals that never ran have nothing to undo.
        self.pending_pause = false;
        if self.in_flight || self.config_cycle.is_some() {
            tracing::debug!("resume deferred until the transition settles");
            self.pending_resume = true;
            return Ok(());
        }
        self.do_resume();
        Ok(())
    }

    /// While paused, fetch and resolve the current step again and re-present
    /// it without animation if it is visible.
    pub fn update_current_coach_mark(&mut self) {
        let _ = self.try_update_current_coach_mark();
    }

    /// [`update_current_coach_mark`](Self::update_current_coach_mark),
    /// reporting a call in the wrong phase.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidPhase`] unless paused with nothing in flight.
    pub fn try_update_current_coach_mark(&mut self) -> Result<(), SequenceError> {
        let phase = self.state.phase;
        if phase != Phase::Paused || self.in_flight {
            tracing::warn!(phase = %phase, in_flight = self.in_flight, "update_current_coach_mark ignored");
            return Err(SequenceError::InvalidPhase {
                operation: "update_current_coach_mark",
                phase,
            });
        }
        if !self.view_visible {
            tracing::debug!("current coach mark hidden; it is refreshed on resume");
            return Ok(());
        }
        self.in_flight = true;
        let completion = self.issue(Continuation::StepHidden {
            next: AfterHide::Refresh,
        });
        let progress = self.display.hide(Duration::ZERO, completion);
        self.drive(progress);
        Ok(())
    }

    /// End the run with `did_end(skipped: true)`.
    ///
    /// `immediate` snaps every animation to its end and tears down at once;
    /// otherwise the step, cutout and overlay fade out first.
    pub fn stop(&mut self, immediate: bool) {
        match self.state.phase {
            Phase::Idle => tracing::debug!("stop ignored; no active run"),
            Phase::Stopping if !immediate => tracing::debug!("stop ignored; already stopping"),
            Phase::Stopping => {
                self.generation += 1;
                self.finish_now(self.stop_skipped);
            }
            _ => self.begin_stop(true, immediate),
        }
        self.drain();
    }

    /// Route a user interaction.
    pub fn handle_interaction(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::OverlayTap(point) => self.on_overlay_tap(point),
            Interaction::CoachMarkTap => self.on_coach_mark_tap(),
            Interaction::SkipTap => self.on_skip_tap(),
        }
    }

    /// Tap on the overlay at `point`. Advances when overlay taps are allowed
    /// by the configuration, the step and the delegate.
    pub fn on_overlay_tap(&mut self, point: Point) {
        if self.state.phase != Phase::Presenting || self.in_flight {
            tracing::debug!(phase = %self.state.phase, "overlay tap ignored");
            return;
        }
        if !self.config.overlay.allow_tap {
            tracing::debug!("overlay tap ignored; taps disabled");
            return;
        }
        let Some(step) = self.current.as_ref() else {
            return;
        };
        if step.record.disable_overlay_tap {
            tracing::debug!(index = step.index, "overlay tap ignored; disabled for step");
            return;
        }
        let index = step.index;
        let hit = self.overlay.hit_test(point);
        if hit != HitTest::Overlay {
            tracing::debug!(index, ?hit, "tap not on the overlay");
            return;
        }
        if !self.delegate.should_handle_overlay_tap(index) {
            tracing::debug!(index, "overlay tap declined by delegate");
            return;
        }
        self.show_next();
    }

    /// Tap on the callout body.
    pub fn on_coach_mark_tap(&mut self) {
        if self.state.phase != Phase::Presenting || self.in_flight {
            tracing::debug!(phase = %self.state.phase, "coach mark tap ignored");
            return;
        }
        self.show_next();
    }

    /// Tap on the skip control: animated stop, `skipped = true`.
    pub fn on_skip_tap(&mut self) {
        if self.state.phase == Phase::Idle {
            tracing::debug!("skip tap ignored; no active run");
            return;
        }
        tracing::info!(index = ?self.state.index, "tutorial skipped");
        self.stop(false);
    }

    /// The container is about to change (rotation, size class, status bar).
    pub fn on_configuration_will_change(&mut self) {
        if matches!(self.state.phase, Phase::Idle | Phase::Stopping) {
            tracing::debug!(phase = %self.state.phase, "configuration change ignored; no active run");
            return;
        }
        if self.config_cycle.is_some() {
            tracing::debug!("configuration change coalesced into the one in progress");
            return;
        }
        tracing::debug!(phase = %self.state.phase, "configuration will change");
        self.config_cycle = Some(ConfigCycle {
            resume_to: self.state.phase,
            change: None,
            torn_down: false,
            relaying: false,
        });
        self.state.phase = Phase::TransitioningConfiguration;
        self.overlay.will_transition();
        self.settle();
        self.drain();
    }

    /// The container changed. Ignored unless announced by
    /// [`on_configuration_will_change`](Self::on_configuration_will_change).
    pub fn on_configuration_did_change(&mut self, change: ConfigurationChange) {
        let Some(cycle) = self.config_cycle.as_mut() else {
            tracing::debug!(%change, "configuration change ignored; none announced");
            return;
        };
        if cycle.relaying {
            tracing::debug!(%change, "configuration change coalesced into the relayout in progress");
            return;
        }
        if let Some(first) = cycle.change {
            tracing::debug!(%first, %change, "configuration change coalesced");
            return;
        }
        cycle.change = Some(change);
        if cycle.torn_down {
            self.relayout();
        }
        self.drain();
    }

    /// Hand back a completion a collaborator finished asynchronously.
    pub fn complete(&mut self, completion: Completion) {
        self.ready.push_back(completion);
        self.drain();
    }

    /// Advance both collaborators' animations and continue with whatever
    /// finished.
    pub fn advance_animations(&mut self, elapsed: Duration) {
        let mut done = self.overlay.tick(elapsed);
        done.extend(self.display.tick(elapsed));
        self.ready.extend(done);
        self.drain();
    }

    // --- dispatch -----------------------------------------------------------

    fn issue(&self, continuation: Continuation) -> Completion {
        Completion::new(self.generation, continuation)
    }

    fn drive(&mut self, progress: Progress) {
        if let Progress::Finished(completion) = progress {
            self.ready.push_back(completion);
        }
        self.drain();
    }

    fn drain(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        while let Some(completion) = self.ready.pop_front() {
            if completion.generation != self.generation {
                tracing::debug!(
                    label = completion.label(),
                    stale = completion.generation,
                    generation = self.generation,
                    "stale completion discarded"
                );
                continue;
            }
            self.dispatch(completion.continuation);
        }
        self.draining = false;
    }

    fn dispatch(&mut self, continuation: Continuation) {
        tracing::trace!(label = continuation.label(), "transition finished");
        match continuation {
            Continuation::OverlayShown => self.advance(),
            Continuation::StepHidden { next } => self.on_step_hidden(next),
            Continuation::CutoutHidden { next } => self.on_cutout_hidden(next),
            Continuation::CutoutShown { step, views } => self.present(step, views),
            Continuation::StepShown { step } => self.on_step_shown(step),
            Continuation::PauseLayerHidden { layer, remaining } => {
                self.hidden_layers |= layer;
                if layer.contains(Layers::CONTENT) {
                    self.view_visible = false;
                }
                self.hide_layers(remaining);
            }
            Continuation::ResumeOverlayShown => {
                self.hidden_layers.remove(Layers::OVERLAY);
                self.replay();
            }
            Continuation::ConfigurationTornDown => self.on_torn_down(),
            Continuation::OverlayHidden { skipped } => self.end_run(skipped),
        }
    }

    // --- stepping -----------------------------------------------------------

    fn advance(&mut self) {
        loop {
            let next = self.state.index.map_or(0, |index| index + 1);
            if next >= self.state.count {
                tracing::debug!(count = self.state.count, "all steps shown");
                self.begin_stop(false, false);
                return;
            }
            self.state.index = Some(next);
            if self.delegate.should_load_configuration(next) {
                self.stage(next, None, true);
                return;
            }
            tracing::debug!(index = next, "step skipped by delegate");
        }
    }

    fn stage(&mut self, index: usize, change: Option<ConfigurationChange>, animated: bool) {
        let Some(source) = self.data_source.as_ref() else {
            tracing::warn!(index, "data source missing mid-run; ending the tutorial");
            self.begin_stop(false, true);
            return;
        };
        let record = source.configuration_for_step(index);
        let container = self.display.container_region();
        if container.is_none() {
            tracing::warn!(index, "no container region; using the degenerate layout");
        }
        let resolver = self.resolver;
        let resolve = |record: &CoachMark| match container {
            Some(container) => resolver.compute_metadata(record, &container),
            None => record.clone(),
        };

        let mut record = resolve(&record);
        let anchor = record.cutout_region.clone();
        self.delegate.will_show(&mut record, change, index);
        if record.cutout_region != anchor {
            // Derived values belong to the old cutout.
            record.invalidate_metadata();
        }
        // Fills in anything the delegate cleared; keeps what it set.
        let record = resolve(&record);
        let layout = resolver.resolve_layout(
            &record,
            container,
            self.config.layout_direction,
            self.display.safe_area_compensation(),
        );
        let views = source.views_for_step(index, &record);

        let cutout = if layout.is_degenerate() {
            None
        } else {
            record.cutout_region.clone()
        };
        self.overlay
            .set_cutout(cutout, record.allow_touch_inside_cutout);
        let duration = if animated {
            record.animation_duration
        } else {
            Duration::ZERO
        };
        tracing::debug!(
            index,
            change = ?change,
            vertical = ?layout.vertical_position,
            alignment = ?layout.alignment,
            degenerate = layout.is_degenerate(),
            "step staged"
        );

        self.in_flight = true;
        let step = StagedStep {
            index,
            record,
            layout,
            change,
            animated,
        };
        let completion = self.issue(Continuation::CutoutShown { step, views });
        let progress = self.overlay.show_cutout(true, duration, completion);
        self.drive(progress);
    }

    fn present(&mut self, step: StagedStep, views: CoachMarkViews) {
        let duration = if step.animated {
            step.record.animation_duration
        } else {
            Duration::ZERO
        };
        let request = PresentRequest {
            index: step.index,
            record: step.record.clone(),
            layout: step.layout.clone(),
            views,
        };
        self.view_visible = true;
        let completion = self.issue(Continuation::StepShown { step });
        let progress = self.display.present(request, duration, completion);
        self.drive(progress);
    }

    fn on_step_shown(&mut self, step: StagedStep) {
        self.in_flight = false;
        if self.state.phase == Phase::IdleBetweenSteps {
            self.state.phase = Phase::Presenting;
        }
        if let Some(cycle) = self.config_cycle.as_mut() {
            if cycle.relaying {
                self.config_cycle = None;
            } else if cycle.resume_to == Phase::IdleBetweenSteps {
                cycle.resume_to = Phase::Presenting;
            }
        }
        tracing::debug!(index = step.index, phase = %self.state.phase, "step shown");
        self.delegate.did_show(&step.record, step.change, step.index);
        self.current = Some(step);
        self.settle();
    }

    fn on_step_hidden(&mut self, next: AfterHide) {
        self.view_visible = false;
        match next {
            AfterHide::Replay | AfterHide::Refresh => {
                self.current = None;
                match self.state.index {
                    Some(index) => self.stage(index, None, next == AfterHide::Replay),
                    None => self.advance(),
                }
            }
            AfterHide::Advance | AfterHide::Stop { .. } => {
                let duration = self
                    .leaving
                    .as_ref()
                    .map_or(Duration::ZERO, |step| step.record.animation_duration);
                let completion = self.issue(Continuation::CutoutHidden { next });
                let progress = self.overlay.show_cutout(false, duration, completion);
                self.drive(progress);
            }
        }
    }

    fn on_cutout_hidden(&mut self, next: AfterHide) {
        if let Some(step) = self.leaving.take() {
            tracing::debug!(index = step.index, "step hidden");
            self.delegate.did_hide(&step.record, step.index);
        }
        self.overlay.set_cutout(None, false);
        match next {
            AfterHide::Stop { skipped } => self.hide_overlay_and_end(skipped),
            AfterHide::Advance | AfterHide::Replay | AfterHide::Refresh => self.advance(),
        }
    }

    // --- settling: configuration, pause, resume ------------------------------

    fn settle(&mut self) {
        if self.in_flight {
            return;
        }
        if self.config_cycle.is_some_and(|cycle| !cycle.torn_down) {
            self.tear_down_for_configuration();
        } else if self.config_cycle.is_some() {
            // Waiting for the did-change notification.
        } else if self.pending_pause {
            self.apply_pause();
        } else if self.pending_resume {
            self.pending_resume = false;
            self.do_resume();
        }
    }

    fn effective_phase(&self) -> Phase {
        match (self.state.phase, self.config_cycle) {
            (Phase::TransitioningConfiguration, Some(cycle)) => cycle.resume_to,
            (phase, _) => phase,
        }
    }

    fn set_effective_phase(&mut self, phase: Phase) {
        match (self.state.phase, self.config_cycle.as_mut()) {
            (Phase::TransitioningConfiguration, Some(cycle)) => cycle.resume_to = phase,
            _ => self.state.phase = phase,
        }
    }

    fn tear_down_for_configuration(&mut self) {
        if !self.view_visible {
            self.on_torn_down();
            return;
        }
        self.in_flight = true;
        let completion = self.issue(Continuation::ConfigurationTornDown);
        let progress = self.display.hide(Duration::ZERO, completion);
        self.drive(progress);
    }

    fn on_torn_down(&mut self) {
        self.in_flight = false;
        self.view_visible = false;
        let Some(cycle) = self.config_cycle.as_mut() else {
            return;
        };
        cycle.torn_down = true;
        tracing::debug!("configuration teardown complete");
        if cycle.change.is_some() {
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        let Some(cycle) = self.config_cycle.as_mut() else {
            return;
        };
        let Some(change) = cycle.change else {
            return;
        };
        cycle.relaying = true;
        let resume_to = cycle.resume_to;
        self.state.phase = resume_to;
        self.overlay.did_transition();

        let stays_hidden = resume_to == Phase::Paused
            && self.state.pause_action == PauseAction::HideOverlayAndContent;
        tracing::debug!(%change, phase = %resume_to, stays_hidden, "relayout after configuration change");
        match self.state.index {
            Some(index) if !stays_hidden => {
                self.current = None;
                self.stage(index, Some(change), false);
            }
            _ => {
                if stays_hidden {
                    self.hidden_layers |= Layers::CONTENT;
                }
                self.config_cycle = None;
                self.settle();
            }
        }
    }

    fn apply_pause(&mut self) {
        self.pending_pause = false;
        let action = self.state.pause_action;
        tracing::debug!(?action, index = ?self.state.index, "pause applied");
        self.hide_layers(action.hidden_layers());
    }

    fn hide_layers(&mut self, layers: Layers) {
        let duration = self.config.pause_duration();
        if layers.contains(Layers::CONTENT) && self.view_visible {
            self.in_flight = true;
            let completion = self.issue(Continuation::PauseLayerHidden {
                layer: Layers::CONTENT,
                remaining: layers - Layers::CONTENT,
            });
            let progress = self.display.hide(duration, completion);
            self.drive(progress);
            return;
        }
        if layers.contains(Layers::OVERLAY) && self.overlay.is_overlay_visible() {
            self.in_flight = true;
            let completion = self.issue(Continuation::PauseLayerHidden {
                layer: Layers::OVERLAY,
                remaining: layers - Layers::OVERLAY,
            });
            let progress = self.overlay.show_overlay(false, duration, completion);
            self.drive(progress);
            return;
        }
        self.in_flight = false;
        self.settle();
    }

    fn do_resume(&mut self) {
        tracing::debug!(index = ?self.state.index, hidden = ?self.hidden_layers, "resuming");
        self.state.phase = Phase::IdleBetweenSteps;
        if self.hidden_layers.contains(Layers::OVERLAY) {
            self.in_flight = true;
            let completion = self.issue(Continuation::ResumeOverlayShown);
            let progress = self
                .overlay
                .show_overlay(true, self.config.pause_duration(), completion);
            self.drive(progress);
        } else {
            self.replay();
        }
    }

    fn replay(&mut self) {
        self.hidden_layers = Layers::empty();
        self.in_flight = true;
        if self.view_visible {
            let completion = self.issue(Continuation::StepHidden {
                next: AfterHide::Replay,
            });
            let progress = self.display.hide(Duration::ZERO, completion);
            self.drive(progress);
            return;
        }
        self.current = None;
        match self.state.index {
            Some(index) => self.stage(index, None, true),
            None => self.advance(),
        }
    }

    // --- stopping -----------------------------------------------------------

    fn begin_stop(&mut self, skipped: bool, immediate: bool) {
        tracing::debug!(skipped, immediate, index = ?self.state.index, "stopping");
        self.generation += 1;
        self.state.phase = Phase::Stopping;
        self.stop_skipped = skipped;
        self.pending_pause = false;
        self.pending_resume = false;
        self.config_cycle = None;
        if immediate {
            self.finish_now(skipped);
            return;
        }

        self.in_flight = true;
        if let Some(step) = self.current.take() {
            self.delegate.will_hide(&step.record, step.index);
            self.leaving = Some(step);
        }
        if self.view_visible {
            let duration = self
                .leaving
                .as_ref()
                .map_or(Duration::ZERO, |step| step.record.animation_duration);
            let completion = self.issue(Continuation::StepHidden {
                next: AfterHide::Stop { skipped },
            });
            let progress = self.display.hide(duration, completion);
            self.drive(progress);
        } else {
            if let Some(step) = self.leaving.take() {
                self.delegate.did_hide(&step.record, step.index);
            }
            self.hide_overlay_and_end(skipped);
        }
    }

    fn finish_now(&mut self, skipped: bool) {
        // Everything returned here belongs to an older generation.
        self.ready.extend(self.overlay.finish_animations());
        self.ready.extend(self.display.finish_animations());
        if let Some(step) = self.current.take() {
            self.delegate.will_hide(&step.record, step.index);
            self.delegate.did_hide(&step.record, step.index);
        }
        if let Some(step) = self.leaving.take() {
            self.delegate.did_hide(&step.record, step.index);
        }
        self.end_run(skipped);
    }

    fn hide_overlay_and_end(&mut self, skipped: bool) {
        self.display.hide_skip_control();
        let completion = self.issue(Continuation::OverlayHidden { skipped });
        let progress =
            self.overlay
                .show_overlay(false, self.config.overlay.fade_duration(), completion);
        self.drive(progress);
    }

    fn end_run(&mut self, skipped: bool) {
        let count = self.state.count;
        let last_index = self.state.index;
        self.display.teardown();
        self.overlay.teardown();
        self.state = SequenceState::default();
        self.current = None;
        self.leaving = None;
        self.view_visible = false;
        self.in_flight = false;
        self.hidden_layers = Layers::empty();
        self.config_cycle = None;
        self.pending_pause = false;
        self.pending_resume = false;
        self.stop_skipped = false;
        self.generation += 1;
        tracing::info!(skipped, count, last_index = ?last_index, "tutorial ended");
        self.delegate.did_end(skipped);
    }

    fn show_skip_control(&mut self) {
        let Some(config) = self.config.skip_control.as_ref() else {
            return;
        };
        let skip = SkipControl {
            title: config.title.clone(),
            size: config.size,
        };
        let container = self.display.container_region().unwrap_or_default();
        let direction = self.config.layout_direction;
        let constraints = self
            .data_source
            .as_ref()
            .and_then(|source| source.constraints_for_skip_control(&skip, container))
            .unwrap_or_else(|| SkipControl::default_constraints(direction));
        self.display.show_skip_control(&skip, &constraints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{CoachMarkDisplay, PresentationContext};
    use crate::overlay::OverlayManager;
    use crate::views::ContentView;
    use coachmark_core::{Rect, Size};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Block;

    impl ContentView for Block {
        fn measure(&self, max_width: f64) -> Size {
            Size::new(max_width.min(120.0), 40.0)
        }
    }

    struct Steps(usize);

    impl CoachMarksDataSource for Steps {
        fn number_of_steps(&self) -> usize {
            self.0
        }

        fn configuration_for_step(&self, index: usize) -> CoachMark {
            CoachMark::new()
                .cutout(Rect::new(10.0, 40.0 * index as f64, 40.0, 30.0))
                .animation_duration(Duration::ZERO)
        }

        fn views_for_step(&self, _index: usize, _record: &CoachMark) -> CoachMarkViews {
            CoachMarkViews::content_only(Block)
        }
    }

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl CoachMarksDelegate for Log {
        fn did_show(&mut self, _: &CoachMark, change: Option<ConfigurationChange>, index: usize) {
            let suffix = change.map(|c| format!(" ({c})")).unwrap_or_default();
            self.0.borrow_mut().push(format!("show {index}{suffix}"));
        }

        fn did_hide(&mut self, _: &CoachMark, index: usize) {
            self.0.borrow_mut().push(format!("hide {index}"));
        }

        fn did_end(&mut self, skipped: bool) {
            self.0.borrow_mut().push(format!("end {skipped}"));
        }
    }

    fn instant_config() -> TutorialConfig {
        let mut config = TutorialConfig::default();
        config.overlay.fade_duration_ms = 0;
        config.pause_duration_ms = 0;
        config
    }

    fn machine(steps: usize) -> (TutorialStateMachine<OverlayManager, CoachMarkDisplay>, Log) {
        let log = Log::default();
        let machine = TutorialStateMachine::new(
            GeometryResolver::new(),
            OverlayManager::default(),
            CoachMarkDisplay::new(
                PresentationContext::default(),
                Some(Rect::from_size(320.0, 480.0)),
            ),
        )
        .with_data_source(Box::new(Steps(steps)))
        .with_delegate(Box::new(log.clone()));
        (machine, log)
    }

    #[test]
    fn instant_run_goes_through_every_step() {
        let (mut m, log) = machine(3);
        m.start(instant_config());
        assert_eq!(m.phase(), Phase::Presenting);
        assert_eq!(m.index(), Some(0));
        m.show_next();
        m.show_next();
        m.show_next();
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(
            log.take(),
            ["show 0", "hide 0", "show 1", "hide 1", "show 2", "hide 2", "end false"]
        );
    }

    #[test]
    fn start_twice_is_rejected() {
        let (mut m, _log) = machine(2);
        m.start(instant_config());
        assert_eq!(
            m.try_start(instant_config()),
            Err(SequenceError::AlreadyRunning {
                phase: Phase::Presenting
            })
        );
        assert_eq!(m.index(), Some(0));
    }

    #[test]
    fn misconfiguration_keeps_machine_idle() {
        let (mut m, log) = machine(0);
        assert_eq!(m.try_start(instant_config()), Err(SequenceError::EmptySequence));
        assert_eq!(m.phase(), Phase::Idle);

        let mut bare = TutorialStateMachine::new(
            GeometryResolver::new(),
            OverlayManager::default(),
            CoachMarkDisplay::new(PresentationContext::default(), None),
        );
        assert_eq!(bare.try_start(instant_config()), Err(SequenceError::NoDataSource));
        assert!(log.take().is_empty());
    }

    #[test]
    fn show_next_waits_for_running_transition() {
        let (mut m, log) = machine(3);
        let mut config = instant_config();
        config.overlay.fade_duration_ms = 100;
        m.start(config);
        // Overlay still fading in: nothing shown yet, show_next is dropped.
        assert!(m.is_transitioning());
        m.show_next();
        m.advance_animations(Duration::from_millis(100));
        assert_eq!(m.index(), Some(0));
        assert_eq!(log.take(), ["show 0"]);
    }

    #[test]
    fn pause_and_resume_replay_same_index() {
        let (mut m, log) = machine(2);
        m.start(instant_config());
        m.pause(PauseAction::HideOverlayAndContent);
        assert!(m.is_paused());
        assert!(!m.overlay().is_overlay_visible());
        assert!(m.display().presented().is_none());
        m.resume();
        assert_eq!(m.phase(), Phase::Presenting);
        assert_eq!(m.index(), Some(0));
        assert!(m.overlay().is_overlay_visible());
        assert_eq!(log.take(), ["show 0", "show 0"]);
    }

    #[test]
    fn resume_when_not_paused_is_ignored() {
        let (mut m, log) = machine(2);
        m.start(instant_config());
        log.take();
        m.resume();
        assert_eq!(m.phase(), Phase::Presenting);
        assert!(log.take().is_empty());
    }

    #[test]
    fn immediate_stop_ends_once() {
        let (mut m, log) = machine(2);
        let mut config = instant_config();
        config.overlay.fade_duration_ms = 100;
        m.start(config);
        m.stop(true);
        m.stop(true);
        // Late ticks return stale completions only.
        m.advance_animations(Duration::from_millis(500));
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(log.take(), ["end true"]);
    }

    #[test]
    fn configuration_change_relays_out_current_step() {
        let (mut m, log) = machine(2);
        m.start(instant_config());
        m.on_configuration_will_change();
        assert_eq!(m.phase(), Phase::TransitioningConfiguration);
        m.on_configuration_will_change();
        m.display_mut()
            .set_container(Some(Rect::from_size(480.0, 320.0)));
        m.on_configuration_did_change(ConfigurationChange::Size);
        m.on_configuration_did_change(ConfigurationChange::StatusBar);
        assert_eq!(m.phase(), Phase::Presenting);
        assert_eq!(m.index(), Some(0));
        assert_eq!(
            m.current_layout().and_then(|l| l.container),
            Some(Rect::from_size(480.0, 320.0))
        );
        assert_eq!(log.take(), ["show 0", "show 0 (size)"]);
    }

    #[test]
    fn out_of_phase_calls_report_errors() {
        let (mut m, _log) = machine(2);
        assert_eq!(
            m.try_resume(),
            Err(SequenceError::InvalidPhase {
                operation: "resume",
                phase: Phase::Idle
            })
        );
        assert!(m.try_pause(PauseAction::DoNothing).is_err());
        m.start(instant_config());
        assert!(m.try_update_current_coach_mark().is_err());
        assert_eq!(m.try_pause(PauseAction::DoNothing), Ok(()));
        assert_eq!(m.try_update_current_coach_mark(), Ok(()));
        assert_eq!(m.phase(), Phase::Paused);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::IdleBetweenSteps.to_string(), "idle_between_steps");
        assert_eq!(
            PauseAction::HideOverlayAndContent.hidden_layers(),
            Layers::OVERLAY | Layers::CONTENT
        );
        assert!(PauseAction::DoNothing.hidden_layers().is_empty());
    }
}
