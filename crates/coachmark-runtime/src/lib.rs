#![forbid(unsafe_code)]

//! Runtime: the tutorial state machine and its collaborators.
//!
//! # Role in coachmark
//! `coachmark-runtime` sequences a tutorial. It asks a
//! [`CoachMarksDataSource`] for steps, resolves each one with the
//! [`GeometryResolver`](coachmark_layout::GeometryResolver), and drives an
//! [`OverlayCoordinator`] (the dimming layer and its cutout) and a
//! [`DisplayCoordinator`] (the callout) through their transitions, telling a
//! [`CoachMarksDelegate`] what happened along the way.
//!
//! # Driving a run
//! The machine is single-threaded and owns no clock. Transitions either finish
//! synchronously or come back from
//! [`TutorialStateMachine::advance_animations`], which the host calls on every
//! frame with the elapsed time. Host events enter through
//! [`TutorialStateMachine::handle_interaction`] and the configuration-change
//! pair.
//!
//! # Key modules
//! - [`machine`]: [`TutorialStateMachine`], phases and pause actions.
//! - [`overlay`]: [`OverlayManager`] and its styles.
//! - [`display`]: [`CoachMarkDisplay`] and callout placement.
//! - [`source`]: data source and delegate contracts.
//! - [`config`]: [`TutorialConfig`], optionally loaded from TOML/JSON.

pub mod config;
pub mod display;
pub mod error;
pub mod machine;
pub mod overlay;
pub mod source;
pub mod transition;
pub mod views;

pub use config::{
    ConfigError, DEFAULT_FADE_DURATION_MS, DEFAULT_OVERLAY_COLOR, OverlayConfig,
    SkipControlConfig, TutorialConfig,
};
pub use display::{
    CalloutFrames, CoachMarkDisplay, DisplayCoordinator, PresentRequest, PresentationContext,
    PresentedCoachMark, PresentedSkipControl, place_callout,
};
pub use error::SequenceError;
pub use machine::{Layers, PauseAction, Phase, SequenceState, TutorialStateMachine};
pub use overlay::{
    Backdrop, BlurStyle, HitTest, OverlayCoordinator, OverlayManager, OverlaySnapshot,
    OverlayStyle, TranslucentStyle,
};
pub use source::{CoachMarksDataSource, CoachMarksDelegate, NoopDelegate, SkipControl};
pub use transition::{Completion, Fade, Progress};
pub use views::{CoachMarkViews, ContentView, PointerView};
