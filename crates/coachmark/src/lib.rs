#![forbid(unsafe_code)]

//! coachmark public facade.
//!
//! Re-exports the types a host needs to run a coach-mark tutorial: the
//! geometry vocabulary, step records and the resolver, and the state machine
//! with its in-crate overlay and display coordinators.
//!
//! ```
//! use coachmark::prelude::*;
//!
//! struct Tour;
//!
//! impl CoachMarksDataSource for Tour {
//!     fn number_of_steps(&self) -> usize {
//!         1
//!     }
//!
//!     fn configuration_for_step(&self, _index: usize) -> CoachMark {
//!         CoachMark::anchored_to(Rect::new(20.0, 40.0, 60.0, 30.0))
//!     }
//!
//!     fn views_for_step(&self, _index: usize, _record: &CoachMark) -> CoachMarkViews {
//!         CoachMarkViews::content_only(Body)
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Body;
//!
//! impl ContentView for Body {
//!     fn measure(&self, _max_width: f64) -> Size {
//!         Size::new(200.0, 48.0)
//!     }
//! }
//!
//! let mut tutorial = coachmark::tutorial(Rect::from_size(320.0, 480.0));
//! tutorial.set_data_source(Box::new(Tour));
//! tutorial.start(TutorialConfig::default());
//! assert!(tutorial.is_started());
//! ```

pub mod error;

pub use error::{Error, Recovery, Result};

// --- Core re-exports -------------------------------------------------------

pub use coachmark_core::{
    ConfigurationChange, GeometryError, Insets, Interaction, LayoutDirection, Point, Rect, Region,
    Rgba, Size,
};

// --- Layout re-exports -----------------------------------------------------

pub use coachmark_layout::{
    Attribute, CoachMark, CoachMarkLayout, ConstraintSet, GeometryResolver, HorizontalAlignment,
    PlacementConstraint, PointerOrientation, Priority, Relation, ResolvedVerticalPosition,
    VerticalPosition,
};

// --- Runtime re-exports ----------------------------------------------------

pub use coachmark_runtime::{
    Backdrop, BlurStyle, CoachMarkDisplay, CoachMarkViews, CoachMarksDataSource,
    CoachMarksDelegate, Completion, ConfigError, ContentView, DisplayCoordinator, HitTest, Layers,
    NoopDelegate, OverlayConfig, OverlayCoordinator, OverlayManager, PauseAction, Phase,
    PointerView, PresentationContext, Progress, SequenceError, SequenceState, SkipControl,
    SkipControlConfig, TranslucentStyle, TutorialConfig, TutorialStateMachine,
};

// --- Crate aliases ---------------------------------------------------------

pub use coachmark_core as core;
pub use coachmark_layout as layout;
pub use coachmark_runtime as runtime;

/// State machine wired to the in-crate coordinators.
pub type Tutorial = TutorialStateMachine<OverlayManager, CoachMarkDisplay>;

/// A [`Tutorial`] in its own window over `container`, with the default
/// overlay style.
pub fn tutorial(container: Rect) -> Tutorial {
    tutorial_in(PresentationContext::default(), container)
}

/// A [`Tutorial`] presented in `context` over `container`.
pub fn tutorial_in(context: PresentationContext, container: Rect) -> Tutorial {
    TutorialStateMachine::new(
        GeometryResolver::new(),
        OverlayManager::default(),
        CoachMarkDisplay::new(context, Some(container)),
    )
}

/// Load a [`TutorialConfig`], picking the format from the file extension
/// (`.json` is JSON, anything else TOML).
///
/// # Errors
///
/// I/O, parse and validation failures.
#[cfg(feature = "config")]
pub fn load_config(path: impl AsRef<std::path::Path>) -> Result<TutorialConfig> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        TutorialConfig::from_json_file(path)?
    } else {
        TutorialConfig::from_toml_file(path)?
    };
    tracing::debug!(path = %path.display(), json = is_json, "tutorial config loaded");
    Ok(config)
}

/// Install a global JSON log subscriber. See
/// [`coachmark_core::logging::init_json`].
#[cfg(feature = "tracing-json")]
pub use coachmark_core::logging::init_json;

/// Everything a host typically needs.
pub mod prelude {
    pub use crate::{
        CoachMark, CoachMarkViews, CoachMarksDataSource, CoachMarksDelegate, ConfigurationChange,
        ContentView, Error, Interaction, LayoutDirection, PauseAction, Phase, Point, PointerView,
        Rect, Result, Size, Tutorial, TutorialConfig,
    };
}
