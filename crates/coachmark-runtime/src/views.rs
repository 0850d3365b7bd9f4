#![forbid(unsafe_code)]

//! View contracts for the callout body and its pointer.
//!
//! Drawing is the host's business. The runtime only needs to ask a body how
//! big it wants to be for a given width budget and to tell a pointer which
//! way it faces.

use std::fmt;

use coachmark_core::Size;
use coachmark_layout::PointerOrientation;

/// Callout body.
pub trait ContentView: fmt::Debug {
    /// Preferred size when at most `max_width` wide.
    fn measure(&self, max_width: f64) -> Size;
}

/// Callout pointer ("arrow").
pub trait PointerView: fmt::Debug {
    /// Size of the pointer when facing up or down.
    fn size(&self) -> Size;

    /// Face the pointer. `None` hides it.
    fn set_orientation(&mut self, orientation: Option<PointerOrientation>) {
        let _ = orientation;
    }
}

/// Views for one step, produced by the data source.
#[derive(Debug)]
pub struct CoachMarkViews {
    pub content: Box<dyn ContentView>,
    pub pointer: Option<Box<dyn PointerView>>,
}

impl CoachMarkViews {
    /// A body with no pointer.
    pub fn content_only(content: impl ContentView + 'static) -> Self {
        Self {
            content: Box::new(content),
            pointer: None,
        }
    }

    /// A body with a pointer.
    pub fn with_pointer(
        content: impl ContentView + 'static,
        pointer: impl PointerView + 'static,
    ) -> Self {
        Self {
            content: Box::new(content),
            pointer: Some(Box::new(pointer)),
        }
    }
}
