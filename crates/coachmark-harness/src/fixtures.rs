#![forbid(unsafe_code)]

//! Scripted data sources and fixed-size views.

use std::cell::RefCell;
use std::rc::Rc;

use coachmark_core::{Rect, Size};
use coachmark_layout::{CoachMark, ConstraintSet, PointerOrientation};
use coachmark_runtime::{CoachMarkViews, CoachMarksDataSource, ContentView, PointerView, SkipControl};

/// Content that wants `preferred` and shrinks to fit the width it is given.
#[derive(Debug, Clone, Copy)]
pub struct FixedContent {
    pub preferred: Size,
}

impl FixedContent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            preferred: Size::new(width, height),
        }
    }
}

impl Default for FixedContent {
    fn default() -> Self {
        Self::new(240.0, 60.0)
    }
}

impl ContentView for FixedContent {
    fn measure(&self, max_width: f64) -> Size {
        Size::new(self.preferred.width.min(max_width), self.preferred.height)
    }
}

/// Pointer of a fixed size that remembers the orientation it was given.
#[derive(Debug, Clone)]
pub struct FixedPointer {
    pub size: Size,
    orientation: Rc<RefCell<Option<PointerOrientation>>>,
}

impl FixedPointer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            orientation: Rc::default(),
        }
    }

    /// Orientation set by the display, shared between clones.
    pub fn orientation(&self) -> Option<PointerOrientation> {
        *self.orientation.borrow()
    }
}

impl Default for FixedPointer {
    fn default() -> Self {
        Self::new(12.0, 8.0)
    }
}

impl PointerView for FixedPointer {
    fn size(&self) -> Size {
        self.size
    }

    fn set_orientation(&mut self, orientation: Option<PointerOrientation>) {
        *self.orientation.borrow_mut() = orientation;
    }
}

/// Data source serving a fixed list of records.
///
/// The record list is shared, so a test can edit steps while a run is paused
/// and check that `update_current_coach_mark` picks the change up.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDataSource {
    steps: Rc<RefCell<Vec<CoachMark>>>,
    content: FixedContent,
    pointer: Option<FixedPointer>,
    skip_constraints: Option<ConstraintSet>,
    /// Overrides `steps.len()` as the reported count.
    reported_count: Option<usize>,
}

impl ScriptedDataSource {
    pub fn new(steps: Vec<CoachMark>) -> Self {
        Self {
            steps: Rc::new(RefCell::new(steps)),
            pointer: Some(FixedPointer::default()),
            ..Self::default()
        }
    }

    /// `count` steps with rectangular cutouts stacked down a 320-wide screen.
    pub fn stacked(count: usize) -> Self {
        let steps = (0..count)
            .map(|i| CoachMark::new().cutout(Rect::new(30.0, 50.0 + 60.0 * i as f64, 30.0, 40.0)))
            .collect();
        Self::new(steps)
    }

    /// Same steps, but every transition takes `duration`.
    #[must_use]
    pub fn with_animation_duration(self, duration: std::time::Duration) -> Self {
        for step in self.steps.borrow_mut().iter_mut() {
            step.animation_duration = duration;
        }
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: FixedContent) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub fn without_pointer(mut self) -> Self {
        self.pointer = None;
        self
    }

    #[must_use]
    pub fn with_skip_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.skip_constraints = Some(constraints);
        self
    }

    /// Report `count` steps regardless of how many records exist.
    #[must_use]
    pub fn reporting(mut self, count: usize) -> Self {
        self.reported_count = Some(count);
        self
    }

    /// Handle to the pointer handed to the display, if any.
    pub fn pointer(&self) -> Option<&FixedPointer> {
        self.pointer.as_ref()
    }

    /// Replace step `index`.
    pub fn set_step(&self, index: usize, record: CoachMark) {
        if let Some(slot) = self.steps.borrow_mut().get_mut(index) {
            *slot = record;
        }
    }
}

impl CoachMarksDataSource for ScriptedDataSource {
    fn number_of_steps(&self) -> usize {
        self.reported_count.unwrap_or_else(|| self.steps.borrow().len())
    }

    fn configuration_for_step(&self, index: usize) -> CoachMark {
        self.steps.borrow().get(index).cloned().unwrap_or_default()
    }

    fn views_for_step(&self, _index: usize, _record: &CoachMark) -> CoachMarkViews {
        match &self.pointer {
            Some(pointer) => CoachMarkViews::with_pointer(self.content, pointer.clone()),
            None => CoachMarkViews::content_only(self.content),
        }
    }

    fn constraints_for_skip_control(&self, _skip: &SkipControl, _parent: Rect) -> Option<ConstraintSet> {
        self.skip_constraints.clone()
    }
}
