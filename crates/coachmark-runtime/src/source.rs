#![forbid(unsafe_code)]

//! Data source and delegate contracts.
//!
//! The data source says *what* to show; the delegate is told *when* things
//! happen and may veto or adjust. Every delegate method has a default, so an
//! implementation overrides only what it cares about.

use coachmark_core::{ConfigurationChange, LayoutDirection, Rect, Size};
use coachmark_layout::{
    Attribute, CoachMark, ConstraintSet, PlacementConstraint, Relation,
};

use crate::views::CoachMarkViews;

/// The skip control as handed to the data source for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipControl {
    pub title: String,
    pub size: Size,
}

impl SkipControl {
    /// Inset of the default placement from the top and trailing edges.
    pub const DEFAULT_INSET: f64 = 16.0;

    /// Top-trailing corner of the container.
    pub fn default_constraints(direction: LayoutDirection) -> ConstraintSet {
        ConstraintSet::new(direction)
            .with(PlacementConstraint::required(
                Attribute::Top,
                Relation::Equal,
                Self::DEFAULT_INSET,
            ))
            .with(PlacementConstraint::required(
                Attribute::Trailing,
                Relation::Equal,
                Self::DEFAULT_INSET,
            ))
    }
}

/// Supplies the steps of a tutorial.
pub trait CoachMarksDataSource {
    /// Number of steps. Read once per run, at `start`.
    fn number_of_steps(&self) -> usize;

    /// The record for step `index`.
    fn configuration_for_step(&self, index: usize) -> CoachMark;

    /// Views for step `index`, given its resolved record.
    fn views_for_step(&self, index: usize, record: &CoachMark) -> CoachMarkViews;

    /// Where to put the skip control inside `parent`. `None` uses the default
    /// top-trailing placement.
    fn constraints_for_skip_control(
        &self,
        skip: &SkipControl,
        parent: Rect,
    ) -> Option<ConstraintSet> {
        let _ = (skip, parent);
        None
    }
}

/// Observes and steers a tutorial run.
pub trait CoachMarksDelegate {
    /// Return `false` to skip step `index`.
    fn should_load_configuration(&mut self, index: usize) -> bool {
        let _ = index;
        true
    }

    /// Last chance to adjust the record before it is laid out and shown.
    /// `change` is set when the step is re-shown after a configuration change.
    fn will_show(
        &mut self,
        record: &mut CoachMark,
        change: Option<ConfigurationChange>,
        index: usize,
    ) {
        let _ = (record, change, index);
    }

    /// The step is on screen.
    fn did_show(&mut self, record: &CoachMark, change: Option<ConfigurationChange>, index: usize) {
        let _ = (record, change, index);
    }

    /// The step is about to be dismissed.
    fn will_hide(&mut self, record: &CoachMark, index: usize) {
        let _ = (record, index);
    }

    /// The step is gone.
    fn did_hide(&mut self, record: &CoachMark, index: usize) {
        let _ = (record, index);
    }

    /// The run is over. Called exactly once per run.
    fn did_end(&mut self, skipped: bool) {
        let _ = skipped;
    }

    /// Return `false` to ignore a tap on the overlay while step `index` is
    /// shown.
    fn should_handle_overlay_tap(&mut self, index: usize) -> bool {
        let _ = index;
        true
    }
}

/// Delegate used when none is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelegate;

impl CoachMarksDelegate for NoopDelegate {}
