#![forbid(unsafe_code)]

//! Declarative placement rules for callouts and the skip control.
//!
//! A [`ConstraintSet`] is the contract handed to the rendering side: a short
//! list of "this edge sits this far from the container edge" rules with
//! priorities. It is not a general constraint engine. [`ConstraintSet::solve`]
//! resolves the one-box-in-one-container case the sequencer needs, which is
//! enough for the in-crate display coordinator and for tests.
//!
//! Horizontal constants are measured along the leading→trailing axis, so the
//! same set describes a left-to-right and a right-to-left layout.

use coachmark_core::{LayoutDirection, Rect, Size};
use serde::{Deserialize, Serialize};

/// Edge or dimension a constraint talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Distance from the container's leading edge to the box's leading edge.
    Leading,
    /// Distance from the box's trailing edge to the container's trailing edge.
    Trailing,
    /// Offset of the box center from the container center, positive towards
    /// the trailing edge.
    CenterX,
    /// Box width.
    Width,
    /// Distance from the container top to the box top.
    Top,
    /// Distance from the box bottom to the container bottom.
    Bottom,
    /// Offset of the box center from the container center, positive downwards.
    CenterY,
    /// Box height.
    Height,
}

impl Attribute {
    /// Whether this attribute is on the horizontal axis.
    pub const fn is_horizontal(self) -> bool {
        matches!(
            self,
            Self::Leading | Self::Trailing | Self::CenterX | Self::Width
        )
    }
}

/// Relation between the attribute and the constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

/// Constraint priority; higher wins when rules conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority(pub u16);

impl Priority {
    pub const REQUIRED: Priority = Priority(1000);
    pub const HIGH: Priority = Priority(750);
    pub const LOW: Priority = Priority(250);
}

/// One declarative rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConstraint {
    pub attribute: Attribute,
    pub relation: Relation,
    pub constant: f64,
    pub priority: Priority,
}

impl PlacementConstraint {
    /// A required constraint.
    pub const fn required(attribute: Attribute, relation: Relation, constant: f64) -> Self {
        Self {
            attribute,
            relation,
            constant,
            priority: Priority::REQUIRED,
        }
    }

    /// Same constraint at another priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// A declarative description of where a box sits inside its container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    direction: LayoutDirection,
    constraints: Vec<PlacementConstraint>,
}

impl ConstraintSet {
    /// Empty set for the given direction.
    pub fn new(direction: LayoutDirection) -> Self {
        Self {
            direction,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint.
    #[must_use]
    pub fn with(mut self, constraint: PlacementConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add a constraint in place.
    pub fn push(&mut self, constraint: PlacementConstraint) {
        self.constraints.push(constraint);
    }

    /// Layout direction the horizontal constants are expressed in.
    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// All constraints, in insertion order.
    pub fn constraints(&self) -> &[PlacementConstraint] {
        &self.constraints
    }

    /// Constraints on one attribute.
    pub fn on(&self, attribute: Attribute) -> impl Iterator<Item = &PlacementConstraint> {
        self.constraints
            .iter()
            .filter(move |c| c.attribute == attribute)
    }

    /// Whether any constraint touches the vertical axis.
    pub fn has_vertical_rules(&self) -> bool {
        self.constraints.iter().any(|c| !c.attribute.is_horizontal())
    }

    /// Resolve the horizontal axis: returns `(x, width)` in container
    /// coordinates for a box that would like to be `preferred_width` wide.
    pub fn solve_horizontal(&self, container: Rect, preferred_width: f64) -> (f64, f64) {
        let width = self.solve_extent(Attribute::Width, preferred_width);
        let lead = self.solve_offset(
            container.width,
            width,
            Attribute::Leading,
            Attribute::Trailing,
            Attribute::CenterX,
        );
        let x = match self.direction {
            LayoutDirection::LeftToRight => container.x + lead,
            LayoutDirection::RightToLeft => container.right() - lead - width,
        };
        (x, width)
    }

    /// Resolve the vertical axis: returns `(y, height)`.
    pub fn solve_vertical(&self, container: Rect, preferred_height: f64) -> (f64, f64) {
        let height = self.solve_extent(Attribute::Height, preferred_height);
        let top = self.solve_offset(
            container.height,
            height,
            Attribute::Top,
            Attribute::Bottom,
            Attribute::CenterY,
        );
        (container.y + top, height)
    }

    /// Resolve both axes into a frame.
    pub fn solve(&self, container: Rect, preferred: Size) -> Rect {
        let (x, width) = self.solve_horizontal(container, preferred.width);
        let (y, height) = self.solve_vertical(container, preferred.height);
        Rect::new(x, y, width, height)
    }

    fn solve_extent(&self, attribute: Attribute, preferred: f64) -> f64 {
        let mut rules: Vec<&PlacementConstraint> = self.on(attribute).collect();
        // Apply low priority first so required rules have the last word.
        rules.sort_by_key(|c| c.priority);
        let mut extent = preferred;
        for rule in rules {
            extent = match rule.relation {
                Relation::Equal => rule.constant,
                Relation::LessOrEqual => extent.min(rule.constant),
                Relation::GreaterOrEqual => extent.max(rule.constant),
            };
        }
        extent.max(0.0)
    }

    /// Offset of the box's start edge from the container's start edge along
    /// one axis.
    fn solve_offset(
        &self,
        span: f64,
        extent: f64,
        start: Attribute,
        end: Attribute,
        center: Attribute,
    ) -> f64 {
        let anchor = self
            .constraints
            .iter()
            .filter(|c| {
                c.relation == Relation::Equal
                    && (c.attribute == start || c.attribute == end || c.attribute == center)
            })
            .max_by_key(|c| c.priority);

        let (mut offset, anchor_priority) = match anchor {
            Some(c) if c.attribute == start => (c.constant, c.priority),
            Some(c) if c.attribute == end => (span - c.constant - extent, c.priority),
            Some(c) => (span / 2.0 + c.constant - extent / 2.0, c.priority),
            None => ((span - extent) / 2.0, Priority(0)),
        };

        // Inequalities only move the box when they outrank the anchor.
        let bounds = |attr: Attribute| {
            self.on(attr).filter(move |c| {
                c.relation == Relation::GreaterOrEqual && c.priority > anchor_priority
            })
        };
        for c in bounds(end) {
            offset = offset.min(span - c.constant - extent);
        }
        for c in bounds(start) {
            offset = offset.max(c.constant);
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 320.0, 480.0)
    }

    #[test]
    fn leading_pin_ltr_and_rtl() {
        let ltr = ConstraintSet::new(LayoutDirection::LeftToRight)
            .with(PlacementConstraint::required(
                Attribute::Leading,
                Relation::Equal,
                14.0,
            ))
            .with(PlacementConstraint::required(
                Attribute::Width,
                Relation::LessOrEqual,
                200.0,
            ));
        assert_eq!(ltr.solve_horizontal(container(), 250.0), (14.0, 200.0));

        let rtl = ConstraintSet {
            direction: LayoutDirection::RightToLeft,
            ..ltr
        };
        assert_eq!(rtl.solve_horizontal(container(), 250.0), (106.0, 200.0));
    }

    #[test]
    fn trailing_pin() {
        let set = ConstraintSet::new(LayoutDirection::LeftToRight).with(
            PlacementConstraint::required(Attribute::Trailing, Relation::Equal, 10.0),
        );
        assert_eq!(set.solve_horizontal(container(), 100.0), (210.0, 100.0));
    }

    #[test]
    fn centered_offset_is_clamped_by_higher_priority_margins() {
        let set = ConstraintSet::new(LayoutDirection::LeftToRight)
            .with(
                PlacementConstraint::required(Attribute::CenterX, Relation::Equal, -150.0)
                    .with_priority(Priority::LOW),
            )
            .with(
                PlacementConstraint::required(Attribute::Leading, Relation::GreaterOrEqual, 14.0)
                    .with_priority(Priority::HIGH),
            )
            .with(
                PlacementConstraint::required(Attribute::Trailing, Relation::GreaterOrEqual, 14.0)
                    .with_priority(Priority::HIGH),
            );
        // Desired center x = 160 - 150 = 10, which would push past the margin.
        let (x, width) = set.solve_horizontal(container(), 100.0);
        assert_eq!((x, width), (14.0, 100.0));
    }

    #[test]
    fn centered_offset_within_margins_is_honoured() {
        let set = ConstraintSet::new(LayoutDirection::LeftToRight).with(
            PlacementConstraint::required(Attribute::CenterX, Relation::Equal, 20.0)
                .with_priority(Priority::LOW),
        );
        let (x, _) = set.solve_horizontal(container(), 100.0);
        assert_eq!(x, 130.0);
    }

    #[test]
    fn no_rules_centers_the_box() {
        let set = ConstraintSet::new(LayoutDirection::LeftToRight);
        assert_eq!(
            set.solve(container(), Size::new(100.0, 80.0)),
            Rect::new(110.0, 200.0, 100.0, 80.0)
        );
        assert!(!set.has_vertical_rules());
    }

    #[test]
    fn vertical_pins() {
        let set = ConstraintSet::new(LayoutDirection::LeftToRight)
            .with(PlacementConstraint::required(
                Attribute::Top,
                Relation::Equal,
                24.0,
            ))
            .with(PlacementConstraint::required(
                Attribute::Trailing,
                Relation::Equal,
                10.0,
            ));
        assert!(set.has_vertical_rules());
        assert_eq!(
            set.solve(container(), Size::new(60.0, 30.0)),
            Rect::new(250.0, 24.0, 60.0, 30.0)
        );
    }

    #[test]
    fn extent_never_negative() {
        let set = ConstraintSet::new(LayoutDirection::LeftToRight).with(
            PlacementConstraint::required(Attribute::Width, Relation::LessOrEqual, -40.0),
        );
        assert_eq!(set.solve_horizontal(container(), 100.0).1, 0.0);
    }
}
