#![forbid(unsafe_code)]

//! Geometry resolution for one coach mark against one container.
//!
//! [`GeometryResolver`] is stateless: every method is a pure function of its
//! arguments, so the state machine can call it as often as it likes (on
//! first display, after a delegate override, after a rotation) and always get
//! the same answer for the same inputs.
//!
//! # Placement rules
//!
//! * **Vertical**: a cutout whose vertical midpoint sits in the upper half of
//!   the container gets its callout below it, otherwise above. An explicit
//!   `Above`/`Below`/`Over` wins. No cutout means `Below`.
//! * **Horizontal**: the container is split into two halves. A point of
//!   interest in the first half aligns the callout to the leading edge, in
//!   the second half to the trailing edge (halves swap for right-to-left).
//!   With no point of interest, or a container with no width, the callout is
//!   centered.
//! * **Width**: `floor(min(max_width, container.width - 2 * margin))`, at
//!   least zero. Leading and trailing callouts also subtract the safe area
//!   their pinned edge is pushed in by.
//!
//! All inputs must already be in the container's coordinate space.

use coachmark_core::{LayoutDirection, Point, Rect};

use crate::constraints::{Attribute, ConstraintSet, PlacementConstraint, Priority, Relation};
use crate::record::{CoachMark, ResolvedVerticalPosition};

/// Horizontal anchoring of the callout inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Pinned to the leading margin.
    Leading,
    /// Centered on the point of interest, kept inside both margins.
    #[default]
    Centered,
    /// Pinned to the trailing margin.
    Trailing,
}

/// Which edge of the callout carries the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerOrientation {
    /// Pointer on the top edge, pointing up (callout below the cutout).
    Top,
    /// Pointer on the bottom edge, pointing down (callout above the cutout).
    Bottom,
}

/// Everything the display side needs to place one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachMarkLayout {
    /// Container the layout was computed against; `None` for the degenerate
    /// layout.
    pub container: Option<Rect>,
    /// Bounds of the cutout region.
    pub cutout: Option<Rect>,
    pub point_of_interest: Option<Point>,
    pub vertical_position: ResolvedVerticalPosition,
    pub alignment: HorizontalAlignment,
    /// `None` when no pointer should be drawn.
    pub pointer_orientation: Option<PointerOrientation>,
    pub pointer_offset: f64,
    pub max_width: f64,
    /// Horizontal placement rules for the callout body.
    pub constraints: ConstraintSet,
    pub direction: LayoutDirection,
}

impl CoachMarkLayout {
    /// Whether this layout was computed without a container.
    pub fn is_degenerate(&self) -> bool {
        self.container.is_none()
    }
}

/// Stateless geometry resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryResolver;

impl GeometryResolver {
    /// Create a resolver.
    pub const fn new() -> Self {
        Self
    }

    /// Fill in `resolved_vertical_position` and `point_of_interest`.
    ///
    /// Values already present are left untouched, so applying this twice
    /// gives the same record as applying it once.
    #[must_use]
    pub fn compute_metadata(&self, record: &CoachMark, container: &Rect) -> CoachMark {
        let mut resolved = record.clone();
        let Some(cutout) = record.cutout_region.as_ref() else {
            resolved
                .resolved_vertical_position
                .get_or_insert(ResolvedVerticalPosition::Below);
            return resolved;
        };

        if resolved.resolved_vertical_position.is_none() {
            let position = record.vertical_position.explicit().unwrap_or_else(|| {
                let bounds = cutout.bounds();
                if bounds.mid_y() - container.y < container.height / 2.0 {
                    ResolvedVerticalPosition::Below
                } else {
                    ResolvedVerticalPosition::Above
                }
            });
            resolved.resolved_vertical_position = Some(position);
        }
        if resolved.point_of_interest.is_none() {
            resolved.set_derived_point_of_interest(cutout.center());
        }
        resolved
    }

    /// Widest the callout may be inside `container`. Never negative: a
    /// container narrower than its margins yields zero.
    pub fn ceiled_max_width(&self, record: &CoachMark, container: &Rect) -> f64 {
        record
            .max_width
            .min(container.width - 2.0 * record.horizontal_margin)
            .floor()
            .max(0.0)
    }

    /// Width bound for `alignment`. An edge pin sits at `margin + safe_area`,
    /// so leading and trailing callouts also give up `safe_area` to keep the
    /// opposite margin clear.
    pub fn aligned_max_width(
        &self,
        record: &CoachMark,
        alignment: HorizontalAlignment,
        container: &Rect,
        safe_area: f64,
    ) -> f64 {
        let ceiled = self.ceiled_max_width(record, container);
        match alignment {
            HorizontalAlignment::Centered => ceiled,
            HorizontalAlignment::Leading | HorizontalAlignment::Trailing => ceiled
                .min(container.width - 2.0 * record.horizontal_margin - safe_area)
                .floor()
                .max(0.0),
        }
    }

    /// Leading, centered or trailing, from the half of the container holding
    /// the point of interest.
    pub fn compute_horizontal_alignment(
        &self,
        record: &CoachMark,
        container: &Rect,
        direction: LayoutDirection,
    ) -> HorizontalAlignment {
        let Some(poi) = record.point_of_interest else {
            return HorizontalAlignment::Centered;
        };
        // Also rejects NaN widths.
        if !(container.width > 0.0) {
            return HorizontalAlignment::Centered;
        }
        let left_half = poi.x - container.x < container.width / 2.0;
        match (left_half, direction) {
            (true, LayoutDirection::LeftToRight) | (false, LayoutDirection::RightToLeft) => {
                HorizontalAlignment::Leading
            }
            (false, LayoutDirection::LeftToRight) | (true, LayoutDirection::RightToLeft) => {
                HorizontalAlignment::Trailing
            }
        }
    }

    /// Offset of the pointer for the given alignment.
    ///
    /// For `Leading`/`Trailing` this is the distance from the pinned callout
    /// edge to the point of interest. For `Centered` it is the distance from
    /// the container center to the point of interest, measured towards the
    /// leading edge. `safe_area` is an opaque additive term supplied by the
    /// host (status bar, notch, window insets).
    pub fn compute_pointer_offset(
        &self,
        record: &CoachMark,
        alignment: HorizontalAlignment,
        container: &Rect,
        direction: LayoutDirection,
        safe_area: f64,
    ) -> f64 {
        let Some(poi) = record.point_of_interest else {
            return 0.0;
        };
        let from_leading = match direction {
            LayoutDirection::LeftToRight => poi.x - container.x,
            LayoutDirection::RightToLeft => container.right() - poi.x,
        };
        match alignment {
            HorizontalAlignment::Centered => {
                let offset = container.mid_x() - poi.x;
                if direction.is_rtl() { -offset } else { offset }
            }
            HorizontalAlignment::Leading => from_leading - record.horizontal_margin - safe_area,
            HorizontalAlignment::Trailing => {
                (container.width - from_leading) - record.horizontal_margin - safe_area
            }
        }
    }

    /// Pointer edge for a resolved record, or `None` for no pointer.
    pub fn compute_pointer_orientation(&self, record: &CoachMark) -> Option<PointerOrientation> {
        if record.disable_pointer || record.point_of_interest.is_none() {
            return None;
        }
        match record.resolved_vertical_position? {
            ResolvedVerticalPosition::Below => Some(PointerOrientation::Top),
            ResolvedVerticalPosition::Above => Some(PointerOrientation::Bottom),
            ResolvedVerticalPosition::Over => None,
        }
    }

    /// Horizontal placement rules for the callout body.
    ///
    /// Leading/trailing pin one edge at `margin + safe_area` and bound the
    /// width. Centered asks (weakly) for the callout center to sit on the
    /// point of interest, keeps both margins at a higher priority and bounds
    /// the width.
    pub fn make_placement_constraints(
        &self,
        alignment: HorizontalAlignment,
        record: &CoachMark,
        container: &Rect,
        direction: LayoutDirection,
        pointer_offset: f64,
        safe_area: f64,
    ) -> ConstraintSet {
        let width = PlacementConstraint::required(
            Attribute::Width,
            Relation::LessOrEqual,
            self.aligned_max_width(record, alignment, container, safe_area),
        );
        let pin = record.horizontal_margin + safe_area;
        let set = ConstraintSet::new(direction);
        match alignment {
            HorizontalAlignment::Leading => set
                .with(PlacementConstraint::required(
                    Attribute::Leading,
                    Relation::Equal,
                    pin,
                ))
                .with(width),
            HorizontalAlignment::Trailing => set
                .with(PlacementConstraint::required(
                    Attribute::Trailing,
                    Relation::Equal,
                    pin,
                ))
                .with(width),
            HorizontalAlignment::Centered => centered_constraints(
                set,
                record.horizontal_margin,
                -pointer_offset,
                width,
            ),
        }
    }

    /// Resolve everything for one step.
    ///
    /// `container == None` (the host could not say where the overlay lives)
    /// gives the degenerate layout: below, centered, no pointer.
    pub fn resolve_layout(
        &self,
        record: &CoachMark,
        container: Option<Rect>,
        direction: LayoutDirection,
        safe_area: f64,
    ) -> CoachMarkLayout {
        let Some(container) = container else {
            return self.degenerate_layout(record, direction);
        };

        let resolved = self.compute_metadata(record, &container);
        let alignment = self.compute_horizontal_alignment(&resolved, &container, direction);
        let pointer_offset =
            self.compute_pointer_offset(&resolved, alignment, &container, direction, safe_area);
        let constraints = self.make_placement_constraints(
            alignment,
            &resolved,
            &container,
            direction,
            pointer_offset,
            safe_area,
        );

        CoachMarkLayout {
            container: Some(container),
            cutout: resolved.cutout_region.as_ref().map(|r| r.bounds()),
            point_of_interest: resolved.point_of_interest,
            vertical_position: resolved
                .resolved_vertical_position
                .unwrap_or(ResolvedVerticalPosition::Below),
            alignment,
            pointer_orientation: self.compute_pointer_orientation(&resolved),
            pointer_offset,
            max_width: self.aligned_max_width(&resolved, alignment, &container, safe_area),
            constraints,
            direction,
        }
    }

    fn degenerate_layout(&self, record: &CoachMark, direction: LayoutDirection) -> CoachMarkLayout {
        let width = PlacementConstraint::required(
            Attribute::Width,
            Relation::LessOrEqual,
            record.max_width.floor(),
        );
        CoachMarkLayout {
            container: None,
            cutout: None,
            point_of_interest: None,
            vertical_position: ResolvedVerticalPosition::Below,
            alignment: HorizontalAlignment::Centered,
            pointer_orientation: None,
            pointer_offset: 0.0,
            max_width: record.max_width,
            constraints: centered_constraints(
                ConstraintSet::new(direction),
                record.horizontal_margin,
                0.0,
                width,
            ),
            direction,
        }
    }
}

fn centered_constraints(
    set: ConstraintSet,
    margin: f64,
    center_offset: f64,
    width: PlacementConstraint,
) -> ConstraintSet {
    set.with(
        PlacementConstraint::required(Attribute::CenterX, Relation::Equal, center_offset)
            .with_priority(Priority::LOW),
    )
    .with(
        PlacementConstraint::required(Attribute::Leading, Relation::GreaterOrEqual, margin)
            .with_priority(Priority::HIGH),
    )
    .with(
        PlacementConstraint::required(Attribute::Trailing, Relation::GreaterOrEqual, margin)
            .with_priority(Priority::HIGH),
    )
    .with(width)
}
