//! Property tests for the geometry resolver.
//!
//! Covers:
//! - width bound: never wider than the margins or the record allow
//! - alignment partition: leading/trailing by half, centered only when degenerate
//! - idempotence: resolving a resolved record changes nothing
//! - solved frames never cross a margin when there is room, with or without
//!   a safe area
//!
//! Run:
//!   cargo test -p coachmark-layout --test proptest_resolver_invariants

use coachmark_core::{LayoutDirection, Point, Rect, Size};
use coachmark_layout::{CoachMark, GeometryResolver, HorizontalAlignment, VerticalPosition};
use proptest::prelude::*;

const RESOLVER: GeometryResolver = GeometryResolver::new();

fn container_strategy() -> impl Strategy<Value = Rect> {
    (-200.0f64..200.0, -200.0f64..200.0, 0.0f64..2000.0, 0.0f64..2000.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn direction_strategy() -> impl Strategy<Value = LayoutDirection> {
    prop_oneof![
        Just(LayoutDirection::LeftToRight),
        Just(LayoutDirection::RightToLeft)
    ]
}

fn position_strategy() -> impl Strategy<Value = VerticalPosition> {
    prop_oneof![
        Just(VerticalPosition::Above),
        Just(VerticalPosition::Below),
        Just(VerticalPosition::Over),
        Just(VerticalPosition::Automatic),
    ]
}

fn record_strategy() -> impl Strategy<Value = CoachMark> {
    (
        prop::option::of((-500.0f64..2500.0, -500.0f64..2500.0, 0.0f64..300.0, 0.0f64..300.0)),
        0.0f64..100.0,
        0.0f64..1000.0,
        position_strategy(),
    )
        .prop_map(|(cutout, margin, max_width, position)| {
            let mark = CoachMark::new()
                .horizontal_margin(margin)
                .max_width(max_width)
                .vertical_position(position);
            match cutout {
                Some((x, y, w, h)) => mark.cutout(Rect::new(x, y, w, h)),
                None => mark,
            }
        })
}

proptest! {
    #[test]
    fn width_bound(record in record_strategy(), container in container_strategy()) {
        let width = RESOLVER.ceiled_max_width(&record, &container);
        prop_assert!(width >= 0.0);
        prop_assert!(width <= (container.width - 2.0 * record.horizontal_margin).max(0.0));
        prop_assert!(width <= record.max_width);
        prop_assert_eq!(width, width.floor());
    }

    #[test]
    fn alignment_partition(
        x in -500.0f64..2500.0,
        container in container_strategy(),
        direction in direction_strategy(),
    ) {
        let record = CoachMark::new().point_of_interest(Point::new(x, 0.0));
        let alignment = RESOLVER.compute_horizontal_alignment(&record, &container, direction);
        if container.width == 0.0 {
            prop_assert_eq!(alignment, HorizontalAlignment::Centered);
        } else {
            let first_half = x - container.x < container.width / 2.0;
            let expected = match (first_half, direction.is_rtl()) {
                (true, false) | (false, true) => HorizontalAlignment::Leading,
                _ => HorizontalAlignment::Trailing,
            };
            prop_assert_eq!(alignment, expected);
        }
    }

    #[test]
    fn missing_point_always_centers(container in container_strategy(), direction in direction_strategy()) {
        let alignment = RESOLVER.compute_horizontal_alignment(&CoachMark::new(), &container, direction);
        prop_assert_eq!(alignment, HorizontalAlignment::Centered);
    }

    #[test]
    fn metadata_is_idempotent(
        record in record_strategy(),
        first in container_strategy(),
        second in container_strategy(),
    ) {
        let once = RESOLVER.compute_metadata(&record, &first);
        let twice = RESOLVER.compute_metadata(&once, &second);
        prop_assert_eq!(&once.resolved_vertical_position, &twice.resolved_vertical_position);
        prop_assert_eq!(&once.point_of_interest, &twice.point_of_interest);
        prop_assert!(once.resolved_vertical_position.is_some());
        prop_assert_eq!(once.point_of_interest.is_some(), record.cutout_region.is_some());
    }

    #[test]
    fn explicit_position_always_wins(record in record_strategy(), container in container_strategy()) {
        prop_assume!(record.cutout_region.is_some());
        let resolved = RESOLVER.compute_metadata(&record, &container);
        if let Some(explicit) = record.vertical_position.explicit() {
            prop_assert_eq!(resolved.resolved_vertical_position, Some(explicit));
        }
    }

    #[test]
    fn solved_frame_respects_margins(
        record in record_strategy(),
        width in 100.0f64..2000.0,
        preferred in 0.0f64..3000.0,
        direction in direction_strategy(),
        safe_area in prop_oneof![Just(0.0f64), 0.0f64..60.0],
    ) {
        let container = Rect::from_size(width, 800.0);
        let margin = record.horizontal_margin;
        // Room for both margins and the safe area the pinned edge gives up.
        prop_assume!(container.width - 2.0 * margin - safe_area >= 0.0);
        let layout = RESOLVER.resolve_layout(&record, Some(container), direction, safe_area);
        let frame = layout.constraints.solve(container, Size::new(preferred, 40.0));
        prop_assert!(layout.max_width >= 0.0);
        prop_assert!(frame.width <= layout.max_width);
        prop_assert!(frame.left() >= container.left() + margin - 1e-6);
        prop_assert!(frame.right() <= container.right() - margin + 1e-6);
    }
}
