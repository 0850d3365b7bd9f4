#![no_main]

use arbitrary::Arbitrary;
use coachmark_core::{LayoutDirection, Point, Rect, Region};
use coachmark_layout::{CoachMark, GeometryResolver, ResolvedVerticalPosition, VerticalPosition};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    container: Option<(i16, i16, u16, u16)>,
    cutout: Option<(i16, i16, u16, u16)>,
    point_of_interest: Option<(i16, i16)>,
    position: u8,
    margin: u8,
    max_width: u16,
    pointer_offset: i8,
    rtl: bool,
    disable_pointer: bool,
    safe_area: u8,
}

fn rect((x, y, w, h): (i16, i16, u16, u16)) -> Rect {
    Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
}

fuzz_target!(|input: Input| {
    let resolver = GeometryResolver::new();
    let mut record = CoachMark::new()
        .vertical_position(match input.position % 4 {
            0 => VerticalPosition::Automatic,
            1 => VerticalPosition::Above,
            2 => VerticalPosition::Below,
            _ => VerticalPosition::Over,
        })
        .horizontal_margin(f64::from(input.margin))
        .max_width(f64::from(input.max_width))
        .pointer_offset(f64::from(input.pointer_offset))
        .disable_pointer(input.disable_pointer);
    if let Some(cutout) = input.cutout {
        record = record.cutout(Region::rect(rect(cutout)));
    }
    if let Some((x, y)) = input.point_of_interest {
        record = record.point_of_interest(Point::new(f64::from(x), f64::from(y)));
    }
    let direction = if input.rtl {
        LayoutDirection::RightToLeft
    } else {
        LayoutDirection::LeftToRight
    };
    let container = input.container.map(rect);

    let layout = resolver.resolve_layout(&record, container, direction, f64::from(input.safe_area));

    // Post-conditions that must always hold:
    assert_eq!(layout.container, container);
    assert_eq!(layout.direction, direction);
    let anchored = record.cutout_region.is_some() || record.point_of_interest.is_some();
    if input.disable_pointer || !anchored {
        assert!(layout.pointer_orientation.is_none(), "pointer without anchor");
    }
    let Some(container) = container else {
        assert_eq!(layout.vertical_position, ResolvedVerticalPosition::Below);
        return;
    };
    if record.cutout_region.is_none() {
        assert_eq!(layout.vertical_position, ResolvedVerticalPosition::Below);
    }
    assert!(layout.max_width >= 0.0, "negative max width");
    assert!(
        layout.max_width <= resolver.ceiled_max_width(&record, &container),
        "max width exceeds the ceiled bound"
    );

    // Metadata is idempotent.
    let once = resolver.compute_metadata(&record, &container);
    let twice = resolver.compute_metadata(&once, &container);
    assert_eq!(once, twice, "compute_metadata not idempotent");
});
