#![forbid(unsafe_code)]

//! Coach mark records and geometry resolution.
//!
//! # Role in coachmark
//! `coachmark-layout` answers "where does this callout go?" for one step at a
//! time: which side of the cutout, which horizontal edge it hugs, how wide it
//! may be and where its pointer sits. It never renders and never sequences.
//!
//! # Primary responsibilities
//! - **CoachMark**: the per-step record, with caller inputs and resolver outputs.
//! - **GeometryResolver**: pure functions from a record and a container to a
//!   [`CoachMarkLayout`].
//! - **ConstraintSet**: the declarative placement rules handed to whatever
//!   draws the callout, plus a small solver for the single-box case.
//!
//! # Example
//! ```
//! use coachmark_core::{LayoutDirection, Point, Rect};
//! use coachmark_layout::{CoachMark, GeometryResolver, ResolvedVerticalPosition};
//!
//! let container = Rect::from_size(320.0, 480.0);
//! let mark = CoachMark::new().cutout(Rect::from_corners(
//!     Point::new(30.0, 50.0),
//!     Point::new(60.0, 110.0),
//! ));
//! let layout = GeometryResolver::new().resolve_layout(
//!     &mark,
//!     Some(container),
//!     LayoutDirection::LeftToRight,
//!     0.0,
//! );
//! assert_eq!(layout.vertical_position, ResolvedVerticalPosition::Below);
//! assert_eq!(layout.point_of_interest, Some(Point::new(45.0, 80.0)));
//! ```

pub mod constraints;
pub mod record;
pub mod resolver;

pub use constraints::{Attribute, ConstraintSet, PlacementConstraint, Priority, Relation};
pub use record::{
    CoachMark, DEFAULT_ANIMATION_DURATION, DEFAULT_GAP_TO_CUTOUT, DEFAULT_HORIZONTAL_MARGIN,
    DEFAULT_MAX_WIDTH, DEFAULT_POINTER_OFFSET, ResolvedVerticalPosition, VerticalPosition,
};
pub use resolver::{CoachMarkLayout, GeometryResolver, HorizontalAlignment, PointerOrientation};
