#![forbid(unsafe_code)]

//! Core: geometry, layout direction and environment events.
//!
//! # Role in coachmark
//! `coachmark-core` holds the vocabulary every other crate speaks: points,
//! rectangles and cutout regions in one shared coordinate space, the
//! writing direction that decides which edge is "leading", and the events the
//! host pushes in (configuration changes and interactions).
//!
//! # How it fits in the system
//! The layout crate (`coachmark-layout`) resolves geometry from these types;
//! the runtime (`coachmark-runtime`) consumes the events. Nothing here knows
//! about steps, sequencing or rendering.

pub mod color;
pub mod event;
pub mod geometry;
pub mod logging;

pub use color::Rgba;
pub use event::{ConfigurationChange, Interaction};
pub use geometry::{GeometryError, Insets, LayoutDirection, Point, Rect, Region, Size};
