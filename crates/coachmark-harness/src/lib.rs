#![forbid(unsafe_code)]

//! Test harness for coachmark.
//!
//! # Role in coachmark
//! `coachmark-harness` runs tutorials without a UI: [`Host`] wires the
//! in-crate overlay and display coordinators to a manual clock, the fixtures
//! supply scripted steps and fixed-size views, and [`RecordingDelegate`]
//! writes every callback into an [`EventLog`] that tests assert on.
//!
//! # Key modules
//! - [`host`]: the headless host.
//! - [`fixtures`]: scripted data source and views.
//! - [`recorder`]: recording delegate, JSONL dump and blake3 digest.
//! - [`storm`]: seeded command storms with invariant checks.

pub mod fixtures;
pub mod host;
pub mod recorder;
pub mod storm;

pub use fixtures::{FixedContent, FixedPointer, ScriptedDataSource};
pub use host::{DEFAULT_CONTAINER, FRAME, Host, HostMachine};
pub use recorder::{EventLog, RecordingDelegate, TutorialEvent};
pub use storm::{Command, StormState, apply, check_invariants, generate_commands, run_storm};
