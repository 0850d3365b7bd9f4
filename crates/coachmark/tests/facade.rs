#![forbid(unsafe_code)]

//! The facade wires a working tutorial and surfaces unified errors.
//!
//! Run:
//!   cargo test -p coachmark --test facade

use coachmark::prelude::*;
use coachmark::{Recovery, SequenceError};
use coachmark_harness::{EventLog, FRAME, RecordingDelegate, ScriptedDataSource};

fn settle(tutorial: &mut Tutorial) {
    let mut frames = 0;
    while tutorial.is_transitioning() && frames < 10_000 {
        tutorial.advance_animations(FRAME);
        frames += 1;
    }
}

fn instant() -> TutorialConfig {
    let mut config = TutorialConfig::default();
    config.overlay.fade_duration_ms = 0;
    config.pause_duration_ms = 0;
    config
}

#[test]
fn tutorial_runs_to_completion() {
    let log = EventLog::default();
    let mut tutorial = coachmark::tutorial(Rect::from_size(320.0, 480.0))
        .with_data_source(Box::new(ScriptedDataSource::stacked(3)))
        .with_delegate(Box::new(RecordingDelegate::new(log.clone())));

    tutorial.start(instant());
    settle(&mut tutorial);
    assert_eq!(tutorial.phase(), Phase::Presenting);

    while tutorial.is_started() {
        tutorial.show_next();
        settle(&mut tutorial);
    }
    assert_eq!(log.shown(), vec![0, 1, 2]);
    assert_eq!(log.ends(), vec![false]);
}

#[test]
fn start_errors_convert_to_facade_error() {
    let mut tutorial = coachmark::tutorial(Rect::from_size(320.0, 480.0));
    let err: coachmark::Error = tutorial.try_start(instant()).unwrap_err().into();
    assert!(matches!(
        err,
        coachmark::Error::Sequence(SequenceError::NoDataSource)
    ));
    assert_eq!(err.recovery(), Recovery::AbortStart);
}

#[test]
fn resume_outside_pause_is_ignorable() {
    let mut tutorial = coachmark::tutorial(Rect::from_size(320.0, 480.0))
        .with_data_source(Box::new(ScriptedDataSource::stacked(1)));
    tutorial.start(instant());
    settle(&mut tutorial);

    let err: coachmark::Error = tutorial.try_resume().unwrap_err().into();
    assert_eq!(err.recovery(), Recovery::Ignore);
    assert!(tutorial.is_started());
}
