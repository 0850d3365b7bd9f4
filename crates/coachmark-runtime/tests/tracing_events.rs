#![forbid(unsafe_code)]

//! Log events emitted by the state machine: misconfiguration warns, runs are
//! wrapped in a `coachmark.run` span, and lifecycle events carry structured
//! fields.
//!
//! Run:
//!   cargo test -p coachmark-runtime --test tracing_events

use std::sync::{Arc, Mutex};

use coachmark_core::Rect;
use coachmark_harness::{Host, ScriptedDataSource};
use coachmark_layout::GeometryResolver;
use coachmark_runtime::{
    CoachMarkDisplay, OverlayManager, PresentationContext, TutorialConfig, TutorialStateMachine,
};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: Vec<String>,
    span: Option<String>,
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<CapturedEvent>>>);

impl Capture {
    fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }
}

struct Visitor<'a> {
    message: &'a mut String,
    fields: &'a mut Vec<String>,
}

impl tracing::field::Visit for Visitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{value:?}");
        } else {
            self.fields.push(field.name().to_string());
        }
    }
}

impl<S> Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut Visitor {
            message: &mut message,
            fields: &mut fields,
        });
        let span = ctx.event_span(event).map(|s| s.name().to_string());
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
            span,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (Capture, R) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (capture, result)
}

#[test]
fn empty_sequence_warns() {
    let (capture, result) = capture(|| {
        let mut host = Host::new(ScriptedDataSource::stacked(0));
        host.try_start(TutorialConfig::default())
    });
    assert!(result.is_err());
    let event = capture
        .find("cannot start tutorial: data source reported no steps")
        .expect("warning emitted");
    assert_eq!(event.level, tracing::Level::WARN);
}

#[test]
fn missing_data_source_warns() {
    let (capture, ()) = capture(|| {
        let mut machine = TutorialStateMachine::new(
            GeometryResolver::new(),
            OverlayManager::default(),
            CoachMarkDisplay::new(PresentationContext::default(), Some(Rect::from_size(320.0, 480.0))),
        );
        machine.start(TutorialConfig::default());
    });
    let event = capture
        .find("cannot start tutorial: no data source set")
        .expect("warning emitted");
    assert_eq!(event.level, tracing::Level::WARN);
}

#[test]
fn start_is_logged_inside_run_span() {
    let (capture, ()) = capture(|| {
        let mut host = Host::new(ScriptedDataSource::stacked(2));
        host.start_settled(Host::instant_config());
    });
    let started = capture.find("tutorial started").expect("start logged");
    assert_eq!(started.level, tracing::Level::INFO);
    assert_eq!(started.span.as_deref(), Some("coachmark.run"));
    assert!(started.fields.iter().any(|f| f == "count"));
}

#[test]
fn end_is_logged_with_skip_flag() {
    let (capture, ()) = capture(|| {
        let mut host = Host::new(ScriptedDataSource::stacked(2));
        host.start_settled(Host::instant_config());
        host.stop(true);
    });
    let ended = capture.find("tutorial ended").expect("end logged");
    assert_eq!(ended.level, tracing::Level::INFO);
    assert!(ended.fields.iter().any(|f| f == "skipped"));
}

#[test]
fn ignored_commands_do_not_warn_at_error_level() {
    let (capture, ()) = capture(|| {
        let mut host = Host::new(ScriptedDataSource::stacked(2));
        host.resume();
        host.show_next();
        host.update_current_coach_mark();
        host.stop(false);
    });
    assert!(
        capture
            .events()
            .iter()
            .all(|e| e.level != tracing::Level::ERROR)
    );
    assert!(
        capture
            .find("show_next ignored; not presenting")
            .is_some_and(|e| e.level == tracing::Level::WARN)
    );
}
