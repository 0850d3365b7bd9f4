#![forbid(unsafe_code)]

//! Delegate that records every callback.
//!
//! The log can be dumped as JSONL for failing runs and reduced to a blake3
//! digest so two runs can be compared for determinism.
//!
//! ```json
//! {"event":"did_show","index":0,"change":null,"poi":[45.0,70.0]}
//! {"event":"did_end","skipped":false}
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use coachmark_core::{ConfigurationChange, Point};
use coachmark_layout::CoachMark;
use coachmark_runtime::CoachMarksDelegate;

/// One delegate callback.
#[derive(Debug, Clone, PartialEq)]
pub enum TutorialEvent {
    WillShow {
        index: usize,
        change: Option<ConfigurationChange>,
    },
    DidShow {
        index: usize,
        change: Option<ConfigurationChange>,
        point_of_interest: Option<Point>,
    },
    WillHide {
        index: usize,
    },
    DidHide {
        index: usize,
    },
    DidEnd {
        skipped: bool,
    },
    Declined {
        index: usize,
    },
    OverlayTap {
        index: usize,
        handled: bool,
    },
}

impl TutorialEvent {
    /// Event name as used in JSONL output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WillShow { .. } => "will_show",
            Self::DidShow { .. } => "did_show",
            Self::WillHide { .. } => "will_hide",
            Self::DidHide { .. } => "did_hide",
            Self::DidEnd { .. } => "did_end",
            Self::Declined { .. } => "declined",
            Self::OverlayTap { .. } => "overlay_tap",
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let change = |c: &Option<ConfigurationChange>| c.map(ConfigurationChange::as_str);
        match self {
            Self::WillShow { index, change: c } => {
                serde_json::json!({"event": self.name(), "index": index, "change": change(c)})
            }
            Self::DidShow {
                index,
                change: c,
                point_of_interest,
            } => serde_json::json!({
                "event": self.name(),
                "index": index,
                "change": change(c),
                "poi": point_of_interest.map(|p| [p.x, p.y]),
            }),
            Self::WillHide { index } | Self::DidHide { index } | Self::Declined { index } => {
                serde_json::json!({"event": self.name(), "index": index})
            }
            Self::DidEnd { skipped } => {
                serde_json::json!({"event": self.name(), "skipped": skipped})
            }
            Self::OverlayTap { index, handled } => {
                serde_json::json!({"event": self.name(), "index": index, "handled": handled})
            }
        }
    }
}

/// Shared, append-only list of events.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<TutorialEvent>>>);

impl EventLog {
    pub fn push(&self, event: TutorialEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<TutorialEvent> {
        self.0.borrow().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<TutorialEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Indices passed to `did_show`, in order.
    pub fn shown(&self) -> Vec<usize> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TutorialEvent::DidShow { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// `skipped` of every `did_end`, in order.
    pub fn ends(&self) -> Vec<bool> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TutorialEvent::DidEnd { skipped } => Some(*skipped),
                _ => None,
            })
            .collect()
    }

    /// One JSON object per line.
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for event in self.0.borrow().iter() {
            out.push_str(&event.to_json().to_string());
            out.push('\n');
        }
        out
    }

    /// blake3 of the JSONL dump.
    pub fn digest(&self) -> String {
        format!("blake3:{}", blake3::hash(self.to_jsonl().as_bytes()).to_hex())
    }
}

type WillShowHook = Box<dyn FnMut(&mut CoachMark, usize)>;

/// Delegate that logs every callback into an [`EventLog`] and can be told to
/// decline steps or overlay taps.
pub struct RecordingDelegate {
    log: EventLog,
    declined: BTreeSet<usize>,
    refuse_overlay_taps: bool,
    will_show: Option<WillShowHook>,
}

impl std::fmt::Debug for RecordingDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingDelegate")
            .field("events", &self.log.len())
            .field("declined", &self.declined)
            .field("refuse_overlay_taps", &self.refuse_overlay_taps)
            .finish_non_exhaustive()
    }
}

impl RecordingDelegate {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            declined: BTreeSet::new(),
            refuse_overlay_taps: false,
            will_show: None,
        }
    }

    /// Decline step `index` in `should_load_configuration`.
    #[must_use]
    pub fn declining(mut self, index: usize) -> Self {
        self.declined.insert(index);
        self
    }

    /// Return `false` from `should_handle_overlay_tap`.
    #[must_use]
    pub fn refusing_overlay_taps(mut self) -> Self {
        self.refuse_overlay_taps = true;
        self
    }

    /// Run `hook` on every record in `will_show`.
    #[must_use]
    pub fn on_will_show(mut self, hook: impl FnMut(&mut CoachMark, usize) + 'static) -> Self {
        self.will_show = Some(Box::new(hook));
        self
    }
}

impl CoachMarksDelegate for RecordingDelegate {
    fn should_load_configuration(&mut self, index: usize) -> bool {
        let load = !self.declined.contains(&index);
        if !load {
            self.log.push(TutorialEvent::Declined { index });
        }
        load
    }

    fn will_show(&mut self, record: &mut CoachMark, change: Option<ConfigurationChange>, index: usize) {
        if let Some(hook) = self.will_show.as_mut() {
            hook(record, index);
        }
        self.log.push(TutorialEvent::WillShow { index, change });
    }

    fn did_show(&mut self, record: &CoachMark, change: Option<ConfigurationChange>, index: usize) {
        self.log.push(TutorialEvent::DidShow {
            index,
            change,
            point_of_interest: record.point_of_interest,
        });
    }

    fn will_hide(&mut self, _record: &CoachMark, index: usize) {
        self.log.push(TutorialEvent::WillHide { index });
    }

    fn did_hide(&mut self, _record: &CoachMark, index: usize) {
        self.log.push(TutorialEvent::DidHide { index });
    }

    fn did_end(&mut self, skipped: bool) {
        self.log.push(TutorialEvent::DidEnd { skipped });
    }

    fn should_handle_overlay_tap(&mut self, index: usize) -> bool {
        let handled = !self.refuse_overlay_taps;
        self.log.push(TutorialEvent::OverlayTap { index, handled });
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_has_one_line_per_event() {
        let log = EventLog::default();
        log.push(TutorialEvent::WillHide { index: 1 });
        log.push(TutorialEvent::DidEnd { skipped: true });
        let dump = log.to_jsonl();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"will_hide","index":1}"#);
        assert_eq!(lines[1], r#"{"event":"did_end","skipped":true}"#);
    }

    #[test]
    fn digest_tracks_content() {
        let a = EventLog::default();
        let b = EventLog::default();
        a.push(TutorialEvent::DidHide { index: 0 });
        b.push(TutorialEvent::DidHide { index: 0 });
        assert_eq!(a.digest(), b.digest());
        assert!(a.digest().starts_with("blake3:"));
        b.push(TutorialEvent::DidEnd { skipped: false });
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn declining_delegate_refuses_step() {
        let log = EventLog::default();
        let mut delegate = RecordingDelegate::new(log.clone()).declining(1);
        assert!(delegate.should_load_configuration(0));
        assert!(!delegate.should_load_configuration(1));
        assert_eq!(log.events(), vec![TutorialEvent::Declined { index: 1 }]);
    }
}
