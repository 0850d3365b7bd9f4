#![forbid(unsafe_code)]

//! A headless host around the in-crate coordinators.
//!
//! [`Host`] owns a [`TutorialStateMachine`] over [`OverlayManager`] and
//! [`CoachMarkDisplay`], a manual clock, and the [`EventLog`] its recording
//! delegate writes to. Time only moves when a test calls [`Host::tick`] or
//! [`Host::settle`].

use std::ops::{Deref, DerefMut};

use coachmark_core::{Point, Rect};
use coachmark_layout::GeometryResolver;
use coachmark_runtime::{
    CoachMarkDisplay, OverlayManager, PresentationContext, TutorialConfig, TutorialStateMachine,
};
use web_time::Duration;

use crate::fixtures::ScriptedDataSource;
use crate::recorder::{EventLog, RecordingDelegate};

/// Container used when none is given: a 320x480 portrait screen.
pub const DEFAULT_CONTAINER: Rect = Rect::from_size(320.0, 480.0);

/// Frame length used by [`Host::settle`].
pub const FRAME: Duration = Duration::from_millis(16);

/// Upper bound on frames [`Host::settle`] will run.
pub const MAX_SETTLE_FRAMES: usize = 10_000;

pub type HostMachine = TutorialStateMachine<OverlayManager, CoachMarkDisplay>;

/// Headless tutorial host.
#[derive(Debug)]
pub struct Host {
    machine: HostMachine,
    source: ScriptedDataSource,
    log: EventLog,
    elapsed: Duration,
}

impl Host {
    /// Host with the default container and a plain recording delegate.
    pub fn new(source: ScriptedDataSource) -> Self {
        let log = EventLog::default();
        Self::with_delegate(source, RecordingDelegate::new(log.clone()), log)
    }

    /// Host with a preconfigured delegate writing to `log`.
    pub fn with_delegate(
        source: ScriptedDataSource,
        delegate: RecordingDelegate,
        log: EventLog,
    ) -> Self {
        let display =
            CoachMarkDisplay::new(PresentationContext::default(), Some(DEFAULT_CONTAINER));
        let machine =
            TutorialStateMachine::new(GeometryResolver::new(), OverlayManager::default(), display)
                .with_data_source(Box::new(source.clone()))
                .with_delegate(Box::new(delegate));
        Self {
            machine,
            source,
            log,
            elapsed: Duration::ZERO,
        }
    }

    /// Configuration with every machine-level duration set to zero.
    pub fn instant_config() -> TutorialConfig {
        let mut config = TutorialConfig::default();
        config.overlay.fade_duration_ms = 0;
        config.pause_duration_ms = 0;
        config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn source(&self) -> &ScriptedDataSource {
        &self.source
    }

    /// Total time ticked so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance the clock by `delta`.
    pub fn tick(&mut self, delta: Duration) {
        self.elapsed += delta;
        self.machine.advance_animations(delta);
    }

    /// Tick frame by frame until no transition is in flight. Returns the
    /// number of frames run.
    pub fn settle(&mut self) -> usize {
        let mut frames = 0;
        while self.machine.is_transitioning() && frames < MAX_SETTLE_FRAMES {
            self.tick(FRAME);
            frames += 1;
        }
        if frames == MAX_SETTLE_FRAMES {
            tracing::warn!(frames, phase = %self.machine.phase(), "host did not settle");
        }
        frames
    }

    /// Start and settle on the first step.
    pub fn start_settled(&mut self, config: TutorialConfig) {
        self.machine.start(config);
        self.settle();
    }

    /// `show_next` and settle.
    pub fn next_settled(&mut self) {
        self.machine.show_next();
        self.settle();
    }

    /// Start, then `show_next` until the run ends. Returns the number of
    /// `show_next` calls made; gives up after `MAX_SETTLE_FRAMES` of them.
    pub fn run_to_completion(&mut self, config: TutorialConfig) -> usize {
        self.start_settled(config);
        let mut advances = 0;
        while self.machine.is_started() && advances < MAX_SETTLE_FRAMES {
            self.next_settled();
            advances += 1;
        }
        advances
    }

    /// Replace the container (e.g. a rotation), announcing it as a
    /// configuration change.
    pub fn rotate(&mut self, container: Rect) {
        self.machine.on_configuration_will_change();
        self.machine.display_mut().set_container(Some(container));
        self.machine
            .on_configuration_did_change(coachmark_core::ConfigurationChange::Size);
    }

    /// Center of the dimmed area below the container's last 40 points.
    pub fn overlay_point() -> Point {
        Point::new(DEFAULT_CONTAINER.mid_x(), DEFAULT_CONTAINER.bottom() - 20.0)
    }
}

impl Deref for Host {
    type Target = HostMachine;

    fn deref(&self) -> &HostMachine {
        &self.machine
    }
}

impl DerefMut for Host {
    fn deref_mut(&mut self) -> &mut HostMachine {
        &mut self.machine
    }
}
