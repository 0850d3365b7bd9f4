#![forbid(unsafe_code)]

//! Deterministic command storms.
//!
//! A storm is a seeded sequence of host commands (taps, pauses, stops,
//! configuration changes, clock ticks) thrown at a [`Host`]. After every
//! command [`check_invariants`] verifies what must hold no matter the order:
//!
//! - `did_end` fires at most once per run, and only after the run is idle.
//! - Within a run the step index never decreases.
//! - A presenting machine has a current record and nothing in flight.
//! - An idle machine has no callout on screen.

use coachmark_core::{Point, Rect};
use coachmark_runtime::{DisplayCoordinator, OverlayConfig, PauseAction, Phase, TutorialConfig};
use web_time::Duration;

use crate::host::{DEFAULT_CONTAINER, Host};

/// One storm command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start,
    ShowNext,
    OverlayTap(Point),
    CoachMarkTap,
    SkipTap,
    Pause(PauseAction),
    Resume,
    Update,
    Stop { immediate: bool },
    WillChange,
    DidChange,
    Rotate,
    Tick(u64),
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ShowNext => "show_next",
            Self::OverlayTap(_) => "overlay_tap",
            Self::CoachMarkTap => "coach_mark_tap",
            Self::SkipTap => "skip_tap",
            Self::Pause(_) => "pause",
            Self::Resume => "resume",
            Self::Update => "update",
            Self::Stop { .. } => "stop",
            Self::WillChange => "will_change",
            Self::DidChange => "did_change",
            Self::Rotate => "rotate",
            Self::Tick(_) => "tick",
        }
    }
}

/// Simple deterministic PRNG (xorshift64).
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn below(&mut self, max: u64) -> u64 {
        if max == 0 { 0 } else { self.next() % max }
    }
}

/// `count` commands from `seed`. Ticks are weighted up so runs make progress.
pub fn generate_commands(seed: u64, count: usize) -> Vec<Command> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| match rng.below(16) {
            0 => Command::Start,
            1 | 2 => Command::ShowNext,
            3 => Command::OverlayTap(Point::new(
                rng.below(320) as f64,
                rng.below(480) as f64,
            )),
            4 => Command::CoachMarkTap,
            5 => Command::SkipTap,
            6 => Command::Pause(match rng.below(3) {
                0 => PauseAction::HideOverlayAndContent,
                1 => PauseAction::HideOverlayOnly,
                _ => PauseAction::DoNothing,
            }),
            7 => Command::Resume,
            8 => Command::Update,
            9 => Command::Stop {
                immediate: rng.below(2) == 0,
            },
            10 => Command::WillChange,
            11 => Command::DidChange,
            12 => Command::Rotate,
            _ => Command::Tick(rng.below(200)),
        })
        .collect()
}

/// Overlay fades take a few frames so commands land mid-transition.
pub fn storm_config() -> TutorialConfig {
    Host::instant_config().overlay(OverlayConfig {
        fade_duration_ms: 120,
        allow_tap: true,
        ..OverlayConfig::default()
    })
}

/// Apply one command to the host.
pub fn apply(host: &mut Host, command: Command) {
    tracing::trace!(command = command.name(), phase = %host.phase(), "storm command");
    match command {
        Command::Start => host.start(storm_config()),
        Command::ShowNext => host.show_next(),
        Command::OverlayTap(point) => host.on_overlay_tap(point),
        Command::CoachMarkTap => host.on_coach_mark_tap(),
        Command::SkipTap => host.on_skip_tap(),
        Command::Pause(action) => host.pause(action),
        Command::Resume => host.resume(),
        Command::Update => host.update_current_coach_mark(),
        Command::Stop { immediate } => host.stop(immediate),
        Command::WillChange => host.on_configuration_will_change(),
        Command::DidChange => {
            host.on_configuration_did_change(coachmark_core::ConfigurationChange::StatusBar)
        }
        Command::Rotate => {
            let current = host.display().container_region().unwrap_or(DEFAULT_CONTAINER);
            host.rotate(Rect::from_size(current.height, current.width));
        }
        Command::Tick(ms) => host.tick(Duration::from_millis(ms)),
    }
}

/// Observations carried between [`check_invariants`] calls.
#[derive(Debug, Clone, Default)]
pub struct StormState {
    runs_started: usize,
    last_index: Option<usize>,
    ends_seen: usize,
    was_active: bool,
}

/// Check the storm invariants after a command.
///
/// # Errors
///
/// A description of the first violated invariant.
pub fn check_invariants(host: &Host, state: &mut StormState) -> Result<(), String> {
    let phase = host.phase();
    let ends = host.log().ends().len();

    if phase != Phase::Idle && !state.was_active {
        state.runs_started += 1;
        state.last_index = None;
    }
    if ends > state.runs_started {
        return Err(format!(
            "{ends} did_end calls for {} runs",
            state.runs_started
        ));
    }
    if ends > state.ends_seen && phase != Phase::Idle {
        return Err(format!("did_end fired while phase is {phase}"));
    }
    state.ends_seen = ends;

    if phase != Phase::Idle {
        if let (Some(last), Some(now)) = (state.last_index, host.index()) {
            if now < last {
                return Err(format!("index went back from {last} to {now}"));
            }
        }
        if host.index().is_some() {
            state.last_index = host.index();
        }
    }
    if phase == Phase::Presenting && !host.is_transitioning() && host.current_coach_mark().is_none() {
        return Err("presenting with no current coach mark".into());
    }
    if phase == Phase::Idle && host.display().presented().is_some() {
        return Err("callout still on screen after the run ended".into());
    }
    state.was_active = phase != Phase::Idle;
    Ok(())
}

/// Run `commands`, checking invariants after each. Returns the index of the
/// failing command with the violation.
///
/// # Errors
///
/// `(command index, description)` of the first violation.
pub fn run_storm(host: &mut Host, commands: &[Command]) -> Result<StormState, (usize, String)> {
    let mut state = StormState::default();
    for (i, command) in commands.iter().enumerate() {
        apply(host, *command);
        check_invariants(host, &mut state).map_err(|e| (i, e))?;
    }
    Ok(state)
}

impl StormState {
    /// Runs observed starting.
    pub fn runs_started(&self) -> usize {
        self.runs_started
    }
}
