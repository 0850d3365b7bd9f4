#![forbid(unsafe_code)]

//! Seeded command storms: invariants hold and identical seeds replay to
//! identical event logs.
//!
//! Run:
//!   cargo test -p coachmark-harness --test storm_determinism

use coachmark_harness::{Host, ScriptedDataSource, generate_commands, run_storm};
use proptest::prelude::*;

fn storm_host() -> Host {
    Host::new(
        ScriptedDataSource::stacked(5).with_animation_duration(std::time::Duration::from_millis(80)),
    )
}

#[test]
fn same_seed_same_digest() {
    let commands = generate_commands(0x5eed, 400);

    let mut a = storm_host();
    let mut b = storm_host();
    run_storm(&mut a, &commands).unwrap_or_else(|(i, e)| panic!("command {i}: {e}"));
    run_storm(&mut b, &commands).unwrap_or_else(|(i, e)| panic!("command {i}: {e}"));

    assert!(!a.log().is_empty());
    assert_eq!(a.log().digest(), b.log().digest());
    assert!(a.log().digest().starts_with("blake3:"));
}

#[test]
fn storms_start_runs() {
    let commands = generate_commands(7, 600);
    let mut host = storm_host();
    let state = run_storm(&mut host, &commands).unwrap_or_else(|(i, e)| panic!("command {i}: {e}"));
    assert!(state.runs_started() >= 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_for_any_seed(seed in any::<u64>(), len in 1usize..300) {
        let commands = generate_commands(seed, len);
        let mut host = storm_host();
        if let Err((i, e)) = run_storm(&mut host, &commands) {
            prop_assert!(false, "seed {seed}, command {i} ({:?}): {e}", commands[i]);
        }
        // Whatever happened, stopping always lands in idle with one end per run.
        host.stop(true);
        prop_assert!(!host.is_started());
        prop_assert!(host.display().presented().is_none());
    }
}
