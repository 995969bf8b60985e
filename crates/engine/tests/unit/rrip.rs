//! SRRIP Tests.
//!
//! Lines start distant (RRPV 3). Hits reset to 0, fills land at 2, and a
//! victim search ages the whole set until some way is distant again.

use pretty_assertions::assert_eq;
use replsim_core::common::Access;
use replsim_core::config::{CacheLevel, ContestantEngine, VictimTiming};
use rstest::rstest;

use crate::common::{build, contestant_config, fill_set, rrpvs, victim};

fn rrip(ways: usize) -> replsim_core::ReplacementState {
    build(&contestant_config(
        4,
        ways,
        CacheLevel::L2,
        ContestantEngine::Rrip,
    ))
}

fn deferred(ways: usize) -> replsim_core::ReplacementState {
    let mut config = contestant_config(4, ways, CacheLevel::L2, ContestantEngine::Rrip);
    config.contestant.rrip.victim_timing = VictimTiming::Deferred;
    build(&config)
}

// ══════════════════════════════════════════════════════════
// 1. Immediate timing
// ══════════════════════════════════════════════════════════

/// Fresh 16-way set: way 0 is already distant, so no ageing is needed.
#[test]
fn fresh_set_evicts_way_zero() {
    let mut state = rrip(16);
    assert_eq!(victim(&mut state, 0), 0);
    assert_eq!(state.line(0, 0).unwrap().rrpv, 2);
    assert!(rrpvs(&state, 0)[1..].iter().all(|&v| v == 3));
    assert_eq!(state.stats().aging_passes, 0);
}

#[test]
fn hit_resets_prediction() {
    let mut state = rrip(4);
    state.update(&Access::miss(1, 2, 0x9, 0x400)).unwrap();
    assert_eq!(rrpvs(&state, 1), vec![3, 3, 2, 3]);
    state.update(&Access::hit(1, 2, 0x9, 0x400)).unwrap();
    assert_eq!(rrpvs(&state, 1), vec![3, 3, 0, 3]);
}

/// Every way recently hit: three ageing steps before one reaches 3.
#[test]
fn all_near_set_ages_three_times() {
    let mut state = rrip(4);
    for way in 0..4 {
        state.update(&Access::hit(0, way, way as u64, 0x400)).unwrap();
    }
    assert_eq!(victim(&mut state, 0), 0);
    assert_eq!(rrpvs(&state, 0), vec![2, 3, 3, 3]);
    assert_eq!(state.stats().aging_passes, 3);
}

#[test]
fn filled_set_ages_once() {
    let mut state = rrip(8);
    fill_set(&mut state, 0, 0x100, 0x400);
    assert!(rrpvs(&state, 0).iter().all(|&v| v == 2));

    assert_eq!(victim(&mut state, 0), 0);
    assert_eq!(state.stats().aging_passes, 1);
    assert_eq!(rrpvs(&state, 0), vec![2, 3, 3, 3, 3, 3, 3, 3]);
}

/// A line that keeps hitting outlives a scan of single-use lines.
#[test]
fn reused_line_survives_scan() {
    let mut state = rrip(4);
    fill_set(&mut state, 0, 0x100, 0x400);
    state.update(&Access::hit(0, 1, 0x101, 0x400)).unwrap();

    for tag in 0x200..0x210 {
        let way = victim(&mut state, 0);
        assert_ne!(way, 1, "scan evicted the reused line");
        state.update(&Access::miss(0, way, tag, 0x800)).unwrap();
        state.update(&Access::hit(0, 1, 0x101, 0x400)).unwrap();
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(16)]
fn rrpvs_stay_in_range(#[case] ways: usize) {
    let mut state = rrip(ways);
    for i in 0..200u64 {
        let way = victim(&mut state, 0);
        state.update(&Access::miss(0, way, i, 0x400)).unwrap();
        if i % 3 == 0 {
            state.update(&Access::hit(0, way, i, 0x400)).unwrap();
        }
        assert!(rrpvs(&state, 0).iter().all(|&v| v <= 3));
    }
}

// ══════════════════════════════════════════════════════════
// 2. Deferred timing
// ══════════════════════════════════════════════════════════

#[test]
fn deferred_parks_victim_per_set() {
    let mut state = deferred(4);
    assert_eq!(state.rrip().unwrap().timing(), VictimTiming::Deferred);

    state.update(&Access::miss(0, 0, 0xA, 0x400)).unwrap();
    assert_eq!(state.rrip().unwrap().parked_victim(0), Some(1));
    assert_eq!(state.rrip().unwrap().parked_victim(1), None);
    assert_eq!(rrpvs(&state, 0), vec![2, 2, 3, 3]);

    assert_eq!(victim(&mut state, 0), 1);
    assert_eq!(state.rrip().unwrap().parked_victim(0), None);

    state.update(&Access::miss(0, 1, 0xB, 0x400)).unwrap();
    assert_eq!(state.rrip().unwrap().parked_victim(0), Some(2));
    assert_eq!(rrpvs(&state, 0), vec![2, 2, 2, 3]);
}

#[test]
fn deferred_hit_on_parked_way_clears_slot() {
    let mut state = deferred(4);
    state.update(&Access::miss(0, 0, 0xA, 0x400)).unwrap();
    let _ = victim(&mut state, 0);
    state.update(&Access::miss(0, 1, 0xB, 0x400)).unwrap();

    state.update(&Access::hit(0, 2, 0xC, 0x400)).unwrap();
    assert_eq!(state.rrip().unwrap().parked_victim(0), None);
    assert_eq!(rrpvs(&state, 0), vec![2, 2, 0, 3]);

    assert_eq!(victim(&mut state, 0), 3);
    assert_eq!(rrpvs(&state, 0), vec![2, 2, 0, 2]);
}

#[test]
fn deferred_slots_do_not_leak_between_sets() {
    let mut state = deferred(4);
    state.update(&Access::miss(2, 0, 0xA, 0x400)).unwrap();
    assert_eq!(state.rrip().unwrap().parked_victim(2), Some(1));
    // Set 3 has nothing parked and searches on demand.
    assert_eq!(victim(&mut state, 3), 0);
    assert_eq!(state.rrip().unwrap().parked_victim(2), Some(1));
}

#[test]
fn immediate_never_parks() {
    let mut state = rrip(4);
    state.update(&Access::miss(0, 0, 0xA, 0x400)).unwrap();
    assert_eq!(state.rrip().unwrap().timing(), VictimTiming::Immediate);
    assert_eq!(state.rrip().unwrap().parked_victim(0), None);
    assert_eq!(rrpvs(&state, 0), vec![2, 3, 3, 3]);
}

#[test]
fn unmanaged_level_uses_lru() {
    let mut state = build(&contestant_config(
        1,
        4,
        CacheLevel::L1,
        ContestantEngine::Rrip,
    ));
    assert!(state.rrip().is_none());
    fill_set(&mut state, 0, 0x100, 0x400);
    assert_eq!(rrpvs(&state, 0), vec![3, 3, 3, 3]);
    assert_eq!(victim(&mut state, 0), 0);
}
