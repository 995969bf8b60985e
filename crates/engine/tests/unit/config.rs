//! # Configuration Tests
//!
//! Defaults, deserialization, aliases, file loading, and validation.

use std::io::Write;

use pretty_assertions::assert_eq;
use replsim_core::ReplError;
use replsim_core::config::*;

#[test]
fn test_config_default() {
    let config = ReplacementConfig::default();
    assert_eq!(config.sets, 1024);
    assert_eq!(config.ways, 8);
    assert_eq!(config.level, CacheLevel::L2);
    assert_eq!(config.policy, PolicyKind::Lru);
    assert_eq!(config.random_seed, 123456789);
}

#[test]
fn test_contestant_defaults() {
    let contestant = ContestantConfig::default();
    assert_eq!(contestant.engine, ContestantEngine::Ship);
    assert_eq!(contestant.managed_level, CacheLevel::L2);
    assert_eq!(contestant.feeder_level, CacheLevel::L1);
    assert_eq!(contestant.rrip.victim_timing, VictimTiming::Immediate);
}

#[test]
fn test_ship_defaults() {
    let ship = ShipConfig::default();
    assert_eq!(ship.table_size, 1 << 16);
    assert_eq!(ship.counter_max, 7);
    assert_eq!(ship.variant, ShipVariant::V2);
}

#[test]
fn test_dueling_defaults() {
    let dueling = DuelingConfig::default();
    assert_eq!(dueling.leader_bits, 9);
    assert_eq!(dueling.leader_mask(), 511);
    assert_eq!(dueling.counter_max, 1023);
    assert_eq!(dueling.threshold, 128);
    assert_eq!(dueling.local_counter_init, 6);
    assert_eq!(dueling.local_counter_reset, 2);
}

#[test]
fn test_leader_mask_saturates_for_wide_widths() {
    for (bits, mask) in [(1, 1), (usize::BITS, usize::MAX), (200, usize::MAX)] {
        let dueling = DuelingConfig {
            leader_bits: bits,
            ..DuelingConfig::default()
        };
        assert_eq!(dueling.leader_mask(), mask, "leader_bits = {bits}");
    }
}

#[test]
fn test_empty_json_uses_defaults() {
    let config = ReplacementConfig::from_json("{}").unwrap();
    assert_eq!(config, ReplacementConfig::default());
}

#[test]
fn test_json_full_document() {
    let json = r#"{
        "sets": 4096,
        "ways": 16,
        "level": "L3",
        "policy": "Contestant",
        "random_seed": 7,
        "contestant": {
            "engine": "SetDueling",
            "managed_level": "L3",
            "dueling": {
                "leader_bits": 5,
                "threshold": 64
            },
            "rrip": { "victim_timing": "Deferred" },
            "ship": { "table_size": 1024, "variant": "Classic" }
        }
    }"#;

    let config = ReplacementConfig::from_json(json).unwrap();
    assert_eq!(config.sets, 4096);
    assert_eq!(config.ways, 16);
    assert_eq!(config.level, CacheLevel::L3);
    assert_eq!(config.random_seed, 7);
    assert_eq!(config.contestant.engine, ContestantEngine::SetDueling);
    assert_eq!(config.contestant.managed_level, CacheLevel::L3);
    assert_eq!(config.contestant.dueling.leader_mask(), 31);
    assert_eq!(config.contestant.dueling.threshold, 64);
    assert_eq!(config.contestant.dueling.counter_max, 1023);
    assert_eq!(config.contestant.rrip.victim_timing, VictimTiming::Deferred);
    assert_eq!(config.contestant.ship.table_size, 1024);
    assert_eq!(config.contestant.ship.variant, ShipVariant::Classic);
}

#[test]
fn test_json_aliases() {
    let config =
        ReplacementConfig::from_json(r#"{"policy": "CONTESTANT", "contestant": {"engine": "RRIP"}}"#)
            .unwrap();
    assert_eq!(config.policy, PolicyKind::Contestant);
    assert_eq!(config.contestant.engine, ContestantEngine::Rrip);

    let config = ReplacementConfig::from_json(r#"{"policy": "LRU", "level": "l1"}"#).unwrap();
    assert_eq!(config.policy, PolicyKind::Lru);
    assert_eq!(config.level, CacheLevel::L1);
}

#[test]
fn test_json_unknown_policy_is_parse_error() {
    let err = ReplacementConfig::from_json(r#"{"policy": "Belady"}"#).unwrap_err();
    assert!(matches!(err, ReplError::Parse(_)));
}

#[test]
fn test_validation_rejects_zero_geometry() {
    let err = ReplacementConfig::from_json(r#"{"sets": 0}"#).unwrap_err();
    assert!(matches!(err, ReplError::InvalidConfig(ref msg) if msg.contains("sets")));

    let err = ReplacementConfig::from_json(r#"{"ways": 0}"#).unwrap_err();
    assert!(matches!(err, ReplError::InvalidConfig(ref msg) if msg.contains("ways")));
}

#[test]
fn test_validation_rejects_ship_on_feeder_level() {
    let json = r#"{"contestant": {"engine": "Ship", "managed_level": "L1"}}"#;
    let err = ReplacementConfig::from_json(json).unwrap_err();
    assert!(matches!(err, ReplError::InvalidConfig(_)));

    // The same levels are fine for engines without a feeder.
    let json = r#"{"contestant": {"engine": "Rrip", "managed_level": "L1"}}"#;
    assert!(ReplacementConfig::from_json(json).is_ok());
}

#[test]
fn test_validation_rejects_bad_engine_tuning() {
    for json in [
        r#"{"contestant": {"ship": {"table_size": 0}}}"#,
        r#"{"contestant": {"dueling": {"leader_bits": 0}}}"#,
        r#"{"contestant": {"dueling": {"threshold": 2000}}}"#,
        r#"{"contestant": {"dueling": {"local_counter_reset": 0}}}"#,
    ] {
        let err = ReplacementConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ReplError::InvalidConfig(_)), "{json}");
    }
}

#[test]
fn test_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"sets": 64, "ways": 4, "policy": "Random"}}"#).unwrap();

    let config = ReplacementConfig::from_path(file.path()).unwrap();
    assert_eq!(config.sets, 64);
    assert_eq!(config.ways, 4);
    assert_eq!(config.policy, PolicyKind::Random);
}

#[test]
fn test_from_missing_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReplacementConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ReplError::Io(_)));
}

#[test]
fn test_builder_helpers() {
    let config = ReplacementConfig::new(32, 2, CacheLevel::L1, PolicyKind::Contestant)
        .with_engine(ContestantEngine::Rrip);
    assert_eq!(config.sets, 32);
    assert_eq!(config.ways, 2);
    assert_eq!(config.level, CacheLevel::L1);
    assert_eq!(config.contestant.engine, ContestantEngine::Rrip);
    assert_eq!(config.contestant.ship, ShipConfig::default());
}
