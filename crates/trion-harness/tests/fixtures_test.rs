use trion_harness::fixtures::FixtureSet;

#[test]
fn builtin_fixture_set_has_a_stable_schema_version() {
    let set = FixtureSet::builtin_base12();
    assert_eq!(set.version, "1");
    assert_eq!(set.family, "base12");
    assert!(!set.cases.is_empty());
}

#[test]
fn fixture_set_round_trips_through_a_file() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("trion-harness-fixture-test-{}.json", std::process::id()));
    let set = FixtureSet::builtin_base12();
    std::fs::write(&path, set.to_json().unwrap()).unwrap();

    let loaded = FixtureSet::from_file(&path).unwrap();
    assert_eq!(loaded.cases.len(), set.cases.len());

    let _ = std::fs::remove_file(&path);
}
