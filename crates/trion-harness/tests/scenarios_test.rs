//! End-to-end test driving the harness's scenario runner as an external
//! consumer would (via the published `trion_harness` API, not internals).

use trion_harness::runner::{run_all, run_named};
use trion_harness::structured_log::Outcome;

#[test]
fn every_spec_scenario_passes() {
    let reports = run_all();
    assert_eq!(reports.len(), 6);
    for report in &reports {
        assert_eq!(report.outcome, Outcome::Pass, "{}: {}", report.name, report.detail);
    }
}

#[test]
fn scenarios_are_independently_addressable_by_name() {
    for name in [
        "quarantine_seal_destroy",
        "channel_ring_semantics",
        "base12_fixed_point",
        "base12_big_integer",
        "capsule_lifecycle_observation",
        "syscall_auth_round_trip",
    ] {
        let report = run_named(name).unwrap_or_else(|| panic!("missing scenario: {name}"));
        assert_eq!(report.outcome, Outcome::Pass, "{name}: {}", report.detail);
    }
}
