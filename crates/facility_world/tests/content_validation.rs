//! Content/schema validation tests for the shipped JSON tables.
//!
//! These load the real `content/*.json` files and check:
//! 1. Schema validity: every file deserializes
//! 2. Agreement with the fixture tables the engine unit tests use
//! 3. The demo snapshot loads and evaluates
//! 4. Malformed content directories fail with a useful error

use facility_core::test_fixtures::base_content;
use facility_core::{
    evaluate_facility, ChillerTier, CoolingUnitKind, CustomerType, Environment, FacilityContent,
    PduKind, SuiteTier,
};
use facility_world::{load_content, load_snapshot};
use std::sync::OnceLock;

/// Integration tests run from the crate directory, so go up two levels.
fn workspace_path(rel: &str) -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../{rel}")
}

fn load_test_content() -> &'static FacilityContent {
    static CONTENT: OnceLock<FacilityContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&workspace_path("content"))
            .expect("load_content should succeed for shipped content")
    })
}

// =========================================================================
// 1. Schema
// =========================================================================

#[test]
fn content_loads_successfully() {
    let content = load_test_content();
    assert!(!content.content_version.is_empty());
}

#[test]
fn every_closed_enum_has_a_def() {
    let content = load_test_content();
    for kind in [
        CoolingUnitKind::FanTray,
        CoolingUnitKind::Crac,
        CoolingUnitKind::Crah,
        CoolingUnitKind::ImmersionPod,
    ] {
        assert!(content.cooling_units.contains_key(&kind), "{kind:?} missing");
    }
    for tier in [ChillerTier::Basic, ChillerTier::Advanced] {
        assert!(content.chillers.contains_key(&tier), "{tier:?} missing");
    }
    for kind in [PduKind::Basic, PduKind::Metered, PduKind::Smart] {
        assert!(content.pdus.contains_key(&kind), "{kind:?} missing");
    }
    for customer in [
        CustomerType::General,
        CustomerType::AiTraining,
        CustomerType::Streaming,
        CustomerType::Crypto,
        CustomerType::Enterprise,
    ] {
        assert!(content.customers.contains_key(&customer), "{customer:?} missing");
    }
    for environment in [Environment::Production, Environment::Lab, Environment::Management] {
        assert!(
            content.environments.contains_key(&environment),
            "{environment:?} missing"
        );
    }
    for tier in [
        SuiteTier::Starter,
        SuiteTier::Standard,
        SuiteTier::Professional,
        SuiteTier::Enterprise,
    ] {
        assert!(content.suite_layouts.contains_key(&tier), "{tier:?} missing");
    }
}

// =========================================================================
// 2. Fixture agreement
// =========================================================================

#[test]
fn shipped_tables_match_test_fixtures() {
    let content = load_test_content();
    let fixtures = base_content();
    assert_eq!(content.constants, fixtures.constants);
    assert_eq!(content.cooling_units, fixtures.cooling_units);
    assert_eq!(content.chillers, fixtures.chillers);
    assert_eq!(content.pdus, fixtures.pdus);
    assert_eq!(content.customers, fixtures.customers);
    assert_eq!(content.environments, fixtures.environments);
    assert_eq!(content.suite_layouts, fixtures.suite_layouts);
}

#[test]
fn general_customers_have_no_zone_bonus() {
    let content = load_test_content();
    assert!(content.customers[&CustomerType::General].zone_bonus.is_none());
}

#[test]
fn layouts_grow_with_tier() {
    let content = load_test_content();
    let columns: Vec<u32> = content.suite_layouts.values().map(|l| l.columns).collect();
    assert!(columns.windows(2).all(|w| w[0] < w[1]), "{columns:?}");
    for layout in content.suite_layouts.values() {
        assert_eq!(layout.aisles.len() + 1, layout.cabinet_rows.len());
    }
}

// =========================================================================
// 3. Demo snapshot
// =========================================================================

#[test]
fn demo_snapshot_loads_and_evaluates() {
    let content = load_test_content();
    let snapshot = load_snapshot(&workspace_path("scenarios/demo_facility.json"), content)
        .expect("demo snapshot should load");
    assert_eq!(snapshot.suite_tier, SuiteTier::Standard);

    let report = evaluate_facility(&snapshot, content);
    assert_eq!(report.cabinets.len(), snapshot.cabinets.len());
    assert!(report.stats.total_power_w > 0.0);
    assert!(report.stats.pue >= 1.0);
    assert!(report.traffic.total_flows > 0);
    assert!(!report.zones.is_empty());
    assert_eq!(report.chiller_links.len(), 1);
    assert!(report.chiller_links[0].connection.connected);
    assert!(report.messy_cables > 0);
}

// =========================================================================
// 4. Malformed content
// =========================================================================

fn copy_content_to(dir: &std::path::Path) {
    for entry in std::fs::read_dir(workspace_path("content")).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), dir.join(entry.file_name())).unwrap();
    }
}

#[test]
fn missing_file_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    copy_content_to(dir.path());
    std::fs::remove_file(dir.path().join("chillers.json")).unwrap();

    let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("reading chillers.json"));
}

#[test]
fn unparseable_file_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    copy_content_to(dir.path());
    std::fs::write(dir.path().join("pdus.json"), "{ \"basic\": ").unwrap();

    let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("parsing pdus.json"));
}

#[test]
fn unknown_enum_key_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    copy_content_to(dir.path());
    std::fs::write(
        dir.path().join("chillers.json"),
        r#"{ "quantum": { "range": 4, "efficiency_bonus": 0.2 } }"#,
    )
    .unwrap();

    let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("parsing chillers.json"));
}

#[test]
fn invalid_values_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    copy_content_to(dir.path());
    std::fs::write(
        dir.path().join("pdus.json"),
        r#"{ "basic": { "range": 0 } }"#,
    )
    .unwrap();

    let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("validating content"));
    assert!(msg.contains("zero range"));
}

#[test]
fn snapshot_with_dangling_cable_is_rejected() {
    let content = load_test_content();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{
            "suite_tier": "starter",
            "cable_runs": [
                { "id": "run_1", "cabinet_id": "nope", "spine_id": "nope", "in_tray": true }
            ]
        }"#,
    )
    .unwrap();

    let err = load_snapshot(path.to_str().unwrap(), content).unwrap_err();
    assert!(format!("{err:#}").contains("unknown cabinet 'nope'"));
}
