//! Content and snapshot loading shared by the CLI and any host process.

mod overrides;

pub use overrides::{apply_overrides, VALID_KEYS};

use anyhow::{ensure, Context, Result};
use facility_core::{
    ChillerDef, ChillerTier, Constants, CoolingUnitDef, CoolingUnitKind, CustomerDef,
    CustomerType, Environment, EnvironmentDef, FacilityContent, FacilitySnapshot, GridPos,
    PduDef, PduKind, SuiteLayout, SuiteTier,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Deserialize)]
struct SuiteLayoutsFile {
    content_version: String,
    layouts: BTreeMap<SuiteTier, SuiteLayout>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

pub fn load_content(content_dir: &str) -> Result<FacilityContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let cooling_units: BTreeMap<CoolingUnitKind, CoolingUnitDef> =
        read_json(dir, "cooling_units.json")?;
    let chillers: BTreeMap<ChillerTier, ChillerDef> = read_json(dir, "chillers.json")?;
    let pdus: BTreeMap<PduKind, PduDef> = read_json(dir, "pdus.json")?;
    let customers: BTreeMap<CustomerType, CustomerDef> = read_json(dir, "customers.json")?;
    let environments: BTreeMap<Environment, EnvironmentDef> =
        read_json(dir, "environments.json")?;
    let layouts_file: SuiteLayoutsFile = read_json(dir, "suite_layouts.json")?;

    let content = FacilityContent {
        content_version: layouts_file.content_version,
        constants,
        cooling_units,
        chillers,
        pdus,
        customers,
        environments,
        suite_layouts: layouts_file.layouts,
    };
    validate_content(&content).with_context(|| format!("validating content in {content_dir}"))?;
    tracing::info!(
        content_version = %content.content_version,
        cooling_units = content.cooling_units.len(),
        chillers = content.chillers.len(),
        pdus = content.pdus.len(),
        customers = content.customers.len(),
        suite_layouts = content.suite_layouts.len(),
        "content loaded"
    );
    Ok(content)
}

/// Rejects authoring mistakes the engine would otherwise absorb silently:
/// negative constants, zero ranges or capacities, and aisles that do not sit
/// between two of their layout's cabinet rows.
pub fn validate_content(content: &FacilityContent) -> Result<()> {
    validate_constants(&content.constants)?;

    for (kind, def) in &content.cooling_units {
        ensure!(
            def.cooling_rate >= 0.0,
            "cooling unit {kind:?} has negative cooling_rate {}",
            def.cooling_rate
        );
        ensure!(def.range > 0, "cooling unit {kind:?} has zero range");
        ensure!(def.max_cabinets > 0, "cooling unit {kind:?} has zero max_cabinets");
    }
    for (tier, def) in &content.chillers {
        ensure!(def.range > 0, "chiller {tier:?} has zero range");
        ensure!(
            def.efficiency_bonus >= 0.0,
            "chiller {tier:?} has negative efficiency_bonus {}",
            def.efficiency_bonus
        );
    }
    for (kind, def) in &content.pdus {
        ensure!(def.range > 0, "PDU {kind:?} has zero range");
    }
    for (customer, def) in &content.customers {
        ensure!(
            def.power_multiplier >= 0.0 && def.bandwidth_multiplier >= 0.0,
            "customer {customer:?} has a negative multiplier"
        );
        if let Some(bonus) = def.zone_bonus {
            ensure!(bonus.revenue >= 0.0, "customer {customer:?} has negative zone revenue");
        }
    }
    for (environment, def) in &content.environments {
        ensure!(
            def.zone_bonus.revenue >= 0.0 && def.zone_bonus.heat_reduction >= 0.0,
            "environment {environment:?} has a negative zone bonus"
        );
    }
    for (tier, layout) in &content.suite_layouts {
        validate_layout(*tier, layout)?;
    }
    Ok(())
}

fn validate_constants(c: &Constants) -> Result<()> {
    let non_negative = [
        ("ambient_heat", c.ambient_heat),
        ("server_power_w", c.server_power_w),
        ("leaf_switch_power_w", c.leaf_switch_power_w),
        ("spine_switch_power_w", c.spine_switch_power_w),
        ("management_bonus_per_server", c.management_bonus_per_server),
        ("management_bonus_cap", c.management_bonus_cap),
        ("gbps_per_server", c.gbps_per_server),
        ("link_capacity_gbps", c.link_capacity_gbps),
        (
            "high_bandwidth_link_capacity_gbps",
            c.high_bandwidth_link_capacity_gbps,
        ),
        ("ambient_cooling_rate", c.ambient_cooling_rate),
        ("chiller_unconnected_penalty", c.chiller_unconnected_penalty),
        ("aisle_pair_bonus", c.aisle_pair_bonus),
        ("aisle_bonus_max", c.aisle_bonus_max),
        ("containment_bonus", c.containment_bonus),
        ("containment_bonus_max", c.containment_bonus_max),
        ("adjacency_heat_penalty", c.adjacency_heat_penalty),
        ("trapped_air_penalty", c.trapped_air_penalty),
        ("front_clearance_cooling", c.front_clearance_cooling),
        ("rear_clearance_cooling", c.rear_clearance_cooling),
        ("mixed_env_penalty", c.mixed_env_penalty),
        ("dedicated_row_bonus", c.dedicated_row_bonus),
    ];
    for (name, value) in non_negative {
        ensure!(
            value.is_finite() && value >= 0.0,
            "constant {name} must be a non-negative number, got {value}"
        );
    }
    ensure!(
        c.management_bonus_cap <= 1.0,
        "constant management_bonus_cap must not exceed 1.0, got {}",
        c.management_bonus_cap
    );
    ensure!(c.zone_min_size >= 1, "constant zone_min_size must be at least 1");
    Ok(())
}

fn validate_layout(tier: SuiteTier, layout: &SuiteLayout) -> Result<()> {
    ensure!(layout.columns > 0, "suite layout {tier:?} has zero columns");
    let rows: HashSet<i32> = layout.cabinet_rows.iter().copied().collect();
    for aisle in &layout.aisles {
        ensure!(
            aisle.upper_row != aisle.lower_row,
            "suite layout {tier:?} aisle '{}' references row {} twice",
            aisle.id,
            aisle.upper_row
        );
        for row in [aisle.upper_row, aisle.lower_row] {
            ensure!(
                rows.contains(&row),
                "suite layout {tier:?} aisle '{}' references row {row} not in cabinet_rows",
                aisle.id
            );
        }
    }
    Ok(())
}

pub fn load_snapshot(path: &str, content: &FacilityContent) -> Result<FacilitySnapshot> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let snapshot: FacilitySnapshot =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    validate_snapshot(&snapshot, content).with_context(|| format!("validating {path}"))?;
    tracing::info!(
        suite_tier = ?snapshot.suite_tier,
        cabinets = snapshot.cabinets.len(),
        spines = snapshot.spines.len(),
        cooling_units = snapshot.cooling_units.len(),
        chillers = snapshot.chillers.len(),
        pdus = snapshot.pdus.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Largest absolute tile coordinate a snapshot may use.
pub const MAX_COORD: u32 = 1_000_000;

fn ensure_on_floor(what: &str, pos: GridPos) -> Result<()> {
    ensure!(
        pos.col.unsigned_abs() <= MAX_COORD && pos.row.unsigned_abs() <= MAX_COORD,
        "{what} at ({}, {}) lies outside the ±{MAX_COORD} floor bounds",
        pos.col,
        pos.row
    );
    Ok(())
}

/// Cross-reference checks on a snapshot built outside the engine.
pub fn validate_snapshot(snapshot: &FacilitySnapshot, content: &FacilityContent) -> Result<()> {
    let placed = snapshot
        .cabinets
        .iter()
        .map(|c| (format!("cabinet '{}'", c.id), c.pos))
        .chain(
            snapshot
                .cooling_units
                .iter()
                .map(|u| (format!("cooling unit '{}'", u.id), u.pos)),
        )
        .chain(
            snapshot
                .chillers
                .iter()
                .map(|ch| (format!("chiller '{}'", ch.id), ch.pos)),
        )
        .chain(snapshot.pdus.iter().map(|p| (format!("PDU '{}'", p.id), p.pos)))
        .chain(snapshot.pipes.iter().map(|p| ("pipe".to_string(), p.pos)));
    for (what, pos) in placed {
        ensure_on_floor(&what, pos)?;
    }

    let mut cabinet_ids = HashSet::new();
    let mut positions = HashSet::new();
    for cabinet in &snapshot.cabinets {
        ensure!(
            cabinet_ids.insert(&cabinet.id),
            "duplicate cabinet id '{}'",
            cabinet.id
        );
        ensure!(
            positions.insert(cabinet.pos),
            "cabinet '{}' shares tile ({}, {}) with another cabinet",
            cabinet.id,
            cabinet.pos.col,
            cabinet.pos.row
        );
    }
    let spine_ids: HashSet<_> = snapshot.spines.iter().map(|s| &s.id).collect();
    for run in &snapshot.cable_runs {
        ensure!(
            cabinet_ids.contains(&run.cabinet_id),
            "cable run '{}' references unknown cabinet '{}'",
            run.id,
            run.cabinet_id
        );
        ensure!(
            spine_ids.contains(&run.spine_id),
            "cable run '{}' references unknown spine '{}'",
            run.id,
            run.spine_id
        );
    }
    ensure!(
        snapshot.demand_multiplier.is_finite() && snapshot.demand_multiplier >= 0.0,
        "demand_multiplier must be a non-negative number, got {}",
        snapshot.demand_multiplier
    );

    let aisle_ids: HashSet<_> = content
        .suite_layouts
        .get(&snapshot.suite_tier)
        .map(|layout| layout.aisles.iter().map(|a| &a.id).collect())
        .unwrap_or_default();
    for aisle in &snapshot.containment {
        ensure!(
            aisle_ids.contains(aisle),
            "containment names aisle '{aisle}' which is not part of the {:?} suite",
            snapshot.suite_tier
        );
    }
    Ok(())
}
