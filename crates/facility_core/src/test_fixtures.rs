//! Shared test fixtures for `facility_core` and downstream crates.
//!
//! `base_content()` mirrors the shipped `content/` tables so unit tests and
//! content-validation tests agree on numbers. The builders return powered,
//! unremarkable records that tests then tweak field by field.

use std::collections::BTreeMap;

use crate::{
    AisleDef, AisleId, Cabinet, CabinetId, ChillerDef, ChillerId, ChillerPlant, ChillerTier,
    Constants, CoolingPipe, CoolingUnit, CoolingUnitDef, CoolingUnitId, CoolingUnitKind,
    CustomerDef, CustomerType, Environment, EnvironmentDef, Facing, FacilityContent,
    FacilitySnapshot, GridPos, Pdu, PduDef, PduId, PduKind, SpineId, SpineSwitch, SuiteLayout,
    SuiteTier, ZoneBonus,
};

pub fn base_constants() -> Constants {
    Constants {
        ambient_heat: 22.0,
        server_power_w: 450.0,
        leaf_switch_power_w: 150.0,
        spine_switch_power_w: 250.0,
        management_bonus_per_server: 0.03,
        management_bonus_cap: 0.30,
        gbps_per_server: 1.0,
        link_capacity_gbps: 10.0,
        high_bandwidth_link_capacity_gbps: 40.0,
        ambient_cooling_rate: 1.0,
        chiller_unconnected_penalty: 0.6,
        zone_min_size: 3,
        aisle_pair_bonus: 0.05,
        aisle_bonus_max: 0.15,
        containment_bonus: 0.03,
        containment_bonus_max: 0.09,
        adjacency_heat_penalty: 1.5,
        trapped_air_penalty: 2.0,
        front_clearance_cooling: 1.0,
        rear_clearance_cooling: 0.5,
        mixed_env_penalty: 0.10,
        dedicated_row_bonus: 0.05,
    }
}

fn unit_def(
    cooling_rate: f64,
    range: u32,
    max_cabinets: u32,
    chilled_water: bool,
) -> CoolingUnitDef {
    CoolingUnitDef {
        cooling_rate,
        range,
        max_cabinets,
        chilled_water,
    }
}

fn customer(power: f64, bandwidth: f64, zone_revenue: Option<f64>) -> CustomerDef {
    CustomerDef {
        power_multiplier: power,
        bandwidth_multiplier: bandwidth,
        zone_bonus: zone_revenue.map(|revenue| ZoneBonus {
            revenue,
            heat_reduction: 0.0,
        }),
    }
}

fn environment(revenue: f64, heat_reduction: f64) -> EnvironmentDef {
    EnvironmentDef {
        zone_bonus: ZoneBonus {
            revenue,
            heat_reduction,
        },
    }
}

/// Suite layout with cabinet rows every other row and an aisle between each pair.
pub fn layout(columns: u32, row_count: i32) -> SuiteLayout {
    let cabinet_rows: Vec<i32> = (0..row_count).map(|i| i * 2).collect();
    let aisles = cabinet_rows
        .windows(2)
        .map(|pair| AisleDef {
            id: AisleId(format!("aisle_{}_{}", pair[0], pair[1])),
            upper_row: pair[0],
            lower_row: pair[1],
        })
        .collect();
    SuiteLayout {
        columns,
        cabinet_rows,
        aisles,
    }
}

pub fn base_content() -> FacilityContent {
    FacilityContent {
        content_version: "test".to_string(),
        constants: base_constants(),
        cooling_units: BTreeMap::from([
            (CoolingUnitKind::FanTray, unit_def(2.0, 1, 2, false)),
            (CoolingUnitKind::Crac, unit_def(6.0, 3, 6, false)),
            (CoolingUnitKind::Crah, unit_def(8.0, 4, 8, true)),
            (CoolingUnitKind::ImmersionPod, unit_def(12.0, 1, 1, false)),
        ]),
        chillers: BTreeMap::from([
            (
                ChillerTier::Basic,
                ChillerDef {
                    range: 4,
                    efficiency_bonus: 0.20,
                },
            ),
            (
                ChillerTier::Advanced,
                ChillerDef {
                    range: 6,
                    efficiency_bonus: 0.35,
                },
            ),
        ]),
        pdus: BTreeMap::from([
            (PduKind::Basic, PduDef { range: 3 }),
            (PduKind::Metered, PduDef { range: 4 }),
            (PduKind::Smart, PduDef { range: 5 }),
        ]),
        customers: BTreeMap::from([
            (CustomerType::General, customer(1.0, 1.0, None)),
            (CustomerType::AiTraining, customer(1.8, 2.5, Some(0.15))),
            (CustomerType::Streaming, customer(1.1, 3.0, Some(0.10))),
            (CustomerType::Crypto, customer(1.5, 0.5, Some(0.12))),
            (CustomerType::Enterprise, customer(1.0, 1.2, Some(0.10))),
        ]),
        environments: BTreeMap::from([
            (Environment::Production, environment(0.10, 2.0)),
            (Environment::Lab, environment(0.05, 1.0)),
            (Environment::Management, environment(0.0, 3.0)),
        ]),
        suite_layouts: BTreeMap::from([
            (SuiteTier::Starter, layout(4, 2)),
            (SuiteTier::Standard, layout(6, 3)),
            (SuiteTier::Professional, layout(8, 4)),
            (SuiteTier::Enterprise, layout(10, 5)),
        ]),
    }
}

/// Powered cabinet in `environment`, general customer, no leaf switch, facing north.
pub fn cabinet(id: &str, col: i32, row: i32, environment: Environment) -> Cabinet {
    Cabinet {
        id: CabinetId(id.to_string()),
        pos: GridPos::new(col, row),
        environment,
        customer_type: CustomerType::General,
        server_count: 2,
        has_leaf_switch: false,
        powered: true,
        heat_level: 22.0,
        server_age: 0,
        facing: Facing::North,
    }
}

pub fn leaf_cabinet(id: &str, col: i32, row: i32, server_count: u32) -> Cabinet {
    Cabinet {
        server_count,
        has_leaf_switch: true,
        ..cabinet(id, col, row, Environment::Production)
    }
}

pub fn spine(id: &str, powered: bool) -> SpineSwitch {
    SpineSwitch {
        id: SpineId(id.to_string()),
        powered,
    }
}

pub fn cooling_unit(id: &str, kind: CoolingUnitKind, col: i32, row: i32) -> CoolingUnit {
    CoolingUnit {
        id: CoolingUnitId(id.to_string()),
        kind,
        pos: GridPos::new(col, row),
        operational: true,
    }
}

pub fn chiller(id: &str, tier: ChillerTier, col: i32, row: i32) -> ChillerPlant {
    ChillerPlant {
        id: ChillerId(id.to_string()),
        pos: GridPos::new(col, row),
        tier,
        operational: true,
    }
}

pub fn pipe(col: i32, row: i32) -> CoolingPipe {
    CoolingPipe {
        pos: GridPos::new(col, row),
    }
}

pub fn pdu(id: &str, kind: PduKind, col: i32, row: i32, max_capacity_kw: f64) -> Pdu {
    Pdu {
        id: PduId(id.to_string()),
        pos: GridPos::new(col, row),
        kind,
        max_capacity_kw,
    }
}

pub fn empty_snapshot(suite_tier: SuiteTier) -> FacilitySnapshot {
    FacilitySnapshot {
        suite_tier,
        cabinets: vec![],
        spines: vec![],
        cooling_units: vec![],
        chillers: vec![],
        pipes: vec![],
        pdus: vec![],
        cable_runs: vec![],
        containment: vec![],
        demand_multiplier: 1.0,
        high_bandwidth_fabric: false,
    }
}
