//! `facility_core` — deterministic facility evaluation.
//!
//! No IO. Every calculator is a pure function of the topology records and the
//! content tables passed in.

mod chiller;
mod cooling;
mod grid;
mod infra;
mod layout;
mod power;
mod report;
mod traffic;
mod types;
mod zones;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use chiller::{get_chiller_connection, ChillerConnection};
pub use cooling::{
    calc_cabinet_cooling, chiller_multiplier, cooling_unit_efficiency, cooling_unit_served_count,
};
pub use infra::{count_messy_cables, get_pdu_load, is_pdu_overloaded, pdu_reports, PduReport};
pub use layout::{
    calc_aisle_bonus, calc_dedicated_rows, calc_mixed_penalties, calc_spacing_heat,
    classify_aisle, AisleKind, AisleReport, AisleSummary, DedicatedRow, SpacingEffect,
};
pub use power::{
    cabinet_power_w, calc_stats, cooling_overhead, customer_power_multiplier, management_bonus,
    FacilityStats,
};
pub use report::{evaluate_facility, CabinetThermal, FacilityReport, UnitChillerLink};
pub use traffic::{
    cabinet_demand_gbps, calc_traffic, calc_traffic_with_capacity, customer_bandwidth_multiplier,
    TrafficLink, TrafficStats,
};
pub use types::*;
pub use zones::{calc_zones, Zone, ZoneKey, ZoneKind};

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
