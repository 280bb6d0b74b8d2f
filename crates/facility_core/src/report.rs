//! One-shot evaluation of a whole facility snapshot.
//!
//! Every subsystem reads the same snapshot and none of them mutate it, so the
//! report is a pure function of `(snapshot, content)`. Positional lookups are
//! indexed once here and shared across the per-cabinet passes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chiller::{chiller_connection_indexed, ChillerConnection};
use crate::cooling::CoolingField;
use crate::grid::TileIndex;
use crate::infra::{count_messy_cables, pdu_reports, PduReport};
use crate::layout::{
    calc_aisle_bonus, calc_dedicated_rows, calc_mixed_penalties, spacing_heat_indexed,
    AisleSummary, DedicatedRow,
};
use crate::power::{calc_stats, FacilityStats};
use crate::traffic::{calc_traffic_with_capacity, TrafficStats};
use crate::zones::{calc_zones, Zone};
use crate::{CabinetId, CoolingUnitId, FacilityContent, FacilitySnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinetThermal {
    pub cabinet_id: CabinetId,
    pub cooling_rate: f64,
    pub spacing_heat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitChillerLink {
    pub unit_id: CoolingUnitId,
    pub connection: ChillerConnection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityReport {
    pub stats: FacilityStats,
    pub traffic: TrafficStats,
    /// Input order.
    pub cabinets: Vec<CabinetThermal>,
    /// Water-side units only.
    pub chiller_links: Vec<UnitChillerLink>,
    pub zones: Vec<Zone>,
    pub mixed_penalties: BTreeSet<CabinetId>,
    pub dedicated_rows: Vec<DedicatedRow>,
    pub aisles: AisleSummary,
    pub pdus: Vec<PduReport>,
    pub messy_cables: u32,
}

pub fn evaluate_facility(snapshot: &FacilitySnapshot, content: &FacilityContent) -> FacilityReport {
    let constants = &content.constants;
    let link_capacity = if snapshot.high_bandwidth_fabric {
        constants.high_bandwidth_link_capacity_gbps
    } else {
        constants.link_capacity_gbps
    };

    let cabinet_index = TileIndex::build(snapshot.cabinets.iter().map(|c| c.pos));
    let field = CoolingField::build(
        &snapshot.cooling_units,
        &snapshot.cabinets,
        &snapshot.chillers,
        &snapshot.pipes,
        content,
    );
    let cabinets = snapshot
        .cabinets
        .iter()
        .map(|cabinet| CabinetThermal {
            cabinet_id: cabinet.id.clone(),
            cooling_rate: field.rate_at(cabinet.pos),
            spacing_heat: spacing_heat_indexed(cabinet, &cabinet_index, constants),
        })
        .collect();

    let pipe_index = TileIndex::build(snapshot.pipes.iter().map(|p| p.pos));
    let chiller_links = snapshot
        .cooling_units
        .iter()
        .filter(|unit| {
            content
                .cooling_units
                .get(&unit.kind)
                .is_some_and(|def| def.chilled_water)
        })
        .map(|unit| UnitChillerLink {
            unit_id: unit.id.clone(),
            connection: chiller_connection_indexed(
                unit.pos,
                &snapshot.chillers,
                &snapshot.pipes,
                &pipe_index,
                content,
            ),
        })
        .collect();

    FacilityReport {
        stats: calc_stats(&snapshot.cabinets, &snapshot.spines, content),
        traffic: calc_traffic_with_capacity(
            &snapshot.cabinets,
            &snapshot.spines,
            content,
            snapshot.demand_multiplier,
            link_capacity,
        ),
        cabinets,
        chiller_links,
        zones: calc_zones(&snapshot.cabinets, content),
        mixed_penalties: calc_mixed_penalties(&snapshot.cabinets),
        dedicated_rows: calc_dedicated_rows(&snapshot.cabinets, snapshot.suite_tier, content),
        aisles: calc_aisle_bonus(
            &snapshot.cabinets,
            snapshot.suite_tier,
            &snapshot.containment,
            content,
        ),
        pdus: pdu_reports(&snapshot.pdus, &snapshot.cabinets, content),
        messy_cables: count_messy_cables(&snapshot.cable_runs),
    }
}
