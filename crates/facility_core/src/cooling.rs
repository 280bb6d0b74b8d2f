//! Per-cabinet cooling coverage.
//!
//! A cabinet starts from ambient dissipation and gains the output of every
//! operational cooling unit whose range covers it. A unit serving more powered
//! cabinets than it is rated for shares its output proportionally. Water-side
//! units are scaled by their chiller connection.

use crate::chiller::chiller_connection_indexed;
use crate::grid::TileIndex;
use crate::{
    Cabinet, ChillerPlant, CoolingPipe, CoolingUnit, CoolingUnitDef, FacilityContent, GridPos,
};

/// Powered cabinets inside the unit's range.
pub fn cooling_unit_served_count(
    unit: &CoolingUnit,
    def: &CoolingUnitDef,
    cabinets: &[Cabinet],
) -> u32 {
    let served = cabinets
        .iter()
        .filter(|c| c.powered && c.pos.within(unit.pos, def.range))
        .count();
    u32::try_from(served).unwrap_or(u32::MAX)
}

/// 1.0 up to the rated cabinet count, then `max_cabinets / served`.
pub fn cooling_unit_efficiency(served: u32, max_cabinets: u32) -> f64 {
    if served <= max_cabinets {
        1.0
    } else {
        f64::from(max_cabinets) / f64::from(served)
    }
}

/// Multiplier a chiller loop applies to a unit's output.
///
/// Air-side units and facilities without any chiller are neutral. A
/// water-side unit cut off from every operational chiller takes the penalty.
pub fn chiller_multiplier(
    unit: &CoolingUnit,
    def: &CoolingUnitDef,
    chillers: &[ChillerPlant],
    pipes: &[CoolingPipe],
    content: &FacilityContent,
) -> f64 {
    let pipe_index = TileIndex::build(pipes.iter().map(|p| p.pos));
    chiller_multiplier_indexed(unit.pos, def, chillers, pipes, &pipe_index, content)
}

fn chiller_multiplier_indexed(
    unit_pos: GridPos,
    def: &CoolingUnitDef,
    chillers: &[ChillerPlant],
    pipes: &[CoolingPipe],
    pipe_index: &TileIndex,
    content: &FacilityContent,
) -> f64 {
    if !def.chilled_water || chillers.is_empty() {
        return 1.0;
    }
    let connection = chiller_connection_indexed(unit_pos, chillers, pipes, pipe_index, content);
    if connection.connected {
        1.0 + connection.efficiency_bonus
    } else {
        content.constants.chiller_unconnected_penalty
    }
}

/// Reach and effective output of one operational, configured cooling unit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnitOutput {
    pub(crate) pos: GridPos,
    pub(crate) range: u32,
    pub(crate) rate: f64,
}

pub(crate) fn unit_output(
    unit: &CoolingUnit,
    cabinets: &[Cabinet],
    chillers: &[ChillerPlant],
    pipes: &[CoolingPipe],
    pipe_index: &TileIndex,
    content: &FacilityContent,
) -> Option<UnitOutput> {
    if !unit.operational {
        return None;
    }
    let Some(def) = content.cooling_units.get(&unit.kind) else {
        tracing::debug!(unit = %unit.id, kind = ?unit.kind, "no cooling unit def, skipping");
        return None;
    };
    let served = cooling_unit_served_count(unit, def, cabinets);
    let efficiency = cooling_unit_efficiency(served, def.max_cabinets);
    let chiller_mult =
        chiller_multiplier_indexed(unit.pos, def, chillers, pipes, pipe_index, content);
    Some(UnitOutput {
        pos: unit.pos,
        range: def.range,
        rate: (def.cooling_rate * efficiency * chiller_mult).max(0.0),
    })
}

/// Precomputed unit outputs so a whole floor can be scored without redoing
/// each unit's served count and chiller search per cabinet.
pub(crate) struct CoolingField {
    ambient: f64,
    outputs: Vec<UnitOutput>,
}

impl CoolingField {
    pub(crate) fn build<'a>(
        units: impl IntoIterator<Item = &'a CoolingUnit>,
        cabinets: &[Cabinet],
        chillers: &[ChillerPlant],
        pipes: &[CoolingPipe],
        content: &FacilityContent,
    ) -> Self {
        let pipe_index = TileIndex::build(pipes.iter().map(|p| p.pos));
        let outputs = units
            .into_iter()
            .filter_map(|unit| unit_output(unit, cabinets, chillers, pipes, &pipe_index, content))
            .collect();
        Self {
            ambient: content.constants.ambient_cooling_rate,
            outputs,
        }
    }

    pub(crate) fn rate_at(&self, pos: GridPos) -> f64 {
        self.ambient
            + self
                .outputs
                .iter()
                .filter(|o| pos.within(o.pos, o.range))
                .map(|o| o.rate)
                .sum::<f64>()
    }
}

/// Total cooling rate reaching `cabinet`.
pub fn calc_cabinet_cooling(
    cabinet: &Cabinet,
    units: &[CoolingUnit],
    all_cabinets: &[Cabinet],
    chillers: &[ChillerPlant],
    pipes: &[CoolingPipe],
    content: &FacilityContent,
) -> f64 {
    let covering = units.iter().filter(|u| {
        content
            .cooling_units
            .get(&u.kind)
            .is_some_and(|def| cabinet.pos.within(u.pos, def.range))
    });
    CoolingField::build(covering, all_cabinets, chillers, pipes, content).rate_at(cabinet.pos)
}
