//! Row- and neighbor-based layout effects: aisle bonuses, mixed-environment
//! penalties, dedicated rows, and spacing heat.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::TileIndex;
use crate::{
    AisleDef, AisleId, Cabinet, CabinetId, Constants, Environment, Facing, FacilityContent,
    GridPos, SuiteLayout, SuiteTier,
};

// ---------------------------------------------------------------------------
// Aisles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AisleKind {
    /// Every bounding cabinet's front faces the aisle.
    Cold,
    /// Every bounding cabinet's rear faces the aisle.
    Hot,
    Neutral,
    /// A bounding row has no cabinets.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AisleReport {
    pub aisle_id: AisleId,
    pub kind: AisleKind,
    /// Both bounding rows hold at least one cabinet.
    pub paired: bool,
    pub contained: bool,
    pub bonus: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AisleSummary {
    /// Capped at `aisle_bonus_max + containment_bonus_max`.
    pub total_bonus: f64,
    pub aisles: Vec<AisleReport>,
}

fn suite_layout(tier: SuiteTier, content: &FacilityContent) -> Option<&SuiteLayout> {
    let layout = content.suite_layouts.get(&tier);
    if layout.is_none() {
        tracing::debug!(?tier, "no suite layout");
    }
    layout
}

fn cabinets_in_row(cabinets: &[Cabinet], row: i32) -> impl Iterator<Item = &Cabinet> {
    cabinets.iter().filter(move |c| c.pos.row == row)
}

/// Hot/cold classification from which way the bounding rows face.
pub fn classify_aisle(aisle: &AisleDef, cabinets: &[Cabinet]) -> AisleKind {
    let (upper_row, lower_row) = if aisle.upper_row <= aisle.lower_row {
        (aisle.upper_row, aisle.lower_row)
    } else {
        (aisle.lower_row, aisle.upper_row)
    };
    let upper: Vec<Facing> = cabinets_in_row(cabinets, upper_row).map(|c| c.facing).collect();
    let lower: Vec<Facing> = cabinets_in_row(cabinets, lower_row).map(|c| c.facing).collect();
    if upper.is_empty() || lower.is_empty() {
        return AisleKind::Empty;
    }
    // The upper row faces the aisle when pointing south, the lower row when north.
    let all_face = |row: &[Facing], dir: Facing| row.iter().all(|f| *f == dir);
    let fronts_in = all_face(&upper, Facing::South) && all_face(&lower, Facing::North);
    let rears_in = all_face(&upper, Facing::North) && all_face(&lower, Facing::South);
    if fronts_in {
        AisleKind::Cold
    } else if rears_in {
        AisleKind::Hot
    } else {
        AisleKind::Neutral
    }
}

pub fn calc_aisle_bonus(
    cabinets: &[Cabinet],
    tier: SuiteTier,
    containment: &[AisleId],
    content: &FacilityContent,
) -> AisleSummary {
    let Some(layout) = suite_layout(tier, content) else {
        return AisleSummary::default();
    };
    let c = &content.constants;

    let mut total = 0.0;
    let mut aisles = Vec::with_capacity(layout.aisles.len());
    for aisle in &layout.aisles {
        let paired = cabinets_in_row(cabinets, aisle.upper_row).next().is_some()
            && cabinets_in_row(cabinets, aisle.lower_row).next().is_some();
        let contained = containment.contains(&aisle.id);
        let mut bonus = 0.0;
        if paired {
            bonus += c.aisle_pair_bonus;
            if contained {
                bonus += c.containment_bonus;
            }
        }
        total += bonus;
        aisles.push(AisleReport {
            aisle_id: aisle.id.clone(),
            kind: classify_aisle(aisle, cabinets),
            paired,
            contained,
            bonus,
        });
    }

    AisleSummary {
        total_bonus: total.min(c.aisle_bonus_max + c.containment_bonus_max),
        aisles,
    }
}

// ---------------------------------------------------------------------------
// Mixed-environment penalty
// ---------------------------------------------------------------------------

/// Cabinets whose every orthogonal neighbor runs a different environment.
/// A cabinet with no neighbors at all is not penalised.
pub fn calc_mixed_penalties(cabinets: &[Cabinet]) -> BTreeSet<CabinetId> {
    let index = TileIndex::build(cabinets.iter().map(|c| c.pos));
    cabinets
        .iter()
        .filter(|cabinet| {
            let neighbors = index.neighbors(cabinet.pos);
            !neighbors.is_empty()
                && neighbors
                    .iter()
                    .all(|&n| cabinets[n].environment != cabinet.environment)
        })
        .map(|cabinet| cabinet.id.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Dedicated rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedicatedRow {
    pub row: i32,
    pub environment: Environment,
    pub cabinet_count: u32,
    pub bonus: f64,
}

/// Rows filled to their slot capacity with a single environment.
pub fn calc_dedicated_rows(
    cabinets: &[Cabinet],
    tier: SuiteTier,
    content: &FacilityContent,
) -> Vec<DedicatedRow> {
    let Some(layout) = suite_layout(tier, content) else {
        return Vec::new();
    };
    let mut rows = Vec::new();
    for &row in &layout.cabinet_rows {
        let members: Vec<&Cabinet> = cabinets_in_row(cabinets, row).collect();
        let Some(first) = members.first() else {
            continue;
        };
        let count = u32::try_from(members.len()).unwrap_or(u32::MAX);
        if count < layout.columns {
            continue;
        }
        if members.iter().all(|c| c.environment == first.environment) {
            rows.push(DedicatedRow {
                row,
                environment: first.environment,
                cabinet_count: count,
                bonus: content.constants.dedicated_row_bonus,
            });
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Spacing heat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingEffect {
    pub cabinet_id: CabinetId,
    /// Heat delta in °C. Positive runs hotter.
    pub heat_delta: f64,
}

fn front_and_rear(pos: GridPos, facing: Facing) -> (GridPos, GridPos) {
    let north = GridPos::new(pos.col, pos.row - 1);
    let south = GridPos::new(pos.col, pos.row + 1);
    match facing {
        Facing::North => (north, south),
        Facing::South => (south, north),
    }
}

pub(crate) fn spacing_heat_indexed(cabinet: &Cabinet, index: &TileIndex, c: &Constants) -> f64 {
    if !cabinet.powered {
        return 0.0;
    }
    let neighbors = index.neighbors(cabinet.pos).len();
    let mut delta = neighbors as f64 * c.adjacency_heat_penalty;
    if neighbors >= 3 {
        delta += c.trapped_air_penalty;
    }
    let (front, rear) = front_and_rear(cabinet.pos, cabinet.facing);
    if !index.is_occupied(front) {
        delta -= c.front_clearance_cooling;
    }
    if !index.is_occupied(rear) {
        delta -= c.rear_clearance_cooling;
    }
    delta
}

/// Heat effect of each cabinet's surroundings, in input order.
pub fn calc_spacing_heat(cabinets: &[Cabinet], constants: &Constants) -> Vec<SpacingEffect> {
    let index = TileIndex::build(cabinets.iter().map(|c| c.pos));
    cabinets
        .iter()
        .map(|cabinet| SpacingEffect {
            cabinet_id: cabinet.id.clone(),
            heat_delta: spacing_heat_indexed(cabinet, &index, constants),
        })
        .collect()
}
