//! Chilled-water reachability from cooling units to chiller plants.

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::grid::TileIndex;
use crate::{ChillerPlant, CoolingPipe, CoolingUnit, FacilityContent, GridPos};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChillerConnection {
    pub connected: bool,
    /// Best bonus among every connected chiller, 0.0 when unconnected.
    pub efficiency_bonus: f64,
}

/// Whether `unit` draws chilled water from any operational chiller.
///
/// A chiller reaches a unit directly when the unit sits inside the chiller's
/// range, or through a chain of orthogonally adjacent pipe tiles that starts
/// inside that range and ends next to the unit.
pub fn get_chiller_connection(
    unit: &CoolingUnit,
    chillers: &[ChillerPlant],
    pipes: &[CoolingPipe],
    content: &FacilityContent,
) -> ChillerConnection {
    let pipe_index = TileIndex::build(pipes.iter().map(|p| p.pos));
    chiller_connection_indexed(unit.pos, chillers, pipes, &pipe_index, content)
}

pub(crate) fn chiller_connection_indexed(
    unit_pos: GridPos,
    chillers: &[ChillerPlant],
    pipes: &[CoolingPipe],
    pipe_index: &TileIndex,
    content: &FacilityContent,
) -> ChillerConnection {
    let mut best: Option<f64> = None;
    for chiller in chillers.iter().filter(|c| c.operational) {
        let Some(def) = content.chillers.get(&chiller.tier) else {
            tracing::debug!(
                chiller = %chiller.id,
                tier = ?chiller.tier,
                "no chiller def, skipping"
            );
            continue;
        };
        let reached = unit_pos.within(chiller.pos, def.range)
            || pipe_path_exists(chiller.pos, def.range, unit_pos, pipes, pipe_index);
        if reached {
            best = Some(best.map_or(def.efficiency_bonus, |b| b.max(def.efficiency_bonus)));
        }
    }
    best.map_or_else(ChillerConnection::default, |efficiency_bonus| {
        ChillerConnection {
            connected: true,
            efficiency_bonus,
        }
    })
}

/// BFS over pipe tiles seeded from every pipe inside the source's range.
/// Terminates after visiting each pipe tile at most once.
fn pipe_path_exists(
    source: GridPos,
    range: u32,
    target: GridPos,
    pipes: &[CoolingPipe],
    pipe_index: &TileIndex,
) -> bool {
    let mut visited: AHashSet<u64> = AHashSet::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    for (index, pipe) in pipes.iter().enumerate() {
        if pipe.pos.within(source, range) && visited.insert(pipe.pos.packed()) {
            queue.push_back(index);
        }
    }
    while let Some(index) = queue.pop_front() {
        let pos = pipes[index].pos;
        if pos.within(target, 1) {
            return true;
        }
        for neighbor in pipe_index.neighbors(pos) {
            if visited.insert(pipes[neighbor].pos.packed()) {
                queue.push_back(neighbor);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, chiller, cooling_unit, pipe};
    use crate::{ChillerTier, CoolingUnitKind};

    #[test]
    fn pipe_chain_stops_at_a_gap() {
        let content = base_content();
        let unit = cooling_unit("u1", CoolingUnitKind::Crah, 12, 0);
        let plant = chiller("ch1", ChillerTier::Basic, 0, 0);
        // Pipes 4..=6 then a gap at 7, resuming at 8..=11.
        let mut pipes: Vec<CoolingPipe> = (4..=6).map(|c| pipe(c, 0)).collect();
        pipes.extend((8..=11).map(|c| pipe(c, 0)));
        let conn = get_chiller_connection(&unit, &[plant], &pipes, &content);
        assert!(!conn.connected);
    }

    #[test]
    fn diagonal_pipes_do_not_connect() {
        let content = base_content();
        let unit = cooling_unit("u1", CoolingUnitKind::Crah, 7, 2);
        let plant = chiller("ch1", ChillerTier::Basic, 0, 0);
        let pipes = vec![pipe(4, 0), pipe(5, 1), pipe(6, 2)];
        let conn = get_chiller_connection(&unit, &[plant], &pipes, &content);
        assert!(!conn.connected);
    }

    #[test]
    fn loops_in_the_pipe_graph_terminate() {
        let content = base_content();
        let unit = cooling_unit("u1", CoolingUnitKind::Crah, 20, 20);
        let plant = chiller("ch1", ChillerTier::Basic, 0, 0);
        let pipes = vec![pipe(3, 0), pipe(4, 0), pipe(4, 1), pipe(3, 1)];
        let conn = get_chiller_connection(&unit, &[plant], &pipes, &content);
        assert!(!conn.connected);
    }

    #[test]
    fn missing_chiller_def_is_skipped() {
        let mut content = base_content();
        content.chillers.remove(&ChillerTier::Advanced);
        let unit = cooling_unit("u1", CoolingUnitKind::Crah, 1, 0);
        let plant = chiller("ch1", ChillerTier::Advanced, 0, 0);
        let conn = get_chiller_connection(&unit, &[plant], &[], &content);
        assert_eq!(conn, ChillerConnection::default());
    }
}
