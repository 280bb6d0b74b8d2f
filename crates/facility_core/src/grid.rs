use ahash::AHashMap;
use smallvec::SmallVec;

use crate::GridPos;

impl GridPos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn manhattan(self, other: GridPos) -> u32 {
        self.col
            .abs_diff(other.col)
            .saturating_add(self.row.abs_diff(other.row))
    }

    pub fn within(self, other: GridPos, range: u32) -> bool {
        self.manhattan(other) <= range
    }

    /// Packs both coordinates into one key for hash sets.
    #[allow(clippy::cast_sign_loss)] // bit pattern only, negative tiles stay distinct
    pub fn packed(self) -> u64 {
        (u64::from(self.col as u32) << 32) | u64::from(self.row as u32)
    }

    /// North, south, west, east. No diagonals. At the edge of the `i32`
    /// range the missing side saturates back onto `self`.
    pub fn orthogonal(self) -> [GridPos; 4] {
        [
            GridPos::new(self.col, self.row.saturating_sub(1)),
            GridPos::new(self.col, self.row.saturating_add(1)),
            GridPos::new(self.col.saturating_sub(1), self.row),
            GridPos::new(self.col.saturating_add(1), self.row),
        ]
    }
}

/// Position → slice index lookup over an immutable arena of placed items.
///
/// When two items share a tile (malformed topology) the first one wins; the
/// other stays reachable only as a search seed, never as a neighbor.
pub(crate) struct TileIndex {
    by_pos: AHashMap<u64, usize>,
}

impl TileIndex {
    pub(crate) fn build(positions: impl IntoIterator<Item = GridPos>) -> Self {
        let mut by_pos = AHashMap::new();
        for (index, pos) in positions.into_iter().enumerate() {
            by_pos.entry(pos.packed()).or_insert(index);
        }
        Self { by_pos }
    }

    pub(crate) fn get(&self, pos: GridPos) -> Option<usize> {
        self.by_pos.get(&pos.packed()).copied()
    }

    pub(crate) fn is_occupied(&self, pos: GridPos) -> bool {
        self.by_pos.contains_key(&pos.packed())
    }

    /// Indices of the items on the (up to four) orthogonal neighbor tiles.
    pub(crate) fn neighbors(&self, pos: GridPos) -> SmallVec<[usize; 4]> {
        pos.orthogonal()
            .into_iter()
            .filter(|tile| *tile != pos)
            .filter_map(|tile| self.get(tile))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric() {
        let a = GridPos::new(1, 4);
        let b = GridPos::new(-2, 2);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(b.manhattan(a), 5);
    }

    #[test]
    fn packed_keys_distinguish_negative_coordinates() {
        assert_ne!(GridPos::new(-1, 0).packed(), GridPos::new(0, -1).packed());
        assert_ne!(GridPos::new(1, 2).packed(), GridPos::new(2, 1).packed());
    }

    #[test]
    fn neighbors_are_orthogonal_only() {
        let index = TileIndex::build([
            GridPos::new(1, 1),
            GridPos::new(1, 0),
            GridPos::new(2, 2),
            GridPos::new(0, 1),
        ]);
        let mut found: Vec<usize> = index.neighbors(GridPos::new(1, 1)).into_iter().collect();
        found.sort_unstable();
        assert_eq!(found, vec![1, 3]);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let low = GridPos::new(i32::MIN, i32::MIN);
        let high = GridPos::new(i32::MAX, i32::MAX);
        assert_eq!(low.manhattan(high), u32::MAX);
        assert!(!low.within(high, 10));

        let index = TileIndex::build([high, GridPos::new(i32::MAX - 1, i32::MAX)]);
        assert_eq!(index.neighbors(high).as_slice(), &[1]);
        assert!(index.neighbors(low).is_empty());
    }

    #[test]
    fn duplicate_tiles_keep_first_index() {
        let index = TileIndex::build([GridPos::new(3, 3), GridPos::new(3, 3)]);
        assert_eq!(index.get(GridPos::new(3, 3)), Some(0));
        assert!(index.is_occupied(GridPos::new(3, 3)));
        assert!(!index.is_occupied(GridPos::new(3, 4)));
    }
}
