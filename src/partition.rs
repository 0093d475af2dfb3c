//! Groups undetermined cells into equivalence classes.
//!
//! Two undetermined cells are interchangeable when exactly the same frontier
//! cells can see them. Each class is keyed by the sorted keys of those frontier
//! cells, so grouping does not depend on iteration order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::grid::Grid;
use crate::types::{cell_key, Cell};

/// Undetermined cells sharing one influence signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellClass {
    /// Sorted keys of the frontier cells adjacent to every member.
    pub signature: Vec<u32>,
    /// Member cells in row-major order.
    pub cells: Vec<Cell>,
}

impl CellClass {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether the frontier cell `cell` constrains this class.
    pub fn is_influenced_by(&self, cell: Cell) -> bool {
        self.signature.binary_search(&cell_key(cell.0, cell.1)).is_ok()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    /// Frontier cells that still touch an undetermined cell, in their previous order.
    pub frontier: Vec<Cell>,
    pub classes: Vec<CellClass>,
}

/// Compute the influence of every undetermined cell, prune the frontier and group
/// cells by influence.
///
/// On the first turn the frontier is empty, so everything lands in a single class
/// with an empty signature.
pub fn partition(
    undetermined: &BTreeSet<Cell>,
    frontier: &[Cell],
    grid: &impl Grid,
) -> Partition {
    let frontier_keys: HashSet<u32> = frontier.iter().map(|&(r, c)| cell_key(r, c)).collect();

    let mut groups: BTreeMap<Vec<u32>, Vec<Cell>> = BTreeMap::new();
    let mut active: HashSet<u32> = HashSet::new();

    for &cell in undetermined {
        let mut signature: Vec<u32> = grid
            .neighbors(cell)
            .iter()
            .map(|&(r, c)| cell_key(r, c))
            .filter(|key| frontier_keys.contains(key))
            .collect();
        signature.sort_unstable();
        active.extend(signature.iter().copied());
        groups.entry(signature).or_default().push(cell);
    }

    let mut seen = HashSet::new();
    let frontier = frontier
        .iter()
        .copied()
        .filter(|&(r, c)| {
            let key = cell_key(r, c);
            active.contains(&key) && seen.insert(key)
        })
        .collect();

    let classes = groups
        .into_iter()
        .map(|(signature, cells)| CellClass { signature, cells })
        .collect();

    Partition { frontier, classes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn all_cells(rows: usize, cols: usize) -> BTreeSet<Cell> {
        (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))).collect()
    }

    #[test]
    fn test_first_turn_single_class() {
        let board = Board::with_mines(4, 4, &[(0, 0)]);
        let undetermined = all_cells(4, 4);
        let p = partition(&undetermined, &[], &board);

        assert!(p.frontier.is_empty());
        assert_eq!(p.classes.len(), 1);
        assert!(p.classes[0].signature.is_empty());
        assert_eq!(p.classes[0].len(), 16);
    }

    #[test]
    fn test_classes_partition_undetermined() {
        // 1x5 strip with the middle cell revealed.
        let mut board = Board::with_mines(1, 5, &[(0, 1), (0, 4)]);
        let revealed = board.reveal(&[(0, 2)]).unwrap();
        assert_eq!(revealed, vec![(0, 2)]);

        let mut undetermined = all_cells(1, 5);
        undetermined.remove(&(0, 2));
        let p = partition(&undetermined, &[(0, 2)], &board);

        assert_eq!(p.frontier, vec![(0, 2)]);
        assert_eq!(p.classes.len(), 2);

        let mut members: Vec<Cell> = p.classes.iter().flat_map(|c| c.cells.clone()).collect();
        members.sort();
        assert_eq!(members, undetermined.iter().copied().collect::<Vec<_>>());

        let touching = p.classes.iter().find(|c| c.is_influenced_by((0, 2))).unwrap();
        assert_eq!(touching.cells, vec![(0, 1), (0, 3)]);

        let signatures: HashSet<&Vec<u32>> = p.classes.iter().map(|c| &c.signature).collect();
        assert_eq!(signatures.len(), p.classes.len());
    }

    #[test]
    fn test_frontier_pruned_and_deduplicated() {
        let board = Board::with_mines(1, 4, &[(0, 3)]);
        // (0,0) and (0,1) are treated as revealed; only (0,2) is still undetermined
        // besides the mine, so (0,0) no longer touches anything.
        let undetermined: BTreeSet<Cell> = [(0, 2), (0, 3)].into_iter().collect();
        let frontier = vec![(0, 1), (0, 0), (0, 1)];
        let p = partition(&undetermined, &frontier, &board);

        assert_eq!(p.frontier, vec![(0, 1)]);
        assert!(p.frontier.iter().all(|cell| frontier.contains(cell)));
    }

    #[test]
    fn test_partition_is_idempotent() {
        let mut board = Board::with_mines(5, 5, &[(0, 0), (4, 4), (2, 4)]);
        let revealed = board.reveal(&[(2, 0)]).unwrap();
        let mut undetermined = all_cells(5, 5);
        for cell in &revealed {
            undetermined.remove(cell);
        }

        let first = partition(&undetermined, &revealed, &board);
        let second = partition(&undetermined, &revealed, &board);
        assert_eq!(first, second);

        let again = partition(&undetermined, &first.frontier, &board);
        assert_eq!(again.classes, first.classes);
    }
}
