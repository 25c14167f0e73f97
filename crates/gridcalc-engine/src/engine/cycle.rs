//! Circular dependency detection for formula cells.
//!
//! When a formula is entered, we must verify it doesn't create a cycle
//! (e.g., A1 references B1, B1 references C1, C1 references A1).
//! The check runs on the candidate references before anything is committed,
//! using depth-first search through the cells already in the grid.
//!
//! Walking through an untouched position materializes an empty record there
//! (see [`Grid::resolve_or_create`]). That record stays even if the edit is
//! rejected for a cycle found elsewhere.

use std::collections::HashSet;

use super::{Grid, Position};

/// Check whether giving `target` a formula that references `referenced` would
/// close a cycle.
///
/// Returns `Some(path)` from `target` back to itself if a cycle is found,
/// `None` otherwise.
pub fn detect_cycle(
    grid: &mut Grid,
    target: Position,
    referenced: &[Position],
) -> Option<Vec<Position>> {
    let mut acyclic = HashSet::new();
    let mut path = vec![target];

    if detect_cycle_dfs(grid, target, referenced, &mut acyclic, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn detect_cycle_dfs(
    grid: &mut Grid,
    target: Position,
    referenced: &[Position],
    acyclic: &mut HashSet<Position>,
    path: &mut Vec<Position>,
) -> bool {
    for &pos in referenced {
        if pos == target {
            path.push(pos);
            return true;
        }
        // Shared subtrees are walked once per check.
        if acyclic.contains(&pos) {
            continue;
        }
        if !grid.resolve_or_create(pos) {
            continue;
        }

        let next = match grid.get(pos) {
            Some(cell) => cell.referenced_cells().to_vec(),
            None => continue,
        };

        path.push(pos);
        if detect_cycle_dfs(grid, target, &next, acyclic, path) {
            return true;
        }
        path.pop();
        acyclic.insert(pos);
    }
    false
}
