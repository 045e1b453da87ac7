use crate::board::Board;

/// Trait for estimating the number of moves left to reach the goal.
pub trait Heuristic {
    /// Estimated remaining moves from `board` to the goal.
    fn estimate(&self, board: &Board) -> u32;
}

/// Always zero. Used where the estimate is never read, and turns A* into a
/// uniform-cost search.
pub struct NullHeuristic;

impl Heuristic for NullHeuristic {
    fn estimate(&self, _board: &Board) -> u32 {
        0
    }
}

/// Sum over all tiles of the grid distance between the tile's cell and its
/// cell in the canonical goal (`1..N²-1` row-major, blank last).
///
/// Only admissible when the search goal is the canonical layout.
pub fn manhattan_distance(board: &Board) -> u32 {
    let n = board.size();
    let mut distance = 0;
    for (idx, &value) in board.cells().iter().enumerate() {
        if value != 0 {
            let (col, row) = (idx % n, idx / n);
            let target = value as usize - 1;
            let (goal_col, goal_row) = (target % n, target / n);
            distance += col.abs_diff(goal_col) + row.abs_diff(goal_row);
        }
    }
    distance as u32
}

/// Manhattan distance against the canonical goal layout.
pub struct ManhattanHeuristic;

impl Heuristic for ManhattanHeuristic {
    fn estimate(&self, board: &Board) -> u32 {
        manhattan_distance(board)
    }
}

/// Manhattan distance against an arbitrary goal board.
pub struct GoalManhattan {
    /// goal_cells[value] = (col, row) of `value` in the goal
    goal_cells: Vec<(usize, usize)>,
}

impl GoalManhattan {
    pub fn new(goal: &Board) -> Self {
        let n = goal.size();
        let mut goal_cells = vec![(0, 0); goal.cells().len()];
        for (idx, &value) in goal.cells().iter().enumerate() {
            if let Some(slot) = goal_cells.get_mut(value as usize) {
                *slot = (idx % n, idx / n);
            }
        }
        GoalManhattan { goal_cells }
    }
}

impl Heuristic for GoalManhattan {
    fn estimate(&self, board: &Board) -> u32 {
        let n = board.size();
        let mut distance = 0;
        for (idx, &value) in board.cells().iter().enumerate() {
            if value == 0 {
                continue;
            }
            if let Some(&(goal_col, goal_row)) = self.goal_cells.get(value as usize) {
                distance += (idx % n).abs_diff(goal_col) + (idx / n).abs_diff(goal_row);
            }
        }
        distance as u32
    }
}
