//! Sliding puzzle solver: breadth-first, depth-limited and A* search over
//! N×N boards, returning the sequence of blank moves that reaches a goal.

pub mod board;
pub mod heuristic;
pub mod pqueue;
pub mod puzzles;
pub mod solver;
pub mod state;

pub use board::{Board, BoardError, Direction, Position};
pub use heuristic::{GoalManhattan, Heuristic, ManhattanHeuristic, NullHeuristic, manhattan_distance};
pub use puzzles::{PuzzleError, Puzzles};
pub use solver::{SolveResult, Solver, Strategy, solve_astar, solve_bfs, solve_dfs};
