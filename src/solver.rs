use crate::board::{ALL_DIRECTIONS, Board, Direction, Position};
use crate::heuristic::{GoalManhattan, Heuristic, NullHeuristic};
use crate::pqueue::PriorityQueue;
use crate::state::SearchState;
use log::{debug, trace};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Depth bound used for depth-limited searches when the caller has no opinion.
pub const DEFAULT_MAX_DEPTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Moves of the blank leading from the start board to the goal.
    Solved(Vec<Direction>),
    /// The node budget ran out before the search finished.
    Cutoff,
    /// The search space (within any depth bound) holds no path to the goal.
    Impossible,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveResult::Solved(_))
    }

    /// `Some(moves)` on success, `None` for either kind of failure. An empty
    /// move list means the start already equals the goal.
    pub fn into_option(self) -> Option<Vec<Direction>> {
        match self {
            SolveResult::Solved(moves) => Some(moves),
            SolveResult::Cutoff | SolveResult::Impossible => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Breadth-first search. Shortest path, tractable only for tiny boards.
    Bfs,
    /// Depth-limited DFS sharing one visited set across all branches. Not
    /// complete: it can miss solutions that exist within the bound, and the
    /// path it finds is not necessarily the shortest.
    Dfs { max_depth: usize },
    /// Iterative deepening DFS with visited tracking local to the current
    /// path. Complete and shortest-path within the bound.
    Iddfs { max_depth: usize },
    /// A* over the configured heuristic.
    AStar,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Bfs => write!(f, "bfs"),
            Strategy::Dfs { max_depth } => write!(f, "dfs(max_depth={})", max_depth),
            Strategy::Iddfs { max_depth } => write!(f, "iddfs(max_depth={})", max_depth),
            Strategy::AStar => write!(f, "astar"),
        }
    }
}

/// Outcome of one bounded probe of the path-local DFS.
enum Probe {
    Found,
    /// Every branch was explored without touching the depth bound.
    Exhausted,
    /// Some branch was cut by the depth bound.
    Limit,
    Cutoff,
}

/// Sliding puzzle solver.
///
/// Every call allocates its own frontier and visited structures, so nothing
/// carries over between searches apart from the `nodes_explored` counter of
/// the latest one.
pub struct Solver<H> {
    heuristic: H,
    max_nodes: usize,
    nodes_explored: usize,
}

impl Solver<NullHeuristic> {
    pub fn new() -> Self {
        Solver {
            heuristic: NullHeuristic,
            max_nodes: usize::MAX,
            nodes_explored: 0,
        }
    }
}

impl Default for Solver<NullHeuristic> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Heuristic> Solver<H> {
    /// Replace the heuristic used by A*.
    pub fn with_heuristic<G: Heuristic>(self, heuristic: G) -> Solver<G> {
        Solver {
            heuristic,
            max_nodes: self.max_nodes,
            nodes_explored: 0,
        }
    }

    /// Give up with `SolveResult::Cutoff` after expanding this many nodes.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Nodes expanded by the most recent search.
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    pub fn solve(
        &mut self,
        strategy: Strategy,
        start: &Board,
        start_blank: Position,
        goal: &Board,
    ) -> SolveResult {
        let result = match strategy {
            Strategy::Bfs => self.solve_bfs(start, start_blank, goal),
            Strategy::Dfs { max_depth } => self.solve_dfs(start, start_blank, goal, max_depth),
            Strategy::Iddfs { max_depth } => self.solve_iddfs(start, start_blank, goal, max_depth),
            Strategy::AStar => self.solve_astar(start, start_blank, goal),
        };
        debug!(
            "{}: explored {} nodes, {}",
            strategy,
            self.nodes_explored,
            match &result {
                SolveResult::Solved(moves) => format!("solved in {} moves", moves.len()),
                SolveResult::Cutoff => "cut off".to_string(),
                SolveResult::Impossible => "no solution".to_string(),
            }
        );
        result
    }

    /// Returns true (and logs) when the node budget is spent; otherwise
    /// counts one more expansion.
    fn budget_spent(&mut self) -> bool {
        if self.nodes_explored >= self.max_nodes {
            trace!("node budget of {} exhausted", self.max_nodes);
            return true;
        }
        self.nodes_explored += 1;
        false
    }

    /// Breadth-first search from `start` to `goal`.
    pub fn solve_bfs(&mut self, start: &Board, start_blank: Position, goal: &Board) -> SolveResult {
        self.nodes_explored = 0;

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        visited.insert(start.clone());
        queue.push_back(SearchState::new(start.clone(), start_blank, &NullHeuristic));

        while let Some(current) = queue.pop_front() {
            if current.board() == goal {
                return SolveResult::Solved(current.into_moves());
            }
            if self.budget_spent() {
                return SolveResult::Cutoff;
            }

            for next in current.successors(&NullHeuristic) {
                if visited.insert(next.board().clone()) {
                    queue.push_back(next);
                }
            }
        }

        SolveResult::Impossible
    }

    /// Depth-limited DFS with a visited set shared by every branch.
    ///
    /// A board first reached through one branch is never revisited through
    /// another, so this search is incomplete and the path it returns need not
    /// be the shortest. States at `max_depth` are still checked against the
    /// goal but not expanded. See [`Solver::solve_iddfs`] for a complete
    /// depth-limited search.
    pub fn solve_dfs(
        &mut self,
        start: &Board,
        start_blank: Position,
        goal: &Board,
        max_depth: usize,
    ) -> SolveResult {
        self.nodes_explored = 0;

        let mut stack = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(start.clone());
        stack.push(SearchState::new(start.clone(), start_blank, &NullHeuristic));

        while let Some(current) = stack.pop() {
            if current.board() == goal {
                return SolveResult::Solved(current.into_moves());
            }
            if current.path().len() >= max_depth {
                continue;
            }
            if self.budget_spent() {
                return SolveResult::Cutoff;
            }

            for next in current.successors(&NullHeuristic) {
                if visited.insert(next.board().clone()) {
                    stack.push(next);
                }
            }
        }

        SolveResult::Impossible
    }

    /// Iterative deepening DFS, tracking visited boards only along the
    /// current path. Finds a shortest path whenever one of length
    /// `<= max_depth` exists.
    pub fn solve_iddfs(
        &mut self,
        start: &Board,
        start_blank: Position,
        goal: &Board,
        max_depth: usize,
    ) -> SolveResult {
        self.nodes_explored = 0;

        let mut moves = Vec::new();
        let mut on_path = HashSet::new();

        for depth in 0..=max_depth {
            moves.clear();
            on_path.clear();
            on_path.insert(start.clone());

            match self.probe(start, start_blank, goal, depth, &mut on_path, &mut moves) {
                Probe::Found => return SolveResult::Solved(moves),
                Probe::Cutoff => return SolveResult::Cutoff,
                // Nothing was cut by the bound, so going deeper can't help
                Probe::Exhausted => return SolveResult::Impossible,
                Probe::Limit => {}
            }
        }

        SolveResult::Impossible
    }

    fn probe(
        &mut self,
        board: &Board,
        blank: Position,
        goal: &Board,
        remaining: usize,
        on_path: &mut HashSet<Board>,
        moves: &mut Vec<Direction>,
    ) -> Probe {
        if board == goal {
            return Probe::Found;
        }
        if remaining == 0 {
            return Probe::Limit;
        }
        if self.budget_spent() {
            return Probe::Cutoff;
        }

        let mut outcome = Probe::Exhausted;
        for dir in ALL_DIRECTIONS {
            let Some((next, next_blank)) = board.slide(blank, dir) else {
                continue;
            };
            if on_path.contains(&next) {
                continue;
            }

            on_path.insert(next.clone());
            moves.push(dir);

            match self.probe(&next, next_blank, goal, remaining - 1, on_path, moves) {
                Probe::Found => return Probe::Found,
                Probe::Cutoff => return Probe::Cutoff,
                Probe::Limit => outcome = Probe::Limit,
                Probe::Exhausted => {}
            }

            moves.pop();
            on_path.remove(&next);
        }

        outcome
    }

    /// A* search ordered by `f = g + h` using the configured heuristic.
    ///
    /// The open set is a bucketed priority queue plus a map from board to the
    /// best `f` queued for it. A successor is dropped when its board is closed
    /// or already queued with an equal or lower `f`; superseded queue entries
    /// are skipped when they surface.
    pub fn solve_astar(&mut self, start: &Board, start_blank: Position, goal: &Board) -> SolveResult {
        self.nodes_explored = 0;

        let mut open = PriorityQueue::new();
        let mut open_best: HashMap<Board, u32> = HashMap::new();
        let mut closed: HashSet<Board> = HashSet::new();

        let start_state = SearchState::new(start.clone(), start_blank, &self.heuristic);
        open_best.insert(start.clone(), start_state.f());
        open.push(start_state.f(), start_state);

        while let Some(current) = open.pop_min() {
            if closed.contains(current.board()) {
                continue;
            }
            if current.board() == goal {
                return SolveResult::Solved(current.into_moves());
            }
            if self.budget_spent() {
                return SolveResult::Cutoff;
            }

            open_best.remove(current.board());
            closed.insert(current.board().clone());

            for next in current.successors(&self.heuristic) {
                if closed.contains(next.board()) {
                    continue;
                }
                let f = next.f();
                if open_best.get(next.board()).is_some_and(|&best| best <= f) {
                    continue;
                }
                open_best.insert(next.board().clone(), f);
                open.push(f, next);
            }
        }

        SolveResult::Impossible
    }
}

/// Shortest solution by breadth-first search, or `None` if the goal is unreachable.
///
/// Boards must be `n`×`n` with exactly one blank each. Run time grows with the
/// full state space; keep `n` at 3 or below.
pub fn solve_bfs(
    start: &Board,
    start_blank: Position,
    goal: &Board,
    n: usize,
) -> Option<Vec<Direction>> {
    debug_assert_eq!(start.size(), n);
    Solver::new()
        .solve(Strategy::Bfs, start, start_blank, goal)
        .into_option()
}

/// Depth-limited DFS with a shared visited set. May return `None` even when a
/// solution exists within `max_depth`.
pub fn solve_dfs(
    start: &Board,
    start_blank: Position,
    goal: &Board,
    max_depth: usize,
    n: usize,
) -> Option<Vec<Direction>> {
    debug_assert_eq!(start.size(), n);
    Solver::new()
        .solve(Strategy::Dfs { max_depth }, start, start_blank, goal)
        .into_option()
}

/// Optimal solution by A* with Manhattan distance measured against `goal`.
pub fn solve_astar(
    start: &Board,
    start_blank: Position,
    goal: &Board,
    n: usize,
) -> Option<Vec<Direction>> {
    debug_assert_eq!(start.size(), n);
    Solver::new()
        .with_heuristic(GoalManhattan::new(goal))
        .solve(Strategy::AStar, start, start_blank, goal)
        .into_option()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::ManhattanHeuristic;

    fn parse(text: &str) -> (Board, Position) {
        let board = Board::from_text(text).unwrap();
        let blank = board.blank_position().unwrap();
        (board, blank)
    }

    fn assert_reaches(start: &Board, moves: &[Direction], goal: &Board) {
        assert_eq!(&start.apply_moves(moves).unwrap(), goal);
    }

    #[test]
    fn test_solve_already_solved() {
        let goal = Board::canonical(3);
        let blank = goal.blank_position().unwrap();

        assert_eq!(solve_bfs(&goal, blank, &goal, 3), Some(vec![]));
        assert_eq!(solve_dfs(&goal, blank, &goal, 0, 3), Some(vec![]));
        assert_eq!(solve_dfs(&goal, blank, &goal, DEFAULT_MAX_DEPTH, 3), Some(vec![]));
        assert_eq!(solve_astar(&goal, blank, &goal, 3), Some(vec![]));
    }

    #[test]
    fn test_solve_one_move() {
        let (start, blank) = parse("1 2 3\n4 5 6\n7 0 8");
        let goal = Board::canonical(3);

        assert_eq!(solve_bfs(&start, blank, &goal, 3), Some(vec![Direction::Right]));
        assert_eq!(solve_astar(&start, blank, &goal, 3), Some(vec![Direction::Right]));
        assert_eq!(solve_dfs(&start, blank, &goal, 1, 3), Some(vec![Direction::Right]));
    }

    #[test]
    fn test_solve_two_moves() {
        let (start, blank) = parse("1 2 3\n4 5 6\n0 7 8");
        let goal = Board::canonical(3);
        let expected = vec![Direction::Right, Direction::Right];

        assert_eq!(solve_bfs(&start, blank, &goal, 3), Some(expected.clone()));
        assert_eq!(solve_astar(&start, blank, &goal, 3), Some(expected));
    }

    #[test]
    fn test_unsolvable() {
        let (start, blank) = parse("2 1 3\n4 5 6\n7 8 0");
        let goal = Board::canonical(3);

        assert_eq!(solve_bfs(&start, blank, &goal, 3), None);
        assert_eq!(solve_dfs(&start, blank, &goal, DEFAULT_MAX_DEPTH, 3), None);
        assert_eq!(solve_astar(&start, blank, &goal, 3), None);
    }

    #[test]
    fn test_unsolvable_reports_impossible() {
        let (start, blank) = parse("2 1\n3 0");
        let goal = Board::canonical(2);
        let mut solver = Solver::new();

        assert_eq!(solver.solve_bfs(&start, blank, &goal), SolveResult::Impossible);
        // 2x2 boards have 12 reachable configurations
        assert_eq!(solver.nodes_explored(), 12);
    }

    #[test]
    fn test_dfs_depth_below_shortest() {
        let (start, blank) = parse("1 2 3\n4 5 6\n0 7 8");
        let goal = Board::canonical(3);

        assert_eq!(solve_dfs(&start, blank, &goal, 1, 3), None);
        assert_eq!(solve_dfs(&start, blank, &goal, 0, 3), None);
    }

    #[test]
    fn test_dfs_result_is_valid() {
        let (start, blank) = parse("1 2 3\n4 0 6\n7 5 8");
        let goal = Board::canonical(3);

        if let Some(moves) = solve_dfs(&start, blank, &goal, 12, 3) {
            assert!(moves.len() <= 12);
            assert_reaches(&start, &moves, &goal);
        }
    }

    #[test]
    fn test_iddfs_shortest() {
        let (start, blank) = parse("1 2 3\n4 0 6\n7 5 8");
        let goal = Board::canonical(3);
        let mut solver = Solver::new();

        let result = solver.solve_iddfs(&start, blank, &goal, 10);
        assert_eq!(result, SolveResult::Solved(vec![Direction::Down, Direction::Right]));

        assert_eq!(solver.solve_iddfs(&start, blank, &goal, 1), SolveResult::Impossible);
    }

    #[test]
    fn test_iddfs_exhausts_small_space() {
        let (start, blank) = parse("2 1\n3 0");
        let goal = Board::canonical(2);
        let mut solver = Solver::new();

        assert_eq!(solver.solve_iddfs(&start, blank, &goal, 50), SolveResult::Impossible);
    }

    #[test]
    fn test_astar_matches_bfs_length() {
        let (start, blank) = parse("8 6 7\n2 5 4\n3 0 1");
        let goal = Board::canonical(3);

        let bfs = solve_bfs(&start, blank, &goal, 3).unwrap();
        let astar = solve_astar(&start, blank, &goal, 3).unwrap();

        // One of the hardest 8-puzzle instances
        assert_eq!(bfs.len(), 31);
        assert_eq!(astar.len(), 31);
        assert_reaches(&start, &bfs, &goal);
        assert_reaches(&start, &astar, &goal);
    }

    #[test]
    fn test_astar_non_canonical_goal() {
        let goal = Board::from_text("0 1 2\n3 4 5\n6 7 8").unwrap();
        let start = goal
            .apply_moves(&[Direction::Right, Direction::Down, Direction::Right, Direction::Down])
            .unwrap();
        let blank = start.blank_position().unwrap();

        let bfs = solve_bfs(&start, blank, &goal, 3).unwrap();
        let astar = solve_astar(&start, blank, &goal, 3).unwrap();
        assert_eq!(bfs.len(), 4);
        assert_eq!(astar.len(), 4);
        assert_reaches(&start, &astar, &goal);
    }

    #[test]
    fn test_astar_canonical_heuristic() {
        let (start, blank) = parse("1 2 3\n4 0 6\n7 5 8");
        let goal = Board::canonical(3);
        let mut solver = Solver::new().with_heuristic(ManhattanHeuristic);

        let result = solver.solve(Strategy::AStar, &start, blank, &goal);
        assert_eq!(result, SolveResult::Solved(vec![Direction::Down, Direction::Right]));
        // Manhattan guides straight to the goal
        assert_eq!(solver.nodes_explored(), 2);
    }

    #[test]
    fn test_node_budget_cutoff() {
        let (start, blank) = parse("8 6 7\n2 5 4\n3 0 1");
        let goal = Board::canonical(3);
        let mut solver = Solver::new().with_max_nodes(10);

        assert_eq!(solver.solve(Strategy::Bfs, &start, blank, &goal), SolveResult::Cutoff);
        assert_eq!(solver.nodes_explored(), 10);
        assert_eq!(
            solver.solve(Strategy::Dfs { max_depth: 20 }, &start, blank, &goal),
            SolveResult::Cutoff
        );
        assert_eq!(
            solver.solve(Strategy::AStar, &start, blank, &goal),
            SolveResult::Cutoff
        );
        assert_eq!(SolveResult::Cutoff.into_option(), None);
    }

    #[test]
    fn test_goal_without_blank_never_matches() {
        let (start, blank) = parse("1 0\n3 2");
        let goal = Board::new(2, vec![1, 2, 3, 3]);

        assert_eq!(solve_bfs(&start, blank, &goal, 2), None);
        assert_eq!(solve_astar(&start, blank, &goal, 2), None);
    }
}
