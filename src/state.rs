use crate::board::{ALL_DIRECTIONS, Board, Direction, Position};
use crate::heuristic::Heuristic;
use arrayvec::ArrayVec;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug)]
struct Step {
    direction: Direction,
    prev: Option<Rc<Step>>,
}

/// Moves taken from the start state. Extending a path shares the existing
/// prefix, so predecessors are referenced but never altered.
#[derive(Debug, Clone, Default)]
pub struct Path {
    last: Option<Rc<Step>>,
    len: usize,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn extend(&self, direction: Direction) -> Path {
        Path {
            last: Some(Rc::new(Step {
                direction,
                prev: self.last.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Reconstruct the ordered move list, first move first.
    pub fn to_vec(&self) -> Vec<Direction> {
        let mut moves = Vec::with_capacity(self.len);
        let mut cursor = self.last.as_deref();
        while let Some(step) = cursor {
            moves.push(step.direction);
            cursor = step.prev.as_deref();
        }
        moves.reverse();
        moves
    }
}

// Unlink uniquely owned steps one at a time so long paths don't recurse on drop.
impl Drop for Path {
    fn drop(&mut self) {
        let mut cursor = self.last.take();
        while let Some(step) = cursor {
            match Rc::try_unwrap(step) {
                Ok(mut step) => cursor = step.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// A board configuration plus the path that reached it.
///
/// Identity is the board alone: two states with the same cells are equal and
/// hash identically no matter how they were reached.
#[derive(Debug, Clone)]
pub struct SearchState {
    board: Board,
    blank: Position,
    path: Path,
    h: u32,
}

impl SearchState {
    pub fn new<H: Heuristic>(board: Board, blank: Position, heuristic: &H) -> Self {
        let h = heuristic.estimate(&board);
        SearchState {
            board,
            blank,
            path: Path::new(),
            h,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn blank(&self) -> Position {
        self.blank
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path cost so far.
    pub fn g(&self) -> u32 {
        self.path.len() as u32
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn f(&self) -> u32 {
        self.g() + self.h
    }

    /// The state reached by moving the blank in `direction`, if that stays on the grid.
    pub fn successor<H: Heuristic>(&self, direction: Direction, heuristic: &H) -> Option<Self> {
        let (board, blank) = self.board.slide(self.blank, direction)?;
        let h = heuristic.estimate(&board);
        Some(SearchState {
            board,
            blank,
            path: self.path.extend(direction),
            h,
        })
    }

    /// All legal successors, in Up, Down, Left, Right order.
    pub fn successors<H: Heuristic>(&self, heuristic: &H) -> ArrayVec<SearchState, 4> {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&dir| self.successor(dir, heuristic))
            .collect()
    }

    pub fn into_moves(self) -> Vec<Direction> {
        self.path.to_vec()
    }
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
    }
}

impl Eq for SearchState {}

impl Hash for SearchState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
    }
}
