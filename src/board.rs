use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;

/// Largest supported grid dimension (tile values must fit in a `u16`).
pub const MAX_SIZE: usize = 255;

/// Direction the blank moves in. The tile sitting in that direction slides the
/// opposite way into the blank's old cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Neighbor enumeration order used by every search strategy.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// (column, row) offset. Rows grow downward.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

impl FromStr for Direction {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(BoardError::Invalid(format!("Unknown direction '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub fn new(col: usize, row: usize) -> Self {
        Position { col, row }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Error type for board construction and move playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Malformed board contents
    Invalid(String),
    /// A move in a played-back sequence would leave the grid
    IllegalMove { index: usize, direction: Direction },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Invalid(msg) => write!(f, "Invalid board: {}", msg),
            BoardError::IllegalMove { index, direction } => {
                write!(f, "Illegal move #{} ({}): blank would leave the grid", index + 1, direction)
            }
        }
    }
}

impl std::error::Error for BoardError {}

impl From<String> for BoardError {
    fn from(err: String) -> Self {
        BoardError::Invalid(err)
    }
}

/// An N×N sliding puzzle board. `0` is the blank, `1..N²-1` are tiles.
/// Cells are stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Box<[u16]>,
}

impl Board {
    /// Build a board without validation. The caller guarantees `cells` holds
    /// `size * size` values forming a permutation of `0..size*size`.
    pub fn new(size: usize, cells: Vec<u16>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Board {
            size,
            cells: cells.into_boxed_slice(),
        }
    }

    /// Build a board from rows, checking shape and that every value appears once.
    pub fn from_rows(rows: Vec<Vec<u16>>) -> Result<Self, BoardError> {
        let size = rows.len();
        if size < 2 {
            return Err(format!("Board must be at least 2x2, got {} rows", size).into());
        }
        if size > MAX_SIZE {
            return Err(format!("Board size {} exceeds maximum size {}", size, MAX_SIZE).into());
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(format!(
                    "Row {} has {} values, expected {}",
                    row + 1,
                    values.len(),
                    size
                )
                .into());
            }
            cells.extend(values);
        }

        let mut seen = vec![false; size * size];
        for &value in &cells {
            let idx = value as usize;
            if idx >= seen.len() {
                return Err(format!("Value {} out of range for a {}x{} board", value, size, size).into());
            }
            if seen[idx] {
                return Err(format!("Value {} appears more than once", value).into());
            }
            seen[idx] = true;
        }

        Ok(Board::new(size, cells))
    }

    /// Parse a board from whitespace-separated rows of integers.
    /// `_` and `.` are accepted as the blank.
    pub fn from_text(text: &str) -> Result<Self, BoardError> {
        let mut rows = Vec::new();
        for (y, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let value = match token {
                    "_" | "." => 0,
                    _ => token.parse::<u16>().map_err(|_| {
                        format!("Invalid token '{}' on line {}", token, y + 1)
                    })?,
                };
                row.push(value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err("Empty board".to_string().into());
        }

        Self::from_rows(rows)
    }

    /// The goal layout: `1..N²-1` in reading order with the blank last.
    pub fn canonical(size: usize) -> Self {
        let count = size * size;
        let cells = (1..count as u16).chain(std::iter::once(0)).collect();
        Board::new(size, cells)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    pub fn get(&self, pos: Position) -> u16 {
        self.cells[pos.row * self.size + pos.col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u16]> {
        self.cells.chunks(self.size)
    }

    /// Location of the blank, or `None` if the board has no zero cell.
    pub fn blank_position(&self) -> Option<Position> {
        self.cells
            .iter()
            .position(|&v| v == 0)
            .map(|idx| Position::new(idx % self.size, idx / self.size))
    }

    pub fn is_canonical(&self) -> bool {
        let last = self.cells.len() - 1;
        self.cells
            .iter()
            .enumerate()
            .all(|(idx, &v)| if idx == last { v == 0 } else { v as usize == idx + 1 })
    }

    /// Step from `pos` in `dir`. Returns `None` when the step leaves the grid.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let col = pos.col.checked_add_signed(dx)?;
        let row = pos.row.checked_add_signed(dy)?;

        if col < self.size && row < self.size {
            Some(Position::new(col, row))
        } else {
            None
        }
    }

    /// Produce the board obtained by moving the blank at `blank` one cell in
    /// `dir`, together with the new blank position. `self` is left untouched.
    pub fn slide(&self, blank: Position, dir: Direction) -> Option<(Board, Position)> {
        let target = self.neighbor(blank, dir)?;
        let mut cells = self.cells.clone();
        let from = blank.row * self.size + blank.col;
        let to = target.row * self.size + target.col;
        cells[from] = cells[to];
        cells[to] = 0;

        Some((
            Board {
                size: self.size,
                cells,
            },
            target,
        ))
    }

    /// Apply a single blank move, locating the blank first.
    pub fn apply(&self, dir: Direction) -> Option<Board> {
        let blank = self.blank_position()?;
        self.slide(blank, dir).map(|(board, _)| board)
    }

    /// Play back a move sequence one direction at a time.
    pub fn apply_moves(&self, moves: &[Direction]) -> Result<Board, BoardError> {
        let mut blank = self
            .blank_position()
            .ok_or_else(|| BoardError::Invalid("No blank cell on board".to_string()))?;
        let mut board = self.clone();

        for (index, &direction) in moves.iter().enumerate() {
            let (next, next_blank) = board
                .slide(blank, direction)
                .ok_or(BoardError::IllegalMove { index, direction })?;
            board = next;
            blank = next_blank;
        }

        Ok(board)
    }

    fn inversions(&self) -> usize {
        let tiles: Vec<u16> = self.cells.iter().copied().filter(|&v| v != 0).collect();
        let mut count = 0;
        for i in 0..tiles.len() {
            for j in i + 1..tiles.len() {
                if tiles[i] > tiles[j] {
                    count += 1;
                }
            }
        }
        count
    }

    /// Permutation parity preserved by every legal move. For odd sizes this
    /// is the inversion parity; for even sizes the blank's row joins in,
    /// because a vertical move shifts a tile past an odd number of others.
    fn parity(&self) -> usize {
        let inversions = self.inversions();
        if self.size % 2 == 1 {
            inversions % 2
        } else {
            let blank_row = self.blank_position().map_or(0, |p| p.row);
            (inversions + blank_row) % 2
        }
    }

    /// Whether `goal` is reachable from this board by blank moves.
    pub fn can_reach(&self, goal: &Board) -> bool {
        self.size == goal.size && self.parity() == goal.parity()
    }

    /// Whether the canonical goal is reachable from this board.
    pub fn is_solvable(&self) -> bool {
        self.can_reach(&Board::canonical(self.size))
    }

    /// Random walk of `moves` blank moves starting from this board. The walk
    /// never immediately undoes its previous move, so the result is always
    /// reachable from (and back to) `self`.
    pub fn scramble<R: Rng + ?Sized>(&self, moves: usize, rng: &mut R) -> Board {
        let Some(mut blank) = self.blank_position() else {
            return self.clone();
        };
        let mut board = self.clone();
        let mut last: Option<Direction> = None;

        for _ in 0..moves {
            let mut candidates = ALL_DIRECTIONS;
            candidates.shuffle(rng);
            let step = candidates.iter().copied().find(|dir| {
                Some(dir.opposite()) != last && board.neighbor(blank, *dir).is_some()
            });
            let Some(dir) = step else {
                break;
            };
            if let Some((next, next_blank)) = board.slide(blank, dir) {
                board = next;
                blank = next_blank;
                last = Some(dir);
            }
        }

        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.size * self.size - 1).to_string().len();
        for row in self.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|&v| {
                    if v == 0 {
                        format!("{:>width$}", "_", width = width)
                    } else {
                        format!("{:>width$}", v, width = width)
                    }
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn board(rows: &[&[u16]]) -> Board {
        Board::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_parse_basic_board() {
        let b = Board::from_text("1 2 3\n4 5 6\n7 _ 8").unwrap();
        assert_eq!(b.size(), 3);
        assert_eq!(b.cells(), &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(b.blank_position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_parse_duplicate_value() {
        let result = Board::from_text("1 1\n2 0");
        assert!(matches!(result, Err(BoardError::Invalid(_))));
    }

    #[test]
    fn test_parse_ragged_rows() {
        let result = Board::from_text("1 2 3\n4 5\n6 7 0");
        assert!(matches!(result, Err(BoardError::Invalid(_))));
    }

    #[test]
    fn test_parse_out_of_range() {
        let result = Board::from_text("1 2\n4 0");
        assert!(matches!(result, Err(BoardError::Invalid(_))));
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "1 2 3\n4 5 6\n7 _ 8\n";
        let b = Board::from_text(text).unwrap();
        assert_eq!(b.to_string(), text);
        assert_eq!(Board::from_text(&b.to_string()).unwrap(), b);
    }

    #[test]
    fn test_canonical() {
        let goal = Board::canonical(3);
        assert_eq!(goal, board(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 0]]));
        assert!(goal.is_canonical());
        assert_eq!(goal.blank_position(), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_neighbor_bounds() {
        let b = Board::canonical(3);
        let corner = Position::new(0, 0);
        assert_eq!(b.neighbor(corner, Direction::Up), None);
        assert_eq!(b.neighbor(corner, Direction::Left), None);
        assert_eq!(b.neighbor(corner, Direction::Down), Some(Position::new(0, 1)));
        assert_eq!(b.neighbor(corner, Direction::Right), Some(Position::new(1, 0)));
        let far = Position::new(2, 2);
        assert_eq!(b.neighbor(far, Direction::Down), None);
        assert_eq!(b.neighbor(far, Direction::Right), None);
    }

    #[test]
    fn test_slide_all_directions() {
        let b = board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        let blank = Position::new(1, 1);

        let (up, pos) = b.slide(blank, Direction::Up).unwrap();
        assert_eq!(up.cells(), &[1, 0, 3, 4, 2, 5, 6, 7, 8]);
        assert_eq!(pos, Position::new(1, 0));

        let (down, pos) = b.slide(blank, Direction::Down).unwrap();
        assert_eq!(down.cells(), &[1, 2, 3, 4, 7, 5, 6, 0, 8]);
        assert_eq!(pos, Position::new(1, 2));

        let (left, pos) = b.slide(blank, Direction::Left).unwrap();
        assert_eq!(left.cells(), &[1, 2, 3, 0, 4, 5, 6, 7, 8]);
        assert_eq!(pos, Position::new(0, 1));

        let (right, pos) = b.slide(blank, Direction::Right).unwrap();
        assert_eq!(right.cells(), &[1, 2, 3, 4, 5, 0, 6, 7, 8]);
        assert_eq!(pos, Position::new(2, 1));

        // The source board is never modified
        assert_eq!(b.cells(), &[1, 2, 3, 4, 0, 5, 6, 7, 8]);
    }

    #[test]
    fn test_slide_out_of_bounds() {
        let b = Board::canonical(3);
        assert!(b.slide(Position::new(2, 2), Direction::Right).is_none());
        assert!(b.slide(Position::new(2, 2), Direction::Down).is_none());
    }

    #[test]
    fn test_apply_moves() {
        let start = board(&[&[1, 2, 3], &[4, 5, 6], &[0, 7, 8]]);
        let end = start
            .apply_moves(&[Direction::Right, Direction::Right])
            .unwrap();
        assert_eq!(end, Board::canonical(3));
    }

    #[test]
    fn test_apply_moves_illegal() {
        let start = Board::canonical(3);
        let result = start.apply_moves(&[Direction::Up, Direction::Right]);
        assert_eq!(
            result,
            Err(BoardError::IllegalMove {
                index: 1,
                direction: Direction::Right
            })
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("Up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("r".parse::<Direction>().unwrap(), Direction::Right);
        assert!("sideways".parse::<Direction>().is_err());
        for dir in ALL_DIRECTIONS {
            assert_eq!(dir.to_string().parse::<Direction>().unwrap(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_solvability() {
        assert!(Board::canonical(3).is_solvable());
        assert!(Board::canonical(4).is_solvable());

        // Swapping two adjacent tiles flips the parity
        let swapped = board(&[&[2, 1, 3], &[4, 5, 6], &[7, 8, 0]]);
        assert!(!swapped.is_solvable());

        let swapped4 = board(&[
            &[1, 2, 3, 4],
            &[5, 6, 7, 8],
            &[9, 10, 11, 12],
            &[13, 15, 14, 0],
        ]);
        assert!(!swapped4.is_solvable());

        // A vertical move on an even board keeps it solvable
        let moved = Board::canonical(4).apply(Direction::Up).unwrap();
        assert!(moved.is_solvable());
    }

    #[test]
    fn test_can_reach_non_canonical_goal() {
        let a = board(&[&[0, 1], &[2, 3]]);
        let b = a.apply(Direction::Right).unwrap();
        assert!(a.can_reach(&b));
        assert!(b.can_reach(&a));
        let c = board(&[&[0, 2], &[1, 3]]);
        assert!(!a.can_reach(&c));
        assert!(!a.can_reach(&Board::canonical(3)));
    }

    #[test]
    fn test_scramble_stays_reachable() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for size in 2..=5 {
            let goal = Board::canonical(size);
            let scrambled = goal.scramble(40, &mut rng);
            assert!(scrambled.is_solvable());
            assert!(scrambled.blank_position().is_some());
        }
    }
}
