use crate::board::{Board, BoardError};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Error type for puzzle file loading.
#[derive(Debug)]
pub enum PuzzleError {
    /// IO error when reading from file
    Io(io::Error),
    /// Invalid board content
    InvalidBoard(String),
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::Io(err) => write!(f, "IO error: {}", err),
            PuzzleError::InvalidBoard(msg) => write!(f, "Invalid board: {}", msg),
        }
    }
}

impl std::error::Error for PuzzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PuzzleError::Io(err) => Some(err),
            PuzzleError::InvalidBoard(_) => None,
        }
    }
}

impl From<io::Error> for PuzzleError {
    fn from(err: io::Error) -> Self {
        PuzzleError::Io(err)
    }
}

impl From<BoardError> for PuzzleError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Invalid(msg) => PuzzleError::InvalidBoard(msg),
            other => PuzzleError::InvalidBoard(other.to_string()),
        }
    }
}

/// A collection of sliding puzzle boards.
#[derive(Debug, Default)]
pub struct Puzzles {
    boards: Vec<Board>,
}

impl Puzzles {
    /// Parse boards from a string.
    ///
    /// Each board is a block of rows of whitespace-separated integers (`0`,
    /// `_` or `.` for the blank). Blocks are separated by empty lines or by
    /// lines starting with `;`, which also serve as comments.
    pub fn from_text(contents: &str) -> Result<Self, PuzzleError> {
        let mut boards = Vec::new();
        let mut current = String::new();

        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                if !current.is_empty() {
                    boards.push(Board::from_text(&current)?);
                    current.clear();
                }
                continue;
            }

            current.push_str(trimmed);
            current.push('\n');
        }

        // Last board may run to end of file
        if !current.is_empty() {
            boards.push(Board::from_text(&current)?);
        }

        Ok(Puzzles { boards })
    }

    /// Parse boards from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PuzzleError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth board (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Board> {
        self.boards.get(index)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Board> {
        self.boards.iter()
    }
}

impl From<Vec<Board>> for Puzzles {
    fn from(boards: Vec<Board>) -> Self {
        Puzzles { boards }
    }
}
