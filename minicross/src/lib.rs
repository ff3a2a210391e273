//! This crate is the foundation for a mini crossword player. It provides no UI itself,
//! but see `minicross-tui` for an example of how you can use it to produce a crossword app.
//!
//! Puzzles are loaded either from `.puz` files, a de facto standard binary format for
//! crossword puzzles, or from a JSON document describing the grid and clues. Loading goes
//! through three steps:
//!
//! 1. [decode] turns raw bytes into a [PuzzleDocument].
//! 2. [build_index] walks the document and produces a [ClueMap] of word spans.
//! 3. [PlayState] holds the player's letters and cursor, and reacts to input events.
//!
//! [PlayState::load] runs the whole pipeline in one go.

use serde::Serialize;
use std::fmt::{self, Display};
use std::ops::Not;

mod checksum;
mod document;
mod error;
mod grid;
mod index;
mod ipuz;
mod play;
mod puz;
mod timer;
mod view;

#[cfg(test)]
mod testutil;

pub use checksum::ChecksumMismatch;
pub use document::{
  PuzzleDocument, decode, decode_checked, decode_json, decode_puz, decode_puz_checked, load_file,
};
pub use error::Error;
pub use grid::{Grid, GridPosIter, Square, Step};
pub use index::{ClueEntry, ClueId, ClueMap, build_index};
pub use play::{Completion, PlayCell, PlayOptions, PlayState};
pub use timer::Timer;
pub use view::{CellStatus, CellView, ClueListing, SquareStyle, format_time};

use Direction::{Across, Down};

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Across,
  Down,
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Across => write!(f, "across"),
      Down => write!(f, "down"),
    }
  }
}

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);
