use crate::Direction::{self, Across, Down};
use crate::Pos;
use serde::Serialize;
use std::fmt::{self, Debug, Display};

/// A square of a puzzle's solution.
#[derive(Copy, Clone, Eq, PartialEq, Serialize)]
pub enum Square {
  /// A block where nothing can be entered.
  Block,
  /// An open square and the letter that belongs in it.
  Letter(char),
}

/// Letters are stored and compared in uppercase.
pub(crate) fn normalize_letter(c: char) -> char {
  c.to_uppercase().next().unwrap_or(c)
}

impl Square {
  /// Interprets one byte of a `.puz` solution grid. Both `.` and `:` mark a block.
  pub(crate) fn from_puz_byte(byte: u8) -> Self {
    match byte {
      b'.' | b':' => Self::Block,
      // ISO-8859-1 maps every byte onto the code point of the same value.
      b => Self::Letter(normalize_letter(b as char)),
    }
  }

  pub fn is_block(&self) -> bool {
    *self == Self::Block
  }

  pub fn is_open(&self) -> bool {
    !self.is_block()
  }

  /// The solution letter, or `None` for a block.
  pub fn letter(&self) -> Option<char> {
    match self {
      Self::Block => None,
      Self::Letter(c) => Some(*c),
    }
  }
}

impl Debug for Square {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Block => write!(f, "■"),
      Self::Letter(c) => write!(f, "{}", c),
    }
  }
}

impl Display for Square {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// One step on the grid, as produced by the arrow keys.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Step {
  Up,
  Down,
  Left,
  Right,
}

impl Step {
  /// The step that moves forward through a word in the given direction.
  pub fn forward(direction: Direction) -> Self {
    match direction {
      Across => Self::Right,
      Down => Self::Down,
    }
  }
}

/// A rectangular grid stored row-major and addressed by `(row, col)`.
#[derive(Clone, Eq, PartialEq)]
pub struct Grid<T> {
  width: usize,
  height: usize,
  cells: Vec<T>,
}

impl<T> Grid<T> {
  /// Wraps row-major `cells`. Returns `None` unless there are exactly `width * height`.
  pub fn from_cells(width: usize, height: usize, cells: Vec<T>) -> Option<Self> {
    (cells.len() == width * height).then_some(Self {
      width,
      height,
      cells,
    })
  }

  /// Builds a grid by calling `f` for every position, left to right and top to bottom.
  pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(Pos) -> T) -> Self {
    let cells = GridPosIter::new((width, height)).map(&mut f).collect();
    Self {
      width,
      height,
      cells,
    }
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  /// The size of this grid, expressed as (width, height).
  pub fn size(&self) -> (usize, usize) {
    (self.width, self.height)
  }

  pub fn contains(&self, (row, col): Pos) -> bool {
    row < self.height && col < self.width
  }

  fn index(&self, (row, col): Pos) -> usize {
    row * self.width + col
  }

  pub fn get(&self, pos: Pos) -> Option<&T> {
    if self.contains(pos) {
      self.cells.get(self.index(pos))
    } else {
      None
    }
  }

  pub(crate) fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
    if self.contains(pos) {
      let index = self.index(pos);
      self.cells.get_mut(index)
    } else {
      None
    }
  }

  /// An iterator over all the positions of this grid, from left to right and top to bottom.
  pub fn positions(&self) -> GridPosIter {
    GridPosIter::new(self.size())
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.cells.iter()
  }

  pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
    self.cells.iter_mut()
  }

  pub fn rows(&self) -> impl Iterator<Item = &[T]> {
    self.cells.chunks(self.width.max(1))
  }

  /// The position one step away from `pos`, if it is inside the grid.
  pub fn neighbor(&self, (row, col): Pos, step: Step) -> Option<Pos> {
    let pos = match step {
      Step::Up => (row.checked_sub(1)?, col),
      Step::Down => (row + 1, col),
      Step::Left => (row, col.checked_sub(1)?),
      Step::Right => (row, col + 1),
    };
    self.contains(pos).then_some(pos)
  }

  /// Walks from `pos` in the direction of `step` and returns the first position
  /// whose cell satisfies `accept`.
  pub fn next_matching(&self, pos: Pos, step: Step, accept: impl Fn(&T) -> bool) -> Option<Pos> {
    let mut pos = pos;
    loop {
      pos = self.neighbor(pos, step)?;
      if self.get(pos).is_some_and(&accept) {
        return Some(pos);
      }
    }
  }
}

/// A cell that starts at least one word, found by the numbering scan.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct WordStart {
  pub pos: Pos,
  pub number: u16,
  pub across: bool,
  pub down: bool,
}

impl Grid<Square> {
  /// Whether the given position is a block. Positions outside the grid count as blocks.
  pub fn is_block(&self, pos: Pos) -> bool {
    self.get(pos).is_none_or(Square::is_block)
  }

  fn neighbor_is_block(&self, pos: Pos, step: Step) -> bool {
    self.neighbor(pos, step).is_none_or(|p| self.is_block(p))
  }

  pub fn starts(&self, pos: Pos, direction: Direction) -> bool {
    match direction {
      Across => self.starts_across(pos),
      Down => self.starts_down(pos),
    }
  }

  /// Whether the given position is the start of an Across entry.
  pub fn starts_across(&self, pos: Pos) -> bool {
    if self.is_block(pos) {
      return false;
    }

    self.neighbor_is_block(pos, Step::Left) && !self.neighbor_is_block(pos, Step::Right)
  }

  /// Whether the given position is the start of a Down entry.
  pub fn starts_down(&self, pos: Pos) -> bool {
    if self.is_block(pos) {
      return false;
    }

    self.neighbor_is_block(pos, Step::Up) && !self.neighbor_is_block(pos, Step::Down)
  }

  /// Numbers every word start in reading order, starting from 1.
  pub(crate) fn word_starts(&self) -> Vec<WordStart> {
    let mut number = 0;
    self
      .positions()
      .filter_map(|pos| {
        let across = self.starts_across(pos);
        let down = self.starts_down(pos);
        if !(across || down) {
          return None;
        }
        number += 1;
        Some(WordStart {
          pos,
          number,
          across,
          down,
        })
      })
      .collect()
  }

  /// Row-major clue numbers for this grid, with 0 for unnumbered cells.
  pub(crate) fn cell_numbers(&self) -> Vec<u16> {
    let mut numbers = vec![0; self.width * self.height];
    for start in self.word_starts() {
      numbers[self.index(start.pos)] = start.number;
    }
    numbers
  }
}

impl<T: Debug> Debug for Grid<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Grid")
      .field("width", &self.width)
      .field("height", &self.height)
      .field("cells", &self.cells)
      .finish()
  }
}

impl Display for Grid<Square> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f)?;
    for row in self.rows() {
      for sq in row {
        write!(f, "{}", sq)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

/// Iterator over all the positions in a grid.
pub struct GridPosIter {
  pos: Pos,
  size: (usize, usize),
}

impl GridPosIter {
  fn new(size: (usize, usize)) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for GridPosIter {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (width, height) = self.size;
    let (row, col) = self.pos;

    if width == 0 || row == height {
      return None;
    }

    if col == width - 1 {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn basic_grid() -> Grid<Square> {
    let bytes = b"AB.CDE.FG.HIJKLM";
    let squares = bytes.iter().map(|&b| Square::from_puz_byte(b)).collect();
    let grid = Grid::from_cells(4, 4, squares).unwrap();

    #[rustfmt::skip]
    assert_eq!(
      grid.to_string(),
      concat!(
        "\n",
        "AB■C\n",
        "DE■F\n",
        "G■HI\n",
        "JKLM\n",
      )
    );

    grid
  }

  #[test]
  fn grid_starts() {
    let grid = basic_grid();

    let across_starts = [(0, 0), (1, 0), (2, 2), (3, 0)];
    let down_starts = [(0, 0), (0, 1), (0, 3), (2, 2)];

    for pos in grid.positions() {
      assert_eq!(grid.starts_across(pos), across_starts.contains(&pos), "{pos:?}");
      assert_eq!(grid.starts_down(pos), down_starts.contains(&pos), "{pos:?}");
    }
  }

  #[test]
  fn numbering_follows_reading_order() {
    let grid = basic_grid();

    let starts = grid.word_starts();
    let numbered: Vec<(Pos, u16)> = starts.iter().map(|s| (s.pos, s.number)).collect();
    assert_eq!(
      numbered,
      vec![((0, 0), 1), ((0, 1), 2), ((0, 3), 3), ((1, 0), 4), ((2, 2), 5), ((3, 0), 6)]
    );
    assert!(starts[0].across && starts[0].down);
    assert!(!starts[1].across && starts[1].down);

    #[rustfmt::skip]
    assert_eq!(
      grid.cell_numbers(),
      vec![
        1, 2, 0, 3,
        4, 0, 0, 0,
        0, 0, 5, 0,
        6, 0, 0, 0,
      ]
    );
  }

  #[test]
  fn colon_is_a_block() {
    assert!(Square::from_puz_byte(b':').is_block());
    assert_eq!(Square::from_puz_byte(b'Q').letter(), Some('Q'));
  }

  #[test]
  fn next_matching_skips_blocks() {
    let grid = basic_grid();
    let open = |sq: &Square| sq.is_open();

    assert_eq!(grid.next_matching((0, 1), Step::Right, open), Some((0, 3)));
    assert_eq!(grid.next_matching((0, 3), Step::Right, open), None);
    assert_eq!(grid.next_matching((3, 1), Step::Up, open), Some((1, 1)));
    assert_eq!(grid.next_matching((0, 0), Step::Up, open), None);
  }

  #[test]
  fn positions_cover_the_grid_in_reading_order() {
    let grid = Grid::from_fn(3, 2, |pos| pos);
    let positions: Vec<Pos> = grid.positions().collect();
    assert_eq!(positions, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    assert_eq!(grid.get((1, 2)), Some(&(1, 2)));
    assert_eq!(grid.get((2, 0)), None);
    assert!(Grid::from_cells(2, 2, vec![0; 3]).is_none());
  }
}
