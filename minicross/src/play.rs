use crate::Direction;
use crate::grid::{Grid, Step, normalize_letter};
use crate::index::{ClueEntry, ClueId, ClueMap, build_index};
use crate::timer::Timer;
use crate::view::{CellStatus, CellView, ClueListing, SquareStyle, format_time};
use crate::{Error, Pos, PuzzleDocument, decode, load_file};
use log::debug;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Settings that stay fixed for a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlayOptions {
  /// Mark each letter right or wrong as soon as it is typed.
  pub auto_check: bool,
  /// How often the elapsed-time counter advances.
  pub tick_interval: Duration,
}

impl Default for PlayOptions {
  fn default() -> Self {
    Self {
      auto_check: true,
      tick_interval: Duration::from_secs(1),
    }
  }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
  Playing,
  /// Every open square holds its solution letter. Stays set until [PlayState::clear].
  Completed,
}

/// The player's side of one open square.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlayCell {
  pub solution: char,
  pub user: Option<char>,
  /// `None` until checked.
  pub correct: Option<bool>,
}

impl PlayCell {
  fn new(solution: char) -> Self {
    Self {
      solution,
      user: None,
      correct: None,
    }
  }

  fn is_solved(&self) -> bool {
    self.user == Some(self.solution)
  }
}

/// Represents the position of the user's currently-highlighted square, the `Direction`
/// of the word they are currently entering, and the clue for that word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Cursor {
  cell: Option<Pos>,
  direction: Direction,
  clue: Option<ClueId>,
}

/// A puzzle being played. This owns everything that changes during a game and is the
/// only thing that changes it; input events map onto its methods.
///
/// Operations that need a selected square do nothing when there is none, and selecting
/// a block does nothing, so stray input is simply ignored.
#[derive(Debug)]
pub struct PlayState {
  document: PuzzleDocument,
  clues: ClueMap,
  /// `None` for blocks.
  grid: Grid<Option<PlayCell>>,
  cursor: Cursor,
  completion: Completion,
  auto_check: bool,
  timer: Timer,
}

impl PlayState {
  /// Starts a game on an already indexed document. The cursor starts on 1 Across, or on
  /// the first clue if there is no 1 Across, and the timer starts running.
  pub fn new(document: PuzzleDocument, clues: ClueMap, options: PlayOptions) -> Self {
    let grid = Grid::from_fn(document.width, document.height, |pos| {
      document
        .solution
        .get(pos)
        .and_then(|sq| sq.letter())
        .map(PlayCell::new)
    });

    let cursor = match clues.initial() {
      Some(entry) => Cursor {
        cell: Some(entry.start),
        direction: entry.direction,
        clue: Some(entry.id()),
      },
      None => Cursor {
        cell: None,
        direction: Direction::Across,
        clue: None,
      },
    };

    Self {
      document,
      clues,
      grid,
      cursor,
      completion: Completion::Playing,
      auto_check: options.auto_check,
      timer: Timer::start(options.tick_interval),
    }
  }

  /// Decodes, indexes and starts a puzzle from raw `.puz` or JSON bytes.
  pub fn load(raw: &[u8], options: PlayOptions) -> Result<Self, Error> {
    let document = decode(raw)?;
    Ok(Self::from_document(document, options))
  }

  /// Reads a puzzle file and starts it.
  pub fn open(path: impl AsRef<Path>, options: PlayOptions) -> Result<Self, Error> {
    let document = load_file(path)?;
    Ok(Self::from_document(document, options))
  }

  fn from_document(document: PuzzleDocument, options: PlayOptions) -> Self {
    let clues = build_index(&document);
    debug!(
      "Loaded '{}' ({}x{}) with {} playable clues",
      document.title,
      document.width,
      document.height,
      clues.len()
    );
    Self::new(document, clues, options)
  }

  pub fn document(&self) -> &PuzzleDocument {
    &self.document
  }

  pub fn clues(&self) -> &ClueMap {
    &self.clues
  }

  /// The player's grid; `None` marks a block.
  pub fn grid(&self) -> &Grid<Option<PlayCell>> {
    &self.grid
  }

  pub fn selected_cell(&self) -> Option<Pos> {
    self.cursor.cell
  }

  pub fn direction(&self) -> Direction {
    self.cursor.direction
  }

  /// The clue the cursor is on, if the selected square belongs to one.
  pub fn selected_clue(&self) -> Option<&ClueEntry> {
    self.cursor.clue.and_then(|id| self.clues.get(id))
  }

  pub fn completion(&self) -> Completion {
    self.completion
  }

  pub fn is_completed(&self) -> bool {
    self.completion == Completion::Completed
  }

  pub fn auto_check(&self) -> bool {
    self.auto_check
  }

  /// Turns auto-check on or off for letters typed from now on.
  pub fn set_auto_check(&mut self, auto_check: bool) {
    self.auto_check = auto_check;
  }

  /// Elapsed timer ticks, which are seconds with the default options.
  pub fn elapsed(&self) -> u64 {
    self.timer.elapsed()
  }

  pub fn timer_running(&self) -> bool {
    self.timer.is_running()
  }

  fn is_open(&self, pos: Pos) -> bool {
    matches!(self.grid.get(pos), Some(Some(_)))
  }

  /// Handles a tap on a square.
  ///
  /// Tapping the selected square switches direction, if the square has a clue in the
  /// other direction. Tapping any other square selects it, keeping the current
  /// direction when the square has a clue that way and switching otherwise.
  pub fn select_cell(&mut self, pos: Pos) {
    if !self.is_open(pos) {
      return;
    }

    if self.cursor.cell == Some(pos) {
      let toggled = !self.cursor.direction;
      if let Some(id) = self.clues.resolve(pos, toggled).map(ClueEntry::id) {
        self.cursor.direction = toggled;
        self.cursor.clue = Some(id);
      }
      return;
    }

    self.cursor.cell = Some(pos);
    let current = self.cursor.direction;
    let resolved = [current, !current]
      .into_iter()
      .find_map(|direction| self.clues.resolve(pos, direction).map(ClueEntry::id));
    match resolved {
      Some(id) => {
        self.cursor.direction = id.direction;
        self.cursor.clue = Some(id);
      }
      None => self.cursor.clue = None,
    }
  }

  /// Switches direction on the selected square, if it has a clue the other way.
  pub fn toggle_direction(&mut self) {
    if let Some(pos) = self.cursor.cell {
      self.select_cell(pos);
    }
  }

  /// Moves the selection to the nearest open square in the direction of `step`,
  /// jumping over blocks. Does nothing at the edge of the grid.
  pub fn move_cursor(&mut self, step: Step) {
    let Some(pos) = self.cursor.cell else {
      return;
    };
    if let Some(next) = self.grid.next_matching(pos, step, Option::is_some) {
      self.select_cell(next);
    }
  }

  /// Writes a letter into the selected square, then moves to the next square of the
  /// word, or to the next clue after the word's last square. Characters that can't be
  /// part of an answer are ignored.
  pub fn enter_letter(&mut self, letter: char) {
    let Some(pos) = self.cursor.cell else {
      return;
    };
    if !letter.is_alphanumeric() {
      return;
    }

    let letter = normalize_letter(letter);
    let auto_check = self.auto_check;
    let Some(Some(cell)) = self.grid.get_mut(pos) else {
      return;
    };
    cell.user = Some(letter);
    // A verdict from before auto-check was turned off would describe an old letter.
    cell.correct = auto_check.then_some(letter == cell.solution);

    self.advance();
    self.check_completion();
  }

  /// Erases the selected square and steps back one square within the word.
  pub fn backspace(&mut self) {
    let Some(pos) = self.cursor.cell else {
      return;
    };
    if let Some(Some(cell)) = self.grid.get_mut(pos) {
      cell.user = None;
      cell.correct = None;
    }
    self.retreat();
  }

  /// Selects a clue and puts the cursor on the first square of its word.
  pub fn select_clue(&mut self, id: ClueId) {
    let Some(entry) = self.clues.get(id) else {
      return;
    };
    self.cursor = Cursor {
      cell: Some(entry.start),
      direction: id.direction,
      clue: Some(id),
    };
  }

  /// Moves to the next (or previous) clue: Across clues by number, then Down clues by
  /// number, wrapping around at both ends.
  pub fn jump_clue(&mut self, previous: bool) {
    let Some(id) = self.cursor.clue else {
      return;
    };
    if let Some(next) = self.clues.neighbor_of(id, previous).map(ClueEntry::id) {
      self.select_clue(next);
    }
  }

  /// Erases every square and starts the timer again from zero.
  pub fn clear(&mut self) {
    for cell in self.grid.iter_mut().flatten() {
      cell.user = None;
      cell.correct = None;
    }
    self.completion = Completion::Playing;
    self.timer.restart();
  }

  /// Fills in the whole solution and ends the game.
  pub fn reveal(&mut self) {
    for cell in self.grid.iter_mut().flatten() {
      cell.user = Some(cell.solution);
      cell.correct = Some(true);
    }
    self.completion = Completion::Completed;
    self.timer.stop();
  }

  fn advance(&mut self) {
    let (Some(pos), Some(entry)) = (self.cursor.cell, self.selected_clue()) else {
      return;
    };
    let next = entry
      .position_of(pos)
      .and_then(|i| entry.cells.get(i + 1))
      .copied();
    match next {
      Some(next) => self.cursor.cell = Some(next),
      None => self.jump_clue(false),
    }
  }

  fn retreat(&mut self) {
    let (Some(pos), Some(entry)) = (self.cursor.cell, self.selected_clue()) else {
      return;
    };
    let previous = entry
      .position_of(pos)
      .and_then(|i| i.checked_sub(1))
      .map(|i| entry.cells[i]);
    if let Some(previous) = previous {
      self.cursor.cell = Some(previous);
    }
  }

  /// A filled grid only counts when every letter is right.
  fn check_completion(&mut self) {
    if self.is_completed() {
      return;
    }
    if self.grid.iter().flatten().all(PlayCell::is_solved) {
      self.completion = Completion::Completed;
      self.timer.stop();
      debug!("Solved '{}' in {}", self.document.title, format_time(self.elapsed()));
    }
  }

  /// Determines how a particular square should be styled.
  pub fn square_style(&self, pos: Pos) -> SquareStyle {
    if self.cursor.cell == Some(pos) {
      return SquareStyle::Cursor;
    }
    match self.selected_clue() {
      Some(entry) if entry.contains(pos) => SquareStyle::Word,
      _ => SquareStyle::Standard,
    }
  }

  /// Everything needed to paint the square at `pos`. Correctness is only shown while
  /// auto-check is on.
  pub fn cell_view(&self, pos: Pos) -> Option<CellView> {
    let view = match self.grid.get(pos)? {
      None => CellView {
        block: true,
        number: None,
        user_letter: None,
        status: CellStatus::Unknown,
        style: SquareStyle::Standard,
      },
      Some(cell) => CellView {
        block: false,
        number: self.document.number_at(pos),
        user_letter: cell.user,
        status: if self.auto_check {
          cell.correct.into()
        } else {
          CellStatus::Unknown
        },
        style: self.square_style(pos),
      },
    };
    Some(view)
  }

  /// The whole grid as render data, row by row.
  pub fn cell_views(&self) -> Vec<Vec<CellView>> {
    (0..self.grid.height())
      .map(|row| {
        (0..self.grid.width())
          .filter_map(|col| self.cell_view((row, col)))
          .collect()
      })
      .collect()
  }

  /// The clue to show above the grid.
  pub fn current_clue(&self) -> Option<&ClueEntry> {
    self.selected_clue()
  }

  /// Every clue, Across then Down, each by number, flagging the one the cursor is on.
  pub fn clue_list(&self) -> Vec<ClueListing> {
    self
      .clues
      .ordered()
      .into_iter()
      .map(|entry| ClueListing {
        id: entry.id(),
        direction: entry.direction,
        number: entry.number,
        text: entry.text.clone(),
        active: self.cursor.clue == Some(entry.id()),
      })
      .collect()
  }

  pub fn completion_message(&self) -> Option<String> {
    self.is_completed().then(|| {
      format!(
        "Congratulations! You solved the puzzle in {}",
        format_time(self.elapsed())
      )
    })
  }
}
