use crate::Direction::{self, Across, Down};
use crate::grid::Step;
use crate::{Pos, PuzzleDocument};
use log::debug;
use serde::Serialize;
use std::fmt::{self, Display};

/// Identifies a clue, e.g. 12 Down. Displays as `12-down`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub struct ClueId {
  pub number: u16,
  pub direction: Direction,
}

impl ClueId {
  pub fn new(number: u16, direction: Direction) -> Self {
    Self { number, direction }
  }

  /// Sort key for the play order: all Across clues, then all Down clues, each by number.
  fn play_order(&self) -> (Direction, u16) {
    (self.direction, self.number)
  }
}

impl Display for ClueId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.number, self.direction)
  }
}

/// A clue together with the cells of its answer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ClueEntry {
  pub number: u16,
  pub direction: Direction,
  pub text: String,
  pub start: Pos,
  pub len: usize,
  /// The answer's cells, in reading order from `start`.
  pub cells: Vec<Pos>,
}

impl ClueEntry {
  pub fn id(&self) -> ClueId {
    ClueId::new(self.number, self.direction)
  }

  pub fn contains(&self, pos: Pos) -> bool {
    self.cells.contains(&pos)
  }

  /// Where `pos` falls within this word.
  pub fn position_of(&self, pos: Pos) -> Option<usize> {
    self.cells.iter().position(|&p| p == pos)
  }
}

/// Every playable clue of a puzzle, in insertion order (Across by number, then Down).
#[derive(Debug, Clone, Default)]
pub struct ClueMap {
  entries: Vec<ClueEntry>,
}

impl ClueMap {
  pub fn get(&self, id: ClueId) -> Option<&ClueEntry> {
    self.entries.iter().find(|e| e.id() == id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &ClueEntry> {
    self.entries.iter()
  }

  /// The clue to start on: 1 Across if it exists, otherwise the first entry.
  pub fn initial(&self) -> Option<&ClueEntry> {
    self
      .get(ClueId::new(1, Across))
      .or_else(|| self.entries.first())
  }

  /// The entry in `direction` whose word contains `pos`.
  ///
  /// This is the only place a cell is mapped back to its clue, so every cursor change
  /// resolves clues the same way.
  pub fn resolve(&self, pos: Pos, direction: Direction) -> Option<&ClueEntry> {
    self
      .entries
      .iter()
      .find(|e| e.direction == direction && e.contains(pos))
  }

  /// All entries in play order: Across before Down, then by number.
  pub fn ordered(&self) -> Vec<&ClueEntry> {
    let mut ordered: Vec<&ClueEntry> = self.entries.iter().collect();
    ordered.sort_by_key(|e| e.id().play_order());
    ordered
  }

  /// The entry one step after (or before) `id` in play order, wrapping around at the ends.
  pub fn neighbor_of(&self, id: ClueId, previous: bool) -> Option<&ClueEntry> {
    let ordered = self.ordered();
    let index = ordered.iter().position(|e| e.id() == id)?;
    let next = if previous {
      index.checked_sub(1).unwrap_or(ordered.len() - 1)
    } else if index + 1 < ordered.len() {
      index + 1
    } else {
      0
    };
    ordered.get(next).copied()
  }

  fn insert(&mut self, entry: ClueEntry) {
    self.entries.push(entry);
  }
}

/// Builds the [ClueMap] for a document: each clue's number is located in the grid and
/// its word is read rightward (Across) or downward (Down) until a block or the edge.
///
/// Clues whose number is missing from the grid, or whose word would be a single
/// letter, are left out.
pub fn build_index(doc: &PuzzleDocument) -> ClueMap {
  let mut map = ClueMap::default();

  for direction in [Across, Down] {
    for (&number, text) in doc.clues(direction) {
      let Some(start) = doc.solution.positions().find(|&p| doc.number_at(p) == Some(number)) else {
        debug!("No cell is numbered {}; dropping {}", number, ClueId::new(number, direction));
        continue;
      };

      let mut cells = vec![start];
      let step = Step::forward(direction);
      let mut pos = start;
      while let Some(next) = doc.solution.neighbor(pos, step) {
        if doc.solution.is_block(next) {
          break;
        }
        cells.push(next);
        pos = next;
      }

      if cells.len() < 2 {
        debug!("{} at {:?} spans a single cell; dropping it", ClueId::new(number, direction), start);
        continue;
      }

      map.insert(ClueEntry {
        number,
        direction,
        text: text.clone(),
        start,
        len: cells.len(),
        cells,
      });
    }
  }

  map
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::decode_json;

  fn entry(number: u16, direction: Direction) -> ClueEntry {
    ClueEntry {
      number,
      direction,
      text: String::new(),
      start: (0, 0),
      len: 2,
      cells: vec![(0, 0), (0, 1)],
    }
  }

  #[test]
  fn open_grid_has_full_length_words() {
    let doc = decode_json(
      r#"{
        "dimensions": {"width": 3, "height": 3},
        "puzzle": [["C", "A", "T"], ["A", "R", "E"], ["T", "E", "N"]],
        "clues": {"across": ["1. Feline"], "down": ["1. Number word"]}
      }"#,
    )
    .unwrap();
    assert_eq!(doc.cell_numbers[0], 1);

    let map = build_index(&doc);
    assert_eq!(map.len(), 2);

    let across = map.get(ClueId::new(1, Across)).unwrap();
    assert_eq!(across.cells, vec![(0, 0), (0, 1), (0, 2)]);
    assert_eq!(across.len, 3);
    assert_eq!(across.text, "Feline");

    let down = map.get(ClueId::new(1, Down)).unwrap();
    assert_eq!(down.cells, vec![(0, 0), (1, 0), (2, 0)]);
    assert_eq!(down.start, (0, 0));
  }

  #[test]
  fn words_stop_at_blocks_and_singletons_are_dropped() {
    // AB.
    // .CD
    let doc = decode_json(
      r#"{
        "dimensions": {"width": 3, "height": 2},
        "puzzle": [
          [{"cell": "A", "number": 1}, "B", "."],
          [".", {"cell": "C", "number": 2}, {"cell": "D", "number": 3}]
        ],
        "clues": {
          "across": ["1. AB", "2. CD", "3. Single", "9. Nowhere"],
          "down": ["2. Also single"]
        }
      }"#,
    )
    .unwrap();

    let map = build_index(&doc);
    let ids: Vec<String> = map.iter().map(|e| e.id().to_string()).collect();
    assert_eq!(ids, vec!["1-across", "2-across"]);
    assert_eq!(map.get(ClueId::new(2, Across)).unwrap().cells, vec![(1, 1), (1, 2)]);
  }

  #[test]
  fn initial_prefers_one_across() {
    let map = ClueMap {
      entries: vec![entry(1, Down), entry(1, Across)],
    };
    assert_eq!(map.initial().unwrap().id(), ClueId::new(1, Across));

    let map = ClueMap {
      entries: vec![entry(3, Down), entry(2, Across)],
    };
    assert_eq!(map.initial().unwrap().id(), ClueId::new(3, Down));

    assert!(ClueMap::default().initial().is_none());
  }

  #[test]
  fn play_order_wraps_around() {
    let map = ClueMap {
      entries: vec![entry(2, Down), entry(5, Across), entry(1, Across)],
    };

    let order: Vec<String> = map.ordered().iter().map(|e| e.id().to_string()).collect();
    assert_eq!(order, vec!["1-across", "5-across", "2-down"]);

    let down_2 = ClueId::new(2, Down);
    assert_eq!(map.neighbor_of(down_2, false).unwrap().id(), ClueId::new(1, Across));
    assert_eq!(map.neighbor_of(down_2, true).unwrap().id(), ClueId::new(5, Across));
    assert_eq!(
      map.neighbor_of(ClueId::new(1, Across), true).unwrap().id(),
      down_2
    );
    assert!(map.neighbor_of(ClueId::new(9, Down), false).is_none());
  }

  #[test]
  fn resolve_respects_direction() {
    let map = ClueMap {
      entries: vec![entry(1, Across)],
    };
    assert_eq!(map.resolve((0, 1), Across).unwrap().number, 1);
    assert!(map.resolve((0, 1), Down).is_none());
    assert!(map.resolve((1, 1), Across).is_none());
  }
}
