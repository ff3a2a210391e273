//! Decoding of JSON puzzles. The shape is loosely modelled on ipuz: explicit dimensions,
//! a 2D `puzzle` array and a `clues` object per direction, with several tolerated
//! spellings for cells and clues.

use crate::grid::{Grid, Square, normalize_letter};
use crate::{Error, PuzzleDocument};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct PuzzleFile {
  dimensions: Option<Dimensions>,
  puzzle: Option<Vec<Vec<Value>>>,
  clues: Option<Map<String, Value>>,
  /// Kept loose: a malformed `metadata` block falls back to the top-level fields.
  metadata: Option<Value>,
  #[serde(flatten)]
  top_level: Metadata,
}

#[derive(Deserialize)]
struct Dimensions {
  width: i64,
  height: i64,
}

#[derive(Deserialize)]
struct Metadata {
  title: Option<Value>,
  author: Option<Value>,
  copyright: Option<Value>,
}

pub(crate) fn parse(text: &str) -> Result<PuzzleDocument, Error> {
  let file: PuzzleFile = serde_json::from_str(text)?;

  let (Some(dimensions), Some(puzzle), Some(clues)) = (file.dimensions, file.puzzle, file.clues)
  else {
    return Err(Error::malformed(
      "missing required fields (dimensions, puzzle, clues)",
    ));
  };

  let width = dimension(dimensions.width, "width")?;
  let height = dimension(dimensions.height, "height")?;

  let cells = Grid::from_fn(width, height, |(row, col)| {
    parse_cell(puzzle.get(row).and_then(|r| r.get(col)))
  });
  let solution = Grid::from_fn(width, height, |pos| cells.get(pos).map_or(Square::Block, |c| c.0));

  let mut cell_numbers: Vec<u16> = cells.iter().map(|&(_, number)| number).collect();
  if cell_numbers.iter().all(|&n| n == 0) {
    cell_numbers = solution.cell_numbers();
  }

  let mut across_clues = BTreeMap::new();
  let mut down_clues = BTreeMap::new();
  collect_clues(direction_entry(&clues, "Across", "across"), &mut across_clues);
  collect_clues(direction_entry(&clues, "Down", "down"), &mut down_clues);

  let nested = file.metadata.as_ref();
  let top = &file.top_level;

  PuzzleDocument::new(
    solution,
    cell_numbers,
    across_clues,
    down_clues,
    metadata_text(nested, "title", top.title.as_ref()),
    metadata_text(nested, "author", top.author.as_ref()),
    metadata_text(nested, "copyright", top.copyright.as_ref()),
  )
}

/// `metadata.<key>`, then the top-level field. Empty strings and values that aren't
/// text or numbers are passed over.
fn metadata_text(nested: Option<&Value>, key: &str, top: Option<&Value>) -> String {
  let text = |value: Option<&Value>| match value? {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  };
  text(nested.and_then(|m| m.get(key)))
    .or_else(|| text(top))
    .unwrap_or_default()
}

/// Grids are capped at the size a `.puz` header can express.
const MAX_DIMENSION: usize = u8::MAX as usize;

fn dimension(value: i64, name: &str) -> Result<usize, Error> {
  match usize::try_from(value) {
    Ok(v) if (1..=MAX_DIMENSION).contains(&v) => Ok(v),
    _ => Err(Error::malformed(format!(
      "{name} must be between 1 and {MAX_DIMENSION}, got {value}"
    ))),
  }
}

fn is_block_marker(s: &str) -> bool {
  matches!(s, "" | "." | "#")
}

/// Reads one entry of the `puzzle` array as a solution square and its clue number.
fn parse_cell(cell: Option<&Value>) -> (Square, u16) {
  let (letter, number) = match cell {
    Some(Value::String(s)) => (Some(s.as_str()), 0),
    Some(Value::Object(obj)) => {
      let letter = ["cell", "answer"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty());
      let number = ["number", "clueNumber"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(as_number))
        .find(|&n| n > 0)
        .unwrap_or(0);
      (letter, number)
    }
    // null, missing positions and any other shape are blocks
    _ => (None, 0),
  };

  match letter.filter(|s| !is_block_marker(s)).and_then(|s| s.chars().next()) {
    Some(c) => (Square::Letter(normalize_letter(c)), number),
    None => (Square::Block, 0),
  }
}

/// `clues.Across`, falling back to `clues.across`.
fn direction_entry<'a>(clues: &'a Map<String, Value>, upper: &str, lower: &str) -> Option<&'a Value> {
  clues
    .get(upper)
    .filter(|v| !v.is_null())
    .or_else(|| clues.get(lower))
}

fn collect_clues(list: Option<&Value>, into: &mut BTreeMap<u16, String>) {
  match list {
    Some(Value::Array(items)) => {
      for (number, text) in items.iter().filter_map(clue_from_item) {
        into.insert(number, text);
      }
    }
    Some(Value::Object(map)) => {
      for (key, value) in map {
        if let (Some(number), Some(text)) = (leading_number(key), value.as_str()) {
          if number > 0 && !text.is_empty() {
            into.insert(number, text.to_string());
          }
        }
      }
    }
    _ => {}
  }
}

/// One element of a clue array: `"N. text"`, `{"number": N, "clue": text}` or `[N, text]`.
fn clue_from_item(item: &Value) -> Option<(u16, String)> {
  let (number, text) = match item {
    Value::String(s) => split_numbered(s)?,
    Value::Object(obj) => (as_number(obj.get("number")?)?, obj.get("clue")?.as_str()?),
    Value::Array(pair) => (as_number(pair.first()?)?, pair.get(1)?.as_str()?),
    _ => return None,
  };
  (number > 0 && !text.is_empty()).then(|| (number, text.to_string()))
}

/// Splits `"12. Some clue"` into `(12, "Some clue")`.
fn split_numbered(s: &str) -> Option<(u16, &str)> {
  let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
  let number = s[..digits].parse().ok()?;
  let text = s[digits..].strip_prefix('.')?.trim_start();
  Some((number, text))
}

/// The digits at the start of `s`, as a number.
fn leading_number(s: &str) -> Option<u16> {
  let s = s.trim_start();
  let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
  s[..digits].parse().ok()
}

/// A clue number, written as an integer, a whole float like `3.0`, or a string of either.
fn as_number(value: &Value) -> Option<u16> {
  let number = match value {
    Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole)),
    Value::String(s) => {
      let s = s.trim();
      s.parse().ok().or_else(|| s.parse().ok().and_then(whole))
    }
    _ => None,
  }?;
  u16::try_from(number).ok()
}

fn whole(f: f64) -> Option<u64> {
  (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}
