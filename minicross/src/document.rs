use crate::checksum::ChecksumMismatch;
use crate::grid::{Grid, Square};
use crate::{Direction, Error, Pos, ipuz, puz};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const DEFAULT_TITLE: &str = "Crossword Puzzle";
const DEFAULT_AUTHOR: &str = "Unknown";

/// The decoded contents of a puzzle file. Immutable once loaded; the player's
/// progress lives in [PlayState](crate::PlayState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDocument {
  pub width: usize,
  pub height: usize,
  /// The solution, one [Square] per position.
  pub solution: Grid<Square>,
  /// Row-major clue numbers, with 0 for unnumbered cells.
  pub cell_numbers: Vec<u16>,
  pub across_clues: BTreeMap<u16, String>,
  pub down_clues: BTreeMap<u16, String>,
  pub title: String,
  pub author: String,
  pub copyright: String,
}

impl PuzzleDocument {
  /// Assembles a document, applying metadata defaults. Fails if neither direction
  /// has a single clue.
  pub(crate) fn new(
    solution: Grid<Square>,
    cell_numbers: Vec<u16>,
    across_clues: BTreeMap<u16, String>,
    down_clues: BTreeMap<u16, String>,
    title: String,
    author: String,
    copyright: String,
  ) -> Result<Self, Error> {
    if across_clues.is_empty() && down_clues.is_empty() {
      return Err(Error::malformed("no valid clues found in the puzzle"));
    }
    if cell_numbers.len() != solution.width() * solution.height() {
      return Err(Error::malformed("cell numbers do not match the grid size"));
    }

    Ok(Self {
      width: solution.width(),
      height: solution.height(),
      solution,
      cell_numbers,
      across_clues,
      down_clues,
      title: or_default(title, DEFAULT_TITLE),
      author: or_default(author, DEFAULT_AUTHOR),
      copyright,
    })
  }

  /// The clue number printed in the given cell, if any.
  pub fn number_at(&self, (row, col): Pos) -> Option<u16> {
    if row >= self.height || col >= self.width {
      return None;
    }
    match self.cell_numbers[row * self.width + col] {
      0 => None,
      n => Some(n),
    }
  }

  /// The clues for one direction, ordered by number.
  pub fn clues(&self, direction: Direction) -> &BTreeMap<u16, String> {
    match direction {
      Direction::Across => &self.across_clues,
      Direction::Down => &self.down_clues,
    }
  }
}

fn or_default(value: String, default: &str) -> String {
  if value.is_empty() {
    default.to_string()
  } else {
    value
  }
}

/// Decodes a puzzle from raw bytes. Checksum mismatches in a `.puz` file are logged
/// but do not fail the load.
pub fn decode(raw: &[u8]) -> Result<PuzzleDocument, Error> {
  let (document, checksum_mismatches) = decode_checked(raw)?;
  for mismatch in &checksum_mismatches {
    warn!("{:?}", mismatch);
  }
  Ok(document)
}

/// Like [decode], but returns the checksum mismatches instead of logging them. Input
/// whose first non-whitespace byte is `{` is treated as JSON, which has no checksums;
/// anything else as a binary `.puz` file.
pub fn decode_checked(raw: &[u8]) -> Result<(PuzzleDocument, Vec<ChecksumMismatch>), Error> {
  let looks_like_json = raw
    .iter()
    .find(|b| !b.is_ascii_whitespace())
    .is_some_and(|&b| b == b'{');

  if looks_like_json {
    debug!("Decoding {} bytes as JSON", raw.len());
    let text = std::str::from_utf8(raw).map_err(|e| Error::Encoding(e.to_string()))?;
    return Ok((decode_json(text)?, vec![]));
  }

  debug!("Decoding {} bytes as .puz", raw.len());
  decode_puz_checked(raw)
}

/// Decodes a binary `.puz` buffer, ignoring checksums.
pub fn decode_puz(raw: &[u8]) -> Result<PuzzleDocument, Error> {
  decode_puz_checked(raw).map(|(document, _)| document)
}

/// Decodes a binary `.puz` buffer and reports any checksum that didn't match.
pub fn decode_puz_checked(raw: &[u8]) -> Result<(PuzzleDocument, Vec<ChecksumMismatch>), Error> {
  puz::parse(raw)
}

/// Decodes a JSON puzzle document.
pub fn decode_json(text: &str) -> Result<PuzzleDocument, Error> {
  ipuz::parse(text)
}

/// Reads and decodes the puzzle file at `path`.
pub fn load_file(path: impl AsRef<Path>) -> Result<PuzzleDocument, Error> {
  let data = fs::read(path)?;
  decode(&data)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::build_puz;
  use std::io::Write;

  const JSON: &str = r#"{
    "dimensions": {"width": 2, "height": 2},
    "puzzle": [["A", "B"], ["C", "D"]],
    "clues": {"across": ["1. Top", "3. Bottom"], "down": ["1. Left", "2. Right"]}
  }"#;

  #[test]
  fn decode_sniffs_json() {
    let doc = decode(format!("\n  {JSON}").as_bytes()).unwrap();
    assert_eq!(doc.across_clues[&3], "Bottom");
    assert_eq!(doc.title, "Crossword Puzzle");
    assert_eq!(doc.author, "Unknown");
  }

  #[test]
  fn decode_sniffs_puz() {
    let data = build_puz(2, 2, "ABCD", ["T", "", ""], &["a1", "a2", "d1", "d2"]);
    let doc = decode(&data).unwrap();
    assert_eq!(doc.title, "T");
    assert_eq!(doc.author, "Unknown");
    assert_eq!(doc.number_at((1, 1)), None);
    assert_eq!(doc.number_at((1, 0)), Some(3));
    assert_eq!(doc.number_at((5, 5)), None);
  }

  #[test]
  fn decode_checked_reports_mismatches_for_binary_input() {
    let mut data = build_puz(2, 2, "ABCD", ["T", "", ""], &["a1", "a2", "d1", "d2"]);
    data[0x0E] ^= 0xFF;
    let (doc, mismatches) = decode_checked(&data).unwrap();
    assert_eq!(doc.title, "T");
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].region, "CIB");

    // The mismatch is only a diagnostic.
    assert_eq!(decode(&data).unwrap(), doc);

    let (doc, mismatches) = decode_checked(JSON.as_bytes()).unwrap();
    assert_eq!(doc.across_clues[&1], "Top");
    assert!(mismatches.is_empty());
  }

  #[test]
  fn load_file_reads_from_disk() {
    let data = build_puz(2, 2, "ABCD", ["File", "Me", "(c)"], &["a1", "a2", "d1", "d2"]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();

    let doc = load_file(file.path()).unwrap();
    assert_eq!(doc.title, "File");
    assert_eq!(doc.copyright, "(c)");
  }

  #[test]
  fn load_file_reports_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_file(dir.path().join("missing.puz")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!err.is_malformed());
  }

  #[test]
  fn empty_input_is_malformed() {
    assert!(decode(b"").unwrap_err().is_malformed());
  }
}
