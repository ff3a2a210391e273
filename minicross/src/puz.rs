use crate::checksum::{ChecksumMismatch, checksum_region, checksum_text};
use crate::grid::{Grid, Square, WordStart};
use crate::{Error, PuzzleDocument};
use log::debug;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::ops::Range;

use encoding::DecoderTrap::Strict;
use encoding::Encoding;
use encoding::all::ISO_8859_1;

// There is no official spec for the puz file format but the layout here follows
// <https://gist.github.com/sliminality/dab21fa834eae0a70193c7cd69c356d5>.
const HEADER_LEN: usize = 0x34;
const FILE_CHECKSUM_OFFSET: usize = 0x00;
const CIB_CHECKSUM_OFFSET: usize = 0x0E;
const WIDTH_OFFSET: usize = 0x2C;
const HEIGHT_OFFSET: usize = 0x2D;
const CLUE_COUNT_OFFSET: usize = 0x2E;
const CIB_REGION: Range<usize> = 0x2C..0x34;

/// Decodes a binary `.puz` buffer.
///
/// The header is skipped apart from the dimensions, the informational clue count and
/// the stored checksums. The solution grid and the player-state grid follow, then the
/// title, author and copyright, then a flat stream of clue strings running to the end
/// of the buffer.
pub(crate) fn parse(data: &[u8]) -> Result<(PuzzleDocument, Vec<ChecksumMismatch>), Error> {
  if data.len() < HEADER_LEN {
    return Err(Error::malformed(format!(
      "expected a {HEADER_LEN}-byte header but the file is only {} bytes",
      data.len()
    )));
  }

  let mut scanner = Scanner::new(data);

  let width = scanner.byte_at(WIDTH_OFFSET)? as usize;
  let height = scanner.byte_at(HEIGHT_OFFSET)? as usize;
  if width == 0 || height == 0 {
    return Err(Error::malformed(format!(
      "grid dimensions must be positive, got {width}x{height}"
    )));
  }
  let num_clues = scanner.short_at(CLUE_COUNT_OFFSET)?;

  let mut checksum_mismatches = vec![];
  let cib_expected = checksum_region(&data[CIB_REGION], 0);
  let cib_actual = scanner.short_at(CIB_CHECKSUM_OFFSET)?;
  if cib_actual != cib_expected {
    checksum_mismatches.push(ChecksumMismatch {
      region: "CIB",
      expected: cib_expected,
      actual: cib_actual,
    });
  }

  scanner.seek(HEADER_LEN);
  let solution_bytes = scanner.take_n_bytes(width * height)?;
  // Player state grid; play always starts from an empty grid.
  let state_bytes = scanner.take_n_bytes(width * height)?;

  let meta = [
    scanner.take_nul_terminated(),
    scanner.take_nul_terminated(),
    scanner.take_nul_terminated(),
  ];
  let mut strings = vec![];
  while !scanner.is_at_end() {
    strings.push(scanner.take_nul_terminated());
  }

  let file_expected = file_checksum(
    cib_expected,
    solution_bytes,
    state_bytes,
    &meta,
    &strings,
    num_clues,
  );
  let file_actual = scanner.short_at(FILE_CHECKSUM_OFFSET)?;
  if file_actual != file_expected {
    checksum_mismatches.push(ChecksumMismatch {
      region: "file",
      expected: file_expected,
      actual: file_actual,
    });
  }

  let [title, author, copyright] = meta;
  let title = decode_str(title)?;
  let author = decode_str(author)?;
  let copyright = decode_str(copyright)?;

  let clues = strings
    .iter()
    .filter(|s| !s.is_empty())
    .map(|s| decode_str(s))
    .collect::<Result<Vec<_>, _>>()?;
  if clues.len() != num_clues as usize {
    debug!(
      "Header declares {} clues but the file contains {} clue strings",
      num_clues,
      clues.len()
    );
  }

  let squares = solution_bytes
    .iter()
    .map(|&b| Square::from_puz_byte(b))
    .collect();
  let solution = Grid::from_cells(width, height, squares)
    .ok_or_else(|| Error::malformed("solution grid does not match the dimensions"))?;

  let starts = solution.word_starts();
  let (across_clues, down_clues) = allocate_clues(&starts, clues);
  let cell_numbers = solution.cell_numbers();

  let document = PuzzleDocument::new(
    solution,
    cell_numbers,
    across_clues,
    down_clues,
    title,
    author,
    copyright,
  )?;
  Ok((document, checksum_mismatches))
}

/// The whole-file checksum: the CIB checksum carried through both grids, the metadata
/// strings, the first `num_clues` clue strings and the notes string that follows them.
pub(crate) fn file_checksum(
  cib: u16,
  solution: &[u8],
  state: &[u8],
  meta: &[&[u8]],
  strings: &[&[u8]],
  num_clues: u16,
) -> u16 {
  let num_clues = num_clues as usize;
  let mut c = checksum_region(solution, cib);
  c = checksum_region(state, c);
  for text in meta {
    c = checksum_text(text, c);
  }
  for clue in strings.iter().take(num_clues) {
    c = checksum_region(clue, c);
  }
  if let Some(notes) = strings.get(num_clues) {
    c = checksum_text(notes, c);
  }
  c
}

/// Turn an ISO-8859-1-encoded string (without its NUL) into a standard String.
fn decode_str(bytes: &[u8]) -> Result<String, Error> {
  ISO_8859_1
    .decode(bytes, Strict)
    .map_err(|e| Error::Encoding(format!("Failed decoding {:?} as ISO-8859-1: {}", bytes, e)))
}

/// Pairs the flat, file-ordered clue list with the numbered word starts.
///
/// At a cell that starts both an across and a down word, the first of the two clues
/// goes to Down and the second to Across. A cell starting a single word takes one clue.
/// Assignment stops when the clue list runs out.
fn allocate_clues(
  starts: &[WordStart],
  clue_list: Vec<String>,
) -> (BTreeMap<u16, String>, BTreeMap<u16, String>) {
  let mut across = BTreeMap::new();
  let mut down = BTreeMap::new();

  let mut clue_iter = clue_list.into_iter();

  for start in starts {
    if clue_iter.len() == 0 {
      break;
    }

    if start.across && start.down && clue_iter.len() >= 2 {
      if let (Some(first), Some(second)) = (clue_iter.next(), clue_iter.next()) {
        down.insert(start.number, first);
        across.insert(start.number, second);
      }
      continue;
    }

    if start.across {
      if let Some(clue) = clue_iter.next() {
        across.insert(start.number, clue);
      }
    }
    if start.down {
      if let Some(clue) = clue_iter.next() {
        down.insert(start.number, clue);
      }
    }
  }

  (across, down)
}

// Loosely based on
// https://depth-first.com/articles/2021/12/16/a-beginners-guide-to-parsing-in-rust/
struct Scanner<'a> {
  cursor: usize,
  data: &'a [u8],
}

impl Debug for Scanner<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Scanner")
      .field("cursor", &self.cursor)
      .finish()
  }
}

impl<'a> Scanner<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { cursor: 0, data }
  }

  fn seek(&mut self, offset: usize) {
    self.cursor = offset.min(self.data.len());
  }

  fn is_at_end(&self) -> bool {
    self.cursor >= self.data.len()
  }

  /// The byte at a fixed offset, without moving the cursor.
  fn byte_at(&self, offset: usize) -> Result<u8, Error> {
    self
      .data
      .get(offset)
      .copied()
      .ok_or(Error::UnexpectedEof(offset))
  }

  /// The two bytes at a fixed offset as a `u16`, interpreted as little-endian.
  fn short_at(&self, offset: usize) -> Result<u16, Error> {
    let lo = self.byte_at(offset)?;
    let hi = self.byte_at(offset + 1)?;
    Ok(u16::from_le_bytes([lo, hi]))
  }

  /// Take the next `n` bytes.
  fn take_n_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
    if self.cursor + n > self.data.len() {
      return Err(Error::UnexpectedEof(self.data.len()));
    }

    let data: &'a [u8] = self.data;
    let taken = &data[self.cursor..self.cursor + n];
    self.cursor += n;
    Ok(taken)
  }

  /// Takes the bytes up to the next NUL, or to the end of the data if there is none,
  /// and steps over the NUL. The returned slice excludes the terminator.
  fn take_nul_terminated(&mut self) -> &'a [u8] {
    let data: &'a [u8] = self.data;
    let rest = &data[self.cursor..];
    let len = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    self.cursor = (self.cursor + len + 1).min(self.data.len());
    &rest[..len]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{build_puz, set_cib_checksum};

  #[test]
  fn dual_start_takes_down_clue_first() {
    let data = build_puz(2, 2, "ABCD", ["", "", ""], &["CLUE_A", "CLUE_B"]);
    let (doc, mismatches) = parse(&data).unwrap();

    assert!(mismatches.is_empty());
    assert_eq!(doc.down_clues[&1], "CLUE_A");
    assert_eq!(doc.across_clues[&1], "CLUE_B");
    // The stream ran out before 2-down and 3-across.
    assert_eq!(doc.down_clues.len(), 1);
    assert_eq!(doc.across_clues.len(), 1);
  }

  #[test]
  fn clues_follow_numbering_order() {
    // AB.
    // C.D
    // EFG
    let data = build_puz(
      3,
      3,
      "AB.C.DEFG",
      ["Title", "Author", "Copyright"],
      &["1d", "1a", "2d", "3a"],
    );
    let (doc, _) = parse(&data).unwrap();

    assert_eq!(doc.cell_numbers, vec![1, 0, 0, 0, 0, 2, 3, 0, 0]);
    assert_eq!(doc.down_clues[&1], "1d");
    assert_eq!(doc.across_clues[&1], "1a");
    assert_eq!(doc.down_clues[&2], "2d");
    assert_eq!(doc.across_clues[&3], "3a");
    assert_eq!(doc.title, "Title");
    assert_eq!(doc.author, "Author");
    assert_eq!(doc.copyright, "Copyright");
  }

  #[test]
  fn dual_start_with_one_clue_left_takes_across() {
    let data = build_puz(2, 2, "ABCD", ["", "", ""], &["ONLY"]);
    let (doc, _) = parse(&data).unwrap();

    assert_eq!(doc.across_clues[&1], "ONLY");
    assert!(doc.down_clues.is_empty());
  }

  #[test]
  fn empty_clue_strings_are_skipped() {
    let data = build_puz(2, 2, "ABCD", ["", "", ""], &["", "d1", "", "a1", "d2", "a3"]);
    let (doc, _) = parse(&data).unwrap();

    assert_eq!(doc.down_clues[&1], "d1");
    assert_eq!(doc.across_clues[&1], "a1");
    assert_eq!(doc.down_clues[&2], "d2");
    assert_eq!(doc.across_clues[&3], "a3");
  }

  #[test]
  fn strings_are_latin_1() {
    let mut data = build_puz(2, 2, "ABCD", ["Caf\u{e9}", "", ""], &["d", "a"]);
    // The builder writes code points below 0x100 as single bytes.
    assert!(data.contains(&0xE9));
    let (doc, _) = parse(&data).unwrap();
    assert_eq!(doc.title, "Café");

    // A trailing string without a NUL still counts.
    data.extend_from_slice(b"tail");
    let (doc, _) = parse(&data).unwrap();
    assert_eq!(doc.down_clues[&2], "tail");
  }

  #[test]
  fn rejects_short_or_empty_grids() {
    let err = parse(&[0; 10]).unwrap_err();
    assert!(matches!(err, Error::MalformedPuzzle(_)));

    let mut data = build_puz(2, 2, "ABCD", ["", "", ""], &["d", "a"]);
    data[WIDTH_OFFSET] = 0;
    assert!(matches!(parse(&data).unwrap_err(), Error::MalformedPuzzle(_)));

    let data = build_puz(2, 2, "ABCD", ["", "", ""], &["d", "a"]);
    assert!(matches!(
      parse(&data[..HEADER_LEN + 6]).unwrap_err(),
      Error::UnexpectedEof(_)
    ));
  }

  #[test]
  fn rejects_puzzles_without_clues() {
    let data = build_puz(2, 2, "ABCD", ["T", "A", "C"], &[]);
    assert!(matches!(parse(&data).unwrap_err(), Error::MalformedPuzzle(_)));
  }

  #[test]
  fn reports_cib_checksum_mismatch() {
    let mut data = build_puz(2, 2, "ABCD", ["", "", ""], &["d", "a"]);
    let good = u16::from_le_bytes([data[CIB_CHECKSUM_OFFSET], data[CIB_CHECKSUM_OFFSET + 1]]);
    data[CIB_CHECKSUM_OFFSET] ^= 0xFF;

    let (_, mismatches) = parse(&data).unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].region, "CIB");
    assert_eq!(mismatches[0].expected, good);

    set_cib_checksum(&mut data);
    assert!(parse(&data).unwrap().1.is_empty());
  }

  #[test]
  fn reports_file_checksum_mismatch() {
    let mut data = build_puz(2, 2, "ABCD", ["T", "", ""], &["d", "a"]);
    assert!(parse(&data).unwrap().1.is_empty());

    // Editing a clue invalidates the whole-file checksum but not the header's.
    let last = data.len() - 2;
    data[last] = b'z';
    let (doc, mismatches) = parse(&data).unwrap();
    assert_eq!(doc.across_clues[&1], "z");
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].region, "file");
  }
}
