//! Checksum logic. See
//! <https://gist.github.com/sliminality/dab21fa834eae0a70193c7cd69c356d5#checksums>

use std::fmt::{self, Debug};

#[must_use]
pub(crate) fn checksum_region(base: &[u8], input_checksum: u16) -> u16 {
  let mut checksum = input_checksum;
  for &byte in base {
    if checksum & 0x0001_u16 != 0 {
      checksum = (checksum >> 1) + 0x8000
    } else {
      checksum >>= 1;
    }
    checksum = checksum.wrapping_add(byte as u16);
  }
  checksum
}

/// Metadata strings (title, author, copyright, notes) only count when non-empty, and
/// then with their NUL terminator. `text` excludes the terminator.
#[must_use]
pub(crate) fn checksum_text(text: &[u8], input_checksum: u16) -> u16 {
  if text.is_empty() {
    return input_checksum;
  }
  checksum_region(&[0], checksum_region(text, input_checksum))
}

/// Returned when decoding a `.puz` buffer succeeded, but a checksum stored in the
/// file didn't match the one computed from its contents. May indicate a corrupted
/// or hand-edited file.
#[derive(Eq, PartialEq, Clone)]
pub struct ChecksumMismatch {
  /// Which checksum disagreed.
  pub region: &'static str,
  pub expected: u16,
  pub actual: u16,
}

impl Debug for ChecksumMismatch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Mismatch on checksum {}: Expected {:#x} but got {:#x}",
      self.region, self.expected, self.actual
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn checksum_rotates_then_adds() {
    assert_eq!(checksum_region(&[], 0x1234), 0x1234);
    assert_eq!(checksum_region(&[1], 0), 1);
    // 1 is odd, so it rotates into the high bit before adding.
    assert_eq!(checksum_region(&[0], 1), 0x8000);
    assert_eq!(checksum_region(&[3, 3], 0), 0x8004);
  }

  #[test]
  fn text_includes_its_terminator_unless_empty() {
    assert_eq!(checksum_text(b"", 0x1234), 0x1234);
    assert_eq!(checksum_text(b"AB", 7), checksum_region(b"AB\0", 7));
  }
}
