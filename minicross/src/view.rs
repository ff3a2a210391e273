//! The render model handed to a UI: plain data describing what to paint, serializable
//! so a web shell can consume it as JSON.

use crate::{ClueId, Direction};
use serde::Serialize;

/// Indicates how a particular square should look. For instance, [Standard](Self::Standard)
/// might map to white, [Cursor](Self::Cursor) to yellow, and [Word](Self::Word) to gray.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SquareStyle {
  /// Default styling
  Standard,
  /// The cursor is positioned on this square.
  Cursor,
  /// The cursor is not on this square, but the selected clue's word includes this square.
  Word,
}

/// What auto-check knows about a square.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
  Unknown,
  Correct,
  Incorrect,
}

impl From<Option<bool>> for CellStatus {
  fn from(value: Option<bool>) -> Self {
    match value {
      None => Self::Unknown,
      Some(true) => Self::Correct,
      Some(false) => Self::Incorrect,
    }
  }
}

/// Everything needed to paint one grid position.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CellView {
  pub block: bool,
  pub number: Option<u16>,
  pub user_letter: Option<char>,
  pub status: CellStatus,
  pub style: SquareStyle,
}

/// One line of the clue browser.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ClueListing {
  pub id: ClueId,
  pub direction: Direction,
  pub number: u16,
  pub text: String,
  /// Whether this is the clue the cursor is on.
  pub active: bool,
}

/// Formats seconds as `MM:SS`. Minutes keep counting past 99.
pub fn format_time(seconds: u64) -> String {
  format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_minutes_and_seconds() {
    assert_eq!(format_time(0), "00:00");
    assert_eq!(format_time(59), "00:59");
    assert_eq!(format_time(61), "01:01");
    assert_eq!(format_time(6000), "100:00");
  }

  #[test]
  fn serializes_for_the_web() {
    let view = CellView {
      block: false,
      number: Some(1),
      user_letter: Some('C'),
      status: CellStatus::Correct,
      style: SquareStyle::Cursor,
    };
    assert_eq!(
      serde_json::to_string(&view).unwrap(),
      r#"{"block":false,"number":1,"user_letter":"C","status":"correct","style":"cursor"}"#
    );
  }
}
