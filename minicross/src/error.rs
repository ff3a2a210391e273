use thiserror::Error;

/// The errors that may be produced while loading a puzzle.
#[derive(Debug, Error)]
pub enum Error {
  /// Required structure is missing, the dimensions are not positive, or no clue
  /// could be extracted in either direction.
  #[error("malformed puzzle: {0}")]
  MalformedPuzzle(String),

  /// Unexpectedly reached the end of a `.puz` buffer at the given byte index.
  #[error("unexpected end of puzzle data at byte {0:#x}")]
  UnexpectedEof(usize),

  /// A string in the file could not be decoded as ISO-8859-1.
  #[error("text decoding failed: {0}")]
  Encoding(String),

  /// The input looked like JSON but could not be parsed.
  #[error("invalid JSON: {0}")]
  Json(#[from] serde_json::Error),

  /// An [I/O error](std::io::Error) occurred while reading a puzzle file.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn malformed(msg: impl Into<String>) -> Self {
    Self::MalformedPuzzle(msg.into())
  }

  /// Whether this error means the puzzle data itself is unusable, as opposed to
  /// a failure to read it.
  pub fn is_malformed(&self) -> bool {
    matches!(
      self,
      Self::MalformedPuzzle(_) | Self::UnexpectedEof(_) | Self::Encoding(_) | Self::Json(_)
    )
  }
}
