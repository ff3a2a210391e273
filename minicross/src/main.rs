use clap::Parser;
use minicross::{ChecksumMismatch, Error, PuzzleDocument, build_index, decode_checked};
use std::fs;
use std::path::{Path, PathBuf};

/// A simple CLI for testing puzzle decoding
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
  /// A `.puz` or JSON puzzle file, or a directory of them
  path: PathBuf,
}

/// Decodes by content rather than extension, so a binary file under any name still
/// reports its checksums.
fn decode_file(path: &Path) -> Result<(PuzzleDocument, Vec<ChecksumMismatch>), Error> {
  let data: Vec<u8> = fs::read(path)?;
  decode_checked(&data)
}

fn report(path: &Path, doc: &PuzzleDocument, checksum_mismatches: &[ChecksumMismatch]) {
  let clues = build_index(doc);
  println!(
    "Parsed '{}' by {} ({}x{}, {} across / {} down, {} playable) from {}",
    doc.title,
    doc.author,
    doc.width,
    doc.height,
    doc.across_clues.len(),
    doc.down_clues.len(),
    clues.len(),
    path.display()
  );
  if !checksum_mismatches.is_empty() {
    println!("  checksum mismatches: {:?}", checksum_mismatches);
  }
}

fn main() -> Result<(), Error> {
  let args = Args::parse();

  if fs::metadata(&args.path)?.is_dir() {
    let mut success = 0;
    let mut failure = 0;

    for entry in fs::read_dir(&args.path)? {
      let path = entry?.path();
      match decode_file(&path) {
        Ok((doc, checksum_mismatches)) => {
          report(&path, &doc, &checksum_mismatches);
          success += 1;
        }
        Err(e) => {
          println!("Failed with {} from {}", e, path.display());
          failure += 1;
        }
      }
    }
    println!("{success} succeeded, {failure} failed");
  } else {
    match decode_file(&args.path) {
      Ok((doc, checksum_mismatches)) => {
        report(&args.path, &doc, &checksum_mismatches);
        println!("{}", doc.solution);
      }
      Err(e) => {
        println!("Failed with: {}", e);
      }
    }
  }

  Ok(())
}
