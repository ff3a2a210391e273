//! Builders for synthetic puzzle files used across the unit tests.

use crate::checksum::checksum_region;
use crate::puz::file_checksum;

fn latin_1(s: &str) -> impl Iterator<Item = u8> + '_ {
  s.chars().map(|c| c as u32 as u8)
}

/// Writes a correct CIB checksum for the header in `data`.
pub(crate) fn set_cib_checksum(data: &mut [u8]) {
  let cib = checksum_region(&data[0x2C..0x34], 0);
  data[0x0E..0x10].copy_from_slice(&cib.to_le_bytes());
}

/// Builds a `.puz` file. `solution` is row-major with `.` for blocks; `meta` is
/// title, author and copyright.
pub(crate) fn build_puz(
  width: u8,
  height: u8,
  solution: &str,
  meta: [&str; 3],
  clues: &[&str],
) -> Vec<u8> {
  assert_eq!(solution.len(), width as usize * height as usize);

  let mut data = vec![0u8; 0x34];
  data[0x02..0x0E].copy_from_slice(b"ACROSS&DOWN\0");
  data[0x18..0x1C].copy_from_slice(b"1.3\0");
  data[0x2C] = width;
  data[0x2D] = height;
  data[0x2E..0x30].copy_from_slice(&(clues.len() as u16).to_le_bytes());
  data[0x30] = 1;
  set_cib_checksum(&mut data);

  let solution_bytes: Vec<u8> = latin_1(solution).collect();
  let state_bytes: Vec<u8> = solution.bytes().map(|b| if b == b'.' { b'.' } else { b'-' }).collect();
  let meta_bytes: Vec<Vec<u8>> = meta.iter().map(|s| latin_1(s).collect()).collect();
  let clue_bytes: Vec<Vec<u8>> = clues.iter().map(|s| latin_1(s).collect()).collect();

  let cib = checksum_region(&data[0x2C..0x34], 0);
  let meta_slices: Vec<&[u8]> = meta_bytes.iter().map(Vec::as_slice).collect();
  let clue_slices: Vec<&[u8]> = clue_bytes.iter().map(Vec::as_slice).collect();
  let file = file_checksum(
    cib,
    &solution_bytes,
    &state_bytes,
    &meta_slices,
    &clue_slices,
    clues.len() as u16,
  );
  data[0x00..0x02].copy_from_slice(&file.to_le_bytes());

  data.extend(solution_bytes);
  data.extend(state_bytes);
  for s in meta_bytes.iter().chain(&clue_bytes) {
    data.extend(s);
    data.push(0);
  }

  data
}
