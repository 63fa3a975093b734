//! JaCoCo-compatible class identifiers.
//!
//! The coverage agent names every dumped class `<name>.<id>.class`, where `id` is a
//! CRC-64 of the raw class bytes. Reference keys only line up with the dump if this
//! is bit-for-bit the same computation.

const POLY64REV: u64 = 0xd800_0000_0000_0000;

const CLASS_FILE_V1_8: u8 = 52;
const CLASS_FILE_V9: u8 = 53;

static LOOKUP_TABLE: [u64; 256] = build_table();

const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut v = i as u64;
        let mut j = 0;
        while j < 8 {
            v = if v & 1 == 1 { (v >> 1) ^ POLY64REV } else { v >> 1 };
            j += 1;
        }
        table[i] = v;
        i += 1;
    }
    table
}

#[inline]
fn update(sum: u64, byte: u8) -> u64 {
    (sum >> 8) ^ LOOKUP_TABLE[((sum as u8) ^ byte) as usize]
}

fn update_all(sum: u64, bytes: &[u8]) -> u64 {
    bytes.iter().fold(sum, |acc, &b| update(acc, b))
}

/// Computes the 64-bit class id of a complete class file.
///
/// Class files with major version 53 are hashed as if they were version 52: the
/// agent has done this since its early Java 9 support, and existing ids depend on it.
pub fn class_id(bytes: &[u8]) -> u64 {
    if bytes.len() > 7 && bytes[6] == 0x00 && bytes[7] == CLASS_FILE_V9 {
        let sum = update_all(0, &bytes[..7]);
        let sum = update(sum, CLASS_FILE_V1_8);
        return update_all(sum, &bytes[8..]);
    }
    update_all(0, bytes)
}

/// Renders a class id the way the agent embeds it in file names: 16 lowercase hex digits.
pub fn to_hex(id: u64) -> String {
    hex::encode(id.to_be_bytes())
}
