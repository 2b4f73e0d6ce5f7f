//! Tracker protocol checksums
//!
//! Two checksums appear on the wire:
//! 1. ASCII protocols (Meitrack family): sum of byte values modulo 256,
//!    rendered as two uppercase hex digits after the terminating `*`
//! 2. BSJ binary protocol: XOR of all bytes, appended before escaping
//!
//! The MVT366 emulation uses a third, length-based formula that depends
//! only on the header and payload lengths; see [`length_based`].

use tracing::trace;

/// Calculate the modulo-256 byte sum used by the ASCII protocols
///
/// The input must be the exact byte range from the frame's first header
/// character through the terminating `*` inclusive. Empty input yields 0.
pub fn byte_sum(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));

    trace!(len = data.len(), checksum = format!("0x{sum:02X}"), "Calculated byte sum");

    sum
}

/// Byte-sum checksum in its wire form: two uppercase hex digits
pub fn byte_sum_hex(data: &[u8]) -> String {
    format!("{:02X}", byte_sum(data))
}

/// Verify a received ASCII checksum against the checksummed range
///
/// The comparison is case-insensitive since a handful of firmware builds
/// emit lowercase hex.
pub fn verify_byte_sum(data: &[u8], received: &str) -> bool {
    byte_sum_hex(data).eq_ignore_ascii_case(received)
}

/// Calculate the XOR checksum used by the BSJ binary protocol
///
/// Computed over header+body before the checksum byte is appended and
/// before escaping. Empty input yields 0.
pub fn xor(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, b| acc ^ b);

    trace!(len = data.len(), checksum = format!("0x{sum:02X}"), "Calculated XOR checksum");

    sum
}

/// Calculate the MVT366 length-based checksum
///
/// Formula: `(header_len + payload_len + 2) % 256`. Inferred from vendor
/// documentation; unverified against real MVT366 firmware.
pub fn length_based(header_len: usize, payload_len: usize) -> u8 {
    ((header_len + payload_len + 2) % 256) as u8
}
