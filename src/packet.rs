//! Packet grammar: flag-byte families, format constants, and the packet
//! length helper.
//!
//! Every packet starts with a flag byte that selects its family:
//!
//! | Flag        | Family                                               |
//! |-------------|------------------------------------------------------|
//! | `0x00`      | long literal (length byte follows)                   |
//! | `0x01–0x0F` | short literal                                        |
//! | `0x10–0x1F` | far match (lookback ≥ 0x4000), or the pad/dummy no-ops |
//! | `0x20–0x3F` | big match, with an extended-length form for flag `0x20` |
//! | `0x40–0xFF` | little match                                         |
//!
//! Every match-family packet reserves the low two bits of its
//! second-to-last byte for a tiny-literal count: 0–3 raw bytes that follow
//! the packet and are copied to the output verbatim. Literal packets carry
//! no such suffix.

use crate::error::WadError;

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest back-reference the format can express.
pub const MIN_MATCH: usize = 3;

/// Longest literal run a single packet can carry (`0xFF + 18`).
pub const MAX_LITERAL: usize = 273;

/// Longest match the decoder accepts (`0xFF + 0x1F + 2`).
pub const MAX_MATCH: usize = 288;

/// Longest match the compressor emits. The game's own streams never use
/// the decoder's full length range, and this encoder follows suit.
pub const MAX_ENCODED_MATCH: usize = 0x100;

/// Farthest lookback the compressor's match search considers.
pub const MAX_LOOKBACK: usize = 0x4000;

/// Little-match limits: lengths 3–8 at lookbacks up to 2 KiB.
pub const LITTLE_MAX_LEN: usize = 8;
pub const LITTLE_MAX_LOOKBACK: usize = 0x800;

/// Longest length the big-match short form can express.
pub const BIG_MAX_LEN: usize = 33;

/// Longest literal run a short-literal packet can carry; longer runs use
/// the long form (`0x00` flag plus a length byte).
pub const SHORT_LITERAL_MAX: usize = 18;

/// Do-nothing packet inserted between adjacent literal packets and used as
/// a carrier when a tiny literal has no match packet to ride on.
pub const DUMMY_PACKET: [u8; 3] = [0x11, 0x00, 0x00];

/// Do-nothing packet announcing 8 KiB realignment; the bytes after it up
/// to the next window boundary are filler.
pub const PAD_PACKET: [u8; 3] = [0x12, 0x00, 0x00];

/// Filler byte written after a pad packet.
pub const PAD_FILL: u8 = 0xEE;

/// Compressed-stream window size. The target hardware streams compressed
/// data through a fixed scratch buffer, so no packet may straddle a window
/// boundary, measured from the end of the header.
pub const PAD_WINDOW: usize = 0x2000;

/// Alignment stride the decoder skips by after a pad packet: the position
/// is advanced until `pos % 0x1000 == 0x10`.
pub const PAD_SKIP_ALIGN: usize = 0x1000;

// ─────────────────────────────────────────────────────────────────────────────
// Packet length
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the size in bytes of the packet starting at `bytes[0]`,
/// including its tiny-literal suffix.
///
/// This walks the same flag arithmetic as the decompressor, so the two
/// always agree on packet boundaries; the compressor's stitcher relies on
/// that to move whole packets between buffers, and it doubles as an
/// integrity check over intermediate streams. Pad filler bytes are not part
/// of the pad packet and are not counted here.
///
/// Fails with [`WadError::TruncatedInput`] when `bytes` ends inside the
/// packet.
pub fn packet_length(bytes: &[u8]) -> Result<usize, WadError> {
    let flag = *bytes.first().ok_or(WadError::TruncatedInput)?;

    let total = if flag == 0x00 {
        // Long literal: flag, length byte, then `length + 18` raw bytes.
        let ext = *bytes.get(1).ok_or(WadError::TruncatedInput)? as usize;
        2 + ext + 18
    } else if flag < 0x10 {
        // Short literal: flag then `flag + 3` raw bytes.
        1 + flag as usize + 3
    } else {
        // Match families: flag, an extension byte when the in-flag length
        // field is zero, position byte(s), then the tiny-literal suffix.
        let body = if flag < 0x20 {
            if flag & 7 == 0 { 4 } else { 3 }
        } else if flag < 0x40 {
            if flag & 0x1F == 0 { 4 } else { 3 }
        } else {
            2
        };
        let tiny = *bytes.get(body - 2).ok_or(WadError::TruncatedInput)? as usize & 3;
        body + tiny
    };

    if total > bytes.len() {
        return Err(WadError::TruncatedInput);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_packet_lengths() {
        // Short literal 0x05 carries 8 raw bytes.
        assert_eq!(packet_length(&[0x05; 9]).unwrap(), 9);
        // Long literal with extension 2 carries 20 raw bytes.
        let mut long = vec![0x00, 0x02];
        long.extend(std::iter::repeat(0xAA).take(20));
        assert_eq!(packet_length(&long).unwrap(), 22);
    }

    #[test]
    fn match_packet_lengths_include_tiny_suffix() {
        // Little match, no tiny bytes.
        assert_eq!(packet_length(&[0xC0, 0x00]).unwrap(), 2);
        // Little match with a 2-byte tiny suffix in the flag's low bits.
        assert_eq!(packet_length(&[0xC2, 0x00, 0xAA, 0xBB]).unwrap(), 4);
        // Big match short form with a 1-byte suffix.
        assert_eq!(packet_length(&[0x21, 0x01, 0x00, 0xAA]).unwrap(), 4);
        // Big match extended form: flag, length byte, two position bytes.
        assert_eq!(packet_length(&[0x20, 0x10, 0x00, 0x00]).unwrap(), 4);
        // Dummy carrying 3 tiny bytes.
        assert_eq!(packet_length(&[0x11, 0x03, 0x00, 1, 2, 3]).unwrap(), 6);
        // Pad packet is always exactly 3 bytes; filler is not counted.
        assert_eq!(packet_length(&[0x12, 0x00, 0x00, 0xEE, 0xEE]).unwrap(), 3);
    }

    #[test]
    fn truncated_packets_are_rejected() {
        assert_eq!(packet_length(&[]), Err(WadError::TruncatedInput));
        assert_eq!(packet_length(&[0x00]), Err(WadError::TruncatedInput));
        assert_eq!(packet_length(&[0x05, 0xAA]), Err(WadError::TruncatedInput));
        assert_eq!(packet_length(&[0xC2, 0x00, 0xAA]), Err(WadError::TruncatedInput));
    }
}
