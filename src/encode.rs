//! Per-block intermediate encoder.
//!
//! Each compression worker runs [`encode_block`] over its slice of the
//! source, producing a self-contained packet stream with no knowledge of
//! 8 KiB windows or neighboring blocks — the driver handles both when it
//! stitches the block streams together.
//!
//! The encoder enforces two grammar rules as it emits:
//!
//! - literal runs of 1–3 bytes never get their own packet; they ride as a
//!   tiny-literal suffix on the previous match packet, or on a freshly
//!   emitted dummy when no packet can carry them;
//! - two literal packets are never adjacent; a dummy separates them.

use crate::match_finder::find_run;
use crate::packet::{
    BIG_MAX_LEN, DUMMY_PACKET, LITTLE_MAX_LEN, LITTLE_MAX_LOOKBACK, MAX_ENCODED_MATCH,
    MAX_LITERAL, MAX_LOOKBACK, MIN_MATCH, SHORT_LITERAL_MAX,
};

/// What the most recently emitted packet can do for the next emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carrier {
    /// Nothing emitted yet.
    None,
    /// Last packet was a literal: the next literal packet needs a dummy
    /// separator, and a tiny literal needs a dummy carrier.
    Literal,
    /// Last packet can take a tiny-literal count at this buffer offset
    /// (its second-to-last byte).
    Free { at: usize },
    /// Last packet's tiny-literal field is already spoken for.
    Taken,
}

/// Encoder state for one block: the output bytes plus the carrier tracking
/// needed to back-patch tiny-literal counts.
struct BlockEncoder {
    out: Vec<u8>,
    last: Carrier,
}

impl BlockEncoder {
    fn new() -> Self {
        BlockEncoder {
            out: Vec::new(),
            last: Carrier::None,
        }
    }

    /// Emits a literal run of any size the finder can produce.
    fn emit_literals(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= MAX_LITERAL);
        match bytes.len() {
            0 => {}
            1..=3 => self.emit_tiny_literal(bytes),
            _ => self.emit_literal_packet(bytes),
        }
    }

    /// Rides 1–3 raw bytes on the previous packet's tiny field, emitting a
    /// dummy carrier when the previous packet cannot take them.
    fn emit_tiny_literal(&mut self, bytes: &[u8]) {
        let at = match self.last {
            Carrier::Free { at } => at,
            _ => {
                self.out.extend_from_slice(&DUMMY_PACKET);
                self.out.len() - 2
            }
        };
        self.out[at] |= bytes.len() as u8;
        self.out.extend_from_slice(bytes);
        self.last = Carrier::Taken;
    }

    /// Emits a standalone literal packet (4–273 bytes), separated from a
    /// preceding literal packet by a dummy.
    fn emit_literal_packet(&mut self, bytes: &[u8]) {
        if self.last == Carrier::Literal {
            self.out.extend_from_slice(&DUMMY_PACKET);
        }
        let count = bytes.len();
        if count <= SHORT_LITERAL_MAX {
            self.out.push((count - 3) as u8);
        } else {
            self.out.push(0x00);
            self.out.push((count - 18) as u8);
        }
        self.out.extend_from_slice(bytes);
        self.last = Carrier::Literal;
    }

    /// Emits a match of `size` bytes at `lookback` bytes behind the current
    /// output position, picking the smallest family that fits.
    fn emit_match(&mut self, lookback: usize, size: usize) {
        debug_assert!((1..=MAX_LOOKBACK).contains(&lookback));
        debug_assert!((MIN_MATCH..=MAX_ENCODED_MATCH).contains(&size));

        let pos = lookback - 1;
        if size <= LITTLE_MAX_LEN && lookback <= LITTLE_MAX_LOOKBACK {
            self.out.push((((size - 1) << 5) | ((pos % 8) << 2)) as u8);
            self.out.push((pos / 8) as u8);
        } else if size <= BIG_MAX_LEN {
            self.out.push((0x20 | (size - 2)) as u8);
            self.out.push(((pos % 0x40) << 2) as u8);
            self.out.push((pos / 0x40) as u8);
        } else {
            self.out.push(0x20);
            self.out.push((size - (0x1F + 2)) as u8);
            self.out.push(((pos % 0x40) << 2) as u8);
            self.out.push((pos / 0x40) as u8);
        }
        self.last = Carrier::Free {
            at: self.out.len() - 2,
        };
    }
}

/// Encodes one block of source bytes into an intermediate packet stream.
///
/// `end_of_buffer` marks the block that contains the end of the source; it
/// selects the match finder's clamped tail path.
pub fn encode_block(block: &[u8], end_of_buffer: bool) -> Vec<u8> {
    let mut encoder = BlockEncoder::new();
    let end = block.len();
    let mut pos = 0;

    while pos < end {
        let run = find_run(block, pos, end, end_of_buffer);
        encoder.emit_literals(&block[pos..pos + run.literal_size]);
        pos += run.literal_size;
        if run.match_size > 0 {
            encoder.emit_match(pos - run.match_offset, run.match_size);
            pos += run.match_size;
        }
    }

    encoder.out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_encodes_to_nothing() {
        assert!(encode_block(&[], true).is_empty());
    }

    #[test]
    fn single_byte_rides_a_dummy() {
        assert_eq!(encode_block(&[0xAA], true), vec![0x11, 0x01, 0x00, 0xAA]);
    }

    #[test]
    fn repeating_bytes_seed_then_match() {
        // Three seed literals on a dummy, then a length-7 little match at
        // lookback 1.
        assert_eq!(
            encode_block(&[0x01; 10], true),
            vec![0x11, 0x03, 0x00, 0x01, 0x01, 0x01, 0xC0, 0x00]
        );
    }

    #[test]
    fn tiny_literal_rides_the_previous_match() {
        // 3 seed + match 7 covers [1; 10]; then one odd byte out, then
        // another run. The odd byte must land in the match packet's flag
        // (little match: the flag is the second-to-last byte), not in a
        // packet of its own.
        let mut data = vec![0x01; 10];
        data.push(0xEE);
        data.extend_from_slice(&[0x01; 6]);
        let stream = encode_block(&data, true);
        // dummy+seed, little match (tiny = 1) + 0xEE, little match.
        assert_eq!(
            stream,
            vec![
                0x11, 0x03, 0x00, 0x01, 0x01, 0x01, // seed
                0xC1, 0x00, 0xEE, // len-7 match, tiny literal 0xEE
                0xB8, 0x00, // len-6 match covering the second run
            ]
        );
    }

    #[test]
    fn long_incompressible_runs_split_with_dummies() {
        // 300 bytes with no repeating 3-byte window (stride 7 for the first
        // 256 positions, stride 11 after): one max literal packet, a dummy
        // separator, then the remainder.
        let data: Vec<u8> = (0..300usize)
            .map(|i| {
                if i < 256 {
                    (7 * i) as u8
                } else {
                    (11 * (i - 256) + 5) as u8
                }
            })
            .collect();
        let stream = encode_block(&data, true);
        assert_eq!(stream[0], 0x00);
        assert_eq!(stream[1], 0xFF); // 273 = 0xFF + 18
        let after_first = 2 + 273;
        assert_eq!(&stream[after_first..after_first + 3], &DUMMY_PACKET);
        // Remaining 27 bytes as a short literal.
        assert_eq!(stream[after_first + 3], 27 - 3);
        assert_eq!(stream.len(), after_first + 3 + 1 + 27);
    }
}
