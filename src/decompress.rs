//! Single-threaded decompressor.
//!
//! The decoder is a state machine driven by the flag byte of each packet
//! (see [`crate::packet`] for the families). It reads the source through a
//! [`ByteCursor`] and appends to a [`ByteSink`]; match copies go through
//! the sink's overlap-safe byte copy, so a lookback smaller than the match
//! length extends a run exactly as the format requires.
//!
//! Two no-op packets share the far-match family's zero-distance encoding
//! and are told apart by their length field:
//!
//! - length 4 (flag `0x12`) is a pad: the source position skips forward to
//!   the next window boundary, consuming the filler bytes;
//! - length 3 (flag `0x11`) is a dummy: nothing is copied, but the
//!   tiny-literal suffix is honored like any other match packet.
//!
//! Any other zero-distance length cannot be produced by an encoder and is
//! rejected.

use crate::buffer::{ByteCursor, ByteSink};
use crate::error::WadError;
use crate::header::{Header, HEADER_SIZE};
use crate::packet::PAD_SKIP_ALIGN;

/// Decompresses a complete WAD stream.
pub fn decompress(src: &[u8]) -> Result<Vec<u8>, WadError> {
    decompress_n(src, 0)
}

/// Decompresses a WAD stream, stopping after `bytes_to_decompress` output
/// bytes. Zero means "decode everything". If the stream holds fewer bytes
/// than requested, everything available is returned.
pub fn decompress_n(src: &[u8], bytes_to_decompress: usize) -> Result<Vec<u8>, WadError> {
    let header = Header::parse(src)?;
    let total_size = header.total_size as usize;

    let mut src = ByteCursor::new(src);
    src.seek(HEADER_SIZE);
    let mut dst = ByteSink::with_capacity(src.len().saturating_mul(2));

    while src.pos() < total_size
        && (bytes_to_decompress == 0 || dst.len() < bytes_to_decompress)
    {
        let flag = src.read_u8()?;

        if flag < 0x10 {
            // Literal packet. No tiny-literal suffix.
            let count = if flag == 0 {
                src.read_u8()? as usize + 18
            } else {
                flag as usize + 3
            };
            dst.extend(src.read_bytes(count)?);
            if src.pos() < total_size {
                if let Ok(next) = src.peek_u8(src.pos()) {
                    if next < 0x10 {
                        return Err(WadError::DoubleLiteral);
                    }
                }
            }
            continue;
        }

        let mut size;
        let lookback: i64;
        let here = dst.len() as i64;

        if flag < 0x20 {
            // Far match, or one of the zero-distance no-ops.
            size = (flag & 7) as usize;
            if size == 0 {
                size = src.read_u8()? as usize + 7;
            }
            size += 2;
            let b0 = src.read_u8()? as i64;
            let b1 = src.read_u8()? as i64;
            let mut raw = here - ((flag & 8) as i64) * 0x800 - ((b0 >> 2) + b1 * 0x40);
            if raw == here {
                if size == 4 {
                    // Pad: skip filler up to the next window boundary.
                    skip_pad_filler(&mut src);
                    continue;
                }
                if size != 3 {
                    return Err(WadError::CorruptPacket);
                }
                // Dummy: copy nothing; the tiny suffix below still applies.
                size = 1;
            } else {
                raw -= 0x4000;
            }
            lookback = raw;
        } else if flag < 0x40 {
            // Big match.
            size = (flag & 0x1F) as usize;
            if size == 0 {
                size = src.read_u8()? as usize + 0x1F;
            }
            size += 2;
            let b1 = src.read_u8()? as i64;
            let b2 = src.read_u8()? as i64;
            lookback = here - ((b1 >> 2) + b2 * 0x40) - 1;
        } else {
            // Little match.
            let b1 = src.read_u8()? as i64;
            lookback = here - b1 * 8 - (((flag >> 2) & 7) as i64) - 1;
            size = ((flag >> 5) + 1) as usize;
        }

        if size != 1 {
            if lookback < 0 || lookback >= here {
                return Err(WadError::BadLookback);
            }
            dst.copy_within_overlapping(lookback as usize, size);
        }

        // Tiny-literal suffix: the low two bits of the second-to-last byte
        // of the packet just consumed.
        let tiny = (src.peek_u8(src.pos() - 2)? & 3) as usize;
        if tiny > 0 {
            dst.extend(src.read_bytes(tiny)?);
        }
    }

    let mut out = dst.into_vec();
    if bytes_to_decompress != 0 && out.len() > bytes_to_decompress {
        out.truncate(bytes_to_decompress);
    }
    Ok(out)
}

/// Advances past pad filler: the next packet starts at the next source
/// offset congruent to the header size modulo the alignment stride.
fn skip_pad_filler(src: &mut ByteCursor<'_>) {
    let mut pos = src.pos();
    while pos % PAD_SKIP_ALIGN != HEADER_SIZE {
        pos += 1;
    }
    src.seek(pos);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{write_le32, TOTAL_SIZE_OFFSET};

    /// Builds a stream around `body` with a patched header.
    fn stream(body: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
        bytes.extend_from_slice(b"WAD");
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend_from_slice(b"WRENCH01\0");
        bytes.extend_from_slice(body);
        let total = bytes.len() as u32;
        write_le32(&mut bytes, TOTAL_SIZE_OFFSET, total);
        bytes
    }

    #[test]
    fn dummy_packet_carries_tiny_literal() {
        let out = decompress(&stream(&[0x11, 0x01, 0x00, 0xAA])).unwrap();
        assert_eq!(out, vec![0xAA]);
    }

    #[test]
    fn little_match_extends_a_run() {
        // Seed three bytes through a dummy, then a length-7 match at
        // lookback 1.
        let out = decompress(&stream(&[0x11, 0x03, 0x00, 1, 1, 1, 0xC0, 0x00])).unwrap();
        assert_eq!(out, vec![1u8; 10]);
    }

    #[test]
    fn far_match_reaches_behind_the_near_window() {
        // 0x4002 literal bytes (long literals separated by dummies), then a
        // far match of 5 bytes at distance 0x4001.
        let mut body = Vec::new();
        let mut expect = Vec::new();
        let mut value = 0u8;
        let mut remaining = 0x4002usize;
        while remaining > 0 {
            let run = remaining.min(273);
            if run < 19 {
                body.push((run - 3) as u8);
            } else {
                body.push(0x00);
                body.push((run - 18) as u8);
            }
            for _ in 0..run {
                body.push(value);
                expect.push(value);
                value = value.wrapping_add(1);
            }
            remaining -= run;
            if remaining > 0 {
                body.extend_from_slice(&[0x11, 0x00, 0x00]);
            }
        }
        // Flag 0x13: length 5. Distance 0x4000 + (b0 >> 2) = 0x4001.
        body.extend_from_slice(&[0x13, 0x04, 0x00]);
        let start = expect.len() - 0x4001;
        for i in 0..5 {
            let byte = expect[start + i];
            expect.push(byte);
        }
        let out = decompress(&stream(&body)).unwrap();
        assert_eq!(out, expect);
    }

    #[test]
    fn zero_distance_with_bad_length_is_corrupt() {
        // Flag 0x15 has length 7 but distance 0: not a pad, not a dummy.
        let err = decompress(&stream(&[0x15, 0x00, 0x00])).unwrap_err();
        assert_eq!(err, WadError::CorruptPacket);
    }

    #[test]
    fn decompress_n_truncates_to_request() {
        let body = [0x11, 0x03, 0x00, 1, 1, 1, 0xC0, 0x00];
        let out = decompress_n(&stream(&body), 4).unwrap();
        assert_eq!(out, vec![1u8; 4]);
        // Requests past the end return what exists.
        let out = decompress_n(&stream(&body), 64).unwrap();
        assert_eq!(out, vec![1u8; 10]);
    }
}
