//! E2E Test Suite: error paths.
//!
//! Every WadError variant is reachable from the public API, errors carry
//! usable messages, and no partial output escapes a failed call.

extern crate wad;

use wad::header::{write_le32, HEADER_SIZE, TOTAL_SIZE_OFFSET};
use wad::{compress, decompress, decompress_n, packet_length, WadError};

/// Builds a stream around `body` with a valid header and patched size.
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

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: invalid parameters
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_zero_threads_is_rejected() {
    let err = compress(b"data", 0).unwrap_err();
    assert!(matches!(err, WadError::InvalidParameter(_)));
    assert!(err.to_string().contains("thread_count"));
}

#[test]
fn test_undersized_input_is_rejected() {
    for input in [&b""[..], &b"WAD"[..], &b"WAD\x10\x00\x00\x00WRENCH"[..]] {
        let err = decompress(input).unwrap_err();
        assert!(
            matches!(err, WadError::InvalidParameter(_)),
            "expected InvalidParameter for {} bytes, got {err:?}",
            input.len()
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: bad magic
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bad_magic_is_rejected() {
    let mut bytes = stream(&[]);
    bytes[0] = b'M';
    assert_eq!(decompress(&bytes).unwrap_err(), WadError::BadMagic);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: adjacent literal packets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_double_literal_is_rejected() {
    // Two short-literal packets of four bytes each, back to back.
    let body = [0x01, 1, 2, 3, 4, 0x01, 5, 6, 7, 8];
    assert_eq!(decompress(&stream(&body)).unwrap_err(), WadError::DoubleLiteral);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: truncation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_truncated_literal_is_rejected() {
    // A short literal announcing 18 bytes with only two present.
    let body = [0x0F, 0xAA, 0xBB];
    assert_eq!(decompress(&stream(&body)).unwrap_err(), WadError::TruncatedInput);
}

#[test]
fn test_truncated_match_is_rejected() {
    // A big match missing its second position byte.
    let body = [0x25, 0x00];
    assert_eq!(decompress(&stream(&body)).unwrap_err(), WadError::TruncatedInput);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: bad lookbacks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_lookback_before_stream_start_is_rejected() {
    // A little match at output position 0 referencing position -1.
    let body = [0x40, 0x00];
    assert_eq!(decompress(&stream(&body)).unwrap_err(), WadError::BadLookback);
}

#[test]
fn test_lookback_beyond_history_is_rejected() {
    // Four literal bytes, then a little match reaching 9 bytes back.
    let body = [0x01, 1, 2, 3, 4, 0x40, 0x01];
    assert_eq!(decompress(&stream(&body)).unwrap_err(), WadError::BadLookback);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: corrupt packets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_zero_distance_non_noop_is_rejected() {
    // Flag 0x15 has a zero distance but length 7: neither pad nor dummy.
    let body = [0x15, 0x00, 0x00];
    assert_eq!(decompress(&stream(&body)).unwrap_err(), WadError::CorruptPacket);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: packet_length mirrors the decoder's failures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_packet_length_rejects_truncated_slices() {
    assert_eq!(packet_length(&[]).unwrap_err(), WadError::TruncatedInput);
    assert_eq!(packet_length(&[0x00]).unwrap_err(), WadError::TruncatedInput);
    assert_eq!(
        packet_length(&[0x0F, 0xAA, 0xBB]).unwrap_err(),
        WadError::TruncatedInput
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 8: errors are fatal — no partial output on failure
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_failed_decode_returns_no_data() {
    // The first packet decodes fine; the second is truncated. The call must
    // fail outright rather than return the first packet's output.
    let body = [0x01, 1, 2, 3, 4, 0x21, 0x00];
    let result = decompress(&stream(&body));
    assert_eq!(result.unwrap_err(), WadError::TruncatedInput);

    // decompress_n can still recover the decodable prefix explicitly.
    let prefix = decompress_n(&stream(&body), 4).expect("prefix should decode");
    assert_eq!(prefix, vec![1, 2, 3, 4]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 9: error messages are descriptive
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_error_display_messages() {
    assert!(WadError::BadMagic.to_string().contains("WAD"));
    assert!(WadError::DoubleLiteral.to_string().contains("literal"));
    assert!(WadError::TruncatedInput.to_string().contains("end of the input"));
    assert!(WadError::BadLookback.to_string().contains("lookback"));
    assert!(WadError::InvalidParameter("thread_count must be at least 1")
        .to_string()
        .contains("thread_count"));
}
