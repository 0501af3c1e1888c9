//! E2E Test Suite: exact stream layout.
//!
//! Pins down the wire format byte for byte where the grammar leaves the
//! encoder no freedom, and checks the structural stream invariants
//! everywhere else:
//! - no two adjacent literal packets
//! - pad packets and filler realign the stream to its 8 KiB windows, and
//!   no packet straddles a window boundary
//! - walking with packet_length visits exactly the bytes the decoder reads

extern crate wad;

use wad::header::{read_le32, HEADER_SIZE, TOTAL_SIZE_OFFSET};
use wad::packet::{DUMMY_PACKET, PAD_FILL, PAD_PACKET, PAD_WINDOW};
use wad::{compress, decompress, packet_length, validate_magic};

// ─────────────────────────────────────────────────────────────────────────────
// Stream walker
// ─────────────────────────────────────────────────────────────────────────────

/// One packet seen by the walker: offset of the flag byte plus the flag.
struct Seen {
    offset: usize,
    flag: u8,
}

/// Walks a complete stream with packet_length, mirroring the decoder's
/// consumption, and verifies the window invariants along the way.
fn walk(stream: &[u8]) -> Vec<Seen> {
    let total = read_le32(stream, TOTAL_SIZE_OFFSET) as usize;
    assert_eq!(total, stream.len(), "header total_size must match");

    let mut packets = Vec::new();
    let mut pos = HEADER_SIZE;
    while pos < total {
        let flag = stream[pos];
        let size = packet_length(&stream[pos..])
            .unwrap_or_else(|e| panic!("packet_length failed at {pos:#x}: {e}"));

        // No packet may straddle a window boundary.
        let start_window = (pos - HEADER_SIZE) / PAD_WINDOW;
        let end_window = (pos + size - 1 - HEADER_SIZE) / PAD_WINDOW;
        assert_eq!(
            start_window, end_window,
            "packet at {pos:#x} straddles a window boundary"
        );

        packets.push(Seen { offset: pos, flag });

        if stream[pos..pos + size] == PAD_PACKET {
            // Pad: everything up to the next window boundary is filler.
            pos += size;
            while pos % 0x1000 != HEADER_SIZE {
                assert_eq!(stream[pos], PAD_FILL, "non-filler byte at {pos:#x}");
                pos += 1;
            }
            assert_eq!(pos % PAD_WINDOW, HEADER_SIZE, "pad skipped to a mid-window offset");
        } else {
            pos += size;
        }
    }
    assert_eq!(pos, total, "walker must land exactly on the end of stream");
    packets
}

fn random_bytes(mut seed: u32, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        out.extend_from_slice(&seed.to_le_bytes());
    }
    out.truncate(len);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: empty input is a bare header
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_input_is_bare_header() {
    let packed = compress(&[], 1).expect("compression should succeed");
    let mut expected = Vec::new();
    expected.extend_from_slice(b"WAD");
    expected.extend_from_slice(&16u32.to_le_bytes());
    expected.extend_from_slice(b"WRENCH01\0");
    assert_eq!(packed, expected);
    assert_eq!(decompress(&packed).unwrap(), Vec::<u8>::new());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: a single byte rides a dummy packet's tiny literal
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_byte_stream_layout() {
    let packed = compress(&[0xAA], 1).expect("compression should succeed");
    assert_eq!(packed.len(), 20);
    assert_eq!(read_le32(&packed, TOTAL_SIZE_OFFSET), 20);
    // Dummy packet with a tiny-literal count of 1, then the raw byte.
    assert_eq!(&packed[HEADER_SIZE..], &[0x11, 0x01, 0x00, 0xAA]);
    assert_eq!(decompress(&packed).unwrap(), vec![0xAA]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: repeating bytes — three-byte seed then one little match
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_repeating_byte_stream_layout() {
    let packed = compress(&[0x01; 10], 1).expect("compression should succeed");
    assert_eq!(packed.len(), 24);
    assert_eq!(
        &packed[HEADER_SIZE..],
        &[0x11, 0x03, 0x00, 0x01, 0x01, 0x01, 0xC0, 0x00],
        "expected a tiny-literal seed of 3 then a length-7 match at lookback 1"
    );
    assert_eq!(decompress(&packed).unwrap(), vec![0x01; 10]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: block seams are separated by dummy packets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_block_seams_carry_dummies() {
    let data = vec![0u8; 4096];
    let packed = compress(&data, 4).expect("compression should succeed");
    let packets = walk(&packed);

    // Four blocks of 1024 bytes: every block after the first is preceded by
    // a bare dummy (0x11 with no tiny-literal bits).
    let bare_dummies = packets
        .iter()
        .filter(|p| packed[p.offset..p.offset + 3] == DUMMY_PACKET)
        .count();
    assert!(
        bare_dummies >= 3,
        "expected at least 3 seam dummies, found {bare_dummies}"
    );
    assert_eq!(decompress(&packed).unwrap(), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: 8 KiB windows are padded and realigned
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_incompressible_stream_is_padded_every_window() {
    let data = random_bytes(0xC0DE_C0DE, 65_536);
    let packed = compress(&data, 1).expect("compression should succeed");
    let packets = walk(&packed);

    let pads = packets
        .iter()
        .filter(|p| packed[p.offset..p.offset + 3] == PAD_PACKET)
        .count();
    assert!(pads >= 3, "expected at least 3 pad packets, found {pads}");
    assert_eq!(decompress(&packed).unwrap(), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: literal packets are never adjacent
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_no_adjacent_literal_packets() {
    let mut inputs = vec![
        random_bytes(0xFEED_F00D, 20_000),
        vec![0x42; 5000],
        (0..10_000u32).map(|i| (i % 7) as u8).collect(),
    ];
    // Text with incompressible interludes forces literal-after-literal
    // situations inside the encoder.
    let mut mixed = Vec::new();
    for chunk in 0..20 {
        mixed.extend_from_slice(&random_bytes(chunk as u32 + 1, 600));
        mixed.extend_from_slice(&[0x55; 40]);
    }
    inputs.push(mixed);

    for (index, data) in inputs.iter().enumerate() {
        for threads in [1usize, 4] {
            let packed = compress(data, threads).expect("compression should succeed");
            let packets = walk(&packed);
            for pair in packets.windows(2) {
                assert!(
                    !(pair[0].flag < 0x10 && pair[1].flag < 0x10),
                    "adjacent literal packets at {:#x}/{:#x} in input {index} ({threads} threads)",
                    pair[0].offset,
                    pair[1].offset
                );
            }
            assert_eq!(&decompress(&packed).unwrap(), data);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: magic validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_validate_magic() {
    let packed = compress(b"data", 1).expect("compression should succeed");
    assert!(validate_magic(&packed));
    assert!(!validate_magic(b""));
    assert!(!validate_magic(b"WA"));
    assert!(!validate_magic(b"RIFF\x00\x00"));
}
