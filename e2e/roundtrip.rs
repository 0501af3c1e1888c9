//! E2E Test Suite: round-trip identity and universal stream properties.
//!
//! Validates the core compression/decompression contract:
//! - decompress(compress(s, t)) == s for every thread count
//! - compression is deterministic for a fixed (input, thread count)
//! - the header's total_size field equals the stream length
//! - compress_bound covers every produced stream
//! - decompress_n yields exact prefixes

extern crate wad;

use wad::header::{read_le32, TOTAL_SIZE_OFFSET};
use wad::{compress, compress_auto, compress_bound, decompress, decompress_n, validate_magic};

// ─────────────────────────────────────────────────────────────────────────────
// Test data
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic xorshift32 byte stream — incompressible input.
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

/// Repetitive text — compressible input.
fn text_bytes(len: usize) -> Vec<u8> {
    let phrase = b"the quick brown fox jumps over the lazy dog and the dog does not care. ";
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let take = (len - out.len()).min(phrase.len());
        out.extend_from_slice(&phrase[..take]);
    }
    out
}

fn corpus() -> Vec<(&'static str, Vec<u8>)> {
    let mut mixed = text_bytes(3000);
    mixed.extend_from_slice(&random_bytes(0xBADC_0FFE, 3000));
    mixed.extend_from_slice(&vec![0x7Fu8; 2000]);

    vec![
        ("empty", Vec::new()),
        ("one byte", vec![0xAA]),
        ("tiny run", vec![0x01; 10]),
        ("short text", text_bytes(100)),
        ("ramp", (0..4096u32).map(|i| (i % 64) as u8).collect()),
        ("text 10k", text_bytes(10_000)),
        ("random 8k", random_bytes(0x1234_5678, 8192)),
        ("mixed", mixed),
        ("all zero 4k", vec![0u8; 4096]),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: round trip across thread counts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_all_inputs_all_thread_counts() {
    for (name, data) in corpus() {
        for threads in [1usize, 2, 4, 8] {
            let packed = compress(&data, threads)
                .unwrap_or_else(|e| panic!("compress({name}, {threads}) failed: {e}"));
            let unpacked = decompress(&packed)
                .unwrap_or_else(|e| panic!("decompress({name}, {threads}) failed: {e}"));
            assert_eq!(
                unpacked, data,
                "round trip mismatch for {name} at {threads} threads"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compression_is_deterministic() {
    for (name, data) in corpus() {
        for threads in [1usize, 2, 4] {
            let first = compress(&data, threads).expect("compression should succeed");
            let second = compress(&data, threads).expect("compression should succeed");
            assert_eq!(
                first, second,
                "non-deterministic output for {name} at {threads} threads"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: header total_size matches the stream length
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_header_total_size_is_stream_length() {
    for (name, data) in corpus() {
        for threads in [1usize, 4] {
            let packed = compress(&data, threads).expect("compression should succeed");
            assert!(validate_magic(&packed));
            assert_eq!(
                read_le32(&packed, TOTAL_SIZE_OFFSET) as usize,
                packed.len(),
                "total_size mismatch for {name} at {threads} threads"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: compress_bound covers every stream
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compress_bound_covers_output() {
    for (name, data) in corpus() {
        for threads in [1usize, 8] {
            let packed = compress(&data, threads).expect("compression should succeed");
            assert!(
                packed.len() <= compress_bound(data.len()),
                "bound {} below actual {} for {name} at {threads} threads",
                compress_bound(data.len()),
                packed.len()
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: decompress_n returns exact prefixes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_decompress_n_prefixes() {
    let data = text_bytes(10_000);
    let packed = compress(&data, 2).expect("compression should succeed");

    for n in [1usize, 100, 5000, 9999] {
        let prefix = decompress_n(&packed, n).expect("partial decompression should succeed");
        assert_eq!(prefix.len(), n);
        assert_eq!(prefix, data[..n], "prefix mismatch at n = {n}");
    }

    // n = 0 means "everything"; oversized requests return all available.
    assert_eq!(decompress_n(&packed, 0).unwrap(), data);
    assert_eq!(decompress_n(&packed, data.len() + 999).unwrap(), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: compress_auto round-trips
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compress_auto_roundtrip() {
    let data = text_bytes(20_000);
    let packed = compress_auto(&data).expect("compression should succeed");
    assert!(validate_magic(&packed));
    assert_eq!(read_le32(&packed, TOTAL_SIZE_OFFSET) as usize, packed.len());
    assert_eq!(decompress(&packed).unwrap(), data);
}
