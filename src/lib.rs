//! WAD codec — compressor and decompressor for the LZ77-family container
//! format used by a console game's asset archives.
//!
//! A stream is a 16-byte header (`"WAD"`, a little-endian total size, and a
//! producer tag) followed by a sequence of packets: literals, three
//! back-reference families, and two no-op packets that keep the grammar and
//! the 8 KiB window alignment intact. Compression cuts the source into
//! blocks, encodes them on parallel workers, and stitches the results;
//! decompression is a single-threaded state machine.
//!
//! ```
//! let data = b"abcabcabcabcabc".to_vec();
//! let packed = wad::compress(&data, 2).unwrap();
//! assert!(wad::validate_magic(&packed));
//! assert_eq!(wad::decompress(&packed).unwrap(), data);
//! ```
//!
//! The decoder accepts a wider family of valid streams than this encoder
//! produces (notably far matches and the full 288-byte match range), so
//! equivalence between two streams is judged by what they decode to, not by
//! their bytes.

pub mod buffer;
pub mod compress;
pub mod decompress;
pub mod encode;
pub mod error;
pub mod header;
pub mod match_finder;
pub mod packet;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// One-shot parallel compression.
pub use compress::compress;
/// Compression with one worker per physical core.
pub use compress::compress_auto;
/// Worst-case compressed size for a given input size.
pub use compress::compress_bound;
/// One-shot decompression of a complete stream.
pub use decompress::decompress;
/// Decompression capped at a requested output size.
pub use decompress::decompress_n;
/// Error type shared by the whole crate.
pub use error::WadError;
/// Parsed container header.
pub use header::Header;
/// Checks for the `"WAD"` magic bytes.
pub use header::validate_magic;
/// Size in bytes of the packet at the start of a slice.
pub use packet::packet_length;

// ─────────────────────────────────────────────────────────────────────────────
// Format constants re-exported for callers that inspect streams directly.
// ─────────────────────────────────────────────────────────────────────────────

pub use header::HEADER_SIZE;
pub use packet::{MAX_LITERAL, MAX_MATCH, MIN_MATCH, PAD_WINDOW};
