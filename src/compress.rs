//! Parallel compression driver and stream stitcher.
//!
//! Compression runs in two phases. First the source is cut into equal
//! blocks (rounded up to 256 bytes each) and every block is encoded
//! independently — on a dedicated worker pool when more than one block
//! exists. Then the driver stitches the intermediate streams into the final
//! container in block order, walking them packet by packet so it can:
//!
//! - emit a pad packet plus filler whenever the next packet would straddle
//!   an 8 KiB window boundary (the target hardware decompresses through a
//!   fixed scratch buffer and crashes on straddling packets);
//! - emit a dummy packet at every block seam, since a worker cannot know
//!   whether its neighbor's stream ends in a literal packet.
//!
//! The header is written first with a zeroed size field and patched once
//! the stream length is known.

use rayon::prelude::*;

use crate::buffer::ByteSink;
use crate::encode::encode_block;
use crate::error::WadError;
use crate::header::{Header, HEADER_SIZE, TOTAL_SIZE_OFFSET};
use crate::packet::{packet_length, DUMMY_PACKET, PAD_FILL, PAD_PACKET, PAD_WINDOW};

/// Block sizes are rounded up to this granularity.
const BLOCK_ROUNDING: usize = 256;

/// Compresses `src` into a complete WAD stream using `thread_count`
/// workers.
///
/// The output is a pure function of `(src, thread_count)`: blocks are
/// joined in index order, so repeated calls yield identical bytes.
pub fn compress(src: &[u8], thread_count: usize) -> Result<Vec<u8>, WadError> {
    if thread_count < 1 {
        return Err(WadError::InvalidParameter("thread_count must be at least 1"));
    }

    let blocks = partition(src, thread_count);
    let last = blocks.len().saturating_sub(1);

    let encoded: Vec<Vec<u8>> = if blocks.len() <= 1 {
        blocks
            .iter()
            .map(|block| encode_block(block, true))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .map_err(|_| WadError::InvalidParameter("worker pool could not be created"))?;
        pool.install(|| {
            blocks
                .par_iter()
                .enumerate()
                .map(|(index, block)| encode_block(block, index == last))
                .collect()
        })
    };

    stitch(&encoded, compress_bound(src.len()))
}

/// Compresses with one worker per physical core.
pub fn compress_auto(src: &[u8]) -> Result<Vec<u8>, WadError> {
    compress(src, num_cpus::get_physical().max(1))
}

/// Worst-case compressed size for `input_size` source bytes: header,
/// payload, per-block literal-packet and seam overhead, and one pad window
/// per 8 KiB of output. Safe to use for pre-sizing destination storage.
pub fn compress_bound(input_size: usize) -> usize {
    let literal_overhead = (input_size / BLOCK_ROUNDING + 1) * 8;
    let pad_overhead = (input_size / (PAD_WINDOW - 0x200) + 1) * 0x120;
    HEADER_SIZE + input_size + literal_overhead + pad_overhead
}

// ─────────────────────────────────────────────────────────────────────────────
// Partitioning
// ─────────────────────────────────────────────────────────────────────────────

/// Cuts the source into at most `thread_count` contiguous blocks of equal
/// size, rounded up to [`BLOCK_ROUNDING`]; the last block takes whatever
/// remains. Empty input yields no blocks.
fn partition(src: &[u8], thread_count: usize) -> Vec<&[u8]> {
    if src.is_empty() {
        return Vec::new();
    }
    let granule = BLOCK_ROUNDING * thread_count;
    let block_size = (src.len() + granule - 1) / granule * BLOCK_ROUNDING;

    let mut blocks = Vec::with_capacity(thread_count);
    let mut start = 0;
    while start < src.len() {
        let end = (start + block_size).min(src.len());
        blocks.push(&src[start..end]);
        start = end;
    }
    blocks
}

// ─────────────────────────────────────────────────────────────────────────────
// Stitching
// ─────────────────────────────────────────────────────────────────────────────

/// Joins intermediate block streams into the final container.
fn stitch(blocks: &[Vec<u8>], capacity_hint: usize) -> Result<Vec<u8>, WadError> {
    let mut dst = ByteSink::with_capacity(capacity_hint);
    Header::write_placeholder(&mut dst);

    for (index, stream) in blocks.iter().enumerate() {
        let mut offset = 0;
        // A seam dummy keeps the no-adjacent-literals rule across blocks;
        // a block that emitted nothing needs none.
        let mut seam_pending = index > 0;
        while offset < stream.len() {
            let size = packet_length(&stream[offset..])?;
            let seam = if seam_pending { DUMMY_PACKET.len() } else { 0 };
            if crosses_window(dst.len(), seam + size) {
                emit_pad(&mut dst);
            }
            if seam_pending {
                dst.extend(&DUMMY_PACKET);
                seam_pending = false;
            }
            dst.extend(&stream[offset..offset + size]);
            offset += size;
        }
    }

    if dst.len() > u32::MAX as usize {
        return Err(WadError::InvalidParameter(
            "stream exceeds the 32-bit size field",
        ));
    }
    let total = dst.len() as u32;
    dst.patch_u32_le(TOTAL_SIZE_OFFSET, total);
    Ok(dst.into_vec())
}

/// True when `size` more bytes would straddle the next window boundary.
/// Windows are measured from the end of the header, and the last three
/// bytes of every window stay free so a pad packet always fits.
fn crosses_window(pos: usize, size: usize) -> bool {
    (pos + PAD_WINDOW - HEADER_SIZE) % PAD_WINDOW + size > PAD_WINDOW - 3
}

/// Writes a pad packet and fills with [`PAD_FILL`] up to the next window
/// boundary.
fn emit_pad(dst: &mut ByteSink) {
    dst.extend(&PAD_PACKET);
    while dst.len() % PAD_WINDOW != HEADER_SIZE {
        dst.push(PAD_FILL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_rounds_blocks_to_256() {
        let src = vec![0u8; 4096];
        let blocks = partition(&src, 4);
        assert_eq!(blocks.len(), 4);
        assert!(blocks.iter().all(|b| b.len() == 1024));

        let src = vec![0u8; 1000];
        let blocks = partition(&src, 4);
        // ceil(1000 / 1024) * 256 = 256 per block.
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].len(), 256);
        assert_eq!(blocks[3].len(), 1000 - 3 * 256);

        assert!(partition(&[], 8).is_empty());
    }

    #[test]
    fn window_check_reserves_three_bytes() {
        // Fresh stream: the first window has 0x2000 - 3 usable bytes.
        assert!(!crosses_window(HEADER_SIZE, PAD_WINDOW - 3));
        assert!(crosses_window(HEADER_SIZE, PAD_WINDOW - 2));
        // One byte into the window.
        assert!(crosses_window(HEADER_SIZE + 1, PAD_WINDOW - 3));
    }

    #[test]
    fn pad_realigns_to_the_window_boundary() {
        let mut dst = ByteSink::new();
        dst.extend(&vec![0u8; 0x2001]);
        emit_pad(&mut dst);
        assert_eq!(dst.len(), 0x4010);
    }

    #[test]
    fn compress_bound_covers_small_inputs() {
        for size in [0usize, 1, 255, 256, 4096] {
            let src: Vec<u8> = (0..size).map(|i| (i * 31 % 253) as u8).collect();
            let out = compress(&src, 1).unwrap();
            assert!(
                out.len() <= compress_bound(size),
                "bound {} too small for actual {} at size {}",
                compress_bound(size),
                out.len(),
                size
            );
        }
    }
}
