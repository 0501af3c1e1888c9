//! Bounded-window longest-match search for the per-block encoder.

use crate::packet::{MAX_ENCODED_MATCH, MAX_LITERAL, MAX_LOOKBACK, MIN_MATCH};

/// Result of one search step: emit `literal_size` raw bytes starting at the
/// search position, then (when `match_size > 0`) a match of `match_size`
/// bytes whose source starts at block offset `match_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMatch {
    pub literal_size: usize,
    pub match_offset: usize,
    pub match_size: usize,
}

/// Scans forward from `pos` for the next encodable match within `block`.
///
/// For each candidate target position the full lookback window (up to
/// 16 KiB behind the target, never before the block start) is scanned in
/// ascending order, and a candidate replaces the best on an equal or longer
/// match — among equal lengths the smallest lookback wins, which keeps
/// matches inside the compact little-match encoding whenever possible. The
/// search stops at the first target that yields any match of at least
/// [`MIN_MATCH`] bytes; if none exists within the literal budget, the whole
/// budget is returned as a literal run.
///
/// A match target needs `MIN_MATCH` bytes of in-block history, so the first
/// bytes of a block always come out as literals.
///
/// `end_of_buffer` selects the fully clamped tail path; everywhere else a
/// 16-bit prefix filter rejects most candidates before the byte loop runs.
pub fn find_run(block: &[u8], pos: usize, end: usize, end_of_buffer: bool) -> RunMatch {
    debug_assert!(pos < end && end <= block.len());

    let budget = MAX_LITERAL.min(end - pos);
    let first = MIN_MATCH.saturating_sub(pos);

    for i in first..budget {
        let target = pos + i;
        let cap = MAX_ENCODED_MATCH.min(end - target);
        if cap < MIN_MATCH {
            // Too close to the block end for any further match.
            break;
        }

        let window_start = target.saturating_sub(MAX_LOOKBACK);
        let mut best_size = 0;
        let mut best_offset = 0;

        if end_of_buffer {
            for candidate in window_start..target {
                let size = run_length(block, candidate, target, cap);
                if size >= MIN_MATCH && size >= best_size {
                    best_size = size;
                    best_offset = candidate;
                }
            }
        } else {
            let prefix = u16::from_le_bytes([block[target], block[target + 1]]);
            for candidate in window_start..target {
                if u16::from_le_bytes([block[candidate], block[candidate + 1]]) != prefix {
                    continue;
                }
                let size = run_length(block, candidate, target, cap);
                if size >= MIN_MATCH && size >= best_size {
                    best_size = size;
                    best_offset = candidate;
                }
            }
        }

        if best_size >= MIN_MATCH {
            return RunMatch {
                literal_size: i,
                match_offset: best_offset,
                match_size: best_size,
            };
        }
    }

    RunMatch {
        literal_size: budget,
        match_offset: 0,
        match_size: 0,
    }
}

/// Length of the common run between `block[candidate..]` and
/// `block[target..]`, capped at `cap`. The comparison may run into the
/// region after `target`, which is how a short lookback yields a long
/// repeating match.
#[inline]
fn run_length(block: &[u8], candidate: usize, target: usize, cap: usize) -> usize {
    let mut size = 0;
    while size < cap && block[candidate + size] == block[target + size] {
        size += 1;
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_opens_with_a_seed_run() {
        let block = [1u8; 10];
        let run = find_run(&block, 0, block.len(), true);
        assert_eq!(
            run,
            RunMatch {
                literal_size: 3,
                match_offset: 2,
                match_size: 7,
            }
        );
    }

    #[test]
    fn no_match_returns_the_full_budget() {
        // 250 distinct byte values: no 3-byte window repeats anywhere.
        let block: Vec<u8> = (0u8..250).collect();
        let run = find_run(&block, 0, block.len(), true);
        assert_eq!(run.match_size, 0);
        assert_eq!(run.literal_size, block.len());
    }

    #[test]
    fn equal_length_candidates_prefer_the_short_lookback() {
        // Offsets 0 and 4 both match "abc" for exactly 3 bytes; the later
        // candidate (smaller lookback) must win the tie.
        let block: Vec<u8> = b"abcXabcYabcabc".to_vec();
        let run = find_run(&block, 8, block.len(), true);
        assert_eq!(run.literal_size, 0);
        assert_eq!(run.match_size, 3);
        assert_eq!(run.match_offset, 4);
    }

    #[test]
    fn match_never_crosses_the_encoding_end() {
        // Plenty of repetition, but `end` cuts the block short.
        let block = [7u8; 64];
        let run = find_run(&block, 0, 16, true);
        assert_eq!(run.literal_size, 3);
        assert_eq!(run.match_size, 13);
    }
}
