#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes through the decompressor. Err results are
    // expected and fine; what we verify is no panics and no runaway output.
    let _ = wad::decompress(data);
    let _ = wad::decompress_n(data, 64);
    let _ = wad::packet_length(data);
});
