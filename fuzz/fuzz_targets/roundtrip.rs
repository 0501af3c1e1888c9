#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Keep the quadratic match search from eating the fuzz budget.
    if data.len() > 0x8000 {
        return;
    }

    let packed = wad::compress(data, 2).expect("compression never fails on valid parameters");
    let recovered = wad::decompress(&packed).expect("own streams must decode");

    assert_eq!(
        recovered,
        data,
        "round-trip mismatch: {} bytes compressed to {} bytes",
        data.len(),
        packed.len()
    );
});
