#![no_main]
use fse::decompress_safe;
use libfuzzer_sys::fuzz_target;

// The safe decoder must reject or decode arbitrary bytes without panicking,
// looping, or reading past the declared capacity.
fuzz_target!(|input: (Vec<u8>, u16)| {
    let (data, out_len) = input;
    let mut dst = vec![0u8; out_len as usize];
    let _ = decompress_safe(&mut dst, &data, data.len());
});
