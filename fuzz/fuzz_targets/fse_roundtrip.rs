#![no_main]
use fse::{compress, decompress};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let compressed = compress(data).expect("non-empty blocks always compress");
    assert!(compressed.len() <= data.len() + 1);

    let restored = decompress(&compressed, data.len()).expect("own output must decode");
    assert_eq!(restored, data);
});
