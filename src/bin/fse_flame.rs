use fse::{compress, decompress};

fn main() {
    // Steady-state hot loop for flamegraph runs: one 64 KiB skewed block,
    // compressed and decompressed a thousand times.
    let data: Vec<u8> = (0..64 * 1024)
        .map(|i: u32| {
            let phase = i.wrapping_mul(2654435761) >> 28;
            match phase {
                0..=7 => b'a',
                8..=11 => b'b',
                12..=13 => b'c',
                _ => b'd',
            }
        })
        .collect();

    for _ in 0..1000 {
        let compressed = compress(&data).unwrap();
        let restored = decompress(&compressed, data.len()).unwrap();
        assert_eq!(restored.len(), data.len());
    }
}
