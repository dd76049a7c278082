//! Whole-block compression: header, stream, and the fallback formats.
//!
//! A block is one of three formats, tagged by the low two bits of its first
//! byte. Incompressible or tiny blocks are stored raw behind a one-byte tag;
//! single-symbol blocks collapse to two bytes; everything else carries a
//! table header followed by the entropy-coded stream.

use crate::error::{Error, Result};
use crate::header::{read_header, write_header};
use crate::histogram;
use crate::normalize::normalize_count;
use crate::stream::{compress_using_ctable, decompress_using_dtable_safe};
use crate::table::{CompressTable, DecompressTable};

/// Worst-case serialized table header, in bytes.
const MAX_HEADER_BYTES: usize = 512;

/// Largest block the stream descriptor can describe.
const MAX_BLOCK_BYTES: usize = (1 << 27) - MAX_HEADER_BYTES;

/// Worst-case compressed size for a block of `size` source bytes.
pub fn compress_bound(size: usize) -> usize {
    size + MAX_HEADER_BYTES
}

/// Upper bound on the serialized table header for `nb_symbols` symbols.
/// `0` means the full byte alphabet.
pub fn header_bound(nb_symbols: usize) -> usize {
    if nb_symbols == 0 {
        MAX_HEADER_BYTES
    } else {
        nb_symbols * 2 + 1
    }
}

/// Per-block observability record.
///
/// Returned alongside the compressed bytes instead of being accumulated in
/// process-wide counters, so concurrent blocks never share state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlockStats {
    /// Source bytes in the block.
    pub uncompressed_bytes: usize,
    /// Bytes spent on framing: the format tag or the serialized table header.
    pub header_bytes: usize,
    /// Bytes of payload following the framing.
    pub payload_bytes: usize,
    /// Shannon entropy of the source block, in bits.
    pub entropy_bits: f64,
}

fn entropy_bits(counts: &[u32], total: usize) -> f64 {
    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| c as f64 * (total / c as f64).log2())
        .sum()
}

fn store_raw(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + 1);
    out.push(0u8);
    out.extend_from_slice(src);
    out
}

fn store_rle(symbol: u8) -> Vec<u8> {
    vec![1u8, symbol]
}

/// Compress one block with default settings.
pub fn compress(src: &[u8]) -> Result<Vec<u8>> {
    compress_with(src, 0, 0)
}

/// Compress one block, constraining the alphabet and the table precision.
///
/// `nb_symbols` promises every source byte is below that value (`0` for the
/// full byte range); `table_log` requests a precision (`0` for default).
pub fn compress_with(src: &[u8], nb_symbols: usize, table_log: u32) -> Result<Vec<u8>> {
    compress_with_stats(src, nb_symbols, table_log).map(|(out, _)| out)
}

/// Compress one block and report per-block statistics.
pub fn compress_with_stats(
    src: &[u8],
    nb_symbols: usize,
    table_log: u32,
) -> Result<(Vec<u8>, BlockStats)> {
    if src.is_empty() {
        return Err(Error::InvalidParameter("empty input"));
    }
    if src.len() > MAX_BLOCK_BYTES {
        return Err(Error::InvalidParameter("block too large"));
    }

    let mut stats = BlockStats {
        uncompressed_bytes: src.len(),
        ..BlockStats::default()
    };

    if src.len() == 1 {
        stats.header_bytes = 1;
        stats.payload_bytes = 1;
        return Ok((store_raw(src), stats));
    }

    let hist = histogram::count(src, nb_symbols)?;
    stats.entropy_bits = entropy_bits(hist.counts(), src.len());

    if hist.nb_symbols() == 1 {
        // Only symbol zero occurs.
        stats.header_bytes = 1;
        stats.payload_bytes = 1;
        return Ok((store_rle(src[0]), stats));
    }

    let norm = match normalize_count(hist.counts(), src.len() as u32, table_log)? {
        None => {
            stats.header_bytes = 1;
            stats.payload_bytes = 1;
            return Ok((store_rle(src[0]), stats));
        }
        Some(norm) => norm,
    };

    let mut out = Vec::with_capacity(compress_bound(src.len()));
    stats.header_bytes = write_header(&mut out, &norm.counts, norm.table_log)?;

    let ctable = CompressTable::new(&norm.counts, norm.table_log)?;
    stats.payload_bytes = compress_using_ctable(&mut out, src, &ctable)?;

    // Not worth it: ship the block raw for one byte of overhead.
    if out.len() >= src.len() - 1 {
        stats.header_bytes = 1;
        stats.payload_bytes = src.len();
        return Ok((store_raw(src), stats));
    }

    Ok((out, stats))
}

/// Decompress one block of known original size, returning the bytes.
pub fn decompress(src: &[u8], original_size: usize) -> Result<Vec<u8>> {
    let mut dst = vec![0u8; original_size];
    decompress_into(&mut dst, src)?;
    Ok(dst)
}

/// Decompress one block into `dst`, regenerating exactly `dst.len()` bytes.
/// Returns how many bytes of `src` the block occupied.
pub fn decompress_into(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    decompress_block(dst, src, src.len())
}

/// Like [`decompress_into`], refusing to read past `src_capacity` bytes of
/// `src` regardless of what the block claims about itself.
pub fn decompress_safe(dst: &mut [u8], src: &[u8], src_capacity: usize) -> Result<usize> {
    decompress_block(dst, src, src_capacity.min(src.len()))
}

fn decompress_block(dst: &mut [u8], src: &[u8], limit: usize) -> Result<usize> {
    if limit < 2 {
        return Err(Error::SourceOverrun);
    }

    match src[0] {
        0 => {
            let used = dst.len() + 1;
            if used > limit {
                return Err(Error::SourceOverrun);
            }
            dst.copy_from_slice(&src[1..used]);
            Ok(used)
        }
        1 => {
            dst.fill(src[1]);
            Ok(2)
        }
        tag if tag & 3 == 2 => {
            let parsed = read_header(&src[..limit])?;
            let dtable = DecompressTable::new(&parsed.norm, parsed.table_log)?;
            let payload = &src[parsed.consumed..limit];
            let stream_len =
                decompress_using_dtable_safe(dst, payload, &dtable, payload.len())?;
            Ok(parsed.consumed + stream_len)
        }
        _ => Err(Error::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let compressed = compress(data).unwrap();
        decompress(&compressed, data.len()).unwrap()
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert_eq!(compress(&[]), Err(Error::InvalidParameter("empty input")));
    }

    #[test]
    fn test_single_byte_stores_raw() {
        let compressed = compress(&[0x41]).unwrap();
        assert_eq!(compressed, vec![0x00, 0x41]);
        assert_eq!(decompress(&compressed, 1).unwrap(), vec![0x41]);
    }

    #[test]
    fn test_repeated_byte_collapses_to_rle() {
        let data = [0x41u8; 8];
        let compressed = compress(&data).unwrap();
        assert_eq!(compressed, vec![0x01, 0x41]);
        assert_eq!(decompress(&compressed, 8).unwrap(), data.to_vec());
    }

    #[test]
    fn test_rle_applies_at_any_length() {
        for len in [2usize, 3, 100, 10_000] {
            let data = vec![0x7Au8; len];
            let compressed = compress(&data).unwrap();
            assert_eq!(compressed.len(), 2);
            assert_eq!(decompress(&compressed, len).unwrap(), data);
        }
    }

    #[test]
    fn test_skewed_text_compresses_and_roundtrips() {
        let mut data = Vec::new();
        while data.len() < 4096 {
            data.extend_from_slice(b"aaaaaaaabbbbccdd");
        }
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len() / 2);
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_stats_report_the_block_shape() {
        let mut data = Vec::new();
        while data.len() < 1024 {
            data.extend_from_slice(b"aaaaaaaabbbbccdd");
        }
        let (out, stats) = compress_with_stats(&data, 0, 0).unwrap();
        assert_eq!(stats.uncompressed_bytes, data.len());
        assert_eq!(stats.header_bytes + stats.payload_bytes, out.len());
        // 8:4:2:2 mix has exactly 1.75 bits of entropy per byte.
        let expected = 1.75 * data.len() as f64;
        assert!((stats.entropy_bits - expected).abs() < 1e-6);
    }

    #[test]
    fn test_compressed_size_tracks_entropy() {
        let mut data = Vec::new();
        while data.len() < 4096 {
            data.extend_from_slice(b"aaaaaaaabbbbccdd");
        }
        let (out, stats) = compress_with_stats(&data, 0, 0).unwrap();
        let bound = (stats.entropy_bits / 8.0) * 1.05 + MAX_HEADER_BYTES as f64 / 8.0;
        assert!((out.len() as f64) < bound + 16.0);
    }

    #[test]
    fn test_alphabet_cap_is_enforced() {
        assert!(compress_with(b"hello world", 16, 0).is_err());
        assert!(compress_with(b"hello world", 0, crate::MAX_TABLE_LOG + 1).is_err());
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let mut dst = [0u8; 4];
        assert_eq!(
            decompress_into(&mut dst, &[0x03, 0x00, 0x00]),
            Err(Error::MalformedHeader)
        );
    }

    #[test]
    fn test_truncated_raw_block_is_rejected() {
        let compressed = compress(b"x").unwrap();
        let mut dst = [0u8; 1];
        assert_eq!(
            decompress_safe(&mut dst, &compressed, 1),
            Err(Error::SourceOverrun)
        );
    }

    #[test]
    fn test_decode_of_arbitrary_bytes_never_panics() {
        // A few adversarial patterns through the safe decoder.
        let patterns: [&[u8]; 6] = [
            &[0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
            &[0x02, 0x00],
            &[0x06, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC],
            &[0xFE, 0xFF],
            &[0x02, 0x3F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            &[0x01],
        ];
        let mut dst = [0u8; 64];
        for p in patterns {
            let _ = decompress_safe(&mut dst, p, p.len());
        }
    }

    proptest! {
        #[test]
        fn prop_block_roundtrip(data in prop::collection::vec(any::<u8>(), 1..2048)) {
            prop_assert_eq!(roundtrip(&data), data);
        }

        #[test]
        fn prop_block_roundtrip_small_alphabet(
            data in prop::collection::vec(0u8..5, 1..512),
        ) {
            prop_assert_eq!(roundtrip(&data), data);
        }

        #[test]
        fn prop_incompressible_overhead_is_one_byte(
            data in prop::collection::vec(any::<u8>(), 128..1024),
        ) {
            let compressed = compress(&data).unwrap();
            prop_assert!(compressed.len() <= data.len() + 1);
        }
    }
}
