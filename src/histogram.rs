//! Symbol frequency scanning.
//!
//! Counting is the cheapest stage of the pipeline but sits on the critical
//! path of every block, so the scan runs four accumulator lanes over
//! interleaved bytes. Consecutive bytes often repeat, and a single counter
//! array would serialize those increments behind store-to-load forwarding;
//! four lanes let the CPU retire them independently.

use crate::error::{Error, Result};
use crate::MAX_SYMBOLS;

/// Per-symbol frequencies of a source block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: [u32; MAX_SYMBOLS],
    nb_symbols: usize,
}

impl Histogram {
    /// Frequencies of the used alphabet, `0..nb_symbols`.
    pub fn counts(&self) -> &[u32] {
        &self.counts[..self.nb_symbols]
    }

    /// Highest symbol value present in the block, plus one.
    pub fn nb_symbols(&self) -> usize {
        self.nb_symbols
    }
}

/// Count symbol occurrences in `src`.
///
/// `max_symbols` caps the alphabet; `0` means the full byte range. A symbol
/// at or above the cap is an error rather than silent corruption.
pub fn count(src: &[u8], max_symbols: usize) -> Result<Histogram> {
    if src.is_empty() {
        return Err(Error::InvalidParameter("empty input"));
    }
    let max_symbols = if max_symbols == 0 { MAX_SYMBOLS } else { max_symbols };
    if max_symbols > MAX_SYMBOLS {
        return Err(Error::InvalidParameter("alphabet larger than 256"));
    }

    let mut lane1 = [0u32; MAX_SYMBOLS];
    let mut lane2 = [0u32; MAX_SYMBOLS];
    let mut lane3 = [0u32; MAX_SYMBOLS];
    let mut lane4 = [0u32; MAX_SYMBOLS];

    let mut quads = src.chunks_exact(4);
    for quad in quads.by_ref() {
        lane1[quad[0] as usize] += 1;
        lane2[quad[1] as usize] += 1;
        lane3[quad[2] as usize] += 1;
        lane4[quad[3] as usize] += 1;
    }
    for &b in quads.remainder() {
        lane1[b as usize] += 1;
    }

    let mut counts = [0u32; MAX_SYMBOLS];
    for s in 0..MAX_SYMBOLS {
        counts[s] = lane1[s] + lane2[s] + lane3[s] + lane4[s];
    }

    if counts[max_symbols..].iter().any(|&c| c != 0) {
        return Err(Error::InvalidParameter("symbol above declared alphabet"));
    }

    let mut nb_symbols = max_symbols;
    while counts[nb_symbols - 1] == 0 {
        nb_symbols -= 1;
    }

    Ok(Histogram { counts, nb_symbols })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_count_matches_naive() {
        let data = b"abracadabra, a cadaver arcade";
        let hist = count(data, 0).unwrap();
        let mut naive = [0u32; 256];
        for &b in data.iter() {
            naive[b as usize] += 1;
        }
        assert_eq!(&naive[..hist.nb_symbols()], hist.counts());
    }

    #[test]
    fn test_count_trims_alphabet() {
        let hist = count(&[5, 5, 2, 5], 0).unwrap();
        assert_eq!(hist.nb_symbols(), 6);
        assert_eq!(hist.counts(), &[0, 0, 1, 0, 0, 3]);
    }

    #[test]
    fn test_count_single_symbol_zero() {
        let hist = count(&[0, 0, 0], 0).unwrap();
        assert_eq!(hist.nb_symbols(), 1);
        assert_eq!(hist.counts(), &[3]);
    }

    #[test]
    fn test_count_empty_is_error() {
        assert_eq!(count(&[], 0), Err(Error::InvalidParameter("empty input")));
    }

    #[test]
    fn test_count_rejects_symbol_above_cap() {
        assert!(count(&[1, 2, 99], 16).is_err());
    }

    proptest! {
        #[test]
        fn prop_count_sums_to_len(data in prop::collection::vec(any::<u8>(), 1..2048)) {
            let hist = count(&data, 0).unwrap();
            let total: u32 = hist.counts().iter().sum();
            prop_assert_eq!(total as usize, data.len());
        }

        #[test]
        fn prop_count_lane_remainder(len in 1usize..64) {
            // Every length mod 4 exercises a different remainder path.
            let data: Vec<u8> = (0..len).map(|i| (i % 7) as u8).collect();
            let hist = count(&data, 0).unwrap();
            let total: u32 = hist.counts().iter().sum();
            prop_assert_eq!(total as usize, len);
        }
    }
}
