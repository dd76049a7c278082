//! Encode and decode table construction.
//!
//! Both tables start from the same deterministic *spread*: a stride walk that
//! scatters each symbol's slots across the state space so that consecutive
//! occurrences of a symbol land far apart. The walk is part of the wire
//! contract; encoder and decoder must agree on it bit for bit.

use crate::bitstream::{BackwardBits, ForwardBits};
use crate::error::{Error, Result};
use crate::{MAX_SYMBOLS, MAX_TABLE_LOG};

/// Assign a symbol identity to every slot of a `1 << table_log` state space.
///
/// Walks the table with stride `(size >> 1) + (size >> 3) + 3`, which is
/// coprime to every power-of-two size, so the walk visits each slot exactly
/// once and finishes back at slot zero. Counts that do not sum to the table
/// size are rejected.
pub fn spread_symbols(norm: &[u32], table_log: u32) -> Result<Vec<u8>> {
    let table_size = 1usize << table_log;
    let step = (table_size >> 1) + (table_size >> 3) + 3;
    let mask = table_size - 1;

    let mut spread = vec![0u8; table_size];
    let mut position = 0usize;
    for (s, &n) in norm.iter().enumerate() {
        for _ in 0..n {
            spread[position] = s as u8;
            position = (position + step) & mask;
        }
    }
    if position != 0 {
        return Err(Error::InvalidParameter(
            "normalized counts do not sum to table size",
        ));
    }
    Ok(spread)
}

fn check_table_params(norm: &[u32], table_log: u32) -> Result<()> {
    if norm.len() > MAX_SYMBOLS {
        return Err(Error::InvalidParameter("alphabet larger than 256"));
    }
    if table_log > MAX_TABLE_LOG {
        return Err(Error::InvalidParameter("table log too large"));
    }
    Ok(())
}

/// Per-symbol encoding transform.
///
/// `min_bits_out` is the fewest bits a state emits for this symbol;
/// states above `max_state` emit one more. `delta_find_state` relocates the
/// shifted state into the symbol's row group of the next-state table.
#[derive(Clone, Copy, Debug, Default)]
struct SymbolTransform {
    delta_find_state: i32,
    max_state: u16,
    min_bits_out: u8,
}

/// Precomputed transition tables for encoding one block.
///
/// Rows of `next_state` are grouped by symbol; within a group, the k-th row
/// is the state reached after emitting that symbol from the k-th lowest
/// eligible source state.
#[derive(Clone, Debug)]
pub struct CompressTable {
    table_log: u32,
    next_state: Vec<u16>,
    symbol_tt: Vec<SymbolTransform>,
}

impl CompressTable {
    /// Build the encode table from normalized counts.
    pub fn new(norm: &[u32], table_log: u32) -> Result<Self> {
        check_table_params(norm, table_log)?;
        let table_size = 1usize << table_log;
        let spread = spread_symbols(norm, table_log)?;

        // Running start offset of each symbol's row group.
        let mut cumul = vec![0u32; norm.len()];
        let mut acc = 0u32;
        for (c, &n) in cumul.iter_mut().zip(norm.iter()) {
            *c = acc;
            acc += n;
        }

        let mut next_state = vec![0u16; table_size];
        for (i, &sym) in spread.iter().enumerate() {
            let s = sym as usize;
            next_state[cumul[s] as usize] = (table_size + i) as u16;
            cumul[s] += 1;
        }

        let mut symbol_tt = vec![SymbolTransform::default(); norm.len()];
        let mut total: i32 = 0;
        for (tt, &n) in symbol_tt.iter_mut().zip(norm.iter()) {
            match n {
                0 => {} // never referenced
                1 => {
                    *tt = SymbolTransform {
                        min_bits_out: table_log as u8,
                        delta_find_state: total - 1,
                        max_state: (table_size * 2 - 1) as u16,
                    };
                    total += 1;
                }
                n => {
                    let min_bits = (table_log - 1) - (n - 1).ilog2();
                    *tt = SymbolTransform {
                        min_bits_out: min_bits as u8,
                        delta_find_state: total - n as i32,
                        max_state: ((n << (min_bits + 1)) - 1) as u16,
                    };
                    total += n as i32;
                }
            }
        }

        Ok(Self {
            table_log,
            next_state,
            symbol_tt,
        })
    }

    /// The precision this table was built for.
    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    /// Encode one symbol: emit the state's low bits and transition.
    ///
    /// `symbol` must be inside the alphabet this table was built from.
    #[inline]
    pub fn encode_symbol(&self, state: &mut u32, bits: &mut ForwardBits, symbol: u8) {
        let tt = self.symbol_tt[symbol as usize];
        let nb_bits = tt.min_bits_out as u32 + (*state > tt.max_state as u32) as u32;
        bits.add_bits(*state, nb_bits);
        let row = (*state >> nb_bits) as i32 + tt.delta_find_state;
        *state = self.next_state[row as usize] as u32;
    }
}

/// One slot of the decoding table.
#[derive(Clone, Copy, Debug, Default)]
struct DecodeEntry {
    new_state: u16,
    symbol: u8,
    nb_bits: u8,
}

/// Precomputed transition table for decoding one block.
#[derive(Clone, Debug)]
pub struct DecompressTable {
    table_log: u32,
    entries: Vec<DecodeEntry>,
}

impl DecompressTable {
    /// Build the decode table from normalized counts.
    pub fn new(norm: &[u32], table_log: u32) -> Result<Self> {
        check_table_params(norm, table_log)?;
        let table_size = 1u32 << table_log;
        let spread = spread_symbols(norm, table_log)?;

        let mut entries = vec![DecodeEntry::default(); table_size as usize];
        for (entry, &sym) in entries.iter_mut().zip(spread.iter()) {
            entry.symbol = sym;
        }

        // The k-th slot of a symbol (in table order) maps back to precursor
        // state norm[s] + k; the bit count is whatever lifts that precursor
        // back into the full state range.
        let mut symbol_next: Vec<u32> = norm.to_vec();
        for entry in entries.iter_mut() {
            let s = entry.symbol as usize;
            let precursor = symbol_next[s];
            symbol_next[s] += 1;
            let nb_bits = table_log - precursor.ilog2();
            entry.nb_bits = nb_bits as u8;
            entry.new_state = ((precursor << nb_bits) - table_size) as u16;
        }

        Ok(Self { table_log, entries })
    }

    /// The precision this table was built for.
    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    /// Decode one symbol: look up the slot, absorb fresh bits, transition.
    #[inline]
    pub fn decode_symbol(&self, state: &mut u32, bits: &mut BackwardBits<'_>) -> u8 {
        let entry = self.entries[*state as usize];
        let rest = bits.read_bits(entry.nb_bits as u32);
        *state = entry.new_state as u32 + rest;
        entry.symbol
    }
}
