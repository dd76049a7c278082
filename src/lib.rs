//! # Finite State Entropy (FSE)
//!
//! *A tabled Asymmetric Numeral Systems (tANS) block codec.*
//!
//! ## Intuition First
//!
//! An entropy coder wants to spend few bits on frequent symbols and more bits
//! on rare ones. Huffman coding does this with a prefix tree, but it can only
//! assign whole-bit code lengths. FSE instead keeps a single integer *state*
//! that acts like a partially filled bucket of fractional bits: encoding a
//! symbol pushes the state through a precomputed transition table, spilling
//! whole bits to the output only when the bucket would overflow. Frequent
//! symbols get many table slots (small state growth, few bits), rare symbols
//! get few slots (large growth, more bits), and the average cost lands within
//! a hair of the Shannon entropy.
//!
//! ## The Problem
//!
//! Before ANS, the practical choices were:
//! - **Huffman coding**: fast, but rounds every probability to a power of two.
//! - **Arithmetic coding**: rate-optimal, but needs multiplications and
//!   divisions in the symbol loop.
//!
//! tANS closes the gap: arithmetic-coding compression at table-lookup speed.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon   Entropy as the fundamental limit
//! 1952  Huffman   Optimal prefix codes, whole-bit granularity
//! 1976  Rissanen  Arithmetic coding reaches the entropy bound
//! 2007  Duda      Asymmetric Numeral Systems unify speed and rate
//! 2013  Collet    FSE: the first production-quality tANS implementation
//! 2014  Facebook  zstd builds its entropy stage on FSE
//! ```
//!
//! ## Mathematical Formulation
//!
//! With symbol probabilities approximated as $p_s = n_s / 2^R$ (the
//! *normalized counts* $n_s$ sum to the table size $2^R$), the encoder keeps a
//! state $x \in [2^R, 2^{R+1})$ and, per symbol, emits
//! $b = \lfloor \log_2(x / n_s) \rfloor$ low bits of $x$ before jumping to the
//! successor state of row $x \gg b$ inside the symbol's slot range. The cost
//! per symbol is within one table-quantization step of $-\log_2 p_s$.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(1)$ per symbol for both encode and decode (one table lookup,
//!   one shift, one masked bit splice).
//! - **Space**: $O(2^R)$ table entries, with $R \le 12$ here.
//!
//! ## Failure Modes
//!
//! 1. **Incompressible data**: uniform bytes cost slightly more than 8 bits
//!    per byte once the table header is paid for; the block layer detects this
//!    and stores the block raw.
//! 2. **Tiny blocks**: the header overhead dominates below a few dozen bytes;
//!    again the raw fallback bounds the damage to one byte.
//!
//! ## Implementation Notes
//!
//! The crate is a pipeline of small modules:
//! - [`histogram`]: symbol frequency scan,
//! - [`normalize`]: scale counts to sum exactly to a power of two,
//! - [`header`]: the self-describing serialized form of those counts,
//! - [`table`]: compression and decompression table construction,
//! - [`bitstream`] and [`stream`]: the bit containers and the state-machine
//!   loop that drives them over a whole block,
//! - [`block`]: the three-format block layer on top.
//!
//! Encoding walks the source **in reverse** so that decoding, which mirrors
//! every state transition, emits symbols in natural order. All per-block
//! state lives on the call stack or in short-lived vectors; nothing persists
//! between blocks and no global state exists.
//!
//! ## References
//!
//! - Duda, J. (2009). "Asymmetric numeral systems: entropy coding combining
//!   speed of Huffman coding with compression rate of arithmetic coding."
//! - Collet, Y. (2013). "Finite State Entropy, a new breed of entropy coder."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod block;
pub mod error;
pub mod header;
pub mod histogram;
pub mod normalize;
pub mod stream;
pub mod table;

pub use block::{
    compress, compress_bound, compress_with, compress_with_stats, decompress, decompress_into,
    decompress_safe, header_bound, BlockStats,
};
pub use error::Error;
pub use table::{CompressTable, DecompressTable};

/// Log2 of the memory budget for state tables. `14` keeps the largest table
/// (16 KiB of decode entries) inside a typical L1 data cache.
pub const MEMORY_LOG: u32 = 14;

/// Hard ceiling on the state-space precision. Derived from the memory budget;
/// the wire format itself could express up to 15 but this build caps at 12.
pub const MAX_TABLE_LOG: u32 = MEMORY_LOG - 2;

/// Smallest usable state-space precision.
pub const MIN_TABLE_LOG: u32 = 5;

/// Largest state-space size, in slots.
pub const MAX_TABLE_SIZE: usize = 1 << MAX_TABLE_LOG;

/// Ceiling on the alphabet: the block codec works on bytes.
pub const MAX_SYMBOLS: usize = 256;

// The descriptor word and the u16 state tables both break past 15.
const _: () = assert!(MAX_TABLE_LOG <= 15);
const _: () = assert!(MIN_TABLE_LOG >= 5);
