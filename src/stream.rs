//! The tANS stream codec: drives the state machine over a whole block.
//!
//! Encoding walks the source back to front, so the decoder, which unwinds
//! each transition, produces symbols front to back. A 32-bit descriptor is
//! reserved ahead of the payload and patched on close; it records the stream
//! length in bytes, the pad-bit count of the final byte, and how many
//! interleaved states the encoder ran.
//!
//! Two states run in lockstep on alternating symbols by default. They share
//! one table and one bit container; the interleave only exists to give the
//! CPU two independent dependency chains. Each state also absorbs one
//! trailing source byte into its initial value, which rides along for free
//! inside the `table_log` bits the final state flush already pays for.

use crate::bitstream::{BackwardBits, ForwardBits};
use crate::error::{Error, Result};
use crate::table::{CompressTable, DecompressTable};

const DESCRIPTOR_BYTES: usize = 4;

/// Byte length is a 27-bit field inside the descriptor.
const MAX_STREAM_BYTES: usize = (1 << 27) - 1;

/// Interleaved states used by the encoder. The decoder accepts 1 or 2.
const ILP_STATES: usize = 2;

/// Entropy-code `src` with a prebuilt table, appending descriptor plus
/// payload to `out`. Returns the bytes written.
///
/// Every byte of `src` must belong to the alphabet the table was built
/// from; feeding a symbol outside it is a caller bug and panics.
pub fn compress_using_ctable(out: &mut Vec<u8>, src: &[u8], ct: &CompressTable) -> Result<usize> {
    let nb_states = if src.len() >= ILP_STATES { ILP_STATES } else { 1 };
    compress_streams(out, src, ct, nb_states)
}

fn compress_streams(
    out: &mut Vec<u8>,
    src: &[u8],
    ct: &CompressTable,
    nb_states: usize,
) -> Result<usize> {
    debug_assert!(nb_states == 1 || nb_states == 2);
    if src.len() < nb_states {
        return Err(Error::InvalidParameter("block shorter than state count"));
    }

    let descriptor_at = out.len();
    out.extend_from_slice(&[0u8; DESCRIPTOR_BYTES]);

    let table_size = 1u32 << ct.table_log();
    let mut bits = ForwardBits::new();
    let mut ip = src.len();

    // Cheap last-symbol storage: the trailing byte per state rides in the
    // initial state value (valid because nb_symbols <= table_size).
    ip -= 1;
    let mut state1 = table_size + src[ip] as u32;
    let mut state2 = state1;
    if nb_states >= 2 {
        ip -= 1;
        state2 = table_size + src[ip] as u32;
    }

    // Catch-up preamble: odd leftover symbols run on the first state alone
    // so the main loop always consumes an exact pair.
    let mut catchup = (src.len() - nb_states) % 2;
    while catchup > 0 {
        ip -= 1;
        ct.encode_symbol(&mut state1, &mut bits, src[ip]);
        bits.flush(out);
        catchup -= 1;
    }

    while ip > 0 {
        ip -= 1;
        ct.encode_symbol(&mut state1, &mut bits, src[ip]);
        ip -= 1;
        if nb_states >= 2 {
            ct.encode_symbol(&mut state2, &mut bits, src[ip]);
        } else {
            ct.encode_symbol(&mut state1, &mut bits, src[ip]);
        }
        bits.flush(out);
    }

    // Flush the final state of every stream, last state first, so the
    // decoder pops state one off the top of the stream end.
    if nb_states >= 2 {
        bits.add_bits(state2, ct.table_log());
        bits.flush(out);
    }
    bits.add_bits(state1, ct.table_log());
    bits.flush(out);
    let pad_bits = bits.finish(out);

    let written = out.len() - descriptor_at;
    if written > MAX_STREAM_BYTES {
        return Err(Error::InvalidParameter("block too large for descriptor"));
    }
    let descriptor =
        ((written as u32) << 3) + pad_bits + (((nb_states as u32) - 1) << 30);
    out[descriptor_at..descriptor_at + DESCRIPTOR_BYTES]
        .copy_from_slice(&descriptor.to_le_bytes());

    Ok(written)
}

/// Decode an entropy-coded stream (descriptor included) into `dst`,
/// regenerating exactly `dst.len()` symbols. Returns the bytes consumed.
pub fn decompress_using_dtable(
    dst: &mut [u8],
    src: &[u8],
    dt: &DecompressTable,
) -> Result<usize> {
    decompress_streams(dst, src, dt, src.len())
}

/// Like [`decompress_using_dtable`], refusing to read past `src_capacity`
/// bytes of `src` no matter what the stream descriptor claims.
pub fn decompress_using_dtable_safe(
    dst: &mut [u8],
    src: &[u8],
    dt: &DecompressTable,
    src_capacity: usize,
) -> Result<usize> {
    decompress_streams(dst, src, dt, src_capacity)
}

fn decompress_streams(
    dst: &mut [u8],
    src: &[u8],
    dt: &DecompressTable,
    src_capacity: usize,
) -> Result<usize> {
    if src.len() < DESCRIPTOR_BYTES || src_capacity < DESCRIPTOR_BYTES {
        return Err(Error::SourceOverrun);
    }
    let descriptor = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
    let nb_states = ((descriptor >> 30) + 1) as usize;
    if nb_states > 2 {
        return Err(Error::CorruptStream);
    }
    let body = descriptor & 0x3FFF_FFFF;
    let pad_bits = body & 7;
    let stream_bytes = (body >> 3) as usize;
    if stream_bytes > src_capacity || stream_bytes > src.len() {
        return Err(Error::SourceOverrun);
    }
    if stream_bytes <= DESCRIPTOR_BYTES {
        return Err(Error::CorruptStream);
    }
    if dst.len() < nb_states {
        return Err(Error::CorruptStream);
    }

    let payload = &src[..stream_bytes];
    let table_log = dt.table_log();
    let mut bits = BackwardBits::new(payload, stream_bytes - DESCRIPTOR_BYTES, pad_bits);

    let mut state1 = bits.read_bits(table_log);
    bits.reload()?;
    let mut state2 = 0u32;
    if nb_states >= 2 {
        state2 = bits.read_bits(table_log);
        bits.reload()?;
    }

    let tail_start = dst.len() - nb_states;
    let paired_end = tail_start - ((dst.len() - nb_states) % nb_states);

    let mut op = 0usize;
    if nb_states == 2 {
        while op < paired_end {
            dst[op] = dt.decode_symbol(&mut state2, &mut bits);
            op += 1;
            dst[op] = dt.decode_symbol(&mut state1, &mut bits);
            op += 1;
            bits.reload()?;
        }
    }
    while op < tail_start {
        dst[op] = dt.decode_symbol(&mut state1, &mut bits);
        op += 1;
        bits.reload()?;
    }

    // The initial states carry the final symbols.
    if nb_states >= 2 {
        dst[op] = state2 as u8;
        op += 1;
    }
    dst[op] = state1 as u8;

    // A healthy stream is consumed exactly back to its first payload bit.
    if bits.pos() != 0 || bits.bits_consumed() != 0 {
        return Err(Error::CorruptStream);
    }

    Ok(stream_bytes)
}
