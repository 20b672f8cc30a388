//! Huffman coding implementation for DEFLATE.
//!
//! This module builds length-limited code lengths from symbol frequencies and
//! turns length arrays into canonical codes. Codes are stored bit-reversed so
//! they can be written LSB first without further processing.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};

/// Maximum code length for literal/length and distance codes.
pub const MAX_BITS: u8 = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_CL_BITS: u8 = 7;

/// Number of literal/length symbols (0-285).
pub const NUM_LITLEN_SYMBOLS: usize = 286;

/// Number of distance symbols (0-29).
pub const NUM_DIST_SYMBOLS: usize = 30;

/// Number of code-length alphabet symbols (0-18).
pub const NUM_CL_SYMBOLS: usize = 19;

const HISTOGRAM_LEN: usize = MAX_BITS as usize + 1;

/// Huffman code: (code bits, length in bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// The code bits, reversed for LSB-first output.
    pub code: u16,
    /// Number of bits in the code. Zero means the symbol is unused.
    pub length: u8,
}

impl HuffmanCode {
    /// Whether the symbol was assigned a code.
    #[inline]
    pub fn is_used(&self) -> bool {
        self.length > 0
    }

    /// The code value in canonical (MSB-first) order.
    #[inline]
    pub fn canonical(&self) -> u16 {
        reverse_bits(self.code, self.length)
    }
}

/// Tree construction node. Leaves carry a symbol, internal nodes don't.
#[derive(Debug, Clone, Copy)]
struct Node {
    frequency: u64,
    symbol: Option<usize>,
    parent: Option<usize>,
}

/// Build Huffman codes from symbol frequencies.
///
/// Returns a vector where index is the symbol and value is its Huffman code.
/// Alphabets with fewer than two used symbols get two one-bit codes: the used
/// symbol (or symbol 0) takes code 0 and a placeholder takes code 1.
pub fn build_codes(frequencies: &[u32], max_bits: u8) -> Result<Vec<HuffmanCode>> {
    validate(frequencies, max_bits)?;

    if let Some(pairs) = degenerate_codes(frequencies) {
        let mut codes = scratch(frequencies.len(), HuffmanCode::default())?;
        for (symbol, code) in pairs {
            codes[symbol] = HuffmanCode { code, length: 1 };
        }
        return Ok(codes);
    }

    let lengths = build_lengths(frequencies, max_bits)?;
    assign_codes(&lengths)
}

/// Build code lengths limited to `max_bits` from symbol frequencies.
///
/// The unbounded Huffman tree is built first; depths over the limit are
/// truncated and the resulting length histogram is repaired until it fits
/// `2^max_bits` leaves. Lengths are then handed out from shortest to longest
/// in decreasing frequency order.
pub fn build_lengths(frequencies: &[u32], max_bits: u8) -> Result<Vec<u8>> {
    validate(frequencies, max_bits)?;

    let mut lengths = scratch(frequencies.len(), 0u8)?;
    if let Some(pairs) = degenerate_codes(frequencies) {
        for (symbol, _) in pairs {
            lengths[symbol] = 1;
        }
        return Ok(lengths);
    }

    let mut nodes = sorted_leaves(frequencies)?;
    let num_leaves = nodes.len();
    merge_nodes(&mut nodes)?;

    let mut counts = depth_histogram(&nodes[..], num_leaves, max_bits);
    rebalance(&mut counts, max_bits);

    // Leaves are sorted by ascending frequency, so walk them backwards
    for leaf in nodes[..num_leaves].iter().rev() {
        let Some(symbol) = leaf.symbol else {
            continue;
        };
        if let Some(length) = (1..=max_bits as usize).find(|&len| counts[len] > 0) {
            counts[length] -= 1;
            lengths[symbol] = length as u8;
        }
    }

    Ok(lengths)
}

/// Generate canonical Huffman codes from code lengths.
///
/// Canonical codes are generated such that:
/// 1. Shorter codes come before longer codes
/// 2. Codes of the same length are assigned in symbol order
///
/// The stored codes are bit-reversed within their length.
pub fn assign_codes(lengths: &[u8]) -> Result<Vec<HuffmanCode>> {
    let mut codes = scratch(lengths.len(), HuffmanCode::default())?;

    // Count codes of each length
    let mut bl_count = [0u64; HISTOGRAM_LEN];
    for (symbol, &length) in lengths.iter().enumerate() {
        if length > MAX_BITS {
            return Err(Error::InvalidCodeLength { symbol, length });
        }
        if length > 0 {
            bl_count[length as usize] += 1;
        }
    }

    // Smallest code value for each length
    let mut next_code = [0u64; HISTOGRAM_LEN];
    for bits in 2..HISTOGRAM_LEN {
        next_code[bits] = (next_code[bits - 1] + bl_count[bits - 1]) << 1;
    }

    for (symbol, &length) in lengths.iter().enumerate() {
        if length > 0 {
            let value = next_code[length as usize];
            next_code[length as usize] += 1;
            codes[symbol] = HuffmanCode {
                code: reverse_bits(value as u16, length),
                length,
            };
        }
    }

    Ok(codes)
}

/// Lookup table for reversing the bits in a byte.
const REVERSE_BYTE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut b = i as u8;
        let mut r = 0u8;
        let mut j = 0;
        while j < 8 {
            r = (r << 1) | (b & 1);
            b >>= 1;
            j += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
};

/// Reverse the low `bits` bits of `value`.
///
/// Bits above `bits` are discarded. Reversing twice with the same width
/// returns the original value.
#[inline]
pub fn reverse_bits(value: u16, bits: u8) -> u16 {
    debug_assert!(bits <= 16);
    if bits == 0 {
        return 0;
    }
    let low = REVERSE_BYTE[value as u8 as usize] as u16;
    let high = REVERSE_BYTE[(value >> 8) as u8 as usize] as u16;
    let reversed = (low << 8) | high;
    reversed >> (16 - bits)
}

/// Kraft sum of `lengths` scaled by `2^MAX_BITS`.
///
/// A prefix code needs this to be at most `1 << MAX_BITS`; a complete code
/// hits it exactly.
pub fn kraft_units(lengths: &[u8]) -> u64 {
    lengths
        .iter()
        .filter(|&&len| len > 0 && len <= MAX_BITS)
        .map(|&len| 1u64 << (MAX_BITS - len))
        .sum()
}

fn validate(frequencies: &[u32], max_bits: u8) -> Result<()> {
    if !(1..=MAX_BITS).contains(&max_bits) {
        return Err(Error::InvalidMaxBits(max_bits));
    }
    if frequencies.is_empty() {
        return Err(Error::EmptyAlphabet);
    }
    Ok(())
}

/// Allocate a filled scratch vector, reporting allocation failure.
fn scratch<T: Clone>(len: usize, fill: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { requested: len })?;
    v.resize(len, fill);
    Ok(v)
}

/// `(symbol, code)` pairs for alphabets with fewer than two used symbols.
///
/// Returns `None` when the general construction applies.
fn degenerate_codes(frequencies: &[u32]) -> Option<Vec<(usize, u16)>> {
    let mut used = frequencies
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0)
        .map(|(i, _)| i);
    let first = used.next();
    if used.next().is_some() {
        return None;
    }

    let pairs = match first {
        None => [(0, 0), (1, 1)],
        Some(real) => [(real, 0), (usize::from(real == 0), 1)],
    };
    Some(
        pairs
            .into_iter()
            .filter(|&(symbol, _)| symbol < frequencies.len())
            .collect(),
    )
}

/// Leaves for every used symbol, sorted by (frequency, symbol).
///
/// Room for the internal nodes is reserved up front.
fn sorted_leaves(frequencies: &[u32]) -> Result<Vec<Node>> {
    let num_used = frequencies.iter().filter(|&&f| f > 0).count();
    let capacity = num_used * 2;

    let mut nodes = Vec::new();
    nodes
        .try_reserve_exact(capacity)
        .map_err(|_| Error::OutOfMemory {
            requested: capacity,
        })?;
    nodes.extend(
        frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f > 0)
            .map(|(symbol, &f)| Node {
                frequency: u64::from(f),
                symbol: Some(symbol),
                parent: None,
            }),
    );
    nodes.sort_by_key(|node| (node.frequency, node.symbol));
    Ok(nodes)
}

/// Merge the two lightest parentless nodes until one root remains.
///
/// Ties go to the lower arena index, so sorted leaves beat later internal
/// nodes of equal weight.
fn merge_nodes(nodes: &mut Vec<Node>) -> Result<()> {
    let mut heap = BinaryHeap::new();
    heap.try_reserve(nodes.len())
        .map_err(|_| Error::OutOfMemory {
            requested: nodes.len(),
        })?;
    heap.extend(
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| Reverse((node.frequency, index))),
    );

    while heap.len() > 1 {
        let (Some(Reverse((f1, a))), Some(Reverse((f2, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        let parent = nodes.len();
        nodes.push(Node {
            frequency: f1 + f2,
            symbol: None,
            parent: None,
        });
        nodes[a].parent = Some(parent);
        nodes[b].parent = Some(parent);
        heap.push(Reverse((f1 + f2, parent)));
    }
    Ok(())
}

/// Histogram of leaf depths, each capped at `max_bits`.
fn depth_histogram(nodes: &[Node], num_leaves: usize, max_bits: u8) -> [u32; HISTOGRAM_LEN] {
    let mut counts = [0u32; HISTOGRAM_LEN];
    for leaf in 0..num_leaves {
        let mut depth = 0usize;
        let mut current = leaf;
        while let Some(parent) = nodes[current].parent {
            depth += 1;
            current = parent;
        }
        counts[depth.min(max_bits as usize)] += 1;
    }
    counts
}

/// Push codes to longer lengths until the histogram fits `2^max_bits` leaves.
///
/// Moving a pair from length L frees `2^(max_bits-L)` units; a lone code
/// frees `2^(max_bits-L-1)`. A pair move leaves one code behind at L+1, so
/// the histogram may end up holding fewer codes than there are symbols.
fn rebalance(counts: &mut [u32; HISTOGRAM_LEN], max_bits: u8) {
    let max = u32::from(max_bits);
    let target = 1u64 << max;
    let mut used: u64 = (1..=max)
        .map(|len| u64::from(counts[len as usize]) << (max - len))
        .sum();

    while used > target {
        let Some(shortest) = (1..max).find(|&len| counts[len as usize] > 0) else {
            break;
        };
        let len = shortest as usize;
        if counts[len] >= 2 {
            counts[len] -= 2;
            counts[len + 1] += 1;
            used -= 1u64 << (max - shortest);
        } else {
            counts[len] -= 1;
            counts[len + 1] += 1;
            used -= 1u64 << (max - shortest - 1);
        }
    }
}
