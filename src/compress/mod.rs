//! Code construction, header encoding and block assembly.

pub mod block;
#[cfg(feature = "container")]
pub mod container;
pub mod header;
pub mod huffman;
pub mod rle;

pub use block::{encode_dynamic_block, encode_literal_block, EncodedBlock, Token};
pub use header::{encode_header, encode_header_to_vec, HeaderSummary, MAX_HEADER_BYTES};
pub use huffman::{assign_codes, build_codes, build_lengths, reverse_bits, HuffmanCode};
pub use rle::{encode_lengths, RleSymbol};
