//! # dynhuff
//!
//! Length-limited canonical Huffman codes and DEFLATE dynamic block headers.
//!
//! This library is the table-building core of a DEFLATE encoder: it turns
//! symbol frequencies into canonical codes and serializes the dynamic block
//! header of RFC 1951 section 3.2.7 bit for bit.
//!
//! ## Features
//!
//! - **Deterministic code construction** with a fixed length-limiting rule
//! - **Bit-exact header output** into caller-owned buffers
//! - Optional parallel block encoding via `parallel` feature
//! - gzip/zlib reference path via the default `container` feature
//!
//! ## Example
//!
//! ```rust
//! use dynhuff::compress::{build_codes, encode_header, MAX_HEADER_BYTES};
//!
//! let mut lit_freqs = vec![0u32; 286];
//! lit_freqs[b'a' as usize] = 10;
//! lit_freqs[256] = 1; // end of block
//! let dist_freqs = vec![0u32; 30];
//!
//! let lit_codes = build_codes(&lit_freqs, 15).unwrap();
//! let dist_codes = build_codes(&dist_freqs, 15).unwrap();
//!
//! let mut out = [0u8; MAX_HEADER_BYTES];
//! let summary = encode_header(&lit_codes, &dist_codes, &mut out).unwrap();
//! assert_eq!(summary.hlit, 257);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod compress;
pub mod error;

pub use error::{Error, ErrorKind, Result};
