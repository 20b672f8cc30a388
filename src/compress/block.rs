//! Dynamic Huffman block assembly.
//!
//! Ties the header encoder to a literal/length/distance symbol stream so the
//! result is a complete DEFLATE block (BTYPE=10) that any RFC 1951 inflater
//! can decode.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bits::BitBuffer;
use crate::compress::header::{encode_header, HeaderSummary, MAX_HEADER_BYTES};
use crate::compress::huffman::{
    self, HuffmanCode, MAX_BITS, NUM_DIST_SYMBOLS, NUM_LITLEN_SYMBOLS,
};
use crate::error::{Error, Result};

/// End-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Shortest match DEFLATE can express.
pub const MIN_MATCH_LENGTH: u16 = 3;
/// Longest match DEFLATE can express.
pub const MAX_MATCH_LENGTH: u16 = 258;
/// Farthest match distance DEFLATE can express.
pub const MAX_MATCH_DISTANCE: u16 = 32768;

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// A literal or back-reference produced by a match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference: (length, distance).
    Match {
        /// Length of the match (3-258).
        length: u16,
        /// Distance back to the match (1-32768).
        distance: u16,
    },
}

/// Get the length symbol (257-285), extra bit count and extra value.
#[inline]
pub fn length_code(length: u16) -> (u16, u8, u16) {
    debug_assert!((MIN_MATCH_LENGTH..=MAX_MATCH_LENGTH).contains(&length));
    let idx = LENGTH_BASE.partition_point(|&base| base <= length) - 1;
    (257 + idx as u16, LENGTH_EXTRA[idx], length - LENGTH_BASE[idx])
}

/// Get the distance symbol (0-29), extra bit count and extra value.
#[inline]
pub fn distance_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!((1..=MAX_MATCH_DISTANCE).contains(&distance));
    let idx = DISTANCE_BASE.partition_point(|&base| base <= distance) - 1;
    (idx as u16, DISTANCE_EXTRA[idx], distance - DISTANCE_BASE[idx])
}

fn check_match(length: u16, distance: u16) -> Result<()> {
    if !(MIN_MATCH_LENGTH..=MAX_MATCH_LENGTH).contains(&length)
        || !(1..=MAX_MATCH_DISTANCE).contains(&distance)
    {
        return Err(Error::InvalidMatch { length, distance });
    }
    Ok(())
}

/// Count literal/length and distance symbols, including one end-of-block.
pub fn symbol_frequencies(tokens: &[Token]) -> Result<(Vec<u32>, Vec<u32>)> {
    let mut lit_freqs = vec![0u32; NUM_LITLEN_SYMBOLS];
    let mut dist_freqs = vec![0u32; NUM_DIST_SYMBOLS];

    for token in tokens {
        match *token {
            Token::Literal(b) => lit_freqs[b as usize] += 1,
            Token::Match { length, distance } => {
                check_match(length, distance)?;
                let (len_symbol, _, _) = length_code(length);
                lit_freqs[len_symbol as usize] += 1;

                let (dist_symbol, _, _) = distance_code(distance);
                dist_freqs[dist_symbol as usize] += 1;
            }
        }
    }
    lit_freqs[END_OF_BLOCK as usize] += 1;

    Ok((lit_freqs, dist_freqs))
}

/// A complete dynamic block and the layout of its header.
#[derive(Debug, Clone)]
pub struct EncodedBlock {
    /// Block bytes; the last byte is zero-padded.
    pub data: Vec<u8>,
    /// Header layout, as written after the three block-type bits.
    pub header: HeaderSummary,
    /// Exact block length in bits.
    pub bit_len: usize,
}

/// Encode tokens as one dynamic Huffman block.
pub fn encode_dynamic_block(tokens: &[Token], is_final: bool) -> Result<EncodedBlock> {
    let (lit_freqs, dist_freqs) = symbol_frequencies(tokens)?;
    let lit_codes = huffman::assign_codes(&huffman::build_lengths(&lit_freqs, MAX_BITS)?)?;
    let dist_codes = huffman::assign_codes(&huffman::build_lengths(&dist_freqs, MAX_BITS)?)?;

    let mut scratch = [0u8; MAX_HEADER_BYTES];
    let header = encode_header(&lit_codes, &dist_codes, &mut scratch)?;

    let mut writer = BitBuffer::with_capacity(header.bytes_written + tokens.len() * 2 + 8);
    writer.write_bits(is_final as u32, 1); // BFINAL
    writer.write_bits(2, 2); // BTYPE=10 (dynamic)
    writer.append(&scratch[..header.bytes_written], header.bits_in_last_byte);

    for token in tokens {
        match *token {
            Token::Literal(byte) => write_symbol(&mut writer, &lit_codes, u16::from(byte))?,
            Token::Match { length, distance } => {
                let (len_symbol, len_extra_bits, len_extra_value) = length_code(length);
                write_symbol(&mut writer, &lit_codes, len_symbol)?;
                writer.write_bits(u32::from(len_extra_value), len_extra_bits);

                let (dist_symbol, dist_extra_bits, dist_extra_value) = distance_code(distance);
                write_symbol(&mut writer, &dist_codes, dist_symbol)?;
                writer.write_bits(u32::from(dist_extra_value), dist_extra_bits);
            }
        }
    }
    write_symbol(&mut writer, &lit_codes, END_OF_BLOCK)?;

    let bit_len = writer.bit_len();
    Ok(EncodedBlock {
        data: writer.finish(),
        header,
        bit_len,
    })
}

/// Encode bytes as a literal-only dynamic block.
pub fn encode_literal_block(data: &[u8], is_final: bool) -> Result<EncodedBlock> {
    let tokens: Vec<Token> = data.iter().map(|&b| Token::Literal(b)).collect();
    encode_dynamic_block(&tokens, is_final)
}

/// Encode independent literal-only blocks, each as a final block.
///
/// With the `parallel` feature the blocks are encoded on the rayon pool;
/// output is identical either way.
pub fn encode_blocks<T>(chunks: &[T]) -> Vec<Result<EncodedBlock>>
where
    T: AsRef<[u8]> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        chunks
            .par_iter()
            .map(|chunk| encode_literal_block(chunk.as_ref(), true))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        chunks
            .iter()
            .map(|chunk| encode_literal_block(chunk.as_ref(), true))
            .collect()
    }
}

#[inline]
fn write_symbol(writer: &mut BitBuffer, codes: &[HuffmanCode], symbol: u16) -> Result<()> {
    let code = codes[symbol as usize];
    if !code.is_used() {
        return Err(Error::MissingCode { symbol });
    }
    writer.write_bits(u32::from(code.code), code.length);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut decoder = DeflateDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .expect("dynamic block should decode");
        out
    }

    #[test]
    fn test_length_code() {
        assert_eq!(length_code(3), (257, 0, 0));
        assert_eq!(length_code(4), (258, 0, 0));
        assert_eq!(length_code(10), (264, 0, 0));
        assert_eq!(length_code(11), (265, 1, 0));
        assert_eq!(length_code(12), (265, 1, 1));
        assert_eq!(length_code(257), (284, 5, 30));
        assert_eq!(length_code(258), (285, 0, 0));
    }

    #[test]
    fn test_distance_code() {
        assert_eq!(distance_code(1), (0, 0, 0));
        assert_eq!(distance_code(2), (1, 0, 0));
        assert_eq!(distance_code(5), (4, 1, 0));
        assert_eq!(distance_code(6), (4, 1, 1));
        assert_eq!(distance_code(32768), (29, 13, 8191));
    }

    #[test]
    fn test_frequencies_include_end_of_block() {
        let (lit, dist) = symbol_frequencies(&[]).unwrap();
        assert_eq!(lit[END_OF_BLOCK as usize], 1);
        assert_eq!(lit.iter().sum::<u32>(), 1);
        assert!(dist.iter().all(|&f| f == 0));
    }

    #[test]
    fn test_invalid_match_rejected() {
        let tokens = [Token::Match {
            length: 2,
            distance: 1,
        }];
        assert_eq!(
            encode_dynamic_block(&tokens, true).unwrap_err(),
            Error::InvalidMatch {
                length: 2,
                distance: 1
            }
        );
    }

    #[test]
    fn test_empty_block_decodes() {
        let block = encode_literal_block(&[], true).unwrap();
        assert!(inflate(&block.data).is_empty());
    }

    #[test]
    fn test_literal_block_decodes() {
        let data = b"The quick brown fox jumps over the lazy dog. The quick brown fox jumps over the lazy dog.";
        let block = encode_literal_block(data, true).unwrap();
        assert_eq!(inflate(&block.data), data.to_vec());
        assert_eq!(block.data.len(), block.bit_len.div_ceil(8));
    }

    #[test]
    fn test_match_block_decodes() {
        let mut tokens: Vec<Token> = b"abc".iter().map(|&b| Token::Literal(b)).collect();
        tokens.push(Token::Match {
            length: 12,
            distance: 3,
        });
        tokens.push(Token::Literal(b'!'));
        tokens.push(Token::Match {
            length: 258,
            distance: 1,
        });

        let block = encode_dynamic_block(&tokens, true).unwrap();
        let mut expected = b"abcabcabcabcabc!".to_vec();
        expected.extend(std::iter::repeat(b'!').take(258));
        assert_eq!(inflate(&block.data), expected);
    }

    #[test]
    fn test_encode_blocks_matches_single() {
        let chunks = vec![b"hello hello".to_vec(), b"world".to_vec()];
        let blocks = encode_blocks(&chunks);
        assert_eq!(blocks.len(), 2);
        for (chunk, block) in chunks.iter().zip(blocks) {
            let block = block.unwrap();
            assert_eq!(block.data, encode_literal_block(chunk, true).unwrap().data);
            assert_eq!(&inflate(&block.data), chunk);
        }
    }
}
