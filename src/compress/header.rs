//! Dynamic Huffman block header encoding (RFC 1951 3.2.7).
//!
//! The header carries HLIT, HDIST and HCLEN, the code lengths of the
//! code-length alphabet in transmission order, and the run-length encoded
//! literal/length and distance code lengths.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bits::BitWriter;
use crate::compress::huffman::{
    self, HuffmanCode, MAX_CL_BITS, NUM_CL_SYMBOLS, NUM_DIST_SYMBOLS, NUM_LITLEN_SYMBOLS,
};
use crate::compress::rle::{self, RleSymbol};
use crate::error::{Error, Result};

/// Order in which code-length code lengths are transmitted.
pub const CODE_LENGTH_ORDER: [usize; NUM_CL_SYMBOLS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Fewest literal/length codes a header describes.
pub const MIN_HLIT: usize = 257;
/// Fewest distance codes a header describes.
pub const MIN_HDIST: usize = 1;
/// Fewest code-length codes a header describes.
pub const MIN_HCLEN: usize = 4;

/// Bit count of the three count fields.
const COUNT_FIELD_BITS: usize = 5 + 5 + 4;

/// Upper bound on the size of any dynamic header, in bytes.
///
/// Every RLE entry costs at most a 7-bit code plus 7 extra bits.
pub const MAX_HEADER_BYTES: usize = (COUNT_FIELD_BITS
    + NUM_CL_SYMBOLS * 3
    + (NUM_LITLEN_SYMBOLS + NUM_DIST_SYMBOLS) * (MAX_CL_BITS as usize + 7)
    + 7)
    / 8;

/// Layout and size of an encoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSummary {
    /// Number of literal/length code lengths sent (257-286).
    pub hlit: usize,
    /// Number of distance code lengths sent (1-30).
    pub hdist: usize,
    /// Number of code-length code lengths sent (4-19).
    pub hclen: usize,
    /// Number of entries in the RLE stream.
    pub rle_symbols: usize,
    /// Bytes written to the destination, including a partial last byte.
    pub bytes_written: usize,
    /// Valid bits in the last byte; 0 when it is fully used.
    pub bits_in_last_byte: u8,
}

impl HeaderSummary {
    /// Exact header length in bits.
    pub fn total_bits(&self) -> usize {
        match self.bits_in_last_byte {
            0 => self.bytes_written * 8,
            bits => (self.bytes_written - 1) * 8 + bits as usize,
        }
    }
}

/// Everything needed to emit a header, computed before touching the output.
struct HeaderPlan {
    hlit: usize,
    hdist: usize,
    hclen: usize,
    rle: Vec<RleSymbol>,
    cl_codes: Vec<HuffmanCode>,
}

impl HeaderPlan {
    fn new(lit_len_codes: &[HuffmanCode], dist_codes: &[HuffmanCode]) -> Result<Self> {
        check_table(lit_len_codes, NUM_LITLEN_SYMBOLS)?;
        check_table(dist_codes, NUM_DIST_SYMBOLS)?;

        let hlit = trimmed_count(lit_len_codes, MIN_HLIT);
        let hdist = trimmed_count(dist_codes, MIN_HDIST);

        let mut lengths = Vec::new();
        lengths
            .try_reserve_exact(hlit + hdist)
            .map_err(|_| Error::OutOfMemory {
                requested: hlit + hdist,
            })?;
        lengths.extend(lit_len_codes[..hlit].iter().map(|c| c.length));
        lengths.extend(dist_codes[..hdist].iter().map(|c| c.length));

        let rle = rle::encode_lengths(&lengths)?;
        let cl_freqs = rle::symbol_frequencies(&rle);
        let cl_lengths = huffman::build_lengths(&cl_freqs, MAX_CL_BITS)?;
        // The 7-bit limit can drop a symbol the RLE stream still needs
        if let Some(symbol) =
            (0..NUM_CL_SYMBOLS).find(|&s| cl_freqs[s] > 0 && cl_lengths[s] == 0)
        {
            return Err(Error::MissingCode {
                symbol: symbol as u16,
            });
        }
        let cl_codes = huffman::assign_codes(&cl_lengths)?;

        // Trailing entries in transmission order with zero length can be left out
        let mut hclen = NUM_CL_SYMBOLS;
        while hclen > MIN_HCLEN && cl_codes[CODE_LENGTH_ORDER[hclen - 1]].length == 0 {
            hclen -= 1;
        }

        Ok(Self {
            hlit,
            hdist,
            hclen,
            rle,
            cl_codes,
        })
    }

    fn total_bits(&self) -> usize {
        let lengths_bits: usize = self
            .rle
            .iter()
            .map(|entry| {
                self.cl_codes[entry.symbol as usize].length as usize + entry.extra_bits() as usize
            })
            .sum();
        COUNT_FIELD_BITS + self.hclen * 3 + lengths_bits
    }

    fn write(&self, writer: &mut BitWriter<'_>) -> Result<()> {
        writer.write((self.hlit - MIN_HLIT) as u32, 5)?;
        writer.write((self.hdist - MIN_HDIST) as u32, 5)?;
        writer.write((self.hclen - MIN_HCLEN) as u32, 4)?;

        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write(u32::from(self.cl_codes[symbol].length), 3)?;
        }

        for entry in &self.rle {
            let code = self.cl_codes[entry.symbol as usize];
            writer.write(u32::from(code.code), code.length)?;
            writer.write(u32::from(entry.extra), entry.extra_bits())?;
        }
        Ok(())
    }
}

/// Encode a dynamic block header into `output`.
///
/// `lit_len_codes` must hold 286 entries and `dist_codes` 30. If the header
/// does not fit, [`Error::BufferOverflow`] is returned and `output` is left
/// untouched.
pub fn encode_header(
    lit_len_codes: &[HuffmanCode],
    dist_codes: &[HuffmanCode],
    output: &mut [u8],
) -> Result<HeaderSummary> {
    let plan = HeaderPlan::new(lit_len_codes, dist_codes)?;

    let required = plan.total_bits().div_ceil(8);
    if required > output.len() {
        return Err(Error::BufferOverflow {
            capacity: output.len(),
            required,
        });
    }

    let mut writer = BitWriter::new(output);
    plan.write(&mut writer)?;
    let (bytes_written, bits_in_last_byte) = writer.finish()?;

    Ok(HeaderSummary {
        hlit: plan.hlit,
        hdist: plan.hdist,
        hclen: plan.hclen,
        rle_symbols: plan.rle.len(),
        bytes_written,
        bits_in_last_byte,
    })
}

/// Encode a header into a freshly allocated buffer sized to fit.
pub fn encode_header_to_vec(
    lit_len_codes: &[HuffmanCode],
    dist_codes: &[HuffmanCode],
) -> Result<(Vec<u8>, HeaderSummary)> {
    let mut output = vec![0u8; MAX_HEADER_BYTES];
    let summary = encode_header(lit_len_codes, dist_codes, &mut output)?;
    output.truncate(summary.bytes_written);
    Ok((output, summary))
}

/// Encode independent headers, one per `(literal/length, distance)` pair.
///
/// With the `parallel` feature the headers are encoded on the rayon pool.
pub fn encode_headers<L, D>(tables: &[(L, D)]) -> Vec<Result<(Vec<u8>, HeaderSummary)>>
where
    L: AsRef<[HuffmanCode]> + Sync,
    D: AsRef<[HuffmanCode]> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        tables
            .par_iter()
            .map(|(lit, dist)| encode_header_to_vec(lit.as_ref(), dist.as_ref()))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        tables
            .iter()
            .map(|(lit, dist)| encode_header_to_vec(lit.as_ref(), dist.as_ref()))
            .collect()
    }
}

fn check_table(codes: &[HuffmanCode], expected: usize) -> Result<()> {
    if codes.len() != expected {
        return Err(Error::AlphabetSizeMismatch {
            expected,
            actual: codes.len(),
        });
    }
    if let Some((symbol, code)) = codes
        .iter()
        .enumerate()
        .find(|(_, code)| code.length > huffman::MAX_BITS)
    {
        return Err(Error::InvalidCodeLength {
            symbol,
            length: code.length,
        });
    }
    Ok(())
}

/// Smallest count >= `min` that leaves only unused codes after it.
fn trimmed_count(codes: &[HuffmanCode], min: usize) -> usize {
    let mut count = codes.len();
    while count > min && codes[count - 1].length == 0 {
        count -= 1;
    }
    count
}
