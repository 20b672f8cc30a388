//! Run-length encoding of code lengths with the DEFLATE code-length alphabet.
//!
//! Symbols 0-15 are literal lengths, 16 repeats the previous length 3-6
//! times, 17 emits 3-10 zeros and 18 emits 11-138 zeros (RFC 1951 3.2.7).

use crate::error::{Error, Result};

/// Repeat the previous length 3-6 times (2 extra bits).
pub const REPEAT_PREVIOUS: u8 = 16;
/// Run of 3-10 zeros (3 extra bits).
pub const REPEAT_ZERO_SHORT: u8 = 17;
/// Run of 11-138 zeros (7 extra bits).
pub const REPEAT_ZERO_LONG: u8 = 18;

/// One code-length alphabet symbol and the value of its extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleSymbol {
    /// Code-length alphabet symbol (0-18).
    pub symbol: u8,
    /// Extra-bits value; zero for literal lengths.
    pub extra: u8,
}

impl RleSymbol {
    #[inline]
    fn literal(length: u8) -> Self {
        Self {
            symbol: length,
            extra: 0,
        }
    }

    /// Width of the extra-bits field that follows this symbol.
    #[inline]
    pub fn extra_bits(&self) -> u8 {
        extra_bits(self.symbol)
    }

    /// Number of code lengths this symbol stands for.
    #[inline]
    pub fn run_length(&self) -> usize {
        match self.symbol {
            REPEAT_PREVIOUS => 3 + self.extra as usize,
            REPEAT_ZERO_SHORT => 3 + self.extra as usize,
            REPEAT_ZERO_LONG => 11 + self.extra as usize,
            _ => 1,
        }
    }
}

/// Extra-bits width for a code-length alphabet symbol.
#[inline]
pub fn extra_bits(symbol: u8) -> u8 {
    match symbol {
        REPEAT_PREVIOUS => 2,
        REPEAT_ZERO_SHORT => 3,
        REPEAT_ZERO_LONG => 7,
        _ => 0,
    }
}

/// RLE encode a code-length sequence.
///
/// Zero runs take the largest repeat codes first (18 up to 138, then 17 up to
/// 10, then literal zeros). A non-zero length is sent literally once, then
/// its repeats go out as 16s of up to 6 with any remainder below 3 sent as
/// literals.
pub fn encode_lengths(lengths: &[u8]) -> Result<Vec<RleSymbol>> {
    let mut encoded = Vec::new();
    encoded
        .try_reserve_exact(lengths.len())
        .map_err(|_| Error::OutOfMemory {
            requested: lengths.len(),
        })?;

    let mut i = 0;
    while i < lengths.len() {
        let curr = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == curr {
            run += 1;
        }

        if curr == 0 {
            let mut rem = run;
            while rem > 0 {
                if rem >= 11 {
                    let take = rem.min(138);
                    encoded.push(RleSymbol {
                        symbol: REPEAT_ZERO_LONG,
                        extra: (take - 11) as u8,
                    });
                    rem -= take;
                } else if rem >= 3 {
                    let take = rem.min(10);
                    encoded.push(RleSymbol {
                        symbol: REPEAT_ZERO_SHORT,
                        extra: (take - 3) as u8,
                    });
                    rem -= take;
                } else {
                    encoded.push(RleSymbol::literal(0));
                    rem -= 1;
                }
            }
        } else {
            encoded.push(RleSymbol::literal(curr));
            let mut rem = run - 1;
            while rem >= 3 {
                let take = rem.min(6);
                encoded.push(RleSymbol {
                    symbol: REPEAT_PREVIOUS,
                    extra: (take - 3) as u8,
                });
                rem -= take;
            }
            for _ in 0..rem {
                encoded.push(RleSymbol::literal(curr));
            }
        }

        i += run;
    }

    Ok(encoded)
}

/// Per-symbol frequencies of an RLE stream over the code-length alphabet.
pub fn symbol_frequencies(encoded: &[RleSymbol]) -> [u32; 19] {
    let mut freqs = [0u32; 19];
    for entry in encoded {
        freqs[entry.symbol as usize] += 1;
    }
    freqs
}
