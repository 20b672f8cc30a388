//! Minimal dynamic header reader.
//!
//! Parses the header layout of RFC 1951 3.2.7 independently of the encoder
//! so tests can check that what was written reads back as the same code
//! lengths.

#![allow(dead_code)]

/// Order in which code-length code lengths are transmitted.
const ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// LSB-first bit reader.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    pub fn read_bit(&mut self) -> u32 {
        let byte = self.data[self.bit_pos / 8];
        let bit = (byte >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        u32::from(bit)
    }

    pub fn read_bits(&mut self, count: u8) -> u32 {
        let mut value = 0;
        for i in 0..count {
            value |= self.read_bit() << i;
        }
        value
    }

    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }
}

/// Canonical codes as `(code, length)` in MSB-first order, per RFC 1951 3.2.2.
pub fn canonical_codes(lengths: &[u8]) -> Vec<(u32, u8)> {
    let mut bl_count = [0u32; 16];
    for &len in lengths {
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }
    let mut next_code = [0u32; 16];
    let mut code = 0;
    for bits in 1..16 {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }
    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                (0, 0)
            } else {
                let c = next_code[len as usize];
                next_code[len as usize] += 1;
                (c, len)
            }
        })
        .collect()
}

/// Read one symbol by extending the code a bit at a time until it matches.
pub fn read_symbol(reader: &mut BitReader<'_>, codes: &[(u32, u8)]) -> usize {
    let mut code = 0u32;
    for len in 1..=15u8 {
        code = (code << 1) | reader.read_bit();
        if let Some(symbol) = codes.iter().position(|&(c, l)| l == len && c == code) {
            return symbol;
        }
    }
    panic!("no code matches at bit {}", reader.bit_pos());
}

/// Expand `(symbol, extra)` pairs of the code-length alphabet into lengths.
pub fn expand_rle(entries: &[(u8, u8)]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    for &(symbol, extra) in entries {
        match symbol {
            16 => {
                let prev = *out.last().expect("repeat without previous length");
                out.extend(std::iter::repeat(prev).take(3 + extra as usize));
            }
            17 => out.extend(std::iter::repeat(0).take(3 + extra as usize)),
            18 => out.extend(std::iter::repeat(0).take(11 + extra as usize)),
            literal => out.push(literal),
        }
    }
    out
}

/// A parsed dynamic header.
#[derive(Debug)]
pub struct DecodedHeader {
    pub hlit: usize,
    pub hdist: usize,
    pub hclen: usize,
    pub cl_lengths: [u8; 19],
    pub lit_lengths: Vec<u8>,
    pub dist_lengths: Vec<u8>,
    pub bits_read: usize,
}

/// Parse a header, skipping `skip_bits` leading bits (3 for a block header).
pub fn decode_header(data: &[u8], skip_bits: u8) -> DecodedHeader {
    let mut reader = BitReader::new(data);
    reader.read_bits(skip_bits);
    let start = reader.bit_pos();

    let hlit = reader.read_bits(5) as usize + 257;
    let hdist = reader.read_bits(5) as usize + 1;
    let hclen = reader.read_bits(4) as usize + 4;

    let mut cl_lengths = [0u8; 19];
    for &symbol in &ORDER[..hclen] {
        cl_lengths[symbol] = reader.read_bits(3) as u8;
    }
    let cl_codes = canonical_codes(&cl_lengths);

    let mut entries = Vec::new();
    let mut decoded = 0usize;
    while decoded < hlit + hdist {
        let symbol = read_symbol(&mut reader, &cl_codes) as u8;
        let extra = match symbol {
            16 => reader.read_bits(2),
            17 => reader.read_bits(3),
            18 => reader.read_bits(7),
            _ => 0,
        } as u8;
        entries.push((symbol, extra));
        decoded = expand_rle(&entries).len();
    }

    let lengths = expand_rle(&entries);
    assert_eq!(lengths.len(), hlit + hdist, "runs cross the table end");

    DecodedHeader {
        hlit,
        hdist,
        hclen,
        cl_lengths,
        lit_lengths: lengths[..hlit].to_vec(),
        dist_lengths: lengths[hlit..].to_vec(),
        bits_read: reader.bit_pos() - start,
    }
}
