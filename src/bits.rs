//! Bit-level output for DEFLATE streams.
//!
//! Both writers pack bits LSB first: the first bit written lands in bit 0
//! of the first byte.

use crate::error::{Error, Result};

/// A bit writer over a caller-owned, fixed-capacity destination.
///
/// Completed bytes go straight into the destination. Writing past its end
/// fails with [`Error::BufferOverflow`] instead of truncating.
#[derive(Debug)]
pub struct BitWriter<'a> {
    out: &'a mut [u8],
    pos: usize,
    acc: u64,
    bit_count: u8,
}

impl<'a> BitWriter<'a> {
    /// Create a writer that fills `out` from its first byte.
    pub fn new(out: &'a mut [u8]) -> Self {
        Self {
            out,
            pos: 0,
            acc: 0,
            bit_count: 0,
        }
    }

    /// Write the low `num_bits` bits of `value`, LSB first.
    ///
    /// A zero width writes nothing. Widths above 32 are rejected.
    #[inline]
    pub fn write(&mut self, value: u32, num_bits: u8) -> Result<()> {
        if num_bits > 32 {
            return Err(Error::InvalidBitWidth(num_bits));
        }
        if num_bits == 0 {
            return Ok(());
        }

        let masked = u64::from(value) & ((1u64 << num_bits) - 1);
        self.acc |= masked << self.bit_count;
        self.bit_count += num_bits;

        while self.bit_count >= 8 {
            let capacity = self.out.len();
            let slot = self.out.get_mut(self.pos).ok_or(Error::BufferOverflow {
                capacity,
                required: capacity + 1,
            })?;
            *slot = self.acc as u8;
            self.pos += 1;
            self.acc >>= 8;
            self.bit_count -= 8;
        }
        Ok(())
    }

    /// Flush the partial trailing byte, padded with zeros.
    ///
    /// Returns the number of bytes written and the number of valid bits in
    /// the last byte (0 when the last byte is fully used).
    pub fn finish(mut self) -> Result<(usize, u8)> {
        let pending = self.bit_count;
        if pending > 0 {
            let capacity = self.out.len();
            let slot = self.out.get_mut(self.pos).ok_or(Error::BufferOverflow {
                capacity,
                required: capacity + 1,
            })?;
            *slot = self.acc as u8;
            self.pos += 1;
            self.acc = 0;
            self.bit_count = 0;
        }
        Ok((self.pos, pending))
    }

    /// Number of complete bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.pos == 0 && self.bit_count == 0
    }

    /// Number of bits waiting for the next byte boundary.
    pub fn pending_bits(&self) -> u8 {
        self.bit_count
    }
}

/// An owned, growable counterpart to [`BitWriter`].
///
/// Used to assemble whole blocks whose size is not known up front. Streams
/// from a [`BitWriter`] can be spliced in at any bit offset with
/// [`BitBuffer::append`].
#[derive(Debug, Default)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    pending: u64,
    pending_bits: u8,
}

impl BitBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Write the low `num_bits` bits of `value`, LSB first.
    ///
    /// Same contract as [`BitWriter::write`], minus the capacity limit.
    #[inline]
    pub fn write_bits(&mut self, value: u32, num_bits: u8) {
        debug_assert!(num_bits <= 32);
        if num_bits == 0 {
            return;
        }
        let mask = (1u64 << num_bits) - 1;
        self.pending |= (u64::from(value) & mask) << self.pending_bits;
        self.pending_bits += num_bits;
        self.drain_full_bytes();
    }

    /// Append a bitstream produced elsewhere.
    ///
    /// `bits_in_last_byte` follows [`BitWriter::finish`]: 0 means every byte
    /// of `bytes` is fully used.
    pub fn append(&mut self, bytes: &[u8], bits_in_last_byte: u8) {
        let (full, tail) = match bytes.split_last() {
            Some((last, rest)) if bits_in_last_byte > 0 => (rest, Some(*last)),
            _ => (bytes, None),
        };
        if self.pending_bits == 0 {
            self.bytes.extend_from_slice(full);
        } else {
            for &byte in full {
                self.write_bits(u32::from(byte), 8);
            }
        }
        if let Some(last) = tail {
            self.write_bits(u32::from(last), bits_in_last_byte);
        }
    }

    /// Zero-fill up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.pending_bits > 0 {
            self.pending_bits = 8;
            self.drain_full_bytes();
        }
    }

    /// Byte-align and hand over the written bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }

    /// Bits written so far, including any not yet byte-aligned.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + usize::from(self.pending_bits)
    }

    /// Number of complete bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.pending_bits == 0
    }

    /// Number of bits waiting for the next byte boundary.
    pub fn pending_bits(&self) -> u8 {
        self.pending_bits
    }

    fn drain_full_bytes(&mut self) {
        while self.pending_bits >= 8 {
            self.bytes.push(self.pending as u8);
            self.pending >>= 8;
            self.pending_bits -= 8;
        }
    }
}
