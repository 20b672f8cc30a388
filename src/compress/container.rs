//! gzip and zlib containers.
//!
//! Full-stream compression and decompression delegate to flate2, which
//! serves as the independently verified reference path. [`gzip_frame`] and
//! [`zlib_frame`] wrap a raw DEFLATE stream produced by this crate so it can
//! be read by any gzip or zlib tool.

use std::io::{Read, Write};

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::{Compression, Crc};

use crate::error::Result;

/// gzip member header: magic, CM=8 (deflate), no flags, no mtime, XFL=0, OS=unknown.
const GZIP_HEADER: [u8; 10] = [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF];

/// zlib header: CM=8, 32K window, default level, FCHECK making it a multiple of 31.
const ZLIB_HEADER: [u8; 2] = [0x78, 0x9C];

/// Container format around a DEFLATE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Bare RFC 1951 stream with no framing.
    Raw,
    /// RFC 1952 gzip member.
    Gzip,
    /// RFC 1950 zlib stream.
    Zlib,
}

/// Compress `src` into the given container at the default level.
pub fn compress(format: Format, src: &[u8]) -> Result<Vec<u8>> {
    let out = Vec::with_capacity(src.len() / 2 + 64);
    match format {
        Format::Raw => {
            let mut encoder = DeflateEncoder::new(out, Compression::default());
            encoder.write_all(src)?;
            Ok(encoder.finish()?)
        }
        Format::Gzip => {
            let mut encoder = GzEncoder::new(out, Compression::default());
            encoder.write_all(src)?;
            Ok(encoder.finish()?)
        }
        Format::Zlib => {
            let mut encoder = ZlibEncoder::new(out, Compression::default());
            encoder.write_all(src)?;
            Ok(encoder.finish()?)
        }
    }
}

/// Decompress a complete stream in the given format.
pub fn decompress(format: Format, src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len() * 2);
    match format {
        Format::Raw => DeflateDecoder::new(src).read_to_end(&mut out)?,
        Format::Gzip => GzDecoder::new(src).read_to_end(&mut out)?,
        Format::Zlib => ZlibDecoder::new(src).read_to_end(&mut out)?,
    };
    Ok(out)
}

/// Wrap a raw DEFLATE stream of `original` in a gzip member.
pub fn gzip_frame(raw_deflate: &[u8], original: &[u8]) -> Vec<u8> {
    let mut crc = Crc::new();
    crc.update(original);

    let mut out = Vec::with_capacity(GZIP_HEADER.len() + raw_deflate.len() + 8);
    out.extend_from_slice(&GZIP_HEADER);
    out.extend_from_slice(raw_deflate);
    out.extend_from_slice(&crc.sum().to_le_bytes());
    out.extend_from_slice(&crc.amount().to_le_bytes());
    out
}

/// Wrap a raw DEFLATE stream of `original` in a zlib stream.
pub fn zlib_frame(raw_deflate: &[u8], original: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ZLIB_HEADER.len() + raw_deflate.len() + 4);
    out.extend_from_slice(&ZLIB_HEADER);
    out.extend_from_slice(raw_deflate);
    out.extend_from_slice(&adler32(original).to_be_bytes());
    out
}

/// Adler-32 checksum (RFC 1950).
fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65_521;
    // Largest n with 255*n*(n+1)/2 + (n+1)*(MOD_ADLER-1) <= 2^32-1
    const NMAX: usize = 5552;

    let mut s1: u32 = 1;
    let mut s2: u32 = 0;
    for chunk in data.chunks(NMAX) {
        for &b in chunk {
            s1 += u32::from(b);
            s2 += s1;
        }
        s1 %= MOD_ADLER;
        s2 %= MOD_ADLER;
    }
    (s2 << 16) | s1
}
