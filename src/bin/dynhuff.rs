//! dynhuff CLI - dynamic Huffman block encoder
//!
//! Encodes a file as a single literal-only dynamic Huffman block, as raw
//! DEFLATE or wrapped in zlib or gzip, and reports the header layout.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};

use dynhuff::compress::container::{self, Format};
use dynhuff::compress::encode_literal_block;

/// Encode a file with a dynamic Huffman block.
#[derive(Parser, Debug)]
#[command(name = "dynhuff")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (defaults to INPUT plus the format's extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "gzip")]
    format: OutputFormat,

    /// Also compress with the reference implementation and report its size
    #[arg(long)]
    compare: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Raw DEFLATE stream
    Raw,
    /// zlib stream
    Zlib,
    /// gzip member
    Gzip,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Raw => "deflate",
            OutputFormat::Zlib => "zz",
            OutputFormat::Gzip => "gz",
        }
    }

    /// Container of the flate2 reference output with the same framing.
    fn reference_format(self) -> Format {
        match self {
            OutputFormat::Raw => Format::Raw,
            OutputFormat::Zlib => Format::Zlib,
            OutputFormat::Gzip => Format::Gzip,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let data = fs::read(&args.input)?;

    let start = Instant::now();
    let block = encode_literal_block(&data, true)?;
    let encoded = match args.format {
        OutputFormat::Raw => block.data,
        OutputFormat::Zlib => container::zlib_frame(&block.data, &data),
        OutputFormat::Gzip => container::gzip_frame(&block.data, &data),
    };
    let encode_time = start.elapsed();

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, args.format));
    fs::write(&output_path, &encoded)?;

    let input_size = data.len() as u64;
    let output_size = encoded.len() as u64;
    let ratio = if input_size > 0 {
        output_size as f64 / input_size as f64 * 100.0
    } else {
        0.0
    };

    if args.verbose {
        let header = block.header;
        eprintln!("Output: {:?}", output_path);
        eprintln!("  Format: {:?}", args.format);
        eprintln!("  HLIT: {}", header.hlit);
        eprintln!("  HDIST: {}", header.hdist);
        eprintln!("  HCLEN: {}", header.hclen);
        eprintln!("  RLE symbols: {}", header.rle_symbols);
        eprintln!("  Header bits: {}", header.total_bits());
        eprintln!("  Block bits: {}", block.bit_len);
        eprintln!("  Encode time: {:.2?}", encode_time);
        eprintln!(
            "  Size: {} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    } else {
        println!(
            "{} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    }

    if args.compare {
        let format = args.format.reference_format();
        let reference = container::compress(format, &data)?;
        println!(
            "reference {:?}: {}",
            format,
            format_size(reference.len() as u64)
        );
    }

    Ok(())
}

fn default_output(input: &Path, format: OutputFormat) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
