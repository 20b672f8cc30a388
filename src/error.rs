//! Error types for the dynhuff library.

use std::fmt;

/// Result type alias for dynhuff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building codes or encoding headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Maximum code length outside 1..=15.
    InvalidMaxBits(u8),
    /// Frequency table or code table with no entries.
    EmptyAlphabet,
    /// Code table length doesn't match the alphabet it stands for.
    AlphabetSizeMismatch {
        /// Required number of entries.
        expected: usize,
        /// Number of entries provided.
        actual: usize,
    },
    /// Code length above the DEFLATE limit of 15 bits.
    InvalidCodeLength {
        /// Symbol carrying the length.
        symbol: usize,
        /// Offending length.
        length: u8,
    },
    /// Bit writer asked to write more than 32 bits at once.
    InvalidBitWidth(u8),
    /// Scratch allocation failed.
    OutOfMemory {
        /// Number of elements that could not be reserved.
        requested: usize,
    },
    /// Destination buffer too small for the encoded output.
    BufferOverflow {
        /// Capacity of the destination buffer in bytes.
        capacity: usize,
        /// Number of bytes the output needs.
        required: usize,
    },
    /// Match token outside DEFLATE's length (3-258) or distance (1-32768) range.
    InvalidMatch {
        /// Match length.
        length: u16,
        /// Match distance.
        distance: u16,
    },
    /// A symbol that must be written was not assigned a code.
    MissingCode {
        /// Literal/length or distance symbol without a code.
        symbol: u16,
    },
    /// Failure reported by the external gzip/zlib implementation.
    Container(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed call-time inputs.
    InvalidArgument,
    /// Scratch allocation failure.
    OutOfMemory,
    /// Destination buffer too small.
    BufferOverflow,
    /// Error from the container collaborator.
    Container,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidMaxBits(_)
            | Error::EmptyAlphabet
            | Error::AlphabetSizeMismatch { .. }
            | Error::InvalidCodeLength { .. }
            | Error::InvalidBitWidth(_)
            | Error::InvalidMatch { .. }
            | Error::MissingCode { .. } => ErrorKind::InvalidArgument,
            Error::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Error::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            Error::Container(_) => ErrorKind::Container,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMaxBits(bits) => {
                write!(f, "Invalid maximum code length {}: must be 1-15", bits)
            }
            Error::EmptyAlphabet => write!(f, "Alphabet has no symbols"),
            Error::AlphabetSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Code table size mismatch: expected {} entries, got {}",
                    expected, actual
                )
            }
            Error::InvalidCodeLength { symbol, length } => {
                write!(
                    f,
                    "Invalid code length {} for symbol {}: must be 0-15",
                    length, symbol
                )
            }
            Error::InvalidBitWidth(width) => {
                write!(f, "Invalid bit width {}: must be 0-32", width)
            }
            Error::OutOfMemory { requested } => {
                write!(f, "Out of memory reserving {} scratch entries", requested)
            }
            Error::BufferOverflow { capacity, required } => {
                write!(
                    f,
                    "Buffer overflow: need {} bytes, destination holds {}",
                    required, capacity
                )
            }
            Error::InvalidMatch { length, distance } => {
                write!(f, "Invalid match: length {}, distance {}", length, distance)
            }
            Error::MissingCode { symbol } => {
                write!(f, "Symbol {} has no Huffman code", symbol)
            }
            Error::Container(msg) => write!(f, "Container error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Container(err.to_string())
    }
}
