use std::path::PathBuf;

/// Errors that can occur while decoding a journal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Underlying I/O failure reading the bucket directory or the journal stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to set up or run zstd decompression over `rawdata/journal.zst`.
    #[error("zstd decompression failed: {0}")]
    Decompression(std::io::Error),

    /// Neither `rawdata/journal` nor `rawdata/journal.zst` exists under the bucket directory.
    #[error("no journal file found under {0}")]
    JournalNotFound(PathBuf),

    /// The stream ended in the middle of a varint, fixed-width field, or declared-length payload.
    #[error("unexpected end of stream while reading {context}")]
    UnexpectedEof {
        /// What the decoder was trying to read when the stream ran out.
        context: &'static str,
    },

    /// A varint ran past the 64-bit truncation limit without terminating.
    #[error("malformed varint while reading {context} at offset {pos}")]
    BadVarint {
        /// What the decoder was trying to read.
        context: &'static str,
        /// Absolute stream offset where the varint started.
        pos: u64,
    },

    /// An opcode outside the known enum values and outside the state-change/event bitfield
    /// ranges.
    #[error("unknown opcode {opcode} at offset {pos}")]
    UnknownOpcode {
        /// The offending opcode byte.
        opcode: u8,
        /// Absolute stream offset of the opcode byte.
        pos: u64,
    },

    /// A metadata record's combined type tag fell on one of the reserved/placeholder table
    /// entries.
    #[error("reserved metadata type tag {tag} at offset {pos}")]
    ReservedMetadataTag {
        /// The 4-bit type tag extracted from the combined key.
        tag: u8,
        /// Absolute stream offset of the metadata record.
        pos: u64,
    },

    /// An event's declared message length resolved to a negative span, meaning the header
    /// fields consumed more bytes than the frame reserved for them.
    #[error("event at offset {pos} has a negative message length (effective end {effective_end})")]
    NegativeMessageLength {
        /// The absolute end offset computed from the frame's length field.
        effective_end: i64,
        /// The stream position once all header and metadata fields were consumed.
        pos: u64,
    },

    /// A string-field dictionary opcode (host/source/sourcetype/generic string) referenced
    /// an ordinal higher than any entry appended so far.
    #[error("active index {index} out of bounds for {kind} dictionary of length {len}")]
    DictionaryIndexOutOfBounds {
        /// The dictionary this ordinal was resolved against.
        kind: &'static str,
        /// The out-of-bounds 1-based ordinal.
        index: u64,
        /// Number of entries currently in the dictionary.
        len: usize,
    },
}

/// Convenience alias for decode results.
pub type Result<T> = std::result::Result<T, JournalError>;
