//! Streaming decoder for the binary journal format used inside frozen log buckets.
//!
//! [`JournalDecoder`] opens a bucket directory, transparently decompressing
//! `rawdata/journal.zst` when present, and yields [`Event`] records one at a time
//! via [`streaming_iterator::StreamingIterator`]. Along the way it tracks the
//! append-only host/source/sourcetype dictionaries and active-index state that the
//! wire format layers on top of the raw event stream.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod decode;
mod decompress;
mod error;
mod event;
mod journal;
mod metadata;
mod opcode;
mod reader;
mod state;
mod varint;

pub use crate::error::{JournalError, Result};
pub use crate::event::{Event, OwnedEvent, HASH_SIZE};
pub use crate::journal::JournalDecoder;
pub use crate::opcode::Opcode;
pub use crate::state::FieldKind;
pub use streaming_iterator::StreamingIterator;
