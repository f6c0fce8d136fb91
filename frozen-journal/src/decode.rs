use std::io::Read;

use crate::error::{JournalError, Result};
use crate::event::{Event, HASH_SIZE};
use crate::metadata;
use crate::reader::CountedReader;
use crate::state::DecoderState;
use crate::varint::{self, Varint};

/// Comfortably covers the fixed portion of an event header: the message-length
/// varint, an optional extended-storage-length varint, a 20-byte hash, an 8-byte
/// stream id, and five trailing varints (stream offset, stream sub-offset, index
/// time delta, sub-seconds, metadata count), each capped at 10 bytes.
const EVENT_HEADER_PEEK: usize = 128;

/// Bytes of look-ahead used per metadata record: a key varint plus up to three
/// value varints, each capped at 10 bytes.
const METADATA_PEEK: usize = 40;

/// Decodes one event record's header and message into `event`, given the opcode
/// byte already consumed from `reader`.
///
/// Field order follows the wire layout exactly: message length, optional extended
/// storage length, optional hash, stream id, stream offset, stream sub-offset,
/// index time delta, sub-seconds, metadata count, metadata records, optional
/// extended storage payload, then the message itself. The message length is not
/// stored directly on the wire — it's derived from an end offset computed right
/// after the length varint is read (`pos_after_opcode + varint_len + raw_value`),
/// so every byte consumed afterward narrows the remaining span.
pub(crate) fn decode_event<R: Read>(
    reader: &mut CountedReader<R>,
    state: &DecoderState,
    opcode: u8,
    event: &mut Event,
) -> Result<()> {
    let is_legacy = opcode <= 2;
    event.has_hash = if is_legacy { opcode == 2 } else { opcode & 0x01 == 0 };
    event.has_extended_storage = !is_legacy && opcode & 0x04 != 0;
    event.include_punctuation = !is_legacy && opcode & 0x22 == 0x22;

    let pos_after_opcode = reader.pos();
    let peek = reader.peek(EVENT_HEADER_PEEK)?.to_vec();
    let mut offset = 0usize;

    let (message_length_raw, len_n) = match varint::decode_uvarint(&peek) {
        Varint::Ok(v, n) => (v, n),
        Varint::NeedMore(_) => {
            return Err(JournalError::UnexpectedEof {
                context: "message length",
            })
        }
        Varint::Malformed => {
            return Err(JournalError::BadVarint {
                context: "message length",
                pos: pos_after_opcode,
            })
        }
    };
    offset += len_n;
    let effective_end = pos_after_opcode as i64 + len_n as i64 + message_length_raw as i64;

    let mut extended_storage_len = 0u64;
    if event.has_extended_storage {
        extended_storage_len = take_uvarint(
            &peek,
            &mut offset,
            "extended storage length",
            pos_after_opcode,
        )?;
    }

    if event.has_hash {
        if peek.len() < offset + HASH_SIZE {
            return Err(JournalError::UnexpectedEof {
                context: "event hash",
            });
        }
        event.hash.copy_from_slice(&peek[offset..offset + HASH_SIZE]);
        offset += HASH_SIZE;
    } else {
        event.hash = [0u8; HASH_SIZE];
    }

    if peek.len() < offset + 8 {
        return Err(JournalError::UnexpectedEof { context: "stream id" });
    }
    event.stream_id = u64::from_le_bytes(peek[offset..offset + 8].try_into().unwrap());
    offset += 8;

    event.stream_offset = take_uvarint(&peek, &mut offset, "stream offset", pos_after_opcode)?;
    event.stream_sub_offset = take_uvarint(
        &peek,
        &mut offset,
        "stream sub-offset",
        pos_after_opcode,
    )?;

    let index_time_delta = take_varint(&peek, &mut offset, "index time delta", pos_after_opcode)?;
    event.index_time = state.base_time as i64 + index_time_delta;

    event.sub_seconds = take_uvarint(&peek, &mut offset, "sub-seconds", pos_after_opcode)?;
    event.metadata_count = take_uvarint(&peek, &mut offset, "metadata count", pos_after_opcode)?;

    reader.discard(offset)?;

    for _ in 0..event.metadata_count {
        let meta_peek = reader.peek(METADATA_PEEK)?.to_vec();
        let pos = reader.pos();
        let consumed = metadata::metadata_record_len(&meta_peek, opcode, pos)?;
        reader.discard(consumed)?;
    }

    if event.has_extended_storage {
        // Extended storage payloads aren't parsed yet; discard them without
        // materializing the bytes.
        let discarded = reader.discard(extended_storage_len as usize)?;
        event.extended_storage_len = discarded;
        log::debug!("discarded {discarded} bytes of unimplemented extended storage");
    }

    let message_length = effective_end - reader.pos() as i64;
    if message_length < 0 {
        return Err(JournalError::NegativeMessageLength {
            effective_end,
            pos: reader.pos(),
        });
    }

    reader.read_into(message_length as usize, &mut event.message, "event message")?;

    Ok(())
}

fn take_uvarint(peek: &[u8], offset: &mut usize, context: &'static str, pos: u64) -> Result<u64> {
    match varint::decode_uvarint(&peek[*offset..]) {
        Varint::Ok(v, n) => {
            *offset += n;
            Ok(v)
        }
        Varint::NeedMore(_) => Err(JournalError::UnexpectedEof { context }),
        Varint::Malformed => Err(JournalError::BadVarint { context, pos }),
    }
}

fn take_varint(peek: &[u8], offset: &mut usize, context: &'static str, pos: u64) -> Result<i64> {
    match varint::decode_varint(&peek[*offset..]) {
        Varint::Ok(v, n) => {
            *offset += n;
            Ok(v)
        }
        Varint::NeedMore(_) => Err(JournalError::UnexpectedEof { context }),
        Varint::Malformed => Err(JournalError::BadVarint { context, pos }),
    }
}
