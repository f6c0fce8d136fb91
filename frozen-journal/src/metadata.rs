use crate::error::{JournalError, Result};
use crate::varint::{self, Varint};

/// Decodes a single typed metadata record at the start of `peek` and returns how many
/// bytes it occupies, without exposing its content: metadata is framing overhead that
/// decoders must skip correctly, not a field surfaced on [`crate::Event`] today.
///
/// Every record starts with a key varint. Legacy event opcodes (1 and 2) carry a fixed
/// extra count of one signed varint with no type tag at all. For opcodes 3 through 35,
/// the key is shifted left two bits before its low 4 bits select a row of the 16-entry
/// type table below. For opcode 36 and above, the low 4 bits of the raw key select that
/// same row directly. Three of the table's sixteen rows are reserved placeholders and
/// encountering one is a framing error.
pub(crate) fn metadata_record_len(peek: &[u8], event_opcode: u8, pos: u64) -> Result<usize> {
    let (meta_key, key_len) = match varint::decode_uvarint(peek) {
        Varint::Ok(v, n) => (v, n),
        Varint::NeedMore(_) => return Err(JournalError::UnexpectedEof { context: "metadata key" }),
        Varint::Malformed => return Err(JournalError::BadVarint { context: "metadata key", pos }),
    };

    let extra = if event_opcode <= 2 {
        1
    } else {
        let type_tag = if event_opcode < 36 {
            ((meta_key << 2) & 0xF) as u8
        } else {
            (meta_key & 0xF) as u8
        };
        type_extra_ints(type_tag)
            .ok_or(JournalError::ReservedMetadataTag { tag: type_tag, pos })?
    };

    let mut offset = key_len;
    for _ in 0..extra {
        match varint::decode_varint(&peek[offset..]) {
            Varint::Ok(_, n) => offset += n,
            Varint::NeedMore(_) => {
                return Err(JournalError::UnexpectedEof { context: "metadata value" })
            }
            Varint::Malformed => {
                return Err(JournalError::BadVarint { context: "metadata value", pos })
            }
        }
    }
    Ok(offset)
}

/// Extra signed-varint count per combined metadata type tag (low 4 bits of the key).
/// Tags 1, 5, and 13 are reserved placeholders with no defined payload shape.
fn type_extra_ints(tag: u8) -> Option<u64> {
    match tag {
        0 => Some(1),
        2 => Some(1),
        3 => Some(2),
        4 => Some(2),
        6 => Some(2),
        7 => Some(3),
        8 => Some(1),
        9 => Some(1),
        10 => Some(1),
        11 => Some(2),
        12 => Some(3),
        14 => Some(2),
        15 => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_opcode_uses_fixed_extra_count() {
        // Legacy opcodes never shift the key or touch the type table: always one value.
        let consumed = metadata_record_len(&[0x0F, 0x00], 2, 0).unwrap();
        assert_eq!(consumed, 2);
    }

    #[test]
    fn type_table_consulted_via_shifted_key_below_opcode_36() {
        // key=2 shifted left two bits -> tag 8 (UNSIGNED), one extra varint.
        let consumed = metadata_record_len(&[0x02, 0x00], 10, 0).unwrap();
        assert_eq!(consumed, 2);

        // key=3 shifted left two bits -> tag 12 (OFFSET_LEN_WENCODING), three extras.
        let consumed = metadata_record_len(&[0x03, 0x00, 0x00, 0x00], 10, 0).unwrap();
        assert_eq!(consumed, 4);
    }

    #[test]
    fn type_table_consulted_at_opcode_36_and_above() {
        // tag 15 needs zero extra varints, so just the key byte is consumed.
        let consumed = metadata_record_len(&[0x0F], 36, 0).unwrap();
        assert_eq!(consumed, 1);
    }

    #[test]
    fn reserved_tag_is_fatal_at_opcode_36_and_above() {
        let err = metadata_record_len(&[0x01], 36, 42).unwrap_err();
        assert!(matches!(
            err,
            JournalError::ReservedMetadataTag { tag: 1, pos: 42 }
        ));
    }
}
