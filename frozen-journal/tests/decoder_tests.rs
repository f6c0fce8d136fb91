use std::fs;
use std::io::Write;

use frozen_journal::{JournalDecoder, JournalError, StreamingIterator};

fn encode_uvarint(mut v: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (v & 0x7F) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
    out
}

fn encode_varint(v: i64) -> Vec<u8> {
    let zigzag = ((v << 1) ^ (v >> 63)) as u64;
    encode_uvarint(zigzag)
}

/// Appends `opcode=3` (new host) / `4` (new source) / `5` (new sourcetype), a length
/// varint, and the UTF-8 bytes.
fn push_string_field(out: &mut Vec<u8>, opcode: u8, value: &str) {
    out.push(opcode);
    out.extend(encode_uvarint(value.len() as u64));
    out.extend(value.as_bytes());
}

fn push_active_host(out: &mut Vec<u8>, index: u64) {
    out.push(16 | 0x08);
    out.extend(encode_uvarint(index));
}

fn push_base_time(out: &mut Vec<u8>, base_time: i32) {
    out.push(16 | 0x01);
    out.extend(base_time.to_le_bytes());
}

/// Builds a minimal modern event frame (opcode 33: no hash, no extended storage, no
/// punctuation) with one metadata record and the given message/index-time-delta.
fn push_minimal_event(out: &mut Vec<u8>, stream_id: u64, index_time_delta: i64, message: &str) {
    let mut body = Vec::new();
    body.extend(stream_id.to_le_bytes());
    body.extend(encode_uvarint(0)); // stream_offset
    body.extend(encode_uvarint(0)); // stream_sub_offset
    body.extend(encode_varint(index_time_delta));
    body.extend(encode_uvarint(0)); // sub_seconds
    body.extend(encode_uvarint(1)); // metadata_count
    body.extend(encode_uvarint(4)); // metadata key (low 2 bits 0 -> shifted tag 0 -> one extra value)
    body.extend(encode_varint(-3)); // metadata value

    let raw = message.len() as u64 + body.len() as u64;
    out.push(33);
    out.extend(encode_uvarint(raw));
    out.extend(body);
    out.extend(message.as_bytes());
}

/// Builds a legacy event frame (opcode 1, no hash, or opcode 2, with a 20-byte hash)
/// with one fixed metadata value and the given message.
fn push_legacy_event(out: &mut Vec<u8>, opcode: u8, hash: Option<&[u8; 20]>, message: &str) {
    let mut body = Vec::new();
    if let Some(hash) = hash {
        body.extend(hash);
    }
    body.extend(7u64.to_le_bytes()); // stream_id
    body.extend(encode_uvarint(0)); // stream_offset
    body.extend(encode_uvarint(0)); // stream_sub_offset
    body.extend(encode_varint(0)); // index_time_delta
    body.extend(encode_uvarint(0)); // sub_seconds
    body.extend(encode_uvarint(1)); // metadata_count
    body.extend(encode_uvarint(0)); // metadata key
    body.extend(encode_varint(-1)); // metadata value (legacy: always one value)

    let raw = message.len() as u64 + body.len() as u64;
    out.push(opcode);
    out.extend(encode_uvarint(raw));
    out.extend(body);
    out.extend(message.as_bytes());
}

fn write_bucket(dir: &std::path::Path, journal: &[u8]) {
    let rawdata = dir.join("rawdata");
    fs::create_dir_all(&rawdata).unwrap();
    fs::write(rawdata.join("journal"), journal).unwrap();
}

#[test]
fn decodes_dictionary_state_and_event_message() {
    let mut journal = Vec::new();
    push_string_field(&mut journal, 3, "web01");
    push_active_host(&mut journal, 1);
    push_base_time(&mut journal, 1000);
    push_minimal_event(&mut journal, 0x1122_3344_5566_7788, 5, "hello world");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    let event = decoder.next_owned().expect("one event");

    assert_eq!(event.host, "web01");
    assert_eq!(event.source, "");
    assert_eq!(event.stream_id, 0x1122_3344_5566_7788);
    assert_eq!(event.index_time, 1005);
    assert_eq!(event.message, "hello world");

    assert!(decoder.next_owned().is_none());
    assert!(decoder.error().is_none());
}

#[test]
fn decodes_zstd_compressed_journal() {
    let mut journal = Vec::new();
    push_minimal_event(&mut journal, 42, 0, "compressed event");

    let compressed = zstd::stream::encode_all(&journal[..], 3).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let rawdata = dir.path().join("rawdata");
    fs::create_dir_all(&rawdata).unwrap();
    let mut f = fs::File::create(rawdata.join("journal.zst")).unwrap();
    f.write_all(&compressed).unwrap();
    drop(f);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    let event = decoder.next_owned().expect("one event");
    assert_eq!(event.message, "compressed event");
    assert!(decoder.next_owned().is_none());
}

#[test]
fn reports_negative_message_length_as_framing_error() {
    // raw=0 makes effective_end land before the header has even finished, which
    // forces a negative computed message length.
    let mut journal = vec![33u8];
    journal.extend(encode_uvarint(0));
    journal.extend(0u64.to_le_bytes()); // stream_id
    journal.extend(encode_uvarint(0)); // stream_offset
    journal.extend(encode_uvarint(0)); // stream_sub_offset
    journal.extend(encode_varint(0)); // index_time_delta
    journal.extend(encode_uvarint(0)); // sub_seconds
    journal.extend(encode_uvarint(0)); // metadata_count

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    assert!(decoder.next_owned().is_none());
    assert!(matches!(
        decoder.error(),
        Some(JournalError::NegativeMessageLength { .. })
    ));
}

#[test]
fn reports_unknown_opcode_as_framing_error() {
    let journal = vec![12u8];

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    assert!(decoder.next_owned().is_none());
    assert!(matches!(
        decoder.error(),
        Some(JournalError::UnknownOpcode { opcode: 12, .. })
    ));
}

#[test]
fn nop_opcodes_are_skipped_silently() {
    let mut journal = vec![0u8, 0u8, 0u8];
    push_minimal_event(&mut journal, 1, 0, "after nops");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    let event = decoder.next_owned().expect("one event");
    assert_eq!(event.message, "after nops");
}

#[test]
fn header_only_journal_yields_no_events() {
    // version=1, align_bits=0, base_index_time=0
    let journal = vec![10u8, 1, 0, 0, 0, 0, 0];

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    assert!(decoder.next_owned().is_none());
    assert!(decoder.error().is_none());
}

#[test]
fn state_change_opcode_only_touches_bits_it_sets() {
    // Appending a host string does not make it active on its own: only a
    // state-change opcode with the 0x08 bit set points `active_host` at an
    // ordinal. A state-change opcode that sets only base_time (bit 0x01) must
    // leave `host()` at "" even though a host string exists in the dictionary.
    let mut journal = Vec::new();
    push_string_field(&mut journal, 3, "h1");
    journal.push(16 | 0x01); // base_time only
    journal.extend(1i32.to_le_bytes());
    push_minimal_event(&mut journal, 1, 0, "hello");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    let event = decoder.next_owned().expect("one event");
    assert_eq!(event.host, "");
    assert_eq!(event.message, "hello");
    assert_eq!(event.index_time, 1);
}

#[test]
fn later_active_source_wins_over_earlier_dictionary_entries() {
    let mut journal = Vec::new();
    push_string_field(&mut journal, 4, "s1");
    push_string_field(&mut journal, 4, "s2");
    journal.push(16 | 0x04); // activate source
    journal.extend(encode_uvarint(2));
    push_minimal_event(&mut journal, 1, 0, "from s2");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    let event = decoder.next_owned().expect("one event");
    assert_eq!(event.source, "s2");
}

#[test]
fn unknown_opcode_between_valid_events_yields_the_first_then_stops() {
    let mut journal = Vec::new();
    push_minimal_event(&mut journal, 1, 0, "first");
    journal.push(0x7F);
    push_minimal_event(&mut journal, 2, 0, "second");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    let first = decoder.next_owned().expect("first event");
    assert_eq!(first.message, "first");
    assert!(decoder.next_owned().is_none());
    assert!(matches!(
        decoder.error(),
        Some(JournalError::UnknownOpcode { opcode: 0x7F, .. })
    ));
}

#[test]
fn legacy_event_without_hash_decodes() {
    let mut journal = Vec::new();
    push_legacy_event(&mut journal, 1, None, "old style");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    decoder.advance();
    let event = decoder.get().expect("one event");
    assert!(!event.has_hash());
    assert!(event.hash().is_none());
    assert_eq!(event.message_str(), "old style");
}

#[test]
fn legacy_event_with_hash_round_trips() {
    let hash: [u8; 20] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,
    ];
    let mut journal = Vec::new();
    push_legacy_event(&mut journal, 2, Some(&hash), "hashed event");

    let dir = tempfile::tempdir().unwrap();
    write_bucket(dir.path(), &journal);

    let mut decoder = JournalDecoder::open(dir.path()).unwrap();
    decoder.advance();
    let event = decoder.get().expect("one event");
    assert!(event.has_hash());
    assert_eq!(event.hash(), Some(&hash));
    assert_eq!(event.message_str(), "hashed event");
}

#[test]
fn missing_journal_file_is_a_clear_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("rawdata")).unwrap();
    let err = JournalDecoder::open(dir.path()).unwrap_err();
    assert!(matches!(err, JournalError::JournalNotFound(_)));
}
