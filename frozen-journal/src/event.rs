use std::borrow::Cow;

/// Size in bytes of the per-event content hash, when present.
pub const HASH_SIZE: usize = 20;

/// A decoded event record.
///
/// This is reused across calls to keep the hot loop allocation-free: each successful
/// decode overwrites `message` and the scalar fields in place rather than allocating a
/// fresh struct. Borrow it for the duration of one iteration step, or call
/// [`crate::JournalDecoder::next_owned`] for an owned, self-contained copy.
#[derive(Debug, Default, Clone)]
pub struct Event {
    pub(crate) has_hash: bool,
    pub(crate) has_extended_storage: bool,
    pub(crate) include_punctuation: bool,
    pub(crate) hash: [u8; HASH_SIZE],
    pub(crate) stream_id: u64,
    pub(crate) stream_offset: u64,
    pub(crate) stream_sub_offset: u64,
    pub(crate) index_time: i64,
    pub(crate) sub_seconds: u64,
    pub(crate) metadata_count: u64,
    pub(crate) extended_storage_len: usize,
    pub(crate) message: Vec<u8>,
}

impl Event {
    pub(crate) fn reset(&mut self) {
        self.has_hash = false;
        self.has_extended_storage = false;
        self.include_punctuation = false;
        self.hash = [0; HASH_SIZE];
        self.stream_id = 0;
        self.stream_offset = 0;
        self.stream_sub_offset = 0;
        self.index_time = 0;
        self.sub_seconds = 0;
        self.metadata_count = 0;
        self.extended_storage_len = 0;
        self.message.clear();
    }

    /// Whether a content hash was present on the wire.
    pub fn has_hash(&self) -> bool {
        self.has_hash
    }

    /// The 20-byte content hash, if [`Event::has_hash`] is true.
    pub fn hash(&self) -> Option<&[u8; HASH_SIZE]> {
        self.has_hash.then_some(&self.hash)
    }

    /// Whether the frame had a (currently unparsed) extended-storage payload.
    pub fn has_extended_storage(&self) -> bool {
        self.has_extended_storage
    }

    /// Size in bytes of the discarded extended-storage payload, if any.
    pub fn extended_storage_len(&self) -> usize {
        self.extended_storage_len
    }

    /// Whether both punctuation-related opcode bits (`0x02` and `0x20`) were set,
    /// with no other bits in that mask.
    pub fn include_punctuation(&self) -> bool {
        self.include_punctuation
    }

    /// Identifier of the raw-data stream this event's message was sliced from.
    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    /// Byte offset of the event's message within its raw-data stream.
    pub fn stream_offset(&self) -> u64 {
        self.stream_offset
    }

    /// Sub-offset distinguishing events that share a stream offset (e.g. multi-line
    /// events sharing one stream record).
    pub fn stream_sub_offset(&self) -> u64 {
        self.stream_sub_offset
    }

    /// Absolute index time, reconstructed from the rolling base time plus this
    /// event's signed delta.
    pub fn index_time(&self) -> i64 {
        self.index_time
    }

    /// Sub-second component of the index time.
    pub fn sub_seconds(&self) -> u64 {
        self.sub_seconds
    }

    /// Number of typed metadata records attached to this event.
    pub fn metadata_count(&self) -> u64 {
        self.metadata_count
    }

    /// The raw message bytes.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// The message decoded as UTF-8, replacing invalid sequences.
    pub fn message_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }
}

/// A self-contained copy of a decoded event, paired with the host/source/sourcetype
/// strings active at the time it was decoded.
///
/// Unlike [`Event`], this owns every field and outlives the decoder step that
/// produced it, which makes it suitable for buffering, sending across threads, or
/// serializing after the decoder has moved on.
#[derive(Debug, Clone)]
pub struct OwnedEvent {
    pub host: String,
    pub source: String,
    pub source_type: String,
    pub index_time: i64,
    pub sub_seconds: u64,
    pub message: String,
    pub stream_id: u64,
    pub stream_offset: u64,
    pub stream_sub_offset: u64,
}

impl OwnedEvent {
    pub(crate) fn from_event(event: &Event, host: &str, source: &str, source_type: &str) -> Self {
        Self {
            host: host.to_owned(),
            source: source.to_owned(),
            source_type: source_type.to_owned(),
            index_time: event.index_time,
            sub_seconds: event.sub_seconds,
            message: event.message_str().into_owned(),
            stream_id: event.stream_id,
            stream_offset: event.stream_offset,
            stream_sub_offset: event.stream_sub_offset,
        }
    }
}
