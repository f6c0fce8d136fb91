use std::path::Path;

use streaming_iterator::StreamingIterator;

use crate::decode;
use crate::decompress::{self, JournalSource};
use crate::error::{JournalError, Result};
use crate::event::{Event, OwnedEvent};
use crate::opcode::{self, Opcode};
use crate::reader::CountedReader;
use crate::state::{DecoderState, FieldKind};
use crate::varint::{self, Varint};

/// Enough look-ahead for a single uvarint, used by the small fixed-shape opcodes
/// outside the event/metadata hot path.
const SMALL_FIELD_PEEK: usize = 10;

/// Streams events out of a frozen bucket's journal, maintaining the dictionaries and
/// active-index/base-time state that event records are decoded against.
///
/// Implements [`StreamingIterator`] so a single reusable [`Event`] is overwritten on
/// each step; call [`JournalDecoder::next_owned`] instead when a self-contained copy
/// is more convenient than chasing a borrow.
pub struct JournalDecoder {
    reader: CountedReader<JournalSource>,
    state: DecoderState,
    event: Event,
    has_current: bool,
    error: Option<JournalError>,
}

impl JournalDecoder {
    /// Opens the journal stream under `bucket_dir` (its `rawdata/journal` or
    /// `rawdata/journal.zst`).
    pub fn open(bucket_dir: impl AsRef<Path>) -> Result<Self> {
        let source = decompress::open_bucket(bucket_dir)?;
        Ok(Self {
            reader: CountedReader::new(source),
            state: DecoderState::default(),
            event: Event::default(),
            has_current: false,
            error: None,
        })
    }

    /// The host string currently active for events decoded from here on.
    pub fn host(&self) -> &str {
        self.state.host()
    }

    /// The source string currently active for events decoded from here on.
    pub fn source(&self) -> &str {
        self.state.source()
    }

    /// The sourcetype string currently active for events decoded from here on.
    pub fn source_type(&self) -> &str {
        self.state.source_type()
    }

    /// The error that ended iteration, if it ended abnormally.
    ///
    /// A clean end of stream leaves this `None`; callers that need to distinguish
    /// "ran out of events" from "the journal is corrupt" should check this after
    /// `next`/`next_owned` returns `None`.
    pub fn error(&self) -> Option<&JournalError> {
        self.error.as_ref()
    }

    /// Decodes the next event and returns an owned, self-contained copy of it.
    pub fn next_owned(&mut self) -> Option<OwnedEvent> {
        self.advance();
        self.get().map(|event| {
            OwnedEvent::from_event(event, self.state.host(), self.state.source(), self.state.source_type())
        })
    }

    fn step(&mut self) -> Result<bool> {
        loop {
            let opcode = match self.reader.read_byte()? {
                Some(b) => b,
                None => return Ok(false),
            };

            if opcode::is_event(opcode) {
                self.event.reset();
            }

            self.dispatch(opcode)?;

            if opcode::is_event(opcode) {
                return Ok(true);
            }
        }
    }

    fn dispatch(&mut self, opcode: u8) -> Result<()> {
        if opcode == 0 {
            return Ok(());
        }
        if opcode::is_state_change(opcode) {
            return self.decode_state_change(opcode);
        }
        if opcode::is_event(opcode) {
            return decode::decode_event(&mut self.reader, &self.state, opcode, &mut self.event);
        }
        match Opcode::from_u8(opcode) {
            Some(Opcode::Header) => self.decode_header(),
            Some(Opcode::SplunkPrivate) => self.decode_splunk_private(),
            Some(Opcode::NewHost) => self.decode_string_field(FieldKind::Host),
            Some(Opcode::NewSource) => self.decode_string_field(FieldKind::Source),
            Some(Opcode::NewSourceType) => self.decode_string_field(FieldKind::SourceType),
            Some(Opcode::NewString) => self.decode_string_field(FieldKind::String),
            _ => Err(JournalError::UnknownOpcode {
                opcode,
                pos: self.reader.pos(),
            }),
        }
    }

    /// State-change opcodes (17-31) toggle their payload fields by bit, highest to
    /// lowest: host active index, source active index, sourcetype active index,
    /// then a 4-byte little-endian signed base time.
    fn decode_state_change(&mut self, opcode: u8) -> Result<()> {
        if opcode & 0x08 != 0 {
            let index = self.read_uvarint_field("active host index")?;
            self.state.set_active(FieldKind::Host, index)?;
        }
        if opcode & 0x04 != 0 {
            let index = self.read_uvarint_field("active source index")?;
            self.state.set_active(FieldKind::Source, index)?;
        }
        if opcode & 0x02 != 0 {
            let index = self.read_uvarint_field("active sourcetype index")?;
            self.state.set_active(FieldKind::SourceType, index)?;
        }
        if opcode & 0x01 != 0 {
            let bytes = self.reader.read_exact(4, "base time")?;
            self.state.base_time = i32::from_le_bytes(bytes.try_into().unwrap());
        }
        Ok(())
    }

    fn decode_header(&mut self) -> Result<()> {
        let bytes = self.reader.read_exact(6, "journal header")?;
        let version = bytes[0];
        let align_bits = bytes[1];
        let base_index_time = u32::from_le_bytes(bytes[2..6].try_into().unwrap());
        log::info!(
            "journal header: version={version} align_bits={align_bits} base_index_time={base_index_time}"
        );
        Ok(())
    }

    fn decode_splunk_private(&mut self) -> Result<()> {
        let len = self.read_uvarint_field("splunk-private length")?;
        self.reader.discard(len as usize)?;
        Ok(())
    }

    fn decode_string_field(&mut self, kind: FieldKind) -> Result<()> {
        let len = self.read_uvarint_field("string field length")?;
        let bytes = self.reader.read_exact(len as usize, "string field")?;
        let value = String::from_utf8_lossy(&bytes).into_owned();
        self.state.dictionary_mut(kind).push(value);
        Ok(())
    }

    fn read_uvarint_field(&mut self, context: &'static str) -> Result<u64> {
        let peek = self.reader.peek(SMALL_FIELD_PEEK)?.to_vec();
        let pos = self.reader.pos();
        match varint::decode_uvarint(&peek) {
            Varint::Ok(v, n) => {
                self.reader.discard(n)?;
                Ok(v)
            }
            Varint::NeedMore(_) => Err(JournalError::UnexpectedEof { context }),
            Varint::Malformed => Err(JournalError::BadVarint { context, pos }),
        }
    }
}

impl StreamingIterator for JournalDecoder {
    type Item = Event;

    fn advance(&mut self) {
        if self.error.is_some() {
            self.has_current = false;
            return;
        }
        match self.step() {
            Ok(true) => self.has_current = true,
            Ok(false) => self.has_current = false,
            Err(e) => {
                self.error = Some(e);
                self.has_current = false;
            }
        }
    }

    fn get(&self) -> Option<&Event> {
        self.has_current.then_some(&self.event)
    }
}
