use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use frozen_journal::OwnedEvent;

/// A flat, serializable projection of a decoded event, independent of the core
/// crate's internal buffer-reuse representation.
#[derive(Debug, Clone, Serialize)]
pub struct EventProjection {
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

impl From<&OwnedEvent> for EventProjection {
    fn from(event: &OwnedEvent) -> Self {
        Self {
            host: event.host.clone(),
            source: event.source.clone(),
            source_type: event.source_type.clone(),
            index_time: event.index_time,
            sub_seconds: event.sub_seconds,
            message: event.message.clone(),
            stream_id: event.stream_id,
            stream_offset: event.stream_offset,
            stream_sub_offset: event.stream_sub_offset,
        }
    }
}

/// Destination for decoded events.
pub trait Sink {
    fn write_event(&mut self, event: &EventProjection) -> Result<()>;

    /// Called once after the last event to flush any buffered state.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One human-readable line per event: `host source sourcetype message`.
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn write_event(&mut self, event: &EventProjection) -> Result<()> {
        writeln!(
            self.writer,
            "{} {} {} {}",
            event.host, event.source, event.source_type, event.message
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Newline-delimited JSON: one compact object per line.
pub struct JsonlSink<W> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Sink for JsonlSink<W> {
    fn write_event(&mut self, event: &EventProjection) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A single pretty-printed JSON array, buffering events until [`Sink::finish`].
pub struct JsonArraySink<W> {
    writer: W,
    events: Vec<EventProjection>,
}

impl<W: Write> JsonArraySink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            events: Vec::new(),
        }
    }
}

impl<W: Write> Sink for JsonArraySink<W> {
    fn write_event(&mut self, event: &EventProjection) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut self.writer, formatter);
        self.events.serialize(&mut serializer)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// RFC 4180 CSV, one row per event.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }
}

impl<W: Write> Sink for CsvSink<W> {
    fn write_event(&mut self, event: &EventProjection) -> Result<()> {
        self.writer.serialize(event)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventProjection {
        EventProjection {
            host: "web01".into(),
            source: "/var/log/app.log".into(),
            source_type: "app_log".into(),
            index_time: 1_700_000_000,
            sub_seconds: 0,
            message: "hello".into(),
            stream_id: 7,
            stream_offset: 0,
            stream_sub_offset: 0,
        }
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonlSink::new(&mut buf);
            sink.write_event(&sample()).unwrap();
            sink.write_event(&sample()).unwrap();
            sink.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().starts_with('{'));
    }

    #[test]
    fn text_sink_formats_host_source_sourcetype_message() {
        let mut buf = Vec::new();
        {
            let mut sink = TextSink::new(&mut buf);
            sink.write_event(&sample()).unwrap();
            sink.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "web01 /var/log/app.log app_log hello\n");
    }
}
