use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{JournalError, Result};

/// A bucket's raw journal byte stream, transparently decompressed when the bucket stores
/// `rawdata/journal.zst` instead of a plain `rawdata/journal`.
///
/// zstd decoders generally can't support cheap peeking of their own, so this only
/// implements [`Read`]; [`crate::reader::CountedReader`] layers the peek-ahead buffer
/// on top.
pub enum JournalSource {
    Plain(File),
    Zstd(Box<zstd::stream::read::Decoder<'static, BufReader<File>>>),
}

impl Read for JournalSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(f) => f.read(buf),
            Self::Zstd(d) => d.read(buf),
        }
    }
}

/// Opens the journal stream for a frozen bucket directory, preferring a compressed
/// `rawdata/journal.zst` over an uncompressed `rawdata/journal` when both exist.
pub fn open_bucket(bucket_dir: impl AsRef<Path>) -> Result<JournalSource> {
    let rawdata = bucket_dir.as_ref().join("rawdata");

    let compressed = rawdata.join("journal.zst");
    if compressed.is_file() {
        let file = File::open(&compressed)?;
        let decoder = zstd::stream::read::Decoder::with_buffer(BufReader::new(file))
            .map_err(JournalError::Decompression)?;
        return Ok(JournalSource::Zstd(Box::new(decoder)));
    }

    let plain = rawdata.join("journal");
    if plain.is_file() {
        return Ok(JournalSource::Plain(File::open(&plain)?));
    }

    Err(JournalError::JournalNotFound(rawdata))
}
