use crate::error::{JournalError, Result};

/// Which append-only dictionary a string-definition or active-index opcode refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Host,
    Source,
    SourceType,
    /// The generic string table populated by the plain "new string" opcode. Not
    /// selected by any active-index bit; metadata records address it directly by
    /// ordinal.
    String,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Source => "source",
            Self::SourceType => "sourcetype",
            Self::String => "string",
        }
    }
}

/// Running state threaded through a journal decode: the append-only string
/// dictionaries, which ordinal is currently active in each, and the rolling base
/// time used to delta-decode event index times.
#[derive(Debug, Default)]
pub struct DecoderState {
    host_dict: Vec<String>,
    source_dict: Vec<String>,
    source_type_dict: Vec<String>,
    string_dict: Vec<String>,
    active_host: u64,
    active_source: u64,
    active_source_type: u64,
    pub(crate) base_time: i32,
}

impl DecoderState {
    fn dictionary(&self, kind: FieldKind) -> &[String] {
        match kind {
            FieldKind::Host => &self.host_dict,
            FieldKind::Source => &self.source_dict,
            FieldKind::SourceType => &self.source_type_dict,
            FieldKind::String => &self.string_dict,
        }
    }

    pub(crate) fn dictionary_mut(&mut self, kind: FieldKind) -> &mut Vec<String> {
        match kind {
            FieldKind::Host => &mut self.host_dict,
            FieldKind::Source => &mut self.source_dict,
            FieldKind::SourceType => &mut self.source_type_dict,
            FieldKind::String => &mut self.string_dict,
        }
    }

    /// Points the active index for `kind` at `index` (1-based), failing if it falls
    /// past the entries appended so far. `index == 0` is a legitimate "unset"
    /// assignment, not an out-of-range one, and never errors.
    pub(crate) fn set_active(&mut self, kind: FieldKind, index: u64) -> Result<()> {
        let len = self.dictionary(kind).len() as u64;
        if index > len {
            return Err(JournalError::DictionaryIndexOutOfBounds {
                kind: kind.name(),
                index,
                len: len as usize,
            });
        }
        match kind {
            FieldKind::Host => self.active_host = index,
            FieldKind::Source => self.active_source = index,
            FieldKind::SourceType => self.active_source_type = index,
            FieldKind::String => {}
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        active_entry(&self.host_dict, self.active_host)
    }

    pub fn source(&self) -> &str {
        active_entry(&self.source_dict, self.active_source)
    }

    pub fn source_type(&self) -> &str {
        active_entry(&self.source_type_dict, self.active_source_type)
    }
}

fn active_entry(dict: &[String], index: u64) -> &str {
    if index == 0 {
        return "";
    }
    dict[(index - 1) as usize].as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_active_index_past_dictionary_end() {
        let mut state = DecoderState::default();
        state.dictionary_mut(FieldKind::Host).push("web01".to_owned());
        assert!(state.set_active(FieldKind::Host, 1).is_ok());
        assert_eq!(state.host(), "web01");
        assert!(state.set_active(FieldKind::Host, 2).is_err());
    }

    #[test]
    fn zero_is_a_valid_unset_assignment() {
        let mut state = DecoderState::default();
        state.dictionary_mut(FieldKind::Host).push("web01".to_owned());
        state.set_active(FieldKind::Host, 1).unwrap();
        assert_eq!(state.host(), "web01");
        state.set_active(FieldKind::Host, 0).unwrap();
        assert_eq!(state.host(), "");
    }

    #[test]
    fn dictionary_append_is_monotonic() {
        let mut state = DecoderState::default();
        state.dictionary_mut(FieldKind::Source).push("a.log".to_owned());
        state.dictionary_mut(FieldKind::Source).push("b.log".to_owned());
        state.set_active(FieldKind::Source, 2).unwrap();
        assert_eq!(state.source(), "b.log");
        state.set_active(FieldKind::Source, 1).unwrap();
        assert_eq!(state.source(), "a.log");
    }
}
