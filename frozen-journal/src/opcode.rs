/// The fixed, non-bitfield opcodes.
///
/// Opcodes 17-31 (state-change) and 32-43 (event) are deliberately *not* modeled as
/// enum variants here: each bit in those ranges independently toggles a field in the
/// record, so the numeric value itself is the meaningful representation. Folding 2^n
/// combinations into enum variants would lose that structure. See [`is_state_change`]
/// and [`is_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop = 0,
    /// Old-style event without a content hash.
    LegacyEvent = 1,
    /// Old-style event with a content hash.
    LegacyEventWithHash = 2,
    NewHost = 3,
    NewSource = 4,
    NewSourceType = 5,
    NewString = 6,
    /// Reserved; encountering it is a framing error until a payload shape is defined.
    Delete = 8,
    SplunkPrivate = 9,
    Header = 10,
    /// Reserved; encountering it is a framing error until a payload shape is defined.
    HashSlice = 11,
}

impl Opcode {
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Nop,
            1 => Self::LegacyEvent,
            2 => Self::LegacyEventWithHash,
            3 => Self::NewHost,
            4 => Self::NewSource,
            5 => Self::NewSourceType,
            6 => Self::NewString,
            8 => Self::Delete,
            9 => Self::SplunkPrivate,
            10 => Self::Header,
            11 => Self::HashSlice,
            _ => return None,
        })
    }
}

/// Whether `opcode` falls in the state-change bitfield range.
pub(crate) fn is_state_change(opcode: u8) -> bool {
    (17..=31).contains(&opcode)
}

/// Whether `opcode` is an event record: either of the two legacy enum values, or
/// anything in the modern bitfield range.
pub(crate) fn is_event(opcode: u8) -> bool {
    matches!(opcode, 1 | 2) || (32..=43).contains(&opcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_ranges() {
        assert!(is_state_change(17));
        assert!(is_state_change(31));
        assert!(!is_state_change(32));
        assert!(is_event(1));
        assert!(is_event(2));
        assert!(is_event(32));
        assert!(is_event(43));
        assert!(!is_event(44));
        assert!(!is_event(3));
    }
}
