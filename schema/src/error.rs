use thiserror::Error;

/// Failures raised by generated codecs while reading or writing a buffer.
///
/// None of these are retried: each one reports a caller mistake (an index past
/// a fixed array, a count outside a group's bounds, a payload too long for its
/// length header) or, under the strict enum policy, bytes the schema does not
/// describe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("index out of range for {field}: index={index}, length={length}")]
    IndexOutOfRange {
        field:  &'static str,
        index:  usize,
        length: usize,
    },

    #[error("no more repetitions in group {group}: count={count}")]
    GroupExhausted {
        group: &'static str,
        count: usize,
    },

    #[error("count outside allowed range for group {group}: count={count}, min={min}, max={max}")]
    CountOutOfRange {
        group: &'static str,
        count: u64,
        min:   u64,
        max:   u64,
    },

    #[error("length > maxValue for {field}: length={length}, max={max}")]
    LengthExceedsMaximum {
        field:  &'static str,
        length: usize,
        max:    usize,
    },

    #[error("unknown value {value} for enum {type_name}")]
    UnknownEnumValue {
        type_name: &'static str,
        value:     i64,
    },

    #[error("destination too small for {field}: required={required}, available={available}")]
    DestinationTooSmall {
        field:     &'static str,
        required:  usize,
        available: usize,
    },

    #[error("character {character:?} cannot be encoded as {encoding}")]
    Unrepresentable {
        encoding:  &'static str,
        character: char,
    },
}
