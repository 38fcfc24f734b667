//! Binary codec for persisted records.
//!
//! Every value is written little-endian:
//! - strings: `u64` byte length followed by the raw UTF-8 bytes
//! - string lists: `u64` item count followed by each string
//! - scalars: their fixed-width little-endian bit pattern
//!
//! Reads reject implausible size headers by yielding an empty value instead
//! of an error. The header is consumed but the body is not, so a corrupt
//! header usually surfaces as a decoding error a few fields later.

use crate::types::{ExerciseDifficulty, ExerciseType};

/// Strings at least this long are read back as empty.
pub const MAX_STRING_LEN: u64 = 1_000_000;

/// String lists with at least this many items are read back as empty.
pub const MAX_LIST_LEN: u64 = 10_000;

/// A value with a fixed binary layout.
///
/// There is no version tag: changing the field order or width of an
/// implementation invalidates every file written before the change.
pub trait Record: Sized {
    /// Append the encoded record to `buf`.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Decode one record from the reader's current position.
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError>;
}

impl Record for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, self);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.read_string()
    }
}

pub fn write_u8(buf: &mut Vec<u8>, value: u8) {
    buf.push(value);
}

pub fn write_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(u8::from(value));
}

pub fn write_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn write_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn write_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write a length-prefixed string.
pub fn write_string(buf: &mut Vec<u8>, value: &str) {
    write_u64(buf, value.len() as u64);
    buf.extend_from_slice(value.as_bytes());
}

/// Write a count-prefixed list of strings.
pub fn write_string_list(buf: &mut Vec<u8>, values: &[String]) {
    write_u64(buf, values.len() as u64);
    for value in values {
        write_string(buf, value);
    }
}

/// Write a count-prefixed list of records.
pub fn write_records<T: Record>(buf: &mut Vec<u8>, records: &[T]) {
    write_u64(buf, records.len() as u64);
    for record in records {
        record.encode(buf);
    }
}

/// Cursor over an encoded byte buffer.
#[derive(Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset
    }

    /// Consume exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::Truncated {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a one-byte boolean. Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a length-prefixed string.
    ///
    /// A length of `MAX_STRING_LEN` or more yields an empty string.
    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_u64()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len >= MAX_STRING_LEN {
            tracing::warn!(
                "implausible string length {len} at offset {}, reading as empty",
                self.offset
            );
            return Ok(String::new());
        }

        // Bounded by MAX_STRING_LEN above
        #[allow(clippy::cast_possible_truncation)]
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Read a count-prefixed list of strings.
    ///
    /// A count of `MAX_LIST_LEN` or more yields an empty list.
    pub fn read_string_list(&mut self) -> Result<Vec<String>, CodecError> {
        let count = self.read_u64()?;
        if count >= MAX_LIST_LEN {
            tracing::warn!(
                "implausible list length {count} at offset {}, reading as empty",
                self.offset
            );
            return Ok(Vec::new());
        }

        (0..count).map(|_| self.read_string()).collect()
    }

    pub fn read_exercise_type(&mut self) -> Result<ExerciseType, CodecError> {
        let value = self.read_i32()?;
        ExerciseType::try_from(value).map_err(|value| CodecError::InvalidEnum {
            field: "exercise_type",
            value,
        })
    }

    pub fn read_exercise_difficulty(&mut self) -> Result<ExerciseDifficulty, CodecError> {
        let value = self.read_i32()?;
        ExerciseDifficulty::try_from(value).map_err(|value| CodecError::InvalidEnum {
            field: "exercise_difficulty",
            value,
        })
    }
}

/// Errors that can occur while decoding records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended in the middle of a value.
    Truncated { needed: usize, remaining: usize },
    /// An enumeration field holds an unknown discriminant.
    InvalidEnum { field: &'static str, value: i32 },
    /// A string field is not valid UTF-8.
    InvalidUtf8,
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { needed, remaining } => write!(
                f,
                "truncated input: needed {needed} bytes, {remaining} remaining"
            ),
            Self::InvalidEnum { field, value } => {
                write!(f, "invalid value {value} for {field}")
            }
            Self::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
        }
    }
}

impl std::error::Error for CodecError {}
