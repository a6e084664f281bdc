use serde::{Deserialize, Serialize};
use tplg_types::names::{parse_bool, parse_int};
use tplg_types::TupleType;
use uuid::Uuid;

use crate::error::{TupleError, TupleResult};

/// A single typed tuple value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TupleValue {
    Uuid([u8; 16]),
    String(String),
    Bool(bool),
    Byte(u8),
    Short(u16),
    Word(u32),
}

impl TupleValue {
    /// Parse a literal for a set of the given type.
    pub fn parse(tuple_type: TupleType, token: &str, text: &str) -> TupleResult<Self> {
        let invalid = || TupleError::InvalidValue {
            tuple_type: type_name(tuple_type),
            token: token.to_string(),
            value: text.to_string(),
        };
        match tuple_type {
            TupleType::Uuid => parse_uuid(text).map(Self::Uuid).ok_or_else(invalid),
            TupleType::String => Ok(Self::String(text.to_string())),
            TupleType::Bool => parse_bool(text).map(Self::Bool).map_err(|_| invalid()),
            TupleType::Byte => parse_int(text)
                .ok()
                .and_then(|v| u8::try_from(v).ok())
                .map(Self::Byte)
                .ok_or_else(invalid),
            TupleType::Short => parse_int(text)
                .ok()
                .and_then(|v| u16::try_from(v).ok())
                .map(Self::Short)
                .ok_or_else(invalid),
            TupleType::Word => parse_int(text)
                .ok()
                .and_then(|v| u32::try_from(v).ok())
                .map(Self::Word)
                .ok_or_else(invalid),
        }
    }

    /// The set type this value belongs to.
    pub fn tuple_type(&self) -> TupleType {
        match self {
            Self::Uuid(_) => TupleType::Uuid,
            Self::String(_) => TupleType::String,
            Self::Bool(_) => TupleType::Bool,
            Self::Byte(_) => TupleType::Byte,
            Self::Short(_) => TupleType::Short,
            Self::Word(_) => TupleType::Word,
        }
    }

    /// Numeric value for the integer-like types.
    pub fn as_word(&self) -> Option<u32> {
        match self {
            Self::Bool(b) => Some(u32::from(*b)),
            Self::Byte(v) => Some(u32::from(*v)),
            Self::Short(v) => Some(u32::from(*v)),
            Self::Word(v) => Some(*v),
            Self::Uuid(_) | Self::String(_) => None,
        }
    }
}

pub(crate) fn type_name(tuple_type: TupleType) -> &'static str {
    match tuple_type {
        TupleType::Uuid => "uuid",
        TupleType::String => "string",
        TupleType::Bool => "bool",
        TupleType::Byte => "byte",
        TupleType::Short => "short",
        TupleType::Word => "word",
    }
}

/// Accepts `00:11:..:ff` (16 hex bytes, `:` or `,` separated, optional
/// `0x` prefixes) and the hyphenated canonical form.
fn parse_uuid(text: &str) -> Option<[u8; 16]> {
    let text = text.trim();
    if text.contains('-') {
        return Uuid::parse_str(text).ok().map(|u| *u.as_bytes());
    }
    let mut out = [0u8; 16];
    let mut count = 0;
    for part in text.split([':', ',']).map(str::trim) {
        let digits = part
            .strip_prefix("0x")
            .or_else(|| part.strip_prefix("0X"))
            .unwrap_or(part);
        let byte = u8::from_str_radix(digits, 16).ok()?;
        *out.get_mut(count)? = byte;
        count += 1;
    }
    (count == out.len()).then_some(out)
}

/// One typed set of `(token, value)` pairs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleSet {
    pub tuple_type: TupleType,
    pub tuples: Vec<(String, TupleValue)>,
}

impl TupleSet {
    /// Create an empty set.
    pub fn new(tuple_type: TupleType) -> Self {
        Self {
            tuple_type,
            tuples: Vec::new(),
        }
    }

    /// Parse and append a tuple.
    pub fn push_literal(&mut self, token: impl Into<String>, text: &str) -> TupleResult<()> {
        let token = token.into();
        let value = TupleValue::parse(self.tuple_type, &token, text)?;
        self.tuples.push((token, value));
        Ok(())
    }

    /// Number of tuples in the set.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Returns `true` if the set holds no tuple.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

/// A named group of tuple sets, tied to one token table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleTable {
    /// Name of the token table the tuple tokens resolve against.
    pub tokens: String,
    pub sets: Vec<TupleSet>,
}

impl TupleTable {
    /// Create a table resolving against `tokens`.
    pub fn new(tokens: impl Into<String>) -> Self {
        Self {
            tokens: tokens.into(),
            sets: Vec::new(),
        }
    }

    /// Append a set.
    pub fn with_set(mut self, set: TupleSet) -> Self {
        self.sets.push(set);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integers() {
        assert_eq!(
            TupleValue::parse(TupleType::Word, "t", "0x10").unwrap(),
            TupleValue::Word(16)
        );
        assert_eq!(
            TupleValue::parse(TupleType::Short, "t", "65535").unwrap(),
            TupleValue::Short(65535)
        );
        assert!(TupleValue::parse(TupleType::Byte, "t", "256").is_err());
        assert!(TupleValue::parse(TupleType::Word, "t", "-1").is_err());
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(
            TupleValue::parse(TupleType::Bool, "t", "true").unwrap().as_word(),
            Some(1)
        );
        assert_eq!(
            TupleValue::parse(TupleType::Bool, "t", "0").unwrap().as_word(),
            Some(0)
        );
    }

    #[test]
    fn parse_uuid_forms() {
        let colon = TupleValue::parse(
            TupleType::Uuid,
            "t",
            "00:01:02:03:04:05:06:07:08:09:0a:0b:0c:0d:0e:0f",
        )
        .unwrap();
        let canonical =
            TupleValue::parse(TupleType::Uuid, "t", "00010203-0405-0607-0809-0a0b0c0d0e0f").unwrap();
        assert_eq!(colon, canonical);
        let TupleValue::Uuid(bytes) = colon else {
            panic!("expected uuid");
        };
        assert_eq!(bytes[15], 0x0f);
    }

    #[test]
    fn parse_uuid_rejects_short_input() {
        let err = TupleValue::parse(TupleType::Uuid, "tok", "00:01:02").unwrap_err();
        assert!(matches!(err, TupleError::InvalidValue { tuple_type: "uuid", .. }));
    }

    #[test]
    fn push_literal_keeps_order() {
        let mut set = TupleSet::new(TupleType::String);
        set.push_literal("b", "second").unwrap();
        set.push_literal("a", "first").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.tuples[0].0, "b");
    }
}
