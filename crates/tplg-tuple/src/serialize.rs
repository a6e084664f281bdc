use tplg_types::wire::{
    VendorArrayHeader, VendorStringElem, VendorUuidElem, VendorValueElem, WireRecord,
};
use tplg_types::TupleType;
use tracing::debug;

use crate::error::{TupleError, TupleResult};
use crate::token::TokenTable;
use crate::tuple::{type_name, TupleSet, TupleTable, TupleValue};

/// Encoded size of one tuple record of the given type.
pub fn elem_size(tuple_type: TupleType) -> usize {
    match tuple_type {
        TupleType::Uuid => VendorUuidElem::WIRE_SIZE,
        TupleType::String => VendorStringElem::WIRE_SIZE,
        TupleType::Bool | TupleType::Byte | TupleType::Short | TupleType::Word => {
            VendorValueElem::WIRE_SIZE
        }
    }
}

/// Encoded size of a whole set, array header included.
pub fn set_size(set: &TupleSet) -> usize {
    VendorArrayHeader::WIRE_SIZE + set.len() * elem_size(set.tuple_type)
}

/// Serialize one set as a vendor array.
///
/// `table_name` only appears in error messages.
pub fn serialize_set(set: &TupleSet, tokens: &TokenTable, table_name: &str) -> TupleResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(set_size(set));
    VendorArrayHeader {
        size: set_size(set) as u32,
        tuple_type: set.tuple_type.code(),
        num_elems: set.len() as u32,
    }
    .encode(&mut buf);

    for (name, value) in &set.tuples {
        let token = tokens.get(name).ok_or_else(|| TupleError::UnknownToken {
            token: name.clone(),
            table: table_name.to_string(),
        })?;
        match (set.tuple_type, value) {
            (TupleType::Uuid, TupleValue::Uuid(uuid)) => {
                VendorUuidElem { token, uuid: *uuid }.encode(&mut buf)
            }
            (TupleType::String, TupleValue::String(string)) => VendorStringElem {
                token,
                string: string.clone(),
            }
            .encode(&mut buf),
            (ty, value) if value.tuple_type() == ty => {
                let value = value.as_word().unwrap_or_default();
                VendorValueElem { token, value }.encode(&mut buf)
            }
            (ty, value) => {
                return Err(TupleError::InvalidValue {
                    tuple_type: type_name(ty),
                    token: name.clone(),
                    value: format!("{value:?}"),
                })
            }
        }
    }
    Ok(buf)
}

/// Serialize every set of a table, back to back.
///
/// Fails with [`TupleError::TooLarge`] before allocating anything if the
/// result would exceed `max` bytes.
pub fn serialize_table(
    table: &TupleTable,
    tokens: &TokenTable,
    table_name: &str,
    max: usize,
) -> TupleResult<Vec<u8>> {
    let size: usize = table.sets.iter().map(set_size).sum();
    if size > max {
        return Err(TupleError::TooLarge { size, max });
    }
    let mut out = Vec::with_capacity(size);
    for set in &table.sets {
        out.extend_from_slice(&serialize_set(set, tokens, table_name)?);
    }
    debug!(tokens = %table.tokens, sets = table.sets.len(), size, "serialized tuples");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    fn abc_tokens() -> TokenTable {
        [("a", 1), ("b", 2), ("c", 3)].into_iter().collect()
    }

    #[test]
    fn word_set_vector() {
        let mut set = TupleSet::new(TupleType::Word);
        set.push_literal("a", "5").unwrap();
        set.push_literal("b", "7").unwrap();
        set.push_literal("c", "9").unwrap();

        let bytes = serialize_set(&set, &abc_tokens(), "abc").unwrap();
        assert_eq!(bytes.len(), 12 + 3 * 8);
        assert_eq!(words(&bytes), vec![36, 4, 3, 1, 5, 2, 7, 3, 9]);
    }

    #[test]
    fn unknown_token_is_fatal() {
        let mut set = TupleSet::new(TupleType::Word);
        set.push_literal("zzz", "1").unwrap();
        let err = serialize_set(&set, &abc_tokens(), "abc").unwrap_err();
        assert_eq!(
            err,
            TupleError::UnknownToken {
                token: "zzz".into(),
                table: "abc".into()
            }
        );
    }

    #[test]
    fn string_and_uuid_records() {
        let mut strings = TupleSet::new(TupleType::String);
        strings.push_literal("a", "dsp").unwrap();
        let mut uuids = TupleSet::new(TupleType::Uuid);
        uuids
            .push_literal("b", "00010203-0405-0607-0809-0a0b0c0d0e0f")
            .unwrap();
        let table = TupleTable::new("abc").with_set(strings).with_set(uuids);

        let bytes = serialize_table(&table, &abc_tokens(), "t", 1 << 17).unwrap();
        assert_eq!(bytes.len(), (12 + 48) + (12 + 20));
        assert_eq!(&bytes[16..19], b"dsp");
        assert_eq!(bytes[19], 0);
        let uuid_array = &bytes[60..];
        assert_eq!(words(&uuid_array[..12]), vec![32, 0, 1]);
        assert_eq!(words(&uuid_array[12..16]), vec![2]);
        assert_eq!(uuid_array[16], 0x00);
        assert_eq!(uuid_array[31], 0x0f);
    }

    #[test]
    fn size_cap_checked_before_serializing() {
        let mut set = TupleSet::new(TupleType::Word);
        for _ in 0..100 {
            set.push_literal("a", "1").unwrap();
        }
        let table = TupleTable::new("abc").with_set(set);
        let err = serialize_table(&table, &abc_tokens(), "t", 64).unwrap_err();
        assert_eq!(err, TupleError::TooLarge { size: 812, max: 64 });
    }

    #[test]
    fn mismatched_value_rejected() {
        let set = TupleSet {
            tuple_type: TupleType::Word,
            tuples: vec![("a".into(), TupleValue::String("oops".into()))],
        };
        let err = serialize_set(&set, &abc_tokens(), "abc").unwrap_err();
        assert!(matches!(err, TupleError::InvalidValue { tuple_type: "word", .. }));
    }
}
