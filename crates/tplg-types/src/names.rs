//! Symbolic names accepted in topology sources and their ABI values.

use serde::{Deserialize, Serialize};

use crate::abi::{access, ctl};
use crate::error::{TypeError, TypeResult};

const WIDGET_TYPES: &[(&str, u32)] = &[
    ("input", 0),
    ("output", 1),
    ("mux", 2),
    ("mixer", 3),
    ("pga", 4),
    ("out_drv", 5),
    ("adc", 6),
    ("dac", 7),
    ("switch", 8),
    ("pre", 9),
    ("post", 10),
    ("aif_in", 11),
    ("aif_out", 12),
    ("dai_in", 13),
    ("dai_out", 14),
    ("dai_link", 15),
    ("buffer", 16),
    ("scheduler", 17),
    ("effect", 18),
    ("siggen", 19),
    ("src", 20),
    ("asrc", 21),
    ("encoder", 22),
    ("decoder", 23),
];

const CTL_OPS: &[(&str, u32)] = &[
    ("volsw", ctl::VOLSW),
    ("volsw_sx", ctl::VOLSW_SX),
    ("volsw_xr_sx", ctl::VOLSW_XR_SX),
    ("enum", ctl::ENUM),
    ("bytes", ctl::BYTES),
    ("enum_value", ctl::ENUM_VALUE),
    ("range", ctl::RANGE),
    ("strobe", ctl::STROBE),
];

const CHANNEL_MAP: &[(&str, u32)] = &[
    ("unknown", 0),
    ("na", 1),
    ("mono", 2),
    ("fl", 3),
    ("fr", 4),
    ("rl", 5),
    ("rr", 6),
    ("fc", 7),
    ("lfe", 8),
    ("sl", 9),
    ("sr", 10),
    ("rc", 11),
    ("flc", 12),
    ("frc", 13),
    ("rlc", 14),
    ("rrc", 15),
    ("flw", 16),
    ("frw", 17),
    ("flh", 18),
    ("fch", 19),
    ("frh", 20),
    ("tc", 21),
    ("tfl", 22),
    ("tfr", 23),
    ("tfc", 24),
    ("trl", 25),
    ("trr", 26),
    ("trc", 27),
    ("tflc", 28),
    ("tfrc", 29),
    ("tsl", 30),
    ("tsr", 31),
    ("llfe", 32),
    ("rlfe", 33),
    ("bc", 34),
    ("blc", 35),
    ("brc", 36),
];

const ACCESS: &[(&str, u32)] = &[
    ("read", access::READ),
    ("write", access::WRITE),
    ("read_write", access::READWRITE),
    ("volatile", access::VOLATILE),
    ("timestamp", access::TIMESTAMP),
    ("tlv_read", access::TLV_READ),
    ("tlv_write", access::TLV_WRITE),
    ("tlv_read_write", access::TLV_READWRITE),
    ("tlv_command", access::TLV_COMMAND),
    ("inactive", access::INACTIVE),
    ("lock", access::LOCK),
    ("owner", access::OWNER),
    ("tlv_callback", access::TLV_CALLBACK),
    ("user", access::USER),
];

const PCM_FORMATS: &[(&str, u32)] = &[
    ("s8", 0),
    ("u8", 1),
    ("s16_le", 2),
    ("s16_be", 3),
    ("u16_le", 4),
    ("u16_be", 5),
    ("s24_le", 6),
    ("s24_be", 7),
    ("u24_le", 8),
    ("u24_be", 9),
    ("s32_le", 10),
    ("s32_be", 11),
    ("u32_le", 12),
    ("u32_be", 13),
    ("float_le", 14),
    ("float_be", 15),
    ("float64_le", 16),
    ("float64_be", 17),
    ("iec958_subframe_le", 18),
    ("iec958_subframe_be", 19),
    ("mu_law", 20),
    ("a_law", 21),
    ("ima_adpcm", 22),
    ("mpeg", 23),
    ("gsm", 24),
    ("special", 31),
    ("s24_3le", 32),
    ("s24_3be", 33),
    ("u24_3le", 34),
    ("u24_3be", 35),
    ("s20_3le", 36),
    ("s20_3be", 37),
    ("u20_3le", 38),
    ("u20_3be", 39),
    ("s18_3le", 40),
    ("s18_3be", 41),
    ("u18_3le", 42),
    ("u18_3be", 43),
];

const PCM_RATES: &[(u32, u32)] = &[
    (5512, 1 << 0),
    (8000, 1 << 1),
    (11025, 1 << 2),
    (16000, 1 << 3),
    (22050, 1 << 4),
    (32000, 1 << 5),
    (44100, 1 << 6),
    (48000, 1 << 7),
    (64000, 1 << 8),
    (88200, 1 << 9),
    (96000, 1 << 10),
    (176400, 1 << 11),
    (192000, 1 << 12),
];

const HW_FORMATS: &[(&str, u32)] = &[
    ("i2s", 1),
    ("right_j", 2),
    ("left_j", 3),
    ("dsp_a", 4),
    ("dsp_b", 5),
    ("ac97", 6),
    ("pdm", 7),
];

fn lookup(table: &[(&str, u32)], what: &'static str, name: &str) -> TypeResult<u32> {
    let wanted = name.trim();
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(wanted))
        .map(|(_, v)| *v)
        .ok_or_else(|| TypeError::UnknownName {
            what,
            name: name.to_string(),
        })
}

/// Parse a signed integer literal: decimal, or hexadecimal with `0x`.
pub fn parse_int(text: &str) -> TypeResult<i64> {
    let s = text.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else {
        digits.parse::<i64>()
    }
    .map_err(|_| TypeError::InvalidInteger(text.to_string()))?;
    Ok(if negative { -value } else { value })
}

/// Parse an unsigned 32-bit literal.
pub fn parse_u32(text: &str) -> TypeResult<u32> {
    let value = parse_int(text)?;
    u32::try_from(value).map_err(|_| TypeError::OutOfRange { what: "u32", value })
}

/// Parse a signed 32-bit literal.
pub fn parse_i32(text: &str) -> TypeResult<i32> {
    let value = parse_int(text)?;
    i32::try_from(value).map_err(|_| TypeError::OutOfRange { what: "i32", value })
}

/// Parse a boolean: `true`/`false`, `yes`/`no`, or an integer.
pub fn parse_bool(text: &str) -> TypeResult<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        other => Ok(parse_int(other)? != 0),
    }
}

/// DAPM widget type id.
pub fn widget_type(name: &str) -> TypeResult<u32> {
    lookup(WIDGET_TYPES, "widget type", name)
}

/// Control handler id: a known handler name or a raw integer.
pub fn ctl_ops(name: &str) -> TypeResult<u32> {
    lookup(CTL_OPS, "control ops", name).or_else(|err| parse_u32(name).map_err(|_| err))
}

/// Channel map position id (`FL`, `FR`, ...).
pub fn channel_id(name: &str) -> TypeResult<u32> {
    lookup(CHANNEL_MAP, "channel", name)
}

/// A single control access flag.
pub fn access_flag(name: &str) -> TypeResult<u32> {
    lookup(ACCESS, "access flag", name)
}

/// PCM sample format index (`S16_LE` is 2).
pub fn pcm_format(name: &str) -> TypeResult<u32> {
    lookup(PCM_FORMATS, "pcm format", name)
}

/// Bitmask of a comma separated format list.
pub fn pcm_format_mask(list: &str) -> TypeResult<u64> {
    split_list(list).try_fold(0u64, |mask, name| Ok(mask | 1u64 << pcm_format(name)?))
}

/// Rate bit for an exact sample rate.
pub fn pcm_rate(rate: u32) -> TypeResult<u32> {
    PCM_RATES
        .iter()
        .find(|(r, _)| *r == rate)
        .map(|(_, bit)| *bit)
        .ok_or_else(|| TypeError::UnknownName {
            what: "pcm rate",
            name: rate.to_string(),
        })
}

/// Bitmask of a comma separated rate list.
pub fn pcm_rate_mask(list: &str) -> TypeResult<u32> {
    split_list(list).try_fold(0u32, |mask, item| Ok(mask | pcm_rate(parse_u32(item)?)?))
}

/// DAI hardware format (`I2S`, `DSP_A`, ...).
pub fn hw_format(name: &str) -> TypeResult<u32> {
    lookup(HW_FORMATS, "hw format", name)
}

/// Clock provider role: `codec_master` is 0, `codec_slave` is 1.
pub fn clock_provider(name: &str) -> TypeResult<u8> {
    match name.trim().to_ascii_lowercase().as_str() {
        "codec_master" | "codec_provider" => Ok(0),
        "codec_slave" | "codec_consumer" => Ok(1),
        _ => Err(TypeError::UnknownName {
            what: "clock provider",
            name: name.to_string(),
        }),
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Vendor tuple set types (`SND_SOC_TPLG_TUPLE_TYPE_*`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleType {
    Uuid,
    String,
    Bool,
    Byte,
    Word,
    Short,
}

impl TupleType {
    /// ABI code written into the vendor array header.
    pub fn code(self) -> u32 {
        match self {
            Self::Uuid => 0,
            Self::String => 1,
            Self::Bool => 2,
            Self::Byte => 3,
            Self::Word => 4,
            Self::Short => 5,
        }
    }

    /// Parse a set name. A `.suffix` is allowed so one table can carry
    /// several sets of the same type (`word.pipeline`).
    pub fn from_name(name: &str) -> TypeResult<Self> {
        let base = name.split('.').next().unwrap_or_default();
        match base.to_ascii_lowercase().as_str() {
            "uuid" => Ok(Self::Uuid),
            "string" => Ok(Self::String),
            "bool" => Ok(Self::Bool),
            "byte" => Ok(Self::Byte),
            "word" => Ok(Self::Word),
            "short" => Ok(Self::Short),
            _ => Err(TypeError::UnknownName {
                what: "tuple type",
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_int("42").unwrap(), 42);
        assert_eq!(parse_int("0x1f").unwrap(), 31);
        assert_eq!(parse_int("-9000").unwrap(), -9000);
        assert!(parse_int("forty").is_err());
        assert!(parse_u32("-1").is_err());
        assert_eq!(parse_i32("-1").unwrap(), -1);
    }

    #[test]
    fn booleans() {
        assert!(parse_bool("true").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn widget_types_case_insensitive() {
        assert_eq!(widget_type("pga").unwrap(), 4);
        assert_eq!(widget_type("AIF_IN").unwrap(), 11);
        assert!(matches!(
            widget_type("speaker"),
            Err(TypeError::UnknownName { what: "widget type", .. })
        ));
    }

    #[test]
    fn ops_accept_numbers() {
        assert_eq!(ctl_ops("volsw").unwrap(), 1);
        assert_eq!(ctl_ops("256").unwrap(), 256);
        assert!(ctl_ops("mystery").is_err());
    }

    #[test]
    fn format_and_rate_masks() {
        assert_eq!(pcm_format_mask("S16_LE").unwrap(), 1 << 2);
        assert_eq!(pcm_format_mask("S16_LE, S24_LE").unwrap(), (1 << 2) | (1 << 6));
        assert_eq!(pcm_rate_mask("48000,44100").unwrap(), (1 << 7) | (1 << 6));
        assert!(pcm_rate_mask("12345").is_err());
    }

    #[test]
    fn tuple_types() {
        assert_eq!(TupleType::from_name("word").unwrap(), TupleType::Word);
        assert_eq!(TupleType::from_name("string.names").unwrap(), TupleType::String);
        assert_eq!(TupleType::Short.code(), 5);
        assert!(TupleType::from_name("float").is_err());
    }

    #[test]
    fn clock_roles() {
        assert_eq!(clock_provider("codec_master").unwrap(), 0);
        assert_eq!(clock_provider("codec_slave").unwrap(), 1);
        assert!(clock_provider("cpu").is_err());
    }
}
