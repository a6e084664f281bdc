//! Constants of the ASoC topology ABI (version 5).
//!
//! These values come from the kernel's `uapi/sound/asoc.h` and are part of
//! the on-disk compatibility contract.

/// Block header magic, `"CoSA"` when read as little-endian bytes.
pub const MAGIC: u32 = 0x4153_6F43;

/// ABI version written into every block header.
pub const ABI_VERSION: u32 = 5;

/// Fixed width of every name buffer, including the terminating NUL.
pub const NAME_LEN: usize = 44;

/// Number of 32-bit words in a TLV payload.
pub const TLV_WORDS: usize = 32;

/// Maximum channels per control.
pub const MAX_CHAN: usize = 8;

/// Maximum texts per enum control.
pub const NUM_TEXTS: usize = 16;

/// Number of 32-bit value words in an enum control.
pub const ENUM_VALUE_WORDS: usize = NUM_TEXTS * NAME_LEN / 4;

/// Maximum stream configurations per PCM or link.
pub const STREAM_CONFIG_MAX: usize = 8;

/// Maximum hardware configurations per link.
pub const HW_CONFIG_MAX: usize = 8;

/// Maximum private data carried by a single data block (128 KiB).
pub const MAX_PRIV_SIZE: usize = 1 << 17;

/// Kernel control types used in `ops` and `extops` fields.
pub mod ctl {
    pub const VOLSW: u32 = 1;
    pub const VOLSW_SX: u32 = 2;
    pub const VOLSW_XR_SX: u32 = 3;
    pub const ENUM: u32 = 4;
    pub const BYTES: u32 = 5;
    pub const ENUM_VALUE: u32 = 6;
    pub const RANGE: u32 = 7;
    pub const STROBE: u32 = 8;
}

/// `SNDRV_CTL_ELEM_ACCESS_*` bits.
pub mod access {
    pub const READ: u32 = 1 << 0;
    pub const WRITE: u32 = 1 << 1;
    pub const READWRITE: u32 = READ | WRITE;
    pub const VOLATILE: u32 = 1 << 2;
    pub const TIMESTAMP: u32 = 1 << 3;
    pub const TLV_READ: u32 = 1 << 4;
    pub const TLV_WRITE: u32 = 1 << 5;
    pub const TLV_READWRITE: u32 = TLV_READ | TLV_WRITE;
    pub const TLV_COMMAND: u32 = 1 << 6;
    pub const INACTIVE: u32 = 1 << 8;
    pub const LOCK: u32 = 1 << 9;
    pub const OWNER: u32 = 1 << 10;
    pub const TLV_CALLBACK: u32 = 1 << 28;
    pub const USER: u32 = 1 << 29;
}

/// TLV type of a dB-scale record (`SNDRV_CTL_TLVT_DB_SCALE`).
pub const TLV_TYPE_DB_SCALE: u32 = 1;

/// PCM/link flag bits (`SND_SOC_TPLG_LNK_FLGBIT_*`).
pub mod link_flags {
    pub const SYMMETRIC_RATES: u32 = 1 << 0;
    pub const SYMMETRIC_CHANNELS: u32 = 1 << 1;
    pub const SYMMETRIC_SAMPLEBITS: u32 = 1 << 2;
    pub const VOICE_WAKEUP: u32 = 1 << 3;
}
