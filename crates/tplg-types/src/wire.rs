//! Frozen ASoC topology wire records.
//!
//! Each record mirrors a packed little-endian struct from the kernel's
//! `uapi/sound/asoc.h`. Records only know how to encode themselves; the
//! `size` fields that describe the record itself are constants and are
//! written by `encode`, never stored.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::abi::{
    ENUM_VALUE_WORDS, HW_CONFIG_MAX, MAGIC, MAX_CHAN, NAME_LEN, NUM_TEXTS, STREAM_CONFIG_MAX,
    TLV_WORDS,
};

/// A fixed-layout record of the topology ABI.
pub trait WireRecord {
    /// Exact encoded length in bytes.
    const WIRE_SIZE: usize;

    /// Append the little-endian encoding to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Encode into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        self.encode(&mut buf);
        debug_assert_eq!(buf.len(), Self::WIRE_SIZE);
        buf
    }
}

/// Write a NUL-padded fixed-width name, truncating like `strlcpy`.
pub fn put_name<B: BufMut>(buf: &mut B, name: &str) {
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN - 1);
    buf.put_slice(&bytes[..len]);
    buf.put_bytes(0, NAME_LEN - len);
}

fn wire_len<T: WireRecord>() -> u32 {
    T::WIRE_SIZE as u32
}

// ---------------------------------------------------------------------------
// Block header
// ---------------------------------------------------------------------------

/// Header written in front of every block (`snd_soc_tplg_hdr`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub abi: u32,
    pub version: u32,
    pub block_type: u32,
    pub vendor_type: u32,
    pub payload_size: u32,
    pub index: u32,
    pub count: u32,
}

impl BlockHeader {
    /// Decode a header, returning it with its magic so callers can check it.
    pub fn decode(mut data: &[u8]) -> Option<(u32, u32, Self)> {
        if data.len() < Self::WIRE_SIZE {
            return None;
        }
        let magic = data.get_u32_le();
        let abi = data.get_u32_le();
        let version = data.get_u32_le();
        let block_type = data.get_u32_le();
        let size = data.get_u32_le();
        let vendor_type = data.get_u32_le();
        let payload_size = data.get_u32_le();
        let index = data.get_u32_le();
        let count = data.get_u32_le();
        Some((
            magic,
            size,
            Self {
                abi,
                version,
                block_type,
                vendor_type,
                payload_size,
                index,
                count,
            },
        ))
    }
}

impl WireRecord for BlockHeader {
    const WIRE_SIZE: usize = 36;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(MAGIC);
        buf.put_u32_le(self.abi);
        buf.put_u32_le(self.version);
        buf.put_u32_le(self.block_type);
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.vendor_type);
        buf.put_u32_le(self.payload_size);
        buf.put_u32_le(self.index);
        buf.put_u32_le(self.count);
    }
}

// ---------------------------------------------------------------------------
// Control records
// ---------------------------------------------------------------------------

/// Kernel handler ids for get/put/info.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoOps {
    pub get: u32,
    pub put: u32,
    pub info: u32,
}

impl IoOps {
    /// All three handlers set to the same id.
    pub fn uniform(id: u32) -> Self {
        Self {
            get: id,
            put: id,
            info: id,
        }
    }
}

impl WireRecord for IoOps {
    const WIRE_SIZE: usize = 12;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.get);
        buf.put_u32_le(self.put);
        buf.put_u32_le(self.info);
    }
}

/// dB scale parameters of a TLV.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbScale {
    pub min: i32,
    pub step: i32,
    pub mute: u32,
}

/// TLV record embedded in every control header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtlTlv {
    pub size: u32,
    pub tlv_type: u32,
    pub scale: DbScale,
}

impl CtlTlv {
    /// A populated dB-scale TLV.
    pub fn db_scale(scale: DbScale) -> Self {
        Self {
            size: wire_len::<Self>(),
            tlv_type: crate::abi::TLV_TYPE_DB_SCALE,
            scale,
        }
    }

    /// Returns `true` if no TLV has been copied in.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl WireRecord for CtlTlv {
    const WIRE_SIZE: usize = 8 + TLV_WORDS * 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.size);
        buf.put_u32_le(self.tlv_type);
        buf.put_i32_le(self.scale.min);
        buf.put_i32_le(self.scale.step);
        buf.put_u32_le(self.scale.mute);
        buf.put_bytes(0, (TLV_WORDS - 3) * 4);
    }
}

/// Common header of mixer, enum and bytes controls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtlHdr {
    pub ctl_type: u32,
    pub name: String,
    pub access: u32,
    pub ops: IoOps,
    pub tlv: CtlTlv,
}

impl WireRecord for CtlHdr {
    const WIRE_SIZE: usize = 4 + 4 + NAME_LEN + 4 + IoOps::WIRE_SIZE + CtlTlv::WIRE_SIZE;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.ctl_type);
        put_name(buf, &self.name);
        buf.put_u32_le(self.access);
        self.ops.encode(buf);
        self.tlv.encode(buf);
    }
}

/// One control channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub reg: i32,
    pub shift: u32,
    pub id: u32,
}

impl Channel {
    /// Encoding of a channel slot that is not in use.
    fn encode_unused<B: BufMut>(buf: &mut B) {
        buf.put_u32_le(0);
        buf.put_i32_le(-1);
        buf.put_u32_le(0);
        buf.put_u32_le(0);
    }
}

impl WireRecord for Channel {
    const WIRE_SIZE: usize = 16;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        buf.put_i32_le(self.reg);
        buf.put_u32_le(self.shift);
        buf.put_u32_le(self.id);
    }
}

fn encode_channels<B: BufMut>(buf: &mut B, channels: &[Channel]) {
    for slot in 0..MAX_CHAN {
        match channels.get(slot) {
            Some(channel) => channel.encode(buf),
            None => Channel::encode_unused(buf),
        }
    }
}

/// `snd_soc_tplg_mixer_control`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerControl {
    pub hdr: CtlHdr,
    pub min: i32,
    pub max: i32,
    pub platform_max: i32,
    pub invert: u32,
    pub channels: Vec<Channel>,
    pub priv_size: u32,
}

impl WireRecord for MixerControl {
    const WIRE_SIZE: usize = CtlHdr::WIRE_SIZE + 24 + MAX_CHAN * Channel::WIRE_SIZE + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.hdr.encode(buf);
        buf.put_u32_le(wire_len::<Self>());
        buf.put_i32_le(self.min);
        buf.put_i32_le(self.max);
        buf.put_i32_le(self.platform_max);
        buf.put_u32_le(self.invert);
        buf.put_u32_le(self.channels.len().min(MAX_CHAN) as u32);
        encode_channels(buf, &self.channels);
        buf.put_u32_le(self.priv_size);
    }
}

/// `snd_soc_tplg_enum_control`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumControl {
    pub hdr: CtlHdr,
    pub channels: Vec<Channel>,
    pub items: u32,
    pub mask: u32,
    pub count: u32,
    pub texts: Vec<String>,
    pub values: Vec<u32>,
    pub priv_size: u32,
}

impl WireRecord for EnumControl {
    const WIRE_SIZE: usize = CtlHdr::WIRE_SIZE
        + 8
        + MAX_CHAN * Channel::WIRE_SIZE
        + 12
        + NUM_TEXTS * NAME_LEN
        + ENUM_VALUE_WORDS * 4
        + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.hdr.encode(buf);
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.channels.len().min(MAX_CHAN) as u32);
        encode_channels(buf, &self.channels);
        buf.put_u32_le(self.items);
        buf.put_u32_le(self.mask);
        buf.put_u32_le(self.count);
        for slot in 0..NUM_TEXTS {
            put_name(buf, self.texts.get(slot).map(String::as_str).unwrap_or(""));
        }
        for slot in 0..ENUM_VALUE_WORDS {
            buf.put_u32_le(self.values.get(slot).copied().unwrap_or(0));
        }
        buf.put_u32_le(self.priv_size);
    }
}

/// `snd_soc_tplg_bytes_control`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytesControl {
    pub hdr: CtlHdr,
    pub max: u32,
    pub mask: u32,
    pub base: u32,
    pub num_regs: u32,
    pub ext_ops: IoOps,
    pub priv_size: u32,
}

impl WireRecord for BytesControl {
    const WIRE_SIZE: usize = CtlHdr::WIRE_SIZE + 20 + IoOps::WIRE_SIZE + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.hdr.encode(buf);
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.max);
        buf.put_u32_le(self.mask);
        buf.put_u32_le(self.base);
        buf.put_u32_le(self.num_regs);
        self.ext_ops.encode(buf);
        buf.put_u32_le(self.priv_size);
    }
}

// ---------------------------------------------------------------------------
// DAPM records
// ---------------------------------------------------------------------------

/// `snd_soc_tplg_dapm_widget`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DapmWidget {
    pub widget_type: u32,
    pub name: String,
    pub sname: String,
    pub reg: i32,
    pub shift: u32,
    pub mask: u32,
    pub subseq: u32,
    pub invert: u32,
    pub ignore_suspend: u32,
    pub event_flags: u16,
    pub event_type: u16,
    pub num_kcontrols: u32,
    pub priv_size: u32,
}

impl WireRecord for DapmWidget {
    const WIRE_SIZE: usize = 8 + 2 * NAME_LEN + 24 + 4 + 4 + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.widget_type);
        put_name(buf, &self.name);
        put_name(buf, &self.sname);
        buf.put_i32_le(self.reg);
        buf.put_u32_le(self.shift);
        buf.put_u32_le(self.mask);
        buf.put_u32_le(self.subseq);
        buf.put_u32_le(self.invert);
        buf.put_u32_le(self.ignore_suspend);
        buf.put_u16_le(self.event_flags);
        buf.put_u16_le(self.event_type);
        buf.put_u32_le(self.num_kcontrols);
        buf.put_u32_le(self.priv_size);
    }
}

/// `snd_soc_tplg_dapm_graph_elem`: one route.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphElem {
    pub sink: String,
    pub control: String,
    pub source: String,
}

impl WireRecord for GraphElem {
    const WIRE_SIZE: usize = 3 * NAME_LEN;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_name(buf, &self.sink);
        put_name(buf, &self.control);
        put_name(buf, &self.source);
    }
}

// ---------------------------------------------------------------------------
// Stream records
// ---------------------------------------------------------------------------

/// `snd_soc_tplg_stream`: one stream configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
    pub format: u64,
    pub rate: u32,
    pub period_bytes: u32,
    pub buffer_bytes: u32,
    pub channels: u32,
}

impl WireRecord for Stream {
    const WIRE_SIZE: usize = 4 + NAME_LEN + 8 + 16;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        put_name(buf, &self.name);
        buf.put_u64_le(self.format);
        buf.put_u32_le(self.rate);
        buf.put_u32_le(self.period_bytes);
        buf.put_u32_le(self.buffer_bytes);
        buf.put_u32_le(self.channels);
    }
}

fn encode_streams<B: BufMut>(buf: &mut B, streams: &[Stream]) {
    for slot in 0..STREAM_CONFIG_MAX {
        match streams.get(slot) {
            Some(stream) => stream.encode(buf),
            None => buf.put_bytes(0, Stream::WIRE_SIZE),
        }
    }
    buf.put_u32_le(streams.len().min(STREAM_CONFIG_MAX) as u32);
}

/// `snd_soc_tplg_stream_caps`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCaps {
    pub name: String,
    pub formats: u64,
    pub rates: u32,
    pub rate_min: u32,
    pub rate_max: u32,
    pub channels_min: u32,
    pub channels_max: u32,
    pub periods_min: u32,
    pub periods_max: u32,
    pub period_size_min: u32,
    pub period_size_max: u32,
    pub buffer_size_min: u32,
    pub buffer_size_max: u32,
    pub sig_bits: u32,
}

impl WireRecord for StreamCaps {
    const WIRE_SIZE: usize = 4 + NAME_LEN + 8 + 12 * 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        put_name(buf, &self.name);
        buf.put_u64_le(self.formats);
        for value in [
            self.rates,
            self.rate_min,
            self.rate_max,
            self.channels_min,
            self.channels_max,
            self.periods_min,
            self.periods_max,
            self.period_size_min,
            self.period_size_max,
            self.buffer_size_min,
            self.buffer_size_max,
            self.sig_bits,
        ] {
            buf.put_u32_le(value);
        }
    }
}

/// `snd_soc_tplg_hw_config`: physical DAI format of a link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwConfig {
    pub id: u32,
    pub fmt: u32,
    pub clock_gated: u8,
    pub invert_bclk: u8,
    pub invert_fsync: u8,
    pub bclk_master: u8,
    pub fsync_master: u8,
    pub mclk_direction: u8,
    pub mclk_rate: u32,
    pub bclk_rate: u32,
    pub fsync_rate: u32,
    pub tdm_slots: u32,
    pub tdm_slot_width: u32,
    pub tx_slots: u32,
    pub rx_slots: u32,
    pub tx_channels: u32,
    pub tx_chanmap: [u32; MAX_CHAN],
    pub rx_channels: u32,
    pub rx_chanmap: [u32; MAX_CHAN],
}

impl WireRecord for HwConfig {
    const WIRE_SIZE: usize = 12 + 8 + 7 * 4 + 4 + MAX_CHAN * 4 + 4 + MAX_CHAN * 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.id);
        buf.put_u32_le(self.fmt);
        buf.put_u8(self.clock_gated);
        buf.put_u8(self.invert_bclk);
        buf.put_u8(self.invert_fsync);
        buf.put_u8(self.bclk_master);
        buf.put_u8(self.fsync_master);
        buf.put_u8(self.mclk_direction);
        buf.put_u16_le(0);
        buf.put_u32_le(self.mclk_rate);
        buf.put_u32_le(self.bclk_rate);
        buf.put_u32_le(self.fsync_rate);
        buf.put_u32_le(self.tdm_slots);
        buf.put_u32_le(self.tdm_slot_width);
        buf.put_u32_le(self.tx_slots);
        buf.put_u32_le(self.rx_slots);
        buf.put_u32_le(self.tx_channels);
        self.tx_chanmap.iter().for_each(|c| buf.put_u32_le(*c));
        buf.put_u32_le(self.rx_channels);
        self.rx_chanmap.iter().for_each(|c| buf.put_u32_le(*c));
    }
}

/// `snd_soc_tplg_pcm`: a front-end PCM and its DAI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pcm {
    pub pcm_name: String,
    pub dai_name: String,
    pub pcm_id: u32,
    pub dai_id: u32,
    pub playback: u32,
    pub capture: u32,
    pub compress: u32,
    pub streams: Vec<Stream>,
    /// Playback and capture capabilities, in that order.
    pub caps: [Option<StreamCaps>; 2],
    pub flag_mask: u32,
    pub flags: u32,
    pub priv_size: u32,
}

impl WireRecord for Pcm {
    const WIRE_SIZE: usize = 4
        + 2 * NAME_LEN
        + 20
        + STREAM_CONFIG_MAX * Stream::WIRE_SIZE
        + 4
        + 2 * StreamCaps::WIRE_SIZE
        + 8
        + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        put_name(buf, &self.pcm_name);
        put_name(buf, &self.dai_name);
        buf.put_u32_le(self.pcm_id);
        buf.put_u32_le(self.dai_id);
        buf.put_u32_le(self.playback);
        buf.put_u32_le(self.capture);
        buf.put_u32_le(self.compress);
        encode_streams(buf, &self.streams);
        for caps in &self.caps {
            match caps {
                Some(caps) => caps.encode(buf),
                None => buf.put_bytes(0, StreamCaps::WIRE_SIZE),
            }
        }
        buf.put_u32_le(self.flag_mask);
        buf.put_u32_le(self.flags);
        buf.put_u32_le(self.priv_size);
    }
}

/// `snd_soc_tplg_link_config`: a back-end or codec-codec link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub id: u32,
    pub name: String,
    pub stream_name: String,
    pub streams: Vec<Stream>,
    pub hw_configs: Vec<HwConfig>,
    pub default_hw_config_id: u32,
    pub flag_mask: u32,
    pub flags: u32,
    pub priv_size: u32,
}

impl WireRecord for LinkConfig {
    const WIRE_SIZE: usize = 8
        + 2 * NAME_LEN
        + STREAM_CONFIG_MAX * Stream::WIRE_SIZE
        + 4
        + HW_CONFIG_MAX * HwConfig::WIRE_SIZE
        + 16
        + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.id);
        put_name(buf, &self.name);
        put_name(buf, &self.stream_name);
        encode_streams(buf, &self.streams);
        for slot in 0..HW_CONFIG_MAX {
            match self.hw_configs.get(slot) {
                Some(hw) => hw.encode(buf),
                None => buf.put_bytes(0, HwConfig::WIRE_SIZE),
            }
        }
        buf.put_u32_le(self.hw_configs.len().min(HW_CONFIG_MAX) as u32);
        buf.put_u32_le(self.default_hw_config_id);
        buf.put_u32_le(self.flag_mask);
        buf.put_u32_le(self.flags);
        buf.put_u32_le(self.priv_size);
    }
}

// ---------------------------------------------------------------------------
// Manifest and private data
// ---------------------------------------------------------------------------

/// `snd_soc_tplg_manifest`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub control_elems: u32,
    pub widget_elems: u32,
    pub graph_elems: u32,
    pub pcm_elems: u32,
    pub dai_link_elems: u32,
    pub dai_elems: u32,
    pub priv_size: u32,
}

impl WireRecord for Manifest {
    const WIRE_SIZE: usize = 28 + 20 * 4 + 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(wire_len::<Self>());
        buf.put_u32_le(self.control_elems);
        buf.put_u32_le(self.widget_elems);
        buf.put_u32_le(self.graph_elems);
        buf.put_u32_le(self.pcm_elems);
        buf.put_u32_le(self.dai_link_elems);
        buf.put_u32_le(self.dai_elems);
        buf.put_bytes(0, 20 * 4);
        buf.put_u32_le(self.priv_size);
    }
}

/// `snd_soc_tplg_private` header of a standalone data block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateHeader {
    pub size: u32,
}

impl WireRecord for PrivateHeader {
    const WIRE_SIZE: usize = 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.size);
    }
}

// ---------------------------------------------------------------------------
// Vendor arrays
// ---------------------------------------------------------------------------

/// Header of one vendor tuple array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorArrayHeader {
    /// Size of the whole array, header included.
    pub size: u32,
    pub tuple_type: u32,
    pub num_elems: u32,
}

impl WireRecord for VendorArrayHeader {
    const WIRE_SIZE: usize = 12;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.size);
        buf.put_u32_le(self.tuple_type);
        buf.put_u32_le(self.num_elems);
    }
}

/// A UUID tuple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorUuidElem {
    pub token: u32,
    pub uuid: [u8; 16],
}

impl WireRecord for VendorUuidElem {
    const WIRE_SIZE: usize = 20;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.token);
        buf.put_slice(&self.uuid);
    }
}

/// A string tuple.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorStringElem {
    pub token: u32,
    pub string: String,
}

impl WireRecord for VendorStringElem {
    const WIRE_SIZE: usize = 4 + NAME_LEN;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.token);
        put_name(buf, &self.string);
    }
}

/// A bool, byte, short or word tuple; all share the 32-bit value slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorValueElem {
    pub token: u32,
    pub value: u32,
}

impl WireRecord for VendorValueElem {
    const WIRE_SIZE: usize = 8;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.token);
        buf.put_u32_le(self.value);
    }
}
