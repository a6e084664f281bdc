//! Element templates for the programmatic API.
//!
//! Each template carries the same fields as the matching configuration
//! section. The section loader fills templates too, so a topology built by
//! hand and one loaded from text go through exactly the same code.

use serde::{Deserialize, Serialize};
use tplg_store::{Element, Payload};
use tplg_types::abi::{access, MAX_CHAN};
use tplg_types::wire::{
    BytesControl, Channel, CtlHdr, DapmWidget, EnumControl, GraphElem, IoOps, LinkConfig,
    MixerControl, Pcm,
};
use tplg_types::{BlockType, ElementType};

use crate::error::{TplgError, TplgResult};

fn too_many_channels(section: &str, id: &str, count: usize) -> TplgError {
    TplgError::InvalidValue {
        section: section.to_string(),
        id: id.to_string(),
        field: "channel".to_string(),
        value: count.to_string(),
        reason: format!("at most {MAX_CHAN} channels"),
    }
}

fn control_hdr(block: BlockType, name: &str, access: Option<u32>, ops: IoOps) -> CtlHdr {
    CtlHdr {
        ctl_type: block.tag(),
        name: name.to_string(),
        access: access.unwrap_or(access::READWRITE),
        ops,
        ..Default::default()
    }
}

fn add_data_refs(element: &mut Element, data: Vec<String>) {
    for name in data {
        element.add_reference(ElementType::Data, name);
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// One channel of a mixer or enum control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTemplate {
    /// Channel map position (see `names::channel_id`).
    pub id: u32,
    pub reg: i32,
    pub shift: u32,
}

impl ChannelTemplate {
    /// A channel with no register.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            reg: -1,
            shift: 0,
        }
    }

    pub fn with_reg(mut self, reg: i32) -> Self {
        self.reg = reg;
        self
    }

    pub fn with_shift(mut self, shift: u32) -> Self {
        self.shift = shift;
        self
    }
}

fn channels(section: &str, id: &str, templates: &[ChannelTemplate]) -> TplgResult<Vec<Channel>> {
    if templates.len() > MAX_CHAN {
        return Err(too_many_channels(section, id, templates.len()));
    }
    Ok(templates
        .iter()
        .map(|c| Channel {
            reg: c.reg,
            shift: c.shift,
            id: c.id,
        })
        .collect())
}

/// A volume or switch control.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerTemplate {
    pub name: String,
    pub index: u32,
    pub channels: Vec<ChannelTemplate>,
    pub max: i32,
    pub invert: bool,
    /// Defaults to `max`.
    pub platform_max: Option<i32>,
    pub ops: IoOps,
    /// Defaults to read/write.
    pub access: Option<u32>,
    pub tlv: Option<String>,
    pub data: Vec<String>,
}

impl MixerTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_channel(mut self, channel: ChannelTemplate) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn with_max(mut self, max: i32) -> Self {
        self.max = max;
        self
    }

    pub fn with_ops(mut self, ops: IoOps) -> Self {
        self.ops = ops;
        self
    }

    pub fn with_tlv(mut self, tlv: impl Into<String>) -> Self {
        self.tlv = Some(tlv.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    pub(crate) fn into_element(self) -> TplgResult<Element> {
        let record = MixerControl {
            hdr: control_hdr(BlockType::Mixer, &self.name, self.access, self.ops),
            min: 0,
            max: self.max,
            platform_max: self.platform_max.unwrap_or(self.max),
            invert: u32::from(self.invert),
            channels: channels("SectionControlMixer", &self.name, &self.channels)?,
            priv_size: 0,
        };
        let mut element = Element::with_payload(self.name, Payload::Mixer(record));
        element.index = self.index;
        if let Some(tlv) = self.tlv {
            element.add_reference(ElementType::Tlv, tlv);
        }
        add_data_refs(&mut element, self.data);
        Ok(element)
    }
}

/// A control choosing one of a list of texts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTemplate {
    pub name: String,
    pub index: u32,
    pub channels: Vec<ChannelTemplate>,
    /// Name of the text table holding the items.
    pub texts: Option<String>,
    pub ops: IoOps,
    pub access: Option<u32>,
    pub data: Vec<String>,
}

impl EnumTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_channel(mut self, channel: ChannelTemplate) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn with_texts(mut self, texts: impl Into<String>) -> Self {
        self.texts = Some(texts.into());
        self
    }

    pub fn with_ops(mut self, ops: IoOps) -> Self {
        self.ops = ops;
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    pub(crate) fn into_element(self) -> TplgResult<Element> {
        let record = EnumControl {
            hdr: control_hdr(BlockType::Enum, &self.name, self.access, self.ops),
            channels: channels("SectionControlEnum", &self.name, &self.channels)?,
            ..Default::default()
        };
        let mut element = Element::with_payload(self.name, Payload::Enum(record));
        element.index = self.index;
        if let Some(texts) = self.texts {
            element.add_reference(ElementType::Text, texts);
        }
        add_data_refs(&mut element, self.data);
        Ok(element)
    }
}

/// A control exposing a raw byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytesTemplate {
    pub name: String,
    pub index: u32,
    pub base: u32,
    pub num_regs: u32,
    pub mask: u32,
    pub max: u32,
    pub ops: IoOps,
    pub ext_ops: IoOps,
    pub access: Option<u32>,
    pub tlv: Option<String>,
    pub data: Vec<String>,
}

impl BytesTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }

    pub fn with_ops(mut self, ops: IoOps) -> Self {
        self.ops = ops;
        self
    }

    pub fn with_ext_ops(mut self, ext_ops: IoOps) -> Self {
        self.ext_ops = ext_ops;
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    pub(crate) fn into_element(self) -> TplgResult<Element> {
        let record = BytesControl {
            hdr: control_hdr(BlockType::Bytes, &self.name, self.access, self.ops),
            max: self.max,
            mask: self.mask,
            base: self.base,
            num_regs: self.num_regs,
            ext_ops: self.ext_ops,
            priv_size: 0,
        };
        let mut element = Element::with_payload(self.name, Payload::Bytes(record));
        element.index = self.index;
        if let Some(tlv) = self.tlv {
            element.add_reference(ElementType::Tlv, tlv);
        }
        add_data_refs(&mut element, self.data);
        Ok(element)
    }
}

// ---------------------------------------------------------------------------
// Widgets and routes
// ---------------------------------------------------------------------------

/// A DAPM widget and the controls it owns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetTemplate {
    pub name: String,
    pub index: u32,
    pub widget_type: u32,
    pub stream_name: String,
    /// `-1` when the widget has no power management register.
    pub reg: i32,
    pub shift: u32,
    pub mask: u32,
    pub invert: bool,
    pub subseq: u32,
    pub event_type: u16,
    pub event_flags: u16,
    pub ignore_suspend: bool,
    pub mixers: Vec<String>,
    pub enums: Vec<String>,
    pub bytes: Vec<String>,
    pub data: Vec<String>,
}

impl WidgetTemplate {
    pub fn new(name: impl Into<String>, widget_type: u32) -> Self {
        Self {
            name: name.into(),
            widget_type,
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_stream_name(mut self, stream_name: impl Into<String>) -> Self {
        self.stream_name = stream_name.into();
        self
    }

    /// Mark the widget as having no power management.
    pub fn without_pm(mut self) -> Self {
        self.reg = -1;
        self
    }

    pub fn with_mixer(mut self, mixer: impl Into<String>) -> Self {
        self.mixers.push(mixer.into());
        self
    }

    pub fn with_enum(mut self, control: impl Into<String>) -> Self {
        self.enums.push(control.into());
        self
    }

    pub fn with_bytes(mut self, control: impl Into<String>) -> Self {
        self.bytes.push(control.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    pub(crate) fn into_element(self) -> Element {
        let record = DapmWidget {
            widget_type: self.widget_type,
            name: self.name.clone(),
            sname: self.stream_name,
            reg: self.reg,
            shift: self.shift,
            mask: self.mask,
            subseq: self.subseq,
            invert: u32::from(self.invert),
            ignore_suspend: u32::from(self.ignore_suspend),
            event_flags: self.event_flags,
            event_type: self.event_type,
            num_kcontrols: 0,
            priv_size: 0,
        };
        let mut element = Element::with_payload(self.name, Payload::Widget(record));
        element.index = self.index;
        for (kind, names) in [
            (ElementType::Mixer, self.mixers),
            (ElementType::Enum, self.enums),
            (ElementType::Bytes, self.bytes),
        ] {
            for name in names {
                element.add_reference(kind, name);
            }
        }
        add_data_refs(&mut element, self.data);
        element
    }
}

/// One `sink <- control <- source` edge of the DAPM graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTemplate {
    pub sink: String,
    pub control: Option<String>,
    pub source: String,
    pub index: u32,
}

impl RouteTemplate {
    pub fn new(sink: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_control(mut self, control: impl Into<String>) -> Self {
        self.control = Some(control.into());
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Parse a `"sink, control, source"` graph line. The control may be
    /// empty.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split(',').map(str::trim);
        let (sink, control, source) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || sink.is_empty() || source.is_empty() {
            return None;
        }
        let route = Self::new(sink, source);
        Some(if control.is_empty() {
            route
        } else {
            route.with_control(control)
        })
    }

    pub(crate) fn into_element(self, id: String) -> Element {
        let record = GraphElem {
            sink: self.sink.clone(),
            control: self.control.clone().unwrap_or_default(),
            source: self.source.clone(),
        };
        let mut element = Element::with_payload(id, Payload::Graph(record));
        element.index = self.index;
        element.add_reference_at(ElementType::Widget, self.sink, 0);
        if let Some(control) = self.control {
            element.add_reference_at(ElementType::Mixer, control, 1);
        }
        element.add_reference_at(ElementType::Widget, self.source, 2);
        element
    }
}

// ---------------------------------------------------------------------------
// PCMs and links
// ---------------------------------------------------------------------------

/// A declared playback or capture direction of a PCM.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDirection {
    /// Name of the stream capabilities for this direction.
    pub capabilities: Option<String>,
}

impl StreamDirection {
    pub fn with_capabilities(capabilities: impl Into<String>) -> Self {
        Self {
            capabilities: Some(capabilities.into()),
        }
    }
}

/// Set `flag` in `mask`, and in `flags` when `on`.
fn set_flag(mask: &mut u32, flags: &mut u32, flag: u32, on: bool) {
    *mask |= flag;
    if on {
        *flags |= flag;
    } else {
        *flags &= !flag;
    }
}

/// A front-end PCM and its DAI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmTemplate {
    pub name: String,
    pub index: u32,
    pub id: u32,
    pub dai_name: String,
    pub dai_id: u32,
    pub playback: Option<StreamDirection>,
    pub capture: Option<StreamDirection>,
    pub compress: bool,
    pub configs: Vec<String>,
    pub flag_mask: u32,
    pub flags: u32,
    pub data: Vec<String>,
}

impl PcmTemplate {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_dai(mut self, name: impl Into<String>, id: u32) -> Self {
        self.dai_name = name.into();
        self.dai_id = id;
        self
    }

    pub fn with_playback(mut self, direction: StreamDirection) -> Self {
        self.playback = Some(direction);
        self
    }

    pub fn with_capture(mut self, direction: StreamDirection) -> Self {
        self.capture = Some(direction);
        self
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.configs.push(config.into());
        self
    }

    /// Declare one `link_flags` bit as set or cleared.
    pub fn with_flag(mut self, flag: u32, on: bool) -> Self {
        set_flag(&mut self.flag_mask, &mut self.flags, flag, on);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    pub(crate) fn into_element(self) -> Element {
        let record = Pcm {
            pcm_name: self.name.clone(),
            dai_name: self.dai_name,
            pcm_id: self.id,
            dai_id: self.dai_id,
            playback: u32::from(self.playback.is_some()),
            capture: u32::from(self.capture.is_some()),
            compress: u32::from(self.compress),
            flag_mask: self.flag_mask,
            flags: self.flags,
            ..Default::default()
        };
        let mut element = Element::with_payload(self.name, Payload::Pcm(record));
        element.index = self.index;
        for (slot, direction) in [(0, self.playback), (1, self.capture)] {
            if let Some(caps) = direction.and_then(|d| d.capabilities) {
                element.add_reference_at(ElementType::StreamCaps, caps, slot);
            }
        }
        for config in self.configs {
            element.add_reference(ElementType::StreamConfig, config);
        }
        add_data_refs(&mut element, self.data);
        element
    }
}

/// Which side of the DSP a link sits on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// DSP to codec (`SectionBE`).
    #[default]
    Backend,
    /// Codec to codec (`SectionCC`).
    Codec,
}

impl LinkKind {
    pub fn element_type(self) -> ElementType {
        match self {
            Self::Backend => ElementType::BackendLink,
            Self::Codec => ElementType::CodecLink,
        }
    }
}

/// A back-end or codec-to-codec DAI link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTemplate {
    pub kind: LinkKind,
    pub name: String,
    pub index: u32,
    pub id: u32,
    pub stream_name: String,
    pub configs: Vec<String>,
    pub hw_configs: Vec<String>,
    pub default_hw_config_id: u32,
    pub flag_mask: u32,
    pub flags: u32,
    pub data: Vec<String>,
}

impl LinkTemplate {
    pub fn new(kind: LinkKind, name: impl Into<String>, id: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            id,
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_stream_name(mut self, stream_name: impl Into<String>) -> Self {
        self.stream_name = stream_name.into();
        self
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.configs.push(config.into());
        self
    }

    pub fn with_hw_config(mut self, hw_config: impl Into<String>) -> Self {
        self.hw_configs.push(hw_config.into());
        self
    }

    pub fn with_default_hw_config(mut self, id: u32) -> Self {
        self.default_hw_config_id = id;
        self
    }

    pub fn with_flag(mut self, flag: u32, on: bool) -> Self {
        set_flag(&mut self.flag_mask, &mut self.flags, flag, on);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    pub(crate) fn into_element(self) -> Element {
        let record = LinkConfig {
            id: self.id,
            name: self.name.clone(),
            stream_name: self.stream_name,
            default_hw_config_id: self.default_hw_config_id,
            flag_mask: self.flag_mask,
            flags: self.flags,
            ..Default::default()
        };
        let payload = match self.kind {
            LinkKind::Backend => Payload::BackendLink(record),
            LinkKind::Codec => Payload::CodecLink(record),
        };
        let mut element = Element::with_payload(self.name, payload);
        element.index = self.index;
        for config in self.configs {
            element.add_reference(ElementType::StreamConfig, config);
        }
        for hw_config in self.hw_configs {
            element.add_reference(ElementType::HwConfig, hw_config);
        }
        add_data_refs(&mut element, self.data);
        element
    }
}

// ---------------------------------------------------------------------------
// Private data
// ---------------------------------------------------------------------------

/// One source of private data, merged in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Literal bytes, copied as they are.
    Bytes(Vec<u8>),
    /// A vendor tuple table, serialized by the data pass.
    Tuples(String),
}

/// Raw bytes and tuple tables destined for an element's private area.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTemplate {
    pub name: String,
    pub sources: Vec<DataSource>,
    pub vendor_type: u32,
}

impl DataTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.push_bytes(bytes);
        self
    }

    pub fn with_tuples(mut self, tuples: impl Into<String>) -> Self {
        self.sources.push(DataSource::Tuples(tuples.into()));
        self
    }

    pub fn with_vendor_type(mut self, vendor_type: u32) -> Self {
        self.vendor_type = vendor_type;
        self
    }

    /// Append literal bytes, joining them to a directly preceding literal.
    pub fn push_bytes(&mut self, bytes: impl Into<Vec<u8>>) {
        let bytes = bytes.into();
        match self.sources.last_mut() {
            Some(DataSource::Bytes(last)) => last.extend(bytes),
            _ => self.sources.push(DataSource::Bytes(bytes)),
        }
    }

    /// Total length of the literal sources.
    pub fn literal_len(&self) -> usize {
        self.sources
            .iter()
            .map(|source| match source {
                DataSource::Bytes(bytes) => bytes.len(),
                DataSource::Tuples(_) => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixer_defaults() {
        let element = MixerTemplate::new("Volume")
            .with_max(31)
            .with_channel(ChannelTemplate::new(3).with_reg(0))
            .with_tlv("vol_tlv")
            .into_element()
            .unwrap();
        let Payload::Mixer(mixer) = element.payload() else {
            panic!("not a mixer");
        };
        assert_eq!(mixer.platform_max, 31);
        assert_eq!(mixer.hdr.access, access::READWRITE);
        assert_eq!(mixer.hdr.ctl_type, BlockType::Mixer.tag());
        assert_eq!(mixer.channels[0].reg, 0);
        assert_eq!(element.references()[0].kind, ElementType::Tlv);
    }

    #[test]
    fn too_many_channels_rejected() {
        let mut template = MixerTemplate::new("Surround");
        for id in 0..9 {
            template = template.with_channel(ChannelTemplate::new(id));
        }
        assert!(matches!(
            template.into_element(),
            Err(TplgError::InvalidValue { .. })
        ));
    }

    #[test]
    fn widget_references_in_order() {
        let element = WidgetTemplate::new("Mixer1", 3)
            .with_data("cfg")
            .with_enum("Mode")
            .with_mixer("Gain")
            .into_element();
        let kinds: Vec<ElementType> = element.references().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ElementType::Mixer, ElementType::Enum, ElementType::Data]
        );
    }

    #[test]
    fn route_line_parsing() {
        let route = RouteTemplate::parse_line("Speaker, , PGA1").unwrap();
        assert_eq!(route.sink, "Speaker");
        assert_eq!(route.control, None);
        assert_eq!(route.source, "PGA1");

        let route = RouteTemplate::parse_line(" Mux ,Capture Switch, ADC ").unwrap();
        assert_eq!(route.control.as_deref(), Some("Capture Switch"));

        assert!(RouteTemplate::parse_line("a, b").is_none());
        assert!(RouteTemplate::parse_line("a, b, c, d").is_none());
        assert!(RouteTemplate::parse_line(", b, c").is_none());
    }

    #[test]
    fn route_slots_are_fixed() {
        let element = RouteTemplate::new("Speaker", "PGA1").into_element("route.0".into());
        let slots: Vec<usize> = element.references().iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![0, 2]);
    }

    #[test]
    fn pcm_directions_set_flags_and_caps() {
        let element = PcmTemplate::new("System", 0)
            .with_capture(StreamDirection::with_capabilities("caps"))
            .with_flag(tplg_types::abi::link_flags::SYMMETRIC_RATES, true)
            .into_element();
        let Payload::Pcm(pcm) = element.payload() else {
            panic!("not a pcm");
        };
        assert_eq!((pcm.playback, pcm.capture), (0, 1));
        assert_eq!((pcm.flag_mask, pcm.flags), (1, 1));
        assert_eq!(element.references()[0].slot, 1);
    }

    #[test]
    fn link_kind_selects_payload() {
        let element = LinkTemplate::new(LinkKind::Codec, "CC0", 4).into_element();
        assert_eq!(element.kind(), ElementType::CodecLink);
        let element = LinkTemplate::new(LinkKind::Backend, "SSP0", 0).into_element();
        assert_eq!(element.kind(), ElementType::BackendLink);
    }

    #[test]
    fn data_sources_keep_order() {
        let data = DataTemplate::new("d")
            .with_tuples("t1")
            .with_bytes([1, 2])
            .with_bytes([3])
            .with_tuples("t2");
        assert_eq!(
            data.sources,
            vec![
                DataSource::Tuples("t1".into()),
                DataSource::Bytes(vec![1, 2, 3]),
                DataSource::Tuples("t2".into()),
            ]
        );
        assert_eq!(data.literal_len(), 3);
    }
}
