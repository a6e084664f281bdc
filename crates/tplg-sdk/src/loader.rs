//! Section loader: turns a configuration tree into template calls.
//!
//! Every `Section*` compound is read into the matching template and handed
//! to the same [`Project`] method the programmatic API uses. The loader only
//! depends on [`ConfigNode`], so any tree reader can feed it.

use std::path::{Path, PathBuf};

use tplg_conf::{parse_str, ConfigNode};
use tplg_tuple::{TokenTable, TupleSet, TupleTable};
use tplg_types::abi::link_flags;
use tplg_types::names::{
    access_flag, channel_id, clock_provider, ctl_ops, hw_format, parse_bool, parse_i32,
    parse_u32, pcm_format_mask, pcm_rate_mask, widget_type,
};
use tplg_types::wire::{DbScale, HwConfig, IoOps, Stream, StreamCaps};
use tplg_types::{TupleType, TypeResult};
use tracing::debug;

use crate::error::{TplgError, TplgResult};
use crate::project::Project;
use crate::template::{
    BytesTemplate, ChannelTemplate, DataTemplate, EnumTemplate, LinkKind, LinkTemplate,
    MixerTemplate, PcmTemplate, RouteTemplate, StreamDirection, WidgetTemplate,
};

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// The section currently being read, for error messages.
#[derive(Clone, Copy)]
struct Ctx<'a> {
    section: &'static str,
    id: &'a str,
}

impl<'a> Ctx<'a> {
    fn invalid(&self, field: &str, value: &str, reason: impl ToString) -> TplgError {
        TplgError::InvalidValue {
            section: self.section.to_string(),
            id: self.id.to_string(),
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn unknown<N: ConfigNode>(&self, field: &N) -> TplgError {
        TplgError::UnknownField {
            section: self.section.to_string(),
            id: self.id.to_string(),
            field: field.id().to_string(),
        }
    }

    fn value<'n, N: ConfigNode>(&self, field: &'n N) -> TplgResult<&'n str> {
        field
            .string_value()
            .ok_or_else(|| self.invalid(field.id(), "{...}", "expected a single value"))
    }

    fn parse<N: ConfigNode, T>(&self, field: &N, parse: impl FnOnce(&str) -> TypeResult<T>) -> TplgResult<T> {
        let value = self.value(field)?;
        parse(value).map_err(|e| self.invalid(field.id(), value, e))
    }

    fn u32<N: ConfigNode>(&self, field: &N) -> TplgResult<u32> {
        self.parse(field, parse_u32)
    }

    fn i32<N: ConfigNode>(&self, field: &N) -> TplgResult<i32> {
        self.parse(field, parse_i32)
    }

    fn u16<N: ConfigNode>(&self, field: &N) -> TplgResult<u16> {
        let value = self.u32(field)?;
        u16::try_from(value).map_err(|_| self.invalid(field.id(), &value.to_string(), "exceeds 16 bits"))
    }

    fn flag<N: ConfigNode>(&self, field: &N) -> TplgResult<bool> {
        self.parse(field, parse_bool)
    }

    fn byte_flag<N: ConfigNode>(&self, field: &N) -> TplgResult<u8> {
        Ok(u8::from(self.flag(field)?))
    }

    fn string<N: ConfigNode>(&self, field: &N) -> TplgResult<String> {
        self.value(field).map(str::to_string)
    }

    fn list<N: ConfigNode>(&self, field: &N) -> Vec<String> {
        field.string_list().into_iter().map(str::to_string).collect()
    }

    /// `access [ read write volatile ]` or `access "read_write"`.
    fn access<N: ConfigNode>(&self, field: &N) -> TplgResult<u32> {
        field.string_list().into_iter().try_fold(0, |mask, name| {
            access_flag(name)
                .map(|bit| mask | bit)
                .map_err(|e| self.invalid("access", name, e))
        })
    }

    /// `ops."ctl" { info "volsw" get "257" put "257" }`; the inner compound
    /// is optional.
    fn ops<N: ConfigNode>(&self, field: &N, ops: &mut IoOps) -> TplgResult<()> {
        for child in field.children() {
            if child.is_compound() {
                self.ops(child, ops)?;
                continue;
            }
            let id = self.parse(child, ctl_ops)?;
            match child.id() {
                "info" => ops.info = id,
                "get" => ops.get = id,
                "put" => ops.put = id,
                _ => return Err(self.unknown(child)),
            }
        }
        Ok(())
    }

    /// `channel."FL" { reg "0" shift "0" }`, one compound per channel.
    fn channels<N: ConfigNode>(&self, field: &N) -> TplgResult<Vec<ChannelTemplate>> {
        field
            .children()
            .iter()
            .map(|node| {
                let id = channel_id(node.id()).map_err(|e| self.invalid("channel", node.id(), e))?;
                let mut channel = ChannelTemplate::new(id);
                for child in node.children() {
                    match child.id() {
                        "reg" => channel.reg = self.i32(child)?,
                        "shift" => channel.shift = self.u32(child)?,
                        _ => return Err(self.unknown(child)),
                    }
                }
                Ok(channel)
            })
            .collect()
    }

    /// The four `link_flags` booleans shared by PCMs and links.
    fn link_flag(name: &str) -> Option<u32> {
        match name {
            "symmetric_rates" => Some(link_flags::SYMMETRIC_RATES),
            "symmetric_channels" => Some(link_flags::SYMMETRIC_CHANNELS),
            "symmetric_sample_bits" => Some(link_flags::SYMMETRIC_SAMPLEBITS),
            "voice_wakeup" => Some(link_flags::VOICE_WAKEUP),
            _ => None,
        }
    }
}

/// Hex literals separated by `,`, `:` or whitespace, each `width` bytes
/// wide, written little endian.
fn parse_hex(text: &str, width: usize) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    for item in text
        .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let digits = item
            .strip_prefix("0x")
            .or_else(|| item.strip_prefix("0X"))
            .unwrap_or(item);
        // from_str_radix takes a leading sign.
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        if width < 4 && value >> (width * 8) != 0 {
            return None;
        }
        out.extend_from_slice(&value.to_le_bytes()[..width]);
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Feeds configuration sections into a [`Project`].
pub struct SectionLoader<'p> {
    project: &'p mut Project,
    base_dir: Option<PathBuf>,
}

impl<'p> SectionLoader<'p> {
    pub fn new(project: &'p mut Project) -> Self {
        Self {
            project,
            base_dir: None,
        }
    }

    /// Directory searched first for `file` data sources.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Load every section below `root`. Returns the number of elements
    /// added.
    pub fn load<N: ConfigNode>(&mut self, root: &N) -> TplgResult<usize> {
        let before = self.project.store().total_len();
        for section in root.children() {
            let load: fn(&mut Self, &N) -> TplgResult<()> = match section.id() {
                "SectionTLV" => Self::tlv,
                "SectionText" => Self::text,
                "SectionData" => Self::data,
                "SectionVendorTokens" => Self::tokens,
                "SectionVendorTuples" => Self::tuples,
                "SectionControlMixer" => Self::mixer,
                "SectionControlEnum" => Self::enum_control,
                "SectionControlBytes" => Self::bytes,
                "SectionWidget" => Self::widget,
                "SectionGraph" => Self::graph,
                "SectionPCMCapabilities" => Self::stream_caps,
                "SectionPCMConfig" => Self::stream_config,
                "SectionHWConfig" => Self::hw_config,
                "SectionPCM" => Self::pcm,
                "SectionBE" => Self::backend_link,
                "SectionCC" => Self::codec_link,
                "SectionManifest" => Self::manifest,
                other => return Err(TplgError::UnknownSection(other.to_string())),
            };
            for node in section.children() {
                load(self, node)?;
            }
            debug!(
                section = section.id(),
                count = section.children().len(),
                "section loaded"
            );
        }
        Ok(self.project.store().total_len() - before)
    }

    // ---- Controls ----

    fn tlv<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionTLV",
            id: node.id(),
        };
        let mut scale = DbScale::default();
        for field in node.children() {
            match field.id() {
                "scale" => {
                    for child in field.children() {
                        match child.id() {
                            "min" => scale.min = ctx.i32(child)?,
                            "step" => scale.step = ctx.i32(child)?,
                            "mute" => scale.mute = u32::from(ctx.flag(child)?),
                            _ => return Err(ctx.unknown(child)),
                        }
                    }
                }
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_tlv(node.id(), scale)?;
        Ok(())
    }

    fn text<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionText",
            id: node.id(),
        };
        let mut values = Vec::new();
        for field in node.children() {
            match field.id() {
                "values" => values.extend(ctx.list(field)),
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_text(node.id(), values)?;
        Ok(())
    }

    fn mixer<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionControlMixer",
            id: node.id(),
        };
        let mut mixer = MixerTemplate::new(node.id());
        for field in node.children() {
            match field.id() {
                "index" => mixer.index = ctx.u32(field)?,
                "channel" => mixer.channels.extend(ctx.channels(field)?),
                "max" => mixer.max = ctx.i32(field)?,
                "platform_max" => mixer.platform_max = Some(ctx.i32(field)?),
                "invert" => mixer.invert = ctx.flag(field)?,
                "ops" => ctx.ops(field, &mut mixer.ops)?,
                "access" => mixer.access = Some(ctx.access(field)?),
                "tlv" => mixer.tlv = Some(ctx.string(field)?),
                "data" => mixer.data.extend(ctx.list(field)),
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_mixer(mixer)?;
        Ok(())
    }

    fn enum_control<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionControlEnum",
            id: node.id(),
        };
        let mut control = EnumTemplate::new(node.id());
        for field in node.children() {
            match field.id() {
                "index" => control.index = ctx.u32(field)?,
                "texts" => control.texts = Some(ctx.string(field)?),
                "channel" => control.channels.extend(ctx.channels(field)?),
                "ops" => ctx.ops(field, &mut control.ops)?,
                "access" => control.access = Some(ctx.access(field)?),
                "data" => control.data.extend(ctx.list(field)),
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_enum(control)?;
        Ok(())
    }

    fn bytes<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionControlBytes",
            id: node.id(),
        };
        let mut control = BytesTemplate::new(node.id());
        for field in node.children() {
            match field.id() {
                "index" => control.index = ctx.u32(field)?,
                "base" => control.base = ctx.u32(field)?,
                "num_regs" => control.num_regs = ctx.u32(field)?,
                "mask" => control.mask = ctx.u32(field)?,
                "max" => control.max = ctx.u32(field)?,
                "tlv" => control.tlv = Some(ctx.string(field)?),
                "ops" => ctx.ops(field, &mut control.ops)?,
                "extops" => ctx.ops(field, &mut control.ext_ops)?,
                "access" => control.access = Some(ctx.access(field)?),
                "data" => control.data.extend(ctx.list(field)),
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_bytes(control)?;
        Ok(())
    }

    // ---- Widgets and routes ----

    fn widget<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionWidget",
            id: node.id(),
        };
        let mut widget = WidgetTemplate::new(node.id(), 0);
        for field in node.children() {
            match field.id() {
                "index" => widget.index = ctx.u32(field)?,
                "type" => widget.widget_type = ctx.parse(field, widget_type)?,
                "stream_name" => widget.stream_name = ctx.string(field)?,
                "no_pm" => {
                    if ctx.flag(field)? {
                        widget.reg = -1;
                    }
                }
                "reg" => widget.reg = ctx.i32(field)?,
                "shift" => widget.shift = ctx.u32(field)?,
                "mask" => widget.mask = ctx.u32(field)?,
                "invert" => widget.invert = ctx.flag(field)?,
                "subseq" => widget.subseq = ctx.u32(field)?,
                "event_type" => widget.event_type = ctx.u16(field)?,
                "event_flags" => widget.event_flags = ctx.u16(field)?,
                "ignore_suspend" => widget.ignore_suspend = ctx.flag(field)?,
                "mixer" => widget.mixers.extend(ctx.list(field)),
                "enum" => widget.enums.extend(ctx.list(field)),
                "bytes" => widget.bytes.extend(ctx.list(field)),
                "data" => widget.data.extend(ctx.list(field)),
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_widget(widget)?;
        Ok(())
    }

    fn graph<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionGraph",
            id: node.id(),
        };
        let mut index = 0;
        let mut routes = Vec::new();
        for field in node.children() {
            match field.id() {
                "index" => index = ctx.u32(field)?,
                "lines" => {
                    for line in field.string_list() {
                        let route = RouteTemplate::parse_line(line).ok_or_else(|| {
                            ctx.invalid("lines", line, "expected \"sink, control, source\"")
                        })?;
                        routes.push(route);
                    }
                }
                _ => return Err(ctx.unknown(field)),
            }
        }
        for route in routes {
            self.project.add_route(route.with_index(index))?;
        }
        Ok(())
    }

    // ---- Streams ----

    fn stream_caps<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionPCMCapabilities",
            id: node.id(),
        };
        let mut caps = StreamCaps {
            name: node.id().to_string(),
            ..Default::default()
        };
        for field in node.children() {
            match field.id() {
                "formats" => caps.formats = ctx.parse(field, pcm_format_mask)?,
                "rates" => caps.rates = ctx.parse(field, pcm_rate_mask)?,
                "rate_min" => caps.rate_min = ctx.u32(field)?,
                "rate_max" => caps.rate_max = ctx.u32(field)?,
                "channels_min" => caps.channels_min = ctx.u32(field)?,
                "channels_max" => caps.channels_max = ctx.u32(field)?,
                "periods_min" => caps.periods_min = ctx.u32(field)?,
                "periods_max" => caps.periods_max = ctx.u32(field)?,
                "period_size_min" => caps.period_size_min = ctx.u32(field)?,
                "period_size_max" => caps.period_size_max = ctx.u32(field)?,
                "buffer_size_min" => caps.buffer_size_min = ctx.u32(field)?,
                "buffer_size_max" => caps.buffer_size_max = ctx.u32(field)?,
                "sig_bits" => caps.sig_bits = ctx.u32(field)?,
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_stream_caps(caps)?;
        Ok(())
    }

    fn stream_config<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionPCMConfig",
            id: node.id(),
        };
        let mut stream = Stream {
            name: node.id().to_string(),
            ..Default::default()
        };
        for field in node.children() {
            match field.id() {
                "format" => stream.format = ctx.parse(field, pcm_format_mask)?,
                "rate" => stream.rate = ctx.u32(field)?,
                "channels" => stream.channels = ctx.u32(field)?,
                "period_bytes" => stream.period_bytes = ctx.u32(field)?,
                "buffer_bytes" => stream.buffer_bytes = ctx.u32(field)?,
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_stream_config(stream)?;
        Ok(())
    }

    fn hw_config<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionHWConfig",
            id: node.id(),
        };
        let mut hw = HwConfig::default();
        for field in node.children() {
            match field.id() {
                "id" => hw.id = ctx.u32(field)?,
                "format" | "fmt" => hw.fmt = ctx.parse(field, hw_format)?,
                "bclk" | "bclk_master" => hw.bclk_master = ctx.parse(field, clock_provider)?,
                "fsync" | "fsync_master" => hw.fsync_master = ctx.parse(field, clock_provider)?,
                "mclk" => {
                    let value = ctx.value(field)?;
                    hw.mclk_direction = match value {
                        "codec_mclk_out" => 0,
                        "codec_mclk_in" => 1,
                        _ => return Err(ctx.invalid("mclk", value, "expected codec_mclk_in or codec_mclk_out")),
                    };
                }
                "bclk_invert" => hw.invert_bclk = ctx.byte_flag(field)?,
                "fsync_invert" => hw.invert_fsync = ctx.byte_flag(field)?,
                "clock_gated" => hw.clock_gated = ctx.byte_flag(field)?,
                "mclk_freq" | "mclk_rate" => hw.mclk_rate = ctx.u32(field)?,
                "bclk_freq" | "bclk_rate" => hw.bclk_rate = ctx.u32(field)?,
                "fsync_freq" | "fsync_rate" => hw.fsync_rate = ctx.u32(field)?,
                "tdm_slots" => hw.tdm_slots = ctx.u32(field)?,
                "tdm_slot_width" => hw.tdm_slot_width = ctx.u32(field)?,
                "tx_slots" => hw.tx_slots = ctx.u32(field)?,
                "rx_slots" => hw.rx_slots = ctx.u32(field)?,
                "tx_channels" => hw.tx_channels = ctx.u32(field)?,
                "rx_channels" => hw.rx_channels = ctx.u32(field)?,
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.add_hw_config(node.id(), hw)?;
        Ok(())
    }

    fn pcm<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionPCM",
            id: node.id(),
        };
        let mut pcm = PcmTemplate::new(node.id(), 0);
        for field in node.children() {
            match field.id() {
                "index" => pcm.index = ctx.u32(field)?,
                "id" => pcm.id = ctx.u32(field)?,
                // dai."System Pin" { id "0" }
                "dai" => {
                    for dai in field.children() {
                        pcm.dai_name = dai.id().to_string();
                        for child in dai.children() {
                            match child.id() {
                                "id" => pcm.dai_id = ctx.u32(child)?,
                                _ => return Err(ctx.unknown(child)),
                            }
                        }
                    }
                }
                // pcm."playback" { capabilities "caps" }
                "pcm" => {
                    for stream in field.children() {
                        let mut direction = StreamDirection::default();
                        for child in stream.children() {
                            match child.id() {
                                "capabilities" => direction.capabilities = Some(ctx.string(child)?),
                                _ => return Err(ctx.unknown(child)),
                            }
                        }
                        match stream.id() {
                            "playback" => pcm.playback = Some(direction),
                            "capture" => pcm.capture = Some(direction),
                            other => return Err(ctx.invalid("pcm", other, "expected playback or capture")),
                        }
                    }
                }
                "compress" => pcm.compress = ctx.flag(field)?,
                "configs" => pcm.configs.extend(ctx.list(field)),
                "data" => pcm.data.extend(ctx.list(field)),
                name => match Ctx::link_flag(name) {
                    Some(flag) => pcm = pcm.with_flag(flag, ctx.flag(field)?),
                    None => return Err(ctx.unknown(field)),
                },
            }
        }
        self.project.add_pcm(pcm)?;
        Ok(())
    }

    fn link<N: ConfigNode>(&mut self, node: &N, kind: LinkKind, section: &'static str) -> TplgResult<()> {
        let ctx = Ctx {
            section,
            id: node.id(),
        };
        let mut link = LinkTemplate::new(kind, node.id(), 0);
        for field in node.children() {
            match field.id() {
                "index" => link.index = ctx.u32(field)?,
                "id" => link.id = ctx.u32(field)?,
                "stream_name" => link.stream_name = ctx.string(field)?,
                "configs" => link.configs.extend(ctx.list(field)),
                "hw_configs" => link.hw_configs.extend(ctx.list(field)),
                "default_hw_conf_id" => link.default_hw_config_id = ctx.u32(field)?,
                "data" => link.data.extend(ctx.list(field)),
                name => match Ctx::link_flag(name) {
                    Some(flag) => link = link.with_flag(flag, ctx.flag(field)?),
                    None => return Err(ctx.unknown(field)),
                },
            }
        }
        self.project.add_link(link)?;
        Ok(())
    }

    fn backend_link<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        self.link(node, LinkKind::Backend, "SectionBE")
    }

    fn codec_link<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        self.link(node, LinkKind::Codec, "SectionCC")
    }

    // ---- Private data ----

    fn data<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionData",
            id: node.id(),
        };
        let mut data = DataTemplate::new(node.id());
        for field in node.children() {
            let width = match field.id() {
                "bytes" => 1,
                "shorts" => 2,
                "words" => 4,
                "file" => {
                    let name = ctx.value(field)?;
                    data.push_bytes(self.read_file(name)?);
                    continue;
                }
                "tuples" => {
                    for tuples in ctx.list(field) {
                        data = data.with_tuples(tuples);
                    }
                    continue;
                }
                "type" => {
                    data.vendor_type = ctx.u32(field)?;
                    continue;
                }
                _ => return Err(ctx.unknown(field)),
            };
            let value = ctx.value(field)?;
            let parsed = parse_hex(value, width)
                .ok_or_else(|| ctx.invalid(field.id(), value, "expected hex values"))?;
            data.push_bytes(parsed);
        }
        self.project.add_data(data)?;
        Ok(())
    }

    fn read_file(&self, name: &str) -> TplgResult<Vec<u8>> {
        let path = self
            .project
            .config()
            .resolve_file(name, self.base_dir.as_deref())
            .unwrap_or_else(|| PathBuf::from(name));
        std::fs::read(&path).map_err(|source| TplgError::Io { path, source })
    }

    fn tokens<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionVendorTokens",
            id: node.id(),
        };
        let mut tokens = TokenTable::new();
        for field in node.children() {
            tokens.insert(field.id(), ctx.u32(field)?);
        }
        self.project.add_tokens(node.id(), tokens)?;
        Ok(())
    }

    fn tuples<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionVendorTuples",
            id: node.id(),
        };
        let mut tokens = None;
        let mut sets = Vec::new();
        for field in node.children() {
            match field.id() {
                "tokens" => tokens = Some(ctx.string(field)?),
                // tuples."word.pipeline" { SOF_TKN_X "1" }
                "tuples" => {
                    for group in field.children() {
                        let tuple_type = TupleType::from_name(group.id())
                            .map_err(|e| TplgError::MalformedPrivateData {
                                id: node.id().to_string(),
                                reason: e.to_string(),
                            })?;
                        let mut set = TupleSet::new(tuple_type);
                        for tuple in group.children() {
                            set.push_literal(tuple.id(), ctx.value(tuple)?)?;
                        }
                        sets.push(set);
                    }
                }
                _ => return Err(ctx.unknown(field)),
            }
        }
        let tokens = tokens.ok_or_else(|| ctx.invalid("tokens", "", "missing token table"))?;
        let table = sets
            .into_iter()
            .fold(TupleTable::new(tokens), TupleTable::with_set);
        self.project.add_tuples(node.id(), table)?;
        Ok(())
    }

    fn manifest<N: ConfigNode>(&mut self, node: &N) -> TplgResult<()> {
        let ctx = Ctx {
            section: "SectionManifest",
            id: node.id(),
        };
        let mut data = Vec::new();
        for field in node.children() {
            match field.id() {
                "data" => data.extend(ctx.list(field)),
                _ => return Err(ctx.unknown(field)),
            }
        }
        self.project.set_manifest(node.id(), data)?;
        Ok(())
    }
}

// ---- Project entry points ----

impl Project {
    /// Parse configuration text and load its sections.
    pub fn load_str(&mut self, text: &str) -> TplgResult<usize> {
        let root = parse_str(text)?;
        SectionLoader::new(self).load(&root)
    }

    /// Read, parse and load a configuration file. `file` data sources are
    /// looked up next to it first.
    pub fn load_file(&mut self, path: &Path) -> TplgResult<usize> {
        let text = std::fs::read_to_string(path).map_err(|source| TplgError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = parse_str(&text)?;
        let mut loader = SectionLoader::new(self);
        if let Some(dir) = path.parent() {
            loader = loader.with_base_dir(dir);
        }
        loader.load(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tplg_store::Payload;
    use tplg_types::ElementType;

    fn load(text: &str) -> TplgResult<Project> {
        let mut project = Project::default();
        project.load_str(text)?;
        Ok(project)
    }

    #[test]
    fn hex_lists() {
        assert_eq!(parse_hex("0x01,0x02, 0xff", 1), Some(vec![1, 2, 0xff]));
        assert_eq!(parse_hex("01:02:03", 1), Some(vec![1, 2, 3]));
        assert_eq!(parse_hex("0x1234", 2), Some(vec![0x34, 0x12]));
        assert_eq!(parse_hex("0x01020304", 4), Some(vec![4, 3, 2, 1]));
        assert_eq!(parse_hex("0x100", 1), None);
        assert_eq!(parse_hex("zz", 1), None);
        assert_eq!(parse_hex("+ff", 1), None);
        assert_eq!(parse_hex("0x+1", 1), None);
        assert_eq!(parse_hex("-1", 4), None);
    }

    #[test]
    fn mixer_fields() {
        let project = load(
            r#"
            SectionControlMixer."Master Volume" {
                index "2"
                channel."FL" { reg "0" shift "0" }
                channel."FR" { reg "0" shift "8" }
                max "31"
                ops."ctl" { info "volsw" get "volsw" put "volsw" }
                access [ read write tlv_read ]
            }
            "#,
        )
        .unwrap();
        let key = project.store().lookup(ElementType::Mixer, "Master Volume").unwrap();
        let element = project.store().get(key);
        assert_eq!(element.index, 2);
        let Payload::Mixer(mixer) = element.payload() else {
            panic!("not a mixer");
        };
        assert_eq!(mixer.channels.len(), 2);
        assert_eq!(mixer.channels[1].shift, 8);
        assert_eq!(mixer.channels[1].id, 4);
        assert_eq!(mixer.hdr.ops, IoOps::uniform(1));
        assert_eq!(mixer.hdr.access, 0x13);
        assert_eq!(mixer.platform_max, 31);
    }

    #[test]
    fn unknown_section_rejected() {
        let err = load("SectionNope.\"x\" { a 1 }").err().unwrap();
        assert!(matches!(err, TplgError::UnknownSection(ref s) if s == "SectionNope"));
        assert_eq!(err.kind(), ErrorKind::UnknownSection);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = load("SectionWidget.\"w\" { colour blue }").err().unwrap();
        assert!(matches!(err, TplgError::UnknownField { ref field, .. } if field == "colour"));
    }

    #[test]
    fn bad_widget_type_is_invalid_value() {
        let err = load("SectionWidget.\"w\" { type teapot }").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn syntax_errors_surface_as_conf() {
        let err = load("SectionWidget.\"w\" { type pga").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Conf);
    }

    #[test]
    fn widget_no_pm_and_lists() {
        let project = load(
            r#"
            SectionWidget."Mixer1" {
                type "mixer"
                no_pm "true"
                mixer [ "Gain" "Boost" ]
                enum "Mode"
            }
            "#,
        )
        .unwrap();
        let key = project.store().lookup(ElementType::Widget, "Mixer1").unwrap();
        let element = project.store().get(key);
        let Payload::Widget(widget) = element.payload() else {
            panic!("not a widget");
        };
        assert_eq!(widget.reg, -1);
        assert_eq!(widget.widget_type, 3);
        let targets: Vec<&str> = element.references().iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["Gain", "Boost", "Mode"]);
    }

    #[test]
    fn graph_lines_become_routes() {
        let project = load(
            r#"
            SectionGraph."main" {
                lines [ "Speaker, , PGA1" "PGA1, Switch, DAC" ]
                index "3"
            }
            "#,
        )
        .unwrap();
        assert_eq!(project.store().len(ElementType::Graph), 2);
        assert!(project
            .store()
            .elements(ElementType::Graph)
            .iter()
            .all(|e| e.index == 3));
    }

    #[test]
    fn bad_graph_line() {
        let err = load("SectionGraph.g { lines [ \"just one\" ] }").err().unwrap();
        assert!(matches!(err, TplgError::InvalidValue { ref field, .. } if field == "lines"));
    }

    #[test]
    fn data_sources_concatenate() {
        let project = load(
            r#"
            SectionData."blob" {
                bytes "0x01,0x02"
                shorts "0x0304"
                type "7"
            }
            "#,
        )
        .unwrap();
        let key = project.store().lookup(ElementType::Data, "blob").unwrap();
        let element = project.store().get(key);
        assert_eq!(element.private_data(), &[1, 2, 4, 3]);
        assert_eq!(element.vendor_type, 7);
    }

    #[test]
    fn data_sources_keep_declaration_order() {
        let mut project = load(
            r#"
            SectionVendorTokens."tok" { A "1" }
            SectionVendorTuples."tup" {
                tokens "tok"
                tuples."word" { A "5" }
            }
            SectionData."d" {
                tuples "tup"
                bytes "0xaa"
            }
            "#,
        )
        .unwrap();
        project.build().unwrap();
        let key = project.store().lookup(ElementType::Data, "d").unwrap();
        let bytes = project.store().get(key).private_data();
        assert_eq!(bytes.len(), 21);
        assert_eq!(&bytes[..4], &20u32.to_le_bytes());
        assert_eq!(bytes[20], 0xaa);
    }

    #[test]
    fn signed_hex_literal_rejected() {
        let err = load(r#"SectionData."d" { bytes "+ff" }"#).err().unwrap();
        assert!(matches!(err, TplgError::InvalidValue { ref field, .. } if field == "bytes"));
    }

    #[test]
    fn data_file_resolved_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("coeffs.bin"), [9u8, 8, 7]).unwrap();
        let conf = dir.path().join("top.conf");
        std::fs::write(&conf, "SectionData.\"eq\" { file \"coeffs.bin\" }").unwrap();

        let mut project = Project::default();
        assert_eq!(project.load_file(&conf).unwrap(), 1);
        let key = project.store().lookup(ElementType::Data, "eq").unwrap();
        assert_eq!(project.store().get(key).private_data(), &[9, 8, 7]);
    }

    #[test]
    fn missing_data_file_is_io() {
        let err = load("SectionData.\"eq\" { file \"/nonexistent/coeffs.bin\" }")
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn bad_tuple_literal_is_malformed_data() {
        let err = load(
            r#"
            SectionVendorTuples."t" {
                tokens "tok"
                tuples."byte" { a "300" }
            }
            "#,
        )
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::MalformedPrivateData);

        let err = load("SectionVendorTuples.\"t\" { tokens tok tuples.\"float\" { a 1 } }")
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::MalformedPrivateData);
    }

    #[test]
    fn pcm_sections() {
        let project = load(
            r#"
            SectionPCM."System Playback" {
                id "0"
                dai."System Pin" { id "3" }
                pcm."playback" { capabilities "System Playback" }
                symmetric_rates "true"
            }
            "#,
        )
        .unwrap();
        let key = project.store().lookup(ElementType::Pcm, "System Playback").unwrap();
        let element = project.store().get(key);
        let Payload::Pcm(pcm) = element.payload() else {
            panic!("not a pcm");
        };
        assert_eq!(pcm.dai_name, "System Pin");
        assert_eq!(pcm.dai_id, 3);
        assert_eq!((pcm.playback, pcm.capture), (1, 0));
        assert_eq!(pcm.flags & link_flags::SYMMETRIC_RATES, link_flags::SYMMETRIC_RATES);
        assert_eq!(element.references()[0].kind, ElementType::StreamCaps);
    }

    #[test]
    fn hw_config_fields() {
        let project = load(
            r#"
            SectionHWConfig."ssp0" {
                id "0"
                format "I2S"
                bclk "codec_slave"
                fsync "codec_slave"
                mclk_freq "19200000"
                tdm_slots "2"
            }
            "#,
        )
        .unwrap();
        let key = project.store().lookup(ElementType::HwConfig, "ssp0").unwrap();
        let Payload::HwConfig(hw) = project.store().get(key).payload() else {
            panic!("not a hw config");
        };
        assert_eq!(hw.fmt, 1);
        assert_eq!((hw.bclk_master, hw.fsync_master), (1, 1));
        assert_eq!(hw.mclk_rate, 19_200_000);
        assert_eq!(hw.tdm_slots, 2);
    }
}
