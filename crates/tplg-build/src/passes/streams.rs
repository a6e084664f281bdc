use tplg_store::{ElementKey, Payload, Reference};
use tplg_types::abi::{HW_CONFIG_MAX, STREAM_CONFIG_MAX};
use tplg_types::wire::LinkConfig;
use tplg_types::ElementType;
use tracing::debug;

use crate::error::{BuildError, BuildResult};
use crate::pass::{BuildContext, BuildPass, PassStats};

/// Fills PCM and link records from the stream descriptors they name.
pub struct StreamPass;

impl BuildPass for StreamPass {
    fn name(&self) -> &str {
        "streams"
    }

    fn run(&self, ctx: &mut BuildContext<'_>) -> BuildResult<PassStats> {
        let mut stats = PassStats::default();
        for kind in [ElementType::Pcm, ElementType::BackendLink, ElementType::CodecLink] {
            let keys: Vec<_> = ctx.store.keys(kind).collect();
            for key in keys {
                stats.elements += 1;
                for (index, reference) in ctx.pending(key) {
                    let target = ctx.require(key, &reference)?;
                    match (kind, reference.kind) {
                        (_, ElementType::Data) => {
                            ctx.merge_data(key, target)?;
                        }
                        (ElementType::Pcm, ElementType::StreamCaps) => {
                            copy_caps(ctx, key, &reference, target)?
                        }
                        (_, ElementType::StreamConfig) => copy_stream(ctx, key, target)?,
                        (ElementType::BackendLink | ElementType::CodecLink, ElementType::HwConfig) => {
                            copy_hw_config(ctx, key, target)?
                        }
                        _ => return Err(ctx.unsupported(key, &reference)),
                    }
                    ctx.mark_resolved(key, index, target);
                    stats.resolved += 1;
                    debug!(
                        kind = %kind,
                        id = ctx.store.get(key).id(),
                        target_kind = %reference.kind,
                        target = %reference.target,
                        "stream reference resolved"
                    );
                }
            }
        }
        Ok(stats)
    }
}

fn too_many(ctx: &BuildContext<'_>, key: ElementKey, what: &'static str, max: usize) -> BuildError {
    BuildError::TooMany {
        kind: key.kind(),
        id: ctx.store.get(key).id().to_string(),
        what,
        max,
    }
}

fn copy_caps(
    ctx: &mut BuildContext<'_>,
    key: ElementKey,
    reference: &Reference,
    source: ElementKey,
) -> BuildResult<()> {
    if reference.slot > 1 {
        return Err(ctx.unsupported(key, reference));
    }
    let Payload::StreamCaps(caps) = ctx.store.get(source).payload() else {
        return Err(ctx.unresolved(key, reference));
    };
    let caps = caps.clone();
    let slot = reference.slot;
    ctx.store.get_mut(key).update(|payload| {
        if let Payload::Pcm(pcm) = payload {
            pcm.caps[slot] = Some(caps);
        }
    });
    Ok(())
}

fn copy_stream(ctx: &mut BuildContext<'_>, key: ElementKey, source: ElementKey) -> BuildResult<()> {
    let Payload::StreamConfig(stream) = ctx.store.get(source).payload() else {
        return Ok(());
    };
    let stream = stream.clone();
    let count = match ctx.store.get(key).payload() {
        Payload::Pcm(pcm) => pcm.streams.len(),
        Payload::BackendLink(link) | Payload::CodecLink(link) => link.streams.len(),
        _ => 0,
    };
    if count >= STREAM_CONFIG_MAX {
        return Err(too_many(ctx, key, "stream configs", STREAM_CONFIG_MAX));
    }
    ctx.store.get_mut(key).update(|payload| match payload {
        Payload::Pcm(pcm) => pcm.streams.push(stream),
        Payload::BackendLink(link) | Payload::CodecLink(link) => link.streams.push(stream),
        _ => {}
    });
    Ok(())
}

fn link_mut(payload: &mut Payload) -> Option<&mut LinkConfig> {
    match payload {
        Payload::BackendLink(link) | Payload::CodecLink(link) => Some(link),
        _ => None,
    }
}

fn copy_hw_config(ctx: &mut BuildContext<'_>, key: ElementKey, source: ElementKey) -> BuildResult<()> {
    let Payload::HwConfig(hw) = ctx.store.get(source).payload() else {
        return Ok(());
    };
    let hw = hw.clone();
    let count = match ctx.store.get(key).payload() {
        Payload::BackendLink(link) | Payload::CodecLink(link) => link.hw_configs.len(),
        _ => 0,
    };
    if count >= HW_CONFIG_MAX {
        return Err(too_many(ctx, key, "hw configs", HW_CONFIG_MAX));
    }
    ctx.store.get_mut(key).update(|payload| {
        if let Some(link) = link_mut(payload) {
            link.hw_configs.push(hw);
        }
    });
    Ok(())
}
