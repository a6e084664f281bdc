use tplg_store::{ElementKey, Payload, Reference};
use tplg_types::abi::{access, NUM_TEXTS};
use tplg_types::ElementType;
use tracing::debug;

use crate::error::{BuildError, BuildResult};
use crate::pass::{BuildContext, BuildPass, PassStats};

/// Resolves TLV, text and data references of mixer, enum and bytes controls.
pub struct ControlPass;

impl BuildPass for ControlPass {
    fn name(&self) -> &str {
        "controls"
    }

    fn run(&self, ctx: &mut BuildContext<'_>) -> BuildResult<PassStats> {
        let mut stats = PassStats::default();
        for kind in [ElementType::Mixer, ElementType::Enum, ElementType::Bytes] {
            let keys: Vec<_> = ctx.store.keys(kind).collect();
            for key in keys {
                stats.elements += 1;
                for (index, reference) in ctx.pending(key) {
                    let target = ctx.require(key, &reference)?;
                    match reference.kind {
                        ElementType::Tlv => copy_tlv(ctx, key, target),
                        ElementType::Text if kind == ElementType::Enum => {
                            copy_texts(ctx, key, target)?
                        }
                        ElementType::Data => {
                            ctx.merge_data(key, target)?;
                        }
                        _ => return Err(ctx.unsupported(key, &reference)),
                    }
                    ctx.mark_resolved(key, index, target);
                    stats.resolved += 1;
                    log_resolved(ctx, key, &reference);
                }
            }
        }
        Ok(stats)
    }
}

fn log_resolved(ctx: &BuildContext<'_>, key: ElementKey, reference: &Reference) {
    debug!(
        kind = %key.kind(),
        id = ctx.store.get(key).id(),
        target_kind = %reference.kind,
        target = %reference.target,
        "control reference resolved"
    );
}

fn copy_tlv(ctx: &mut BuildContext<'_>, key: ElementKey, source: ElementKey) {
    let Payload::Tlv(tlv) = *ctx.store.get(source).payload() else {
        return;
    };
    ctx.store.get_mut(key).update(|payload| {
        let hdr = match payload {
            Payload::Mixer(m) => &mut m.hdr,
            Payload::Enum(e) => &mut e.hdr,
            Payload::Bytes(b) => &mut b.hdr,
            _ => return,
        };
        hdr.tlv = tlv;
        hdr.access |= access::TLV_READ;
    });
}

fn copy_texts(ctx: &mut BuildContext<'_>, key: ElementKey, text: ElementKey) -> BuildResult<()> {
    let Payload::Text(table) = ctx.store.get(text).payload() else {
        return Ok(());
    };
    if table.values.len() > NUM_TEXTS {
        return Err(BuildError::TooMany {
            kind: ElementType::Enum,
            id: ctx.store.get(key).id().to_string(),
            what: "enum texts",
            max: NUM_TEXTS,
        });
    }
    let values = table.values.clone();
    ctx.store.get_mut(key).update(|payload| {
        if let Payload::Enum(control) = payload {
            let items = values.len() as u32;
            control.items = items;
            control.count = items;
            control.mask = items.next_power_of_two() - 1;
            control.texts = values;
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BuildOptions;
    use tplg_store::{ElementStore, Growth, TextTable};
    use tplg_types::wire::{CtlTlv, DbScale};

    fn run(store: &mut ElementStore) -> BuildResult<PassStats> {
        let options = BuildOptions::default();
        let mut ctx = BuildContext::new(store, &options);
        ControlPass.run(&mut ctx)
    }

    #[test]
    fn tlv_copied_into_header() {
        let mut store = ElementStore::new();
        let tlv = store.create(ElementType::Tlv, "vol_tlv").unwrap();
        store.get_mut(tlv).update(|p| {
            *p = Payload::Tlv(CtlTlv::db_scale(DbScale {
                min: -9000,
                step: 300,
                mute: 1,
            }))
        });
        let mixer = store.create(ElementType::Mixer, "Volume").unwrap();
        store.get_mut(mixer).add_reference(ElementType::Tlv, "vol_tlv");

        let stats = run(&mut store).unwrap();
        assert_eq!(stats.resolved, 1);
        let Payload::Mixer(m) = store.get(mixer).payload() else {
            panic!("expected mixer");
        };
        assert_eq!(m.hdr.tlv.scale.min, -9000);
        assert_ne!(m.hdr.access & access::TLV_READ, 0);
        assert!(store.get(mixer).references()[0].is_resolved());
    }

    #[test]
    fn texts_fill_enum() {
        let mut store = ElementStore::new();
        let text = store.create(ElementType::Text, "modes").unwrap();
        store.get_mut(text).update(|p| {
            *p = Payload::Text(TextTable {
                values: vec!["off".into(), "low".into(), "high".into()],
            })
        });
        let control = store.create(ElementType::Enum, "Mode").unwrap();
        store.get_mut(control).add_reference(ElementType::Text, "modes");

        run(&mut store).unwrap();
        let Payload::Enum(e) = store.get(control).payload() else {
            panic!("expected enum");
        };
        assert_eq!(e.items, 3);
        assert_eq!(e.mask, 3);
        assert_eq!(e.texts[2], "high");
    }

    #[test]
    fn data_appended_to_control() {
        let mut store = ElementStore::new();
        let data = store.create(ElementType::Data, "coeffs").unwrap();
        store
            .get_mut(data)
            .grow_and_append(&[1, 2, 3, 4], Growth::PrivateData)
            .unwrap();
        let bytes = store.create(ElementType::Bytes, "EQ").unwrap();
        store.get_mut(bytes).add_reference(ElementType::Data, "coeffs");

        run(&mut store).unwrap();
        let element = store.get(bytes);
        assert_eq!(element.private_data(), &[1, 2, 3, 4]);
        assert_eq!(element.payload().priv_size(), Some(4));
        assert!(element.is_consistent());

        // A second run finds nothing left to resolve.
        let size = element.size();
        assert_eq!(run(&mut store).unwrap().resolved, 0);
        assert_eq!(store.get(bytes).size(), size);
    }

    #[test]
    fn missing_tlv_names_both_ids() {
        let mut store = ElementStore::new();
        let mixer = store.create(ElementType::Mixer, "Volume").unwrap();
        store.get_mut(mixer).add_reference(ElementType::Tlv, "nope");
        let err = run(&mut store).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedReference {
                kind: ElementType::Mixer,
                id: "Volume".into(),
                target_kind: ElementType::Tlv,
                target: "nope".into(),
            }
        );
    }

    #[test]
    fn text_on_mixer_unsupported() {
        let mut store = ElementStore::new();
        store.create(ElementType::Text, "t").unwrap();
        let mixer = store.create(ElementType::Mixer, "m").unwrap();
        store.get_mut(mixer).add_reference(ElementType::Text, "t");
        assert!(matches!(
            run(&mut store),
            Err(BuildError::UnsupportedReference { .. })
        ));
    }
}
