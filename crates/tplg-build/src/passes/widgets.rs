use tplg_store::Growth;
use tplg_types::ElementType;
use tracing::debug;

use crate::error::BuildResult;
use crate::pass::{BuildContext, BuildPass, PassStats};

/// Merges widget private data, then absorbs the widget's controls.
///
/// Data references are handled first so the private area directly follows
/// the widget record; every named control is then appended whole and
/// flagged compound so it is not written again in its own block.
pub struct WidgetPass;

impl BuildPass for WidgetPass {
    fn name(&self) -> &str {
        "widgets"
    }

    fn run(&self, ctx: &mut BuildContext<'_>) -> BuildResult<PassStats> {
        let mut stats = PassStats::default();
        let keys: Vec<_> = ctx.store.keys(ElementType::Widget).collect();
        for key in keys {
            stats.elements += 1;
            let pending = ctx.pending(key);
            if let Some((_, bad)) = pending
                .iter()
                .find(|(_, r)| !(r.kind == ElementType::Data || r.kind.is_control()))
            {
                return Err(ctx.unsupported(key, bad));
            }

            let (data, controls): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|(_, r)| r.kind == ElementType::Data);

            for (index, reference) in data {
                let target = ctx.require(key, &reference)?;
                let len = ctx.merge_data(key, target)?;
                ctx.mark_resolved(key, index, target);
                stats.resolved += 1;
                debug!(widget = ctx.store.get(key).id(), data = %reference.target, len, "widget data merged");
            }

            for (index, reference) in controls {
                let target = ctx.require(key, &reference)?;
                let bytes = ctx.store.get(target).to_bytes();
                ctx.store
                    .get_mut(key)
                    .grow_and_append(&bytes, Growth::Control)?;
                ctx.store.get_mut(target).mark_compound();
                ctx.mark_resolved(key, index, target);
                stats.resolved += 1;
                debug!(
                    widget = ctx.store.get(key).id(),
                    kind = %reference.kind,
                    control = %reference.target,
                    len = bytes.len(),
                    "control absorbed"
                );
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::options::BuildOptions;
    use tplg_store::ElementStore;
    use tplg_types::wire::{DapmWidget, MixerControl, WireRecord};

    fn run(store: &mut ElementStore) -> BuildResult<PassStats> {
        let options = BuildOptions::default();
        let mut ctx = BuildContext::new(store, &options);
        WidgetPass.run(&mut ctx)
    }

    #[test]
    fn controls_absorbed_after_data() {
        let mut store = ElementStore::new();
        let data = store.create(ElementType::Data, "cfg").unwrap();
        store
            .get_mut(data)
            .grow_and_append(&[7; 12], Growth::PrivateData)
            .unwrap();
        let mixer = store.create(ElementType::Mixer, "Gain").unwrap();
        let widget = store.create(ElementType::Widget, "PGA1").unwrap();
        // Declared control-first; data still lands first.
        store.get_mut(widget).add_reference(ElementType::Mixer, "Gain");
        store.get_mut(widget).add_reference(ElementType::Data, "cfg");

        let stats = run(&mut store).unwrap();
        assert_eq!(stats.resolved, 2);

        let w = store.get(widget);
        assert_eq!(w.payload().num_kcontrols(), Some(1));
        assert_eq!(w.payload().priv_size(), Some(12));
        assert_eq!(
            w.size() as usize,
            DapmWidget::WIRE_SIZE + 12 + MixerControl::WIRE_SIZE
        );
        assert_eq!(&w.trailer()[..12], &[7; 12]);
        assert!(w.is_consistent());
        assert!(store.get(mixer).is_compound());
    }

    #[test]
    fn missing_mixer_is_fatal() {
        let mut store = ElementStore::new();
        let widget = store.create(ElementType::Widget, "PGA1").unwrap();
        store.get_mut(widget).add_reference(ElementType::Mixer, "Missing Gain");
        let err = run(&mut store).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PGA1"));
        assert!(message.contains("Missing Gain"));
        assert!(matches!(err, BuildError::UnresolvedReference { .. }));
    }

    #[test]
    fn rerun_does_not_grow() {
        let mut store = ElementStore::new();
        store.create(ElementType::Enum, "Mode").unwrap();
        let widget = store.create(ElementType::Widget, "Mux").unwrap();
        store.get_mut(widget).add_reference(ElementType::Enum, "Mode");

        run(&mut store).unwrap();
        let size = store.get(widget).size();
        let again = run(&mut store).unwrap();
        assert_eq!(again.resolved, 0);
        assert_eq!(store.get(widget).size(), size);
    }
}
