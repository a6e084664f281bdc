use tplg_types::ElementType;
use tracing::debug;

use crate::error::{BuildError, BuildResult};
use crate::pass::{BuildContext, BuildPass, PassStats};

/// Copies the manifest's data references into its private area.
pub struct ManifestPass;

impl BuildPass for ManifestPass {
    fn name(&self) -> &str {
        "manifest"
    }

    fn run(&self, ctx: &mut BuildContext<'_>) -> BuildResult<PassStats> {
        let mut stats = PassStats::default();
        let Some(key) = ctx.store.manifest() else {
            return Ok(stats);
        };
        stats.elements = 1;

        let manifest = ctx.store.get(key);
        if !manifest.references().is_empty() && !manifest.private_data().is_empty() {
            return Err(BuildError::ManifestDataExists {
                id: manifest.id().to_string(),
            });
        }

        for (index, reference) in ctx.pending(key) {
            if reference.kind != ElementType::Data {
                return Err(ctx.unsupported(key, &reference));
            }
            let data = ctx.require(key, &reference)?;
            let len = ctx.merge_data(key, data)?;
            ctx.mark_resolved(key, index, data);
            stats.resolved += 1;
            debug!(data = %reference.target, len, "manifest data merged");
        }
        Ok(stats)
    }
}
