use tplg_types::ElementType;
use tracing::warn;

use crate::error::BuildResult;
use crate::pass::{BuildContext, BuildPass, Diagnostic, PassStats};

/// Checks route endpoints against widgets and controls.
///
/// Routes are written by name whatever happens here; an endpoint that does
/// not resolve is reported as a warning only.
pub struct RoutePass;

impl BuildPass for RoutePass {
    fn name(&self) -> &str {
        "routes"
    }

    fn run(&self, ctx: &mut BuildContext<'_>) -> BuildResult<PassStats> {
        let mut stats = PassStats::default();
        let keys: Vec<_> = ctx.store.keys(ElementType::Graph).collect();
        for key in keys {
            stats.elements += 1;
            for (index, reference) in ctx.pending(key) {
                let found = match reference.kind {
                    // Route controls may be mixers or enums.
                    ElementType::Mixer | ElementType::Enum => ctx
                        .store
                        .lookup(ElementType::Mixer, &reference.target)
                        .or_else(|| ctx.store.lookup(ElementType::Enum, &reference.target)),
                    kind => ctx.store.lookup(kind, &reference.target),
                };
                match found {
                    Some(target) => {
                        ctx.mark_resolved(key, index, target);
                        stats.resolved += 1;
                    }
                    None => {
                        let id = ctx.store.get(key).id().to_string();
                        let message = format!(
                            "route {} '{}' not found",
                            if reference.kind == ElementType::Widget {
                                "endpoint"
                            } else {
                                "control"
                            },
                            reference.target
                        );
                        warn!(route = %id, target = %reference.target, "{message}");
                        ctx.diagnostics.push(Diagnostic {
                            pass: self.name().to_string(),
                            kind: ElementType::Graph,
                            id,
                            message,
                        });
                    }
                }
            }
        }
        Ok(stats)
    }
}
