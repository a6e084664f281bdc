use tplg_store::Payload;
use tplg_tuple::{serialize_table, TupleError};
use tplg_types::ElementType;
use tracing::debug;

use crate::error::{BuildError, BuildResult};
use crate::pass::{BuildContext, BuildPass, PassStats};

/// Inlines vendor tuple tables into the data elements that name them.
pub struct DataPass;

impl BuildPass for DataPass {
    fn name(&self) -> &str {
        "data"
    }

    fn run(&self, ctx: &mut BuildContext<'_>) -> BuildResult<PassStats> {
        let mut stats = PassStats::default();
        let keys: Vec<_> = ctx.store.keys(ElementType::Data).collect();
        for key in keys {
            stats.elements += 1;
            let id = ctx.store.get(key).id().to_string();
            let mut room = ctx
                .options
                .private_cap()
                .saturating_sub(ctx.store.get(key).private_data().len());

            // Serialize every pending table before touching the element.
            let mut chunks = Vec::new();
            for (index, reference) in ctx.pending(key) {
                if reference.kind != ElementType::Tuple {
                    return Err(ctx.unsupported(key, &reference));
                }
                let tuples_key = ctx.require(key, &reference)?;
                let Payload::Tuple(table) = ctx.store.get(tuples_key).payload() else {
                    return Err(ctx.unresolved(key, &reference));
                };

                let tokens = match ctx
                    .store
                    .lookup(ElementType::Token, &table.tokens)
                    .map(|k| ctx.store.get(k).payload())
                {
                    Some(Payload::Token(tokens)) => tokens,
                    _ => {
                        return Err(BuildError::UnresolvedReference {
                            kind: ElementType::Data,
                            id: id.clone(),
                            target_kind: ElementType::Token,
                            target: table.tokens.clone(),
                        })
                    }
                };

                let bytes = serialize_table(table, tokens, &reference.target, room).map_err(
                    |source| match source {
                        TupleError::TooLarge { size, max } => BuildError::MalformedPrivateData {
                            id: id.clone(),
                            reason: format!(
                                "tuples '{}' need {size} bytes, only {max} left under the cap",
                                reference.target
                            ),
                        },
                        source => BuildError::Tuple {
                            id: id.clone(),
                            source,
                        },
                    },
                )?;
                room -= bytes.len();
                chunks.push((index, reference, tuples_key, bytes));
            }

            // `slot` is the literal offset the tables were declared at;
            // earlier insertions shift later ones.
            let mut shift = 0;
            for (index, reference, tuples_key, bytes) in chunks {
                ctx.store
                    .get_mut(key)
                    .grow_and_insert(reference.slot + shift, &bytes)?;
                shift += bytes.len();
                ctx.mark_resolved(key, index, tuples_key);
                stats.resolved += 1;
                debug!(data = %id, tuples = %reference.target, len = bytes.len(), "tuples inlined");
            }
        }
        Ok(stats)
    }
}
