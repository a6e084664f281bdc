use std::time::{Duration, Instant};

use tplg_store::ElementStore;
use tracing::debug;

use crate::error::BuildResult;
use crate::options::BuildOptions;
use crate::pass::{BuildContext, BuildPass, Diagnostic, PassResult};
use crate::passes::{ControlPass, DataPass, ManifestPass, RoutePass, StreamPass, WidgetPass};

// ---------------------------------------------------------------------------
// BuildReport
// ---------------------------------------------------------------------------

/// The outcome of running the full pipeline.
#[derive(Clone, Debug)]
pub struct BuildReport {
    /// Per-pass results in execution order.
    pub pass_results: Vec<PassResult>,
    /// Warnings raised by any pass.
    pub diagnostics: Vec<Diagnostic>,
    /// Total wall-clock time for the pipeline.
    pub elapsed: Duration,
}

impl BuildReport {
    /// Returns `true` if no pass raised a warning.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Total references resolved across all passes.
    pub fn resolved(&self) -> usize {
        self.pass_results.iter().map(|r| r.stats.resolved).sum()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// A fixed sequence of build passes.
pub struct Builder {
    passes: Vec<Box<dyn BuildPass>>,
    options: BuildOptions,
}

impl Builder {
    /// Create a builder with an empty pipeline.
    pub fn new(options: BuildOptions) -> Self {
        Self {
            passes: Vec::new(),
            options,
        }
    }

    /// Create a builder with the standard pipeline:
    /// Data -> Manifest -> Controls -> Widgets -> Streams -> Routes
    pub fn with_default_passes(options: BuildOptions) -> Self {
        let mut builder = Self::new(options);
        builder.add_pass(Box::new(DataPass));
        builder.add_pass(Box::new(ManifestPass));
        builder.add_pass(Box::new(ControlPass));
        builder.add_pass(Box::new(WidgetPass));
        builder.add_pass(Box::new(StreamPass));
        builder.add_pass(Box::new(RoutePass));
        builder
    }

    /// Append a pass to the end of the pipeline.
    pub fn add_pass(&mut self, pass: Box<dyn BuildPass>) {
        self.passes.push(pass);
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Number of passes in the pipeline.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Run every pass over `store`, stopping at the first error.
    pub fn run(&self, store: &mut ElementStore) -> BuildResult<BuildReport> {
        let start = Instant::now();
        let mut context = BuildContext::new(store, &self.options);

        for pass in &self.passes {
            let pass_start = Instant::now();
            debug!(pass = pass.name(), "pass started");
            let stats = pass.run(&mut context)?;
            let result = PassResult {
                pass_name: pass.name().to_string(),
                stats,
                elapsed: pass_start.elapsed(),
            };
            debug!(
                pass = pass.name(),
                elements = stats.elements,
                resolved = stats.resolved,
                "pass finished"
            );
            context.previous_passes.push(result);
        }

        Ok(BuildReport {
            pass_results: context.previous_passes,
            diagnostics: context.diagnostics,
            elapsed: start.elapsed(),
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::with_default_passes(BuildOptions::default())
    }
}
