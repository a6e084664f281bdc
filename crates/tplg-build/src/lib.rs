//! Build passes for the topology compiler.
//!
//! Between loading and writing, a project's elements still refer to each
//! other by name. The [`Builder`] runs a fixed pipeline of passes that bind
//! those names and merge the bytes they stand for:
//!
//! 1. **data**: vendor tuples are serialized into data elements
//! 2. **manifest**: data is copied into the manifest
//! 3. **controls**: TLV, texts and data go into mixer/enum/bytes controls
//! 4. **widgets**: widget data is merged, then controls are absorbed
//! 5. **streams**: PCMs and links pick up caps, configs and hw configs
//! 6. **routes**: endpoints are checked; misses are warnings only
//!
//! Any unresolved reference outside the routes pass stops the build.

pub mod builder;
pub mod error;
pub mod options;
pub mod pass;
pub mod passes;

pub use builder::{BuildReport, Builder};
pub use error::{BuildError, BuildResult};
pub use options::BuildOptions;
pub use pass::{BuildContext, BuildPass, Diagnostic, PassResult, PassStats};
pub use passes::{ControlPass, DataPass, ManifestPass, RoutePass, StreamPass, WidgetPass};
