//! High-level SDK for the topology compiler.
//!
//! A [`Project`] collects elements, either through the template API
//! (`add_mixer`, `add_widget`, ...) or by loading ALSA configuration text
//! with [`Project::load_str`]. Both paths produce identical images.
//!
//! ```no_run
//! use tplg_sdk::{CompilerConfig, Project};
//!
//! let mut project = Project::new(CompilerConfig::default());
//! project.load_file("topology.conf".as_ref())?;
//! project.build()?;
//! project.write_file("topology.tplg".as_ref())?;
//! # Ok::<(), tplg_sdk::TplgError>(())
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod project;
pub mod template;

pub use config::CompilerConfig;
pub use error::{ErrorKind, TplgError, TplgResult};
pub use loader::SectionLoader;
pub use project::Project;
pub use template::{
    BytesTemplate, ChannelTemplate, DataSource, DataTemplate, EnumTemplate, LinkKind,
    LinkTemplate, MixerTemplate, PcmTemplate, RouteTemplate, StreamDirection, WidgetTemplate,
};

// Re-export key types
pub use tplg_build::{BuildReport, Diagnostic};
pub use tplg_store::{ElementKey, ElementStore};
pub use tplg_tuple::{TokenTable, TupleSet, TupleTable};
pub use tplg_types::wire::{DbScale, HwConfig, IoOps, Stream, StreamCaps};
pub use tplg_types::{BlockType, ElementType, TupleType};
pub use tplg_writer::{read_blocks, BlockInfo, TopologyImage};
