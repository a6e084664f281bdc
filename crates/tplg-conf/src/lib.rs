//! Configuration tree reader for topology sources.
//!
//! Topology sources use the ALSA configuration syntax. This crate turns that
//! text into a tree of [`ConfNode`]s; consumers read it through the
//! [`ConfigNode`] trait (`id`, `is_compound`, `string_value`, `children`)
//! and never see the syntax.

pub mod error;
pub mod node;
pub mod parser;

pub use error::{ConfError, ConfResult};
pub use node::{ConfNode, ConfValue, ConfigNode};
pub use parser::parse_str;
