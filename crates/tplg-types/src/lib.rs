//! Foundation types for the topology compiler.
//!
//! Every other `tplg` crate depends on `tplg-types`. It holds the parts of
//! the ASoC topology ABI that are frozen by the kernel: block tags, record
//! layouts, and the symbolic names accepted in topology sources.
//!
//! # Key Types
//!
//! - [`ElementType`]: the seventeen kinds of element a project can hold
//! - [`BlockType`]: block tags, in write order
//! - [`WireRecord`]: fixed-layout little-endian records (`wire` module)
//! - [`TupleType`]: vendor tuple set types

pub mod abi;
pub mod error;
pub mod kind;
pub mod names;
pub mod wire;

pub use error::{TypeError, TypeResult};
pub use kind::{BlockType, ElementType};
pub use names::TupleType;
pub use wire::WireRecord;
