//! Binary output for the topology compiler.
//!
//! [`TopologyWriter`] walks an element store once, in the kernel's block
//! order, and produces the image the ASoC topology loader consumes.
//! [`read_blocks`] walks an image back for inspection.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{WriteError, WriteResult};
pub use reader::read_blocks;
pub use writer::{BlockInfo, TopologyImage, TopologyWriter, WriterOptions};
