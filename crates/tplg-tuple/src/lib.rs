//! Vendor tokens and tuples.
//!
//! Firmware-specific configuration travels in the private data area of
//! topology records as arrays of `(token, value)` pairs. Sources name tokens
//! symbolically; a [`TokenTable`] maps those names to integers and
//! [`serialize_table`] produces the vendor arrays.

pub mod error;
pub mod serialize;
pub mod token;
pub mod tuple;

pub use error::{TupleError, TupleResult};
pub use serialize::{serialize_set, serialize_table, set_size};
pub use token::TokenTable;
pub use tuple::{TupleSet, TupleTable, TupleValue};
