//! Element storage for the topology compiler.
//!
//! An [`ElementStore`] keeps one ordered collection per [`ElementType`].
//! Each [`Element`] pairs a typed record with a growable trailer; all
//! growth goes through [`Element::grow_and_append`] so that the recorded
//! size and the embedded private-data counters never drift from the bytes
//! actually held.

pub mod element;
pub mod error;
pub mod payload;
pub mod reference;
pub mod store;

pub use element::{Element, Growth};
pub use error::{StoreError, StoreResult};
pub use payload::{Payload, TextTable};
pub use reference::{ElementKey, Reference};
pub use store::ElementStore;
