//! The built-in passes, in pipeline order.

pub mod controls;
pub mod data;
pub mod manifest;
pub mod routes;
pub mod streams;
pub mod widgets;

pub use controls::ControlPass;
pub use data::DataPass;
pub use manifest::ManifestPass;
pub use routes::RoutePass;
pub use streams::StreamPass;
pub use widgets::WidgetPass;
