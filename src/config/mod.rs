// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod api;
pub mod logging;
pub mod refresh;
pub mod store;
pub mod types;

pub use api::*;
pub use logging::*;
pub use refresh::*;
pub use store::*;
pub use types::*;
