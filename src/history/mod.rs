//! Damage History
//!
//! In-memory data model for a dashboard session:
//!
//! - **types**: `Sample` and the append-only `History`
//! - **registry**: `PlayerRegistry` mapping player ids to display names
//!
//! Nothing here is persisted. A `History` lives exactly as long as the
//! session that owns it.

pub mod registry;
pub mod types;

pub use registry::PlayerRegistry;
pub use types::{History, Sample};
