//! Core data models for the match ledger.

mod ids;
mod placement;
mod seat;
mod stats;

pub use ids::*;
pub use placement::*;
pub use seat::*;
pub use stats::*;
