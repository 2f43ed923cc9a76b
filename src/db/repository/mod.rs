//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here.

mod adherence;
mod medicine;
mod profile;

pub use adherence::*;
pub use medicine::*;
pub use profile::*;
