pub mod enums;
pub mod profile;
pub mod medicine;
pub mod adherence;

pub use enums::*;
pub use profile::*;
pub use medicine::*;
pub use adherence::*;
