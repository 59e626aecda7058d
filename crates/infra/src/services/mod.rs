mod delivery;

pub use delivery::*;
