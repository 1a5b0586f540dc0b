pub mod cortisol;
pub mod dates;
pub mod stats;
