//! Live adapters for real host interactions.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
