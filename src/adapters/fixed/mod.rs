//! Deterministic adapters for tests and reproducible runs.

pub mod clock;
pub mod id_gen;

pub use clock::FixedClock;
pub use id_gen::SequenceIdGenerator;
