//! Service context bundling all port trait objects.

use chrono::{DateTime, Utc};

use crate::adapters::fixed::{FixedClock, SequenceIdGenerator};
use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one host boundary. Constructors wire up
/// different adapter implementations (live or deterministic).
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Box<dyn Clock>,
    /// Filesystem for staging I/O.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for synthetic contributor identities.
    pub id_gen: Box<dyn IdGenerator>,
}

impl ServiceContext {
    /// Creates a live context backed by the real clock, disk, and random IDs.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator::new()),
        }
    }

    /// Creates a context with real disk I/O but a frozen clock and a
    /// predetermined ID sequence, so derived identities are reproducible.
    #[must_use]
    pub fn deterministic<I, S>(at: DateTime<Utc>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clock: Box::new(FixedClock::new(at)),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(SequenceIdGenerator::new(ids)),
        }
    }

    /// Replaces the filesystem port, keeping the other ports.
    #[must_use]
    pub fn with_fs(mut self, fs: Box<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_context_replays_ids() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let ctx = ServiceContext::deterministic(at, ["abc"]);
        assert_eq!(ctx.clock.now(), at);
        assert_eq!(ctx.id_gen.generate_id(), "abc");
    }
}
