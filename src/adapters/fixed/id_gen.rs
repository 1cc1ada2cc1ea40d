//! ID generator that hands out a predetermined sequence.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::id_gen::IdGenerator;

/// Serves IDs from a fixed list, then falls back to a numbered series.
pub struct SequenceIdGenerator {
    queue: Mutex<VecDeque<String>>,
    issued: Mutex<u64>,
}

impl SequenceIdGenerator {
    /// Creates a generator that returns `ids` in order.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(ids.into_iter().map(Into::into).collect()),
            issued: Mutex::new(0),
        }
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn generate_id(&self) -> String {
        let mut issued = self.issued.lock().expect("id sequence lock poisoned");
        *issued += 1;
        let next = self.queue.lock().expect("id sequence lock poisoned").pop_front();
        next.unwrap_or_else(|| format!("{:012x}", *issued))
    }
}
