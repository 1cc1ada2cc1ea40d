//! Fragment data model.
//!
//! A fragment is one contributor's text toward one target profile. On disk it
//! is stored as a single file whose first line is a mode annotation:
//!
//! ```text
//! # Mode: <enforce|complain|disable>
//! <raw fragment content>
//! ```

mod mode;
mod name;
mod stored;

pub use mode::Mode;
pub use name::{ContributorName, TargetName};
pub use stored::{Fragment, MODE_PREFIX};

/// File extension of a staged fragment.
pub const FRAGMENT_EXTENSION: &str = "fragment";
