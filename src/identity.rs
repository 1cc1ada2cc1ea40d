//! Contributor identity resolution.
//!
//! Callers should always pass a stable role name: re-running `present` for
//! the same name is what makes staging idempotent. When no name is given a
//! synthetic one is minted from the clock plus random entropy, which means
//! every such run stages a new fragment.

use log::warn;

use crate::context::ServiceContext;
use crate::error::{StageError, StageResult};
use crate::fragment::ContributorName;

/// Prefix of synthesized contributor names.
pub const SYNTHETIC_PREFIX: &str = "role_";

/// Number of entropy characters appended to a synthesized name.
const ENTROPY_CHARS: usize = 12;

/// Resolves the contributor for a request.
///
/// An explicit name is validated and used as-is. A missing name is either
/// rejected (`require_explicit`) or replaced by [`derive_contributor`].
///
/// # Errors
///
/// Returns [`StageError::Configuration`] if the explicit name is invalid, or
/// if no name was given and `require_explicit` is set.
pub fn resolve_contributor(
    ctx: &ServiceContext,
    explicit: Option<&str>,
    require_explicit: bool,
) -> StageResult<ContributorName> {
    match explicit {
        Some(name) => ContributorName::new(name),
        None if require_explicit => Err(StageError::Configuration(
            "role_name is required when require_role_name is enabled".to_string(),
        )),
        None => {
            let derived = derive_contributor(ctx)?;
            warn!(
                "event=identity_fallback contributor={derived} reason=role_name_missing \
                 note=re-runs will not be recognized as the same contribution"
            );
            Ok(derived)
        }
    }
}

/// Synthesizes a contributor name: `role_<unix-seconds>_<entropy>`.
///
/// The timestamp alone collides for callers started within the same second,
/// so a random suffix from the ID generator is always appended.
///
/// # Errors
///
/// Returns [`StageError::Configuration`] if the ID generator yields nothing
/// usable as a path segment.
pub fn derive_contributor(ctx: &ServiceContext) -> StageResult<ContributorName> {
    let timestamp = ctx.clock.now().timestamp();
    let entropy: String = ctx
        .id_gen
        .generate_id()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(ENTROPY_CHARS)
        .collect::<String>()
        .to_ascii_lowercase();
    if entropy.is_empty() {
        return Err(StageError::Configuration(
            "could not derive a contributor identity: empty entropy".to_string(),
        ));
    }
    ContributorName::new(format!("{SYNTHETIC_PREFIX}{timestamp}_{entropy}"))
}
