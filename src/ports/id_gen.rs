//! ID generator port for producing unique identifiers.

/// Generates unique identifiers.
///
/// Used as the entropy source for synthetic contributor identities.
/// Tests substitute a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
