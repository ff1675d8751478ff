//! Trait definitions for external interactions
//!
//! These traits define the boundary between domain logic and
//! infrastructure. Implementations live in other crates.

/// String-keyed local key-value storage.
///
/// Used for credential-rotation cursors, daily usage counters, and
/// full-record persistence. There are no transactional guarantees;
/// callers for whom persistence is best-effort swallow write errors
/// and keep going.
pub trait KeyValueStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Read the value under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove the value under `key`, if any
    fn remove(&self, key: &str) -> Result<(), Self::Error>;

    /// Drop every stored key
    fn clear(&self) -> Result<(), Self::Error>;
}
