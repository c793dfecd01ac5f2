//! Error types for the retirekit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (non-power-of-two retention size, out-of-range load factor).
//! - [`ContractViolation`]: Returned when a caller breaks the lifecycle
//!   contract (e.g. deactivating a key that is absent or already inactive).
//! - [`InvariantError`]: Returned by `check_invariants` helpers when the
//!   internal index arrays disagree with each other.
//!
//! Growing a full table is never an error: tables double transparently and
//! the retention window evicts its oldest member instead of refusing.
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::builder::{CacheBuilder, Strategy};
//! use retirekit::error::ConfigError;
//!
//! // Retention capacity must be a power of two
//! let bad: Result<_, ConfigError> = CacheBuilder::new(16)
//!     .retention(3)
//!     .try_build::<u32>(Strategy::Chaining);
//! assert!(bad.is_err());
//!
//! let mut cache = CacheBuilder::new(16)
//!     .retention(4)
//!     .try_build::<u32>(Strategy::RobinHood)
//!     .unwrap();
//!
//! // Deactivating an unknown key is reported, not absorbed
//! assert!(cache.deactivate("missing").is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`RetentionMap::try_new`](crate::map::RetentionMap::try_new) and
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use retirekit::ds::RetentionQueue;
///
/// let err = RetentionQueue::<u32>::try_new(6).unwrap_err();
/// assert!(err.to_string().contains("power of two"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// ContractViolation
// ---------------------------------------------------------------------------

/// Error returned when a caller breaks the active/inactive lifecycle contract.
///
/// Returned by `deactivate` for a key that is absent or already inactive.
/// The map is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation(String);

impl ContractViolation {
    /// Creates a new `ContractViolation` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ContractViolation {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal table invariants are violated.
///
/// Produced by `check_invariants` methods on the slot tables and on
/// [`RetentionMap`](crate::map::RetentionMap). Carries a human-readable
/// description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("retention capacity must be a power of two");
        assert_eq!(err.to_string(), "retention capacity must be a power of two");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("bad load factor");
        assert_eq!(err.message(), "bad load factor");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    // -- ContractViolation ------------------------------------------------

    #[test]
    fn contract_display_shows_message() {
        let err = ContractViolation::new("key is not present");
        assert_eq!(err.to_string(), "key is not present");
    }

    #[test]
    fn contract_debug_includes_message() {
        let err = ContractViolation::new("already inactive");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("already inactive"));
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("slot index mismatch");
        assert_eq!(err.to_string(), "slot index mismatch");
        assert_eq!(err.message(), "slot index mismatch");
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<ContractViolation>();
        assert_error::<InvariantError>();
    }
}
