//! Pluggable hashing contract consumed by the slot tables.
//!
//! A [`HashFunction`] maps key bytes to a signed 32-bit hash. Tables never
//! mask that hash directly; they go through [`fold_to_index`], which folds
//! the sign away first. Implementations are stateless values chosen when a
//! map is built, so two maps can use different strategies side by side.
//!
//! ## Key Components
//!
//! - [`HashFunction`]: the strategy trait (also implemented for any
//!   `Fn(&[u8]) -> i32`)
//! - [`fold_to_index`]: hash → bucket index for a power-of-two table
//! - [`Polynomial31`]: base-31 polynomial accumulator (the default)
//! - [`MetroHash64`]: 64-bit wide mixing with rotate-xor finalization
//!
//! ## Folding rule
//!
//! ```text
//!   hash == i32::MIN  → 1
//!   hash <  0         → -hash
//!   index = hash & (modulus - 1)
//! ```
//!
//! The sign bit therefore influences the index, and `i32::MIN` lands in
//! bucket 1 together with every hash whose low bits fold to 1.
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::hash::{HashFunction, Polynomial31, fold_to_index};
//!
//! assert_eq!(Polynomial31.hash(b"abc"), 96354);
//! assert_eq!(fold_to_index(i32::MIN, 256), 1);
//! assert_eq!(fold_to_index(-5, 256), 5);
//!
//! // Any closure with the right shape is a hash function
//! let first_byte = |key: &[u8]| key.first().copied().unwrap_or(0) as i32;
//! assert_eq!(first_byte.index_for(b"\x21rest", 16), 1);
//! ```

mod metro;
mod polynomial;

pub use metro::MetroHash64;
pub use polynomial::Polynomial31;

/// Strategy mapping key bytes to a 32-bit hash.
pub trait HashFunction {
    /// Hashes `key` to a signed 32-bit value.
    fn hash(&self, key: &[u8]) -> i32;

    /// Hashes `key` and folds the result into `[0, modulus)`.
    ///
    /// `modulus` must be a power of two.
    #[inline]
    fn index_for(&self, key: &[u8], modulus: usize) -> usize {
        fold_to_index(self.hash(key), modulus)
    }
}

impl<F> HashFunction for F
where
    F: Fn(&[u8]) -> i32,
{
    #[inline]
    fn hash(&self, key: &[u8]) -> i32 {
        self(key)
    }
}

/// Folds a signed hash into a bucket index for a power-of-two `modulus`.
///
/// `i32::MIN` maps to 1 (it has no positive counterpart), other negative
/// hashes are negated, and the result is masked with `modulus - 1`.
/// Tables are never smaller than 16 slots, so the `i32::MIN` case always
/// stays in range.
#[inline]
pub fn fold_to_index(hash: i32, modulus: usize) -> usize {
    debug_assert!(modulus.is_power_of_two() && modulus >= 2);

    if hash == i32::MIN {
        return 1;
    }
    (hash.unsigned_abs() as usize) & (modulus - 1)
}
