//! Byte-sequence key with word-wise equality.
//!
//! `ByteKey` wraps an owned byte buffer (typically ASCII identifiers such as
//! order ids). Equality is the hot operation on every probe, so it compares
//! the bytes a machine word at a time instead of byte by byte.
//!
//! ## Architecture
//!
//! ```text
//!   key (len = 15)
//!   ┌───────────────────────────────┬───────────────┬───────┬───┐
//!   │ 8-byte word (u64)             │ 4-byte (u32)  │ 2 (u16)│ 1 │
//!   └───────────────────────────────┴───────────────┴───────┴───┘
//!     offset 0                        offset 8        12      14
//!
//!   bytes_eq(a, b):
//!     1. lengths differ        → false
//!     2. compare u64 words     while 8 bytes remain
//!     3. compare one u32       if 4 bytes remain
//!     4. compare one u16       if 2 bytes remain
//!     5. compare last byte     if 1 byte remains
//! ```
//!
//! ## Pooled keys
//!
//! [`ByteKey::copy_from`] overwrites a key in place and reuses its
//! allocation. Callers that recycle keys this way must not keep aliases to
//! the old contents across the overwrite; the borrow checker enforces this
//! for references, but copies of `as_bytes()` output taken earlier are not
//! updated.
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::ds::ByteKey;
//!
//! let a = ByteKey::from("order-000042");
//! let b = ByteKey::from(b"order-000042".as_slice());
//! assert_eq!(a, b);
//! assert_eq!(a.len(), 12);
//! assert_eq!(a.to_string(), "order-000042");
//!
//! let mut pooled = ByteKey::with_capacity(32);
//! pooled.copy_from(&a);
//! assert_eq!(pooled, a);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Compares two byte slices in 8/4/2/1-byte strides.
///
/// Returns `true` iff both slices have the same length and content.
#[inline]
pub fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len();
    if len != b.len() {
        return false;
    }

    let mut i = 0;
    while i + 8 <= len {
        if read_u64(a, i) != read_u64(b, i) {
            return false;
        }
        i += 8;
    }

    if i + 4 <= len {
        if read_u32(a, i) != read_u32(b, i) {
            return false;
        }
        i += 4;
    }

    if i + 2 <= len {
        if read_u16(a, i) != read_u16(b, i) {
            return false;
        }
        i += 2;
    }

    i == len || a[i] == b[i]
}

#[inline(always)]
fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[at..at + 8]);
    u64::from_ne_bytes(word)
}

#[inline(always)]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_ne_bytes(word)
}

#[inline(always)]
fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([bytes[at], bytes[at + 1]])
}

/// Owned byte-sequence key.
///
/// Immutable after construction apart from [`copy_from`](Self::copy_from),
/// which pooled callers use to recycle a key buffer.
#[derive(Clone, Default)]
pub struct ByteKey {
    bytes: Vec<u8>,
}

impl ByteKey {
    /// Creates an empty key with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Returns the key length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the key has no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Overwrites this key with the contents of `other`, reusing the
    /// existing allocation when it is large enough.
    pub fn copy_from(&mut self, other: &ByteKey) {
        self.bytes.clear();
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Renders the key as (lossy) UTF-8 for diagnostics.
    pub fn render(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl PartialEq for ByteKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        bytes_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for ByteKey {}

impl PartialEq<[u8]> for ByteKey {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        bytes_eq(&self.bytes, other)
    }
}

impl PartialEq<str> for ByteKey {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        bytes_eq(&self.bytes, other.as_bytes())
    }
}

// Must agree with `Borrow<[u8]>`: hash exactly like the byte slice does.
impl Hash for ByteKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.as_slice().hash(state);
    }
}

impl AsRef<[u8]> for ByteKey {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Borrow<[u8]> for ByteKey {
    #[inline]
    fn borrow(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for ByteKey {
    fn from(value: &str) -> Self {
        Self {
            bytes: value.as_bytes().to_vec(),
        }
    }
}

impl From<String> for ByteKey {
    fn from(value: String) -> Self {
        Self {
            bytes: value.into_bytes(),
        }
    }
}

impl From<&[u8]> for ByteKey {
    fn from(value: &[u8]) -> Self {
        Self {
            bytes: value.to_vec(),
        }
    }
}

impl From<Vec<u8>> for ByteKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&ByteKey> for ByteKey {
    fn from(value: &ByteKey) -> Self {
        value.clone()
    }
}

impl fmt::Display for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteKey").field(&self.render()).finish()
    }
}
