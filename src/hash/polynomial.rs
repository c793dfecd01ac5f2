use super::HashFunction;

/// Base-31 polynomial hash: `h = 31 * h + b` over the key bytes.
///
/// Bytes are taken as signed values and the accumulator wraps on overflow,
/// so ASCII keys hash exactly like the classic string hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Polynomial31;

impl HashFunction for Polynomial31 {
    #[inline]
    fn hash(&self, key: &[u8]) -> i32 {
        key.iter().fold(0i32, |h, &b| {
            h.wrapping_mul(31).wrapping_add(i32::from(b as i8))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_string_hash_for_ascii() {
        assert_eq!(Polynomial31.hash(b""), 0);
        assert_eq!(Polynomial31.hash(b"a"), 97);
        assert_eq!(Polynomial31.hash(b"abc"), 96354);
        assert_eq!(Polynomial31.hash(b"O1"), 79 * 31 + 49);
    }

    #[test]
    fn accumulator_wraps_instead_of_overflowing() {
        let long = [b'z'; 64];
        let expected = long
            .iter()
            .fold(0i64, |h, &b| (h * 31 + i64::from(b)) as i32 as i64);
        assert_eq!(i64::from(Polynomial31.hash(&long)), expected);
    }

    #[test]
    fn high_bytes_are_sign_extended() {
        assert_eq!(Polynomial31.hash(&[0x80]), -128);
        assert_eq!(Polynomial31.hash(&[0xff, 0x01]), -31 + 1);
    }
}
