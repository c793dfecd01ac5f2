use super::HashFunction;

const K0: u64 = 0xD6D0_18F5;
const K1: u64 = 0xA2AA_033B;
const K2: u64 = 0x6299_2FC1;
const K3: u64 = 0x30BC_5B29;

/// MetroHash-style 64-bit mixing hash, folded to 32 bits.
///
/// Consumes the key in 32-byte stripes across four lanes, then 16/8/4/2/1
/// byte tails, and finishes with a rotate-xor-multiply avalanche. More work
/// per byte than [`Polynomial31`](super::Polynomial31) but far better bit
/// dispersion for keys that share long prefixes.
///
/// Words are read little-endian; the 4, 2 and 1 byte tails are
/// sign-extended before mixing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetroHash64;

impl HashFunction for MetroHash64 {
    fn hash(&self, key: &[u8]) -> i32 {
        let mut off = 0;
        let mut remaining = key.len();
        let mut h = K2.wrapping_mul(K0);

        if remaining >= 32 {
            let (mut v0, mut v1, mut v2, mut v3) = (h, h, h, h);

            while remaining >= 32 {
                v0 = v0.wrapping_add(le_u64(key, off).wrapping_mul(K0));
                v0 = v0.rotate_right(29).wrapping_add(v2);
                v1 = v1.wrapping_add(le_u64(key, off + 8).wrapping_mul(K1));
                v1 = v1.rotate_right(29).wrapping_add(v3);
                v2 = v2.wrapping_add(le_u64(key, off + 16).wrapping_mul(K2));
                v2 = v2.rotate_right(29).wrapping_add(v0);
                v3 = v3.wrapping_add(le_u64(key, off + 24).wrapping_mul(K3));
                v3 = v3.rotate_right(29).wrapping_add(v1);

                off += 32;
                remaining -= 32;
            }

            v2 ^= mix(v0.wrapping_add(v3), K0, v1, 37).wrapping_mul(K1);
            v3 ^= mix(v1.wrapping_add(v2), K1, v0, 37).wrapping_mul(K0);
            v0 ^= mix(v0.wrapping_add(v2), K0, v3, 37).wrapping_mul(K1);
            v1 ^= mix(v1.wrapping_add(v3), K1, v2, 37).wrapping_mul(K0);

            h = h.wrapping_add(v0 ^ v1);
        }

        if remaining >= 16 {
            let mut v0 = h.wrapping_add(le_u64(key, off).wrapping_mul(K2));
            v0 = v0.rotate_right(29).wrapping_mul(K3);
            let mut v1 = h.wrapping_add(le_u64(key, off + 8).wrapping_mul(K2));
            v1 = v1.rotate_right(29).wrapping_mul(K3);
            v0 ^= v0.wrapping_mul(K0).rotate_right(21).wrapping_add(v1);
            v1 ^= v1.wrapping_mul(K3).rotate_right(21).wrapping_add(v0);
            h = h.wrapping_add(v1);

            off += 16;
            remaining -= 16;
        }

        if remaining >= 8 {
            h = h.wrapping_add(le_u64(key, off).wrapping_mul(K3));
            h ^= h.rotate_right(55).wrapping_mul(K1);

            off += 8;
            remaining -= 8;
        }

        if remaining >= 4 {
            let word = i32::from_le_bytes([key[off], key[off + 1], key[off + 2], key[off + 3]]);
            h = h.wrapping_add((word as i64 as u64).wrapping_mul(K3));
            h ^= h.rotate_right(26).wrapping_mul(K1);

            off += 4;
            remaining -= 4;
        }

        if remaining >= 2 {
            let half = i16::from_le_bytes([key[off], key[off + 1]]);
            h = h.wrapping_add((half as i64 as u64).wrapping_mul(K3));
            h ^= h.rotate_right(48).wrapping_mul(K1);

            off += 2;
            remaining -= 2;
        }

        if remaining >= 1 {
            let byte = key[off] as i8;
            h = h.wrapping_add((byte as i64 as u64).wrapping_mul(K3));
            h ^= h.rotate_right(37).wrapping_mul(K1);
        }

        let h = finalize(h);
        (h ^ (h >> 32)) as i32
    }
}

/// `rotr((a * k) + b, r)`
#[inline(always)]
fn mix(a: u64, k: u64, b: u64, r: u32) -> u64 {
    a.wrapping_mul(k).wrapping_add(b).rotate_right(r)
}

#[inline(always)]
fn finalize(mut h: u64) -> u64 {
    h ^= h.rotate_right(28);
    h = h.wrapping_mul(K0);
    h ^= h.rotate_right(29);
    h
}

#[inline(always)]
fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(word)
}
