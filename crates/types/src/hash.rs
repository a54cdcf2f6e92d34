//! Cryptographic hashing functions for VeriDB.
//!
//! All hashing uses SHA-256. This module provides:
//! - Basic SHA-256 hashing
//! - Leaf hashing (canonical entry encoding, domain byte `0x00`)
//! - Node hashing (child concatenation, domain byte `0x01`)
//!
//! Leaf and node hashing are domain-separated so an internal node can never
//! be reinterpreted as a leaf (or vice versa) by a forged proof.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::types::Entry;

/// SHA-256 hash output (32 bytes).
pub type Hash = [u8; 32];

/// Domain prefix for leaf hashes.
const LEAF_PREFIX: u8 = 0x00;

/// Domain prefix for internal node hashes.
const NODE_PREFIX: u8 = 0x01;

/// Hash of empty input: SHA-256("").
/// Used as the root of an empty accumulator.
/// NOT zero bytes - the distinction matters for callers comparing roots.
pub const EMPTY_HASH: Hash = [
    0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f, 0xb9, 0x24,
    0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b, 0x78, 0x52, 0xb8, 0x55,
];

/// Compute SHA-256 hash of arbitrary data.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the leaf hash of a ledger entry.
///
/// Canonical binary encoding:
/// - domain prefix: 1 byte (`0x00`)
/// - index: 8 bytes (u64 BE)
/// - key length: 4 bytes (u32 LE), then key bytes
/// - value length: 4 bytes (u32 LE), then value bytes
/// - timestamp: 8 bytes (u64 BE)
///
/// Every field of the entry is covered, so flipping any bit of a stored
/// key, value, or timestamp invalidates inclusion proofs built over it.
pub fn leaf_hash(entry: &Entry) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(entry.index.to_be_bytes());
    hasher.update((entry.key.len() as u32).to_le_bytes());
    hasher.update(&entry.key);
    hasher.update((entry.value.len() as u32).to_le_bytes());
    hasher.update(&entry.value);
    hasher.update(entry.timestamp.to_be_bytes());
    hasher.finalize().into()
}

/// Compute the hash of an internal accumulator node from its children.
#[inline]
pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Constant-time hash comparison.
///
/// Use this for all verification decisions so comparison time does not leak
/// how many digest bytes matched.
#[inline]
pub fn hash_eq(a: &Hash, b: &Hash) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(index: u64, key: &[u8], value: &[u8], timestamp: u64) -> Entry {
        Entry { key: key.to_vec(), value: value.to_vec(), index, timestamp }
    }

    #[test]
    fn test_empty_hash_is_sha256_of_empty() {
        let computed = sha256(&[]);
        assert_eq!(computed, EMPTY_HASH);
        assert_ne!(EMPTY_HASH, [0u8; 32]);
    }

    #[test]
    fn test_sha256_basic() {
        // SHA-256("hello")
        let hash = sha256(b"hello");
        assert_eq!(
            hex(&hash),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_leaf_hash_deterministic() {
        let e = entry(3, b"key", b"value", 1_700_000_000_000);
        assert_eq!(leaf_hash(&e), leaf_hash(&e));
    }

    #[test]
    fn test_leaf_hash_covers_every_field() {
        let base = entry(0, b"k", b"v", 100);
        let variants = [
            entry(1, b"k", b"v", 100),
            entry(0, b"x", b"v", 100),
            entry(0, b"k", b"w", 100),
            entry(0, b"k", b"v", 101),
        ];
        for v in &variants {
            assert_ne!(leaf_hash(&base), leaf_hash(v), "field change must alter leaf hash");
        }
    }

    #[test]
    fn test_leaf_hash_length_prefix_prevents_splicing() {
        // ("ab", "c") and ("a", "bc") concatenate identically; the length
        // prefixes must keep their digests apart.
        let a = entry(0, b"ab", b"c", 0);
        let b = entry(0, b"a", b"bc", 0);
        assert_ne!(leaf_hash(&a), leaf_hash(&b));
    }

    #[test]
    fn test_leaf_and_node_domains_disjoint() {
        // A node hash over two equal halves must not collide with a leaf hash
        // over the concatenated bytes.
        let l = sha256(b"left");
        let r = sha256(b"right");
        let node = node_hash(&l, &r);

        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(&l);
        concat.extend_from_slice(&r);
        assert_ne!(node, sha256(&concat));
    }

    #[test]
    fn test_node_hash_order_sensitive() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        assert_ne!(node_hash(&a, &b), node_hash(&b, &a));
    }

    #[test]
    fn test_hash_eq_constant_time() {
        let a = sha256(b"test");
        let b = sha256(b"test");
        let c = sha256(b"other");

        assert!(hash_eq(&a, &b));
        assert!(!hash_eq(&a, &c));
    }

    /// Helper for hex encoding (dev dependency not needed for tests).
    fn hex(data: &[u8]) -> String {
        use std::fmt::Write;
        data.iter().fold(String::with_capacity(data.len() * 2), |mut acc, b| {
            let _ = write!(acc, "{:02x}", b);
            acc
        })
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn arbitrary_entry() -> impl Strategy<Value = Entry> {
            (any::<Vec<u8>>(), any::<Vec<u8>>(), any::<u64>(), any::<u64>()).prop_map(
                |(key, value, index, timestamp)| Entry { key, value, index, timestamp },
            )
        }

        proptest! {
            #[test]
            fn prop_leaf_hash_deterministic(entry in arbitrary_entry()) {
                prop_assert_eq!(leaf_hash(&entry), leaf_hash(&entry));
            }

            #[test]
            fn prop_distinct_entries_get_distinct_leaves(
                a in arbitrary_entry(),
                b in arbitrary_entry(),
            ) {
                prop_assume!(a != b);
                prop_assert_ne!(leaf_hash(&a), leaf_hash(&b));
            }

            #[test]
            fn prop_leaf_never_collides_with_node(
                entry in arbitrary_entry(),
                left in any::<[u8; 32]>(),
                right in any::<[u8; 32]>(),
            ) {
                prop_assert_ne!(leaf_hash(&entry), node_hash(&left, &right));
            }

            #[test]
            fn prop_hash_eq_agrees_with_equality(
                a in any::<[u8; 32]>(),
                b in any::<[u8; 32]>(),
            ) {
                prop_assert_eq!(hash_eq(&a, &b), a == b);
                prop_assert!(hash_eq(&a, &a));
            }
        }
    }
}
