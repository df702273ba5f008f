//! Hashing primitives: the hex digest type and hashing strategies.
//!
//! Digests are carried as lowercase hex text, and internal nodes hash the
//! *text* of their children's digests rather than the raw digest bytes.  Roots
//! computed here are only comparable with roots computed the same way.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use digest::Digest;
use sha2::Sha256;

use crate::error::MerkleError;

/// Lowercase hex rendering of a 32-byte digest.
///
/// Parsing accepts exactly [`DIGEST_HEX_LEN`] lowercase hex characters.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HexDigest(String);

impl HexDigest {
    /// Renders raw digest output as lowercase hex.
    pub fn from_digest_bytes(raw: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(raw))
    }

    /// Returns the hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the UTF-8 bytes of the hex text.  This is what gets fed to the
    /// hasher when combining two digests.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Decodes the hex text back into the raw digest bytes.
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        // Validated on construction, so this can't fail.
        hex::decode(&self.0).unwrap_or_default()
    }

    /// Consumes the digest, returning the hex text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Compares against some candidate hex text without short-circuiting on
    /// the first differing byte.
    pub fn eq_ct(&self, other: &str) -> bool {
        let a = self.0.as_bytes();
        let b = other.as_bytes();
        if a.len() != b.len() {
            return false;
        }

        let mut acc: u8 = 0;
        for (x, y) in a.iter().zip(b.iter()) {
            acc |= x ^ y;
        }

        acc == 0
    }
}

/// Length of a SHA-256 digest rendered as hex.
pub const DIGEST_HEX_LEN: usize = 64;

fn is_lower_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN
        && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl FromStr for HexDigest {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_lower_hex(s) {
            return Err(MerkleError::InvalidDigest(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for HexDigest {
    type Error = MerkleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if !is_lower_hex(&s) {
            return Err(MerkleError::InvalidDigest(s));
        }
        Ok(Self(s))
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for HexDigest {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for HexDigest {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Generic merkle hashing trait.
pub trait MerkleHasher {
    /// Hashes file content to compute a leaf digest.
    fn hash_leaf(buf: &[u8]) -> HexDigest;

    /// Hashes a node's left and right children to compute the node's digest.
    fn hash_node(left: &HexDigest, right: &HexDigest) -> HexDigest;
}

/// Merkle hasher for an arbitrary [`Digest`] impl.
///
/// Leaves are `H(content)`, nodes are `H(hex(left) || hex(right))`, with no
/// domain separation prefix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DigestHexHasher<D: Digest>(PhantomData<D>);

impl<D: Digest> MerkleHasher for DigestHexHasher<D> {
    fn hash_leaf(buf: &[u8]) -> HexDigest {
        HexDigest::from_digest_bytes(D::digest(buf))
    }

    fn hash_node(left: &HexDigest, right: &HexDigest) -> HexDigest {
        let mut context = D::new();
        context.update(left.as_bytes());
        context.update(right.as_bytes());
        HexDigest::from_digest_bytes(context.finalize())
    }
}

/// Merkle hasher over SHA-256.
pub type Sha256Hasher = DigestHexHasher<Sha256>;

/// SHA-256 of `buf` as lowercase hex.
pub fn sha256_hex(buf: &[u8]) -> HexDigest {
    Sha256Hasher::hash_leaf(buf)
}
