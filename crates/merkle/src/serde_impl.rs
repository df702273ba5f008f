//! Serde serialization support for digests, ranges, and proofs.
//! Enable via `--features serde`.
//!
//! Everything is checked on the way in: digests must be lowercase hex and
//! ranges must not be inverted.

use serde::de::{self, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hasher::HexDigest;
use crate::proof::{MerkleProof, ProofNode, RawMerkleProof};
use crate::range::LeafRange;

// HexDigest

impl Serialize for HexDigest {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(self.as_str())
        } else {
            s.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for HexDigest {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct DigestVisitor;

        impl de::Visitor<'_> for DigestVisitor {
            type Value = HexDigest;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "a lowercase hex digest")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<HexDigest, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<HexDigest, E> {
                let s = std::str::from_utf8(v)
                    .map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))?;
                self.visit_str(s)
            }
        }

        if d.is_human_readable() {
            d.deserialize_str(DigestVisitor)
        } else {
            d.deserialize_bytes(DigestVisitor)
        }
    }
}

// LeafRange

impl Serialize for LeafRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.start, self.end).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LeafRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (start, end) = <(u64, u64)>::deserialize(deserializer)?;
        LeafRange::new(start, end).map_err(D::Error::custom)
    }
}

// ProofNode

impl Serialize for ProofNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.digest, self.range.start, self.range.end).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProofNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (digest, start, end) = <(HexDigest, u64, u64)>::deserialize(deserializer)?;
        let range = LeafRange::new(start, end).map_err(D::Error::custom)?;
        Ok(ProofNode::new(digest, range))
    }
}

// RawMerkleProof

impl Serialize for RawMerkleProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.steps.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawMerkleProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let steps = <Vec<ProofNode>>::deserialize(deserializer)?;
        Ok(Self { steps })
    }
}

// MerkleProof

impl Serialize for MerkleProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.inner, &self.index).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MerkleProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (inner, index) = <(RawMerkleProof, u64)>::deserialize(deserializer)?;
        Ok(Self { inner, index })
    }
}
