//! Borsh serialization support for digests, ranges, and proofs.
//! Enable via `--features borsh`.
//!
//! A proof entry is laid out as the digest's hex text followed by the two
//! range bounds as `u64`.

use borsh::{BorshDeserialize, BorshSerialize, io};

use crate::hasher::HexDigest;
use crate::proof::{MerkleProof, ProofNode, RawMerkleProof};
use crate::range::LeafRange;

fn invalid_data(e: impl ToString) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

// HexDigest

impl BorshSerialize for HexDigest {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.as_str().serialize(writer)
    }
}

impl BorshDeserialize for HexDigest {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let s = String::deserialize_reader(reader)?;
        HexDigest::try_from(s).map_err(invalid_data)
    }
}

// LeafRange

impl BorshSerialize for LeafRange {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.start.serialize(writer)?;
        self.end.serialize(writer)
    }
}

impl BorshDeserialize for LeafRange {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let start = u64::deserialize_reader(reader)?;
        let end = u64::deserialize_reader(reader)?;
        LeafRange::new(start, end).map_err(invalid_data)
    }
}

// ProofNode

impl BorshSerialize for ProofNode {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.digest.serialize(writer)?;
        self.range.serialize(writer)
    }
}

impl BorshDeserialize for ProofNode {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let digest = HexDigest::deserialize_reader(reader)?;
        let range = LeafRange::deserialize_reader(reader)?;
        Ok(ProofNode::new(digest, range))
    }
}

// RawMerkleProof

impl BorshSerialize for RawMerkleProof {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.steps.serialize(writer)
    }
}

impl BorshDeserialize for RawMerkleProof {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let steps = <Vec<ProofNode>>::deserialize_reader(reader)?;
        Ok(Self { steps })
    }
}

// MerkleProof

impl BorshSerialize for MerkleProof {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.inner.serialize(writer)?;
        self.index.serialize(writer)
    }
}

impl BorshDeserialize for MerkleProof {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let inner = RawMerkleProof::deserialize_reader(reader)?;
        let index = u64::deserialize_reader(reader)?;
        Ok(Self { inner, index })
    }
}
