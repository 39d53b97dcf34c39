//! The 32-byte typed address (`ADRS`) that makes every keyed hash call
//! domain-unique by its position in the WOTS+ chain / Merkle tree.
//!
//! Physically this is eight big-endian `u32` words: layer, tree-address-high
//! (reserved, always zero — see the XMSS^MT open question in DESIGN.md),
//! tree-address-low, type, and three type-specific words, followed by
//! `keyAndMask`. `set_type` is the one operation that must zero the
//! type-specific words and `keyAndMask`: addresses from a prior variant must
//! never leak into a PRF input under a new type.

use crate::error::InvariantError;

/// Address variant discriminant (word 3 on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdrsType {
    /// WOTS+ chain hashing.
    Ots = 0,
    /// L-tree compression of a WOTS+ public key.
    LTree = 1,
    /// Merkle tree internal node hashing.
    HashTree = 2,
}

/// A 32-byte RFC 8391 `ADRS` structure.
///
/// Accessors for type-specific words fail with
/// [`InvariantError::WrongAdrsVariant`] if called while the address is set to
/// a different variant. This is a debugging aid, not a security property: a
/// re-implementation could drop the check and model `Adrs` as a sum type
/// instead, provided the wire bytes stay identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Adrs {
    words: [u32; 8],
}

impl Adrs {
    /// A fresh, all-zero address (type `OTS`, the RFC 8391 default).
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn layer_address(&self) -> u32 {
        self.words[0]
    }

    pub(crate) fn set_layer_address(&mut self, layer: u32) {
        self.words[0] = layer;
    }

    /// Tree address. RFC 8391 declares this a 64-bit field; this core only
    /// ever writes the low 32 bits and leaves the high word zero, which is
    /// sound for single-tree XMSS (see the open question in DESIGN.md about
    /// what honest 64-bit writes would need for XMSS^MT).
    pub(crate) fn set_tree_address(&mut self, tree: u32) {
        self.words[1] = 0;
        self.words[2] = tree;
    }

    pub(crate) fn tree_address(&self) -> u32 {
        self.words[2]
    }

    pub(crate) fn adrs_type(&self) -> u32 {
        self.words[3]
    }

    /// Sets the type word and zeros the type-specific words (4, 5, 6) and
    /// `keyAndMask` (7). Without this, addresses from a prior variant would
    /// leak into PRF inputs and break RFC 8391 bit-exactness.
    pub(crate) fn set_type(&mut self, t: AdrsType) {
        self.words[3] = t as u32;
        self.words[4] = 0;
        self.words[5] = 0;
        self.words[6] = 0;
        self.words[7] = 0;
    }

    fn require_type(&self, t: AdrsType, who: &'static str) -> Result<(), InvariantError> {
        if self.words[3] == t as u32 {
            Ok(())
        } else {
            Err(InvariantError::WrongAdrsVariant(who))
        }
    }

    pub(crate) fn set_ots_address(&mut self, ots: u32) -> Result<(), InvariantError> {
        self.require_type(AdrsType::Ots, "ots_address")?;
        self.words[4] = ots;
        Ok(())
    }

    pub(crate) fn set_chain_address(&mut self, chain: u32) -> Result<(), InvariantError> {
        self.require_type(AdrsType::Ots, "chain_address")?;
        self.words[5] = chain;
        Ok(())
    }

    pub(crate) fn set_hash_address(&mut self, hash: u32) -> Result<(), InvariantError> {
        self.require_type(AdrsType::Ots, "hash_address")?;
        self.words[6] = hash;
        Ok(())
    }

    pub(crate) fn set_ltree_address(&mut self, ltree: u32) -> Result<(), InvariantError> {
        self.require_type(AdrsType::LTree, "ltree_address")?;
        self.words[4] = ltree;
        Ok(())
    }

    /// Shared by the `LTree` and `HashTree` variants (word4 on the wire,
    /// physical `words[5]` — `HashTree`'s word3 padding slot, `words[4]`, is
    /// simply left zero).
    pub(crate) fn set_tree_height(&mut self, height: u32) -> Result<(), InvariantError> {
        match self.adrs_type() {
            x if x == AdrsType::LTree as u32 || x == AdrsType::HashTree as u32 => self.words[5] = height,
            _ => return Err(InvariantError::WrongAdrsVariant("tree_height")),
        }
        Ok(())
    }

    pub(crate) fn tree_height(&self) -> Result<u32, InvariantError> {
        match self.adrs_type() {
            x if x == AdrsType::LTree as u32 || x == AdrsType::HashTree as u32 => Ok(self.words[5]),
            _ => Err(InvariantError::WrongAdrsVariant("tree_height")),
        }
    }

    pub(crate) fn set_tree_index(&mut self, index: u32) -> Result<(), InvariantError> {
        match self.adrs_type() {
            x if x == AdrsType::LTree as u32 || x == AdrsType::HashTree as u32 => self.words[6] = index,
            _ => return Err(InvariantError::WrongAdrsVariant("tree_index")),
        }
        Ok(())
    }

    pub(crate) fn tree_index(&self) -> Result<u32, InvariantError> {
        match self.adrs_type() {
            x if x == AdrsType::LTree as u32 || x == AdrsType::HashTree as u32 => Ok(self.words[6]),
            _ => Err(InvariantError::WrongAdrsVariant("tree_index")),
        }
    }

    pub(crate) fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.words[7] = key_and_mask;
    }

    /// Copies the layer and tree words into a fresh address, leaving type
    /// and type-specific words zeroed. Used to fan a subtree's base address
    /// out into the three per-role addresses `tree_hash` needs.
    pub(crate) fn subtree_base(&self) -> Self {
        let mut out = Self::new();
        out.words[0] = self.words[0];
        out.words[1] = self.words[1];
        out.words[2] = self.words[2];
        out
    }

    /// Big-endian concatenation of the seven logical words (32 bytes).
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, word) in self.words.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}
