//! Runtime parameter records for WOTS+ and XMSS.
//!
//! The teacher this crate started from monomorphizes a parameter set per
//! `XmssParameter: ...` const-generic type. This core takes the opposite
//! approach deliberately: `n`, `w` and the hash primitive are all runtime
//! values on [`WotsParams`] / [`XmssParams`], so a caller can plug in any
//! [`HashPrimitive`] implementation without this crate shipping a type for
//! every combination up front.

use std::sync::Arc;

use crate::error::ArgumentError;
use crate::hash::HashPrimitive;

/// WOTS+ parameters: digest length, Winternitz parameter, and the hash
/// primitive every chain step is built from.
#[derive(Clone)]
pub struct WotsParams {
    n: usize,
    w: u32,
    log2_w: u32,
    len1: u32,
    len2: u32,
    len: u32,
    hash: Arc<dyn HashPrimitive>,
}

impl core::fmt::Debug for WotsParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WotsParams")
            .field("n", &self.n)
            .field("w", &self.w)
            .field("len1", &self.len1)
            .field("len2", &self.len2)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl WotsParams {
    /// Builds parameters with `w = 16`, the only Winternitz parameter this
    /// core validates end to end.
    ///
    /// Fails if `n` isn't a power of two, or if `hash.digest_length() != n`.
    pub fn new(n: usize, hash: Arc<dyn HashPrimitive>) -> Result<Self, ArgumentError> {
        Self::with_w(n, 16, hash)
    }

    /// Builds parameters with `w = 4`.
    ///
    /// RFC 8391 permits `w in {4, 16}`, but this implementation's test
    /// vectors and scenario coverage only exercise `w = 16`. The `w = 4`
    /// chain-length and checksum arithmetic is implemented and believed
    /// correct, but is unvalidated against known-answer vectors; callers who
    /// accept that must opt in explicitly through this constructor rather
    /// than through [`WotsParams::new`].
    pub fn new_w4_unvalidated(n: usize, hash: Arc<dyn HashPrimitive>) -> Result<Self, ArgumentError> {
        Self::with_w(n, 4, hash)
    }

    fn with_w(n: usize, w: u32, hash: Arc<dyn HashPrimitive>) -> Result<Self, ArgumentError> {
        if !crate::utils::is_power_of_two(n) {
            return Err(ArgumentError::DigestLengthNotPowerOfTwo(n));
        }
        let actual = hash.digest_length();
        if actual != n {
            return Err(ArgumentError::DigestLengthMismatch { expected: n, actual });
        }
        if w != 4 && w != 16 {
            return Err(ArgumentError::UnsupportedW(w));
        }
        let log2_w = w.trailing_zeros();
        #[allow(clippy::cast_possible_truncation)]
        let len1 = (8 * n as u32).div_ceil(log2_w);
        let len2_arg = len1 * (w - 1);
        let log2_len2_arg = 32 - len2_arg.leading_zeros() - 1;
        let len2 = log2_len2_arg / log2_w + 1;
        Ok(Self {
            n,
            w,
            log2_w,
            len1,
            len2,
            len: len1 + len2,
            hash,
        })
    }

    /// Digest length in bytes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Winternitz parameter (4 or 16).
    pub fn w(&self) -> u32 {
        self.w
    }

    /// `log2(w)`.
    pub(crate) fn log2_w(&self) -> u32 {
        self.log2_w
    }

    /// Number of base-`w` digits needed to encode an `n`-byte message.
    pub(crate) fn len1(&self) -> u32 {
        self.len1
    }

    /// Number of base-`w` digits needed to encode the checksum.
    pub(crate) fn len2(&self) -> u32 {
        self.len2
    }

    /// Total chain count, `len1 + len2`.
    pub(crate) fn len(&self) -> u32 {
        self.len
    }

    pub(crate) fn hash(&self) -> &dyn HashPrimitive {
        self.hash.as_ref()
    }

    pub(crate) fn hash_arc(&self) -> Arc<dyn HashPrimitive> {
        self.hash.clone()
    }
}

/// XMSS parameters: a [`WotsParams`] plus the Merkle tree height.
#[derive(Clone, Debug)]
pub struct XmssParams {
    wots: WotsParams,
    height: u32,
    oid: u32,
}

impl XmssParams {
    /// Builds XMSS parameters over the given WOTS+ parameters and tree
    /// height `h`, with `oid = 0` (unspecified). Fails if `h == 0`.
    pub fn new(wots: WotsParams, height: u32) -> Result<Self, ArgumentError> {
        if height == 0 {
            return Err(ArgumentError::ZeroTreeHeight);
        }
        Ok(Self { wots, height, oid: 0 })
    }

    /// Attaches a registry OID to these parameters (see [`standard_oid`] for
    /// the combinations this crate recognizes).
    pub fn with_oid(mut self, oid: u32) -> Self {
        self.oid = oid;
        self
    }

    /// The WOTS+ parameters backing every leaf key pair.
    pub fn wots(&self) -> &WotsParams {
        &self.wots
    }

    /// Merkle tree height. The tree has `2^height` leaves.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of leaves, `2^height`.
    pub fn num_leaves(&self) -> u64 {
        1u64 << self.height
    }

    /// The registry OID attached to these parameters (0 if unspecified).
    pub fn oid(&self) -> u32 {
        self.oid
    }

    pub(crate) fn hash(&self) -> &dyn HashPrimitive {
        self.wots.hash()
    }
}

/// The two hash families the OID registry (spec §6) assigns codes for.
/// Concrete hash primitives are opaque to this crate, so callers identify
/// which family they built their [`HashPrimitive`] from when they want an
/// interoperable OID rather than `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardHash {
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

/// Looks up the registry OID for `(hash, h)`. Returns `0` for combinations
/// the registry doesn't assign a code to (still permitted, just
/// non-interoperable).
pub fn standard_oid(hash: StandardHash, h: u32) -> u32 {
    match (hash, h) {
        (StandardHash::Sha256, 10) => 1,
        (StandardHash::Sha256, 16) => 2,
        (StandardHash::Sha256, 20) => 3,
        (StandardHash::Sha512, 10) => 4,
        (StandardHash::Sha512, 16) => 5,
        (StandardHash::Sha512, 20) => 6,
        _ => 0,
    }
}

/// An XMSS public key: `(oid, root, publicSeed)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmssPublicKey {
    pub(crate) oid: u32,
    pub(crate) root: Vec<u8>,
    pub(crate) public_seed: Vec<u8>,
}

impl XmssPublicKey {
    pub(crate) fn new(oid: u32, root: Vec<u8>, public_seed: Vec<u8>) -> Self {
        Self {
            oid,
            root,
            public_seed,
        }
    }

    /// Registry OID (0 if unspecified).
    pub fn oid(&self) -> u32 {
        self.oid
    }

    /// The Merkle tree root.
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// The public seed shared by every keyed hash in this tree.
    pub fn public_seed(&self) -> &[u8] {
        &self.public_seed
    }

    /// Wire-exact serialization: `oid(4) || root(n) || publicSeed(n)`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 2 * self.root.len());
        out.extend_from_slice(&self.oid.to_be_bytes());
        out.extend_from_slice(&self.root);
        out.extend_from_slice(&self.public_seed);
        out
    }

    /// Parses the wire format written by [`XmssPublicKey::serialize`].
    pub fn deserialize(params: &XmssParams, bytes: &[u8]) -> Result<Self, ArgumentError> {
        let n = params.wots().n();
        let expected = 4 + 2 * n;
        if bytes.len() != expected {
            return Err(ArgumentError::BufferLength {
                what: "xmss public key",
                expected,
                got: bytes.len(),
            });
        }
        let oid = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Ok(Self {
            oid,
            root: bytes[4..4 + n].to_vec(),
            public_seed: bytes[4 + n..4 + 2 * n].to_vec(),
        })
    }
}

/// An XMSS signature: `(idx, r, wotsSig, authPath)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmssSignature {
    pub(crate) idx: u32,
    pub(crate) r: Vec<u8>,
    pub(crate) wots_sig: Vec<u8>,
    pub(crate) auth_path: Vec<u8>,
}

impl XmssSignature {
    pub(crate) fn new(idx: u32, r: Vec<u8>, wots_sig: Vec<u8>, auth_path: Vec<u8>) -> Self {
        Self {
            idx,
            r,
            wots_sig,
            auth_path,
        }
    }

    /// The leaf index this signature was produced under.
    pub fn idx(&self) -> u32 {
        self.idx
    }

    /// The randomization string `r` used in the message hash.
    pub fn r(&self) -> &[u8] {
        &self.r
    }

    /// The embedded WOTS+ signature.
    pub fn wots_sig(&self) -> &[u8] {
        &self.wots_sig
    }

    /// The Merkle authentication path.
    pub fn auth_path(&self) -> &[u8] {
        &self.auth_path
    }

    /// Wire-exact serialization: `idx(4) || r(n) || wotsSig(len*n) || authPath(h*n)`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.r.len() + self.wots_sig.len() + self.auth_path.len());
        out.extend_from_slice(&self.idx.to_be_bytes());
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.wots_sig);
        out.extend_from_slice(&self.auth_path);
        out
    }

    /// Parses the wire format written by [`XmssSignature::serialize`].
    pub fn deserialize(params: &XmssParams, bytes: &[u8]) -> Result<Self, ArgumentError> {
        let n = params.wots().n();
        let wots_len = params.wots().len() as usize * n;
        let auth_len = params.height() as usize * n;
        let expected = 4 + n + wots_len + auth_len;
        if bytes.len() != expected {
            return Err(ArgumentError::BufferLength {
                what: "xmss signature",
                expected,
                got: bytes.len(),
            });
        }
        let idx = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let mut off = 4;
        let r = bytes[off..off + n].to_vec();
        off += n;
        let wots_sig = bytes[off..off + wots_len].to_vec();
        off += wots_len;
        let auth_path = bytes[off..off + auth_len].to_vec();
        Ok(Self {
            idx,
            r,
            wots_sig,
            auth_path,
        })
    }
}

/// An XMSS private key: `(nextIdx, compactPrivateSeeds, skPrf, root, publicSeed)`.
///
/// Zeroized on drop; [`core::fmt::Debug`] redacts every secret field.
pub struct XmssPrivateKey {
    pub(crate) next_idx: u32,
    pub(crate) compact_private_seeds: Vec<u8>,
    pub(crate) sk_prf: Vec<u8>,
    pub(crate) root: Vec<u8>,
    pub(crate) public_seed: Vec<u8>,
}

impl core::fmt::Debug for XmssPrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XmssPrivateKey")
            .field("next_idx", &self.next_idx)
            .field("compact_private_seeds", &"[redacted]")
            .field("sk_prf", &"[redacted]")
            .field("root", &"[redacted]")
            .field("public_seed", &"[redacted]")
            .finish()
    }
}

impl Drop for XmssPrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.compact_private_seeds.zeroize();
        self.sk_prf.zeroize();
        self.root.zeroize();
        self.public_seed.zeroize();
    }
}

impl Clone for XmssPrivateKey {
    fn clone(&self) -> Self {
        Self {
            next_idx: self.next_idx,
            compact_private_seeds: self.compact_private_seeds.clone(),
            sk_prf: self.sk_prf.clone(),
            root: self.root.clone(),
            public_seed: self.public_seed.clone(),
        }
    }
}

impl XmssPrivateKey {
    pub(crate) fn new(
        next_idx: u32,
        compact_private_seeds: Vec<u8>,
        sk_prf: Vec<u8>,
        root: Vec<u8>,
        public_seed: Vec<u8>,
    ) -> Self {
        Self {
            next_idx,
            compact_private_seeds,
            sk_prf,
            root,
            public_seed,
        }
    }

    /// The next unused leaf index. Equal to `2^h` once the key is exhausted.
    pub fn next_idx(&self) -> u32 {
        self.next_idx
    }

    /// `true` once every one-time signature has been used.
    pub fn is_exhausted(&self, params: &XmssParams) -> bool {
        u64::from(self.next_idx) >= params.num_leaves()
    }

    pub(crate) fn root(&self) -> &[u8] {
        &self.root
    }

    pub(crate) fn public_seed(&self) -> &[u8] {
        &self.public_seed
    }

    pub(crate) fn sk_prf(&self) -> &[u8] {
        &self.sk_prf
    }

    pub(crate) fn compact_private_seeds(&self) -> &[u8] {
        &self.compact_private_seeds
    }

    /// Returns a new private key with `nextIdx` advanced by one. The
    /// receiver is left unchanged; callers replace their stored key with the
    /// result rather than mutating in place.
    pub fn increment(&self, params: &XmssParams) -> Result<Self, ArgumentError> {
        let next = u64::from(self.next_idx) + 1;
        if next > params.num_leaves() {
            return Err(ArgumentError::IndexOutOfRange {
                idx: next,
                h: params.height(),
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            next_idx: next as u32,
            compact_private_seeds: self.compact_private_seeds.clone(),
            sk_prf: self.sk_prf.clone(),
            root: self.root.clone(),
            public_seed: self.public_seed.clone(),
        })
    }

    /// Wire-exact serialization: `nextIdx(4) || compactSeeds(2^h*n) || skPrf(n) || root(n) || publicSeed(n)`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            4 + self.compact_private_seeds.len() + self.sk_prf.len() + self.root.len() + self.public_seed.len(),
        );
        out.extend_from_slice(&self.next_idx.to_be_bytes());
        out.extend_from_slice(&self.compact_private_seeds);
        out.extend_from_slice(&self.sk_prf);
        out.extend_from_slice(&self.root);
        out.extend_from_slice(&self.public_seed);
        out
    }

    /// Parses the wire format written by [`XmssPrivateKey::serialize`].
    pub fn deserialize(params: &XmssParams, bytes: &[u8]) -> Result<Self, ArgumentError> {
        let n = params.wots().n();
        let seeds_len = params.num_leaves() as usize * n;
        let expected = 4 + seeds_len + 3 * n;
        if bytes.len() != expected {
            return Err(ArgumentError::BufferLength {
                what: "xmss private key",
                expected,
                got: bytes.len(),
            });
        }
        let next_idx = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if u64::from(next_idx) > params.num_leaves() {
            return Err(ArgumentError::IndexOutOfRange {
                idx: u64::from(next_idx),
                h: params.height(),
            });
        }
        let mut off = 4;
        let compact_private_seeds = bytes[off..off + seeds_len].to_vec();
        off += seeds_len;
        let sk_prf = bytes[off..off + n].to_vec();
        off += n;
        let root = bytes[off..off + n].to_vec();
        off += n;
        let public_seed = bytes[off..off + n].to_vec();
        Ok(Self {
            next_idx,
            compact_private_seeds,
            sk_prf,
            root,
            public_seed,
        })
    }
}

/// A dense cache of every node in an XMSS Merkle tree, enabling O(1)
/// authentication-path reads. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatTree {
    pub(crate) height: u32,
    pub(crate) n: usize,
    pub(crate) bytes: Vec<u8>,
}

impl FlatTree {
    pub(crate) fn new(height: u32, n: usize, bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), ((1usize << (height + 1)) - 1) * n);
        Self { height, n, bytes }
    }

    /// Tree height this cache was built for.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Digest length in bytes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The dense node buffer, per the layout in spec §4.5.
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The root node: the last `n` bytes of the buffer.
    pub fn root(&self) -> &[u8] {
        &self.bytes[self.bytes.len() - self.n..]
    }

    /// Wire-exact serialization: `h(4) || n(4) || flat tree bytes`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.bytes.len());
        out.extend_from_slice(&self.height.to_be_bytes());
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(self.n as u32).to_be_bytes());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Parses the wire format written by [`FlatTree::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ArgumentError> {
        if bytes.len() < 8 {
            return Err(ArgumentError::BufferLength {
                what: "flat tree header",
                expected: 8,
                got: bytes.len(),
            });
        }
        let height = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let n = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let expected = 8 + ((1usize << (height + 1)) - 1) * n;
        if bytes.len() != expected {
            return Err(ArgumentError::BufferLength {
                what: "flat tree",
                expected,
                got: bytes.len(),
            });
        }
        Ok(Self {
            height,
            n,
            bytes: bytes[8..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::concrete::Sha256Truncated;

    #[test]
    fn wots_len_matches_rfc8391_sha256_w16() {
        let hash = Arc::new(Sha256Truncated::new(32));
        let params = WotsParams::new(32, hash).unwrap();
        assert_eq!(params.len1(), 64);
        assert_eq!(params.len2(), 3);
        assert_eq!(params.len(), 67);
    }

    #[test]
    fn rejects_non_power_of_two_n() {
        let hash = Arc::new(Sha256Truncated::new(24));
        assert!(WotsParams::new(24, hash).is_err());
    }

    #[test]
    fn rejects_digest_length_mismatch() {
        let hash = Arc::new(Sha256Truncated::new(16));
        assert!(WotsParams::new(32, hash).is_err());
    }

    #[test]
    fn zero_height_rejected() {
        let hash = Arc::new(Sha256Truncated::new(32));
        let wots = WotsParams::new(32, hash).unwrap();
        assert!(XmssParams::new(wots, 0).is_err());
    }

    fn small_params() -> XmssParams {
        let hash = Arc::new(Sha256Truncated::new(32));
        let wots = WotsParams::new(32, hash).unwrap();
        XmssParams::new(wots, 2).unwrap()
    }

    #[test]
    fn public_key_round_trips() {
        let params = small_params();
        let pk = XmssPublicKey::new(7, vec![1u8; 32], vec![2u8; 32]);
        let bytes = pk.serialize();
        let decoded = XmssPublicKey::deserialize(&params, &bytes).unwrap();
        assert_eq!(pk, decoded);
    }

    #[test]
    fn private_key_round_trips_and_increments() {
        let params = small_params();
        let n = params.wots().n();
        let seeds = vec![3u8; params.num_leaves() as usize * n];
        let sk = XmssPrivateKey::new(0, seeds, vec![4u8; n], vec![5u8; n], vec![6u8; n]);
        let bytes = sk.serialize();
        let decoded = XmssPrivateKey::deserialize(&params, &bytes).unwrap();
        assert_eq!(decoded.next_idx(), 0);

        let advanced = decoded.increment(&params).unwrap();
        assert_eq!(advanced.next_idx(), 1);
        assert!(!advanced.is_exhausted(&params));
    }

    #[test]
    fn private_key_refuses_to_advance_past_exhaustion() {
        let params = small_params();
        let n = params.wots().n();
        let seeds = vec![0u8; params.num_leaves() as usize * n];
        let sk = XmssPrivateKey::new(
            params.num_leaves() as u32,
            seeds,
            vec![0u8; n],
            vec![0u8; n],
            vec![0u8; n],
        );
        assert!(sk.is_exhausted(&params));
        assert!(sk.increment(&params).is_err());
    }

    #[test]
    fn signature_round_trips() {
        let params = small_params();
        let n = params.wots().n();
        let sig = XmssSignature::new(
            1,
            vec![1u8; n],
            vec![2u8; params.wots().len() as usize * n],
            vec![3u8; params.height() as usize * n],
        );
        let bytes = sig.serialize();
        let decoded = XmssSignature::deserialize(&params, &bytes).unwrap();
        assert_eq!(sig, decoded);
    }

    #[test]
    fn flat_tree_round_trips() {
        let n = 32;
        let height = 2;
        let bytes = vec![9u8; ((1usize << (height + 1)) - 1) * n];
        let tree = FlatTree::new(height, n, bytes);
        let wire = tree.serialize();
        let decoded = FlatTree::deserialize(&wire).unwrap();
        assert_eq!(tree, decoded);
    }
}
