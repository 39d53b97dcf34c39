//! The public signing/verifying surface: [`KeyPair`], [`SigningKey`],
//! [`VerifyingKey`], [`Signature`] and [`DetachedSignature`], plus the
//! `signature` crate trait impls callers expect from a Rust signature type.

use zeroize::Zeroize;

use crate::adrs::{Adrs, AdrsType};
use crate::error::{ArgumentError, Error, XmssResult};
use crate::hash::prf;
use crate::types::{FlatTree, XmssParams, XmssPrivateKey, XmssPublicKey, XmssSignature};
use crate::xmss_core;

/// Expands a 1-`n`-byte master seed into one compact per-leaf seed per
/// `PRF(sk_seed, ADRS)` with `ADRS.otsAddress` set to the leaf index. This is
/// a separate derivation from [`crate::wots::inflate_private_key`] (which
/// expands a single leaf's compact seed into its `len` chain seeds via the
/// RFC's domain-4 `PRF_keygen`, keyed on the leaf seed with the public seed
/// bound into the message); this one only has to produce a stable
/// "compact private key" table from a single master secret, which RFC 8391
/// does not specify a derivation for.
fn derive_compact_seeds(params: &XmssParams, sk_seed: &[u8]) -> XmssResult<Vec<u8>> {
    let n = params.wots().n();
    let mut out = vec![0u8; params.num_leaves() as usize * n];
    let mut adrs = Adrs::new();
    adrs.set_type(AdrsType::Ots);
    for i in 0..params.num_leaves() {
        #[allow(clippy::cast_possible_truncation)]
        let leaf = i as u32;
        adrs.set_ots_address(leaf)?;
        prf(params.hash(), sk_seed, adrs, &mut out[i as usize * n..(i as usize + 1) * n])?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// SigningKey
// ---------------------------------------------------------------------------

/// An XMSS signing key. Carries the private key state plus a cached
/// [`FlatTree`] so every `sign` call reads its authentication path in O(1)
/// instead of recomputing the tree.
#[derive(Clone)]
pub struct SigningKey {
    private_key: XmssPrivateKey,
    tree: FlatTree,
    params: XmssParams,
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey")
            .field("oid", &self.params.oid())
            .field("height", &self.params.height())
            .field("next_idx", &self.private_key.next_idx())
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    pub(crate) fn new(private_key: XmssPrivateKey, tree: FlatTree, params: XmssParams) -> Self {
        Self {
            private_key,
            tree,
            params,
        }
    }

    /// Signs `msg`, returning the signature with the message appended, and
    /// advances the key's internal leaf index. Fails once every one-time
    /// signature has been used.
    pub fn sign(&mut self, msg: &[u8]) -> XmssResult<Signature> {
        let (sig, advanced) = xmss_core::sign(&self.params, &self.private_key, msg, Some(&self.tree))?;
        self.private_key = advanced;
        let mut bytes = sig.serialize();
        bytes.extend_from_slice(msg);
        Ok(Signature { bytes })
    }

    /// Signs `msg`, returning only the fixed-size detached signature.
    pub fn sign_detached(&mut self, msg: &[u8]) -> XmssResult<DetachedSignature> {
        let (sig, advanced) = xmss_core::sign(&self.params, &self.private_key, msg, Some(&self.tree))?;
        self.private_key = advanced;
        Ok(DetachedSignature { bytes: sig.serialize() })
    }

    /// `true` once every one-time signature has been used; further `sign`
    /// calls will fail.
    pub fn is_exhausted(&self) -> bool {
        self.private_key.is_exhausted(&self.params)
    }

    /// The parameters this key was generated under.
    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// Serializes the private key state and its cached tree, concatenated:
    /// `serialize(private_key) || serialize(tree)`. [`crate::pkcs8`] uses this
    /// as the PKCS#8 `privateKey` field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.private_key.serialize();
        out.extend_from_slice(&self.tree.serialize());
        out
    }

    /// Inverse of [`SigningKey::to_bytes`].
    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> XmssResult<Self> {
        let n = params.wots().n();
        let sk_len = 4 + params.num_leaves() as usize * n + 3 * n;
        if bytes.len() < sk_len {
            return Err(ArgumentError::BufferLength {
                what: "xmss private key + tree",
                expected: sk_len,
                got: bytes.len(),
            }
            .into());
        }
        let private_key = XmssPrivateKey::deserialize(params, &bytes[..sk_len])?;
        let tree = FlatTree::deserialize(&bytes[sk_len..])?;
        Ok(Self::new(private_key, tree, params.clone()))
    }
}

impl signature::SignerMut<DetachedSignature> for SigningKey {
    fn try_sign(&mut self, msg: &[u8]) -> Result<DetachedSignature, signature::Error> {
        self.sign_detached(msg).map_err(|_| signature::Error::new())
    }
}

impl signature::Keypair for SigningKey {
    type VerifyingKey = VerifyingKey;

    fn verifying_key(&self) -> Self::VerifyingKey {
        VerifyingKey {
            public_key: XmssPublicKey::new(
                self.params.oid(),
                self.private_key.root().to_vec(),
                self.private_key.public_seed().to_vec(),
            ),
            params: self.params.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// VerifyingKey
// ---------------------------------------------------------------------------

/// An XMSS verifying key (public key).
#[derive(Clone, Debug)]
pub struct VerifyingKey {
    public_key: XmssPublicKey,
    params: XmssParams,
}

impl PartialEq for VerifyingKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for VerifyingKey {}

impl VerifyingKey {
    pub(crate) fn new(public_key: XmssPublicKey, params: XmssParams) -> Self {
        Self { public_key, params }
    }

    /// Verifies `signature` (as produced by [`SigningKey::sign`]) and
    /// returns the message it was produced over.
    pub fn verify(&self, signature: &Signature) -> XmssResult<Vec<u8>> {
        let n = self.params.wots().n();
        let wots_len = self.params.wots().len() as usize * n;
        let auth_len = self.params.height() as usize * n;
        let sig_len = 4 + n + wots_len + auth_len;
        if signature.bytes.len() < sig_len {
            return Err(ArgumentError::BufferLength {
                what: "xmss signature+message",
                expected: sig_len,
                got: signature.bytes.len(),
            }
            .into());
        }
        let sig = XmssSignature::deserialize(&self.params, &signature.bytes[..sig_len])?;
        let msg = &signature.bytes[sig_len..];
        if xmss_core::verify(&self.params, msg, &sig, &self.public_key)? {
            Ok(msg.to_vec())
        } else {
            Err(Error::Argument(ArgumentError::SignatureInvalid))
        }
    }

    /// Verifies `signature` against `msg` directly, without any message
    /// encoded in the signature itself.
    pub fn verify_detached(&self, signature: &DetachedSignature, msg: &[u8]) -> XmssResult<()> {
        let sig = XmssSignature::deserialize(&self.params, &signature.bytes)?;
        if xmss_core::verify(&self.params, msg, &sig, &self.public_key)? {
            Ok(())
        } else {
            Err(Error::Argument(ArgumentError::SignatureInvalid))
        }
    }

    /// The parameters this key was generated under.
    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// The underlying wire-format public key.
    pub fn public_key(&self) -> &XmssPublicKey {
        &self.public_key
    }

    /// Wire-exact serialization: `oid(4) || root(n) || publicSeed(n)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.public_key.serialize()
    }

    /// Inverse of [`VerifyingKey::to_bytes`].
    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> XmssResult<Self> {
        let public_key = XmssPublicKey::deserialize(params, bytes)?;
        Ok(Self::new(public_key, params.clone()))
    }
}

impl signature::Verifier<DetachedSignature> for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &DetachedSignature) -> Result<(), signature::Error> {
        self.verify_detached(signature, msg).map_err(|_| signature::Error::new())
    }
}

// ---------------------------------------------------------------------------
// Signature / DetachedSignature
// ---------------------------------------------------------------------------

/// A signature with its message appended (`sign`/`verify`'s wire format).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Signature> for Vec<u8> {
    fn from(sig: Signature) -> Vec<u8> {
        sig.bytes
    }
}

impl signature::SignatureEncoding for Signature {
    type Repr = Vec<u8>;
}

/// A fixed-size detached signature (no message attached).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetachedSignature {
    bytes: Vec<u8>,
}

impl DetachedSignature {
    /// Parses a detached signature for the given parameters.
    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> XmssResult<Self> {
        let _ = XmssSignature::deserialize(params, bytes)?;
        Ok(Self { bytes: bytes.to_vec() })
    }
}

impl AsRef<[u8]> for DetachedSignature {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<DetachedSignature> for Vec<u8> {
    fn from(sig: DetachedSignature) -> Vec<u8> {
        sig.bytes
    }
}

impl signature::SignatureEncoding for DetachedSignature {
    type Repr = Vec<u8>;
}

// ---------------------------------------------------------------------------
// serde
// ---------------------------------------------------------------------------
//
// `Signature`/`DetachedSignature` are opaque byte blobs that don't need an
// `XmssParams` to round-trip, unlike `SigningKey`/`VerifyingKey`/the wire
// types in `crate::types` (whose `deserialize` needs `n`/`h` to size
// variable-length fields). Those are serialized via their own
// `serialize()`/`deserialize(params, ..)` methods instead; see DESIGN.md.

#[cfg(feature = "serde")]
impl serdect::serde::Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        serdect::slice::serialize_hex_lower_or_bin(&self.bytes, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let bytes = serdect::slice::deserialize_hex_or_bin_vec(deserializer)?;
        Ok(Self { bytes })
    }
}

#[cfg(feature = "serde")]
impl serdect::serde::Serialize for DetachedSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serdect::serde::Serializer,
    {
        serdect::slice::serialize_hex_lower_or_bin(&self.bytes, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serdect::serde::Deserialize<'de> for DetachedSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serdect::serde::Deserializer<'de>,
    {
        let bytes = serdect::slice::deserialize_hex_or_bin_vec(deserializer)?;
        Ok(Self { bytes })
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// An XMSS key pair, holding both the signing and verifying key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generates a random key pair under `params`.
    pub fn generate<R: rand::CryptoRng + rand::RngCore>(params: &XmssParams, rng: &mut R) -> XmssResult<Self> {
        let n = params.wots().n();
        let mut sk_seed = vec![0u8; n];
        let mut sk_prf = vec![0u8; n];
        let mut public_seed = vec![0u8; n];
        rng.fill_bytes(&mut sk_seed);
        rng.fill_bytes(&mut sk_prf);
        rng.fill_bytes(&mut public_seed);

        let compact_seeds = derive_compact_seeds(params, &sk_seed)?;
        sk_seed.zeroize();
        let (private_key, public_key, tree) = xmss_core::generate_key_pair(params, compact_seeds, sk_prf, public_seed)?;
        Ok(Self {
            signing_key: SigningKey::new(private_key, tree, params.clone()),
            verifying_key: VerifyingKey::new(public_key, params.clone()),
        })
    }

    /// Generates a deterministic key pair from a `3 * n`-byte seed laid out
    /// as `skSeed || skPrf || publicSeed`.
    pub fn from_seed(params: &XmssParams, seed: &[u8]) -> XmssResult<Self> {
        let (compact_seeds, sk_prf, public_seed) = Self::split_seed(params, seed)?;
        let (private_key, public_key, tree) = xmss_core::generate_key_pair(params, compact_seeds, sk_prf, public_seed)?;
        Ok(Self {
            signing_key: SigningKey::new(private_key, tree, params.clone()),
            verifying_key: VerifyingKey::new(public_key, params.clone()),
        })
    }

    /// As [`KeyPair::generate`], but builds the Merkle tree with
    /// [`crate::parallel::parallel_tree_hash`] across `parallelism` OS
    /// threads instead of the single-threaded `tree_hash`. Produces a
    /// byte-identical key pair to [`KeyPair::generate`] for the same seeds;
    /// only worthwhile for large `h` where tree construction dominates
    /// keygen latency.
    pub fn generate_parallel<R: rand::CryptoRng + rand::RngCore>(
        params: &XmssParams,
        rng: &mut R,
        parallelism: usize,
    ) -> XmssResult<Self> {
        let n = params.wots().n();
        let mut sk_seed = vec![0u8; n];
        let mut sk_prf = vec![0u8; n];
        let mut public_seed = vec![0u8; n];
        rng.fill_bytes(&mut sk_seed);
        rng.fill_bytes(&mut sk_prf);
        rng.fill_bytes(&mut public_seed);

        let compact_seeds = derive_compact_seeds(params, &sk_seed)?;
        sk_seed.zeroize();
        let (private_key, public_key, tree) =
            crate::parallel::generate_key_pair_parallel(params, compact_seeds, sk_prf, public_seed, parallelism)?;
        Ok(Self {
            signing_key: SigningKey::new(private_key, tree, params.clone()),
            verifying_key: VerifyingKey::new(public_key, params.clone()),
        })
    }

    fn split_seed(params: &XmssParams, seed: &[u8]) -> XmssResult<(Vec<u8>, Vec<u8>, Vec<u8>)> {
        let n = params.wots().n();
        if seed.len() != 3 * n {
            return Err(ArgumentError::BufferLength {
                what: "xmss keygen seed",
                expected: 3 * n,
                got: seed.len(),
            }
            .into());
        }
        let sk_seed = &seed[..n];
        let sk_prf = seed[n..2 * n].to_vec();
        let public_seed = seed[2 * n..3 * n].to_vec();
        let compact_seeds = derive_compact_seeds(params, sk_seed)?;
        Ok((compact_seeds, sk_prf, public_seed))
    }

    /// A mutable reference to the signing key (signing advances its state).
    pub fn signing_key(&mut self) -> &mut SigningKey {
        &mut self.signing_key
    }

    /// A reference to the verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// A shared reference to the signing key, for callers (PKCS#8 encoding)
    /// that need read access without taking the `&mut` `signing_key` gives.
    #[cfg(any(feature = "pkcs8", test))]
    pub(crate) fn signing_key_ref(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Assembles a key pair from an already-decoded signing/verifying pair.
    #[cfg(feature = "pkcs8")]
    pub(crate) fn from_parts(signing_key: SigningKey, verifying_key: VerifyingKey) -> Self {
        Self {
            signing_key,
            verifying_key,
        }
    }
}
