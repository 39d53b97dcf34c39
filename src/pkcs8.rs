//! PKCS#8 / SPKI encoding for XMSS keys.
//!
//! The teacher this crate started from dispatches PKCS#8 decode through
//! `TryFrom<SubjectPublicKeyInfoRef>`/`PrivateKeyInfo`, matching the decoded
//! ASN.1 OID against a const-generic parameter set. This core's
//! [`XmssParams`] is a runtime value, not a type, so there's no
//! parameterless `TryFrom` to hang a decoder off: callers pass the
//! `XmssParams` they already built for verification/signing back in to the
//! inherent `from_*_der` functions below. Encoding still goes through the
//! standard `spki`/`pkcs8` traits, since a `VerifyingKey`/`KeyPair` already
//! carries its own parameters.

use const_oid::ObjectIdentifier;
use der::asn1::BitStringRef;
use der::Encode;
use pkcs8::{AlgorithmIdentifierRef, EncodePrivateKey, PrivateKeyInfo};
use spki::{EncodePublicKey, SubjectPublicKeyInfoRef};

use crate::api::{KeyPair, SigningKey, VerifyingKey};
use crate::error::{ArgumentError, XmssResult};
use crate::types::{XmssParams, XmssPublicKey};

/// OID for XMSS hash-based signatures: `id-alg-xmss-hashsig`.
const XMSS_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.4.0.127.0.15.1.1.13.0");

impl EncodePublicKey for VerifyingKey {
    fn to_public_key_der(&self) -> spki::Result<der::Document> {
        let algorithm = AlgorithmIdentifierRef {
            oid: XMSS_OID,
            parameters: None,
        };
        let pk_bytes = self.public_key().serialize();
        let subject_public_key = BitStringRef::from_bytes(&pk_bytes).map_err(|_| spki::Error::KeyMalformed)?;
        let spki_ref = SubjectPublicKeyInfoRef {
            algorithm,
            subject_public_key,
        };
        let der_bytes = spki_ref.to_der().map_err(|_| spki::Error::KeyMalformed)?;
        der::Document::try_from(der_bytes.as_slice()).map_err(|_| spki::Error::KeyMalformed)
    }
}

impl VerifyingKey {
    /// Decodes a verifying key from a `SubjectPublicKeyInfo` DER document,
    /// under the caller-supplied `params`.
    pub fn from_public_key_der(params: &XmssParams, bytes: &[u8]) -> XmssResult<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(bytes).map_err(|_| ArgumentError::BufferLength {
            what: "xmss SubjectPublicKeyInfo DER",
            expected: 0,
            got: bytes.len(),
        })?;
        if spki.algorithm.oid != XMSS_OID {
            return Err(ArgumentError::UnknownOid(0).into());
        }
        let pk_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or(ArgumentError::BufferLength {
                what: "xmss public key bit string",
                expected: 0,
                got: 0,
            })?;
        let public_key = XmssPublicKey::deserialize(params, pk_bytes)?;
        Ok(VerifyingKey::new(public_key, params.clone()))
    }
}

impl EncodePrivateKey for KeyPair {
    fn to_pkcs8_der(&self) -> pkcs8::Result<der::SecretDocument> {
        let algorithm = AlgorithmIdentifierRef {
            oid: XMSS_OID,
            parameters: None,
        };
        let sk_bytes = self.signing_key_ref().to_bytes();
        let pk_bytes = self.verifying_key().public_key().serialize();
        let pki = PrivateKeyInfo {
            algorithm,
            private_key: &sk_bytes,
            public_key: Some(&pk_bytes),
        };
        pki.try_into()
    }
}

impl KeyPair {
    /// Decodes a key pair from PKCS#8 DER bytes produced by
    /// [`EncodePrivateKey::to_pkcs8_der`], under the caller-supplied
    /// `params`.
    pub fn from_pkcs8_der(params: &XmssParams, der_bytes: &[u8]) -> XmssResult<Self> {
        let pk_info = PrivateKeyInfo::try_from(der_bytes).map_err(|_| ArgumentError::BufferLength {
            what: "xmss PKCS#8 DER",
            expected: 0,
            got: der_bytes.len(),
        })?;
        if pk_info.algorithm.oid != XMSS_OID {
            return Err(ArgumentError::UnknownOid(0).into());
        }

        let signing_key = SigningKey::from_bytes(params, pk_info.private_key)?;
        let verifying_key = match pk_info.public_key {
            Some(bytes) => VerifyingKey::new(XmssPublicKey::deserialize(params, bytes)?, params.clone()),
            None => signature::Keypair::verifying_key(&signing_key),
        };

        Ok(KeyPair::from_parts(signing_key, verifying_key))
    }
}
