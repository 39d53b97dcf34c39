//! The abstract hash primitive this crate consumes, and the domain-separated
//! keyed-hash specializations (`F`, `PRF`, `H`, `H_msg`) built on top of it.
//!
//! Concrete hash implementations are deliberately external collaborators:
//! this module only knows the [`HashPrimitive`] / [`HashInstance`] contract.
//! [`concrete`] provides adapters over `sha2`/`sha3` for callers who don't
//! want to write their own, and for this crate's own test vectors.

use crate::adrs::Adrs;
use crate::error::HashError;

/// One absorb-then-finalize hashing session. Not thread-safe; a fresh
/// instance is created per hashed value via [`HashPrimitive::new_instance`].
pub trait HashInstance: Send {
    /// Feeds more input bytes into the hash state.
    fn absorb(&mut self, data: &[u8]);

    /// Finalizes the hash, writing exactly `dest.len()` bytes.
    ///
    /// Fails with [`HashError`] if called more than once on the same
    /// instance, or if `dest` is shorter than the primitive's configured
    /// digest length.
    fn finalize(&mut self, dest: &mut [u8]) -> Result<(), HashError>;
}

/// A factory for fresh [`HashInstance`]s, all producing digests of
/// [`HashPrimitive::digest_length`] bytes (a power of two, equal to the
/// WOTS+/XMSS parameter `n`).
pub trait HashPrimitive: Send + Sync {
    /// The fixed digest length `n`, in bytes.
    fn digest_length(&self) -> usize;

    /// Creates a fresh, empty hashing instance.
    fn new_instance(&self) -> Box<dyn HashInstance>;
}

/// Big-endian encoding of a small, crate-internal domain separator into `n`
/// bytes. Unlike [`crate::utils::to_bytes`] this never fails: the domain
/// values used here (0-4) always fit in any `n >= 1`.
fn domain_bytes(n: usize, domain: u8) -> Vec<u8> {
    let mut out = vec![0u8; n];
    if n > 0 {
        out[n - 1] = domain;
    }
    out
}

/// `functionTemplate(domain, key, msg, dest) = Hash(toByte(domain, n) || key || msg)`.
pub(crate) fn function_template(
    hash: &dyn HashPrimitive,
    calling_primitive: &'static str,
    domain: u8,
    key: &[u8],
    msg: &[u8],
    dest: &mut [u8],
) -> Result<(), HashError> {
    let n = hash.digest_length();
    let mut instance = hash.new_instance();
    instance.absorb(&domain_bytes(n, domain));
    instance.absorb(key);
    instance.absorb(msg);
    instance.finalize(dest).map_err(|e| HashError {
        calling_primitive,
        reason: e.reason,
    })
}

/// `F(key, msg) = functionTemplate(0, key, msg)`. Used in the WOTS+ chain.
pub(crate) fn f(hash: &dyn HashPrimitive, key: &[u8], msg: &[u8], dest: &mut [u8]) -> Result<(), HashError> {
    function_template(hash, "F", 0, key, msg, dest)
}

/// `H(key, msg) = functionTemplate(1, key, msg)`. Randomized hashing of two children.
pub(crate) fn h(hash: &dyn HashPrimitive, key: &[u8], msg: &[u8], dest: &mut [u8]) -> Result<(), HashError> {
    function_template(hash, "H", 1, key, msg, dest)
}

/// `H_msg(key, msg) = functionTemplate(2, key, msg)`. Randomized message hash.
pub(crate) fn h_msg(hash: &dyn HashPrimitive, key: &[u8], msg: &[u8], dest: &mut [u8]) -> Result<(), HashError> {
    function_template(hash, "H_msg", 2, key, msg, dest)
}

/// `PRF(key, adrs) = functionTemplate(3, key, adrs.toBytes())`.
pub(crate) fn prf(hash: &dyn HashPrimitive, key: &[u8], adrs: Adrs, dest: &mut [u8]) -> Result<(), HashError> {
    function_template(hash, "PRF", 3, key, &adrs.to_bytes(), dest)
}

/// `PRF_keygen(seed, publicSeed, adrs) = functionTemplate(4, seed, publicSeed || adrs.toBytes())`.
///
/// Domain 4, distinct from `PRF`'s domain 3: RFC 8391's private-key
/// expansion (`WOTS_genSK`/`expand_seed`) keys on the per-leaf compact seed
/// but also binds the public seed into the message, so a WOTS+ private key
/// depends on both seeds rather than the compact seed alone.
pub(crate) fn prf_keygen(hash: &dyn HashPrimitive, seed: &[u8], pub_seed: &[u8], adrs: Adrs, dest: &mut [u8]) -> Result<(), HashError> {
    let mut msg = Vec::with_capacity(pub_seed.len() + 32);
    msg.extend_from_slice(pub_seed);
    msg.extend_from_slice(&adrs.to_bytes());
    function_template(hash, "PRF_keygen", 4, seed, &msg, dest)
}

/// Concrete hash primitive adapters over `sha2`/`sha3`, for callers who want
/// a ready-made `HashPrimitive` rather than writing their own.
pub mod concrete {
    use super::{HashInstance, HashPrimitive};
    use crate::error::HashError;
    use sha2::Digest as Sha2Digest;
    use sha3::digest::{ExtendableOutput, Update, XofReader};

    /// SHA-256, truncated to the first `n` bytes (`n <= 32`).
    #[derive(Debug, Clone, Copy)]
    pub struct Sha256Truncated {
        n: usize,
    }

    impl Sha256Truncated {
        /// Builds the adapter. `n` must be `<= 32`; callers combine this
        /// with `WotsParams`/`XmssParams` construction, which validates
        /// `digest_length() == n` independently.
        pub fn new(n: usize) -> Self {
            Self { n }
        }
    }

    struct Sha256Instance {
        state: sha2::Sha256,
        finalized: bool,
    }

    impl HashInstance for Sha256Instance {
        fn absorb(&mut self, data: &[u8]) {
            sha2::Digest::update(&mut self.state, data);
        }

        fn finalize(&mut self, dest: &mut [u8]) -> Result<(), HashError> {
            if self.finalized {
                return Err(HashError {
                    calling_primitive: "sha256",
                    reason: "finalize called more than once on the same instance",
                });
            }
            let out = self.state.clone().finalize();
            if dest.len() > out.len() {
                return Err(HashError {
                    calling_primitive: "sha256",
                    reason: "destination longer than digest output",
                });
            }
            dest.copy_from_slice(&out[..dest.len()]);
            self.finalized = true;
            Ok(())
        }
    }

    impl HashPrimitive for Sha256Truncated {
        fn digest_length(&self) -> usize {
            self.n
        }

        fn new_instance(&self) -> Box<dyn HashInstance> {
            Box::new(Sha256Instance {
                state: sha2::Sha256::new(),
                finalized: false,
            })
        }
    }

    /// SHA-512, truncated to the first `n` bytes (`n <= 64`).
    #[derive(Debug, Clone, Copy)]
    pub struct Sha512Truncated {
        n: usize,
    }

    impl Sha512Truncated {
        /// Builds the adapter. `n` must be `<= 64`.
        pub fn new(n: usize) -> Self {
            Self { n }
        }
    }

    struct Sha512Instance {
        state: sha2::Sha512,
        finalized: bool,
    }

    impl HashInstance for Sha512Instance {
        fn absorb(&mut self, data: &[u8]) {
            sha2::Digest::update(&mut self.state, data);
        }

        fn finalize(&mut self, dest: &mut [u8]) -> Result<(), HashError> {
            if self.finalized {
                return Err(HashError {
                    calling_primitive: "sha512",
                    reason: "finalize called more than once on the same instance",
                });
            }
            let out = self.state.clone().finalize();
            if dest.len() > out.len() {
                return Err(HashError {
                    calling_primitive: "sha512",
                    reason: "destination longer than digest output",
                });
            }
            dest.copy_from_slice(&out[..dest.len()]);
            self.finalized = true;
            Ok(())
        }
    }

    impl HashPrimitive for Sha512Truncated {
        fn digest_length(&self) -> usize {
            self.n
        }

        fn new_instance(&self) -> Box<dyn HashInstance> {
            Box::new(Sha512Instance {
                state: sha2::Sha512::new(),
                finalized: false,
            })
        }
    }

    /// SHAKE128 as an arbitrary-output-length hash, producing `n` bytes.
    #[derive(Debug, Clone, Copy)]
    pub struct Shake128Xof {
        n: usize,
    }

    impl Shake128Xof {
        /// Builds the adapter with the given output length.
        pub fn new(n: usize) -> Self {
            Self { n }
        }
    }

    struct Shake128Instance {
        state: sha3::Shake128,
        finalized: bool,
    }

    impl HashInstance for Shake128Instance {
        fn absorb(&mut self, data: &[u8]) {
            Update::update(&mut self.state, data);
        }

        fn finalize(&mut self, dest: &mut [u8]) -> Result<(), HashError> {
            if self.finalized {
                return Err(HashError {
                    calling_primitive: "shake128",
                    reason: "finalize called more than once on the same instance",
                });
            }
            let mut reader = self.state.clone().finalize_xof();
            reader.read(dest);
            self.finalized = true;
            Ok(())
        }
    }

    impl HashPrimitive for Shake128Xof {
        fn digest_length(&self) -> usize {
            self.n
        }

        fn new_instance(&self) -> Box<dyn HashInstance> {
            Box::new(Shake128Instance {
                state: sha3::Shake128::default(),
                finalized: false,
            })
        }
    }

    /// SHAKE256 as an arbitrary-output-length hash, producing `n` bytes.
    #[derive(Debug, Clone, Copy)]
    pub struct Shake256Xof {
        n: usize,
    }

    impl Shake256Xof {
        /// Builds the adapter with the given output length.
        pub fn new(n: usize) -> Self {
            Self { n }
        }
    }

    struct Shake256Instance {
        state: sha3::Shake256,
        finalized: bool,
    }

    impl HashInstance for Shake256Instance {
        fn absorb(&mut self, data: &[u8]) {
            Update::update(&mut self.state, data);
        }

        fn finalize(&mut self, dest: &mut [u8]) -> Result<(), HashError> {
            if self.finalized {
                return Err(HashError {
                    calling_primitive: "shake256",
                    reason: "finalize called more than once on the same instance",
                });
            }
            let mut reader = self.state.clone().finalize_xof();
            reader.read(dest);
            self.finalized = true;
            Ok(())
        }
    }

    impl HashPrimitive for Shake256Xof {
        fn digest_length(&self) -> usize {
            self.n
        }

        fn new_instance(&self) -> Box<dyn HashInstance> {
            Box::new(Shake256Instance {
                state: sha3::Shake256::default(),
                finalized: false,
            })
        }
    }
}
