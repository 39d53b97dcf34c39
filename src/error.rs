/// Caller-side precondition violations, detected before any hash is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// `n` (digest length) must be a power of two.
    #[error("digest length {0} is not a power of two")]
    DigestLengthNotPowerOfTwo(usize),
    /// The hash primitive's declared digest length disagrees with the configured `n`.
    #[error("hash primitive digest length {actual} does not match configured n={expected}")]
    DigestLengthMismatch {
        /// Configured `n`.
        expected: usize,
        /// Digest length actually reported by the hash primitive.
        actual: usize,
    },
    /// The Winternitz parameter must be 4 or 16.
    #[error("unsupported Winternitz parameter w={0}, expected 4 or 16")]
    UnsupportedW(u32),
    /// The tree height must be strictly positive.
    #[error("XMSS tree height must be > 0")]
    ZeroTreeHeight,
    /// A buffer did not have the length an operation requires.
    #[error("invalid buffer length for {what}: expected {expected}, got {got}")]
    BufferLength {
        /// Name of the buffer/field.
        what: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
    /// `toByte(v, len)`: `v` does not fit in `len` bytes.
    #[error("value {value} does not fit in {len} bytes")]
    IntegerTooLarge {
        /// The value that was too large.
        value: u64,
        /// The requested byte width.
        len: usize,
    },
    /// `treeHash(s, t, ...)` requires `s mod 2^t == 0`.
    #[error("leaf index {s} is not aligned to subtree height {t}")]
    MisalignedSubtree {
        /// Leftmost leaf index of the requested subtree.
        s: u32,
        /// Height of the requested subtree.
        t: u32,
    },
    /// The private key's `nextIdx` is out of the valid `[0, 2^h]` range.
    #[error("leaf index {idx} out of range for tree height {h}")]
    IndexOutOfRange {
        /// Offending index.
        idx: u64,
        /// Configured tree height.
        h: u32,
    },
    /// All one-time signatures for this key have been used.
    #[error("key exhausted: all one-time signatures have been used")]
    KeyExhausted,
    /// `chain(x, start, steps, ...)` preconditions violated.
    #[error("invalid chain bounds: start={start}, steps={steps}, w={w}")]
    InvalidChainBounds {
        /// Requested start index.
        start: u32,
        /// Requested step count.
        steps: u32,
        /// Configured Winternitz parameter.
        w: u32,
    },
    /// `w = 4` was requested without the explicit opt-in.
    #[error("w=4 is declared but untested; use WotsParams::new_w4_unvalidated to opt in")]
    UntestedWinternitzParameter,
    /// The requested number of parallel workers is invalid.
    #[error("parallelism must be >= 2 to engage the parallel path, got {0}")]
    InvalidParallelism(usize),
    /// A parsed OID did not match any entry in the registry.
    #[error("unrecognized OID {0:#010x}")]
    UnknownOid(u32),
    /// The recomputed root did not match the public key's root.
    #[error("signature verification failed")]
    SignatureInvalid,
}

/// Internal invariant violations: these indicate a bug in this crate, not
/// caller misuse. They are fatal and never recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// `treeHash` finished with a stack depth other than 1.
    #[error("tree_hash finished with stack depth {0}, expected 1")]
    StackNotSingleton(usize),
    /// A parallel worker tried to publish a node slot that was already set.
    #[error(
        "parallel tree_hash attempted to publish an already-set node at height {height}, index {index}"
    )]
    DuplicatePublish {
        /// Height of the offending node.
        height: u32,
        /// Absolute index of the offending node at that height.
        index: u64,
    },
    /// Storing and non-storing tree construction paths disagreed on the root.
    #[error("tree root mismatch between storing and non-storing construction paths")]
    RootMismatch,
    /// An `Adrs` accessor was called against the wrong address variant.
    #[error("adrs accessor {0} called against the wrong address variant")]
    WrongAdrsVariant(&'static str),
}

/// The hash primitive itself failed (as opposed to caller misuse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("hash primitive {calling_primitive} failed: {reason}")]
pub struct HashError {
    /// Which keyed-hash specialization (`F`, `PRF`, `H`, `H_msg`) invoked the primitive.
    pub calling_primitive: &'static str,
    /// Human-readable reason supplied by the primitive.
    pub reason: &'static str,
}

/// Errors produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A caller-side precondition was violated.
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    /// The hash primitive failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// An internal invariant was violated; indicates a bug in this crate.
    #[error(transparent)]
    Invariant(#[from] InvariantError),
}

/// Result type used throughout this crate.
pub type XmssResult<T> = Result<T, Error>;
