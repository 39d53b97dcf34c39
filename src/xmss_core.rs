//! The RFC 8391 XMSS primitives: `RAND_HASH`, `ltree`, `treeHash`,
//! `rootFromSig`, and the top-level sign/verify/key-generation orchestration.

use subtle::ConstantTimeEq;

use crate::adrs::{Adrs, AdrsType};
use crate::error::{ArgumentError, InvariantError, XmssResult};
use crate::hash::{function_template, h, h_msg, prf};
use crate::types::{FlatTree, XmssParams, XmssPrivateKey, XmssPublicKey, XmssSignature};
use crate::utils::to_bytes;
use crate::wots;

/// `RAND_HASH(left, right, publicSeed, ADRS)`. `adrs` must already carry the
/// tree height/index of the node being produced; only `keyAndMask` is
/// mutated here.
pub(crate) fn rand_hash(
    params: &XmssParams,
    left: &[u8],
    right: &[u8],
    pub_seed: &[u8],
    adrs: &mut Adrs,
    out: &mut [u8],
) -> XmssResult<()> {
    let n = params.wots().n();
    let mut key = vec![0u8; n];
    let mut bm0 = vec![0u8; n];
    let mut bm1 = vec![0u8; n];

    adrs.set_key_and_mask(0);
    prf(params.hash(), pub_seed, *adrs, &mut key)?;
    adrs.set_key_and_mask(1);
    prf(params.hash(), pub_seed, *adrs, &mut bm0)?;
    adrs.set_key_and_mask(2);
    prf(params.hash(), pub_seed, *adrs, &mut bm1)?;

    let mut msg = vec![0u8; 2 * n];
    for i in 0..n {
        msg[i] = left[i] ^ bm0[i];
        msg[n + i] = right[i] ^ bm1[i];
    }
    h(params.hash(), &key, &msg, out)?;
    Ok(())
}

/// `ltree(pk, publicSeed, ADRS)`, working in place on `pk` (`len * n`
/// bytes). The compressed leaf ends up in `pk[..n]`.
pub(crate) fn ltree(params: &XmssParams, pk: &mut [u8], pub_seed: &[u8], adrs: &mut Adrs) -> XmssResult<()> {
    let n = params.wots().n();
    let mut len_p = params.wots().len();
    adrs.set_tree_height(0)?;

    while len_p > 1 {
        for i in 0..len_p / 2 {
            adrs.set_tree_index(i)?;
            let left = pk[(2 * i) as usize * n..(2 * i + 1) as usize * n].to_vec();
            let right = pk[(2 * i + 1) as usize * n..(2 * i + 2) as usize * n].to_vec();
            rand_hash(params, &left, &right, pub_seed, adrs, &mut pk[i as usize * n..(i as usize + 1) * n])?;
        }
        if len_p % 2 == 1 {
            let src = (len_p - 1) as usize * n;
            let dst = (len_p / 2) as usize * n;
            let carried = pk[src..src + n].to_vec();
            pk[dst..dst + n].copy_from_slice(&carried);
        }
        len_p = len_p.div_ceil(2);
        let height = adrs.tree_height()?;
        adrs.set_tree_height(height + 1)?;
    }
    Ok(())
}

/// Derives the leaf at absolute index `idx`: WOTS+ keygen from the compact
/// seed, compressed through `ltree`.
pub(crate) fn gen_leaf(params: &XmssParams, leaf_seed: &[u8], idx: u32, pub_seed: &[u8]) -> XmssResult<Vec<u8>> {
    let wots_params = params.wots();
    let n = wots_params.n();

    let mut adrs = Adrs::new();
    adrs.set_type(AdrsType::Ots);
    adrs.set_ots_address(idx)?;
    let mut pk = vec![0u8; wots_params.len() as usize * n];
    wots::pk_gen(wots_params, leaf_seed, pub_seed, &mut adrs, &mut pk)?;

    adrs.set_type(AdrsType::LTree);
    adrs.set_ltree_address(idx)?;
    ltree(params, &mut pk, pub_seed, &mut adrs)?;
    Ok(pk[..n].to_vec())
}

/// Byte offset of node `(height, absIndex)` within a flat buffer rooted at
/// `rootHeight` whose leftmost leaf is `s`.
pub(crate) fn flat_tree_index(height: u32, abs_index: u32, s: u32, root_height: u32, n: usize) -> usize {
    let local_index = abs_index - (s >> height);
    let mut base: u64 = 0;
    for i in 0..height {
        base += 1u64 << (root_height - i);
    }
    ((base + u64::from(local_index)) as usize) * n
}

/// Builds the root of the sub-tree of height `t` whose leftmost leaf is `s`.
/// If `flat_dest` is supplied, every node computed is also written there at
/// its [`flat_tree_index`] offset, addressed as if it were part of a tree of
/// height `t` rooted at `s` (the layout `generate_key_pair`'s single
/// top-level call and `compute_auth`'s standalone sub-calls both want).
pub(crate) fn tree_hash(
    params: &XmssParams,
    compact_seeds: &[u8],
    pub_seed: &[u8],
    s: u32,
    t: u32,
    flat_dest: Option<&mut [u8]>,
) -> XmssResult<Vec<u8>> {
    tree_hash_with_root_height(params, compact_seeds, pub_seed, s, t, t, flat_dest)
}

/// As [`tree_hash`], but `flat_dest` (if supplied) is addressed relative to
/// a tree of height `root_height` rooted at global leaf `0` rather than
/// relative to this call's own `(s, t)`. [`crate::parallel`] uses this so
/// every task writes directly into one shared global buffer.
pub(crate) fn tree_hash_with_root_height(
    params: &XmssParams,
    compact_seeds: &[u8],
    pub_seed: &[u8],
    s: u32,
    t: u32,
    root_height: u32,
    mut flat_dest: Option<&mut [u8]>,
) -> XmssResult<Vec<u8>> {
    let n = params.wots().n();
    if t > 0 && s % (1u32 << t) != 0 {
        return Err(ArgumentError::MisalignedSubtree { s, t }.into());
    }
    let global_s = if root_height == t { s } else { 0 };

    let mut stack: Vec<(Vec<u8>, u32)> = Vec::with_capacity(t as usize + 1);
    let mut adrs = Adrs::new();

    for i in 0..(1u32 << t) {
        let leaf_idx = s + i;
        let leaf_seed = &compact_seeds[leaf_idx as usize * n..(leaf_idx as usize + 1) * n];
        let mut node = gen_leaf(params, leaf_seed, leaf_idx, pub_seed)?;

        adrs.set_type(AdrsType::HashTree);
        adrs.set_tree_height(0)?;
        adrs.set_tree_index(leaf_idx)?;
        if let Some(dest) = flat_dest.as_deref_mut() {
            let off = flat_tree_index(0, leaf_idx, global_s, root_height, n);
            dest[off..off + n].copy_from_slice(&node);
        }

        let mut height = 0u32;
        while let Some(&(_, top_height)) = stack.last() {
            if top_height != height {
                break;
            }
            let (lower, _) = stack.pop().expect("stack non-empty, just peeked");
            let idx = adrs.tree_index()?;
            adrs.set_tree_index((idx - 1) >> 1)?;
            let mut merged = vec![0u8; n];
            rand_hash(params, &lower, &node, pub_seed, &mut adrs, &mut merged)?;
            height += 1;
            adrs.set_tree_height(height)?;
            if let Some(dest) = flat_dest.as_deref_mut() {
                let abs = adrs.tree_index()?;
                let off = flat_tree_index(height, abs, global_s, root_height, n);
                dest[off..off + n].copy_from_slice(&merged);
            }
            node = merged;
        }
        stack.push((node, height));
    }

    if stack.len() != 1 {
        return Err(InvariantError::StackNotSingleton(stack.len()).into());
    }
    Ok(stack.pop().expect("checked len == 1 above").0)
}

/// Re-derives the authentication path for `idx` from scratch (no cache).
pub(crate) fn compute_auth(params: &XmssParams, compact_seeds: &[u8], pub_seed: &[u8], idx: u32) -> XmssResult<Vec<u8>> {
    let h = params.height();
    let n = params.wots().n();
    let mut auth = vec![0u8; h as usize * n];
    for j in 0..h {
        let k = (idx >> j) ^ 1;
        let s = k << j;
        let node = tree_hash(params, compact_seeds, pub_seed, s, j, None)?;
        auth[j as usize * n..(j as usize + 1) * n].copy_from_slice(&node);
    }
    Ok(auth)
}

/// Reads the authentication path for `idx` out of a cached [`FlatTree`].
pub(crate) fn read_auth(flat_tree: &FlatTree, idx: u32) -> Vec<u8> {
    let h = flat_tree.height();
    let n = flat_tree.n();
    let mut auth = vec![0u8; h as usize * n];
    for j in 0..h {
        let k = (idx >> j) ^ 1;
        let off = flat_tree_index(j, k, 0, h, n);
        auth[j as usize * n..(j as usize + 1) * n].copy_from_slice(&flat_tree.bytes()[off..off + n]);
    }
    auth
}

/// `treeSig`: the WOTS+ signature over `msg_prime` plus the authentication
/// path for `idx`, read from `tree` if supplied or recomputed otherwise.
fn tree_sig(
    params: &XmssParams,
    compact_seeds: &[u8],
    pub_seed: &[u8],
    msg_prime: &[u8],
    idx: u32,
    tree: Option<&FlatTree>,
) -> XmssResult<(Vec<u8>, Vec<u8>)> {
    let auth = match tree {
        Some(t) => read_auth(t, idx),
        None => compute_auth(params, compact_seeds, pub_seed, idx)?,
    };

    let wots_params = params.wots();
    let n = wots_params.n();
    let leaf_seed = &compact_seeds[idx as usize * n..(idx as usize + 1) * n];
    let mut adrs = Adrs::new();
    adrs.set_type(AdrsType::Ots);
    adrs.set_ots_address(idx)?;
    let mut sig = vec![0u8; wots_params.len() as usize * n];
    wots::sign(wots_params, msg_prime, leaf_seed, pub_seed, &mut adrs, &mut sig)?;
    Ok((sig, auth))
}

/// `r = PRF(skPrf, toByte(idx, 32))`, `msgPrime = H_msg(r || root || toByte(idx, n), msg)`.
fn randomized_message_hash(
    params: &XmssParams,
    sk_prf: &[u8],
    root: &[u8],
    idx: u32,
    msg: &[u8],
) -> XmssResult<(Vec<u8>, Vec<u8>)> {
    let n = params.wots().n();

    let mut idx_32 = vec![0u8; 32];
    to_bytes(&mut idx_32, u64::from(idx))?;
    let mut r = vec![0u8; n];
    function_template(params.hash(), "PRF", 3, sk_prf, &idx_32, &mut r)?;

    let mut idx_n = vec![0u8; n];
    to_bytes(&mut idx_n, u64::from(idx))?;
    let mut key = Vec::with_capacity(3 * n);
    key.extend_from_slice(&r);
    key.extend_from_slice(root);
    key.extend_from_slice(&idx_n);

    let mut msg_prime = vec![0u8; n];
    h_msg(params.hash(), &key, msg, &mut msg_prime)?;
    Ok((r, msg_prime))
}

/// Recomputes the candidate root from a signature, per `rootFromSig`.
pub(crate) fn root_from_sig(
    params: &XmssParams,
    msg_prime: &[u8],
    idx: u32,
    wots_sig: &[u8],
    auth: &[u8],
    pub_seed: &[u8],
) -> XmssResult<Vec<u8>> {
    let wots_params = params.wots();
    let n = wots_params.n();
    let h = params.height();

    let mut adrs = Adrs::new();
    adrs.set_type(AdrsType::Ots);
    adrs.set_ots_address(idx)?;
    let mut pk_ots = vec![0u8; wots_params.len() as usize * n];
    wots::pk_from_sig(wots_params, wots_sig, msg_prime, pub_seed, &mut adrs, &mut pk_ots)?;

    adrs.set_type(AdrsType::LTree);
    adrs.set_ltree_address(idx)?;
    ltree(params, &mut pk_ots, pub_seed, &mut adrs)?;
    let mut node = pk_ots[..n].to_vec();

    adrs.set_type(AdrsType::HashTree);
    adrs.set_tree_index(idx)?;
    for k in 0..h {
        adrs.set_tree_height(k)?;
        let sibling = &auth[k as usize * n..(k as usize + 1) * n];
        let mut merged = vec![0u8; n];
        if (idx >> k) & 1 == 0 {
            let cur_idx = adrs.tree_index()?;
            adrs.set_tree_index(cur_idx >> 1)?;
            rand_hash(params, &node, sibling, pub_seed, &mut adrs, &mut merged)?;
        } else {
            let cur_idx = adrs.tree_index()?;
            adrs.set_tree_index((cur_idx - 1) >> 1)?;
            rand_hash(params, sibling, &node, pub_seed, &mut adrs, &mut merged)?;
        }
        node = merged;
    }
    Ok(node)
}

/// Shared buffer-length validation for [`generate_key_pair`] and
/// [`crate::parallel::generate_key_pair_parallel`].
pub(crate) fn validate_seed_lengths(params: &XmssParams, compact_private_seeds: &[u8], sk_prf: &[u8], public_seed: &[u8]) -> XmssResult<()> {
    let n = params.wots().n();
    if compact_private_seeds.len() != params.num_leaves() as usize * n {
        return Err(ArgumentError::BufferLength {
            what: "compact private seeds",
            expected: params.num_leaves() as usize * n,
            got: compact_private_seeds.len(),
        }
        .into());
    }
    if sk_prf.len() != n || public_seed.len() != n {
        return Err(ArgumentError::BufferLength {
            what: "sk_prf/public_seed",
            expected: n,
            got: sk_prf.len().min(public_seed.len()),
        }
        .into());
    }
    Ok(())
}

/// Builds a fresh XMSS key pair from caller-supplied seeds, computing the
/// root via the sequential `tree_hash`. The returned [`FlatTree`] caches
/// every node for O(1) authentication-path reads later.
pub fn generate_key_pair(
    params: &XmssParams,
    compact_private_seeds: Vec<u8>,
    sk_prf: Vec<u8>,
    public_seed: Vec<u8>,
) -> XmssResult<(XmssPrivateKey, XmssPublicKey, FlatTree)> {
    validate_seed_lengths(params, &compact_private_seeds, &sk_prf, &public_seed)?;
    let n = params.wots().n();
    let h = params.height();

    let mut flat_bytes = vec![0u8; ((1usize << (h + 1)) - 1) * n];
    let root = tree_hash(params, &compact_private_seeds, &public_seed, 0, h, Some(&mut flat_bytes))?;
    let flat_tree = FlatTree::new(h, n, flat_bytes);

    let private_key = XmssPrivateKey::new(0, compact_private_seeds, sk_prf, root.clone(), public_seed.clone());
    let public_key = XmssPublicKey::new(params.oid(), root, public_seed);
    Ok((private_key, public_key, flat_tree))
}

/// `XMSS_sign`: signs `msg` with `private_key`, returning the signature and
/// the private key advanced by one. Fails with `ArgumentError::KeyExhausted`
/// if every leaf has already been used.
pub fn sign(
    params: &XmssParams,
    private_key: &XmssPrivateKey,
    msg: &[u8],
    tree: Option<&FlatTree>,
) -> XmssResult<(XmssSignature, XmssPrivateKey)> {
    if private_key.is_exhausted(params) {
        return Err(ArgumentError::KeyExhausted.into());
    }
    let idx = private_key.next_idx();
    let (r, msg_prime) = randomized_message_hash(params, private_key.sk_prf(), private_key.root(), idx, msg)?;
    let (wots_sig, auth) = tree_sig(
        params,
        private_key.compact_private_seeds(),
        private_key.public_seed(),
        &msg_prime,
        idx,
        tree,
    )?;
    let signature = XmssSignature::new(idx, r, wots_sig, auth);
    let advanced = private_key.increment(params)?;
    Ok((signature, advanced))
}

/// `XMSS_verify`: recomputes the candidate root and compares it
/// constant-time against `public_key.root()`. Returns `Ok(false)` for any
/// mismatch; only malformed inputs (wrong buffer sizes) are errors.
pub fn verify(params: &XmssParams, msg: &[u8], signature: &XmssSignature, public_key: &XmssPublicKey) -> XmssResult<bool> {
    let n = params.wots().n();
    let h = params.height();
    if u64::from(signature.idx()) >= params.num_leaves() {
        return Err(ArgumentError::IndexOutOfRange {
            idx: u64::from(signature.idx()),
            h,
        }
        .into());
    }
    if signature.r().len() != n
        || signature.wots_sig().len() != params.wots().len() as usize * n
        || signature.auth_path().len() != h as usize * n
        || public_key.root().len() != n
        || public_key.public_seed().len() != n
    {
        return Err(ArgumentError::BufferLength {
            what: "xmss signature/public key",
            expected: n,
            got: 0,
        }
        .into());
    }

    let mut idx_n = vec![0u8; n];
    to_bytes(&mut idx_n, u64::from(signature.idx()))?;
    let mut key = Vec::with_capacity(3 * n);
    key.extend_from_slice(signature.r());
    key.extend_from_slice(public_key.root());
    key.extend_from_slice(&idx_n);
    let mut msg_prime = vec![0u8; n];
    h_msg(params.hash(), &key, msg, &mut msg_prime)?;

    let candidate = root_from_sig(
        params,
        &msg_prime,
        signature.idx(),
        signature.wots_sig(),
        signature.auth_path(),
        public_key.public_seed(),
    )?;
    Ok(bool::from(candidate.ct_eq(public_key.root())))
}
