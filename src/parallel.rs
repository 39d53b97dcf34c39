//! Multi-threaded `treeHash`: splits the leaves into contiguous batches, one
//! per task, computes each batch's subtree independently, then merges the
//! batch roots up to the full tree root. Every node this produces is the
//! exact same value [`crate::xmss_core::tree_hash`] would have produced for
//! the same inputs — this module only changes how the work is scheduled,
//! never the hash inputs.

use std::sync::Mutex;
use std::thread;

use crate::adrs::{Adrs, AdrsType};
use crate::error::{ArgumentError, XmssResult};
use crate::types::{FlatTree, XmssParams, XmssPrivateKey, XmssPublicKey};
use crate::xmss_core::{flat_tree_index, gen_leaf, rand_hash, validate_seed_lengths};

/// Picks the per-task subtree height `p`: the largest value in `[1, h)` with
/// `2^p * parallelism < 2^h`, so there are always more tasks than workers.
/// Falls back to `1` (including when `h == 1`, which degenerates to a
/// single task).
fn choose_subtree_height(h: u32, parallelism: usize) -> u32 {
    for p in (1..h).rev() {
        if (1u64 << p) * (parallelism as u64) < (1u64 << h) {
            return p;
        }
    }
    1
}

/// Merges a complete `2^p`-leaf subtree bottom-up, layer by layer. Returns
/// the subtree root. `staged` collects `(global flat-buffer offset, node
/// bytes)` pairs for every node computed, in layer order, so the caller can
/// publish them to the shared buffer under a single lock.
fn hash_subtree(
    params: &XmssParams,
    compact_seeds: &[u8],
    pub_seed: &[u8],
    s: u32,
    p: u32,
    root_height: u32,
    mut staged: Option<&mut Vec<(usize, Vec<u8>)>>,
) -> XmssResult<Vec<u8>> {
    let n = params.wots().n();
    let mut layer: Vec<Vec<u8>> = Vec::with_capacity(1usize << p);
    for i in 0..(1u32 << p) {
        let leaf_idx = s + i;
        let leaf_seed = &compact_seeds[leaf_idx as usize * n..(leaf_idx as usize + 1) * n];
        let node = gen_leaf(params, leaf_seed, leaf_idx, pub_seed)?;
        if let Some(sink) = staged.as_deref_mut() {
            let off = flat_tree_index(0, leaf_idx, 0, root_height, n);
            sink.push((off, node.clone()));
        }
        layer.push(node);
    }

    let mut adrs = Adrs::new();
    adrs.set_type(AdrsType::HashTree);
    for height in 0..p {
        let mut next_layer = Vec::with_capacity(layer.len() / 2);
        for (j, pair) in layer.chunks_exact(2).enumerate() {
            let parent_index = (s >> (height + 1)) + j as u32;
            adrs.set_tree_height(height)?;
            adrs.set_tree_index(parent_index)?;
            let mut merged = vec![0u8; n];
            rand_hash(params, &pair[0], &pair[1], pub_seed, &mut adrs, &mut merged)?;
            if let Some(sink) = staged.as_deref_mut() {
                let off = flat_tree_index(height + 1, parent_index, 0, root_height, n);
                sink.push((off, merged.clone()));
            }
            next_layer.push(merged);
        }
        layer = next_layer;
    }

    Ok(layer.into_iter().next().expect("subtree height >= 0 always leaves one node"))
}

/// Parallel equivalent of [`crate::xmss_core::tree_hash`] for the full tree
/// (`s = 0`, `t = height`): splits the `2^height` leaves into
/// `2^(height - p)` independent tasks of `2^p` leaves each, runs them on a
/// scoped thread per task, then merges the task roots sequentially on the
/// calling thread. `parallelism` must be `>= 2`; lower values gain nothing
/// over [`crate::xmss_core::tree_hash`] and are rejected so callers don't
/// pay thread-spawn overhead for no benefit.
///
/// If `flat_dest` is supplied it receives every node in the tree, laid out
/// identically to a sequential top-level `tree_hash` call — the two are
/// interchangeable as cache sources for [`crate::xmss_core::read_auth`].
pub fn parallel_tree_hash(
    params: &XmssParams,
    compact_seeds: &[u8],
    pub_seed: &[u8],
    parallelism: usize,
    flat_dest: Option<&mut [u8]>,
) -> XmssResult<Vec<u8>> {
    if parallelism < 2 {
        return Err(ArgumentError::InvalidParallelism(parallelism).into());
    }
    let h = params.height();
    let p = choose_subtree_height(h, parallelism);
    let num_tasks = 1u32 << (h - p);
    let n = params.wots().n();

    let dest_mutex = flat_dest.map(Mutex::new);

    let roots: Vec<XmssResult<Vec<u8>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..num_tasks)
            .map(|task| {
                let dest_mutex = dest_mutex.as_ref();
                scope.spawn(move || -> XmssResult<Vec<u8>> {
                    let s = task << p;
                    let mut staged = dest_mutex.map(|_| Vec::new());
                    let root = hash_subtree(params, compact_seeds, pub_seed, s, p, h, staged.as_mut())?;
                    if let (Some(mutex), Some(pairs)) = (dest_mutex, staged) {
                        let mut dest = mutex.lock().expect("flat tree buffer mutex poisoned");
                        for (off, bytes) in pairs {
                            dest[off..off + n].copy_from_slice(&bytes);
                        }
                    }
                    Ok(root)
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().expect("tree_hash worker panicked")).collect()
    });

    let mut layer: Vec<Vec<u8>> = Vec::with_capacity(roots.len());
    for root in roots {
        layer.push(root?);
    }

    let mut adrs = Adrs::new();
    adrs.set_type(AdrsType::HashTree);
    for height in p..h {
        let mut next_layer = Vec::with_capacity(layer.len() / 2);
        for (j, pair) in layer.chunks_exact(2).enumerate() {
            let parent_index = j as u32;
            adrs.set_tree_height(height)?;
            adrs.set_tree_index(parent_index)?;
            let mut merged = vec![0u8; n];
            rand_hash(params, &pair[0], &pair[1], pub_seed, &mut adrs, &mut merged)?;
            if let Some(mutex) = dest_mutex.as_ref() {
                let off = flat_tree_index(height + 1, parent_index, 0, h, n);
                let mut dest = mutex.lock().expect("flat tree buffer mutex poisoned");
                dest[off..off + n].copy_from_slice(&merged);
            }
            next_layer.push(merged);
        }
        layer = next_layer;
    }

    Ok(layer.into_iter().next().expect("tree height >= 0 always leaves one node"))
}

/// [`crate::xmss_core::generate_key_pair`], but builds the root (and the
/// returned [`FlatTree`]) via [`parallel_tree_hash`] instead of the
/// single-threaded `tree_hash`. Produces byte-identical output to the
/// sequential path for identical inputs (see `parallel_root_matches_sequential_root`).
pub fn generate_key_pair_parallel(
    params: &XmssParams,
    compact_private_seeds: Vec<u8>,
    sk_prf: Vec<u8>,
    public_seed: Vec<u8>,
    parallelism: usize,
) -> XmssResult<(XmssPrivateKey, XmssPublicKey, FlatTree)> {
    validate_seed_lengths(params, &compact_private_seeds, &sk_prf, &public_seed)?;
    let n = params.wots().n();
    let h = params.height();

    let mut flat_bytes = vec![0u8; ((1usize << (h + 1)) - 1) * n];
    let root = parallel_tree_hash(params, &compact_private_seeds, &public_seed, parallelism, Some(&mut flat_bytes))?;
    let flat_tree = FlatTree::new(h, n, flat_bytes);

    let private_key = XmssPrivateKey::new(0, compact_private_seeds, sk_prf, root.clone(), public_seed.clone());
    let public_key = XmssPublicKey::new(params.oid(), root, public_seed);
    Ok((private_key, public_key, flat_tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::concrete::Sha256Truncated;
    use crate::types::WotsParams;
    use crate::xmss_core::tree_hash;
    use std::sync::Arc;

    fn params(height: u32) -> XmssParams {
        let hash = Arc::new(Sha256Truncated::new(32));
        let wots = WotsParams::new(32, hash).unwrap();
        XmssParams::new(wots, height).unwrap()
    }

    #[test]
    fn parallel_root_matches_sequential_root() {
        let params = params(4);
        let n = params.wots().n();
        let seeds = vec![11u8; params.num_leaves() as usize * n];
        let pub_seed = vec![22u8; n];

        let sequential = tree_hash(&params, &seeds, &pub_seed, 0, params.height(), None).unwrap();
        let parallel = parallel_tree_hash(&params, &seeds, &pub_seed, 4, None).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_flat_buffer_matches_sequential_flat_buffer() {
        let params = params(4);
        let n = params.wots().n();
        let seeds = vec![33u8; params.num_leaves() as usize * n];
        let pub_seed = vec![44u8; n];
        let h = params.height();
        let buf_len = ((1usize << (h + 1)) - 1) * n;

        let mut sequential_buf = vec![0u8; buf_len];
        let sequential_root = tree_hash(&params, &seeds, &pub_seed, 0, h, Some(&mut sequential_buf)).unwrap();

        let mut parallel_buf = vec![0u8; buf_len];
        let parallel_root = parallel_tree_hash(&params, &seeds, &pub_seed, 3, Some(&mut parallel_buf)).unwrap();

        assert_eq!(sequential_root, parallel_root);
        assert_eq!(sequential_buf, parallel_buf);
    }

    #[test]
    fn rejects_trivial_parallelism() {
        let params = params(4);
        let n = params.wots().n();
        let seeds = vec![0u8; params.num_leaves() as usize * n];
        let pub_seed = vec![0u8; n];
        assert!(parallel_tree_hash(&params, &seeds, &pub_seed, 1, None).is_err());
    }

    #[test]
    fn single_task_fallback_is_consistent() {
        let params = params(1);
        let n = params.wots().n();
        let seeds = vec![5u8; params.num_leaves() as usize * n];
        let pub_seed = vec![6u8; n];

        let sequential = tree_hash(&params, &seeds, &pub_seed, 0, params.height(), None).unwrap();
        let parallel = parallel_tree_hash(&params, &seeds, &pub_seed, 8, None).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_key_generation_matches_sequential() {
        use crate::xmss_core::generate_key_pair;

        let params = params(4);
        let n = params.wots().n();
        let seeds = vec![77u8; params.num_leaves() as usize * n];
        let sk_prf = vec![88u8; n];
        let pub_seed = vec![99u8; n];

        let (sk1, pk1, tree1) =
            generate_key_pair(&params, seeds.clone(), sk_prf.clone(), pub_seed.clone()).unwrap();
        let (sk2, pk2, tree2) = generate_key_pair_parallel(&params, seeds, sk_prf, pub_seed, 4).unwrap();

        assert_eq!(pk1, pk2);
        assert_eq!(tree1, tree2);
        assert_eq!(sk1.next_idx(), sk2.next_idx());
    }
}
