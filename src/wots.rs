//! WOTS+ one-time signature core: chain function, base-w expansion, checksum,
//! key generation, signing and public-key reconstruction.

use crate::adrs::{Adrs, AdrsType};
use crate::error::{ArgumentError, XmssResult};
use crate::hash::{f, prf_keygen};
use crate::types::WotsParams;
use crate::utils::to_bytes;

/// Expands an `n`-byte compact seed into the `len * n`-byte private key.
///
/// Each chain's starting value is `PRF_keygen(seed, publicSeed || ADRS)`
/// with `ADRS.chainAddress` set to the chain index and `hashAddress`/
/// `keyAndMask` left at zero — RFC 8391's domain-4 keyed hash (distinct from
/// the domain-3 `PRF` the chain function uses), binding the public seed into
/// every derived chain seed rather than the compact seed alone.
///
/// Callers must have already set `adrs` to the `OTS` variant (and, when this
/// key belongs to a tree leaf, its `otsAddress`) before calling in: this
/// function only ever touches `chainAddress`/`hashAddress`/`keyAndMask`. It
/// must not call `Adrs::set_type` itself, since that would zero `otsAddress`
/// back to the default and make every leaf's private key indistinguishable
/// from leaf 0's — `pk_from_sig` (which never re-derives a private key) has
/// no such reset, so the two sides would stop agreeing on every `ADRS` but
/// leaf 0's.
pub(crate) fn inflate_private_key(
    params: &WotsParams,
    seed: &[u8],
    pub_seed: &[u8],
    adrs: &mut Adrs,
    out: &mut [u8],
) -> XmssResult<()> {
    let n = params.n();
    if seed.len() != n {
        return Err(ArgumentError::BufferLength {
            what: "wots seed",
            expected: n,
            got: seed.len(),
        }
        .into());
    }
    if out.len() != params.len() as usize * n {
        return Err(ArgumentError::BufferLength {
            what: "wots private key",
            expected: params.len() as usize * n,
            got: out.len(),
        }
        .into());
    }
    for i in 0..params.len() {
        adrs.set_chain_address(i)?;
        adrs.set_hash_address(0)?;
        adrs.set_key_and_mask(0);
        prf_keygen(params.hash(), seed, pub_seed, *adrs, &mut out[i as usize * n..(i as usize + 1) * n])?;
    }
    Ok(())
}

/// `chain(x, start, steps, publicSeed, ADRS)`.
pub(crate) fn chain(
    params: &WotsParams,
    x: &[u8],
    start: u32,
    steps: u32,
    pub_seed: &[u8],
    adrs: &mut Adrs,
    out: &mut [u8],
) -> XmssResult<()> {
    let n = params.n();
    if start + steps > params.w() - 1 {
        return Err(ArgumentError::InvalidChainBounds {
            start,
            steps,
            w: params.w(),
        }
        .into());
    }
    out[..n].copy_from_slice(&x[..n]);
    if steps == 0 {
        return Ok(());
    }
    let mut key = vec![0u8; n];
    let mut bitmask = vec![0u8; n];
    for i in start..start + steps {
        adrs.set_hash_address(i)?;
        adrs.set_key_and_mask(0);
        prf(params.hash(), pub_seed, *adrs, &mut key)?;
        adrs.set_key_and_mask(1);
        prf(params.hash(), pub_seed, *adrs, &mut bitmask)?;
        for j in 0..n {
            out[j] ^= bitmask[j];
        }
        let input = out[..n].to_vec();
        f(params.hash(), &key, &input, &mut out[..n])?;
    }
    Ok(())
}

/// Splits `input` into `output.len()` base-`w` digits, most significant first.
pub(crate) fn base_w(params: &WotsParams, input: &[u8], output: &mut [u32]) {
    let log2_w = params.log2_w();
    let mask = params.w() - 1;
    let mut in_idx = 0usize;
    let mut total: u32 = 0;
    let mut bits: u32 = 0;
    for out in output.iter_mut() {
        if bits == 0 {
            total = u32::from(input[in_idx]);
            in_idx += 1;
            bits += 8;
        }
        bits -= log2_w;
        *out = (total >> bits) & mask;
    }
}

/// Computes `len1` message digits and `len2` checksum digits for `msg`
/// (`msg.len() == n`), written into `lengths` (`lengths.len() == len`).
pub(crate) fn chain_lengths(params: &WotsParams, msg: &[u8], lengths: &mut [u32]) -> XmssResult<()> {
    let len1 = params.len1() as usize;
    let len2 = params.len2() as usize;
    base_w(params, msg, &mut lengths[..len1]);

    let mut csum: u32 = 0;
    for &d in &lengths[..len1] {
        csum += params.w() - 1 - d;
    }
    let shift = (8 - (params.len2() * params.log2_w()) % 8) % 8;
    csum <<= shift;
    let csum_byte_len = (params.len2() * params.log2_w()).div_ceil(8) as usize;
    let mut csum_bytes = vec![0u8; csum_byte_len];
    to_bytes(&mut csum_bytes, u64::from(csum))?;
    base_w(params, &csum_bytes, &mut lengths[len1..len1 + len2]);
    Ok(())
}

/// Derives the WOTS+ public key from a compact `n`-byte seed.
pub(crate) fn pk_gen(params: &WotsParams, seed: &[u8], pub_seed: &[u8], adrs: &mut Adrs, pk: &mut [u8]) -> XmssResult<()> {
    let n = params.n();
    inflate_private_key(params, seed, pub_seed, adrs, pk)?;
    for i in 0..params.len() {
        adrs.set_chain_address(i)?;
        let start = pk[i as usize * n..(i as usize + 1) * n].to_vec();
        chain(
            params,
            &start,
            0,
            params.w() - 1,
            pub_seed,
            adrs,
            &mut pk[i as usize * n..(i as usize + 1) * n],
        )?;
    }
    Ok(())
}

/// Signs `msg` (`msg.len() == n`) with the WOTS+ key expanded from `seed`.
pub(crate) fn sign(
    params: &WotsParams,
    msg: &[u8],
    seed: &[u8],
    pub_seed: &[u8],
    adrs: &mut Adrs,
    sig: &mut [u8],
) -> XmssResult<()> {
    let n = params.n();
    let mut lengths = vec![0u32; params.len() as usize];
    chain_lengths(params, msg, &mut lengths)?;
    inflate_private_key(params, seed, pub_seed, adrs, sig)?;
    for i in 0..params.len() {
        adrs.set_chain_address(i)?;
        let start = sig[i as usize * n..(i as usize + 1) * n].to_vec();
        chain(
            params,
            &start,
            0,
            lengths[i as usize],
            pub_seed,
            adrs,
            &mut sig[i as usize * n..(i as usize + 1) * n],
        )?;
    }
    Ok(())
}

/// `signatureToPublicKey`: reconstructs the WOTS+ public key that `sig`
/// would have produced for `msg`, without access to the private key.
pub(crate) fn pk_from_sig(
    params: &WotsParams,
    sig: &[u8],
    msg: &[u8],
    pub_seed: &[u8],
    adrs: &mut Adrs,
    pk: &mut [u8],
) -> XmssResult<()> {
    let n = params.n();
    let mut lengths = vec![0u32; params.len() as usize];
    chain_lengths(params, msg, &mut lengths)?;
    for i in 0..params.len() {
        adrs.set_chain_address(i)?;
        let d = lengths[i as usize];
        chain(
            params,
            &sig[i as usize * n..(i as usize + 1) * n],
            d,
            params.w() - 1 - d,
            pub_seed,
            adrs,
            &mut pk[i as usize * n..(i as usize + 1) * n],
        )?;
    }
    Ok(())
}
