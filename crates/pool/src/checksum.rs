//! Message digests computed with pooled hashers
//!
//! Any `sha2` algorithm can be used; each one gets its own pool in the
//! registry, keyed by [`PoolKind::Checksum`](crate::PoolKind::Checksum).

use sha2::Digest;
use sha2::digest::FixedOutputReset;

use crate::error::PoolResult;
use crate::poolable::Poolable;
use crate::registry::PoolRegistry;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Digest `chunks` with a pooled `D` hasher, feeding them `count` times in order
///
/// A `count` of zero is treated as one pass.
///
/// # Example
/// ```
/// use nebula_pool::{PoolRegistry, checksum};
/// use sha2::Sha384;
///
/// let registry = PoolRegistry::new();
/// let digest = checksum::digest::<Sha384>(&registry, 1, &[b"abc"]).unwrap();
/// assert_eq!(digest.len(), 48);
/// ```
pub fn digest<D>(registry: &PoolRegistry, count: usize, chunks: &[&[u8]]) -> PoolResult<Vec<u8>>
where
    D: Digest + FixedOutputReset + Default + Poolable,
{
    let hashers = registry.checksums::<D>()?;
    Ok(hashers.for_instance(|hasher| {
        for _ in 0..count.max(1) {
            for chunk in chunks {
                Digest::update(&mut *hasher, chunk);
            }
        }
        Digest::finalize_reset(hasher).to_vec()
    }))
}

/// Lowercase hex rendering of [`digest`], built in a pooled string
pub fn hex<D>(registry: &PoolRegistry, count: usize, chunks: &[&[u8]]) -> PoolResult<String>
where
    D: Digest + FixedOutputReset + Default + Poolable,
{
    let digest = digest::<D>(registry, count, chunks)?;
    let builders = registry.string_builders()?;
    Ok(builders.for_instance(|text| {
        text.reserve(digest.len() * 2);
        for byte in &digest {
            text.push(char::from(HEX[usize::from(byte >> 4)]));
            text.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
        text.clone()
    }))
}

/// SHA-256 [`digest`]
pub fn sha256(registry: &PoolRegistry, count: usize, chunks: &[&[u8]]) -> PoolResult<Vec<u8>> {
    digest::<sha2::Sha256>(registry, count, chunks)
}

/// SHA-256 [`hex`]
///
/// # Example
/// ```
/// use nebula_pool::{PoolRegistry, checksum};
///
/// let registry = PoolRegistry::new();
/// let hex = checksum::sha256_hex(&registry, 1, &[b"abc"]).unwrap();
/// assert_eq!(hex, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
/// ```
pub fn sha256_hex(registry: &PoolRegistry, count: usize, chunks: &[&[u8]]) -> PoolResult<String> {
    hex::<sha2::Sha256>(registry, count, chunks)
}
