//! Device-side companions of the data-handler operations: `linearize`,
//! `pack`, `unpack`. Gated behind the `device` feature; `eos-data`
//! dispatches to these when `is_device_execution()` is true and falls
//! back to a sequential host scan otherwise. No GPU runtime is linked
//! into this crate, so "parallel over the sample dimension" is modelled
//! with `rayon`'s thread pool.

use eos_common::Scalar;
use rayon::prelude::*;

/// Wraps a raw pointer so it can cross into a `rayon` closure. Every use
/// below writes disjoint elements per parallel item, so the aliasing this
/// sidesteps never actually occurs.
struct SyncMutPtr<V>(*mut V);
unsafe impl<V> Send for SyncMutPtr<V> {}
unsafe impl<V> Sync for SyncMutPtr<V> {}

/// `Device::linearize`: row-major feature interleave, parallel over the
/// sample index.
pub fn linearize<V: Scalar>(features: &[&[V]], out: &mut [V]) {
    let f = features.len();
    debug_assert_eq!(out.len() % f.max(1), 0);
    out.par_chunks_mut(f).enumerate().for_each(|(i, row)| {
        for (d, feature) in features.iter().enumerate() {
            row[d] = feature[i];
        }
    });
}

/// `Device::pack` (compaction half): returns, in ascending order, every
/// index `i` with `predicate[i] == dense_val`. Implements prefix-sum
/// compaction by counting and collecting per chunk in parallel, then
/// concatenating the chunks in order; the concatenation step is rayon's
/// indexed-collect, which preserves chunk order, giving the same
/// ascending-`i` guarantee as the host sequential scan.
pub fn pack_indices(predicate: &[bool], dense_val: bool) -> Vec<u32> {
    if predicate.is_empty() {
        return Vec::new();
    }
    let chunk_size = (predicate.len() / rayon::current_num_threads().max(1)).max(1);
    predicate
        .par_chunks(chunk_size)
        .enumerate()
        .map(|(chunk_idx, chunk)| {
            let base = chunk_idx * chunk_size;
            chunk
                .iter()
                .enumerate()
                .filter(|&(_, &p)| p == dense_val)
                .map(move |(j, _)| (base + j) as u32)
                .collect::<Vec<u32>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// `Device::pack` (data-movement half): gathers `sparse[d][indices[k]]`
/// into `dense[d][k]` for every feature `d`, parallel over `k`.
pub fn pack_gather<V: Scalar>(indices: &[u32], sparse: &[&[V]], dense: &mut [&mut [V]]) {
    let f = sparse.len();
    debug_assert_eq!(dense.len(), f);
    let dense_ptrs: Vec<SyncMutPtr<V>> = dense.iter_mut().map(|s| SyncMutPtr(s.as_mut_ptr())).collect();
    indices.par_iter().enumerate().for_each(|(k, &i)| {
        for (d, s) in sparse.iter().enumerate() {
            unsafe { *dense_ptrs[d].0.add(k) = s[i as usize] };
        }
    });
}

/// `Device::unpack`: scatters `dense[d][k]` back into `sparse[d][indices[k]]`
/// for every feature `d`, parallel over `k`.
pub fn unpack_scatter<V: Scalar>(indices: &[u32], dense: &[&[V]], sparse: &mut [&mut [V]]) {
    let f = dense.len();
    debug_assert_eq!(sparse.len(), f);
    let sparse_ptrs: Vec<SyncMutPtr<V>> = sparse.iter_mut().map(|s| SyncMutPtr(s.as_mut_ptr())).collect();
    indices.par_iter().enumerate().for_each(|(k, &i)| {
        for (d, s) in dense.iter().enumerate() {
            unsafe { *sparse_ptrs[d].0.add(i as usize) = s[k] };
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linearize_is_row_major() {
        let a = [1.0f64, 2.0, 3.0];
        let b = [10.0f64, 20.0, 30.0];
        let mut out = [0.0; 6];
        linearize(&[&a, &b], &mut out);
        assert_eq!(out, [1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
    }

    #[test]
    fn pack_indices_preserves_ascending_order() {
        let predicate = [true, false, false, true, false];
        assert_eq!(pack_indices(&predicate, false), vec![1, 2, 4]);
    }

    #[test]
    fn gather_then_scatter_round_trips() {
        let sparse_src = [1.0f64, 2.0, 3.0, 4.0];
        let indices = pack_indices(&[false, true, false, true], false);
        let mut dense = vec![0.0f64; indices.len()];
        pack_gather(&indices, &[&sparse_src], &mut [&mut dense]);
        assert_eq!(dense, vec![1.0, 3.0]);

        let mut sparse_dst = [0.0f64; 4];
        unpack_scatter(&indices, &[&dense], &mut [&mut sparse_dst]);
        assert_eq!(sparse_dst[0], 1.0);
        assert_eq!(sparse_dst[2], 3.0);
        assert_eq!(sparse_dst[1], 0.0);
        assert_eq!(sparse_dst[3], 0.0);
    }
}
