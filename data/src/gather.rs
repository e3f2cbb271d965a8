use eos_common::{Error, Scalar};
use eos_tensor::Shape;
use itertools::izip;

fn check_tensor_counts(sources: usize, dests: usize) -> Result<(), Error> {
    if sources != dests {
        return Err(Error::ShapeMismatch {
            what: "pack_ij/unpack_ij tensor count",
            expected: sources,
            actual: dests,
        });
    }
    Ok(())
}

#[cfg(feature = "device")]
struct SyncMutPtr<V>(*mut V);
#[cfg(feature = "device")]
unsafe impl<V> Send for SyncMutPtr<V> {}
#[cfg(feature = "device")]
unsafe impl<V> Sync for SyncMutPtr<V> {}

/// For each dense position `k`, `e = indices[k]` is the element's global
/// position, and every `q` sample is copied from the material's `(q, e)`
/// slot into the dense buffer's `(q, k)` slot. Generalises over one or
/// more input tensors (density, energy, ...), one source/dest pair per
/// tensor. Parallel over `k` on device, sequential on host: reads and
/// writes touch disjoint `k`-slices, so no synchronisation is needed.
pub fn pack_ij<V: Scalar>(
    indices: &[u32],
    shape: Shape,
    sources: &[&[V]],
    dests: &mut [&mut [V]],
) -> Result<(), Error> {
    check_tensor_counts(sources.len(), dests.len())?;
    let q = shape.q as usize;

    #[cfg(feature = "device")]
    if eos_device::is_device_execution() {
        use rayon::prelude::*;
        let dest_ptrs: Vec<SyncMutPtr<V>> = dests.iter_mut().map(|d| SyncMutPtr(d.as_mut_ptr())).collect();
        indices.par_iter().enumerate().for_each(|(k, &e)| {
            let e = e as usize;
            for qi in 0..q {
                let src_idx = e * q + qi;
                let dst_idx = k * q + qi;
                for (t, src) in sources.iter().enumerate() {
                    unsafe { *dest_ptrs[t].0.add(dst_idx) = src[src_idx] };
                }
            }
        });
        return Ok(());
    }

    for (k, &e) in indices.iter().enumerate() {
        let e = e as usize;
        for qi in 0..q {
            let src_idx = e * q + qi;
            let dst_idx = k * q + qi;
            for (src, dst) in izip!(sources.iter(), dests.iter_mut()) {
                dst[dst_idx] = src[src_idx];
            }
        }
    }
    Ok(())
}

/// The inverse scatter for output tensors, from the dense `(q, k)` buffer
/// back to the material's `(q, e)` slot.
pub fn unpack_ij<V: Scalar>(
    indices: &[u32],
    shape: Shape,
    sources: &[&[V]],
    dests: &mut [&mut [V]],
) -> Result<(), Error> {
    check_tensor_counts(sources.len(), dests.len())?;
    let q = shape.q as usize;

    #[cfg(feature = "device")]
    if eos_device::is_device_execution() {
        use rayon::prelude::*;
        let dest_ptrs: Vec<SyncMutPtr<V>> = dests.iter_mut().map(|d| SyncMutPtr(d.as_mut_ptr())).collect();
        indices.par_iter().enumerate().for_each(|(k, &e)| {
            let e = e as usize;
            for qi in 0..q {
                let src_idx = k * q + qi;
                let dst_idx = e * q + qi;
                for (t, src) in sources.iter().enumerate() {
                    unsafe { *dest_ptrs[t].0.add(dst_idx) = src[src_idx] };
                }
            }
        });
        return Ok(());
    }

    for (k, &e) in indices.iter().enumerate() {
        let e = e as usize;
        for qi in 0..q {
            let src_idx = k * q + qi;
            let dst_idx = e * q + qi;
            for (src, dst) in izip!(sources.iter(), dests.iter_mut()) {
                dst[dst_idx] = src[src_idx];
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_ij_gathers_active_elements_into_dense() {
        // Q=2, E=3, one material; active elements at global positions 0, 2.
        let shape = Shape::new(2, 3, 1);
        let density = [1.0f64, 2.0, 10.0, 20.0, 100.0, 200.0]; // elem-major: e0=[1,2], e1=[10,20], e2=[100,200]
        let indices = [0u32, 2];
        let mut dense = vec![0.0f64; 4];
        pack_ij(&indices, shape, &[&density], &mut [&mut dense]).unwrap();
        assert_eq!(dense, vec![1.0, 2.0, 100.0, 200.0]);
    }

    #[test]
    fn pack_then_unpack_round_trips() {
        let shape = Shape::new(2, 3, 1);
        let pressure_src = [0.0f64; 6];
        let indices = [0u32, 2];
        let dense_out = [7.0f64, 8.0, 9.0, 10.0];
        let mut pressure = pressure_src;
        unpack_ij(&indices, shape, &[&dense_out], &mut [&mut pressure]).unwrap();
        assert_eq!(pressure, [7.0, 8.0, 0.0, 0.0, 9.0, 10.0]);
    }

    #[test]
    fn tensor_count_mismatch_is_fatal() {
        let shape = Shape::new(1, 1, 1);
        let a = [1.0f64];
        let mut b = [0.0f64];
        let mut c = [0.0f64];
        let err = pack_ij(&[0], shape, &[&a], &mut [&mut b, &mut c]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
