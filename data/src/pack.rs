use eos_common::{Error, Scalar};
use itertools::izip;

fn check_feature_counts(sparse_len: usize, dense_len: usize) -> Result<(), Error> {
    if sparse_len != dense_len {
        return Err(Error::ShapeMismatch {
            what: "pack/unpack feature count",
            expected: sparse_len,
            actual: dense_len,
        });
    }
    Ok(())
}

/// Predicate-preserving pack: for each `i` with `predicate[i] == dense_val`,
/// copies `sparse[d][i]` into `dense[d][npacked]` across all features, in
/// ascending `i` order. Returns `npacked`. Dispatches to the device
/// prefix-sum kernel when running on device, otherwise a sequential scan.
pub fn pack<V: Scalar>(
    predicate: &[bool],
    sparse: &[&[V]],
    dense: &mut [&mut [V]],
    dense_val: bool,
) -> Result<usize, Error> {
    check_feature_counts(sparse.len(), dense.len())?;

    #[cfg(feature = "device")]
    if eos_device::is_device_execution() {
        let indices = eos_device::Device::pack_indices(predicate, dense_val);
        eos_device::Device::pack_gather(&indices, sparse, dense);
        return Ok(indices.len());
    }

    let mut npacked = 0usize;
    for (i, &p) in predicate.iter().enumerate() {
        if p == dense_val {
            for (s, d) in izip!(sparse.iter(), dense.iter_mut()) {
                d[npacked] = s[i];
            }
            npacked += 1;
        }
    }
    Ok(npacked)
}

/// Reverse mapping of `pack`: walks `i` and a running `npacked` in lockstep.
pub fn unpack<V: Scalar>(
    predicate: &[bool],
    dense: &[&[V]],
    sparse: &mut [&mut [V]],
    dense_val: bool,
) -> Result<(), Error> {
    check_feature_counts(sparse.len(), dense.len())?;

    let mut npacked = 0usize;
    for (i, &p) in predicate.iter().enumerate() {
        if p == dense_val {
            for (s, d) in izip!(dense.iter(), sparse.iter_mut()) {
                d[i] = s[npacked];
            }
            npacked += 1;
        }
    }
    Ok(())
}

/// Index-materialising pack: same compaction as `pack`, but also returns
/// the `sparse_indices` table so `unpack_indexed` can scatter without the
/// predicate buffer surviving to that point.
pub fn pack_indexed<V: Scalar>(
    predicate: &[bool],
    sparse: &[&[V]],
    dense: &mut [&mut [V]],
    dense_val: bool,
) -> Result<(usize, Vec<u32>), Error> {
    check_feature_counts(sparse.len(), dense.len())?;

    #[cfg(feature = "device")]
    if eos_device::is_device_execution() {
        let indices = eos_device::Device::pack_indices(predicate, dense_val);
        eos_device::Device::pack_gather(&indices, sparse, dense);
        let npacked = indices.len();
        return Ok((npacked, indices));
    }

    let mut indices = Vec::new();
    let mut npacked = 0usize;
    for (i, &p) in predicate.iter().enumerate() {
        if p == dense_val {
            for (d, s) in sparse.iter().enumerate() {
                dense[d][npacked] = s[i];
            }
            indices.push(i as u32);
            npacked += 1;
        }
    }
    Ok((npacked, indices))
}

/// Consults only the `sparse_indices` table recorded by `pack_indexed`.
pub fn unpack_indexed<V: Scalar>(
    sparse_indices: &[u32],
    dense: &[&[V]],
    sparse: &mut [&mut [V]],
) -> Result<(), Error> {
    check_feature_counts(sparse.len(), dense.len())?;

    #[cfg(feature = "device")]
    if eos_device::is_device_execution() {
        eos_device::Device::unpack_scatter(sparse_indices, dense, sparse);
        return Ok(());
    }

    for (k, &i) in sparse_indices.iter().enumerate() {
        for (d, s) in dense.iter().enumerate() {
            sparse[d][i as usize] = s[k];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_collects_rejected_samples_in_order() {
        // P = [T, F, T, F]; dense_val = false collects indices 1, 3.
        let predicate = [true, false, true, false];
        let density = [1.0f64, 2.0, 3.0, 4.0];
        let energy = [10.0f64, 20.0, 30.0, 40.0];
        let mut packed_density = [0.0f64; 2];
        let mut packed_energy = [0.0f64; 2];
        let n = pack(
            &predicate,
            &[&density, &energy],
            &mut [&mut packed_density, &mut packed_energy],
            false,
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(packed_density, [2.0, 4.0]);
        assert_eq!(packed_energy, [20.0, 40.0]);
    }

    #[test]
    fn pack_then_unpack_round_trips_rejected_positions() {
        let predicate = [true, false, true, false];
        let src = [1.0f64, 2.0, 3.0, 4.0];
        let mut dense = [0.0f64; 2];
        pack(&predicate, &[&src], &mut [&mut dense], false).unwrap();
        dense.iter_mut().for_each(|v| *v *= 10.0);

        let mut out = [0.0f64, 0.0, 0.0, 0.0];
        unpack(&predicate, &[&dense], &mut [&mut out], false).unwrap();
        assert_eq!(out, [0.0, 20.0, 0.0, 40.0]);
    }

    #[test]
    fn variant_2_matches_variant_1() {
        let predicate = [false, true, false, true, false];
        let src = [1.0f64, 2.0, 3.0, 4.0, 5.0];

        let mut dense_v1 = [0.0f64; 3];
        pack(&predicate, &[&src], &mut [&mut dense_v1], false).unwrap();
        let mut out_v1 = [0.0f64; 5];
        unpack(&predicate, &[&dense_v1], &mut [&mut out_v1], false).unwrap();

        let mut dense_v2 = [0.0f64; 3];
        let (k, indices) = pack_indexed(&predicate, &[&src], &mut [&mut dense_v2], false).unwrap();
        assert_eq!(k, 3);
        let mut out_v2 = [0.0f64; 5];
        unpack_indexed(&indices, &[&dense_v2], &mut [&mut out_v2]).unwrap();

        assert_eq!(dense_v1, dense_v2);
        assert_eq!(out_v1, out_v2);
    }

    #[test]
    fn shape_mismatch_is_fatal() {
        let predicate = [true, false];
        let src = [1.0f64, 2.0];
        let mut dense_a = [0.0f64; 1];
        let mut dense_b = [0.0f64; 1];
        let err = pack(&predicate, &[&src], &mut [&mut dense_a, &mut dense_b], false).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn all_true_predicate_packs_nothing_for_dense_val_false() {
        let predicate = [true, true, true];
        let src = [1.0f64, 2.0, 3.0];
        let mut dense = [0.0f64; 0];
        let n = pack(&predicate, &[&src], &mut [&mut dense], false).unwrap();
        assert_eq!(n, 0);
    }
}
