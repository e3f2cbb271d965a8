use std::any::TypeId;

use eos_common::Scalar;
use num_traits::NumCast;

/// Result of `cast_to`: either the caller's slice reinterpreted in place
/// (when `T == V`) or a freshly allocated, owned copy. `is_owned` tells
/// the caller which case applies.
pub enum Cast<'a, V> {
    Borrowed(&'a [V]),
    Owned(Vec<V>),
}

impl<'a, V> Cast<'a, V> {
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        match self {
            Cast::Borrowed(s) => s,
            Cast::Owned(v) => v,
        }
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Cast::Owned(_))
    }
}

/// A no-op reinterpretation when the mesh's storage type already matches
/// `V`, otherwise an element-wise cast into a new buffer.
pub fn cast_to<'a, T, V>(src: &'a [T]) -> Cast<'a, V>
where
    T: NumCast + Copy + 'static,
    V: Scalar + 'static,
{
    if TypeId::of::<T>() == TypeId::of::<V>() {
        // SAFETY: `T` and `V` are both `'static` and their `TypeId`s match,
        // so they are the same type; this only changes the slice's static
        // type, not its memory layout.
        let same: &'a [V] = unsafe { std::mem::transmute::<&'a [T], &'a [V]>(src) };
        Cast::Borrowed(same)
    } else {
        Cast::Owned(
            src.iter()
                .map(|&t| V::from(t).expect("cast_to: value not representable in V"))
                .collect(),
        )
    }
}

/// Element-wise cast into caller-owned storage.
pub fn cast_from<T, V>(dst: &mut [T], src: &[V])
where
    T: NumCast,
    V: Scalar,
{
    assert_eq!(dst.len(), src.len(), "cast_from: length mismatch");
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = T::from(s).expect("cast_from: value not representable in T");
    }
}

/// Allocates `n*F` of `V` and writes `out[i*F + d] = features[d][i]`,
/// row-major. Dispatches to the device kernel when
/// `is_device_execution()`, else walks a host nested loop.
pub fn linearize_features<V: Scalar>(n: usize, features: &[&[V]]) -> Vec<V> {
    let f = features.len();
    for feature in features {
        assert_eq!(feature.len(), n, "linearize_features: feature length mismatch");
    }
    let mut out = vec![V::zero(); n * f];

    #[cfg(feature = "device")]
    if eos_device::is_device_execution() {
        eos_device::Device::linearize(features, &mut out);
        return out;
    }

    for i in 0..n {
        for (d, feature) in features.iter().enumerate() {
            out[i * f + d] = feature[i];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_to_same_type_borrows() {
        let src = [1.0f64, 2.0, 3.0];
        let cast: Cast<f64> = cast_to(&src);
        assert!(!cast.is_owned());
        assert_eq!(cast.as_slice(), &src);
    }

    #[test]
    fn cast_to_different_type_allocates() {
        let src: [f32; 3] = [1.0, 2.0, 3.0];
        let cast: Cast<f64> = cast_to(&src);
        assert!(cast.is_owned());
        assert_eq!(cast.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn cast_from_writes_caller_buffer() {
        let src = [1.0f64, 2.5, 3.0];
        let mut dst = [0.0f32; 3];
        cast_from(&mut dst, &src);
        assert_eq!(dst, [1.0, 2.5, 3.0]);
    }

    #[test]
    fn linearize_is_row_major() {
        let a = [1.0f64, 2.0];
        let b = [10.0f64, 20.0];
        let out = linearize_features(2, &[&a, &b]);
        assert_eq!(out, vec![1.0, 10.0, 2.0, 20.0]);
    }
}
