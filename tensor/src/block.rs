use eos_common::Scalar;

/// Logical shape of a block tensor: `Q` quadrature points, `E` elements
/// (the mesh's maximum elements per material), `M` materials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    pub q: u32,
    pub e: u32,
    pub m: u32,
}

impl Shape {
    #[inline]
    pub const fn new(q: u32, e: u32, m: u32) -> Self {
        Self { q, e, m }
    }

    #[inline]
    pub fn per_material_len(&self) -> usize {
        self.q as usize * self.e as usize
    }

    #[inline]
    pub fn total_len(&self) -> usize {
        self.per_material_len() * self.m as usize
    }

    /// Index of sample `(qpt, elem)` within one material's dense block:
    /// qpt is innermost, elem next.
    #[inline]
    pub fn sample_index(&self, qpt: u32, elem: u32) -> usize {
        debug_assert!(qpt < self.q && elem < self.e);
        elem as usize * self.q as usize + qpt as usize
    }
}

/// A `Q x E x M` array of `V`, owned by the caller. The core reads inputs
/// and writes outputs but never reallocates them; this type is for
/// callers and tests to build/hold that storage, the core itself only
/// ever borrows `material_slice`/`material_slice_mut`.
#[derive(Clone, Debug)]
pub struct BlockTensor<V> {
    shape: Shape,
    data: Vec<V>,
}

impl<V: Scalar> BlockTensor<V> {
    pub fn zeroed(shape: Shape) -> Self {
        Self {
            shape,
            data: vec![V::zero(); shape.total_len()],
        }
    }

    pub fn from_vec(shape: Shape, data: Vec<V>) -> Self {
        assert_eq!(
            data.len(),
            shape.total_len(),
            "block tensor data length does not match shape"
        );
        Self { shape, data }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.data
    }

    /// The `m`-slice of the block tensor: `Q·E` samples, contiguous in qpt
    /// then elem.
    #[inline]
    pub fn material_slice(&self, m: u32) -> &[V] {
        let len = self.shape.per_material_len();
        let start = m as usize * len;
        &self.data[start..start + len]
    }

    #[inline]
    pub fn material_slice_mut(&mut self, m: u32) -> &mut [V] {
        let len = self.shape.per_material_len();
        let start = m as usize * len;
        &mut self.data[start..start + len]
    }
}
