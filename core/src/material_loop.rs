use eos_common::{Error, Scalar};
use eos_device::ResourceManager;
use eos_eval::{EosEvaluator, SurrogateEvaluator, UqCache};
use eos_store::OfflineStore;
use eos_tensor::{BlockTensor, Shape, SparseIndex};

use crate::config::MaterialEvaluatorConfig;
use crate::pipeline::evaluate_inner;

#[allow(clippy::too_many_arguments)]
pub(crate) fn evaluate_dense<V: Scalar>(
    resource: &ResourceManager,
    m: u32,
    config: MaterialEvaluatorConfig,
    density: &BlockTensor<V>,
    energy: &BlockTensor<V>,
    eos: Option<&dyn EosEvaluator<V>>,
    surrogate: Option<&dyn SurrogateEvaluator<V>>,
    uq: Option<&dyn UqCache<V>>,
    store: Option<&mut dyn OfflineStore<V>>,
    pressure: &mut BlockTensor<V>,
    sound_speed_sq: &mut BlockTensor<V>,
    bulk_modulus: &mut BlockTensor<V>,
    temperature: &mut BlockTensor<V>,
) -> Result<(), Error> {
    let _ = config;
    log::trace!("material {m}: dense path, N = E*Q = {}", density.shape().per_material_len());
    evaluate_inner(
        m,
        resource,
        uq,
        surrogate,
        eos,
        store,
        density.material_slice(m),
        energy.material_slice(m),
        pressure.material_slice_mut(m),
        sound_speed_sq.material_slice_mut(m),
        bulk_modulus.material_slice_mut(m),
        temperature.material_slice_mut(m),
    )
}

/// Sparse path: gather the material's active elements into contiguous
/// dense buffers, run the pipeline, scatter the four outputs back. The
/// six dense buffers are allocated at entry and released at exit of this
/// function.
#[allow(clippy::too_many_arguments)]
pub(crate) fn evaluate_sparse<V: Scalar>(
    resource: &ResourceManager,
    m: u32,
    e_m: u32,
    config: MaterialEvaluatorConfig,
    density: &BlockTensor<V>,
    energy: &BlockTensor<V>,
    sparse_index: &SparseIndex,
    eos: Option<&dyn EosEvaluator<V>>,
    surrogate: Option<&dyn SurrogateEvaluator<V>>,
    uq: Option<&dyn UqCache<V>>,
    store: Option<&mut dyn OfflineStore<V>>,
    pressure: &mut BlockTensor<V>,
    sound_speed_sq: &mut BlockTensor<V>,
    bulk_modulus: &mut BlockTensor<V>,
    temperature: &mut BlockTensor<V>,
) -> Result<(), Error> {
    let q = config.qpts;
    let n = e_m as usize * q as usize;
    let shape = Shape::new(q, config.elements, 1);
    let indices = sparse_index.indices(m);
    log::trace!("material {m}: sparse path, E_m = {e_m} < E = {}", config.elements);

    let mut dense_density = resource.allocate::<V>(n)?;
    let mut dense_energy = resource.allocate::<V>(n)?;
    let mut dense_pressure = resource.allocate::<V>(n)?;
    let mut dense_sound_speed_sq = resource.allocate::<V>(n)?;
    let mut dense_bulk_modulus = resource.allocate::<V>(n)?;
    let mut dense_temperature = resource.allocate::<V>(n)?;

    eos_data::pack_ij(
        indices,
        shape,
        &[density.material_slice(m), energy.material_slice(m)],
        &mut [dense_density.as_mut_slice(), dense_energy.as_mut_slice()],
    )?;

    evaluate_inner(
        m,
        resource,
        uq,
        surrogate,
        eos,
        store,
        dense_density.as_slice(),
        dense_energy.as_slice(),
        dense_pressure.as_mut_slice(),
        dense_sound_speed_sq.as_mut_slice(),
        dense_bulk_modulus.as_mut_slice(),
        dense_temperature.as_mut_slice(),
    )?;

    eos_data::unpack_ij(
        indices,
        shape,
        &[
            dense_pressure.as_slice(),
            dense_sound_speed_sq.as_slice(),
            dense_bulk_modulus.as_slice(),
            dense_temperature.as_slice(),
        ],
        &mut [
            pressure.material_slice_mut(m),
            sound_speed_sq.material_slice_mut(m),
            bulk_modulus.material_slice_mut(m),
            temperature.material_slice_mut(m),
        ],
    )?;

    // Dense buffers drop here, at function scope exit.
    Ok(())
}
