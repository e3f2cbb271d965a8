use eos_common::{Error, Scalar};
use eos_device::ResourceManager;
use eos_eval::{EosEvaluator, SurrogateEvaluator, UqCache};
use eos_store::OfflineStore;

/// Per-material evaluation pipeline: UQ check, surrogate inference,
/// predicate-driven pack, physics fallback, unpack, optional DB store,
/// run over memory-bounded partitions of the `N`-sample input.
#[cfg_attr(
    feature = "trace",
    tracing::instrument(skip_all, fields(material = material, n = density.len()))
)]
#[allow(clippy::too_many_arguments)]
#[cfg_attr(not(feature = "db"), allow(unused_mut, unused_variables))]
pub(crate) fn evaluate_inner<V: Scalar>(
    material: u32,
    resource: &ResourceManager,
    uq: Option<&dyn UqCache<V>>,
    surrogate: Option<&dyn SurrogateEvaluator<V>>,
    eos: Option<&dyn EosEvaluator<V>>,
    mut store: Option<&mut dyn OfflineStore<V>>,
    density: &[V],
    energy: &[V],
    pressure: &mut [V],
    sound_speed_sq: &mut [V],
    bulk_modulus: &mut [V],
    temperature: &mut [V],
) -> Result<(), Error> {
    let n = density.len();
    debug_assert_eq!(energy.len(), n);
    debug_assert_eq!(pressure.len(), n);
    debug_assert_eq!(sound_speed_sq.len(), n);
    debug_assert_eq!(bulk_modulus.len(), n);
    debug_assert_eq!(temperature.len(), n);

    // Predicate buffer, released at function exit regardless of how we
    // leave.
    let mut predicate = resource.allocate::<bool>(n)?;

    // Zero-initialised (all-false) when UQ is absent: physics runs
    // everywhere.
    if let Some(uq) = uq {
        uq.evaluate(&[density, energy], predicate.as_mut_slice())
            .map_err(|source| Error::Evaluator {
                evaluator: "uq_cache",
                material,
                source,
            })?;
        log::trace!("material {material}: uq cache evaluated {n} samples");
    } else {
        log::trace!("material {material}: no uq cache, physics-fallback everywhere");
    }

    // Memory-bounded partition size.
    let part = eos_data::compute_partition_size::<V>(2, 4, false).max(1);

    let mut p_id = 0usize;
    while p_id < n {
        let len = part.min(n - p_id);
        log::debug!("material {material}: partition [{p_id}, {})", p_id + len);

        // Six packed buffers, released at the end of this iteration.
        let mut packed_density = resource.allocate::<V>(len)?;
        let mut packed_energy = resource.allocate::<V>(len)?;
        let mut packed_pressure = resource.allocate::<V>(len)?;
        let mut packed_sound_speed_sq = resource.allocate::<V>(len)?;
        let mut packed_bulk_modulus = resource.allocate::<V>(len)?;
        let mut packed_temperature = resource.allocate::<V>(len)?;

        let density_part = &density[p_id..p_id + len];
        let energy_part = &energy[p_id..p_id + len];

        // Surrogate writes every position in the partition first; physics
        // overwrites the rejected subset below.
        if let Some(surrogate) = surrogate {
            surrogate
                .eval(
                    &[density_part, energy_part],
                    &mut [
                        &mut pressure[p_id..p_id + len],
                        &mut sound_speed_sq[p_id..p_id + len],
                        &mut bulk_modulus[p_id..p_id + len],
                        &mut temperature[p_id..p_id + len],
                    ],
                )
                .map_err(|source| Error::Evaluator {
                    evaluator: "surrogate",
                    material,
                    source,
                })?;
        }

        let predicate_part = &predicate.as_slice()[p_id..p_id + len];

        // Pack selects the samples the surrogate was rejected on
        // (`P[i] == false`).
        let k = eos_data::pack(
            predicate_part,
            &[density_part, energy_part],
            &mut [packed_density.as_mut_slice(), packed_energy.as_mut_slice()],
            false,
        )?;

        // Physics fallback, only over the rejected subset. No surrogate
        // means `P` all-false means `k == len`; `P` all-true means `k ==
        // 0` and physics is never called.
        if k > 0 {
            let eos = eos.ok_or_else(|| Error::Evaluator {
                evaluator: "eos",
                material,
                source: "no physics evaluator registered for a material with rejected samples"
                    .into(),
            })?;
            eos.eval(
                &packed_energy.as_slice()[..k],
                &packed_density.as_slice()[..k],
                &mut packed_pressure.as_mut_slice()[..k],
                &mut packed_sound_speed_sq.as_mut_slice()[..k],
                &mut packed_bulk_modulus.as_mut_slice()[..k],
                &mut packed_temperature.as_mut_slice()[..k],
            )
            .map_err(|source| Error::Evaluator {
                evaluator: "eos",
                material,
                source,
            })?;

            // Append physics-fallback samples only, gated by the `db`
            // compile-time toggle.
            #[cfg(feature = "db")]
            if let Some(store) = store.as_deref_mut() {
                store.store(
                    k,
                    &[&packed_density.as_slice()[..k], &packed_energy.as_slice()[..k]],
                    &[
                        &packed_pressure.as_slice()[..k],
                        &packed_sound_speed_sq.as_slice()[..k],
                        &packed_bulk_modulus.as_slice()[..k],
                        &packed_temperature.as_slice()[..k],
                    ],
                )?;
            }

            // Scatter physics outputs back, overwriting the surrogate's
            // earlier write at the rejected positions.
            eos_data::unpack(
                predicate_part,
                &[
                    packed_pressure.as_slice(),
                    packed_sound_speed_sq.as_slice(),
                    packed_bulk_modulus.as_slice(),
                    packed_temperature.as_slice(),
                ],
                &mut [
                    &mut pressure[p_id..p_id + len],
                    &mut sound_speed_sq[p_id..p_id + len],
                    &mut bulk_modulus[p_id..p_id + len],
                    &mut temperature[p_id..p_id + len],
                ],
                false,
            )?;
        }

        // Packed buffers drop here, at loop-iteration scope exit.
        p_id += len;
    }

    // Predicate buffer drops here, at function scope exit, including on
    // every `?`-propagated error path above.
    Ok(())
}
