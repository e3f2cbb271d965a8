//! Per-material evaluation pipeline and material loop driver, the
//! orchestration layer of the surrogate-accelerated EOS evaluation core.
//! Everything else in this workspace (device, data, eval, store, tensor
//! crates) exists to serve this one entry point.

mod config;
mod material_loop;
mod pipeline;

pub use config::MaterialEvaluatorConfig;

use eos_common::{Error, Scalar};
use eos_device::ResourceManager;
use eos_eval::{EosEvaluator, Roster, SurrogateEvaluator, UqCache};
use eos_store::OfflineStore;
use eos_tensor::{BlockTensor, SparseIndex};

/// Owns the three per-material collaborator rosters, the resource
/// manager, and the optional offline store. Construction parameters are
/// immutable for the lifetime of the evaluator.
pub struct MaterialEvaluator<V: Scalar> {
    config: MaterialEvaluatorConfig,
    resource: ResourceManager,
    eos: Roster<Box<dyn EosEvaluator<V>>>,
    surrogate: Roster<Box<dyn SurrogateEvaluator<V>>>,
    uq: Roster<Box<dyn UqCache<V>>>,
    store: Option<Box<dyn OfflineStore<V>>>,
}

impl<V: Scalar> MaterialEvaluator<V> {
    /// Each roster must have exactly `config.materials` entries, any of
    /// which may be `Slot::Absent`.
    pub fn new(
        config: MaterialEvaluatorConfig,
        eos: Roster<Box<dyn EosEvaluator<V>>>,
        surrogate: Roster<Box<dyn SurrogateEvaluator<V>>>,
        uq: Roster<Box<dyn UqCache<V>>>,
        store: Option<Box<dyn OfflineStore<V>>>,
    ) -> Self {
        let m = config.materials as usize;
        assert_eq!(eos.len(), m, "eos roster length must equal the material count");
        assert_eq!(surrogate.len(), m, "surrogate roster length must equal the material count");
        assert_eq!(uq.len(), m, "uq roster length must equal the material count");
        Self {
            config,
            resource: ResourceManager::new(),
            eos,
            surrogate,
            uq,
            store,
        }
    }

    #[inline]
    pub fn config(&self) -> MaterialEvaluatorConfig {
        self.config
    }

    /// Returns normally only if every material was processed; otherwise
    /// surfaces the first fatal error unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        &mut self,
        density: &BlockTensor<V>,
        energy: &BlockTensor<V>,
        sparse_index: &SparseIndex,
        pressure: &mut BlockTensor<V>,
        sound_speed_sq: &mut BlockTensor<V>,
        bulk_modulus: &mut BlockTensor<V>,
        temperature: &mut BlockTensor<V>,
    ) -> Result<(), Error> {
        let config = self.config;
        for m in 0..config.materials {
            // E_m == 0 is not an error, the material is skipped silently.
            let e_m = sparse_index.active_count(m);
            if e_m == 0 {
                log::debug!("material {m}: E_m == 0, skipping");
                continue;
            }

            let eos = self.eos[m as usize].as_ref().map(|b| b.as_ref());
            let surrogate = self.surrogate[m as usize].as_ref().map(|b| b.as_ref());
            let uq = self.uq[m as usize].as_ref().map(|b| b.as_ref());
            let store = self.store.as_deref_mut();

            if config.is_cpu && config.pack_sparse_mats && e_m < config.elements {
                material_loop::evaluate_sparse(
                    &self.resource,
                    m,
                    e_m,
                    config,
                    density,
                    energy,
                    sparse_index,
                    eos,
                    surrogate,
                    uq,
                    store,
                    pressure,
                    sound_speed_sq,
                    bulk_modulus,
                    temperature,
                )?;
            } else {
                material_loop::evaluate_dense(
                    &self.resource,
                    m,
                    config,
                    density,
                    energy,
                    eos,
                    surrogate,
                    uq,
                    store,
                    pressure,
                    sound_speed_sq,
                    bulk_modulus,
                    temperature,
                )?;
            }
        }
        Ok(())
    }
}
