//! The append-only offline data store façade.

mod file;

pub use file::FileStore;

use eos_common::{Error, Scalar};

/// Append-only record sink. Invoked only under the `db` compile-time
/// toggle, and only with the physics-fallback samples of a partition, so
/// the store accumulates training data for the surrogate over time.
pub trait OfflineStore<V: Scalar> {
    /// Appends `n` records, each the concatenation of `n_in + n_out`
    /// scalar values, taken from `packed_inputs`/`packed_outputs`
    /// (`n_in`/`n_out` feature slices respectively, each of length `n`).
    fn store(
        &mut self,
        n: usize,
        packed_inputs: &[&[V]],
        packed_outputs: &[&[V]],
    ) -> Result<(), Error>;
}
