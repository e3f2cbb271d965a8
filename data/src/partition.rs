use std::sync::OnceLock;

use eos_common::Scalar;

/// Default per-partition scratch-memory budget, in bytes. Overridable via
/// `EOS_PARTITION_BUDGET_BYTES` so deployments can tune it without a
/// rebuild, read once and cached for the life of the process.
const DEFAULT_BUDGET_BYTES: usize = 64 * 1024 * 1024;
const BUDGET_ENV_VAR: &str = "EOS_PARTITION_BUDGET_BYTES";

static BUDGET_BYTES: OnceLock<usize> = OnceLock::new();

fn budget_bytes() -> usize {
    *BUDGET_BYTES.get_or_init(|| {
        std::env::var(BUDGET_ENV_VAR)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&b| b > 0)
            .unwrap_or(DEFAULT_BUDGET_BYTES)
    })
}

/// `floor(BUDGET / bytes_per_sample)`.
pub fn compute_partition_size<V: Scalar>(
    n_in_features: usize,
    n_out_features: usize,
    include_reindex: bool,
) -> usize {
    let bytes_per_sample = std::mem::size_of::<V>() * (n_in_features + n_out_features)
        + if include_reindex {
            std::mem::size_of::<u32>()
        } else {
            0
        };
    budget_bytes() / bytes_per_sample.max(1)
}
