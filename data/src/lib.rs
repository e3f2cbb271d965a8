//! Cast/linearize, predicate-driven pack/unpack, partition sizing, and
//! sparse/dense per-material gather/scatter.

mod cast;
mod gather;
mod pack;
mod partition;

pub use cast::{cast_from, cast_to, linearize_features};
pub use gather::{pack_ij, unpack_ij};
pub use pack::{pack, pack_indexed, unpack, unpack_indexed};
pub use partition::compute_partition_size;
