//! Device abstraction and resource-manager façade.

mod mode;
mod resource;

#[cfg(feature = "device")]
mod kernel;

pub use mode::{is_device_execution, is_on_device, set_device_mode, DeviceMode};
pub use resource::{AllocatorBackend, DeviceBuffer, HeapBackend, ResourceManager};

/// Namespace for the device-side kernel entry points: `linearize`,
/// `pack`, `unpack`. Only available under the `device` feature;
/// `eos-data` falls back to its own sequential host scan when the
/// feature is off.
#[cfg(feature = "device")]
pub struct Device;

#[cfg(feature = "device")]
impl Device {
    #[inline]
    pub fn linearize<V: eos_common::Scalar>(features: &[&[V]], out: &mut [V]) {
        kernel::linearize(features, out)
    }

    #[inline]
    pub fn pack_indices(predicate: &[bool], dense_val: bool) -> Vec<u32> {
        kernel::pack_indices(predicate, dense_val)
    }

    #[inline]
    pub fn pack_gather<V: eos_common::Scalar>(indices: &[u32], sparse: &[&[V]], dense: &mut [&mut [V]]) {
        kernel::pack_gather(indices, sparse, dense)
    }

    #[inline]
    pub fn unpack_scatter<V: eos_common::Scalar>(indices: &[u32], dense: &[&[V]], sparse: &mut [&mut [V]]) {
        kernel::unpack_scatter(indices, dense, sparse)
    }
}
