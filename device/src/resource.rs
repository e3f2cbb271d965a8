use std::alloc::{self, Layout};
use std::collections::HashSet;
use std::ptr::NonNull;
use std::sync::Mutex;

use eos_common::{AllocSpace, Error};

use crate::mode::{is_device_execution, DeviceMode};

/// Tracks which raw addresses were produced by the device space, so that
/// `is_on_device` can answer without a real device address range to
/// compare against. Populated/cleared only by `ResourceManager`.
static DEVICE_PTRS: Mutex<Option<HashSet<usize>>> = Mutex::new(None);

pub(crate) fn is_tracked_device_ptr(ptr: *const ()) -> bool {
    DEVICE_PTRS
        .lock()
        .unwrap()
        .as_ref()
        .is_some_and(|set| set.contains(&(ptr as usize)))
}

fn track(ptr: *const (), space: AllocSpace) {
    if space == AllocSpace::Device {
        DEVICE_PTRS
            .lock()
            .unwrap()
            .get_or_insert_with(HashSet::new)
            .insert(ptr as usize);
    }
}

fn untrack(ptr: *const (), space: AllocSpace) {
    if space == AllocSpace::Device {
        if let Some(set) = DEVICE_PTRS.lock().unwrap().as_mut() {
            set.remove(&(ptr as usize));
        }
    }
}

/// The actual byte-level allocator behind a memory space. Swappable so
/// call sites never reach for `std::alloc` directly.
pub trait AllocatorBackend {
    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>>;
    /// # Safety
    /// `ptr`/`layout` must match a prior `alloc_zeroed` call on this backend.
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The default backend: the process heap. Used for `AllocSpace::Host`
/// always, and for `AllocSpace::Device` when no real device runtime is
/// linked in. Device allocations are heap-backed but tracked separately
/// (see `DEVICE_PTRS`) so `is_on_device` and the `device` kernels still
/// dispatch correctly.
#[derive(Default)]
pub struct HeapBackend;

impl AllocatorBackend for HeapBackend {
    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return NonNull::new(layout.align() as *mut u8);
        }
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr)
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

/// A scoped, typed allocation made through `ResourceManager`. `Drop`
/// always deallocates, so early returns via `?` still release scratch
/// memory.
pub struct DeviceBuffer<V> {
    ptr: NonNull<V>,
    len: usize,
    space: AllocSpace,
}

unsafe impl<V: Send> Send for DeviceBuffer<V> {}
unsafe impl<V: Sync> Sync for DeviceBuffer<V> {}

impl<V> DeviceBuffer<V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn space(&self) -> AllocSpace {
        self.space
    }

    #[inline]
    pub fn as_ptr(&self) -> *const V {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut V {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[V] {
        if self.len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [V] {
        if self.len == 0 {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
        }
    }

    fn layout(len: usize) -> Layout {
        Layout::array::<V>(len).expect("buffer layout overflow")
    }
}

impl<V> Drop for DeviceBuffer<V> {
    fn drop(&mut self) {
        untrack(self.ptr.as_ptr() as *const (), self.space);
        let layout = Self::layout(self.len);
        // SAFETY: `ptr`/`layout` came from the matching `HeapBackend::alloc_zeroed`
        // call that produced this buffer; `ResourceManager` never hands out a
        // `DeviceBuffer` built any other way.
        unsafe { HeapBackend.dealloc(self.ptr.cast(), layout) }
    }
}

/// Typed allocate/deallocate façade. All transient buffers in the
/// pack/unpack and pipeline code go through this rather than a direct
/// system allocator.
#[derive(Default)]
pub struct ResourceManager {
    host: HeapBackend,
    device: HeapBackend,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `n` zeroed `V`s in the space selected by the current
    /// `DeviceMode`.
    pub fn allocate<V>(&self, n: usize) -> Result<DeviceBuffer<V>, Error> {
        let space = if is_device_execution() {
            AllocSpace::Device
        } else {
            AllocSpace::Host
        };
        self.allocate_in(space, n)
    }

    /// Allocates `n` zeroed `V`s in an explicitly chosen space, bypassing
    /// the global `DeviceMode`.
    pub fn allocate_in<V>(&self, space: AllocSpace, n: usize) -> Result<DeviceBuffer<V>, Error> {
        let backend = match space {
            AllocSpace::Host => &self.host,
            AllocSpace::Device => &self.device,
        };
        let layout = DeviceBuffer::<V>::layout(n);
        let ptr = backend
            .alloc_zeroed(layout)
            .ok_or(Error::Allocation { count: n, space })?
            .cast::<V>();
        track(ptr.as_ptr() as *const (), space);
        Ok(DeviceBuffer { ptr, len: n, space })
    }

    /// Explicit release, equivalent to dropping the buffer. Provided so
    /// call sites can document an intentional early release; `Drop` still
    /// covers every other exit path.
    pub fn deallocate<V>(&self, buf: DeviceBuffer<V>) {
        drop(buf);
    }

    /// Bulk memset of `value` across the whole buffer.
    pub fn fill<V: Copy>(&self, buf: &mut DeviceBuffer<V>, value: V) {
        buf.as_mut_slice().fill(value);
    }

    #[inline]
    pub fn is_on_device<V>(&self, buf: &DeviceBuffer<V>) -> bool {
        buf.space() == AllocSpace::Device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{set_device_mode, DeviceMode};

    #[test]
    fn allocates_zeroed_host_buffer() {
        set_device_mode(DeviceMode::Host);
        let rm = ResourceManager::new();
        let buf = rm.allocate::<f64>(8).unwrap();
        assert_eq!(buf.len(), 8);
        assert!(buf.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(buf.space(), AllocSpace::Host);
    }

    #[test]
    fn device_mode_routes_to_device_space() {
        set_device_mode(DeviceMode::Device);
        let rm = ResourceManager::new();
        let buf = rm.allocate::<f32>(4).unwrap();
        assert_eq!(buf.space(), AllocSpace::Device);
        assert!(rm.is_on_device(&buf));
        set_device_mode(DeviceMode::Host);
    }

    #[test]
    fn zero_length_allocation_is_empty() {
        let rm = ResourceManager::new();
        let buf = rm.allocate::<f64>(0).unwrap();
        assert!(buf.is_empty());
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn drop_releases_and_untracks() {
        set_device_mode(DeviceMode::Device);
        let rm = ResourceManager::new();
        let buf = rm.allocate::<f32>(2).unwrap();
        let ptr = buf.as_ptr();
        drop(buf);
        assert!(!super::is_tracked_device_ptr(ptr as *const ()));
        set_device_mode(DeviceMode::Host);
    }
}
