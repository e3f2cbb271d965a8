use std::sync::atomic::{AtomicBool, Ordering};

/// Global default memory space. Set once at process start; the core only
/// ever reads it. Changing it mid-invocation is undefined behaviour.
static DEVICE_MODE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    Host,
    Device,
}

/// Selects whether subsequent allocations default to device memory.
/// Typically called once at startup from the process-wide allocator
/// configuration.
#[inline]
pub fn set_device_mode(mode: DeviceMode) {
    DEVICE_MODE.store(mode == DeviceMode::Device, Ordering::SeqCst);
}

#[inline]
pub fn is_device_execution() -> bool {
    DEVICE_MODE.load(Ordering::SeqCst)
}

/// This crate models device memory as a distinct allocator rather than a
/// distinct address space (no GPU runtime is available here), so a pointer
/// is on device exactly when it was produced by the device allocator,
/// tracked by `ResourceManager` rather than derived from the pointer value
/// itself. `ResourceManager::is_on_device` is the implementation callers
/// should use; this free function is kept for API parity.
#[inline]
pub fn is_on_device<T>(ptr: *const T) -> bool {
    crate::resource::is_tracked_device_ptr(ptr as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_host() {
        assert!(!is_device_execution());
    }

    #[test]
    fn mode_round_trips() {
        set_device_mode(DeviceMode::Device);
        assert!(is_device_execution());
        set_device_mode(DeviceMode::Host);
        assert!(!is_device_execution());
    }
}
